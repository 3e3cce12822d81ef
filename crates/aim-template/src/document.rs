//! Annotation template documents.
//!
//! A template document holds characteristic fragments as direct children of its root element:
//!
//! ```xml
//! <ImagingObservation>
//!   <ImagingObservationCharacteristic annotatorConfidence="true"><QuestionType/></ImagingObservationCharacteristic>
//!   <ImagingObservationCharacteristic annotatorConfidence="false"><QuestionType/></ImagingObservationCharacteristic>
//! </ImagingObservation>
//! ```
//!
//! Fragments are located lexically and handed back as source slices so that each can be decoded
//! on its own. Whether a bad fragment aborts the whole load is decided by the caller.

use crate::characteristic::{write_characteristic, AnnotationCharacteristic};
use crate::{AimTemplateError, AimTemplateResult};
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;

/// Root element written by [`write_document`].
pub const DOCUMENT_ROOT: &str = "ImagingObservation";

/// One characteristic fragment located in a template document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fragment<'a> {
    /// Zero-based position among the characteristic fragments of the document.
    pub position: usize,
    /// Exact source text of the element, from its start tag to its end tag.
    pub xml: &'a str,
}

/// Locate every direct child of the root element named `C::ELEMENT_NAME`.
///
/// Other children, comments and text are ignored. The root element name is not checked.
///
/// # Errors
///
/// Returns [`AimTemplateError::MalformedDocument`] if the XML is not well formed, has no root
/// element, or has more than one root element.
pub fn split_fragments<C>(xml: &str) -> AimTemplateResult<Vec<Fragment<'_>>>
where
    C: AnnotationCharacteristic,
{
    let element = C::ELEMENT_NAME.as_bytes();
    let mut reader = Reader::from_str(xml);
    let mut fragments = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        let start = position(&reader)?;
        let event = reader.read_event().map_err(|err| malformed(start, err))?;

        match event {
            Event::Start(e) => {
                if depth == 0 {
                    reject_second_root(&mut seen_root, start)?;
                    depth = 1;
                } else if depth == 1 && e.name().as_ref() == element {
                    let end_name = e.name().as_ref().to_vec();
                    reader
                        .read_to_end(QName(&end_name))
                        .map_err(|err| malformed(start, err))?;
                    let end = position(&reader)?;
                    fragments.push(Fragment {
                        position: fragments.len(),
                        xml: xml[start..end].trim_start(),
                    });
                } else {
                    depth += 1;
                }
            }
            Event::Empty(e) => {
                if depth == 0 {
                    reject_second_root(&mut seen_root, start)?;
                } else if depth == 1 && e.name().as_ref() == element {
                    let end = position(&reader)?;
                    fragments.push(Fragment {
                        position: fragments.len(),
                        xml: xml[start..end].trim_start(),
                    });
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(AimTemplateError::MalformedDocument(
            "document has no root element".to_string(),
        ));
    }
    if depth != 0 {
        return Err(AimTemplateError::MalformedDocument(
            "document ended before the root element was closed".to_string(),
        ));
    }

    Ok(fragments)
}

/// Write characteristics as a template document rooted at [`DOCUMENT_ROOT`].
///
/// Each fragment is written on its own line in the order given.
pub fn write_document<C>(characteristics: &[C]) -> AimTemplateResult<String>
where
    C: AnnotationCharacteristic,
{
    let mut out = format!("<{DOCUMENT_ROOT}>\n");
    for component in characteristics {
        out.push_str(&write_characteristic(component)?);
        out.push('\n');
    }
    out.push_str(&format!("</{DOCUMENT_ROOT}>\n"));
    Ok(out)
}

fn position(reader: &Reader<&[u8]>) -> AimTemplateResult<usize> {
    usize::try_from(reader.buffer_position()).map_err(|_| {
        AimTemplateError::MalformedDocument("document exceeds addressable size".to_string())
    })
}

fn reject_second_root(seen_root: &mut bool, at: usize) -> AimTemplateResult<()> {
    if *seen_root {
        return Err(AimTemplateError::MalformedDocument(format!(
            "unexpected second root element at byte {at}"
        )));
    }
    *seen_root = true;
    Ok(())
}

fn malformed(at: usize, err: quick_xml::Error) -> AimTemplateError {
    AimTemplateError::MalformedDocument(format!("invalid XML after byte {at}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ImagingObservationCharacteristic, ValidTerm};

    type Characteristic = ImagingObservationCharacteristic;

    #[test]
    fn splits_direct_children_in_order() {
        let input = r#"<?xml version="1.0"?>
<ImagingObservation>
  <ImagingObservationCharacteristic annotatorConfidence="true"><QuestionType/></ImagingObservationCharacteristic>
  <!-- second -->
  <ImagingObservationCharacteristic annotatorConfidence="false"/>
</ImagingObservation>
"#;

        let fragments = split_fragments::<Characteristic>(input).expect("split");
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].position, 0);
        assert_eq!(
            fragments[0].xml,
            r#"<ImagingObservationCharacteristic annotatorConfidence="true"><QuestionType/></ImagingObservationCharacteristic>"#
        );
        assert_eq!(fragments[1].position, 1);
        assert_eq!(
            fragments[1].xml,
            r#"<ImagingObservationCharacteristic annotatorConfidence="false"/>"#
        );
    }

    #[test]
    fn ignores_nested_and_foreign_elements() {
        let input = r#"<ImagingObservation><AllowedTerm codeValue="RID1"/><Group><ImagingObservationCharacteristic annotatorConfidence="true"/></Group></ImagingObservation>"#;

        let fragments = split_fragments::<Characteristic>(input).expect("split");
        assert!(fragments.is_empty());
    }

    #[test]
    fn keeps_malformed_fragment_for_the_caller() {
        let input = r#"<ImagingObservation><ImagingObservationCharacteristic annotatorConfidence="maybe"><QuestionType/></ImagingObservationCharacteristic></ImagingObservation>"#;

        let fragments = split_fragments::<Characteristic>(input).expect("split");
        assert_eq!(fragments.len(), 1);
        assert!(Characteristic::read_xml(fragments[0].xml).is_err());
    }

    #[test]
    fn rejects_mismatched_end_tag() {
        let input = r#"<ImagingObservation><ImagingObservationCharacteristic annotatorConfidence="true"></QuestionType></ImagingObservation>"#;

        let err = split_fragments::<Characteristic>(input).expect_err("should reject");
        assert!(matches!(err, AimTemplateError::MalformedDocument(_)));
    }

    #[test]
    fn rejects_document_without_root() {
        let err = split_fragments::<Characteristic>("<!-- nothing -->").expect_err("should reject");
        assert!(matches!(err, AimTemplateError::MalformedDocument(msg) if msg.contains("no root")));
    }

    #[test]
    fn written_document_splits_back_into_equal_characteristics() {
        let mut first = Characteristic::new();
        first.set_annotator_confidence(true);
        first.set_question_type(ValidTerm::new("RID5", "shape", "RadLex"));
        let second = Characteristic::new();

        let xml = write_document(&[first.clone(), second.clone()]).expect("write document");
        assert!(xml.starts_with("<ImagingObservation>"));

        let decoded = split_fragments::<Characteristic>(&xml)
            .expect("split")
            .into_iter()
            .map(|fragment| Characteristic::read_xml(fragment.xml))
            .collect::<Result<Vec<_>, _>>()
            .expect("decode fragments");
        assert_eq!(decoded, vec![first, second]);
    }
}
