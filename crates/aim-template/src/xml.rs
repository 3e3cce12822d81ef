//! Shared XML encode/decode helpers for the wire structs.

use crate::{AimTemplateError, AimTemplateResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A single-rooted fragment with its namespace declarations removed.
#[derive(Debug)]
struct Prepared {
    root: String,
    xml: String,
}

/// Re-write `xml` without `xmlns` and `xmlns:*` attributes, checking that it has exactly one root
/// element.
///
/// Declarations, comments and processing instructions around the root are kept.
fn prepare(xml: &str) -> AimTemplateResult<Prepared> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut root: Option<String> = None;
    let mut depth = 0usize;

    loop {
        let event = reader.read_event().map_err(|err| {
            AimTemplateError::MalformedDocument(format!(
                "invalid XML at byte {}: {err}",
                reader.buffer_position()
            ))
        })?;

        let event = match event {
            Event::Start(e) => {
                if depth == 0 {
                    enter_root(&mut root, &e)?;
                }
                depth += 1;
                Event::Start(without_namespace_declarations(&e)?)
            }
            Event::Empty(e) => {
                if depth == 0 {
                    enter_root(&mut root, &e)?;
                }
                Event::Empty(without_namespace_declarations(&e)?)
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                Event::End(e)
            }
            Event::Eof => break,
            other => other,
        };

        writer.write_event(event).map_err(|err| {
            AimTemplateError::MalformedDocument(format!("cannot re-write XML: {err}"))
        })?;
    }

    let root = root.ok_or_else(|| {
        AimTemplateError::MalformedDocument("document has no root element".to_string())
    })?;
    if depth != 0 {
        return Err(AimTemplateError::MalformedDocument(format!(
            "document ended before <{root}> was closed"
        )));
    }

    let xml = String::from_utf8(writer.into_inner())
        .map_err(|err| AimTemplateError::MalformedDocument(format!("invalid UTF-8: {err}")))?;
    Ok(Prepared { root, xml })
}

fn enter_root(root: &mut Option<String>, element: &BytesStart<'_>) -> AimTemplateResult<()> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    if let Some(existing) = root {
        return Err(AimTemplateError::MalformedDocument(format!(
            "unexpected element <{name}> after root element <{existing}>"
        )));
    }
    *root = Some(name);
    Ok(())
}

fn is_namespace_declaration(key: &[u8]) -> bool {
    key == b"xmlns" || key.starts_with(b"xmlns:")
}

/// Elements without namespace declarations are returned byte for byte.
fn without_namespace_declarations<'a>(
    element: &BytesStart<'a>,
) -> AimTemplateResult<BytesStart<'a>> {
    let mut attributes = Vec::new();
    for attribute in element.attributes() {
        attributes.push(attribute.map_err(|err| {
            AimTemplateError::MalformedDocument(format!("invalid attribute: {err}"))
        })?);
    }

    if !attributes
        .iter()
        .any(|attribute| is_namespace_declaration(attribute.key.as_ref()))
    {
        return Ok(element.clone());
    }

    let mut cleaned = element.clone();
    cleaned.clear_attributes();
    for attribute in attributes {
        if !is_namespace_declaration(attribute.key.as_ref()) {
            cleaned.push_attribute(attribute);
        }
    }
    Ok(cleaned)
}

/// Strictly decode `xml` whose root element must be `element`.
///
/// This uses `serde_path_to_error` so the error names the failing attribute or child (for
/// example `ImagingObservationCharacteristic.QuestionType.@codeValue`). Namespace declarations
/// are not data and are dropped before decoding; anything after the root element is rejected.
pub(crate) fn decode<T>(xml: &str, element: &str) -> AimTemplateResult<T>
where
    T: DeserializeOwned,
{
    let prepared = prepare(xml)?;
    if prepared.root != element {
        return Err(AimTemplateError::MalformedDocument(format!(
            "expected root element <{element}>, found <{}>",
            prepared.root
        )));
    }

    let mut deserializer = quick_xml::de::Deserializer::from_str(&prepared.xml);

    match serde_path_to_error::deserialize(&mut deserializer) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                element.to_string()
            } else {
                format!("{element}.{path}")
            };
            Err(AimTemplateError::MalformedDocument(format!(
                "{path}: {source}"
            )))
        }
    }
}

pub(crate) fn encode<T>(value: &T, element: &str) -> AimTemplateResult<String>
where
    T: Serialize,
{
    quick_xml::se::to_string_with_root(element, value)
        .map_err(|err| AimTemplateError::Serialization(err.to_string()))
}
