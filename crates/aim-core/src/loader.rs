//! Template document loading.
//!
//! The wire crate decodes one characteristic at a time and never defaults a bad value. This
//! module decides what a bad characteristic means for the document around it: with
//! [`LoadPolicy::Abort`] the first failure fails the load, with [`LoadPolicy::Skip`] the
//! failure is logged, recorded in the [`LoadReport`], and loading continues.

use crate::{CoreError, CoreResult};
use aim_template::document::{split_fragments, write_document};
use aim_template::validation::validate_characteristic;
use aim_template::{AimTemplateResult, ImagingObservationCharacteristic};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// What to do with a characteristic that fails to decode or validate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Fail the whole document load.
    #[default]
    Abort,
    /// Leave the characteristic out and keep loading.
    Skip,
}

impl FromStr for LoadPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("abort") {
            Ok(Self::Abort)
        } else if value.eq_ignore_ascii_case("skip") {
            Ok(Self::Skip)
        } else {
            Err(CoreError::InvalidInput(format!(
                "load policy must be 'abort' or 'skip', got '{value}'"
            )))
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub policy: LoadPolicy,
    /// Also run template validation on each decoded characteristic.
    pub strict_terms: bool,
}

/// A characteristic left out of a skip-policy load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedFragment {
    pub position: usize,
    pub reason: String,
}

/// Result of loading one template document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub characteristics: Vec<ImagingObservationCharacteristic>,
    pub skipped: Vec<SkippedFragment>,
}

/// Load every characteristic of a template document.
///
/// # Errors
///
/// Returns [`CoreError::Template`] if the document itself is not well-formed XML, and
/// [`CoreError::Fragment`] for the first bad characteristic under [`LoadPolicy::Abort`].
pub fn load_document(xml: &str, options: &LoadOptions) -> CoreResult<LoadReport> {
    let fragments = split_fragments::<ImagingObservationCharacteristic>(xml)?;
    let mut report = LoadReport::default();

    for fragment in fragments {
        match decode_fragment(fragment.xml, options.strict_terms) {
            Ok(component) => {
                tracing::debug!(position = fragment.position, "decoded characteristic");
                report.characteristics.push(component);
            }
            Err(source) => match options.policy {
                LoadPolicy::Abort => {
                    return Err(CoreError::Fragment {
                        position: fragment.position,
                        source,
                    });
                }
                LoadPolicy::Skip => {
                    tracing::warn!(
                        position = fragment.position,
                        error = %source,
                        "skipping characteristic"
                    );
                    report.skipped.push(SkippedFragment {
                        position: fragment.position,
                        reason: source.to_string(),
                    });
                }
            },
        }
    }

    Ok(report)
}

/// Load a template document from disk. See [`load_document`].
pub fn load_file(path: &Path, options: &LoadOptions) -> CoreResult<LoadReport> {
    let xml = fs::read_to_string(path).map_err(CoreError::FileRead)?;
    let report = load_document(&xml, options)?;

    tracing::info!(
        path = %path.display(),
        loaded = report.characteristics.len(),
        skipped = report.skipped.len(),
        "loaded template document"
    );
    Ok(report)
}

/// Write characteristics to disk as a template document, replacing any existing file.
pub fn save_file(
    path: &Path,
    characteristics: &[ImagingObservationCharacteristic],
) -> CoreResult<()> {
    let xml = write_document(characteristics)?;
    fs::write(path, xml).map_err(CoreError::FileWrite)?;

    tracing::info!(
        path = %path.display(),
        saved = characteristics.len(),
        "saved template document"
    );
    Ok(())
}

fn decode_fragment(
    xml: &str,
    strict_terms: bool,
) -> AimTemplateResult<ImagingObservationCharacteristic> {
    let component = ImagingObservationCharacteristic::read_xml(xml)?;
    if strict_terms {
        validate_characteristic(&component)?;
    }
    Ok(component)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aim_template::{AimTemplateError, ValidTerm};
    use tempfile::TempDir;

    const MIXED_DOCUMENT: &str = r#"<ImagingObservation>
<ImagingObservationCharacteristic annotatorConfidence="true"><QuestionType codeValue="RID5" codeMeaning="shape" codingSchemeDesignator="RadLex"/></ImagingObservationCharacteristic>
<ImagingObservationCharacteristic annotatorConfidence="notabool"><QuestionType/></ImagingObservationCharacteristic>
<ImagingObservationCharacteristic annotatorConfidence="false"><QuestionType codeValue="RID6"/></ImagingObservationCharacteristic>
</ImagingObservation>"#;

    fn options(policy: LoadPolicy, strict_terms: bool) -> LoadOptions {
        LoadOptions {
            policy,
            strict_terms,
        }
    }

    #[test]
    fn load_policy_parses_case_insensitively() {
        assert_eq!("abort".parse::<LoadPolicy>().unwrap(), LoadPolicy::Abort);
        assert_eq!(" SKIP ".parse::<LoadPolicy>().unwrap(), LoadPolicy::Skip);

        let err = "retry".parse::<LoadPolicy>().expect_err("should reject");
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg.contains("retry")));
    }

    #[test]
    fn abort_policy_fails_on_first_bad_characteristic() {
        let err = load_document(MIXED_DOCUMENT, &options(LoadPolicy::Abort, false))
            .expect_err("should abort");
        match err {
            CoreError::Fragment { position, source } => {
                assert_eq!(position, 1);
                assert!(matches!(source, AimTemplateError::MalformedDocument(_)));
            }
            other => panic!("expected Fragment error, got {other:?}"),
        }
    }

    #[test]
    fn skip_policy_keeps_good_characteristics() {
        let report = load_document(MIXED_DOCUMENT, &options(LoadPolicy::Skip, false))
            .expect("should load");

        assert_eq!(report.characteristics.len(), 2);
        assert!(report.characteristics[0].annotator_confidence());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].position, 1);
        assert!(report.skipped[0].reason.contains("notabool"));
    }

    #[test]
    fn strict_terms_rejects_partial_question_type() {
        let report = load_document(MIXED_DOCUMENT, &options(LoadPolicy::Skip, true))
            .expect("should load");

        // RID6 has no coding scheme, so only the first characteristic survives.
        assert_eq!(report.characteristics.len(), 1);
        let positions: Vec<_> = report.skipped.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 2]);
        assert!(report.skipped[1].reason.contains("codingSchemeDesignator"));
    }

    #[test]
    fn malformed_document_fails_regardless_of_policy() {
        let err = load_document("<ImagingObservation>", &options(LoadPolicy::Skip, false))
            .expect_err("should reject unclosed root");
        assert!(matches!(
            err,
            CoreError::Template(AimTemplateError::MalformedDocument(_))
        ));
    }

    #[test]
    fn save_then_load_file_round_trips() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("shape.xml");

        let mut component = ImagingObservationCharacteristic::new();
        component.set_annotator_confidence(true);
        component.set_question_type(ValidTerm::new("RID5", "shape", "RadLex"));
        let characteristics = vec![component, ImagingObservationCharacteristic::new()];

        save_file(&path, &characteristics).expect("save file");
        let report = load_file(&path, &options(LoadPolicy::Abort, true)).expect("load file");

        assert_eq!(report.characteristics, characteristics);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn load_file_reports_missing_file() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let err = load_file(&temp_dir.path().join("absent.xml"), &LoadOptions::default())
            .expect_err("should fail");
        assert!(matches!(err, CoreError::FileRead(_)));
    }
}
