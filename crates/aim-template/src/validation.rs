//! Template validation.
//!
//! Decoding only checks structure. The functions here check the semantic rules a complete
//! characteristic must satisfy, and are applied by loaders that run in strict mode.

use crate::characteristic::AnnotationCharacteristic;
use crate::valid_term::{CodedTerm, ValidTerm};
use crate::{AimTemplateError, AimTemplateResult};

/// Validates that a term is a well-formed controlled-vocabulary term.
///
/// # Errors
///
/// Returns [`AimTemplateError::InvalidTerm`] if the code value or coding scheme designator is
/// missing or blank, on the term or any of its synonyms.
pub fn validate_term(term: &ValidTerm) -> AimTemplateResult<()> {
    CodedTerm::try_from(term).map(|_| ())
}

/// Validates a characteristic against the template rules.
///
/// - A question type that is set must be well formed; an unset one is accepted.
/// - Every allowed term must be well formed.
/// - `minCardinality` must not exceed `maxCardinality` when both are set.
///
/// # Errors
///
/// Returns [`AimTemplateError::InvalidTerm`] for a malformed term and
/// [`AimTemplateError::InvalidCharacteristic`] for inverted cardinality bounds.
pub fn validate_characteristic<C>(component: &C) -> AimTemplateResult<()>
where
    C: AnnotationCharacteristic,
{
    let label = component.label().unwrap_or(C::ELEMENT_NAME);

    if let Some(question_type) = component.question_type() {
        if !question_type.is_empty() {
            validate_term(question_type).map_err(|err| prefixed(label, "QuestionType", err))?;
        }
    }

    for (index, term) in component.allowed_terms().iter().enumerate() {
        validate_term(term).map_err(|err| prefixed(label, &format!("AllowedTerm[{index}]"), err))?;
    }

    let cardinality = component.cardinality();
    if let (Some(min), Some(max)) = (cardinality.min, cardinality.max) {
        if min > max {
            return Err(AimTemplateError::InvalidCharacteristic(format!(
                "{label}: minCardinality {min} exceeds maxCardinality {max}"
            )));
        }
    }

    Ok(())
}

fn prefixed(label: &str, field: &str, err: AimTemplateError) -> AimTemplateError {
    match err {
        AimTemplateError::InvalidTerm(msg) => {
            AimTemplateError::InvalidTerm(format!("{label}.{field}: {msg}"))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cardinality, ImagingObservationCharacteristic};

    #[test]
    fn validate_term_accepts_well_formed_term() {
        assert!(validate_term(&ValidTerm::new("RID5", "shape", "RadLex")).is_ok());
    }

    #[test]
    fn validate_term_rejects_empty_term() {
        let err = validate_term(&ValidTerm::default()).expect_err("should reject empty term");
        assert!(matches!(err, AimTemplateError::InvalidTerm(msg) if msg.contains("codeValue")));
    }

    #[test]
    fn unset_question_type_is_accepted() {
        let component = ImagingObservationCharacteristic::new();
        assert!(validate_characteristic(&component).is_ok());
    }

    #[test]
    fn partial_question_type_is_rejected() {
        let mut component = ImagingObservationCharacteristic::new();
        component.set_label(Some("Shape".into()));
        component.question_type_mut().code_value = Some("RID5".into());

        let err = validate_characteristic(&component).expect_err("should reject partial term");
        match err {
            AimTemplateError::InvalidTerm(msg) => {
                assert!(msg.starts_with("Shape.QuestionType"), "{msg}");
                assert!(msg.contains("codingSchemeDesignator"), "{msg}");
            }
            other => panic!("expected InvalidTerm error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_allowed_term_is_rejected_with_index() {
        let mut component = ImagingObservationCharacteristic::new();
        component.add_allowed_term(ValidTerm::new("RID5800", "round", "RadLex"));
        component.add_allowed_term(ValidTerm::new("", "oval", "RadLex"));

        let err = validate_characteristic(&component).expect_err("should reject allowed term");
        assert!(
            matches!(err, AimTemplateError::InvalidTerm(msg) if msg.contains("AllowedTerm[1]"))
        );
    }

    #[test]
    fn inverted_cardinality_is_rejected() {
        let mut component = ImagingObservationCharacteristic::new();
        component.set_cardinality(Cardinality {
            min: Some(3),
            max: Some(1),
        });

        let err = validate_characteristic(&component).expect_err("should reject cardinality");
        assert!(matches!(
            err,
            AimTemplateError::InvalidCharacteristic(msg) if msg.contains("exceeds maxCardinality")
        ));
    }

    #[test]
    fn open_upper_bound_is_accepted() {
        let mut component = ImagingObservationCharacteristic::new();
        component.set_cardinality(Cardinality {
            min: Some(2),
            max: None,
        });
        assert!(validate_characteristic(&component).is_ok());
    }
}
