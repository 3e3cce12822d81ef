//! Controlled-vocabulary terms.
//!
//! A [`ValidTerm`] is the wire representation of a coded concept: a code value drawn from a
//! coding scheme (for example RadLex or SNOMED CT), its human-readable meaning, and optionally
//! the scheme version. Terms may carry nested synonym terms, written as child `ValidTerm`
//! elements.
//!
//! # Wire shape
//!
//! ```xml
//! <QuestionType codeValue="RID5" codeMeaning="shape" codingSchemeDesignator="RadLex">
//!   <ValidTerm codeValue="C25681" codeMeaning="form" codingSchemeDesignator="NCIt"/>
//! </QuestionType>
//! ```
//!
//! The element name belongs to the owner of the term (`QuestionType`, `AllowedTerm`, ...); a
//! term only decides its attributes and children.
//!
//! Every attribute is optional on the wire so that unset terms survive a round trip as an empty
//! element. Well-formedness is checked separately: see [`ValidTerm::is_well_formed`] and
//! [`CodedTerm`].

use crate::AimTemplateError;
use aim_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire representation of a controlled-vocabulary term.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ValidTerm {
    #[serde(rename = "@codeValue", default, skip_serializing_if = "Option::is_none")]
    pub code_value: Option<String>,

    #[serde(rename = "@codeMeaning", default, skip_serializing_if = "Option::is_none")]
    pub code_meaning: Option<String>,

    #[serde(
        rename = "@codingSchemeDesignator",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub coding_scheme_designator: Option<String>,

    #[serde(
        rename = "@codingSchemeVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub coding_scheme_version: Option<String>,

    /// Synonym terms, written as nested `ValidTerm` elements.
    #[serde(rename = "ValidTerm", default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<ValidTerm>,
}

impl ValidTerm {
    /// Creates a term from its three core fields.
    pub fn new(
        code_value: impl Into<String>,
        code_meaning: impl Into<String>,
        coding_scheme_designator: impl Into<String>,
    ) -> Self {
        Self {
            code_value: Some(code_value.into()),
            code_meaning: Some(code_meaning.into()),
            coding_scheme_designator: Some(coding_scheme_designator.into()),
            coding_scheme_version: None,
            synonyms: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.coding_scheme_version = Some(version.into());
        self
    }

    pub fn push_synonym(&mut self, synonym: ValidTerm) {
        self.synonyms.push(synonym);
    }

    /// Returns `true` if no field is set and there are no synonyms.
    ///
    /// An empty term is the unset state of a term-valued field.
    pub fn is_empty(&self) -> bool {
        self.code_value.is_none()
            && self.code_meaning.is_none()
            && self.coding_scheme_designator.is_none()
            && self.coding_scheme_version.is_none()
            && self.synonyms.is_empty()
    }

    /// Returns `true` if the code value and coding scheme designator are non-blank and every
    /// synonym is well formed as well.
    pub fn is_well_formed(&self) -> bool {
        CodedTerm::try_from(self).is_ok()
    }
}

impl fmt::Display for ValidTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("<unset>");
        }

        let scheme = self.coding_scheme_designator.as_deref().unwrap_or("?");
        let code = self.code_value.as_deref().unwrap_or("?");
        write!(f, "{scheme}:{code}")?;
        if let Some(meaning) = self.code_meaning.as_deref() {
            write!(f, " ({meaning})")?;
        }
        Ok(())
    }
}

/// A validated, well-formed controlled-vocabulary term.
///
/// Built from a [`ValidTerm`] with `TryFrom`; construction fails with
/// [`AimTemplateError::InvalidTerm`] naming the first missing field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodedTerm {
    pub code_value: NonEmptyText,
    pub coding_scheme_designator: NonEmptyText,
    pub code_meaning: Option<String>,
    pub coding_scheme_version: Option<String>,
    pub synonyms: Vec<CodedTerm>,
}

impl CodedTerm {
    fn required(
        value: Option<&str>,
        attribute: &str,
        term: &ValidTerm,
    ) -> Result<NonEmptyText, AimTemplateError> {
        value
            .and_then(|v| NonEmptyText::new(v).ok())
            .ok_or_else(|| {
                AimTemplateError::InvalidTerm(format!("{attribute} is required ({term})"))
            })
    }
}

impl TryFrom<&ValidTerm> for CodedTerm {
    type Error = AimTemplateError;

    fn try_from(term: &ValidTerm) -> Result<Self, Self::Error> {
        let code_value = Self::required(term.code_value.as_deref(), "codeValue", term)?;
        let coding_scheme_designator = Self::required(
            term.coding_scheme_designator.as_deref(),
            "codingSchemeDesignator",
            term,
        )?;
        let synonyms = term
            .synonyms
            .iter()
            .map(CodedTerm::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            code_value,
            coding_scheme_designator,
            code_meaning: term.code_meaning.clone(),
            coding_scheme_version: term.coding_scheme_version.clone(),
            synonyms,
        })
    }
}

impl From<CodedTerm> for ValidTerm {
    fn from(term: CodedTerm) -> Self {
        Self {
            code_value: Some(term.code_value.into_inner()),
            code_meaning: term.code_meaning,
            coding_scheme_designator: Some(term.coding_scheme_designator.into_inner()),
            coding_scheme_version: term.coding_scheme_version,
            synonyms: term.synonyms.into_iter().map(ValidTerm::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_term_is_empty_and_not_well_formed() {
        let term = ValidTerm::default();
        assert!(term.is_empty());
        assert!(!term.is_well_formed());
        assert_eq!(term.to_string(), "<unset>");
    }

    #[test]
    fn new_term_is_well_formed() {
        let term = ValidTerm::new("RID5", "shape", "RadLex").with_version("3.2");
        assert!(!term.is_empty());
        assert!(term.is_well_formed());
        assert_eq!(term.to_string(), "RadLex:RID5 (shape)");
    }

    #[test]
    fn blank_coding_scheme_is_rejected() {
        let term = ValidTerm::new("RID5", "shape", "  ");
        let err = CodedTerm::try_from(&term).expect_err("should reject blank scheme");
        assert!(
            matches!(err, AimTemplateError::InvalidTerm(msg) if msg.contains("codingSchemeDesignator"))
        );
    }

    #[test]
    fn meaning_only_term_is_not_empty_but_not_well_formed() {
        let term = ValidTerm {
            code_meaning: Some("shape".into()),
            ..ValidTerm::default()
        };
        assert!(!term.is_empty());
        let err = CodedTerm::try_from(&term).expect_err("should reject missing code value");
        assert!(matches!(err, AimTemplateError::InvalidTerm(msg) if msg.contains("codeValue")));
    }

    #[test]
    fn malformed_synonym_makes_term_malformed() {
        let mut term = ValidTerm::new("RID5", "shape", "RadLex");
        term.push_synonym(ValidTerm::new("C25681", "form", "NCIt"));
        assert!(term.is_well_formed());

        term.push_synonym(ValidTerm {
            code_value: Some("orphan".into()),
            ..ValidTerm::default()
        });
        assert!(!term.is_well_formed());
    }

    #[test]
    fn coded_term_converts_back_to_wire_term() {
        let mut term = ValidTerm::new(" RID5 ", "shape", "RadLex");
        term.push_synonym(ValidTerm::new("C25681", "form", "NCIt"));

        let coded = CodedTerm::try_from(&term).expect("well formed");
        assert_eq!(coded.code_value.as_str(), "RID5");

        let back = ValidTerm::from(coded);
        assert_eq!(back.code_value.as_deref(), Some("RID5"));
        assert_eq!(back.synonyms, term.synonyms);
    }
}
