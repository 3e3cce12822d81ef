//! Annotation characteristics.
//!
//! An annotation characteristic is one typed attribute of a clinical observation attached to an
//! image annotation; for example the *shape* of a lesion, answered with a term drawn from a
//! controlled vocabulary. The template base type is modelled as the [`AnnotationCharacteristic`]
//! trait, and [`ImagingObservationCharacteristic`] is its concrete imaging-observation variant.
//!
//! # Wire shape
//!
//! ```xml
//! <ImagingObservationCharacteristic label="Shape" itemNumber="2" annotatorConfidence="true">
//!   <AllowedTerm codeValue="RID5800" codeMeaning="round" codingSchemeDesignator="RadLex"/>
//!   <QuestionType codeValue="RID5" codeMeaning="shape" codingSchemeDesignator="RadLex"/>
//! </ImagingObservationCharacteristic>
//! ```
//!
//! - `annotatorConfidence` is always written, as `true` or `false`.
//! - `QuestionType` is always written, as `<QuestionType/>` when the term is unset.
//! - The common template metadata attributes are written only when set, before
//!   `annotatorConfidence`; `AllowedTerm` elements come before `QuestionType`.

use crate::valid_term::ValidTerm;
use crate::xml;
use crate::AimTemplateResult;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Lower and upper bound on how many answers a characteristic takes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cardinality {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

/// Behaviour shared by every template characteristic.
///
/// Implementors are wire structs: [`read_characteristic`] and [`write_characteristic`] map them
/// to and from XML using [`AnnotationCharacteristic::ELEMENT_NAME`] as the root element.
pub trait AnnotationCharacteristic: Serialize + DeserializeOwned {
    /// Case-sensitive element name of this characteristic.
    const ELEMENT_NAME: &'static str;

    fn label(&self) -> Option<&str>;

    fn cardinality(&self) -> Cardinality;

    /// Terms a reader may choose from when answering this characteristic.
    fn allowed_terms(&self) -> &[ValidTerm];

    /// Term classifying the question this characteristic answers, if the variant has one.
    fn question_type(&self) -> Option<&ValidTerm> {
        None
    }
}

/// Read any characteristic from an XML fragment rooted at its element name.
///
/// # Errors
///
/// Returns [`crate::AimTemplateError::MalformedDocument`] if:
/// - the root element is not `C::ELEMENT_NAME`,
/// - a required attribute is missing or has an invalid value,
/// - an unknown attribute or child element is present.
pub fn read_characteristic<C>(xml: &str) -> AimTemplateResult<C>
where
    C: AnnotationCharacteristic,
{
    xml::decode(xml, C::ELEMENT_NAME)
}

/// Write any characteristic as an XML fragment rooted at its element name.
pub fn write_characteristic<C>(component: &C) -> AimTemplateResult<String>
where
    C: AnnotationCharacteristic,
{
    xml::encode(component, C::ELEMENT_NAME)
}

/// An imaging observation characteristic.
///
/// Setters perform no validation: a partially filled or empty question type is accepted while a
/// characteristic is being authored. Use [`crate::validation::validate_characteristic`] before
/// treating one as complete.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ImagingObservationCharacteristic {
    #[serde(rename = "@label", default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,

    #[serde(rename = "@itemNumber", default, skip_serializing_if = "Option::is_none")]
    item_number: Option<u32>,

    #[serde(rename = "@authors", default, skip_serializing_if = "Option::is_none")]
    authors: Option<String>,

    #[serde(
        rename = "@explanatoryText",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    explanatory_text: Option<String>,

    #[serde(rename = "@minCardinality", default, skip_serializing_if = "Option::is_none")]
    min_cardinality: Option<u32>,

    #[serde(rename = "@maxCardinality", default, skip_serializing_if = "Option::is_none")]
    max_cardinality: Option<u32>,

    #[serde(
        rename = "@shouldDisplay",
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::boolean::optional"
    )]
    should_display: Option<bool>,

    #[serde(rename = "@groupLabel", default, skip_serializing_if = "Option::is_none")]
    group_label: Option<String>,

    #[serde(rename = "@annotatorConfidence", with = "crate::boolean::required")]
    annotator_confidence: bool,

    #[serde(rename = "AllowedTerm", default, skip_serializing_if = "Vec::is_empty")]
    allowed_terms: Vec<ValidTerm>,

    #[serde(rename = "QuestionType", default)]
    question_type: ValidTerm,
}

impl ImagingObservationCharacteristic {
    /// Creates a characteristic with `annotatorConfidence = false` and an unset question type.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn annotator_confidence(&self) -> bool {
        self.annotator_confidence
    }

    pub fn set_annotator_confidence(&mut self, annotator_confidence: bool) {
        self.annotator_confidence = annotator_confidence;
    }

    pub fn question_type(&self) -> &ValidTerm {
        &self.question_type
    }

    /// Replaces the question type. Any term is accepted, including an empty one.
    pub fn set_question_type(&mut self, question_type: ValidTerm) {
        self.question_type = question_type;
    }

    pub fn question_type_mut(&mut self) -> &mut ValidTerm {
        &mut self.question_type
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    pub fn item_number(&self) -> Option<u32> {
        self.item_number
    }

    pub fn set_item_number(&mut self, item_number: Option<u32>) {
        self.item_number = item_number;
    }

    pub fn authors(&self) -> Option<&str> {
        self.authors.as_deref()
    }

    pub fn set_authors(&mut self, authors: Option<String>) {
        self.authors = authors;
    }

    pub fn explanatory_text(&self) -> Option<&str> {
        self.explanatory_text.as_deref()
    }

    pub fn set_explanatory_text(&mut self, explanatory_text: Option<String>) {
        self.explanatory_text = explanatory_text;
    }

    pub fn set_cardinality(&mut self, cardinality: Cardinality) {
        self.min_cardinality = cardinality.min;
        self.max_cardinality = cardinality.max;
    }

    pub fn should_display(&self) -> Option<bool> {
        self.should_display
    }

    pub fn set_should_display(&mut self, should_display: Option<bool>) {
        self.should_display = should_display;
    }

    pub fn group_label(&self) -> Option<&str> {
        self.group_label.as_deref()
    }

    pub fn set_group_label(&mut self, group_label: Option<String>) {
        self.group_label = group_label;
    }

    pub fn add_allowed_term(&mut self, term: ValidTerm) {
        self.allowed_terms.push(term);
    }

    /// Convert this characteristic to its XML fragment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AimTemplateError::Serialization`] if the XML writer fails.
    pub fn write_xml(&self) -> AimTemplateResult<String> {
        write_characteristic(self)
    }

    /// Read an `ImagingObservationCharacteristic` fragment from XML.
    ///
    /// An absent `QuestionType` element decodes to an unset term. Namespace declarations are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AimTemplateError::MalformedDocument`] if:
    /// - the root element is not `ImagingObservationCharacteristic`,
    /// - `annotatorConfidence` is missing or not a boolean token,
    /// - `QuestionType` is present but not a valid term encoding.
    pub fn read_xml(xml: &str) -> AimTemplateResult<Self> {
        read_characteristic(xml)
    }
}

impl AnnotationCharacteristic for ImagingObservationCharacteristic {
    const ELEMENT_NAME: &'static str = "ImagingObservationCharacteristic";

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality {
            min: self.min_cardinality,
            max: self.max_cardinality,
        }
    }

    fn allowed_terms(&self) -> &[ValidTerm] {
        &self.allowed_terms
    }

    fn question_type(&self) -> Option<&ValidTerm> {
        Some(&self.question_type)
    }
}
