//! AIM annotation template wire support.
//!
//! This crate is responsible for translating between persisted annotation template XML and the
//! in-memory template object model: controlled-vocabulary terms ([`ValidTerm`]) and the
//! characteristics built from them ([`ImagingObservationCharacteristic`]).
//!
//! Loading policy (abort or skip on a bad fragment), authoring sessions and presentation live in
//! `aim-core`. This crate handles the element and attribute mapping only.

mod boolean;
pub mod characteristic;
pub mod document;
pub mod validation;
pub mod valid_term;
mod xml;

pub use characteristic::{AnnotationCharacteristic, Cardinality, ImagingObservationCharacteristic};
pub use document::{Fragment, DOCUMENT_ROOT};
pub use valid_term::{CodedTerm, ValidTerm};

use thiserror::Error;

/// Errors returned by the `aim-template` crate.
#[derive(Debug, Error)]
pub enum AimTemplateError {
    /// The XML could not be decoded into the expected element shape.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("invalid term: {0}")]
    InvalidTerm(String),

    #[error("invalid characteristic: {0}")]
    InvalidCharacteristic(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Type alias for Results that can fail with an [`AimTemplateError`].
pub type AimTemplateResult<T> = Result<T, AimTemplateError>;
