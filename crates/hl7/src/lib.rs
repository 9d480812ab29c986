//! HL7 v2 message parsing for the hl7-to-fhir pipeline.
//!
//! This crate owns the first half of the pipeline:
//! - tokenizer: raw-text normalization and segment/field splitting
//! - model: the immutable in-memory message model
//! - builder: single-pass construction of the model from segments
//! - validate: pure conformance checks over the built model
//!
//! Parsing is tolerant by design. Unknown or unparseable segments are
//! recorded as skipped and never abort the parse; the only hard failure is
//! an MSH segment that cannot supply the delimiter set, because nothing
//! else can be split without it.

pub mod builder;
pub mod model;
pub mod tokenizer;
pub mod validate;

pub use builder::build;
pub use model::{
    Allergy, Clinician, Encounter, EventInfo, MessageHeader, MessageModel, NextOfKin, Observation,
    Order, OrderGroup, Patient, SkipReason, SkippedSegment,
};
pub use tokenizer::{tokenize, Delimiters, RawMessage, Segment};
pub use validate::{validate, Finding, FindingCode, Severity};

/// Errors returned by the `hl7` parsing crate.
///
/// Only structural failures surface here; everything else degrades into
/// skip records or validation findings.
#[derive(Debug, thiserror::Error)]
pub enum Hl7Error {
    #[error("no usable MSH segment: {0}")]
    MissingHeader(String),
}

/// Type alias for Results that can fail with a [`Hl7Error`].
pub type Hl7Result<T> = Result<T, Hl7Error>;

/// Parse raw HL7 text into a [`MessageModel`].
///
/// This is the tokenize-then-build entry point the rest of the pipeline
/// consumes.
///
/// # Errors
///
/// Returns [`Hl7Error::MissingHeader`] if the message carries no MSH
/// segment, or an MSH segment too short to declare a field separator.
pub fn parse_message(text: &str) -> Hl7Result<MessageModel> {
    let raw = tokenizer::tokenize(text)?;
    Ok(builder::build(&raw))
}
