//! FHIR R4 output side of the hl7-to-fhir pipeline.
//!
//! This crate provides:
//! - wire models for the produced Bundle and its resources
//! - the deterministic message-model-to-Bundle converter
//! - the deterministic plain-text bundle summarizer
//!
//! The wire structs are shaped exactly as FHIR R4 JSON; optional fields are
//! never serialized when absent, so the output only states what the source
//! message contained.

pub mod convert;
pub mod resources;
pub mod summary;

pub use convert::convert;
pub use resources::{
    AllergyIntolerance, Bundle, BundleEntry, CodeableConcept, Coding, ContactPoint, Encounter,
    HumanName, Identifier, Observation, Patient, Period, Quantity, Reference, RelatedPerson,
    Resource,
};
pub use summary::summarize;

/// Errors returned by the `fhir` conversion crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    /// The message model carries neither patient nor encounter data, so the
    /// Bundle would be semantically empty.
    #[error("message has no convertible content: {0}")]
    EmptyMessage(String),

    #[error("failed to serialise bundle: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
