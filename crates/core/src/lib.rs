//! # hl7-to-fhir core
//!
//! Facade over the HL7 parsing and FHIR conversion crates. This is the
//! surface external collaborators (CLI, HTTP service, narrative summarizer)
//! consume; they never reach into the stage crates directly.
//!
//! The pipeline is stateless and synchronous: every entry point is a pure
//! function from an immutable input to a new immutable output, so
//! independent conversions may run on independent threads with no
//! coordination.
//!
//! Entry points:
//! - [`parse_message`]: raw text to message model, or a structural error
//! - [`validate`]: message model to findings, never fails
//! - [`convert`]: message model to FHIR Bundle, or a structural error
//! - [`summarize`]: Bundle to deterministic plain text
//! - [`process`]: all four in sequence, for callers that want one call

pub use fhir::{Bundle, FhirError};
pub use hl7::{Finding, FindingCode, Hl7Error, MessageModel, Severity};

/// Errors surfaced by the pipeline entry points.
///
/// Only the two structural cases appear here: an unusable MSH header and a
/// message with nothing to convert. Tolerated anomalies stay inside the
/// model as skip records; validation findings are data, not errors.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] Hl7Error),

    #[error(transparent)]
    Convert(#[from] FhirError),
}

/// Type alias for Results that can fail with a [`PipelineError`].
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Everything the pipeline produces for one message.
#[derive(Clone, Debug)]
pub struct ProcessedMessage {
    pub model: MessageModel,
    pub findings: Vec<Finding>,
    pub bundle: Bundle,
    pub summary: String,
}

impl ProcessedMessage {
    /// Whether validation produced any error-severity finding. The pipeline
    /// itself never blocks on this; callers decide.
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }
}

/// Parse raw HL7 text into the message model.
///
/// # Errors
///
/// Returns [`PipelineError::Parse`] when the MSH header cannot supply the
/// delimiter set; every other input irregularity degrades into the model.
pub fn parse_message(text: &str) -> PipelineResult<MessageModel> {
    let model = hl7::parse_message(text)?;
    tracing::debug!(
        segments_skipped = model.skipped.len(),
        observations = model.observations().count(),
        "parsed HL7 message"
    );
    Ok(model)
}

/// Run the validation battery over a message model.
///
/// Always returns the full finding list, empty when the model is clean.
pub fn validate(model: &MessageModel) -> Vec<Finding> {
    hl7::validate(model)
}

/// Convert a message model into a FHIR R4 collection Bundle.
///
/// # Errors
///
/// Returns [`PipelineError::Convert`] when the model carries neither
/// patient nor encounter data.
pub fn convert(model: &MessageModel) -> PipelineResult<Bundle> {
    let bundle = fhir::convert(model)?;
    tracing::debug!(entries = bundle.entry.len(), "converted to FHIR bundle");
    Ok(bundle)
}

/// Render the deterministic plain-text summary of a Bundle.
pub fn summarize(bundle: &Bundle) -> String {
    fhir::summarize(bundle)
}

/// Run the whole pipeline on one message.
///
/// Validation findings never abort processing; the only failure modes are
/// the structural errors of [`parse_message`] and [`convert`].
pub fn process(text: &str) -> PipelineResult<ProcessedMessage> {
    let model = parse_message(text)?;
    let findings = validate(&model);
    let bundle = convert(&model)?;
    let summary = summarize(&bundle);

    Ok(ProcessedMessage {
        model,
        findings,
        bundle,
        summary,
    })
}

/// Serialize a finding list as a JSON report for external consumers.
///
/// # Errors
///
/// Returns the underlying serialization error, which for this data shape
/// does not occur in practice.
pub fn findings_to_json(findings: &[Finding]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(findings)
}
