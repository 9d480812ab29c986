//! Conformance checks over the built message model.
//!
//! `validate` is a pure read: it never mutates the model and never blocks
//! conversion. Callers decide whether error-severity findings are fatal.

use crate::model::{MessageModel, Observation};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Finding severity. Errors mark data a downstream consumer cannot trust;
/// warnings mark data it can still use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Stable machine-readable finding codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingCode {
    MissingMsh,
    MissingPid,
    MissingMrn,
    AdtMissingPv1,
    AdtMissingEvn,
    OrphanObservation,
    ObservationNoValue,
    BadTimestamp,
}

impl FindingCode {
    /// Wire name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            FindingCode::MissingMsh => "missing-msh",
            FindingCode::MissingPid => "missing-pid",
            FindingCode::MissingMrn => "missing-mrn",
            FindingCode::AdtMissingPv1 => "adt-missing-pv1",
            FindingCode::AdtMissingEvn => "adt-missing-evn",
            FindingCode::OrphanObservation => "orphan-observation",
            FindingCode::ObservationNoValue => "observation-no-value",
            FindingCode::BadTimestamp => "bad-timestamp",
        }
    }
}

/// One validation finding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub code: FindingCode,
    pub message: String,
}

impl Finding {
    fn error(code: FindingCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    fn warning(code: FindingCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }
}

/// Run the full check battery against a message model.
///
/// Always completes and always returns the flat finding list, empty when
/// the model is clean. Check order is fixed, so the returned list is
/// deterministic for a given model.
pub fn validate(model: &MessageModel) -> Vec<Finding> {
    let mut findings = Vec::new();

    if model.header.is_none() {
        findings.push(Finding::error(
            FindingCode::MissingMsh,
            "missing required segment: MSH",
        ));
    }
    if model.patient.is_none() {
        findings.push(Finding::error(
            FindingCode::MissingPid,
            "missing required segment: PID",
        ));
    }

    if model.is_adt() {
        if model.encounter.is_none() {
            findings.push(Finding::error(
                FindingCode::AdtMissingPv1,
                "ADT message has no PV1 segment",
            ));
        }
        if model.event.is_none() {
            findings.push(Finding::warning(
                FindingCode::AdtMissingEvn,
                "ADT message has no EVN segment",
            ));
        }
    }

    for obs in &model.orphan_observations {
        findings.push(Finding::warning(
            FindingCode::OrphanObservation,
            format!(
                "observation {} appears before any OBR order header",
                obs.code.as_deref().unwrap_or("<uncoded>")
            ),
        ));
    }

    if let Some(patient) = &model.patient {
        if patient.mrn.is_none() {
            findings.push(Finding::error(
                FindingCode::MissingMrn,
                "PID-3 (medical record number) is missing or empty",
            ));
        }
    }

    for obs in model.observations() {
        if !has_value(obs) {
            findings.push(Finding::error(
                FindingCode::ObservationNoValue,
                format!(
                    "observation {} carries neither a numeric nor a text value",
                    obs.code.as_deref().unwrap_or("<uncoded>")
                ),
            ));
        }
    }

    if let Some(encounter) = &model.encounter {
        check_timestamp(&mut findings, "PV1 admit time", encounter.admit_time.as_deref());
        check_timestamp(
            &mut findings,
            "PV1 discharge time",
            encounter.discharge_time.as_deref(),
        );
    }
    if let Some(event) = &model.event {
        check_timestamp(&mut findings, "EVN recorded time", event.recorded_time.as_deref());
    }

    findings
}

fn has_value(obs: &Observation) -> bool {
    obs.value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn check_timestamp(findings: &mut Vec<Finding>, what: &str, ts: Option<&str>) {
    if let Some(ts) = ts {
        if !is_hl7_timestamp(ts) {
            findings.push(Finding::warning(
                FindingCode::BadTimestamp,
                format!("{what} '{ts}' is not a valid HL7 timestamp"),
            ));
        }
    }
}

/// HL7 TS: fixed-width numeric YYYYMMDD, optionally HHMM or HHMMSS, and the
/// digits must form a real calendar date/time.
pub fn is_hl7_timestamp(ts: &str) -> bool {
    if !ts.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match ts.len() {
        8 => NaiveDate::parse_from_str(ts, "%Y%m%d").is_ok(),
        12 => NaiveDateTime::parse_from_str(ts, "%Y%m%d%H%M").is_ok(),
        14 => NaiveDateTime::parse_from_str(ts, "%Y%m%d%H%M%S").is_ok(),
        _ => false,
    }
}
