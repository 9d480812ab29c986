//! The in-memory message model.
//!
//! Everything here is a value: built once by the builder in a single pass
//! and immutable afterwards. The converter and validator only read these
//! types. All structs serialize so callers can emit the parsed intermediate
//! as JSON.

use crate::tokenizer::Delimiters;
use serde::Serialize;

/// MSH contents: the delimiter set plus message envelope fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageHeader {
    pub delimiters: Delimiters,
    pub sending_application: Option<String>,
    pub sending_facility: Option<String>,
    pub receiving_application: Option<String>,
    pub receiving_facility: Option<String>,
    /// MSH-7 message datetime, raw HL7 TS text.
    pub message_time: Option<String>,
    /// MSH-9 first component, e.g. `ADT`.
    pub message_type: Option<String>,
    /// MSH-9 second component, e.g. `A01`.
    pub trigger_event: Option<String>,
    pub control_id: Option<String>,
    pub processing_id: Option<String>,
    pub version_id: Option<String>,
}

/// PID contents. MRN presence is a validation concern, not a construction
/// one: the model builds fine without it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Patient {
    /// First component of PID-3.
    pub mrn: Option<String>,
    pub family: Option<String>,
    pub given: Option<String>,
    /// PID-7, raw HL7 TS text.
    pub birth_date: Option<String>,
    /// PID-8 administrative sex code, carried verbatim.
    pub gender: Option<String>,
    /// PID-11 rendered as display text.
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// An identified clinician, e.g. PV1-7 attending or OBR-16 orderer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Clinician {
    pub id: Option<String>,
    pub family: Option<String>,
    pub given: Option<String>,
}

impl Clinician {
    /// Human-readable `Given Family` display, if any name part is present.
    pub fn display(&self) -> Option<String> {
        match (&self.given, &self.family) {
            (Some(g), Some(f)) => Some(format!("{g} {f}")),
            (Some(g), None) => Some(g.clone()),
            (None, Some(f)) => Some(f.clone()),
            (None, None) => None,
        }
    }
}

/// PV1 contents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Encounter {
    /// PV1-2 patient class code (I/O/E...), carried verbatim.
    pub patient_class: Option<String>,
    /// PV1-3 first component (point of care).
    pub location: Option<String>,
    pub attending: Option<Clinician>,
    pub hospital_service: Option<String>,
    pub visit_number: Option<String>,
    /// PV1-44, raw HL7 TS text.
    pub admit_time: Option<String>,
    /// PV1-45, raw HL7 TS text.
    pub discharge_time: Option<String>,
}

/// EVN contents. Informational; recommended for ADT messages but never
/// required to build an encounter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EventInfo {
    pub event_type: Option<String>,
    /// EVN-2, raw HL7 TS text.
    pub recorded_time: Option<String>,
    /// EVN-6, raw HL7 TS text.
    pub occurred_time: Option<String>,
}

/// One NK1 segment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NextOfKin {
    pub family: Option<String>,
    pub given: Option<String>,
    /// NK1-3 first component, e.g. `SPO`.
    pub relationship_code: Option<String>,
    /// NK1-3 second component, e.g. `Spouse`.
    pub relationship_text: Option<String>,
    pub phone: Option<String>,
}

/// One AL1 segment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Allergy {
    pub substance_code: Option<String>,
    pub substance_text: Option<String>,
    /// AL1-4 severity code (MI/MO/SV), carried verbatim; expansion to
    /// mild/moderate/severe happens at conversion time.
    pub severity_code: Option<String>,
    pub reaction: Option<String>,
}

/// One OBR order header.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Order {
    pub placer_order_number: Option<String>,
    pub filler_order_number: Option<String>,
    pub service_code: Option<String>,
    pub service_text: Option<String>,
    /// OBR-7, raw HL7 TS text.
    pub observation_time: Option<String>,
    pub ordering_provider: Option<Clinician>,
}

/// One OBX observation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Observation {
    /// OBX-2 value type (NM, ST, TX...), carried verbatim.
    pub value_type: Option<String>,
    pub code: Option<String>,
    pub text: Option<String>,
    pub value: Option<String>,
    pub unit: Option<String>,
    /// OBX-7 reference range, raw `low-high` text.
    pub reference_range: Option<String>,
    /// OBX-8 abnormal flag (H/L/HH...), carried verbatim.
    pub abnormal_flag: Option<String>,
}

/// An order header plus the observations that followed it, in input order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrderGroup {
    pub order: Order,
    pub observations: Vec<Observation>,
}

/// Why a segment was recorded as skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// A well-formed segment code with no extraction rule.
    UnsupportedType,
    /// A line that does not look like a segment at all.
    UnparseableLine,
}

/// Record of a segment the builder tolerated rather than parsed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedSegment {
    /// Zero-based position in the segment sequence.
    pub index: usize,
    pub code: String,
    pub reason: SkipReason,
}

/// The fully built message model.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MessageModel {
    pub header: Option<MessageHeader>,
    pub patient: Option<Patient>,
    pub encounter: Option<Encounter>,
    pub event: Option<EventInfo>,
    pub next_of_kin: Vec<NextOfKin>,
    pub allergies: Vec<Allergy>,
    /// OBX segments seen before any OBR. Kept, not dropped; the validator
    /// flags them.
    pub orphan_observations: Vec<Observation>,
    pub orders: Vec<OrderGroup>,
    pub skipped: Vec<SkippedSegment>,
}

impl MessageModel {
    /// Iterate every observation in input order: orphans first (they
    /// preceded the first OBR), then each group's observations.
    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.orphan_observations
            .iter()
            .chain(self.orders.iter().flat_map(|g| g.observations.iter()))
    }

    /// Whether the model is an ADT (admit/discharge/transfer) message.
    pub fn is_adt(&self) -> bool {
        self.header
            .as_ref()
            .and_then(|h| h.message_type.as_deref())
            .map_or(false, |t| t.eq_ignore_ascii_case("ADT"))
    }
}

impl Default for MessageHeader {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            sending_application: None,
            sending_facility: None,
            receiving_application: None,
            receiving_facility: None,
            message_time: None,
            message_type: None,
            trigger_event: None,
            control_id: None,
            processing_id: None,
            version_id: None,
        }
    }
}
