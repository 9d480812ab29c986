//! Single-pass construction of the message model from tokenized segments.
//!
//! Dispatch is a fixed code-to-rule `match`; segment codes with no rule are
//! recorded as skipped and never abort the build. Field extraction is
//! best-effort throughout: a composite field missing sub-components
//! degrades to a partial fill.

use crate::model::{
    Allergy, Clinician, Encounter, EventInfo, MessageHeader, MessageModel, NextOfKin, Observation,
    Order, OrderGroup, Patient, SkipReason, SkippedSegment,
};
use crate::tokenizer::{Delimiters, RawMessage, Segment};

/// Build a [`MessageModel`] from a tokenized message.
///
/// Never fails: unknown segment types and unparseable lines become
/// [`SkippedSegment`] records, OBX segments with no preceding OBR land in
/// the orphan list for the validator to flag.
pub fn build(raw: &RawMessage) -> MessageModel {
    let delims = raw.delimiters;
    let mut model = MessageModel::default();

    for (index, segment) in raw.segments.iter().enumerate() {
        match segment.code.as_str() {
            "MSH" => model.header = Some(parse_msh(segment, delims)),
            "PID" => model.patient = Some(parse_pid(segment, delims)),
            "PV1" => model.encounter = Some(parse_pv1(segment, delims)),
            "EVN" => model.event = Some(parse_evn(segment)),
            "NK1" => model.next_of_kin.push(parse_nk1(segment, delims)),
            "AL1" => model.allergies.push(parse_al1(segment, delims)),
            "OBR" => model.orders.push(OrderGroup {
                order: parse_obr(segment, delims),
                observations: Vec::new(),
            }),
            "OBX" => {
                let obs = parse_obx(segment, delims);
                match model.orders.last_mut() {
                    Some(group) => group.observations.push(obs),
                    None => model.orphan_observations.push(obs),
                }
            }
            _ => {
                let reason = if segment.has_wellformed_code() {
                    tracing::debug!(code = %segment.code, index, "skipping unsupported segment");
                    SkipReason::UnsupportedType
                } else {
                    tracing::warn!(code = %segment.code, index, "skipping unparseable line");
                    SkipReason::UnparseableLine
                };
                model.skipped.push(SkippedSegment {
                    index,
                    code: segment.code.clone(),
                    reason,
                });
            }
        }
    }

    model
}

/// Nth component of a composite field, empty treated as absent.
fn component(field: &str, delims: Delimiters, idx: usize) -> Option<String> {
    field
        .split(delims.component)
        .nth(idx)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
}

/// First component, falling back to the whole field for non-composites.
fn first_component(field: &str, delims: Delimiters) -> Option<String> {
    component(field, delims, 0)
}

fn parse_msh(seg: &Segment, delims: Delimiters) -> MessageHeader {
    // MSH field numbering is shifted: the separator itself is MSH-1, so
    // MSH-9 (message type) sits at index 8.
    let msg_type_field = seg.field(8);

    MessageHeader {
        delimiters: delims,
        sending_application: seg.field(2).map(str::to_owned),
        sending_facility: seg.field(3).map(str::to_owned),
        receiving_application: seg.field(4).map(str::to_owned),
        receiving_facility: seg.field(5).map(str::to_owned),
        message_time: seg.field(6).map(str::to_owned),
        message_type: msg_type_field.and_then(|f| first_component(f, delims)),
        trigger_event: msg_type_field.and_then(|f| component(f, delims, 1)),
        control_id: seg.field(9).map(str::to_owned),
        processing_id: seg.field(10).map(str::to_owned),
        version_id: seg.field(11).map(str::to_owned),
    }
}

fn parse_pid(seg: &Segment, delims: Delimiters) -> Patient {
    let name = seg.field(5);

    Patient {
        mrn: seg.field(3).and_then(|f| first_component(f, delims)),
        family: name.and_then(|f| first_component(f, delims)),
        given: name.and_then(|f| component(f, delims, 1)),
        birth_date: seg.field(7).map(str::to_owned),
        gender: seg.field(8).map(str::to_owned),
        address: seg.field(11).map(|f| address_display(f, delims)),
        phone: seg.field(13).and_then(|f| first_component(f, delims)),
    }
}

/// Render a composite XAD address as one display line, dropping empty
/// components.
fn address_display(field: &str, delims: Delimiters) -> String {
    field
        .split(delims.component)
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_clinician(field: &str, delims: Delimiters) -> Clinician {
    Clinician {
        id: first_component(field, delims),
        family: component(field, delims, 1),
        given: component(field, delims, 2),
    }
}

fn parse_pv1(seg: &Segment, delims: Delimiters) -> Encounter {
    Encounter {
        patient_class: seg.field(2).map(str::to_owned),
        location: seg.field(3).and_then(|f| first_component(f, delims)),
        attending: seg.field(7).map(|f| parse_clinician(f, delims)),
        hospital_service: seg.field(10).map(str::to_owned),
        visit_number: seg.field(19).and_then(|f| first_component(f, delims)),
        admit_time: seg.field(44).map(str::to_owned),
        discharge_time: seg.field(45).map(str::to_owned),
    }
}

fn parse_evn(seg: &Segment) -> EventInfo {
    EventInfo {
        event_type: seg.field(1).map(str::to_owned),
        recorded_time: seg.field(2).map(str::to_owned),
        occurred_time: seg.field(6).map(str::to_owned),
    }
}

fn parse_nk1(seg: &Segment, delims: Delimiters) -> NextOfKin {
    let name = seg.field(2);
    let relationship = seg.field(3);

    NextOfKin {
        family: name.and_then(|f| first_component(f, delims)),
        given: name.and_then(|f| component(f, delims, 1)),
        relationship_code: relationship.and_then(|f| first_component(f, delims)),
        relationship_text: relationship.and_then(|f| component(f, delims, 1)),
        phone: seg.field(5).and_then(|f| first_component(f, delims)),
    }
}

fn parse_al1(seg: &Segment, delims: Delimiters) -> Allergy {
    let substance = seg.field(3);

    Allergy {
        substance_code: substance.and_then(|f| first_component(f, delims)),
        substance_text: substance.and_then(|f| component(f, delims, 1)),
        severity_code: seg.field(4).and_then(|f| first_component(f, delims)),
        reaction: seg.field(5).and_then(|f| first_component(f, delims)),
    }
}

fn parse_obr(seg: &Segment, delims: Delimiters) -> Order {
    let service = seg.field(4);

    Order {
        placer_order_number: seg.field(2).and_then(|f| first_component(f, delims)),
        filler_order_number: seg.field(3).and_then(|f| first_component(f, delims)),
        service_code: service.and_then(|f| first_component(f, delims)),
        service_text: service.and_then(|f| component(f, delims, 1)),
        observation_time: seg.field(7).map(str::to_owned),
        ordering_provider: seg.field(16).map(|f| parse_clinician(f, delims)),
    }
}

fn parse_obx(seg: &Segment, delims: Delimiters) -> Observation {
    let id_field = seg.field(3);

    Observation {
        value_type: seg.field(2).map(str::to_owned),
        code: id_field.and_then(|f| first_component(f, delims)),
        text: id_field.and_then(|f| component(f, delims, 1)),
        value: seg.field(5).map(str::to_owned),
        unit: seg.field(6).and_then(|f| first_component(f, delims)),
        reference_range: seg.field(7).map(str::to_owned),
        abnormal_flag: seg.field(8).and_then(|f| first_component(f, delims)),
    }
}
