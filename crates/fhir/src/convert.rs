//! Deterministic message-model-to-Bundle conversion.
//!
//! Construction rules:
//! - exactly one Patient with the fixed id `patient`; every other resource
//!   references it
//! - one Encounter (id `encounter`) iff PV1 data exists
//! - one Observation / RelatedPerson / AllergyIntolerance per model entry,
//!   in input order, with ids numbered from 1
//!
//! Nothing here fabricates data: absent model fields stay absent in the
//! output, malformed timestamps are omitted, and unmapped codes are carried
//! as text or dropped per the fixed lookup tables.

use crate::resources::{
    systems, Address, AllergyIntolerance, AllergyReaction, Bundle, BundleEntry, CodeableConcept,
    Coding, ContactPoint, Encounter, EncounterLocation, EncounterParticipant, HumanName,
    Identifier, Observation, Patient, Period, Quantity, Reference, ReferenceRange, RelatedPerson,
    Resource,
};
use crate::{FhirError, FhirResult};
use chrono::{NaiveDate, NaiveDateTime};
use hl7::MessageModel;

const PATIENT_ID: &str = "patient";
const ENCOUNTER_ID: &str = "encounter";

/// PID-8 administrative sex to FHIR administrative gender.
const GENDER: &[(&str, &str)] = &[
    ("F", "female"),
    ("M", "male"),
    ("O", "other"),
    ("U", "unknown"),
];

/// PV1-2 patient class to v3-ActCode encounter class.
const ENCOUNTER_CLASS: &[(&str, &str)] = &[("I", "IMP"), ("O", "AMB"), ("E", "EMER")];

/// OBX-8 abnormal flags accepted as v3-ObservationInterpretation codes.
const INTERPRETATION_FLAGS: &[&str] = &["H", "L", "HH", "LL", "A", "AA", "N"];

/// HL7 table 0063 relationship to v3-RoleCode (code, role code, display).
const RELATIONSHIP: &[(&str, &str, &str)] = &[
    ("SPO", "SPS", "spouse"),
    ("MTH", "MTH", "mother"),
    ("FTH", "FTH", "father"),
    ("CHD", "CHD", "child"),
    ("SIB", "SIB", "sibling"),
    ("GRD", "GUARD", "guardian"),
    ("FND", "FRND", "friend"),
    ("EMC", "C", "emergency contact"),
];

/// AL1-4 severity expansion.
const SEVERITY: &[(&str, &str)] = &[("MI", "mild"), ("MO", "moderate"), ("SV", "severe")];

/// Convert a built message model into a FHIR R4 collection Bundle.
///
/// Validity is not required: the converter degrades the same way the
/// builder does. The single failure mode is a model with neither patient
/// nor encounter data, which would produce a semantically empty Bundle.
///
/// # Errors
///
/// Returns [`FhirError::EmptyMessage`] when both PID and PV1 data are
/// absent.
pub fn convert(model: &MessageModel) -> FhirResult<Bundle> {
    if model.patient.is_none() && model.encounter.is_none() {
        return Err(FhirError::EmptyMessage(
            "neither PID nor PV1 data is present".into(),
        ));
    }

    let mut entries = Vec::new();

    // The Patient resource is always emitted so that subject references
    // resolve, even when the message only carried PV1 data.
    entries.push(BundleEntry {
        resource: Resource::Patient(patient_resource(model)),
    });

    let has_encounter = model.encounter.is_some();
    if let Some(encounter) = &model.encounter {
        entries.push(BundleEntry {
            resource: Resource::Encounter(encounter_resource(encounter, model.event.as_ref())),
        });
    }

    for (idx, obs) in model.observations().enumerate() {
        entries.push(BundleEntry {
            resource: Resource::Observation(observation_resource(obs, idx + 1, has_encounter)),
        });
    }

    for (idx, kin) in model.next_of_kin.iter().enumerate() {
        entries.push(BundleEntry {
            resource: Resource::RelatedPerson(related_person_resource(kin, idx + 1)),
        });
    }

    for (idx, allergy) in model.allergies.iter().enumerate() {
        entries.push(BundleEntry {
            resource: Resource::AllergyIntolerance(allergy_resource(allergy, idx + 1)),
        });
    }

    Ok(Bundle::new(entries))
}

fn patient_resource(model: &MessageModel) -> Patient {
    let mut resource = Patient {
        resource_type: "Patient",
        id: PATIENT_ID.into(),
        identifier: vec![],
        name: vec![],
        gender: None,
        birth_date: None,
        address: vec![],
        telecom: vec![],
    };

    let Some(patient) = &model.patient else {
        return resource;
    };

    if let Some(mrn) = &patient.mrn {
        resource.identifier.push(Identifier {
            system: Some(systems::MRN.into()),
            value: Some(mrn.clone()),
        });
    }
    if patient.family.is_some() || patient.given.is_some() {
        resource.name.push(HumanName {
            family: patient.family.clone(),
            given: patient.given.iter().cloned().collect(),
        });
    }
    resource.gender = patient
        .gender
        .as_deref()
        .and_then(|code| lookup(GENDER, code))
        .map(str::to_owned);
    if patient.gender.is_some() && resource.gender.is_none() {
        tracing::debug!(code = ?patient.gender, "unmapped administrative sex code, omitting gender");
    }
    resource.birth_date = patient.birth_date.as_deref().and_then(fhir_date);
    if let Some(address) = &patient.address {
        resource.address.push(Address {
            text: Some(address.clone()),
        });
    }
    if let Some(phone) = &patient.phone {
        resource.telecom.push(ContactPoint {
            system: Some("phone".into()),
            value: Some(phone.clone()),
        });
    }

    resource
}

fn encounter_resource(encounter: &hl7::Encounter, event: Option<&hl7::EventInfo>) -> Encounter {
    let class_code = encounter
        .patient_class
        .as_deref()
        .and_then(|code| lookup(ENCOUNTER_CLASS, code))
        .unwrap_or("AMB");

    let start = encounter.admit_time.as_deref().and_then(fhir_date_time);
    let end = encounter.discharge_time.as_deref().and_then(fhir_date_time);
    let status = if end.is_some() {
        "finished"
    } else {
        "in-progress"
    };
    let period = (start.is_some() || end.is_some()).then(|| Period { start, end });

    let encounter_type = event
        .and_then(|e| e.event_type.as_ref())
        .map(|code| CodeableConcept {
            coding: vec![Coding {
                system: Some(systems::V2_EVENT_TYPE.into()),
                code: Some(code.clone()),
                display: None,
            }],
            text: None,
        })
        .into_iter()
        .collect();

    Encounter {
        resource_type: "Encounter",
        id: ENCOUNTER_ID.into(),
        status: status.into(),
        class: Coding {
            system: Some(systems::V3_ACT_CODE.into()),
            code: Some(class_code.into()),
            display: None,
        },
        encounter_type,
        subject: Reference::local("Patient", PATIENT_ID),
        participant: encounter
            .attending
            .as_ref()
            .and_then(hl7::Clinician::display)
            .map(|display| EncounterParticipant {
                individual: Reference::display_only(display),
            })
            .into_iter()
            .collect(),
        period,
        location: encounter
            .location
            .as_ref()
            .map(|loc| EncounterLocation {
                location: Reference::display_only(loc.clone()),
            })
            .into_iter()
            .collect(),
    }
}

fn observation_resource(obs: &hl7::Observation, number: usize, has_encounter: bool) -> Observation {
    let is_numeric = obs.value_type.as_deref() == Some("NM");
    let numeric_value = obs
        .value
        .as_deref()
        .filter(|_| is_numeric)
        .and_then(|v| v.trim().parse::<f64>().ok());

    let (value_quantity, value_string) = match numeric_value {
        Some(value) => (
            Some(Quantity {
                value,
                unit: obs.unit.clone(),
            }),
            None,
        ),
        // A declared-numeric value that does not parse degrades to text.
        None => (None, obs.value.clone()),
    };

    let interpretation = obs
        .abnormal_flag
        .as_deref()
        .map(|flag| {
            if INTERPRETATION_FLAGS.contains(&flag) {
                CodeableConcept {
                    coding: vec![Coding {
                        system: Some(systems::V3_INTERPRETATION.into()),
                        code: Some(flag.into()),
                        display: None,
                    }],
                    text: None,
                }
            } else {
                tracing::warn!(flag, "unmapped abnormal flag, carrying as text");
                CodeableConcept {
                    coding: vec![],
                    text: Some(flag.into()),
                }
            }
        })
        .into_iter()
        .collect();

    Observation {
        resource_type: "Observation",
        id: format!("observation-{number}"),
        status: "final".into(),
        code: CodeableConcept {
            coding: vec![Coding {
                system: Some(systems::LOINC.into()),
                code: obs.code.clone(),
                display: obs.text.clone(),
            }],
            text: None,
        },
        subject: Reference::local("Patient", PATIENT_ID),
        encounter: has_encounter.then(|| Reference::local("Encounter", ENCOUNTER_ID)),
        value_quantity,
        value_string,
        interpretation,
        reference_range: obs
            .reference_range
            .as_deref()
            .and_then(parse_range)
            .map(|(low, high)| ReferenceRange {
                low: Some(Quantity {
                    value: low,
                    unit: None,
                }),
                high: Some(Quantity {
                    value: high,
                    unit: None,
                }),
            })
            .into_iter()
            .collect(),
    }
}

fn related_person_resource(kin: &hl7::NextOfKin, number: usize) -> RelatedPerson {
    let relationship = match kin.relationship_code.as_deref() {
        Some(code) => match RELATIONSHIP.iter().find(|(c, _, _)| *c == code) {
            Some((_, role_code, display)) => Some(CodeableConcept {
                coding: vec![Coding {
                    system: Some(systems::V3_ROLE_CODE.into()),
                    code: Some((*role_code).into()),
                    display: Some((*display).into()),
                }],
                text: kin.relationship_text.clone(),
            }),
            None => {
                tracing::warn!(code, "unmapped relationship code, carrying as text");
                Some(CodeableConcept {
                    coding: vec![],
                    text: Some(kin.relationship_text.clone().unwrap_or_else(|| code.into())),
                })
            }
        },
        None => kin.relationship_text.clone().map(|text| CodeableConcept {
            coding: vec![],
            text: Some(text),
        }),
    };

    RelatedPerson {
        resource_type: "RelatedPerson",
        id: format!("related-person-{number}"),
        patient: Reference::local("Patient", PATIENT_ID),
        relationship: relationship.into_iter().collect(),
        name: (kin.family.is_some() || kin.given.is_some())
            .then(|| HumanName {
                family: kin.family.clone(),
                given: kin.given.iter().cloned().collect(),
            })
            .into_iter()
            .collect(),
        telecom: kin
            .phone
            .as_ref()
            .map(|phone| ContactPoint {
                system: Some("phone".into()),
                value: Some(phone.clone()),
            })
            .into_iter()
            .collect(),
    }
}

fn allergy_resource(allergy: &hl7::Allergy, number: usize) -> AllergyIntolerance {
    let text = allergy
        .substance_text
        .clone()
        .or_else(|| allergy.substance_code.clone());
    let coding = match (&allergy.substance_code, &allergy.substance_text) {
        (Some(code), Some(display)) => vec![Coding {
            system: None,
            code: Some(code.clone()),
            display: Some(display.clone()),
        }],
        _ => vec![],
    };
    let code = (text.is_some() || !coding.is_empty()).then(|| CodeableConcept { coding, text });

    let severity = allergy
        .severity_code
        .as_deref()
        .and_then(|code| lookup(SEVERITY, code))
        .map(str::to_owned);
    if allergy.severity_code.is_some() && severity.is_none() {
        tracing::warn!(code = ?allergy.severity_code, "unmapped allergy severity, omitting");
    }

    // FHIR requires a manifestation inside a reaction, so severity alone is
    // not enough to emit one.
    let reaction = allergy
        .reaction
        .as_ref()
        .map(|manifestation| AllergyReaction {
            manifestation: vec![CodeableConcept {
                coding: vec![],
                text: Some(manifestation.clone()),
            }],
            severity,
        })
        .into_iter()
        .collect();

    AllergyIntolerance {
        resource_type: "AllergyIntolerance",
        id: format!("allergy-{number}"),
        patient: Reference::local("Patient", PATIENT_ID),
        code,
        reaction,
    }
}

fn lookup(table: &[(&'static str, &'static str)], code: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(from, _)| *from == code)
        .map(|(_, to)| *to)
}

/// `low-high` reference range, both sides numeric, otherwise nothing.
fn parse_range(range: &str) -> Option<(f64, f64)> {
    let (low, high) = range.split_once('-')?;
    Some((low.trim().parse().ok()?, high.trim().parse().ok()?))
}

/// Valid HL7 TS to a FHIR `YYYY-MM-DD` date, or nothing.
fn fhir_date(ts: &str) -> Option<String> {
    if ts.len() < 8 || !ts.bytes().take(8).all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(&ts[..8], "%Y%m%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Valid HL7 TS to a FHIR dateTime (or date when only YYYYMMDD is given),
/// or nothing when the timestamp is malformed.
fn fhir_date_time(ts: &str) -> Option<String> {
    if !ts.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match ts.len() {
        8 => fhir_date(ts),
        12 => NaiveDateTime::parse_from_str(ts, "%Y%m%d%H%M")
            .ok()
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:00").to_string()),
        14 => NaiveDateTime::parse_from_str(ts, "%Y%m%d%H%M%S")
            .ok()
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hl7::parse_message;

    const MSH_ADT: &str =
        "MSH|^~\\&|A|B|C|D|20250101000000||ADT^A01|1|P|2.3.1";
    const MSH_ORU: &str =
        "MSH|^~\\&|LAB|GH|C|D|20250101000000||ORU^R01|1|P|2.3.1";

    fn bundle_of(text: &str) -> Bundle {
        convert(&parse_message(text).expect("parse")).expect("convert")
    }

    #[test]
    fn converts_the_minimal_adt_example() {
        let text = format!(
            "{MSH_ADT}\rPID|1||123^^^HOSP^MR||Doe^Jane||19900101|F\rPV1|1|I|ICU"
        );
        let bundle = bundle_of(&text);

        assert_eq!(bundle.entry.len(), 2);

        let patient = bundle.patient().expect("patient");
        assert_eq!(patient.id, "patient");
        assert_eq!(patient.identifier[0].value.as_deref(), Some("123"));
        assert_eq!(patient.name[0].family.as_deref(), Some("Doe"));
        assert_eq!(patient.name[0].given, vec!["Jane"]);
        assert_eq!(patient.gender.as_deref(), Some("female"));
        assert_eq!(patient.birth_date.as_deref(), Some("1990-01-01"));

        let encounter = bundle.encounter().expect("encounter");
        assert_eq!(encounter.class.code.as_deref(), Some("IMP"));
        assert_eq!(
            encounter.subject.reference.as_deref(),
            Some("Patient/patient")
        );
        assert_eq!(
            encounter.location[0].location.display.as_deref(),
            Some("ICU")
        );
        assert_eq!(encounter.status, "in-progress");

        assert_eq!(bundle.observations().count(), 0);
    }

    #[test]
    fn empty_model_is_a_structural_error() {
        let model = MessageModel::default();
        let err = convert(&model).expect_err("should fail");
        assert!(matches!(err, FhirError::EmptyMessage(_)));
    }

    #[test]
    fn encounter_only_message_emits_bare_patient_for_references() {
        let text = format!("{MSH_ADT}\rPV1|1|E|ER");
        let bundle = bundle_of(&text);

        let patient = bundle.patient().expect("patient");
        assert!(patient.identifier.is_empty());
        assert!(patient.name.is_empty());

        let encounter = bundle.encounter().expect("encounter");
        assert_eq!(encounter.class.code.as_deref(), Some("EMER"));
        assert_eq!(
            encounter.subject.reference.as_deref(),
            Some("Patient/patient")
        );
    }

    #[test]
    fn observations_keep_input_order_and_reference_patient_and_encounter() {
        let text = format!(
            "{MSH_ORU}\rPID|1||9^^^H^MR||Doe^Jane\rPV1|1|O|AMB\rOBX|1|ST|NOTE^Note||early\rOBR|1||F1|GLU^Glucose\rOBX|1|NM|2345-7^Glucose||182|mg/dL\rOBX|2|NM|718-7^Hemoglobin||13.5|g/dL"
        );
        let bundle = bundle_of(&text);

        let codes: Vec<_> = bundle
            .observations()
            .map(|o| o.code.coding[0].code.as_deref().expect("code"))
            .collect();
        assert_eq!(codes, vec!["NOTE", "2345-7", "718-7"]);

        let ids: Vec<_> = bundle.observations().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["observation-1", "observation-2", "observation-3"]);

        for obs in bundle.observations() {
            assert_eq!(obs.subject.reference.as_deref(), Some("Patient/patient"));
            assert_eq!(
                obs.encounter.as_ref().and_then(|r| r.reference.as_deref()),
                Some("Encounter/encounter")
            );
        }
    }

    #[test]
    fn observation_without_encounter_has_no_encounter_reference() {
        let text = format!("{MSH_ORU}\rPID|1||9^^^H^MR||Doe^Jane\rOBX|1|NM|2345-7^Glucose||182|mg/dL");
        let bundle = bundle_of(&text);

        let obs = bundle.observations().next().expect("observation");
        assert!(obs.encounter.is_none());
    }

    #[test]
    fn numeric_value_keeps_unit_verbatim() {
        let text = format!(
            "{MSH_ORU}\rPID|1||9^^^H^MR||Doe^Jane\rOBR|1||F1|GLU^Glucose\rOBX|1|NM|2345-7^Glucose||182|mg/dL|70-110|H"
        );
        let obs_bundle = bundle_of(&text);
        let obs = obs_bundle.observations().next().expect("observation");

        let quantity = obs.value_quantity.as_ref().expect("quantity");
        assert_eq!(quantity.value, 182.0);
        assert_eq!(quantity.unit.as_deref(), Some("mg/dL"));
        assert!(obs.value_string.is_none());

        let range = &obs.reference_range[0];
        assert_eq!(range.low.as_ref().expect("low").value, 70.0);
        assert_eq!(range.high.as_ref().expect("high").value, 110.0);

        assert_eq!(
            obs.interpretation[0].coding[0].code.as_deref(),
            Some("H")
        );
    }

    #[test]
    fn unparseable_numeric_value_degrades_to_text() {
        let text = format!(
            "{MSH_ORU}\rPID|1||9^^^H^MR||Doe^Jane\rOBR|1||F1|GLU^Glucose\rOBX|1|NM|2345-7^Glucose||pending||"
        );
        let bundle = bundle_of(&text);
        let obs = bundle.observations().next().expect("observation");

        assert!(obs.value_quantity.is_none());
        assert_eq!(obs.value_string.as_deref(), Some("pending"));
    }

    #[test]
    fn malformed_reference_range_is_omitted_not_fabricated() {
        let text = format!(
            "{MSH_ORU}\rPID|1||9^^^H^MR||Doe^Jane\rOBR|1||F1|GLU^Glucose\rOBX|1|NM|2345-7^Glucose||182|mg/dL|negative"
        );
        let bundle = bundle_of(&text);
        let obs = bundle.observations().next().expect("observation");

        assert!(obs.reference_range.is_empty());
    }

    #[test]
    fn unmapped_abnormal_flag_is_carried_as_text() {
        let text = format!(
            "{MSH_ORU}\rPID|1||9^^^H^MR||Doe^Jane\rOBR|1||F1|GLU^Glucose\rOBX|1|NM|2345-7^Glucose||182|mg/dL||XX"
        );
        let bundle = bundle_of(&text);
        let obs = bundle.observations().next().expect("observation");

        assert!(obs.interpretation[0].coding.is_empty());
        assert_eq!(obs.interpretation[0].text.as_deref(), Some("XX"));
    }

    #[test]
    fn related_person_maps_known_relationship() {
        let text = format!(
            "{MSH_ADT}\rPID|1||9^^^H^MR||Doe^Jane\rPV1|1|I|ICU\rNK1|1|Doe^John|SPO^Spouse||5141234567"
        );
        let bundle = bundle_of(&text);
        let kin = bundle.related_persons().next().expect("related person");

        assert_eq!(kin.id, "related-person-1");
        assert_eq!(kin.patient.reference.as_deref(), Some("Patient/patient"));
        assert_eq!(kin.relationship[0].coding[0].code.as_deref(), Some("SPS"));
        assert_eq!(
            kin.relationship[0].coding[0].system.as_deref(),
            Some(systems::V3_ROLE_CODE)
        );
        assert_eq!(kin.relationship[0].text.as_deref(), Some("Spouse"));
        assert_eq!(kin.name[0].given, vec!["John"]);
        assert_eq!(kin.telecom[0].value.as_deref(), Some("5141234567"));
    }

    #[test]
    fn unmapped_relationship_passes_through_as_text() {
        let text = format!("{MSH_ADT}\rPID|1||9^^^H^MR||Doe^Jane\rPV1|1|I|ICU\rNK1|1|Doe^Sam|XYZ^Cousin");
        let bundle = bundle_of(&text);
        let kin = bundle.related_persons().next().expect("related person");

        assert!(kin.relationship[0].coding.is_empty());
        assert_eq!(kin.relationship[0].text.as_deref(), Some("Cousin"));
    }

    #[test]
    fn allergy_expands_known_severity_and_omits_unknown() {
        let text = format!(
            "{MSH_ADT}\rPID|1||9^^^H^MR||Doe^Jane\rPV1|1|I|ICU\rAL1|1|DA|PCN^Penicillin|SV|Rash\rAL1|2|DA|Peanuts|XX|Hives"
        );
        let bundle = bundle_of(&text);
        let allergies: Vec<_> = bundle.allergies().collect();

        assert_eq!(allergies.len(), 2);
        assert_eq!(allergies[0].id, "allergy-1");
        let code = allergies[0].code.as_ref().expect("code");
        assert_eq!(code.text.as_deref(), Some("Penicillin"));
        assert_eq!(code.coding[0].code.as_deref(), Some("PCN"));
        assert_eq!(
            allergies[0].reaction[0].severity.as_deref(),
            Some("severe")
        );
        assert_eq!(
            allergies[0].reaction[0].manifestation[0].text.as_deref(),
            Some("Rash")
        );

        assert_eq!(
            allergies[1].code.as_ref().expect("code").text.as_deref(),
            Some("Peanuts")
        );
        assert!(allergies[1].reaction[0].severity.is_none());
    }

    #[test]
    fn encounter_period_and_status_from_positional_timestamps() {
        let mut fields = vec![String::new(); 46];
        fields[0] = "PV1".into();
        fields[2] = "I".into();
        fields[3] = "ICU".into();
        fields[44] = "20250101115900".into();
        fields[45] = "202501011430".into();
        let text = format!(
            "{MSH_ADT}\rPID|1||9^^^H^MR||Doe^Jane\r{}",
            fields.join("|")
        );
        let bundle = bundle_of(&text);
        let encounter = bundle.encounter().expect("encounter");

        assert_eq!(encounter.status, "finished");
        let period = encounter.period.as_ref().expect("period");
        assert_eq!(period.start.as_deref(), Some("2025-01-01T11:59:00"));
        assert_eq!(period.end.as_deref(), Some("2025-01-01T14:30:00"));
    }

    #[test]
    fn malformed_timestamps_are_omitted() {
        let mut fields = vec![String::new(); 46];
        fields[0] = "PV1".into();
        fields[2] = "I".into();
        fields[44] = "not-a-time".into();
        let text = format!(
            "{MSH_ADT}\rPID|1||9^^^H^MR||Doe^Jane\r{}",
            fields.join("|")
        );
        let bundle = bundle_of(&text);
        let encounter = bundle.encounter().expect("encounter");

        assert!(encounter.period.is_none());
        assert_eq!(encounter.status, "in-progress");
    }

    #[test]
    fn evn_event_type_becomes_encounter_type() {
        let text = format!(
            "{MSH_ADT}\rEVN|A03|20250101083000\rPID|1||9^^^H^MR||Doe^Jane\rPV1|1|I|ICU"
        );
        let bundle = bundle_of(&text);
        let encounter = bundle.encounter().expect("encounter");

        assert_eq!(
            encounter.encounter_type[0].coding[0].code.as_deref(),
            Some("A03")
        );
        assert_eq!(
            encounter.encounter_type[0].coding[0].system.as_deref(),
            Some(systems::V2_EVENT_TYPE)
        );
    }

    #[test]
    fn invalid_birth_date_is_omitted() {
        let text = format!("{MSH_ADT}\rPID|1||9^^^H^MR||Doe^Jane||19901340|F\rPV1|1|I|ICU");
        let bundle = bundle_of(&text);

        assert!(bundle.patient().expect("patient").birth_date.is_none());
    }
}
