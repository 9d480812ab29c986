//! Deterministic plain-text summary of a produced Bundle.
//!
//! A pure, order-preserving projection: fixed section order (Patient,
//! Encounter, Observations, Related Persons, Allergies), one line per
//! resource within a section, and only facts the Bundle actually carries.
//! Sections with no backing data are omitted outright, never printed with
//! placeholder text.

use crate::resources::{
    AllergyIntolerance, Bundle, CodeableConcept, Encounter, HumanName, Observation, Patient,
    RelatedPerson,
};

/// Render the fixed-section summary for a Bundle.
///
/// Idempotent: the same Bundle always yields byte-identical text.
pub fn summarize(bundle: &Bundle) -> String {
    let mut sections: Vec<String> = Vec::new();

    if let Some(patient) = bundle.patient() {
        if let Some(block) = patient_block(patient) {
            sections.push(block);
        }
    }
    if let Some(encounter) = bundle.encounter() {
        sections.push(encounter_block(encounter));
    }

    let observations: Vec<&Observation> = bundle.observations().collect();
    if !observations.is_empty() {
        let mut block = String::from("Observations:");
        for obs in observations {
            block.push_str("\n- ");
            block.push_str(&observation_line(obs));
        }
        sections.push(block);
    }

    let related: Vec<&RelatedPerson> = bundle.related_persons().collect();
    if !related.is_empty() {
        let mut block = String::from("Related persons:");
        for person in related {
            block.push_str("\n- ");
            block.push_str(&related_person_line(person));
        }
        sections.push(block);
    }

    let allergies: Vec<&AllergyIntolerance> = bundle.allergies().collect();
    if !allergies.is_empty() {
        let mut block = String::from("Allergies:");
        for allergy in allergies {
            block.push_str("\n- ");
            block.push_str(&allergy_line(allergy));
        }
        sections.push(block);
    }

    sections.join("\n\n")
}

fn name_display(name: &HumanName) -> Option<String> {
    let mut parts: Vec<&str> = name.given.iter().map(String::as_str).collect();
    if let Some(family) = name.family.as_deref() {
        parts.push(family);
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn patient_block(patient: &Patient) -> Option<String> {
    let name = patient.name.first().and_then(name_display);
    let mrn = patient
        .identifier
        .first()
        .and_then(|id| id.value.as_deref());

    let headline = match (&name, mrn) {
        (Some(name), Some(mrn)) => Some(format!("Patient: {name} (MRN {mrn})")),
        (Some(name), None) => Some(format!("Patient: {name}")),
        (None, Some(mrn)) => Some(format!("Patient: MRN {mrn}")),
        (None, None) => None,
    };

    let mut lines: Vec<String> = headline.into_iter().collect();
    if let Some(birth_date) = &patient.birth_date {
        lines.push(format!("Birth date: {birth_date}"));
    }
    if let Some(gender) = &patient.gender {
        lines.push(format!("Gender: {gender}"));
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn encounter_block(encounter: &Encounter) -> String {
    let class = encounter.class.code.as_deref().unwrap_or("unknown");
    let mut lines = vec![format!(
        "Encounter: class {class}, status {}",
        encounter.status
    )];

    if let Some(location) = encounter
        .location
        .first()
        .and_then(|l| l.location.display.as_deref())
    {
        lines.push(format!("Location: {location}"));
    }
    if let Some(period) = &encounter.period {
        match (period.start.as_deref(), period.end.as_deref()) {
            (Some(start), Some(end)) => lines.push(format!("Period: {start} to {end}")),
            (Some(start), None) => lines.push(format!("Period: from {start}")),
            (None, Some(end)) => lines.push(format!("Period: until {end}")),
            (None, None) => {}
        }
    }
    if let Some(attending) = encounter
        .participant
        .first()
        .and_then(|p| p.individual.display.as_deref())
    {
        lines.push(format!("Attending: {attending}"));
    }
    if let Some(event) = encounter
        .encounter_type
        .first()
        .and_then(concept_display)
    {
        lines.push(format!("Event type: {event}"));
    }

    lines.join("\n")
}

fn observation_line(obs: &Observation) -> String {
    let coding = obs.code.coding.first();
    let display = coding.and_then(|c| c.display.as_deref());
    let code = coding.and_then(|c| c.code.as_deref());

    let label = match (display, code) {
        (Some(display), Some(code)) => format!("{display} ({code})"),
        (Some(display), None) => display.to_owned(),
        (None, Some(code)) => code.to_owned(),
        (None, None) => "observation".to_owned(),
    };

    let mut line = label;
    if let Some(quantity) = &obs.value_quantity {
        line.push_str(&format!(": {}", quantity.value));
        if let Some(unit) = &quantity.unit {
            line.push_str(&format!(" {unit}"));
        }
    } else if let Some(value) = &obs.value_string {
        line.push_str(&format!(": {value}"));
    }
    if let Some(flag) = obs.interpretation.first().and_then(concept_display) {
        line.push_str(&format!(" [{flag}]"));
    }

    line
}

fn related_person_line(person: &RelatedPerson) -> String {
    let name = person.name.first().and_then(name_display);
    let relationship = person.relationship.first().and_then(concept_display);

    match (name, relationship) {
        (Some(name), Some(rel)) => format!("{name} ({rel})"),
        (Some(name), None) => name,
        (None, Some(rel)) => rel,
        (None, None) => "related person".to_owned(),
    }
}

fn allergy_line(allergy: &AllergyIntolerance) -> String {
    let substance = allergy
        .code
        .as_ref()
        .and_then(concept_display)
        .unwrap_or_else(|| "unspecified substance".to_owned());

    let reaction = allergy.reaction.first();
    let manifestation = reaction
        .and_then(|r| r.manifestation.first())
        .and_then(concept_display);
    let severity = reaction.and_then(|r| r.severity.as_deref());

    let mut line = substance;
    if let Some(manifestation) = manifestation {
        line.push_str(&format!(": {manifestation}"));
    }
    if let Some(severity) = severity {
        line.push_str(&format!(" ({severity})"));
    }

    line
}

/// Best available human text for a concept: its text, the first coding's
/// display, then the first coding's code.
fn concept_display(concept: &CodeableConcept) -> Option<String> {
    concept
        .text
        .clone()
        .or_else(|| concept.coding.first().and_then(|c| c.display.clone()))
        .or_else(|| concept.coding.first().and_then(|c| c.code.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert;
    use hl7::parse_message;

    const MSH_ADT: &str = "MSH|^~\\&|A|B|C|D|20250101000000||ADT^A01|1|P|2.3.1";
    const MSH_ORU: &str = "MSH|^~\\&|LAB|GH|C|D|20250101000000||ORU^R01|1|P|2.3.1";

    fn summary_of(text: &str) -> String {
        let model = parse_message(text).expect("parse");
        summarize(&convert(&model).expect("convert"))
    }

    #[test]
    fn full_message_renders_all_sections_in_order() {
        let mut pv1 = vec![String::new(); 45];
        pv1[0] = "PV1".into();
        pv1[1] = "1".into();
        pv1[2] = "I".into();
        pv1[3] = "ICU".into();
        pv1[44] = "20250101083000".into();
        let text = format!(
            "{MSH_ADT}\rEVN|A01|20250101083000\rPID|1||123^^^HOSP^MR||Doe^Jane||19900101|F\r{}\rNK1|1|Doe^John|SPO^Spouse\rAL1|1|DA|PCN^Penicillin|SV|Rash\rOBR|1||F1|GLU^Glucose\rOBX|1|NM|2345-7^Glucose||182|mg/dL|70-110|H",
            pv1.join("|")
        );
        let summary = summary_of(&text);

        let expected = "\
Patient: Jane Doe (MRN 123)
Birth date: 1990-01-01
Gender: female

Encounter: class IMP, status in-progress
Location: ICU
Period: from 2025-01-01T08:30:00
Event type: A01

Observations:
- Glucose (2345-7): 182 mg/dL [H]

Related persons:
- John Doe (Spouse)

Allergies:
- Penicillin: Rash (severe)";
        assert_eq!(summary, expected);
    }

    #[test]
    fn summarize_is_idempotent() {
        let text = format!(
            "{MSH_ORU}\rPID|1||9^^^H^MR||Doe^Jane\rOBR|1||F1|GLU^Glucose\rOBX|1|NM|2345-7^Glucose||182|mg/dL"
        );
        let model = parse_message(&text).expect("parse");
        let bundle = convert(&model).expect("convert");

        assert_eq!(summarize(&bundle), summarize(&bundle));
    }

    #[test]
    fn empty_sections_are_omitted_entirely() {
        let text = format!("{MSH_ADT}\rPID|1||123^^^HOSP^MR||Doe^Jane\rPV1|1|I|ICU");
        let summary = summary_of(&text);

        assert!(!summary.contains("Observations"));
        assert!(!summary.contains("Related persons"));
        assert!(!summary.contains("Allergies"));
        assert!(!summary.contains("Birth date"));
        assert!(summary.starts_with("Patient: Jane Doe (MRN 123)"));
    }

    #[test]
    fn observation_lines_follow_bundle_order() {
        let text = format!(
            "{MSH_ORU}\rPID|1||9^^^H^MR||Doe^Jane\rOBR|1||F1|PANEL^Panel\rOBX|1|NM|2345-7^Glucose||182|mg/dL\rOBX|2|ST|NOTE^Note||stable"
        );
        let summary = summary_of(&text);

        let glucose = summary.find("Glucose").expect("glucose line");
        let note = summary.find("Note (NOTE): stable").expect("note line");
        assert!(glucose < note);
    }

    #[test]
    fn text_value_renders_without_unit() {
        let text = format!(
            "{MSH_ORU}\rPID|1||9^^^H^MR||Doe^Jane\rOBR|1||F1|GLU^Glucose\rOBX|1|ST|NOTE^Note||patient stable"
        );
        let summary = summary_of(&text);

        assert!(summary.contains("- Note (NOTE): patient stable"));
    }
}
