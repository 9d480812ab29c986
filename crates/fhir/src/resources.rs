//! FHIR R4 wire models for the produced Bundle.
//!
//! These structs are the exact JSON shape consumers receive. Field names
//! follow the R4 schemas via camelCase renames; every optional field is
//! skipped when absent so the converter can never emit fabricated data.

use serde::Serialize;

/// FHIR coding system URLs used by the converter.
pub mod systems {
    pub const LOINC: &str = "http://loinc.org";
    pub const MRN: &str = "http://hospital.example.org/mrn";
    pub const V3_ACT_CODE: &str = "http://terminology.hl7.org/CodeSystem/v3-ActCode";
    pub const V2_EVENT_TYPE: &str = "http://terminology.hl7.org/CodeSystem/v2-0003";
    pub const V3_INTERPRETATION: &str =
        "http://terminology.hl7.org/CodeSystem/v3-ObservationInterpretation";
    pub const V3_ROLE_CODE: &str = "http://terminology.hl7.org/CodeSystem/v3-RoleCode";
}

// ============================================================================
// Shared datatypes
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Identifier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HumanName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CodeableConcept {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Reference to another resource (by local id) or a display-only pointer.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Reference {
    /// `ResourceType/id` style local reference.
    pub fn local(resource_type: &str, id: &str) -> Self {
        Self {
            reference: Some(format!("{resource_type}/{id}")),
            display: None,
        }
    }

    /// Display-only pointer with no target resource.
    pub fn display_only(display: impl Into<String>) -> Self {
        Self {
            reference: None,
            display: Some(display.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Quantity {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Period {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ContactPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

// ============================================================================
// Resources
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub resource_type: &'static str,
    pub id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub resource_type: &'static str,
    pub id: String,
    pub status: String,
    pub class: Coding,
    #[serde(rename = "type", skip_serializing_if = "Vec::is_empty")]
    pub encounter_type: Vec<CodeableConcept>,
    pub subject: Reference,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub participant: Vec<EncounterParticipant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub location: Vec<EncounterLocation>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EncounterParticipant {
    pub individual: Reference,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EncounterLocation {
    pub location: Reference,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub resource_type: &'static str,
    pub id: String,
    pub status: String,
    pub code: CodeableConcept,
    pub subject: Reference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interpretation: Vec<CodeableConcept>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reference_range: Vec<ReferenceRange>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReferenceRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Quantity>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedPerson {
    pub resource_type: &'static str,
    pub id: String,
    pub patient: Reference,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relationship: Vec<CodeableConcept>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllergyIntolerance {
    pub resource_type: &'static str,
    pub id: String,
    pub patient: Reference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reaction: Vec<AllergyReaction>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AllergyReaction {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub manifestation: Vec<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

/// One typed Bundle entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resource {
    Patient(Patient),
    Encounter(Encounter),
    Observation(Observation),
    RelatedPerson(RelatedPerson),
    AllergyIntolerance(AllergyIntolerance),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BundleEntry {
    pub resource: Resource,
}

/// The converter's output: a FHIR R4 collection Bundle.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub resource_type: &'static str,
    #[serde(rename = "type")]
    pub bundle_type: &'static str,
    pub entry: Vec<BundleEntry>,
}

impl Bundle {
    pub fn new(entry: Vec<BundleEntry>) -> Self {
        Self {
            resource_type: "Bundle",
            bundle_type: "collection",
            entry,
        }
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// The single Patient resource, if the bundle carries one.
    pub fn patient(&self) -> Option<&Patient> {
        self.entry.iter().find_map(|e| match &e.resource {
            Resource::Patient(p) => Some(p),
            _ => None,
        })
    }

    /// The Encounter resource, if the bundle carries one.
    pub fn encounter(&self) -> Option<&Encounter> {
        self.entry.iter().find_map(|e| match &e.resource {
            Resource::Encounter(enc) => Some(enc),
            _ => None,
        })
    }

    /// All Observation resources in entry order.
    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.entry.iter().filter_map(|e| match &e.resource {
            Resource::Observation(o) => Some(o),
            _ => None,
        })
    }

    /// All RelatedPerson resources in entry order.
    pub fn related_persons(&self) -> impl Iterator<Item = &RelatedPerson> {
        self.entry.iter().filter_map(|e| match &e.resource {
            Resource::RelatedPerson(r) => Some(r),
            _ => None,
        })
    }

    /// All AllergyIntolerance resources in entry order.
    pub fn allergies(&self) -> impl Iterator<Item = &AllergyIntolerance> {
        self.entry.iter().filter_map(|e| match &e.resource {
            Resource::AllergyIntolerance(a) => Some(a),
            _ => None,
        })
    }
}
