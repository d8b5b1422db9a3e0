//! FHIR Patient and Practitioner wire models.
//!
//! Both resources describe a person: names, telecoms, addresses and identifiers.
//! Patient additionally carries contacts (next of kin, emergency contact) and
//! extensions that practices use for free-text insurance notes.

use crate::datatypes::{
    Address, CodeableConcept, ContactPoint, Extension, HumanName, Identifier, Meta, Period,
    Reference,
};
use crate::resource::{Resource, ResourceType};
use serde::{Deserialize, Serialize};

/// Demographics and administrative information about a patient.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact: Vec<PatientContact>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub general_practitioner: Vec<Reference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,
}

impl Resource for Patient {
    const TYPE: ResourceType = ResourceType::Patient;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

/// A contact party (guardian, partner, friend) for the patient.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct PatientContact {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationship: Vec<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
}

/// A person with a formal responsibility in the provisioning of healthcare.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Practitioner {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualification: Vec<Qualification>,
}

impl Resource for Practitioner {
    const TYPE: ResourceType = ResourceType::Practitioner;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

/// Certification, licence or training relevant to practice.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Qualification {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(default)]
    pub code: CodeableConcept,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{parse_resource, render_resource};
    use serde_json::json;

    #[test]
    fn parses_medplum_patient() {
        let value = json!({
            "resourceType": "Patient",
            "id": "0189a1b2",
            "meta": {"versionId": "3", "lastUpdated": "2024-05-01T10:00:00.000Z"},
            "active": true,
            "name": [{"use": "official", "given": ["Jane", "Q"], "family": "Smith"}],
            "telecom": [
                {"system": "phone", "value": "555-0100", "use": "mobile"},
                {"system": "email", "value": "jane@example.com"}
            ],
            "gender": "female",
            "birthDate": "1985-02-14",
            "address": [{"use": "home", "line": ["1 Main St"], "city": "Springfield", "postalCode": "01101"}],
            "contact": [{"name": {"text": "Tom Smith"}, "telecom": [{"system": "phone", "value": "555-0199"}]}],
            "communication": [{"language": {"text": "English"}}]
        });

        let patient: Patient = parse_resource(&value).expect("parse patient");
        assert_eq!(patient.id(), Some("0189a1b2"));
        assert_eq!(patient.birth_date.as_deref(), Some("1985-02-14"));
        assert_eq!(patient.telecom.len(), 2);
        assert_eq!(patient.contact.len(), 1);
        assert_eq!(
            patient.meta.and_then(|m| m.version_id).as_deref(),
            Some("3")
        );
    }

    #[test]
    fn parses_minimal_patient() {
        let patient: Patient =
            parse_resource(&json!({"resourceType": "Patient"})).expect("minimal patient");
        assert!(patient.id.is_none());
        assert!(patient.name.is_empty());
        assert!(patient.active.is_none());
    }

    #[test]
    fn renders_without_empty_collections() {
        let patient = Patient {
            id: Some("p1".into()),
            birth_date: Some("1990-01-01".into()),
            ..Patient::default()
        };
        let value = render_resource(&patient).expect("render");
        assert_eq!(value["birthDate"], "1990-01-01");
        assert!(value.get("name").is_none());
        assert!(value.get("telecom").is_none());
    }

    #[test]
    fn practitioner_qualification_defaults_code() {
        let practitioner: Practitioner = parse_resource(&json!({
            "resourceType": "Practitioner",
            "id": "pr1",
            "qualification": [{"identifier": [{"value": "LIC-1"}]}]
        }))
        .expect("parse practitioner");
        assert_eq!(practitioner.qualification[0].code, CodeableConcept::default());
    }
}
