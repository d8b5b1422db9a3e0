//! FHIR ServiceRequest and MedicationRequest wire models.
//!
//! Both are "request" resources sharing the request status and priority value
//! sets (`draft | active | on-hold | revoked | completed | ...` and
//! `routine | urgent | asap | stat`).

use crate::datatypes::{Annotation, CodeableConcept, Identifier, Meta, Reference};
use crate::resource::{Resource, ResourceType};
use serde::{Deserialize, Serialize};

/// A record of a request for a service (lab, imaging, referral) to be performed.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_date_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authored_on: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<Reference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub performer: Vec<Reference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reason_code: Vec<CodeableConcept>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub note: Vec<Annotation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_instruction: Option<String>,
}

impl Resource for ServiceRequest {
    const TYPE: ResourceType = ResourceType::ServiceRequest;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

/// An order for the supply and administration of a medication.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication_codeable_concept: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication_reference: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authored_on: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<Reference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dosage_instruction: Vec<Dosage>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub note: Vec<Annotation>,
}

impl Resource for MedicationRequest {
    const TYPE: ResourceType = ResourceType::MedicationRequest;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

/// How a medication is to be taken. Only the free-text rendering is modelled.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dosage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_instruction: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::parse_resource;
    use serde_json::json;

    #[test]
    fn parses_service_request() {
        let request: ServiceRequest = parse_resource(&json!({
            "resourceType": "ServiceRequest",
            "id": "sr1",
            "status": "active",
            "intent": "order",
            "priority": "asap",
            "category": [{"coding": [{"code": "108252007", "display": "Laboratory procedure"}]}],
            "code": {"text": "Lipid panel"},
            "subject": {"reference": "Patient/p1", "display": "Jane Smith"},
            "requester": {"reference": "Practitioner/pr1"}
        }))
        .expect("parse service request");

        assert_eq!(request.priority.as_deref(), Some("asap"));
        assert_eq!(request.category.len(), 1);
    }

    #[test]
    fn parses_medication_request_dosage() {
        let request: MedicationRequest = parse_resource(&json!({
            "resourceType": "MedicationRequest",
            "status": "stopped",
            "intent": "order",
            "medicationCodeableConcept": {"text": "Sertraline 50mg"},
            "dosageInstruction": [{"text": "Once daily"}]
        }))
        .expect("parse medication request");

        assert_eq!(request.dosage_instruction[0].text.as_deref(), Some("Once daily"));
    }
}
