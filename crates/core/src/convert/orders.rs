use super::id_of;
use crate::constants::{UNKNOWN_PATIENT, UNKNOWN_PROVIDER};
use crate::input::NewOrder;
use crate::mapping::{OrderStatus, Priority};
use crate::views::{OrderKind, OrderView};
use fhir::extract;
use fhir::reference::{reference_display, reference_display_or, reference_id};
use fhir::{Annotation, CodeableConcept, MedicationRequest, Reference, ResourceType, ServiceRequest};

pub fn service_request(resource: &ServiceRequest) -> OrderView {
    OrderView {
        id: id_of(&resource.id),
        kind: OrderKind::Service,
        patient_id: reference_id(resource.subject.as_ref()),
        patient_name: reference_display_or(resource.subject.as_ref(), UNKNOWN_PATIENT),
        requester_id: reference_id(resource.requester.as_ref()),
        requester_name: reference_display_or(resource.requester.as_ref(), UNKNOWN_PROVIDER),
        category: extract::codeable_concept(resource.category.first()),
        description: extract::codeable_concept(resource.code.as_ref()),
        priority: Priority::from_fhir(resource.priority.as_deref()),
        status: OrderStatus::from_fhir(resource.status.as_deref()),
        authored_on: resource.authored_on.clone(),
        notes: extract::annotation_text(&resource.note),
    }
}

pub fn medication_request(resource: &MedicationRequest) -> OrderView {
    let description = match (
        &resource.medication_codeable_concept,
        &resource.medication_reference,
    ) {
        (Some(concept), _) => extract::codeable_concept(Some(concept)),
        (None, Some(reference)) => reference_display(Some(reference)),
        (None, None) => extract::UNKNOWN.to_string(),
    };

    let category = resource
        .category
        .first()
        .map(|c| extract::codeable_concept(Some(c)))
        .unwrap_or_else(|| "Medication".to_string());

    let dosage = resource
        .dosage_instruction
        .iter()
        .filter_map(|d| d.text.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("; ");
    let notes = match (extract::annotation_text(&resource.note), dosage.is_empty()) {
        (Some(notes), true) => Some(notes),
        (Some(notes), false) => Some(format!("{dosage}\n{notes}")),
        (None, false) => Some(dosage),
        (None, true) => None,
    };

    OrderView {
        id: id_of(&resource.id),
        kind: OrderKind::Medication,
        patient_id: reference_id(resource.subject.as_ref()),
        patient_name: reference_display_or(resource.subject.as_ref(), UNKNOWN_PATIENT),
        requester_id: reference_id(resource.requester.as_ref()),
        requester_name: reference_display_or(resource.requester.as_ref(), UNKNOWN_PROVIDER),
        category,
        description,
        priority: Priority::from_fhir(resource.priority.as_deref()),
        status: OrderStatus::from_fhir(resource.status.as_deref()),
        authored_on: resource.authored_on.clone(),
        notes,
    }
}

/// Build a ServiceRequest from a validated order.
pub fn order_resource(input: &NewOrder) -> ServiceRequest {
    ServiceRequest {
        status: Some(input.status.to_fhir().to_string()),
        intent: Some("order".into()),
        category: input
            .category
            .iter()
            .map(|c| CodeableConcept::text(c.as_str()))
            .collect(),
        priority: Some(input.priority.to_fhir().to_string()),
        code: Some(CodeableConcept::text(input.description.as_str())),
        subject: Some(Reference::to(
            ResourceType::Patient,
            input.patient_id.as_str(),
            input.patient_name.as_ref().map(|n| n.as_str()),
        )),
        requester: input.requester_id.as_ref().map(|id| {
            Reference::to(
                ResourceType::Practitioner,
                id.as_str(),
                input.requester_name.as_ref().map(|n| n.as_str()),
            )
        }),
        note: input
            .notes
            .iter()
            .map(|n| Annotation {
                text: n.as_str().to_string(),
                ..Annotation::default()
            })
            .collect(),
        ..ServiceRequest::default()
    }
}
