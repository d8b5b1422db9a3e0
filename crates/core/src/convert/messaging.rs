use super::id_of;
use crate::constants::UNKNOWN_PATIENT;
use crate::input::NewMessage;
use crate::mapping::MessageStatus;
use crate::views::CommunicationView;
use fhir::extract;
use fhir::reference::{reference_display, reference_display_or, reference_id, reference_type};
use fhir::{CodeableConcept, Communication, CommunicationPayload, Reference, ResourceType};

/// The patient a message concerns: its subject, else whichever party is a patient.
fn patient_party(resource: &Communication) -> Option<&Reference> {
    resource.subject.as_ref().or_else(|| {
        resource
            .sender
            .iter()
            .chain(resource.recipient.iter())
            .find(|r| reference_type(r) == Some(ResourceType::Patient))
    })
}

pub fn communication(resource: &Communication) -> CommunicationView {
    let body = resource
        .payload
        .iter()
        .filter_map(|p| {
            p.content_string
                .clone()
                .or_else(|| p.content_attachment.as_ref().and_then(|a| a.title.clone()))
                .or_else(|| p.content_reference.as_ref().map(|r| reference_display(Some(r))))
        })
        .collect::<Vec<_>>()
        .join("\n");

    CommunicationView {
        id: id_of(&resource.id),
        sender_id: reference_id(resource.sender.as_ref()),
        sender_name: reference_display(resource.sender.as_ref()),
        recipient_ids: resource
            .recipient
            .iter()
            .filter_map(|r| reference_id(Some(r)))
            .collect(),
        recipient_names: resource
            .recipient
            .iter()
            .map(|r| reference_display(Some(r)))
            .collect(),
        patient_id: reference_id(patient_party(resource)),
        patient_name: reference_display_or(patient_party(resource), UNKNOWN_PATIENT),
        topic: resource
            .topic
            .as_ref()
            .map(|t| extract::codeable_concept(Some(t))),
        body,
        category: resource
            .category
            .first()
            .map(|c| extract::codeable_concept(Some(c))),
        sent: resource.sent.clone(),
        received: resource.received.clone(),
        read: resource.received.is_some(),
        status: MessageStatus::from_fhir(resource.status.as_deref()),
    }
}

/// Build a Communication from a validated message.
pub fn message_resource(input: &NewMessage) -> Communication {
    let patient = Reference::to(
        ResourceType::Patient,
        input.patient_id.as_str(),
        input.patient_name.as_ref().map(|n| n.as_str()),
    );
    let practitioner = Reference::to(
        ResourceType::Practitioner,
        input.practitioner_id.as_str(),
        input.practitioner_name.as_ref().map(|n| n.as_str()),
    );
    let (sender, recipient) = if input.from_patient {
        (patient.clone(), practitioner)
    } else {
        (practitioner, patient.clone())
    };

    Communication {
        status: Some(MessageStatus::Completed.as_str().to_string()),
        subject: Some(patient),
        topic: input
            .topic
            .as_ref()
            .map(|t| CodeableConcept::text(t.as_str())),
        sent: Some(input.sent.to_rfc3339()),
        recipient: vec![recipient],
        sender: Some(sender),
        payload: vec![CommunicationPayload::text(input.body.as_str())],
        ..Communication::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MessageForm;
    use chrono::{TimeZone, Utc};
    use fhir::{parse_resource, Attachment};
    use serde_json::json;

    #[test]
    fn payload_parts_join_into_body() {
        let resource = Communication {
            payload: vec![
                CommunicationPayload::text("Your results are in."),
                CommunicationPayload {
                    content_attachment: Some(Attachment {
                        title: Some("cbc.pdf".into()),
                        ..Attachment::default()
                    }),
                    ..CommunicationPayload::default()
                },
            ],
            ..Communication::default()
        };
        let view = communication(&resource);
        assert_eq!(view.body, "Your results are in.\ncbc.pdf");
        assert_eq!(view.sender_name, "Unknown");
        assert_eq!(view.status, MessageStatus::Unknown);
        assert!(!view.read);
    }

    #[test]
    fn patient_comes_from_subject_or_a_patient_party() {
        let resource: Communication = parse_resource(&json!({
            "resourceType": "Communication",
            "status": "completed",
            "sender": {"reference": "Patient/p-002", "display": "John Doe"},
            "recipient": [{"reference": "Practitioner/pr-001"}],
            "received": "2024-05-02T08:00:00Z"
        }))
        .expect("parse");
        let view = communication(&resource);
        assert_eq!(view.patient_id.as_deref(), Some("p-002"));
        assert_eq!(view.recipient_ids, vec!["pr-001".to_string()]);
        assert_eq!(view.recipient_names, vec!["Practitioner/pr-001".to_string()]);
        assert!(view.read);
        assert_eq!(view.patient_name, "John Doe");
        assert_eq!(
            communication(&Communication::default()).patient_name,
            UNKNOWN_PATIENT
        );
    }

    #[test]
    fn message_builder_orients_sender_and_recipient() {
        let sent = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("valid");
        let form = MessageForm {
            patient_id: "p-001".into(),
            patient_name: Some("Jane Smith".into()),
            practitioner_id: "pr-001".into(),
            practitioner_name: Some("Dr. Emily Carter".into()),
            topic: Some("Lab results".into()),
            body: "Please call the clinic.".into(),
            ..MessageForm::default()
        };

        let view = communication(&message_resource(&form.validate_at(sent).expect("valid")));
        assert_eq!(view.sender_name, "Dr. Emily Carter");
        assert_eq!(view.recipient_names, vec!["Jane Smith".to_string()]);
        assert_eq!(view.patient_id.as_deref(), Some("p-001"));
        assert_eq!(view.topic.as_deref(), Some("Lab results"));
        assert_eq!(view.sent.as_deref(), Some("2024-05-01T12:00:00+00:00"));

        let reply = MessageForm {
            from_patient: true,
            ..form
        };
        let view = communication(&message_resource(&reply.validate_at(sent).expect("valid")));
        assert_eq!(view.sender_id.as_deref(), Some("p-001"));
        assert_eq!(view.recipient_ids, vec!["pr-001".to_string()]);
    }
}
