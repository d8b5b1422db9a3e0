use super::id_of;
use crate::constants::{DEFAULT_APPOINTMENT_MINUTES, UNKNOWN_PATIENT, UNKNOWN_PROVIDER, UNTITLED_TASK};
use crate::input::{NewAppointment, NewTask};
use crate::mapping::{AppointmentStatus, Priority, TaskStatus};
use crate::views::{AppointmentView, TaskView};
use chrono::{DateTime, Duration};
use fhir::extract;
use fhir::reference::{reference_display_or, reference_id, reference_type};
use fhir::{
    Appointment, AppointmentParticipant, CodeableConcept, Period, Reference, ResourceType, Task,
    TaskRestriction,
};

fn participant_of(appointment: &Appointment, resource_type: ResourceType) -> Option<&Reference> {
    appointment
        .participant
        .iter()
        .filter_map(|p| p.actor.as_ref())
        .find(|actor| reference_type(actor) == Some(resource_type))
}

/// Minutes between two RFC 3339 instants, if both parse and `end` is after `start`.
fn minutes_between(start: Option<&str>, end: Option<&str>) -> Option<u32> {
    let start = DateTime::parse_from_rfc3339(start?).ok()?;
    let end = DateTime::parse_from_rfc3339(end?).ok()?;
    let minutes = (end - start).num_minutes();
    u32::try_from(minutes).ok().filter(|m| *m > 0)
}

pub fn appointment(resource: &Appointment) -> AppointmentView {
    let patient = participant_of(resource, ResourceType::Patient);
    let provider = participant_of(resource, ResourceType::Practitioner);

    let duration_minutes = resource
        .minutes_duration
        .filter(|m| *m > 0)
        .or_else(|| minutes_between(resource.start.as_deref(), resource.end.as_deref()))
        .unwrap_or(DEFAULT_APPOINTMENT_MINUTES);

    AppointmentView {
        id: id_of(&resource.id),
        patient_id: reference_id(patient),
        patient_name: reference_display_or(patient, UNKNOWN_PATIENT),
        provider_id: reference_id(provider),
        provider_name: reference_display_or(provider, UNKNOWN_PROVIDER),
        start: resource.start.clone(),
        end: resource.end.clone(),
        duration_minutes,
        status: AppointmentStatus::from_fhir(resource.status.as_deref()),
        appointment_type: extract::codeable_concept(
            resource
                .appointment_type
                .as_ref()
                .or_else(|| resource.service_type.first()),
        ),
        description: resource.description.clone(),
        comment: resource.comment.clone(),
    }
}

fn participant(actor: Reference) -> AppointmentParticipant {
    AppointmentParticipant {
        actor: Some(actor),
        required: Some("required".into()),
        status: Some("accepted".into()),
        ..AppointmentParticipant::default()
    }
}

/// Build an Appointment resource from validated booking input.
pub fn appointment_resource(input: &NewAppointment) -> Appointment {
    let end = input.start + Duration::minutes(i64::from(input.duration_minutes));

    let mut participants = vec![participant(Reference::to(
        ResourceType::Patient,
        input.patient_id.as_str(),
        input.patient_name.as_ref().map(|n| n.as_str()),
    ))];
    if let Some(provider_id) = &input.provider_id {
        participants.push(participant(Reference::to(
            ResourceType::Practitioner,
            provider_id.as_str(),
            input.provider_name.as_ref().map(|n| n.as_str()),
        )));
    }

    Appointment {
        status: Some(input.status.as_str().to_string()),
        appointment_type: input
            .appointment_type
            .as_ref()
            .map(|t| CodeableConcept::text(t.as_str())),
        description: input.description.as_ref().map(|d| d.as_str().to_string()),
        start: Some(input.start.to_rfc3339()),
        end: Some(end.to_rfc3339()),
        minutes_duration: Some(input.duration_minutes),
        participant: participants,
        ..Appointment::default()
    }
}

pub fn task(resource: &Task) -> TaskView {
    let description = resource
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .or_else(|| {
            resource
                .code
                .as_ref()
                .map(|c| extract::codeable_concept(Some(c)))
        })
        .unwrap_or_else(|| UNTITLED_TASK.to_string());

    let due_date = resource
        .restriction
        .as_ref()
        .and_then(|r| r.period.as_ref())
        .and_then(|p| p.end.clone())
        .or_else(|| {
            resource
                .execution_period
                .as_ref()
                .and_then(|p| p.end.clone())
        });

    let patient = resource.for_.as_ref();
    let owner = resource.owner.as_ref();
    let requester = resource.requester.as_ref();

    TaskView {
        id: id_of(&resource.id),
        description,
        status: TaskStatus::from_fhir(resource.status.as_deref()),
        priority: Priority::from_fhir(resource.priority.as_deref()),
        patient_id: reference_id(patient),
        patient_name: patient.map(|p| reference_display_or(Some(p), UNKNOWN_PATIENT)),
        owner_id: reference_id(owner),
        owner_name: owner.map(|o| reference_display_or(Some(o), UNKNOWN_PROVIDER)),
        requester_id: reference_id(requester),
        requester_name: requester.map(|r| reference_display_or(Some(r), UNKNOWN_PROVIDER)),
        due_date,
        authored_on: resource.authored_on.clone(),
    }
}

/// Build a Task resource from validated input.
pub fn task_resource(input: &NewTask) -> Task {
    Task {
        status: Some(input.status.to_fhir().to_string()),
        intent: Some("order".into()),
        priority: Some(input.priority.to_fhir().to_string()),
        description: Some(input.description.as_str().to_string()),
        for_: input.patient_id.as_ref().map(|id| {
            Reference::to(
                ResourceType::Patient,
                id.as_str(),
                input.patient_name.as_ref().map(|n| n.as_str()),
            )
        }),
        owner: input.owner_id.as_ref().map(|id| {
            Reference::to(
                ResourceType::Practitioner,
                id.as_str(),
                input.owner_name.as_ref().map(|n| n.as_str()),
            )
        }),
        restriction: input.due_date.map(|due| TaskRestriction {
            period: Some(Period {
                start: None,
                end: Some(due.format("%Y-%m-%d").to_string()),
            }),
            ..TaskRestriction::default()
        }),
        ..Task::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{AppointmentForm, TaskForm};
    use fhir::parse_resource;
    use serde_json::json;

    fn appointment_json(extra: serde_json::Value) -> Appointment {
        let mut value = json!({
            "resourceType": "Appointment",
            "id": "a-1",
            "status": "booked",
            "start": "2024-05-01T09:00:00Z",
            "participant": [
                {"actor": {"reference": "Patient/p-001", "display": "Jane Smith"}},
                {"actor": {"reference": "Practitioner/pr-001"}}
            ]
        });
        if let (Some(base), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        parse_resource(&value).expect("parse")
    }

    #[test]
    fn start_without_end_uses_default_duration() {
        let view = appointment(&appointment_json(json!({})));
        assert_eq!(view.duration_minutes, 30);
        assert_eq!(view.end, None);
    }

    #[test]
    fn duration_comes_from_minutes_then_end() {
        let explicit = appointment(&appointment_json(json!({
            "minutesDuration": 45,
            "end": "2024-05-01T09:15:00Z"
        })));
        assert_eq!(explicit.duration_minutes, 45);

        let computed = appointment(&appointment_json(json!({"end": "2024-05-01T09:20:00Z"})));
        assert_eq!(computed.duration_minutes, 20);

        let backwards = appointment(&appointment_json(json!({"end": "2024-05-01T08:00:00Z"})));
        assert_eq!(backwards.duration_minutes, 30);
    }

    #[test]
    fn participants_resolve_from_display_or_path() {
        let view = appointment(&appointment_json(json!({})));
        assert_eq!(view.patient_id.as_deref(), Some("p-001"));
        assert_eq!(view.patient_name, "Jane Smith");
        assert_eq!(view.provider_id.as_deref(), Some("pr-001"));
        assert_eq!(view.provider_name, "Practitioner/pr-001");
        assert_eq!(view.status, AppointmentStatus::Booked);
        assert_eq!(view.appointment_type, "Unknown");
    }

    #[test]
    fn empty_appointment_gets_placeholders() {
        let view = appointment(&Appointment::default());
        assert_eq!(view.patient_name, UNKNOWN_PATIENT);
        assert_eq!(view.provider_name, UNKNOWN_PROVIDER);
        assert_eq!(view.status, AppointmentStatus::Unknown);
        assert_eq!(view.duration_minutes, DEFAULT_APPOINTMENT_MINUTES);
    }

    #[test]
    fn booking_builds_end_from_duration() {
        let input = AppointmentForm {
            patient_id: "p-001".into(),
            patient_name: Some("Jane Smith".into()),
            provider_id: Some("pr-001".into()),
            start: "2024-05-01T09:00:00Z".into(),
            duration_minutes: Some(15),
            appointment_type: Some("Follow-up".into()),
            ..AppointmentForm::default()
        }
        .validate()
        .expect("valid");

        let view = appointment(&appointment_resource(&input));
        assert_eq!(view.end.as_deref(), Some("2024-05-01T09:15:00+00:00"));
        assert_eq!(view.duration_minutes, 15);
        assert_eq!(view.patient_name, "Jane Smith");
        assert_eq!(view.provider_id.as_deref(), Some("pr-001"));
        assert_eq!(view.appointment_type, "Follow-up");
    }

    #[test]
    fn task_description_falls_back_to_code_then_placeholder() {
        let coded = Task {
            code: Some(CodeableConcept::text("Medication review")),
            ..Task::default()
        };
        assert_eq!(task(&coded).description, "Medication review");
        assert_eq!(task(&Task::default()).description, UNTITLED_TASK);
        assert_eq!(task(&Task::default()).patient_name, None);
    }

    #[test]
    fn task_round_trip_keeps_status_priority_and_due_date() {
        let input = TaskForm {
            description: "Call patient with results".into(),
            patient_id: Some("p-002".into()),
            owner_id: Some("pr-002".into()),
            priority: Some("urgent".into()),
            status: Some("in_progress".into()),
            due_date: Some("2024-06-30".into()),
            ..TaskForm::default()
        }
        .validate()
        .expect("valid");

        let view = task(&task_resource(&input));
        assert_eq!(view.description, "Call patient with results");
        assert_eq!(view.priority, Priority::Urgent);
        assert_eq!(view.status, TaskStatus::InProgress);
        assert_eq!(view.due_date.as_deref(), Some("2024-06-30"));
        assert_eq!(view.patient_id.as_deref(), Some("p-002"));
        assert_eq!(view.patient_name.as_deref(), Some("Patient/p-002"));
        assert_eq!(view.owner_id.as_deref(), Some("pr-002"));
    }
}
