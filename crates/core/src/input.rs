//! Form input for writes.
//!
//! Each `*Form` is the raw shape a caller submits (plain strings, everything
//! optional except what the form requires). `validate()` turns it into the
//! matching `New*` value, whose fields are already trimmed and checked, so the
//! resource builders in [`crate::convert`] never see invalid input and invalid
//! input never reaches the FHIR server.

use crate::constants::DEFAULT_APPOINTMENT_MINUTES;
use crate::mapping::{AppointmentStatus, OrderStatus, Priority, TaskStatus};
use crate::{CoreError, CoreResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use telecare_types::{EmailAddress, NonEmptyText};
use utoipa::ToSchema;

fn required(field: &str, value: &str) -> CoreResult<NonEmptyText> {
    NonEmptyText::new(value).map_err(|e| CoreError::InvalidInput(format!("{field}: {e}")))
}

fn optional(value: &Option<String>) -> Option<NonEmptyText> {
    NonEmptyText::optional(value.as_deref())
}

fn date(field: &str, value: &Option<String>) -> CoreResult<Option<NaiveDate>> {
    optional(value)
        .map(|v| {
            NaiveDate::parse_from_str(v.as_str(), "%Y-%m-%d").map_err(|e| {
                CoreError::InvalidInput(format!("{field} '{v}' is not a YYYY-MM-DD date: {e}"))
            })
        })
        .transpose()
}

// ============================================================================
// Patient
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientForm {
    pub given_name: String,
    pub family_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// `YYYY-MM-DD`.
    pub birth_date: Option<String>,
    /// `male | female | other | unknown`.
    pub gender: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub mrn: Option<String>,
    pub insurance: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub active: Option<bool>,
}

/// A validated patient registration or demographics update.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPatient {
    pub given_name: NonEmptyText,
    pub family_name: NonEmptyText,
    pub email: Option<EmailAddress>,
    pub phone: Option<NonEmptyText>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address_line: Option<NonEmptyText>,
    pub city: Option<NonEmptyText>,
    pub state: Option<NonEmptyText>,
    pub postal_code: Option<NonEmptyText>,
    pub mrn: Option<NonEmptyText>,
    pub insurance: Option<NonEmptyText>,
    pub emergency_contact: Option<NonEmptyText>,
    pub emergency_phone: Option<NonEmptyText>,
    pub active: bool,
}

impl PatientForm {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if a name is blank, the email or
    /// birth date is malformed, or the gender is outside the FHIR value set.
    pub fn validate(&self) -> CoreResult<NewPatient> {
        let email = optional(&self.email)
            .map(|e| EmailAddress::parse(e.as_str()))
            .transpose()?;

        let gender = optional(&self.gender)
            .map(|g| {
                let g = g.as_str().to_ascii_lowercase();
                if matches!(g.as_str(), "male" | "female" | "other" | "unknown") {
                    Ok(g)
                } else {
                    Err(CoreError::InvalidInput(format!(
                        "gender '{g}' must be one of male, female, other, unknown"
                    )))
                }
            })
            .transpose()?;

        Ok(NewPatient {
            given_name: required("given_name", &self.given_name)?,
            family_name: required("family_name", &self.family_name)?,
            email,
            phone: optional(&self.phone),
            birth_date: date("birth_date", &self.birth_date)?,
            gender,
            address_line: optional(&self.address_line),
            city: optional(&self.city),
            state: optional(&self.state),
            postal_code: optional(&self.postal_code),
            mrn: optional(&self.mrn),
            insurance: optional(&self.insurance),
            emergency_contact: optional(&self.emergency_contact),
            emergency_phone: optional(&self.emergency_phone),
            active: self.active.unwrap_or(true),
        })
    }
}

// ============================================================================
// Appointment
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AppointmentForm {
    pub patient_id: String,
    pub patient_name: Option<String>,
    pub provider_id: Option<String>,
    pub provider_name: Option<String>,
    /// RFC 3339 start time.
    pub start: String,
    pub duration_minutes: Option<u32>,
    pub appointment_type: Option<String>,
    pub description: Option<String>,
    /// FHIR appointment status; defaults to `booked`.
    pub status: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewAppointment {
    pub patient_id: NonEmptyText,
    pub patient_name: Option<NonEmptyText>,
    pub provider_id: Option<NonEmptyText>,
    pub provider_name: Option<NonEmptyText>,
    pub start: DateTime<Utc>,
    pub duration_minutes: u32,
    pub appointment_type: Option<NonEmptyText>,
    pub description: Option<NonEmptyText>,
    pub status: AppointmentStatus,
}

impl AppointmentForm {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if the patient is missing, the start
    /// is not RFC 3339, the duration is zero, or the status is not a FHIR
    /// appointment status.
    pub fn validate(&self) -> CoreResult<NewAppointment> {
        let start = DateTime::parse_from_rfc3339(self.start.trim())
            .map_err(|e| {
                CoreError::InvalidInput(format!("start '{}' is not RFC 3339: {e}", self.start))
            })?
            .with_timezone(&Utc);

        let duration_minutes = self.duration_minutes.unwrap_or(DEFAULT_APPOINTMENT_MINUTES);
        if duration_minutes == 0 {
            return Err(CoreError::InvalidInput(
                "duration_minutes must be greater than zero".into(),
            ));
        }

        let status = match optional(&self.status) {
            None => AppointmentStatus::Booked,
            Some(code) => match AppointmentStatus::from_fhir(Some(code.as_str())) {
                AppointmentStatus::Unknown => {
                    return Err(CoreError::InvalidInput(format!(
                        "status '{code}' is not an appointment status"
                    )))
                }
                status => status,
            },
        };

        Ok(NewAppointment {
            patient_id: required("patient_id", &self.patient_id)?,
            patient_name: optional(&self.patient_name),
            provider_id: optional(&self.provider_id),
            provider_name: optional(&self.provider_name),
            start,
            duration_minutes,
            appointment_type: optional(&self.appointment_type),
            description: optional(&self.description),
            status,
        })
    }
}

// ============================================================================
// Task
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskForm {
    pub description: String,
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub owner_id: Option<String>,
    pub owner_name: Option<String>,
    /// `low | medium | high | urgent`.
    pub priority: Option<String>,
    /// `pending | in_progress | completed | cancelled`.
    pub status: Option<String>,
    /// `YYYY-MM-DD`.
    pub due_date: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewTask {
    pub description: NonEmptyText,
    pub patient_id: Option<NonEmptyText>,
    pub patient_name: Option<NonEmptyText>,
    pub owner_id: Option<NonEmptyText>,
    pub owner_name: Option<NonEmptyText>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
}

impl TaskForm {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] for a blank description, an unknown
    /// priority or status label, or a malformed due date.
    pub fn validate(&self) -> CoreResult<NewTask> {
        let priority = match optional(&self.priority) {
            None => Priority::default(),
            Some(label) => Priority::parse_label(label.as_str()).ok_or_else(|| {
                CoreError::InvalidInput(format!("priority '{label}' is not recognised"))
            })?,
        };
        let status = match optional(&self.status) {
            None => TaskStatus::default(),
            Some(label) => TaskStatus::parse_label(label.as_str()).ok_or_else(|| {
                CoreError::InvalidInput(format!("status '{label}' is not recognised"))
            })?,
        };

        Ok(NewTask {
            description: required("description", &self.description)?,
            patient_id: optional(&self.patient_id),
            patient_name: optional(&self.patient_name),
            owner_id: optional(&self.owner_id),
            owner_name: optional(&self.owner_name),
            priority,
            status,
            due_date: date("due_date", &self.due_date)?,
        })
    }
}

// ============================================================================
// Message
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MessageForm {
    pub patient_id: String,
    pub patient_name: Option<String>,
    pub practitioner_id: String,
    pub practitioner_name: Option<String>,
    /// Whether the patient is the sender; otherwise the practitioner sends.
    #[serde(default)]
    pub from_patient: bool,
    pub topic: Option<String>,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewMessage {
    pub patient_id: NonEmptyText,
    pub patient_name: Option<NonEmptyText>,
    pub practitioner_id: NonEmptyText,
    pub practitioner_name: Option<NonEmptyText>,
    pub from_patient: bool,
    pub topic: Option<NonEmptyText>,
    pub body: NonEmptyText,
    pub sent: DateTime<Utc>,
}

impl MessageForm {
    /// Validate the form, stamping it as sent now.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if either party or the body is blank.
    pub fn validate(&self) -> CoreResult<NewMessage> {
        self.validate_at(Utc::now())
    }

    pub fn validate_at(&self, sent: DateTime<Utc>) -> CoreResult<NewMessage> {
        Ok(NewMessage {
            patient_id: required("patient_id", &self.patient_id)?,
            patient_name: optional(&self.patient_name),
            practitioner_id: required("practitioner_id", &self.practitioner_id)?,
            practitioner_name: optional(&self.practitioner_name),
            from_patient: self.from_patient,
            topic: optional(&self.topic),
            body: required("body", &self.body)?,
            sent,
        })
    }
}

// ============================================================================
// Order
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderForm {
    pub patient_id: String,
    pub patient_name: Option<String>,
    pub requester_id: Option<String>,
    pub requester_name: Option<String>,
    /// e.g. `Laboratory`, `Imaging`, `Referral`.
    pub category: Option<String>,
    pub description: String,
    /// `low | medium | high | urgent`.
    pub priority: Option<String>,
    /// `pending | in_progress | completed | cancelled`; defaults to `in_progress`.
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewOrder {
    pub patient_id: NonEmptyText,
    pub patient_name: Option<NonEmptyText>,
    pub requester_id: Option<NonEmptyText>,
    pub requester_name: Option<NonEmptyText>,
    pub category: Option<NonEmptyText>,
    pub description: NonEmptyText,
    pub priority: Priority,
    pub status: OrderStatus,
    pub notes: Option<NonEmptyText>,
}

impl OrderForm {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if the patient or description is
    /// blank, or a priority or status label is not recognised.
    pub fn validate(&self) -> CoreResult<NewOrder> {
        let priority = match optional(&self.priority) {
            None => Priority::default(),
            Some(label) => Priority::parse_label(label.as_str()).ok_or_else(|| {
                CoreError::InvalidInput(format!("priority '{label}' is not recognised"))
            })?,
        };
        let status = match optional(&self.status) {
            None => OrderStatus::InProgress,
            Some(label) => OrderStatus::parse_label(label.as_str()).ok_or_else(|| {
                CoreError::InvalidInput(format!("status '{label}' is not recognised"))
            })?,
        };

        Ok(NewOrder {
            patient_id: required("patient_id", &self.patient_id)?,
            patient_name: optional(&self.patient_name),
            requester_id: optional(&self.requester_id),
            requester_name: optional(&self.requester_name),
            category: optional(&self.category),
            description: required("description", &self.description)?,
            priority,
            status,
            notes: optional(&self.notes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient_form() -> PatientForm {
        PatientForm {
            given_name: " Jane ".into(),
            family_name: "Smith".into(),
            email: Some("Jane.Smith@Example.com".into()),
            birth_date: Some("1985-03-14".into()),
            gender: Some("Female".into()),
            phone: Some("   ".into()),
            ..PatientForm::default()
        }
    }

    #[test]
    fn patient_form_trims_and_normalises() {
        let patient = patient_form().validate().expect("valid");
        assert_eq!(patient.given_name.as_str(), "Jane");
        assert_eq!(
            patient.email.as_ref().map(EmailAddress::as_str),
            Some("jane.smith@example.com")
        );
        assert_eq!(patient.gender.as_deref(), Some("female"));
        assert_eq!(patient.phone, None);
        assert!(patient.active);
    }

    #[test]
    fn patient_form_rejects_bad_fields() {
        let blank_name = PatientForm {
            family_name: " ".into(),
            ..patient_form()
        };
        assert!(matches!(
            blank_name.validate(),
            Err(CoreError::InvalidInput(msg)) if msg.starts_with("family_name")
        ));

        let bad_email = PatientForm {
            email: Some("jane-at-example".into()),
            ..patient_form()
        };
        assert!(matches!(bad_email.validate(), Err(CoreError::InvalidInput(_))));

        let bad_date = PatientForm {
            birth_date: Some("14/03/1985".into()),
            ..patient_form()
        };
        assert!(matches!(bad_date.validate(), Err(CoreError::InvalidInput(_))));

        let bad_gender = PatientForm {
            gender: Some("robot".into()),
            ..patient_form()
        };
        assert!(matches!(bad_gender.validate(), Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn appointment_form_defaults_and_checks() {
        let form = AppointmentForm {
            patient_id: "p-001".into(),
            start: "2024-05-01T09:00:00+01:00".into(),
            ..AppointmentForm::default()
        };
        let appt = form.validate().expect("valid");
        assert_eq!(appt.duration_minutes, DEFAULT_APPOINTMENT_MINUTES);
        assert_eq!(appt.status, AppointmentStatus::Booked);
        assert_eq!(appt.start.to_rfc3339(), "2024-05-01T08:00:00+00:00");

        let zero = AppointmentForm {
            duration_minutes: Some(0),
            ..form.clone()
        };
        assert!(zero.validate().is_err());

        let bad_status = AppointmentForm {
            status: Some("rescheduled".into()),
            ..form
        };
        assert!(bad_status.validate().is_err());
    }

    #[test]
    fn task_and_order_labels_are_checked() {
        let task = TaskForm {
            description: "Call back about labs".into(),
            priority: Some("High".into()),
            ..TaskForm::default()
        }
        .validate()
        .expect("valid");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.status, TaskStatus::Pending);

        let bad = TaskForm {
            description: "x".into(),
            status: Some("done".into()),
            ..TaskForm::default()
        };
        assert!(bad.validate().is_err());

        let order = OrderForm {
            patient_id: "p-001".into(),
            description: "CBC".into(),
            ..OrderForm::default()
        }
        .validate()
        .expect("valid");
        assert_eq!(order.status, OrderStatus::InProgress);
        assert_eq!(order.priority, Priority::Medium);
    }

    #[test]
    fn message_requires_body() {
        let form = MessageForm {
            patient_id: "p-001".into(),
            practitioner_id: "pr-001".into(),
            body: "  ".into(),
            ..MessageForm::default()
        };
        assert!(form.validate().is_err());
    }
}
