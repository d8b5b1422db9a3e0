//! Flat view-models rebuilt from FHIR resources on every fetch.
//!
//! View-models have no identity beyond the source resource id and are never
//! persisted. Each implements [`ViewModel`], which gives the query layer the
//! fields it filters and sorts on, so the same client-side logic runs over live
//! results and over fixtures.

use crate::mapping::{
    AppointmentStatus, CoverageStatus, InvoiceStatus, MessageStatus, OrderStatus, Priority,
    TaskStatus,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use utoipa::ToSchema;

/// A comparable value for client-side sorting.
#[derive(Clone, Debug, PartialEq)]
pub enum SortKey {
    Text(String),
    Number(f64),
}

impl SortKey {
    pub fn text(s: &str) -> Self {
        SortKey::Text(s.to_lowercase())
    }

    /// Total order: numbers before text, NaN equal to itself.
    pub fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

/// Fields of a view-model that the query layer filters and sorts on.
pub trait ViewModel: Clone + Serialize + Send + Sync + 'static {
    fn id(&self) -> &str;

    /// Replace the id, used when fabricating a local placeholder.
    fn set_id(&mut self, id: String);

    /// Text fields matched case-insensitively by free-text search.
    fn search_fields(&self) -> Vec<&str>;

    /// Status label in the view vocabulary, if the view has a status.
    fn status_label(&self) -> Option<&str> {
        None
    }

    /// Id of the patient this view belongs to.
    fn patient_id(&self) -> Option<&str> {
        None
    }

    /// Primary date (ISO 8601) used by date range filters.
    fn date(&self) -> Option<&str> {
        None
    }

    /// Value of a named field for sorting; `None` sorts last.
    fn sort_key(&self, field: &str) -> Option<SortKey>;
}

// ============================================================================
// Patient
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientView {
    pub id: String,
    pub name: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub gender: String,
    pub active: bool,
    pub address: String,
    pub mrn: Option<String>,
    pub insurance: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub last_updated: Option<String>,
}

impl ViewModel for PatientView {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.id.as_str(), self.name.as_str()];
        fields.extend(self.email.as_deref());
        fields.extend(self.phone.as_deref());
        fields.extend(self.mrn.as_deref());
        fields
    }

    fn status_label(&self) -> Option<&str> {
        Some(if self.active { "active" } else { "inactive" })
    }

    fn patient_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn date(&self) -> Option<&str> {
        self.birth_date.as_deref()
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "name" => Some(SortKey::text(&self.name)),
            "family_name" => self.family_name.as_deref().map(SortKey::text),
            "birth_date" => self.birth_date.as_deref().map(SortKey::text),
            "email" => self.email.as_deref().map(SortKey::text),
            "last_updated" => self.last_updated.as_deref().map(SortKey::text),
            "id" => Some(SortKey::text(&self.id)),
            _ => None,
        }
    }
}

// ============================================================================
// Practitioner
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PractitionerView {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub npi: Option<String>,
    pub specialty: String,
    pub active: bool,
    pub address: String,
}

impl ViewModel for PractitionerView {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.id.as_str(), self.name.as_str(), self.specialty.as_str()];
        fields.extend(self.email.as_deref());
        fields.extend(self.npi.as_deref());
        fields
    }

    fn status_label(&self) -> Option<&str> {
        Some(if self.active { "active" } else { "inactive" })
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "name" => Some(SortKey::text(&self.name)),
            "specialty" => Some(SortKey::text(&self.specialty)),
            "id" => Some(SortKey::text(&self.id)),
            _ => None,
        }
    }
}

// ============================================================================
// Appointment
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AppointmentView {
    pub id: String,
    pub patient_id: Option<String>,
    pub patient_name: String,
    pub provider_id: Option<String>,
    pub provider_name: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub duration_minutes: u32,
    pub status: AppointmentStatus,
    pub appointment_type: String,
    pub description: Option<String>,
    pub comment: Option<String>,
}

impl ViewModel for AppointmentView {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.id.as_str(),
            self.patient_name.as_str(),
            self.provider_name.as_str(),
            self.appointment_type.as_str(),
        ];
        fields.extend(self.description.as_deref());
        fields
    }

    fn status_label(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    fn date(&self) -> Option<&str> {
        self.start.as_deref()
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "start" | "date" => self.start.as_deref().map(SortKey::text),
            "patient_name" => Some(SortKey::text(&self.patient_name)),
            "provider_name" => Some(SortKey::text(&self.provider_name)),
            "duration_minutes" => Some(SortKey::Number(f64::from(self.duration_minutes))),
            "status" => Some(SortKey::text(self.status.as_str())),
            _ => None,
        }
    }
}

// ============================================================================
// Order (ServiceRequest / MedicationRequest)
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Service,
    Medication,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderView {
    pub id: String,
    pub kind: OrderKind,
    pub patient_id: Option<String>,
    pub patient_name: String,
    pub requester_id: Option<String>,
    pub requester_name: String,
    pub category: String,
    pub description: String,
    pub priority: Priority,
    pub status: OrderStatus,
    pub authored_on: Option<String>,
    pub notes: Option<String>,
}

impl ViewModel for OrderView {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.id.as_str(),
            self.patient_name.as_str(),
            self.requester_name.as_str(),
            self.category.as_str(),
            self.description.as_str(),
        ]
    }

    fn status_label(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    fn date(&self) -> Option<&str> {
        self.authored_on.as_deref()
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "authored_on" | "date" => self.authored_on.as_deref().map(SortKey::text),
            "priority" => Some(SortKey::Number(self.priority as u8 as f64)),
            "patient_name" => Some(SortKey::text(&self.patient_name)),
            "status" => Some(SortKey::text(self.status.as_str())),
            _ => None,
        }
    }
}

// ============================================================================
// Task
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskView {
    pub id: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub owner_id: Option<String>,
    pub owner_name: Option<String>,
    pub requester_id: Option<String>,
    pub requester_name: Option<String>,
    pub due_date: Option<String>,
    pub authored_on: Option<String>,
}

impl ViewModel for TaskView {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.id.as_str(), self.description.as_str()];
        fields.extend(self.patient_name.as_deref());
        fields.extend(self.owner_name.as_deref());
        fields
    }

    fn status_label(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    fn date(&self) -> Option<&str> {
        self.due_date.as_deref()
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "due_date" | "date" => self.due_date.as_deref().map(SortKey::text),
            "priority" => Some(SortKey::Number(self.priority as u8 as f64)),
            "description" => Some(SortKey::text(&self.description)),
            "authored_on" => self.authored_on.as_deref().map(SortKey::text),
            "status" => Some(SortKey::text(self.status.as_str())),
            _ => None,
        }
    }
}

// ============================================================================
// Communication
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CommunicationView {
    pub id: String,
    pub sender_id: Option<String>,
    pub sender_name: String,
    pub recipient_ids: Vec<String>,
    pub recipient_names: Vec<String>,
    pub patient_id: Option<String>,
    pub patient_name: String,
    pub topic: Option<String>,
    pub body: String,
    pub category: Option<String>,
    pub sent: Option<String>,
    pub received: Option<String>,
    pub read: bool,
    pub status: MessageStatus,
}

impl ViewModel for CommunicationView {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.id.as_str(),
            self.sender_name.as_str(),
            self.patient_name.as_str(),
            self.body.as_str(),
        ];
        fields.extend(self.topic.as_deref());
        fields.extend(self.recipient_names.iter().map(String::as_str));
        fields
    }

    fn status_label(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    fn date(&self) -> Option<&str> {
        self.sent.as_deref()
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "sent" | "date" => self.sent.as_deref().map(SortKey::text),
            "sender_name" => Some(SortKey::text(&self.sender_name)),
            "topic" => self.topic.as_deref().map(SortKey::text),
            _ => None,
        }
    }
}

// ============================================================================
// Invoice
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvoiceView {
    pub id: String,
    pub patient_id: Option<String>,
    pub patient_name: String,
    pub issuer_name: Option<String>,
    pub date: Option<String>,
    pub status: InvoiceStatus,
    pub description: Option<String>,
    pub total: String,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub line_items: usize,
}

impl ViewModel for InvoiceView {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.id.as_str(), self.patient_name.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }

    fn status_label(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "date" => self.date.as_deref().map(SortKey::text),
            "amount" => self.amount.map(SortKey::Number),
            "patient_name" => Some(SortKey::text(&self.patient_name)),
            "status" => Some(SortKey::text(self.status.as_str())),
            _ => None,
        }
    }
}

// ============================================================================
// Coverage
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CoverageView {
    pub id: String,
    pub patient_id: Option<String>,
    pub patient_name: String,
    pub payor_name: String,
    pub subscriber_id: Option<String>,
    pub plan_type: String,
    pub group: Option<String>,
    pub plan: Option<String>,
    pub relationship: String,
    pub period: String,
    pub period_start: Option<String>,
    pub status: CoverageStatus,
}

impl ViewModel for CoverageView {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.id.as_str(),
            self.patient_name.as_str(),
            self.payor_name.as_str(),
        ];
        fields.extend(self.subscriber_id.as_deref());
        fields.extend(self.plan.as_deref());
        fields
    }

    fn status_label(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    fn date(&self) -> Option<&str> {
        self.period_start.as_deref()
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "payor_name" => Some(SortKey::text(&self.payor_name)),
            "patient_name" => Some(SortKey::text(&self.patient_name)),
            "period_start" | "date" => self.period_start.as_deref().map(SortKey::text),
            _ => None,
        }
    }
}
