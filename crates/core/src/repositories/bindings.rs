//! Bindings between FHIR resource types and their view-models.
//!
//! A [`Binding`] tells a [`Collection`](super::Collection) which wire model to
//! parse, how to convert it, which search parameters the server understands,
//! and which fixtures to serve when the server is unavailable. Each binding is
//! a zero-sized marker type.

use crate::convert;
use crate::fixtures;
use crate::mapping::{OrderStatus, TaskStatus};
use crate::query::{no_sort, status_as_is, SearchMapping};
use crate::views::{
    AppointmentView, CommunicationView, CoverageView, InvoiceView, OrderView, PatientView,
    PractitionerView, TaskView, ViewModel,
};
use fhir::{Resource, ResourceType};

pub trait Binding: Send + Sync + 'static {
    type Resource: Resource + Send + Sync;
    type View: ViewModel;

    const SEARCH: SearchMapping;

    fn convert(resource: &Self::Resource) -> Self::View;

    fn fixtures() -> Vec<Self::View>;

    fn resource_type() -> ResourceType {
        <Self::Resource as Resource>::TYPE
    }
}

fn active_flag(label: &str) -> Option<(&'static str, String)> {
    match label.trim().to_ascii_lowercase().as_str() {
        "active" => Some(("active", "true".into())),
        "inactive" => Some(("active", "false".into())),
        _ => None,
    }
}

fn order_status(label: &str) -> Option<(&'static str, String)> {
    OrderStatus::parse_label(label).map(|s| ("status", s.fhir_codes().join(",")))
}

fn task_status(label: &str) -> Option<(&'static str, String)> {
    TaskStatus::parse_label(label).map(|s| ("status", s.fhir_codes().join(",")))
}

fn patient_sort(field: &str) -> Option<&'static str> {
    match field {
        "name" | "family_name" => Some("family"),
        "birth_date" => Some("birthdate"),
        "last_updated" => Some("_lastUpdated"),
        _ => None,
    }
}

fn practitioner_sort(field: &str) -> Option<&'static str> {
    match field {
        "name" => Some("family"),
        _ => None,
    }
}

fn appointment_sort(field: &str) -> Option<&'static str> {
    match field {
        "start" | "date" => Some("date"),
        _ => None,
    }
}

fn service_request_sort(field: &str) -> Option<&'static str> {
    match field {
        "authored_on" | "date" => Some("authored"),
        _ => None,
    }
}

fn medication_request_sort(field: &str) -> Option<&'static str> {
    match field {
        "authored_on" | "date" => Some("authoredon"),
        _ => None,
    }
}

fn communication_sort(field: &str) -> Option<&'static str> {
    match field {
        "sent" | "date" => Some("sent"),
        _ => None,
    }
}

fn invoice_sort(field: &str) -> Option<&'static str> {
    match field {
        "date" => Some("date"),
        _ => None,
    }
}

// ============================================================================
// People
// ============================================================================

pub struct Patients;

impl Binding for Patients {
    type Resource = fhir::Patient;
    type View = PatientView;

    const SEARCH: SearchMapping = SearchMapping {
        patient: None,
        date: Some("birthdate"),
        status: active_flag,
        sort: patient_sort,
    };

    fn convert(resource: &fhir::Patient) -> PatientView {
        convert::patient(resource)
    }

    fn fixtures() -> Vec<PatientView> {
        fixtures::patients()
    }
}

pub struct Practitioners;

impl Binding for Practitioners {
    type Resource = fhir::Practitioner;
    type View = PractitionerView;

    const SEARCH: SearchMapping = SearchMapping {
        patient: None,
        date: None,
        status: active_flag,
        sort: practitioner_sort,
    };

    fn convert(resource: &fhir::Practitioner) -> PractitionerView {
        convert::practitioner(resource)
    }

    fn fixtures() -> Vec<PractitionerView> {
        fixtures::practitioners()
    }
}

// ============================================================================
// Scheduling
// ============================================================================

pub struct Appointments;

impl Binding for Appointments {
    type Resource = fhir::Appointment;
    type View = AppointmentView;

    const SEARCH: SearchMapping = SearchMapping {
        patient: Some("patient"),
        date: Some("date"),
        status: status_as_is,
        sort: appointment_sort,
    };

    fn convert(resource: &fhir::Appointment) -> AppointmentView {
        convert::appointment(resource)
    }

    fn fixtures() -> Vec<AppointmentView> {
        fixtures::appointments()
    }
}

pub struct Tasks;

impl Binding for Tasks {
    type Resource = fhir::Task;
    type View = TaskView;

    const SEARCH: SearchMapping = SearchMapping {
        patient: Some("patient"),
        date: None,
        status: task_status,
        sort: no_sort,
    };

    fn convert(resource: &fhir::Task) -> TaskView {
        convert::task(resource)
    }

    fn fixtures() -> Vec<TaskView> {
        fixtures::tasks()
    }
}

// ============================================================================
// Orders
// ============================================================================

pub struct ServiceRequests;

impl Binding for ServiceRequests {
    type Resource = fhir::ServiceRequest;
    type View = OrderView;

    const SEARCH: SearchMapping = SearchMapping {
        patient: Some("subject"),
        date: Some("authored"),
        status: order_status,
        sort: service_request_sort,
    };

    fn convert(resource: &fhir::ServiceRequest) -> OrderView {
        convert::service_request(resource)
    }

    fn fixtures() -> Vec<OrderView> {
        fixtures::service_requests()
    }
}

pub struct MedicationRequests;

impl Binding for MedicationRequests {
    type Resource = fhir::MedicationRequest;
    type View = OrderView;

    const SEARCH: SearchMapping = SearchMapping {
        patient: Some("subject"),
        date: Some("authoredon"),
        status: order_status,
        sort: medication_request_sort,
    };

    fn convert(resource: &fhir::MedicationRequest) -> OrderView {
        convert::medication_request(resource)
    }

    fn fixtures() -> Vec<OrderView> {
        fixtures::medication_requests()
    }
}

// ============================================================================
// Messaging and billing
// ============================================================================

pub struct Communications;

impl Binding for Communications {
    type Resource = fhir::Communication;
    type View = CommunicationView;

    const SEARCH: SearchMapping = SearchMapping {
        patient: Some("patient"),
        date: Some("sent"),
        status: status_as_is,
        sort: communication_sort,
    };

    fn convert(resource: &fhir::Communication) -> CommunicationView {
        convert::communication(resource)
    }

    fn fixtures() -> Vec<CommunicationView> {
        fixtures::communications()
    }
}

pub struct Invoices;

impl Binding for Invoices {
    type Resource = fhir::Invoice;
    type View = InvoiceView;

    const SEARCH: SearchMapping = SearchMapping {
        patient: Some("patient"),
        date: Some("date"),
        status: status_as_is,
        sort: invoice_sort,
    };

    fn convert(resource: &fhir::Invoice) -> InvoiceView {
        convert::invoice(resource)
    }

    fn fixtures() -> Vec<InvoiceView> {
        fixtures::invoices()
    }
}

pub struct Coverages;

impl Binding for Coverages {
    type Resource = fhir::Coverage;
    type View = CoverageView;

    const SEARCH: SearchMapping = SearchMapping {
        patient: Some("beneficiary"),
        date: None,
        status: status_as_is,
        sort: no_sort,
    };

    fn convert(resource: &fhir::Coverage) -> CoverageView {
        convert::coverage(resource)
    }

    fn fixtures() -> Vec<CoverageView> {
        fixtures::coverages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ListQuery;

    #[test]
    fn patient_status_maps_to_active_flag() {
        let query = ListQuery {
            status: Some("inactive".into()),
            ..ListQuery::default()
        };
        assert_eq!(
            query.to_search_params(&Patients::SEARCH).get("active"),
            Some("false")
        );
    }

    #[test]
    fn order_status_expands_to_fhir_codes() {
        let query = ListQuery {
            status: Some("cancelled".into()),
            ..ListQuery::default()
        };
        assert_eq!(
            query.to_search_params(&ServiceRequests::SEARCH).get("status"),
            Some("cancelled,revoked,stopped")
        );

        let unknown = ListQuery {
            status: Some("archived".into()),
            ..ListQuery::default()
        };
        assert_eq!(unknown.to_search_params(&Tasks::SEARCH).get("status"), None);
    }

    #[test]
    fn resource_types_follow_the_wire_model() {
        assert_eq!(Patients::resource_type(), ResourceType::Patient);
        assert_eq!(
            MedicationRequests::resource_type(),
            ResourceType::MedicationRequest
        );
        assert_eq!(Coverages::resource_type(), ResourceType::Coverage);
    }
}
