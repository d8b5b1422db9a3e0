//! Data access.
//!
//! Each FHIR resource type the practice reads gets a [`Binding`] and is served
//! by a generic [`Collection`], which implements the live fetch, the query
//! cache, the fixture fallback and degraded writes once for every type.
//! [`Practice`] bundles the collections behind one client.

mod bindings;
mod collection;
mod practice;

pub use bindings::{
    Appointments, Binding, Communications, Coverages, Invoices, MedicationRequests, Patients,
    Practitioners, ServiceRequests, Tasks,
};
pub use collection::{
    local_id, AppointmentRecord, AppointmentWrite, Collection, CommunicationRecord,
    CommunicationWrite, CoverageRecord, Fetched, InvoiceRecord, OrderRecord, OrderWrite,
    PatientRecord, PatientWrite, PractitionerRecord, TaskRecord, TaskWrite, WriteOutcome,
};
pub use practice::{Practice, ServerHealth};
