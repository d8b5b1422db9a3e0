//! Resource converters.
//!
//! One pure function per resource maps a typed FHIR wire model onto its flat
//! view-model; a matching `*_resource` builder maps validated form input back
//! onto a FHIR resource for writes. Converters borrow their input, never
//! mutate it, and fill every missing element with a documented placeholder.

mod billing;
mod messaging;
mod orders;
mod people;
mod scheduling;

pub use billing::{coverage, invoice};
pub use messaging::{communication, message_resource};
pub use orders::{medication_request, order_resource, service_request};
pub use people::{patient, patient_resource, practitioner};
pub use scheduling::{appointment, appointment_resource, task, task_resource};

/// The resource id, or an empty string for a resource that has not been stored yet.
fn id_of(id: &Option<String>) -> String {
    id.clone().unwrap_or_default()
}
