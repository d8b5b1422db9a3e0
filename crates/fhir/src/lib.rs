//! FHIR R4 wire models and display helpers for the telecare practice layer.
//!
//! This crate provides:
//! - wire models for the resources the practice reads and writes (Patient,
//!   Appointment, ServiceRequest, MedicationRequest, Task, Communication,
//!   Invoice, Coverage, Practitioner) and the REST envelopes (Bundle,
//!   CapabilityStatement, OperationOutcome)
//! - typed parsing of raw JSON resources with path-aware error messages
//! - field extractors and reference resolution for display strings
//! - search parameter formatting
//!
//! This crate does no I/O. Transport lives in `telecare-core`.

pub mod billing;
pub mod bundle;
pub mod datatypes;
pub mod extract;
pub mod messaging;
pub mod orders;
pub mod patient;
pub mod reference;
pub mod resource;
pub mod scheduling;
pub mod search;

pub use billing::{Coverage, CoverageClass, Invoice, InvoiceLineItem, PriceComponent};
pub use bundle::{Bundle, BundleEntry, CapabilityStatement, OperationOutcome, Software};
pub use datatypes::{
    Address, Annotation, CodeableConcept, Coding, ContactPoint, ContactSystem, Extension,
    HumanName, Identifier, Meta, Money, NameUse, Period, Quantity, Reference,
};
pub use messaging::{Attachment, Communication, CommunicationPayload};
pub use orders::{Dosage, MedicationRequest, ServiceRequest};
pub use patient::{Patient, PatientContact, Practitioner, Qualification};
pub use resource::{parse_resource, render_resource, Resource, ResourceType};
pub use scheduling::{Appointment, AppointmentParticipant, Task, TaskRestriction};
pub use search::{Prefix, SearchParams, SearchValue};

/// Errors returned by the `fhir` crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
