//! # Telecare Core
//!
//! The practice data layer between the telehealth UI and a Medplum FHIR server.
//!
//! This crate contains:
//! - resource converters from FHIR wire models to flat view-models, and form
//!   builders for the writes the practice performs
//! - the [`FhirClient`] seam and its `reqwest` implementation for Medplum
//! - generic collections with a query cache, client-side filtering and paging,
//!   and a fixture fallback when the server cannot be reached
//! - the [`Practice`] facade that the REST surface and the CLI drive
//!
//! **No API concerns**: HTTP routing, OpenAPI and process setup belong in
//! `api-rest` and the binaries.

pub mod cache;
pub mod client;
pub mod config;
pub mod constants;
pub mod convert;
pub mod error;
pub mod fixtures;
pub mod input;
pub mod mapping;
pub mod query;
pub mod repositories;
pub mod views;

pub use client::{FhirClient, MedplumClient};
pub use config::{CoreConfig, FallbackPolicy};
pub use error::{ClientError, ClientResult, CoreError, CoreResult};
pub use input::{AppointmentForm, MessageForm, OrderForm, PatientForm, TaskForm};
pub use query::{DataSource, ListQuery, Listing, Page, Sort};
pub use repositories::{Collection, Fetched, Practice, ServerHealth, WriteOutcome};
pub use views::{
    AppointmentView, CommunicationView, CoverageView, InvoiceView, OrderView, PatientView,
    PractitionerView, TaskView, ViewModel,
};
