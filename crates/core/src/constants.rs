//! Constants used throughout the telecare core crate.
//!
//! Placeholders shown when a FHIR resource omits an element, and defaults for
//! configuration values that are not set in the environment.

/// Placeholder for an appointment, order, task or bill without a resolvable patient.
pub const UNKNOWN_PATIENT: &str = "Unknown Patient";

/// Placeholder for a missing practitioner reference.
pub const UNKNOWN_PROVIDER: &str = "Unknown Provider";

/// Placeholder for a coverage without a payor.
pub const UNKNOWN_PAYOR: &str = "Unknown Payor";

/// Placeholder for a task with neither description nor code.
pub const UNTITLED_TASK: &str = "Untitled task";

/// Duration used when an appointment has no usable end time.
pub const DEFAULT_APPOINTMENT_MINUTES: u32 = 30;

/// Prefix of ids fabricated locally when a write could not reach the server.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// Identifier system for US National Provider Identifiers.
pub const NPI_SYSTEM: &str = "http://hl7.org/fhir/sid/us-npi";

/// Identifier system for practice medical record numbers.
pub const MRN_SYSTEM: &str = "urn:telecare:mrn";

/// Extension carrying free-text insurance notes on a Patient.
pub const INSURANCE_EXTENSION_URL: &str = "urn:telecare:extension:insurance";

/// Default REST listen address.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Default lifetime of a cached list result.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default number of retries after the first failed attempt.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Delay between retry attempts.
pub const RETRY_DELAY_MILLIS: u64 = 250;

/// Media type for FHIR JSON requests and responses.
pub const FHIR_JSON: &str = "application/fhir+json";
