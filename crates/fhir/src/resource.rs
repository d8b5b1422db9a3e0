//! Resource type registry and typed JSON parsing.
//!
//! Every resource wire model implements [`Resource`], which ties it to its
//! [`ResourceType`]. Parsing goes through [`parse_resource`], which checks the
//! `resourceType` discriminator and reports the JSON path of any schema mismatch.

use crate::{FhirError, FhirResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The FHIR resource types this workspace reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    Patient,
    Appointment,
    ServiceRequest,
    MedicationRequest,
    Task,
    Communication,
    Invoice,
    Coverage,
    Practitioner,
}

impl ResourceType {
    pub const ALL: [ResourceType; 9] = [
        ResourceType::Patient,
        ResourceType::Appointment,
        ResourceType::ServiceRequest,
        ResourceType::MedicationRequest,
        ResourceType::Task,
        ResourceType::Communication,
        ResourceType::Invoice,
        ResourceType::Coverage,
        ResourceType::Practitioner,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Patient => "Patient",
            ResourceType::Appointment => "Appointment",
            ResourceType::ServiceRequest => "ServiceRequest",
            ResourceType::MedicationRequest => "MedicationRequest",
            ResourceType::Task => "Task",
            ResourceType::Communication => "Communication",
            ResourceType::Invoice => "Invoice",
            ResourceType::Coverage => "Coverage",
            ResourceType::Practitioner => "Practitioner",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = FhirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FhirError::InvalidInput(format!("unsupported resource type '{s}'")))
    }
}

/// A FHIR resource wire model.
pub trait Resource: DeserializeOwned + Serialize {
    /// The `resourceType` discriminator for this model.
    const TYPE: ResourceType;

    /// Server-assigned logical id, absent before the resource is created.
    fn id(&self) -> Option<&str>;

    /// Assign the logical id, as when updating an existing resource.
    fn set_id(&mut self, id: String);
}

/// Read the `resourceType` discriminator of a raw JSON resource.
pub fn resource_type_of(value: &Value) -> Option<&str> {
    value.get("resourceType").and_then(Value::as_str)
}

/// Parse a raw JSON resource into its typed wire model.
///
/// # Errors
///
/// Returns [`FhirError::InvalidInput`] if `resourceType` is missing or names a
/// different type, and [`FhirError::Translation`] (including the failing path,
/// e.g. `name[0].given`) if the JSON does not match the wire schema.
pub fn parse_resource<R: Resource>(value: &Value) -> FhirResult<R> {
    match resource_type_of(value) {
        Some(t) if t == R::TYPE.as_str() => {}
        Some(t) => {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType '{}', got '{t}'",
                R::TYPE
            )))
        }
        None => {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType '{}', got none",
                R::TYPE
            )))
        }
    }

    serde_path_to_error::deserialize::<_, R>(value).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        let path = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        FhirError::Translation(format!("{} schema mismatch at {path}: {source}", R::TYPE))
    })
}

/// Render a typed resource as JSON, stamping its `resourceType`.
///
/// # Errors
///
/// Returns [`FhirError::Translation`] if the model does not serialise to a JSON object.
pub fn render_resource<R: Resource>(resource: &R) -> FhirResult<Value> {
    let mut value = serde_json::to_value(resource)?;
    match value.as_object_mut() {
        Some(map) => {
            map.insert(
                "resourceType".to_string(),
                Value::String(R::TYPE.as_str().to_string()),
            );
            Ok(value)
        }
        None => Err(FhirError::Translation(format!(
            "{} did not serialise to a JSON object",
            R::TYPE
        ))),
    }
}
