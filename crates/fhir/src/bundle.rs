//! Search result bundles, the capability statement and operation outcomes.
//!
//! These are the envelope resources of the FHIR REST protocol rather than
//! clinical content, so they keep their `resourceType` as an ordinary field.

use crate::resource::{parse_resource, resource_type_of, Resource};
use crate::FhirResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A container for a collection of resources (a `searchset` for search results).
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(default = "bundle_resource_type")]
    pub resource_type: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Total number of matches when the server was asked to count them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<BundleLink>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,
}

fn bundle_resource_type() -> String {
    "Bundle".to_string()
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct BundleLink {
    #[serde(default)]
    pub relation: String,

    #[serde(default)]
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<BundleEntrySearch>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct BundleEntrySearch {
    /// `match` for primary results, `include` for `_include`d resources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl Bundle {
    /// A `searchset` bundle wrapping the given raw resources.
    pub fn searchset(resources: Vec<Value>) -> Self {
        Self {
            resource_type: bundle_resource_type(),
            type_: Some("searchset".to_string()),
            total: Some(resources.len() as u64),
            link: Vec::new(),
            entry: resources
                .into_iter()
                .map(|resource| BundleEntry {
                    full_url: None,
                    resource: Some(resource),
                    search: None,
                })
                .collect(),
        }
    }

    /// Parse every entry of type `R`, skipping entries of other types
    /// (for example resources pulled in by `_include`).
    ///
    /// # Errors
    ///
    /// Fails on the first entry of type `R` that does not match the wire schema.
    pub fn resources<R: Resource>(&self) -> FhirResult<Vec<R>> {
        self.entry
            .iter()
            .filter_map(|e| e.resource.as_ref())
            .filter(|r| resource_type_of(r) == Some(R::TYPE.as_str()))
            .map(parse_resource::<R>)
            .collect()
    }

    /// Raw entries of another type, typically `_include`d resources.
    pub fn included(&self, resource_type: &str) -> impl Iterator<Item = &Value> {
        let resource_type = resource_type.to_string();
        self.entry
            .iter()
            .filter_map(|e| e.resource.as_ref())
            .filter(move |r| resource_type_of(r) == Some(resource_type.as_str()))
    }
}

/// The subset of the server's `metadata` response used for health reporting.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityStatement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fhir_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub software: Option<Software>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub format: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Software {
    #[serde(default)]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Error details returned by the server alongside a non-success status.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct OperationOutcome {
    #[serde(default)]
    pub issue: Vec<OperationOutcomeIssue>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct OperationOutcomeIssue {
    #[serde(default)]
    pub severity: String,

    #[serde(default)]
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
}

impl OperationOutcome {
    /// Human-readable summary of all issues, for logs and error messages.
    pub fn summary(&self) -> String {
        self.issue
            .iter()
            .map(|i| match &i.diagnostics {
                Some(d) => format!("{} {}: {d}", i.severity, i.code),
                None => format!("{} {}", i.severity, i.code),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}
