//! FHIR R4 complex datatypes shared by every resource.
//!
//! These are wire models for the JSON returned by a FHIR server. Unlike on-disk
//! documents, server payloads routinely carry elements this crate does not model,
//! so unknown keys are ignored rather than rejected. Every element is optional on
//! the wire and modelled as `Option<_>` or a defaulted `Vec<_>`.
//!
//! Coded `use`/`system` elements stay as wire strings; the typed accessors
//! (`HumanName::name_use`, `ContactPoint::system`) parse them on demand so that an
//! unrecognised code never fails deserialisation of the whole resource.

use serde::{Deserialize, Serialize};

// ============================================================================
// Coded enumerations
// ============================================================================

/// Purpose of a human name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameUse {
    /// Official name.
    Official,
    /// Usual/preferred name.
    Usual,
    /// Temporary name.
    Temp,
    /// Nickname or informal name.
    Nickname,
    /// Anonymous name.
    Anonymous,
    /// Old name (no longer in use).
    Old,
    /// Maiden name.
    Maiden,
}

impl NameUse {
    /// Convert to FHIR wire format string.
    pub fn to_wire(self) -> &'static str {
        match self {
            NameUse::Official => "official",
            NameUse::Usual => "usual",
            NameUse::Temp => "temp",
            NameUse::Nickname => "nickname",
            NameUse::Anonymous => "anonymous",
            NameUse::Old => "old",
            NameUse::Maiden => "maiden",
        }
    }

    /// Parse from FHIR wire format string.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "official" => Some(NameUse::Official),
            "usual" => Some(NameUse::Usual),
            "temp" => Some(NameUse::Temp),
            "nickname" => Some(NameUse::Nickname),
            "anonymous" => Some(NameUse::Anonymous),
            "old" => Some(NameUse::Old),
            "maiden" => Some(NameUse::Maiden),
            _ => None,
        }
    }
}

/// Telecommunications form of a contact point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactSystem {
    Phone,
    Fax,
    Email,
    Pager,
    Url,
    Sms,
    Other,
}

impl ContactSystem {
    pub fn to_wire(self) -> &'static str {
        match self {
            ContactSystem::Phone => "phone",
            ContactSystem::Fax => "fax",
            ContactSystem::Email => "email",
            ContactSystem::Pager => "pager",
            ContactSystem::Url => "url",
            ContactSystem::Sms => "sms",
            ContactSystem::Other => "other",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "phone" => Some(ContactSystem::Phone),
            "fax" => Some(ContactSystem::Fax),
            "email" => Some(ContactSystem::Email),
            "pager" => Some(ContactSystem::Pager),
            "url" => Some(ContactSystem::Url),
            "sms" => Some(ContactSystem::Sms),
            "other" => Some(ContactSystem::Other),
            _ => None,
        }
    }
}

// ============================================================================
// Datatypes
// ============================================================================

/// A code defined by a terminology system.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A concept that may be defined by one or more codings and/or plain text.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    /// A concept carrying only free text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            coding: Vec::new(),
            text: Some(text.into()),
        }
    }

    /// A concept carrying a single coding from `system`.
    pub fn coded(system: &str, code: &str, display: Option<&str>) -> Self {
        Self {
            coding: vec![Coding {
                system: Some(system.to_string()),
                code: Some(code.to_string()),
                display: display.map(str::to_string),
            }],
            text: None,
        }
    }
}

/// Name of a human, with text, parts and usage information.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct HumanName {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefix: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suffix: Vec<String>,
}

impl HumanName {
    pub fn name_use(&self) -> Option<NameUse> {
        self.use_type.as_deref().and_then(NameUse::from_wire)
    }
}

/// Details of a technology-mediated contact point (phone, email, etc.).
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ContactPoint {
    #[serde(rename = "system", skip_serializing_if = "Option::is_none")]
    pub system_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

impl ContactPoint {
    /// Build a contact point for `system` with the given value.
    pub fn new(system: ContactSystem, value: impl Into<String>) -> Self {
        Self {
            system_code: Some(system.to_wire().to_string()),
            value: Some(value.into()),
            use_type: None,
            rank: None,
        }
    }

    pub fn system(&self) -> Option<ContactSystem> {
        self.system_code.as_deref().and_then(ContactSystem::from_wire)
    }
}

/// A postal address.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// An identifier intended for computation (MRN, NPI, member number).
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Identifier {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A time period defined by a start and end date/time.
///
/// Bounds keep their wire text: FHIR permits partial dates (`2024`, `2024-05`)
/// that do not fit a single chrono type.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Period {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// A measured amount.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Quantity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparator: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// An amount of economic utility in some recognised currency.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Money {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// A typed pointer from one resource to another (`"<ResourceType>/<id>"`).
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A text note with optional attribution.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_string: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    #[serde(default)]
    pub text: String,
}

/// Resource metadata maintained by the server.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// An extension element. Only the value types this workspace reads are modelled.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    #[serde(default)]
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_reference: Option<Reference>,
}
