//! Field extractors: total functions that turn a structured FHIR element into a
//! single display string.
//!
//! Each extractor has a fixed priority order and a fixed fallback. None of them
//! panics or returns an error; absent or partial input degrades to the documented
//! fallback (`"Unknown"`, an empty string, or `None` where the caller expects an
//! optional value).

use crate::datatypes::{
    Address, Annotation, CodeableConcept, ContactPoint, ContactSystem, HumanName, Identifier,
    Money, NameUse, Period, Quantity,
};

/// Fallback for names and coded concepts with nothing to show.
pub const UNKNOWN: &str = "Unknown";

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Display name from a list of human names.
///
/// Picks the `official` entry, else the first. Uses its `text` when present,
/// otherwise `prefix given… family suffix` joined by spaces. Returns
/// [`UNKNOWN`] when the list is empty or the chosen name has no parts.
pub fn human_name(names: &[HumanName]) -> String {
    names
        .iter()
        .find(|n| n.name_use() == Some(NameUse::Official))
        .or_else(|| names.first())
        .map(format_name)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Display form of a single human name, with the same rules as [`human_name`].
pub fn format_name(name: &HumanName) -> String {
    if let Some(text) = non_blank(&name.text) {
        return text.to_string();
    }

    let parts: Vec<&str> = name
        .prefix
        .iter()
        .map(String::as_str)
        .chain(name.given.iter().map(String::as_str))
        .chain(name.family.as_deref())
        .chain(name.suffix.iter().map(String::as_str))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        UNKNOWN.to_string()
    } else {
        parts.join(" ")
    }
}

/// Value of the first contact point of `system`, or of the first contact point
/// when no system is requested.
pub fn contact_point(telecom: &[ContactPoint], system: Option<ContactSystem>) -> Option<String> {
    telecom
        .iter()
        .find(|cp| system.is_none() || cp.system() == system)
        .and_then(|cp| cp.value.clone())
}

/// Single-line postal address.
///
/// Picks the `home` entry, else the first. Uses its `text` when present,
/// otherwise joins lines, city, state, postal code and country with `", "`.
/// Returns an empty string for an empty list.
pub fn address(addresses: &[Address]) -> String {
    addresses
        .iter()
        .find(|a| a.use_type.as_deref() == Some("home"))
        .or_else(|| addresses.first())
        .map(format_address)
        .unwrap_or_default()
}

pub fn format_address(address: &Address) -> String {
    if let Some(text) = non_blank(&address.text) {
        return text.to_string();
    }

    address
        .line
        .iter()
        .map(String::as_str)
        .chain(address.city.as_deref())
        .chain(address.state.as_deref())
        .chain(address.postal_code.as_deref())
        .chain(address.country.as_deref())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Value of the first identifier issued by `system`, or of the first identifier
/// when no system is requested.
pub fn identifier(identifiers: &[Identifier], system: Option<&str>) -> Option<String> {
    identifiers
        .iter()
        .find(|id| system.is_none() || id.system.as_deref() == system)
        .and_then(|id| id.value.clone())
}

/// Display text of a coded concept: `text`, else the first coding's display,
/// else the first coding's code, else [`UNKNOWN`].
pub fn codeable_concept(concept: Option<&CodeableConcept>) -> String {
    let Some(concept) = concept else {
        return UNKNOWN.to_string();
    };

    if let Some(text) = non_blank(&concept.text) {
        return text.to_string();
    }

    let first = concept.coding.first();
    first
        .and_then(|c| non_blank(&c.display))
        .or_else(|| first.and_then(|c| non_blank(&c.code)))
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// `"start – end"`, `"From start"`, `"Until end"`, or `""`.
pub fn period(period: Option<&Period>) -> String {
    let (start, end) = match period {
        Some(p) => (non_blank(&p.start), non_blank(&p.end)),
        None => (None, None),
    };

    match (start, end) {
        (Some(start), Some(end)) => format!("{start} – {end}"),
        (Some(start), None) => format!("From {start}"),
        (None, Some(end)) => format!("Until {end}"),
        (None, None) => String::new(),
    }
}

/// `"<value> <unit>"`; the unit falls back to the code. Missing parts render as
/// empty segments. An absent quantity renders as an empty string.
pub fn quantity(quantity: Option<&Quantity>) -> String {
    let Some(q) = quantity else {
        return String::new();
    };

    let value = q.value.map(|v| v.to_string()).unwrap_or_default();
    let unit = q
        .unit
        .as_deref()
        .or(q.code.as_deref())
        .unwrap_or_default();
    format!("{value} {unit}")
}

/// `"<value> <currency>"` with the same empty-segment rule as [`quantity`].
pub fn money(money: Option<&Money>) -> String {
    let Some(m) = money else {
        return String::new();
    };

    let value = m.value.map(|v| format!("{v:.2}")).unwrap_or_default();
    let currency = m.currency.as_deref().unwrap_or_default();
    format!("{value} {currency}")
}

/// All non-empty note texts joined by newlines.
pub fn annotation_text(notes: &[Annotation]) -> Option<String> {
    let texts: Vec<&str> = notes
        .iter()
        .map(|n| n.text.trim())
        .filter(|t| !t.is_empty())
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n"))
    }
}
