//! Reference resolution from display hints only.
//!
//! A [`Reference`] is resolved without any network lookup: its cached `display`
//! wins, then the raw `"<ResourceType>/<id>"` path, then a placeholder.

use crate::datatypes::Reference;
use crate::extract::UNKNOWN;
use crate::resource::ResourceType;

impl Reference {
    /// A literal reference to `resource_type/id` with an optional display hint.
    pub fn to(resource_type: ResourceType, id: &str, display: Option<&str>) -> Self {
        Self {
            reference: Some(format!("{resource_type}/{id}")),
            type_: None,
            display: display.map(str::to_string),
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Display text for a reference: `display`, else the raw reference string,
/// else [`UNKNOWN`].
pub fn reference_display(reference: Option<&Reference>) -> String {
    reference_display_or(reference, UNKNOWN)
}

/// Like [`reference_display`], with a caller-chosen placeholder such as
/// `"Unknown Patient"`.
pub fn reference_display_or(reference: Option<&Reference>, placeholder: &str) -> String {
    reference
        .and_then(|r| {
            non_blank(r.display.as_deref()).or_else(|| non_blank(r.reference.as_deref()))
        })
        .unwrap_or(placeholder)
        .to_string()
}

/// The id portion of a reference (after the last `/`), or `None` when the
/// reference carries no literal path.
///
/// A reference without a `/` (for example `urn:uuid:...`) is returned whole.
pub fn reference_id(reference: Option<&Reference>) -> Option<String> {
    let path = non_blank(reference.and_then(|r| r.reference.as_deref()))?;
    let id = match path.rsplit_once('/') {
        Some((_, id)) => id,
        None => path,
    };
    (!id.is_empty()).then(|| id.to_string())
}

/// The resource type a reference points at, from its path prefix or explicit `type`.
pub fn reference_type(reference: &Reference) -> Option<ResourceType> {
    reference
        .reference
        .as_deref()
        .and_then(|path| path.split('/').rev().nth(1))
        .or(reference.type_.as_deref())
        .and_then(|t| t.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(path: Option<&str>, display: Option<&str>) -> Reference {
        Reference {
            reference: path.map(str::to_string),
            type_: None,
            display: display.map(str::to_string),
        }
    }

    #[test]
    fn display_wins_over_path() {
        let r = reference(Some("Patient/p1"), Some("Jane Smith"));
        assert_eq!(reference_display(Some(&r)), "Jane Smith");
    }

    #[test]
    fn missing_display_returns_raw_reference() {
        let r = reference(Some("Patient/p1"), None);
        assert_eq!(reference_display(Some(&r)), "Patient/p1");

        let blank = reference(Some("Patient/p1"), Some("  "));
        assert_eq!(reference_display(Some(&blank)), "Patient/p1");
    }

    #[test]
    fn empty_reference_returns_placeholder() {
        assert_eq!(reference_display(None), "Unknown");
        assert_eq!(reference_display(Some(&Reference::default())), "Unknown");
        assert_eq!(
            reference_display_or(None, "Unknown Patient"),
            "Unknown Patient"
        );
    }

    #[test]
    fn id_is_the_segment_after_the_slash() {
        assert_eq!(
            reference_id(Some(&reference(Some("Patient/p1"), None))).as_deref(),
            Some("p1")
        );
        assert_eq!(
            reference_id(Some(&reference(Some("https://fhir.example/Patient/p9"), None)))
                .as_deref(),
            Some("p9")
        );
        assert_eq!(
            reference_id(Some(&reference(Some("urn:uuid:abc"), None))).as_deref(),
            Some("urn:uuid:abc")
        );
        assert_eq!(reference_id(Some(&reference(None, Some("Jane")))), None);
        assert_eq!(reference_id(Some(&reference(Some("Patient/"), None))), None);
        assert_eq!(reference_id(None), None);
    }

    #[test]
    fn type_comes_from_path_or_explicit_type() {
        assert_eq!(
            reference_type(&reference(Some("Practitioner/pr1"), None)),
            Some(ResourceType::Practitioner)
        );

        let typed = Reference {
            reference: None,
            type_: Some("Patient".into()),
            display: Some("Jane".into()),
        };
        assert_eq!(reference_type(&typed), Some(ResourceType::Patient));
        assert_eq!(reference_type(&reference(Some("Location/l1"), None)), None);
    }

    #[test]
    fn constructor_builds_literal_reference() {
        let r = Reference::to(ResourceType::Patient, "p1", Some("Jane Smith"));
        assert_eq!(r.reference.as_deref(), Some("Patient/p1"));
        assert_eq!(r.display.as_deref(), Some("Jane Smith"));
        assert_eq!(reference_type(&r), Some(ResourceType::Patient));
    }
}
