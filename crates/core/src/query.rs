//! List queries.
//!
//! A [`ListQuery`] is turned into FHIR search parameters for the live fetch,
//! and applied client-side (filter, sort, paginate) to whatever came back. The
//! client-side step is the same function for live results and for fixtures, so
//! a fallback listing answers the same question the live one would have.

use crate::views::{
    AppointmentView, CommunicationView, CoverageView, InvoiceView, OrderView, PatientView,
    PractitionerView, TaskView, ViewModel,
};
use chrono::NaiveDate;
use fhir::{Prefix, SearchParams};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use utoipa::ToSchema;

/// Upper bound on resources fetched per live search; paging happens client-side.
pub const LIVE_FETCH_LIMIT: u32 = 1000;

/// Where a result came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Live,
    Fallback,
}

/// One page of a filtered, sorted collection.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[aliases(
    PatientListing = Listing<PatientView>,
    PractitionerListing = Listing<PractitionerView>,
    AppointmentListing = Listing<AppointmentView>,
    TaskListing = Listing<TaskView>,
    OrderListing = Listing<OrderView>,
    CommunicationListing = Listing<CommunicationView>,
    InvoiceListing = Listing<InvoiceView>,
    CoverageListing = Listing<CoverageView>
)]
pub struct Listing<V> {
    pub items: Vec<V>,
    /// Number of matches before pagination.
    pub total: usize,
    pub source: DataSource,
}

impl<V> Listing<V> {
    pub fn with_source(mut self, source: DataSource) -> Self {
        self.source = source;
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.source == DataSource::Fallback
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub descending: bool,
}

impl Sort {
    /// Parse `field` or `-field`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (field, descending) = match raw.strip_prefix('-') {
            Some(field) => (field, true),
            None => (raw, false),
        };
        (!field.is_empty()).then(|| Sort {
            field: field.to_string(),
            descending,
        })
    }
}

/// 1-based page number and page size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    fn offset(&self) -> usize {
        self.number.saturating_sub(1) as usize * self.size as usize
    }
}

/// How a collection's query fields map onto its FHIR search parameters.
///
/// `None` means the resource has no matching parameter and the field is only
/// applied client-side. Search text is always client-side: no single FHIR
/// parameter covers every field a view searches.
#[derive(Clone, Copy, Debug)]
pub struct SearchMapping {
    pub patient: Option<&'static str>,
    pub date: Option<&'static str>,
    /// Server-side `(name, value)` for a status label in the view vocabulary.
    pub status: fn(&str) -> Option<(&'static str, String)>,
    /// FHIR `_sort` key for a view field.
    pub sort: fn(&str) -> Option<&'static str>,
}

/// Pass a status label through as the FHIR `status` parameter.
pub fn status_as_is(label: &str) -> Option<(&'static str, String)> {
    Some(("status", label.to_string()))
}

pub fn no_sort(_field: &str) -> Option<&'static str> {
    None
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub patient_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub sort: Option<Sort>,
    pub page: Option<Page>,
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ListQuery {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            ..Self::default()
        }
    }

    /// FHIR search parameters for the live fetch.
    ///
    /// Pagination is never sent: the fetch asks for up to [`LIVE_FETCH_LIMIT`]
    /// matches and [`ListQuery::apply`] pages them.
    pub fn to_search_params(&self, mapping: &SearchMapping) -> SearchParams {
        let mut params = SearchParams::new();

        if let Some((name, value)) = non_blank(&self.status).and_then(mapping.status) {
            params.push(name, value);
        }
        if let (Some(name), Some(id)) = (mapping.patient, non_blank(&self.patient_id)) {
            params.push(name, format!("Patient/{id}"));
        }
        if let Some(name) = mapping.date {
            if let Some(from) = self.date_from {
                params.push_prefixed(name, Prefix::Ge, from);
            }
            if let Some(to) = self.date_to {
                params.push_prefixed(name, Prefix::Le, to);
            }
        }
        if let Some(sort) = &self.sort {
            if let Some(key) = (mapping.sort)(&sort.field) {
                params.sort(key, sort.descending);
            }
        }
        params.count(LIVE_FETCH_LIMIT);
        params
    }

    /// Whether `view` satisfies every filter of this query.
    pub fn matches<V: ViewModel>(&self, view: &V) -> bool {
        if let Some(text) = non_blank(&self.search) {
            let needle = text.to_lowercase();
            if !view
                .search_fields()
                .iter()
                .any(|f| f.to_lowercase().contains(&needle))
            {
                return false;
            }
        }

        if let Some(status) = non_blank(&self.status) {
            if !view
                .status_label()
                .is_some_and(|s| s.eq_ignore_ascii_case(status))
            {
                return false;
            }
        }

        if let Some(patient_id) = non_blank(&self.patient_id) {
            if view.patient_id() != Some(patient_id) {
                return false;
            }
        }

        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(date) = view.date().and_then(date_part) else {
                return false;
            };
            if self.date_from.is_some_and(|from| date < from)
                || self.date_to.is_some_and(|to| date > to)
            {
                return false;
            }
        }

        true
    }

    /// Filter, stable-sort and paginate `views`.
    pub fn apply<V: ViewModel>(&self, views: Vec<V>) -> Listing<V> {
        let mut items: Vec<V> = views.into_iter().filter(|v| self.matches(v)).collect();

        if let Some(sort) = &self.sort {
            // Views without the key sort last in both directions.
            items.sort_by(|a, b| match (a.sort_key(&sort.field), b.sort_key(&sort.field)) {
                (Some(a), Some(b)) if sort.descending => b.compare(&a),
                (Some(a), Some(b)) => a.compare(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }

        let total = items.len();
        if let Some(page) = self.page {
            items = items
                .into_iter()
                .skip(page.offset())
                .take(page.size as usize)
                .collect();
        }

        Listing {
            items,
            total,
            source: DataSource::Live,
        }
    }
}

/// The calendar date at the start of an ISO 8601 date or date-time.
fn date_part(value: &str) -> Option<NaiveDate> {
    let date = value.get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::SortKey;
    use serde::Serialize;

    #[derive(Clone, Debug, PartialEq, Serialize)]
    struct Row {
        id: String,
        name: String,
        status: &'static str,
        patient: Option<String>,
        date: Option<String>,
        score: Option<f64>,
    }

    impl ViewModel for Row {
        fn id(&self) -> &str {
            &self.id
        }
        fn set_id(&mut self, id: String) {
            self.id = id;
        }
        fn search_fields(&self) -> Vec<&str> {
            vec![self.id.as_str(), self.name.as_str()]
        }
        fn status_label(&self) -> Option<&str> {
            Some(self.status)
        }
        fn patient_id(&self) -> Option<&str> {
            self.patient.as_deref()
        }
        fn date(&self) -> Option<&str> {
            self.date.as_deref()
        }
        fn sort_key(&self, field: &str) -> Option<SortKey> {
            match field {
                "name" => Some(SortKey::text(&self.name)),
                "score" => self.score.map(SortKey::Number),
                _ => None,
            }
        }
    }

    fn row(id: &str, name: &str, status: &'static str, date: Option<&str>, score: Option<f64>) -> Row {
        Row {
            id: id.into(),
            name: name.into(),
            status,
            patient: Some(format!("p-{id}")),
            date: date.map(str::to_string),
            score,
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            row("1", "Jane Smith", "active", Some("2024-01-10T09:00:00Z"), Some(3.0)),
            row("2", "John Doe", "active", Some("2024-02-10"), None),
            row("3", "Janet Brown", "inactive", None, Some(1.0)),
            row("4", "Robert Chen", "active", Some("2024-03-01"), Some(2.0)),
        ]
    }

    fn sort_by_name(field: &str) -> Option<&'static str> {
        (field == "name").then_some("name")
    }

    const MAPPING: SearchMapping = SearchMapping {
        patient: Some("subject"),
        date: Some("date"),
        status: status_as_is,
        sort: sort_by_name,
    };

    #[test]
    fn search_is_case_insensitive_substring() {
        let listing = ListQuery::search("JANE").apply(rows());
        let ids: Vec<&str> = listing.items.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(listing.total, 2);
        assert_eq!(listing.source, DataSource::Live);
    }

    #[test]
    fn status_patient_and_date_filters() {
        let query = ListQuery {
            status: Some("Active".into()),
            date_from: NaiveDate::from_ymd_opt(2024, 1, 10),
            date_to: NaiveDate::from_ymd_opt(2024, 2, 28),
            ..ListQuery::default()
        };
        let ids: Vec<String> = query.apply(rows()).items.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["1", "2"]);

        let by_patient = ListQuery {
            patient_id: Some("p-4".into()),
            ..ListQuery::default()
        };
        assert_eq!(by_patient.apply(rows()).items[0].name, "Robert Chen");
    }

    #[test]
    fn sort_puts_missing_keys_last_in_both_directions() {
        let mut query = ListQuery {
            sort: Sort::parse("score"),
            ..ListQuery::default()
        };
        let ids: Vec<String> = query.apply(rows()).items.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["3", "4", "1", "2"]);

        query.sort = Sort::parse("-score");
        let ids: Vec<String> = query.apply(rows()).items.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["1", "4", "3", "2"]);
    }

    #[test]
    fn total_counts_matches_before_paging() {
        let query = ListQuery {
            sort: Sort::parse("name"),
            page: Some(Page { number: 2, size: 3 }),
            ..ListQuery::default()
        };
        let listing = query.apply(rows());
        assert_eq!(listing.total, 4);
        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.items[0].name, "Robert Chen");
    }

    #[test]
    fn search_params_follow_the_mapping() {
        let query = ListQuery {
            search: Some("jane".into()),
            status: Some("active".into()),
            patient_id: Some("p-001".into()),
            date_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            sort: Sort::parse("-name"),
            page: Some(Page { number: 3, size: 10 }),
            ..ListQuery::default()
        };
        assert_eq!(
            query.to_search_params(&MAPPING).to_query_string(),
            "status=active&subject=Patient/p-001&date=ge2024-01-01&_sort=-name&_count=1000"
        );
    }

    #[test]
    fn blank_filters_are_ignored() {
        let query = ListQuery {
            search: Some("  ".into()),
            status: Some(String::new()),
            ..ListQuery::default()
        };
        assert_eq!(query.apply(rows()).total, 4);
        assert_eq!(
            query.to_search_params(&MAPPING).to_query_string(),
            "_count=1000"
        );
    }

    #[test]
    fn sort_spec_parsing() {
        assert_eq!(
            Sort::parse("-date"),
            Some(Sort {
                field: "date".into(),
                descending: true
            })
        );
        assert_eq!(Sort::parse("-"), None);
        assert_eq!(Sort::parse(""), None);
    }
}
