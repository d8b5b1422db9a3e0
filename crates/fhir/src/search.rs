//! FHIR search parameter formatting.
//!
//! Values are normalised when added: booleans become `true`/`false` and dates
//! keep only their ISO date portion, which is what FHIR `date` parameters
//! compare against at day precision.

use chrono::{DateTime, NaiveDate, Utc};

/// A search parameter value before formatting.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchValue {
    /// Free text or a token, passed through unchanged.
    Text(String),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Number(i64),
}

impl SearchValue {
    pub fn format(&self) -> String {
        match self {
            SearchValue::Text(s) => s.clone(),
            SearchValue::Bool(b) => b.to_string(),
            SearchValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            SearchValue::DateTime(dt) => dt.date_naive().format("%Y-%m-%d").to_string(),
            SearchValue::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for SearchValue {
    fn from(s: &str) -> Self {
        SearchValue::Text(s.to_string())
    }
}

impl From<String> for SearchValue {
    fn from(s: String) -> Self {
        SearchValue::Text(s)
    }
}

impl From<bool> for SearchValue {
    fn from(b: bool) -> Self {
        SearchValue::Bool(b)
    }
}

impl From<NaiveDate> for SearchValue {
    fn from(d: NaiveDate) -> Self {
        SearchValue::Date(d)
    }
}

impl From<DateTime<Utc>> for SearchValue {
    fn from(dt: DateTime<Utc>) -> Self {
        SearchValue::DateTime(dt)
    }
}

impl From<i64> for SearchValue {
    fn from(n: i64) -> Self {
        SearchValue::Number(n)
    }
}

/// Comparison prefix for ordered parameters such as `date`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prefix {
    Eq,
    Ge,
    Le,
    Gt,
    Lt,
}

impl Prefix {
    fn as_str(self) -> &'static str {
        match self {
            Prefix::Eq => "eq",
            Prefix::Ge => "ge",
            Prefix::Le => "le",
            Prefix::Gt => "gt",
            Prefix::Lt => "lt",
        }
    }
}

/// An ordered list of formatted `(name, value)` search parameters.
///
/// Parameters may repeat (`date=ge...&date=le...`), so this is a list rather
/// than a map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchParams {
    pairs: Vec<(String, String)>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name=value`, formatting the value.
    pub fn push(&mut self, name: &str, value: impl Into<SearchValue>) -> &mut Self {
        self.pairs.push((name.to_string(), value.into().format()));
        self
    }

    /// Append `name=<prefix><value>` (e.g. `date=ge2024-01-01`).
    pub fn push_prefixed(
        &mut self,
        name: &str,
        prefix: Prefix,
        value: impl Into<SearchValue>,
    ) -> &mut Self {
        let formatted = format!("{}{}", prefix.as_str(), value.into().format());
        self.pairs.push((name.to_string(), formatted));
        self
    }

    /// `_sort=field` or `_sort=-field` for descending order.
    pub fn sort(&mut self, field: &str, descending: bool) -> &mut Self {
        let value = if descending {
            format!("-{field}")
        } else {
            field.to_string()
        };
        self.push("_sort", value)
    }

    pub fn count(&mut self, count: u32) -> &mut Self {
        self.push("_count", i64::from(count))
    }

    pub fn offset(&mut self, offset: u32) -> &mut Self {
        self.push("_offset", i64::from(offset))
    }

    /// `_include=<Type>:<param>`, e.g. `Appointment:patient`.
    pub fn include(&mut self, target: &str) -> &mut Self {
        self.push("_include", target)
    }

    /// Ask the server to count all matches, not just the returned page.
    pub fn total_accurate(&mut self) -> &mut Self {
        self.push("_total", "accurate")
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `name=value&…` in insertion order, unencoded. Used as a cache key and in
    /// logs; HTTP clients encode the pairs themselves.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(n, v)| format!("{n}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}
