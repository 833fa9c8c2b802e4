use serde::{Deserialize, Serialize};

use super::pagination::PageWindow;

/// One condition of a filter predicate. All conditions of a predicate are ANDed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Document field equals the value (compared on the field's text form).
    Eq { field: String, value: String },
    /// Case-insensitive literal substring match, ORed across the fields and
    /// across each `joined` group (present members joined by one space).
    ContainsAny {
        fields: Vec<String>,
        joined: Vec<Vec<String>>,
        needle: String,
    },
}

/// Backend-agnostic filter. Rendered to SQL by the Postgres store and
/// evaluated directly by the in-memory store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPredicate {
    pub conditions: Vec<Condition>,
    /// Soft-deleted documents (`isDeleted: true`) are excluded unless set.
    pub include_deleted: bool,
}

impl FilterPredicate {
    pub fn is_unfiltered(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn search(&self) -> Option<&str> {
        self.conditions.iter().find_map(|c| match c {
            Condition::ContainsAny { needle, .. } => Some(needle.as_str()),
            _ => None,
        })
    }
}

/// Query parameter mapped to an exact-match condition on a document field.
#[derive(Debug, Clone, Copy)]
pub struct ExactFilter {
    pub param: &'static str,
    pub field: &'static str,
    /// Closed set of accepted values (status-like enums). `None` accepts anything.
    pub values: Option<&'static [&'static str]>,
}

impl ExactFilter {
    pub const fn any(param: &'static str) -> Self {
        Self { param, field: param, values: None }
    }

    pub const fn one_of(param: &'static str, values: &'static [&'static str]) -> Self {
        Self { param, field: param, values: Some(values) }
    }
}

/// Per-endpoint declaration of which query keys the compositor recognizes.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub exact: &'static [ExactFilter],
    pub search_param: &'static str,
    pub search_fields: &'static [&'static str],
    /// Field groups searched as one space-joined text, e.g. first + last name.
    pub search_joined: &'static [&'static [&'static str]],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self { field: field.into(), direction }
    }
}

/// Fully resolved listing request, built fresh from untrusted query input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub window: PageWindow,
    pub sort: SortSpec,
    pub predicate: FilterPredicate,
}
