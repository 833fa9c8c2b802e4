//! Declarative description of every admin listing resource.

pub mod catalogue;
pub mod mutation;

use crate::api::RecordMapper;
use crate::auth::Role;
use crate::database::store::Aggregation;
use crate::filter::{FieldSpec, SortDirection, SortSpec};

pub use catalogue::{find, RESOURCES};
pub use mutation::{StatusUpdate, ValidStatusUpdate};

/// Aggregate block attached to a listing (`stats` in the response).
#[derive(Debug, Clone, Copy)]
pub struct StatsSpec {
    pub group_field: &'static str,
    pub sum_field: Option<&'static str>,
    pub sum_when: Option<(&'static str, &'static str)>,
    /// Key the sum is reported under, e.g. `totalRevenue`.
    pub sum_label: &'static str,
}

impl StatsSpec {
    pub const fn by_status() -> Self {
        Self { group_field: "status", sum_field: None, sum_when: None, sum_label: "" }
    }

    pub const fn revenue(sum_field: &'static str, paid_field: &'static str) -> Self {
        Self {
            group_field: "status",
            sum_field: Some(sum_field),
            sum_when: Some((paid_field, "paid")),
            sum_label: "totalRevenue",
        }
    }

    pub fn aggregation(&self) -> Aggregation<'static> {
        Aggregation {
            group_field: self.group_field,
            sum_field: self.sum_field,
            sum_when: self.sum_when,
        }
    }
}

/// Everything one admin endpoint needs: where its documents live, which query
/// keys it understands, who may read or change it, and how records leave it.
#[derive(Debug, Clone, Copy)]
pub struct ResourceSpec {
    /// Path segment: `/api/admin/<name>`.
    pub name: &'static str,
    pub collection: &'static str,
    /// Key of the record array in the response `data`.
    pub response_key: &'static str,
    pub fields: FieldSpec,
    pub statuses: &'static [&'static str],
    pub sort_fields: &'static [&'static str],
    pub default_sort: (&'static str, SortDirection),
    pub read_roles: &'static [Role],
    pub mutate_roles: &'static [Role],
    pub stats: Option<StatsSpec>,
    pub mapper: RecordMapper,
}

impl ResourceSpec {
    pub fn default_sort(&self) -> SortSpec {
        SortSpec::new(self.default_sort.0, self.default_sort.1)
    }
}
