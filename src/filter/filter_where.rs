use std::collections::HashMap;

use super::error::FilterError;
use super::types::{Condition, FieldSpec, FilterPredicate};

/// Sentinel some admin screens send to mean "no filter".
const ALL: &str = "all";

pub struct FilterWhere;

impl FilterWhere {
    /// Compose a predicate from raw query parameters.
    ///
    /// Only keys declared in `spec` are considered; everything else is ignored.
    /// Exact filters are ANDed, and the free-text group (when present) is ANDed
    /// with them as a single OR-condition.
    pub fn compose(
        params: &HashMap<String, String>,
        spec: &FieldSpec,
        max_search_length: usize,
    ) -> Result<FilterPredicate, FilterError> {
        let mut conditions = Vec::new();

        for filter in spec.exact {
            let Some(raw) = params.get(filter.param) else { continue };
            let value = raw.trim();
            if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
                continue;
            }
            if let Some(allowed) = filter.values {
                if !allowed.contains(&value) {
                    return Err(FilterError::InvalidFilterValue {
                        param: filter.param.to_string(),
                        value: value.to_string(),
                        allowed: allowed.iter().map(|v| v.to_string()).collect(),
                    });
                }
            }
            conditions.push(Condition::Eq {
                field: filter.field.to_string(),
                value: value.to_string(),
            });
        }

        if let Some(needle) = params
            .get(spec.search_param)
            .and_then(|raw| Self::normalize_search(raw, max_search_length))
        {
            if !spec.search_fields.is_empty() || !spec.search_joined.is_empty() {
                conditions.push(Condition::ContainsAny {
                    fields: spec.search_fields.iter().map(|f| f.to_string()).collect(),
                    joined: spec
                        .search_joined
                        .iter()
                        .map(|group| group.iter().map(|f| f.to_string()).collect())
                        .collect(),
                    needle,
                });
            }
        }

        Ok(FilterPredicate { conditions, include_deleted: false })
    }

    fn normalize_search(raw: &str, max_len: usize) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed.chars().take(max_len.max(1)).collect())
    }
}

/// Escape a literal for use inside a SQL `LIKE`/`ILIKE` pattern with `ESCAPE '\'`.
pub fn escape_like(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len() + 8);
    for c in literal.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `%literal%` pattern with all wildcard characters in the literal neutralized.
pub fn contains_pattern(literal: &str) -> String {
    format!("%{}%", escape_like(literal))
}

/// Field names come from static resource declarations, but anything reaching
/// SQL is still checked to be a plain identifier.
pub fn validate_field(name: &str) -> Result<(), FilterError> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(FilterError::InvalidField(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::ExactFilter;

    const STATUSES: &[&str] = &["draft", "published", "archived"];

    const SPEC: FieldSpec = FieldSpec {
        exact: &[ExactFilter::one_of("status", STATUSES), ExactFilter::any("category")],
        search_param: "search",
        search_fields: &["title", "author"],
        search_joined: &[],
    };

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn no_params_yields_empty_predicate() {
        let p = FilterWhere::compose(&HashMap::new(), &SPEC, 100).unwrap();
        assert!(p.is_unfiltered());
        assert!(!p.include_deleted);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let p = FilterWhere::compose(&params(&[("$where", "1"), ("color", "red")]), &SPEC, 100).unwrap();
        assert!(p.is_unfiltered());
    }

    #[test]
    fn exact_and_search_are_combined() {
        let p = FilterWhere::compose(
            &params(&[("status", "published"), ("category", "policy"), ("search", " Jane ")]),
            &SPEC,
            100,
        )
        .unwrap();
        assert_eq!(
            p.conditions,
            vec![
                Condition::Eq { field: "status".into(), value: "published".into() },
                Condition::Eq { field: "category".into(), value: "policy".into() },
                Condition::ContainsAny {
                    fields: vec!["title".into(), "author".into()],
                    joined: vec![],
                    needle: "Jane".into(),
                },
            ]
        );
    }

    #[test]
    fn blank_search_omits_or_group() {
        let p = FilterWhere::compose(&params(&[("search", "   ")]), &SPEC, 100).unwrap();
        assert!(p.search().is_none());
    }

    #[test]
    fn joined_groups_ride_along_with_search() {
        const MEMBERS: FieldSpec = FieldSpec {
            exact: &[],
            search_param: "search",
            search_fields: &["firstName", "lastName"],
            search_joined: &[&["firstName", "lastName"]],
        };
        let p = FilterWhere::compose(&params(&[("search", "grace akinyi")]), &MEMBERS, 100).unwrap();
        assert_eq!(
            p.conditions,
            vec![Condition::ContainsAny {
                fields: vec!["firstName".into(), "lastName".into()],
                joined: vec![vec!["firstName".into(), "lastName".into()]],
                needle: "grace akinyi".into(),
            }]
        );
    }

    #[test]
    fn all_sentinel_and_blank_values_skip_the_filter() {
        let p = FilterWhere::compose(&params(&[("status", "all"), ("category", "")]), &SPEC, 100).unwrap();
        assert!(p.is_unfiltered());
    }

    #[test]
    fn enum_value_outside_the_set_is_rejected() {
        let err = FilterWhere::compose(&params(&[("status", "deleted")]), &SPEC, 100).unwrap_err();
        assert_eq!(err.param(), "status");
        match err {
            FilterError::InvalidFilterValue { allowed, .. } => assert_eq!(allowed.len(), 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn search_is_truncated() {
        let p = FilterWhere::compose(&params(&[("search", "abcdefgh")]), &SPEC, 3).unwrap();
        assert_eq!(p.search(), Some("abc"));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("o'brien"), "o'brien");
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
    }

    #[test]
    fn field_names_must_be_identifiers() {
        assert!(validate_field("createdAt").is_ok());
        assert!(validate_field("_id").is_ok());
        assert!(validate_field("doc'); drop").is_err());
        assert!(validate_field("").is_err());
        assert!(validate_field("9lives").is_err());
    }
}
