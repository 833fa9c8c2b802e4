//! Renders filter predicates into parameterized SQL over the `documents` table.
//!
//! Every value, including field names, travels as a bind parameter; the only
//! text spliced into SQL is placeholders and fixed keywords.
//!
//! Field reads unwrap extended-JSON wrappers (`{"$oid": ..}`, `{"$date": ..}`)
//! so filters, sorts and groups see the same value the response shows.

use crate::database::store::Aggregation;
use crate::filter::filter_where::{contains_pattern, validate_field};
use crate::filter::{Condition, FilterError, FilterPredicate, SortSpec};

#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

pub struct QueryBuilder {
    params: Vec<SqlParam>,
}

impl QueryBuilder {
    fn new() -> Self {
        Self { params: vec![] }
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    fn text(&mut self, value: impl Into<String>) -> String {
        self.param(SqlParam::Text(value.into()))
    }

    fn field(&mut self, name: &str) -> Result<String, FilterError> {
        validate_field(name)?;
        Ok(format!("{}::text", self.text(name)))
    }

    /// Text form of a field, wrappers unwrapped.
    fn text_of(&mut self, name: &str) -> Result<String, FilterError> {
        let f = self.field(name)?;
        Ok(format!("COALESCE(doc -> {f} ->> '$oid', doc -> {f} ->> '$date', doc ->> {f})"))
    }

    /// jsonb form of a field, wrappers unwrapped.
    fn json_of(&mut self, name: &str) -> Result<String, FilterError> {
        let f = self.field(name)?;
        Ok(format!("COALESCE(doc -> {f} -> '$oid', doc -> {f} -> '$date', doc -> {f})"))
    }

    fn where_clause(&mut self, collection: &str, predicate: &FilterPredicate) -> Result<String, FilterError> {
        let mut parts = vec![format!("collection = {}", self.text(collection))];

        if !predicate.include_deleted {
            parts.push(r#"NOT (doc @> '{"isDeleted": true}'::jsonb)"#.to_string());
        }

        for condition in &predicate.conditions {
            match condition {
                Condition::Eq { field, value } => {
                    let field = self.text_of(field)?;
                    let value = self.text(value.clone());
                    parts.push(format!("{} = {}", field, value));
                }
                Condition::ContainsAny { fields, joined, needle } => {
                    if fields.is_empty() && joined.is_empty() {
                        continue;
                    }
                    let pattern = self.text(contains_pattern(needle));
                    let mut ors = Vec::with_capacity(fields.len() + joined.len());
                    for field in fields {
                        let field = self.text_of(field)?;
                        ors.push(format!("{} ILIKE {} ESCAPE '\\'", field, pattern));
                    }
                    for group in joined {
                        let texts = group
                            .iter()
                            .map(|f| self.text_of(f))
                            .collect::<Result<Vec<_>, _>>()?;
                        ors.push(format!("concat_ws(' ', {}) ILIKE {} ESCAPE '\\'", texts.join(", "), pattern));
                    }
                    parts.push(format!("({})", ors.join(" OR ")));
                }
            }
        }

        Ok(parts.join(" AND "))
    }

    pub fn count(collection: &str, predicate: &FilterPredicate) -> Result<SqlResult, FilterError> {
        let mut b = Self::new();
        let where_clause = b.where_clause(collection, predicate)?;
        Ok(SqlResult {
            query: format!("SELECT COUNT(*) AS count FROM documents WHERE {}", where_clause),
            params: b.params,
        })
    }

    pub fn find(
        collection: &str,
        predicate: &FilterPredicate,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<SqlResult, FilterError> {
        let mut b = Self::new();
        let where_clause = b.where_clause(collection, predicate)?;
        let sort_field = b.json_of(&sort.field)?;
        let limit = b.param(SqlParam::Int(clamp_i64(limit)));
        let offset = b.param(SqlParam::Int(clamp_i64(skip)));
        Ok(SqlResult {
            query: format!(
                "SELECT id, doc FROM documents WHERE {} ORDER BY {} {} NULLS LAST, id ASC LIMIT {} OFFSET {}",
                where_clause,
                sort_field,
                sort.direction.to_sql(),
                limit,
                offset
            ),
            params: b.params,
        })
    }

    pub fn aggregate(
        collection: &str,
        predicate: &FilterPredicate,
        aggregation: &Aggregation<'_>,
    ) -> Result<SqlResult, FilterError> {
        let mut b = Self::new();
        let where_clause = b.where_clause(collection, predicate)?;
        let group = b.text_of(aggregation.group_field)?;

        let sum = match aggregation.sum_field {
            Some(sum_field) => {
                let sum_field = b.field(sum_field)?;
                let mut guard = format!("jsonb_typeof(doc -> {}) = 'number'", sum_field);
                if let Some((when_field, when_value)) = aggregation.sum_when {
                    let when_field = b.text_of(when_field)?;
                    let when_value = b.text(when_value);
                    guard.push_str(&format!(" AND {} = {}", when_field, when_value));
                }
                format!(
                    "COALESCE(SUM(CASE WHEN {} THEN (doc ->> {})::numeric ELSE 0 END), 0)",
                    guard, sum_field
                )
            }
            None => "0::numeric".to_string(),
        };

        Ok(SqlResult {
            query: format!(
                "SELECT {} AS key, COUNT(*) AS count, {} AS sum FROM documents WHERE {} GROUP BY 1 ORDER BY 1",
                group, sum, where_clause
            ),
            params: b.params,
        })
    }
}

fn clamp_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SortDirection;

    fn text(s: &str) -> SqlParam {
        SqlParam::Text(s.to_string())
    }

    /// Expected text read of the field bound at `$n`.
    fn text_of(n: usize) -> String {
        format!("COALESCE(doc -> ${n}::text ->> '$oid', doc -> ${n}::text ->> '$date', doc ->> ${n}::text)")
    }

    fn predicate() -> FilterPredicate {
        FilterPredicate {
            conditions: vec![
                Condition::Eq { field: "status".into(), value: "published".into() },
                Condition::ContainsAny {
                    fields: vec!["title".into(), "author".into()],
                    joined: vec![],
                    needle: "50%_o'brien".into(),
                },
            ],
            include_deleted: false,
        }
    }

    #[test]
    fn count_binds_every_value() {
        let sql = QueryBuilder::count("news", &predicate()).unwrap();
        assert_eq!(
            sql.query,
            format!(
                "SELECT COUNT(*) AS count FROM documents WHERE collection = $1 \
                 AND NOT (doc @> '{{\"isDeleted\": true}}'::jsonb) \
                 AND {} = $3 \
                 AND ({} ILIKE $4 ESCAPE '\\' OR {} ILIKE $4 ESCAPE '\\')",
                text_of(2),
                text_of(5),
                text_of(6)
            )
        );
        assert_eq!(
            sql.params,
            vec![
                text("news"),
                text("status"),
                text("published"),
                text("%50\\%\\_o'brien%"),
                text("title"),
                text("author"),
            ]
        );
    }

    #[test]
    fn joined_groups_render_as_concat() {
        let p = FilterPredicate {
            conditions: vec![Condition::ContainsAny {
                fields: vec!["email".into()],
                joined: vec![vec!["firstName".into(), "lastName".into()]],
                needle: "grace akinyi".into(),
            }],
            include_deleted: true,
        };
        let sql = QueryBuilder::count("members", &p).unwrap();
        assert_eq!(
            sql.query,
            format!(
                "SELECT COUNT(*) AS count FROM documents WHERE collection = $1 \
                 AND ({} ILIKE $2 ESCAPE '\\' OR concat_ws(' ', {}, {}) ILIKE $2 ESCAPE '\\')",
                text_of(3),
                text_of(4),
                text_of(5)
            )
        );
        assert_eq!(sql.params[1..], [text("%grace akinyi%"), text("email"), text("firstName"), text("lastName")]);
    }

    #[test]
    fn joined_group_fields_are_validated() {
        let p = FilterPredicate {
            conditions: vec![Condition::ContainsAny {
                fields: vec![],
                joined: vec![vec!["firstName".into(), "x') OR 1=1".into()]],
                needle: "a".into(),
            }],
            include_deleted: false,
        };
        assert!(QueryBuilder::count("members", &p).is_err());
    }

    #[test]
    fn empty_predicate_only_scopes_collection() {
        let p = FilterPredicate { conditions: vec![], include_deleted: true };
        let sql = QueryBuilder::count("jobs", &p).unwrap();
        assert_eq!(sql.query, "SELECT COUNT(*) AS count FROM documents WHERE collection = $1");
        assert_eq!(sql.params, vec![text("jobs")]);
    }

    #[test]
    fn find_orders_with_id_tiebreak() {
        let sort = SortSpec::new("createdAt", SortDirection::Desc);
        let sql = QueryBuilder::find("news", &FilterPredicate::default(), &sort, 10, 10).unwrap();
        assert!(sql.query.ends_with(
            "ORDER BY COALESCE(doc -> $2::text -> '$oid', doc -> $2::text -> '$date', doc -> $2::text) DESC NULLS LAST, \
             id ASC LIMIT $3 OFFSET $4"
        ));
        assert_eq!(sql.params[2..], [SqlParam::Int(10), SqlParam::Int(10)]);
    }

    #[test]
    fn oversized_offset_is_clamped() {
        let sort = SortSpec::new("createdAt", SortDirection::Asc);
        let sql = QueryBuilder::find("news", &FilterPredicate::default(), &sort, u64::MAX, 5).unwrap();
        assert_eq!(sql.params.last(), Some(&SqlParam::Int(i64::MAX)));
    }

    #[test]
    fn invalid_field_names_never_reach_sql() {
        let sort = SortSpec::new("x; DROP TABLE documents", SortDirection::Asc);
        assert!(QueryBuilder::find("news", &FilterPredicate::default(), &sort, 0, 5).is_err());
    }

    #[test]
    fn aggregate_with_conditional_sum() {
        let agg = Aggregation { group_field: "status", sum_field: Some("totalAmount"), sum_when: Some(("paymentStatus", "paid")) };
        let sql = QueryBuilder::aggregate("orders", &FilterPredicate::default(), &agg).unwrap();
        assert!(sql.query.starts_with(&format!(
            "SELECT {} AS key, COUNT(*) AS count, COALESCE(SUM(CASE WHEN jsonb_typeof(doc -> $3::text) = 'number' \
             AND {} = $5 THEN (doc ->> $3::text)::numeric ELSE 0 END), 0) AS sum",
            text_of(2),
            text_of(4)
        )));
        assert!(sql.query.ends_with("GROUP BY 1 ORDER BY 1"));
        assert_eq!(sql.params.len(), 5);
    }
}
