use super::types::{SortDirection, SortSpec};

pub struct FilterOrder;

impl FilterOrder {
    /// Resolve `sort`/`order` query values against the fields an endpoint allows.
    ///
    /// `sort` may carry a leading `-` for descending. Unknown fields fall back to
    /// the endpoint default rather than failing the request.
    pub fn resolve(
        raw_field: Option<&str>,
        raw_direction: Option<&str>,
        allowed: &[&str],
        default: &SortSpec,
    ) -> SortSpec {
        let raw_field = raw_field.map(str::trim).unwrap_or("");
        let (field, prefixed_desc) = match raw_field.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (raw_field, false),
        };

        if field.is_empty() || !allowed.contains(&field) {
            let direction = Self::parse_direction(raw_direction).unwrap_or(default.direction);
            return SortSpec::new(default.field.clone(), direction);
        }

        let direction = Self::parse_direction(raw_direction).unwrap_or(if prefixed_desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        });
        SortSpec::new(field, direction)
    }

    fn parse_direction(raw: Option<&str>) -> Option<SortDirection> {
        match raw?.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => Some(SortDirection::Asc),
            "desc" | "descending" | "-1" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}
