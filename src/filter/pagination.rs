use serde::{Deserialize, Serialize};

/// Default and maximum page size for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl PageLimits {
    pub const fn new(default_limit: u64, max_limit: u64) -> Self {
        Self { default_limit, max_limit }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub limit: u64,
    pub skip: u64,
}

/// Resolve raw `page`/`limit` query values into a usable window.
///
/// Never fails: unparsable or non-positive input falls back to page 1 and the
/// default limit, and the limit is always clamped to `[1, max_limit]`.
pub fn resolve(raw_page: Option<&str>, raw_limit: Option<&str>, limits: PageLimits) -> PageWindow {
    let max_limit = limits.max_limit.max(1);
    let page = parse_positive(raw_page).unwrap_or(1);
    let limit = parse_positive(raw_limit)
        .unwrap_or(limits.default_limit)
        .clamp(1, max_limit);

    PageWindow {
        page,
        limit,
        skip: (page - 1).saturating_mul(limit),
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n >= 1)
        .map(|n| n as u64)
}

/// Pagination block attached to every listing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PaginationMeta {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = if total == 0 { 0 } else { total.div_ceil(limit.max(1)) };
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }

    pub fn for_window(window: &PageWindow, total: u64) -> Self {
        Self::new(window.page, window.limit, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: PageLimits = PageLimits::new(20, 100);

    #[test]
    fn missing_input_uses_defaults() {
        let w = resolve(None, None, LIMITS);
        assert_eq!(w, PageWindow { page: 1, limit: 20, skip: 0 });
    }

    #[test]
    fn malformed_input_degrades_to_defaults() {
        for raw in ["abc", "", "0", "-3", "2.5", "1e3", "99999999999999999999"] {
            let w = resolve(Some(raw), Some(raw), LIMITS);
            assert_eq!(w.page, 1, "page for {raw:?}");
            assert_eq!(w.limit, 20, "limit for {raw:?}");
            assert_eq!(w.skip, 0);
        }
    }

    #[test]
    fn limit_is_clamped_to_max() {
        let w = resolve(Some("1"), Some("5000"), LIMITS);
        assert_eq!(w.limit, 100);
    }

    #[test]
    fn default_above_max_is_clamped() {
        let w = resolve(None, None, PageLimits::new(500, 50));
        assert_eq!(w.limit, 50);
        let w = resolve(None, None, PageLimits::new(10, 0));
        assert_eq!(w.limit, 1);
    }

    #[test]
    fn skip_follows_page_and_limit() {
        let w = resolve(Some("3"), Some("10"), LIMITS);
        assert_eq!(w, PageWindow { page: 3, limit: 10, skip: 20 });
        let w = resolve(Some(" 2 "), Some(" 15"), LIMITS);
        assert_eq!(w.skip, 15);
    }

    #[test]
    fn huge_page_saturates_skip() {
        let w = resolve(Some(&i64::MAX.to_string()), Some("100"), LIMITS);
        assert_eq!(w.skip, u64::MAX);
    }

    #[test]
    fn empty_total_has_no_pages() {
        let meta = PaginationMeta::new(1, 20, 0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next_page);
        assert!(!meta.has_prev_page);
    }

    #[test]
    fn total_pages_rounds_up() {
        let meta = PaginationMeta::new(2, 10, 25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next_page);
        assert!(meta.has_prev_page);

        let last = PaginationMeta::new(3, 10, 25);
        assert!(!last.has_next_page);

        let exact = PaginationMeta::new(1, 10, 30);
        assert_eq!(exact.total_pages, 3);
    }

    #[test]
    fn page_past_the_end_has_prev_but_no_next() {
        let meta = PaginationMeta::new(9, 10, 25);
        assert!(!meta.has_next_page);
        assert!(meta.has_prev_page);
    }

    #[test]
    fn serializes_camel_case() {
        let value = serde_json::to_value(PaginationMeta::new(1, 20, 0)).unwrap();
        assert_eq!(value["totalPages"], 0);
        assert_eq!(value["hasNextPage"], false);
        assert_eq!(value["hasPrevPage"], false);
    }
}
