use chrono::Utc;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

use crate::api::format::shape_page;
use crate::database::store::GroupBucket;
use crate::database::{execute, DocumentStore, Page, StoreError, StoreHandle};
use crate::filter::{
    pagination, FilterError, FilterOrder, FilterPredicate, FilterWhere, PageLimits, PaginationMeta, QueryRequest,
};
use crate::resources::{ResourceSpec, StatsSpec, ValidStatusUpdate};

#[derive(Debug, Clone, Copy)]
pub struct QuerySettings {
    pub limits: PageLimits,
    pub max_search_length: usize,
}

/// Result of one listing: the page, its pagination block, and the optional
/// aggregate block computed over the same filter.
#[derive(Debug, Clone)]
pub struct Listing {
    pub page: Page,
    pub pagination: PaginationMeta,
    pub stats: Option<Value>,
}

/// Generic admin listing service, parameterized per call by a `ResourceSpec`.
pub struct AdminQueryService {
    store: StoreHandle,
    settings: QuerySettings,
}

impl AdminQueryService {
    pub fn new(store: StoreHandle, settings: QuerySettings) -> Self {
        Self { store, settings }
    }

    /// Build a request from raw query parameters. Only an out-of-set enum
    /// filter value fails; pagination and sort always resolve.
    pub fn request(&self, spec: &ResourceSpec, params: &HashMap<String, String>) -> Result<QueryRequest, FilterError> {
        let param = |key: &str| params.get(key).map(String::as_str);

        let window = pagination::resolve(param("page"), param("limit"), self.settings.limits);
        let predicate = FilterWhere::compose(params, &spec.fields, self.settings.max_search_length)?;
        let sort = FilterOrder::resolve(param("sort"), param("order"), spec.sort_fields, &spec.default_sort());

        Ok(QueryRequest { window, sort, predicate })
    }

    /// Listing and stats run concurrently against the same predicate, with no
    /// shared snapshot between them.
    pub async fn list(&self, spec: &ResourceSpec, request: &QueryRequest) -> Result<Listing, StoreError> {
        let store = self.store.as_ref();
        let window = request.window;

        let page = execute(
            store,
            spec.collection,
            &request.predicate,
            &request.sort,
            window.skip,
            window.limit,
        );
        let stats = stats_for(store, spec, &request.predicate);

        let (page, stats) = futures::try_join!(page, stats)?;
        let pagination = PaginationMeta::for_window(&window, page.total);
        Ok(Listing { page, pagination, stats })
    }

    pub async fn get(&self, spec: &ResourceSpec, id: &str) -> Result<Option<Value>, StoreError> {
        let doc = self.store.get(spec.collection, id).await?;
        Ok(doc.map(spec.mapper))
    }

    pub async fn update_status(
        &self,
        spec: &ResourceSpec,
        id: &str,
        update: &ValidStatusUpdate,
        actor: &str,
    ) -> Result<Option<Value>, StoreError> {
        let patch = update.to_patch(actor, Utc::now());
        let doc = self.store.update(spec.collection, id, patch).await?;
        Ok(doc.map(spec.mapper))
    }
}

async fn stats_for(
    store: &dyn DocumentStore,
    spec: &ResourceSpec,
    predicate: &FilterPredicate,
) -> Result<Option<Value>, StoreError> {
    let Some(stats) = &spec.stats else {
        return Ok(None);
    };
    let buckets = store.aggregate(spec.collection, predicate, &stats.aggregation()).await?;
    Ok(Some(stats_block(spec, stats, &buckets)))
}

/// `data` block of a listing response.
pub fn shape(spec: &ResourceSpec, listing: Listing) -> Value {
    let mut data = shape_page(spec.response_key, listing.page.items, spec.mapper, listing.pagination);
    if let (Some(stats), Value::Object(obj)) = (listing.stats, &mut data) {
        obj.insert("stats".to_string(), stats);
    }
    data
}

/// `{byStatus: {...}, total, totalRevenue?}`. Every lifecycle status is listed,
/// zero when absent; documents without the group field count under `unknown`.
fn stats_block(spec: &ResourceSpec, stats: &StatsSpec, buckets: &[GroupBucket]) -> Value {
    let mut by_group = Map::new();
    if stats.group_field == "status" {
        for status in spec.statuses {
            by_group.insert(status.to_string(), json!(0));
        }
    }

    let mut total = 0u64;
    let mut sum = rust_decimal::Decimal::ZERO;
    for bucket in buckets {
        let key = bucket.key.clone().unwrap_or_else(|| "unknown".to_string());
        let prior = by_group.get(&key).and_then(Value::as_u64).unwrap_or(0);
        by_group.insert(key, json!(prior + bucket.count));
        total += bucket.count;
        sum += bucket.sum;
    }

    let group_key = format!("by{}", capitalize(stats.group_field));
    let mut block = Map::new();
    block.insert(group_key, Value::Object(by_group));
    block.insert("total".to_string(), json!(total));
    if stats.sum_field.is_some() {
        block.insert(stats.sum_label.to_string(), json!(sum));
    }
    Value::Object(block)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::resources::find;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Arc;

    const SETTINGS: QuerySettings = QuerySettings {
        limits: PageLimits::new(20, 100),
        max_search_length: 100,
    };

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    async fn orders_service() -> AdminQueryService {
        let store = MemoryStore::new();
        for v in [
            json!({"_id": "o1", "status": "delivered", "paymentStatus": "paid", "totalAmount": 1500, "customerName": "Jane Doe", "createdAt": "2024-02-01"}),
            json!({"_id": "o2", "status": "pending", "paymentStatus": "pending", "totalAmount": 800, "customerName": "John Mwangi", "createdAt": "2024-02-02"}),
            json!({"_id": "o3", "status": "shipped", "paymentStatus": "paid", "totalAmount": 250.75, "customerEmail": "mjane99@x.com", "createdAt": "2024-02-03"}),
        ] {
            store.insert("orders", v.as_object().cloned().unwrap()).await.unwrap();
        }
        AdminQueryService::new(Arc::new(store), SETTINGS)
    }

    #[tokio::test]
    async fn request_resolves_defaults() {
        let svc = orders_service().await;
        let orders = find("orders").unwrap();
        let req = svc.request(orders, &HashMap::new()).unwrap();
        assert_eq!(req.window.limit, 20);
        assert_eq!(req.sort, orders.default_sort());
        assert!(req.predicate.is_unfiltered());
    }

    #[tokio::test]
    async fn listing_includes_revenue_of_paid_orders() {
        let svc = orders_service().await;
        let orders = find("orders").unwrap();
        let req = svc.request(orders, &params(&[("limit", "2")])).unwrap();
        let listing = svc.list(orders, &req).await.unwrap();
        assert_eq!(listing.page.items.len(), 2);
        assert_eq!(listing.pagination.total, 3);
        assert_eq!(listing.pagination.total_pages, 2);

        let stats = listing.stats.clone().unwrap();
        assert_eq!(stats["total"], 3);
        assert_eq!(stats["byStatus"]["pending"], 1);
        assert_eq!(stats["byStatus"]["cancelled"], 0);
        let revenue: Decimal = serde_json::from_value(stats["totalRevenue"].clone()).unwrap();
        assert_eq!(revenue, Decimal::from_str("1750.75").unwrap());
    }

    #[tokio::test]
    async fn stats_follow_the_listing_filter() {
        let svc = orders_service().await;
        let orders = find("orders").unwrap();
        let req = svc.request(orders, &params(&[("search", "jane")])).unwrap();
        let listing = svc.list(orders, &req).await.unwrap();
        assert_eq!(listing.pagination.total, 2);
        assert_eq!(listing.stats.unwrap()["total"], 2);
    }

    #[tokio::test]
    async fn shaped_listing_has_resource_key_pagination_and_stats() {
        let svc = orders_service().await;
        let orders = find("orders").unwrap();
        let req = svc.request(orders, &HashMap::new()).unwrap();
        let data = shape(orders, svc.list(orders, &req).await.unwrap());
        assert_eq!(data["orders"].as_array().unwrap().len(), 3);
        assert_eq!(data["orders"][0]["id"], "o3");
        assert_eq!(data["pagination"]["total"], 3);
        assert!(data["stats"].is_object());
    }

    #[tokio::test]
    async fn resources_without_stats_omit_the_block() {
        let svc = AdminQueryService::new(Arc::new(MemoryStore::new()), SETTINGS);
        let toolkits = find("toolkits").unwrap();
        let req = svc.request(toolkits, &HashMap::new()).unwrap();
        let data = shape(toolkits, svc.list(toolkits, &req).await.unwrap());
        assert!(data.get("stats").is_none());
        assert_eq!(data["toolkits"], json!([]));
    }

    #[tokio::test]
    async fn status_update_goes_through_mapper() {
        let svc = orders_service().await;
        let orders = find("orders").unwrap();
        let update = ValidStatusUpdate { status: "cancelled".into(), note: Some("customer request".into()) };
        let out = svc.update_status(orders, "o2", &update, "fin-1").await.unwrap().unwrap();
        assert_eq!(out["id"], "o2");
        assert_eq!(out["status"], "cancelled");
        assert_eq!(out["statusHistory"][0]["note"], "customer request");
        assert!(svc.update_status(orders, "nope", &update, "fin-1").await.unwrap().is_none());
    }

    #[test]
    fn unknown_group_keys_are_counted() {
        let news = find("news").unwrap();
        let buckets = vec![
            GroupBucket { key: None, count: 2, sum: Decimal::ZERO },
            GroupBucket { key: Some("draft".into()), count: 1, sum: Decimal::ZERO },
        ];
        let block = stats_block(news, &StatsSpec::by_status(), &buckets);
        assert_eq!(block["byStatus"]["unknown"], 2);
        assert_eq!(block["byStatus"]["published"], 0);
        assert_eq!(block["total"], 3);
        assert!(block.get("totalRevenue").is_none());
    }
}
