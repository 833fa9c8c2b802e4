use serde_json::{json, Map, Value};

use crate::database::store::{id_string, plain_value, Document};
use crate::filter::PaginationMeta;

/// Maps a stored document to its client-facing shape.
pub type RecordMapper = fn(Document) -> Value;

/// Fields that never leave the server.
const INTERNAL_FIELDS: &[&str] = &[
    "__v",
    "isDeleted",
    "deletedAt",
    "passwordHash",
    "resetToken",
    "resetTokenExpires",
];

/// Strip internal fields and normalize identifiers.
///
/// `_id` becomes `id` as a plain string; extended-JSON wrappers
/// (`{"$oid": ..}`, `{"$date": ..}`) on top-level fields collapse to strings.
pub fn normalize_record(mut doc: Document) -> Document {
    for field in INTERNAL_FIELDS {
        doc.remove(*field);
    }

    if let Some(raw_id) = doc.remove("_id") {
        if let Some(id) = id_string(&raw_id) {
            doc.insert("id".to_string(), Value::String(id));
        }
    } else if let Some(id) = doc.get("id").and_then(id_string) {
        doc.insert("id".to_string(), Value::String(id));
    }

    for value in doc.values_mut() {
        *value = plain_value(value);
    }
    doc
}

pub fn public_record(doc: Document) -> Value {
    Value::Object(normalize_record(doc))
}

/// Member records exist in two shapes: current (`firstName`/`lastName`) and
/// legacy (single `name`). Both leave here as `firstName`, `lastName`, `fullName`.
pub fn public_member(doc: Document) -> Value {
    let mut doc = normalize_record(doc);

    let text = |doc: &Document, key: &str| {
        doc.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let (first, last) = match (text(&doc, "firstName"), text(&doc, "lastName"), text(&doc, "name")) {
        (None, None, Some(legacy)) => match legacy.split_once(char::is_whitespace) {
            Some((first, rest)) => (Some(first.to_string()), Some(rest.trim().to_string())),
            None => (Some(legacy), None),
        },
        (first, last, _) => (first, last),
    };
    doc.remove("name");

    let full_name = [first.as_deref(), last.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    doc.insert("firstName".into(), first.map(Value::String).unwrap_or(Value::Null));
    doc.insert("lastName".into(), last.map(Value::String).unwrap_or(Value::Null));
    doc.insert("fullName".into(), Value::String(full_name));
    Value::Object(doc)
}

/// Build the `data` block of a listing response:
/// `{ <resource_key>: [...], pagination: {...} }`.
pub fn shape_page(
    resource_key: &str,
    items: Vec<Document>,
    mapper: RecordMapper,
    pagination: PaginationMeta,
) -> Value {
    let records: Vec<Value> = items.into_iter().map(mapper).collect();
    let mut data = Map::new();
    data.insert(resource_key.to_string(), Value::Array(records));
    data.insert("pagination".to_string(), json!(pagination));
    Value::Object(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn strips_internal_fields_and_normalizes_id() {
        let out = public_record(doc(json!({
            "_id": {"$oid": "64f1c0ffee"},
            "__v": 3,
            "isDeleted": false,
            "passwordHash": "x",
            "title": "Hello",
            "eventId": {"$oid": "ev1"},
            "createdAt": {"$date": "2024-05-01T00:00:00Z"},
        })));
        assert_eq!(
            out,
            json!({
                "id": "64f1c0ffee",
                "title": "Hello",
                "eventId": "ev1",
                "createdAt": "2024-05-01T00:00:00Z",
            })
        );
    }

    #[test]
    fn numeric_id_becomes_string() {
        let out = public_record(doc(json!({"id": 7, "title": "x"})));
        assert_eq!(out["id"], "7");
    }

    #[test]
    fn nested_objects_are_left_alone() {
        let out = public_record(doc(json!({"_id": "a", "address": {"city": "Nairobi", "zip": "00100"}})));
        assert_eq!(out["address"]["city"], "Nairobi");
    }

    #[test]
    fn legacy_member_name_is_split() {
        let out = public_member(doc(json!({"_id": "m1", "name": "Wanjiru Mary Kamau"})));
        assert_eq!(out["firstName"], "Wanjiru");
        assert_eq!(out["lastName"], "Mary Kamau");
        assert_eq!(out["fullName"], "Wanjiru Mary Kamau");
        assert!(out.get("name").is_none());
    }

    #[test]
    fn current_member_shape_wins_over_legacy() {
        let out = public_member(doc(json!({"_id": "m2", "firstName": "Amina", "lastName": "Otieno", "name": "Old"})));
        assert_eq!(out["fullName"], "Amina Otieno");
    }

    #[test]
    fn single_word_legacy_name() {
        let out = public_member(doc(json!({"_id": "m3", "name": "Cher"})));
        assert_eq!(out["firstName"], "Cher");
        assert_eq!(out["lastName"], Value::Null);
        assert_eq!(out["fullName"], "Cher");
    }

    #[test]
    fn shaped_pagination_parses_back_unchanged() {
        let meta = PaginationMeta::new(2, 10, 25);
        let data = shape_page("news", vec![doc(json!({"_id": "n1"}))], public_record, meta);
        let parsed: PaginationMeta = serde_json::from_value(data["pagination"].clone()).unwrap();
        assert_eq!(parsed, meta);
        assert_eq!(data["news"][0]["id"], "n1");
    }
}
