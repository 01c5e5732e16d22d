//! Envelope normalization: the one place that knows how each endpoint wraps
//! its payload.
//!
//! Every list response is turned into a [`ListEnvelope`], every detail
//! response into the bare entity, and every object carrying a server `_id`
//! gains an `id` with the same value so rows can be keyed uniformly.

use serde::de::DeserializeOwned;
use serde_json::Value;

use backoffice_core::envelope::{display_path, lookup};
use backoffice_core::{EnvelopeShape, ListEnvelope, ListParams, total_pages};

use crate::error::ServiceError;

const TOTAL_KEYS: &[&str] = &["total", "totalItems", "totalCount", "totalDocs", "count"];
const PAGE_KEYS: &[&str] = &["page", "currentPage"];
const PAGE_SIZE_KEYS: &[&str] = &["limit", "pageSize", "perPage"];
const TOTAL_PAGES_KEYS: &[&str] = &["totalPages", "pages"];

/// Copy `_id` into `id` on every object in the tree that lacks an `id`.
pub fn normalize_ids(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if !map.contains_key("id") {
                let derived = match map.get("_id") {
                    Some(Value::String(s)) => Some(Value::String(s.clone())),
                    Some(Value::Number(n)) => Some(Value::String(n.to_string())),
                    Some(Value::Object(oid)) => oid
                        .get("$oid")
                        .and_then(Value::as_str)
                        .map(|s| Value::String(s.to_string())),
                    _ => None,
                };
                if let Some(id) = derived {
                    map.insert("id".to_string(), id);
                }
            }
            for child in map.values_mut() {
                normalize_ids(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                normalize_ids(item);
            }
        }
        _ => {}
    }
}

/// The server-provided error message, if the body carries one.
pub fn extract_message(body: &Value) -> Option<String> {
    let candidates = [
        lookup(body, &["message"]),
        lookup(body, &["error", "message"]),
        lookup(body, &["error"]),
        lookup(body, &["data", "message"]),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_string)
}

/// Locate the collection and pagination of a list response.
///
/// Missing totals fall back to the collection length; missing page/limit to
/// the request's own values. A missing collection is an error: guessing
/// another key would silently show the wrong data.
pub fn normalize_list_value(
    shape: &EnvelopeShape,
    mut body: Value,
    params: &ListParams,
    fallback: &str,
) -> Result<ListEnvelope<Value>, ServiceError> {
    normalize_ids(&mut body);

    let mut items = match lookup(&body, shape.collection) {
        Some(Value::Array(items)) => items.clone(),
        Some(other) => {
            tracing::warn!(
                path = %display_path(shape.collection),
                found = %json_kind(other),
                "list response collection is not an array"
            );
            return Err(ServiceError::Normalization {
                message: fallback.to_string(),
                detail: format!(
                    "expected an array at {}, found {}",
                    display_path(shape.collection),
                    json_kind(other)
                ),
            });
        }
        None => match &body {
            Value::Array(items) => items.clone(),
            _ => {
                tracing::warn!(
                    path = %display_path(shape.collection),
                    "list response has no collection at the declared path"
                );
                return Err(ServiceError::Normalization {
                    message: fallback.to_string(),
                    detail: format!("no collection at {}", display_path(shape.collection)),
                });
            }
        },
    };

    let pagination = shape
        .pagination
        .iter()
        .filter_map(|path| lookup(&body, path))
        .find(|node| has_any_key(node, TOTAL_KEYS) || has_any_key(node, TOTAL_PAGES_KEYS));

    let page = pagination
        .and_then(|p| number_at(p, PAGE_KEYS))
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n >= 1)
        .unwrap_or(params.page());

    let page_size = pagination
        .and_then(|p| number_at(p, PAGE_SIZE_KEYS))
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n >= 1)
        .unwrap_or(params.limit());

    let total = match pagination.and_then(|p| number_at(p, TOTAL_KEYS)) {
        Some(total) => total,
        None => {
            tracing::debug!("list response carries no total; using collection length");
            items.len() as u64
        }
    };

    let pages = pagination
        .and_then(|p| number_at(p, TOTAL_PAGES_KEYS))
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or_else(|| total_pages(total, page_size));

    if items.len() > page_size as usize {
        tracing::warn!(
            received = items.len(),
            page_size,
            "list response has more items than the page size; truncating"
        );
        items.truncate(page_size as usize);
    }

    Ok(ListEnvelope::new(items, total, page, page_size, pages))
}

/// Normalize a list response and decode its items.
pub fn normalize_list<T: DeserializeOwned>(
    shape: &EnvelopeShape,
    body: Value,
    params: &ListParams,
    fallback: &str,
) -> Result<ListEnvelope<T>, ServiceError> {
    let envelope = normalize_list_value(shape, body, params, fallback)?;

    let mut items = Vec::with_capacity(envelope.items.len());
    for (index, item) in envelope.items.into_iter().enumerate() {
        let decoded = serde_json::from_value::<T>(item).map_err(|e| ServiceError::Decode {
            message: fallback.to_string(),
            detail: format!("item {index}: {e}"),
        })?;
        items.push(decoded);
    }

    Ok(ListEnvelope::new(
        items,
        envelope.total,
        envelope.page,
        envelope.page_size,
        envelope.total_pages,
    ))
}

/// Locate and decode the entity of a single-entity response.
pub fn normalize_entity<T: DeserializeOwned>(
    shape: &EnvelopeShape,
    mut body: Value,
    fallback: &str,
) -> Result<T, ServiceError> {
    normalize_ids(&mut body);

    let entity = match lookup(&body, shape.entity) {
        Some(entity) if entity.is_object() => entity.clone(),
        Some(other) => {
            tracing::warn!(
                path = %display_path(shape.entity),
                found = %json_kind(other),
                "entity response payload is not an object"
            );
            return Err(ServiceError::Normalization {
                message: fallback.to_string(),
                detail: format!(
                    "expected an object at {}, found {}",
                    display_path(shape.entity),
                    json_kind(other)
                ),
            });
        }
        None => {
            tracing::warn!(
                path = %display_path(shape.entity),
                "entity response has no payload at the declared path"
            );
            return Err(ServiceError::Normalization {
                message: fallback.to_string(),
                detail: format!("no entity at {}", display_path(shape.entity)),
            });
        }
    };

    serde_json::from_value(entity).map_err(|e| ServiceError::Decode {
        message: fallback.to_string(),
        detail: e.to_string(),
    })
}

fn has_any_key(node: &Value, keys: &[&str]) -> bool {
    keys.iter().any(|k| node.get(*k).is_some())
}

/// First key whose value is a non-negative integer (or a numeric string).
fn number_at(node: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|k| match node.get(*k)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RFQ_SHAPE: EnvelopeShape = EnvelopeShape::keyed(&["data", "rfqs"], &["data", "rfq"]);
    const INVENTORY_SHAPE: EnvelopeShape = EnvelopeShape::keyed(&["inventory"], &["data"]);

    #[test]
    fn default_shape_reads_data_items_and_totals() {
        let body = json!({
            "success": true,
            "data": {
                "items": (0..10).map(|i| json!({ "_id": format!("p{i}") })).collect::<Vec<_>>(),
                "total": 25,
                "page": 2,
                "limit": 10
            }
        });

        let envelope =
            normalize_list_value(&EnvelopeShape::DEFAULT, body, &ListParams::new(2, 10), "x")
                .unwrap();

        assert_eq!(envelope.total, 25);
        assert_eq!(envelope.page, 2);
        assert_eq!(envelope.page_size, 10);
        assert_eq!(envelope.total_pages, 3);
        assert_eq!(envelope.items.len(), 10);
        assert_eq!(envelope.items[0]["id"], "p0");
    }

    #[test]
    fn resource_named_key_with_nested_pagination_object() {
        let body = json!({
            "inventory": [{ "_id": "i1" }, { "_id": "i2" }],
            "pagination": { "totalItems": "42", "currentPage": 3, "pageSize": 2, "totalPages": 21 }
        });

        let envelope =
            normalize_list_value(&INVENTORY_SHAPE, body, &ListParams::new(3, 2), "x").unwrap();

        assert_eq!(envelope.total, 42);
        assert_eq!(envelope.page, 3);
        assert_eq!(envelope.total_pages, 21);
    }

    #[test]
    fn missing_totals_fall_back_to_length_and_request() {
        let body = json!({ "data": { "rfqs": [{ "_id": "r1" }, { "_id": "r2" }, { "_id": "r3" }] } });

        let envelope =
            normalize_list_value(&RFQ_SHAPE, body, &ListParams::new(1, 2), "x").unwrap();

        // Three items for a page size of two: totals come from the length,
        // then the page is trimmed to its size.
        assert_eq!(envelope.total, 3);
        assert_eq!(envelope.page, 1);
        assert_eq!(envelope.page_size, 2);
        assert_eq!(envelope.total_pages, 2);
        assert_eq!(envelope.items.len(), 2);
    }

    #[test]
    fn bare_array_is_accepted() {
        let body = json!([{ "_id": "a" }]);
        let envelope =
            normalize_list_value(&EnvelopeShape::DEFAULT, body, &ListParams::default(), "x")
                .unwrap();
        assert_eq!(envelope.total, 1);
        assert_eq!(envelope.total_pages, 1);
    }

    #[test]
    fn missing_collection_is_a_normalization_error() {
        let body = json!({ "data": { "products": [] } });
        let err = normalize_list_value(
            &EnvelopeShape::DEFAULT,
            body,
            &ListParams::default(),
            "Failed to fetch products",
        )
        .unwrap_err();

        match err {
            ServiceError::Normalization { message, detail } => {
                assert_eq!(message, "Failed to fetch products");
                assert!(detail.contains("data.items"));
            }
            other => panic!("expected Normalization, got {other:?}"),
        }
    }

    #[test]
    fn entity_is_read_from_declared_wrapper() {
        let body = json!({ "success": true, "data": { "rfq": { "_id": "r9", "status": "open" } } });
        let entity: Value = normalize_entity(&RFQ_SHAPE, body, "x").unwrap();
        assert_eq!(entity["id"], "r9");
        assert_eq!(entity["_id"], "r9");
    }

    #[test]
    fn entity_absent_is_an_error_not_a_guess() {
        let body = json!({ "data": { "order": { "_id": "o1" } } });
        let err = normalize_entity::<Value>(&RFQ_SHAPE, body, "Failed to fetch rfq").unwrap_err();
        assert!(matches!(err, ServiceError::Normalization { .. }));
        assert_eq!(err.message(), "Failed to fetch rfq");
    }

    #[test]
    fn ids_are_normalized_recursively_without_overwriting() {
        let mut value = json!({
            "_id": "outer",
            "supplier": { "_id": { "$oid": "s1" } },
            "items": [{ "_id": 7 }, { "_id": "x", "id": "keep" }]
        });
        normalize_ids(&mut value);

        assert_eq!(value["id"], "outer");
        assert_eq!(value["supplier"]["id"], "s1");
        assert_eq!(value["items"][0]["id"], "7");
        assert_eq!(value["items"][1]["id"], "keep");
    }

    #[test]
    fn message_extraction_prefers_top_level() {
        assert_eq!(
            extract_message(&json!({ "message": "SKU already exists" })).as_deref(),
            Some("SKU already exists")
        );
        assert_eq!(
            extract_message(&json!({ "error": { "message": "nested" } })).as_deref(),
            Some("nested")
        );
        assert_eq!(extract_message(&json!({ "error": "plain" })).as_deref(), Some("plain"));
        assert_eq!(extract_message(&json!({ "message": "  " })), None);
        assert_eq!(extract_message(&Value::Null), None);
    }
}
