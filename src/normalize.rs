//! Shape-tolerant extraction of entity collections from API responses.
//!
//! Upstream endpoints return "a list of things" in at least four layouts:
//! a bare array, `{data: [...]}`, `{customers: [...]}` and
//! `{data: [...], meta: {...}}`. [`normalize`] folds all of them into a
//! flat `Vec<Value>` so no screen has to special-case its endpoint. The
//! key-scan fallback is best-effort, not a backend contract; when it
//! fires a warning is logged because it signals upstream API drift.

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

/// Candidate collection keys tried in priority order.
pub const DEFAULT_COLLECTION_KEYS: [&str; 3] = ["data", "customers", "students"];

/// Extract a flat entity list from a raw response value.
///
/// Resolution order:
/// 1. `raw` is already an array — use it.
/// 2. First key in `collection_keys` whose value is an array — use it
///    (even when empty; a named empty collection is an answer).
/// 3. First own property holding a non-empty array — use it, with a
///    drift warning.
/// 4. Otherwise an empty list; non-object input degrades silently.
///
/// Duplicate `id`s within the extracted list are de-duplicated keeping
/// the last-seen row, since upstream repeats a record to supersede it.
/// Never fails.
#[must_use]
pub fn normalize(raw: &Value, collection_keys: &[&str]) -> Vec<Value> {
    if let Value::Array(items) = raw {
        return dedupe_last_wins(items.clone());
    }

    let Value::Object(map) = raw else {
        if !raw.is_null() {
            warn!(kind = value_kind(raw), "response is neither array nor object; yielding empty collection");
        }
        return Vec::new();
    };

    for key in collection_keys {
        if let Some(Value::Array(items)) = map.get(*key) {
            return dedupe_last_wins(items.clone());
        }
    }

    for (key, value) in map {
        if let Value::Array(items) = value {
            if !items.is_empty() {
                warn!(
                    key = key.as_str(),
                    "collection found under unexpected key; upstream response shape drifted"
                );
                return dedupe_last_wins(items.clone());
            }
        }
    }

    warn!(
        keys = ?map.keys().collect::<Vec<_>>(),
        "no array-valued property in response; yielding empty collection"
    );
    Vec::new()
}

/// [`normalize`] with the default candidate keys.
#[must_use]
pub fn normalize_default(raw: &Value) -> Vec<Value> {
    normalize(raw, &DEFAULT_COLLECTION_KEYS)
}

/// De-duplicate rows by `id`, keeping the last-seen row in the position
/// the id first appeared. Rows without a usable `id` pass through.
#[must_use]
pub fn dedupe_last_wins(items: Vec<Value>) -> Vec<Value> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<Value> = Vec::with_capacity(items.len());

    for item in items {
        match item.get("id").and_then(id_key) {
            Some(key) => {
                if let Some(&pos) = positions.get(&key) {
                    // A repeated id supersedes the earlier row.
                    out[pos] = item;
                } else {
                    positions.insert(key, out.len());
                    out.push(item);
                }
            }
            None => out.push(item),
        }
    }

    out
}

/// Canonical map key for an id value; string and numeric ids that print
/// identically collapse to one key.
fn id_key(id: &Value) -> Option<String> {
    match id {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
