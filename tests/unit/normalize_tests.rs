//! Unit tests for the response-shape normalizer.
//!
//! Covers the four observed upstream layouts, the first-array fallback,
//! the empty degradation, and last-wins id de-duplication.

use serde_json::json;

use enrolldesk::normalize::{dedupe_last_wins, normalize, normalize_default};

// ─── Shape coverage ───────────────────────────────────────────────────

#[test]
fn bare_array_passes_through() {
    let raw = json!([1, 2]);
    assert_eq!(normalize_default(&raw), vec![json!(1), json!(2)]);
}

#[test]
fn data_key_is_unwrapped() {
    let raw = json!({ "data": [1, 2] });
    assert_eq!(normalize_default(&raw), vec![json!(1), json!(2)]);
}

#[test]
fn customers_key_is_unwrapped() {
    let raw = json!({ "customers": [1, 2] });
    assert_eq!(normalize_default(&raw), vec![json!(1), json!(2)]);
}

#[test]
fn fallback_scans_for_first_nonempty_array() {
    let raw = json!({ "foo": "bar", "list": [1, 2] });
    assert_eq!(normalize_default(&raw), vec![json!(1), json!(2)]);
}

#[test]
fn empty_object_yields_empty_collection() {
    assert!(normalize_default(&json!({})).is_empty());
}

#[test]
fn data_with_meta_is_unwrapped() {
    let raw = json!({ "data": [{ "id": 1 }], "meta": { "total": 40 } });
    assert_eq!(normalize_default(&raw), vec![json!({ "id": 1 })]);
}

// ─── Priority and fallback rules ──────────────────────────────────────

#[test]
fn priority_keys_win_over_fallback_scan() {
    // `other` is non-empty, but `data` is a named candidate and wins
    // even though it sorts after `other` in the object.
    let raw = json!({ "other": [9], "data": [1] });
    assert_eq!(normalize_default(&raw), vec![json!(1)]);
}

#[test]
fn named_empty_collection_is_an_answer() {
    // An empty array under a candidate key must not fall through to the
    // scan, which would pick up the unrelated `warnings` array.
    let raw = json!({ "data": [], "warnings": [1, 2] });
    assert!(normalize_default(&raw).is_empty());
}

#[test]
fn fallback_skips_empty_arrays() {
    let raw = json!({ "empty": [], "rows": [3] });
    assert_eq!(normalize_default(&raw), vec![json!(3)]);
}

#[test]
fn custom_key_order_is_respected() {
    let raw = json!({ "students": [1], "conversions": [2] });
    assert_eq!(normalize(&raw, &["conversions"]), vec![json!(2)]);
}

// ─── Degenerate input ─────────────────────────────────────────────────

#[test]
fn non_object_input_degrades_to_empty() {
    assert!(normalize_default(&json!("nope")).is_empty());
    assert!(normalize_default(&json!(42)).is_empty());
    assert!(normalize_default(&json!(null)).is_empty());
}

#[test]
fn repeated_calls_are_deterministic() {
    let raw = json!({ "customers": [{ "id": 1 }, { "id": 2 }] });
    assert_eq!(normalize_default(&raw), normalize_default(&raw));
}

// ─── De-duplication ───────────────────────────────────────────────────

#[test]
fn repeated_id_keeps_last_seen_row() {
    let raw = json!([
        { "id": 1, "name": "stale" },
        { "id": 2, "name": "two" },
        { "id": 1, "name": "fresh" }
    ]);
    let rows = normalize_default(&raw);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], json!({ "id": 1, "name": "fresh" }));
    assert_eq!(rows[1], json!({ "id": 2, "name": "two" }));
}

#[test]
fn string_and_numeric_ids_that_print_alike_collapse() {
    let rows = dedupe_last_wins(vec![json!({ "id": "7" }), json!({ "id": 7, "v": 1 })]);
    assert_eq!(rows, vec![json!({ "id": 7, "v": 1 })]);
}

#[test]
fn rows_without_ids_pass_through() {
    let rows = dedupe_last_wins(vec![json!({ "x": 1 }), json!({ "x": 1 })]);
    assert_eq!(rows.len(), 2);
}
