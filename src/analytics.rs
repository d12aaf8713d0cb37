//! Client-side breakdown tables for dashboard charts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::entity::{Entity, EntityKind};

/// Sentinel bucket for entities missing the grouped field.
const UNKNOWN_KEY: &str = "Unknown";

/// Entity field a breakdown can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Customer vs student partition.
    Kind,
    /// Customer type (`individual` / `corporate`).
    Type,
    /// Priority tag.
    Priority,
    /// Status tag.
    Status,
    /// Acquisition source tag.
    Source,
}

/// One row of a breakdown table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownRow {
    /// Group label (field value or `Unknown`).
    pub key: String,
    /// Entities in the group.
    pub count: usize,
    /// Share of all entities, in percent.
    pub percentage: f64,
}

/// Group entities by a dimension into count/percentage rows.
///
/// Missing or empty field values land in the `Unknown` bucket. Rows are
/// sorted descending by count; ties keep first-encountered key order
/// (the sort is stable). An empty input yields an empty table, so there
/// is no division by zero. Deterministic for a given input order.
#[must_use]
#[allow(clippy::cast_precision_loss)] // group counts stay far below 2^52
pub fn aggregate(entities: &[Entity], dimension: Dimension) -> Vec<BreakdownRow> {
    if entities.is_empty() {
        return Vec::new();
    }

    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for entity in entities {
        let key = dimension_value(entity, dimension);
        match index.get(&key) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let denominator = entities.len() as f64;
    counts
        .into_iter()
        .map(|(key, count)| BreakdownRow {
            key,
            percentage: count as f64 / denominator * 100.0,
            count,
        })
        .collect()
}

/// The grouped field's string value, or the `Unknown` sentinel.
fn dimension_value(entity: &Entity, dimension: Dimension) -> String {
    let value = match dimension {
        Dimension::Kind => Some(match entity.kind {
            EntityKind::Customer => "customer",
            EntityKind::Student => "student",
        }),
        Dimension::Type => entity.customer_type.as_deref(),
        Dimension::Priority => entity.priority.as_deref(),
        Dimension::Status => entity.status.as_deref(),
        Dimension::Source => entity.source.as_deref(),
    };

    match value {
        Some(v) if !v.trim().is_empty() => v.to_owned(),
        _ => UNKNOWN_KEY.to_owned(),
    }
}

/// Locally derived conversion summary for the two collection partitions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionSummary {
    /// Entities across both partitions.
    pub total: usize,
    /// Entities in the converted partition.
    pub converted: usize,
    /// Converted share in percent; 0 for empty collections.
    pub rate: f64,
}

/// Summarize the unconverted/converted partitions the dashboard header
/// shows while the backend analytics call is in flight.
#[must_use]
#[allow(clippy::cast_precision_loss)] // collection sizes stay far below 2^52
pub fn conversion_summary(unconverted: &[Entity], converted: &[Entity]) -> ConversionSummary {
    let total = unconverted.len() + converted.len();
    let rate = if total == 0 {
        0.0
    } else {
        converted.len() as f64 / total as f64 * 100.0
    };
    ConversionSummary {
        total,
        converted: converted.len(),
        rate,
    }
}
