//! Conversion payload, history, and analytics models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Person fields carried on a conversion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionUser {
    /// Given name.
    pub first_name: String,
    /// Family name (everything after the first space of a customer name).
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Phone number, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Wire payload for the convert-customer-to-student operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    /// Operator-entered reason for the conversion.
    pub conversion_reason: String,
    /// Admission number assigned to the new student (`STU-<year>-<NNN>`).
    pub admission_no: String,
    /// Person details for the student account.
    pub user: ConversionUser,
}

/// Operator-entered form backing a conversion attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    /// Given name; required.
    pub first_name: String,
    /// Family name; required.
    pub last_name: String,
    /// Email address; required, format-checked.
    pub email: String,
    /// Phone number; optional.
    pub phone: Option<String>,
    /// Admission number; required non-empty.
    pub admission_no: String,
    /// Reason recorded with the conversion; optional free text.
    pub conversion_reason: String,
}

/// A single historical conversion record.
///
/// The embedded customer/student rows keep their raw upstream shape;
/// adapt with [`crate::models::entity::Entity::from_value`] when needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRecord {
    /// Customer row as it was at conversion time.
    #[serde(default)]
    pub customer: Value,
    /// Student row created by the conversion.
    #[serde(default)]
    pub student: Value,
    /// When the conversion happened (ISO-8601).
    #[serde(default)]
    pub conversion_date: String,
    /// Reason recorded with the conversion.
    #[serde(default)]
    pub conversion_reason: String,
}

/// Point in the conversion trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Calendar day the conversions were counted for.
    pub date: String,
    /// Number of conversions that day.
    pub conversions: u64,
}

/// Aggregated conversion analytics as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionAnalytics {
    /// All customers in the reporting period.
    pub total_customers: u64,
    /// Customers converted to students.
    pub converted_customers: u64,
    /// Customers not yet converted.
    pub unconverted_customers: u64,
    /// Converted / total, as a percentage.
    pub conversion_rate: f64,
    /// Conversions within the trailing window.
    pub recent_conversions: u64,
    /// Per-day conversion counts.
    pub conversion_trend: Vec<TrendPoint>,
}

/// Conversion rate per period granularity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionRates {
    /// Rate over the trailing day.
    pub daily: f64,
    /// Rate over the trailing week.
    pub weekly: f64,
    /// Rate over the trailing month.
    pub monthly: f64,
    /// Rate over the trailing year.
    pub yearly: f64,
}
