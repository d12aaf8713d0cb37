//! Backend collaborator seam.
//!
//! The [`BackendClient`] trait decouples the data layer (directory,
//! conversion orchestrator, analytics) from the HTTP transport. All
//! collection and conversion traffic routes through this trait, so tests
//! substitute a scripted mock and the orchestrator never sees `reqwest`.

pub mod http;

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::conversion::ConversionRequest;
use crate::models::entity::EntityId;
use crate::{AppError, Result};

/// Standard response wrapper every backend endpoint uses.
///
/// A request fails two ways: the promise-level rejection (mapped to
/// [`AppError::Transport`] by the transport) and `success: false` with an
/// application message. Callers must treat both as failure; use
/// [`ApiEnvelope::into_data`] to collapse the second into [`AppError::Api`].
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    /// Application-level success flag.
    #[serde(default)]
    pub success: bool,
    /// Response payload; shape varies per endpoint.
    #[serde(default)]
    pub data: Value,
    /// Human-readable message, populated on failure.
    #[serde(default)]
    pub message: String,
    /// Optional pagination/diagnostic metadata.
    #[serde(default)]
    pub meta: Option<Value>,
}

impl ApiEnvelope {
    /// Successful envelope wrapping `data`.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data,
            message: String::new(),
            meta: None,
        }
    }

    /// Failed envelope carrying an application message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Value::Null,
            message: message.into(),
            meta: None,
        }
    }

    /// Unwrap the payload, converting `success: false` into a failure.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Api`] with the envelope message (or a generic
    /// fallback when the backend sent none).
    pub fn into_data(self) -> Result<Value> {
        if self.success {
            Ok(self.data)
        } else if self.message.is_empty() {
            Err(AppError::Api("request failed".to_owned()))
        } else {
            Err(AppError::Api(self.message))
        }
    }
}

/// Filterable customer listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerQuery {
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Filter by status tag.
    pub status: Option<String>,
    /// Filter by customer type.
    pub customer_type: Option<String>,
    /// Filter by priority tag.
    pub priority: Option<String>,
    /// Free-text search term.
    pub search: Option<String>,
}

impl CustomerQuery {
    /// Query for one page with no filters.
    #[must_use]
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    /// Flatten into query-string parameters, omitting unset filters.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(status) = &self.status {
            params.push(("status", status.clone()));
        }
        if let Some(customer_type) = &self.customer_type {
            params.push(("type", customer_type.clone()));
        }
        if let Some(priority) = &self.priority {
            params.push(("priority", priority.clone()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}

impl Default for CustomerQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            status: None,
            customer_type: None,
            priority: None,
            search: None,
        }
    }
}

/// Payload for creating a customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// `individual` or `corporate`.
    #[serde(rename = "type")]
    pub customer_type: String,
    /// Priority tag, when assigned at intake.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

/// Partial update for a customer record; unset fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdate {
    /// New full name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// New customer type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<String>,
    /// New priority tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// New status tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// REST backend collaborator.
///
/// Every method resolves to the standard [`ApiEnvelope`]; transport
/// failures surface as [`AppError::Transport`]. Implementations must not
/// retry — retry policy belongs to the operator, not this layer.
pub trait BackendClient: Send + Sync {
    /// List customers with optional filters.
    fn get_customers(
        &self,
        query: CustomerQuery,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>>;

    /// Fetch a single customer by id.
    fn get_customer(
        &self,
        id: EntityId,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>>;

    /// Create a customer record.
    fn create_customer(
        &self,
        payload: NewCustomer,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>>;

    /// Apply a partial update to a customer record.
    fn update_customer(
        &self,
        id: EntityId,
        update: CustomerUpdate,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>>;

    /// Delete a customer record, recording the reason.
    fn delete_customer(
        &self,
        id: EntityId,
        reason: String,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>>;

    /// Page through customers not yet converted to students.
    fn get_unconverted_customers(
        &self,
        page: u32,
        limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>>;

    /// Page through students that originated from conversions.
    fn get_converted_students(
        &self,
        page: u32,
        limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>>;

    /// Convert a customer into a student.
    fn convert_customer_to_student(
        &self,
        id: EntityId,
        request: ConversionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>>;

    /// Conversion analytics for a reporting period (for example `30d`).
    fn get_conversion_analytics(
        &self,
        period: String,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>>;

    /// Page through historical conversion records.
    fn get_conversion_history(
        &self,
        page: u32,
        limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>>;

    /// Conversion rates per period granularity.
    fn get_conversion_rates(
        &self,
        period: String,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>>;
}
