//! Scripted mock backend and row builders shared by the flow tests.

#![allow(dead_code)] // not every flow test uses every helper

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use serde_json::{json, Value};

use enrolldesk::client::{ApiEnvelope, BackendClient, CustomerQuery, CustomerUpdate, NewCustomer};
use enrolldesk::models::conversion::ConversionRequest;
use enrolldesk::models::entity::EntityId;
use enrolldesk::{AppError, Result};

type Queue = Mutex<VecDeque<Result<ApiEnvelope>>>;

/// Scripted backend: per-endpoint FIFO queues of canned outcomes, plus a
/// call log for asserting that validation failures never reach the wire.
#[derive(Default)]
pub struct MockBackend {
    pub unconverted: Queue,
    pub converted: Queue,
    pub customers: Queue,
    pub customer_by_id: Queue,
    pub conversions: Queue,
    pub analytics: Queue,
    pub rates: Queue,
    pub history: Queue,
    pub mutations: Queue,
    pub convert_calls: Mutex<Vec<(EntityId, ConversionRequest)>>,
}

impl MockBackend {
    pub fn script(queue: &Queue, outcome: Result<ApiEnvelope>) {
        queue.lock().expect("queue lock").push_back(outcome);
    }

    fn pop(queue: &Queue) -> Result<ApiEnvelope> {
        queue
            .lock()
            .expect("queue lock")
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Transport("no scripted response".into())))
    }

    fn respond(queue: &Queue) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + 'static>> {
        let outcome = Self::pop(queue);
        Box::pin(async move { outcome })
    }
}

impl BackendClient for MockBackend {
    fn get_customers(
        &self,
        _query: CustomerQuery,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Self::respond(&self.customers)
    }

    fn get_customer(
        &self,
        _id: EntityId,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Self::respond(&self.customer_by_id)
    }

    fn create_customer(
        &self,
        _payload: NewCustomer,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Self::respond(&self.mutations)
    }

    fn update_customer(
        &self,
        _id: EntityId,
        _update: CustomerUpdate,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Self::respond(&self.mutations)
    }

    fn delete_customer(
        &self,
        _id: EntityId,
        _reason: String,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Self::respond(&self.mutations)
    }

    fn get_unconverted_customers(
        &self,
        _page: u32,
        _limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Self::respond(&self.unconverted)
    }

    fn get_converted_students(
        &self,
        _page: u32,
        _limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Self::respond(&self.converted)
    }

    fn convert_customer_to_student(
        &self,
        id: EntityId,
        request: ConversionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        self.convert_calls
            .lock()
            .expect("call log lock")
            .push((id, request));
        Self::respond(&self.conversions)
    }

    fn get_conversion_analytics(
        &self,
        _period: String,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Self::respond(&self.analytics)
    }

    fn get_conversion_history(
        &self,
        _page: u32,
        _limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Self::respond(&self.history)
    }

    fn get_conversion_rates(
        &self,
        _period: String,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Self::respond(&self.rates)
    }
}

/// Flat customer row the way the customers endpoints return it.
pub fn customer_row(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        "phone": "+220000",
        "type": "individual",
        "status": "active",
        "convertedToStudent": false,
        "createdAt": "2024-01-01T09:00:00Z",
        "updatedAt": "2024-01-01T09:00:00Z"
    })
}

/// Nested student row the way the converted-students endpoint returns it.
pub fn student_row(id: i64, first: &str, last: &str, admission_no: &str) -> Value {
    json!({
        "id": id,
        "admissionNo": admission_no,
        "user": {
            "firstName": first,
            "lastName": last,
            "email": format!("{}@example.com", first.to_lowercase()),
            "role": "STUDENT",
            "status": "ACTIVE"
        },
        "createdAt": "2024-01-02T09:00:00Z",
        "updatedAt": "2024-01-02T09:00:00Z"
    })
}

/// Successful envelope carrying a bare array payload.
pub fn array_envelope(rows: Vec<Value>) -> ApiEnvelope {
    ApiEnvelope::ok(Value::Array(rows))
}
