//! Unit tests for conversion form helpers and local validation.
//!
//! Validation failures must never reach the network; the scripted
//! backend assertions for that live in the integration flow tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::json;

use enrolldesk::client::{
    ApiEnvelope, BackendClient, CustomerQuery, CustomerUpdate, NewCustomer,
};
use enrolldesk::convert::{
    admission_no_for_year, split_name, AttemptState, ConversionOrchestrator,
};
use enrolldesk::models::conversion::ConversionRequest;
use enrolldesk::models::entity::{Entity, EntityId};
use enrolldesk::{AppError, Result};

/// Backend that must never be reached: these tests exercise selection,
/// validation, and payload building, all of which stay local.
struct StubBackend;

fn unreached() -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + 'static>> {
    Box::pin(async { Err(AppError::Transport("stub backend reached".into())) })
}

impl BackendClient for StubBackend {
    fn get_customers(
        &self,
        _query: CustomerQuery,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        unreached()
    }

    fn get_customer(
        &self,
        _id: EntityId,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        unreached()
    }

    fn create_customer(
        &self,
        _payload: NewCustomer,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        unreached()
    }

    fn update_customer(
        &self,
        _id: EntityId,
        _update: CustomerUpdate,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        unreached()
    }

    fn delete_customer(
        &self,
        _id: EntityId,
        _reason: String,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        unreached()
    }

    fn get_unconverted_customers(
        &self,
        _page: u32,
        _limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        unreached()
    }

    fn get_converted_students(
        &self,
        _page: u32,
        _limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        unreached()
    }

    fn convert_customer_to_student(
        &self,
        _id: EntityId,
        _request: ConversionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        unreached()
    }

    fn get_conversion_analytics(
        &self,
        _period: String,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        unreached()
    }

    fn get_conversion_history(
        &self,
        _page: u32,
        _limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        unreached()
    }

    fn get_conversion_rates(
        &self,
        _period: String,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        unreached()
    }
}

fn customer(name: &str, email: Option<&str>) -> Entity {
    let mut raw = json!({ "id": "c-9", "name": name });
    if let Some(email) = email {
        raw["email"] = json!(email);
    }
    Entity::from_value(&raw).expect("adapts")
}

fn orchestrator() -> ConversionOrchestrator {
    ConversionOrchestrator::new(Arc::new(StubBackend))
}

// ─── Name splitting ───────────────────────────────────────────────────

#[test]
fn name_splits_on_first_space() {
    assert_eq!(
        split_name("Amina Diallo"),
        ("Amina".to_owned(), "Diallo".to_owned())
    );
}

#[test]
fn rest_of_name_joins_as_family_name() {
    assert_eq!(
        split_name("Maria da Silva Santos"),
        ("Maria".to_owned(), "da Silva Santos".to_owned())
    );
}

#[test]
fn single_token_name_leaves_family_name_empty() {
    assert_eq!(split_name("Cher"), ("Cher".to_owned(), String::new()));
}

// ─── Admission numbers ────────────────────────────────────────────────

#[test]
fn admission_no_has_the_stu_year_suffix_format() {
    let no = admission_no_for_year(2024, Some(17));
    assert_eq!(no, "STU-2024-017");
}

#[test]
fn admission_sequence_wraps_at_three_digits() {
    assert_eq!(admission_no_for_year(2024, Some(1017)), "STU-2024-017");
}

#[test]
fn random_admission_no_is_well_formed() {
    let no = admission_no_for_year(2025, None);
    let suffix = no.strip_prefix("STU-2025-").expect("prefix");
    assert_eq!(suffix.len(), 3);
    assert!(suffix.chars().all(|c| c.is_ascii_digit()));
}

// ─── Selection ────────────────────────────────────────────────────────

#[test]
fn selecting_prefills_the_form() {
    let mut orch = orchestrator();
    orch.select(customer("Amina Diallo", Some("amina@example.com")))
        .expect("select");

    assert_eq!(orch.form().first_name, "Amina");
    assert_eq!(orch.form().last_name, "Diallo");
    assert_eq!(orch.form().email, "amina@example.com");
    assert!(orch.form().admission_no.starts_with("STU-"));
    assert_eq!(orch.state(), AttemptState::Idle);
}

#[test]
fn converted_customers_cannot_be_selected() {
    let mut orch = orchestrator();
    let raw = json!({ "id": "c-1", "name": "Done Deal", "convertedToStudent": true });
    let entity = Entity::from_value(&raw).expect("adapts");

    let err = orch.select(entity).expect_err("must reject");
    assert!(matches!(err, AppError::AlreadyConverted(_)));
    assert!(orch.selected().is_none());
}

// ─── Validation ───────────────────────────────────────────────────────

#[test]
fn missing_required_fields_populate_the_error_map() {
    let mut orch = orchestrator();
    orch.select(customer("Cher", None)).expect("select");
    orch.form_mut().admission_no.clear();

    let err = orch.validate().expect_err("must fail");
    let AppError::Validation(fields) = err else {
        panic!("expected validation error, got {err}");
    };

    assert!(fields.contains_key("last_name"));
    assert!(fields.contains_key("email"));
    assert!(fields.contains_key("admission_no"));
    assert!(!fields.contains_key("first_name"));
    assert_eq!(orch.state(), AttemptState::Idle);
    assert_eq!(orch.field_errors(), &fields);
}

#[test]
fn malformed_email_is_rejected() {
    let mut orch = orchestrator();
    orch.select(customer("Amina Diallo", Some("not-an-email")))
        .expect("select");

    let err = orch.validate().expect_err("must fail");
    let AppError::Validation(fields) = err else {
        panic!("expected validation error, got {err}");
    };
    assert_eq!(fields.get("email").map(String::as_str), Some("email format is invalid"));
}

#[test]
fn valid_form_clears_prior_errors() {
    let mut orch = orchestrator();
    orch.select(customer("Cher", None)).expect("select");
    assert!(orch.validate().is_err());
    assert!(!orch.field_errors().is_empty());

    orch.form_mut().last_name = "Sarkisian".into();
    orch.form_mut().email = "cher@example.com".into();
    orch.validate().expect("valid now");
    assert!(orch.field_errors().is_empty());
}

// ─── Payload building ─────────────────────────────────────────────────

#[test]
fn request_payload_trims_and_carries_the_form() {
    let mut orch = orchestrator();
    orch.select(customer("Amina Diallo", Some("amina@example.com")))
        .expect("select");
    orch.form_mut().conversion_reason = "enrolled for term 2".into();
    orch.form_mut().admission_no = " STU-2024-005 ".into();

    let request = orch.build_request();
    assert_eq!(request.admission_no, "STU-2024-005");
    assert_eq!(request.conversion_reason, "enrolled for term 2");
    assert_eq!(request.user.first_name, "Amina");
    assert_eq!(request.user.last_name, "Diallo");
    assert_eq!(request.user.email, "amina@example.com");
}

#[test]
fn request_payload_serializes_camel_case() {
    let mut orch = orchestrator();
    orch.select(customer("Amina Diallo", Some("amina@example.com")))
        .expect("select");

    let value = serde_json::to_value(orch.build_request()).expect("serialize");
    assert!(value.get("conversionReason").is_some());
    assert!(value.get("admissionNo").is_some());
    assert!(value["user"].get("firstName").is_some());
    // Absent phone is omitted entirely, not serialized as null.
    assert!(value["user"].get("phone").is_none());
}
