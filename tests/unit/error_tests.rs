//! Unit tests for the error taxonomy.

use enrolldesk::errors::{AppError, FieldErrors};

#[test]
fn display_prefixes_the_failure_domain() {
    assert_eq!(
        AppError::Transport("connection refused".into()).to_string(),
        "transport: connection refused"
    );
    assert_eq!(AppError::Api("no such customer".into()).to_string(), "api: no such customer");
    assert_eq!(
        AppError::Storage("disk full".into()).to_string(),
        "storage: disk full"
    );
}

#[test]
fn validation_display_lists_fields_in_order() {
    let mut fields = FieldErrors::new();
    fields.insert("email".into(), "email is required".into());
    fields.insert("first_name".into(), "first name is required".into());

    // BTreeMap ordering keeps the message deterministic.
    assert_eq!(
        AppError::Validation(fields).to_string(),
        "validation failed; email: email is required; first_name: first name is required"
    );
}

#[test]
fn api_messages_surface_verbatim_to_the_operator() {
    let err = AppError::Api("Customer already converted".into());
    assert_eq!(err.user_message(), "Customer already converted");
}

#[test]
fn other_domains_keep_their_prefix_in_user_messages() {
    let err = AppError::Transport("timeout".into());
    assert_eq!(err.user_message(), "transport: timeout");
}

#[test]
fn toml_errors_map_to_config() {
    let toml_err = toml::from_str::<toml::Value>("= broken").expect_err("must fail");
    let err: AppError = toml_err.into();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn errors_are_std_error() {
    fn assert_std_error<E: std::error::Error>(_err: &E) {}
    assert_std_error(&AppError::NotFound("customer 1".into()));
}
