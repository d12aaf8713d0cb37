//! Error types shared across the application.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Field-level validation failures keyed by form field name.
pub type FieldErrors = BTreeMap<String, String>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Network or protocol failure reaching the backend.
    Transport(String),
    /// Backend responded with `success: false` and an application message.
    Api(String),
    /// Local form validation failure; never reaches the network.
    Validation(FieldErrors),
    /// Durable local storage read or write failure.
    Storage(String),
    /// Requested entity does not exist.
    NotFound(String),
    /// Customer has already been converted to a student.
    AlreadyConverted(String),
    /// A conversion attempt is already submitting; duplicate submit rejected.
    InFlight(String),
}

impl AppError {
    /// Human-readable message suitable for surfacing to the operator.
    ///
    /// Application errors are surfaced verbatim; everything else is
    /// prefixed with its failure domain.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Api(msg) => write!(f, "api: {msg}"),
            Self::Validation(fields) => {
                write!(f, "validation failed")?;
                for (field, msg) in fields {
                    write!(f, "; {field}: {msg}")?;
                }
                Ok(())
            }
            Self::Storage(msg) => write!(f, "storage: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::AlreadyConverted(msg) => write!(f, "already converted: {msg}"),
            Self::InFlight(msg) => write!(f, "in flight: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
