//! Customer-to-student conversion orchestration.
//!
//! One attempt walks Idle → Validating → Submitting → Succeeded/Failed.
//! Validation is local and never reaches the network; the backend call
//! happens only from Submitting, and the directory partitions are
//! reconciled only after the backend confirms — there is no optimistic
//! removal to roll back.

use std::sync::{Arc, OnceLock};

use chrono::{Datelike, Local};
use rand::Rng;
use regex::Regex;
use tracing::{info, warn};

use crate::client::{ApiEnvelope, BackendClient};
use crate::directory::CustomerDirectory;
use crate::errors::FieldErrors;
use crate::models::conversion::{ConversionRequest, ConversionUser, StudentForm};
use crate::models::entity::Entity;
use crate::{AppError, Result};

/// Lifecycle of one conversion attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttemptState {
    /// No attempt underway.
    #[default]
    Idle,
    /// Form passed the local required-field check.
    Validating,
    /// Backend call in flight; duplicate submits are rejected.
    Submitting,
    /// Backend confirmed; collections reconciled. Terminal.
    Succeeded,
    /// Backend rejected or was unreachable; collections untouched. Terminal.
    Failed,
}

#[allow(clippy::expect_used)] // pattern is a compile-time constant
fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

/// Split a customer name on the first space: given name, rest as family
/// name. A single-token name leaves the family name empty for the
/// operator to fill in.
#[must_use]
pub fn split_name(name: &str) -> (String, String) {
    match name.trim().split_once(' ') {
        Some((first, rest)) => (first.to_owned(), rest.trim().to_owned()),
        None => (name.trim().to_owned(), String::new()),
    }
}

/// Admission number in the `STU-<year>-<NNN>` format.
///
/// With a sequence source the suffix is `sequence % 1000`; without one it
/// is random. Uniqueness is enforced server-side either way.
#[must_use]
pub fn admission_no_for_year(year: i32, sequence: Option<u32>) -> String {
    let suffix = match sequence {
        Some(seq) => seq % 1000,
        None => rand::thread_rng().gen_range(0..1000),
    };
    format!("STU-{year}-{suffix:03}")
}

/// [`admission_no_for_year`] for the current local year.
#[must_use]
pub fn generate_admission_no(sequence: Option<u32>) -> String {
    admission_no_for_year(Local::now().year(), sequence)
}

/// Drives conversion attempts against the backend and reconciles the
/// directory partitions on success.
pub struct ConversionOrchestrator {
    client: Arc<dyn BackendClient>,
    state: AttemptState,
    selected: Option<Entity>,
    form: StudentForm,
    field_errors: FieldErrors,
    last_failure: Option<String>,
}

impl ConversionOrchestrator {
    /// Orchestrator over `client`, starting Idle with nothing selected.
    #[must_use]
    pub fn new(client: Arc<dyn BackendClient>) -> Self {
        Self {
            client,
            state: AttemptState::Idle,
            selected: None,
            form: StudentForm::default(),
            field_errors: FieldErrors::new(),
            last_failure: None,
        }
    }

    /// Current attempt state.
    #[must_use]
    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Customer selected for conversion, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&Entity> {
        self.selected.as_ref()
    }

    /// Current form contents.
    #[must_use]
    pub fn form(&self) -> &StudentForm {
        &self.form
    }

    /// Mutable form access for operator edits.
    pub fn form_mut(&mut self) -> &mut StudentForm {
        &mut self.form
    }

    /// Field-level errors from the last validation pass.
    #[must_use]
    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// Operator-facing message of the last failed attempt.
    #[must_use]
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Select a customer and prefill the form from its record.
    ///
    /// Starts a fresh attempt: state returns to Idle and prior field
    /// errors are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AlreadyConverted`] for a customer whose
    /// converted marker is set; the selection is left unchanged.
    pub fn select(&mut self, customer: Entity) -> Result<()> {
        if customer.converted {
            return Err(AppError::AlreadyConverted(format!(
                "{} ({}) is already a student",
                customer.display_name, customer.id
            )));
        }

        let (first_name, last_name) = split_name(&customer.display_name);
        self.form = StudentForm {
            first_name,
            last_name,
            email: customer.contact.email.clone().unwrap_or_default(),
            phone: customer.contact.phone.clone(),
            admission_no: generate_admission_no(None),
            conversion_reason: String::new(),
        };
        self.selected = Some(customer);
        self.state = AttemptState::Idle;
        self.field_errors.clear();
        Ok(())
    }

    /// Drop the selection and reset to Idle.
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.form = StudentForm::default();
        self.field_errors.clear();
        self.state = AttemptState::Idle;
    }

    /// Run the local required-field check.
    ///
    /// On success the attempt moves to Validating; on failure it returns
    /// to Idle with the field error map populated and no network call is
    /// made.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] carrying the field error map.
    pub fn validate(&mut self) -> Result<()> {
        self.state = AttemptState::Validating;
        let mut errors = FieldErrors::new();

        if self.form.first_name.trim().is_empty() {
            errors.insert("first_name".into(), "first name is required".into());
        }
        if self.form.last_name.trim().is_empty() {
            errors.insert("last_name".into(), "last name is required".into());
        }
        let email = self.form.email.trim();
        if email.is_empty() {
            errors.insert("email".into(), "email is required".into());
        } else if !email_regex().is_match(email) {
            errors.insert("email".into(), "email format is invalid".into());
        }
        if self.form.admission_no.trim().is_empty() {
            errors.insert("admission_no".into(), "admission number is required".into());
        }

        if errors.is_empty() {
            self.field_errors.clear();
            Ok(())
        } else {
            self.field_errors = errors.clone();
            self.state = AttemptState::Idle;
            Err(AppError::Validation(errors))
        }
    }

    /// Wire payload built from the current form.
    #[must_use]
    pub fn build_request(&self) -> ConversionRequest {
        ConversionRequest {
            conversion_reason: self.form.conversion_reason.clone(),
            admission_no: self.form.admission_no.trim().to_owned(),
            user: ConversionUser {
                first_name: self.form.first_name.trim().to_owned(),
                last_name: self.form.last_name.trim().to_owned(),
                email: self.form.email.trim().to_owned(),
                phone: self.form.phone.clone().filter(|p| !p.is_empty()),
            },
        }
    }

    /// Validate and submit the conversion, reconciling `directory` on
    /// success: the customer leaves the unconverted partition and the
    /// returned student is prepended to the converted partition exactly
    /// once.
    ///
    /// # Errors
    ///
    /// - [`AppError::InFlight`] when an attempt is already submitting.
    /// - [`AppError::NotFound`] when no customer is selected.
    /// - [`AppError::Validation`] from the local field check.
    /// - [`AppError::Transport`] / [`AppError::Api`] from the backend;
    ///   the directory partitions are untouched on every failure path.
    pub async fn submit(&mut self, directory: &mut CustomerDirectory) -> Result<Entity> {
        if self.state == AttemptState::Submitting {
            return Err(AppError::InFlight("conversion already submitting".into()));
        }
        let Some(selected) = self.selected.clone() else {
            return Err(AppError::NotFound("no customer selected".into()));
        };

        self.validate()?;
        self.state = AttemptState::Submitting;
        let request = self.build_request();

        let client = Arc::clone(&self.client);
        let outcome = client
            .convert_customer_to_student(selected.id.clone(), request)
            .await
            .and_then(ApiEnvelope::into_data)
            .and_then(|data| {
                Entity::from_value(&data)
                    .ok_or_else(|| AppError::Api("converted student missing from response".into()))
            });

        match outcome {
            Ok(student) => {
                directory.remove_unconverted(&selected.id);
                directory.prepend_converted(student.clone());
                self.selected = None;
                self.form = StudentForm::default();
                self.state = AttemptState::Succeeded;
                self.last_failure = None;
                info!(customer = %selected.id, student = %student.id, "customer converted");
                Ok(student)
            }
            Err(err) => {
                self.state = AttemptState::Failed;
                self.last_failure = Some(err.user_message());
                warn!(customer = %selected.id, %err, "conversion failed");
                Err(err)
            }
        }
    }

    /// Start a fresh attempt after a terminal state, keeping the form
    /// so the operator can retry after a failure.
    pub fn reset(&mut self) {
        self.state = AttemptState::Idle;
        self.field_errors.clear();
    }
}
