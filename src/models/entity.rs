//! Unified customer/student entity model.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Contact details attached to an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Contact {
    /// Email address, when known.
    pub email: Option<String>,
    /// Phone number, when known.
    pub phone: Option<String>,
}

/// Record identifier as issued by the backend: either a string or a number.
///
/// Identifiers are stable across refetches and unique within a normalized
/// collection, but the backend is not consistent about their JSON type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// String identifier (UUID or similar).
    Text(String),
    /// Numeric identifier.
    Number(i64),
}

impl EntityId {
    /// Read an identifier out of a raw JSON value.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self::Text(s.clone())),
            Value::Number(n) => n.as_i64().map(Self::Number),
            _ => None,
        }
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// Which partition of the CRM a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A lead/visitor record not yet enrolled.
    Customer,
    /// An enrolled record, possibly originating from a conversion.
    Student,
}

/// A customer or student record in the unified client-side shape.
///
/// Upstream rows are inconsistent: customer rows arrive flat (`name`,
/// `email`, `phone` at the top level) while student rows nest the person
/// under `user` with `firstName`/`lastName` and carry an `admissionNo`.
/// [`Entity::from_value`] folds both layouts into this one shape so no
/// caller has to optional-chain through either nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique record identifier.
    pub id: EntityId,
    /// Record partition tag.
    pub kind: EntityKind,
    /// Presentable name, derived from `name` or `firstName` + `lastName`.
    pub display_name: String,
    /// Email/phone contact details.
    pub contact: Contact,
    /// `individual` / `corporate`; open set, unknown values preserved.
    pub customer_type: Option<String>,
    /// `low` / `medium` / `high` / `urgent`; open set.
    pub priority: Option<String>,
    /// `active` / `inactive`; open set.
    pub status: Option<String>,
    /// Acquisition source tag; open set.
    pub source: Option<String>,
    /// True once a customer has become a student. Conversion actions are
    /// disabled for converted entities.
    pub converted: bool,
    /// Admission number for enrolled students.
    pub admission_no: Option<String>,
    /// Creation timestamp as reported upstream (ISO-8601).
    pub created_at: Option<String>,
    /// Last-update timestamp as reported upstream (ISO-8601).
    pub updated_at: Option<String>,
}

impl Entity {
    /// Adapt one raw upstream row into the unified shape.
    ///
    /// Returns `None` when the row carries no usable `id`; such rows
    /// cannot participate in selection, conversion, or de-duplication.
    #[must_use]
    pub fn from_value(raw: &Value) -> Option<Self> {
        let id = EntityId::from_json(raw.get("id")?)?;
        let user = raw.get("user").filter(|u| u.is_object());

        let nested_role = user
            .and_then(|u| u.get("role"))
            .and_then(Value::as_str)
            .map(str::to_ascii_uppercase);
        let kind = if nested_role.as_deref() == Some("STUDENT")
            || str_field(raw, "admissionNo").is_some()
        {
            EntityKind::Student
        } else {
            EntityKind::Customer
        };

        let display_name = display_name(raw, user);
        let contact = Contact {
            email: str_field(raw, "email").or_else(|| user.and_then(|u| str_field(u, "email"))),
            phone: str_field(raw, "phone").or_else(|| user.and_then(|u| str_field(u, "phone"))),
        };
        // Nested user status arrives upper-cased (`ACTIVE`); flat customer
        // status is already lower-case. Normalize to the flat convention.
        let status = str_field(raw, "status").or_else(|| {
            user.and_then(|u| str_field(u, "status"))
                .map(|s| s.to_ascii_lowercase())
        });

        Some(Self {
            id,
            kind,
            display_name,
            contact,
            customer_type: str_field(raw, "type"),
            priority: str_field(raw, "priority"),
            status,
            source: str_field(raw, "source"),
            converted: raw
                .get("convertedToStudent")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            admission_no: str_field(raw, "admissionNo"),
            created_at: str_field(raw, "createdAt"),
            updated_at: str_field(raw, "updatedAt"),
        })
    }

    /// Adapt a normalized collection, dropping rows without an `id`.
    #[must_use]
    pub fn from_values(rows: &[Value]) -> Vec<Self> {
        rows.iter().filter_map(Self::from_value).collect()
    }
}

/// Derive a presentable name from whichever fields the row carries.
fn display_name(raw: &Value, user: Option<&Value>) -> String {
    if let Some(name) = str_field(raw, "name") {
        return name;
    }
    let source = user.unwrap_or(raw);
    let first = str_field(source, "firstName").unwrap_or_default();
    let last = str_field(source, "lastName").unwrap_or_default();
    format!("{first} {last}").trim().to_owned()
}

/// Non-empty trimmed string field, or `None`.
fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
