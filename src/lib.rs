#![forbid(unsafe_code)]

//! `enrolldesk` — client-side data layer for a school CRM.
//!
//! Wraps an inconsistent REST backend behind a typed core: response
//! normalization, pagination estimation, customer/student collections,
//! the customer-to-student conversion flow, dashboard breakdowns, and
//! the front-desk visitor token counter.

pub mod analytics;
pub mod client;
pub mod config;
pub mod convert;
pub mod counter;
pub mod directory;
pub mod errors;
pub mod models;
pub mod normalize;
pub mod pagination;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
