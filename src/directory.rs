//! Customer/student collection service.
//!
//! The stateful core behind the management screens: fetches pages from
//! the backend, runs them through the normalizer and the pagination
//! estimator, adapts rows into the unified [`Entity`] shape, and owns the
//! unconverted/converted partitions. Errors are recorded as
//! operator-facing `last_error` state (the screens render it as a toast)
//! and still propagate to the caller; collections are never mutated on a
//! failed call.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::client::{ApiEnvelope, BackendClient, CustomerQuery, CustomerUpdate, NewCustomer};
use crate::models::conversion::{ConversionAnalytics, ConversionRates, ConversionRecord};
use crate::models::entity::{Entity, EntityId};
use crate::models::page::{PageMeta, PageResult};
use crate::normalize::{normalize, DEFAULT_COLLECTION_KEYS};
use crate::pagination::{estimate, ServerHints};
use crate::{AppError, Result};

/// Candidate keys for conversion-history responses.
const HISTORY_KEYS: [&str; 2] = ["conversions", "data"];

/// Whether a page load replaces the collection or appends to it
/// (infinite-scroll "load more").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Replace the collection with the fetched page.
    Replace,
    /// Append the fetched page, superseding rows with repeated ids.
    Append,
}

/// Stateful directory of customer-derived entities.
pub struct CustomerDirectory {
    client: Arc<dyn BackendClient>,
    page_size: u32,
    unconverted: Vec<Entity>,
    converted: Vec<Entity>,
    unconverted_meta: PageMeta,
    converted_meta: PageMeta,
    last_error: Option<String>,
}

impl CustomerDirectory {
    /// Directory over `client` with a default page size.
    #[must_use]
    pub fn new(client: Arc<dyn BackendClient>, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        Self {
            client,
            page_size,
            unconverted: Vec::new(),
            converted: Vec::new(),
            unconverted_meta: PageMeta::empty(page_size),
            converted_meta: PageMeta::empty(page_size),
            last_error: None,
        }
    }

    /// Customers not yet converted.
    #[must_use]
    pub fn unconverted(&self) -> &[Entity] {
        &self.unconverted
    }

    /// Students originating from conversions.
    #[must_use]
    pub fn converted(&self) -> &[Entity] {
        &self.converted
    }

    /// Pagination state of the unconverted partition.
    #[must_use]
    pub fn unconverted_meta(&self) -> PageMeta {
        self.unconverted_meta
    }

    /// Pagination state of the converted partition.
    #[must_use]
    pub fn converted_meta(&self) -> PageMeta {
        self.converted_meta
    }

    /// Operator-facing message of the most recent failure, if the last
    /// call failed.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Load a page of unconverted customers into the directory.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Transport`] on network failure or
    /// [`AppError::Api`] when the backend reports `success: false`; the
    /// collection is untouched in both cases.
    pub async fn load_unconverted(&mut self, page: u32, mode: RefreshMode) -> Result<PageMeta> {
        let client = Arc::clone(&self.client);
        let size = self.page_size;
        let outcome = client
            .get_unconverted_customers(page.max(1), size)
            .await
            .and_then(|envelope| entity_page(envelope, page, size));
        let result = self.note(outcome)?;

        apply(&mut self.unconverted, result.items, mode);
        self.unconverted_meta = result.meta;
        info!(
            page = result.meta.page,
            count = self.unconverted.len(),
            "unconverted customers loaded"
        );
        Ok(result.meta)
    }

    /// Load a page of converted students into the directory.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::load_unconverted`].
    pub async fn load_converted(&mut self, page: u32, mode: RefreshMode) -> Result<PageMeta> {
        let client = Arc::clone(&self.client);
        let size = self.page_size;
        let outcome = client
            .get_converted_students(page.max(1), size)
            .await
            .and_then(|envelope| entity_page(envelope, page, size));
        let result = self.note(outcome)?;

        apply(&mut self.converted, result.items, mode);
        self.converted_meta = result.meta;
        info!(
            page = result.meta.page,
            count = self.converted.len(),
            "converted students loaded"
        );
        Ok(result.meta)
    }

    /// Fetch a filtered customer page without touching directory state.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::load_unconverted`].
    pub async fn fetch_customers(&mut self, query: CustomerQuery) -> Result<PageResult<Entity>> {
        let client = Arc::clone(&self.client);
        let page = query.page;
        let size = query.limit.max(1);
        let outcome = client
            .get_customers(query)
            .await
            .and_then(|envelope| entity_page(envelope, page, size));
        self.note(outcome)
    }

    /// Fetch a single customer by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the backend reports success
    /// but the payload is not an entity row, plus the usual transport and
    /// application failures.
    pub async fn fetch_customer(&mut self, id: EntityId) -> Result<Entity> {
        let client = Arc::clone(&self.client);
        let outcome = client
            .get_customer(id.clone())
            .await
            .and_then(ApiEnvelope::into_data)
            .and_then(|data| {
                Entity::from_value(&data)
                    .ok_or_else(|| AppError::NotFound(format!("customer {id} not in response")))
            });
        self.note(outcome)
    }

    /// Create a customer record.
    ///
    /// The directory is not mutated; screens refetch the page they are
    /// on so server-side ordering and filters stay authoritative.
    ///
    /// # Errors
    ///
    /// Transport/application failures, or [`AppError::Api`] when the
    /// success payload carries no entity row.
    pub async fn create_customer(&mut self, payload: NewCustomer) -> Result<Entity> {
        let client = Arc::clone(&self.client);
        let outcome = client
            .create_customer(payload)
            .await
            .and_then(ApiEnvelope::into_data)
            .and_then(|data| {
                Entity::from_value(&data)
                    .ok_or_else(|| AppError::Api("created customer missing from response".into()))
            });
        self.note(outcome)
    }

    /// Apply a partial update, superseding the local row on success.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::create_customer`].
    pub async fn update_customer(
        &mut self,
        id: EntityId,
        update: CustomerUpdate,
    ) -> Result<Entity> {
        let client = Arc::clone(&self.client);
        let outcome = client
            .update_customer(id, update)
            .await
            .and_then(ApiEnvelope::into_data)
            .and_then(|data| {
                Entity::from_value(&data)
                    .ok_or_else(|| AppError::Api("updated customer missing from response".into()))
            });
        let entity = self.note(outcome)?;

        supersede(&mut self.unconverted, &entity);
        supersede(&mut self.converted, &entity);
        Ok(entity)
    }

    /// Delete a customer, recording the reason, and drop the local row.
    ///
    /// # Errors
    ///
    /// Transport/application failures; the local row stays on failure.
    pub async fn delete_customer(&mut self, id: EntityId, reason: String) -> Result<()> {
        let client = Arc::clone(&self.client);
        let outcome = client
            .delete_customer(id.clone(), reason)
            .await
            .and_then(ApiEnvelope::into_data)
            .map(|_| ());
        self.note(outcome)?;

        self.unconverted.retain(|e| e.id != id);
        self.converted.retain(|e| e.id != id);
        Ok(())
    }

    /// Conversion analytics for a reporting period.
    ///
    /// # Errors
    ///
    /// Transport/application failures, or [`AppError::Api`] when the
    /// payload does not decode as analytics.
    pub async fn conversion_analytics(&mut self, period: &str) -> Result<ConversionAnalytics> {
        let client = Arc::clone(&self.client);
        let outcome = client
            .get_conversion_analytics(period.to_owned())
            .await
            .and_then(ApiEnvelope::into_data)
            .and_then(|data| {
                serde_json::from_value(data)
                    .map_err(|err| AppError::Api(format!("malformed analytics payload: {err}")))
            });
        self.note(outcome)
    }

    /// Conversion rates per period granularity.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::conversion_analytics`].
    pub async fn conversion_rates(&mut self, period: &str) -> Result<ConversionRates> {
        let client = Arc::clone(&self.client);
        let outcome = client
            .get_conversion_rates(period.to_owned())
            .await
            .and_then(ApiEnvelope::into_data)
            .and_then(|data| {
                serde_json::from_value(data)
                    .map_err(|err| AppError::Api(format!("malformed rates payload: {err}")))
            });
        self.note(outcome)
    }

    /// Page through historical conversion records.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::load_unconverted`].
    pub async fn conversion_history(&mut self, page: u32) -> Result<PageResult<ConversionRecord>> {
        let client = Arc::clone(&self.client);
        let size = self.page_size;
        let outcome = client
            .get_conversion_history(page.max(1), size)
            .await
            .and_then(|envelope| record_page(envelope, page, size));
        self.note(outcome)
    }

    /// Remove and return an unconverted entity by id.
    ///
    /// Used by the conversion orchestrator after the backend confirms a
    /// conversion; never called speculatively.
    pub fn remove_unconverted(&mut self, id: &EntityId) -> Option<Entity> {
        let pos = self.unconverted.iter().position(|e| &e.id == id)?;
        Some(self.unconverted.remove(pos))
    }

    /// Prepend a freshly converted student, superseding any row that
    /// already carries its id so the entity appears exactly once.
    pub fn prepend_converted(&mut self, entity: Entity) {
        self.converted.retain(|e| e.id != entity.id);
        self.converted.insert(0, entity);
    }

    /// Record the outcome of a backend call as operator-facing state.
    fn note<T>(&mut self, outcome: Result<T>) -> Result<T> {
        match &outcome {
            Ok(_) => self.last_error = None,
            Err(err) => {
                debug!(%err, "directory call failed");
                self.last_error = Some(err.user_message());
            }
        }
        outcome
    }
}

/// Decode one entity page out of an envelope.
fn entity_page(envelope: ApiEnvelope, page: u32, page_size: u32) -> Result<PageResult<Entity>> {
    let envelope_hints = envelope
        .meta
        .as_ref()
        .map(ServerHints::from_response)
        .unwrap_or_default();
    let data = envelope.into_data()?;
    let hints = ServerHints::from_response(&data).or(envelope_hints);

    let rows = normalize(&data, &DEFAULT_COLLECTION_KEYS);
    let mut items = Entity::from_values(&rows);
    items.truncate(usize::try_from(page_size.max(1)).unwrap_or(usize::MAX));

    let meta = estimate(items.len(), page, page_size, hints);
    Ok(PageResult { items, meta })
}

/// Decode one conversion-history page out of an envelope.
fn record_page(
    envelope: ApiEnvelope,
    page: u32,
    page_size: u32,
) -> Result<PageResult<ConversionRecord>> {
    let envelope_hints = envelope
        .meta
        .as_ref()
        .map(ServerHints::from_response)
        .unwrap_or_default();
    let data = envelope.into_data()?;
    let hints = ServerHints::from_response(&data).or(envelope_hints);

    let rows = normalize(&data, &HISTORY_KEYS);
    let mut items: Vec<ConversionRecord> = rows
        .into_iter()
        .filter_map(|row: Value| serde_json::from_value(row).ok())
        .collect();
    items.truncate(usize::try_from(page_size.max(1)).unwrap_or(usize::MAX));

    let meta = estimate(items.len(), page, page_size, hints);
    Ok(PageResult { items, meta })
}

/// Apply a fetched page to a collection per the refresh mode.
fn apply(collection: &mut Vec<Entity>, incoming: Vec<Entity>, mode: RefreshMode) {
    match mode {
        RefreshMode::Replace => *collection = incoming,
        RefreshMode::Append => {
            for entity in incoming {
                supersede_or_push(collection, entity);
            }
        }
    }
}

/// Replace the row carrying `entity.id` in place, if present.
fn supersede(collection: &mut [Entity], entity: &Entity) {
    if let Some(existing) = collection.iter_mut().find(|e| e.id == entity.id) {
        *existing = entity.clone();
    }
}

fn supersede_or_push(collection: &mut Vec<Entity>, entity: Entity) {
    match collection.iter_mut().find(|e| e.id == entity.id) {
        Some(existing) => *existing = entity,
        None => collection.push(entity),
    }
}
