//! `reqwest`-backed implementation of the backend collaborator.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use tracing::debug;

use crate::client::{ApiEnvelope, BackendClient, CustomerQuery, CustomerUpdate, NewCustomer};
use crate::config::BackendConfig;
use crate::models::conversion::ConversionRequest;
use crate::models::entity::EntityId;
use crate::{AppError, Result};

/// HTTP client for the school CRM REST API.
///
/// Timeouts live entirely in the underlying `reqwest` client; this layer
/// adds no retry or backoff. Retries are manual, operator-driven.
pub struct HttpBackendClient {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpBackendClient {
    /// Build a client from backend configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Transport`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_token: if config.api_token.is_empty() {
                None
            } else {
                Some(config.api_token.clone())
            },
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let mut builder = self.http.request(method, url);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> RequestBuilder {
        self.request(Method::POST, path).json(body)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<ApiEnvelope> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(%status, "backend response received");

        // Error statuses usually still carry an envelope with a message;
        // fall back to the bare status when the body is not one.
        match response.json::<ApiEnvelope>().await {
            Ok(envelope) => Ok(envelope),
            Err(err) if status.is_success() => {
                Err(AppError::Transport(format!("invalid response body: {err}")))
            }
            Err(_) => Err(transport_for_status(status)),
        }
    }
}

fn transport_for_status(status: StatusCode) -> AppError {
    AppError::Transport(format!("backend returned {status}"))
}

impl BackendClient for HttpBackendClient {
    fn get_customers(
        &self,
        query: CustomerQuery,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Box::pin(async move {
            self.send(self.get("/customers").query(&query.to_params()))
                .await
        })
    }

    fn get_customer(
        &self,
        id: EntityId,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Box::pin(async move { self.send(self.get(&format!("/customers/{id}"))).await })
    }

    fn create_customer(
        &self,
        payload: NewCustomer,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Box::pin(async move { self.send(self.post_json("/customers", &payload)).await })
    }

    fn update_customer(
        &self,
        id: EntityId,
        update: CustomerUpdate,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Box::pin(async move {
            self.send(
                self.request(Method::PUT, &format!("/customers/{id}"))
                    .json(&update),
            )
            .await
        })
    }

    fn delete_customer(
        &self,
        id: EntityId,
        reason: String,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Box::pin(async move {
            self.send(
                self.request(Method::DELETE, &format!("/customers/{id}"))
                    .json(&serde_json::json!({ "deletionReason": reason })),
            )
            .await
        })
    }

    fn get_unconverted_customers(
        &self,
        page: u32,
        limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Box::pin(async move {
            self.send(
                self.get("/customers/unconverted")
                    .query(&[("page", page), ("limit", limit)]),
            )
            .await
        })
    }

    fn get_converted_students(
        &self,
        page: u32,
        limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Box::pin(async move {
            self.send(
                self.get("/students/converted")
                    .query(&[("page", page), ("limit", limit)]),
            )
            .await
        })
    }

    fn convert_customer_to_student(
        &self,
        id: EntityId,
        request: ConversionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Box::pin(async move {
            self.send(self.post_json(&format!("/customers/{id}/convert-to-student"), &request))
                .await
        })
    }

    fn get_conversion_analytics(
        &self,
        period: String,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Box::pin(async move {
            self.send(
                self.get("/customers/conversion-analytics")
                    .query(&[("period", period)]),
            )
            .await
        })
    }

    fn get_conversion_history(
        &self,
        page: u32,
        limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Box::pin(async move {
            self.send(
                self.get("/customers/conversion-history")
                    .query(&[("page", page), ("limit", limit)]),
            )
            .await
        })
    }

    fn get_conversion_rates(
        &self,
        period: String,
    ) -> Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + '_>> {
        Box::pin(async move {
            self.send(
                self.get("/customers/conversion-rates")
                    .query(&[("period", period)]),
            )
            .await
        })
    }
}
