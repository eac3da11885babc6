//! `reqwest` implementation of [`StoreApi`].

use std::sync::Arc;

use mercado_core::{CheckoutOrder, Product, Registration};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::types::{ApiMessage, ErrorBody, LoginCredentials, LoginResponse, SessionToken};
use super::{ApiError, StoreApi};
use crate::config::BackendApiConfig;

/// Client for the backend API.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: Client,
    endpoints: Endpoints,
}

struct Endpoints {
    login: String,
    signup: String,
    products: String,
    checkout: String,
}

impl Endpoints {
    fn new(base_url: &url::Url) -> Self {
        let base = base_url.as_str().trim_end_matches('/');
        Self {
            login: format!("{base}/auth/login"),
            signup: format!("{base}/auth/signup"),
            products: format!("{base}/auth/products"),
            checkout: format!("{base}/auth/checkout"),
        }
    }
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("products", &self.inner.endpoints.products)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BackendApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                endpoints: Endpoints::new(&config.base_url),
            }),
        })
    }

    fn with_bearer(request: RequestBuilder, token: Option<&SessionToken>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token.expose()),
            None => request,
        }
    }
}

impl StoreApi for BackendClient {
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn login(&self, credentials: &LoginCredentials) -> Result<SessionToken, ApiError> {
        let response = self
            .inner
            .client
            .post(&self.inner.endpoints.login)
            .json(credentials)
            .send()
            .await?;

        let body: LoginResponse = read_json(response).await?;
        // A 2xx without a usable token is treated as a rejection
        SessionToken::new(body.token).ok_or(ApiError::Rejected {
            status: reqwest::StatusCode::BAD_GATEWAY,
            message: None,
        })
    }

    #[instrument(skip(self, registration), fields(username = %registration.username))]
    async fn signup(&self, registration: &Registration) -> Result<ApiMessage, ApiError> {
        let response = self
            .inner
            .client
            .post(&self.inner.endpoints.signup)
            .json(registration)
            .send()
            .await?;

        read_message(response).await
    }

    #[instrument(skip(self, token), fields(authenticated = token.is_some()))]
    async fn products(&self, token: Option<&SessionToken>) -> Result<Vec<Product>, ApiError> {
        let request = self.inner.client.get(&self.inner.endpoints.products);
        let response = Self::with_bearer(request, token).send().await?;

        let products: Vec<Product> = read_json(response).await?;
        debug!(count = products.len(), "catalog fetched");
        Ok(products)
    }

    #[instrument(skip(self, token, order), fields(items = order.total_items))]
    async fn checkout(
        &self,
        token: &SessionToken,
        order: &CheckoutOrder,
    ) -> Result<ApiMessage, ApiError> {
        let request = self
            .inner
            .client
            .post(&self.inner.endpoints.checkout)
            .json(order);
        let response = Self::with_bearer(request, Some(token)).send().await?;

        read_message(response).await
    }
}

// =============================================================================
// Response Handling
// =============================================================================

/// Read the body, mapping non-success statuses to [`ApiError::Rejected`].
async fn read_body(response: Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = error_message(&body);
        warn!(
            status = %status,
            message = ?message,
            "Backend returned non-success status"
        );
        return Err(ApiError::Rejected { status, message });
    }

    Ok(body)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = read_body(response).await?;
    serde_json::from_str(&body).map_err(|e| {
        warn!(
            error = %e,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        ApiError::Decode(e)
    })
}

/// Like [`read_json`], but an empty body is an empty message.
async fn read_message(response: Response) -> Result<ApiMessage, ApiError> {
    let body = read_body(response).await?;
    if body.trim().is_empty() {
        return Ok(ApiMessage::default());
    }
    Ok(serde_json::from_str(&body)?)
}

/// Extract `message` from an error body, if it has a non-blank one.
pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
}
