//! Remote resource lifecycle.
//!
//! A [`DataResource`] tracks one logical remote resource for one page: the
//! last successful payload, whether a request is in flight, and the last
//! error. All requests go through [`DashboardClient::execute`], so the
//! session-expiry policy is identical for every page.

use std::fmt;
use std::sync::Arc;
use std::sync::RwLock;

use serde_json::Value;

use crate::client::DashboardClient;
use crate::error::ApiError;
use crate::error::Error;
use crate::request::Attempt;
use crate::request::Body;
use crate::request::Headers;
use crate::request::Method;
use crate::request::RequestOptions;
use crate::request::SuccessPredicate;

// =============================================================================
// ErrorInfo
// =============================================================================

/// Category of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response was obtained.
    Network,
    /// Non-2xx response.
    Http,
    /// 401/403; the session has been ended.
    Unauthorized,
    /// The request could not be built.
    InvalidRequest,
}

/// Displayable description of the last failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl ErrorInfo {
    /// Returns `true` if a manual retry makes sense.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Network | ErrorKind::Http)
    }
}

impl From<&ApiError> for ErrorInfo {
    fn from(err: &ApiError) -> Self {
        let kind = match err {
            ApiError::Http { .. } => ErrorKind::Http,
            ApiError::Unauthorized { .. } => ErrorKind::Unauthorized,
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::InvalidUrl(_) | ApiError::Serialization(_) | ApiError::NoAttempts => {
                ErrorKind::InvalidRequest
            }
        };
        Self {
            kind,
            status: err.status_code(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// =============================================================================
// ResourceState
// =============================================================================

/// Snapshot of a resource.
///
/// `loading` is set when a request starts and cleared when it completes.
/// `error` is cleared at the start of every request. `data` only changes on
/// a successful response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceState<T = Value> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<ErrorInfo>,
}

impl<T> ResourceState<T> {
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_ready(&self) -> bool {
        !self.loading && self.error.is_none() && self.data.is_some()
    }
}

// =============================================================================
// DataResource
// =============================================================================

/// Builder for a [`DataResource`].
pub struct ResourceBuilder {
    client: DashboardClient,
    base_url: String,
    options: RequestOptions,
}

impl ResourceBuilder {
    pub(crate) fn new(client: DashboardClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            options: RequestOptions::default(),
        }
    }

    /// Sets the base options merged under every call.
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> DataResource {
        DataResource {
            inner: Arc::new(ResourceInner {
                client: self.client,
                base_url: RwLock::new(self.base_url),
                options: self.options,
                state: RwLock::new(ResourceState::default()),
            }),
        }
    }

    /// Builds the resource and issues the initial GET against its base URL.
    ///
    /// The outcome is recorded in the resource state: inspect
    /// [`DataResource::data`] or [`DataResource::error`] afterwards.
    pub async fn build_and_fetch(self) -> DataResource {
        let resource = self.build();
        if let Err(e) = resource.revalidate().await {
            log::debug!("Initial fetch of {} failed: {}", resource.base_url(), e);
        }
        resource
    }
}

/// One remote resource owned by a page.
///
/// Cheap to clone; clones share state. Overlapping requests are not
/// de-duplicated: whichever completes last determines `data`, and each
/// completion clears `loading`.
///
/// # Example
///
/// ```ignore
/// let products = client
///     .resource("/api/v1/products?page=1&limit=10")
///     .build_and_fetch()
///     .await;
///
/// if let Some(data) = products.data() {
///     println!("{}", data);
/// }
///
/// products.post_data("/api/v1/products", json!({"title": "Chair"}), &Headers::new()).await?;
/// products.revalidate().await?;
/// ```
#[derive(Clone)]
pub struct DataResource {
    inner: Arc<ResourceInner>,
}

struct ResourceInner {
    client: DashboardClient,
    base_url: RwLock<String>,
    options: RequestOptions,
    state: RwLock<ResourceState>,
}

impl DataResource {
    /// Issues a request for `url` with the base options merged with `overrides`.
    ///
    /// On success the payload replaces `data` and is returned. On failure
    /// `error` is set, `data` is left untouched and the error is returned.
    pub async fn initiate(&self, url: &str, overrides: RequestOptions) -> Result<Value, Error> {
        self.begin();
        let options = self.inner.options.merge(&overrides);
        let result = self
            .inner
            .client
            .execute(url, options, &SuccessPredicate::AnySuccess)
            .await;
        self.finish(result)
    }

    /// Re-issues a GET against the base URL.
    pub async fn revalidate(&self) -> Result<Value, Error> {
        let url = self.base_url();
        self.initiate(&url, RequestOptions::new().method(Method::Get)).await
    }

    /// Sends `body` with POST.
    ///
    /// JSON bodies are sent as `application/json`; multipart bodies carry the
    /// transport's own content type.
    pub async fn post_data(
        &self,
        url: &str,
        body: impl Into<Body>,
        headers: &Headers,
    ) -> Result<Value, Error> {
        self.send_body(Method::Post, url, body.into(), headers).await
    }

    /// Sends `body` with PUT.
    pub async fn put_data(
        &self,
        url: &str,
        body: impl Into<Body>,
        headers: &Headers,
    ) -> Result<Value, Error> {
        self.send_body(Method::Put, url, body.into(), headers).await
    }

    /// Sends `body` with PATCH.
    pub async fn patch_data(
        &self,
        url: &str,
        body: impl Into<Body>,
        headers: &Headers,
    ) -> Result<Value, Error> {
        self.send_body(Method::Patch, url, body.into(), headers).await
    }

    /// Issues a DELETE.
    pub async fn delete_data(&self, url: &str, headers: &Headers) -> Result<Value, Error> {
        let overrides = RequestOptions::new().method(Method::Delete).headers(headers);
        self.initiate(url, overrides).await
    }

    async fn send_body(
        &self,
        method: Method,
        url: &str,
        body: Body,
        headers: &Headers,
    ) -> Result<Value, Error> {
        let overrides = RequestOptions::new()
            .method(method)
            .headers(headers)
            .body(body);
        self.initiate(url, overrides).await
    }

    /// Tries each attempt in order against `url`, stopping at the first one
    /// whose predicate accepts the response.
    ///
    /// A 401/403 ends the chain immediately. If every attempt fails, the last
    /// failure is reported.
    pub async fn attempt_chain(
        &self,
        url: &str,
        body: Option<Body>,
        attempts: &[Attempt],
    ) -> Result<Value, Error> {
        self.begin();
        if attempts.is_empty() {
            return self.finish(Err(ApiError::NoAttempts));
        }

        let mut last = Err(ApiError::NoAttempts);
        for attempt in attempts {
            let mut overrides = RequestOptions::new().method(attempt.method);
            overrides.body = body.clone();
            let options = self.inner.options.merge(&overrides);

            last = self
                .inner
                .client
                .execute(url, options, &attempt.success)
                .await;
            match &last {
                Ok(_) => break,
                Err(e) if e.is_auth_failure() => break,
                Err(e) => log::debug!("{} {} rejected ({}), trying next", attempt.method, url, e),
            }
        }
        self.finish(last)
    }

    /// Replaces the base URL used by [`revalidate`](Self::revalidate).
    pub fn set_base_url(&self, url: impl Into<String>) {
        if let Ok(mut guard) = self.inner.base_url.write() {
            *guard = url.into();
        }
    }

    pub fn base_url(&self) -> String {
        self.inner
            .base_url
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Get a clone of the current state
    pub fn state(&self) -> ResourceState {
        self.inner
            .state
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn data(&self) -> Option<Value> {
        self.state().data
    }

    pub fn error(&self) -> Option<ErrorInfo> {
        self.state().error
    }

    pub fn is_loading(&self) -> bool {
        self.inner
            .state
            .read()
            .map(|guard| guard.loading)
            .unwrap_or(false)
    }

    fn begin(&self) {
        if let Ok(mut guard) = self.inner.state.write() {
            guard.loading = true;
            guard.error = None;
        }
    }

    fn finish(&self, result: Result<Value, ApiError>) -> Result<Value, Error> {
        if let Ok(mut guard) = self.inner.state.write() {
            guard.loading = false;
            match &result {
                Ok(value) => guard.data = Some(value.clone()),
                Err(e) => guard.error = Some(ErrorInfo::from(e)),
            }
        }
        result.map_err(Error::from)
    }
}

impl fmt::Debug for DataResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataResource")
            .field("base_url", &self.base_url())
            .field("state", &self.state())
            .finish()
    }
}
