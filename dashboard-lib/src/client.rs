//! Main DashboardClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Map;
use serde_json::Value;
use url::Url;

use crate::error::is_auth_status;
use crate::error::ApiError;
use crate::request::Headers;
use crate::request::RequestDescriptor;
use crate::request::RequestOptions;
use crate::request::SuccessPredicate;
use crate::resource::ResourceBuilder;
use crate::session::Navigator;
use crate::session::NoopNavigator;
use crate::session::Session;
use crate::session::LOGIN_ROUTE;

/// The client shared by every dashboard page.
///
/// Owns the API base URL, the injected [`Session`] and the [`Navigator`]
/// used by the session-expiry policy. Every request issued through the
/// client (directly or via a [`DataResource`](crate::resource::DataResource))
/// observes the same policy: a 401 or 403 response clears the session and
/// requests navigation to [`LOGIN_ROUTE`].
///
/// This client is cheap to clone (uses `Arc` internally).
///
/// # Example
///
/// ```ignore
/// use dashboard_lib::DashboardClient;
/// use dashboard_lib::session::{FileStore, Session};
///
/// let session = Session::load(FileStore::new("/var/lib/dashboard/session.json")).await?;
/// let client = DashboardClient::builder()
///     .base_url("https://api.example.com")
///     .session(session)
///     .build()?;
///
/// let products = client.resource("/api/v1/products").build();
/// products.revalidate().await?;
/// ```
#[derive(Clone)]
pub struct DashboardClient {
    inner: Arc<DashboardClientInner>,
}

struct DashboardClientInner {
    base_url: Url,
    session: Session,
    navigator: Arc<dyn Navigator>,
    http_client: Client,
    default_headers: Headers,
    timeout: Option<Duration>,
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone)]
pub(crate) struct Exchange {
    pub status: u16,
    pub body: Vec<u8>,
}

impl DashboardClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> DashboardClientBuilder<Missing, Missing> {
        DashboardClientBuilder::new()
    }

    /// Starts building a [`DataResource`](crate::resource::DataResource) for `url`.
    pub fn resource(&self, url: impl Into<String>) -> ResourceBuilder {
        ResourceBuilder::new(self.clone(), url)
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Returns the injected session.
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Builds the descriptor for `url` with the current session token.
    pub async fn describe(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<RequestDescriptor, ApiError> {
        let options = RequestOptions::new()
            .headers(&self.inner.default_headers)
            .merge(&options);
        let token = self.inner.session.token().await;
        RequestDescriptor::build(&self.inner.base_url, url, options, token.as_deref())
    }

    /// Issues one request and interprets the response.
    ///
    /// - `success` accepting the status: resolves to the parsed JSON body;
    ///   204, an empty body or an unparseable body resolve to `{}`.
    /// - 401/403: tears the session down and returns [`ApiError::Unauthorized`].
    /// - Anything else: [`ApiError::Http`] carrying the body text.
    pub async fn execute(
        &self,
        url: &str,
        options: RequestOptions,
        success: &SuccessPredicate,
    ) -> Result<Value, ApiError> {
        let descriptor = self.describe(url, options).await?;
        let exchange = self.send(&descriptor).await?;
        self.interpret(&descriptor, exchange, success).await
    }

    pub(crate) async fn send(&self, descriptor: &RequestDescriptor) -> Result<Exchange, ApiError> {
        log::debug!("{} {}", descriptor.method(), descriptor.url());

        let request = descriptor.to_reqwest(&self.inner.http_client, self.inner.timeout)?;
        let response = request.send().await.map_err(|e| {
            log::warn!("{} {} failed: {}", descriptor.method(), descriptor.url(), e);
            ApiError::Network(e)
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        log::debug!(
            "{} {} -> {} ({} bytes)",
            descriptor.method(),
            descriptor.url(),
            status,
            body.len()
        );
        Ok(Exchange { status, body })
    }

    pub(crate) async fn interpret(
        &self,
        descriptor: &RequestDescriptor,
        exchange: Exchange,
        success: &SuccessPredicate,
    ) -> Result<Value, ApiError> {
        let Exchange { status, body } = exchange;

        if is_auth_status(status) {
            self.expire_session().await;
            return Err(ApiError::Unauthorized { status });
        }

        if !success.accepts(status) {
            let text = String::from_utf8_lossy(&body).into_owned();
            return Err(ApiError::http(status, text, descriptor.url().as_str()));
        }

        if status == 204 || body.is_empty() {
            return Ok(empty_object());
        }

        match serde_json::from_slice(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                log::warn!(
                    "Malformed JSON from {} ({}), substituting empty object",
                    descriptor.url(),
                    e
                );
                Ok(empty_object())
            }
        }
    }

    /// Session-expiry policy: clear the session, then ask for the login route.
    async fn expire_session(&self) {
        log::info!("Credentials rejected, ending session");
        if let Err(e) = self.inner.session.clear().await {
            log::error!("Failed to clear persisted session: {}", e);
        }
        self.inner.navigator.navigate(LOGIN_ROUTE);
    }
}

/// The value successful empty responses resolve to.
pub fn empty_object() -> Value {
    Value::Object(Map::new())
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`DashboardClient`].
///
/// Uses the typestate pattern to ensure required fields are set at compile time.
///
/// # Required Fields
///
/// - `base_url` - The API base URL
/// - `session` - The [`Session`] whose token authorizes requests
pub struct DashboardClientBuilder<U, S> {
    base_url: U,
    session: S,
    navigator: Option<Arc<dyn Navigator>>,
    default_headers: Headers,
    timeout: Option<Duration>,
}

impl DashboardClientBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: Missing,
            session: Missing,
            navigator: None,
            default_headers: Headers::new(),
            timeout: None,
        }
    }
}

impl Default for DashboardClientBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> DashboardClientBuilder<Missing, S> {
    /// Sets the API base URL that relative resource paths resolve against.
    pub fn base_url(self, url: impl Into<String>) -> DashboardClientBuilder<Set<String>, S> {
        DashboardClientBuilder {
            base_url: Set(url.into()),
            session: self.session,
            navigator: self.navigator,
            default_headers: self.default_headers,
            timeout: self.timeout,
        }
    }
}

impl<U> DashboardClientBuilder<U, Missing> {
    /// Sets the session whose token authorizes requests.
    pub fn session(self, session: Session) -> DashboardClientBuilder<U, Set<Session>> {
        DashboardClientBuilder {
            base_url: self.base_url,
            session: Set(session),
            navigator: self.navigator,
            default_headers: self.default_headers,
            timeout: self.timeout,
        }
    }
}

impl<U, S> DashboardClientBuilder<U, S> {
    /// Sets the navigator notified when the session expires.
    ///
    /// Defaults to [`NoopNavigator`].
    pub fn navigator(mut self, navigator: impl Navigator + 'static) -> Self {
        self.navigator = Some(Arc::new(navigator));
        self
    }

    /// Adds a header sent with every request.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// Sets the request timeout. Requests have no timeout by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl DashboardClientBuilder<Set<String>, Set<Session>> {
    /// Builds the [`DashboardClient`].
    ///
    /// Fails if the base URL does not parse or the HTTP client cannot be built.
    pub fn build(self) -> Result<DashboardClient, ApiError> {
        let base_url = Url::parse(&self.base_url.0)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.base_url.0, e)))?;

        let http_client = Client::builder().build()?;

        Ok(DashboardClient {
            inner: Arc::new(DashboardClientInner {
                base_url,
                session: self.session.0,
                navigator: self.navigator.unwrap_or_else(|| Arc::new(NoopNavigator)),
                http_client,
                default_headers: self.default_headers,
                timeout: self.timeout,
            }),
        })
    }
}
