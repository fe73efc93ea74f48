//! Request descriptors
//!
//! A [`RequestDescriptor`] is the immutable method/URL/headers/body tuple for
//! one remote call. Descriptors are built from a resource's base
//! [`RequestOptions`] merged with per-call overrides, and always carry the
//! session's bearer token when one is present.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::ApiError;

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

// =============================================================================
// Method
// =============================================================================

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Returns the method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Headers
// =============================================================================

/// Ordered header list with case-insensitive names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    /// Creates an empty header list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a header, replacing any existing header with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some(entry) => *entry = (name, value),
            None => self.0.push((name, value)),
        }
    }

    /// Returns the value of a header.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if the header is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes a header, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.0.iter().position(|(n, _)| n.eq_ignore_ascii_case(name))?;
        Some(self.0.remove(pos).1)
    }

    /// Inserts every header from `other`, replacing same-named entries.
    pub fn extend(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

// =============================================================================
// Body
// =============================================================================

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// JSON payload, sent as `application/json`.
    Json(Value),
    /// Multipart form payload (file uploads). The transport writes its own
    /// `Content-Type` with the boundary.
    Multipart(FormPayload),
}

impl Body {
    /// Serializes `value` into a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(Body::Json)
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }

    /// Returns `true` for multipart payloads.
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<FormPayload> for Body {
    fn from(form: FormPayload) -> Self {
        Body::Multipart(form)
    }
}

/// One part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

/// Ordered multipart form payload.
///
/// # Example
///
/// ```
/// use dashboard_lib::request::FormPayload;
///
/// let form = FormPayload::new()
///     .text("title", "Chair")
///     .file("images", "chair.png", "image/png", vec![0x89, 0x50]);
/// assert_eq!(form.parts().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    parts: Vec<FormPart>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Adds a file part.
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub(crate) fn to_form(&self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for part in &self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                FormPart::File {
                    name,
                    file_name,
                    mime,
                    bytes,
                } => {
                    let file = reqwest::multipart::Part::bytes(bytes.clone())
                        .file_name(file_name.clone())
                        .mime_str(mime)
                        .map_err(|e| ApiError::Serialization(e.to_string()))?;
                    form.part(name.clone(), file)
                }
            };
        }
        Ok(form)
    }
}

// =============================================================================
// RequestOptions
// =============================================================================

/// Partial request options that are merged into a [`RequestDescriptor`].
///
/// A resource holds base options; each call may pass overrides. Override
/// values win: the method and body replace the base ones when set, headers
/// replace same-named base headers, and query pairs replace same-keyed base
/// pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Option<Method>,
    pub headers: Headers,
    pub body: Option<Body>,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn headers(mut self, headers: &Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a query parameter, replacing an existing one with the same key.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        set_pair(&mut self.query, key.into(), value.to_string());
        self
    }

    /// Merges `overrides` on top of these options.
    pub fn merge(&self, overrides: &RequestOptions) -> RequestOptions {
        let mut merged = self.clone();
        if overrides.method.is_some() {
            merged.method = overrides.method;
        }
        merged.headers.extend(&overrides.headers);
        if overrides.body.is_some() {
            merged.body = overrides.body.clone();
        }
        for (key, value) in &overrides.query {
            set_pair(&mut merged.query, key.clone(), value.clone());
        }
        merged
    }
}

fn set_pair(pairs: &mut Vec<(String, String)>, key: String, value: String) {
    match pairs.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => pairs.push((key, value)),
    }
}

// =============================================================================
// RequestDescriptor
// =============================================================================

/// Immutable description of one remote call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    url: Url,
    method: Method,
    headers: Headers,
    body: Option<Body>,
}

impl RequestDescriptor {
    /// Builds a descriptor for `url` from merged options.
    ///
    /// Relative URLs are resolved against `base`. The session token, when
    /// present, always becomes the `Authorization` header.
    pub fn build(
        base: &Url,
        url: &str,
        options: RequestOptions,
        token: Option<&str>,
    ) -> Result<Self, ApiError> {
        let mut url = resolve_url(base, url)?;
        if !options.query.is_empty() {
            apply_query(&mut url, &options.query);
        }

        let mut headers = options.headers;
        match &options.body {
            Some(Body::Multipart(_)) => {
                headers.remove(CONTENT_TYPE);
            }
            Some(Body::Json(_)) if !headers.contains(CONTENT_TYPE) => {
                headers.insert(CONTENT_TYPE, APPLICATION_JSON);
            }
            _ => {}
        }
        if let Some(token) = token {
            headers.insert(AUTHORIZATION, format!("Bearer {}", token));
        }

        Ok(Self {
            url,
            method: options.method.unwrap_or_default(),
            headers,
            body: options.body,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Converts into a `reqwest` request on the given client.
    pub(crate) fn to_reqwest(
        &self,
        client: &reqwest::Client,
        timeout: Option<Duration>,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let mut request = client.request(self.method.to_reqwest(), self.url.clone());
        for (name, value) in self.headers.iter() {
            request = request.header(name, value);
        }
        request = match &self.body {
            Some(Body::Json(value)) => {
                let bytes =
                    serde_json::to_vec(value).map_err(|e| ApiError::Serialization(e.to_string()))?;
                request.body(bytes)
            }
            Some(Body::Multipart(form)) => request.multipart(form.to_form()?),
            None => request,
        };
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        Ok(request)
    }
}

/// Resolves `url` against `base` unless it is already absolute.
pub fn resolve_url(base: &Url, url: &str) -> Result<Url, ApiError> {
    match Url::parse(url) {
        Ok(absolute) => Ok(absolute),
        Err(url::ParseError::RelativeUrlWithoutBase) => base
            .join(url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", url, e))),
        Err(e) => Err(ApiError::InvalidUrl(format!("{}: {}", url, e))),
    }
}

fn apply_query(url: &mut Url, overrides: &[(String, String)]) {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    for (key, value) in overrides {
        set_pair(&mut pairs, key.clone(), value.clone());
    }
    url.query_pairs_mut().clear().extend_pairs(pairs);
}

// =============================================================================
// Attempts
// =============================================================================

/// Decides whether a response status ends an attempt chain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SuccessPredicate {
    /// Any 2xx status.
    #[default]
    AnySuccess,
    /// Only the listed statuses.
    Status(Vec<u16>),
}

impl SuccessPredicate {
    pub fn accepts(&self, status: u16) -> bool {
        match self {
            Self::AnySuccess => (200..300).contains(&status),
            Self::Status(codes) => codes.contains(&status),
        }
    }
}

/// One step of an ordered fallback chain.
///
/// # Example
///
/// ```
/// use dashboard_lib::request::{Attempt, Method};
///
/// // Try PATCH first, then fall back to PUT.
/// let chain = [Attempt::new(Method::Patch), Attempt::new(Method::Put)];
/// assert!(chain[0].success.accepts(204));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub method: Method,
    pub success: SuccessPredicate,
}

impl Attempt {
    /// Creates an attempt that succeeds on any 2xx status.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            success: SuccessPredicate::AnySuccess,
        }
    }

    /// Creates an attempt that succeeds only on the given statuses.
    pub fn with_statuses(method: Method, statuses: &[u16]) -> Self {
        Self {
            method,
            success: SuccessPredicate::Status(statuses.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:8080").unwrap()
    }

    #[test]
    fn test_headers_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("content-type", "text/plain");
        headers.insert("Content-Type", APPLICATION_JSON);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CONTENT-TYPE"), Some(APPLICATION_JSON));
        assert_eq!(headers.remove("content-type").as_deref(), Some(APPLICATION_JSON));
        assert!(headers.is_empty());
    }

    #[test]
    fn test_merge_override_wins() {
        let base_opts = RequestOptions::new()
            .header("X-Club", "1")
            .header("Accept", "application/json")
            .query("page", 1)
            .query("limit", 10);
        let overrides = RequestOptions::new()
            .method(Method::Post)
            .header("x-club", "2")
            .query("page", 3)
            .query("search", "chair");

        let merged = base_opts.merge(&overrides);
        assert_eq!(merged.method, Some(Method::Post));
        assert_eq!(merged.headers.get("X-Club"), Some("2"));
        assert_eq!(merged.headers.get("Accept"), Some("application/json"));
        assert_eq!(
            merged.query,
            vec![
                ("page".to_string(), "3".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("search".to_string(), "chair".to_string()),
            ]
        );
    }

    #[test]
    fn test_merge_keeps_base_method_when_unset() {
        let base_opts = RequestOptions::new().method(Method::Put);
        let merged = base_opts.merge(&RequestOptions::new());
        assert_eq!(merged.method, Some(Method::Put));
    }

    #[test]
    fn test_build_defaults_to_get_with_bearer() {
        let desc =
            RequestDescriptor::build(&base(), "/api/v1/clubs", RequestOptions::new(), Some("abc"))
                .unwrap();
        assert_eq!(desc.method(), Method::Get);
        assert_eq!(desc.url().as_str(), "http://localhost:8080/api/v1/clubs");
        assert_eq!(desc.headers().get(AUTHORIZATION), Some("Bearer abc"));
        assert!(!desc.headers().contains(CONTENT_TYPE));
    }

    #[test]
    fn test_build_without_session_has_no_authorization() {
        let opts = RequestOptions::new().header(AUTHORIZATION, "Bearer stale");
        let desc = RequestDescriptor::build(&base(), "/api/v1/clubs", opts.clone(), None).unwrap();
        assert_eq!(desc.headers().get(AUTHORIZATION), Some("Bearer stale"));

        let desc = RequestDescriptor::build(&base(), "/api/v1/clubs", opts, Some("fresh")).unwrap();
        assert_eq!(desc.headers().get(AUTHORIZATION), Some("Bearer fresh"));
    }

    #[test]
    fn test_build_json_sets_content_type() {
        let opts = RequestOptions::new()
            .method(Method::Post)
            .body(json!({"name": "Chess"}));
        let desc = RequestDescriptor::build(&base(), "/api/v1/clubs", opts, None).unwrap();
        assert_eq!(desc.headers().get(CONTENT_TYPE), Some(APPLICATION_JSON));
    }

    #[test]
    fn test_build_multipart_omits_content_type() {
        let opts = RequestOptions::new()
            .method(Method::Post)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .body(FormPayload::new().text("title", "Chair"));
        let desc = RequestDescriptor::build(&base(), "/api/v1/products", opts, Some("t")).unwrap();
        assert!(!desc.headers().contains(CONTENT_TYPE));
        assert!(desc.body().is_some_and(Body::is_multipart));
    }

    #[test]
    fn test_build_applies_query_over_existing() {
        let opts = RequestOptions::new().query("page", 2);
        let desc =
            RequestDescriptor::build(&base(), "/api/v1/products?page=1&limit=10", opts, None)
                .unwrap();
        assert_eq!(desc.url().query(), Some("page=2&limit=10"));
    }

    #[test]
    fn test_absolute_url_passes_through() {
        let url = resolve_url(&base(), "https://api.example.com/v1/orders").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/orders");
    }

    #[test]
    fn test_invalid_url() {
        let err = resolve_url(&base(), "http://[::1").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn test_typed_json_body_and_collected_headers() {
        #[derive(Serialize)]
        struct Club<'a> {
            name: &'a str,
            members: u32,
        }

        let body = Body::json(&Club {
            name: "Chess",
            members: 12,
        })
        .unwrap();
        assert_eq!(body, Body::Json(json!({"name": "Chess", "members": 12})));
        assert!(!body.is_multipart());

        let headers: Headers = [("X-Club", "1"), ("x-club", "2"), ("Accept", "*/*")]
            .into_iter()
            .collect();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("X-CLUB"), Some("2"));
    }

    #[test]
    fn test_success_predicate() {
        assert!(SuccessPredicate::AnySuccess.accepts(200));
        assert!(SuccessPredicate::AnySuccess.accepts(299));
        assert!(!SuccessPredicate::AnySuccess.accepts(300));
        let only_created = SuccessPredicate::Status(vec![201]);
        assert!(only_created.accepts(201));
        assert!(!only_created.accepts(200));
    }
}
