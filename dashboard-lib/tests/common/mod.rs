//! Scripted local HTTP server for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dashboard_lib::error::SessionError;
use dashboard_lib::session::ChannelNavigator;
use dashboard_lib::session::MemoryStore;
use dashboard_lib::session::Session;
use dashboard_lib::session::SessionRecord;
use dashboard_lib::session::SessionStore;
use dashboard_lib::DashboardClient;
use http_body_util::BodyExt;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper::Response;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedReceiver;

/// A request as seen by the server.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }
}

/// Scripted response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string().into_bytes(),
            delay: None,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.as_bytes().to_vec(),
            delay: None,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

pub struct TestServer {
    pub url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl TestServer {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }
}

/// Starts a server answering every request with `handler`.
pub async fn serve<F>(handler: F) -> TestServer
where
    F: Fn(&Recorded) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = requests.clone();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let handler = handler.clone();
            let log = log.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let handler = handler.clone();
                    let log = log.clone();
                    async move {
                        let (parts, body) = req.into_parts();
                        let body = body
                            .collect()
                            .await
                            .map(|b| b.to_bytes().to_vec())
                            .unwrap_or_default();
                        let recorded = Recorded {
                            method: parts.method.to_string(),
                            path: parts
                                .uri
                                .path_and_query()
                                .map(|p| p.to_string())
                                .unwrap_or_default(),
                            headers: parts
                                .headers
                                .iter()
                                .map(|(k, v)| {
                                    (k.as_str().to_string(), v.to_str().unwrap_or("").to_string())
                                })
                                .collect(),
                            body,
                        };
                        let reply = handler(&recorded);
                        log.lock().unwrap().push(recorded);
                        if let Some(delay) = reply.delay {
                            tokio::time::sleep(delay).await;
                        }
                        Ok::<_, Infallible>(
                            Response::builder()
                                .status(reply.status)
                                .body(Full::new(Bytes::from(reply.body)))
                                .unwrap(),
                        )
                    }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    TestServer {
        url: format!("http://{}", addr),
        requests,
    }
}

/// Store that counts `clear` calls.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    pub clears: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn with_record(record: SessionRecord) -> Self {
        Self {
            inner: MemoryStore::with_record(record),
            clears: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl SessionStore for CountingStore {
    async fn load(&self) -> Result<Option<SessionRecord>, SessionError> {
        self.inner.load().await
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), SessionError> {
        self.inner.save(record).await
    }

    async fn clear(&self) -> Result<(), SessionError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear().await
    }
}

/// A client signed in with `token`, plus its clear counter and navigation receiver.
pub struct Harness {
    pub client: DashboardClient,
    pub clears: Arc<AtomicUsize>,
    pub routes: UnboundedReceiver<String>,
}

impl Harness {
    pub async fn signed_in(server: &TestServer, token: &str) -> Self {
        let store = CountingStore::with_record(SessionRecord::new(token).with_user("7", "admin"));
        let clears = store.clears.clone();
        let session = Session::load(store).await.unwrap();
        let (navigator, routes) = ChannelNavigator::new();
        let client = DashboardClient::builder()
            .base_url(server.url.clone())
            .session(session)
            .navigator(navigator)
            .build()
            .unwrap();
        Self {
            client,
            clears,
            routes,
        }
    }

    /// Drains and returns every navigation request so far.
    pub fn drain_routes(&mut self) -> Vec<String> {
        let mut routes = Vec::new();
        while let Ok(route) = self.routes.try_recv() {
            routes.push(route);
        }
        routes
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}
