use crate::errors::{OutboundError, StorageError};
use crate::notifier::{NotificationEvent, Notifier};
use crate::record::RecordKey;
use crate::storage::RecordStore;
use crate::trigger::DownstreamTrigger;
use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path and query as received
    pub uri: String,
    pub body: Bytes,
}

pub struct MockServer {
    pub port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }
}

/// Start a mock HTTP server that records every request and answers with `status`
pub async fn start_mock_server(status: StatusCode) -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            let io = TokioIo::new(stream);
            let recorded = recorded.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let recorded = recorded.clone();
                    async move {
                        let (parts, body) = req.into_parts();
                        let body = body.collect().await.unwrap().to_bytes();
                        recorded.lock().await.push(RecordedRequest {
                            method: parts.method,
                            uri: parts.uri.to_string(),
                            body,
                        });

                        let mut response = Response::new(Full::new(Bytes::from_static(b"ok")));
                        *response.status_mut() = status;
                        Ok::<_, Infallible>(response)
                    }
                });

                let _ = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                    .serve_connection(io, service)
                    .await;
            });
        }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    MockServer { port, requests }
}

/// A port nothing listens on
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[derive(Default)]
pub struct FakeStore {
    pub fail: bool,
    pub records: std::sync::Mutex<Vec<(RecordKey, String)>>,
}

impl FakeStore {
    pub fn failing() -> Self {
        FakeStore {
            fail: true,
            ..Default::default()
        }
    }

    pub fn records(&self) -> Vec<(RecordKey, String)> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn append(&self, key: &RecordKey, payload: &str) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.records
            .lock()
            .unwrap()
            .push((key.clone(), payload.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeTrigger {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeTrigger {
    pub fn failing() -> Self {
        FakeTrigger {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DownstreamTrigger for FakeTrigger {
    async fn trigger(&self) -> Result<(), OutboundError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(OutboundError::UnexpectedStatus(StatusCode::BAD_GATEWAY));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub fail: bool,
    pub events: std::sync::Mutex<Vec<NotificationEvent>>,
}

impl FakeNotifier {
    pub fn failing() -> Self {
        FakeNotifier {
            fail: true,
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, event: &NotificationEvent) -> Result<(), OutboundError> {
        // Attempts are recorded even when delivery fails
        self.events.lock().unwrap().push(event.clone());
        if self.fail {
            return Err(OutboundError::UnexpectedStatus(
                StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        Ok(())
    }
}
