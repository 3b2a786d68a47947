//! A tiny HTTP server that answers every request with the same canned response and records what
//! it was asked for.

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::CONTENT_TYPE;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct Recorded {
    requests: Vec<String>,
    bodies: Vec<String>,
}

pub(crate) struct TestServer {
    addr: SocketAddr,
    recorded: Arc<Mutex<Recorded>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Binds to an ephemeral port on localhost and starts serving `status` with `body`.
    pub(crate) async fn start(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let body = Bytes::from(body.to_string());

        let server_recorded = recorded.clone();
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = server_recorded.clone();
                let body = body.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |request: Request<Incoming>| {
                        let recorded = recorded.clone();
                        let body = body.clone();
                        async move {
                            let target = request
                                .uri()
                                .path_and_query()
                                .map(|p| p.as_str().to_string())
                                .unwrap_or_default();
                            let line = format!("{} {target}", request.method());
                            let sent = request.into_body().collect().await?.to_bytes();
                            {
                                let mut recorded = recorded.lock().unwrap();
                                recorded.requests.push(line);
                                recorded
                                    .bodies
                                    .push(String::from_utf8_lossy(&sent).into_owned());
                            }
                            let response = Response::builder()
                                .status(status)
                                .header(CONTENT_TYPE, "application/json")
                                .body(Full::new(body))
                                .unwrap();
                            Ok::<_, hyper::Error>(response)
                        }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self {
            addr,
            recorded,
            handle,
        }
    }

    pub(crate) fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// `"METHOD /path?query"` for each request received, in order.
    pub(crate) fn requests(&self) -> Vec<String> {
        self.recorded.lock().unwrap().requests.clone()
    }

    /// The request bodies, in the same order as `requests`.
    pub(crate) fn bodies(&self) -> Vec<String> {
        self.recorded.lock().unwrap().bodies.clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
