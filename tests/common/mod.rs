//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{request::Parts, Request},
    response::Response,
    Router,
};
use inertia_axum::{FlashError, FlashProvider, Inertia, InertiaBuilder, ValidationErrors};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tower::ServiceExt;

pub const ROOT_TEMPLATE: &str = "<!DOCTYPE html>\n<html><head>{{ inertiaHead }}<title>{{ title }}</title></head><body>{{ inertia }}</body></html>";

pub fn inertia(version: &str) -> Inertia {
    InertiaBuilder::new(ROOT_TEMPLATE).version(version).build().unwrap()
}

/// Mount `router` behind the Inertia middleware with the adapter as state.
pub fn with_middleware(router: Router<Inertia>, inertia: Inertia) -> Router {
    router
        .layer(axum::middleware::from_fn_with_state(inertia.clone(), inertia_axum::middleware))
        .with_state(inertia)
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Single-session in-memory flash store.
#[derive(Default, Clone)]
pub struct MemoryFlash {
    errors: Arc<Mutex<Option<ValidationErrors>>>,
    clear_history: Arc<Mutex<bool>>,
}

impl MemoryFlash {
    pub fn pending_errors(&self) -> Option<ValidationErrors> {
        self.errors.lock().unwrap().clone()
    }

    pub fn pending_clear_history(&self) -> bool {
        *self.clear_history.lock().unwrap()
    }
}

#[async_trait]
impl FlashProvider for MemoryFlash {
    async fn flash_errors(&self, _req: &Parts, errors: ValidationErrors) -> Result<(), FlashError> {
        *self.errors.lock().unwrap() = Some(errors);
        Ok(())
    }

    async fn get_errors(&self, _req: &Parts) -> Result<ValidationErrors, FlashError> {
        Ok(self.errors.lock().unwrap().take().unwrap_or_default())
    }

    async fn flash_clear_history(&self, _req: &Parts) -> Result<(), FlashError> {
        *self.clear_history.lock().unwrap() = true;
        Ok(())
    }

    async fn should_clear_history(&self, _req: &Parts) -> Result<bool, FlashError> {
        Ok(std::mem::take(&mut *self.clear_history.lock().unwrap()))
    }
}

/// Read one HTTP/1.1 request and return its body.
async fn read_request_body(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return String::new();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    String::from_utf8_lossy(&buf[header_end..]).into_owned()
}

/// Start a programmable SSR backend on an ephemeral port. The handler sees
/// each request body; every body is also recorded.
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, Arc<Mutex<Vec<String>>>)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let recorded = seen.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let body = read_request_body(&mut socket).await;
                        recorded.lock().unwrap().push(body.clone());

                        let (status, body) = f(body).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, seen)
}

/// SSR backend answering every render with a fixed head/body pair.
pub async fn start_ssr_backend() -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    start_programmable_backend(|_| async {
        (
            200,
            r#"{"head":["<title inertia>SSR</title>","<meta name=\"x\" content=\"y\">"],"body":"<div id=\"app\">rendered</div>"}"#
                .to_string(),
        )
    })
    .await
}
