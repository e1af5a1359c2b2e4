//! A throwaway HTTP/1.1 server for exercising the real client.
//!
//! Each connection serves one request and is closed. Requests are recorded so
//! tests can assert on exactly what went over the wire.

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct Route {
    pub method: &'static str,
    pub path: &'static str,
    pub status: u16,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: String,
}

impl Route {
    pub fn json(method: &'static str, path: &'static str, body: serde_json::Value) -> Self {
        Self {
            method,
            path,
            status: 200,
            headers: vec![("Content-Type", "application/json")],
            body: body.to_string(),
        }
    }

    pub fn redirect(method: &'static str, path: &'static str, location: &'static str) -> Self {
        Self {
            method,
            path,
            status: 302,
            headers: vec![("Location", location)],
            body: String::new(),
        }
    }

    pub fn html(method: &'static str, path: &'static str) -> Self {
        Self {
            method,
            path,
            status: 200,
            headers: vec![("Content-Type", "text/html; charset=utf-8")],
            body: "<html></html>".to_string(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    /// Path plus query, exactly as sent.
    pub target: String,
    pub head: String,
    pub body: String,
}

pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn find(&self, method: &str, target: &str) -> Option<Recorded> {
        self.requests()
            .into_iter()
            .find(|r| r.method == method && r.target == target)
    }
}

pub async fn serve(routes: Vec<Route>) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let routes = Arc::new(routes);

    let recorded = requests.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let routes = routes.clone();
            let recorded = recorded.clone();
            tokio::spawn(async move {
                handle(stream, &routes, &recorded).await;
            });
        }
    });

    StubServer {
        base_url: format!("http://{}", addr),
        requests,
    }
}

fn header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|pos| pos + 4)
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

async fn handle(mut stream: TcpStream, routes: &[Route], recorded: &Mutex<Vec<Recorded>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let end = loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = header_end(&buf) {
            break end;
        }
    };

    let head = String::from_utf8_lossy(&buf[..end]).to_string();
    let length = content_length(&head);
    while buf.len() < end + length {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = (end + length).min(buf.len());
    let body = String::from_utf8_lossy(&buf[end..body_end]).to_string();

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();
    let path = target.split('?').next().unwrap_or_default().to_string();

    recorded.lock().unwrap().push(Recorded {
        method: method.clone(),
        target,
        head,
        body,
    });

    let fallback = Route {
        method: "",
        path: "",
        status: 404,
        headers: vec![("Content-Type", "text/html")],
        body: "<h1>Not Found</h1>".to_string(),
    };
    let route = routes
        .iter()
        .find(|r| r.method == method && r.path == path)
        .unwrap_or(&fallback);

    let mut response = format!("HTTP/1.1 {} {}\r\n", route.status, reason(route.status));
    for (name, value) in &route.headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        route.body.len(),
        route.body
    ));

    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}
