//! End-to-end exchanges against a running worker pool on loopback.

use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::io::Read;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tinyhttp::config::Config;
use tinyhttp::handlers::default_router;
use tinyhttp::http::request::{Method, Request};
use tinyhttp::http::response::Response;
use tinyhttp::routing::{HandlerContext, Match, Router};
use tinyhttp::server::Server;
use tinyhttp::storage::DirectoryStorage;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

struct Reply {
    status_line: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

fn test_config(workers: usize) -> Config {
    Config {
        listen_addr: "127.0.0.1:0".to_string(),
        workers,
        ..Config::default()
    }
}

fn start(cfg: Config, router: Router, ctx: HandlerContext) -> SocketAddr {
    let server = Server::bind(&cfg, Arc::new(router), Arc::new(ctx)).unwrap();
    let addr = server.local_addr();
    tokio::spawn(server.run());
    addr
}

fn start_default(dir: Option<&Path>) -> SocketAddr {
    let ctx = match dir {
        Some(dir) => HandlerContext::with_storage(Arc::new(DirectoryStorage::new(dir))),
        None => HandlerContext::new(),
    };
    start(test_config(4), default_router(), ctx)
}

async fn raw_exchange(addr: SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    out
}

async fn exchange(addr: SocketAddr, raw: &[u8]) -> Reply {
    let out = raw_exchange(addr, raw).await;
    let pos = out
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no header terminator");
    let head = String::from_utf8(out[..pos].to_vec()).unwrap();
    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap().to_string();
    let headers = lines
        .map(|line| {
            let (k, v) = line.split_once(": ").unwrap();
            (k.to_string(), v.to_string())
        })
        .collect();

    Reply {
        status_line,
        headers,
        body: out[pos + 4..].to_vec(),
    }
}

#[tokio::test]
async fn test_root_returns_empty_ok() {
    let addr = start_default(None);

    let reply = exchange(addr, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").await;

    assert_eq!(reply.status_line, "HTTP/1.1 200 OK");
    assert_eq!(reply.headers.get("Content-Length").unwrap(), "0");
    assert!(reply.body.is_empty());
}

#[tokio::test]
async fn test_echo_scenario() {
    let addr = start_default(None);

    let reply = exchange(addr, b"GET /echo/abc HTTP/1.1\r\nHost: x\r\n\r\n").await;

    assert_eq!(reply.status_line, "HTTP/1.1 200 OK");
    assert_eq!(reply.headers.get("Content-Type").unwrap(), "text/plain");
    assert_eq!(reply.headers.get("Content-Length").unwrap(), "3");
    assert_eq!(reply.body, b"abc");
}

#[tokio::test]
async fn test_echo_without_suffix_is_empty_ok() {
    let addr = start_default(None);

    let reply = exchange(addr, b"GET /echo HTTP/1.1\r\n\r\n").await;

    assert_eq!(reply.status_line, "HTTP/1.1 200 OK");
    assert!(reply.body.is_empty());
}

#[tokio::test]
async fn test_echo_gzip_scenario() {
    let addr = start_default(None);

    let reply = exchange(addr, b"GET /echo/data HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n").await;

    assert_eq!(reply.status_line, "HTTP/1.1 200 OK");
    assert_eq!(reply.headers.get("Content-Encoding").unwrap(), "gzip");
    assert_eq!(
        reply.headers.get("Content-Length").unwrap(),
        &reply.body.len().to_string()
    );
    let mut decoded = String::new();
    GzDecoder::new(reply.body.as_slice())
        .read_to_string(&mut decoded)
        .unwrap();
    assert_eq!(decoded, "data");
}

#[tokio::test]
async fn test_echo_unsupported_encoding_is_plain() {
    let addr = start_default(None);

    let reply = exchange(addr, b"GET /echo/data HTTP/1.1\r\nAccept-Encoding: invalid-encoding\r\n\r\n").await;

    assert!(!reply.headers.contains_key("Content-Encoding"));
    assert_eq!(reply.body, b"data");
}

#[tokio::test]
async fn test_user_agent_scenario() {
    let addr = start_default(None);

    let reply = exchange(addr, b"GET /user-agent HTTP/1.1\r\nUser-Agent: curl/8.0\r\n\r\n").await;

    assert_eq!(reply.status_line, "HTTP/1.1 200 OK");
    assert_eq!(reply.body, b"curl/8.0");
}

#[tokio::test]
async fn test_user_agent_missing_is_bad_request() {
    let addr = start_default(None);

    let reply = exchange(addr, b"GET /user-agent HTTP/1.1\r\n\r\n").await;

    assert_eq!(reply.status_line, "HTTP/1.1 400 Bad Request");
    assert!(reply.body.is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_plain_404() {
    let addr = start_default(None);

    let reply = exchange(addr, b"GET /nowhere HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n").await;

    assert_eq!(reply.status_line, "HTTP/1.1 404 Not Found");
    assert!(!reply.headers.contains_key("Content-Encoding"));
    assert!(reply.body.is_empty());
}

#[tokio::test]
async fn test_create_file_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start_default(Some(dir.path()));

    let reply = exchange(
        addr,
        b"POST /files/note.txt HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello",
    )
    .await;

    assert_eq!(reply.status_line, "HTTP/1.1 201 Created");
    assert!(reply.body.is_empty());
    assert_eq!(std::fs::read(dir.path().join("note.txt")).unwrap(), b"hello");
}

#[tokio::test]
async fn test_create_then_read_file() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start_default(Some(dir.path()));
    let body = vec![b'z'; 3000];
    let mut raw = format!("POST /files/big.bin HTTP/1.1\r\nContent-Length: {}\r\n\r\n", body.len())
        .into_bytes();
    raw.extend_from_slice(&body);

    let created = exchange(addr, &raw).await;
    assert_eq!(created.status_line, "HTTP/1.1 201 Created");

    let fetched = exchange(addr, b"GET /files/big.bin HTTP/1.1\r\n\r\n").await;
    assert_eq!(fetched.status_line, "HTTP/1.1 200 OK");
    assert_eq!(
        fetched.headers.get("Content-Type").unwrap(),
        "application/octet-stream"
    );
    assert_eq!(fetched.body, body);
}

#[tokio::test]
async fn test_missing_file_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start_default(Some(dir.path()));

    let reply = exchange(addr, b"GET /files/missing.txt HTTP/1.1\r\n\r\n").await;

    assert_eq!(reply.status_line, "HTTP/1.1 404 Not Found");
    assert!(reply.body.is_empty());
}

#[tokio::test]
async fn test_files_without_directory_is_not_found() {
    let addr = start_default(None);

    let reply = exchange(addr, b"GET /files/anything HTTP/1.1\r\n\r\n").await;

    assert_eq!(reply.status_line, "HTTP/1.1 404 Not Found");
}

#[tokio::test]
async fn test_malformed_request_is_bad_request() {
    let addr = start_default(None);

    let reply = exchange(addr, b"GET /\r\nHost: x\r\n\r\n").await;

    assert_eq!(reply.status_line, "HTTP/1.1 400 Bad Request");
}

#[tokio::test]
async fn test_oversized_request_is_bad_request() {
    let cfg = Config {
        max_request_bytes: 128,
        ..test_config(1)
    };
    let addr = start(cfg, default_router(), HandlerContext::new());
    let mut raw = b"GET /echo/".to_vec();
    raw.extend(std::iter::repeat_n(b'a', 512));
    raw.extend_from_slice(b" HTTP/1.1\r\n\r\n");

    let reply = exchange(addr, &raw).await;

    assert_eq!(reply.status_line, "HTTP/1.1 400 Bad Request");
}

#[tokio::test]
async fn test_get_is_idempotent_on_the_wire() {
    let addr = start_default(None);
    let raw = b"GET /echo/repeat HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n";

    let first = raw_exchange(addr, raw).await;
    let second = raw_exchange(addr, raw).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_panicking_handler_does_not_stop_worker() {
    fn boom(_req: &Request, _ctx: &HandlerContext) -> Response {
        panic!("handler exploded");
    }
    let router = Router::new()
        .route(Method::GET, "/boom", Match::Exact, boom)
        .route(Method::GET, "/", Match::Exact, |_req: &Request, _ctx: &HandlerContext| {
            Response::new()
        });
    let addr = start(test_config(1), router, HandlerContext::new());

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET /boom HTTP/1.1\r\n\r\n").await.unwrap();
    let mut out = Vec::new();
    if stream.read_to_end(&mut out).await.is_ok() {
        assert!(out.is_empty());
    }

    let reply = exchange(addr, b"GET / HTTP/1.1\r\n\r\n").await;
    assert_eq!(reply.status_line, "HTTP/1.1 200 OK");
}

#[tokio::test]
async fn test_concurrent_clients() {
    let addr = start_default(None);

    let mut tasks = Vec::new();
    for i in 0..16 {
        tasks.push(tokio::spawn(async move {
            let raw = format!("GET /echo/client-{i} HTTP/1.1\r\n\r\n");
            let reply = exchange(addr, raw.as_bytes()).await;
            assert_eq!(reply.body, format!("client-{i}").into_bytes());
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
}
