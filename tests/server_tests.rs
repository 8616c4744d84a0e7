//! Integration tests for the HTTP stack: raw requests over TCP through the
//! `may_minihttp` service into the mux and back.

use serde_json::json;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Once};
use std::time::Duration;
use switchback::{cors, handler_fn, HttpError, HttpServer, Mux, RouterService, ServerHandle};

static MAY_INIT: Once = Once::new();

fn setup_may_runtime() {
    MAY_INIT.call_once(|| {
        may::config().set_stack_size(0x8000);
    });
}

fn build_mux() -> Mux {
    let mut mux = Mux::new();
    mux.get(
        "/health",
        handler_fn(|ctx| ctx.json(&json!({"status": "ok"}))),
    );
    mux.get(
        "/users/:id",
        handler_fn(|ctx| {
            let id = ctx
                .param("id")
                .ok_or_else(|| HttpError::new(500, "missing capture"))?
                .to_string();
            ctx.json(&json!({"id": id}))
        }),
    );
    mux.post(
        "/echo",
        handler_fn(|ctx| {
            let body = ctx
                .body()
                .cloned()
                .ok_or_else(|| HttpError::new(400, "request body required"))?;
            ctx.json(&body)
        }),
    );
    mux.get(
        "/search",
        handler_fn(|ctx| {
            let q = ctx.query("q").unwrap_or_default().to_string();
            ctx.text(&q);
            Ok(())
        }),
    );
    mux.get(
        "/whoami",
        handler_fn(|ctx| {
            let session = ctx.cookie("session").unwrap_or("anonymous").to_string();
            ctx.text(&session);
            Ok(())
        }),
    );
    mux.get(
        "/files/*path",
        handler_fn(|ctx| {
            let path = ctx.param("path").unwrap_or_default().to_string();
            ctx.text(&path);
            Ok(())
        }),
    );
    mux.get(
        "/teapot",
        handler_fn(|_| Err(HttpError::new(418, "short and stout").into())),
    );
    mux.group("/api", |api| {
        api.wrap(cors());
        api.get("/ping", handler_fn(|ctx| {
            ctx.text("pong");
            Ok(())
        }));
        api.options("/ping", handler_fn(|_| Ok(())));
    });
    mux
}

fn start_server() -> (ServerHandle, SocketAddr) {
    setup_may_runtime();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let handle = HttpServer(RouterService::new(Arc::new(build_mux())))
        .start(addr)
        .unwrap();
    handle.wait_ready().unwrap();
    (handle, addr)
}

fn send_request(addr: &SocketAddr, req: &str) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(req.as_bytes()).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_millis(200)))
        .unwrap();
    let mut buf = Vec::new();
    loop {
        let mut tmp = [0u8; 1024];
        match stream.read(&mut tmp) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&tmp[..n]),
            Err(ref e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                break
            }
            Err(e) => panic!("read error: {e:?}"),
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn status_of(resp: &str) -> u16 {
    resp.lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
        .unwrap_or(0)
}

fn body_of(resp: &str) -> &str {
    resp.split("\r\n\r\n").nth(1).unwrap_or("")
}

fn header_of<'a>(resp: &'a str, name: &str) -> Option<&'a str> {
    let headers = resp.split("\r\n\r\n").next().unwrap_or("");
    headers.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim())
    })
}

#[test]
fn test_server_round_trips() {
    let (handle, addr) = start_server();

    let resp = send_request(&addr, "GET /health HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(status_of(&resp), 200);
    assert_eq!(body_of(&resp), r#"{"status":"ok"}"#);
    assert_eq!(header_of(&resp, "Content-Type"), Some("application/json"));

    let resp = send_request(&addr, "GET /users/42 HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(status_of(&resp), 200);
    assert_eq!(body_of(&resp), r#"{"id":"42"}"#);

    let resp = send_request(&addr, "GET /nope HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(status_of(&resp), 404);

    handle.stop();
}

#[test]
fn test_server_parses_query_and_cookies() {
    let (handle, addr) = start_server();

    let resp = send_request(
        &addr,
        "GET /search?q=hello%20world HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert_eq!(status_of(&resp), 200);
    assert_eq!(body_of(&resp), "hello world");

    let resp = send_request(
        &addr,
        "GET /whoami HTTP/1.1\r\nHost: localhost\r\nCookie: session=u123; theme=dark\r\n\r\n",
    );
    assert_eq!(body_of(&resp), "u123");

    let resp = send_request(&addr, "GET /whoami HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(body_of(&resp), "anonymous");

    handle.stop();
}

#[test]
fn test_server_json_body_round_trip() {
    let (handle, addr) = start_server();

    let body = r#"{"name":"fluffy"}"#;
    let req = format!(
        "POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    let resp = send_request(&addr, &req);
    assert_eq!(status_of(&resp), 200);
    assert_eq!(body_of(&resp), body);

    // Missing body maps to the 400 error envelope.
    let resp = send_request(
        &addr,
        "POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\n\r\n",
    );
    assert_eq!(status_of(&resp), 400);
    assert_eq!(body_of(&resp), r#"{"code":400,"message":"request body required"}"#);

    handle.stop();
}

#[test]
fn test_server_method_not_allowed() {
    let (handle, addr) = start_server();

    let resp = send_request(&addr, "DELETE /echo HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(status_of(&resp), 405);
    assert_eq!(header_of(&resp, "Allow"), Some("POST"));

    handle.stop();
}

#[test]
fn test_server_error_envelope() {
    let (handle, addr) = start_server();

    let resp = send_request(&addr, "GET /teapot HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(status_of(&resp), 418);
    assert_eq!(body_of(&resp), r#"{"code":418,"message":"short and stout"}"#);

    handle.stop();
}

#[test]
fn test_server_wildcard_route() {
    let (handle, addr) = start_server();

    let resp = send_request(
        &addr,
        "GET /files/docs/guide/intro.md HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert_eq!(status_of(&resp), 200);
    assert_eq!(body_of(&resp), "docs/guide/intro.md");

    handle.stop();
}

#[test]
fn test_server_cors_preflight() {
    let (handle, addr) = start_server();

    let resp = send_request(&addr, "OPTIONS /api/ping HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(status_of(&resp), 204);
    assert_eq!(header_of(&resp, "Access-Control-Allow-Origin"), Some("*"));

    let resp = send_request(&addr, "GET /api/ping HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(status_of(&resp), 200);
    assert_eq!(body_of(&resp), "pong");
    assert_eq!(header_of(&resp, "Access-Control-Allow-Origin"), Some("*"));

    handle.stop();
}
