//! End-to-end tests driving a real listener over loopback TCP.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use adam::router::Router;
use adam::server::listener::serve;
use adam::server::session::Session;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

async fn spawn_server(router: Router) -> SocketAddr {
    let socket = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    tokio::spawn(serve(socket, Arc::new(router)));
    addr
}

/// Reads exactly one response: head, then Content-Length body bytes.
async fn read_response(stream: &mut TcpStream) -> (u16, HashMap<String, String>, Vec<u8>) {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut tmp).await.unwrap();
        assert!(n > 0, "connection closed before full response head");
        buf.extend_from_slice(&tmp[..n]);
    };

    let head = String::from_utf8(buf[..head_end].to_vec()).unwrap();
    let mut lines = head.split("\r\n");

    let status: u16 = lines
        .next()
        .unwrap()
        .split_whitespace()
        .nth(1)
        .unwrap()
        .parse()
        .unwrap();

    let mut headers = HashMap::new();
    for line in lines {
        let (k, v) = line.split_once(':').unwrap();
        headers.insert(k.trim().to_string(), v.trim().to_string());
    }

    let content_length: usize = headers.get("Content-Length").unwrap().parse().unwrap();
    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut tmp).await.unwrap();
        assert!(n > 0, "connection closed mid-body");
        body.extend_from_slice(&tmp[..n]);
    }
    body.truncate(content_length);

    (status, headers, body)
}

#[tokio::test]
async fn test_registered_route_round_trip() {
    let mut router = Router::new();
    router.add_get("/text", |ctx| async move {
        ctx.send_text("Here is some text");
    });
    let addr = spawn_server(router).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /text HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    let (status, headers, body) = read_response(&mut stream).await;
    assert_eq!(status, 200);
    assert_eq!(headers.get("Content-Type").unwrap(), "text/plain");
    assert_eq!(headers.get("Server").unwrap(), "adam server");
    assert_eq!(body, b"Here is some text");
}

#[tokio::test]
async fn test_builtin_root_route() {
    let addr = spawn_server(Router::new()).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    let (status, _, body) = read_response(&mut stream).await;
    assert_eq!(status, 200);
    assert_eq!(body, b"Server is running");
}

#[tokio::test]
async fn test_unknown_route_is_bad_request() {
    let addr = spawn_server(Router::new()).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /missing HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    let (status, _, body) = read_response(&mut stream).await;
    assert_eq!(status, 400);
    assert_eq!(body, b"Bad request-target");
}

#[tokio::test]
async fn test_post_rejected_but_session_continues() {
    let addr = spawn_server(Router::new()).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"POST /text HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\n\r\n")
        .await
        .unwrap();

    let (status, _, body) = read_response(&mut stream).await;
    assert_eq!(status, 400);
    assert_eq!(body, b"Unknown HTTP-method");

    // The rejection honored keep-alive, so the same connection still works
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();
    let (status, _, body) = read_response(&mut stream).await;
    assert_eq!(status, 200);
    assert_eq!(body, b"Server is running");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_keep_alive_reuses_connection() {
    let mut router = Router::new();
    router.add_get("/text", |ctx| async move {
        ctx.send_text("Here is some text");
    });
    let addr = spawn_server(router).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();

    for _ in 0..2 {
        stream
            .write_all(b"GET /text HTTP/1.1\r\nHost: localhost\r\nConnection: keep-alive\r\n\r\n")
            .await
            .unwrap();
        let (status, headers, body) = read_response(&mut stream).await;
        assert_eq!(status, 200);
        assert_eq!(headers.get("Connection").unwrap(), "keep-alive");
        assert_eq!(body, b"Here is some text");
    }
}

#[tokio::test]
async fn test_connection_close_is_honored() {
    let addr = spawn_server(Router::new()).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let (status, headers, _) = read_response(&mut stream).await;
    assert_eq!(status, 200);
    assert_eq!(headers.get("Connection").unwrap(), "close");

    // Server shuts down its send side after the response
    let mut tmp = [0u8; 16];
    let n = timeout(Duration::from_secs(5), stream.read(&mut tmp))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(n, 0);
}

#[tokio::test]
async fn test_file_route_serves_exact_bytes() {
    let path = std::env::temp_dir().join("adam_test_server_index.html");
    let contents: Vec<u8> = (0..10_240u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(&path, &contents).unwrap();

    let file_path = path.to_str().unwrap().to_string();
    let mut router = Router::new();
    router.add_get("/file", move |ctx| {
        let file_path = file_path.clone();
        async move {
            ctx.send_file(&file_path).await;
        }
    });
    let addr = spawn_server(router).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /file HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    let (status, headers, body) = read_response(&mut stream).await;
    assert_eq!(status, 200);
    assert_eq!(headers.get("Content-Length").unwrap(), "10240");
    assert_eq!(headers.get("Content-Type").unwrap(), "text/html");
    assert_eq!(body, contents);

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let mut router = Router::new();
    router.add_get("/file", |ctx| async move {
        ctx.send_file("/no/such/adam_file.html").await;
    });
    let addr = spawn_server(router).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /file HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    let (status, _, body) = read_response(&mut stream).await;
    assert_eq!(status, 404);
    assert_eq!(body, b"The resource '/file' was not found.");
}

#[tokio::test]
async fn test_idle_connection_is_closed_without_response() {
    let socket = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();

    let router = Arc::new(Router::new());
    tokio::spawn(async move {
        let (conn, _) = socket.accept().await.unwrap();
        let mut session = Session::with_idle_timeout(conn, router, Duration::from_millis(200));
        let _ = session.run().await;
    });

    let mut stream = TcpStream::connect(addr).await.unwrap();

    // Send nothing; the session must give up on its own
    let mut tmp = [0u8; 16];
    let n = timeout(Duration::from_secs(5), stream.read(&mut tmp))
        .await
        .expect("server did not close the idle connection")
        .unwrap();
    assert_eq!(n, 0);
}

#[tokio::test]
async fn test_handler_without_send_terminates_session() {
    let mut router = Router::new();
    // Contract violation: the handler completes without sending
    router.add_get("/mute", |_ctx| async move {});
    let addr = spawn_server(router).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /mute HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    // The session errors out and the connection closes with no response
    let mut tmp = [0u8; 64];
    let n = timeout(Duration::from_secs(5), stream.read(&mut tmp))
        .await
        .expect("server did not close the connection")
        .unwrap();
    assert_eq!(n, 0);
}

#[tokio::test]
async fn test_write_timeout_aborts_stalled_response() {
    let socket = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();

    // Big enough to fill the loopback socket buffers many times over
    let full_len = 32 * 1024 * 1024;
    let mut router = Router::new();
    let body = "x".repeat(full_len);
    router.add_get("/huge", move |ctx| {
        let body = body.clone();
        async move {
            ctx.send_text(body);
        }
    });
    let router = Arc::new(router);

    let server = tokio::spawn(async move {
        let (conn, _) = socket.accept().await.unwrap();
        let mut session = Session::with_idle_timeout(conn, router, Duration::from_millis(300));
        session.run().await
    });

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /huge HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    // Never read: the write stalls once the buffers fill and the idle
    // timeout must abort it. A timeout closes silently, so run() is Ok.
    let result = timeout(Duration::from_secs(10), server)
        .await
        .expect("session did not give up on the stalled write")
        .unwrap();
    assert!(result.is_ok());

    // Drain what did arrive: a truncated response ending in EOF
    let mut received = 0usize;
    let mut tmp = [0u8; 65536];
    loop {
        let n = timeout(Duration::from_secs(5), stream.read(&mut tmp))
            .await
            .unwrap()
            .unwrap();
        if n == 0 {
            break;
        }
        received += n;
    }
    assert!(received < full_len);
}

#[tokio::test]
async fn test_http10_request_closes_by_default() {
    let addr = spawn_server(Router::new()).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.0\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    let (status, headers, _) = read_response(&mut stream).await;
    assert_eq!(status, 200);
    assert_eq!(headers.get("Connection").unwrap(), "close");

    let mut tmp = [0u8; 16];
    let n = timeout(Duration::from_secs(5), stream.read(&mut tmp))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(n, 0);
}
