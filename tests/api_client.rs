use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use tasklane::api::{ApiClient, ApiCommand, ApiHandle, ApiMessage, TokenStore, Tokens};
use tasklane::error::ApiError;

const EVENTS: &str = r#"{"events":[
    {"id":1,"name":"Spring fair","description":null,"link":"https://example.org/fair",
     "event_blocks":[{"id":10,"name":"Setup","start_date":"2024-06-10T00:00:00",
                      "end_date":"2024-06-12","description":"Tents","link":null}]},
    {"id":2,"name":"Quiet week","event_blocks":null}
]}"#;

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    auth: Option<String>,
    body: String,
}

type Handler = Arc<dyn Fn(&Recorded) -> (u16, String) + Send + Sync>;
type Log = Arc<Mutex<Vec<Recorded>>>;

/// Minimal HTTP/1.1 server answering each request through `handler`.
async fn stub_server(handler: Handler) -> (String, Log) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let server_log = log.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let handler = handler.clone();
            let log = server_log.clone();
            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                let (status, body) = handler(&request);
                log.lock().unwrap().push(request);
                let reason = match status {
                    200 => "OK",
                    401 => "Unauthorized",
                    404 => "Not Found",
                    _ => "Error",
                };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{addr}"), log)
}

async fn read_request(socket: &mut TcpStream) -> Option<Recorded> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let mut auth = None;
    let mut content_length = 0;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "authorization" => auth = Some(value.trim().to_string()),
                "content-length" => content_length = value.trim().parse().unwrap_or(0),
                _ => {}
            }
        }
    }

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(Recorded {
        method,
        path,
        auth,
        body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
    })
}

fn client(base_url: &str, tokens: TokenStore) -> ApiClient {
    ApiClient::new(base_url, tokens, Duration::from_secs(5)).unwrap()
}

fn logged_in(access: &str, refresh: &str) -> TokenStore {
    let store = TokenStore::in_memory();
    store.set(Tokens::new(access, refresh));
    store
}

fn paths(log: &Log) -> Vec<String> {
    log.lock().unwrap().iter().map(|r| r.path.clone()).collect()
}

#[tokio::test]
async fn requests_carry_bearer_token_and_parse_events() {
    let (url, log) = stub_server(Arc::new(|_: &Recorded| (200, EVENTS.to_string()))).await;
    let api = client(&format!("{url}/"), logged_in("a1", "r1"));

    let events = api.all_events().await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_blocks[0].start_date, NaiveDate::from_ymd_opt(2024, 6, 10));
    assert_eq!(events[0].event_blocks[0].end_date, NaiveDate::from_ymd_opt(2024, 6, 12));
    assert!(events[1].event_blocks.is_empty());

    let log = log.lock().unwrap();
    assert_eq!(log[0].method, "GET");
    assert_eq!(log[0].path, "/users/all-events");
    assert_eq!(log[0].auth.as_deref(), Some("Bearer a1"));
}

#[tokio::test]
async fn unauthorized_request_is_refreshed_and_retried_once() {
    let handler: Handler = Arc::new(|req: &Recorded| {
        if req.path == "/users/refresh-token" {
            (200, r#"{"access":"a2","refresh":"r2"}"#.to_string())
        } else if req.auth.as_deref() == Some("Bearer a2") {
            (200, EVENTS.to_string())
        } else {
            (401, r#"{"detail":"expired"}"#.to_string())
        }
    });
    let (url, log) = stub_server(handler).await;
    let tokens = logged_in("a1", "r1");
    let api = client(&url, tokens.clone());

    let events = api.current_events().await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(
        paths(&log),
        vec!["/users/current-events", "/users/refresh-token", "/users/current-events"]
    );

    let refresh = log.lock().unwrap()[1].clone();
    assert_eq!(refresh.method, "POST");
    assert!(refresh.auth.is_none());
    assert!(refresh.body.contains(r#""refresh_token":"r1""#));

    assert_eq!(tokens.snapshot(), Tokens::new("a2", "r2"));
}

#[tokio::test]
async fn concurrent_401s_spend_the_refresh_token_once() {
    let refreshes = Arc::new(AtomicUsize::new(0));
    let counter = refreshes.clone();
    let handler: Handler = Arc::new(move |req: &Recorded| {
        if req.path == "/users/refresh-token" {
            // The refresh token rotates: only the first use succeeds.
            if counter.fetch_add(1, Ordering::SeqCst) == 0 && req.body.contains("r1") {
                (200, r#"{"access":"a2","refresh":"r2"}"#.to_string())
            } else {
                (401, r#"{"detail":"refresh token reused"}"#.to_string())
            }
        } else if req.auth.as_deref() == Some("Bearer a2") {
            (200, EVENTS.to_string())
        } else {
            (401, r#"{"detail":"expired"}"#.to_string())
        }
    });
    let (url, log) = stub_server(handler).await;
    let tokens = logged_in("a1", "r1");
    let api = client(&url, tokens.clone());

    let (current, all) = tokio::join!(api.current_events(), api.all_events());
    assert_eq!(current.unwrap().len(), 2);
    assert_eq!(all.unwrap().len(), 2);
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(
        paths(&log).iter().filter(|p| *p == "/users/refresh-token").count(),
        1
    );
    assert_eq!(tokens.snapshot(), Tokens::new("a2", "r2"));
}

#[tokio::test]
async fn failed_refresh_returns_the_original_401() {
    let (url, log) = stub_server(Arc::new(|_: &Recorded| (401, r#"{"detail":"nope"}"#.to_string()))).await;
    let tokens = logged_in("a1", "r1");
    let api = client(&url, tokens.clone());

    let err = api.block(7).await.unwrap_err();
    assert!(err.is_unauthorized(), "{err}");
    assert_eq!(paths(&log), vec!["/users/block/7", "/users/refresh-token"]);
    assert_eq!(tokens.snapshot(), Tokens::new("a1", "r1"));
}

#[tokio::test]
async fn no_refresh_without_refresh_token() {
    let (url, log) = stub_server(Arc::new(|_: &Recorded| (401, "{}".to_string()))).await;
    let tokens = TokenStore::in_memory();
    tokens.set(Tokens {
        access: Some("a1".into()),
        refresh: None,
    });
    let api = client(&url, tokens);

    let err = api.event(3).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(paths(&log), vec!["/users/event/3"]);
}

#[tokio::test]
async fn anonymous_requests_have_no_auth_header() {
    let (url, log) = stub_server(Arc::new(|_: &Recorded| (200, EVENTS.to_string()))).await;
    let api = client(&url, TokenStore::in_memory());

    api.current_events().await.unwrap();
    assert!(log.lock().unwrap()[0].auth.is_none());
}

#[tokio::test]
async fn verify_code_stores_tokens() {
    let (url, log) =
        stub_server(Arc::new(|_: &Recorded| (200, r#"{"access":"acc","refresh":"ref"}"#.to_string()))).await;
    let api = client(&url, TokenStore::in_memory());
    assert!(!api.is_authenticated());

    api.verify_code("admin@example.org", "4321").await.unwrap();
    assert!(api.is_authenticated());
    assert_eq!(api.tokens().snapshot(), Tokens::new("acc", "ref"));

    let request = log.lock().unwrap()[0].clone();
    assert_eq!(request.path, "/users/verify-code");
    assert!(request.body.contains("admin@example.org"));
    assert!(request.body.contains("4321"));

    api.logout();
    assert!(!api.is_authenticated());
}

#[tokio::test]
async fn error_status_keeps_the_body() {
    let (url, _log) =
        stub_server(Arc::new(|_: &Recorded| (404, r#"{"detail":"unknown email"}"#.to_string()))).await;
    let api = client(&url, TokenStore::in_memory());

    match api.send_code("who@example.org").await {
        Err(ApiError::Status { status, body }) => {
            assert_eq!(status, 404);
            assert!(body.contains("unknown email"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[test]
fn worker_delivers_both_event_lists() {
    let server = tokio::runtime::Runtime::new().unwrap();
    let (url, _log) = server.block_on(stub_server(Arc::new(|req: &Recorded| {
        if req.path == "/users/current-events" {
            (200, r#"{"events":[{"id":5,"name":"Now","event_blocks":[]}]}"#.to_string())
        } else {
            (200, EVENTS.to_string())
        }
    })));

    let mut handle = ApiHandle::spawn(client(&url, TokenStore::in_memory()), || {}).unwrap();
    handle.send(ApiCommand::RefreshAll).unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut current = None;
    let mut all = None;
    while (current.is_none() || all.is_none()) && Instant::now() < deadline {
        match handle.try_recv() {
            Some(ApiMessage::CurrentEventsLoaded(events)) => current = Some(events),
            Some(ApiMessage::AllEventsLoaded(events)) => all = Some(events),
            Some(other) => panic!("unexpected message {other:?}"),
            None => std::thread::sleep(Duration::from_millis(10)),
        }
    }

    assert_eq!(current.map(|e| e.len()), Some(1));
    assert_eq!(all.map(|e| e.len()), Some(2));
}
