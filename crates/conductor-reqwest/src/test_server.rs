//! Minimal HTTP/1.1 server answering with canned Conductor responses.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A request received by [`TestServer`], token requests excluded.
#[derive(Debug, Clone)]
pub(crate) struct ReceivedRequest {
    pub method: String,
    /// Path and query string.
    pub target: String,
    pub authorization: Option<String>,
    pub body: String,
}

struct State {
    token: String,
    token_calls: AtomicUsize,
    reject_next: AtomicBool,
    received: Mutex<Vec<ReceivedRequest>>,
}

impl State {
    fn respond(&self, request: ReceivedRequest) -> (&'static str, String) {
        if request.target == "/api/token" {
            self.token_calls.fetch_add(1, Ordering::SeqCst);
            return ("200 OK", json!({ "token": self.token }).to_string());
        }

        let target = request.target.clone();
        self.received.lock().unwrap().push(request);

        if self.reject_next.swap(false, Ordering::SeqCst) {
            return ("401 Unauthorized", String::new());
        }

        if target.starts_with("/api/workflow/execute/") {
            let run = json!({ "workflowId": "wf-9", "status": "COMPLETED" });
            ("200 OK", run.to_string())
        } else if target == "/api/workflow" {
            ("200 OK", "\"wf-1\"\n".to_owned())
        } else {
            ("200 OK", String::new())
        }
    }
}

/// Local server issuing `token` from `/api/token`.
///
/// Every other request is recorded. With `reject_first` the first of them
/// is answered with `401`.
pub(crate) struct TestServer {
    pub url: String,
    state: Arc<State>,
}

impl TestServer {
    pub async fn start(token: &str, reject_first: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let state = Arc::new(State {
            token: token.to_owned(),
            token_calls: AtomicUsize::new(0),
            reject_next: AtomicBool::new(reject_first),
            received: Mutex::new(Vec::new()),
        });

        let shared = Arc::clone(&state);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let state = Arc::clone(&shared);
                tokio::spawn(async move {
                    let _ = serve(stream, &state).await;
                });
            }
        });

        Self {
            url: format!("http://{address}/api"),
            state,
        }
    }

    /// Number of access tokens issued so far.
    pub fn token_calls(&self) -> usize {
        self.state.token_calls.load(Ordering::SeqCst)
    }

    /// Requests received so far, token requests excluded.
    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.state.received.lock().unwrap().clone()
    }
}

async fn serve(mut stream: TcpStream, state: &State) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(position) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break position + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
    let content_length = header(&head, "content-length")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0);
    while buffer.len() < header_end + content_length {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let request = ReceivedRequest {
        method: request_line.next().unwrap_or_default().to_owned(),
        target: request_line.next().unwrap_or_default().to_owned(),
        authorization: header(&head, "x-authorization"),
        body: String::from_utf8_lossy(&buffer[header_end..]).into_owned(),
    };

    let (status, body) = state.respond(request);
    let response = format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn header(head: &str, name: &str) -> Option<String> {
    head.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().to_owned())
    })
}
