//! Shared stub parameter-store endpoint for integration tests.
//!
//! The stub serves a fixed sequence of canned responses over HTTP and
//! records every request it sees, so tests can assert on both the binary's
//! output and the wire traffic it produced.

use serde_json::Value;
use std::io::Read;
use std::process::{Command, Output};
use std::sync::Arc;
use std::thread::JoinHandle;

/// One canned HTTP response.
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    pub fn ok(body: Value) -> Self {
        StubResponse {
            status: 200,
            body: body.to_string(),
        }
    }

    /// Not every test file exercises failure responses.
    #[allow(dead_code)]
    pub fn error(status: u16, code: &str, message: &str) -> Self {
        StubResponse {
            status,
            body: serde_json::json!({ "__type": code, "message": message }).to_string(),
        }
    }
}

/// One request the stub observed.
pub struct RecordedRequest {
    pub body: Value,
    #[allow(dead_code)]
    pub authorization: Option<String>,
    #[allow(dead_code)]
    pub target: Option<String>,
}

/// Stub SSM endpoint bound to an ephemeral local port.
pub struct StubStore {
    server: Arc<tiny_http::Server>,
    handle: Option<JoinHandle<Vec<RecordedRequest>>>,
    pub endpoint: String,
}

impl StubStore {
    pub fn serve(responses: Vec<StubResponse>) -> Self {
        let server = Arc::new(tiny_http::Server::http("127.0.0.1:0").expect("bind stub endpoint"));
        let port = server
            .server_addr()
            .to_ip()
            .expect("stub endpoint is a TCP listener")
            .port();
        let endpoint = format!("http://127.0.0.1:{port}");

        let worker = Arc::clone(&server);
        let handle = std::thread::spawn(move || {
            let mut seen = Vec::new();
            for canned in responses {
                let mut request = match worker.recv() {
                    Ok(request) => request,
                    Err(_) => break,
                };
                seen.push(record(&mut request));
                let response =
                    tiny_http::Response::from_string(canned.body).with_status_code(canned.status);
                request.respond(response).expect("respond to request");
            }
            seen
        });

        StubStore {
            server,
            handle: Some(handle),
            endpoint,
        }
    }

    /// Stop serving and return the requests seen, in order.
    pub fn finish(mut self) -> Vec<RecordedRequest> {
        self.server.unblock();
        self.handle
            .take()
            .expect("stub finished twice")
            .join()
            .expect("stub thread panicked")
    }
}

fn record(request: &mut tiny_http::Request) -> RecordedRequest {
    let authorization = header_value(request, "authorization");
    let target = header_value(request, "x-amz-target");
    let mut body = String::new();
    request
        .as_reader()
        .read_to_string(&mut body)
        .expect("read request body");
    RecordedRequest {
        body: serde_json::from_str(&body).expect("request body is JSON"),
        authorization,
        target,
    }
}

fn header_value(request: &tiny_http::Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.equiv(name))
        .map(|header| header.value.as_str().to_string())
}

/// Run the gather binary against the stub endpoint with a clean environment.
pub fn run_gather(endpoint: &str, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ssm-gather"))
        .args(args)
        .env_clear()
        .env("AWS_REGION", "us-east-1")
        .env("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE")
        .env(
            "AWS_SECRET_ACCESS_KEY",
            "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY",
        )
        .env("AWS_ENDPOINT_URL", endpoint)
        .output()
        .expect("run ssm-gather")
}
