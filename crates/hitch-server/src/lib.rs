//! Reference HTTP endpoint for exercising hitch reconciliation.
//!
//! A small target server with the routes integration tests and demos need:
//! an ingest route that appends payloads to a log file, an echo route, a
//! `/status/<code>` route for driving non-success paths, and an optional
//! shared-token check in front of everything.
//!
//! The [`TestServer`] helper starts a server on a random port for
//! integration testing.

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_http::{Method, Response, Server, StatusCode};
use tracing::{debug, error, info};

const PAYLOAD_LOG: &str = "payloads.log";

/// The endpoint's configuration and payload sink.
pub struct Endpoint {
    data_dir: PathBuf,
    token: Option<String>,
}

impl Endpoint {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            token: None,
        }
    }

    /// Require every request to carry `Authorization: <token>` verbatim.
    #[must_use]
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_owned());
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn payload_log(&self) -> PathBuf {
        self.data_dir.join(PAYLOAD_LOG)
    }

    /// Append one payload to the log, newline-terminated.
    pub fn append_payload(&self, data: &[u8]) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.payload_log())?;
        file.write_all(data)?;
        file.write_all(b"\n")?;
        Ok(())
    }

    /// Check the Authorization header against the configured token.
    /// Returns the rejection message, or `None` when the request may pass.
    fn denial(&self, req: &tiny_http::Request) -> Option<&'static str> {
        let Some(ref token) = self.token else {
            return None;
        };
        let presented = req
            .headers()
            .iter()
            .find(|h| h.field.equiv("Authorization"))
            .map(|h| h.value.as_str());
        match presented {
            None => Some("access denied: no token provided"),
            Some(value) if value == token => None,
            Some(_) => Some("access denied: invalid token"),
        }
    }
}

/// Parse `/status/<code>` into a status code. Codes outside 100-599 are not
/// valid HTTP and fall through to 404.
pub fn parse_status_route(path: &str) -> Option<u16> {
    let code: u16 = path.strip_prefix("/status/")?.parse().ok()?;
    (100..=599).contains(&code).then_some(code)
}

fn respond_text(req: tiny_http::Request, code: u16, msg: &str) {
    let _ = req.respond(Response::from_string(msg).with_status_code(StatusCode(code)));
}

fn read_body(req: &mut tiny_http::Request) -> Option<Vec<u8>> {
    let mut body = Vec::new();
    if req.as_reader().read_to_end(&mut body).is_ok() {
        Some(body)
    } else {
        None
    }
}

/// Handle a single HTTP request, dispatching to the appropriate route.
pub fn handle_request(endpoint: &Endpoint, mut req: tiny_http::Request) {
    let method = req.method().clone();
    let url = req.url().to_owned();
    debug!("{method} {url}");

    if let Some(msg) = endpoint.denial(&req) {
        respond_text(req, 401, msg);
        return;
    }

    if url == "/ingest" {
        match method {
            Method::Post | Method::Put | Method::Patch => {
                let Some(body) = read_body(&mut req) else {
                    respond_text(req, 500, "read error");
                    return;
                };
                match endpoint.append_payload(&body) {
                    Ok(()) => {
                        info!("ingested {} bytes", body.len());
                        respond_text(req, 200, "payload accepted");
                    }
                    Err(e) => {
                        error!("ingest write failed: {e}");
                        respond_text(req, 500, &format!("write error: {e}"));
                    }
                }
            }
            _ => respond_text(req, 405, "method not allowed"),
        }
    } else if url == "/echo" {
        let Some(body) = read_body(&mut req) else {
            respond_text(req, 500, "read error");
            return;
        };
        let _ = req.respond(Response::from_data(body));
    } else if let Some(code) = parse_status_route(&url) {
        respond_text(req, code, &format!("status {code}"));
    } else if url == "/health" && method == Method::Get {
        let _ = req.respond(Response::from_string(r#"{"status":"ok"}"#));
    } else {
        respond_text(req, 404, "not found");
    }
}

/// Start the server loop, blocking the current thread.
pub fn run_server(endpoint: &Arc<Endpoint>, addr: &str) {
    let server = Server::http(addr).expect("failed to bind HTTP server");
    for request in server.incoming_requests() {
        handle_request(endpoint, request);
    }
}

/// A test helper that starts a hitch-server on a random port in a
/// background thread.
pub struct TestServer {
    pub url: String,
    pub port: u16,
    pub data_dir: PathBuf,
    _server: Arc<Server>,
    _handle: std::thread::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server without a token requirement.
    /// Binds to `127.0.0.1:0` (random port).
    pub fn start(data_dir: PathBuf) -> Self {
        Self::launch(Endpoint::new(data_dir))
    }

    /// Start a test server that requires the given token.
    pub fn start_with_token(data_dir: PathBuf, token: &str) -> Self {
        Self::launch(Endpoint::new(data_dir).with_token(token))
    }

    fn launch(endpoint: Endpoint) -> Self {
        let data_dir = endpoint.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir).expect("failed to create test data dir");
        let server =
            Arc::new(Server::http("127.0.0.1:0").expect("failed to bind test HTTP server"));
        let port = server.server_addr().to_ip().expect("not an IP addr").port();
        let url = format!("http://127.0.0.1:{port}");

        let endpoint = Arc::new(endpoint);
        let srv = Arc::clone(&server);
        let handle = std::thread::spawn(move || {
            for request in srv.incoming_requests() {
                handle_request(&endpoint, request);
            }
        });

        Self {
            url,
            port,
            data_dir,
            _server: server,
            _handle: handle,
        }
    }
}
