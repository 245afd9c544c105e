use crate::{Transport, TransportError, WireRequest, WireResponse};
use hitch_spec::Method;
use std::io::Read;
use std::time::Duration;

/// `ureq`-backed transport.
///
/// The agent is configured to report non-success statuses as responses rather
/// than errors, so the engine always sees the status and the full body. The
/// body is attached for every method, including ones that conventionally
/// carry none. No headers beyond the request's own are injected — in
/// particular no default content-type.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// A transport with a global per-exchange timeout. Timeout policy lives
    /// here; the engine itself never imposes one.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn exchange(&self, request: &WireRequest) -> Result<WireResponse, TransportError> {
        tracing::debug!("{} {} ({} bytes)", request.method, request.url, request.body.len());

        let mut req = match request.method {
            Method::Get => self.agent.get(&request.url).force_send_body(),
            Method::Post => self.agent.post(&request.url),
            Method::Put => self.agent.put(&request.url),
            Method::Patch => self.agent.patch(&request.url),
            Method::Delete => self.agent.delete(&request.url).force_send_body(),
            Method::Head => self.agent.head(&request.url).force_send_body(),
        };
        for (name, value) in &request.headers {
            req = req.header(name, value);
        }

        let resp = req
            .send(request.body.as_bytes())
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let status = resp.status().as_u16();
        let mut reader = resp.into_body().into_reader();
        let mut raw = Vec::new();
        reader
            .read_to_end(&mut raw)
            .map_err(|e| TransportError::BodyRead(e.to_string()))?;

        tracing::debug!("{} {} -> {status}", request.method, request.url);

        Ok(WireResponse {
            status,
            body: String::from_utf8_lossy(&raw).into_owned(),
        })
    }
}
