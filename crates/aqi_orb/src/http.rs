//! Transporte HTTP bloqueante via `ureq`.

use aqi_core::fetch::{FetchError, HttpRequest, HttpResponse, HttpTransport};
use std::io::ErrorKind;
use tracing::debug;

/// Agente `ureq` reutilizado entre ciclos (mantém conexões keep-alive).
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .user_agent(concat!("aqi-orb/", env!("CARGO_PKG_VERSION")))
                .build(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for UreqTransport {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        debug!("API request: \"{}\"", request.url);

        let mut call = self.agent.get(&request.url).timeout(request.timeout);
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }

        match call.call() {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.into_string().map_err(io_error)?;
                Ok(HttpResponse { status, body })
            }
            // 4xx/5xx chegam como erro no ureq; o sensor decide pelo status
            Err(ureq::Error::Status(status, resp)) => Ok(HttpResponse {
                status,
                body: resp.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(t)) => Err(transport_error(&t)),
        }
    }
}

fn io_error(e: std::io::Error) -> FetchError {
    match e.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock => FetchError::Timeout,
        _ => FetchError::Transport(e.to_string()),
    }
}

fn transport_error(t: &ureq::Transport) -> FetchError {
    let timed_out = std::error::Error::source(t)
        .and_then(|s| s.downcast_ref::<std::io::Error>())
        .is_some_and(|e| matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock));
    if timed_out {
        FetchError::Timeout
    } else {
        FetchError::Transport(t.to_string())
    }
}
