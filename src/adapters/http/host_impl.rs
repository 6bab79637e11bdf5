//! Host HTTP backend built on `ureq`.

use std::io::{self, Read};

use ureq::ErrorKind;

use super::MAX_BODY_BYTES;
use crate::app::ports::{HttpRequest, HttpResponse, Method};
use crate::error::TransportError;

pub(super) fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .max_idle_connections_per_host(2)
        .build()
}

pub(super) fn execute(
    agent: &ureq::Agent,
    req: &HttpRequest<'_>,
) -> Result<HttpResponse, TransportError> {
    let mut request = match req.method {
        Method::Get => agent.get(req.url),
        Method::Post => agent.post(req.url),
    }
    .timeout(req.timeout);

    for (name, value) in req.headers {
        request = request.set(name, value);
    }

    let outcome = match req.body {
        Some(body) => request.send_bytes(body),
        None => request.call(),
    };

    let response = match outcome {
        Ok(response) => response,
        // Non-2xx is still a response; the caller decides what it means.
        Err(ureq::Error::Status(_, response)) => response,
        Err(ureq::Error::Transport(t)) => return Err(classify(&t)),
    };

    let status = response.status();
    let body = read_body(response)?;
    Ok(HttpResponse { status, body })
}

fn read_body(response: ureq::Response) -> Result<Vec<u8>, TransportError> {
    let mut body = Vec::new();
    response
        .into_reader()
        .take(MAX_BODY_BYTES as u64 + 1)
        .read_to_end(&mut body)
        .map_err(|e| {
            if is_timeout_kind(e.kind()) {
                TransportError::Timeout
            } else {
                TransportError::Io
            }
        })?;
    if body.len() > MAX_BODY_BYTES {
        return Err(TransportError::BodyTooLarge);
    }
    Ok(body)
}

fn classify(t: &ureq::Transport) -> TransportError {
    match t.kind() {
        ErrorKind::InvalidUrl | ErrorKind::UnknownScheme => TransportError::InvalidUrl,
        _ if timed_out(t) => TransportError::Timeout,
        ErrorKind::Dns | ErrorKind::ConnectionFailed => TransportError::Connect,
        _ => TransportError::Io,
    }
}

fn timed_out(t: &ureq::Transport) -> bool {
    std::error::Error::source(t)
        .and_then(|source| source.downcast_ref::<io::Error>())
        .is_some_and(|e| is_timeout_kind(e.kind()))
        || t.message().is_some_and(|m| m.contains("timed out"))
}

fn is_timeout_kind(kind: io::ErrorKind) -> bool {
    matches!(kind, io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}
