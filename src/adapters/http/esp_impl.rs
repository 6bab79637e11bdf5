//! ESP-IDF HTTP backend built on `esp_http_client`.

use embedded_svc::http::Method as SvcMethod;
use embedded_svc::http::client::Client;
use embedded_svc::io::{Read, Write};
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use esp_idf_svc::io::EspIOError;

use super::MAX_BODY_BYTES;
use crate::app::ports::{HttpRequest, HttpResponse, Method};
use crate::error::TransportError;

pub(super) fn execute(req: &HttpRequest<'_>) -> Result<HttpResponse, TransportError> {
    let config = Configuration {
        timeout: Some(req.timeout),
        ..Default::default()
    };
    let connection = EspHttpConnection::new(&config).map_err(|e| {
        log::warn!("http: connection setup failed: {e}");
        TransportError::Connect
    })?;
    let mut client = Client::wrap(connection);

    let content_length = req.body.map(|body| body.len().to_string());
    let mut headers: Vec<(&str, &str)> = req.headers.to_vec();
    if let Some(len) = content_length.as_deref() {
        headers.push(("Content-Length", len));
    }

    let method = match req.method {
        Method::Get => SvcMethod::Get,
        Method::Post => SvcMethod::Post,
    };

    let mut request = client
        .request(method, req.url, &headers)
        .map_err(|_| TransportError::InvalidUrl)?;
    if let Some(body) = req.body {
        request.write_all(body).map_err(map_io)?;
        request.flush().map_err(map_io)?;
    }

    let mut response = request.submit().map_err(map_io)?;
    let status = response.status();

    let mut body = Vec::new();
    let mut chunk = [0u8; 256];
    loop {
        let n = response.read(&mut chunk).map_err(map_io)?;
        if n == 0 {
            break;
        }
        if body.len() + n > MAX_BODY_BYTES {
            return Err(TransportError::BodyTooLarge);
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Ok(HttpResponse { status, body })
}

fn map_io(e: EspIOError) -> TransportError {
    if e.0.code() == esp_idf_svc::sys::ESP_ERR_TIMEOUT as i32 {
        TransportError::Timeout
    } else {
        TransportError::Io
    }
}
