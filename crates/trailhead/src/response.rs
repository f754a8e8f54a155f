// File: src/response.rs
// Purpose: Response sink handed to request contexts, and the finished response

use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;

use crate::error::{Error, Result};

/// Content type every response starts with
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

// -- Shared helpers --

fn insert_header(headers: &mut HeaderMap, key: &str, value: &str) {
    if let (Ok(name), Ok(val)) = (
        HeaderName::from_bytes(key.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        headers.insert(name, val);
    }
}

// ============================================================================
// Response
// ============================================================================

/// A finished response: status, headers and body
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Response {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.headers, self.body).into_response()
    }
}

// ============================================================================
// ResponseWriter
// ============================================================================

/// Mutable response under construction for one dispatch
///
/// Starts as `200 OK` with `Content-Type: text/html`. Once [`finish`](Self::finish)
/// has run, further writes fail with [`Error::ResponseFinished`].
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
    finished: bool,
}

impl ResponseWriter {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        Self {
            status: StatusCode::OK,
            headers,
            body: String::new(),
            finished: false,
        }
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Replaces a header; invalid names or values are skipped
    pub fn set_header(&mut self, key: &str, value: &str) {
        insert_header(&mut self.headers, key, value);
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn ensure_open(&self) -> Result<()> {
        if self.finished {
            return Err(Error::ResponseFinished);
        }
        Ok(())
    }

    /// Appends to the body
    pub fn write(&mut self, chunk: &str) -> Result<()> {
        self.ensure_open()?;
        self.body.push_str(chunk);
        Ok(())
    }

    /// Turns the response into a `302 Found` pointing at `uri`
    pub fn redirect(&mut self, uri: &str) -> Result<()> {
        self.ensure_open()?;
        self.status = StatusCode::FOUND;
        insert_header(&mut self.headers, LOCATION.as_str(), uri);
        Ok(())
    }

    /// Finalizes the response; only the first call succeeds
    pub fn finish(&mut self) -> Result<Response> {
        self.ensure_open()?;
        self.finished = true;
        Ok(self.snapshot())
    }

    fn snapshot(&self) -> Response {
        Response {
            status: self.status,
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }

    /// Current state as a response, whether or not it was finished
    pub fn into_response(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}
