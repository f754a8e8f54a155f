// File: src/method_override.rs
// Purpose: Lets HTML forms reach PUT/DELETE routes through POST

use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method};
use trailhead::request::parse_urlencoded;

/// Header a client sets to tunnel a verb through POST
pub const OVERRIDE_HEADER: &str = "x-http-method-override";

/// Form field carrying the tunneled verb
pub const OVERRIDE_FIELD: &str = "_method";

const ALLOWED: [&str; 6] = ["GET", "HEAD", "PUT", "POST", "DELETE", "OPTIONS"];

/// The verb the dispatcher should see for this request
///
/// Only a `POST` is rewritten. The `_method` form field is checked before
/// the override header; values outside the allowed set are ignored.
pub fn resolve(method: &Method, headers: &HeaderMap, body: &Bytes) -> String {
    if *method != Method::POST {
        return method.as_str().to_string();
    }

    let from_form = is_form(headers)
        .then(|| parse_urlencoded(&String::from_utf8_lossy(body)))
        .and_then(|mut fields| fields.remove(OVERRIDE_FIELD));
    let from_header = headers
        .get(OVERRIDE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    from_form
        .or(from_header)
        .map(|verb| verb.trim().to_ascii_uppercase())
        .filter(|verb| ALLOWED.contains(&verb.as_str()))
        .unwrap_or_else(|| Method::POST.as_str().to_string())
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}
