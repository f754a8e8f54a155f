// File: src/request.rs
// Purpose: Host-supplied environment, plus the query/body params and cookies parsed from it

use axum::body::Bytes;
use axum::http::header::{HeaderName, CONTENT_TYPE, COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Everything the host knows about one request
#[derive(Debug, Clone, Default)]
pub struct Environment {
    method: String,
    uri: String,
    headers: HeaderMap,
    body: Bytes,
}

impl Environment {
    /// `uri` is the request target relative to the application: path plus optional `?query`
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Adds a header; names or values that are not valid HTTP are skipped
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Request method exactly as the host supplied it
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Path plus query string
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Path without the query string
    pub fn path(&self) -> &str {
        self.uri.split_once('?').map_or(self.uri.as_str(), |(path, _)| path)
    }

    /// Raw query string, without the leading `?`
    pub fn query_string(&self) -> Option<&str> {
        self.uri.split_once('?').map(|(_, query)| query)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    /// Checks the environment is complete enough to dispatch
    pub fn validate(&self) -> Result<()> {
        if self.method.trim().is_empty() {
            return Err(Error::InvalidEnvironment("missing request method".into()));
        }
        if !self.uri.starts_with('/') {
            return Err(Error::InvalidEnvironment(format!(
                "request path must start with '/': {:?}",
                self.uri
            )));
        }
        Ok(())
    }
}

/// Parameters and cookies the raw request carries
#[derive(Debug, Clone, Default)]
pub struct Request {
    query: HashMap<String, String>,
    body: HashMap<String, String>,
    json: Option<JsonValue>,
    cookies: HashMap<String, String>,
}

impl Request {
    /// Parses query string, form or JSON body, and the Cookie header
    pub fn from_environment(env: &Environment) -> Self {
        let query = env.query_string().map(parse_urlencoded).unwrap_or_default();
        let content_type = env.get_header(CONTENT_TYPE.as_str()).unwrap_or("");

        let (body, json) = if content_type.starts_with("application/x-www-form-urlencoded") {
            let raw = String::from_utf8_lossy(env.body_bytes());
            (parse_urlencoded(&raw), None)
        } else if content_type.starts_with("application/json") && !env.body_bytes().is_empty() {
            match serde_json::from_slice::<JsonValue>(env.body_bytes()) {
                Ok(json) => (json_fields(&json), Some(json)),
                Err(e) => {
                    tracing::debug!("Ignoring unparseable JSON body: {}", e);
                    (HashMap::new(), None)
                }
            }
        } else {
            (HashMap::new(), None)
        };

        Self {
            query,
            body,
            json,
            cookies: parse_cookies(env.headers()),
        }
    }

    /// Query and body params merged, body winning on collisions
    pub fn params(&self) -> HashMap<String, String> {
        let mut merged = self.query.clone();
        merged.extend(self.body.clone());
        merged
    }

    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Form or JSON object fields
    pub fn form(&self) -> &HashMap<String, String> {
        &self.body
    }

    /// Raw JSON body if one was sent
    pub fn json(&self) -> Option<&JsonValue> {
        self.json.as_ref()
    }

    pub fn cookies(&self) -> &HashMap<String, String> {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

/// Parse cookies from Cookie header
pub fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    let mut cookies = HashMap::new();

    for cookie_header in headers.get_all(COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some((key, value)) = cookie.split_once('=') {
                    cookies.insert(key.to_string(), value.to_string());
                }
            }
        }
    }

    cookies
}

/// Decodes `a=1&b=two+words` pairs; a key without `=` maps to an empty string
pub fn parse_urlencoded(input: &str) -> HashMap<String, String> {
    input
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

fn json_fields(json: &JsonValue) -> HashMap<String, String> {
    let JsonValue::Object(map) = json else {
        return HashMap::new();
    };

    map.iter()
        .map(|(key, value)| {
            let value = value.as_str().map_or_else(|| value.to_string(), str::to_string);
            (key.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_path_and_query_split() {
        let env = Environment::new("GET", "/search?q=rust&page=2");
        assert_eq!(env.path(), "/search");
        assert_eq!(env.query_string(), Some("q=rust&page=2"));
        assert_eq!(Environment::new("GET", "/").query_string(), None);
    }

    #[test]
    fn test_validate() {
        assert!(Environment::new("GET", "/").validate().is_ok());
        assert!(matches!(
            Environment::new("", "/").validate(),
            Err(Error::InvalidEnvironment(_))
        ));
        assert!(matches!(
            Environment::new("GET", "relative").validate(),
            Err(Error::InvalidEnvironment(_))
        ));
    }

    #[test]
    fn test_query_params_are_decoded() {
        let env = Environment::new("GET", "/?name=big+world&city=S%C3%A3o%20Paulo&flag");
        let request = Request::from_environment(&env);
        assert_eq!(request.query().get("name"), Some(&"big world".to_string()));
        assert_eq!(request.query().get("city"), Some(&"São Paulo".to_string()));
        assert_eq!(request.query().get("flag"), Some(&String::new()));
    }

    #[test]
    fn test_form_body_overrides_query() {
        let env = Environment::new("POST", "/items?id=1&sort=asc")
            .header("content-type", "application/x-www-form-urlencoded")
            .body("id=2&title=Hello+there");
        let params = Request::from_environment(&env).params();
        assert_eq!(params.get("id"), Some(&"2".to_string()));
        assert_eq!(params.get("sort"), Some(&"asc".to_string()));
        assert_eq!(params.get("title"), Some(&"Hello there".to_string()));
    }

    #[test]
    fn test_json_body_fields() {
        let env = Environment::new("PUT", "/items/1")
            .header("content-type", "application/json")
            .body(r#"{"name":"Alice","age":30,"active":true}"#);
        let request = Request::from_environment(&env);
        assert_eq!(request.form().get("name"), Some(&"Alice".to_string()));
        assert_eq!(request.form().get("age"), Some(&"30".to_string()));
        assert!(request.json().is_some());
    }

    #[test]
    fn test_invalid_json_body_is_ignored() {
        let env = Environment::new("POST", "/")
            .header("content-type", "application/json")
            .body("{not json");
        let request = Request::from_environment(&env);
        assert!(request.form().is_empty());
        assert!(request.json().is_none());
    }

    #[test]
    fn test_cookies() {
        let env = Environment::new("GET", "/").header("cookie", "session=abc123; user=john");
        let request = Request::from_environment(&env);
        assert_eq!(request.cookie("session"), Some("abc123"));
        assert_eq!(request.cookie("user"), Some("john"));
        assert_eq!(request.cookies().len(), 2);
    }
}
