// File: src/host.rs
// Purpose: Adapts axum requests into dispatches against a shared application

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use tracing::error;
use trailhead::{App, Environment};

use crate::method_override;

/// Application state shared across requests
#[derive(Clone)]
pub struct HostState {
    app: Arc<App>,
}

/// Every request, whatever its path or method, goes through the app's routes
pub fn router(app: Arc<App>) -> Router {
    Router::new()
        .fallback(dispatch_handler)
        .with_state(HostState { app })
}

/// Builds the environment the dispatcher sees for one request
pub fn environment(method: &Method, uri: &Uri, headers: HeaderMap, body: Bytes) -> Environment {
    let verb = method_override::resolve(method, &headers, &body);
    let uri = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    Environment::new(verb, uri).with_headers(headers).body(body)
}

async fn dispatch_handler(
    State(state): State<HostState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let env = environment(&method, &uri, headers, body);
    let app = state.app.clone();

    match tokio::task::spawn_blocking(move || app.handle(env)).await {
        Ok(Ok(response)) => response.into_response(),
        Ok(Err(e)) => {
            error!("{} {} failed: {}", method, uri, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
        Err(e) => {
            error!("{} {} panicked: {}", method, uri, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn error_response(status: StatusCode, title: &str) -> Response {
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{title}</title></head>
<body>
  <h1>{status}</h1>
  <a href="/">Go Home</a>
</body>
</html>"#,
        title = title,
        status = status
    );
    (status, Html(html)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    fn app() -> Arc<App> {
        let app = App::builder()
            .init(|app| {
                app.get("/hello/:name", |ctx| {
                    let name = ctx.param("name").unwrap_or_default().to_string();
                    Ok(Some(ctx.text(&format!("Hello, {}!", name))?))
                })?;
                app.delete("/posts/:id", |ctx| {
                    let id = ctx.param("id").unwrap_or_default().to_string();
                    Ok(Some(ctx.text(&format!("deleted {}", id))?))
                })?;
                app.get("/boom", |_ctx| Err(anyhow::anyhow!("boom")))?;
                Ok(())
            })
            .unwrap();
        Arc::new(app)
    }

    async fn send(request: Request<Body>) -> (StatusCode, String) {
        let response = router(app()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_environment_keeps_path_and_query() {
        let uri: Uri = "/search?q=rust".parse().unwrap();
        let env = environment(&Method::GET, &uri, HeaderMap::new(), Bytes::new());
        assert_eq!(env.method(), "GET");
        assert_eq!(env.uri(), "/search?q=rust");
    }

    #[tokio::test]
    async fn test_dispatches_to_app() {
        let request = Request::get("/hello/world").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Hello, world!");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let request = Request::get("/nope").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "No route found that matches 'GET: /nope'");
    }

    #[tokio::test]
    async fn test_form_method_override_reaches_delete_route() {
        let request = Request::post("/posts/9")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("_method=DELETE"))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "deleted 9");
    }

    #[tokio::test]
    async fn test_handler_error_is_500() {
        let request = Request::get("/boom").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("Internal Server Error"));
    }
}
