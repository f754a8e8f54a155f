// File: src/demo.rs
// Purpose: Demo application served by the reference host

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use tracing::warn;
use trailhead::{App, AppBuilder, Config, Event, EventKind, HandlerResult, RequestContext, Result, Value};

/// Builds the demo app from configuration
pub fn build(config: &Config) -> Result<App> {
    AppBuilder::from_config(config)
        .subscribe(EventKind::RouteError, |event| {
            if let Event::RouteError { verb, path, error, .. } = event {
                warn!("Route error on {} {}: {}", verb, path, error);
            }
        })
        .init(|app| {
            app.get("/", index)?;
            app.get("/hello/:name", hello)?;
            app.get(&*FILES, files)?;
            app.get("/api/status", status)?;
            app.post("/messages", leave_message)?;
            app.delete("/messages", forget)?;
            Ok(())
        })
}

static FILES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/files/(.*)$").unwrap());

/// Page model with the fields the layout expects
fn page(ctx: &RequestContext, title: &str, fields: serde_json::Value) -> Value {
    let mut model = Value::from(fields);
    model.insert("title", title);
    model.insert(
        "notice",
        ctx.flash().get("notice").map(Value::from).unwrap_or(Value::Null),
    );
    model
}

fn index(ctx: &mut RequestContext) -> HandlerResult {
    let visits = ctx.session.get_as::<u64>("visits").unwrap_or(0) + 1;
    ctx.session.set("visits", visits);

    let model = page(ctx, "Trailhead", json!({ "visits": visits }));
    Ok(Some(ctx.view("index", &model)?))
}

fn hello(ctx: &mut RequestContext) -> HandlerResult {
    let name = ctx.param("name").unwrap_or("stranger").to_string();
    let model = page(ctx, "Hello", json!({ "name": name }));
    Ok(Some(ctx.view("hello", &model)?))
}

fn files(ctx: &mut RequestContext) -> HandlerResult {
    let path = ctx
        .params
        .splat()
        .map(|splat| splat.as_slice().join("/"))
        .unwrap_or_default();
    Ok(Some(ctx.text(&format!("file: {}", path))?))
}

fn status(ctx: &mut RequestContext) -> HandlerResult {
    let visits = ctx.session.get_as::<u64>("visits").unwrap_or(0);
    Ok(Some(ctx.json(&json!({ "status": "ok", "visits": visits }))?))
}

fn leave_message(ctx: &mut RequestContext) -> HandlerResult {
    let message = ctx.param("message").unwrap_or_default().trim().to_string();
    if message.is_empty() {
        ctx.flash_mut().set("notice", "Nothing to say?");
    } else {
        ctx.flash_mut().set("notice", format!("You said: {}", message));
    }
    Ok(Some(ctx.redirect("/")?))
}

fn forget(ctx: &mut RequestContext) -> HandlerResult {
    ctx.session.clear();
    ctx.flash_mut().set("notice", "Session cleared");
    Ok(Some(ctx.redirect("/")?))
}
