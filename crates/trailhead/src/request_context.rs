// File: src/request_context.rs
// Purpose: Per-dispatch context a route handler reads params from and writes its response through

use axum::http::header::CONTENT_TYPE;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use trailhead_router::{ParamBag, Verb};

use crate::error::Result;
use crate::renderer::{RenderOptions, TemplateEngine};
use crate::request::{Environment, Request};
use crate::response::{Response, ResponseWriter};
use crate::session::{Flash, Session};
use crate::template_loader::TemplateLoader;
use crate::value::Value;

/// Settings the dispatcher hands to each new context
#[derive(Debug, Clone)]
pub struct ContextOptions {
    pub verb: Verb,
    pub params: ParamBag,
    /// Layout view name; empty for none
    pub layout: String,
    pub views_root: PathBuf,
}

/// Outcome of [`RequestContext::render_view`]
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// The view was written and the response finalized
    Finished(Response),
    /// The rendered text, response left untouched
    Raw(String),
}

impl Rendered {
    pub fn into_response(self) -> Option<Response> {
        match self {
            Rendered::Finished(response) => Some(response),
            Rendered::Raw(_) => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Rendered::Finished(_) => None,
            Rendered::Raw(text) => Some(text),
        }
    }
}

/// Request context passed to route handlers
///
/// Created right before the handler runs and dropped once the dispatch ends.
pub struct RequestContext {
    env: Arc<Environment>,
    request: Request,
    response: ResponseWriter,

    /// Verb the route was matched for
    pub verb: Verb,

    /// Path captures merged with query/body params
    pub params: ParamBag,

    pub session: Session,

    /// Parsed cookies
    pub cookies: HashMap<String, String>,

    layout: String,
    loader: TemplateLoader,
    engine: Arc<dyn TemplateEngine>,
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("verb", &self.verb)
            .field("uri", &self.env.uri())
            .field("params", &self.params)
            .finish()
    }
}

impl RequestContext {
    /// Create a new request context
    pub fn new(
        env: Arc<Environment>,
        request: Request,
        response: ResponseWriter,
        options: ContextOptions,
        session: Session,
        engine: Arc<dyn TemplateEngine>,
    ) -> Self {
        let cookies = request.cookies().clone();

        Self {
            env,
            request,
            response,
            verb: options.verb,
            params: options.params,
            session,
            cookies,
            layout: options.layout,
            loader: TemplateLoader::new(options.views_root),
            engine,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The response under construction, for setting status or headers
    pub fn response(&mut self) -> &mut ResponseWriter {
        &mut self.response
    }

    pub fn flash(&self) -> &Flash {
        self.session.flash()
    }

    pub fn flash_mut(&mut self) -> &mut Flash {
        self.session.flash_mut()
    }

    /// Single-string parameter by name
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get_str(name)
    }

    pub fn get_cookie(&self, name: &str) -> Option<&String> {
        self.cookies.get(name)
    }

    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.env.get_header(name)
    }

    /// Writes `body` and finalizes the response
    pub fn text(&mut self, body: &str) -> Result<Response> {
        self.response.write(body)?;
        self.response.finish()
    }

    /// Serializes `value` as the JSON body and finalizes the response
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<Response> {
        let body = serde_json::to_string(value)?;
        self.response.set_header(CONTENT_TYPE.as_str(), "application/json");
        self.response.write(&body)?;
        self.response.finish()
    }

    /// Redirects to `uri` and finalizes the response
    pub fn redirect(&mut self, uri: &str) -> Result<Response> {
        self.response.redirect(uri)?;
        self.response.finish()
    }

    /// Renders the view `name` against a copy of `model`
    ///
    /// The view is read from `<views_root>/<name>.html.json`. Unless
    /// `options.should_finish_response` is false, the output is written and
    /// the response finalized. `model` itself is never modified.
    pub fn render_view(&mut self, name: &str, model: &Value, options: RenderOptions) -> Result<Rendered> {
        let data = Value::view_data(model);
        let template = self.loader.load(name)?;
        let mut html = self.engine.expand(&template, &data, &options)?;

        if options.use_layout && !self.layout.is_empty() {
            let layout = self.loader.load(&self.layout)?;
            let mut layout_data = data;
            layout_data.insert(
                "slots",
                Value::Object(HashMap::from([("content".to_string(), Value::String(html))])),
            );
            html = self.engine.expand(&layout, &layout_data, &options)?;
        }

        if !options.should_finish_response {
            return Ok(Rendered::Raw(html));
        }

        self.response.write(&html)?;
        self.response.finish().map(Rendered::Finished)
    }

    /// [`render_view`](Self::render_view) with default options
    pub fn view(&mut self, name: &str, model: &Value) -> Result<Response> {
        match self.render_view(name, model, RenderOptions::default())? {
            Rendered::Finished(response) => Ok(response),
            Rendered::Raw(html) => self.text(&html),
        }
    }

    /// Splits the context into the pieces the dispatcher finalizes
    pub(crate) fn into_parts(self) -> (Session, ResponseWriter) {
        (self.session, self.response)
    }
}
