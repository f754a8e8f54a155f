// File: src/app.rs
// Purpose: Application object: route registration, lifecycle notifier and request dispatch

use axum::http::StatusCode;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};
use trailhead_router::{PathSpec, Route, RouteTable, Verb};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::{Event, EventKind, Notifier, SubscriptionId};
use crate::renderer::{Renderer, TemplateEngine};
use crate::request::{Environment, Request};
use crate::request_context::{ContextOptions, RequestContext};
use crate::response::{Response, ResponseWriter};
use crate::session::{MemorySessionStore, SessionStore};

/// What a route handler returns: an explicit response, or `None` to let the
/// dispatcher finalize whatever was written through the context
pub type HandlerResult = anyhow::Result<Option<Response>>;

/// A route handler
///
/// Implemented for every `Fn(&mut RequestContext) -> HandlerResult`.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: &mut RequestContext) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
{
    fn call(&self, ctx: &mut RequestContext) -> HandlerResult {
        self(ctx)
    }
}

pub type BoxedHandler = Arc<dyn Handler>;

/// A routed web application
///
/// Routes are registered through `&mut App` during setup; once built the app
/// is shared read-only (e.g. behind an `Arc`) and every dispatch is independent.
pub struct App {
    name: String,
    routes: RouteTable<BoxedHandler>,
    notifier: Notifier,
    layout: String,
    views_root: PathBuf,
    sessions: Arc<dyn SessionStore>,
    engine: Arc<dyn TemplateEngine>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("name", &self.name)
            .field("routes", &self.routes)
            .field("notifier", &self.notifier)
            .field("layout", &self.layout)
            .field("views_root", &self.views_root)
            .finish()
    }
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> &str {
        &self.layout
    }

    pub fn views_root(&self) -> &Path {
        &self.views_root
    }

    pub fn routes(&self) -> &RouteTable<BoxedHandler> {
        &self.routes
    }

    // -- Registration --

    /// Registers `handler` for a verb given as text (case-insensitive)
    ///
    /// Fails with [`RouterError::InvalidVerb`](trailhead_router::RouterError::InvalidVerb)
    /// for anything outside GET/POST/PUT/DELETE.
    pub fn route<F>(&mut self, verb: &str, spec: impl Into<PathSpec>, handler: F) -> Result<&Route<BoxedHandler>>
    where
        F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
    {
        let verb: Verb = verb.parse()?;
        self.register_handler(verb, spec, handler)
    }

    /// Registers any [`Handler`] implementation
    pub fn register_handler(
        &mut self,
        verb: Verb,
        spec: impl Into<PathSpec>,
        handler: impl Handler,
    ) -> Result<&Route<BoxedHandler>> {
        let handler: BoxedHandler = Arc::new(handler);
        let route = self.routes.register(verb, spec, handler)?;
        debug!("Registered route {} {}", verb, route.pattern());
        Ok(route)
    }

    pub fn get<F>(&mut self, spec: impl Into<PathSpec>, handler: F) -> Result<&Route<BoxedHandler>>
    where
        F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
    {
        self.register_handler(Verb::Get, spec, handler)
    }

    pub fn post<F>(&mut self, spec: impl Into<PathSpec>, handler: F) -> Result<&Route<BoxedHandler>>
    where
        F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
    {
        self.register_handler(Verb::Post, spec, handler)
    }

    pub fn put<F>(&mut self, spec: impl Into<PathSpec>, handler: F) -> Result<&Route<BoxedHandler>>
    where
        F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
    {
        self.register_handler(Verb::Put, spec, handler)
    }

    pub fn delete<F>(&mut self, spec: impl Into<PathSpec>, handler: F) -> Result<&Route<BoxedHandler>>
    where
        F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
    {
        self.register_handler(Verb::Delete, spec, handler)
    }

    /// Drops every route for `verb`
    pub fn unregister_all(&mut self, verb: Verb) -> usize {
        let removed = self.routes.clear(verb);
        debug!("Unregistered {} route(s) for {}", removed, verb);
        removed
    }

    /// Drops the routes for `verb` registered with exactly `source`
    pub fn remove_route(&mut self, verb: Verb, source: &str) -> usize {
        self.routes.remove(verb, source)
    }

    // -- Lifecycle --

    pub fn subscribe<F>(&mut self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: Fn(&Event<'_>) + Send + Sync + 'static,
    {
        self.notifier.subscribe(kind, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    // -- Dispatch --

    /// Host entry point
    ///
    /// Rejects an unusable environment before any lifecycle event fires, then
    /// dispatches the upper-cased method against the request URI.
    pub fn handle(&self, env: Environment) -> Result<Response> {
        env.validate()?;
        let verb = env.method().to_ascii_uppercase();
        let path = env.uri().to_string();
        self.dispatch(&verb, &path, Arc::new(env))
    }

    /// Routes one request to its handler
    ///
    /// An unmatched verb/path produces a 404 response, not an error. A handler
    /// error is published as [`Event::RouteError`] and returned unchanged as
    /// [`Error::Handler`].
    pub fn dispatch(&self, verb: &str, path: &str, env: Arc<Environment>) -> Result<Response> {
        let span = tracing::info_span!("dispatch", app = %self.name, verb = %verb, path = %path);
        let _guard = span.enter();

        self.notifier.publish(&Event::BeforeLookupRoute { verb, path });
        let found = self.routes.lookup_str(verb, path);
        self.notifier.publish(&Event::AfterLookupRoute {
            route: found.as_ref().map(|m| m.route),
            verb,
            path,
        });

        let Some(found) = found else {
            info!("No route found for {} {}", verb, path);
            return not_found(verb, path);
        };
        debug!("Matched route {}", found.route.pattern());

        let mut params = found.params();
        let request = Request::from_environment(&env);
        params.merge(request.params());

        let options = ContextOptions {
            verb: found.route.verb(),
            params,
            layout: self.layout.clone(),
            views_root: self.views_root.clone(),
        };
        let session = self.sessions.load(&env);
        let mut ctx = RequestContext::new(
            env,
            request,
            ResponseWriter::new(),
            options,
            session,
            self.engine.clone(),
        );

        self.notifier.publish(&Event::BeforeExecuteRoute {
            app: self,
            context: &ctx,
        });

        let returned = match found.route.handler().call(&mut ctx) {
            Ok(returned) => returned,
            Err(err) => {
                error!("Route {} {} failed: {:#}", verb, path, err);
                self.notifier.publish(&Event::RouteError {
                    app: self,
                    error: &err,
                    verb,
                    path,
                });
                return Err(Error::Handler(err));
            }
        };

        self.notifier.publish(&Event::AfterExecuteRoute { context: &ctx });

        let (session, mut writer) = ctx.into_parts();
        let mut response = match returned {
            Some(response) => response,
            None if writer.is_finished() => writer.into_response(),
            None => writer.finish()?,
        };
        self.sessions.commit(session, &mut response);

        Ok(response)
    }
}

fn not_found(verb: &str, path: &str) -> Result<Response> {
    let mut writer = ResponseWriter::new();
    writer.set_status(StatusCode::NOT_FOUND);
    writer.write(&format!("No route found that matches '{}: {}'", verb, path))?;
    writer.finish()
}

// ============================================================================
// Builder
// ============================================================================

/// Collects application options before routes are registered
pub struct AppBuilder {
    name: String,
    layout: String,
    views_root: PathBuf,
    cookie_name: String,
    sessions: Option<Arc<dyn SessionStore>>,
    engine: Option<Arc<dyn TemplateEngine>>,
    notifier: Notifier,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded from the `[app]` and `[session]` sections
    pub fn from_config(config: &Config) -> Self {
        Self {
            name: config.app.name.clone(),
            layout: config.app.layout.clone(),
            views_root: PathBuf::from(&config.app.views_root),
            cookie_name: config.session.cookie_name.clone(),
            sessions: None,
            engine: None,
            notifier: Notifier::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// View wrapped around every rendered view; empty for none
    pub fn layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    pub fn views_root(mut self, views_root: impl Into<PathBuf>) -> Self {
        self.views_root = views_root.into();
        self
    }

    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(store);
        self
    }

    pub fn template_engine(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Subscribes before the app exists, so `before_init` can be observed
    pub fn subscribe<F>(mut self, kind: EventKind, callback: F) -> Self
    where
        F: Fn(&Event<'_>) + Send + Sync + 'static,
    {
        self.notifier.subscribe(kind, callback);
        self
    }

    /// Builds the app and publishes `before_init`
    pub fn build(self) -> App {
        let sessions: Arc<dyn SessionStore> = match self.sessions {
            Some(store) => store,
            None => Arc::new(MemorySessionStore::new(self.cookie_name)),
        };
        let engine: Arc<dyn TemplateEngine> = match self.engine {
            Some(engine) => engine,
            None => Arc::new(Renderer::new()),
        };

        let app = App {
            name: self.name,
            routes: RouteTable::new(),
            notifier: self.notifier,
            layout: self.layout,
            views_root: self.views_root,
            sessions,
            engine,
        };

        app.notifier.publish(&Event::BeforeInit { app: &app });
        info!("Application '{}' initialized", app.name);
        app
    }

    /// Builds the app, then runs `init` to register its routes
    pub fn init<F>(self, init: F) -> Result<App>
    where
        F: FnOnce(&mut App) -> Result<()>,
    {
        let mut app = self.build();
        init(&mut app)?;
        info!("Application '{}' registered {} route(s)", app.name, app.routes.len());
        Ok(app)
    }
}
