// Trailhead - verb/path request dispatch
// Routes requests to handlers and gives each dispatch its own context

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod renderer;
pub mod request;
pub mod request_context;
pub mod response;
pub mod session;
pub mod template_loader;
pub mod value;

// Re-export framework types
pub use app::{App, AppBuilder, BoxedHandler, Handler, HandlerResult};
pub use config::Config;
pub use error::{Error, Result};
pub use events::{Event, EventKind, Notifier, Subscriber, SubscriptionId};
pub use renderer::{RenderOptions, Renderer, TemplateEngine};
pub use request::{Environment, Request};
pub use request_context::{ContextOptions, RequestContext, Rendered};
pub use response::{Response, ResponseWriter};
pub use session::{Flash, MemorySessionStore, Session, SessionStore};
pub use template_loader::TemplateLoader;
pub use value::Value;

// Re-export routing primitives
pub use trailhead_router::{ParamBag, ParamValue, PathSpec, Route, RouterError, Verb};

// Re-export commonly used types from dependencies
pub use axum;
pub use axum::http::StatusCode;
