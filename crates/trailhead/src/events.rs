// File: src/events.rs
// Purpose: Per-application lifecycle notifier

use std::fmt;
use std::sync::Arc;

use crate::app::{App, BoxedHandler};
use crate::request_context::RequestContext;
use trailhead_router::Route;

/// Names of the lifecycle points observers can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BeforeInit,
    BeforeLookupRoute,
    AfterLookupRoute,
    BeforeExecuteRoute,
    AfterExecuteRoute,
    RouteError,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::BeforeInit,
        EventKind::BeforeLookupRoute,
        EventKind::AfterLookupRoute,
        EventKind::BeforeExecuteRoute,
        EventKind::AfterExecuteRoute,
        EventKind::RouteError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::BeforeInit => "before_init",
            EventKind::BeforeLookupRoute => "before_lookup_route",
            EventKind::AfterLookupRoute => "after_lookup_route",
            EventKind::BeforeExecuteRoute => "before_execute_route",
            EventKind::AfterExecuteRoute => "after_execute_route",
            EventKind::RouteError => "route_error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle notification and its payload
pub enum Event<'a> {
    BeforeInit {
        app: &'a App,
    },
    BeforeLookupRoute {
        verb: &'a str,
        path: &'a str,
    },
    AfterLookupRoute {
        route: Option<&'a Route<BoxedHandler>>,
        verb: &'a str,
        path: &'a str,
    },
    BeforeExecuteRoute {
        app: &'a App,
        context: &'a RequestContext,
    },
    AfterExecuteRoute {
        context: &'a RequestContext,
    },
    RouteError {
        app: &'a App,
        error: &'a anyhow::Error,
        verb: &'a str,
        path: &'a str,
    },
}

impl Event<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::BeforeInit { .. } => EventKind::BeforeInit,
            Event::BeforeLookupRoute { .. } => EventKind::BeforeLookupRoute,
            Event::AfterLookupRoute { .. } => EventKind::AfterLookupRoute,
            Event::BeforeExecuteRoute { .. } => EventKind::BeforeExecuteRoute,
            Event::AfterExecuteRoute { .. } => EventKind::AfterExecuteRoute,
            Event::RouteError { .. } => EventKind::RouteError,
        }
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Event");
        out.field("kind", &self.kind());
        match self {
            Event::BeforeLookupRoute { verb, path } => {
                out.field("verb", verb).field("path", path);
            }
            Event::AfterLookupRoute { route, verb, path } => {
                out.field("route", route).field("verb", verb).field("path", path);
            }
            Event::RouteError { error, verb, path, .. } => {
                out.field("error", error).field("verb", verb).field("path", path);
            }
            _ => {}
        }
        out.finish()
    }
}

/// Callback invoked with every event of the kind it subscribed to
pub type Subscriber = Arc<dyn Fn(&Event<'_>) + Send + Sync>;

/// Handle returned by [`Notifier::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Named-event bus owned by one application
///
/// Publishing with no subscribers is a no-op. Subscribers for the same kind
/// run in subscription order. A subscriber that panics is not caught here.
#[derive(Default)]
pub struct Notifier {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, EventKind, Subscriber)>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: Fn(&Event<'_>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, kind, Arc::new(callback)));
        id
    }

    /// Returns whether a subscription was removed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    pub fn unsubscribe_all(&mut self) {
        self.subscribers.clear();
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers
            .iter()
            .filter(|(_, sub_kind, _)| *sub_kind == kind)
            .count()
    }

    pub fn publish(&self, event: &Event<'_>) {
        let kind = event.kind();
        for (_, _, callback) in self.subscribers.iter().filter(|(_, k, _)| *k == kind) {
            callback(event);
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
