//! # Trailhead Router
//!
//! A verb-keyed route table for request dispatch:
//! - Path templates with named placeholders (`/users/:id`)
//! - Literal dots (`/feed.xml`) and an optional trailing query string
//! - Raw regex routes whose captures become positional `splat` values
//! - Override-by-order: when several routes match, the last registered wins
//!
//! The table is generic over the handler type so it carries no opinion about
//! what a handler is; the `trailhead` crate stores boxed closures in it.
//!
//! ## Example
//!
//! ```
//! use trailhead_router::{RouteTable, Verb};
//!
//! let mut table = RouteTable::new();
//! table.register(Verb::Get, "/hello/:name", "greeter").unwrap();
//! table.register(Verb::Get, "/hello/admin", "admin").unwrap();
//!
//! let found = table.lookup(Verb::Get, "/hello/world").unwrap();
//! assert_eq!(*found.route.handler(), "greeter");
//! assert_eq!(found.params().get_str("name"), Some("world"));
//!
//! // later registration shadows the earlier overlapping one
//! let found = table.lookup(Verb::Get, "/hello/admin").unwrap();
//! assert_eq!(*found.route.handler(), "admin");
//! ```

use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Module Declarations
// ============================================================================

mod error;
pub mod params;
pub mod route;
mod verb;

pub use error::RouterError;
pub use params::{ParamBag, ParamValue, SPLAT};
pub use route::pattern::{compile, CompiledPattern, PathSpec};
pub use verb::Verb;

// ============================================================================
// Core Types
// ============================================================================

/// A registered (verb, pattern, handler) triple
#[derive(Clone)]
pub struct Route<H> {
    verb: Verb,
    pattern: CompiledPattern,
    handler: H,
}

impl<H> Route<H> {
    pub fn new(verb: Verb, pattern: CompiledPattern, handler: H) -> Self {
        Self {
            verb,
            pattern,
            handler,
        }
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// Placeholder names bound to the leading captures
    pub fn param_names(&self) -> &[String] {
        self.pattern.param_names()
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<H> fmt::Debug for Route<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("verb", &self.verb)
            .field("pattern", &self.pattern.source())
            .field("param_names", &self.pattern.param_names())
            .finish()
    }
}

/// Result of looking a path up in the table
///
/// Captures are taken once, at selection time, and reused for parameter
/// extraction.
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    /// The matched route
    pub route: &'a Route<H>,
    /// Capture groups of the match, whole match excluded
    pub captures: Vec<Option<String>>,
}

impl<H> RouteMatch<'_, H> {
    /// Builds a fresh parameter bag from the captures
    pub fn params(&self) -> ParamBag {
        ParamBag::from_captures(self.route.param_names(), self.captures.iter().cloned())
    }
}

// ============================================================================
// Route Table
// ============================================================================

/// Verb → ordered list of routes
///
/// Insertion order is preserved per verb. Lookup scans in that order and the
/// last matching route wins.
pub struct RouteTable<H> {
    routes: HashMap<Verb, Vec<Route<H>>>,
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Compiles `spec` and appends the route to the verb's list
    pub fn register(
        &mut self,
        verb: Verb,
        spec: impl Into<PathSpec>,
        handler: H,
    ) -> Result<&Route<H>, RouterError> {
        let pattern = compile(spec)?;
        let list = self.routes.entry(verb).or_default();
        list.push(Route::new(verb, pattern, handler));
        // just pushed, so the list is non-empty
        Ok(&list[list.len() - 1])
    }

    /// Like [`register`](Self::register) with the verb given as text
    ///
    /// The verb is matched case-insensitively; anything outside
    /// GET/POST/PUT/DELETE fails with [`RouterError::InvalidVerb`].
    pub fn register_str(
        &mut self,
        verb: &str,
        spec: impl Into<PathSpec>,
        handler: H,
    ) -> Result<&Route<H>, RouterError> {
        let verb: Verb = verb.parse()?;
        self.register(verb, spec, handler)
    }

    /// Finds the last registered route for `verb` whose pattern matches `path`
    pub fn lookup(&self, verb: Verb, path: &str) -> Option<RouteMatch<'_, H>> {
        self.routes.get(&verb)?.iter().rev().find_map(|route| {
            route
                .pattern
                .captures(path)
                .map(|captures| RouteMatch { route, captures })
        })
    }

    /// Lookup with the verb given as text; an unknown verb simply finds nothing
    pub fn lookup_str(&self, verb: &str, path: &str) -> Option<RouteMatch<'_, H>> {
        let verb: Verb = verb.parse().ok()?;
        self.lookup(verb, path)
    }

    /// Routes registered for `verb`, in registration order
    pub fn routes(&self, verb: Verb) -> &[Route<H>] {
        self.routes.get(&verb).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Removes every route registered for `verb`, returning how many were dropped
    pub fn clear(&mut self, verb: Verb) -> usize {
        self.routes.remove(&verb).map(|list| list.len()).unwrap_or(0)
    }

    /// Removes the routes for `verb` registered with exactly `source`
    pub fn remove(&mut self, verb: Verb, source: &str) -> usize {
        let Some(list) = self.routes.get_mut(&verb) else {
            return 0;
        };
        let before = list.len();
        list.retain(|route| route.pattern.source() != source);
        before - list.len()
    }

    /// Total number of routes across all verbs
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for RouteTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for verb in Verb::ALL {
            let patterns: Vec<&str> = self
                .routes(verb)
                .iter()
                .map(|route| route.pattern.source())
                .collect();
            if !patterns.is_empty() {
                map.entry(&verb, &patterns);
            }
        }
        map.finish()
    }
}
