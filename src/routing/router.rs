//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store routes in registration order
//! - Look up the first route matching a request
//! - Invoke it, or answer 404 when nothing matches
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan; the route table is small
//! - Registration order beats specificity

use std::fmt;

use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::routing::handler::{Handler, HandlerContext};
use crate::routing::matcher::Match;

/// One entry in the route table.
pub struct Route {
    pub method: Method,
    pub pattern: String,
    pub kind: Match,
    handler: Box<dyn Handler>,
}

impl Route {
    pub fn new(
        method: Method,
        pattern: impl Into<String>,
        kind: Match,
        handler: impl Handler + 'static,
    ) -> Self {
        Self {
            method,
            pattern: pattern.into(),
            kind,
            handler: Box::new(handler),
        }
    }

    /// Returns true if this route accepts `request`.
    pub fn matches(&self, request: &Request) -> bool {
        self.method == request.method && self.kind.matches(&request.target, &self.pattern)
    }

    pub fn handle(&self, request: &Request, ctx: &HandlerContext) -> Response {
        self.handler.handle(request, ctx)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// An ordered route table.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route. Earlier routes take precedence.
    pub fn route(
        mut self,
        method: Method,
        pattern: impl Into<String>,
        kind: Match,
        handler: impl Handler + 'static,
    ) -> Self {
        self.routes.push(Route::new(method, pattern, kind, handler));
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Returns the first route accepting `request`.
    pub fn find(&self, request: &Request) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(request))
    }

    /// Runs the first matching handler, or returns an empty 404.
    pub fn dispatch(&self, request: &Request, ctx: &HandlerContext) -> Response {
        match self.find(request) {
            Some(route) => {
                tracing::debug!(
                    method = %request.method,
                    target = %request.target,
                    pattern = %route.pattern,
                    "Route matched"
                );
                route.handle(request, ctx)
            }
            None => Response::error(StatusCode::NotFound),
        }
    }
}
