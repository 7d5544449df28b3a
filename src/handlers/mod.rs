//! Built-in request handlers and the default route table.
//!
//! | Method | Pattern       | Match  | Handler        |
//! |--------|---------------|--------|----------------|
//! | GET    | `/`           | exact  | [`root`]       |
//! | GET    | `/echo`       | prefix | [`echo`]       |
//! | GET    | `/user-agent` | exact  | [`user_agent`] |
//! | GET    | `/files`      | prefix | [`read_file`]  |
//! | POST   | `/files`      | prefix | [`create_file`]|

pub mod error;
pub mod files;

use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::routing::{HandlerContext, Match, Router};

pub use error::HandlerError;
pub use files::{create_file, read_file};

const ECHO_PREFIX: &str = "/echo/";

/// Builds the route table served by the binary.
pub fn default_router() -> Router {
    Router::new()
        .route(Method::GET, "/", Match::Exact, root)
        .route(Method::GET, "/echo", Match::Prefix, echo)
        .route(Method::GET, "/user-agent", Match::Exact, user_agent)
        .route(Method::GET, "/files", Match::Prefix, read_file)
        .route(Method::POST, "/files", Match::Prefix, create_file)
}

/// Empty 200.
pub fn root(_request: &Request, _ctx: &HandlerContext) -> Response {
    Response::new()
}

/// Echoes the target past `/echo/` as `text/plain`.
pub fn echo(request: &Request, _ctx: &HandlerContext) -> Response {
    let content = request
        .target
        .get(ECHO_PREFIX.len()..)
        .unwrap_or_default();

    Response::text(content)
}

/// Returns the `User-Agent` header verbatim.
pub fn user_agent(request: &Request, _ctx: &HandlerContext) -> Response {
    error::respond(
        request
            .header("User-Agent")
            .map(|agent| Response::text(agent))
            .ok_or(HandlerError::MissingHeader("User-Agent")),
    )
}
