//! `/files` handlers backed by the configured [`Storage`](crate::storage::Storage).

use crate::handlers::error::{HandlerError, respond};
use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::routing::HandlerContext;
use crate::storage::{self, Storage};

const FILES_PREFIX: &str = "/files/";

/// Serves a stored file as `application/octet-stream`.
pub fn read_file(request: &Request, ctx: &HandlerContext) -> Response {
    respond(try_read_file(request, ctx))
}

/// Stores the first `Content-Length` body bytes under the target's file name.
pub fn create_file(request: &Request, ctx: &HandlerContext) -> Response {
    respond(try_create_file(request, ctx))
}

fn try_read_file(request: &Request, ctx: &HandlerContext) -> Result<Response, HandlerError> {
    let storage = storage_of(ctx)?;
    let name = file_name(&request.target)?;

    let contents = storage.read(name)?;

    Ok(ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "application/octet-stream")
        .body(contents)
        .build())
}

fn try_create_file(request: &Request, ctx: &HandlerContext) -> Result<Response, HandlerError> {
    let length = match request.header("Content-Length") {
        None => return Err(HandlerError::MissingHeader("Content-Length")),
        Some(_) => request
            .content_length()
            .ok_or(HandlerError::InvalidHeader("Content-Length"))?,
    };
    let contents = request.body.get(..length).ok_or(HandlerError::IncompleteBody {
        expected: length,
        actual: request.body.len(),
    })?;

    let storage = storage_of(ctx)?;
    let name = file_name(&request.target)?;

    storage.create(name, contents)?;
    tracing::info!(file = name, bytes = length, "File created");

    Ok(ResponseBuilder::new(StatusCode::Created).build())
}

fn storage_of(ctx: &HandlerContext) -> Result<&dyn Storage, HandlerError> {
    ctx.storage.as_deref().ok_or(HandlerError::NoStorage)
}

/// The single path segment following `/files/`.
fn file_name(target: &str) -> Result<&str, HandlerError> {
    target
        .strip_prefix(FILES_PREFIX)
        .filter(|name| storage::is_valid_name(name))
        .ok_or_else(|| HandlerError::InvalidFileName(target.to_string()))
}
