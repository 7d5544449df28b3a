use std::io;
use thiserror::Error;

use crate::http::response::{Response, StatusCode};

/// Expected handler failures, each mapped onto a response status.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("missing required header {0}")]
    MissingHeader(&'static str),
    #[error("header {0} has an invalid value")]
    InvalidHeader(&'static str),
    #[error("body has {actual} bytes, Content-Length announced {expected}")]
    IncompleteBody { expected: usize, actual: usize },
    #[error("no storage directory configured")]
    NoStorage,
    #[error("invalid file name in target {0:?}")]
    InvalidFileName(String),
    #[error("storage error: {0}")]
    Storage(#[from] io::Error),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::MissingHeader(_)
            | HandlerError::InvalidHeader(_)
            | HandlerError::IncompleteBody { .. } => StatusCode::BadRequest,
            HandlerError::NoStorage | HandlerError::InvalidFileName(_) => StatusCode::NotFound,
            HandlerError::Storage(e) => match e.kind() {
                io::ErrorKind::NotFound
                | io::ErrorKind::InvalidInput
                | io::ErrorKind::NotADirectory => StatusCode::NotFound,
                _ => StatusCode::InternalServerError,
            },
        }
    }
}

/// Collapses a handler result into a response, logging the failure.
pub(crate) fn respond(result: Result<Response, HandlerError>) -> Response {
    match result {
        Ok(response) => response,
        Err(e) => {
            let status = e.status();
            if status == StatusCode::InternalServerError {
                tracing::error!(error = %e, "Handler failed");
            } else {
                tracing::debug!(error = %e, status = status.as_u16(), "Handler rejected request");
            }
            Response::error(status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_by_kind() {
        let missing = HandlerError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(missing.status(), StatusCode::NotFound);

        let denied = HandlerError::from(io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert_eq!(denied.status(), StatusCode::InternalServerError);
    }

    #[test]
    fn respond_drops_error_detail() {
        let response = respond(Err(HandlerError::MissingHeader("User-Agent")));

        assert_eq!(response.status, StatusCode::BadRequest);
        assert!(response.headers.is_empty());
        assert!(response.body.is_empty());
    }
}
