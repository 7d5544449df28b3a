use std::sync::Arc;

use crate::http::request::Request;
use crate::http::response::Response;
use crate::storage::Storage;

/// Read-only state handed to every handler invocation.
#[derive(Debug, Clone, Default)]
pub struct HandlerContext {
    /// Backing store for the `/files` routes; `None` when no directory was configured.
    pub storage: Option<Arc<dyn Storage>>,
}

impl HandlerContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage: Some(storage),
        }
    }
}

/// Something that turns a request into a response.
///
/// Expected failures are reported through the response status; handlers do
/// not return errors. Plain functions and closures with the matching signature
/// implement this trait.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &Request, ctx: &HandlerContext) -> Response;
}

impl<F> Handler for F
where
    F: Fn(&Request, &HandlerContext) -> Response + Send + Sync,
{
    fn handle(&self, request: &Request, ctx: &HandlerContext) -> Response {
        self(request, ctx)
    }
}
