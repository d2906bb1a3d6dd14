use crate::body::{BoxError, ReqBody, ResponseBody};
use crate::responder::Responder;
use async_trait::async_trait;
use http::{Request, Response, StatusCode};
use std::future::Future;
use std::sync::Arc;

/// The terminal of every route, and the unit middleware wraps.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn invoke(&self, req: Request<ReqBody>) -> Result<Response<ResponseBody>, BoxError>;
}

/// A handler shared between the route table and the chains built around it
pub type SharedHandler = Arc<dyn RequestHandler>;

/// a holder which turns any async `Fn(Request) -> impl Responder` into a [`RequestHandler`]
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Request<ReqBody>) -> Fut + Send + Sync,
    Fut: Future + Send,
    Fut::Output: Responder,
{
    FnHandler { f }
}

impl<F> std::fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> RequestHandler for FnHandler<F>
where
    F: Fn(Request<ReqBody>) -> Fut + Send + Sync,
    Fut: Future + Send,
    Fut::Output: Responder,
{
    async fn invoke(&self, req: Request<ReqBody>) -> Result<Response<ResponseBody>, BoxError> {
        let responder = (self.f)(req).await;
        Ok(responder.into_response())
    }
}

pub(crate) fn not_found_handler() -> SharedHandler {
    Arc::new(handler_fn(|_req| async { (StatusCode::NOT_FOUND, "404 page not found\n") }))
}
