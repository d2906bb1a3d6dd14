use super::Middleware;
use crate::body::{BoxError, ReqBody, ResponseBody};
use crate::handler::{RequestHandler, SharedHandler};
use async_trait::async_trait;
use http::{Request, Response};
use std::future::Future;
use std::sync::Arc;

/// Creates a middleware from an async function receiving the request and the rest of the chain.
///
/// The function decides whether and when to call [`Next::run`]; returning without calling it
/// short-circuits the chain.
pub fn from_fn<F, Fut>(f: F) -> FromFn<F>
where
    F: Fn(Request<ReqBody>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response<ResponseBody>, BoxError>> + Send,
{
    FromFn { f: Arc::new(f) }
}

pub struct FromFn<F> {
    f: Arc<F>,
}

/// The remainder of a middleware chain
#[derive(Clone)]
pub struct Next {
    inner: SharedHandler,
}

impl Next {
    pub async fn run(self, req: Request<ReqBody>) -> Result<Response<ResponseBody>, BoxError> {
        self.inner.invoke(req).await
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

impl<F> std::fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FromFn").finish_non_exhaustive()
    }
}

impl<F, Fut> Middleware for FromFn<F>
where
    F: Fn(Request<ReqBody>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response<ResponseBody>, BoxError>> + Send,
{
    fn decorate(&self, next: SharedHandler) -> SharedHandler {
        Arc::new(FromFnHandler { f: Arc::clone(&self.f), next: Next { inner: next } })
    }
}

struct FromFnHandler<F> {
    f: Arc<F>,
    next: Next,
}

#[async_trait]
impl<F, Fut> RequestHandler for FromFnHandler<F>
where
    F: Fn(Request<ReqBody>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response<ResponseBody>, BoxError>> + Send,
{
    async fn invoke(&self, req: Request<ReqBody>) -> Result<Response<ResponseBody>, BoxError> {
        (self.f)(req, self.next.clone()).await
    }
}
