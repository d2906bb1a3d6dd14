use super::Middleware;
use crate::handler::SharedHandler;

/// A middleware built from a plain `Fn(SharedHandler) -> SharedHandler`
#[derive(Copy, Clone)]
pub struct MiddlewareFn<F> {
    f: F,
}

pub fn middleware_fn<F>(f: F) -> MiddlewareFn<F>
where
    F: Fn(SharedHandler) -> SharedHandler + Send + Sync,
{
    MiddlewareFn { f }
}

impl<F> Middleware for MiddlewareFn<F>
where
    F: Fn(SharedHandler) -> SharedHandler + Send + Sync,
{
    fn decorate(&self, next: SharedHandler) -> SharedHandler {
        (self.f)(next)
    }
}

impl<F> std::fmt::Debug for MiddlewareFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareFn").finish_non_exhaustive()
    }
}
