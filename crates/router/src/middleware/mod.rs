//! Middleware: transformations from one handler into another.
//!
//! A chain `[m1, m2, m3]` around a handler `h` becomes `m1(m2(m3(h)))`, so `m1` sees the
//! request first and the response last. The router composes the global list, the group
//! list and the route's own list once, at registration, and stores the result.

mod from_fn;
mod middleware_fn;

use crate::handler::SharedHandler;
use std::sync::Arc;

pub use from_fn::{FromFn, Next, from_fn};
pub use middleware_fn::{MiddlewareFn, middleware_fn};

pub trait Middleware: Send + Sync {
    fn decorate(&self, next: SharedHandler) -> SharedHandler;
}

pub type SharedMiddleware = Arc<dyn Middleware>;

/// Erases a middleware so it can be stored in a route's list
pub fn shared<M: Middleware + 'static>(middleware: M) -> SharedMiddleware {
    Arc::new(middleware)
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn decorate(&self, next: SharedHandler) -> SharedHandler {
        (**self).decorate(next)
    }
}

/// Wraps `handler` so that the first middleware yielded is the outermost one
pub(crate) fn compose<'m, I>(middlewares: I, handler: SharedHandler) -> SharedHandler
where
    I: IntoIterator<Item = &'m SharedMiddleware>,
    I::IntoIter: DoubleEndedIterator,
{
    middlewares.into_iter().rev().fold(handler, |next, middleware| middleware.decorate(next))
}

#[cfg(test)]
mod tests {
    use super::{SharedMiddleware, compose, from_fn, shared};
    use crate::body::empty_req_body;
    use crate::handler::{SharedHandler, handler_fn};
    use http::Request;
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Events = Arc<Mutex<Vec<String>>>;

    fn recording(name: &'static str, events: &Events) -> SharedMiddleware {
        let events = Arc::clone(events);
        shared(from_fn(move |req, next| {
            let events = Arc::clone(&events);
            async move {
                events.lock().push(format!("{name}-before"));
                let response = next.run(req).await;
                events.lock().push(format!("{name}-after"));
                response
            }
        }))
    }

    #[tokio::test]
    async fn first_middleware_is_outermost() {
        let events = Events::default();
        let handler_events = Arc::clone(&events);
        let handler: SharedHandler = Arc::new(handler_fn(move |_req| {
            let events = Arc::clone(&handler_events);
            async move {
                events.lock().push("h".to_owned());
            }
        }));

        let middlewares = vec![recording("m1", &events), recording("m2", &events)];
        let chain = compose(&middlewares, handler);

        chain.invoke(Request::get("/").body(empty_req_body()).unwrap()).await.unwrap();

        assert_eq!(*events.lock(), vec!["m1-before", "m2-before", "h", "m2-after", "m1-after"]);
    }

    #[tokio::test]
    async fn empty_chain_is_the_handler() {
        let handler: SharedHandler = Arc::new(handler_fn(|_req| async { "plain" }));
        let middlewares: Vec<SharedMiddleware> = Vec::new();
        let chain = compose(&middlewares, Arc::clone(&handler));
        assert!(Arc::ptr_eq(&chain, &handler));
    }
}
