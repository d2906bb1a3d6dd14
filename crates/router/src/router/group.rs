use super::Router;
use super::error::RouteError;
use crate::handler::RequestHandler;
use crate::middleware::{Middleware, SharedMiddleware};
use http::Method;
use std::sync::Arc;

/// A registration scope sharing a path prefix and a middleware list.
///
/// Patterns registered through a group are appended to its prefix, and the group's
/// middleware runs after the router's global middleware and before the route's own.
#[derive(Clone)]
pub struct Group<'r> {
    router: &'r Router,
    prefix: String,
    middlewares: Vec<SharedMiddleware>,
}

impl<'r> Group<'r> {
    pub(super) fn new(router: &'r Router, prefix: &str) -> Self {
        Self { router, prefix: prefix.trim_end_matches('/').to_owned(), middlewares: Vec::new() }
    }

    /// Appends a middleware to the routes registered from now on through this group
    pub fn wrap<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// A nested scope; it inherits this group's prefix and middleware
    pub fn group(&self, prefix: &str) -> Group<'r> {
        Group {
            router: self.router,
            prefix: format!("{}{}", self.prefix, prefix.trim_end_matches('/')),
            middlewares: self.middlewares.clone(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn handle<H: RequestHandler + 'static>(&self, method: Method, pattern: &str, handler: H) -> Result<(), RouteError> {
        self.handle_with(method, pattern, handler, Vec::new())
    }

    pub fn handle_with<H, I>(&self, method: Method, pattern: &str, handler: H, middlewares: I) -> Result<(), RouteError>
    where
        H: RequestHandler + 'static,
        I: IntoIterator<Item = SharedMiddleware>,
    {
        if !pattern.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash { pattern: pattern.to_owned() });
        }
        let pattern = format!("{}{}", self.prefix, pattern);
        let middlewares = self.middlewares.iter().cloned().chain(middlewares).collect();
        self.router.register(method, &pattern, Arc::new(handler), middlewares)
    }

    method_routes! {
        get => GET,
        post => POST,
        put => PUT,
        delete => DELETE,
        head => HEAD,
        options => OPTIONS,
        patch => PATCH,
        connect => CONNECT,
        trace => TRACE,
    }
}

impl std::fmt::Debug for Group<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group").field("prefix", &self.prefix).field("middlewares", &self.middlewares.len()).finish()
    }
}
