//! The request multiplexer.
//!
//! [`Router`] owns a route table per HTTP method and dispatches each request to the
//! middleware chain pre-built for the route it matches, or to the not-found handler.
//!
//! Registration can happen at any time, also while requests are being served: writers
//! build a new table from the current one and publish it with a single atomic swap, a
//! dispatch reads whichever table was current when it started.
//!
//! ```no_run
//! use micro_router::{Router, RequestExt, handler_fn};
//!
//! let router = Router::new();
//! router.get("/users/:name", handler_fn(|req| async move { format!("hello {}", req.param("name")) }))?;
//! router.get("/static/*", handler_fn(|req| async move { req.param("*").to_owned() }))?;
//! # Ok::<(), micro_router::RouteError>(())
//! ```

macro_rules! method_routes {
    ($($name:ident => $method:ident),* $(,)?) => {
        $(
            #[doc = concat!("Registers `handler` for `", stringify!($method), "` requests matching `pattern`")]
            pub fn $name<H: RequestHandler + 'static>(&self, pattern: &str, handler: H) -> Result<(), RouteError> {
                self.handle(Method::$method, pattern, handler)
            }
        )*
    };
}

mod endpoint;
mod error;
mod group;
mod matcher;
mod pattern;
mod table;
mod tree;

pub use error::RouteError;
pub use group::Group;

use crate::body::{BoxError, ReqBody, ResponseBody};
use crate::handler::{RequestHandler, SharedHandler};
use crate::middleware::{Middleware, SharedMiddleware};
use crate::params::{ParamsPool, PathParams, PoolStats};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use http::{Method, Request, Response};
use parking_lot::Mutex;
use pattern::Pattern;
use std::sync::Arc;
use table::RouteTable;
use tracing::{debug, info, trace};

pub struct Router {
    table: ArcSwap<RouteTable>,
    write_lock: Mutex<()>,
    pool: Arc<ParamsPool>,
}

impl Router {
    /// Creates a router without routes, answering every request with a plain 404
    pub fn new() -> Self {
        Self::from_table(RouteTable::new())
    }

    fn from_table(table: RouteTable) -> Self {
        let pool = Arc::new(ParamsPool::new());
        pool.grow(table.max_params());
        Self { table: ArcSwap::from_pointee(table), write_lock: Mutex::new(()), pool }
    }

    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Appends a global middleware.
    ///
    /// Routes registered earlier get their chains rebuilt, so the middleware applies to every
    /// route no matter when it was added.
    pub fn wrap<M: Middleware + 'static>(&self, middleware: M) {
        self.wrap_shared(Arc::new(middleware));
    }

    fn wrap_shared(&self, middleware: SharedMiddleware) {
        self.update(|table| table.push_middleware(middleware));
    }

    pub fn handle<H: RequestHandler + 'static>(&self, method: Method, pattern: &str, handler: H) -> Result<(), RouteError> {
        self.register(method, pattern, Arc::new(handler), Vec::new())
    }

    /// Registers `handler` with middleware that only applies to this route
    pub fn handle_with<H, I>(&self, method: Method, pattern: &str, handler: H, middlewares: I) -> Result<(), RouteError>
    where
        H: RequestHandler + 'static,
        I: IntoIterator<Item = SharedMiddleware>,
    {
        self.register(method, pattern, Arc::new(handler), middlewares.into_iter().collect())
    }

    pub(crate) fn register(
        &self,
        method: Method,
        pattern: &str,
        handler: SharedHandler,
        middlewares: Vec<SharedMiddleware>,
    ) -> Result<(), RouteError> {
        let pattern = Pattern::parse(pattern)?;
        let scoped = middlewares.len();
        self.update(|table| table.insert(&method, &pattern, handler, middlewares));
        debug!(%method, pattern = pattern.raw(), scoped, "route registered");
        Ok(())
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

    /// Opens a registration scope whose patterns are prefixed with `prefix`
    pub fn group(&self, prefix: &str) -> Group<'_> {
        Group::new(self, prefix)
    }

    /// Replaces the handler invoked when no route matches
    pub fn set_not_found<H: RequestHandler + 'static>(&self, handler: H) {
        let handler: SharedHandler = Arc::new(handler);
        self.update(|table| table.set_not_found(handler));
    }

    /// Looks up the route for `method` and `path` without invoking anything
    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let table = self.table.load();
        let (endpoint, params) = table.find(method, path, &self.pool)?;
        Some(RouteMatch { pattern: Arc::clone(endpoint.pattern()), params })
    }

    /// Routes `req` and runs the matching chain.
    ///
    /// Captured parameters are attached to the request's extensions and go back to the pool
    /// when the request is dropped, whatever way the chain finishes. Attaching them to a
    /// request without extensions costs the three allocations of the extensions map, whatever
    /// the number of parameters; static routes and misses attach nothing.
    pub async fn dispatch(&self, mut req: Request<ReqBody>) -> Result<Response<ResponseBody>, BoxError> {
        let handler = {
            let table = self.table.load();
            match table.find(req.method(), req.uri().path(), &self.pool) {
                Some((endpoint, params)) => {
                    if let Some(params) = params {
                        req.extensions_mut().insert(params);
                    }
                    Arc::clone(endpoint.chain())
                }
                None => {
                    trace!(method = %req.method(), path = req.uri().path(), "no route matched");
                    Arc::clone(table.not_found())
                }
            }
        };

        handler.invoke(req).await
    }

    /// The largest number of parameters any registered route captures
    pub fn max_params(&self) -> usize {
        self.table.load().max_params()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn route_count(&self) -> usize {
        self.table.load().len()
    }

    fn update<R>(&self, f: impl FnOnce(&mut RouteTable) -> R) -> R {
        let _guard = self.write_lock.lock();
        let mut table = RouteTable::clone(&self.table.load());
        let result = f(&mut table);
        self.pool.grow(table.max_params());
        self.table.store(Arc::new(table));
        result
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.route_count())
            .field("max_params", &self.max_params())
            .field("pool", &self.pool_stats())
            .finish()
    }
}

/// A router is itself a handler, so it can be mounted under another router's route
#[async_trait]
impl RequestHandler for Router {
    async fn invoke(&self, req: Request<ReqBody>) -> Result<Response<ResponseBody>, BoxError> {
        self.dispatch(req).await
    }
}

/// The outcome of [`Router::find`]
#[derive(Debug)]
pub struct RouteMatch {
    pattern: Arc<str>,
    params: Option<PathParams>,
}

impl RouteMatch {
    /// The pattern of the matched route, as it was registered
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Captured parameters, `None` for routes without dynamic segments
    pub fn params(&self) -> Option<&PathParams> {
        self.params.as_ref()
    }

    /// Reads a captured value, `""` when the route has no parameter called `name`
    pub fn param(&self, name: &str) -> &str {
        self.params.as_ref().and_then(|params| params.get(name)).unwrap_or_default()
    }
}

struct RouteDef {
    method: Method,
    pattern: String,
    handler: SharedHandler,
    middlewares: Vec<SharedMiddleware>,
}

/// Collects a router's configuration and validates it in [`RouterBuilder::build`]
#[derive(Default)]
pub struct RouterBuilder {
    middlewares: Vec<SharedMiddleware>,
    routes: Vec<RouteDef>,
    not_found: Option<SharedHandler>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self::default()
    }

    pub fn wrap<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn route<H: RequestHandler + 'static>(self, method: Method, pattern: impl Into<String>, handler: H) -> Self {
        self.route_with(method, pattern, handler, Vec::new())
    }

    pub fn route_with<H, I>(mut self, method: Method, pattern: impl Into<String>, handler: H, middlewares: I) -> Self
    where
        H: RequestHandler + 'static,
        I: IntoIterator<Item = SharedMiddleware>,
    {
        self.routes.push(RouteDef {
            method,
            pattern: pattern.into(),
            handler: Arc::new(handler),
            middlewares: middlewares.into_iter().collect(),
        });
        self
    }

    pub fn not_found<H: RequestHandler + 'static>(mut self, handler: H) -> Self {
        self.not_found = Some(Arc::new(handler));
        self
    }

    /// Builds the router, failing on the first route whose pattern is invalid.
    ///
    /// Everything goes into one table which is published once.
    pub fn build(self) -> Result<Router, RouteError> {
        let mut table = RouteTable::new();
        for middleware in self.middlewares {
            table.push_middleware(middleware);
        }

        let routes = self.routes.len();
        for RouteDef { method, pattern, handler, middlewares } in self.routes {
            let pattern = Pattern::parse(&pattern)?;
            debug!(%method, pattern = pattern.raw(), scoped = middlewares.len(), "route registered");
            table.insert(&method, &pattern, handler, middlewares);
        }

        if let Some(not_found) = self.not_found {
            table.set_not_found(not_found);
        }

        info!(routes, max_params = table.max_params(), "router built");
        Ok(Router::from_table(table))
    }
}

impl std::fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterBuilder")
            .field("middlewares", &self.middlewares.len())
            .field("routes", &self.routes.len())
            .finish_non_exhaustive()
    }
}
