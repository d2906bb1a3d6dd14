use super::endpoint::Endpoint;
use super::matcher::Matcher;
use super::pattern::{Pattern, Segment};
use super::tree::{NodeId, Tree};
use crate::handler::{SharedHandler, not_found_handler};
use crate::middleware::SharedMiddleware;
use crate::params::{ParamsPool, PathParams};
use http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

type FastPath = HashMap<Method, HashMap<Box<str>, NodeId>>;

/// Everything a dispatch reads, published as one unit.
///
/// Writers clone the current table, change the clone and swap it in, so a dispatch always
/// sees a tree, a fast path index and a middleware list that belong together.
#[derive(Clone)]
pub(crate) struct RouteTable {
    tree: Tree,
    fast_path: FastPath,
    max_params: usize,
    middlewares: Vec<SharedMiddleware>,
    not_found: SharedHandler,
}

impl RouteTable {
    pub(crate) fn new() -> Self {
        Self {
            tree: Tree::default(),
            fast_path: FastPath::new(),
            max_params: 0,
            middlewares: Vec::new(),
            not_found: not_found_handler(),
        }
    }

    pub(crate) fn insert(
        &mut self,
        method: &Method,
        pattern: &Pattern<'_>,
        handler: SharedHandler,
        scoped: Vec<SharedMiddleware>,
    ) {
        let root = self.tree.root_or_insert(method);

        let node = if pattern.is_static() {
            let node = self.tree.find_or_create_child(root, Segment::Static(pattern.raw()));
            self.fast_path.entry(method.clone()).or_default().insert(pattern.raw().into(), node);
            node
        } else {
            pattern.segments().iter().fold(root, |parent, segment| self.tree.find_or_create_child(parent, *segment))
        };

        let endpoint = Endpoint::new(pattern, handler, scoped, &self.middlewares);
        self.max_params = self.max_params.max(endpoint.param_names().len());

        if self.tree.set_endpoint(node, endpoint).is_some() {
            debug!(%method, pattern = pattern.raw(), "route replaced");
        }
    }

    /// Appends a global middleware and rebuilds every installed chain around the new list
    pub(crate) fn push_middleware(&mut self, middleware: SharedMiddleware) {
        self.middlewares.push(middleware);
        let global = self.middlewares.as_slice();
        let mut rebuilt = 0_usize;
        for endpoint in self.tree.endpoints_mut() {
            endpoint.rebuild(global);
            rebuilt += 1;
        }
        debug!(middlewares = global.len(), rebuilt, "global middleware added");
    }

    pub(crate) fn set_not_found(&mut self, handler: SharedHandler) {
        self.not_found = handler;
    }

    /// Looks up the endpoint for `method` and `path`.
    ///
    /// Fully literal routes are answered from the fast path index without touching the pool.
    pub(crate) fn find(
        &self,
        method: &Method,
        path: &str,
        pool: &Arc<ParamsPool>,
    ) -> Option<(&Endpoint, Option<PathParams>)> {
        if let Some(node) = self.fast_path.get(method).and_then(|paths| paths.get(path)) {
            return self.tree.node(*node).endpoint().map(|endpoint| (endpoint, None));
        }

        let root = self.tree.root(method)?;
        let (node, params) = Matcher::new(&self.tree, pool, self.max_params, path).run(root)?;
        self.tree.node(node).endpoint().map(|endpoint| (endpoint, params))
    }

    #[inline]
    pub(crate) fn not_found(&self) -> &SharedHandler {
        &self.not_found
    }

    #[inline]
    pub(crate) fn max_params(&self) -> usize {
        self.max_params
    }

    pub(crate) fn len(&self) -> usize {
        self.tree.endpoints().count()
    }

    #[cfg(test)]
    pub(crate) fn tree(&self) -> &Tree {
        &self.tree
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("tree", &self.tree)
            .field("fast_path", &self.fast_path)
            .field("max_params", &self.max_params)
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}
