use super::pattern::Pattern;
use crate::handler::SharedHandler;
use crate::middleware::{SharedMiddleware, compose};
use std::sync::Arc;

/// What a terminal node carries: the raw handler, the middleware that belongs to the
/// route, and the chain pre-built from the global list plus those.
#[derive(Clone)]
pub(crate) struct Endpoint {
    pattern: Arc<str>,
    param_names: Arc<[Arc<str>]>,
    handler: SharedHandler,
    scoped: Arc<[SharedMiddleware]>,
    chain: SharedHandler,
}

impl Endpoint {
    pub(crate) fn new(
        pattern: &Pattern<'_>,
        handler: SharedHandler,
        scoped: Vec<SharedMiddleware>,
        global: &[SharedMiddleware],
    ) -> Self {
        let scoped: Arc<[SharedMiddleware]> = scoped.into();
        let chain = compose(global.iter().chain(scoped.iter()), Arc::clone(&handler));
        Self {
            pattern: pattern.raw().into(),
            param_names: pattern.param_names().map(Arc::<str>::from).collect(),
            handler,
            scoped,
            chain,
        }
    }

    /// Recomposes the chain against a new global middleware list
    pub(crate) fn rebuild(&mut self, global: &[SharedMiddleware]) {
        self.chain = compose(global.iter().chain(self.scoped.iter()), Arc::clone(&self.handler));
    }

    pub(crate) fn pattern(&self) -> &Arc<str> {
        &self.pattern
    }

    pub(crate) fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }

    #[inline]
    pub(crate) fn chain(&self) -> &SharedHandler {
        &self.chain
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("pattern", &self.pattern)
            .field("param_names", &self.param_names)
            .field("middlewares", &self.scoped.len())
            .finish_non_exhaustive()
    }
}
