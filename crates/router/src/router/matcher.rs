//! Segment by segment matching of a request path against one method's tree.
//!
//! For every segment a static child wins over the parameter child, which wins over the
//! catch-all child. When none of them fits, the matcher may backtrack once, to the parent
//! of the node it is standing on, and retry the previous segment against that parent's
//! parameter or catch-all child. Lookup stays linear in the path length.

use super::tree::{NodeId, NodeKind, Tree};
use crate::params::{ParamsPool, PathParams};
use std::ops::Range;
use std::sync::Arc;
use tracing::{trace, warn};

enum Step {
    /// moved to a node that still expects more segments
    Descend(NodeId),
    /// a catch-all took the rest of the path
    Consumed(NodeId),
}

pub(crate) struct Matcher<'t, 'p> {
    tree: &'t Tree,
    pool: &'t Arc<ParamsPool>,
    max_params: usize,
    path: &'p str,
    params: Option<PathParams>,
    backtracked: bool,
    overflowed: bool,
}

impl<'t, 'p> Matcher<'t, 'p> {
    pub(crate) fn new(tree: &'t Tree, pool: &'t Arc<ParamsPool>, max_params: usize, path: &'p str) -> Self {
        Self { tree, pool, max_params, path, params: None, backtracked: false, overflowed: false }
    }

    /// Walks the tree under `root`, returning the terminal node and the captured parameters
    pub(crate) fn run(mut self, root: NodeId) -> Option<(NodeId, Option<PathParams>)> {
        let path = self.path;
        if !path.starts_with('/') {
            return None;
        }

        let mut current = root;
        let mut previous: Option<Range<usize>> = None;
        let mut start = 1;

        loop {
            let end = path[start..].find('/').map_or(path.len(), |offset| start + offset);
            let segment = start..end;

            let step = match self.step(current, segment.clone()) {
                Some(step) => step,
                None => match self.backtrack(current, previous.clone()?)? {
                    Step::Descend(alternative) => self.step(alternative, segment.clone())?,
                    consumed @ Step::Consumed(_) => consumed,
                },
            };

            match step {
                Step::Descend(node) => current = node,
                Step::Consumed(node) => return self.finish(node),
            }

            previous = Some(segment);
            if end == path.len() {
                break;
            }
            start = end + 1;
        }

        if self.tree.node(current).endpoint().is_some() {
            return self.finish(current);
        }

        match self.backtrack(current, previous?)? {
            Step::Descend(node) | Step::Consumed(node) => self.finish(node),
        }
    }

    fn step(&mut self, current: NodeId, segment: Range<usize>) -> Option<Step> {
        if let Some(child) = self.tree.static_child(current, &self.path[segment.clone()]) {
            return Some(Step::Descend(child));
        }
        if let Some(child) = self.tree.param_child(current) {
            self.record(child, segment)?;
            return Some(Step::Descend(child));
        }
        let child = self.tree.catch_all_child(current)?;
        self.record(child, segment.start..self.path.len())?;
        Some(Step::Consumed(child))
    }

    /// Gives the segment consumed to reach `current` to a dynamic sibling of `current`
    fn backtrack(&mut self, current: NodeId, previous: Range<usize>) -> Option<Step> {
        if self.backtracked || self.overflowed {
            return None;
        }
        self.backtracked = true;

        let node = self.tree.node(current);
        let parent = node.parent()?;
        trace!(from = node.edge(), segment = &self.path[previous.clone()], "backtracking to parent");

        match node.kind() {
            NodeKind::Static => {
                if let Some(param) = self.tree.param_child(parent) {
                    self.record(param, previous)?;
                    return Some(Step::Descend(param));
                }
            }
            NodeKind::Param => {
                if let Some(params) = self.params.as_mut() {
                    params.pop();
                }
            }
            NodeKind::CatchAll => return None,
        }

        let catch_all = self.tree.catch_all_child(parent)?;
        self.record(catch_all, previous.start..self.path.len())?;
        Some(Step::Consumed(catch_all))
    }

    fn record(&mut self, node: NodeId, value: Range<usize>) -> Option<()> {
        let name = self.tree.node(node).param_name()?;
        let params = self.params.get_or_insert_with(|| {
            let mut params = self.pool.acquire();
            params.capture_path(self.path);
            params
        });
        if params.len() >= self.max_params {
            warn!(path = self.path, max_params = self.max_params, "path has more parameters than any route");
            self.overflowed = true;
            return None;
        }
        params.push(name, value);
        Some(())
    }

    fn finish(mut self, node: NodeId) -> Option<(NodeId, Option<PathParams>)> {
        let endpoint = self.tree.node(node).endpoint()?;
        if let Some(params) = self.params.as_mut() {
            params.rename(endpoint.param_names());
        }
        Some((node, self.params))
    }
}

#[cfg(test)]
mod tests {
    use super::Matcher;
    use crate::params::ParamsPool;
    use crate::router::table::RouteTable;
    use crate::{handler_fn, router::pattern::Pattern};
    use http::Method;
    use std::sync::Arc;

    fn table(patterns: &[&str]) -> RouteTable {
        let mut table = RouteTable::new();
        for pattern in patterns {
            let pattern = Pattern::parse(pattern).unwrap();
            table.insert(&Method::GET, &pattern, Arc::new(handler_fn(|_req| async {})), Vec::new());
        }
        table
    }

    fn lookup(table: &RouteTable, path: &str) -> Option<(String, Vec<(String, String)>)> {
        let pool = Arc::new(ParamsPool::new());
        pool.grow(table.max_params());
        let root = table.tree().root(&Method::GET)?;
        let (node, params) = Matcher::new(table.tree(), &pool, table.max_params(), path).run(root)?;
        let pattern = table.tree().node(node).endpoint()?.pattern().to_string();
        let params = params
            .map(|params| params.iter().map(|(name, value)| (name.to_owned(), value.to_owned())).collect())
            .unwrap_or_default();
        Some((pattern, params))
    }

    fn pair(name: &str, value: &str) -> (String, String) {
        (name.to_owned(), value.to_owned())
    }

    #[test]
    fn single_param() {
        let table = table(&["/users/:name"]);
        assert_eq!(lookup(&table, "/users/aaa"), Some(("/users/:name".into(), vec![pair("name", "aaa")])));
    }

    #[test]
    fn segment_count_must_match() {
        let table = table(&["/users/:name"]);
        assert_eq!(lookup(&table, "/users"), None);
        assert_eq!(lookup(&table, "/users/aaa/bbb"), None);
    }

    #[test]
    fn static_segment_wins_at_same_depth() {
        let table = table(&["/a/:b/c", "/a/b/:c"]);
        assert_eq!(lookup(&table, "/a/b/c"), Some(("/a/b/:c".into(), vec![pair("c", "c")])));
        assert_eq!(lookup(&table, "/a/x/c"), Some(("/a/:b/c".into(), vec![pair("b", "x")])));
    }

    #[test]
    fn shared_param_node_reports_matching_route_names() {
        let table = table(&["/a/:b/c", "/a/:bb/cc"]);
        assert_eq!(lookup(&table, "/a/x/cc"), Some(("/a/:bb/cc".into(), vec![pair("bb", "x")])));
        assert_eq!(lookup(&table, "/a/x/c"), Some(("/a/:b/c".into(), vec![pair("b", "x")])));
    }

    #[test]
    fn backtracks_from_static_to_param() {
        let table = table(&["/a/:x/c", "/a/b/d/:e"]);
        assert_eq!(lookup(&table, "/a/b/c"), Some(("/a/:x/c".into(), vec![pair("x", "b")])));
    }

    #[test]
    fn backtracks_at_end_of_path() {
        let table = table(&["/a/:x", "/a/b/:y"]);
        assert_eq!(lookup(&table, "/a/b"), Some(("/a/:x".into(), vec![pair("x", "b")])));
    }

    #[test]
    fn backtracks_from_param_to_catch_all() {
        let table = table(&["/files/:name", "/files/*"]);
        assert_eq!(lookup(&table, "/files/a"), Some(("/files/:name".into(), vec![pair("name", "a")])));
        assert_eq!(lookup(&table, "/files/a/b"), Some(("/files/*".into(), vec![pair("*", "a/b")])));
    }

    #[test]
    fn catch_all_takes_the_rest() {
        let table = table(&["/*", "/a/*"]);
        assert_eq!(lookup(&table, "/a/x/y/z"), Some(("/a/*".into(), vec![pair("*", "x/y/z")])));
        assert_eq!(lookup(&table, "/b/c"), Some(("/*".into(), vec![pair("*", "b/c")])));
        assert_eq!(lookup(&table, "/"), Some(("/*".into(), vec![pair("*", "")])));
        assert_eq!(lookup(&table, "/anything/at/all"), Some(("/*".into(), vec![pair("*", "anything/at/all")])));
    }

    #[test]
    fn empty_segment_is_an_empty_value() {
        let table = table(&["/items/:id/details"]);
        assert_eq!(lookup(&table, "/items//details"), Some(("/items/:id/details".into(), vec![pair("id", "")])));
    }

    #[test]
    fn repeated_names_are_kept_in_order() {
        let table = table(&["/:id/x/:id"]);
        assert_eq!(lookup(&table, "/1/x/2"), Some(("/:id/x/:id".into(), vec![pair("id", "1"), pair("id", "2")])));
    }

    #[test]
    fn backtracks_only_once() {
        let table = table(&["/:a/b/:c/d", "/x/b/y/e"]);
        // "/x/b/y/d": x -> b -> y static, "d" misses and the one backtrack tries y's parent,
        // which has no dynamic child for "y"; the route through ":a" is never revisited
        assert_eq!(lookup(&table, "/x/b/y/d"), None);
    }

    #[test]
    fn relative_path_never_matches() {
        let table = table(&["/*"]);
        assert_eq!(lookup(&table, "*"), None);
        assert_eq!(lookup(&table, ""), None);
    }

    #[test]
    fn failed_match_returns_params_to_pool() {
        let table = table(&["/users/:name/posts"]);
        let pool = Arc::new(ParamsPool::new());
        pool.grow(table.max_params());
        let root = table.tree().root(&Method::GET).unwrap();

        assert!(Matcher::new(table.tree(), &pool, table.max_params(), "/users/aaa/comments").run(root).is_none());

        let stats = pool.stats();
        assert_eq!(stats.acquired, 1);
        assert_eq!(stats.in_use(), 0);
    }

    #[test]
    fn overflow_is_a_miss() {
        let table = table(&["/a/:b/:c"]);
        let pool = Arc::new(ParamsPool::new());
        let root = table.tree().root(&Method::GET).unwrap();

        assert!(Matcher::new(table.tree(), &pool, 1, "/a/x/y").run(root).is_none());
        assert_eq!(pool.stats().in_use(), 0);
    }
}
