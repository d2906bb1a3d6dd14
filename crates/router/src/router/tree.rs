//! The route trie.
//!
//! One tree per HTTP method, stored together in an arena and linked by index. Each edge
//! consumes one path segment. A node keeps its static children in a map and has one slot
//! each for a parameter child and a catch-all child, which is what gives static segments
//! priority without reordering anything at registration.

use super::endpoint::Endpoint;
use super::pattern::{CATCH_ALL_NAME, Segment};
use http::Method;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Static,
    Param,
    CatchAll,
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    kind: NodeKind,
    edge: Box<str>,
    param_name: Option<Arc<str>>,
    statics: HashMap<Box<str>, NodeId>,
    param: Option<NodeId>,
    catch_all: Option<NodeId>,
    parent: Option<NodeId>,
    endpoint: Option<Endpoint>,
}

impl Node {
    fn root(method: &Method) -> Self {
        Self::new(NodeKind::Static, method.as_str().into(), None, None)
    }

    fn child(parent: NodeId, edge: Segment<'_>) -> Self {
        match edge {
            Segment::Static(literal) => Self::new(NodeKind::Static, literal.into(), None, Some(parent)),
            Segment::Param(name) => Self::new(NodeKind::Param, ":".into(), Some(Arc::from(name)), Some(parent)),
            Segment::CatchAll => {
                Self::new(NodeKind::CatchAll, CATCH_ALL_NAME.into(), Some(Arc::from(CATCH_ALL_NAME)), Some(parent))
            }
        }
    }

    fn new(kind: NodeKind, edge: Box<str>, param_name: Option<Arc<str>>, parent: Option<NodeId>) -> Self {
        Self { kind, edge, param_name, statics: HashMap::new(), param: None, catch_all: None, parent, endpoint: None }
    }

    #[inline]
    pub(crate) fn kind(&self) -> NodeKind {
        self.kind
    }

    pub(crate) fn edge(&self) -> &str {
        &self.edge
    }

    #[inline]
    pub(crate) fn param_name(&self) -> Option<&Arc<str>> {
        self.param_name.as_ref()
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub(crate) fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
    roots: HashMap<Method, NodeId>,
}

impl Tree {
    pub(crate) fn root(&self, method: &Method) -> Option<NodeId> {
        self.roots.get(method).copied()
    }

    pub(crate) fn root_or_insert(&mut self, method: &Method) -> NodeId {
        if let Some(root) = self.root(method) {
            return root;
        }
        let id = self.nodes.len();
        self.nodes.push(Node::root(method));
        self.roots.insert(method.clone(), id);
        id
    }

    /// Returns the child of `parent` reached through `edge`, creating it when missing.
    ///
    /// A parameter child takes the name of the latest pattern registered through it.
    pub(crate) fn find_or_create_child(&mut self, parent: NodeId, edge: Segment<'_>) -> NodeId {
        let existing = match edge {
            Segment::Static(literal) => self.static_child(parent, literal),
            Segment::Param(_) => self.param_child(parent),
            Segment::CatchAll => self.catch_all_child(parent),
        };

        if let Some(id) = existing {
            if let Segment::Param(name) = edge {
                let node = &mut self.nodes[id];
                if node.param_name.as_deref() != Some(name) {
                    node.param_name = Some(Arc::from(name));
                }
            }
            return id;
        }

        let id = self.nodes.len();
        self.nodes.push(Node::child(parent, edge));

        let parent_node = &mut self.nodes[parent];
        match edge {
            Segment::Static(literal) => {
                parent_node.statics.insert(literal.into(), id);
            }
            Segment::Param(_) => parent_node.param = Some(id),
            Segment::CatchAll => parent_node.catch_all = Some(id),
        }
        id
    }

    #[inline]
    pub(crate) fn static_child(&self, parent: NodeId, literal: &str) -> Option<NodeId> {
        self.nodes[parent].statics.get(literal).copied()
    }

    #[inline]
    pub(crate) fn param_child(&self, parent: NodeId) -> Option<NodeId> {
        self.nodes[parent].param
    }

    #[inline]
    pub(crate) fn catch_all_child(&self, parent: NodeId) -> Option<NodeId> {
        self.nodes[parent].catch_all
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Installs `endpoint` on `id`, replacing whatever was registered there before
    pub(crate) fn set_endpoint(&mut self, id: NodeId, endpoint: Endpoint) -> Option<Endpoint> {
        self.nodes[id].endpoint.replace(endpoint)
    }

    pub(crate) fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.nodes.iter().filter_map(|node| node.endpoint.as_ref())
    }

    pub(crate) fn endpoints_mut(&mut self) -> impl Iterator<Item = &mut Endpoint> {
        self.nodes.iter_mut().filter_map(|node| node.endpoint.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::{NodeKind, Tree};
    use crate::router::pattern::Segment;
    use http::Method;

    #[test]
    fn roots_are_per_method() {
        let mut tree = Tree::default();
        let get = tree.root_or_insert(&Method::GET);
        let post = tree.root_or_insert(&Method::POST);

        assert_ne!(get, post);
        assert_eq!(tree.root_or_insert(&Method::GET), get);
        assert_eq!(tree.node(get).edge(), "GET");
        assert_eq!(tree.root(&Method::PUT), None);

        let lower_case = Method::from_bytes(b"get").unwrap();
        assert_eq!(tree.root(&lower_case), None);
    }

    #[test]
    fn children_live_in_separate_slots() {
        let mut tree = Tree::default();
        let root = tree.root_or_insert(&Method::GET);

        let users = tree.find_or_create_child(root, Segment::Static("users"));
        let id = tree.find_or_create_child(users, Segment::Param("id"));
        let rest = tree.find_or_create_child(users, Segment::CatchAll);
        let new = tree.find_or_create_child(users, Segment::Static("new"));

        assert_eq!(tree.static_child(users, "new"), Some(new));
        assert_eq!(tree.param_child(users), Some(id));
        assert_eq!(tree.catch_all_child(users), Some(rest));

        assert_eq!(tree.node(id).kind(), NodeKind::Param);
        assert_eq!(tree.node(id).edge(), ":");
        assert_eq!(tree.node(rest).kind(), NodeKind::CatchAll);
        assert_eq!(tree.node(rest).edge(), "*");
        assert_eq!(tree.node(new).parent(), Some(users));
    }

    #[test]
    fn one_param_child_per_node() {
        let mut tree = Tree::default();
        let root = tree.root_or_insert(&Method::GET);

        let first = tree.find_or_create_child(root, Segment::Param("b"));
        let second = tree.find_or_create_child(root, Segment::Param("bb"));

        assert_eq!(first, second);
        assert_eq!(tree.node(first).param_name().map(|name| &**name), Some("bb"));
    }
}
