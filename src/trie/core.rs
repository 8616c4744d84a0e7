use http::Method;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

use super::clean::clean_path;
use crate::chain::{connect, Handler, Wrapper};
use crate::params::PathParams;

/// Sigil prefixing a parameter segment in a route pattern.
pub(crate) const PARAM_SIGIL: char = ':';
/// Sigil prefixing a wildcard segment in a route pattern.
pub(crate) const WILDCARD_SIGIL: char = '*';

/// Reserved method token matching any request method, consulted only after
/// the exact-method lookup fails.
static ANY: Lazy<Method> = Lazy::new(|| Method::from_bytes(b"ANY").expect("valid method token"));

/// The reserved "matches any method" token.
#[must_use]
pub fn any_method() -> &'static Method {
    &ANY
}

/// Index of a node in the trie arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// How a node matches its segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Matches the segment text exactly.
    Literal,
    /// Matches any single non-empty segment, capturing it.
    Param,
    /// Matches all remaining segments joined by `/`; always terminal.
    Wildcard,
}

struct TrieNode {
    /// Literal segment text; empty for the root and for param/wildcard nodes.
    segment: String,
    kind: NodeKind,
    /// Placeholder name for param and wildcard nodes.
    param_name: Option<Arc<str>>,
    /// Back-reference for backtracking; not an ownership relation.
    parent: Option<NodeId>,
    literal: HashMap<String, NodeId>,
    param: Option<NodeId>,
    wildcard: Option<NodeId>,
    handlers: HashMap<Method, Handler>,
    /// Wrappers in scope when this node's route was declared; composed
    /// around each handler attached here.
    backlog: Vec<Wrapper>,
}

impl TrieNode {
    fn root() -> Self {
        Self {
            segment: String::new(),
            kind: NodeKind::Literal,
            param_name: None,
            parent: None,
            literal: HashMap::new(),
            param: None,
            wildcard: None,
            handlers: HashMap::new(),
            backlog: Vec::new(),
        }
    }
}

/// The route tree.
///
/// Built once during registration (single-threaded), then read-only for the
/// lifetime of the serving process; [`RouteTrie::search`] takes `&self` and
/// is safe to call concurrently once construction has stabilized.
pub struct RouteTrie {
    nodes: Vec<TrieNode>,
}

impl Default for RouteTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTrie {
    pub const ROOT: NodeId = NodeId(0);

    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::root()],
        }
    }

    /// Number of nodes in the arena, the root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert a pattern, creating or reusing one node per segment, and
    /// return the terminal node so handlers can be attached to it.
    ///
    /// Insertion is idempotent on structure: the same pattern always yields
    /// the same terminal node, so multiple method registrations accumulate
    /// on one node. The pattern `/` resolves to the root itself.
    ///
    /// # Panics
    ///
    /// Panics on malformed patterns: a bare sigil segment, a placeholder
    /// name conflicting with the one already declared at that position, or
    /// any segment registered beneath a wildcard. These are programming
    /// errors and are fatal at registration time.
    pub fn insert(&mut self, pattern: &str) -> NodeId {
        let cleaned = clean_path(pattern);
        let mut current = Self::ROOT;
        for segment in cleaned.split('/').filter(|s| !s.is_empty()) {
            current = self.extend(current, segment, pattern);
        }
        current
    }

    /// [`insert`](Self::insert) plus recording of the middleware backlog in
    /// effect at declaration time; [`attach`](Self::attach) composes it
    /// around every handler attached to the node.
    pub fn declare(&mut self, pattern: &str, backlog: Vec<Wrapper>) -> NodeId {
        let node = self.insert(pattern);
        self.nodes[node.0].backlog = backlog;
        node
    }

    /// Attach a handler for a method, composing it with the node's backlog.
    /// Re-attaching for the same method replaces the previous handler.
    pub fn attach(&mut self, node: NodeId, method: Method, handler: Handler) {
        let backlog = self.nodes[node.0].backlog.clone();
        let composed = connect(handler, &backlog);
        self.nodes[node.0].handlers.insert(method, composed);
    }

    fn extend(&mut self, parent: NodeId, segment: &str, pattern: &str) -> NodeId {
        if self.nodes[parent.0].kind == NodeKind::Wildcard {
            panic!("invalid route pattern {pattern:?}: wildcard segment must be last");
        }

        if let Some(name) = segment.strip_prefix(PARAM_SIGIL) {
            if name.is_empty() {
                panic!("invalid route pattern {pattern:?}: parameter segment has no name");
            }
            if let Some(child) = self.nodes[parent.0].param {
                self.check_placeholder(child, name, pattern);
                return child;
            }
            let child = self.push_node(parent, NodeKind::Param, "", Some(name));
            self.nodes[parent.0].param = Some(child);
            return child;
        }

        if let Some(name) = segment.strip_prefix(WILDCARD_SIGIL) {
            if name.is_empty() {
                panic!("invalid route pattern {pattern:?}: wildcard segment has no name");
            }
            if let Some(child) = self.nodes[parent.0].wildcard {
                self.check_placeholder(child, name, pattern);
                return child;
            }
            let child = self.push_node(parent, NodeKind::Wildcard, "", Some(name));
            self.nodes[parent.0].wildcard = Some(child);
            return child;
        }

        if let Some(&child) = self.nodes[parent.0].literal.get(segment) {
            return child;
        }
        let child = self.push_node(parent, NodeKind::Literal, segment, None);
        self.nodes[parent.0].literal.insert(segment.to_string(), child);
        child
    }

    fn check_placeholder(&self, node: NodeId, name: &str, pattern: &str) {
        let existing = self.nodes[node.0]
            .param_name
            .as_deref()
            .unwrap_or_default();
        if existing != name {
            panic!(
                "invalid route pattern {pattern:?}: placeholder {name:?} conflicts with \
                 {existing:?} already declared at this position"
            );
        }
    }

    fn push_node(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        segment: &str,
        param_name: Option<&str>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TrieNode {
            segment: segment.to_string(),
            kind,
            param_name: param_name.map(Arc::from),
            parent: Some(parent),
            literal: HashMap::new(),
            param: None,
            wildcard: None,
            handlers: HashMap::new(),
            backlog: Vec::new(),
        });
        id
    }

    /// Find the best-matching node for a request path, writing captured
    /// parameter values into `captures`.
    ///
    /// Descends one segment at a time preferring literal over param over
    /// wildcard children. A structural dead end backtracks through parent
    /// references and retries the first untried less-specific branch at
    /// each ancestor, dropping the captures of abandoned levels on the way
    /// up. Returns `None` when every alternative is exhausted.
    ///
    /// A search that consumes all segments returns the node it stopped on
    /// even when that node holds no handlers; handler resolution is the
    /// caller's concern.
    #[must_use]
    pub fn search(&self, path: &str, captures: &mut PathParams) -> Option<NodeId> {
        let cleaned = clean_path(path);
        let segments: Vec<&str> = cleaned.split('/').filter(|s| !s.is_empty()).collect();

        let mut current = Self::ROOT;
        let mut depth = 0usize;

        loop {
            if depth == segments.len() {
                return Some(current);
            }
            let node = &self.nodes[current.0];
            let segment = segments[depth];

            if let Some(&child) = node.literal.get(segment) {
                current = child;
                depth += 1;
                continue;
            }
            if let Some(child) = node.param {
                self.capture(child, segment.to_string(), captures);
                current = child;
                depth += 1;
                continue;
            }
            if let Some(child) = node.wildcard {
                self.capture(child, segments[depth..].join("/"), captures);
                return Some(child);
            }

            // Dead end: climb ancestors looking for a param or wildcard
            // branch not taken on the way down. Retrying a level drops its
            // capture first, so captures are overwritten, never duplicated.
            loop {
                let node = &self.nodes[current.0];
                let parent = node.parent?;
                depth -= 1;
                let segment = segments[depth];
                let ancestor = &self.nodes[parent.0];

                if ancestor.param == Some(current) {
                    captures.pop();
                } else if let Some(child) = ancestor.param {
                    self.capture(child, segment.to_string(), captures);
                    current = child;
                    depth += 1;
                    break;
                }
                if let Some(child) = ancestor.wildcard {
                    self.capture(child, segments[depth..].join("/"), captures);
                    return Some(child);
                }
                current = parent;
            }
        }
    }

    fn capture(&self, node: NodeId, value: String, captures: &mut PathParams) {
        if let Some(name) = &self.nodes[node.0].param_name {
            captures.append(Arc::clone(name), value);
        }
    }

    /// Look up the handler attached to `node` for an exact method.
    #[must_use]
    pub fn handler(&self, node: NodeId, method: &Method) -> Option<&Handler> {
        self.nodes[node.0].handlers.get(method)
    }

    /// Whether any handler at all is attached to `node`.
    #[must_use]
    pub fn has_handlers(&self, node: NodeId) -> bool {
        !self.nodes[node.0].handlers.is_empty()
    }

    /// Methods with handlers attached to `node`, sorted by name, the ANY
    /// sentinel excluded. Used to build `Allow` headers.
    #[must_use]
    pub fn allowed_methods(&self, node: NodeId) -> Vec<Method> {
        let mut methods: Vec<Method> = self.nodes[node.0]
            .handlers
            .keys()
            .filter(|m| *m != any_method())
            .cloned()
            .collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    #[must_use]
    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.nodes[node.0].kind
    }

    /// Placeholder name of a param or wildcard node.
    #[must_use]
    pub fn param_name(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.0].param_name.as_deref()
    }

    /// Literal segment text of a node (empty for the root and for
    /// param/wildcard nodes).
    #[must_use]
    pub fn segment(&self, node: NodeId) -> &str {
        &self.nodes[node.0].segment
    }
}
