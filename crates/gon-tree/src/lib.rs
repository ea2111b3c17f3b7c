#![doc = include_str!("../README.md")]

mod arena;
mod builder;
mod diagnostic;
mod node;

pub use arena::Arena;
pub use diagnostic::{ParseError, ParseErrorKind};
pub use gon_parse::{MAX_SUB_OBJECT_DEPTH, Span};
pub use node::{Children, NodeKind, NodeRef};

use gon_parse::{ObjectBuilder, cut};
use node::Node;

/// Parse a GON document into an immutable forest.
///
/// The returned [`Document`] borrows `source`; every name and value a query
/// hands back is a slice of it. A parse either produces a fully consistent
/// forest or fails as a whole; there is no partial result.
pub fn parse(source: &str) -> Result<Document<'_>, ParseError> {
    let forest = builder::assemble(source)?;
    Ok(Document {
        source,
        nodes: forest.nodes,
        top_level: forest.top_level,
    })
}

/// Count the objects in `source` without building a forest.
///
/// Matches the node count of a successful [`parse`] of the same buffer. On
/// input that would fail to parse, this reports the objects seen before the
/// point of failure.
pub fn object_count(source: &str) -> usize {
    let mut builder = ObjectBuilder::new(source);
    builder::count_pass(&mut builder).0
}

/// A parsed GON document: one contiguous forest of nodes.
///
/// Nodes are laid out breadth-first: the top-level band first, then each
/// parent's children as a contiguous run. The document is immutable once
/// built and safe to read from multiple threads.
#[derive(Debug)]
pub struct Document<'src> {
    source: &'src str,
    nodes: Box<[Node]>,
    top_level: usize,
}

impl<'src> Document<'src> {
    /// Parse a GON document. See [`parse`].
    pub fn parse(source: &'src str) -> Result<Self, ParseError> {
        parse(source)
    }

    /// The source text this document was parsed from.
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Total number of nodes in the forest.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the forest has no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of top-level nodes.
    pub fn top_level_len(&self) -> usize {
        self.top_level
    }

    /// The node at an arena index, if in bounds.
    pub fn node(&self, index: usize) -> Option<NodeRef<'_>> {
        (index < self.nodes.len()).then_some(NodeRef { doc: self, index })
    }

    /// Find a top-level node by name. When a name repeats, the last
    /// occurrence wins.
    pub fn top_level(&self, name: &str) -> Option<NodeRef<'_>> {
        let mut found = None;
        for index in 0..self.top_level {
            if self.nodes[index].name.slice(self.source) == name {
                found = Some(index);
            }
        }
        found.map(|index| NodeRef { doc: self, index })
    }

    /// Iterate over the top-level nodes in source order.
    pub fn iter_top_level(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.top_level).map(|index| NodeRef { doc: self, index })
    }

    /// Look up a node by `/`-separated path, e.g. `window/size/w`.
    ///
    /// The first segment resolves against the top level, the rest against
    /// each node's children; every step keeps the last-match rule.
    pub fn get_path(&self, path: &str) -> Option<NodeRef<'_>> {
        let first = cut(path, '/');
        let mut node = self.top_level(first.head)?;
        let mut rest = first.tail;
        while !rest.is_empty() {
            let segment = cut(rest, '/');
            node = node.get(segment.head)?;
            rest = segment.tail;
        }
        Some(node)
    }
}
