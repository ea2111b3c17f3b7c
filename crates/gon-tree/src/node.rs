//! Forest nodes and the query API over them.

use gon_parse::{Object, ObjectKind, Span};

use crate::Document;

/// What kind of node this is.
///
/// Unlike [`ObjectKind`], there are no terminator variants: closers are
/// consumed during assembly and cannot appear in a finished forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    /// A bare value, e.g. a list element.
    #[default]
    Ident,
    /// A key/value pair.
    Widget,
    /// A `{ ... }` grouping.
    Block,
    /// A `[ ... ]` grouping.
    List,
}

/// One arena-resident node of a parsed forest.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) name: Span,
    pub(crate) value: Option<Span>,
    pub(crate) kind: NodeKind,
    pub(crate) anonymous: bool,
    pub(crate) list_item: bool,
    pub(crate) string: bool,
    /// Arena index of the parent; `None` for top-level nodes.
    pub(crate) parent: Option<u32>,
    /// Start of this node's contiguous child run in the arena.
    pub(crate) first_child: u32,
    /// Number of direct children.
    pub(crate) child_count: u32,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: Span::empty(0),
            value: None,
            kind: NodeKind::default(),
            anonymous: false,
            list_item: false,
            string: false,
            parent: None,
            first_child: 0,
            child_count: 0,
        }
    }
}

impl Node {
    /// Convert a builder object into a node. Terminators have no node form.
    pub(crate) fn materialize(object: &Object, parent: Option<u32>) -> Option<Node> {
        let kind = match object.kind {
            ObjectKind::Ident => NodeKind::Ident,
            ObjectKind::Widget => NodeKind::Widget,
            ObjectKind::Block => NodeKind::Block,
            ObjectKind::List => NodeKind::List,
            ObjectKind::BlockEnd | ObjectKind::ListEnd => return None,
        };
        Some(Node {
            name: object.name,
            value: object.value,
            kind,
            anonymous: object.anonymous,
            list_item: object.list_item,
            string: object.string,
            parent,
            first_child: 0,
            child_count: 0,
        })
    }
}

/// A cheap handle to one node of a [`Document`].
#[derive(Clone, Copy)]
pub struct NodeRef<'doc> {
    pub(crate) doc: &'doc Document<'doc>,
    pub(crate) index: usize,
}

impl<'doc> NodeRef<'doc> {
    fn node(&self) -> &'doc Node {
        &self.doc.nodes[self.index]
    }

    /// Index of this node in the document's arena.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The node's name text. Anonymous blocks and lists report their
    /// opening `{`/`[`.
    pub fn name(&self) -> &'doc str {
        self.node().name.slice(self.doc.source)
    }

    /// The value text of a key/value pair, `None` for everything else.
    pub fn value(&self) -> Option<&'doc str> {
        self.node().value.map(|span| span.slice(self.doc.source))
    }

    /// Source span of the name.
    pub fn span(&self) -> Span {
        self.node().name
    }

    /// The node's kind.
    pub fn kind(&self) -> NodeKind {
        self.node().kind
    }

    /// Whether this block or list was introduced by its own `{`/`[`.
    pub fn is_anonymous(&self) -> bool {
        self.node().anonymous
    }

    /// Whether the enclosing scope is a list.
    pub fn is_list_item(&self) -> bool {
        self.node().list_item
    }

    /// Whether the name came from a quoted identifier.
    pub fn is_string(&self) -> bool {
        self.node().string
    }

    /// The parent node; `None` at top level.
    pub fn parent(&self) -> Option<NodeRef<'doc>> {
        self.node().parent.map(|index| NodeRef {
            doc: self.doc,
            index: index as usize,
        })
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.node().child_count as usize
    }

    /// Iterate over direct children in source order.
    pub fn children(&self) -> Children<'doc> {
        let node = self.node();
        let start = node.first_child as usize;
        Children {
            doc: self.doc,
            range: start..start + node.child_count as usize,
        }
    }

    /// Find a direct child by name. When a name repeats, the last
    /// occurrence wins.
    pub fn get(&self, name: &str) -> Option<NodeRef<'doc>> {
        let mut found = None;
        for child in self.children() {
            if child.name() == name {
                found = Some(child);
            }
        }
        found
    }

    /// Total number of descendants: children, grandchildren, and so on.
    pub fn children_total(&self) -> usize {
        let mut total = self.child_count();
        for child in self.children() {
            total += child.children_total();
        }
        total
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("value", &self.value())
            .field("children", &self.child_count())
            .finish()
    }
}

/// Iterator over a node's direct children.
#[derive(Clone)]
pub struct Children<'doc> {
    doc: &'doc Document<'doc>,
    range: std::ops::Range<usize>,
}

impl<'doc> Iterator for Children<'doc> {
    type Item = NodeRef<'doc>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.range.next()?;
        Some(NodeRef {
            doc: self.doc,
            index,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl ExactSizeIterator for Children<'_> {}
