//! Parsed objects - the per-call output of the object builder.

use gon_tokenizer::Span;

/// What kind of object a token run turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// A bare value with no key, e.g. a list element.
    Ident,
    /// A key/value pair: `speed 4.5` or `speed: 4.5`.
    Widget,
    /// A `{ ... }` grouping, named or anonymous.
    Block,
    /// A `[ ... ]` grouping whose direct children are list items.
    List,
    /// Closing `}`. Transient: consumed during tree assembly, never part of
    /// a finished forest.
    BlockEnd,
    /// Closing `]`. Transient, like [`ObjectKind::BlockEnd`].
    ListEnd,
}

impl ObjectKind {
    /// Whether this is a transient closing marker.
    pub fn is_terminator(&self) -> bool {
        matches!(self, ObjectKind::BlockEnd | ObjectKind::ListEnd)
    }

    /// Whether objects after this one sit a scope level deeper.
    pub fn opens_scope(&self) -> bool {
        matches!(self, ObjectKind::Block | ObjectKind::List)
    }
}

/// One classified object from the builder.
///
/// Spans reference the source buffer the builder was created over. The name
/// span always points at the object's own location in the source: for named
/// objects it covers the key, for anonymous blocks and lists it covers the
/// opening `{`/`[`, and for terminators the closer itself. The tree
/// assembler relies on this to re-enter the stream at any object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Object {
    /// Name span. For quoted names this excludes the quotes.
    pub name: Span,
    /// Value span; populated only for [`ObjectKind::Widget`].
    pub value: Option<Span>,
    /// Classification of this object.
    pub kind: ObjectKind,
    /// Set on blocks and lists introduced by their own `{`/`[` token.
    pub anonymous: bool,
    /// Set when the enclosing scope is a list.
    pub list_item: bool,
    /// Set when the name came from a quoted identifier.
    pub string: bool,
}
