//! Three-pass forest assembly.
//!
//! The object builder is cheap to restart anywhere in the source, and the
//! assembler leans on that:
//!
//! 1. A count pass sizes the arena exactly.
//! 2. A top-level pass appends every scope-0 object, in source order, as
//!    the first band of the arena.
//! 3. A children pass scans the arena by index (including entries it
//!    appends itself) and for each block or list re-parses from that
//!    object's own source position, appending its direct children to the
//!    arena's tail. Grandchildren are picked up later in the same scan,
//!    which is what makes the final layout breadth-first and every child
//!    run contiguous.

use gon_parse::{ObjectBuilder, ObjectKind, Span};
use tracing::debug;

use crate::arena::Arena;
use crate::diagnostic::{ParseError, ParseErrorKind};
use crate::node::{Node, NodeKind};

pub(crate) struct Forest {
    pub(crate) nodes: Box<[Node]>,
    pub(crate) top_level: usize,
}

/// Track the scope level across one object. Clamped at zero so stray
/// closers cannot drive the count and placement passes apart.
fn next_scope(scope: usize, kind: ObjectKind) -> usize {
    if kind.opens_scope() {
        scope + 1
    } else if kind.is_terminator() {
        scope.saturating_sub(1)
    } else {
        scope
    }
}

/// Run a builder to completion, counting materializable objects and how
/// many of them sit at scope 0.
pub(crate) fn count_pass(builder: &mut ObjectBuilder) -> (usize, usize) {
    let mut all = 0;
    let mut top_level = 0;
    let mut scope = 0;
    while let Some(object) = builder.next_object() {
        if !object.kind.is_terminator() {
            all += 1;
            if scope == 0 {
                top_level += 1;
            }
        }
        scope = next_scope(scope, object.kind);
    }
    (all, top_level)
}

pub(crate) fn assemble(source: &str) -> Result<Forest, ParseError> {
    let mut builder = ObjectBuilder::new(source);
    let (all, top_level) = count_pass(&mut builder);
    if let Some(err) = builder.error() {
        return Err(err.into());
    }
    debug!(all, top_level, "sized forest");

    let mut arena: Arena<Node> = Arena::with_capacity(all);

    // Top-level band, in source order.
    let mut builder = ObjectBuilder::new(source);
    let mut scope = 0;
    while let Some(object) = builder.next_object() {
        if scope == 0 {
            if let Some(node) = Node::materialize(&object, None) {
                let at = append(&mut arena, object.name)?;
                arena[at] = node;
            }
        }
        scope = next_scope(scope, object.kind);
    }

    // Children bands. `arena.len()` grows under this loop.
    let mut index = 0;
    while index < arena.len() {
        let (kind, name, string) = {
            let node = &arena[index];
            (node.kind, node.name, node.string)
        };
        if matches!(kind, NodeKind::Block | NodeKind::List) {
            let (first_child, child_count) =
                collect_children(source, name, string, index, &mut arena)?;
            arena[index].first_child = first_child;
            arena[index].child_count = child_count;
        }
        index += 1;
    }

    Ok(Forest {
        nodes: arena.into_boxed_slice(),
        top_level,
    })
}

/// Append the direct children of the node at `parent` to the arena tail.
///
/// The parent's name span points at its own position in the source, so a
/// fresh builder started there re-parses the parent first; quoted names
/// start one byte past their opening quote, so those rewind by one to take
/// the quote back in. The collection loop runs until the parent's matching
/// closer, so no other parent's children can interleave into this run.
fn collect_children(
    source: &str,
    name: Span,
    string: bool,
    parent: usize,
    arena: &mut Arena<Node>,
) -> Result<(u32, u32), ParseError> {
    let mut start = name.start as usize;
    if string {
        start -= 1;
    }
    let mut builder = ObjectBuilder::resume_at(source, start);
    builder.next_object();

    let mut first_child = 0;
    let mut child_count = 0u32;
    let mut scope = 1;
    while scope > 0 {
        let Some(object) = builder.next_object() else {
            break;
        };
        if scope == 1 {
            if let Some(node) = Node::materialize(&object, Some(parent as u32)) {
                let at = append(arena, object.name)?;
                if child_count == 0 {
                    first_child = at as u32;
                }
                arena[at] = node;
                child_count += 1;
            }
        }
        scope = next_scope(scope, object.kind);
    }
    Ok((first_child, child_count))
}

/// One slot from the arena, with exhaustion surfaced as a parse error.
/// The count pass makes exhaustion unreachable in practice.
fn append(arena: &mut Arena<Node>, at: Span) -> Result<usize, ParseError> {
    arena
        .alloc(1)
        .ok_or_else(|| ParseError::new(ParseErrorKind::ArenaExhausted, at))
}
