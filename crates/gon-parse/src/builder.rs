//! The object builder state machine.

use gon_tokenizer::{Span, Token, TokenKind, Tokenizer};
use tracing::trace;

use crate::object::{Object, ObjectKind};

/// Maximum nesting depth for list-tracked scopes.
///
/// The deepest level a push can reach is `MAX_SUB_OBJECT_DEPTH - 1`; one
/// push beyond that is the fatal [`BuilderError::DepthExceeded`].
pub const MAX_SUB_OBJECT_DEPTH: usize = 5;

/// Fatal error raised by the object builder.
///
/// There is exactly one: too much nesting. It is sticky; once raised,
/// every further [`ObjectBuilder::next_object`] call returns `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderError {
    /// A `{`/`[` tried to push past [`MAX_SUB_OBJECT_DEPTH`].
    DepthExceeded {
        /// Span of the offending opening token.
        span: Span,
    },
}

impl BuilderError {
    /// Span of the token that triggered the error.
    pub fn span(&self) -> Span {
        match self {
            BuilderError::DepthExceeded { span } => *span,
        }
    }
}

impl std::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuilderError::DepthExceeded { span } => write!(
                f,
                "maximum nesting depth ({}) exceeded at offset {}",
                MAX_SUB_OBJECT_DEPTH, span.start
            ),
        }
    }
}

impl std::error::Error for BuilderError {}

/// A parser that returns one classified [`Object`] per call.
///
/// All parsing state lives in the builder value itself: the tokenizer
/// cursor, the bounded "is this level a list" stack, and the sticky error.
/// That makes a builder cheap to restart anywhere in the source, which the
/// tree assembler exploits to collect each parent's children in its own
/// pass.
pub struct ObjectBuilder<'src> {
    tokenizer: Tokenizer<'src>,
    /// Per-level list flag. Level 0 is the top-level scope.
    in_list: [bool; MAX_SUB_OBJECT_DEPTH + 1],
    depth: usize,
    error: Option<BuilderError>,
}

impl<'src> ObjectBuilder<'src> {
    /// Create a builder over the full source text.
    pub fn new(source: &'src str) -> Self {
        Self::from_tokenizer(Tokenizer::new(source))
    }

    /// Create a builder whose cursor starts at `offset` into `source`,
    /// with fresh nesting state.
    pub fn resume_at(source: &'src str, offset: usize) -> Self {
        Self::from_tokenizer(Tokenizer::starting_at(source, offset))
    }

    fn from_tokenizer(tokenizer: Tokenizer<'src>) -> Self {
        Self {
            tokenizer,
            in_list: [false; MAX_SUB_OBJECT_DEPTH + 1],
            depth: 0,
            error: None,
        }
    }

    /// The sticky error, if one has been raised.
    pub fn error(&self) -> Option<BuilderError> {
        self.error
    }

    /// One token of lookahead, without committing the cursor.
    fn peek(&self) -> Token<'src> {
        self.tokenizer.clone().next_token()
    }

    /// Push a nesting level. Returns false (and poisons the builder) when
    /// the level would exceed [`MAX_SUB_OBJECT_DEPTH`].
    fn push_level(&mut self, list: bool, span: Span) -> bool {
        if self.depth + 1 < MAX_SUB_OBJECT_DEPTH {
            self.depth += 1;
            if list {
                self.in_list[self.depth] = true;
            }
            true
        } else {
            self.error = Some(BuilderError::DepthExceeded { span });
            false
        }
    }

    /// Advance to the next object in the stream.
    ///
    /// Returns `None` at end of input, after the sticky error, or at a `]`
    /// with no list open (the stream silently ends there). Malformed runs
    /// (a stray `:` or `,`, a key followed by a closer, an identifier at
    /// end of input) produce no object; the builder moves on.
    pub fn next_object(&mut self) -> Option<Object> {
        if self.error.is_some() {
            return None;
        }

        loop {
            let head = self.tokenizer.next_token();

            // Flags come from the head token and the scope it was read in,
            // before any depth transition below.
            let mut object = Object {
                name: head.span,
                value: None,
                kind: ObjectKind::Ident,
                anonymous: false,
                list_item: self.in_list[self.depth],
                string: head.kind == TokenKind::QuotedIdent,
            };

            match head.kind {
                TokenKind::Eof => return None,

                TokenKind::LBrace => {
                    object.kind = ObjectKind::Block;
                    object.anonymous = true;
                    // Blocks only occupy a nesting level inside lists;
                    // plain block nesting is tracked by scope counting in
                    // the assembler instead.
                    if self.in_list[self.depth] && !self.push_level(false, head.span) {
                        return None;
                    }
                    trace!("object {:?} at {:?}", object.kind, object.name);
                    return Some(object);
                }

                TokenKind::RBrace => {
                    object.kind = ObjectKind::BlockEnd;
                    if self.depth > 0 && self.in_list[self.depth - 1] {
                        self.depth -= 1;
                    }
                    return Some(object);
                }

                TokenKind::LBracket => {
                    object.kind = ObjectKind::List;
                    object.anonymous = true;
                    if !self.push_level(true, head.span) {
                        return None;
                    }
                    trace!("object {:?} at {:?}", object.kind, object.name);
                    return Some(object);
                }

                TokenKind::RBracket => {
                    if !self.in_list[self.depth] {
                        // A `]` with no list open: consumed, and object
                        // production ends here.
                        return None;
                    }
                    object.kind = ObjectKind::ListEnd;
                    self.in_list[self.depth] = false;
                    if self.depth > 0 {
                        self.depth -= 1;
                    }
                    // Trailing comma elision: `],` reads as `]`.
                    if self.peek().kind == TokenKind::Comma {
                        self.tokenizer.next_token();
                    }
                    return Some(object);
                }

                TokenKind::BareIdent | TokenKind::QuotedIdent => {
                    let peeked = self.peek();
                    if peeked.kind == TokenKind::Eof {
                        // A lone identifier at end of input never becomes
                        // an object.
                        return None;
                    }

                    if peeked.kind != TokenKind::Colon && self.in_list[self.depth] {
                        // Bare list element; a separating comma is eaten.
                        if peeked.kind == TokenKind::Comma {
                            self.tokenizer.next_token();
                        }
                        object.kind = ObjectKind::Ident;
                        trace!("object {:?} at {:?}", object.kind, object.name);
                        return Some(object);
                    }

                    // Keyed form: the token after an optional `,` or `:`
                    // decides what this object is.
                    let mut context = self.tokenizer.next_token();
                    if context.kind == TokenKind::Comma || context.kind == TokenKind::Colon {
                        context = self.tokenizer.next_token();
                    }

                    match context.kind {
                        TokenKind::LBrace => {
                            object.kind = ObjectKind::Block;
                            trace!("object {:?} at {:?}", object.kind, object.name);
                            return Some(object);
                        }
                        TokenKind::LBracket => {
                            object.kind = ObjectKind::List;
                            if !self.push_level(true, context.span) {
                                return None;
                            }
                            trace!("object {:?} at {:?}", object.kind, object.name);
                            return Some(object);
                        }
                        TokenKind::BareIdent | TokenKind::QuotedIdent => {
                            object.kind = ObjectKind::Widget;
                            object.value = Some(context.span);
                            trace!("object {:?} at {:?}", object.kind, object.name);
                            return Some(object);
                        }
                        _ => {
                            // A key with no usable value: both tokens are
                            // dropped and the builder moves on.
                            continue;
                        }
                    }
                }

                // A separator on its own produces nothing.
                TokenKind::Colon | TokenKind::Comma => continue,
            }
        }
    }
}

impl<'src> Iterator for ObjectBuilder<'src> {
    type Item = Object;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_object()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objects(source: &str) -> Vec<Object> {
        ObjectBuilder::new(source).collect()
    }

    fn kinds(source: &str) -> Vec<ObjectKind> {
        objects(source).iter().map(|o| o.kind).collect()
    }

    fn names<'a>(source: &'a str) -> Vec<&'a str> {
        objects(source)
            .iter()
            .map(|o| o.name.slice(source))
            .collect()
    }

    #[test]
    fn test_widget() {
        let source = "speed 4.5";
        let objs = objects(source);
        assert_eq!(objs.len(), 1);
        assert_eq!(objs[0].kind, ObjectKind::Widget);
        assert_eq!(objs[0].name.slice(source), "speed");
        assert_eq!(objs[0].value.unwrap().slice(source), "4.5");
    }

    #[test]
    fn test_widget_with_colon() {
        let source = "speed: 4.5";
        let objs = objects(source);
        assert_eq!(objs[0].kind, ObjectKind::Widget);
        assert_eq!(objs[0].value.unwrap().slice(source), "4.5");
    }

    #[test]
    fn test_named_block() {
        let source = "a { b 1 }";
        assert_eq!(
            kinds(source),
            vec![ObjectKind::Block, ObjectKind::Widget, ObjectKind::BlockEnd]
        );
        assert_eq!(names(source), vec!["a", "b", "}"]);
        assert!(!objects(source)[0].anonymous);
    }

    #[test]
    fn test_anonymous_block() {
        let source = "{ x 1 }";
        let objs = objects(source);
        assert_eq!(objs[0].kind, ObjectKind::Block);
        assert!(objs[0].anonymous);
        assert_eq!(objs[0].name.slice(source), "{");
    }

    #[test]
    fn test_list_elements() {
        let source = "l [ 1, 2, 3 ]";
        let objs = objects(source);
        assert_eq!(
            objs.iter().map(|o| o.kind).collect::<Vec<_>>(),
            vec![
                ObjectKind::List,
                ObjectKind::Ident,
                ObjectKind::Ident,
                ObjectKind::Ident,
                ObjectKind::ListEnd,
            ]
        );
        assert!(!objs[0].list_item);
        assert!(objs[1].list_item && objs[2].list_item && objs[3].list_item);
        assert_eq!(objs[2].name.slice(source), "2");
    }

    #[test]
    fn test_keyed_pair_inside_list() {
        let source = "[ a: 5 ]";
        let objs = objects(source);
        assert_eq!(objs[1].kind, ObjectKind::Widget);
        assert!(objs[1].list_item);
        assert_eq!(objs[1].value.unwrap().slice(source), "5");
    }

    #[test]
    fn test_block_inside_list() {
        let source = "[ { x 1 } ]";
        let objs = objects(source);
        assert_eq!(
            objs.iter().map(|o| o.kind).collect::<Vec<_>>(),
            vec![
                ObjectKind::List,
                ObjectKind::Block,
                ObjectKind::Widget,
                ObjectKind::BlockEnd,
                ObjectKind::ListEnd,
            ]
        );
        // the block is a list item; its contents are not
        assert!(objs[1].list_item);
        assert!(!objs[2].list_item);
    }

    #[test]
    fn test_trailing_comma_after_list() {
        let source = "l [ 1 ], x 2";
        let objs = objects(source);
        assert_eq!(objs.last().unwrap().kind, ObjectKind::Widget);
        assert_eq!(objs.last().unwrap().name.slice(source), "x");
    }

    #[test]
    fn test_quoted_name_sets_string_flag() {
        let source = "\"weird key\" 5";
        let objs = objects(source);
        assert_eq!(objs[0].kind, ObjectKind::Widget);
        assert!(objs[0].string);
        assert_eq!(objs[0].name.slice(source), "weird key");
        assert_eq!(objs[0].value.unwrap().slice(source), "5");
    }

    #[test]
    fn test_quoted_list_element() {
        let source = "[ \"a b\" ]";
        let objs = objects(source);
        assert_eq!(objs[1].kind, ObjectKind::Ident);
        assert!(objs[1].string);
        assert!(objs[1].list_item);
    }

    #[test]
    fn test_depth_at_limit_parses() {
        // four nested list levels: pushes to depths 1 through 4
        let source = "[ [ [ [ x ] ] ] ]";
        let mut builder = ObjectBuilder::new(source);
        let collected: Vec<_> = builder.by_ref().collect();
        assert!(builder.error().is_none());
        assert_eq!(
            collected.iter().filter(|o| o.kind == ObjectKind::List).count(),
            4
        );
    }

    #[test]
    fn test_depth_beyond_limit_is_sticky() {
        let source = "[ [ [ [ [ x ] ] ] ] ]";
        let mut builder = ObjectBuilder::new(source);
        while builder.next_object().is_some() {}
        let err = builder.error().expect("expected depth error");
        assert_eq!(err.span().slice(source), "[");
        // sticky: the builder stays dead
        assert!(builder.next_object().is_none());
        assert!(builder.next_object().is_none());
    }

    #[test]
    fn test_keyed_list_counts_against_depth() {
        let source = "l [ [ [ [ [ x ] ] ] ] ]";
        let mut builder = ObjectBuilder::new(source);
        while builder.next_object().is_some() {}
        assert!(builder.error().is_some());
    }

    #[test]
    fn test_stray_list_close_ends_stream() {
        let source = "] a 1";
        let mut builder = ObjectBuilder::new(source);
        assert!(builder.next_object().is_none());
        assert!(builder.error().is_none());
    }

    #[test]
    fn test_stray_block_close_is_emitted() {
        assert_eq!(
            kinds("} a 1"),
            vec![ObjectKind::BlockEnd, ObjectKind::Widget]
        );
    }

    #[test]
    fn test_key_followed_by_closer_is_dropped() {
        // `a` swallows the `}` while looking for its value; both vanish
        let source = "{ a } b 2";
        let objs = objects(source);
        assert_eq!(
            objs.iter().map(|o| o.kind).collect::<Vec<_>>(),
            vec![ObjectKind::Block, ObjectKind::Widget]
        );
        assert_eq!(objs[1].name.slice(source), "b");
    }

    #[test]
    fn test_lone_trailing_ident_is_dropped() {
        let source = "a 1 b";
        let objs = objects(source);
        assert_eq!(objs.len(), 1);
        assert_eq!(objs[0].name.slice(source), "a");
    }

    #[test]
    fn test_stray_separators_are_skipped() {
        assert_eq!(kinds(": a 1"), vec![ObjectKind::Widget]);
        assert_eq!(kinds(", a 1"), vec![ObjectKind::Widget]);
    }

    #[test]
    fn test_resume_at_reparses_one_object() {
        let source = "skip me d { z 2 }";
        // find the span of `d` via a full run
        let objs = objects(source);
        let d = objs.iter().find(|o| o.name.slice(source) == "d").unwrap();
        let mut resumed = ObjectBuilder::resume_at(source, d.name.start as usize);
        let first = resumed.next_object().unwrap();
        assert_eq!(first.kind, ObjectKind::Block);
        assert_eq!(first.name.slice(source), "d");
        let second = resumed.next_object().unwrap();
        assert_eq!(second.name.slice(source), "z");
    }

    #[test]
    fn test_comments_between_objects() {
        let source = "a 1 -- comment\n--[[ block ]] b 2";
        assert_eq!(names(source), vec!["a", "b"]);
    }
}
