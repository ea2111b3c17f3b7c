#![doc = include_str!("../README.md")]

pub use gon_tokenizer::{Cut, Span, Token, TokenKind, Tokenizer, cut};

mod object;
pub use object::{Object, ObjectKind};

mod builder;
pub use builder::{BuilderError, MAX_SUB_OBJECT_DEPTH, ObjectBuilder};
