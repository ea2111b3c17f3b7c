#![doc = include_str!("../README.md")]

mod span;
pub use span::{Cut, Span, cut};

mod token;
pub use token::{Token, TokenKind};

mod tokenizer;
pub use tokenizer::Tokenizer;
