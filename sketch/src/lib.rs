//! Core of the sketch template engine.
//!
//! Source text becomes a [`tree::RangeTree`] of labeled, properly nested
//! ranges; a compiler turns the tree into an [`instruction::Instruction`]
//! program; the program runs against a [`memory::Memory`] and prints into
//! its console.

pub mod algebra;
pub mod document;
pub mod instruction;
pub mod memory;
pub mod parser;
pub mod range;
pub mod tree;

pub use document::Document;
pub use range::Range;
