//! Document model.
//!
//! This module defines the lightweight markdown AST produced by the parser
//! and the content analysis snapshot derived from it.

mod analysis;
mod ast;
mod node;

pub use analysis::*;
pub use ast::*;
pub use node::*;
