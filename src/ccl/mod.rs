//! The column-calculation language: lexer -> parser -> binder -> evaluator,
//! a case-insensitive function registry, and the Table adapter that ties
//! them together (§4.6-4.11).

pub mod adapter;
pub mod ast;
pub mod binder;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod registry;

pub use ast::{BinOp, Expr, RowSel, Stmt, UnOp};
pub use binder::Schema;
pub use registry::register_standard_functions;
