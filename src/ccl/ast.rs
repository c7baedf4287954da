//! AST produced by the parser, consumed by the binder and evaluator.

use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq)]
pub enum RowSel {
    Index(i64),
    Name(SmolStr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    String(SmolStr),
    /// A bare or bracketed identifier referring to a column, meaning "this
    /// column's value in the row currently being evaluated".
    Column(SmolStr),
    /// `column.rowRef` — one specific cell, independent of the row being
    /// evaluated.
    Dotted(SmolStr, RowSel),
    /// `@.rowRef` — every column's value at one specific row, as a list.
    /// Valid only as a direct aggregate-function argument.
    FullRow(RowSel),
    Call(SmolStr, Vec<Expr>),
    Unary(UnOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `lhs = expr` — `lhs` is an existing or new column name.
    Assign(SmolStr, Expr),
    /// `NEW('name', expr)` — always creates a column, erroring if the name
    /// already exists.
    New(SmolStr, Expr),
}
