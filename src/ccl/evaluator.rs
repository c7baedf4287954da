//! C8: row-driven expression evaluation over a point-in-time table
//! snapshot. Aggregate-function arguments are resolved per §4.9's rule:
//! a row-dependent argument contributes one value per row; a row-independent
//! one (a dotted cell, a full-row reference, a literal, a nested aggregate)
//! contributes its own value(s) exactly once. The combined list across all
//! arguments is what the aggregate reduces.

use super::ast::{BinOp, Expr, RowSel, UnOp};
use super::binder::Schema;
use super::registry;
use crate::error::Error;
use crate::value::Value;
use std::collections::HashMap;

/// Bounds aggregate/scalar call nesting so a pathological script can't blow
/// the stack; reset per top-level statement evaluation.
const MAX_CALL_DEPTH: usize = 64;

/// No interior-mutable call-depth counter here on purpose: the `parallel`
/// feature evaluates many rows against the same `&EvalContext` concurrently
/// (`ccl::adapter::apply`), and a counter shared across rows would sum
/// unrelated call stacks instead of bounding any single one. Depth is instead
/// threaded as a plain function argument, so each row's recursion is counted
/// independently no matter how many rows run at once.
pub struct EvalContext<'a> {
    pub schema: &'a Schema,
    pub cols: &'a [Vec<Value>],
    pub row_names: &'a HashMap<String, usize>,
    pub nrows: usize,
}

impl<'a> EvalContext<'a> {
    pub fn new(schema: &'a Schema, cols: &'a [Vec<Value>], row_names: &'a HashMap<String, usize>, nrows: usize) -> Self {
        Self { schema, cols, row_names, nrows }
    }

    fn resolve_row(&self, row: &RowSel) -> Result<usize, Error> {
        match row {
            RowSel::Index(i) => crate::list::normalize_index(*i, self.nrows).ok_or_else(|| Error::invalid_argument(format!("row index {i} out of range"))),
            RowSel::Name(n) => self.row_names.get(n.as_str()).copied().ok_or_else(|| Error::invalid_argument(format!("unknown row '{n}'"))),
        }
    }

    fn col_cell(&self, name: &str, row: usize) -> Result<Value, Error> {
        let pos = self.schema.resolve(name).ok_or_else(|| Error::invalid_argument(format!("unknown column '{name}'")))?;
        Ok(self.cols[pos][row].clone())
    }
}

/// Evaluates `expr` in the context of one specific row. Valid for both
/// row-dependent expressions (`Column` resolves against `row`) and
/// row-independent ones nested inside them (`Dotted`/`FullRow`/literals
/// ignore `row` and use their own explicit reference).
pub fn eval_at_row(expr: &Expr, ctx: &EvalContext, row: usize) -> Result<Value, Error> {
    eval_at_row_depth(expr, ctx, row, 0)
}

fn eval_at_row_depth(expr: &Expr, ctx: &EvalContext, row: usize, depth: usize) -> Result<Value, Error> {
    match expr {
        Expr::Number(n) => Ok(Value::Float(*n)),
        Expr::String(s) => Ok(Value::Str(s.clone())),
        Expr::Column(name) => ctx.col_cell(name, row),
        Expr::Dotted(name, rowsel) => {
            let r = ctx.resolve_row(rowsel)?;
            ctx.col_cell(name, r)
        }
        Expr::FullRow(_) => Err(Error::invalid_argument("@.row is only valid as an aggregate-function argument")),
        Expr::Unary(op, e) => {
            let v = eval_at_row_depth(e, ctx, row, depth)?;
            Ok(match op {
                UnOp::Neg => Value::Float(-v.to_f64_lossy()),
                UnOp::Not => Value::Bool(!v.truthy()),
            })
        }
        Expr::Binary(op, l, r) => eval_binary(op, l, r, ctx, row, depth),
        Expr::Call(name, args) => eval_call(name, args, ctx, row, depth),
    }
}

fn eval_binary(op: &BinOp, l: &Expr, r: &Expr, ctx: &EvalContext, row: usize, depth: usize) -> Result<Value, Error> {
    if matches!(op, BinOp::And) {
        let lv = eval_at_row_depth(l, ctx, row, depth)?;
        if !lv.truthy() {
            return Ok(Value::Bool(false));
        }
        return Ok(Value::Bool(eval_at_row_depth(r, ctx, row, depth)?.truthy()));
    }
    if matches!(op, BinOp::Or) {
        let lv = eval_at_row_depth(l, ctx, row, depth)?;
        if lv.truthy() {
            return Ok(Value::Bool(true));
        }
        return Ok(Value::Bool(eval_at_row_depth(r, ctx, row, depth)?.truthy()));
    }

    let lv = eval_at_row_depth(l, ctx, row, depth)?;
    let rv = eval_at_row_depth(r, ctx, row, depth)?;

    Ok(match op {
        BinOp::Add => {
            if let (Value::Str(_), _) | (_, Value::Str(_)) = (&lv, &rv) {
                Value::from(format!("{}{}", lv.stringify(), rv.stringify()))
            } else {
                Value::Float(lv.to_f64_lossy() + rv.to_f64_lossy())
            }
        }
        BinOp::Sub => Value::Float(lv.to_f64_lossy() - rv.to_f64_lossy()),
        BinOp::Mul => Value::Float(lv.to_f64_lossy() * rv.to_f64_lossy()),
        BinOp::Div => Value::Float(lv.to_f64_lossy() / rv.to_f64_lossy()),
        BinOp::Mod => Value::Float(lv.to_f64_lossy() % rv.to_f64_lossy()),
        BinOp::Pow => Value::Float(lv.to_f64_lossy().powf(rv.to_f64_lossy())),
        BinOp::Eq => Value::Bool(values_equal(&lv, &rv)),
        BinOp::NotEq => Value::Bool(!values_equal(&lv, &rv)),
        BinOp::Gt => Value::Bool(crate::value::compare_values(&lv, &rv) == std::cmp::Ordering::Greater),
        BinOp::Lt => Value::Bool(crate::value::compare_values(&lv, &rv) == std::cmp::Ordering::Less),
        BinOp::GtEq => Value::Bool(crate::value::compare_values(&lv, &rv) != std::cmp::Ordering::Less),
        BinOp::LtEq => Value::Bool(crate::value::compare_values(&lv, &rv) != std::cmp::Ordering::Greater),
        BinOp::And | BinOp::Or => unreachable!("handled above"),
    })
}

/// User-facing `==`: numeric values compare by coerced `f64` (so `Int(1)`
/// equals `Float(1.0)`) with `NaN` never equal to itself; everything else
/// falls back to `Value`'s derived structural equality.
fn values_equal(a: &Value, b: &Value) -> bool {
    if a.is_numeric() && b.is_numeric() {
        let (x, y) = (a.to_f64_lossy(), b.to_f64_lossy());
        !x.is_nan() && !y.is_nan() && x == y
    } else {
        a == b
    }
}

fn eval_call(name: &str, args: &[Expr], ctx: &EvalContext, row: usize, depth: usize) -> Result<Value, Error> {
    if depth >= MAX_CALL_DEPTH {
        return Err(Error::Recursion);
    }
    let depth = depth + 1;
    if registry::is_aggregate(name) {
        return eval_aggregate(name, args, ctx, depth);
    }
    let f = registry::scalar_fn(name).ok_or_else(|| Error::invalid_argument(format!("unknown function '{name}'")))?;
    let arg_values: Vec<Value> = args.iter().map(|a| eval_at_row_depth(a, ctx, row, depth)).collect::<Result<_, _>>()?;
    f(&arg_values)
}

/// Row-independent evaluation, used for statement-level expressions the
/// binder marked as not row-dependent (pure aggregates, literals, dotted
/// references, and combinations thereof).
pub fn eval_broadcast(expr: &Expr, ctx: &EvalContext) -> Result<Value, Error> {
    eval_at_row(expr, ctx, 0)
}

fn eval_aggregate(name: &str, args: &[Expr], ctx: &EvalContext, depth: usize) -> Result<Value, Error> {
    let reducer = registry::aggregate_fn(name).ok_or_else(|| Error::invalid_argument(format!("unknown aggregate '{name}'")))?;
    let mut values: Vec<Value> = Vec::new();
    for arg in args {
        collect_aggregate_inputs(arg, ctx, depth, &mut values)?;
    }
    let nums: Vec<f64> = values.iter().filter_map(|v| v.as_f64()).filter(|f| !f.is_nan()).collect();
    Ok(Value::Float(reducer(&nums)))
}

fn collect_aggregate_inputs(arg: &Expr, ctx: &EvalContext, depth: usize, out: &mut Vec<Value>) -> Result<(), Error> {
    if let Expr::FullRow(rowsel) = arg {
        let r = ctx.resolve_row(rowsel)?;
        for col in ctx.cols {
            out.push(col[r].clone());
        }
        return Ok(());
    }

    if super::binder::bind(arg, ctx.schema)? {
        for r in 0..ctx.nrows {
            out.push(eval_at_row_depth(arg, ctx, r, depth)?);
        }
    } else {
        out.push(eval_at_row_depth(arg, ctx, 0, depth)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ccl::ast::RowSel;
    use crate::ccl::lexer::tokenize;
    use crate::ccl::parser::parse;
    use crate::ccl::registry::register_standard_functions;

    fn ctx_for<'a>(schema: &'a Schema, cols: &'a [Vec<Value>], names: &'a HashMap<String, usize>) -> EvalContext<'a> {
        EvalContext::new(schema, cols, names, cols.first().map(|c| c.len()).unwrap_or(0))
    }

    #[test]
    fn evaluates_arithmetic_per_row() {
        register_standard_functions();
        let schema = Schema::new(vec!["A".into(), "B".into()]);
        let cols = vec![vec![Value::Float(1.0), Value::Float(2.0)], vec![Value::Float(10.0), Value::Float(20.0)]];
        let names = HashMap::new();
        let ctx = ctx_for(&schema, &cols, &names);
        let stmts = parse(&tokenize("C = A + B").unwrap()).unwrap();
        let expr = match &stmts[0] {
            crate::ccl::ast::Stmt::Assign(_, e) => e,
            _ => unreachable!(),
        };
        assert_eq!(eval_at_row(expr, &ctx, 0).unwrap(), Value::Float(11.0));
        assert_eq!(eval_at_row(expr, &ctx, 1).unwrap(), Value::Float(22.0));
    }

    #[test]
    fn sum_of_column_aggregates_all_rows() {
        register_standard_functions();
        let schema = Schema::new(vec!["A".into()]);
        let cols = vec![vec![Value::Float(1.0), Value::Float(2.0), Value::Float(3.0)]];
        let names = HashMap::new();
        let ctx = ctx_for(&schema, &cols, &names);
        let v = eval_aggregate("SUM", &[Expr::Column("A".into())], &ctx, 0).unwrap();
        assert_eq!(v, Value::Float(6.0));
    }

    #[test]
    fn sum_of_full_row_adds_every_column_at_that_row() {
        register_standard_functions();
        let schema = Schema::new(vec!["A".into(), "B".into()]);
        let cols = vec![vec![Value::Float(1.0)], vec![Value::Float(9.0)]];
        let names = HashMap::new();
        let ctx = ctx_for(&schema, &cols, &names);
        let v = eval_aggregate("SUM", &[Expr::FullRow(RowSel::Index(0))], &ctx, 0).unwrap();
        assert_eq!(v, Value::Float(10.0));
    }

    #[test]
    fn alpha_index_addresses_column_by_position() {
        register_standard_functions();
        // Columns are named "price"/"qty"; "A"/"B" aren't real names, so
        // they resolve by alpha index instead.
        let schema = Schema::new(vec!["price".into(), "qty".into()]);
        let cols = vec![vec![Value::Float(3.0)], vec![Value::Float(4.0)]];
        let names = HashMap::new();
        let ctx = ctx_for(&schema, &cols, &names);
        let stmts = parse(&tokenize("C = A + B").unwrap()).unwrap();
        let expr = match &stmts[0] {
            crate::ccl::ast::Stmt::Assign(_, e) => e,
            _ => unreachable!(),
        };
        assert_eq!(eval_at_row(expr, &ctx, 0).unwrap(), Value::Float(7.0));
    }

    #[test]
    fn string_plus_anything_concatenates() {
        let schema = Schema::new(vec![]);
        let cols: Vec<Vec<Value>> = vec![];
        let names = HashMap::new();
        let ctx = ctx_for(&schema, &cols, &names);
        let expr = Expr::Binary(BinOp::Add, Box::new(Expr::String("x".into())), Box::new(Expr::Number(1.0)));
        assert_eq!(eval_at_row(&expr, &ctx, 0).unwrap(), Value::from("x1"));
    }
}
