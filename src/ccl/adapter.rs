//! C10: the Table<->CCL bridge. `run_script` is the sole entry point; the
//! caller (`Table::execute_ccl`/`add_col_using_ccl`/...) runs it inside a
//! single atomic closure on the table's `Actor`, so a whole script — however
//! many statements — is one critical section (§4.11).

use super::ast::Stmt;
use super::binder::{bind, Schema};
use super::evaluator::{eval_at_row, eval_broadcast, EvalContext};
use super::lexer::tokenize;
use super::parser::{parse, parse_expr};
use crate::bi_index::disambiguate_name;
use crate::error::Error;
use crate::table::TableInner;
use crate::value::Value;
use std::collections::HashMap;

/// Runs every statement of `script` against `inner` in order. Each
/// statement re-reads the schema, so a column created by an earlier
/// statement in the same script is visible to a later one. Stops at the
/// first error, leaving prior statements' effects applied — the script is
/// not transactional beyond serialized execution.
pub fn run_script(inner: &mut TableInner, script: &str) -> Result<(), Error> {
    let tokens = tokenize(script)?;
    let stmts = parse(&tokens)?;
    for stmt in &stmts {
        run_statement(inner, stmt)?;
    }
    Ok(())
}

/// Evaluates a single bare CCL expression (no `lhs =` prefix) and assigns
/// its result to `col_name`, creating the column if it doesn't yet exist.
/// Used by `AddColUsingCCL`/`EditCol*UsingCCL`, which name their target
/// column out-of-band rather than through a CCL statement.
pub fn run_assign(inner: &mut TableInner, col_name: &str, expr_src: &str) -> Result<(), Error> {
    let tokens = tokenize(expr_src)?;
    let expr = parse_expr(&tokens)?;
    apply(inner, col_name, &expr, AssignMode::CreateOrReplace)
}

fn run_statement(inner: &mut TableInner, stmt: &Stmt) -> Result<(), Error> {
    match stmt {
        // A bare `name = expr` statement may only touch a column that
        // already exists (§4.11 step 6, §7 `Inconsistent`); only `NEW`
        // creates.
        Stmt::Assign(name, expr) => apply(inner, name, expr, AssignMode::MustExist),
        Stmt::New(name, expr) => apply(inner, name, expr, AssignMode::New),
    }
}

enum AssignMode {
    /// `NEW(...)`: always creates a column, disambiguating the requested
    /// name against existing ones (`_1`, `_2`, ...) rather than erroring.
    New,
    /// A plain `name = expr` statement: the target must already exist.
    MustExist,
    /// `run_assign`'s entry points: create the column if absent, otherwise
    /// replace its data.
    CreateOrReplace,
}

/// Evaluates `expr` at every row 0..nrows. Under the `parallel` feature,
/// rows fan out across rayon's global pool — `EvalContext` carries no shared
/// mutable state, so each row evaluates independently of the others.
#[cfg(feature = "parallel")]
fn eval_rows(expr: &crate::ccl::ast::Expr, ctx: &EvalContext, nrows: usize) -> Result<Vec<Value>, Error> {
    use rayon::prelude::*;
    (0..nrows).into_par_iter().map(|r| eval_at_row(expr, ctx, r)).collect()
}

#[cfg(not(feature = "parallel"))]
fn eval_rows(expr: &crate::ccl::ast::Expr, ctx: &EvalContext, nrows: usize) -> Result<Vec<Value>, Error> {
    (0..nrows).map(|r| eval_at_row(expr, ctx, r)).collect()
}

fn apply(inner: &mut TableInner, col_name: &str, expr: &crate::ccl::ast::Expr, mode: AssignMode) -> Result<(), Error> {
    let existing = inner.col_index.index(col_name);

    let col_names: Vec<String> =
        inner.col_index.ids().into_iter().filter_map(|id| inner.col_index.get(id).map(str::to_string)).collect();

    let target_name = match mode {
        AssignMode::New => disambiguate_name(&col_names, col_name),
        AssignMode::MustExist => {
            if existing.is_none() {
                return Err(Error::inconsistent(format!("cannot assign to non-existent column '{col_name}'")));
            }
            col_name.to_string()
        }
        AssignMode::CreateOrReplace => col_name.to_string(),
    };

    let schema = Schema::new(col_names);
    let row_dependent = bind(expr, &schema)?;

    let row_names: HashMap<String, usize> = inner
        .row_index
        .ids()
        .into_iter()
        .filter_map(|id| inner.row_index.get(id).map(|n| (n.to_string(), id)))
        .collect();
    let nrows = inner.num_rows();

    let new_data: Vec<Value> = {
        let ctx = EvalContext::new(&schema, &inner.cols, &row_names, nrows);
        if row_dependent {
            eval_rows(expr, &ctx, nrows)?
        } else {
            let v = eval_broadcast(expr, &ctx)?;
            vec![v; nrows]
        }
    };

    match mode {
        AssignMode::New => {
            inner.col_index.assign(&target_name);
            inner.cols.push(new_data);
        }
        AssignMode::MustExist | AssignMode::CreateOrReplace => match existing {
            Some(id) => inner.cols[id] = new_data,
            None => {
                inner.col_index.assign(&target_name);
                inner.cols.push(new_data);
            }
        },
    }
    Ok(())
}
