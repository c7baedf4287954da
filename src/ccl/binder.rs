//! C7: resolves identifiers against a schema snapshot and classifies each
//! expression as row-dependent (its value can differ per row) or not, ahead
//! of evaluation.

use super::ast::Expr;
use super::registry;
use crate::error::Error;

/// An immutable, point-in-time view of a table's column names, taken once
/// per statement so a script's later statements see earlier ones' edits
/// (re-snapshotting happens in `adapter::run_script`, not here).
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Resolves `name` to a column position the way a CCL formula does: an
    /// explicit column name always wins; only when no column carries that
    /// literal name is `name` interpreted as a case-insensitive alpha index
    /// (`A`, `BC`, ...) — the precedence rule from §9.
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.position(name).or_else(|| crate::alpha::alpha_to_index(name).filter(|&i| i < self.columns.len()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Validates every column reference in `expr` against `schema` and returns
/// whether the expression's value can vary by row.
pub fn bind(expr: &Expr, schema: &Schema) -> Result<bool, Error> {
    match expr {
        Expr::Number(_) | Expr::String(_) => Ok(false),
        Expr::Column(name) => {
            schema.resolve(name).ok_or_else(|| Error::invalid_argument(format!("unknown column '{name}'")))?;
            Ok(true)
        }
        Expr::Dotted(name, _row) => {
            schema.resolve(name).ok_or_else(|| Error::invalid_argument(format!("unknown column '{name}'")))?;
            Ok(false)
        }
        Expr::FullRow(_row) => Ok(false),
        Expr::Call(name, args) => {
            let mut any_dependent = false;
            for a in args {
                any_dependent |= bind(a, schema)?;
            }
            if registry::scalar_fn(name).is_none() && registry::aggregate_fn(name).is_none() {
                return Err(Error::invalid_argument(format!("unknown function '{name}'")));
            }
            // An aggregate collapses every row into one scalar: its call
            // is never itself row-dependent, regardless of its arguments'.
            Ok(if registry::is_aggregate(name) { false } else { any_dependent })
        }
        Expr::Unary(_, e) => bind(e, schema),
        Expr::Binary(_, l, r) => Ok(bind(l, schema)? || bind(r, schema)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ccl::ast::RowSel;
    use crate::ccl::registry::register_standard_functions;

    fn schema() -> Schema {
        Schema::new(vec!["A".into(), "B".into()])
    }

    #[test]
    fn column_reference_is_row_dependent() {
        assert!(bind(&Expr::Column("A".into()), &schema()).unwrap());
    }

    #[test]
    fn dotted_reference_is_not_row_dependent() {
        assert!(!bind(&Expr::Dotted("A".into(), RowSel::Index(0)), &schema()).unwrap());
    }

    #[test]
    fn unknown_column_errors() {
        assert!(bind(&Expr::Column("Z".into()), &schema()).is_err());
    }

    #[test]
    fn alpha_index_resolves_when_no_explicit_column_has_that_name() {
        // Columns are "price", "qty" -- "B" isn't a real name, so it falls
        // back to alpha index 1 ("qty").
        let s = Schema::new(vec!["price".into(), "qty".into()]);
        assert_eq!(s.resolve("B"), Some(1));
        assert_eq!(s.resolve("b"), Some(1));
    }

    #[test]
    fn explicit_column_name_wins_over_alpha_index_interpretation() {
        // A real column literally named "B" takes precedence over the
        // alpha-index-1 interpretation of "B", which here would be "other".
        let s = Schema::new(vec!["A".into(), "other".into(), "B".into()]);
        assert_eq!(s.resolve("B"), Some(2));
    }

    #[test]
    fn alpha_index_out_of_range_does_not_resolve() {
        let s = schema();
        assert_eq!(s.resolve("ZZ"), None);
    }

    #[test]
    fn aggregate_call_collapses_row_dependence() {
        register_standard_functions();
        let call = Expr::Call("SUM".into(), vec![Expr::Column("A".into())]);
        assert!(!bind(&call, &schema()).unwrap());
    }

    #[test]
    fn scalar_call_propagates_row_dependence() {
        register_standard_functions();
        let call = Expr::Call("IF".into(), vec![Expr::Column("A".into()), Expr::Number(1.0), Expr::Number(0.0)]);
        assert!(bind(&call, &schema()).unwrap());
    }
}
