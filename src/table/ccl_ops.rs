//! Table-facing entry points into the CCL pipeline (§4.11): `AddColUsingCCL`,
//! `EditColByIndexUsingCCL`, `EditColByNameUsingCCL`, `ExecuteCCL`. Each runs
//! inside one atomic closure on the table's own `Actor`.

use super::Table;
use crate::ccl::adapter;

impl Table {
    /// Creates a new column named `name` from a single CCL expression.
    pub fn add_col_using_ccl(&self, name: impl Into<String>, expr: impl Into<String>) -> &Self {
        let (name, expr) = (name.into(), expr.into());
        let result = self.with_inner_mut(move |inner| adapter::run_assign(inner, &name, &expr));
        if let Err(e) = result {
            self.record_warning("AddColUsingCCL", e.to_string());
        }
        self
    }

    pub fn edit_col_by_index_using_ccl(&self, col: i64, expr: impl Into<String>) -> &Self {
        let Some(name) = self.get_col_name(col) else {
            self.record_warning("EditColByIndexUsingCCL", format!("column {col} out of range"));
            return self;
        };
        self.edit_col_by_name_using_ccl(name, expr)
    }

    pub fn edit_col_by_name_using_ccl(&self, name: impl Into<String>, expr: impl Into<String>) -> &Self {
        let (name, expr) = (name.into(), expr.into());
        let result = self.with_inner_mut(move |inner| adapter::run_assign(inner, &name, &expr));
        if let Err(e) = result {
            self.record_warning("EditColByNameUsingCCL", e.to_string());
        }
        self
    }

    /// Runs a full, possibly multi-statement, CCL script against the table.
    pub fn execute_ccl(&self, script: impl Into<String>) -> &Self {
        let script = script.into();
        let result = self.with_inner_mut(move |inner| adapter::run_script(inner, &script));
        if let Err(e) = result {
            self.record_warning("ExecuteCCL", e.to_string());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ccl::registry::register_standard_functions;
    use crate::value::Value;

    fn sample() -> Table {
        register_standard_functions();
        Table::from_columns(vec![
            ("A".into(), vec![Value::Float(1.0), Value::Float(2.0)]),
            ("B".into(), vec![Value::Float(10.0), Value::Float(20.0)]),
        ])
    }

    #[test]
    fn add_col_using_ccl_creates_column() {
        let t = sample();
        t.add_col_using_ccl("C", "A + B");
        assert_eq!(t.get_col_by_name("C"), vec![Value::Float(11.0), Value::Float(22.0)]);
    }

    #[test]
    fn execute_ccl_runs_multi_statement_script() {
        let t = sample();
        t.execute_ccl("NEW('C') = A + B; NEW('D') = C * 2");
        assert_eq!(t.get_col_by_name("D"), vec![Value::Float(22.0), Value::Float(44.0)]);
    }

    #[test]
    fn edit_col_by_name_replaces_existing_data() {
        let t = sample();
        t.edit_col_by_name_using_ccl("A", "A * 10");
        assert_eq!(t.get_col_by_name("A"), vec![Value::Float(10.0), Value::Float(20.0)]);
    }

    #[test]
    fn unknown_column_reference_records_warning() {
        let t = sample();
        t.add_col_using_ccl("C", "Z + 1");
        assert!(t.err().is_some());
    }
}
