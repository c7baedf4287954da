//! Whole-table row pruning for missing data, mirroring `List::drop_nan`/
//! `drop_nil` at table scope (§4.5).

use super::Table;

impl Table {
    /// Drops every row containing at least one `NaN` float anywhere in its
    /// columns.
    pub fn drop_rows_with_nan(&self) -> &Self {
        self.filter_rows(|row| !row.iter().any(|v| matches!(v, crate::value::Value::Float(f) if f.is_nan())));
        self
    }

    /// Drops every row containing at least one `Value::Null`.
    pub fn drop_rows_with_nil(&self) -> &Self {
        self.filter_rows(|row| !row.iter().any(|v| v.is_null()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn drop_rows_with_nan_removes_only_affected_rows() {
        let t = Table::from_columns(vec![("a".into(), vec![Value::Float(1.0), Value::Float(f64::NAN), Value::Float(2.0)])]);
        t.drop_rows_with_nan();
        assert_eq!(t.num_rows(), 2);
    }

    #[test]
    fn drop_rows_with_nil_removes_only_affected_rows() {
        let t = Table::from_columns(vec![("a".into(), vec![Value::Int(1), Value::Null, Value::Int(2)])]);
        t.drop_rows_with_nil();
        assert_eq!(t.num_rows(), 2);
    }
}
