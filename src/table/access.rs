//! Element/row/column access and update (§4.5). Rows and columns may be
//! addressed by position or by name; out-of-range/unknown-name lookups
//! return `Value::Null` (or an empty `Vec`) and record a warning.

use super::Table;
use crate::list::normalize_index;
use crate::value::Value;

impl Table {
    fn col_id_by_index(&self, i: i64) -> Option<usize> {
        let ncols = self.num_cols();
        let pos = normalize_index(i, ncols)?;
        self.with_inner(move |inner| inner.col_index.ids().get(pos).copied())
    }

    fn row_id_by_index(&self, i: i64) -> Option<usize> {
        let nrows = self.num_rows();
        let pos = normalize_index(i, nrows)?;
        self.with_inner(move |inner| inner.row_index.ids().get(pos).copied())
    }

    fn col_id_by_name(&self, name: &str) -> Option<usize> {
        let name = name.to_string();
        self.with_inner(move |inner| inner.col_index.index(&name))
    }

    fn row_id_by_name(&self, name: &str) -> Option<usize> {
        let name = name.to_string();
        self.with_inner(move |inner| inner.row_index.index(&name))
    }

    pub fn get_element(&self, row: i64, col: i64) -> Value {
        match (self.row_id_by_index(row), self.col_id_by_index(col)) {
            (Some(r), Some(c)) => self.with_inner(move |inner| inner.cols[c][r].clone()),
            _ => {
                self.record_warning("GetElement", format!("({row}, {col}) out of range"));
                Value::Null
            }
        }
    }

    pub fn get_element_by_name(&self, row_name: &str, col_name: &str) -> Value {
        match (self.row_id_by_name(row_name), self.col_id_by_name(col_name)) {
            (Some(r), Some(c)) => self.with_inner(move |inner| inner.cols[c][r].clone()),
            _ => {
                self.record_warning("GetElementByName", format!("({row_name}, {col_name}) not found"));
                Value::Null
            }
        }
    }

    pub fn get_col(&self, col: i64) -> Vec<Value> {
        match self.col_id_by_index(col) {
            Some(c) => self.with_inner(move |inner| inner.cols[c].clone()),
            None => {
                self.record_warning("GetCol", format!("column {col} out of range"));
                Vec::new()
            }
        }
    }

    pub fn get_col_by_name(&self, name: &str) -> Vec<Value> {
        match self.col_id_by_name(name) {
            Some(c) => self.with_inner(move |inner| inner.cols[c].clone()),
            None => {
                self.record_warning("GetColByName", format!("column {name} not found"));
                Vec::new()
            }
        }
    }

    pub fn get_row(&self, row: i64) -> Vec<Value> {
        match self.row_id_by_index(row) {
            Some(r) => self.with_inner(move |inner| inner.cols.iter().map(|c| c[r].clone()).collect()),
            None => {
                self.record_warning("GetRow", format!("row {row} out of range"));
                Vec::new()
            }
        }
    }

    pub fn get_row_by_name(&self, name: &str) -> Vec<Value> {
        match self.row_id_by_name(name) {
            Some(r) => self.with_inner(move |inner| inner.cols.iter().map(|c| c[r].clone()).collect()),
            None => {
                self.record_warning("GetRowByName", format!("row {name} not found"));
                Vec::new()
            }
        }
    }

    pub fn update_element(&self, row: i64, col: i64, v: Value) -> &Self {
        match (self.row_id_by_index(row), self.col_id_by_index(col)) {
            (Some(r), Some(c)) => {
                self.with_inner_mut(move |inner| inner.cols[c][r] = v);
            }
            _ => self.record_warning("UpdateElement", format!("({row}, {col}) out of range")),
        }
        self
    }

    pub fn update_col(&self, col: i64, data: Vec<Value>) -> &Self {
        match self.col_id_by_index(col) {
            Some(c) => {
                let nrows = self.num_rows();
                self.with_inner_mut(move |inner| {
                    let mut data = data;
                    data.resize(nrows, Value::Null);
                    inner.cols[c] = data;
                });
            }
            None => self.record_warning("UpdateCol", format!("column {col} out of range")),
        }
        self
    }

    pub fn update_row(&self, row: i64, data: Vec<Value>) -> &Self {
        match self.row_id_by_index(row) {
            Some(r) => {
                let ncols = self.num_cols();
                self.with_inner_mut(move |inner| {
                    let mut data = data;
                    data.resize(ncols, Value::Null);
                    for (c, v) in inner.cols.iter_mut().zip(data.into_iter()) {
                        c[r] = v;
                    }
                });
            }
            None => self.record_warning("UpdateRow", format!("row {row} out of range")),
        }
        self
    }

    pub fn set_col_name(&self, col: i64, name: impl Into<String>) -> &Self {
        let name = name.into();
        match self.col_id_by_index(col) {
            Some(c) => {
                self.with_inner_mut(move |inner| {
                    inner.col_index.set(c, &name);
                });
            }
            None => self.record_warning("SetColName", format!("column {col} out of range")),
        }
        self
    }

    pub fn set_row_name(&self, row: i64, name: impl Into<String>) -> &Self {
        let name = name.into();
        match self.row_id_by_index(row) {
            Some(r) => {
                self.with_inner_mut(move |inner| {
                    inner.row_index.set(r, &name);
                });
            }
            None => self.record_warning("SetRowName", format!("row {row} out of range")),
        }
        self
    }

    pub fn get_col_name(&self, col: i64) -> Option<String> {
        self.col_id_by_index(col).and_then(|c| self.with_inner(move |inner| inner.col_index.get(c).map(str::to_string)))
    }

    pub fn get_row_name(&self, row: i64) -> Option<String> {
        self.row_id_by_index(row).and_then(|r| self.with_inner(move |inner| inner.row_index.get(r).map(str::to_string)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns(vec![
            ("a".into(), vec![Value::Int(1), Value::Int(2)]),
            ("b".into(), vec![Value::Int(10), Value::Int(20)]),
        ])
    }

    #[test]
    fn get_element_by_position() {
        let t = sample();
        assert_eq!(t.get_element(0, 1), Value::Int(10));
        assert_eq!(t.get_element(-1, -1), Value::Int(20));
    }

    #[test]
    fn get_element_by_name() {
        let t = sample();
        t.set_row_name(0, "r0");
        assert_eq!(t.get_element_by_name("r0", "b"), Value::Int(10));
    }

    #[test]
    fn out_of_range_col_warns() {
        let t = sample();
        assert!(t.get_col(9).is_empty());
        assert!(t.err().is_some());
    }

    #[test]
    fn update_row_pads_short_input() {
        let t = sample();
        t.update_row(0, vec![Value::Int(99)]);
        assert_eq!(t.get_row(0), vec![Value::Int(99), Value::Null]);
    }
}
