//! Row/column search, drop, filter and swap (§4.5). Row/column deletion
//! shift-renumbers positional names via `BiIndex::delete_and_shift`, mirroring
//! `List`'s index-stability story but across two independent dimensions.

use super::Table;
use crate::alpha::index_to_alpha;
use crate::list::normalize_index;
use crate::value::Value;

/// Matches the Excel-NA convention used throughout the content-predicate
/// drop family: the literal string `"#N/A"`.
fn is_excel_na(v: &Value) -> bool {
    matches!(v, Value::Str(s) if s == "#N/A")
}

fn is_nan(v: &Value) -> bool {
    matches!(v, Value::Float(f) if f.is_nan())
}

impl Table {
    pub fn find_first_in_col(&self, col: i64, v: &Value) -> Option<usize> {
        let v = v.clone();
        let data = self.get_col(col);
        data.iter().position(|x| x.eq_for_membership(&v))
    }

    pub fn find_all_in_col(&self, col: i64, v: &Value) -> Vec<usize> {
        let v = v.clone();
        let data = self.get_col(col);
        data.iter().enumerate().filter_map(|(i, x)| x.eq_for_membership(&v).then_some(i)).collect()
    }

    /// Row positions containing at least one of `values`.
    pub fn find_rows_containing_any(&self, values: &[Value]) -> Vec<usize> {
        let grid = self.to_2d_slice();
        (0..grid.len()).filter(|&r| grid[r].iter().any(|cell| values.iter().any(|v| cell.eq_for_membership(v)))).collect()
    }

    /// Row positions containing every one of `values` (each may be in a
    /// different column).
    pub fn find_rows_containing_all(&self, values: &[Value]) -> Vec<usize> {
        let grid = self.to_2d_slice();
        (0..grid.len()).filter(|&r| values.iter().all(|v| grid[r].iter().any(|cell| cell.eq_for_membership(v)))).collect()
    }

    /// Column positions containing at least one of `values`.
    pub fn find_cols_containing_any(&self, values: &[Value]) -> Vec<usize> {
        let ncols = self.num_cols();
        (0..ncols).filter(|&pos| self.get_col(pos as i64).iter().any(|cell| values.iter().any(|v| cell.eq_for_membership(v)))).collect()
    }

    /// Column positions containing every one of `values`.
    pub fn find_cols_containing_all(&self, values: &[Value]) -> Vec<usize> {
        let ncols = self.num_cols();
        (0..ncols)
            .filter(|&pos| {
                let col = self.get_col(pos as i64);
                values.iter().all(|v| col.iter().any(|cell| cell.eq_for_membership(v)))
            })
            .collect()
    }

    /// Row positions with a string cell containing at least one of
    /// `needles` as a substring.
    pub fn find_rows_substring_any(&self, needles: &[String]) -> Vec<usize> {
        let grid = self.to_2d_slice();
        (0..grid.len())
            .filter(|&r| grid[r].iter().any(|cell| cell.as_str().is_some_and(|s| needles.iter().any(|n| s.contains(n.as_str())))))
            .collect()
    }

    /// Row positions where, for every needle, some cell in that row
    /// contains it as a substring.
    pub fn find_rows_substring_all(&self, needles: &[String]) -> Vec<usize> {
        let grid = self.to_2d_slice();
        (0..grid.len())
            .filter(|&r| needles.iter().all(|n| grid[r].iter().any(|cell| cell.as_str().is_some_and(|s| s.contains(n.as_str())))))
            .collect()
    }

    /// Column positions with a string cell containing at least one of
    /// `needles` as a substring.
    pub fn find_cols_substring_any(&self, needles: &[String]) -> Vec<usize> {
        let ncols = self.num_cols();
        (0..ncols)
            .filter(|&pos| self.get_col(pos as i64).iter().any(|cell| cell.as_str().is_some_and(|s| needles.iter().any(|n| s.contains(n.as_str())))))
            .collect()
    }

    /// Column positions where, for every needle, some cell contains it.
    pub fn find_cols_substring_all(&self, needles: &[String]) -> Vec<usize> {
        let ncols = self.num_cols();
        (0..ncols)
            .filter(|&pos| {
                let col = self.get_col(pos as i64);
                needles.iter().all(|n| col.iter().any(|cell| cell.as_str().is_some_and(|s| s.contains(n.as_str()))))
            })
            .collect()
    }

    fn drop_cols_where(&self, pred: impl Fn(&Value) -> bool + Send + 'static) -> &Self {
        self.with_inner_mut(move |inner| {
            let ids = inner.col_index.ids();
            let to_drop: Vec<usize> = ids.iter().copied().filter(|&id| inner.cols[id].iter().any(&pred)).collect();
            for id in to_drop.into_iter().rev() {
                inner.col_index.delete_and_shift(id);
                inner.cols.remove(id);
            }
        });
        self
    }

    pub fn drop_cols_contain_string(&self) -> &Self {
        self.drop_cols_where(|v| matches!(v, Value::Str(_)))
    }

    pub fn drop_cols_contain_number(&self) -> &Self {
        self.drop_cols_where(Value::is_numeric)
    }

    pub fn drop_cols_contain_nil(&self) -> &Self {
        self.drop_cols_where(Value::is_null)
    }

    pub fn drop_cols_contain_nan(&self) -> &Self {
        self.drop_cols_where(is_nan)
    }

    pub fn drop_cols_contain_excel_na(&self) -> &Self {
        self.drop_cols_where(is_excel_na)
    }

    /// Drops every column containing at least one of `values`.
    pub fn drop_cols_contain(&self, values: &[Value]) -> &Self {
        let values = values.to_vec();
        self.drop_cols_where(move |v| values.iter().any(|t| v.eq_for_membership(t)))
    }

    fn drop_rows_where(&self, pred: impl Fn(&Value) -> bool + Send + 'static) -> &Self {
        self.with_inner_mut(move |inner| {
            let nrows = inner.num_rows();
            let to_drop: Vec<usize> = (0..nrows).filter(|&r| inner.cols.iter().any(|c| pred(&c[r]))).collect();
            for r in to_drop.into_iter().rev() {
                let id = inner.row_index.ids()[r];
                inner.row_index.delete_and_shift(id);
                for col in inner.cols.iter_mut() {
                    col.remove(id);
                }
            }
        });
        self
    }

    pub fn drop_rows_contain_string(&self) -> &Self {
        self.drop_rows_where(|v| matches!(v, Value::Str(_)))
    }

    pub fn drop_rows_contain_number(&self) -> &Self {
        self.drop_rows_where(Value::is_numeric)
    }

    pub fn drop_rows_contain_nil(&self) -> &Self {
        self.drop_rows_where(Value::is_null)
    }

    pub fn drop_rows_contain_nan(&self) -> &Self {
        self.drop_rows_where(is_nan)
    }

    pub fn drop_rows_contain_excel_na(&self) -> &Self {
        self.drop_rows_where(is_excel_na)
    }

    pub fn drop_rows_contain(&self, values: &[Value]) -> &Self {
        let values = values.to_vec();
        self.drop_rows_where(move |v| values.iter().any(|t| v.eq_for_membership(t)))
    }

    /// Generic row filter: keeps a row if `predicate(rowIdx, colAlpha,
    /// value)` is true for at least one of its cells.
    pub fn filter(&self, predicate: impl Fn(usize, &str, &Value) -> bool + Send + 'static) -> &Self {
        self.with_inner_mut(move |inner| {
            let nrows = inner.num_rows();
            let to_drop: Vec<usize> = (0..nrows)
                .filter(|&r| !inner.cols.iter().enumerate().any(|(c, col)| predicate(r, &index_to_alpha(c), &col[r])))
                .collect();
            for r in to_drop.into_iter().rev() {
                let id = inner.row_index.ids()[r];
                inner.row_index.delete_and_shift(id);
                for col in inner.cols.iter_mut() {
                    col.remove(id);
                }
            }
        });
        self
    }

    /// Generic column filter: keeps a column if `predicate(rowIdx, colAlpha,
    /// value)` is true for at least one of its cells.
    pub fn filter_cols(&self, predicate: impl Fn(usize, &str, &Value) -> bool + Send + 'static) -> &Self {
        self.with_inner_mut(move |inner| {
            let ids = inner.col_index.ids();
            let to_drop: Vec<usize> = ids
                .iter()
                .enumerate()
                .filter(|&(pos, &id)| !(0..inner.cols[id].len()).any(|r| predicate(r, &index_to_alpha(pos), &inner.cols[id][r])))
                .map(|(_, &id)| id)
                .collect();
            for id in to_drop.into_iter().rev() {
                inner.col_index.delete_and_shift(id);
                inner.cols.remove(id);
            }
        });
        self
    }

    pub fn drop_col(&self, col: i64) -> &Self {
        let ncols = self.num_cols();
        let Some(pos) = normalize_index(col, ncols) else {
            self.record_warning("DropCol", format!("column {col} out of range"));
            return self;
        };
        self.with_inner_mut(move |inner| {
            let id = inner.col_index.ids()[pos];
            let (_, remap, _) = inner.col_index.delete_and_shift(id);
            inner.cols.remove(id);
            let _ = remap;
        });
        self
    }

    pub fn drop_row(&self, row: i64) -> &Self {
        let nrows = self.num_rows();
        let Some(pos) = normalize_index(row, nrows) else {
            self.record_warning("DropRow", format!("row {row} out of range"));
            return self;
        };
        self.with_inner_mut(move |inner| {
            let id = inner.row_index.ids()[pos];
            let (_, remap, _) = inner.row_index.delete_and_shift(id);
            for col in inner.cols.iter_mut() {
                col.remove(id);
            }
            let _ = remap;
        });
        self
    }

    /// Keeps only the rows for which `predicate` returns `true`; drops the
    /// rest (reverse-order removal to keep shift-deletes correct).
    pub fn filter_rows(&self, predicate: impl Fn(&[Value]) -> bool + Send + 'static) -> &Self {
        self.with_inner_mut(move |inner| {
            let nrows = inner.num_rows();
            let to_drop: Vec<usize> = (0..nrows).filter(|&r| !predicate(&row_at(&inner.cols, r))).collect();
            for r in to_drop.into_iter().rev() {
                let ids = inner.row_index.ids();
                let id = ids[r];
                inner.row_index.delete_and_shift(id);
                for col in inner.cols.iter_mut() {
                    col.remove(id);
                }
            }
        });
        self
    }

    /// Keeps only rows whose name contains `substr`, preserving each
    /// surviving row's name (§8 S6).
    pub fn filter_by_row_name_contains(&self, substr: impl Into<String>) -> &Self {
        let substr = substr.into();
        self.with_inner_mut(move |inner| {
            let nrows = inner.num_rows();
            let ids = inner.row_index.ids();
            let to_drop: Vec<usize> = (0..nrows)
                .filter(|&pos| !inner.row_index.get(ids[pos]).is_some_and(|name| name.contains(&substr)))
                .collect();
            for pos in to_drop.into_iter().rev() {
                let id = inner.row_index.ids()[pos];
                inner.row_index.delete_and_shift(id);
                for col in inner.cols.iter_mut() {
                    col.remove(id);
                }
            }
        });
        self
    }

    pub fn swap_cols(&self, a: i64, b: i64) -> &Self {
        let ncols = self.num_cols();
        match (normalize_index(a, ncols), normalize_index(b, ncols)) {
            (Some(pa), Some(pb)) => {
                self.with_inner_mut(move |inner| {
                    let ids = inner.col_index.ids();
                    let (ia, ib) = (ids[pa], ids[pb]);
                    inner.cols.swap(ia, ib);
                    inner.col_index.swap_ids(ia, ib);
                });
            }
            _ => self.record_warning("SwapCols", format!("({a}, {b}) out of range")),
        }
        self
    }

    pub fn swap_rows(&self, a: i64, b: i64) -> &Self {
        let nrows = self.num_rows();
        match (normalize_index(a, nrows), normalize_index(b, nrows)) {
            (Some(pa), Some(pb)) => {
                self.with_inner_mut(move |inner| {
                    let ids = inner.row_index.ids();
                    let (ia, ib) = (ids[pa], ids[pb]);
                    for col in inner.cols.iter_mut() {
                        col.swap(ia, ib);
                    }
                    inner.row_index.swap_ids(ia, ib);
                });
            }
            _ => self.record_warning("SwapRows", format!("({a}, {b}) out of range")),
        }
        self
    }

    pub fn swap_cols_by_name(&self, a: &str, b: &str) -> &Self {
        let names = self.col_names();
        match (names.iter().position(|n| n == a), names.iter().position(|n| n == b)) {
            (Some(pa), Some(pb)) => self.swap_cols(pa as i64, pb as i64),
            _ => {
                self.record_warning("SwapColsByName", format!("({a}, {b}) not found"));
                self
            }
        }
    }

    pub fn swap_rows_by_name(&self, a: &str, b: &str) -> &Self {
        let names = self.row_names();
        match (names.iter().position(|n| n == a), names.iter().position(|n| n == b)) {
            (Some(pa), Some(pb)) => self.swap_rows(pa as i64, pb as i64),
            _ => {
                self.record_warning("SwapRowsByName", format!("({a}, {b}) not found"));
                self
            }
        }
    }
}

fn row_at(cols: &[Vec<Value>], r: usize) -> Vec<Value> {
    cols.iter().map(|c| c[r].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns(vec![
            ("a".into(), vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            ("b".into(), vec![Value::Int(10), Value::Int(20), Value::Int(30)]),
        ])
    }

    #[test]
    fn drop_row_shifts_remaining() {
        let t = sample();
        t.drop_row(1);
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.get_col_by_name("a"), vec![Value::Int(1), Value::Int(3)]);
    }

    #[test]
    fn filter_rows_keeps_matching() {
        let t = sample();
        t.filter_rows(|row| row[0].as_f64().unwrap_or(0.0) >= 2.0);
        assert_eq!(t.num_rows(), 2);
    }

    #[test]
    fn swap_cols_exchanges_data() {
        let t = sample();
        t.swap_cols(0, 1);
        assert_eq!(t.get_col(0), vec![Value::Int(10), Value::Int(20), Value::Int(30)]);
    }

    #[test]
    fn find_first_in_col_locates_value() {
        let t = sample();
        assert_eq!(t.find_first_in_col(1, &Value::Int(20)), Some(1));
    }

    #[test]
    fn filter_by_row_name_contains_keeps_matching_names() {
        let t = Table::from_columns(vec![("v".into(), vec![Value::Int(1), Value::Int(2), Value::Int(3)])]);
        t.set_row_name(0, "Apple");
        t.set_row_name(1, "Banana");
        t.set_row_name(2, "Grape");
        t.filter_by_row_name_contains("p");
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.row_names(), vec!["Apple".to_string(), "Grape".to_string()]);
        assert_eq!(t.get_col(0), vec![Value::Int(1), Value::Int(3)]);
    }

    #[test]
    fn swap_cols_by_name_exchanges_data() {
        let t = sample();
        t.swap_cols_by_name("a", "b");
        assert_eq!(t.get_col(0), vec![Value::Int(10), Value::Int(20), Value::Int(30)]);
    }

    #[test]
    fn find_rows_containing_any_matches_either_value() {
        let t = sample();
        assert_eq!(t.find_rows_containing_any(&[Value::Int(1), Value::Int(30)]), vec![0, 2]);
    }

    #[test]
    fn find_rows_containing_all_requires_every_value_present() {
        let t = sample();
        assert_eq!(t.find_rows_containing_all(&[Value::Int(2), Value::Int(20)]), vec![1]);
    }

    #[test]
    fn find_cols_containing_any_and_all() {
        let t = sample();
        assert_eq!(t.find_cols_containing_any(&[Value::Int(1)]), vec![0]);
        assert_eq!(t.find_cols_containing_all(&[Value::Int(1), Value::Int(2), Value::Int(3)]), vec![0]);
    }

    #[test]
    fn find_rows_substring_any_and_all() {
        let t = Table::from_columns(vec![
            ("a".into(), vec![Value::from("apple"), Value::from("banana")]),
            ("b".into(), vec![Value::from("pie"), Value::from("split")]),
        ]);
        assert_eq!(t.find_rows_substring_any(&["pie".to_string(), "nope".to_string()]), vec![0]);
        assert_eq!(t.find_rows_substring_all(&["an".to_string(), "split".to_string()]), vec![1]);
    }

    #[test]
    fn drop_cols_contain_number_drops_numeric_columns() {
        let t = Table::from_columns(vec![
            ("a".into(), vec![Value::Int(1)]),
            ("b".into(), vec![Value::from("x")]),
        ]);
        t.drop_cols_contain_number();
        assert_eq!(t.col_names(), vec!["b".to_string()]);
    }

    #[test]
    fn drop_cols_contain_excel_na_drops_matching_columns() {
        let t = Table::from_columns(vec![
            ("a".into(), vec![Value::from("#N/A")]),
            ("b".into(), vec![Value::from("ok")]),
        ]);
        t.drop_cols_contain_excel_na();
        assert_eq!(t.col_names(), vec!["b".to_string()]);
    }

    #[test]
    fn drop_rows_contain_nil_drops_rows_with_a_null_cell() {
        let t = Table::from_columns(vec![("a".into(), vec![Value::Int(1), Value::Null, Value::Int(3)])]);
        t.drop_rows_contain_nil();
        assert_eq!(t.get_col(0), vec![Value::Int(1), Value::Int(3)]);
    }

    #[test]
    fn filter_keeps_rows_with_a_passing_cell() {
        let t = sample();
        t.filter(|_row, col_alpha, v| col_alpha == "A" && v.as_f64().unwrap_or(0.0) >= 2.0);
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.get_col(0), vec![Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn filter_cols_keeps_columns_with_a_passing_cell() {
        let t = sample();
        t.filter_cols(|_row, _col_alpha, v| v.as_f64().unwrap_or(0.0) >= 10.0);
        assert_eq!(t.col_names(), vec!["b".to_string()]);
    }
}
