//! C5: a column-major, named-row/named-column 2D store built from `List`-like
//! per-column data (§4.5). Row and column identity are both maintained by a
//! `BiIndex` (§4.1), so drop/insert/rename never require renumbering every
//! reference — only the affected dimension's shift.

mod access;
mod ccl_ops;
mod convert;
mod find;
mod sort;
mod stats;

pub use ccl_ops::*;
pub use sort::*;

use crate::actor::{Group, SharedActor};
use crate::bi_index::{disambiguate_name, BiIndex};
use crate::error::ErrorHistory;
use crate::list::normalize_index;
use crate::logging::LogLevel;
use crate::value::Value;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

const PKG: &str = "table";

pub(crate) struct TableInner {
    pub(crate) row_index: BiIndex,
    pub(crate) col_index: BiIndex,
    /// Column-major: `cols[col_id][row_id]`. Every column has the same
    /// length, equal to `row_index.len()`.
    pub(crate) cols: Vec<Vec<Value>>,
    pub(crate) creation_ts: DateTime<Utc>,
    pub(crate) last_modified_ts: DateTime<Utc>,
    pub(crate) errors: ErrorHistory,
}

impl TableInner {
    fn touch(&mut self) {
        let now = Utc::now();
        if now > self.last_modified_ts {
            self.last_modified_ts = now;
        }
    }

    fn num_rows(&self) -> usize {
        self.row_index.len()
    }

    fn num_cols(&self) -> usize {
        self.col_index.len()
    }
}

/// A cheap, `Arc`-backed handle; see `List`'s doc comment for the cloning
/// semantics this mirrors.
#[derive(Clone)]
pub struct Table {
    pub(crate) inner: Arc<Mutex<TableInner>>,
    pub(crate) actor: SharedActor,
}

impl Table {
    pub fn new() -> Self {
        Self::new_in_group(Group::new())
    }

    pub fn new_in_group(group: Group) -> Self {
        let now = Utc::now();
        let inner = TableInner {
            row_index: BiIndex::new(),
            col_index: BiIndex::new(),
            cols: Vec::new(),
            creation_ts: now,
            last_modified_ts: now,
            errors: ErrorHistory::new(crate::config::error_ring_capacity()),
        };
        Self { inner: Arc::new(Mutex::new(inner)), actor: SharedActor::new(group) }
    }

    /// Builds a table from named columns, all equal length.
    pub fn from_columns(columns: Vec<(String, Vec<Value>)>) -> Self {
        let table = Self::new();
        for (name, data) in columns {
            table.append_col(name, data);
        }
        table
    }

    pub fn close(&self) {
        self.actor.close();
    }

    pub(crate) fn record(&self, level: LogLevel, func: &'static str, msg: impl Into<String>) {
        let inner = self.inner.clone();
        let msg = msg.into();
        let _ = self.actor.atomic_do(move || {
            inner.lock().expect("table lock poisoned").errors.record(level, PKG, func, msg);
        });
    }

    pub(crate) fn record_warning(&self, func: &'static str, msg: impl Into<String>) {
        self.record(LogLevel::Warning, func, msg);
    }

    pub(crate) fn record_info(&self, func: &'static str, msg: impl Into<String>) {
        self.record(LogLevel::Info, func, msg);
    }

    pub(crate) fn with_inner<R: Send + 'static>(&self, f: impl FnOnce(&TableInner) -> R + Send + 'static) -> R {
        let inner = self.inner.clone();
        self.actor
            .atomic_do(move || {
                let guard = inner.lock().expect("table lock poisoned");
                f(&guard)
            })
            .expect("table actor closed while in use")
    }

    pub(crate) fn with_inner_mut<R: Send + 'static>(&self, f: impl FnOnce(&mut TableInner) -> R + Send + 'static) -> R {
        let inner = self.inner.clone();
        self.actor
            .atomic_do(move || {
                let mut guard = inner.lock().expect("table lock poisoned");
                let r = f(&mut guard);
                guard.touch();
                r
            })
            .expect("table actor closed while in use")
    }

    pub fn num_rows(&self) -> usize {
        self.with_inner(|inner| inner.num_rows())
    }

    pub fn num_cols(&self) -> usize {
        self.with_inner(|inner| inner.num_cols())
    }

    pub fn size(&self) -> (usize, usize) {
        self.with_inner(|inner| (inner.num_rows(), inner.num_cols()))
    }

    pub fn creation_ts(&self) -> DateTime<Utc> {
        self.with_inner(|inner| inner.creation_ts)
    }

    pub fn last_modified_ts(&self) -> DateTime<Utc> {
        self.with_inner(|inner| inner.last_modified_ts)
    }

    pub fn err(&self) -> Option<String> {
        self.with_inner(|inner| inner.errors.last().map(|e| e.to_string()))
    }

    pub fn clear_err(&self) -> &Self {
        self.with_inner_mut(|inner| inner.errors.clear_last());
        self
    }

    pub fn col_names(&self) -> Vec<String> {
        self.with_inner(|inner| inner.col_index.ids().into_iter().filter_map(|id| inner.col_index.get(id).map(str::to_string)).collect())
    }

    pub fn row_names(&self) -> Vec<String> {
        self.with_inner(|inner| inner.row_index.ids().into_iter().filter_map(|id| inner.row_index.get(id).map(str::to_string)).collect())
    }

    /// Appends a new named column; `data` is padded with `Value::Null` or
    /// truncated with a warning if its length does not match `NumRows`. A
    /// name already in use is disambiguated with a `_1`, `_2`, ... suffix
    /// (§3) rather than silently colliding with the existing column.
    pub fn append_col(&self, name: impl Into<String>, data: Vec<Value>) -> &Self {
        let name = name.into();
        self.with_inner_mut(move |inner| {
            let rows = inner.num_rows();
            let mut data = data;
            if rows == 0 && inner.num_cols() == 0 {
                for i in 0..data.len() {
                    inner.row_index.assign(&i.to_string());
                }
            } else if data.len() != rows {
                data.resize(rows, Value::Null);
            }
            let existing: Vec<String> =
                inner.col_index.ids().into_iter().filter_map(|id| inner.col_index.get(id).map(str::to_string)).collect();
            inner.col_index.assign(&disambiguate_name(&existing, &name));
            inner.cols.push(data);
        });
        self
    }

    /// Appends a new named row, padding/truncating `values` to `NumCols`.
    /// A colliding row name is disambiguated the same way as
    /// `append_col`.
    pub fn append_row(&self, name: impl Into<String>, values: Vec<Value>) -> &Self {
        let name = name.into();
        self.with_inner_mut(move |inner| {
            let cols = inner.num_cols();
            let mut values = values;
            if cols == 0 {
                for i in 0..values.len() {
                    inner.col_index.assign(&i.to_string());
                }
                inner.cols = values.iter().map(|v| vec![v.clone()]).collect();
                inner.row_index.assign(&name);
                return;
            }
            values.resize(cols, Value::Null);
            let existing: Vec<String> =
                inner.row_index.ids().into_iter().filter_map(|id| inner.row_index.get(id).map(str::to_string)).collect();
            inner.row_index.assign(&disambiguate_name(&existing, &name));
            for (col, v) in inner.cols.iter_mut().zip(values.into_iter()) {
                col.push(v);
            }
        });
        self
    }

    /// Bulk-renames every column in position order; `names` shorter than
    /// `NumCols` leaves the trailing columns' names untouched, longer is
    /// truncated with a warning.
    pub fn set_col_names(&self, names: Vec<String>) -> &Self {
        let ncols = self.num_cols();
        if names.len() > ncols {
            self.record_warning("SetColNames", format!("{} names given for {ncols} columns", names.len()));
        }
        self.with_inner_mut(move |inner| {
            let ids = inner.col_index.ids();
            for (pos, name) in names.into_iter().enumerate() {
                if let Some(&id) = ids.get(pos) {
                    inner.col_index.set(id, &name);
                }
            }
        });
        self
    }

    /// Renames the column currently named `old` to `new`, leaving it in
    /// place; a missing `old` records a warning.
    pub fn change_col_name(&self, old: &str, new: impl Into<String>) -> &Self {
        let old_owned = old.to_string();
        let new = new.into();
        let found = self.with_inner_mut(move |inner| {
            let id = inner.col_index.index(&old_owned)?;
            inner.col_index.set(id, &new);
            Some(())
        });
        if found.is_none() {
            self.record_warning("ChangeColName", format!("column '{old}' not found"));
        }
        self
    }

    /// Appends several named columns at once (`AppendCols`); all columns
    /// (the new ones and any already present) are padded to the longest new
    /// column's length before `append_col`'s own per-column padding runs.
    pub fn append_cols(&self, cols: Vec<(String, Vec<Value>)>) -> &Self {
        let new_max = cols.iter().map(|(_, d)| d.len()).max().unwrap_or(0);
        let cur_rows = self.num_rows();
        if new_max > cur_rows {
            self.with_inner_mut(move |inner| {
                for col in inner.cols.iter_mut() {
                    col.resize(new_max, Value::Null);
                }
                for i in cur_rows..new_max {
                    inner.row_index.assign(&i.to_string());
                }
            });
        }
        for (name, data) in cols {
            self.append_col(name, data);
        }
        self
    }

    /// Each element of `rows` becomes one new row; a row with more values
    /// than `NumCols` widens the table with fresh positionally-named
    /// columns, nil-padding every prior row (`AppendRowsFromList`).
    pub fn append_rows_from_list(&self, rows: Vec<Vec<Value>>) -> &Self {
        for values in rows {
            let ncols = self.num_cols();
            if values.len() > ncols {
                for i in ncols..values.len() {
                    self.append_col(i.to_string(), Vec::new());
                }
            }
            let name = self.num_rows().to_string();
            self.append_row(name, values);
        }
        self
    }

    /// Appends one new row built from `{alpha-or-numeric column index:
    /// value}`; an index beyond the current columns appends a new column at
    /// the end instead, nil-padding the rows that came before it
    /// (`AppendRowsByColIndex`).
    pub fn append_rows_by_col_index(&self, values: std::collections::HashMap<i64, Value>) -> &Self {
        let ncols = self.num_cols();
        let mut row = vec![Value::Null; ncols];
        let mut extra: Vec<(i64, Value)> = Vec::new();
        for (idx, v) in values {
            match normalize_index(idx, ncols) {
                Some(pos) => row[pos] = v,
                None => extra.push((idx, v)),
            }
        }
        extra.sort_by_key(|(idx, _)| *idx);
        for (idx, v) in extra {
            self.append_col(idx.to_string(), Vec::new());
            row.push(v);
        }
        let name = self.num_rows().to_string();
        self.append_row(name, row);
        self
    }

    /// Appends one new row built from `{column name: value}`; an unknown
    /// name appends a new column at the end instead (`AppendRowsByColName`).
    pub fn append_rows_by_col_name(&self, values: std::collections::HashMap<String, Value>) -> &Self {
        let names = self.col_names();
        let mut row = vec![Value::Null; names.len()];
        let mut extra: Vec<(String, Value)> = Vec::new();
        for (name, v) in values {
            match names.iter().position(|n| n == &name) {
                Some(pos) => row[pos] = v,
                None => extra.push((name, v)),
            }
        }
        for (name, v) in extra {
            self.append_col(name, Vec::new());
            row.push(v);
        }
        let name = self.num_rows().to_string();
        self.append_row(name, row);
        self
    }

    pub fn clone_data(&self) -> Self {
        let (rows, cols, data) = self.with_inner(|inner| {
            let rows: Vec<String> = inner.row_index.ids().into_iter().filter_map(|id| inner.row_index.get(id).map(str::to_string)).collect();
            let cols: Vec<String> = inner.col_index.ids().into_iter().filter_map(|id| inner.col_index.get(id).map(str::to_string)).collect();
            (rows, cols, inner.cols.clone())
        });
        let table = Self::new();
        table.with_inner_mut(move |inner| {
            for r in rows {
                inner.row_index.assign(&r);
            }
            for (name, col) in cols.into_iter().zip(data.into_iter()) {
                inner.col_index.assign(&name);
                inner.cols.push(col);
            }
        });
        table
    }

    /// Promotes row `row_idx`'s values to column names and drops that row,
    /// symmetric to `col_to_row_names`.
    pub fn row_to_col_names(&self, row_idx: i64) -> &Self {
        let nrows = self.num_rows();
        let Some(pos) = normalize_index(row_idx, nrows) else {
            self.record_warning("SetRowToColNames", format!("row {row_idx} out of range"));
            return self;
        };
        self.with_inner_mut(move |inner| {
            let names: Vec<String> = inner.cols.iter().map(|c| c[pos].stringify()).collect();
            let id = inner.row_index.ids()[pos];
            inner.row_index.delete_and_shift(id);
            for col in inner.cols.iter_mut() {
                col.remove(id);
            }
            inner.col_index.clear();
            for n in &names {
                inner.col_index.assign(n);
            }
        });
        self
    }

    /// Promotes column `alpha_idx`'s values to row names and drops that
    /// column; `row_names_to_first_col` is its approximate inverse.
    pub fn col_to_row_names(&self, alpha_idx: i64) -> &Self {
        let ncols = self.num_cols();
        let Some(pos) = normalize_index(alpha_idx, ncols) else {
            self.record_warning("SetColToRowNames", format!("column {alpha_idx} out of range"));
            return self;
        };
        self.with_inner_mut(move |inner| {
            let id = inner.col_index.ids()[pos];
            let names: Vec<String> = inner.cols[id].iter().map(|v| v.stringify()).collect();
            let (_, remap, _) = inner.col_index.delete_and_shift(id);
            inner.cols.remove(id);
            let _ = remap;
            inner.row_index.clear();
            for n in &names {
                inner.row_index.assign(n);
            }
        });
        self
    }

    pub fn col_names_to_first_row(&self) -> &Self {
        self.with_inner_mut(|inner| {
            let names: Vec<Value> = inner.col_index.ids().into_iter().filter_map(|id| inner.col_index.get(id).map(Value::from)).collect();
            for (col, name) in inner.cols.iter_mut().zip(names.into_iter()) {
                col.insert(0, name);
            }
            inner.col_index.clear();
            for i in 0..inner.cols.len() {
                inner.col_index.assign(&i.to_string());
            }
            let old_rows = inner.row_index.ids();
            inner.row_index.clear();
            inner.row_index.assign("0");
            for id in old_rows {
                inner.row_index.assign(&(id + 1).to_string());
            }
        });
        self
    }

    pub fn row_names_to_first_col(&self) -> &Self {
        self.with_inner_mut(|inner| {
            let names: Vec<Value> = inner.row_index.ids().into_iter().filter_map(|id| inner.row_index.get(id).map(Value::from)).collect();
            inner.cols.insert(0, names);
            let old_cols = inner.col_index.ids();
            inner.col_index.clear();
            inner.col_index.assign("0");
            for id in old_cols {
                inner.col_index.assign(&(id + 1).to_string());
            }
        });
        self
    }

    pub fn drop_col_names(&self) -> &Self {
        self.with_inner_mut(|inner| {
            let n = inner.num_cols();
            inner.col_index.clear();
            for i in 0..n {
                inner.col_index.assign(&i.to_string());
            }
        });
        self
    }

    pub fn drop_row_names(&self) -> &Self {
        self.with_inner_mut(|inner| {
            let n = inner.num_rows();
            inner.row_index.clear();
            for i in 0..n {
                inner.row_index.assign(&i.to_string());
            }
        });
        self
    }

    pub fn transpose(&self) -> Self {
        let (rows, cols, cols_data) = self.with_inner(|inner| {
            let rows: Vec<String> = inner.row_index.ids().into_iter().filter_map(|id| inner.row_index.get(id).map(str::to_string)).collect();
            let cols: Vec<String> = inner.col_index.ids().into_iter().filter_map(|id| inner.col_index.get(id).map(str::to_string)).collect();
            (rows, cols, inner.cols.clone())
        });
        let table = Self::new();
        table.with_inner_mut(move |inner| {
            for c in &cols {
                inner.row_index.assign(c);
            }
            for (r_idx, r_name) in rows.iter().enumerate() {
                inner.col_index.assign(r_name);
                let new_col: Vec<Value> = cols_data.iter().map(|c| c[r_idx].clone()).collect();
                inner.cols.push(new_col);
            }
        });
        table
    }

    pub fn to_2d_slice(&self) -> Vec<Vec<Value>> {
        self.with_inner(|inner| {
            let nrows = inner.num_rows();
            (0..nrows).map(|r| inner.cols.iter().map(|c| c[r].clone()).collect()).collect()
        })
    }

    /// `use_names_as_keys = false` keys by stringified positional index
    /// instead of the column's assigned name.
    pub fn to_map(&self, use_names_as_keys: bool) -> std::collections::HashMap<String, Vec<Value>> {
        self.with_inner(|inner| {
            inner
                .col_index
                .ids()
                .into_iter()
                .enumerate()
                .filter_map(|(pos, id)| {
                    let key = if use_names_as_keys { inner.col_index.get(id)?.to_string() } else { pos.to_string() };
                    Some((key, inner.cols[id].clone()))
                })
                .collect()
        })
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
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
    fn append_col_tracks_shape() {
        let t = sample();
        assert_eq!(t.size(), (3, 2));
        assert_eq!(t.col_names(), vec!["a", "b"]);
    }

    #[test]
    fn append_row_extends_every_column() {
        let t = sample();
        t.append_row("r3", vec![Value::Int(4), Value::Int(40)]);
        assert_eq!(t.num_rows(), 4);
    }

    #[test]
    fn transpose_swaps_dimensions() {
        let t = sample();
        let tt = t.transpose();
        assert_eq!(tt.size(), (2, 3));
    }

    #[test]
    fn clone_data_is_independent() {
        let t = sample();
        let c = t.clone_data();
        c.append_row("x", vec![Value::Int(0), Value::Int(0)]);
        assert_eq!(t.num_rows(), 3);
        assert_eq!(c.num_rows(), 4);
    }

    #[test]
    fn to_2d_slice_is_row_major() {
        let t = sample();
        let grid = t.to_2d_slice();
        assert_eq!(grid[0], vec![Value::Int(1), Value::Int(10)]);
    }

    #[test]
    fn append_col_disambiguates_colliding_name() {
        let t = sample();
        t.append_col("a", vec![Value::Int(100), Value::Int(200), Value::Int(300)]);
        assert_eq!(t.col_names(), vec!["a".to_string(), "b".to_string(), "a_1".to_string()]);
        assert_eq!(t.num_cols(), 3);
        assert_eq!(t.get_col(2), vec![Value::Int(100), Value::Int(200), Value::Int(300)]);
    }

    #[test]
    fn append_row_disambiguates_colliding_name() {
        let t = sample();
        t.set_row_name(0, "r0");
        t.append_row("r0", vec![Value::Int(9), Value::Int(90)]);
        assert_eq!(t.row_names(), vec!["r0".to_string(), "1".to_string(), "2".to_string(), "r0_1".to_string()]);
    }

    #[test]
    fn col_to_row_names_keeps_remaining_column_names() {
        let t = Table::from_columns(vec![
            ("label".into(), vec![Value::from("r0"), Value::from("r1")]),
            ("a".into(), vec![Value::Int(1), Value::Int(2)]),
            ("b".into(), vec![Value::Int(10), Value::Int(20)]),
        ]);
        t.col_to_row_names(0);
        assert_eq!(t.row_names(), vec!["r0".to_string(), "r1".to_string()]);
        assert_eq!(t.col_names(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn row_to_col_names_keeps_remaining_row_names() {
        let t = sample();
        t.set_row_name(0, "hdr");
        t.set_row_name(1, "r1");
        t.set_row_name(2, "r2");
        t.row_to_col_names(0);
        assert_eq!(t.col_names(), vec!["1".to_string(), "10".to_string()]);
        assert_eq!(t.row_names(), vec!["r1".to_string(), "r2".to_string()]);
    }

    #[test]
    fn to_map_keys_by_name_or_position() {
        let t = sample();
        let by_name = t.to_map(true);
        assert_eq!(by_name.get("a"), Some(&vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
        let by_pos = t.to_map(false);
        assert_eq!(by_pos.get("0"), Some(&vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
    }

    #[test]
    fn set_col_names_renames_in_position_order() {
        let t = sample();
        t.set_col_names(vec!["x".into(), "y".into()]);
        assert_eq!(t.col_names(), vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn change_col_name_renames_by_current_name() {
        let t = sample();
        t.change_col_name("a", "renamed");
        assert_eq!(t.col_names(), vec!["renamed".to_string(), "b".to_string()]);
    }

    #[test]
    fn append_cols_pads_existing_columns_to_new_max_length() {
        let t = sample();
        t.append_cols(vec![("c".into(), vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)])]);
        assert_eq!(t.num_rows(), 4);
        assert_eq!(t.get_col_by_name("a"), vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Null]);
        assert_eq!(t.get_col_by_name("c"), vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]);
    }

    #[test]
    fn append_rows_from_list_widens_on_longer_row() {
        let t = sample();
        t.append_rows_from_list(vec![vec![Value::Int(4), Value::Int(40), Value::Int(400)]]);
        assert_eq!(t.num_cols(), 3);
        assert_eq!(t.num_rows(), 4);
        assert_eq!(t.get_col(2), vec![Value::Null, Value::Null, Value::Null, Value::Int(400)]);
    }

    #[test]
    fn append_rows_by_col_name_fills_named_columns_and_nils_the_rest() {
        let t = sample();
        let mut values = std::collections::HashMap::new();
        values.insert("b".to_string(), Value::Int(99));
        t.append_rows_by_col_name(values);
        assert_eq!(t.num_rows(), 4);
        assert_eq!(t.get_col_by_name("a")[3], Value::Null);
        assert_eq!(t.get_col_by_name("b")[3], Value::Int(99));
    }

    #[test]
    fn append_rows_by_col_name_unknown_name_appends_new_column() {
        let t = sample();
        let mut values = std::collections::HashMap::new();
        values.insert("c".to_string(), Value::Int(7));
        t.append_rows_by_col_name(values);
        assert_eq!(t.col_names(), vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(t.get_col_by_name("c"), vec![Value::Null, Value::Null, Value::Null, Value::Int(7)]);
    }

    #[test]
    fn append_rows_by_col_index_fills_positional_columns() {
        let t = sample();
        let mut values = std::collections::HashMap::new();
        values.insert(0i64, Value::Int(5));
        t.append_rows_by_col_index(values);
        assert_eq!(t.get_col(0)[3], Value::Int(5));
        assert_eq!(t.get_col(1)[3], Value::Null);
    }
}
