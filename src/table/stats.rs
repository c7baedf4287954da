//! Table-scope aggregate helpers (§4.5): `Count`/`Counter` over a column's
//! values, and `Mean` broadcast across every numeric column.

use super::Table;
use crate::value::Value;
use rustc_hash::FxHashMap;

impl Table {
    /// Number of occurrences of `v` in column `col` (NaN-aware).
    pub fn count(&self, col: i64, v: &Value) -> usize {
        self.find_all_in_col(col, v).len()
    }

    /// Frequency table of every distinct stringified value in `col`.
    pub fn counter(&self, col: i64) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        for v in self.get_col(col) {
            *counts.entry(v.stringify()).or_insert(0) += 1;
        }
        counts
    }

    /// Mean of every numeric cell in the table, across all columns (§4.5).
    pub fn mean(&self) -> f64 {
        let ncols = self.num_cols();
        let nums: Vec<f64> =
            (0..ncols as i64).flat_map(|c| self.get_col(c)).filter_map(|v| v.as_f64().filter(|f| !f.is_nan())).collect();
        if nums.is_empty() {
            f64::NAN
        } else {
            nums.iter().sum::<f64>() / nums.len() as f64
        }
    }
}
