//! C4: an ordered heterogeneous sequence with a name, timestamps, an
//! embedded `Actor`, and a bounded error ring (§3, §4.4).

mod interpolate;
mod stats;
mod transform;

pub use interpolate::*;
pub use stats::*;
pub use transform::*;

use crate::actor::{Group, SharedActor};
use crate::error::ErrorHistory;
use crate::logging::LogLevel;
use crate::value::Value;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

const PKG: &str = "list";

pub(crate) struct ListInner {
    pub(crate) name: String,
    pub(crate) data: Vec<Value>,
    pub(crate) creation_ts: DateTime<Utc>,
    pub(crate) last_modified_ts: DateTime<Utc>,
    pub(crate) errors: ErrorHistory,
}

impl ListInner {
    fn touch(&mut self) {
        let now = Utc::now();
        if now > self.last_modified_ts {
            self.last_modified_ts = now;
        }
    }
}

/// A cheap, `Arc`-backed handle to a column. Cloning a `List` yields another
/// handle to the *same* underlying data (mirrors the source's
/// pointer-receiver `*List` semantics); use [`List::clone_data`] for an
/// independent copy.
#[derive(Clone)]
pub struct List {
    pub(crate) inner: Arc<Mutex<ListInner>>,
    pub(crate) actor: SharedActor,
}

/// Normalizes a possibly-negative index against `len`. Negative indices
/// count from the end; returns `None` when still out of range.
pub fn normalize_index(i: i64, len: usize) -> Option<usize> {
    if i >= 0 {
        let i = i as usize;
        if i < len {
            Some(i)
        } else {
            None
        }
    } else {
        let from_end = (-i) as usize;
        if from_end <= len {
            Some(len - from_end)
        } else {
            None
        }
    }
}

impl List {
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        Self::new_in_group(values, Group::new())
    }

    pub fn new_in_group(values: impl IntoIterator<Item = Value>, group: Group) -> Self {
        let now = Utc::now();
        let inner = ListInner {
            name: String::new(),
            data: values.into_iter().collect(),
            creation_ts: now,
            last_modified_ts: now,
            errors: ErrorHistory::new(crate::config::error_ring_capacity()),
        };
        Self { inner: Arc::new(Mutex::new(inner)), actor: SharedActor::new(group) }
    }

    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    pub fn close(&self) {
        self.actor.close();
    }

    // --- internal helpers -------------------------------------------------

    pub(crate) fn record(&self, level: LogLevel, func: &'static str, msg: impl Into<String>) {
        let inner = self.inner.clone();
        let msg = msg.into();
        let _ = self.actor.atomic_do(move || {
            inner.lock().expect("list lock poisoned").errors.record(level, PKG, func, msg);
        });
    }

    pub(crate) fn record_warning(&self, func: &'static str, msg: impl Into<String>) {
        self.record(LogLevel::Warning, func, msg);
    }

    pub(crate) fn record_info(&self, func: &'static str, msg: impl Into<String>) {
        self.record(LogLevel::Info, func, msg);
    }

    /// Panics only if the list's own `Actor` was explicitly `close()`d while
    /// still in use — a misuse of the resource lifecycle, not a data error,
    /// so it is exempt from the "never panic" policy that governs business
    /// logic (bad index, empty stats, and the like).
    fn with_inner<R: Send + 'static>(&self, f: impl FnOnce(&ListInner) -> R + Send + 'static) -> R {
        let inner = self.inner.clone();
        self.actor
            .atomic_do(move || {
                let guard = inner.lock().expect("list lock poisoned");
                f(&guard)
            })
            .expect("list actor closed while in use")
    }

    fn with_inner_mut<R: Send + 'static>(&self, f: impl FnOnce(&mut ListInner) -> R + Send + 'static) -> R {
        let inner = self.inner.clone();
        self.actor
            .atomic_do(move || {
                let mut guard = inner.lock().expect("list lock poisoned");
                let r = f(&mut guard);
                guard.touch();
                r
            })
            .expect("list actor closed while in use")
    }

    // --- construction / identity -------------------------------------------

    pub fn len(&self) -> usize {
        self.with_inner(|inner| inner.data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_name(&self) -> String {
        self.with_inner(|inner| inner.name.clone())
    }

    pub fn set_name(&self, name: impl Into<String>) -> &Self {
        let name = name.into();
        self.with_inner_mut(move |inner| inner.name = name);
        self
    }

    pub fn creation_ts(&self) -> DateTime<Utc> {
        self.with_inner(|inner| inner.creation_ts)
    }

    pub fn last_modified_ts(&self) -> DateTime<Utc> {
        self.with_inner(|inner| inner.last_modified_ts)
    }

    /// A consistent point-in-time copy of every element.
    pub fn snapshot(&self) -> Vec<Value> {
        self.with_inner(|inner| inner.data.clone())
    }

    /// Independent deep copy: a new `List` with its own `Actor`, same data
    /// and name, distinct from `self` (invariant #5 in §8).
    pub fn clone_data(&self) -> Self {
        let (name, data) = self.with_inner(|inner| (inner.name.clone(), inner.data.clone()));
        let list = Self::new(data);
        list.set_name(name);
        list
    }

    pub fn err(&self) -> Option<String> {
        self.with_inner(|inner| inner.errors.last().map(|e| e.to_string()))
    }

    pub fn clear_err(&self) -> &Self {
        self.with_inner_mut(|inner| inner.errors.clear_last());
        self
    }

    // --- access -------------------------------------------------------------

    /// Negative indices read from the end; out-of-range returns `Value::Null`
    /// and records a warning.
    pub fn get(&self, i: i64) -> Value {
        let len = self.len();
        match normalize_index(i, len) {
            Some(idx) => self.with_inner(move |inner| inner.data[idx].clone()),
            None => {
                self.record_warning("Get", format!("index {i} out of range (len {len})"));
                Value::Null
            }
        }
    }

    pub fn at(&self, i: i64) -> Value {
        self.get(i)
    }

    // --- mutation -------------------------------------------------------------

    pub fn append(&self, values: impl IntoIterator<Item = Value>) -> &Self {
        let values: Vec<Value> = values.into_iter().collect();
        self.with_inner_mut(move |inner| inner.data.extend(values));
        self
    }

    pub fn insert_at(&self, i: i64, v: Value) -> &Self {
        let len = self.len();
        match normalize_index(i, len + 1) {
            Some(idx) => {
                self.with_inner_mut(move |inner| inner.data.insert(idx, v));
            }
            None => self.record_warning("InsertAt", format!("index {i} out of range (len {len})")),
        }
        self
    }

    pub fn update(&self, i: i64, v: Value) -> &Self {
        let len = self.len();
        match normalize_index(i, len) {
            Some(idx) => {
                self.with_inner_mut(move |inner| inner.data[idx] = v);
            }
            None => self.record_warning("Update", format!("index {i} out of range (len {len})")),
        }
        self
    }

    pub fn drop(&self, i: i64) -> &Self {
        let len = self.len();
        match normalize_index(i, len) {
            Some(idx) => {
                self.with_inner_mut(move |inner| {
                    inner.data.remove(idx);
                });
            }
            None => self.record_warning("Drop", format!("index {i} out of range (len {len})")),
        }
        self
    }

    pub fn drop_all(&self, v: Value) -> &Self {
        self.with_inner_mut(move |inner| inner.data.retain(|x| *x != v));
        self
    }

    /// NaN-aware: removes every element equal to any of `vs` (NaN == NaN
    /// for this membership test).
    pub fn drop_contains(&self, vs: impl IntoIterator<Item = Value>) -> &Self {
        let targets: Vec<Value> = vs.into_iter().collect();
        self.with_inner_mut(move |inner| {
            inner.data.retain(|x| !targets.iter().any(|t| x.eq_for_membership(t)));
        });
        self
    }

    pub fn drop_nan(&self) -> &Self {
        self.with_inner_mut(|inner| {
            inner.data.retain(|x| !matches!(x, Value::Float(f) if f.is_nan()));
        });
        self
    }

    pub fn drop_nil(&self) -> &Self {
        self.with_inner_mut(|inner| inner.data.retain(|x| !x.is_null()));
        self
    }

    pub fn clear(&self) -> &Self {
        self.with_inner_mut(|inner| inner.data.clear());
        self
    }

    pub fn clear_strings(&self) -> &Self {
        self.with_inner_mut(|inner| inner.data.retain(|x| !matches!(x, Value::Str(_))));
        self
    }

    pub fn clear_numbers(&self) -> &Self {
        self.with_inner_mut(|inner| inner.data.retain(|x| !x.is_numeric()));
        self
    }

    pub fn clear_nan(&self) -> &Self {
        self.drop_nan()
    }

    /// Drops elements more than `k` * IQR beyond the nearest quartile.
    pub fn clear_outliers(&self, k: f64) -> &Self {
        let nums = self.numeric_filtered();
        if nums.is_empty() {
            self.record_info("ClearOutliers", "no numeric data");
            return self;
        }
        let (q1, q3) = quartile_bounds(&nums);
        let iqr = q3 - q1;
        let (lo, hi) = (q1 - k * iqr, q3 + k * iqr);
        self.with_inner_mut(move |inner| {
            inner.data.retain(|x| match x.as_f64() {
                Some(f) if !f.is_nan() => f >= lo && f <= hi,
                _ => true,
            });
        });
        self
    }

    // --- search ---------------------------------------------------------------

    pub fn find_first(&self, v: &Value) -> Option<usize> {
        let v = v.clone();
        self.with_inner(move |inner| inner.data.iter().position(|x| x.eq_for_membership(&v)))
    }

    pub fn find_last(&self, v: &Value) -> Option<usize> {
        let v = v.clone();
        self.with_inner(move |inner| inner.data.iter().rposition(|x| x.eq_for_membership(&v)))
    }

    pub fn find_all(&self, v: &Value) -> Vec<usize> {
        let v = v.clone();
        self.with_inner(move |inner| {
            inner
                .data
                .iter()
                .enumerate()
                .filter_map(|(i, x)| x.eq_for_membership(&v).then_some(i))
                .collect()
        })
    }

    // --- replace ----------------------------------------------------------------

    pub fn replace_first(&self, target: Value, replacement: Value) -> &Self {
        self.with_inner_mut(move |inner| {
            if let Some(pos) = inner.data.iter().position(|x| x.eq_for_membership(&target)) {
                inner.data[pos] = replacement;
            }
        });
        self
    }

    pub fn replace_last(&self, target: Value, replacement: Value) -> &Self {
        self.with_inner_mut(move |inner| {
            if let Some(pos) = inner.data.iter().rposition(|x| x.eq_for_membership(&target)) {
                inner.data[pos] = replacement;
            }
        });
        self
    }

    pub fn replace_all(&self, target: Value, replacement: Value) -> &Self {
        self.with_inner_mut(move |inner| {
            for x in inner.data.iter_mut() {
                if x.eq_for_membership(&target) {
                    *x = replacement.clone();
                }
            }
        });
        self
    }

    pub fn replace_outliers(&self, threshold_k: f64, replacement: Value) -> &Self {
        let nums = self.numeric_filtered();
        if nums.is_empty() {
            self.record_info("ReplaceOutliers", "no numeric data");
            return self;
        }
        let (q1, q3) = quartile_bounds(&nums);
        let iqr = q3 - q1;
        let (lo, hi) = (q1 - threshold_k * iqr, q3 + threshold_k * iqr);
        self.with_inner_mut(move |inner| {
            for x in inner.data.iter_mut() {
                if let Some(f) = x.as_f64() {
                    if !f.is_nan() && (f < lo || f > hi) {
                        *x = replacement.clone();
                    }
                }
            }
        });
        self
    }

    // --- type coercion ------------------------------------------------------------

    /// Converts strings to floats where possible; leaves everything else.
    pub fn parse_numbers(&self) -> &Self {
        self.with_inner_mut(|inner| {
            for x in inner.data.iter_mut() {
                if let Value::Str(s) = x {
                    if let Ok(f) = s.parse::<f64>() {
                        *x = Value::Float(f);
                    }
                }
            }
        });
        self
    }

    pub fn parse_strings(&self) -> &Self {
        self.with_inner_mut(|inner| {
            for x in inner.data.iter_mut() {
                *x = Value::Str(x.stringify().into());
            }
        });
        self
    }

    /// Numeric-convertible entries as floats, non-numeric become NaN; same
    /// length as the list.
    pub fn to_f64_slice(&self) -> Vec<f64> {
        self.with_inner(|inner| inner.data.iter().map(|v| v.to_f64_lossy()).collect())
    }

    pub(crate) fn numeric_filtered(&self) -> Vec<f64> {
        self.with_inner(|inner| inner.data.iter().filter_map(|v| v.as_f64().filter(|f| !f.is_nan())).collect())
    }
}

/// Shared by `ClearOutliers`/`ReplaceOutliers`: (Q1, Q3) of a sorted-copy.
fn quartile_bounds(nums: &[f64]) -> (f64, f64) {
    let mut sorted = nums.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    (percentile(&sorted, 25.0), percentile(&sorted, 75.0))
}

pub(crate) fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vlist(nums: &[f64]) -> List {
        List::new(nums.iter().map(|&n| Value::Float(n)))
    }

    #[test]
    fn negative_index_reads_from_end() {
        let l = vlist(&[1.0, 2.0, 3.0]);
        assert_eq!(l.get(-1), Value::Float(3.0));
        assert_eq!(l.get(-3), Value::Float(1.0));
    }

    #[test]
    fn out_of_range_get_returns_null_and_warns() {
        let l = vlist(&[1.0]);
        assert_eq!(l.get(5), Value::Null);
        assert!(l.err().is_some());
    }

    #[test]
    fn drop_contains_removes_all_nans() {
        let l = vlist(&[1.0, f64::NAN, 2.0, f64::NAN]);
        l.drop_contains([Value::Float(f64::NAN)]);
        assert_eq!(l.len(), 2);
    }

    #[test]
    fn clone_data_is_independent() {
        let l = vlist(&[1.0, 2.0]);
        let c = l.clone_data();
        c.append([Value::Float(3.0)]);
        assert_eq!(l.len(), 2);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn find_all_is_nan_aware() {
        let l = vlist(&[f64::NAN, 1.0, f64::NAN]);
        assert_eq!(l.find_all(&Value::Float(f64::NAN)), vec![0, 2]);
    }

    #[test]
    fn parse_numbers_converts_numeric_strings() {
        let l = List::new([Value::from("3.5"), Value::from("abc")]);
        l.parse_numbers();
        assert_eq!(l.get(0), Value::Float(3.5));
        assert_eq!(l.get(1), Value::from("abc"));
    }
}
