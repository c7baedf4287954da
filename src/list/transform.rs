//! Element-wise and whole-sequence transforms (§4.4): `Map`, `Sort`,
//! `Reverse`, `Rank`, string-case helpers, and the smoothing/series family.

use super::List;
use crate::logging::LogLevel;
use crate::value::{compare_values, Value};
use std::panic::{catch_unwind, AssertUnwindSafe};

impl List {
    /// Applies `f(index, value)` element-wise. A callback that panics
    /// leaves that element unchanged and records a warning instead of
    /// unwinding through the list's own critical section (§4.4, §7
    /// "recovered from a callback's runtime panic in Map/Filter").
    pub fn map(&self, f: impl Fn(usize, &Value) -> Value + Send + Sync + 'static) -> &Self {
        self.with_inner_mut(move |inner| {
            for i in 0..inner.data.len() {
                let original = inner.data[i].clone();
                match catch_unwind(AssertUnwindSafe(|| f(i, &original))) {
                    Ok(v) => inner.data[i] = v,
                    Err(_) => {
                        inner.errors.record(LogLevel::Warning, super::PKG, "Map", format!("callback panicked at index {i}; value left unchanged"));
                    }
                }
            }
        });
        self
    }

    pub fn sort(&self, ascending: bool) -> &Self {
        self.with_inner_mut(move |inner| {
            inner.data.sort_by(|a, b| {
                let ord = compare_values(a, b);
                if ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        });
        self
    }

    pub fn reverse(&self) -> &Self {
        self.with_inner_mut(|inner| inner.data.reverse());
        self
    }

    /// 1-based competition ranking (ties share the lower rank); `Null`/NaN
    /// entries rank last via `compare_values`'s ordering.
    pub fn rank(&self) -> Vec<f64> {
        self.with_inner(|inner| {
            let n = inner.data.len();
            let mut order: Vec<usize> = (0..n).collect();
            order.sort_by(|&i, &j| compare_values(&inner.data[i], &inner.data[j]));
            let mut ranks = vec![0.0; n];
            let mut i = 0;
            while i < n {
                let mut j = i;
                while j + 1 < n && compare_values(&inner.data[order[j + 1]], &inner.data[order[i]]) == std::cmp::Ordering::Equal {
                    j += 1;
                }
                let r = (i + 1) as f64;
                for &idx in &order[i..=j] {
                    ranks[idx] = r;
                }
                i = j + 1;
            }
            ranks
        })
    }

    fn map_strings(&self, f: impl Fn(&str) -> String + Send + 'static) -> &Self {
        self.with_inner_mut(move |inner| {
            for x in inner.data.iter_mut() {
                if let Value::Str(s) = x {
                    *x = Value::from(f(s.as_str()));
                }
            }
        });
        self
    }

    pub fn upper(&self) -> &Self {
        self.map_strings(|s| s.to_uppercase())
    }

    pub fn lower(&self) -> &Self {
        self.map_strings(|s| s.to_lowercase())
    }

    pub fn capitalize(&self) -> &Self {
        self.map_strings(|s| {
            let mut chars = s.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
    }

    /// Trailing simple moving average of `window`; the first `window - 1`
    /// outputs are NaN.
    pub fn moving_average(&self, window: usize) -> Vec<f64> {
        let nums = self.to_f64_slice();
        series_window(&nums, window, |w| w.iter().sum::<f64>() / w.len() as f64)
    }

    pub fn weighted_moving_average(&self, weights: &[f64]) -> Vec<f64> {
        let nums = self.to_f64_slice();
        let window = weights.len();
        let wsum: f64 = weights.iter().sum();
        series_window(&nums, window, |w| {
            w.iter().zip(weights.iter()).map(|(x, wt)| x * wt).sum::<f64>() / wsum
        })
    }

    pub fn moving_stdev(&self, window: usize) -> Vec<f64> {
        let nums = self.to_f64_slice();
        series_window(&nums, window, |w| {
            let mean = w.iter().sum::<f64>() / w.len() as f64;
            let ss: f64 = w.iter().map(|x| (x - mean).powi(2)).sum();
            (ss / w.len() as f64).sqrt()
        })
    }

    /// Simple exponential smoothing with smoothing factor `alpha`; `out[0]`
    /// seeds from the first observation.
    pub fn exponential_smoothing(&self, alpha: f64) -> Vec<f64> {
        let nums = self.to_f64_slice();
        if nums.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(nums.len());
        out.push(nums[0]);
        for i in 1..nums.len() {
            out.push(alpha * nums[i] + (1.0 - alpha) * out[i - 1]);
        }
        out
    }

    /// Holt's double exponential smoothing (level + trend).
    pub fn double_exponential_smoothing(&self, alpha: f64, beta: f64) -> Vec<f64> {
        let nums = self.to_f64_slice();
        if nums.is_empty() {
            return Vec::new();
        }
        if nums.len() == 1 {
            return vec![nums[0]];
        }
        let mut level = nums[0];
        let mut trend = nums[1] - nums[0];
        let mut out = vec![nums[0]];
        for &x in &nums[1..] {
            let last_level = level;
            level = alpha * x + (1.0 - alpha) * (level + trend);
            trend = beta * (level - last_level) + (1.0 - beta) * trend;
            out.push(level);
        }
        out
    }
}

/// Applies `f` to each trailing window of `nums`; positions before a full
/// window is available are NaN. Shared by the moving-average family.
fn series_window(nums: &[f64], window: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    if window == 0 || nums.len() < window {
        return vec![f64::NAN; nums.len()];
    }
    let mut out = vec![f64::NAN; window - 1];
    for w in nums.windows(window) {
        out.push(f(w));
    }
    out
}
