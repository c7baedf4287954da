//! Statistics over a `List`'s numeric-convertible elements (§4.4). Every
//! function here ignores non-numeric entries rather than NaN-filling them
//! (contrast with `to_f64_slice`); empty input yields NaN and an info-level
//! entry in the error ring.

use super::{percentile, List};
use crate::value::Value;

impl List {
    fn numeric_or_nan(&self, func: &'static str) -> Vec<f64> {
        let nums = self.numeric_filtered();
        if nums.is_empty() {
            self.record_info(func, "no numeric data");
        }
        nums
    }

    pub fn sum(&self) -> f64 {
        let nums = self.numeric_or_nan("Sum");
        if nums.is_empty() {
            return f64::NAN;
        }
        nums.iter().sum()
    }

    pub fn mean(&self) -> f64 {
        let nums = self.numeric_or_nan("Mean");
        if nums.is_empty() {
            return f64::NAN;
        }
        nums.iter().sum::<f64>() / nums.len() as f64
    }

    /// `weights` is read positionally against the list's own numeric view;
    /// mismatched lengths truncate to the shorter.
    pub fn weighted_mean(&self, weights: &[f64]) -> f64 {
        let nums = self.numeric_or_nan("WeightedMean");
        if nums.is_empty() || weights.is_empty() {
            return f64::NAN;
        }
        let n = nums.len().min(weights.len());
        let (mut num, mut den) = (0.0, 0.0);
        for i in 0..n {
            num += nums[i] * weights[i];
            den += weights[i];
        }
        if den == 0.0 {
            f64::NAN
        } else {
            num / den
        }
    }

    pub fn gmean(&self) -> f64 {
        let nums = self.numeric_or_nan("GMean");
        if nums.is_empty() || nums.iter().any(|&x| x <= 0.0) {
            return f64::NAN;
        }
        let log_sum: f64 = nums.iter().map(|x| x.ln()).sum();
        (log_sum / nums.len() as f64).exp()
    }

    pub fn median(&self) -> f64 {
        let mut nums = self.numeric_or_nan("Median");
        if nums.is_empty() {
            return f64::NAN;
        }
        nums.sort_by(|a, b| a.partial_cmp(b).unwrap());
        percentile(&nums, 50.0)
    }

    /// Every value tied for most frequent, in first-occurrence order
    /// (multi-modal: §4.4 "Mode (multi-modal returns all)").
    pub fn mode(&self) -> Vec<f64> {
        let nums = self.numeric_or_nan("Mode");
        if nums.is_empty() {
            return Vec::new();
        }
        let mut counts: Vec<(f64, usize)> = Vec::new();
        for &x in &nums {
            match counts.iter_mut().find(|(v, _)| *v == x) {
                Some((_, c)) => *c += 1,
                None => counts.push((x, 1)),
            }
        }
        let best_count = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
        counts.into_iter().filter(|(_, c)| *c == best_count).map(|(v, _)| v).collect()
    }

    /// Median absolute deviation from the median.
    pub fn mad(&self) -> f64 {
        let mut nums = self.numeric_or_nan("MAD");
        if nums.is_empty() {
            return f64::NAN;
        }
        nums.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let med = percentile(&nums, 50.0);
        let mut dev: Vec<f64> = nums.iter().map(|x| (x - med).abs()).collect();
        dev.sort_by(|a, b| a.partial_cmp(b).unwrap());
        percentile(&dev, 50.0)
    }

    pub fn var(&self) -> f64 {
        self.variance("Var", 1)
    }

    pub fn varp(&self) -> f64 {
        self.variance("VarP", 0)
    }

    fn variance(&self, func: &'static str, ddof: usize) -> f64 {
        let nums = self.numeric_or_nan(func);
        if nums.len() <= ddof {
            return f64::NAN;
        }
        let mean = nums.iter().sum::<f64>() / nums.len() as f64;
        let ss: f64 = nums.iter().map(|x| (x - mean).powi(2)).sum();
        ss / (nums.len() - ddof) as f64
    }

    pub fn stdev(&self) -> f64 {
        self.var().sqrt()
    }

    pub fn stdevp(&self) -> f64 {
        self.varp().sqrt()
    }

    pub fn range(&self) -> f64 {
        let nums = self.numeric_or_nan("Range");
        if nums.is_empty() {
            return f64::NAN;
        }
        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for &x in &nums {
            lo = lo.min(x);
            hi = hi.max(x);
        }
        hi - lo
    }

    pub fn min(&self) -> f64 {
        let nums = self.numeric_or_nan("Min");
        if nums.is_empty() {
            return f64::NAN;
        }
        nums.into_iter().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        let nums = self.numeric_or_nan("Max");
        if nums.is_empty() {
            return f64::NAN;
        }
        nums.into_iter().fold(f64::NEG_INFINITY, f64::max)
    }

    /// `q` in `[0, 4]`; `Quartile(2)` equals the median.
    pub fn quartile(&self, q: u8) -> f64 {
        self.percentile(q as f64 * 25.0)
    }

    pub fn iqr(&self) -> f64 {
        self.quartile(3) - self.quartile(1)
    }

    pub fn percentile(&self, p: f64) -> f64 {
        let mut nums = self.numeric_or_nan("Percentile");
        if nums.is_empty() {
            return f64::NAN;
        }
        nums.sort_by(|a, b| a.partial_cmp(b).unwrap());
        percentile(&nums, p)
    }

    /// First differences: `out[i] = v[i+1] - v[i]`.
    pub fn difference(&self) -> Vec<f64> {
        let nums = self.numeric_or_nan("Difference");
        if nums.len() < 2 {
            return Vec::new();
        }
        nums.windows(2).map(|w| w[1] - w[0]).collect()
    }

    pub(crate) fn push_values(&self, values: impl IntoIterator<Item = f64>) {
        self.append(values.into_iter().map(Value::Float));
    }
}
