//! Pure interpolation over a numeric-convertible list (§4.4): `List`
//! elements are keyed by their position (`x = index`), and each method
//! estimates the value at an arbitrary real `x`. Out-of-range `x` — before
//! the first known point or after the last — yields `NaN` and an info-level
//! error-ring entry rather than extrapolating, per §8 S7. None of these
//! mutate the list.

use super::List;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMethod {
    Linear,
    Nearest,
    Quadratic,
    Lagrange,
    Newton,
    Hermite,
}

impl List {
    /// Dispatches to the method-specific `*_interpolation` below; `Hermite`
    /// always uses estimated derivatives (use `hermite_interpolation`
    /// directly to supply explicit ones).
    pub fn interpolate(&self, method: InterpolationMethod, x: f64) -> f64 {
        match method {
            InterpolationMethod::Linear => self.linear_interpolation(x),
            InterpolationMethod::Nearest => self.nearest_interpolation(x),
            InterpolationMethod::Quadratic => self.quadratic_interpolation(x),
            InterpolationMethod::Lagrange => self.lagrange_interpolation(x),
            InterpolationMethod::Newton => self.newton_interpolation(x),
            InterpolationMethod::Hermite => self.hermite_interpolation(x, None),
        }
    }

    pub fn linear_interpolation(&self, x: f64) -> f64 {
        self.with_known_points("LinearInterpolation", x, |known| linear(known, x))
    }

    pub fn nearest_interpolation(&self, x: f64) -> f64 {
        self.with_known_points("NearestInterpolation", x, |known| nearest(known, x))
    }

    pub fn quadratic_interpolation(&self, x: f64) -> f64 {
        self.with_known_points("QuadraticInterpolation", x, |known| quadratic(known, x))
    }

    pub fn lagrange_interpolation(&self, x: f64) -> f64 {
        self.with_known_points("LagrangeInterpolation", x, |known| lagrange(known, x))
    }

    pub fn newton_interpolation(&self, x: f64) -> f64 {
        self.with_known_points("NewtonInterpolation", x, |known| newton(known, x))
    }

    /// `derivatives`, if given, is indexed by list position and overrides
    /// the finite-difference estimate at any known point it covers.
    pub fn hermite_interpolation(&self, x: f64, derivatives: Option<&[f64]>) -> f64 {
        self.with_known_points("HermiteInterpolation", x, |known| hermite(known, x, derivatives))
    }

    /// Builds the `(position, value)` known-point list (non-`NaN` entries),
    /// bails out to `NaN` + a recorded entry if there are too few points or
    /// `x` falls outside the known range, and otherwise runs `f`.
    fn with_known_points(&self, func: &'static str, x: f64, f: impl FnOnce(&[(f64, f64)]) -> f64) -> f64 {
        let raw = self.to_f64_slice();
        let known: Vec<(f64, f64)> = raw.iter().enumerate().filter(|(_, v)| !v.is_nan()).map(|(i, &v)| (i as f64, v)).collect();

        if known.len() < 2 {
            self.record_info(func, "fewer than two known points");
            return f64::NAN;
        }

        let (min_x, max_x) = (known.first().unwrap().0, known.last().unwrap().0);
        if x < min_x || x > max_x {
            self.record_warning(func, format!("x={x} is outside the known range [{min_x}, {max_x}]"));
            return f64::NAN;
        }

        f(&known)
    }
}

fn bracket(known: &[(f64, f64)], x: f64) -> (Option<(f64, f64)>, Option<(f64, f64)>) {
    let before = known.iter().filter(|(kx, _)| *kx <= x).copied().last();
    let after = known.iter().find(|(kx, _)| *kx > x).copied();
    (before, after)
}

fn linear(known: &[(f64, f64)], x: f64) -> f64 {
    match bracket(known, x) {
        (Some((x0, y0)), Some((x1, y1))) if x0 != x1 => y0 + (y1 - y0) * (x - x0) / (x1 - x0),
        (Some((_, y0)), _) => y0,
        (None, Some((_, y1))) => y1,
        (None, None) => f64::NAN,
    }
}

fn nearest(known: &[(f64, f64)], x: f64) -> f64 {
    known
        .iter()
        .min_by(|(ax, _), (bx, _)| (ax - x).abs().partial_cmp(&(bx - x).abs()).unwrap())
        .map(|&(_, y)| y)
        .unwrap_or(f64::NAN)
}

/// Fits a quadratic through the three known points nearest `x`.
fn quadratic(known: &[(f64, f64)], x: f64) -> f64 {
    if known.len() < 3 {
        return linear(known, x);
    }
    let mut sorted = known.to_vec();
    sorted.sort_by(|(ax, _), (bx, _)| (ax - x).abs().partial_cmp(&(bx - x).abs()).unwrap());
    lagrange(&sorted[..3], x)
}

/// Full Lagrange polynomial through every known point.
fn lagrange(known: &[(f64, f64)], x: f64) -> f64 {
    let mut total = 0.0;
    for (i, &(xi, yi)) in known.iter().enumerate() {
        let mut term = yi;
        for (j, &(xj, _)) in known.iter().enumerate() {
            if i != j {
                term *= (x - xj) / (xi - xj);
            }
        }
        total += term;
    }
    total
}

/// Newton's divided-difference form; mathematically identical to
/// `lagrange` for a fixed point set, built independently per the source's
/// distinct named routine.
fn newton(known: &[(f64, f64)], x: f64) -> f64 {
    let n = known.len();
    let xs: Vec<f64> = known.iter().map(|(kx, _)| *kx).collect();
    let mut coef: Vec<f64> = known.iter().map(|(_, ky)| *ky).collect();
    for j in 1..n {
        for i in (j..n).rev() {
            coef[i] = (coef[i] - coef[i - 1]) / (xs[i] - xs[i - j]);
        }
    }
    let mut result = coef[n - 1];
    for i in (0..n - 1).rev() {
        result = result * (x - xs[i]) + coef[i];
    }
    result
}

/// Cubic Hermite between the two known points bracketing `x`. Derivatives
/// come from `derivatives` (indexed by list position) when supplied, else
/// from central (or one-sided, at the ends) finite difference.
fn hermite(known: &[(f64, f64)], x: f64, derivatives: Option<&[f64]>) -> f64 {
    let (before, after) = bracket(known, x);
    let (p0, p1) = match (before, after) {
        (Some(a), Some(b)) if a.0 != b.0 => (a, b),
        (Some(a), _) => return a.1,
        (None, Some(b)) => return b.1,
        (None, None) => return f64::NAN,
    };
    let i0 = known.iter().position(|&p| p == p0).unwrap();
    let i1 = known.iter().position(|&p| p == p1).unwrap();

    let estimated_slope = |idx: usize| -> f64 {
        let prev = idx.checked_sub(1).map(|i| known[i]);
        let next = known.get(idx + 1).copied();
        match (prev, next) {
            (Some((xp, yp)), Some((xn, yn))) => (yn - yp) / (xn - xp),
            (Some((xp, yp)), None) => (known[idx].1 - yp) / (known[idx].0 - xp),
            (None, Some((xn, yn))) => (yn - known[idx].1) / (xn - known[idx].0),
            (None, None) => 0.0,
        }
    };
    let slope_at = |idx: usize| -> f64 {
        let pos = known[idx].0 as usize;
        derivatives.and_then(|d| d.get(pos)).copied().unwrap_or_else(|| estimated_slope(idx))
    };

    let (m0, m1) = (slope_at(i0), slope_at(i1));
    let h = p1.0 - p0.0;
    let t = (x - p0.0) / h;
    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;
    h00 * p0.1 + h10 * h * m0 + h01 * p1.1 + h11 * h * m1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn linear_interpolation_between_known_points() {
        let l = List::new([Value::Float(1.0), Value::Float(3.0), Value::Float(2.0)]);
        assert_eq!(l.linear_interpolation(0.5), 2.0);
        assert_eq!(l.linear_interpolation(1.5), 2.5);
    }

    #[test]
    fn linear_interpolation_out_of_range_is_nan_and_warns() {
        let l = List::new([Value::Float(1.0), Value::Float(3.0), Value::Float(2.0)]);
        let v = l.linear_interpolation(-1.0);
        assert!(v.is_nan());
        assert!(l.err().is_some());
    }

    #[test]
    fn nearest_picks_closer_known_point() {
        let l = List::new([Value::Float(0.0), Value::Null, Value::Float(30.0)]);
        assert_eq!(l.nearest_interpolation(0.8), 0.0);
        assert_eq!(l.nearest_interpolation(1.6), 30.0);
    }

    #[test]
    fn lagrange_reproduces_linear_for_two_points() {
        let l = List::new([Value::Float(0.0), Value::Float(10.0)]);
        assert_eq!(l.lagrange_interpolation(0.5), 5.0);
    }

    #[test]
    fn newton_matches_lagrange_on_same_points() {
        let known = vec![(0.0, 0.0), (1.0, 1.0), (2.0, 4.0)];
        assert!((newton(&known, 1.5) - lagrange(&known, 1.5)).abs() < 1e-9);
    }

    #[test]
    fn too_few_known_points_is_nan_and_records_info() {
        let l = List::new([Value::Float(1.0)]);
        let v = l.linear_interpolation(0.0);
        assert!(v.is_nan());
        assert!(l.err().is_some());
    }

    #[test]
    fn hermite_uses_supplied_derivative_over_estimate() {
        let l = List::new([Value::Float(0.0), Value::Float(1.0)]);
        let default = l.hermite_interpolation(0.5, None);
        l.clear_err();
        let overridden = l.hermite_interpolation(0.5, Some(&[5.0, 0.0]));
        assert_ne!(default, overridden);
    }
}
