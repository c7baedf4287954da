//! The tagged dynamic value carried by every `List` element and produced by
//! CCL evaluation (§3, §9's "dynamic typing" design note).

use chrono::{DateTime, Utc};
use smol_str::SmolStr;
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A value the core cannot interpret but must still store and round-trip —
/// the role a collaborator I/O connector would use for e.g. binary blobs.
#[derive(Clone)]
pub struct OpaqueValue {
    pub tag: SmolStr,
    pub data: Arc<dyn Any + Send + Sync>,
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.tag)
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && Arc::ptr_eq(&self.data, &other.data)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(SmolStr),
    Timestamp(DateTime<Utc>),
    Opaque(OpaqueValue),
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

/// Rank order used for mixed-type comparisons (§4.5, §4.9): nil < bool <
/// number < string < timestamp < other.
fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) | Value::UInt(_) | Value::Float(_) => 2,
        Value::Str(_) => 3,
        Value::Timestamp(_) => 4,
        Value::Opaque(_) => 5,
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Best-effort conversion to `f64`; non-numeric values yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::UInt(u) => Some(*u as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Str(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    /// `ToF64Slice` semantics for a single value: numeric-convertible
    /// values as floats, everything else NaN.
    pub fn to_f64_lossy(&self) -> f64 {
        self.as_f64().unwrap_or(f64::NAN)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::UInt(_) | Value::Float(_))
    }

    /// Truthiness used by `&&`/`||`/`!`/`IF`: non-zero number, non-empty
    /// string, `true`, non-null non-empty array is handled by the caller
    /// (arrays aren't a `Value` variant — they appear only transiently as
    /// `@.row` results); `Null` is false.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::UInt(u) => *u != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Timestamp(_) => true,
            Value::Opaque(_) => true,
        }
    }

    pub fn stringify(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::UInt(u) => u.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.to_string(),
            Value::Timestamp(t) => t.to_rfc3339(),
            Value::Opaque(o) => format!("<opaque:{}>", o.tag),
        }
    }

    /// Equality used by membership tests (`DropContains`, `FindFirst/Last/
    /// All`, `ClearNaN`-style outlier scans): NaN equals NaN here, unlike
    /// the user-facing `==`/`PartialEq` where NaN never equals itself.
    pub fn eq_for_membership(&self, other: &Value) -> bool {
        if let (Value::Float(a), Value::Float(b)) = (self, other) {
            if a.is_nan() && b.is_nan() {
                return true;
            }
        }
        self == other
    }
}

/// Mixed-type ordering per §4.5: rank first, then type-specific comparison;
/// NaN sorts last among numbers.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    let (ra, rb) = (type_rank(a), type_rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::Opaque(_), Value::Opaque(_)) => Ordering::Equal,
        _ if a.is_numeric() && b.is_numeric() => {
            let (x, y) = (a.to_f64_lossy(), b.to_f64_lossy());
            match (x.is_nan(), y.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            }
        }
        _ => Ordering::Equal,
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(SmolStr::new(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(SmolStr::new(s))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stringify())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_not_equal_to_itself_for_user_facing_eq() {
        let a = Value::Float(f64::NAN);
        let b = Value::Float(f64::NAN);
        assert_ne!(a, b);
    }

    #[test]
    fn nan_equal_to_itself_for_membership() {
        let a = Value::Float(f64::NAN);
        let b = Value::Float(f64::NAN);
        assert!(a.eq_for_membership(&b));
    }

    #[test]
    fn mixed_rank_order() {
        assert_eq!(compare_values(&Value::Null, &Value::Bool(true)), Ordering::Less);
        assert_eq!(compare_values(&Value::Bool(true), &Value::Int(1)), Ordering::Less);
        assert_eq!(compare_values(&Value::Int(1), &Value::Str("a".into())), Ordering::Less);
    }

    #[test]
    fn nan_sorts_last_among_numbers() {
        let nan = Value::Float(f64::NAN);
        let one = Value::Int(1);
        assert_eq!(compare_values(&nan, &one), Ordering::Greater);
        assert_eq!(compare_values(&one, &nan), Ordering::Less);
    }

    #[test]
    fn truthy_rules() {
        assert!(!Value::Null.truthy());
        assert!(!Value::Str(SmolStr::new("")).truthy());
        assert!(Value::Str(SmolStr::new("x")).truthy());
        assert!(!Value::Int(0).truthy());
        assert!(Value::Int(1).truthy());
    }
}
