//! C9: process-wide scalar/aggregate function tables. Names are matched
//! case-insensitively; registering an existing name overwrites it
//! (last-write-wins), mirroring `Config`'s publish-through-a-lock discipline.

use crate::error::Error;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub type ScalarFn = Arc<dyn Fn(&[Value]) -> Result<Value, Error> + Send + Sync>;
pub type AggregateFn = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

lazy_static::lazy_static! {
    static ref SCALARS: RwLock<HashMap<String, ScalarFn>> = RwLock::new(HashMap::new());
    static ref AGGREGATES: RwLock<HashMap<String, AggregateFn>> = RwLock::new(HashMap::new());
}

fn key(name: &str) -> String {
    name.to_ascii_uppercase()
}

pub fn register_scalar_function<F>(name: &str, f: F)
where
    F: Fn(&[Value]) -> Result<Value, Error> + Send + Sync + 'static,
{
    SCALARS.write().expect("ccl scalar registry poisoned").insert(key(name), Arc::new(f));
}

pub fn register_aggregate_function<F>(name: &str, f: F)
where
    F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
{
    AGGREGATES.write().expect("ccl aggregate registry poisoned").insert(key(name), Arc::new(f));
}

pub fn is_aggregate(name: &str) -> bool {
    AGGREGATES.read().expect("ccl aggregate registry poisoned").contains_key(&key(name))
}

pub fn scalar_fn(name: &str) -> Option<ScalarFn> {
    SCALARS.read().expect("ccl scalar registry poisoned").get(&key(name)).cloned()
}

pub fn aggregate_fn(name: &str) -> Option<AggregateFn> {
    AGGREGATES.read().expect("ccl aggregate registry poisoned").get(&key(name)).cloned()
}

fn truthy_all(args: &[Value]) -> bool {
    args.iter().all(Value::truthy)
}

/// Seeds the baseline vocabulary: `IF`/`AND`/`OR`/`CONCAT` scalar,
/// `SUM`/`AVG`/`COUNT`/`MIN`/`MAX` aggregate. Safe to call repeatedly —
/// re-registers the same definitions (last-write-wins).
pub fn register_standard_functions() {
    register_scalar_function("IF", |args| {
        let cond = args.first().ok_or_else(|| Error::invalid_argument("IF requires 3 arguments"))?;
        let (then_v, else_v) =
            (args.get(1).cloned().unwrap_or(Value::Null), args.get(2).cloned().unwrap_or(Value::Null));
        Ok(if cond.truthy() { then_v } else { else_v })
    });
    register_scalar_function("AND", |args| Ok(Value::Bool(truthy_all(args))));
    register_scalar_function("OR", |args| Ok(Value::Bool(args.iter().any(Value::truthy))));
    register_scalar_function("CONCAT", |args| Ok(Value::from(args.iter().map(Value::stringify).collect::<String>())));

    register_aggregate_function("SUM", |xs| xs.iter().sum());
    register_aggregate_function("AVG", |xs| if xs.is_empty() { f64::NAN } else { xs.iter().sum::<f64>() / xs.len() as f64 });
    register_aggregate_function("COUNT", |xs| xs.len() as f64);
    register_aggregate_function("MIN", |xs| xs.iter().cloned().fold(f64::INFINITY, f64::min));
    register_aggregate_function("MAX", |xs| xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        register_standard_functions();
        assert!(is_aggregate("sum"));
        assert!(scalar_fn("if").is_some());
    }

    #[test]
    fn re_registering_overwrites() {
        register_scalar_function("DOUBLER", |args| Ok(Value::Float(args[0].to_f64_lossy() * 2.0)));
        register_scalar_function("DOUBLER", |args| Ok(Value::Float(args[0].to_f64_lossy() * 3.0)));
        let f = scalar_fn("DOUBLER").unwrap();
        assert_eq!(f(&[Value::Float(2.0)]).unwrap(), Value::Float(6.0));
    }
}
