//! An in-memory analytical data library: a named, error-tracked `List`
//! column type and a row/column-indexed `Table`, both backed by a
//! per-object serialized `Actor`, plus a small column-calculation
//! expression language (CCL) for deriving table columns from others.
//!
//! Every mutating or observing operation on a `List`/`Table` runs as an
//! atomic critical section of that object's `Actor` (§4.3); the library
//! never panics on bad input from a caller — it records the problem in the
//! object's own bounded error ring and returns a sentinel (`Value::Null`,
//! `NaN`, an empty `Vec`, or `self` unchanged).

pub mod actor;
pub mod alpha;
pub mod bi_index;
pub mod ccl;
pub mod config;
pub mod error;
pub mod list;
pub mod logging;
pub mod ring;
pub mod table;
pub mod value;

pub use actor::{Actor, Group, SharedActor};
pub use bi_index::BiIndex;
pub use ccl::register_standard_functions;
pub use config::{set_config, Config};
pub use error::{Error, ErrorEntry, ErrorHistory};
pub use list::{InterpolationMethod, List};
pub use logging::LogLevel;
pub use table::{ColRef, SortKey, Table};
pub use value::{compare_values, Value};

/// Initializes process-wide state a fresh embedding needs before first use:
/// seeds the CCL function registry with `IF`/`AND`/`OR`/`CONCAT`/`SUM`/
/// `AVG`/`COUNT`/`MIN`/`MAX`. Idempotent — safe to call more than once (e.g.
/// once per test module).
pub fn init() {
    ccl::register_standard_functions();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_registers_standard_ccl_functions() {
        init();
        let t = Table::from_columns(vec![("a".into(), vec![Value::Float(1.0), Value::Float(2.0)])]);
        t.add_col_using_ccl("b", "SUM(a)");
        assert_eq!(t.get_col_by_name("b"), vec![Value::Float(3.0), Value::Float(3.0)]);
    }
}
