//! `SortBy`: stable, multi-key row sort (§4.5). Row names travel with their
//! data — the row labeled `"r2"` still holds the same values after sorting,
//! just possibly at a different position. Each key names its column either
//! by position or by name.

use super::Table;
use crate::value::{compare_values, Value};

/// A sort key's column selector: by position (negative normalizes from the
/// end, as everywhere else in the table API) or by exact column name.
pub enum ColRef {
    Index(i64),
    Name(String),
}

/// One sort key: a column selector and direction.
pub struct SortKey {
    pub col: ColRef,
    pub ascending: bool,
}

impl SortKey {
    pub fn asc(col: i64) -> Self {
        Self { col: ColRef::Index(col), ascending: true }
    }

    pub fn desc(col: i64) -> Self {
        Self { col: ColRef::Index(col), ascending: false }
    }

    pub fn asc_name(col: impl Into<String>) -> Self {
        Self { col: ColRef::Name(col.into()), ascending: true }
    }

    pub fn desc_name(col: impl Into<String>) -> Self {
        Self { col: ColRef::Name(col.into()), ascending: false }
    }
}

impl Table {
    pub fn sort_by(&self, keys: &[SortKey]) -> &Self {
        if keys.is_empty() {
            return self;
        }
        let names = self.col_names();
        let col_positions: Vec<usize> = keys
            .iter()
            .filter_map(|k| match &k.col {
                ColRef::Index(i) => crate::list::normalize_index(*i, self.num_cols()),
                ColRef::Name(n) => names.iter().position(|c| c == n),
            })
            .collect();
        if col_positions.len() != keys.len() {
            self.record_warning("SortBy", "one or more sort keys referenced an out-of-range column");
            return self;
        }
        let directions: Vec<bool> = keys.iter().map(|k| k.ascending).collect();

        self.with_inner_mut(move |inner| {
            let nrows = inner.num_rows();
            let mut order: Vec<usize> = (0..nrows).collect();
            let row_keys: Vec<Vec<Value>> =
                (0..nrows).map(|r| col_positions.iter().map(|&c| inner.cols[c][r].clone()).collect()).collect();

            order.sort_by(|&a, &b| {
                for (i, asc) in directions.iter().enumerate() {
                    let ord = compare_values(&row_keys[a][i], &row_keys[b][i]);
                    if ord != std::cmp::Ordering::Equal {
                        return if *asc { ord } else { ord.reverse() };
                    }
                }
                std::cmp::Ordering::Equal
            });

            let old_names: Vec<String> =
                inner.row_index.ids().into_iter().filter_map(|id| inner.row_index.get(id).map(str::to_string)).collect();

            for col in inner.cols.iter_mut() {
                *col = order.iter().map(|&old| col[old].clone()).collect();
            }
            let new_names: Vec<String> = order.iter().map(|&old| old_names[old].clone()).collect();
            inner.row_index.clear();
            for n in new_names {
                inner.row_index.assign(&n);
            }
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_by_single_key_ascending() {
        let t = Table::from_columns(vec![("a".into(), vec![Value::Int(3), Value::Int(1), Value::Int(2)])]);
        t.sort_by(&[SortKey::asc(0)]);
        assert_eq!(t.get_col(0), vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn sort_by_preserves_row_name_with_data() {
        let t = Table::from_columns(vec![("a".into(), vec![Value::Int(3), Value::Int(1)])]);
        t.set_row_name(0, "first");
        t.sort_by(&[SortKey::asc(0)]);
        assert_eq!(t.get_row_name(1), Some("first".to_string()));
    }

    #[test]
    fn sort_by_column_name() {
        let t = Table::from_columns(vec![("a".into(), vec![Value::Int(3), Value::Int(1), Value::Int(2)])]);
        t.sort_by(&[SortKey::asc_name("a")]);
        assert_eq!(t.get_col(0), vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn multi_key_sort_breaks_ties() {
        let t = Table::from_columns(vec![
            ("a".into(), vec![Value::Int(1), Value::Int(1), Value::Int(0)]),
            ("b".into(), vec![Value::Int(2), Value::Int(1), Value::Int(9)]),
        ]);
        t.sort_by(&[SortKey::asc(0), SortKey::asc(1)]);
        assert_eq!(t.get_col(1), vec![Value::Int(9), Value::Int(1), Value::Int(2)]);
    }
}
