//! C1: a bijective id<->name map with stable ids, free-list reuse, and
//! shift-delete. Not thread-safe by itself; callers serialize through the
//! owning `Table`'s `Actor`.

use rustc_hash::FxHashMap;
use std::collections::HashMap as StdHashMap;

#[derive(Debug, Clone, Default)]
pub struct BiIndex {
    id_to_name: FxHashMap<usize, String>,
    name_to_id: FxHashMap<String, usize>,
    free_list: Vec<usize>,
    next_id: usize,
}

/// Maps ids that existed before a `delete_and_shift` to their new id, for
/// callers that need to relocate parallel arrays.
pub type Remap = StdHashMap<usize, usize>;

/// Appends `_1`, `_2`, ... to `base` until the result isn't already present
/// in `existing` (§3's column/row name disambiguation rule). Returns `base`
/// unchanged when it isn't already taken.
pub fn disambiguate_name(existing: &[String], base: &str) -> String {
    if !existing.iter().any(|n| n == base) {
        return base.to_string();
    }
    let mut i = 1usize;
    loop {
        let candidate = format!("{base}_{i}");
        if !existing.iter().any(|n| n == &candidate) {
            return candidate;
        }
        i += 1;
    }
}

impl BiIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.id_to_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_name.is_empty()
    }

    /// Assigns a fresh (or existing) id to `name`. Returns `(id, was_new)`.
    pub fn assign(&mut self, name: &str) -> (usize, bool) {
        if let Some(&id) = self.name_to_id.get(name) {
            return (id, false);
        }
        let id = self.next_free_id();
        self.id_to_name.insert(id, name.to_string());
        self.name_to_id.insert(name.to_string(), id);
        (id, true)
    }

    fn next_free_id(&mut self) -> usize {
        if let Some(pos) = self.free_list.iter().enumerate().min_by_key(|(_, &id)| id) {
            let (idx, &id) = pos;
            self.free_list.remove(idx);
            id
        } else {
            let id = self.next_id;
            self.next_id += 1;
            id
        }
    }

    /// Replaces the mapping for `id`. Fails only if `name` is already bound
    /// to a *different* id. Returns `(previous_name, ok)`.
    pub fn set(&mut self, id: usize, name: &str) -> (Option<String>, bool) {
        if let Some(&existing) = self.name_to_id.get(name) {
            if existing != id {
                return (self.id_to_name.get(&id).cloned(), false);
            }
        }
        let prev = self.id_to_name.insert(id, name.to_string());
        if let Some(ref old) = prev {
            self.name_to_id.remove(old);
        }
        self.name_to_id.insert(name.to_string(), id);
        self.free_list.retain(|&fid| fid != id);
        if id >= self.next_id {
            self.next_id = id + 1;
        }
        (prev, true)
    }

    /// Removes `id` from both directions and returns it to the free-list.
    /// Idempotent on an absent id.
    pub fn delete_by_id(&mut self, id: usize) -> bool {
        if let Some(name) = self.id_to_name.remove(&id) {
            self.name_to_id.remove(&name);
            self.free_list.push(id);
            true
        } else {
            false
        }
    }

    pub fn delete_by_name(&mut self, name: &str) -> bool {
        if let Some(&id) = self.name_to_id.get(name) {
            self.delete_by_id(id)
        } else {
            false
        }
    }

    /// Deletes `id`, then decrements every id' > id by one. Returns
    /// `(name, remap, ok)` where `remap` maps old ids to new ids for every
    /// shifted entry.
    pub fn delete_and_shift(&mut self, id: usize) -> (Option<String>, Remap, bool) {
        let Some(name) = self.id_to_name.remove(&id) else {
            return (None, Remap::new(), false);
        };
        self.name_to_id.remove(&name);
        self.free_list.retain(|&fid| fid != id);

        let mut remap = Remap::new();
        let shifted: Vec<(usize, String)> = self
            .id_to_name
            .iter()
            .filter(|(&old_id, _)| old_id > id)
            .map(|(&old_id, n)| (old_id, n.clone()))
            .collect();

        for (old_id, name) in shifted {
            let new_id = old_id - 1;
            self.id_to_name.remove(&old_id);
            self.id_to_name.insert(new_id, name.clone());
            self.name_to_id.insert(name, new_id);
            remap.insert(old_id, new_id);
        }

        self.free_list.iter_mut().for_each(|fid| {
            if *fid > id {
                *fid -= 1;
            }
        });
        if self.next_id > 0 {
            self.next_id -= 1;
        }

        (Some(name), remap, true)
    }

    pub fn clear(&mut self) {
        self.id_to_name.clear();
        self.name_to_id.clear();
        self.free_list.clear();
        self.next_id = 0;
    }

    pub fn ids(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self.id_to_name.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn has(&self, name: &str) -> bool {
        self.name_to_id.contains_key(name)
    }

    pub fn get(&self, id: usize) -> Option<&str> {
        self.id_to_name.get(&id).map(|s| s.as_str())
    }

    pub fn index(&self, name: &str) -> Option<usize> {
        self.name_to_id.get(name).copied()
    }

    /// Swaps which name `a` and `b` refer to, leaving both ids otherwise
    /// in place. Used by `Table::swap_cols`/`swap_rows` so a name keeps
    /// pointing at "its own" data after a physical position swap.
    pub fn swap_ids(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let (name_a, name_b) = (self.id_to_name.get(&a).cloned(), self.id_to_name.get(&b).cloned());
        if let Some(ref n) = name_a {
            self.id_to_name.insert(b, n.clone());
            self.name_to_id.insert(n.clone(), b);
        }
        if let Some(ref n) = name_b {
            self.id_to_name.insert(a, n.clone());
            self.name_to_id.insert(n.clone(), a);
        }
    }
}
