//! Folding joined result rows into nested per-parent structures.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

/// Folds ordered `(parent, Option<child>)` pairs, the shape a left outer
/// join produces, into one `(parent, children)` group per parent key, in
/// first-seen parent order.
///
/// The first row for a key supplies the parent value; `None` children
/// (unmatched left rows) are dropped, so a childless parent still shows
/// up with an empty list.
pub fn group_one_to_many<P, C, K, F>(rows: Vec<(P, Option<C>)>, key: F) -> Vec<(P, Vec<C>)>
where
    K: Eq + Hash,
    F: Fn(&P) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(P, Vec<C>)> = Vec::new();

    for (parent, child) in rows {
        let idx = match slots.entry(key(&parent)) {
            Entry::Occupied(occupied) => *occupied.get(),
            Entry::Vacant(vacant) => {
                let idx = groups.len();
                vacant.insert(idx);
                groups.push((parent, Vec::new()));
                idx
            }
        };
        if let Some(child) = child {
            groups[idx].1.push(child);
        }
    }

    groups
}
