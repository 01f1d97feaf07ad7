//! Minimal edit script between two sibling lists.
//!
//! [`diff_level`] works on identities only and knows nothing about hosts. Its
//! edits are meant to be applied in the order they are listed: removes (by
//! descending old index), then moves, then inserts (by ascending new index).
//! Every index refers to the sibling list as it is at the moment the edit is
//! applied.

use std::collections::HashMap;
use std::hash::Hash;

use lis::LisExt;

/// A sibling move: cut the entry at `from`, re-insert it so it lands at `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelMove {
    pub from: usize,
    pub to: usize,
}

/// The edit script of one level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelDiff {
    /// Old indices to remove, descending.
    pub removes: Vec<usize>,
    /// Moves among the survivors, in application order. Each carries the old
    /// index of the moved entry alongside the live positions.
    pub moves: Vec<(usize, LevelMove)>,
    /// New indices to insert, ascending.
    pub inserts: Vec<usize>,
    /// `(old index, new index)` of every matched entry, in new order.
    pub matched: Vec<(usize, usize)>,
    /// New indices whose identity already appeared earlier in the new list.
    pub duplicates: Vec<usize>,
}

impl LevelDiff {
    /// Returns true if applying the diff changes nothing.
    pub fn is_noop(&self) -> bool {
        self.removes.is_empty() && self.moves.is_empty() && self.inserts.is_empty()
    }
}

/// Computes the edit script turning `old` into `new`.
///
/// Entries are matched by identity. When an identity occurs more than once in
/// `old`, only its first occurrence can be matched; further occurrences in
/// either list are removed or inserted as unrelated entries.
pub fn diff_level<K: Eq + Hash>(old: &[K], new: &[K]) -> LevelDiff {
    let mut old_index: HashMap<&K, usize> = HashMap::with_capacity(old.len());
    for (index, id) in old.iter().enumerate() {
        old_index.entry(id).or_insert(index);
    }

    let mut diff = LevelDiff::default();
    let mut used_old = vec![false; old.len()];
    let mut seen_new: HashMap<&K, usize> = HashMap::with_capacity(new.len());
    let mut new_to_old: Vec<Option<usize>> = Vec::with_capacity(new.len());

    for (new_index, id) in new.iter().enumerate() {
        if seen_new.insert(id, new_index).is_some() {
            diff.duplicates.push(new_index);
        }
        let matched = match old_index.get(id) {
            Some(&old) if !used_old[old] => {
                used_old[old] = true;
                diff.matched.push((old, new_index));
                Some(old)
            }
            _ => None,
        };
        new_to_old.push(matched);
    }

    diff.removes = (0..old.len()).rev().filter(|&i| !used_old[i]).collect();

    // Survivors in live order, identified by old index.
    let mut live: Vec<usize> = (0..old.len()).filter(|&i| used_old[i]).collect();
    let target: Vec<usize> = new_to_old.iter().flatten().copied().collect();

    let mut stable = vec![false; old.len()];
    for position in target.longest_increasing_subsequence() {
        stable[target[position]] = true;
    }

    for (k, &old) in target.iter().enumerate() {
        if stable[old] {
            continue;
        }
        let Some(from) = live.iter().position(|&l| l == old) else {
            continue;
        };
        live.remove(from);
        let to = match k {
            0 => 0,
            _ => live
                .iter()
                .position(|&l| l == target[k - 1])
                .map_or(0, |p| p + 1),
        };
        live.insert(to, old);
        if from != to {
            diff.moves.push((old, LevelMove { from, to }));
        }
    }

    diff.inserts = new_to_old
        .iter()
        .enumerate()
        .filter(|(_, matched)| matched.is_none())
        .map(|(index, _)| index)
        .collect();

    diff
}

/// Applies a diff to a plain list, taking inserted entries from `new`.
///
/// Mirrors what a host does with the same edits, which makes it the reference
/// the engine's output is checked against.
pub fn apply_level<K: Clone>(list: &mut Vec<K>, diff: &LevelDiff, new: &[K]) {
    for &index in &diff.removes {
        list.remove(index);
    }
    for (_, m) in &diff.moves {
        let entry = list.remove(m.from);
        list.insert(m.to, entry);
    }
    for &index in &diff.inserts {
        list.insert(index, new[index].clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(old: &[char], new: &[char]) -> LevelDiff {
        let diff = diff_level(old, new);
        let mut list = old.to_vec();
        apply_level(&mut list, &diff, new);
        assert_eq!(list, new, "diff {diff:?} does not turn {old:?} into {new:?}");
        diff
    }

    #[test]
    fn test_identical_lists() {
        let diff = check(&['a', 'b', 'c'], &['a', 'b', 'c']);
        assert!(diff.is_noop());
        assert_eq!(diff.matched, vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_rotation_is_one_move() {
        let diff = check(&['a', 'b', 'c'], &['b', 'c', 'a']);
        assert!(diff.removes.is_empty());
        assert!(diff.inserts.is_empty());
        assert_eq!(diff.moves, vec![(0, LevelMove { from: 0, to: 2 })]);

        let diff = check(&['a', 'b', 'c'], &['c', 'a', 'b']);
        assert_eq!(diff.moves, vec![(2, LevelMove { from: 2, to: 0 })]);
    }

    #[test]
    fn test_insert_in_middle() {
        let diff = check(&['a', 'b'], &['a', 'c', 'b']);
        assert_eq!(diff.inserts, vec![1]);
        assert!(diff.removes.is_empty());
        assert!(diff.moves.is_empty());
    }

    #[test]
    fn test_removes_descend() {
        let diff = check(&['a', 'b', 'c', 'd'], &['b', 'd']);
        assert_eq!(diff.removes, vec![2, 0]);
        assert!(diff.moves.is_empty());
    }

    #[test]
    fn test_longest_ordered_run_stays() {
        // b, d and e keep their relative order; a and c move around them.
        let diff = check(&['a', 'b', 'c', 'd', 'e'], &['b', 'c', 'd', 'a', 'e']);
        assert_eq!(diff.moves.len(), 1);
        let diff = check(&['a', 'b', 'c', 'd', 'e'], &['c', 'b', 'e', 'd', 'a']);
        assert_eq!(diff.moves.len(), 3);
    }

    #[test]
    fn test_reverse() {
        let diff = check(&['a', 'b', 'c', 'd'], &['d', 'c', 'b', 'a']);
        assert_eq!(diff.moves.len(), 3);
    }

    #[test]
    fn test_mixed() {
        check(&['a', 'b', 'c', 'd', 'e'], &['e', 'x', 'c', 'a', 'y', 'd']);
        check(&[], &['a', 'b']);
        check(&['a', 'b'], &[]);
    }

    #[test]
    fn test_duplicates_never_panic() {
        let diff = check(&['a', 'a', 'b'], &['b', 'a', 'a', 'a']);
        assert_eq!(diff.duplicates, vec![2, 3]);
        assert_eq!(diff.matched.len(), 2);
    }
}
