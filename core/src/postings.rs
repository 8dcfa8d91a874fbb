//! Merge-based set algebra over postings lists.
//!
//! Every input must be strictly ascending; every output is strictly ascending.
//! Each operation is a single linear pass over its inputs.

use crate::DocId;
use std::cmp::Ordering;

pub fn intersect(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

pub fn union(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Ids of `universe` not present in `a`. `a` must be a subset of `universe`.
pub fn complement(a: &[DocId], universe: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(universe.len().saturating_sub(a.len()));
    let mut i = 0;
    for &id in universe {
        while i < a.len() && a[i] < id {
            i += 1;
        }
        if i < a.len() && a[i] == id {
            i += 1;
        } else {
            out.push(id);
        }
    }
    out
}

pub fn is_strictly_ascending(list: &[DocId]) -> bool {
    list.windows(2).all(|w| w[0] < w[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::btree_set;
    use proptest::prelude::*;

    const UNIVERSE: std::ops::Range<DocId> = 0..64;

    fn list() -> impl Strategy<Value = Vec<DocId>> {
        btree_set(UNIVERSE, 0..40).prop_map(|s| s.into_iter().collect())
    }

    fn universe() -> Vec<DocId> {
        UNIVERSE.collect()
    }

    #[test]
    fn small_cases() {
        assert_eq!(intersect(&[1, 3, 5, 7], &[2, 3, 7, 9]), vec![3, 7]);
        assert_eq!(union(&[1, 3, 5], &[2, 3, 9]), vec![1, 2, 3, 5, 9]);
        assert_eq!(complement(&[1, 3], &[0, 1, 2, 3, 4]), vec![0, 2, 4]);
        assert!(intersect(&[], &[1, 2]).is_empty());
        assert_eq!(union(&[], &[1, 2]), vec![1, 2]);
        assert!(complement(&[], &[]).is_empty());
    }

    proptest! {
        #[test]
        fn outputs_stay_sorted(a in list(), b in list()) {
            prop_assert!(is_strictly_ascending(&intersect(&a, &b)));
            prop_assert!(is_strictly_ascending(&union(&a, &b)));
            prop_assert!(is_strictly_ascending(&complement(&a, &universe())));
        }

        #[test]
        fn idempotence(a in list()) {
            prop_assert_eq!(intersect(&a, &a), a.clone());
            prop_assert_eq!(union(&a, &a), a);
        }

        #[test]
        fn double_complement(a in list()) {
            let u = universe();
            prop_assert_eq!(complement(&complement(&a, &u), &u), a);
        }

        #[test]
        fn and_distributes_over_or(a in list(), b in list(), c in list()) {
            let lhs = intersect(&a, &union(&b, &c));
            let rhs = union(&intersect(&a, &b), &intersect(&a, &c));
            prop_assert_eq!(lhs, rhs);
        }

        #[test]
        fn matches_set_semantics(a in list(), b in list()) {
            let sa: std::collections::BTreeSet<_> = a.iter().copied().collect();
            let sb: std::collections::BTreeSet<_> = b.iter().copied().collect();
            prop_assert_eq!(intersect(&a, &b), sa.intersection(&sb).copied().collect::<Vec<_>>());
            prop_assert_eq!(union(&a, &b), sa.union(&sb).copied().collect::<Vec<_>>());
        }
    }
}
