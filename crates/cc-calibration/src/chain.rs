//! Basis-chain discovery.
//!
//! Given a pool of two-legged basis instruments, find an ordered prefix
//! that links a target leg index back to a known one (or to a fixed leg).
//! The search partitions the pool in place: discovered links are swapped
//! into the prefix, and every failed branch is undone by swapping back, so
//! the pool is a valid scratch space across repeated queries.

use std::fmt;

/// What one leg of a basis instrument pays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegIndex {
    /// A fixed leg; always considered known.
    Fixed,
    /// A floating leg on the named index.
    Index(String),
}

impl LegIndex {
    /// Convenience constructor for a floating leg.
    pub fn index(name: impl Into<String>) -> Self {
        LegIndex::Index(name.into())
    }
}

impl fmt::Display for LegIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegIndex::Fixed => f.write_str("fixed"),
            LegIndex::Index(name) => f.write_str(name),
        }
    }
}

/// A two-legged basis instrument exchanging `near` against `far`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasisInstrument {
    /// Quote identifier, used to name synthetic composites.
    pub id: String,
    /// One leg.
    pub near: LegIndex,
    /// The other leg.
    pub far: LegIndex,
}

impl BasisInstrument {
    /// Build an instrument from its quote id and two legs.
    pub fn new(id: impl Into<String>, near: LegIndex, far: LegIndex) -> Self {
        Self {
            id: id.into(),
            near,
            far,
        }
    }

    /// The leg opposite `index`, or `None` when the instrument does not
    /// reference `index` at all.
    pub fn other_leg(&self, index: &LegIndex) -> Option<&LegIndex> {
        if self.near == *index {
            Some(&self.far)
        } else if self.far == *index {
            Some(&self.near)
        } else {
            None
        }
    }
}

/// Find a chain of instruments linking `target` to `known`.
///
/// `known == None` means the chain must terminate on a fixed leg.  On
/// success the chain occupies `instruments[..len]` in link order, target
/// end first, and the returned length is positive.  Returns 0 when no
/// chain exists; the pool order is then exactly as it was on entry.
pub fn find_chain(
    instruments: &mut [BasisInstrument],
    target: &LegIndex,
    known: Option<&LegIndex>,
) -> usize {
    search(instruments, 0, target, known)
}

/// Try each candidate terminal index in turn, returning the first chain
/// found together with the candidate that closed it.
pub fn find_chain_any<'k>(
    instruments: &mut [BasisInstrument],
    target: &LegIndex,
    candidates: &'k [LegIndex],
) -> Option<(usize, &'k LegIndex)> {
    for known in candidates {
        let len = find_chain(instruments, target, Some(known));
        if len > 0 {
            return Some((len, known));
        }
    }
    None
}

/// Depth-first search over `instruments[pos..]` for a link carrying
/// `frontier`.  Scans from the back so that repeated queries against a
/// stable pool favor recently appended quotes.
fn search(
    instruments: &mut [BasisInstrument],
    pos: usize,
    frontier: &LegIndex,
    known: Option<&LegIndex>,
) -> usize {
    for j in (pos..instruments.len()).rev() {
        let other = match instruments[j].other_leg(frontier) {
            Some(leg) => leg.clone(),
            None => continue,
        };
        let terminal = match known {
            Some(k) => other == *k || other == LegIndex::Fixed,
            None => other == LegIndex::Fixed,
        };
        instruments.swap(pos, j);
        if terminal {
            return pos + 1;
        }
        let len = search(instruments, pos + 1, &other, known);
        if len > 0 {
            return len;
        }
        // Dead branch: undo the partition step.
        instruments.swap(pos, j);
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Vec<BasisInstrument> {
        vec![
            BasisInstrument::new("c-vs-fixed", LegIndex::index("C"), LegIndex::Fixed),
            BasisInstrument::new("b-vs-c", LegIndex::index("B"), LegIndex::index("C")),
            BasisInstrument::new("a-vs-b", LegIndex::index("A"), LegIndex::index("B")),
            BasisInstrument::new("d-vs-e", LegIndex::index("D"), LegIndex::index("E")),
        ]
    }

    #[test]
    fn two_link_chain_is_found_and_ordered() {
        // Target A, known C: the chain is (A vs B), (B vs C).
        let mut pool = pool();
        let len = find_chain(&mut pool, &LegIndex::index("A"), Some(&LegIndex::index("C")));
        assert_eq!(len, 2);
        assert_eq!(pool[0].id, "a-vs-b");
        assert_eq!(pool[1].id, "b-vs-c");
    }

    #[test]
    fn chain_to_fixed_when_no_known_index() {
        let mut pool = pool();
        let len = find_chain(&mut pool, &LegIndex::index("A"), None);
        assert_eq!(len, 3);
        assert_eq!(pool[0].id, "a-vs-b");
        assert_eq!(pool[1].id, "b-vs-c");
        assert_eq!(pool[2].id, "c-vs-fixed");
    }

    #[test]
    fn direct_link_has_length_one() {
        let mut pool = pool();
        let len = find_chain(&mut pool, &LegIndex::index("B"), Some(&LegIndex::index("C")));
        assert_eq!(len, 1);
        assert_eq!(pool[0].id, "b-vs-c");
    }

    #[test]
    fn failed_search_restores_pool_order() {
        let mut pool = pool();
        let before = pool.clone();
        // E only connects to D; no path to C.
        let len = find_chain(&mut pool, &LegIndex::index("E"), Some(&LegIndex::index("C")));
        assert_eq!(len, 0);
        assert_eq!(pool, before);
    }

    #[test]
    fn dead_branches_are_undone_mid_search() {
        // Two instruments leave A; one is a dead end.  The search must
        // back out of the dead branch and still find the good one.
        let mut pool = vec![
            BasisInstrument::new("a-vs-x", LegIndex::index("A"), LegIndex::index("X")),
            BasisInstrument::new("a-vs-b", LegIndex::index("A"), LegIndex::index("B")),
            BasisInstrument::new("b-vs-c", LegIndex::index("B"), LegIndex::index("C")),
        ];
        let len = find_chain(&mut pool, &LegIndex::index("A"), Some(&LegIndex::index("C")));
        assert_eq!(len, 2);
        assert_eq!(pool[0].id, "a-vs-b");
        assert_eq!(pool[1].id, "b-vs-c");
        // The dead-end quote is still in the pool.
        assert!(pool.iter().any(|i| i.id == "a-vs-x"));
    }

    #[test]
    fn instruments_are_traversable_in_either_direction() {
        let mut pool = vec![BasisInstrument::new(
            "c-vs-b",
            LegIndex::index("C"),
            LegIndex::index("B"),
        )];
        // Quoted C-vs-B but queried from B.
        let len = find_chain(&mut pool, &LegIndex::index("B"), Some(&LegIndex::index("C")));
        assert_eq!(len, 1);
    }

    #[test]
    fn candidate_sequence_reports_the_terminal() {
        let mut pool = pool();
        let candidates = [LegIndex::index("Z"), LegIndex::index("C")];
        let (len, terminal) =
            find_chain_any(&mut pool, &LegIndex::index("A"), &candidates).unwrap();
        assert_eq!(len, 2);
        assert_eq!(*terminal, LegIndex::index("C"));
    }

    #[test]
    fn no_chain_yields_none() {
        let mut pool = pool();
        let candidates = [LegIndex::index("Z")];
        assert!(find_chain_any(&mut pool, &LegIndex::index("E"), &candidates).is_none());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn leg(code: u8) -> LegIndex {
            if code == 0 {
                LegIndex::Fixed
            } else {
                LegIndex::index(format!("I{code}"))
            }
        }

        /// Walk the prefix link by link and check it really connects
        /// `target` to `known` (or to a fixed leg).
        fn is_valid_chain(
            prefix: &[BasisInstrument],
            target: &LegIndex,
            known: Option<&LegIndex>,
        ) -> bool {
            let mut frontier = target.clone();
            for (i, inst) in prefix.iter().enumerate() {
                let other = match inst.other_leg(&frontier) {
                    Some(leg) => leg.clone(),
                    None => return false,
                };
                let last = i + 1 == prefix.len();
                if last {
                    return match known {
                        Some(k) => other == *k || other == LegIndex::Fixed,
                        None => other == LegIndex::Fixed,
                    };
                }
                frontier = other;
            }
            false
        }

        proptest! {
            #[test]
            fn search_is_sound_and_restores_on_failure(
                legs in proptest::collection::vec((0u8..6, 0u8..6), 0..8),
                target in 1u8..6,
                known in proptest::option::of(1u8..6),
            ) {
                let mut pool: Vec<BasisInstrument> = legs
                    .iter()
                    .enumerate()
                    .map(|(i, &(a, b))| BasisInstrument::new(format!("q{i}"), leg(a), leg(b)))
                    .collect();
                let before = pool.clone();
                let target = leg(target);
                let known = known.map(leg);

                let len = find_chain(&mut pool, &target, known.as_ref());
                if len == 0 {
                    prop_assert_eq!(pool, before);
                } else {
                    prop_assert!(is_valid_chain(&pool[..len], &target, known.as_ref()));
                    // Swaps only: the pool is a permutation of itself.
                    let mut sorted_before: Vec<String> =
                        before.iter().map(|i| i.id.clone()).collect();
                    let mut sorted_after: Vec<String> =
                        pool.iter().map(|i| i.id.clone()).collect();
                    sorted_before.sort();
                    sorted_after.sort();
                    prop_assert_eq!(sorted_before, sorted_after);
                }
            }
        }
    }
}
