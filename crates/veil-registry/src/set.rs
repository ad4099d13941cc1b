//! # Sentinel-Linked Set
//!
//! The successor-mapping set. Two reserved markers are fixed at
//! construction: the sentinel (head and tail of the chain, never removable)
//! and the null value (the "no successor" marker, represented by absence
//! from the link table). Neither is ever a valid element.
//!
//! ## Chain Invariant
//!
//! Starting from the sentinel and following successor links always reaches
//! the sentinel again after exactly `len()` distinct non-sentinel elements.
//! An empty set is the sentinel self-loop. Every mutation either preserves
//! the invariant or returns an error without touching the chain.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use veil_core::Address;

/// Key types usable as set elements.
///
/// Blanket-implemented for any copyable, totally ordered, debuggable type.
/// The caller chooses the two reserved values at construction; the trait
/// itself imposes no reserved-value convention.
pub trait Element: Copy + Eq + Ord + std::fmt::Debug {}

impl<T: Copy + Eq + Ord + std::fmt::Debug> Element for T {}

/// Setup-time configuration failure.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The sentinel and null reserved values are not distinct, so the
    /// identity domain cannot tell "chain tail" from "no successor".
    #[error("sentinel and null reserved values must be distinct, both are {value}")]
    IndistinctReservedValues {
        /// Debug rendering of the colliding value.
        value: String,
    },

    /// A decoded link table fails the chain invariant.
    #[error("corrupt chain: {detail}")]
    CorruptChain {
        /// What the validation walk found.
        detail: String,
    },
}

/// Chain mutation failures. All are caller errors; the chain is left
/// unmodified in every case.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// The element is one of the reserved markers.
    #[error("reserved value {element} is not a valid element")]
    InvalidElement {
        /// Debug rendering of the rejected value.
        element: String,
    },

    /// The element already has a recorded successor.
    #[error("element {element} is already present")]
    DuplicateElement {
        /// Debug rendering of the duplicate value.
        element: String,
    },

    /// The supplied predecessor does not link to the element.
    #[error("broken chain: {predecessor} is not the predecessor of {element}")]
    BrokenChain {
        /// Debug rendering of the element being removed.
        element: String,
        /// Debug rendering of the claimed predecessor.
        predecessor: String,
    },
}

/// An order-preserving unique-membership set over a successor-mapping arena.
///
/// Elements enter at the head, so enumeration yields most-recently-inserted
/// first. Removal requires the true predecessor (the sentinel when removing
/// the head element).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "UncheckedChain<K>")]
pub struct SentinelSet<K: Element> {
    sentinel: K,
    null: K,
    next: BTreeMap<K, K>,
    len: usize,
}

impl<K: Element> SentinelSet<K> {
    /// Create an empty set with the given reserved values.
    ///
    /// # Errors
    ///
    /// [`ConfigError::IndistinctReservedValues`] when `sentinel == null` —
    /// the one generically checkable form of an identity domain too small to
    /// reserve both markers.
    pub fn new(sentinel: K, null: K) -> Result<Self, ConfigError> {
        if sentinel == null {
            return Err(ConfigError::IndistinctReservedValues {
                value: format!("{sentinel:?}"),
            });
        }
        let mut next = BTreeMap::new();
        next.insert(sentinel, sentinel);
        Ok(Self {
            sentinel,
            null,
            next,
            len: 0,
        })
    }

    /// The sentinel marker chosen at construction.
    pub fn sentinel(&self) -> K {
        self.sentinel
    }

    /// The null marker chosen at construction.
    pub fn null(&self) -> K {
        self.null
    }

    /// Insert an element at the head of the chain.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidElement`] for either reserved marker.
    /// - [`RegistryError::DuplicateElement`] if already present.
    pub fn insert(&mut self, id: K) -> Result<(), RegistryError> {
        if id == self.sentinel || id == self.null {
            return Err(RegistryError::InvalidElement {
                element: format!("{id:?}"),
            });
        }
        if self.next.contains_key(&id) {
            return Err(RegistryError::DuplicateElement {
                element: format!("{id:?}"),
            });
        }
        let head = *self.next.get(&self.sentinel).unwrap_or(&self.sentinel);
        self.next.insert(id, head);
        self.next.insert(self.sentinel, id);
        self.len += 1;
        Ok(())
    }

    /// Remove an element, given its true predecessor.
    ///
    /// The predecessor is the sentinel when removing the head element.
    /// Callers that do not know the predecessor discover it with
    /// [`SentinelSet::predecessor_of`] first.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidElement`] for either reserved marker.
    /// - [`RegistryError::BrokenChain`] when the predecessor does not link
    ///   to `id`.
    pub fn remove(&mut self, id: K, predecessor: K) -> Result<(), RegistryError> {
        if id == self.sentinel || id == self.null {
            return Err(RegistryError::InvalidElement {
                element: format!("{id:?}"),
            });
        }
        match self.next.get(&predecessor) {
            Some(&succ) if succ == id => {}
            _ => {
                return Err(RegistryError::BrokenChain {
                    element: format!("{id:?}"),
                    predecessor: format!("{predecessor:?}"),
                })
            }
        }
        let Some(successor) = self.next.remove(&id) else {
            // next[predecessor] == id implies id is linked; nothing was
            // removed if this branch is ever reached.
            return Err(RegistryError::BrokenChain {
                element: format!("{id:?}"),
                predecessor: format!("{predecessor:?}"),
            });
        };
        self.next.insert(predecessor, successor);
        self.len -= 1;
        Ok(())
    }

    /// Whether the element is currently in the set.
    pub fn contains(&self, id: K) -> bool {
        id != self.sentinel && self.next.contains_key(&id)
    }

    /// Number of elements (excludes the sentinel).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the set holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Walk the chain head-to-tail. Lazy, finite, restartable — each call
    /// starts a fresh walk over the current snapshot.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            set: self,
            cursor: *self.next.get(&self.sentinel).unwrap_or(&self.sentinel),
        }
    }

    /// Find the predecessor of an element by traversal. O(n).
    ///
    /// Returns the sentinel for the head element, `None` when the element
    /// is not in the chain.
    pub fn predecessor_of(&self, id: K) -> Option<K> {
        let mut prev = self.sentinel;
        let mut cursor = *self.next.get(&self.sentinel)?;
        while cursor != self.sentinel {
            if cursor == id {
                return Some(prev);
            }
            prev = cursor;
            cursor = *self.next.get(&cursor)?;
        }
        None
    }
}

impl SentinelSet<Address> {
    /// An address registry using the crate-reserved constants:
    /// [`Address::SENTINEL`] as sentinel, [`Address::NULL`] as null.
    pub fn for_addresses() -> Self {
        let mut next = BTreeMap::new();
        next.insert(Address::SENTINEL, Address::SENTINEL);
        Self {
            sentinel: Address::SENTINEL,
            null: Address::NULL,
            next,
            len: 0,
        }
    }
}

/// Decoded form of the set prior to chain validation. Deserialization goes
/// through [`TryFrom`] so a crafted or corrupted document cannot smuggle in
/// a link table that violates the chain invariant.
#[derive(Debug, Deserialize)]
struct UncheckedChain<K: Element> {
    sentinel: K,
    null: K,
    next: BTreeMap<K, K>,
    len: usize,
}

impl<K: Element> TryFrom<UncheckedChain<K>> for SentinelSet<K> {
    type Error = ConfigError;

    /// Revalidate the chain invariant: following successor links from the
    /// sentinel must visit exactly `len` distinct non-reserved elements and
    /// return to the sentinel, with no links left over.
    fn try_from(raw: UncheckedChain<K>) -> Result<Self, ConfigError> {
        if raw.sentinel == raw.null {
            return Err(ConfigError::IndistinctReservedValues {
                value: format!("{:?}", raw.sentinel),
            });
        }
        if raw.next.len() != raw.len.saturating_add(1) {
            return Err(ConfigError::CorruptChain {
                detail: format!(
                    "link table holds {} entries for {} elements",
                    raw.next.len(),
                    raw.len
                ),
            });
        }
        let mut cursor = match raw.next.get(&raw.sentinel) {
            Some(&succ) => succ,
            None => {
                return Err(ConfigError::CorruptChain {
                    detail: "sentinel has no successor link".to_string(),
                })
            }
        };
        let mut steps = 0usize;
        while cursor != raw.sentinel {
            // The table size is len + 1, so a walk longer than len can only
            // mean a cycle that avoids the sentinel.
            if steps >= raw.len {
                return Err(ConfigError::CorruptChain {
                    detail: "successor walk does not return to the sentinel".to_string(),
                });
            }
            if cursor == raw.null {
                return Err(ConfigError::CorruptChain {
                    detail: "null marker linked into the chain".to_string(),
                });
            }
            cursor = match raw.next.get(&cursor) {
                Some(&succ) => succ,
                None => {
                    return Err(ConfigError::CorruptChain {
                        detail: format!("element {cursor:?} has no successor link"),
                    })
                }
            };
            steps += 1;
        }
        if steps != raw.len {
            return Err(ConfigError::CorruptChain {
                detail: format!(
                    "walk found {steps} elements, length field says {}",
                    raw.len
                ),
            });
        }
        Ok(Self {
            sentinel: raw.sentinel,
            null: raw.null,
            next: raw.next,
            len: raw.len,
        })
    }
}

/// Head-to-tail chain iterator. See [`SentinelSet::iter`].
#[derive(Debug)]
pub struct Iter<'a, K: Element> {
    set: &'a SentinelSet<K>,
    cursor: K,
}

impl<K: Element> Iterator for Iter<'_, K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        if self.cursor == self.set.sentinel {
            return None;
        }
        let current = self.cursor;
        self.cursor = *self
            .set
            .next
            .get(&current)
            .unwrap_or(&self.set.sentinel);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTINEL: u32 = u32::MAX;
    const NULL: u32 = 0;

    fn make_set() -> SentinelSet<u32> {
        SentinelSet::new(SENTINEL, NULL).unwrap()
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn test_new_set_is_empty() {
        let set = make_set();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.iter().count(), 0);
    }

    #[test]
    fn test_colliding_reserved_values_rejected() {
        let err = SentinelSet::new(7u32, 7u32);
        assert!(matches!(
            err,
            Err(ConfigError::IndistinctReservedValues { .. })
        ));
    }

    #[test]
    fn test_for_addresses() {
        let set = SentinelSet::for_addresses();
        assert_eq!(set.sentinel(), Address::SENTINEL);
        assert_eq!(set.null(), Address::NULL);
        assert!(set.is_empty());
    }

    // ── Insert ───────────────────────────────────────────────────────

    #[test]
    fn test_insert_then_contains() {
        let mut set = make_set();
        set.insert(10).unwrap();
        assert!(set.contains(10));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_insert_reserved_rejected() {
        let mut set = make_set();
        assert!(matches!(
            set.insert(SENTINEL),
            Err(RegistryError::InvalidElement { .. })
        ));
        assert!(matches!(
            set.insert(NULL),
            Err(RegistryError::InvalidElement { .. })
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn test_insert_duplicate_rejected() {
        let mut set = make_set();
        set.insert(10).unwrap();
        assert!(matches!(
            set.insert(10),
            Err(RegistryError::DuplicateElement { .. })
        ));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_head_first_enumeration_order() {
        let mut set = make_set();
        set.insert(1).unwrap(); // A
        set.insert(2).unwrap(); // B
        set.insert(3).unwrap(); // C
        let order: Vec<u32> = set.iter().collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    // ── Remove ───────────────────────────────────────────────────────

    #[test]
    fn test_remove_middle_with_predecessor() {
        let mut set = make_set();
        set.insert(1).unwrap();
        set.insert(2).unwrap();
        set.insert(3).unwrap();
        // Chain is [3, 2, 1]; predecessor of 2 is 3.
        set.remove(2, 3).unwrap();
        assert!(!set.contains(2));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![3, 1]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_remove_head_with_sentinel_predecessor() {
        let mut set = make_set();
        set.insert(1).unwrap();
        set.insert(2).unwrap();
        set.remove(2, SENTINEL).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_remove_wrong_predecessor_is_broken_chain() {
        let mut set = make_set();
        set.insert(1).unwrap();
        set.insert(2).unwrap();
        set.insert(3).unwrap();
        let before: Vec<u32> = set.iter().collect();
        // 1 is not the predecessor of 2 (3 is).
        assert!(matches!(
            set.remove(2, 1),
            Err(RegistryError::BrokenChain { .. })
        ));
        // Chain unmodified on failure.
        assert_eq!(set.iter().collect::<Vec<_>>(), before);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_remove_absent_element_is_broken_chain() {
        let mut set = make_set();
        set.insert(1).unwrap();
        assert!(matches!(
            set.remove(99, SENTINEL),
            Err(RegistryError::BrokenChain { .. })
        ));
    }

    #[test]
    fn test_remove_reserved_rejected() {
        let mut set = make_set();
        set.insert(1).unwrap();
        assert!(matches!(
            set.remove(SENTINEL, 1),
            Err(RegistryError::InvalidElement { .. })
        ));
        assert!(matches!(
            set.remove(NULL, SENTINEL),
            Err(RegistryError::InvalidElement { .. })
        ));
    }

    #[test]
    fn test_remove_only_element_restores_self_loop() {
        let mut set = make_set();
        set.insert(1).unwrap();
        set.remove(1, SENTINEL).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
        // The set behaves exactly like a fresh one afterwards.
        set.insert(2).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_reinsert_removed_element() {
        let mut set = make_set();
        set.insert(1).unwrap();
        set.insert(2).unwrap();
        set.remove(1, 2).unwrap();
        assert!(!set.contains(1));
        set.insert(1).unwrap();
        assert!(set.contains(1));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    // ── The full scenario from the coordination service ──────────────

    #[test]
    fn test_insert_abc_remove_b_then_c() {
        let (a, b, c) = (1u32, 2u32, 3u32);
        let mut set = make_set();
        set.insert(a).unwrap();
        set.insert(b).unwrap();
        set.insert(c).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![c, b, a]);

        set.remove(b, c).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![c, a]);

        set.remove(c, SENTINEL).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![a]);
    }

    // ── Predecessor discovery ────────────────────────────────────────

    #[test]
    fn test_predecessor_of() {
        let mut set = make_set();
        set.insert(1).unwrap();
        set.insert(2).unwrap();
        set.insert(3).unwrap();
        // Chain [3, 2, 1].
        assert_eq!(set.predecessor_of(3), Some(SENTINEL));
        assert_eq!(set.predecessor_of(2), Some(3));
        assert_eq!(set.predecessor_of(1), Some(2));
        assert_eq!(set.predecessor_of(99), None);
    }

    #[test]
    fn test_predecessor_feeds_remove() {
        let mut set = make_set();
        for id in [1, 2, 3, 4, 5] {
            set.insert(id).unwrap();
        }
        let pred = set.predecessor_of(3).unwrap();
        set.remove(3, pred).unwrap();
        assert!(!set.contains(3));
        assert_eq!(set.len(), 4);
    }

    // ── Iterator behavior ────────────────────────────────────────────

    #[test]
    fn test_iter_is_restartable() {
        let mut set = make_set();
        set.insert(1).unwrap();
        set.insert(2).unwrap();
        let first: Vec<u32> = set.iter().collect();
        let second: Vec<u32> = set.iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_iter_yields_distinct_elements() {
        let mut set = make_set();
        for id in 1..=20 {
            set.insert(id).unwrap();
        }
        let seen: Vec<u32> = set.iter().collect();
        let mut dedup = seen.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(seen.len(), dedup.len());
        assert_eq!(seen.len(), set.len());
    }

    // ── Serde ────────────────────────────────────────────────────────

    #[test]
    fn test_serde_roundtrip_preserves_chain() {
        let mut set = make_set();
        set.insert(1).unwrap();
        set.insert(2).unwrap();
        let json = serde_json::to_string(&set).unwrap();
        let parsed: SentinelSet<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.iter().collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_deserialize_rejects_cycle_avoiding_sentinel() {
        // A "2-element" document whose links loop 1 → 2 → 1 and never
        // return to the sentinel; accepting it would make iteration spin
        // forever.
        let json =
            r#"{"sentinel":4294967295,"null":0,"next":{"4294967295":1,"1":2,"2":1},"len":2}"#;
        assert!(serde_json::from_str::<SentinelSet<u32>>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_length_mismatch() {
        let json = r#"{"sentinel":4294967295,"null":0,"next":{"4294967295":1,"1":4294967295},"len":3}"#;
        assert!(serde_json::from_str::<SentinelSet<u32>>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_dangling_successor() {
        // 7 is linked into the table but unreachable, and 2's link is
        // missing.
        let json = r#"{"sentinel":4294967295,"null":0,"next":{"4294967295":1,"1":2,"7":4294967295},"len":2}"#;
        assert!(serde_json::from_str::<SentinelSet<u32>>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_colliding_reserved_values() {
        let json = r#"{"sentinel":0,"null":0,"next":{"0":0},"len":0}"#;
        assert!(serde_json::from_str::<SentinelSet<u32>>(json).is_err());
    }
}
