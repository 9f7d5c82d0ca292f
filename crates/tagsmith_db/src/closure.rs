//! Transitive closure of tag implications.
//!
//! Worklist traversal with a visited set; a revisited tag is skipped,
//! so cycles in the implication table terminate without diverging.
//! The result depends only on the seed set and the implication rows,
//! never on iteration order.

use crate::error::Result;
use crate::types::TagId;
use crate::Store;
use std::collections::BTreeSet;

impl Store {
    /// The tags transitively implied by `seed` (implication targets
    /// only; a seed tag appears in the result only if something
    /// reachable implies it back).
    pub fn implied_tags(&self, seed: &[TagId]) -> Result<BTreeSet<TagId>> {
        let mut implied = BTreeSet::new();
        let mut visited: BTreeSet<TagId> = seed.iter().copied().collect();
        let mut frontier: Vec<TagId> = visited.iter().copied().collect();

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for implication in self.implications_for_tags(&frontier)? {
                implied.insert(implication.implied_tag_id);
                if visited.insert(implication.implied_tag_id) {
                    next.push(implication.implied_tag_id);
                }
            }
            frontier = next;
        }

        Ok(implied)
    }

    /// `closure(seed)`: the least fixpoint of `seed` under one-hop
    /// implication. Always contains the seed tags and is finite even
    /// when the table contains cycles.
    pub fn implication_closure(&self, seed: &[TagId]) -> Result<BTreeSet<TagId>> {
        let mut closure: BTreeSet<TagId> = seed.iter().copied().collect();
        closure.extend(self.implied_tags(seed)?);
        Ok(closure)
    }
}
