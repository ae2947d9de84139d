//! Random Selector ("spin")
//!
//! Narrows a pool to the ideas a participant may spin and that pass the
//! filters, then picks one uniformly.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::{DomainError, DomainResult, Idea, SpinFilters};

/// Ideas `participant_id` may spin that satisfy every filter
pub fn spin_candidates<'a>(pool: &'a [Idea], participant_id: &str, filters: &SpinFilters) -> Vec<&'a Idea> {
    pool.iter()
        .filter(|idea| idea.is_spinnable_by(participant_id))
        .filter(|idea| filters.matches(idea))
        .collect()
}

/// Uniform pick; an empty pool is `NoMatchingItems`, never a fallback
pub fn pick<'a, R: Rng + ?Sized>(candidates: &[&'a Idea], rng: &mut R) -> DomainResult<&'a Idea> {
    candidates
        .choose(rng)
        .copied()
        .ok_or(DomainError::NoMatchingItems)
}
