//! Fair Shuffle Allocator
//!
//! Uniformly shuffles the eligible ideas (Fisher-Yates) and hands each
//! participant a contiguous, non-overlapping slice of `quota` ideas.
//! Planning is pure; persisting the plan is the pool repository's job.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

/// Ideas handed to one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub participant_id: String,
    pub idea_ids: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub assignments: Vec<Assignment>,
    /// Eligible ideas left unassigned
    pub leftover: Vec<u32>,
}

impl AllocationPlan {
    pub fn allocated_count(&self) -> usize {
        self.assignments.iter().map(|a| a.idea_ids.len()).sum()
    }
}

/// Check supply and build the allocation.
///
/// Fails without touching anything when `quota` is zero, nobody is eligible,
/// or there are fewer ideas than `participants.len() * quota`.
pub fn plan_allocation<R: Rng + ?Sized>(
    participants: &[String],
    mut ideas: Vec<u32>,
    quota: u32,
    rng: &mut R,
) -> DomainResult<AllocationPlan> {
    if quota == 0 {
        return Err(DomainError::invalid_input("Quota must be at least 1"));
    }
    if participants.is_empty() {
        return Err(DomainError::NoActiveParticipants);
    }

    let quota = quota as usize;
    let required = participants
        .len()
        .checked_mul(quota)
        .ok_or_else(|| DomainError::invalid_input("Quota is too large"))?;
    if ideas.len() < required {
        return Err(DomainError::InsufficientSupply {
            required,
            available: ideas.len(),
        });
    }

    ideas.shuffle(rng);
    let leftover = ideas.split_off(required);

    let assignments = participants
        .iter()
        .zip(ideas.chunks_exact(quota))
        .map(|(participant, group)| Assignment {
            participant_id: participant.clone(),
            idea_ids: group.to_vec(),
        })
        .collect();

    Ok(AllocationPlan { assignments, leftover })
}
