//! Idea Pool
//!
//! The randomized core: fair allocation of unassigned ideas among active
//! members, and the filtered spin. Everything here is pure; the pool
//! repository runs it inside a database transaction.

mod allocator;
mod selector;

use serde::{Deserialize, Serialize};

pub use allocator::{plan_allocation, AllocationPlan, Assignment};
pub use selector::{pick, spin_candidates};

/// Who may receive ideas and which ideas may be handed out, for one jar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    /// Active members in join order
    pub participants: Vec<String>,
    /// Approved, unassigned, unselected ideas
    pub idea_ids: Vec<u32>,
}

/// Result of a committed allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub jar_id: u32,
    pub allocated_count: usize,
    pub assignments: Vec<Assignment>,
}
