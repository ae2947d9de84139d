//! Pool Repository Module
//!
//! Transactional wrappers around the idea pool core:
//! - pool_repo: Eligibility resolution and the shared random source
//! - allocation: Fair shuffle allocation
//! - spin: Filtered random selection

mod pool_repo;
mod allocation;
mod spin;

pub use pool_repo::PoolRepository;

pub use allocation::AllocationOperations;
pub use spin::SpinOperations;
