//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod jar_repo;
mod membership_repo;
mod idea;
mod pool;

#[cfg(test)]
mod tests;

pub use traits::Repository;
pub use db::{init_db, DbState, SharedConnection};
pub use jar_repo::JarRepository;
pub use membership_repo::MembershipRepository;
pub use idea::{IdeaJarOperations, IdeaModerationOperations, IdeaRepository};
pub use pool::{AllocationOperations, PoolRepository, SpinOperations};
