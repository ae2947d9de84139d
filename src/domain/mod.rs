//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO external dependencies (except serde for serialization).

mod entity;
mod filters;
mod idea;
mod jar;
mod membership;

pub use entity::{Entity, DomainError, DomainResult};
pub use filters::SpinFilters;
pub use idea::{ApprovalState, CostTier, Idea, Setting, TimeOfDay, Weather, DEFAULT_CATEGORY};
pub use jar::Jar;
pub use membership::{MemberRole, MemberStatus, Membership};
