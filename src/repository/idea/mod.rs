//! Idea Repository Module
//!
//! This module provides idea repository functionality split into specialized sub-modules:
//! - idea_repo: Core CRUD operations
//! - idea_jar: Jar-scoped listing and bulk delete
//! - idea_moderation: Submission, approval and returning ideas to the pool

mod idea_repo;
mod idea_jar;
mod idea_moderation;

pub use idea_repo::IdeaRepository;
pub(crate) use idea_repo::{query_ideas, IDEA_COLUMNS};

// Re-export all operation traits so they can be used by importing IdeaRepository
pub use idea_jar::IdeaJarOperations;
pub use idea_moderation::IdeaModerationOperations;
