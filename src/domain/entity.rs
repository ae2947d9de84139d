//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! All entities must have a unique ID and be thread-safe.

use serde::{Deserialize, Serialize};

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
///
/// Serialized with a `kind` tag so callers can tell business-rule failures
/// apart from internal ones without parsing messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainError {
    NotFound { message: String },
    InvalidInput { message: String },
    Forbidden { message: String },
    /// Fewer eligible ideas than participants x quota
    InsufficientSupply { required: usize, available: usize },
    NoActiveParticipants,
    NoMatchingItems,
    /// Transaction lost a race or the database was busy; retryable
    Conflict { message: String },
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        DomainError::NotFound { message: message.into() }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        DomainError::InvalidInput { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        DomainError::Forbidden { message: message.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        DomainError::Conflict { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal { message: message.into() }
    }

    /// Only transactional conflicts are worth retrying as-is
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Conflict { .. })
    }

    /// Validation and business-rule errors can be shown to the user verbatim
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, DomainError::Conflict { .. } | DomainError::Internal { .. })
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::NotFound { message } => write!(f, "Not found: {}", message),
            DomainError::InvalidInput { message } => write!(f, "Invalid input: {}", message),
            DomainError::Forbidden { message } => write!(f, "Forbidden: {}", message),
            DomainError::InsufficientSupply { required, available } => write!(
                f,
                "Not enough ideas to allocate: need {}, only {} available",
                required, available
            ),
            DomainError::NoActiveParticipants => write!(f, "Jar has no active members"),
            DomainError::NoMatchingItems => {
                write!(f, "No ideas match these filters; try relaxing them")
            }
            DomainError::Conflict { message } => write!(f, "Conflict: {}", message),
            DomainError::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for DomainError {}
