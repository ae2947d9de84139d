//! Membership Entity
//!
//! Relates a participant to a jar with a role and a status.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// Member role; variants are declared in ascending order of authority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    #[default]
    Member,
    Admin,
    Owner,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Member => "member",
            MemberRole::Admin => "admin",
            MemberRole::Owner => "owner",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "member" => Some(MemberRole::Member),
            "admin" => Some(MemberRole::Admin),
            "owner" => Some(MemberRole::Owner),
            _ => None,
        }
    }

    /// Whether this role is at least `required`
    pub fn satisfies(&self, required: MemberRole) -> bool {
        *self >= required
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    /// Invited or requested to join, not yet accepted
    #[default]
    Pending,
    Rejected,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Pending => "pending",
            MemberStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Some(MemberStatus::Active),
            "pending" => Some(MemberStatus::Pending),
            "rejected" => Some(MemberStatus::Rejected),
            _ => None,
        }
    }
}

/// A participant's standing in one jar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub id: u32,
    pub jar_id: u32,
    /// Participant identifier issued by the auth provider
    pub participant_id: String,
    pub role: MemberRole,
    pub status: MemberStatus,
    pub joined_at: Option<i64>,
}

impl Membership {
    pub fn new(id: u32, jar_id: u32, participant_id: impl Into<String>, role: MemberRole, status: MemberStatus) -> Self {
        Self {
            id,
            jar_id,
            participant_id: participant_id.into(),
            role,
            status,
            joined_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

impl Entity for Membership {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}
