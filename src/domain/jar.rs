//! Jar domain entity

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// A named pool of ideas shared by its members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jar {
    pub id: u32,
    pub name: String,
    /// Ideas from plain members wait for admin approval
    #[serde(default)]
    pub requires_approval: bool,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Entity for Jar {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Jar {
    pub fn new(id: u32, name: String) -> Self {
        Self {
            id,
            name,
            requires_approval: false,
            created_at: None,
            updated_at: None,
        }
    }
}
