//! Idea Entity
//!
//! A candidate activity living in exactly one jar. Assignment (allocator) and
//! selection (spin) are tracked independently.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// Moderation state of an idea
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalState {
    /// Waiting for an admin to approve
    #[default]
    Pending,
    Approved,
    /// Rejected or archived; never eligible
    Rejected,
}

impl ApprovalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalState::Pending => "pending",
            ApprovalState::Approved => "approved",
            ApprovalState::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(ApprovalState::Pending),
            "approved" => Some(ApprovalState::Approved),
            "rejected" | "archived" => Some(ApprovalState::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CostTier {
    #[default]
    Free,
    Low,
    Medium,
    High,
}

impl CostTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostTier::Free => "free",
            CostTier::Low => "low",
            CostTier::Medium => "medium",
            CostTier::High => "high",
        }
    }

    /// Accepts both names and dollar signs ("$$" = medium)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" | "0" => Some(CostTier::Free),
            "low" | "$" => Some(CostTier::Low),
            "medium" | "$$" => Some(CostTier::Medium),
            "high" | "$$$" => Some(CostTier::High),
            _ => None,
        }
    }
}

/// Where the activity happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Setting {
    /// Works indoors or outdoors
    #[default]
    Any,
    Indoor,
    Outdoor,
}

impl Setting {
    pub fn as_str(&self) -> &'static str {
        match self {
            Setting::Any => "any",
            Setting::Indoor => "indoor",
            Setting::Outdoor => "outdoor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Some(Setting::Any),
            "indoor" | "indoors" => Some(Setting::Indoor),
            "outdoor" | "outdoors" => Some(Setting::Outdoor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    #[default]
    Any,
    Day,
    Evening,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Any => "any",
            TimeOfDay::Day => "day",
            TimeOfDay::Evening => "evening",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Some(TimeOfDay::Any),
            "day" => Some(TimeOfDay::Day),
            "evening" | "night" => Some(TimeOfDay::Evening),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    Any,
    Sunny,
    Rainy,
    Cold,
}

impl Weather {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Any => "any",
            Weather::Sunny => "sunny",
            Weather::Rainy => "rainy",
            Weather::Cold => "cold",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Some(Weather::Any),
            "sunny" => Some(Weather::Sunny),
            "rainy" => Some(Weather::Rainy),
            "cold" => Some(Weather::Cold),
            _ => None,
        }
    }
}

pub const DEFAULT_CATEGORY: &str = "activity";

/// An activity idea submitted to a jar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    /// Unique identifier (0 until persisted)
    pub id: u32,
    /// Owning jar
    pub jar_id: u32,
    /// Participant who submitted the idea
    pub author_id: String,
    pub description: String,
    pub details: Option<String>,
    pub state: ApprovalState,
    /// Participant this idea was allocated to
    pub assigned_to: Option<String>,
    /// When the idea was spun (unix millis)
    pub selected_at: Option<i64>,
    pub selected_by: Option<String>,

    // Filter attributes
    pub cost: CostTier,
    pub duration_minutes: Option<u32>,
    pub setting: Setting,
    pub time_of_day: TimeOfDay,
    pub weather: Weather,
    pub category: String,

    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Idea {
    /// Create an unpersisted pending idea with neutral attributes
    pub fn new(id: u32, jar_id: u32, author_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            jar_id,
            author_id: author_id.into(),
            description: description.into(),
            details: None,
            state: ApprovalState::Pending,
            assigned_to: None,
            selected_at: None,
            selected_by: None,
            cost: CostTier::default(),
            duration_minutes: None,
            setting: Setting::default(),
            time_of_day: TimeOfDay::default(),
            weather: Weather::default(),
            category: DEFAULT_CATEGORY.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_to.is_some()
    }

    pub fn is_selected(&self) -> bool {
        self.selected_at.is_some()
    }

    /// Approved, unselected, and either unassigned or assigned to `participant`
    pub fn is_spinnable_by(&self, participant: &str) -> bool {
        self.state == ApprovalState::Approved
            && !self.is_selected()
            && self.assigned_to.as_deref().map_or(true, |owner| owner == participant)
    }
}

impl Entity for Idea {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}
