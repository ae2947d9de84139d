//! Commands for Idea operations
//!
//! Submission, moderation and listing of the ideas in a jar.

use serde::{Deserialize, Serialize};

use crate::domain::{
    ApprovalState, CostTier, DomainResult, Idea, MemberRole, Setting, TimeOfDay, Weather,
};
use crate::repository::{IdeaJarOperations, IdeaModerationOperations, Repository};
use crate::AppState;
use super::permissions::{load_idea, require_author_or_admin, require_role};

/// Fields a participant supplies when submitting an idea
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdeaDraft {
    pub description: String,
    pub details: Option<String>,
    pub cost: Option<CostTier>,
    pub duration_minutes: Option<u32>,
    pub setting: Option<Setting>,
    pub time_of_day: Option<TimeOfDay>,
    pub weather: Option<Weather>,
    pub category: Option<String>,
}

impl IdeaDraft {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    fn into_idea(self, jar_id: u32, author_id: &str) -> Idea {
        // An empty description stays empty and is rejected on submit
        let mut idea = Idea::new(0, jar_id, author_id, String::new());
        self.apply_to(&mut idea);
        idea
    }

    /// Overwrite the attributes that are set; description only when non-empty
    fn apply_to(self, idea: &mut Idea) {
        if !self.description.trim().is_empty() {
            idea.description = self.description;
        }
        if self.details.is_some() {
            idea.details = self.details.filter(|d| !d.trim().is_empty());
        }
        if let Some(cost) = self.cost {
            idea.cost = cost;
        }
        if self.duration_minutes.is_some() {
            idea.duration_minutes = self.duration_minutes;
        }
        if let Some(setting) = self.setting {
            idea.setting = setting;
        }
        if let Some(time_of_day) = self.time_of_day {
            idea.time_of_day = time_of_day;
        }
        if let Some(weather) = self.weather {
            idea.weather = weather;
        }
        if let Some(category) = self.category.filter(|c| !c.trim().is_empty()) {
            idea.category = category;
        }
    }
}

/// Which ideas of a jar to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdeaScope {
    #[default]
    All,
    /// Allocated to the caller
    Mine,
    /// Spin history, newest first
    Selected,
    /// Awaiting approval
    Pending,
}

impl IdeaScope {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Some(IdeaScope::All),
            "mine" => Some(IdeaScope::Mine),
            "selected" | "history" => Some(IdeaScope::Selected),
            "pending" => Some(IdeaScope::Pending),
            _ => None,
        }
    }
}

/// Submit an idea; it lands pending when the jar is moderated and the caller
/// is a plain member
pub async fn submit_idea(state: &AppState, caller: &str, jar_id: u32, draft: IdeaDraft) -> DomainResult<Idea> {
    let membership = require_role(state, jar_id, caller, MemberRole::Member).await?;
    let idea = state
        .idea_repo
        .submit(&draft.into_idea(jar_id, caller), membership.role)
        .await?;
    log::info!("{} submitted idea {} to jar {} ({})", caller, idea.id, jar_id, idea.state.as_str());
    Ok(idea)
}

pub async fn list_ideas(state: &AppState, caller: &str, jar_id: u32, scope: IdeaScope) -> DomainResult<Vec<Idea>> {
    require_role(state, jar_id, caller, MemberRole::Member).await?;
    match scope {
        IdeaScope::All => state.idea_repo.list_by_jar(jar_id).await,
        IdeaScope::Mine => state.idea_repo.list_assigned_to(jar_id, caller).await,
        IdeaScope::Selected => state.idea_repo.list_selected(jar_id).await,
        IdeaScope::Pending => Ok(state
            .idea_repo
            .list_by_jar(jar_id)
            .await?
            .into_iter()
            .filter(|i| i.state == ApprovalState::Pending)
            .collect()),
    }
}

pub async fn get_idea(state: &AppState, caller: &str, idea_id: u32) -> DomainResult<Idea> {
    let idea = load_idea(state, idea_id).await?;
    require_role(state, idea.jar_id, caller, MemberRole::Member).await?;
    Ok(idea)
}

/// Edit the descriptive fields of an idea. Author or admin.
pub async fn update_idea(state: &AppState, caller: &str, idea_id: u32, changes: IdeaDraft) -> DomainResult<Idea> {
    let mut idea = load_idea(state, idea_id).await?;
    require_author_or_admin(state, &idea, caller).await?;
    changes.apply_to(&mut idea);
    state.idea_repo.update(&idea).await
}

pub async fn approve_idea(state: &AppState, caller: &str, idea_id: u32) -> DomainResult<Idea> {
    let idea = load_idea(state, idea_id).await?;
    require_role(state, idea.jar_id, caller, MemberRole::Admin).await?;
    let approved = state.idea_repo.approve(idea_id).await?;
    log::info!("{} approved idea {} in jar {}", caller, idea_id, idea.jar_id);
    Ok(approved)
}

pub async fn reject_idea(state: &AppState, caller: &str, idea_id: u32) -> DomainResult<Idea> {
    let idea = load_idea(state, idea_id).await?;
    require_role(state, idea.jar_id, caller, MemberRole::Admin).await?;
    let rejected = state.idea_repo.reject(idea_id).await?;
    log::info!("{} rejected idea {} in jar {}", caller, idea_id, idea.jar_id);
    Ok(rejected)
}

/// Delete one idea. Author or admin.
pub async fn delete_idea(state: &AppState, caller: &str, idea_id: u32) -> DomainResult<()> {
    let idea = load_idea(state, idea_id).await?;
    require_author_or_admin(state, &idea, caller).await?;
    state.idea_repo.delete(idea_id).await
}

/// Delete several ideas of one jar; ids outside the jar are ignored
pub async fn bulk_delete_ideas(state: &AppState, caller: &str, jar_id: u32, ids: &[u32]) -> DomainResult<usize> {
    require_role(state, jar_id, caller, MemberRole::Admin).await?;
    let removed = state.idea_repo.bulk_delete(jar_id, ids).await?;
    log::info!("{} deleted {} of {} requested ideas in jar {}", caller, removed, ids.len(), jar_id);
    Ok(removed)
}

/// Clear allocation and selection so the idea can be handed out again. Admin.
pub async fn return_idea_to_pool(state: &AppState, caller: &str, idea_id: u32) -> DomainResult<Idea> {
    let idea = load_idea(state, idea_id).await?;
    require_role(state, idea.jar_id, caller, MemberRole::Admin).await?;
    state.idea_repo.return_to_pool(idea_id).await
}
