//! Role checks shared by every command

use crate::domain::{DomainError, DomainResult, Idea, MemberRole, Membership};
use crate::repository::Repository;
use crate::AppState;

/// The caller's active membership in `jar_id`, provided its role is at least
/// `minimum`. Unknown jars are `NotFound`; anything else short of that is
/// `Forbidden`.
pub async fn require_role(
    state: &AppState,
    jar_id: u32,
    participant_id: &str,
    minimum: MemberRole,
) -> DomainResult<Membership> {
    if state.jar_repo.find_by_id(jar_id).await?.is_none() {
        return Err(DomainError::not_found(format!("Jar {} not found", jar_id)));
    }

    let membership = state
        .member_repo
        .find(jar_id, participant_id)
        .await?
        .filter(|m| m.is_active())
        .ok_or_else(|| {
            DomainError::forbidden(format!("{} is not an active member of jar {}", participant_id, jar_id))
        })?;

    if !membership.role.satisfies(minimum) {
        log::warn!(
            "{} ({}) denied {} action in jar {}",
            participant_id,
            membership.role.as_str(),
            minimum.as_str(),
            jar_id
        );
        return Err(DomainError::forbidden(format!(
            "Requires {} role in jar {}",
            minimum.as_str(),
            jar_id
        )));
    }
    Ok(membership)
}

/// Load an idea, failing with `NotFound` when missing
pub(crate) async fn load_idea(state: &AppState, idea_id: u32) -> DomainResult<Idea> {
    state
        .idea_repo
        .find_by_id(idea_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Idea {} not found", idea_id)))
}

/// Author of the idea, or an admin of its jar
pub(crate) async fn require_author_or_admin(state: &AppState, idea: &Idea, participant_id: &str) -> DomainResult<()> {
    let membership = require_role(state, idea.jar_id, participant_id, MemberRole::Member).await?;
    if idea.author_id == participant_id || membership.role.satisfies(MemberRole::Admin) {
        Ok(())
    } else {
        Err(DomainError::forbidden(format!(
            "Only the author or an admin may change idea {}",
            idea.id
        )))
    }
}
