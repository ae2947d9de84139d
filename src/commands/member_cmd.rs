//! Commands for jar membership

use crate::domain::{DomainError, DomainResult, MemberRole, MemberStatus, Membership};
use crate::repository::Repository;
use crate::AppState;
use super::permissions::require_role;

/// Admin adds a participant as an active member or admin
pub async fn add_member(
    state: &AppState,
    caller: &str,
    jar_id: u32,
    participant_id: &str,
    role: MemberRole,
) -> DomainResult<Membership> {
    let acting = require_role(state, jar_id, caller, MemberRole::Admin).await?;
    let participant_id = validate_participant(participant_id)?;
    if role == MemberRole::Owner {
        return Err(DomainError::invalid_input("A jar has exactly one owner"));
    }
    if role == MemberRole::Admin && !acting.role.satisfies(MemberRole::Owner) {
        return Err(DomainError::forbidden("Only the owner may add admins"));
    }

    let membership = state
        .member_repo
        .add(jar_id, participant_id, role, MemberStatus::Active)
        .await?;
    log::info!("{} added {} to jar {} as {}", caller, participant_id, jar_id, role.as_str());
    Ok(membership)
}

/// Caller asks to join a jar; an admin activates the request
pub async fn join_jar(state: &AppState, caller: &str, jar_id: u32) -> DomainResult<Membership> {
    let caller = validate_participant(caller)?;
    if state.jar_repo.find_by_id(jar_id).await?.is_none() {
        return Err(DomainError::not_found(format!("Jar {} not found", jar_id)));
    }
    state
        .member_repo
        .add(jar_id, caller, MemberRole::Member, MemberStatus::Pending)
        .await
}

/// Accept, suspend or reject a membership
pub async fn set_member_status(
    state: &AppState,
    caller: &str,
    jar_id: u32,
    participant_id: &str,
    status: MemberStatus,
) -> DomainResult<Membership> {
    require_role(state, jar_id, caller, MemberRole::Admin).await?;
    let target = find_member(state, jar_id, participant_id).await?;
    if target.role == MemberRole::Owner {
        return Err(DomainError::forbidden("The owner's membership cannot be changed"));
    }

    let updated = state.member_repo.set_status(jar_id, participant_id, status).await?;
    log::info!("{} set {} to {} in jar {}", caller, participant_id, status.as_str(), jar_id);
    Ok(updated)
}

/// Promote or demote a member. Owner only.
pub async fn set_member_role(
    state: &AppState,
    caller: &str,
    jar_id: u32,
    participant_id: &str,
    role: MemberRole,
) -> DomainResult<Membership> {
    require_role(state, jar_id, caller, MemberRole::Owner).await?;
    if role == MemberRole::Owner {
        return Err(DomainError::invalid_input("A jar has exactly one owner"));
    }
    let target = find_member(state, jar_id, participant_id).await?;
    if target.role == MemberRole::Owner {
        return Err(DomainError::forbidden("The owner's role cannot be changed"));
    }
    state.member_repo.set_role(jar_id, participant_id, role).await
}

pub async fn list_members(state: &AppState, caller: &str, jar_id: u32) -> DomainResult<Vec<Membership>> {
    require_role(state, jar_id, caller, MemberRole::Member).await?;
    state.member_repo.list_by_jar(jar_id).await
}

async fn find_member(state: &AppState, jar_id: u32, participant_id: &str) -> DomainResult<Membership> {
    state
        .member_repo
        .find(jar_id, participant_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("{} is not a member of jar {}", participant_id, jar_id)))
}

fn validate_participant(participant_id: &str) -> DomainResult<&str> {
    let trimmed = participant_id.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_input("Participant id must not be empty"));
    }
    Ok(trimmed)
}
