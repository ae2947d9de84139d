//! Commands for Jar operations

use serde::Serialize;

use crate::domain::{DomainError, DomainResult, Jar, MemberRole, Membership};
use crate::repository::Repository;
use crate::AppState;
use super::permissions::require_role;

/// A jar together with the caller's membership in it
#[derive(Debug, Clone, Serialize)]
pub struct JarView {
    #[serde(flatten)]
    pub jar: Jar,
    pub membership: Membership,
}

/// Create a jar; the caller becomes its active owner
pub async fn create_jar(state: &AppState, caller: &str, name: String, requires_approval: bool) -> DomainResult<JarView> {
    let mut jar = Jar::new(0, name);
    jar.requires_approval = requires_approval;

    let (jar, membership) = state.jar_repo.create_with_owner(&jar, caller).await?;
    Ok(JarView { jar, membership })
}

/// Jars the caller belongs to (any status)
pub async fn list_jars(state: &AppState, caller: &str) -> DomainResult<Vec<JarView>> {
    let mut views = Vec::new();
    for jar in state.jar_repo.list().await? {
        if let Some(membership) = state.member_repo.find(jar.id, caller).await? {
            views.push(JarView { jar, membership });
        }
    }
    Ok(views)
}

pub async fn get_jar(state: &AppState, caller: &str, jar_id: u32) -> DomainResult<JarView> {
    let membership = require_role(state, jar_id, caller, MemberRole::Member).await?;
    let jar = state
        .jar_repo
        .find_by_id(jar_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Jar {} not found", jar_id)))?;
    Ok(JarView { jar, membership })
}

pub async fn rename_jar(state: &AppState, caller: &str, jar_id: u32, name: &str) -> DomainResult<Jar> {
    require_role(state, jar_id, caller, MemberRole::Admin).await?;
    state.jar_repo.rename(jar_id, name).await
}

/// Turn idea moderation on or off
pub async fn set_requires_approval(state: &AppState, caller: &str, jar_id: u32, requires_approval: bool) -> DomainResult<Jar> {
    require_role(state, jar_id, caller, MemberRole::Admin).await?;
    let mut jar = state
        .jar_repo
        .find_by_id(jar_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Jar {} not found", jar_id)))?;
    jar.requires_approval = requires_approval;
    state.jar_repo.update(&jar).await
}

/// Delete a jar with all its ideas and memberships. Owner only.
pub async fn delete_jar(state: &AppState, caller: &str, jar_id: u32) -> DomainResult<()> {
    require_role(state, jar_id, caller, MemberRole::Owner).await?;
    state.jar_repo.delete(jar_id).await?;
    log::info!("Jar {} deleted by {}", jar_id, caller);
    Ok(())
}

/// Remove every idea from the jar, returning how many were removed
pub async fn reset_jar(state: &AppState, caller: &str, jar_id: u32) -> DomainResult<usize> {
    require_role(state, jar_id, caller, MemberRole::Admin).await?;
    let removed = state.jar_repo.reset(jar_id).await?;
    log::info!("Jar {} reset by {}: {} ideas removed", jar_id, caller, removed);
    Ok(removed)
}
