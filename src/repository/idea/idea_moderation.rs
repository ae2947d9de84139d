//! Idea Moderation Operations
//!
//! Submission (with the jar's approval policy), approve/reject, and putting
//! an idea back into the pool.

use async_trait::async_trait;
use rusqlite::params;

use crate::domain::{ApprovalState, DomainError, DomainResult, Idea, MemberRole};
use super::super::db::{not_initialized, now_millis, sql_err};
use super::idea_repo::{find_idea, insert_idea};

/// Trait for idea moderation operations
#[async_trait]
pub trait IdeaModerationOperations {
    /// Store a new idea. It is approved right away unless the jar requires
    /// approval and the author is a plain member.
    async fn submit(&self, idea: &Idea, author_role: MemberRole) -> DomainResult<Idea>;

    async fn approve(&self, id: u32) -> DomainResult<Idea>;

    /// Fails with `InvalidInput` once the idea is allocated or selected
    async fn reject(&self, id: u32) -> DomainResult<Idea>;

    /// Clear assignment and selection so the idea is eligible again
    async fn return_to_pool(&self, id: u32) -> DomainResult<Idea>;
}

#[async_trait]
impl IdeaModerationOperations for super::idea_repo::IdeaRepository {
    async fn submit(&self, idea: &Idea, author_role: MemberRole) -> DomainResult<Idea> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let requires_approval: bool = conn
            .query_row(
                "SELECT requires_approval FROM jars WHERE id = ?",
                params![idea.jar_id],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    DomainError::not_found(format!("Jar {} not found", idea.jar_id))
                }
                other => sql_err(other),
            })?;

        let mut pending = idea.clone();
        pending.state = if requires_approval && !author_role.satisfies(MemberRole::Admin) {
            ApprovalState::Pending
        } else {
            ApprovalState::Approved
        };
        pending.assigned_to = None;
        pending.selected_at = None;
        pending.selected_by = None;

        let stored = insert_idea(conn, &pending)?;
        log::debug!("Idea {} submitted to jar {} as {}", stored.id, stored.jar_id, stored.state.as_str());
        Ok(stored)
    }

    async fn approve(&self, id: u32) -> DomainResult<Idea> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        set_state(conn, id, ApprovalState::Approved)
    }

    async fn reject(&self, id: u32) -> DomainResult<Idea> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn
            .execute(
                "UPDATE ideas SET state = ?, updated_at = ? WHERE id = ? AND assigned_to IS NULL AND selected_at IS NULL",
                params![ApprovalState::Rejected.as_str(), now_millis(), id],
            )
            .map_err(sql_err)?;
        let idea = find_idea(conn, id)?.ok_or_else(|| DomainError::not_found(format!("Idea {} not found", id)))?;
        if changed == 0 {
            return Err(DomainError::invalid_input(format!(
                "Idea {} is already allocated or selected",
                id
            )));
        }
        Ok(idea)
    }

    async fn return_to_pool(&self, id: u32) -> DomainResult<Idea> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn
            .execute(
                "UPDATE ideas SET assigned_to = NULL, selected_at = NULL, selected_by = NULL, updated_at = ? WHERE id = ?",
                params![now_millis(), id],
            )
            .map_err(sql_err)?;
        if changed == 0 {
            return Err(DomainError::not_found(format!("Idea {} not found", id)));
        }

        find_idea(conn, id)?.ok_or_else(|| DomainError::not_found(format!("Idea {} not found", id)))
    }
}

fn set_state(conn: &rusqlite::Connection, id: u32, state: ApprovalState) -> DomainResult<Idea> {
    let changed = conn
        .execute(
            "UPDATE ideas SET state = ?, updated_at = ? WHERE id = ?",
            params![state.as_str(), now_millis(), id],
        )
        .map_err(sql_err)?;
    if changed == 0 {
        return Err(DomainError::not_found(format!("Idea {} not found", id)));
    }

    find_idea(conn, id)?.ok_or_else(|| DomainError::not_found(format!("Idea {} not found", id)))
}
