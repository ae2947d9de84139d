//! Idea Jar Operations
//!
//! Listing and bulk removal of ideas scoped to one jar.

use async_trait::async_trait;
use rusqlite::params_from_iter;

use crate::domain::{DomainError, DomainResult, Idea};
use super::super::db::{not_initialized, sql_err};
use super::idea_repo::{query_ideas, IDEA_COLUMNS};

/// Trait for jar-scoped idea operations
#[async_trait]
pub trait IdeaJarOperations {
    /// All ideas of a jar, oldest first
    async fn list_by_jar(&self, jar_id: u32) -> DomainResult<Vec<Idea>>;

    /// Unselected ideas allocated to `participant_id`
    async fn list_assigned_to(&self, jar_id: u32, participant_id: &str) -> DomainResult<Vec<Idea>>;

    /// Spin history, most recent first
    async fn list_selected(&self, jar_id: u32) -> DomainResult<Vec<Idea>>;

    /// Delete the given ideas if they belong to `jar_id`; ids from other jars are ignored
    async fn bulk_delete(&self, jar_id: u32, ids: &[u32]) -> DomainResult<usize>;
}

#[async_trait]
impl IdeaJarOperations for super::idea_repo::IdeaRepository {
    async fn list_by_jar(&self, jar_id: u32) -> DomainResult<Vec<Idea>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        query_ideas(
            conn,
            &format!("SELECT {} FROM ideas WHERE jar_id = ? ORDER BY id", IDEA_COLUMNS),
            rusqlite::params![jar_id],
        )
    }

    async fn list_assigned_to(&self, jar_id: u32, participant_id: &str) -> DomainResult<Vec<Idea>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        query_ideas(
            conn,
            &format!(
                "SELECT {} FROM ideas WHERE jar_id = ? AND assigned_to = ? AND selected_at IS NULL ORDER BY id",
                IDEA_COLUMNS
            ),
            rusqlite::params![jar_id, participant_id],
        )
    }

    async fn list_selected(&self, jar_id: u32) -> DomainResult<Vec<Idea>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        query_ideas(
            conn,
            &format!(
                "SELECT {} FROM ideas WHERE jar_id = ? AND selected_at IS NOT NULL ORDER BY selected_at DESC, id DESC",
                IDEA_COLUMNS
            ),
            rusqlite::params![jar_id],
        )
    }

    async fn bulk_delete(&self, jar_id: u32, ids: &[u32]) -> DomainResult<usize> {
        if ids.is_empty() {
            return Err(DomainError::invalid_input("No idea ids given"));
        }

        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_initialized)?;
        let tx = conn.transaction().map_err(sql_err)?;

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "DELETE FROM ideas WHERE jar_id = ? AND id IN ({})",
            placeholders
        );
        let args = std::iter::once(jar_id).chain(ids.iter().copied());
        let removed = tx.execute(&sql, params_from_iter(args)).map_err(sql_err)?;

        tx.commit().map_err(sql_err)?;
        log::info!("Bulk delete in jar {}: {} of {} ideas removed", jar_id, removed, ids.len());
        Ok(removed)
    }
}
