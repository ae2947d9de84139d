//! Spin Operations
//!
//! Picks one eligible idea and marks it selected. The read and the guarded
//! write share one IMMEDIATE transaction.

use async_trait::async_trait;
use rusqlite::{params, TransactionBehavior};

use crate::domain::{ApprovalState, DomainError, DomainResult, Idea, SpinFilters};
use crate::pool::{pick, spin_candidates};
use super::super::db::{not_initialized, now_millis, sql_err};
use super::super::idea::{query_ideas, IDEA_COLUMNS};
use super::super::jar_repo::jar_exists;

/// Trait for spin operations
#[async_trait]
pub trait SpinOperations {
    /// Select one idea `participant_id` may spin that passes `filters`
    async fn spin(&self, jar_id: u32, participant_id: &str, filters: &SpinFilters) -> DomainResult<Idea>;
}

#[async_trait]
impl SpinOperations for super::pool_repo::PoolRepository {
    async fn spin(&self, jar_id: u32, participant_id: &str, filters: &SpinFilters) -> DomainResult<Idea> {
        filters.validate()?;

        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_initialized)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(sql_err)?;

        if !jar_exists(&tx, jar_id)? {
            return Err(DomainError::not_found(format!("Jar {} not found", jar_id)));
        }

        let pool = query_ideas(
            &tx,
            &format!(
                "SELECT {} FROM ideas
                 WHERE jar_id = ? AND state = ? AND selected_at IS NULL
                   AND (assigned_to IS NULL OR assigned_to = ?)
                 ORDER BY id",
                IDEA_COLUMNS
            ),
            params![jar_id, ApprovalState::Approved.as_str(), participant_id],
        )?;

        let candidates = spin_candidates(&pool, participant_id, filters);
        let mut chosen = {
            let mut rng = self.rng();
            pick(&candidates, &mut *rng)?.clone()
        };

        let now = now_millis();
        let changed = tx
            .execute(
                "UPDATE ideas SET selected_at = ?, selected_by = ?, updated_at = ? WHERE id = ? AND selected_at IS NULL",
                params![now, participant_id, now, chosen.id],
            )
            .map_err(sql_err)?;
        if changed != 1 {
            return Err(DomainError::conflict(format!(
                "Idea {} was selected by someone else",
                chosen.id
            )));
        }

        tx.commit().map_err(sql_err)?;

        chosen.selected_at = Some(now);
        chosen.selected_by = Some(participant_id.to_string());
        chosen.updated_at = Some(now);
        log::info!(
            "Spin in jar {} by {}: idea {} out of {} candidates",
            jar_id,
            participant_id,
            chosen.id,
            candidates.len()
        );
        Ok(chosen)
    }
}
