//! Allocation Operations
//!
//! Runs eligibility, the supply check and every assignment write inside one
//! IMMEDIATE transaction, so two allocations on the same jar serialize on
//! SQLite's write lock and never hand out the same idea twice.

use async_trait::async_trait;
use rusqlite::{params, TransactionBehavior};

use crate::domain::{ApprovalState, DomainError, DomainResult};
use crate::pool::{plan_allocation, AllocationOutcome};
use super::super::db::{not_initialized, now_millis, sql_err};
use super::pool_repo::resolve_eligibility;

/// Trait for allocation operations
#[async_trait]
pub trait AllocationOperations {
    /// Give every active member `quota` random unassigned ideas. All or nothing.
    async fn allocate(&self, jar_id: u32, quota: u32) -> DomainResult<AllocationOutcome>;
}

#[async_trait]
impl AllocationOperations for super::pool_repo::PoolRepository {
    async fn allocate(&self, jar_id: u32, quota: u32) -> DomainResult<AllocationOutcome> {
        if quota == 0 {
            return Err(DomainError::invalid_input("Quota must be at least 1"));
        }

        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_initialized)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(sql_err)?;

        let eligibility = resolve_eligibility(&tx, jar_id)?;
        let plan = {
            let mut rng = self.rng();
            plan_allocation(&eligibility.participants, eligibility.idea_ids, quota, &mut *rng)?
        };

        let now = now_millis();
        {
            let mut stmt = tx
                .prepare(
                    "UPDATE ideas SET assigned_to = ?, updated_at = ?
                     WHERE id = ? AND jar_id = ? AND state = ? AND assigned_to IS NULL AND selected_at IS NULL",
                )
                .map_err(sql_err)?;

            for assignment in &plan.assignments {
                for idea_id in &assignment.idea_ids {
                    let changed = stmt
                        .execute(params![
                            assignment.participant_id,
                            now,
                            idea_id,
                            jar_id,
                            ApprovalState::Approved.as_str()
                        ])
                        .map_err(sql_err)?;
                    if changed != 1 {
                        // Dropping `tx` rolls back every write made so far
                        return Err(DomainError::conflict(format!(
                            "Idea {} changed during allocation",
                            idea_id
                        )));
                    }
                }
            }
        }

        tx.commit().map_err(sql_err)?;

        let outcome = AllocationOutcome {
            jar_id,
            allocated_count: plan.allocated_count(),
            assignments: plan.assignments,
        };
        log::info!(
            "Allocated {} ideas in jar {} ({} members x {}), {} left in pool",
            outcome.allocated_count,
            jar_id,
            outcome.assignments.len(),
            quota,
            plan.leftover.len()
        );
        Ok(outcome)
    }
}
