//! Pool Repository - Eligibility
//!
//! Owns the random source used by allocation and spin, and resolves which
//! members and ideas are eligible. Mutating operations live in:
//! - allocation: Fair shuffle allocation
//! - spin: Filtered random selection

use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::params;
use std::sync::{Mutex, MutexGuard};

use crate::domain::{ApprovalState, DomainError, DomainResult, MemberStatus};
use crate::pool::Eligibility;
use super::super::db::{not_initialized, sql_err, SharedConnection};
use super::super::jar_repo::jar_exists;

pub struct PoolRepository {
    pub(super) conn: SharedConnection,
    rng: Mutex<StdRng>,
}

impl PoolRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self::with_rng(conn, StdRng::from_entropy())
    }

    /// Use a caller-provided generator (seeded in tests)
    pub fn with_rng(conn: SharedConnection, rng: StdRng) -> Self {
        Self {
            conn,
            rng: Mutex::new(rng),
        }
    }

    pub(super) fn rng(&self) -> MutexGuard<'_, StdRng> {
        match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Read-only eligibility snapshot for a jar
    pub async fn eligibility(&self, jar_id: u32) -> DomainResult<Eligibility> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        resolve_eligibility(conn, jar_id)
    }
}

/// Active members and allocatable ideas of `jar_id`, read through `conn`
/// (pass the transaction that will perform the writes).
pub(super) fn resolve_eligibility(conn: &rusqlite::Connection, jar_id: u32) -> DomainResult<Eligibility> {
    if !jar_exists(conn, jar_id)? {
        return Err(DomainError::not_found(format!("Jar {} not found", jar_id)));
    }

    let mut participants = Vec::new();
    {
        let mut stmt = conn
            .prepare("SELECT participant_id FROM memberships WHERE jar_id = ? AND status = ? ORDER BY id")
            .map_err(sql_err)?;
        let mut rows = stmt
            .query(params![jar_id, MemberStatus::Active.as_str()])
            .map_err(sql_err)?;
        while let Some(row) = rows.next().map_err(sql_err)? {
            participants.push(row.get::<_, String>(0).map_err(sql_err)?);
        }
    }

    let mut idea_ids = Vec::new();
    {
        let mut stmt = conn
            .prepare(
                "SELECT id FROM ideas
                 WHERE jar_id = ? AND state = ? AND assigned_to IS NULL AND selected_at IS NULL
                 ORDER BY id",
            )
            .map_err(sql_err)?;
        let mut rows = stmt
            .query(params![jar_id, ApprovalState::Approved.as_str()])
            .map_err(sql_err)?;
        while let Some(row) = rows.next().map_err(sql_err)? {
            idea_ids.push(row.get::<_, u32>(0).map_err(sql_err)?);
        }
    }

    Ok(Eligibility { participants, idea_ids })
}
