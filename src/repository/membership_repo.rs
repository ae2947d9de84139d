//! Membership Repository
//!
//! Handles participant standing (role + status) inside jars.

use rusqlite::{params, OptionalExtension};

use crate::domain::{DomainError, DomainResult, MemberRole, MemberStatus, Membership};
use super::db::{last_insert_id, not_initialized, now_millis, sql_err, SharedConnection};
use super::jar_repo::jar_exists;

const MEMBERSHIP_COLUMNS: &str = "id, jar_id, participant_id, role, status, joined_at";

pub struct MembershipRepository {
    conn: SharedConnection,
}

impl MembershipRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Add a participant to a jar. A participant can only join a jar once.
    pub async fn add(&self, jar_id: u32, participant_id: &str, role: MemberRole, status: MemberStatus) -> DomainResult<Membership> {
        let participant_id = participant_id.trim();
        if participant_id.is_empty() {
            return Err(DomainError::invalid_input("Participant id cannot be empty"));
        }

        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        if !jar_exists(conn, jar_id)? {
            return Err(DomainError::not_found(format!("Jar {} not found", jar_id)));
        }
        if find_membership(conn, jar_id, participant_id)?.is_some() {
            return Err(DomainError::invalid_input(format!(
                "{} is already a member of jar {}",
                participant_id, jar_id
            )));
        }

        let now = now_millis();
        conn.execute(
            "INSERT INTO memberships (jar_id, participant_id, role, status, joined_at) VALUES (?, ?, ?, ?, ?)",
            params![jar_id, participant_id, role.as_str(), status.as_str(), now],
        )
        .map_err(sql_err)?;

        let mut membership = Membership::new(last_insert_id(conn)?, jar_id, participant_id, role, status);
        membership.joined_at = Some(now);
        Ok(membership)
    }

    pub async fn find(&self, jar_id: u32, participant_id: &str) -> DomainResult<Option<Membership>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        find_membership(conn, jar_id, participant_id)
    }

    /// All memberships of a jar in join order
    pub async fn list_by_jar(&self, jar_id: u32) -> DomainResult<Vec<Membership>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM memberships WHERE jar_id = ? ORDER BY id",
                MEMBERSHIP_COLUMNS
            ))
            .map_err(sql_err)?;
        let mut rows = stmt.query(params![jar_id]).map_err(sql_err)?;

        let mut members = Vec::new();
        while let Some(row) = rows.next().map_err(sql_err)? {
            members.push(row_to_membership(row).map_err(sql_err)?);
        }
        Ok(members)
    }

    pub async fn set_status(&self, jar_id: u32, participant_id: &str, status: MemberStatus) -> DomainResult<Membership> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn
            .execute(
                "UPDATE memberships SET status = ? WHERE jar_id = ? AND participant_id = ?",
                params![status.as_str(), jar_id, participant_id],
            )
            .map_err(sql_err)?;
        if changed == 0 {
            return Err(membership_not_found(jar_id, participant_id));
        }

        find_membership(conn, jar_id, participant_id)?
            .ok_or_else(|| membership_not_found(jar_id, participant_id))
    }

    pub async fn set_role(&self, jar_id: u32, participant_id: &str, role: MemberRole) -> DomainResult<Membership> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn
            .execute(
                "UPDATE memberships SET role = ? WHERE jar_id = ? AND participant_id = ?",
                params![role.as_str(), jar_id, participant_id],
            )
            .map_err(sql_err)?;
        if changed == 0 {
            return Err(membership_not_found(jar_id, participant_id));
        }

        find_membership(conn, jar_id, participant_id)?
            .ok_or_else(|| membership_not_found(jar_id, participant_id))
    }
}

fn membership_not_found(jar_id: u32, participant_id: &str) -> DomainError {
    DomainError::not_found(format!("{} is not a member of jar {}", participant_id, jar_id))
}

fn find_membership(conn: &rusqlite::Connection, jar_id: u32, participant_id: &str) -> DomainResult<Option<Membership>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM memberships WHERE jar_id = ? AND participant_id = ?",
            MEMBERSHIP_COLUMNS
        ),
        params![jar_id, participant_id],
        row_to_membership,
    )
    .optional()
    .map_err(sql_err)
}

fn row_to_membership(row: &rusqlite::Row) -> rusqlite::Result<Membership> {
    let role: String = row.get(3)?;
    let status: String = row.get(4)?;
    Ok(Membership {
        id: row.get(0)?,
        jar_id: row.get(1)?,
        participant_id: row.get(2)?,
        role: MemberRole::parse(&role).unwrap_or_default(),
        // Unknown statuses never count as active
        status: MemberStatus::parse(&status).unwrap_or_default(),
        joined_at: row.get(5)?,
    })
}
