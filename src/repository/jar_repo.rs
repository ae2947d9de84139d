//! Jar Repository
//!
//! Jar CRUD plus the destructive reset operation.

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use crate::domain::{DomainError, DomainResult, Jar, MemberRole, MemberStatus, Membership};
use super::db::{last_insert_id, not_initialized, now_millis, sql_err, SharedConnection};
use super::traits::Repository;

pub struct JarRepository {
    conn: SharedConnection,
}

impl JarRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Create a jar and make `owner` its active owner in one transaction
    pub async fn create_with_owner(&self, entity: &Jar, owner: &str) -> DomainResult<(Jar, Membership)> {
        let name = validate_name(&entity.name)?;
        let owner = owner.trim();
        if owner.is_empty() {
            return Err(DomainError::invalid_input("Owner id cannot be empty"));
        }

        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_initialized)?;
        let tx = conn.transaction().map_err(sql_err)?;

        let now = now_millis();
        tx.execute(
            "INSERT INTO jars (name, requires_approval, created_at, updated_at) VALUES (?, ?, ?, ?)",
            params![name, entity.requires_approval, now, now],
        )
        .map_err(sql_err)?;
        let jar_id = last_insert_id(&tx)?;

        tx.execute(
            "INSERT INTO memberships (jar_id, participant_id, role, status, joined_at) VALUES (?, ?, ?, ?, ?)",
            params![jar_id, owner, MemberRole::Owner.as_str(), MemberStatus::Active.as_str(), now],
        )
        .map_err(sql_err)?;
        let membership_id = last_insert_id(&tx)?;

        tx.commit().map_err(sql_err)?;

        let mut jar = entity.clone();
        jar.id = jar_id;
        jar.name = name;
        jar.created_at = Some(now);
        jar.updated_at = Some(now);

        let mut membership = Membership::new(membership_id, jar_id, owner, MemberRole::Owner, MemberStatus::Active);
        membership.joined_at = Some(now);

        log::info!("Jar {} created by {}", jar_id, owner);
        Ok((jar, membership))
    }

    /// Remove every idea in the jar, whatever its state. Returns the count.
    pub async fn reset(&self, id: u32) -> DomainResult<usize> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        if !jar_exists(conn, id)? {
            return Err(DomainError::not_found(format!("Jar {} not found", id)));
        }

        let removed = conn
            .execute("DELETE FROM ideas WHERE jar_id = ?", params![id])
            .map_err(sql_err)?;
        conn.execute(
            "UPDATE jars SET updated_at = ? WHERE id = ?",
            params![now_millis(), id],
        )
        .map_err(sql_err)?;

        log::info!("Jar {} reset, {} ideas removed", id, removed);
        Ok(removed)
    }

    pub async fn rename(&self, id: u32, name: &str) -> DomainResult<Jar> {
        let name = validate_name(name)?;
        let mut jar = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Jar {} not found", id)))?;
        jar.name = name;
        self.update(&jar).await
    }
}

fn validate_name(name: &str) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_input("Jar name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn jar_exists(conn: &rusqlite::Connection, id: u32) -> DomainResult<bool> {
    conn.query_row("SELECT 1 FROM jars WHERE id = ?", params![id], |_| Ok(()))
        .optional()
        .map(|found| found.is_some())
        .map_err(sql_err)
}

#[async_trait]
impl Repository<Jar> for JarRepository {
    async fn create(&self, entity: &Jar) -> DomainResult<Jar> {
        let name = validate_name(&entity.name)?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let now = now_millis();
        conn.execute(
            "INSERT INTO jars (name, requires_approval, created_at, updated_at) VALUES (?, ?, ?, ?)",
            params![name, entity.requires_approval, now, now],
        )
        .map_err(sql_err)?;

        let mut jar = entity.clone();
        jar.id = last_insert_id(conn)?;
        jar.name = name;
        jar.created_at = Some(now);
        jar.updated_at = Some(now);
        Ok(jar)
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Jar>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        conn.query_row(
            "SELECT id, name, requires_approval, created_at, updated_at FROM jars WHERE id = ?",
            params![id],
            row_to_jar,
        )
        .optional()
        .map_err(sql_err)
    }

    async fn list(&self) -> DomainResult<Vec<Jar>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn
            .prepare("SELECT id, name, requires_approval, created_at, updated_at FROM jars ORDER BY id")
            .map_err(sql_err)?;
        let mut rows = stmt.query([]).map_err(sql_err)?;

        let mut jars = Vec::new();
        while let Some(row) = rows.next().map_err(sql_err)? {
            jars.push(row_to_jar(row).map_err(sql_err)?);
        }
        Ok(jars)
    }

    async fn update(&self, entity: &Jar) -> DomainResult<Jar> {
        let name = validate_name(&entity.name)?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let now = now_millis();
        let changed = conn
            .execute(
                "UPDATE jars SET name = ?, requires_approval = ?, updated_at = ? WHERE id = ?",
                params![name, entity.requires_approval, now, entity.id],
            )
            .map_err(sql_err)?;
        if changed == 0 {
            return Err(DomainError::not_found(format!("Jar {} not found", entity.id)));
        }

        let mut jar = entity.clone();
        jar.name = name;
        jar.updated_at = Some(now);
        Ok(jar)
    }

    /// Ideas and memberships go with the jar (ON DELETE CASCADE)
    async fn delete(&self, id: u32) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let removed = conn
            .execute("DELETE FROM jars WHERE id = ?", params![id])
            .map_err(sql_err)?;
        if removed == 0 {
            return Err(DomainError::not_found(format!("Jar {} not found", id)));
        }
        Ok(())
    }
}

fn row_to_jar(row: &rusqlite::Row) -> rusqlite::Result<Jar> {
    Ok(Jar {
        id: row.get(0)?,
        name: row.get(1)?,
        requires_approval: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
