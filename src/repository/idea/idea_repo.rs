//! Idea Repository - Core CRUD Operations
//!
//! SQLite-backed implementation for Idea CRUD operations.
//! Specialized operations are in separate modules:
//! - idea_jar: Jar-scoped listing and bulk delete
//! - idea_moderation: Submission, approval and returning ideas to the pool

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use crate::domain::{ApprovalState, CostTier, DomainError, DomainResult, Idea, Setting, TimeOfDay, Weather};
use super::super::db::{last_insert_id, not_initialized, now_millis, sql_err, SharedConnection};
use super::super::jar_repo::jar_exists;
use super::super::traits::Repository;

pub(crate) const IDEA_COLUMNS: &str = "id, jar_id, author_id, description, details, state, assigned_to, selected_at, selected_by, cost, duration_minutes, setting, time_of_day, weather, category, created_at, updated_at";

/// SQLite implementation of Idea repository
pub struct IdeaRepository {
    pub(super) conn: SharedConnection,
}

impl IdeaRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

pub(super) fn validate_description(description: &str) -> DomainResult<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_input("Idea description cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Insert `entity` as given (state included) and return the stored copy
pub(super) fn insert_idea(conn: &rusqlite::Connection, entity: &Idea) -> DomainResult<Idea> {
    let description = validate_description(&entity.description)?;
    if !jar_exists(conn, entity.jar_id)? {
        return Err(DomainError::not_found(format!("Jar {} not found", entity.jar_id)));
    }

    let now = now_millis();
    conn.execute(
        "INSERT INTO ideas (jar_id, author_id, description, details, state, assigned_to, selected_at, selected_by, cost, duration_minutes, setting, time_of_day, weather, category, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            entity.jar_id,
            entity.author_id,
            description,
            entity.details,
            entity.state.as_str(),
            entity.assigned_to,
            entity.selected_at,
            entity.selected_by,
            entity.cost.as_str(),
            entity.duration_minutes,
            entity.setting.as_str(),
            entity.time_of_day.as_str(),
            entity.weather.as_str(),
            entity.category.trim(),
            now,
            now
        ],
    )
    .map_err(sql_err)?;

    let mut idea = entity.clone();
    idea.id = last_insert_id(conn)?;
    idea.description = description;
    idea.category = entity.category.trim().to_string();
    idea.created_at = Some(now);
    idea.updated_at = Some(now);
    Ok(idea)
}

pub(crate) fn find_idea(conn: &rusqlite::Connection, id: u32) -> DomainResult<Option<Idea>> {
    conn.query_row(
        &format!("SELECT {} FROM ideas WHERE id = ?", IDEA_COLUMNS),
        params![id],
        row_to_idea,
    )
    .optional()
    .map_err(sql_err)
}

/// Run a SELECT over `ideas` and collect the rows
pub(crate) fn query_ideas(conn: &rusqlite::Connection, sql: &str, args: impl rusqlite::Params) -> DomainResult<Vec<Idea>> {
    let mut stmt = conn.prepare(sql).map_err(sql_err)?;
    let mut rows = stmt.query(args).map_err(sql_err)?;

    let mut ideas = Vec::new();
    while let Some(row) = rows.next().map_err(sql_err)? {
        ideas.push(row_to_idea(row).map_err(sql_err)?);
    }
    Ok(ideas)
}

#[async_trait]
impl Repository<Idea> for IdeaRepository {
    async fn create(&self, entity: &Idea) -> DomainResult<Idea> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        insert_idea(conn, entity)
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Idea>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        find_idea(conn, id)
    }

    async fn list(&self) -> DomainResult<Vec<Idea>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        query_ideas(
            conn,
            &format!("SELECT {} FROM ideas ORDER BY jar_id, id", IDEA_COLUMNS),
            [],
        )
    }

    /// Rewrites the descriptive columns only. Moderation state, assignment
    /// and selection change through their own operations, so an edit made
    /// from a stale copy never undoes an allocation or a spin.
    async fn update(&self, entity: &Idea) -> DomainResult<Idea> {
        let description = validate_description(&entity.description)?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn
            .execute(
                "UPDATE ideas SET description = ?, details = ?, cost = ?, duration_minutes = ?, setting = ?, time_of_day = ?, weather = ?, category = ?, updated_at = ? WHERE id = ?",
                params![
                    description,
                    entity.details,
                    entity.cost.as_str(),
                    entity.duration_minutes,
                    entity.setting.as_str(),
                    entity.time_of_day.as_str(),
                    entity.weather.as_str(),
                    entity.category.trim(),
                    now_millis(),
                    entity.id
                ],
            )
            .map_err(sql_err)?;
        if changed == 0 {
            return Err(DomainError::not_found(format!("Idea {} not found", entity.id)));
        }

        find_idea(conn, entity.id)?.ok_or_else(|| DomainError::not_found(format!("Idea {} not found", entity.id)))
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let removed = conn
            .execute("DELETE FROM ideas WHERE id = ?", params![id])
            .map_err(sql_err)?;
        if removed == 0 {
            return Err(DomainError::not_found(format!("Idea {} not found", id)));
        }
        Ok(())
    }
}

/// Convert a database row (selected with IDEA_COLUMNS) to Idea
pub(crate) fn row_to_idea(row: &rusqlite::Row) -> rusqlite::Result<Idea> {
    let state: String = row.get(5)?;
    let cost: String = row.get(9)?;
    let setting: String = row.get(11)?;
    let time_of_day: String = row.get(12)?;
    let weather: String = row.get(13)?;

    Ok(Idea {
        id: row.get(0)?,
        jar_id: row.get(1)?,
        author_id: row.get(2)?,
        description: row.get(3)?,
        details: row.get(4)?,
        // Unknown states are treated as pending so they never get handed out
        state: ApprovalState::parse(&state).unwrap_or_default(),
        assigned_to: row.get(6)?,
        selected_at: row.get(7)?,
        selected_by: row.get(8)?,
        cost: CostTier::parse(&cost).unwrap_or_default(),
        duration_minutes: row.get(10)?,
        setting: Setting::parse(&setting).unwrap_or_default(),
        time_of_day: TimeOfDay::parse(&time_of_day).unwrap_or_default(),
        weather: Weather::parse(&weather).unwrap_or_default(),
        category: row.get(14)?,
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}
