//! Database Connection and Setup
//!
//! Manages the SQLite connection and schema migrations.

use rusqlite::{Connection, ErrorCode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult};

/// Shared connection handle used by every repository
pub type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    pub conn: SharedConnection,
    pub db_path: PathBuf,
}

impl DbState {
    /// Empty state; the connection is filled in by `init_db`
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            conn: Arc::new(Mutex::new(None)),
            db_path,
        }
    }

    /// Handle to pass to repositories
    pub fn handle(&self) -> SharedConnection {
        self.conn.clone()
    }

    pub async fn is_initialized(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    /// Drop the connection; repositories report "not initialized" afterwards
    pub async fn close(&self) {
        let mut guard = self.conn.lock().await;
        *guard = None;
    }
}

/// Open the database at `db_path` (":memory:" for an in-memory database)
/// and bring the schema up to date.
pub async fn init_db(db_path: &Path, busy_timeout: Duration) -> Result<DbState, String> {
    let conn = if db_path.as_os_str() == ":memory:" {
        Connection::open_in_memory()
    } else {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
            }
        }
        Connection::open(db_path)
    }
    .map_err(|e| format!("Failed to open db: {}", e))?;

    conn.busy_timeout(busy_timeout)
        .map_err(|e| format!("Failed to set busy timeout: {}", e))?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|e| format!("Failed to enable foreign keys: {}", e))?;

    run_migrations(&conn)?;
    log::info!("Database ready at {}", db_path.display());

    let state = DbState::new(db_path.to_path_buf());
    *state.conn.lock().await = Some(conn);
    Ok(state)
}

/// Map a SQLite error onto the domain error classes.
/// Busy/locked databases mean another writer won the race: retryable.
pub(crate) fn sql_err(e: rusqlite::Error) -> DomainError {
    match e.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            DomainError::conflict(e.to_string())
        }
        _ => DomainError::internal(e.to_string()),
    }
}

pub(crate) fn not_initialized() -> DomainError {
    DomainError::internal("Database not initialized")
}

/// Row id of the last insert, checked against the u32 ids used by the domain
pub(crate) fn last_insert_id(conn: &Connection) -> DomainResult<u32> {
    let rowid = conn.last_insert_rowid();
    u32::try_from(rowid).map_err(|_| DomainError::internal(format!("Row id {} is out of range", rowid)))
}

/// Current time as unix millis
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", table))
        .map_err(|e| e.to_string())?;
    let mut rows = stmt.query([]).map_err(|e| e.to_string())?;

    while let Some(row) = rows.next().map_err(|e| e.to_string())? {
        let name: String = row.get(1).map_err(|e| e.to_string())?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS jars (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            requires_approval INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER,
            updated_at INTEGER
        );

        CREATE TABLE IF NOT EXISTS memberships (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            jar_id INTEGER NOT NULL REFERENCES jars(id) ON DELETE CASCADE,
            participant_id TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'member',
            status TEXT NOT NULL DEFAULT 'pending',
            joined_at INTEGER,
            UNIQUE(jar_id, participant_id)
        );

        CREATE TABLE IF NOT EXISTS ideas (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            jar_id INTEGER NOT NULL REFERENCES jars(id) ON DELETE CASCADE,
            author_id TEXT NOT NULL,
            description TEXT NOT NULL,
            state TEXT NOT NULL DEFAULT 'pending',
            assigned_to TEXT,
            selected_at INTEGER,
            cost TEXT NOT NULL DEFAULT 'free',
            duration_minutes INTEGER,
            setting TEXT NOT NULL DEFAULT 'any',
            time_of_day TEXT NOT NULL DEFAULT 'any',
            weather TEXT NOT NULL DEFAULT 'any',
            category TEXT NOT NULL DEFAULT 'activity',
            created_at INTEGER,
            updated_at INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_ideas_jar_state ON ideas(jar_id, state);
        CREATE INDEX IF NOT EXISTS idx_memberships_jar ON memberships(jar_id, status);",
    )
    .map_err(|e| format!("Failed to create tables: {}", e))?;

    // Additive columns for databases created before they existed
    if !column_exists(conn, "ideas", "details")? {
        conn.execute("ALTER TABLE ideas ADD COLUMN details TEXT", [])
            .map_err(|e| format!("Failed to add details: {}", e))?;
    }

    if !column_exists(conn, "ideas", "selected_by")? {
        conn.execute("ALTER TABLE ideas ADD COLUMN selected_by TEXT", [])
            .map_err(|e| format!("Failed to add selected_by: {}", e))?;
    }

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_ideas_assigned ON ideas(jar_id, assigned_to)",
        [],
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}
