use std::path::Path;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{ReviewLog, ReviewLogError, UnansweredQuestion};

/// Review log persisted in a local SQLite database.
pub struct SqliteReviewLog {
    conn: Connection,
}

impl SqliteReviewLog {
    /// Open (or create) the review log at `path` and run migrations.
    pub fn open(path: &Path) -> Result<Self, ReviewLogError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// In-memory review log (for testing).
    pub fn open_in_memory() -> Result<Self, ReviewLogError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, ReviewLogError> {
        conn.execute_batch("PRAGMA journal_mode=DELETE;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Number of logged questions.
    pub fn count(&self) -> Result<usize, ReviewLogError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM unanswered_questions", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// The most recent `limit` rows, oldest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<UnansweredQuestion>, ReviewLogError> {
        let mut stmt = self.conn.prepare(
            "SELECT logged_at, surgery_type, question FROM (
                 SELECT seq, logged_at, surgery_type, question
                 FROM unanswered_questions ORDER BY seq DESC LIMIT ?1
             ) ORDER BY seq ASC",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(UnansweredQuestion {
                    logged_at: row.get(0)?,
                    surgery_type: row.get(1)?,
                    question: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl ReviewLog for SqliteReviewLog {
    fn append(&self, row: &UnansweredQuestion) -> Result<(), ReviewLogError> {
        self.conn.execute(
            "INSERT INTO unanswered_questions (id, seq, logged_at, surgery_type, question)
             VALUES (?1, (SELECT COALESCE(MAX(seq), 0) + 1 FROM unanswered_questions), ?2, ?3, ?4)",
            params![
                Uuid::new_v4().to_string(),
                row.logged_at,
                row.surgery_type,
                row.question,
            ],
        )?;
        Ok(())
    }
}

/// Run all pending migrations
fn run_migrations(conn: &Connection) -> Result<(), ReviewLogError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![(
        1,
        include_str!("../../resources/migrations/001_review_log.sql"),
    )];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running review log migration v{version}");
            conn.execute_batch(sql)
                .map_err(|e| ReviewLogError::MigrationFailed {
                    version,
                    reason: e.to_string(),
                })?;
        }
    }

    Ok(())
}

/// Current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}
