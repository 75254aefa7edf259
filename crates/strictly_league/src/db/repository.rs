//! Connection management, migrations and transactions.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{DbError, DbErrorKind};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Opens configured connections to the league database.
///
/// Every connection waits up to `busy_timeout_ms` for a competing writer
/// and enforces foreign keys.
#[derive(Debug, Clone)]
pub struct LeagueRepository {
    db_path: String,
    busy_timeout_ms: u64,
}

impl LeagueRepository {
    /// Creates a repository for the database at the given path.
    ///
    /// Use `":memory:"` only for single-connection experiments; every call
    /// opens a fresh connection, so tests use a temporary file.
    #[instrument(skip(db_path))]
    pub fn new(db_path: impl Into<String>, busy_timeout_ms: u64) -> Self {
        let db_path = db_path.into();
        info!(path = %db_path, busy_timeout_ms, "Creating LeagueRepository");
        Self {
            db_path,
            busy_timeout_ms,
        }
    }

    /// Path of the database this repository opens.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a configured database connection.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened.
    #[instrument(skip(self))]
    pub fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::with_kind(
                DbErrorKind::Connection,
                format!("Failed to connect to '{}': {}", self.db_path, e),
            )
        })?;
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA foreign_keys = ON;",
            self.busy_timeout_ms
        ))?;
        Ok(conn)
    }

    /// Applies pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migrations failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Runs `f` on a fresh connection without a transaction.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or a connection error.
    pub fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, E>,
        E: From<DbError>,
    {
        let mut conn = self.connection()?;
        f(&mut conn)
    }

    /// Runs `f` inside a `BEGIN IMMEDIATE` transaction.
    ///
    /// The write lock is taken up front, so concurrent writers queue on the
    /// busy timeout instead of failing on lock upgrade. Any error rolls
    /// the whole transaction back.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or a connection or commit error.
    #[instrument(skip(self, f))]
    pub fn write<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, E>,
        E: From<DbError> + From<diesel::result::Error>,
    {
        let mut conn = self.connection()?;
        conn.immediate_transaction(f)
    }
}
