//! Database connection and initialization

use std::path::{Path, PathBuf};
use std::time::Duration;

use ironplan_core::DatabaseConfig;
use rusqlite::Connection;

use crate::{Error, Result};

/// Database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the default location
    ///
    /// Location: `~/.cache/ironplan/ironplan.db`
    pub fn open() -> Result<Self> {
        let path = Self::default_path()?;
        Self::open_at(&path)
    }

    /// Open the database described by a config section
    pub fn open_with(config: &DatabaseConfig) -> Result<Self> {
        let path = config.resolved_path().ok_or_else(|| {
            Error::InvalidData("Failed to determine database path".to_string())
        })?;
        let db = Self::open_at(&path)?;
        db.set_busy_timeout(config.busy_timeout)?;
        Ok(db)
    }

    /// Open or create database at a specific path
    pub fn open_at(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::InvalidData(format!("Failed to create database directory: {}", e))
            })?;
        }

        let conn = Connection::open(path)?;
        // Another connection may be writing; wait for it even during setup
        conn.busy_timeout(DatabaseConfig::default().busy_timeout)?;
        let mut db = Self { conn };
        db.initialize()?;
        tracing::debug!(path = %path.display(), "Opened database");
        Ok(db)
    }

    /// Create an in-memory database for testing
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Get the default database path
    ///
    /// Returns `~/.cache/ironplan/ironplan.db`
    pub fn default_path() -> Result<PathBuf> {
        DatabaseConfig::default()
            .resolved_path()
            .ok_or_else(|| Error::InvalidData("Failed to determine cache directory".to_string()))
    }

    /// How long to wait on a database locked by another process
    pub fn set_busy_timeout(&self, timeout: Duration) -> Result<()> {
        self.conn.busy_timeout(timeout)?;
        Ok(())
    }

    /// Initialize database schema
    fn initialize(&mut self) -> Result<()> {
        // Exercises are removed with their workout through ON DELETE CASCADE
        self.conn.execute("PRAGMA foreign_keys = ON", [])?;

        // Create workouts table
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS workouts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                plan_id INTEGER NOT NULL,
                day INTEGER NOT NULL,
                muscle_group TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(plan_id, day)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_workouts_plan
             ON workouts(plan_id)",
            [],
        )?;

        // Create exercises table
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workout_id INTEGER NOT NULL,
                order_index INTEGER NOT NULL,
                title TEXT NOT NULL,
                reps_json TEXT NOT NULL,
                weight_kg REAL,
                is_bodyweight INTEGER NOT NULL DEFAULT 0,
                rest_seconds INTEGER,
                notes TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (workout_id) REFERENCES workouts(id) ON DELETE CASCADE,
                UNIQUE(workout_id, order_index)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_exercises_workout
             ON exercises(workout_id, order_index)",
            [],
        )?;

        Ok(())
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Get a mutable reference to the underlying connection
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}
