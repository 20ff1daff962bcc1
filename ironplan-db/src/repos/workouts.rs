//! Repository for workout records

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use ironplan_core::Workout;
use rusqlite::{params, params_from_iter, Connection, Row};

use super::parse_timestamp;
use crate::Result;

const WORKOUT_COLUMNS: &str = "id, plan_id, day, muscle_group, created_at";

/// Repository for managing workout records
pub struct WorkoutRepository<'c> {
    conn: &'c Connection,
}

impl<'c> WorkoutRepository<'c> {
    /// Create a new repository
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Insert a new workout record
    pub fn insert(
        &self,
        plan_id: i64,
        day: u32,
        muscle_group: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Workout> {
        self.conn.execute(
            "INSERT INTO workouts (plan_id, day, muscle_group, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![plan_id, day, muscle_group, created_at.to_rfc3339()],
        )?;

        Ok(Workout {
            id: self.conn.last_insert_rowid(),
            plan_id,
            day,
            muscle_group: muscle_group.to_string(),
            created_at,
        })
    }

    /// Find the workout for one day of a plan
    pub fn find_by_plan_day(&self, plan_id: i64, day: u32) -> Result<Option<Workout>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts WHERE plan_id = ?1 AND day = ?2"
        ))?;

        let mut rows = stmt.query(params![plan_id, day])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::row_to_workout(row)?))
        } else {
            Ok(None)
        }
    }

    /// Find all workouts of a plan, ordered by day
    pub fn find_by_plan(&self, plan_id: i64) -> Result<Vec<Workout>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts WHERE plan_id = ?1 ORDER BY day"
        ))?;

        let mut rows = stmt.query(params![plan_id])?;

        let mut workouts = Vec::new();
        while let Some(row) = rows.next()? {
            workouts.push(Self::row_to_workout(row)?);
        }

        Ok(workouts)
    }

    /// Delete the plan's workouts whose day is not in `days`
    ///
    /// Exercises go with them through the foreign key cascade.
    pub fn delete_days_not_in(&self, plan_id: i64, days: &BTreeSet<u32>) -> Result<usize> {
        if days.is_empty() {
            let count = self
                .conn
                .execute("DELETE FROM workouts WHERE plan_id = ?1", params![plan_id])?;
            return Ok(count);
        }

        let placeholders = (0..days.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let sql =
            format!("DELETE FROM workouts WHERE plan_id = ?1 AND day NOT IN ({placeholders})");

        let values = std::iter::once(plan_id).chain(days.iter().map(|day| i64::from(*day)));
        let count = self.conn.execute(&sql, params_from_iter(values))?;
        Ok(count)
    }

    /// Convert a database row to a Workout
    fn row_to_workout(row: &Row) -> Result<Workout> {
        let created_at: String = row.get(4)?;

        Ok(Workout {
            id: row.get(0)?,
            plan_id: row.get(1)?,
            day: row.get(2)?,
            muscle_group: row.get(3)?,
            created_at: parse_timestamp(&created_at, "created_at")?,
        })
    }
}
