//! Repository for exercise records

use chrono::{DateTime, Utc};
use ironplan_core::{Exercise, NewExercise};
use rusqlite::{params, Connection, Row};

use super::parse_timestamp;
use crate::{Error, Result};

/// Repository for managing exercise records
pub struct ExerciseRepository<'c> {
    conn: &'c Connection,
}

impl<'c> ExerciseRepository<'c> {
    /// Create a new repository
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Insert exercises for a workout
    ///
    /// Not atomic on its own; callers wrap it in a transaction.
    pub fn insert_all(
        &self,
        workout_id: i64,
        exercises: &[NewExercise],
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO exercises (
                workout_id, order_index, title, reps_json, weight_kg,
                is_bodyweight, rest_seconds, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;

        let created_at = created_at.to_rfc3339();
        for exercise in exercises {
            let reps_json = serde_json::to_string(&exercise.reps)?;
            stmt.execute(params![
                workout_id,
                exercise.order_index,
                exercise.title,
                reps_json,
                exercise.weight_kg,
                exercise.is_bodyweight,
                exercise.rest_seconds,
                exercise.notes,
                created_at,
            ])?;
        }

        Ok(())
    }

    /// Delete every exercise of a workout
    pub fn delete_by_workout(&self, workout_id: i64) -> Result<usize> {
        let count = self.conn.execute(
            "DELETE FROM exercises WHERE workout_id = ?1",
            params![workout_id],
        )?;
        Ok(count)
    }

    /// Find a workout's exercises in order
    pub fn find_by_workout(&self, workout_id: i64) -> Result<Vec<Exercise>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, workout_id, order_index, title, reps_json, weight_kg,
                    is_bodyweight, rest_seconds, notes, created_at
             FROM exercises
             WHERE workout_id = ?1
             ORDER BY order_index",
        )?;

        let mut rows = stmt.query(params![workout_id])?;

        let mut exercises = Vec::new();
        while let Some(row) = rows.next()? {
            exercises.push(Self::row_to_exercise(row)?);
        }

        Ok(exercises)
    }

    /// Convert a database row to an Exercise
    fn row_to_exercise(row: &Row) -> Result<Exercise> {
        let reps_json: String = row.get(4)?;
        let created_at: String = row.get(9)?;

        let reps: Vec<u32> = serde_json::from_str(&reps_json)
            .map_err(|e| Error::InvalidData(format!("Invalid reps_json: {}", e)))?;

        Ok(Exercise {
            id: row.get(0)?,
            workout_id: row.get(1)?,
            order_index: row.get(2)?,
            title: row.get(3)?,
            reps,
            weight_kg: row.get(5)?,
            is_bodyweight: row.get(6)?,
            rest_seconds: row.get(7)?,
            notes: row.get(8)?,
            created_at: parse_timestamp(&created_at, "created_at")?,
        })
    }
}
