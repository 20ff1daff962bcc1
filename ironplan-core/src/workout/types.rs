//! Stored workout records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::plan::ParsedExercise;

/// One day of a plan, unique per `(plan_id, day)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: i64,
    pub plan_id: i64,
    pub day: u32,
    pub muscle_group: String,
    pub created_at: DateTime<Utc>,
}

/// A stored exercise, unique per `(workout_id, order_index)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub workout_id: i64,
    /// 1-based position within the workout
    pub order_index: u32,
    pub title: String,
    /// Reps for each set; its length is the set count
    pub reps: Vec<u32>,
    pub weight_kg: Option<f64>,
    pub is_bodyweight: bool,
    pub rest_seconds: Option<u32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    /// The insertable content of this row, without ID and timestamps
    pub fn content(&self) -> NewExercise {
        NewExercise {
            order_index: self.order_index,
            title: self.title.clone(),
            reps: self.reps.clone(),
            weight_kg: self.weight_kg,
            is_bodyweight: self.is_bodyweight,
            rest_seconds: self.rest_seconds,
            notes: self.notes.clone(),
        }
    }
}

/// Exercise values handed to the store for insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExercise {
    pub order_index: u32,
    pub title: String,
    pub reps: Vec<u32>,
    pub weight_kg: Option<f64>,
    pub is_bodyweight: bool,
    pub rest_seconds: Option<u32>,
    pub notes: Option<String>,
}

impl NewExercise {
    /// Build the row for the exercise at `order_index` (1-based) of a day
    pub fn from_parsed(order_index: u32, parsed: &ParsedExercise) -> Self {
        Self {
            order_index,
            title: parsed.name.clone(),
            reps: parsed.reps_sequence(),
            weight_kg: parsed.weight_kg,
            is_bodyweight: parsed.is_bodyweight,
            rest_seconds: parsed.rest_seconds,
            notes: parsed.notes.clone(),
        }
    }
}

/// A workout with its exercises in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDetail {
    pub workout: Workout,
    pub exercises: Vec<Exercise>,
}
