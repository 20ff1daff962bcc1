//! Database layer for Ironplan
//!
//! SQLite persistence for workouts and exercises generated from plan text.

pub mod connection;
pub mod error;
pub mod repos;
pub mod store;

pub use connection::Database;
pub use error::{Error, Result};
pub use repos::{ExerciseRepository, WorkoutRepository};
pub use store::SqliteWorkoutStore;
