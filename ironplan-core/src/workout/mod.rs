//! Workout reconciliation
//!
//! Keeps stored workouts and exercises in step with the latest plan text.
//! Stored rows are derived state: every generation pass replaces a day's
//! exercises wholesale, and cleanup deletes days whose header is gone.

mod generator;
mod locks;
mod store;
mod types;

pub use generator::{GenerationSummary, PlanChange, SyncReport, WorkoutGenerator};
pub use locks::PlanLocks;
pub use store::{DayWrite, WorkoutStore};
pub use types::{Exercise, NewExercise, Workout, WorkoutDetail};
