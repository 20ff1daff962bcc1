//! Ironplan Core - turns human-written workout plan text into structured workouts
//!
//! Plan text is the single source of truth. Workouts and exercises are
//! derived from it and fully regenerated on every pass, so any direct edit
//! to a stored exercise is discarded the next time the plan is generated.
//! The mapping is one way: text to rows, never rows to text.

pub mod config;
pub mod error;
pub mod plan;
pub mod workout;

pub use config::{Config, DatabaseConfig};
pub use error::{Error, Result, StoreError};
pub use plan::{
    parse_day_numbers, parse_plan_text, set_exercise_weight, ParsedDay, ParsedExercise,
    WeightEdit,
};
pub use workout::{
    DayWrite, Exercise, GenerationSummary, NewExercise, PlanChange, PlanLocks, SyncReport,
    Workout, WorkoutDetail, WorkoutGenerator, WorkoutStore,
};
