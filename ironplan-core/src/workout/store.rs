//! Persistence boundary used by the generator

use std::collections::BTreeSet;

use crate::StoreError;

use super::types::{NewExercise, Workout};

/// What [`WorkoutStore::write_day`] did to a day's workout
#[derive(Debug, Clone, PartialEq)]
pub enum DayWrite {
    /// No workout existed for the day, so one was created
    Created(Workout),
    /// The existing workout kept its row and label; its exercises were replaced
    Updated(Workout),
}

impl DayWrite {
    /// The workout that was written
    pub fn workout(&self) -> &Workout {
        match self {
            Self::Created(workout) | Self::Updated(workout) => workout,
        }
    }
}

/// Storage for workouts and their exercises
///
/// `write_day` must be atomic and must exclude other writers to the same
/// plan, including ones in other processes: the lookup and the write
/// happen as one unit, and a failure part way through leaves no trace.
pub trait WorkoutStore {
    /// Create the workout for one day of a plan with its exercises, or, if
    /// it already exists, delete its exercises and insert `exercises` in
    /// their place
    fn write_day(
        &self,
        plan_id: i64,
        day: u32,
        muscle_group: &str,
        exercises: &[NewExercise],
    ) -> Result<DayWrite, StoreError>;

    /// Delete the plan's workouts whose day is not in `valid_days`, with
    /// their exercises. Returns how many workouts were deleted.
    fn delete_workouts_not_in(
        &self,
        plan_id: i64,
        valid_days: &BTreeSet<u32>,
    ) -> Result<usize, StoreError>;
}

impl<S: WorkoutStore + ?Sized> WorkoutStore for &S {
    fn write_day(
        &self,
        plan_id: i64,
        day: u32,
        muscle_group: &str,
        exercises: &[NewExercise],
    ) -> Result<DayWrite, StoreError> {
        (**self).write_day(plan_id, day, muscle_group, exercises)
    }

    fn delete_workouts_not_in(
        &self,
        plan_id: i64,
        valid_days: &BTreeSet<u32>,
    ) -> Result<usize, StoreError> {
        (**self).delete_workouts_not_in(plan_id, valid_days)
    }
}
