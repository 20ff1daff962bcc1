//! Generate stored workouts from plan text

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::locks::PlanLocks;
use super::store::{DayWrite, WorkoutStore};
use super::types::NewExercise;
use crate::plan::{parse_day_numbers, parse_plan_text, ParsedDay};
use crate::{Error, Result, StoreError};

/// Counts from one generation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Workouts created for days seen for the first time
    pub created: usize,
    /// Existing workouts whose exercises were replaced
    pub updated: usize,
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} created, {} updated", self.created, self.updated)
    }
}

/// Why a plan's text was saved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanChange {
    /// First save of a new plan; nothing can have been removed yet
    Created,
    /// Edit of an existing plan; days may have been removed
    Edited,
}

/// Outcome of [`WorkoutGenerator::sync`]
///
/// Each step reports its own result. A failed step does not undo the plan
/// save; running the sync again later repairs the stored workouts.
#[derive(Debug)]
pub struct SyncReport {
    pub generation: Result<GenerationSummary>,
    /// `None` when cleanup was not needed for this change
    pub cleanup: Option<Result<usize>>,
}

impl SyncReport {
    /// Whether every step that ran succeeded
    pub fn is_ok(&self) -> bool {
        self.generation.is_ok() && !matches!(self.cleanup, Some(Err(_)))
    }
}

/// Materializes plan text into workouts through a [`WorkoutStore`]
///
/// Calls for the same plan are serialized; calls for different plans may run
/// concurrently from any number of threads.
#[derive(Debug)]
pub struct WorkoutGenerator<S> {
    store: S,
    locks: PlanLocks,
}

impl<S: WorkoutStore> WorkoutGenerator<S> {
    /// Create a generator over a store
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: PlanLocks::new(),
        }
    }

    /// Get the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create or fully replace the workout of every day in the plan text
    ///
    /// Days are written one at a time in the order they appear. A failing day
    /// aborts the pass with [`Error::Generation`]; days already written stay
    /// committed and the failing day keeps its previous exercises.
    pub fn generate(&self, plan_id: i64, plan_text: &str) -> Result<GenerationSummary> {
        self.locks
            .with_plan(plan_id, || self.generate_locked(plan_id, plan_text))
    }

    /// Delete the plan's workouts whose day header no longer appears in the text
    pub fn cleanup(&self, plan_id: i64, plan_text: &str) -> Result<usize> {
        self.locks
            .with_plan(plan_id, || self.cleanup_locked(plan_id, plan_text))
    }

    /// Bring stored workouts in line with freshly saved plan text
    ///
    /// Generates every day, then prunes removed days when the plan was edited.
    /// Failures are logged and reported, never raised.
    pub fn sync(&self, plan_id: i64, plan_text: &str, change: PlanChange) -> SyncReport {
        self.locks.with_plan(plan_id, || {
            let generation = self.generate_locked(plan_id, plan_text);
            if let Err(e) = &generation {
                warn!(plan_id, error = %e, "Workout generation failed; plan text was still saved");
            }

            let cleanup = match change {
                PlanChange::Created => None,
                PlanChange::Edited => {
                    let result = self.cleanup_locked(plan_id, plan_text);
                    if let Err(e) = &result {
                        warn!(
                            plan_id,
                            error = %e,
                            "Workout cleanup failed; plan text was still saved"
                        );
                    }
                    Some(result)
                }
            };

            SyncReport {
                generation,
                cleanup,
            }
        })
    }

    fn generate_locked(&self, plan_id: i64, plan_text: &str) -> Result<GenerationSummary> {
        let days = parse_plan_text(plan_text);
        info!(plan_id, days = days.len(), "Generating workouts");

        let mut summary = GenerationSummary::default();
        for day in &days {
            let created = self
                .write_day(plan_id, day)
                .map_err(|source| Error::Generation {
                    plan_id,
                    day: day.day,
                    partial: summary,
                    source,
                })?;

            if created {
                summary.created += 1;
            } else {
                summary.updated += 1;
            }
        }

        info!(
            plan_id,
            created = summary.created,
            updated = summary.updated,
            "Generated workouts"
        );
        Ok(summary)
    }

    /// Write one day; returns true when the workout was newly created
    fn write_day(&self, plan_id: i64, day: &ParsedDay) -> std::result::Result<bool, StoreError> {
        let exercises = day_exercises(day);

        // The stored label is left as first generated; only exercises follow the text
        let written = self
            .store
            .write_day(plan_id, day.day, &day.muscle_group, &exercises)?;
        let created = matches!(written, DayWrite::Created(_));

        debug!(
            plan_id,
            day = day.day,
            workout_id = written.workout().id,
            exercises = exercises.len(),
            created,
            "Wrote workout"
        );
        Ok(created)
    }

    fn cleanup_locked(&self, plan_id: i64, plan_text: &str) -> Result<usize> {
        let valid_days = parse_day_numbers(plan_text);
        let removed = self
            .store
            .delete_workouts_not_in(plan_id, &valid_days)
            .map_err(|source| Error::Cleanup { plan_id, source })?;

        info!(plan_id, removed, kept_days = valid_days.len(), "Cleaned up removed workouts");
        Ok(removed)
    }
}

/// Rows for a day's exercises, numbered from 1 in written order
fn day_exercises(day: &ParsedDay) -> Vec<NewExercise> {
    (1..)
        .zip(&day.exercises)
        .map(|(order_index, parsed)| NewExercise::from_parsed(order_index, parsed))
        .collect()
}
