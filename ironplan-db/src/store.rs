//! SQLite-backed workout store

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use ironplan_core::{DayWrite, NewExercise, StoreError, WorkoutDetail, WorkoutStore};
use rusqlite::TransactionBehavior;

use crate::repos::{ExerciseRepository, WorkoutRepository};
use crate::{Database, Result};

/// [`WorkoutStore`] over a SQLite [`Database`]
///
/// The connection sits behind a mutex so the store can be shared between
/// threads. Every write runs in its own transaction, so separate stores
/// (or processes) on the same database file stay consistent too.
pub struct SqliteWorkoutStore {
    db: Mutex<Database>,
}

impl SqliteWorkoutStore {
    /// Wrap an open database
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Run `f` with exclusive access to the database
    pub fn with_db<T>(&self, f: impl FnOnce(&mut Database) -> Result<T>) -> Result<T> {
        // A panic mid-transaction rolls the transaction back on unwind,
        // so a poisoned connection is still consistent
        let mut db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut db)
    }

    /// All workouts of a plan with their exercises, ordered by day
    pub fn plan_workouts(&self, plan_id: i64) -> Result<Vec<WorkoutDetail>> {
        self.with_db(|db| {
            let conn = db.connection();
            let exercises = ExerciseRepository::new(conn);

            WorkoutRepository::new(conn)
                .find_by_plan(plan_id)?
                .into_iter()
                .map(|workout| -> Result<WorkoutDetail> {
                    Ok(WorkoutDetail {
                        exercises: exercises.find_by_workout(workout.id)?,
                        workout,
                    })
                })
                .collect()
        })
    }

    /// Create or refill one day's workout
    ///
    /// The transaction is IMMEDIATE so it holds the write lock from the
    /// lookup on; a second connection, even in another process, waits on
    /// the busy timeout instead of racing it to insert the same day.
    fn write(
        &self,
        plan_id: i64,
        day: u32,
        muscle_group: &str,
        exercises: &[NewExercise],
    ) -> Result<DayWrite> {
        self.with_db(|db| {
            let tx = db
                .connection_mut()
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            let now = Utc::now();
            let workouts = WorkoutRepository::new(&tx);
            let repo = ExerciseRepository::new(&tx);

            let written = match workouts.find_by_plan_day(plan_id, day)? {
                Some(workout) => {
                    let removed = repo.delete_by_workout(workout.id)?;
                    repo.insert_all(workout.id, exercises, now)?;
                    tracing::trace!(
                        workout_id = workout.id,
                        removed,
                        inserted = exercises.len(),
                        "Exercises replaced"
                    );
                    DayWrite::Updated(workout)
                }
                None => {
                    let workout = workouts.insert(plan_id, day, muscle_group, now)?;
                    repo.insert_all(workout.id, exercises, now)?;
                    DayWrite::Created(workout)
                }
            };

            tx.commit()?;
            Ok(written)
        })
    }

    fn prune(&self, plan_id: i64, valid_days: &BTreeSet<u32>) -> Result<usize> {
        self.with_db(|db| {
            let tx = db
                .connection_mut()
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            let removed = WorkoutRepository::new(&tx).delete_days_not_in(plan_id, valid_days)?;
            tx.commit()?;
            Ok(removed)
        })
    }
}

impl WorkoutStore for SqliteWorkoutStore {
    fn write_day(
        &self,
        plan_id: i64,
        day: u32,
        muscle_group: &str,
        exercises: &[NewExercise],
    ) -> std::result::Result<DayWrite, StoreError> {
        Ok(self.write(plan_id, day, muscle_group, exercises)?)
    }

    fn delete_workouts_not_in(
        &self,
        plan_id: i64,
        valid_days: &BTreeSet<u32>,
    ) -> std::result::Result<usize, StoreError> {
        Ok(self.prune(plan_id, valid_days)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironplan_core::{Error as CoreError, GenerationSummary, PlanChange, WorkoutGenerator};
    use std::thread;
    use std::time::Duration;

    const PLAN: &str = "Day 1 - Chest\n\
                        1. Barbell Bench Press - 4x8 @ 60kg | 120s rest\n\
                        2. Incline Dumbbell Press - 3x10 @ 22.5kg | 90s (slow negatives)\n\
                        3. Technogym Chest Press - 4x10 @ 55kg| 90s | 90s\n\
                        Day 2 - Back\n\
                        1. Pull-ups - 2x1 @ bodyweight | 120s rest (regular)\n\
                        2. Seated Row - 3x12 @ 45kg\n\
                        Day 3 - Legs\n\
                        1. Squat - 5x5 @ 100kg | 180s\n";

    /// Aborts any insert of an exercise titled "Explode"
    const FAILING_INSERT_TRIGGER: &str = "CREATE TRIGGER fail_explode BEFORE INSERT ON exercises
         WHEN NEW.title = 'Explode'
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;";

    fn generator() -> WorkoutGenerator<SqliteWorkoutStore> {
        WorkoutGenerator::new(SqliteWorkoutStore::new(Database::in_memory().unwrap()))
    }

    fn contents(store: &SqliteWorkoutStore, plan_id: i64) -> Vec<(u32, Vec<NewExercise>)> {
        store
            .plan_workouts(plan_id)
            .unwrap()
            .into_iter()
            .map(|detail| {
                let exercises = detail.exercises.iter().map(|e| e.content()).collect();
                (detail.workout.day, exercises)
            })
            .collect()
    }

    #[test]
    fn test_generate_persists_parsed_plan() {
        let generator = generator();
        let summary = generator.generate(23, PLAN).unwrap();
        assert_eq!(summary, GenerationSummary { created: 3, updated: 0 });

        let workouts = generator.store().plan_workouts(23).unwrap();
        assert_eq!(workouts.len(), 3);
        assert_eq!(workouts[1].workout.muscle_group, "Back");

        let press = &workouts[0].exercises[2];
        assert_eq!(press.title, "Technogym Chest Press");
        assert_eq!(press.reps, vec![10, 10, 10, 10]);
        assert_eq!(press.weight_kg, Some(55.0));
        assert!(!press.is_bodyweight);
        assert_eq!(press.rest_seconds, Some(90));
        assert_eq!(press.notes, None);

        let pull_ups = &workouts[1].exercises[0];
        assert!(pull_ups.is_bodyweight);
        assert_eq!(pull_ups.weight_kg, None);
        assert_eq!(pull_ups.rest_seconds, Some(120));
        assert_eq!(pull_ups.notes.as_deref(), Some("regular"));
    }

    #[test]
    fn test_regeneration_is_idempotent() {
        let generator = generator();
        generator.generate(23, PLAN).unwrap();
        let first = contents(generator.store(), 23);

        let summary = generator.generate(23, PLAN).unwrap();
        assert_eq!(summary, GenerationSummary { created: 0, updated: 3 });
        assert_eq!(contents(generator.store(), 23), first);
    }

    #[test]
    fn test_order_index_is_contiguous_after_edit() {
        let generator = generator();
        generator.generate(23, PLAN).unwrap();

        let edited = PLAN.replace(
            "2. Incline Dumbbell Press - 3x10 @ 22.5kg | 90s (slow negatives)\n",
            "",
        );
        generator.generate(23, &edited).unwrap();

        for detail in generator.store().plan_workouts(23).unwrap() {
            let indexes: Vec<u32> = detail.exercises.iter().map(|e| e.order_index).collect();
            let expected: Vec<u32> = (1..=detail.exercises.len() as u32).collect();
            assert_eq!(indexes, expected);
        }

        let chest = &generator.store().plan_workouts(23).unwrap()[0];
        let titles: Vec<&str> = chest.exercises.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Barbell Bench Press", "Technogym Chest Press"]);
    }

    #[test]
    fn test_cleanup_removes_dropped_day() {
        let generator = generator();
        generator.generate(23, PLAN).unwrap();
        let before = contents(generator.store(), 23);

        let edited = "Day 1 - Chest\n\
                      1. Barbell Bench Press - 4x8 @ 60kg | 120s rest\n\
                      Day 3 - Legs\n";
        let removed = generator.cleanup(23, edited).unwrap();
        assert_eq!(removed, 1);

        let after = contents(generator.store(), 23);
        assert_eq!(after.len(), 2);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[1], before[2]);

        // Exercises of the deleted workout are gone as well
        let orphans: i64 = generator
            .store()
            .with_db(|db| {
                Ok(db.connection().query_row(
                    "SELECT COUNT(*) FROM exercises
                     WHERE workout_id NOT IN (SELECT id FROM workouts)",
                    [],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_failed_replace_keeps_previous_exercises() {
        let generator = generator();
        generator.generate(23, PLAN).unwrap();
        let before = contents(generator.store(), 23);

        generator
            .store()
            .with_db(|db| Ok(db.connection().execute_batch(FAILING_INSERT_TRIGGER)?))
            .unwrap();

        // Day 1 replaces fine; day 2 deletes its rows, then the second insert aborts
        let edited = PLAN.replace("2. Seated Row - 3x12 @ 45kg", "2. Explode - 3x12 @ 45kg");
        let err = generator.generate(23, &edited).unwrap_err();

        match err {
            CoreError::Generation { day, partial, .. } => {
                assert_eq!(day, 2);
                assert_eq!(partial, GenerationSummary { created: 0, updated: 1 });
            }
            other => panic!("unexpected error: {other}"),
        }

        let after = contents(generator.store(), 23);
        assert_eq!(after, before);
        assert_eq!(after[1].1.len(), 2);
    }

    #[test]
    fn test_failed_create_leaves_no_workout() {
        let generator = generator();
        generator
            .store()
            .with_db(|db| Ok(db.connection().execute_batch(FAILING_INSERT_TRIGGER)?))
            .unwrap();

        let plan = "Day 1 - Arms\n1. Curl - 3x12 @ 12kg\n2. Explode - 1x1 @ 1kg\n";
        let err = generator.generate(5, plan).unwrap_err();
        assert_eq!(err.partial_summary(), Some(GenerationSummary::default()));
        assert!(generator.store().plan_workouts(5).unwrap().is_empty());
    }

    #[test]
    fn test_sync_after_edit() {
        let generator = generator();
        let report = generator.sync(23, PLAN, PlanChange::Created);
        assert!(report.is_ok());

        let edited = "Day 1 - Chest\n\
                      1. Barbell Bench Press - 4x8 @ 62.5kg\n\
                      Day 3 - Legs\n\
                      1. Squat - 5x5 @ 100kg\n";
        let report = generator.sync(23, edited, PlanChange::Edited);
        assert!(report.is_ok());
        assert_eq!(*report.cleanup.unwrap().as_ref().unwrap(), 1);

        let workouts = generator.store().plan_workouts(23).unwrap();
        let days: Vec<u32> = workouts.iter().map(|d| d.workout.day).collect();
        assert_eq!(days, vec![1, 3]);
        assert_eq!(workouts[0].exercises[0].weight_kg, Some(62.5));
    }

    #[test]
    fn test_plans_generate_in_parallel() {
        let generator = generator();

        thread::scope(|scope| {
            for plan_id in 1..=4 {
                let generator = &generator;
                scope.spawn(move || {
                    for _ in 0..3 {
                        generator.generate(plan_id, PLAN).unwrap();
                    }
                });
            }
        });

        let expected = contents(generator.store(), 1);
        assert_eq!(expected.len(), 3);
        for plan_id in 2..=4 {
            assert_eq!(contents(generator.store(), plan_id), expected);
        }
    }

    #[test]
    fn test_same_plan_concurrent_generation_converges() {
        let generator = generator();

        thread::scope(|scope| {
            for _ in 0..4 {
                let generator = &generator;
                scope.spawn(move || {
                    generator.generate(9, PLAN).unwrap();
                });
            }
        });

        let workouts = generator.store().plan_workouts(9).unwrap();
        assert_eq!(workouts.len(), 3);
        assert_eq!(workouts[0].exercises.len(), 3);
    }

    #[test]
    fn test_separate_connections_do_not_race_on_create() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("ironplan.db");
        Database::open_at(&path).unwrap();

        let plan: String = (1..=20)
            .map(|day| format!("Day {day} - Block {day}\n1. Squat - 5x5 @ 100kg\n"))
            .collect();

        // Each thread owns its own connection and generator, like two CLI runs
        thread::scope(|scope| {
            for _ in 0..2 {
                let (path, plan) = (&path, &plan);
                scope.spawn(move || {
                    let db = Database::open_at(path).unwrap();
                    db.set_busy_timeout(Duration::from_secs(10)).unwrap();
                    let generator = WorkoutGenerator::new(SqliteWorkoutStore::new(db));
                    for plan_id in 1..=10 {
                        generator.generate(plan_id, plan).unwrap();
                    }
                });
            }
        });

        let store = SqliteWorkoutStore::new(Database::open_at(&path).unwrap());
        for plan_id in 1..=10 {
            let workouts = store.plan_workouts(plan_id).unwrap();
            assert_eq!(workouts.len(), 20);
            assert!(workouts.iter().all(|d| d.exercises.len() == 1));
        }
    }
}
