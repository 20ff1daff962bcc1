//! Commands that materialize plan text into stored workouts

use clap::Args;
use ironplan_core::{Config, PlanChange, WorkoutGenerator};
use ironplan_db::{Database, SqliteWorkoutStore};

use super::PlanInput;

/// Open the configured database behind a generator
fn open_generator(config: &Config) -> anyhow::Result<WorkoutGenerator<SqliteWorkoutStore>> {
    let db = Database::open_with(&config.database)
        .map_err(|e| anyhow::anyhow!("Failed to open database: {}", e))?;
    Ok(WorkoutGenerator::new(SqliteWorkoutStore::new(db)))
}

/// Create or replace the workouts of every day in a plan
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    input: PlanInput,
}

impl GenerateArgs {
    /// Execute the generate command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let text = self.input.read()?;
        let generator = open_generator(config)?;

        match generator.generate(self.input.plan_id, &text) {
            Ok(summary) => {
                println!(
                    "Plan {}: {} workout(s) created, {} updated",
                    self.input.plan_id, summary.created, summary.updated
                );
                Ok(())
            }
            Err(e) => {
                if let Some(partial) = e.partial_summary() {
                    eprintln!("Committed before failure: {}", partial);
                }
                Err(e.into())
            }
        }
    }
}

/// Delete workouts whose day was removed from the plan
#[derive(Args, Debug)]
pub struct CleanupArgs {
    #[command(flatten)]
    input: PlanInput,
}

impl CleanupArgs {
    /// Execute the cleanup command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let text = self.input.read()?;
        let removed = open_generator(config)?.cleanup(self.input.plan_id, &text)?;
        println!("Plan {}: removed {} workout(s)", self.input.plan_id, removed);
        Ok(())
    }
}

/// Generate, and prune removed days unless the plan is new
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    input: PlanInput,

    /// The plan was just created, so there is nothing to prune
    #[arg(long)]
    new: bool,
}

impl SyncArgs {
    /// Execute the sync command
    ///
    /// Failures are reported but do not fail the command; re-running sync
    /// after the cause is fixed brings the workouts up to date.
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let text = self.input.read()?;
        let change = if self.new {
            PlanChange::Created
        } else {
            PlanChange::Edited
        };

        let report = open_generator(config)?.sync(self.input.plan_id, &text, change);

        match &report.generation {
            Ok(summary) => println!("Generated: {}", summary),
            Err(e) => eprintln!("Generation failed: {}", e),
        }
        match &report.cleanup {
            Some(Ok(removed)) => println!("Removed: {} workout(s)", removed),
            Some(Err(e)) => eprintln!("Cleanup failed: {}", e),
            None => {}
        }

        if !report.is_ok() {
            eprintln!("Plan text is unchanged; run sync again to retry.");
        }

        Ok(())
    }
}

/// Show stored workouts for a plan
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// ID of the plan
    #[arg(short, long)]
    plan_id: i64,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

impl ShowArgs {
    /// Execute the show command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let generator = open_generator(config)?;
        let workouts = generator.store().plan_workouts(self.plan_id)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&workouts)?);
            return Ok(());
        }

        if workouts.is_empty() {
            println!("No workouts for plan {}.", self.plan_id);
            return Ok(());
        }

        println!("Total workouts for plan {}: {}", self.plan_id, workouts.len());
        for detail in &workouts {
            println!();
            println!(
                "  Day {}: {} ({} exercises)",
                detail.workout.day,
                detail.workout.muscle_group,
                detail.exercises.len()
            );
            for exercise in &detail.exercises {
                let reps = exercise
                    .reps
                    .iter()
                    .map(|r| r.to_string())
                    .collect::<Vec<_>>()
                    .join("/");
                let load = match exercise.weight_kg {
                    Some(kg) if exercise.is_bodyweight => format!("bodyweight + {}kg", kg),
                    Some(kg) => format!("{}kg", kg),
                    None if exercise.is_bodyweight => "bodyweight".to_string(),
                    None => "-".to_string(),
                };
                let rest = exercise
                    .rest_seconds
                    .map(|s| format!(", rest {}s", s))
                    .unwrap_or_default();
                let notes = exercise
                    .notes
                    .as_deref()
                    .map(|n| format!(" ({})", n))
                    .unwrap_or_default();

                println!(
                    "    {}. {} - {} @ {}{}{}",
                    exercise.order_index, exercise.title, reps, load, rest, notes
                );
            }
        }

        Ok(())
    }
}
