//! Plan text commands that never touch the database

use std::path::PathBuf;

use clap::Args;
use ironplan_core::{parse_plan_text, set_exercise_weight};

use super::read_plan_file;

/// Parse plan text and print the day blocks
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Path to plan text file
    #[arg(short, long)]
    file: PathBuf,

    /// Print JSON instead of a summary
    #[arg(long)]
    json: bool,
}

impl ParseArgs {
    /// Execute the parse command
    pub fn execute(&self, verbose: bool) -> anyhow::Result<()> {
        let text = read_plan_file(&self.file)?;
        let days = parse_plan_text(&text);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&days)?);
            return Ok(());
        }

        let total: usize = days.iter().map(|d| d.exercises.len()).sum();
        println!(
            "Parsed {}: {} days, {} exercises",
            self.file.display(),
            days.len(),
            total
        );
        println!();

        for day in &days {
            println!("  Day {}: {} ({} exercises)", day.day, day.muscle_group, day.exercises.len());
            if !verbose {
                continue;
            }
            for (i, exercise) in day.exercises.iter().enumerate() {
                let load = match (exercise.is_bodyweight, exercise.weight_kg) {
                    (true, Some(kg)) => format!("bodyweight + {}kg", kg),
                    (true, None) => "bodyweight".to_string(),
                    (false, Some(kg)) => format!("{}kg", kg),
                    (false, None) => "-".to_string(),
                };
                println!(
                    "    {}. {} {}x{} @ {}",
                    i + 1,
                    exercise.name,
                    exercise.sets,
                    exercise.reps,
                    load
                );
            }
        }

        Ok(())
    }
}

/// Change the load of an exercise in plan text
#[derive(Args, Debug)]
pub struct SetWeightArgs {
    /// Path to plan text file
    #[arg(short, long)]
    file: PathBuf,

    /// Exercise name (case-insensitive)
    #[arg(short, long)]
    exercise: String,

    /// New weight in kilograms
    #[arg(long, value_parser = parse_weight)]
    kg: f64,

    /// Rewrite the file in place instead of printing the result
    #[arg(long)]
    write: bool,
}

impl SetWeightArgs {
    /// Execute the set-weight command
    pub fn execute(&self) -> anyhow::Result<()> {
        let text = read_plan_file(&self.file)?;
        let edit = set_exercise_weight(&text, &self.exercise, self.kg);

        if edit.lines_changed == 0 {
            anyhow::bail!("No exercise named '{}' in {}", self.exercise, self.file.display());
        }

        if self.write {
            std::fs::write(&self.file, &edit.text)?;
            eprintln!(
                "Updated {} line(s) in {}; run `ironplan sync` to regenerate workouts",
                edit.lines_changed,
                self.file.display()
            );
        } else {
            print!("{}", edit.text);
        }

        Ok(())
    }
}

fn parse_weight(s: &str) -> Result<f64, String> {
    let kg: f64 = s.parse().map_err(|e| format!("invalid weight: {}", e))?;
    if kg.is_finite() && kg >= 0.0 {
        Ok(kg)
    } else {
        Err("weight must be a non-negative number".to_string())
    }
}
