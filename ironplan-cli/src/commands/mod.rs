//! CLI command implementations

pub mod plan;
pub mod workouts;

pub use plan::{ParseArgs, SetWeightArgs};
pub use workouts::{CleanupArgs, GenerateArgs, ShowArgs, SyncArgs};

use std::path::{Path, PathBuf};

use clap::Args;

/// A plan ID together with the file holding its text
#[derive(Args, Debug)]
pub struct PlanInput {
    /// ID of the plan the text belongs to
    #[arg(short, long)]
    pub plan_id: i64,

    /// Path to plan text file
    #[arg(short, long)]
    pub file: PathBuf,
}

impl PlanInput {
    /// Read the plan text
    pub fn read(&self) -> anyhow::Result<String> {
        read_plan_file(&self.file)
    }
}

/// Read plan text from a file
pub fn read_plan_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read plan file {}: {}", path.display(), e))
}
