//! Plan text handling
//!
//! Parses free-form workout plan text into day blocks and rewrites
//! exercise loads in place.

mod edit;
mod parser;

pub use edit::{set_exercise_weight, WeightEdit};
pub use parser::{parse_day_numbers, parse_plan_text, ParsedDay, ParsedExercise};
