//! In-place edits to plan text

use super::parser::parse_exercise_line;

/// Outcome of [`set_exercise_weight`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightEdit {
    /// The rewritten plan text
    pub text: String,
    /// Number of exercise lines whose load was replaced
    pub lines_changed: usize,
}

/// Replace the load of every exercise named `exercise_name` with `weight_kg`
///
/// Names match case-insensitively. Only the load token after `@` changes;
/// rest, notes and line endings are kept as written. Stored workouts pick up
/// the new weight the next time the plan is generated.
pub fn set_exercise_weight(plan_text: &str, exercise_name: &str, weight_kg: f64) -> WeightEdit {
    let target = exercise_name.trim();
    let replacement = format!("{}kg", weight_kg);
    let mut lines_changed = 0;

    let lines: Vec<String> = plan_text
        .split('\n')
        .map(|line| match parse_exercise_line(line) {
            Some(exercise) if exercise.name.eq_ignore_ascii_case(target) => {
                lines_changed += 1;
                let mut edited = String::with_capacity(line.len() + replacement.len());
                edited.push_str(&line[..exercise.load_span.start]);
                edited.push_str(&replacement);
                edited.push_str(&line[exercise.load_span.end..]);
                edited
            }
            _ => line.to_string(),
        })
        .collect();

    WeightEdit {
        text: lines.join("\n"),
        lines_changed,
    }
}
