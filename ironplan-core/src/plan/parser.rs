//! Plan text parser
//!
//! The grammar is line oriented and keywords are case-insensitive:
//!
//! ```text
//! Day 1 - Chest:
//! 1. Bench Press - 4x8 @ 60kg | 90s rest (pause at the bottom)
//! 2. Push-ups - 3x15 @ bodyweight
//! ```
//!
//! Anything that is neither a day header nor an exercise line is skipped,
//! so parsing never fails.

use std::collections::BTreeSet;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Largest set or rep count an exercise line may prescribe
const MAX_PRESCRIPTION: u32 = 1000;

/// One day block of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDay {
    /// Day number from the header (1-based)
    pub day: u32,
    /// Label after the dash in the header, e.g. "Chest"
    pub muscle_group: String,
    /// Exercises in the order they were written
    pub exercises: Vec<ParsedExercise>,
}

/// One exercise line of a day block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedExercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    /// External load; may be present alongside `is_bodyweight`
    pub weight_kg: Option<f64>,
    pub is_bodyweight: bool,
    pub rest_seconds: Option<u32>,
    pub notes: Option<String>,
}

impl ParsedExercise {
    /// Reps for each set. The grammar has no per-set reps, so every set is equal.
    pub fn reps_sequence(&self) -> Vec<u32> {
        vec![self.reps; self.sets as usize]
    }
}

/// Load written after the `@` of an exercise line
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Load {
    Bodyweight,
    Kilograms(f64),
}

/// An exercise line as written, before annotations are applied
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExerciseLine<'a> {
    pub name: &'a str,
    pub sets: u32,
    pub reps: u32,
    pub load: Load,
    /// Byte range of the load token (`55kg`, `bodyweight`) within the line
    pub load_span: Range<usize>,
}

/// Values picked up anywhere in a line, independent of the exercise shape
#[derive(Debug, Default, PartialEq)]
struct Annotations {
    rest_seconds: Option<u32>,
    weight_kg: Option<f64>,
    notes: Option<String>,
}

enum Line {
    Header { day: u32, label: String },
    Exercise(ParsedExercise),
    Other,
}

/// Parse plan text into its day blocks
///
/// A later header repeating a day number replaces the earlier block (label
/// and exercises) in place; blocks are never merged.
pub fn parse_plan_text(text: &str) -> Vec<ParsedDay> {
    let (mut days, open) = text.lines().map(classify_line).fold(
        (Vec::new(), None::<ParsedDay>),
        |(mut days, open), line| match line {
            Line::Header { day, label } => {
                if let Some(finished) = open {
                    close_day(&mut days, finished);
                }
                let next = ParsedDay {
                    day,
                    muscle_group: label,
                    exercises: Vec::new(),
                };
                (days, Some(next))
            }
            // Exercises before the first header have no day to land in
            Line::Exercise(exercise) => {
                let open = open.map(|mut day| {
                    day.exercises.push(exercise);
                    day
                });
                (days, open)
            }
            Line::Other => (days, open),
        },
    );

    if let Some(finished) = open {
        close_day(&mut days, finished);
    }

    days
}

/// Day numbers of every header in the text, ignoring exercises
pub fn parse_day_numbers(text: &str) -> BTreeSet<u32> {
    text.lines()
        .filter_map(parse_day_header)
        .map(|(day, _)| day)
        .collect()
}

fn close_day(days: &mut Vec<ParsedDay>, finished: ParsedDay) {
    match days.iter_mut().find(|d| d.day == finished.day) {
        Some(earlier) => {
            tracing::warn!(
                day = finished.day,
                "Duplicate day header; the later block replaces the earlier one"
            );
            *earlier = finished;
        }
        None => days.push(finished),
    }
}

fn classify_line(line: &str) -> Line {
    if let Some((day, label)) = parse_day_header(line) {
        return Line::Header { day, label };
    }

    match parse_exercise_line(line) {
        Some(exercise) => Line::Exercise(exercise.into_parsed(scan_annotations(line))),
        None => Line::Other,
    }
}

/// Parse "Day N - Label" with an optional trailing colon
fn parse_day_header(line: &str) -> Option<(u32, String)> {
    let rest = strip_prefix_ignore_case(line.trim(), "day")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let (day, rest) = take_count(rest.trim_start())?;
    let label = rest.trim_start().strip_prefix('-')?.trim();
    let label = label.strip_suffix(':').unwrap_or(label).trim();

    if label.is_empty() {
        None
    } else {
        Some((day, label.to_string()))
    }
}

/// Parse "N. Name - SxR @ load"; anything after the load token is left to
/// [`scan_annotations`]
pub(crate) fn parse_exercise_line(line: &str) -> Option<ExerciseLine<'_>> {
    let (_, rest) = split_leading_digits(line.trim_start())?;
    let body = rest.strip_prefix('.')?.trim_start();

    // Names may contain dashes ("Pull-ups"), so try each one until the
    // text after it reads as a prescription
    body.match_indices('-').find_map(|(idx, _)| {
        let name = body[..idx].trim();
        if name.is_empty() {
            return None;
        }

        let (sets, after) = take_prescription(body[idx + 1..].trim_start())?;
        let after = after.strip_prefix(|c: char| c.eq_ignore_ascii_case(&'x'))?;
        let (reps, after) = take_prescription(after)?;
        let token = after.trim_start().strip_prefix('@')?.trim_start();
        let (load, remainder) = parse_load(token)?;

        // Both slices are suffixes of `line`, so their lengths give offsets
        let load_span = (line.len() - token.len())..(line.len() - remainder.len());

        Some(ExerciseLine {
            name,
            sets,
            reps,
            load,
            load_span,
        })
    })
}

impl ExerciseLine<'_> {
    /// Merge with annotations; an annotated weight wins over the inline one
    fn into_parsed(self, annotations: Annotations) -> ParsedExercise {
        let inline_weight = match self.load {
            Load::Kilograms(kg) => Some(kg),
            Load::Bodyweight => None,
        };

        ParsedExercise {
            name: self.name.to_string(),
            sets: self.sets,
            reps: self.reps,
            weight_kg: annotations.weight_kg.or(inline_weight),
            is_bodyweight: self.load == Load::Bodyweight,
            rest_seconds: annotations.rest_seconds,
            notes: annotations.notes,
        }
    }
}

/// Parse `bodyweight` or `<number>kg`, returning the text after the token
fn parse_load(token: &str) -> Option<(Load, &str)> {
    if let Some(rest) = strip_prefix_ignore_case(token, "bodyweight") {
        if rest.starts_with(char::is_alphanumeric) {
            return None;
        }
        return Some((Load::Bodyweight, rest));
    }

    let (kg, rest) = split_leading_number(token)?;
    let rest = strip_prefix_ignore_case(rest.trim_start(), "kg")?;
    Some((Load::Kilograms(kg), rest))
}

/// Scan a whole line for rest, weight and notes. Only the first match of
/// each counts.
fn scan_annotations(line: &str) -> Annotations {
    Annotations {
        rest_seconds: line
            .split('|')
            .skip(1)
            .find_map(split_rest_segment)
            .and_then(|digits| digits.parse().ok()),
        weight_kg: line.match_indices('@').find_map(|(idx, _)| {
            let (kg, rest) = split_leading_number(line[idx + 1..].trim_start())?;
            strip_prefix_ignore_case(rest.trim_start(), "kg").map(|_| kg)
        }),
        notes: line.match_indices('(').find_map(|(idx, _)| {
            let inner = &line[idx + 1..];
            let close = inner.find(')')?;
            (close > 0).then(|| inner[..close].to_string())
        }),
    }
}

/// Digits of a "90s" / "120s rest" segment. A segment of this shape claims
/// the rest slot even when its number is out of range.
fn split_rest_segment(segment: &str) -> Option<&str> {
    let (digits, rest) = split_leading_digits(segment.trim_start())?;
    rest.starts_with(|c: char| c.eq_ignore_ascii_case(&'s'))
        .then_some(digits)
}

/// Leading positive integer; zero and overflow are malformed
fn take_count(s: &str) -> Option<(u32, &str)> {
    let (digits, rest) = split_leading_digits(s)?;
    let count = digits.parse::<u32>().ok().filter(|n| *n > 0)?;
    Some((count, rest))
}

/// Set or rep count, at most [`MAX_PRESCRIPTION`]
fn take_prescription(s: &str) -> Option<(u32, &str)> {
    take_count(s).filter(|(count, _)| *count <= MAX_PRESCRIPTION)
}

fn split_leading_digits(s: &str) -> Option<(&str, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        None
    } else {
        Some(s.split_at(end))
    }
}

fn split_leading_number(s: &str) -> Option<(f64, &str)> {
    if !s.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, rest) = s.split_at(end);
    let value = number.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some((value, rest))
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PLAN: &str = r#"Upper/lower split, 4 weeks

Day 1 - Chest:
1. Barbell Bench Press - 4x8 @ 60kg | 120s rest
2. Incline Dumbbell Press - 3x10 @ 22.5kg | 90s (slow negatives)
3. Push-ups - 3x15 @ bodyweight
4. Technogym Chest Press - 4x10 @ 55kg| 90s | 90s

Keep the elbows tucked on presses.

Day 2 - Back
1. Pull-ups - 2x1 @ bodyweight | 120s rest (regular)
2. Seated Row - 3x12 @ 45kg
"#;

    #[test]
    fn test_day_segmentation() {
        let days = parse_plan_text(SAMPLE_PLAN);
        assert_eq!(days.len(), 2);

        assert_eq!(days[0].day, 1);
        assert_eq!(days[0].muscle_group, "Chest");
        assert_eq!(days[0].exercises.len(), 4);

        assert_eq!(days[1].day, 2);
        assert_eq!(days[1].muscle_group, "Back");
        let back: Vec<&str> = days[1].exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(back, vec!["Pull-ups", "Seated Row"]);
    }

    #[test]
    fn test_weight_and_repeated_rest() {
        let days =
            parse_plan_text("Day 1 - Chest\n4. Technogym Chest Press - 4x10 @ 55kg| 90s | 90s");
        assert_eq!(
            days[0].exercises[0],
            ParsedExercise {
                name: "Technogym Chest Press".to_string(),
                sets: 4,
                reps: 10,
                weight_kg: Some(55.0),
                is_bodyweight: false,
                rest_seconds: Some(90),
                notes: None,
            }
        );
    }

    #[test]
    fn test_bodyweight_with_rest_and_notes() {
        let days =
            parse_plan_text("Day 2 - Back\n1. Pull-ups - 2x1 @ bodyweight | 120s rest (regular)");
        assert_eq!(
            days[0].exercises[0],
            ParsedExercise {
                name: "Pull-ups".to_string(),
                sets: 2,
                reps: 1,
                weight_kg: None,
                is_bodyweight: true,
                rest_seconds: Some(120),
                notes: Some("regular".to_string()),
            }
        );
    }

    #[test]
    fn test_fractional_weight_and_notes() {
        let days = parse_plan_text(SAMPLE_PLAN);
        let incline = &days[0].exercises[1];
        assert_eq!(incline.weight_kg, Some(22.5));
        assert_eq!(incline.rest_seconds, Some(90));
        assert_eq!(incline.notes.as_deref(), Some("slow negatives"));
    }

    #[test]
    fn test_annotated_weight_on_bodyweight_exercise() {
        let days = parse_plan_text("Day 3 - Arms\n1. Dips - 3x8 @ bodyweight | belt @ 10kg");
        let dips = &days[0].exercises[0];
        assert!(dips.is_bodyweight);
        assert_eq!(dips.weight_kg, Some(10.0));
        assert_eq!(dips.rest_seconds, None);
    }

    #[test]
    fn test_only_first_rest_segment_counts() {
        let days =
            parse_plan_text("Day 1 - Legs\n1. Squat - 5x5 @ 100kg | heavy | 180s | 60s rest");
        assert_eq!(days[0].exercises[0].rest_seconds, Some(180));
    }

    #[test]
    fn test_out_of_range_rest_still_claims_first_slot() {
        let days = parse_plan_text("Day 1 - Legs\n1. Squat - 5x5 @ 100kg | 99999999999s | 60s");
        let squat = &days[0].exercises[0];
        assert_eq!(squat.name, "Squat");
        assert_eq!(squat.rest_seconds, None);
    }

    #[test]
    fn test_huge_set_or_rep_count_is_malformed() {
        let text = "Day 1 - Core\n\
                    1. Plank - 4294967295x1 @ bodyweight\n\
                    2. Crunch - 3x1001 @ bodyweight\n\
                    3. Hollow Hold - 1000x1000 @ bodyweight";
        let days = parse_plan_text(text);
        assert_eq!(days[0].exercises.len(), 1);

        let hold = &days[0].exercises[0];
        assert_eq!(hold.name, "Hollow Hold");
        assert_eq!(hold.sets, MAX_PRESCRIPTION);
        assert_eq!(hold.reps_sequence().len(), 1000);
    }

    #[test]
    fn test_header_is_case_insensitive_and_strips_colon() {
        let days = parse_plan_text("DAY 4 - Shoulders & Arms :\n1. Curl - 3x12 @ 12KG");
        assert_eq!(days[0].day, 4);
        assert_eq!(days[0].muscle_group, "Shoulders & Arms");
        assert_eq!(days[0].exercises[0].weight_kg, Some(12.0));
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let text = "Day 1 - Chest\n\
                    1. Bench Press - 4xten @ 60kg\n\
                    Bench Press - 4x10 @ 60kg\n\
                    2. Flyes - 0x12 @ 10kg\n\
                    3. Cable Cross - 3x12 @ heavy\n\
                    4. Dips - 3x10 @ bodyweight";
        let days = parse_plan_text(text);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].exercises.len(), 1);
        assert_eq!(days[0].exercises[0].name, "Dips");
    }

    #[test]
    fn test_exercises_before_first_header_are_dropped() {
        let days = parse_plan_text("1. Warmup Row - 1x5 @ 20kg\nDay 1 - Back\n1. Row - 3x8 @ 40kg");
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].exercises.len(), 1);
        assert_eq!(days[0].exercises[0].name, "Row");
    }

    #[test]
    fn test_day_without_exercises_is_kept() {
        let days = parse_plan_text("Day 1 - Rest:\nDay 2 - Legs\n1. Squat - 5x5 @ 100kg");
        assert_eq!(days.len(), 2);
        assert!(days[0].exercises.is_empty());
        assert_eq!(days[1].exercises.len(), 1);
    }

    #[test]
    fn test_day_zero_is_not_a_header() {
        let days = parse_plan_text("Day 0 - Nothing\n1. Row - 3x8 @ 40kg");
        assert!(days.is_empty());
    }

    #[test]
    fn test_duplicate_day_last_wins() {
        let text = "Day 1 - Chest\n\
                    1. Bench - 3x5 @ 80kg\n\
                    Day 2 - Back\n\
                    1. Row - 3x8 @ 40kg\n\
                    Day 1 - Push\n\
                    1. Overhead Press - 3x5 @ 40kg\n\
                    2. Dips - 3x10 @ bodyweight";
        let days = parse_plan_text(text);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, 1);
        assert_eq!(days[0].muscle_group, "Push");
        let names: Vec<&str> = days[0].exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Overhead Press", "Dips"]);
        assert_eq!(days[1].day, 2);
    }

    #[test]
    fn test_parse_day_numbers() {
        let days = parse_day_numbers("Day 3 - Legs\nDay 1 - Chest:\nnot a header\nDay 1 - Again");
        assert_eq!(days.into_iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_reps_sequence() {
        let days = parse_plan_text(SAMPLE_PLAN);
        assert_eq!(days[0].exercises[0].reps_sequence(), vec![8, 8, 8, 8]);
    }

    #[test]
    fn test_load_span_covers_token() {
        let line = "  2. Seated Row - 3x12 @ 45 kg | 60s";
        let parsed = parse_exercise_line(line).unwrap();
        assert_eq!(&line[parsed.load_span.clone()], "45 kg");
        assert_eq!(parsed.load, Load::Kilograms(45.0));
    }

    #[test]
    fn test_parse_is_total() {
        let garbage = "\u{feff}Day\n- - -\n1.\n@@@ | (|) 12s\nDay x - y\n\u{1F4AA} 3x3 @ 3kg";
        assert!(parse_plan_text(garbage).is_empty());
    }
}
