//! Row classification.
//!
//! The activity id shape is the main structural signal: P6 activity ids look
//! like `P1_CV_1020`, WBS rows carry codes or nothing. A start date with zero
//! duration, or with no finish, always wins and makes a milestone.

use chrono::NaiveDate;
use regex::Regex;

use p6gantt_core::{CellValue, TaskKind};

use crate::IngestError;

/// Default shape of a scheduled activity id
pub const DEFAULT_ACTIVITY_ID_PATTERN: &str = r"^P\d+_[A-Z]{2,}[_-]?\d+";

/// Regular expression recognising activity ids
#[derive(Clone, Debug)]
pub struct ActivityIdPattern {
    regex: Regex,
}

impl ActivityIdPattern {
    pub fn new(pattern: &str) -> Result<Self, IngestError> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// Test the trimmed id
    pub fn matches(&self, raw_id: &str) -> bool {
        let id = raw_id.trim();
        !id.is_empty() && self.regex.is_match(id)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Default for ActivityIdPattern {
    fn default() -> Self {
        Self {
            regex: Regex::new(DEFAULT_ACTIVITY_ID_PATTERN).expect("default pattern is valid"),
        }
    }
}

/// Read a duration cell
///
/// Blank cells are absent. Text may carry a unit suffix (`5d`, `0 days`,
/// `16h`); text that is still not a number is absent too, so it never reads
/// as a zero duration.
pub fn parse_duration(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Empty | CellValue::Date(_) => None,
        CellValue::Number(n) => n.is_finite().then_some(*n),
        CellValue::Text(text) => {
            let text = text.trim().to_ascii_lowercase();
            let number = ["days", "day", "d", "h", "w"]
                .iter()
                .find_map(|unit| text.strip_suffix(unit))
                .unwrap_or(text.as_str())
                .trim();
            if number.is_empty() {
                return None;
            }
            number.parse::<f64>().ok().filter(|n| n.is_finite())
        }
    }
}

/// Decides the kind of each row
#[derive(Clone, Debug, Default)]
pub struct RowClassifier {
    id_pattern: ActivityIdPattern,
}

impl RowClassifier {
    pub fn new(id_pattern: ActivityIdPattern) -> Self {
        Self { id_pattern }
    }

    /// Classify one row
    ///
    /// First match wins:
    /// 1. start and (zero duration or no finish): milestone
    /// 2. activity-shaped id with both dates: activity
    /// 3. anything else: header at level 0, sub-header below
    pub fn classify(
        &self,
        raw_id: &str,
        start: Option<NaiveDate>,
        finish: Option<NaiveDate>,
        duration: Option<f64>,
        level: usize,
    ) -> TaskKind {
        if start.is_some() && (duration == Some(0.0) || finish.is_none()) {
            return TaskKind::Milestone;
        }

        if start.is_some() && finish.is_some() && self.id_pattern.matches(raw_id) {
            return TaskKind::Activity;
        }
        TaskKind::group_for_level(level)
    }
}
