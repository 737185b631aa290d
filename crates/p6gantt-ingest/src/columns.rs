//! Fuzzy column detection.
//!
//! Exports from different tools (and different P6 layouts) name the same
//! column differently: "Activity ID", "ActivityID", "Task Code"... Each field
//! has an ordered list of candidate headers. Both sides are normalized before
//! comparison, exact matches are preferred, and a second pass picks up
//! decorated headers such as "Activity Code - Discipline" by matching whole
//! words, so "End" finds "Planned End" but not "Calendar".

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::IngestError;

/// A column the tree builder reads
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnField {
    Id,
    Name,
    Start,
    Finish,
    Duration,
    Category,
}

impl ColumnField {
    /// Detection order; earlier fields claim keys first in the word pass
    pub const ALL: [ColumnField; 6] = [
        ColumnField::Id,
        ColumnField::Name,
        ColumnField::Start,
        ColumnField::Finish,
        ColumnField::Duration,
        ColumnField::Category,
    ];

    /// Built-in candidate headers, highest priority first
    pub fn builtin_candidates(self) -> &'static [&'static str] {
        match self {
            Self::Id => &["Activity ID", "ActivityID", "Task ID", "Task Code", "ID"],
            Self::Name => &[
                "Activity Name",
                "Task Name",
                "Activity",
                "Name",
                "Description",
                "Title",
            ],
            Self::Start => &[
                "Start",
                "Start Date",
                "Planned Start",
                "Baseline Start",
                "Early Start",
                "Begin",
            ],
            Self::Finish => &[
                "Finish",
                "Finish Date",
                "Planned Finish",
                "Baseline Finish",
                "Early Finish",
                "End Date",
                "End",
            ],
            Self::Duration => &[
                "Original Duration",
                "Planned Duration",
                "Planned Dur.",
                "Duration",
                "Orig Dur",
                "Remaining Duration",
            ],
            Self::Category => &["Discipline", "Category", "Phase", "Trade", "Work Package"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Start => "start",
            Self::Finish => "finish",
            Self::Duration => "duration",
            Self::Category => "category",
        }
    }
}

/// Extra candidate headers from configuration, tried after the built-in ones
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnCandidates {
    pub id: Vec<String>,
    pub name: Vec<String>,
    pub start: Vec<String>,
    pub finish: Vec<String>,
    pub duration: Vec<String>,
    pub category: Vec<String>,
}

impl ColumnCandidates {
    fn extra(&self, field: ColumnField) -> &[String] {
        match field {
            ColumnField::Id => &self.id,
            ColumnField::Name => &self.name,
            ColumnField::Start => &self.start,
            ColumnField::Finish => &self.finish,
            ColumnField::Duration => &self.duration,
            ColumnField::Category => &self.category,
        }
    }
}

/// Actual column keys selected for each field
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    pub id: Option<String>,
    pub name: Option<String>,
    pub start: Option<String>,
    pub finish: Option<String>,
    pub duration: Option<String>,
    pub category: Option<String>,
}

impl ColumnMap {
    pub fn get(&self, field: ColumnField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    fn slot(&self, field: ColumnField) -> &Option<String> {
        match field {
            ColumnField::Id => &self.id,
            ColumnField::Name => &self.name,
            ColumnField::Start => &self.start,
            ColumnField::Finish => &self.finish,
            ColumnField::Duration => &self.duration,
            ColumnField::Category => &self.category,
        }
    }

    fn set(&mut self, field: ColumnField, key: &str) {
        let slot = match field {
            ColumnField::Id => &mut self.id,
            ColumnField::Name => &mut self.name,
            ColumnField::Start => &mut self.start,
            ColumnField::Finish => &mut self.finish,
            ColumnField::Duration => &mut self.duration,
            ColumnField::Category => &mut self.category,
        };
        *slot = Some(key.to_string());
    }

    /// Whether anything renderable was found
    pub fn is_usable(&self) -> bool {
        self.name.is_some() || self.start.is_some() || self.finish.is_some()
    }
}

/// Normalize a header for comparison
///
/// Lowercases, drops underscores, hyphens and other punctuation, and collapses
/// runs of whitespace to one space.
pub fn normalize_header(header: &str) -> String {
    let mut cleaned = String::with_capacity(header.len());
    for c in header.chars() {
        if c.is_alphanumeric() {
            cleaned.extend(c.to_lowercase());
        } else if c.is_whitespace() {
            cleaned.push(' ');
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Word matches shorter than this are too ambiguous ("id" in "Bar ID Width")
const MIN_SUBSTRING_LEN: usize = 3;

/// Whether the words of `candidate` appear consecutively in `header`
///
/// Both sides are normalized, so words are separated by single spaces.
fn contains_words(header: &str, candidate: &str) -> bool {
    let words: Vec<&str> = header.split(' ').collect();
    let wanted: Vec<&str> = candidate.split(' ').collect();
    words.windows(wanted.len()).any(|window| window == wanted.as_slice())
}

/// Maps candidate header names onto a sheet's actual columns
#[derive(Clone, Debug, Default)]
pub struct ColumnDetector {
    extra: ColumnCandidates,
}

impl ColumnDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector that also tries the configured candidates
    pub fn with_candidates(extra: ColumnCandidates) -> Self {
        Self { extra }
    }

    /// Normalized candidates for a field in priority order
    fn candidates(&self, field: ColumnField) -> Vec<String> {
        field
            .builtin_candidates()
            .iter()
            .copied()
            .chain(self.extra.extra(field).iter().map(String::as_str))
            .map(normalize_header)
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// Detect columns from the first row's keys
    ///
    /// Fails when there is neither a name column nor a date column.
    pub fn detect<S: AsRef<str>>(&self, keys: &[S]) -> Result<ColumnMap, IngestError> {
        let normalized: Vec<(&str, String)> = keys
            .iter()
            .map(|k| (k.as_ref(), normalize_header(k.as_ref())))
            .collect();

        let mut map = ColumnMap::default();
        let mut claimed: HashSet<&str> = HashSet::new();

        // Pass 1: exact normalized match
        for field in ColumnField::ALL {
            for candidate in self.candidates(field) {
                if let Some((key, _)) = normalized.iter().find(|(_, n)| *n == candidate) {
                    map.set(field, key);
                    claimed.insert(key);
                    break;
                }
            }
        }

        // Pass 2: whole-word match for fields still missing
        for field in ColumnField::ALL {
            if map.get(field).is_some() {
                continue;
            }
            'candidates: for candidate in self.candidates(field) {
                if candidate.chars().count() < MIN_SUBSTRING_LEN {
                    continue;
                }
                for (key, n) in &normalized {
                    if !claimed.contains(key) && contains_words(n, &candidate) {
                        tracing::debug!(field = field.label(), key, "column matched by words");
                        map.set(field, key);
                        claimed.insert(key);
                        break 'candidates;
                    }
                }
            }
        }

        if !map.is_usable() {
            let columns = keys
                .iter()
                .map(|k| k.as_ref())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(IngestError::ColumnsUndetected { columns });
        }

        tracing::debug!(?map, "detected columns");
        Ok(map)
    }
}

/// Detect columns with the built-in candidate lists
pub fn detect_columns<S: AsRef<str>>(keys: &[S]) -> Result<ColumnMap, IngestError> {
    ColumnDetector::new().detect(keys)
}
