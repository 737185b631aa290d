//! # p6gantt-core
//!
//! Core domain model for the p6gantt schedule viewer.
//!
//! This crate provides:
//! - Spreadsheet input types: `CellValue`, `Row`
//! - Domain types: `Task`, `TaskKind`, `TaskTree`, `ChartBounds`, `ProjectAnchor`
//! - View state: `CollapseSet`
//! - Date normalization (`dates`)
//! - The `Renderer` trait and its error type
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use p6gantt_core::{Task, TaskKind, TaskTree};
//!
//! let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
//!
//! let tree = TaskTree::from_tasks(vec![
//!     Task::new("Piling Works", TaskKind::Header),
//!     Task::new("Bored piles", TaskKind::Activity).level(1).dates(jan, feb),
//! ]);
//! assert_eq!(tree.parent(1), Some(0));
//! ```

pub mod dates;

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Spreadsheet Input
// ============================================================================

/// A single decoded spreadsheet cell
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing cell or empty string
    #[default]
    Empty,
    Number(f64),
    Text(String),
    /// Native workbook date
    Date(NaiveDate),
}

impl CellValue {
    /// True for missing cells and text that is empty after trimming
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(_) | Self::Date(_) => false,
        }
    }

    /// Raw text of the cell, untrimmed
    ///
    /// Whole numbers render without a fractional part so that numeric ids
    /// read the same as they do in the sheet.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Empty => Cow::Borrowed(""),
            Self::Text(text) => Cow::Borrowed(text),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Cow::Owned(format!("{}", *n as i64))
            }
            Self::Number(n) => Cow::Owned(n.to_string()),
            Self::Date(date) => Cow::Owned(dates::to_iso_date(*date)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        if text.is_empty() {
            Self::Empty
        } else {
            Self::Text(text.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(text: String) -> Self {
        if text.is_empty() {
            Self::Empty
        } else {
            Self::Text(text)
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

/// One spreadsheet row: column name to cell, in sheet column order
///
/// Collecting from pairs keeps the first cell of a repeated column name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell (builder pattern)
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a cell, returning the value it replaced
    pub fn insert(
        &mut self,
        column: impl Into<String>,
        value: impl Into<CellValue>,
    ) -> Option<CellValue> {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.cells.push((column, value));
                None
            }
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Cell for an optional column key; absent keys read as empty
    pub fn cell(&self, column: Option<&str>) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        column.and_then(|c| self.get(c)).unwrap_or(&EMPTY)
    }

    /// Column names in sheet order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            let column = column.into();
            if row.get(&column).is_none() {
                row.cells.push((column, value.into()));
            }
        }
        row
    }
}

// ============================================================================
// Task
// ============================================================================

/// Semantic kind of a schedule row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    /// Top-level grouping row (WBS at outline level 0)
    Header,
    /// Nested grouping row
    SubHeader,
    /// Scheduled work item with a start and a finish
    Activity,
    /// Zero-duration event anchored on one date
    Milestone,
}

impl TaskKind {
    /// Grouping kind for a row at the given outline level
    pub fn group_for_level(level: usize) -> Self {
        if level == 0 {
            Self::Header
        } else {
            Self::SubHeader
        }
    }

    /// Header or SubHeader
    pub fn is_group(self) -> bool {
        matches!(self, Self::Header | Self::SubHeader)
    }

    /// Activity or Milestone
    pub fn is_leaf(self) -> bool {
        !self.is_group()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::SubHeader => "sub-header",
            Self::Activity => "activity",
            Self::Milestone => "milestone",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the Gantt chart
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Display text (trimmed name, or trimmed id when the name is empty)
    pub name: String,
    /// Trimmed activity id, if the row had one
    pub id: Option<String>,
    pub kind: TaskKind,
    /// Outline depth derived from indentation
    pub level: usize,
    /// Authored for leaves, derived for groups
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Raw value of the categorization column
    pub category: Option<String>,
}

impl Task {
    pub fn new(name: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            name: name.into(),
            id: None,
            kind,
            level: 0,
            start: None,
            end: None,
            category: None,
        }
    }

    /// Set the activity id
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the outline level
    pub fn level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    /// Set both dates
    pub fn dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Anchor on a single date (milestones)
    pub fn anchor(self, date: NaiveDate) -> Self {
        self.dates(date, date)
    }

    /// Set the category value
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn is_group(&self) -> bool {
        self.kind.is_group()
    }

    /// Start and end when both are known
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start?, self.end?))
    }

    /// Calendar days between start and end
    pub fn duration_days(&self) -> Option<i64> {
        self.span()
            .map(|(start, end)| dates::days_between(start, end))
    }
}

// ============================================================================
// Chart Axis
// ============================================================================

/// Date range of the chart axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ChartBounds {
    /// Create bounds; reversed input is swapped
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Widen by whole months on each side
    pub fn padded(self, months: u32) -> Self {
        let months = months as i32;
        Self {
            start: dates::add_months(self.start, -months),
            end: dates::add_months(self.end, months),
        }
    }

    /// Cap the end at `horizon`, pulling the start back if needed
    pub fn clamped(self, horizon: NaiveDate) -> Self {
        let end = self.end.min(horizon);
        Self {
            start: self.start.min(end),
            end,
        }
    }

    /// Length of the axis in days
    pub fn days(&self) -> i64 {
        dates::days_between(self.start, self.end)
    }
}

/// Reference month used for "project month N" numbering
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAnchor {
    /// First day of project month 1
    pub month_one: NaiveDate,
}

impl ProjectAnchor {
    /// Anchor on the month containing `date`
    pub fn new(date: NaiveDate) -> Self {
        Self {
            month_one: dates::month_start(date),
        }
    }

    /// Project month number of `date`; the anchor month is 1, earlier months go to 0 and below
    pub fn month_index(&self, date: NaiveDate) -> i32 {
        dates::months_between(self.month_one, date) + 1
    }
}

// ============================================================================
// Task Tree
// ============================================================================

/// Flat, ordered task list with its derived structure
///
/// Order is the sheet's row order. Nesting is implicit: the parent of a task is
/// the nearest preceding task with a strictly smaller level. `parents` caches
/// that relation so ancestor walks do not rescan the list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskTree {
    pub tasks: Vec<Task>,
    pub parents: Vec<Option<usize>>,
    pub bounds: Option<ChartBounds>,
    pub anchor: Option<ProjectAnchor>,
    /// Name of the detected categorization column
    pub category_column: Option<String>,
}

impl TaskTree {
    /// Build a tree from tasks, computing parents only
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let parents = parent_indices(&tasks);
        Self {
            tasks,
            parents,
            bounds: None,
            anchor: None,
            category_column: None,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn parent(&self, index: usize) -> Option<usize> {
        self.parents.get(index).copied().flatten()
    }

    /// Ancestor indices, nearest first
    pub fn ancestors(&self, index: usize) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(index),
        }
    }

    /// Nearest ancestor that is a Header or SubHeader
    pub fn group_ancestor(&self, index: usize) -> Option<usize> {
        self.ancestors(index).find(|&i| self.tasks[i].is_group())
    }

    /// Exclusive end of the subtree rooted at `index`
    ///
    /// The subtree runs until the next task whose level is at or above the
    /// root's level.
    pub fn subtree_end(&self, index: usize) -> usize {
        let Some(root) = self.tasks.get(index) else {
            return index;
        };
        self.tasks[index + 1..]
            .iter()
            .position(|t| t.level <= root.level)
            .map_or(self.tasks.len(), |offset| index + 1 + offset)
    }

    pub fn has_children(&self, index: usize) -> bool {
        self.subtree_end(index) > index + 1
    }

    /// Count tasks of a given kind
    pub fn count(&self, kind: TaskKind) -> usize {
        self.tasks.iter().filter(|t| t.kind == kind).count()
    }
}

/// Iterator over a task's ancestors, see [`TaskTree::ancestors`]
pub struct Ancestors<'a> {
    tree: &'a TaskTree,
    next: Option<usize>,
}

impl Iterator for Ancestors<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Parent of each task: nearest preceding task with a strictly smaller level
pub fn parent_indices(tasks: &[Task]) -> Vec<Option<usize>> {
    let mut parents = Vec::with_capacity(tasks.len());
    let mut stack: Vec<usize> = Vec::new();
    for (index, task) in tasks.iter().enumerate() {
        while stack
            .last()
            .is_some_and(|&open| tasks[open].level >= task.level)
        {
            stack.pop();
        }
        parents.push(stack.last().copied());
        stack.push(index);
    }
    parents
}

// ============================================================================
// View State
// ============================================================================

/// Indices of collapsed group rows
///
/// Only affects what is visible; the task list is never touched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapseSet {
    collapsed: BTreeSet<usize>,
}

impl CollapseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_collapsed(&self, index: usize) -> bool {
        self.collapsed.contains(&index)
    }

    /// Flip a row; returns true when it is now collapsed
    pub fn toggle(&mut self, index: usize) -> bool {
        if self.collapsed.remove(&index) {
            false
        } else {
            self.collapsed.insert(index);
            true
        }
    }

    pub fn collapse(&mut self, index: usize) {
        self.collapsed.insert(index);
    }

    pub fn expand(&mut self, index: usize) {
        self.collapsed.remove(&index);
    }

    /// Expand everything
    pub fn clear(&mut self) {
        self.collapsed.clear();
    }

    /// Replace the set with every group at `depth` or deeper collapsed
    ///
    /// `depth = 0` leaves only the top-level headers on screen.
    pub fn high_level_view(&mut self, tree: &TaskTree, depth: usize) {
        self.collapsed = tree
            .iter()
            .enumerate()
            .filter(|(_, task)| task.is_group() && task.level >= depth)
            .map(|(index, _)| index)
            .collect();
    }

    pub fn len(&self) -> usize {
        self.collapsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collapsed.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.collapsed.iter().copied()
    }
}

impl FromIterator<usize> for CollapseSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            collapsed: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render a task tree with the given rows collapsed
    fn render(&self, tree: &TaskTree, collapsed: &CollapseSet)
        -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn outline(levels: &[usize]) -> TaskTree {
        TaskTree::from_tasks(
            levels
                .iter()
                .enumerate()
                .map(|(i, &level)| {
                    Task::new(format!("t{i}"), TaskKind::group_for_level(level)).level(level)
                })
                .collect(),
        )
    }

    #[test]
    fn cell_blankness() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::from("   ").is_blank());
        assert!(!CellValue::from(" x ").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
        assert_eq!(CellValue::from(""), CellValue::Empty);
    }

    #[test]
    fn cell_text() {
        assert_eq!(CellValue::Number(1020.0).text(), "1020");
        assert_eq!(CellValue::Number(2.5).text(), "2.5");
        assert_eq!(CellValue::Date(date(2024, 3, 9)).text(), "2024-03-09");
        assert_eq!(CellValue::from("  A1000").text(), "  A1000");
    }

    #[test]
    fn cell_values_from_json() {
        let cells: Vec<CellValue> = serde_json::from_str(r#"[null, 3, "P1_CV_10"]"#).unwrap();
        assert_eq!(
            cells,
            vec![
                CellValue::Empty,
                CellValue::Number(3.0),
                CellValue::Text("P1_CV_10".into())
            ]
        );
    }

    #[test]
    fn row_keeps_column_order() {
        let row = Row::new()
            .with("Activity ID", "A1")
            .with("Start", "01-Jan-24")
            .with("Activity ID", "A2");
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["Activity ID", "Start"]);
        assert_eq!(row.get("Activity ID"), Some(&CellValue::from("A2")));
        assert_eq!(row.cell(Some("Missing")), &CellValue::Empty);
        assert_eq!(row.cell(None), &CellValue::Empty);
    }

    #[test]
    fn row_insert_reports_replaced_cell() {
        let mut row = Row::new().with("Start", "01-Jan-24");
        assert_eq!(row.insert("Finish", "10-Jan-24"), None);
        assert_eq!(
            row.insert("Start", "02-Jan-24"),
            Some(CellValue::from("01-Jan-24"))
        );
        assert_eq!(row.get("Start"), Some(&CellValue::from("02-Jan-24")));
    }

    #[test]
    fn collected_row_keeps_first_repeated_column() {
        let row: Row = [("Start", "01-Jan-24"), ("Finish", "10-Jan-24"), ("Start", "TBC")]
            .into_iter()
            .collect();
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["Start", "Finish"]);
        assert_eq!(row.get("Start"), Some(&CellValue::from("01-Jan-24")));
    }

    #[test]
    fn parents_follow_levels() {
        let tree = outline(&[0, 1, 2, 2, 1, 0, 2, 1]);
        assert_eq!(
            tree.parents,
            vec![None, Some(0), Some(1), Some(1), Some(0), None, Some(5), Some(5)]
        );
        assert_eq!(tree.ancestors(3).collect::<Vec<_>>(), vec![1, 0]);
    }

    #[test]
    fn parents_match_backward_scan() {
        let tree = outline(&[1, 0, 3, 1, 2, 2, 0, 0, 4, 1, 3, 2]);
        for index in 0..tree.len() {
            let level = tree.tasks[index].level;
            let scanned = (0..index).rev().find(|&j| tree.tasks[j].level < level);
            assert_eq!(tree.parent(index), scanned, "index {index}");
        }
    }

    #[test]
    fn subtree_end_stops_at_same_or_shallower_level() {
        let tree = outline(&[0, 1, 2, 1, 0, 1]);
        assert_eq!(tree.subtree_end(0), 4);
        assert_eq!(tree.subtree_end(1), 3);
        assert_eq!(tree.subtree_end(2), 3);
        assert_eq!(tree.subtree_end(4), 6);
        assert!(tree.has_children(0));
        assert!(!tree.has_children(2));
    }

    #[test]
    fn group_ancestor_skips_leaves() {
        let tree = TaskTree::from_tasks(vec![
            Task::new("Substructure", TaskKind::Header),
            Task::new("Odd parent", TaskKind::Activity).level(1),
            Task::new("Child", TaskKind::Activity).level(2),
        ]);
        assert_eq!(tree.group_ancestor(2), Some(0));
        assert_eq!(tree.group_ancestor(0), None);
    }

    #[test]
    fn bounds_padding_and_clamping() {
        let bounds = ChartBounds::new(date(2024, 3, 15), date(2024, 1, 31));
        assert_eq!(bounds.start, date(2024, 1, 31));

        let padded = bounds.padded(1);
        assert_eq!(padded.start, date(2023, 12, 31));
        assert_eq!(padded.end, date(2024, 4, 15));

        let clamped = padded.clamped(date(2024, 2, 1));
        assert_eq!(clamped.end, date(2024, 2, 1));
        let inverted = padded.clamped(date(2023, 6, 1));
        assert_eq!(inverted.start, date(2023, 6, 1));
        assert_eq!(inverted.end, date(2023, 6, 1));
    }

    #[test]
    fn project_month_numbering() {
        let anchor = ProjectAnchor::new(date(2024, 7, 18));
        assert_eq!(anchor.month_one, date(2024, 7, 1));
        assert_eq!(anchor.month_index(date(2024, 7, 31)), 1);
        assert_eq!(anchor.month_index(date(2025, 1, 1)), 7);
        assert_eq!(anchor.month_index(date(2024, 6, 30)), 0);
    }

    #[test]
    fn collapse_set_operations() {
        let mut set = CollapseSet::new();
        assert!(set.toggle(3));
        assert!(set.is_collapsed(3));
        assert!(!set.toggle(3));
        set.collapse(1);
        set.collapse(4);
        set.expand(1);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![4]);
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn high_level_view_collapses_deep_groups() {
        let tree = TaskTree::from_tasks(vec![
            Task::new("Phase A", TaskKind::Header),
            Task::new("Zone 1", TaskKind::SubHeader).level(1),
            Task::new("Pour", TaskKind::Activity).level(2),
            Task::new("Phase B", TaskKind::Header),
        ]);
        let mut set = CollapseSet::from_iter([2]);
        set.high_level_view(&tree, 0);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 1, 3]);
        set.high_level_view(&tree, 1);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn task_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&TaskKind::SubHeader).unwrap();
        assert_eq!(json, "\"sub-header\"");
        assert_eq!(TaskKind::SubHeader.to_string(), "sub-header");
    }

    #[test]
    fn task_duration() {
        let task = Task::new("Raft", TaskKind::Activity).dates(date(2024, 1, 1), date(2024, 1, 11));
        assert_eq!(task.duration_days(), Some(10));
        assert_eq!(Task::new("Open", TaskKind::Header).duration_days(), None);
    }
}
