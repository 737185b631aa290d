//! Task tree reconstruction.
//!
//! One pass over the rows produces the flat task list in sheet order. Group
//! rows never keep authored dates; their summary range is derived afterwards
//! from the activities and milestones in their subtree.

use chrono::NaiveDate;

use p6gantt_core::dates::parse_date;
use p6gantt_core::{ChartBounds, ProjectAnchor, Row, Task, TaskKind, TaskTree};

use crate::classify::{parse_duration, ActivityIdPattern, RowClassifier};
use crate::columns::{ColumnDetector, ColumnMap};
use crate::{IngestError, IngestOptions};

/// Count leading indentation characters (space, tab, non-breaking space)
pub fn indent_count(text: &str) -> usize {
    text.chars()
        .take_while(|c| matches!(c, ' ' | '\t' | '\u{a0}'))
        .count()
}

/// Outline level: indentation on the id, or on the name when the id has none, halved
pub fn outline_level(raw_id: &str, raw_name: &str) -> usize {
    let count = match indent_count(raw_id) {
        0 => indent_count(raw_name),
        count => count,
    };
    count / 2
}

/// Builds a [`TaskTree`] from spreadsheet rows
#[derive(Clone, Debug)]
pub struct TreeBuilder {
    detector: ColumnDetector,
    classifier: RowClassifier,
    pad_months: u32,
    max_horizon: NaiveDate,
    project_month_one: Option<NaiveDate>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        let options = IngestOptions::default();
        Self {
            detector: ColumnDetector::new(),
            classifier: RowClassifier::default(),
            pad_months: options.pad_months,
            max_horizon: options.max_horizon,
            project_month_one: options.project_month_one,
        }
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder configured from ingest options
    pub fn from_options(options: &IngestOptions) -> Result<Self, IngestError> {
        Ok(Self {
            detector: ColumnDetector::with_candidates(options.columns.clone()),
            classifier: RowClassifier::new(ActivityIdPattern::new(&options.activity_id_pattern)?),
            pad_months: options.pad_months,
            max_horizon: options.max_horizon,
            project_month_one: options.project_month_one,
        })
    }

    /// Months of padding on each side of the chart bounds
    pub fn pad_months(mut self, months: u32) -> Self {
        self.pad_months = months;
        self
    }

    /// Latest date the chart axis may reach
    pub fn max_horizon(mut self, horizon: NaiveDate) -> Self {
        self.max_horizon = horizon;
        self
    }

    /// Fix project month 1 instead of deriving it
    pub fn project_month_one(mut self, date: NaiveDate) -> Self {
        self.project_month_one = Some(date);
        self
    }

    /// Detect the columns this builder would use for `rows`
    pub fn detect_columns(&self, rows: &[Row]) -> Result<ColumnMap, IngestError> {
        let first = rows.first().ok_or(IngestError::NoRows)?;
        let keys: Vec<&str> = first.keys().collect();
        self.detector.detect(&keys)
    }

    /// Build the task tree
    ///
    /// Columns are detected from the first row. Fully blank rows are skipped;
    /// every other row becomes exactly one task, in order.
    pub fn build(&self, rows: &[Row]) -> Result<TaskTree, IngestError> {
        let columns = self.detect_columns(rows)?;

        let tasks: Vec<Task> = rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| self.build_task(index, row, &columns))
            .collect();

        let mut tree = TaskTree::from_tasks(tasks);
        derive_group_ranges(&mut tree);

        tree.bounds = chart_bounds(&tree.tasks)
            .map(|bounds| bounds.padded(self.pad_months).clamped(self.max_horizon));
        tree.anchor = self
            .project_month_one
            .or_else(|| earliest_leaf_start(&tree.tasks))
            .map(ProjectAnchor::new);
        tree.category_column = columns.category.clone();

        tracing::info!(
            rows = rows.len(),
            tasks = tree.len(),
            headers = tree.count(TaskKind::Header),
            sub_headers = tree.count(TaskKind::SubHeader),
            activities = tree.count(TaskKind::Activity),
            milestones = tree.count(TaskKind::Milestone),
            "built task tree"
        );

        Ok(tree)
    }

    fn build_task(&self, index: usize, row: &Row, columns: &ColumnMap) -> Option<Task> {
        let raw_id = row.cell(columns.id.as_deref()).text();
        let raw_name = row.cell(columns.name.as_deref()).text();
        let raw_start = row.cell(columns.start.as_deref());
        let raw_finish = row.cell(columns.finish.as_deref());

        let id = raw_id.trim();
        let name = raw_name.trim();
        if id.is_empty() && name.is_empty() && raw_start.is_blank() && raw_finish.is_blank() {
            return None;
        }

        let level = outline_level(&raw_id, &raw_name);
        let start = parse_date(raw_start);
        let finish = parse_date(raw_finish);
        let duration = parse_duration(row.cell(columns.duration.as_deref()));

        let kind = self
            .classifier
            .classify(&raw_id, start, finish, duration, level);
        let title = if name.is_empty() { id } else { name };

        let mut task = Task::new(title, kind).level(level);
        if !id.is_empty() {
            task = task.id(id);
        }

        let category = row.cell(columns.category.as_deref()).text();
        let category = category.trim();
        if !category.is_empty() {
            task = task.category(category);
        }

        match (kind, start, finish) {
            (TaskKind::Milestone, Some(anchor), _) => task = task.anchor(anchor),
            (TaskKind::Activity, Some(start), Some(finish)) if start <= finish => {
                task = task.dates(start, finish);
            }
            (TaskKind::Activity, Some(start), Some(finish)) => {
                tracing::warn!(
                    row = index + 1,
                    name = title,
                    %start,
                    %finish,
                    "finish before start, dropping dates"
                );
            }
            _ => {}
        }

        Some(task)
    }
}

/// Build a tree with default options
pub fn build_tree(rows: &[Row]) -> Result<TaskTree, IngestError> {
    TreeBuilder::new().build(rows)
}

/// Give every group the min start / max end of the leaves in its subtree
///
/// Groups whose subtree has no dated leaves keep no dates.
pub fn derive_group_ranges(tree: &mut TaskTree) {
    for index in 0..tree.len() {
        if !tree.tasks[index].is_group() {
            continue;
        }
        let end = tree.subtree_end(index);
        let mut range: Option<(NaiveDate, NaiveDate)> = None;
        for leaf in tree.tasks[index + 1..end].iter().filter(|t| t.kind.is_leaf()) {
            let Some(start) = leaf.start else {
                continue;
            };
            let finish = leaf.end.unwrap_or(start);
            range = Some(match range {
                Some((lo, hi)) => (lo.min(start), hi.max(finish)),
                None => (start, finish),
            });
        }
        let group = &mut tree.tasks[index];
        group.start = range.map(|(lo, _)| lo);
        group.end = range.map(|(_, hi)| hi);
    }
}

/// Unpadded range over every dated task
pub fn chart_bounds(tasks: &[Task]) -> Option<ChartBounds> {
    let start = tasks.iter().filter_map(|t| t.start).min()?;
    let end = tasks
        .iter()
        .filter_map(|t| t.end.or(t.start))
        .max()?;
    Some(ChartBounds::new(start, end))
}

fn earliest_leaf_start(tasks: &[Task]) -> Option<NaiveDate> {
    tasks
        .iter()
        .filter(|t| t.kind.is_leaf())
        .filter_map(|t| t.start)
        .min()
}
