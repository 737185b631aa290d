//! Task listing for the `inspect` command

use chrono::NaiveDate;
use serde::Serialize;

use p6gantt_core::dates::to_iso_date;
use p6gantt_core::{ChartBounds, CollapseSet, ProjectAnchor, TaskKind, TaskTree};
use p6gantt_render::{colorize, hidden_count, is_visible, ColorScheme};

/// One classified row
#[derive(Debug, Serialize)]
pub struct TaskReport<'a> {
    pub index: usize,
    pub kind: TaskKind,
    pub level: usize,
    pub id: Option<&'a str>,
    pub name: &'a str,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub parent: Option<usize>,
    pub color: String,
    pub visible: bool,
    pub collapsed: bool,
}

/// Whole-tree listing
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub bounds: Option<ChartBounds>,
    pub anchor: Option<ProjectAnchor>,
    pub category_column: Option<&'a str>,
    pub hidden: usize,
    pub tasks: Vec<TaskReport<'a>>,
}

impl<'a> Report<'a> {
    pub fn new(tree: &'a TaskTree, collapsed: &CollapseSet, scheme: &ColorScheme) -> Self {
        let colors = colorize(tree, scheme);
        let tasks = tree
            .iter()
            .enumerate()
            .map(|(index, task)| TaskReport {
                index,
                kind: task.kind,
                level: task.level,
                id: task.id.as_deref(),
                name: &task.name,
                start: task.start,
                end: task.end,
                parent: tree.parent(index),
                color: colors.get(index).unwrap_or(&scheme.default_color).to_string(),
                visible: is_visible(tree, collapsed, index),
                collapsed: collapsed.is_collapsed(index),
            })
            .collect();

        Self {
            bounds: tree.bounds,
            anchor: tree.anchor,
            category_column: tree.category_column.as_deref(),
            hidden: hidden_count(tree, collapsed),
            tasks,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text table, children indented under their groups
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        match self.bounds {
            Some(bounds) => out.push_str(&format!(
                "Chart: {} .. {}\n",
                to_iso_date(bounds.start),
                to_iso_date(bounds.end)
            )),
            None => out.push_str("Chart: no dated tasks\n"),
        }
        if let Some(anchor) = self.anchor {
            out.push_str(&format!("Month 1: {}\n", to_iso_date(anchor.month_one)));
        }
        if let Some(column) = self.category_column {
            out.push_str(&format!("Category column: {column}\n"));
        }
        out.push_str(&format!(
            "Tasks: {} ({} hidden)\n\n",
            self.tasks.len(),
            self.hidden
        ));

        out.push_str(&format!(
            "{:>5}  {:<10} {:>3}  {:<10}  {:<10}  {:<7}  {}\n",
            "#", "KIND", "LVL", "START", "END", "COLOR", "NAME"
        ));
        for task in &self.tasks {
            let marker = match (task.visible, task.collapsed) {
                (false, _) => '.',
                (true, true) => '+',
                (true, false) => ' ',
            };
            let name = match task.id {
                Some(id) if id != task.name => format!("{id}  {}", task.name),
                _ => task.name.to_string(),
            };
            out.push_str(&format!(
                "{:>5}{marker} {:<10} {:>3}  {:<10}  {:<10}  {:<7}  {}{}\n",
                task.index,
                task.kind.as_str(),
                task.level,
                task.start.map(to_iso_date).unwrap_or_else(|| "-".into()),
                task.end.map(to_iso_date).unwrap_or_else(|| "-".into()),
                task.color,
                "  ".repeat(task.level),
                name
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p6gantt_core::Task;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn tree() -> TaskTree {
        let mut tree = TaskTree::from_tasks(vec![
            Task::new("Piling", TaskKind::Header).dates(date(2024, 1, 8), date(2024, 2, 22)),
            Task::new("Bored piles", TaskKind::Activity)
                .id("P1_PL_10")
                .level(1)
                .dates(date(2024, 1, 8), date(2024, 2, 22)),
            Task::new("Handover", TaskKind::Header),
        ]);
        tree.bounds = Some(ChartBounds::new(date(2023, 12, 8), date(2024, 3, 22)));
        tree.anchor = Some(ProjectAnchor::new(date(2024, 1, 8)));
        tree
    }

    #[test]
    fn report_marks_hidden_and_collapsed_rows() {
        let tree = tree();
        let collapsed = CollapseSet::from_iter([0]);
        let report = Report::new(&tree, &collapsed, &ColorScheme::default());
        assert_eq!(report.hidden, 1);
        assert!(report.tasks[0].collapsed);
        assert!(!report.tasks[1].visible);
        assert_eq!(report.tasks[1].parent, Some(0));
        assert_eq!(report.tasks[1].color, "#1d4ed8");
    }

    #[test]
    fn text_table() {
        let tree = tree();
        let text = Report::new(&tree, &CollapseSet::new(), &ColorScheme::default()).to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Chart: 2023-12-08 .. 2024-03-22");
        assert_eq!(lines[1], "Month 1: 2024-01-01");
        assert_eq!(lines[2], "Tasks: 3 (0 hidden)");
        assert_eq!(
            lines[6],
            "    1  activity     1  2024-01-08  2024-02-22  #1d4ed8    P1_PL_10  Bored piles"
        );
        assert_eq!(
            lines[7],
            "    2  header       0  -           -           #64748b  Handover"
        );
    }

    #[test]
    fn json_uses_iso_dates() {
        let tree = tree();
        let report = Report::new(&tree, &CollapseSet::new(), &ColorScheme::default());
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["tasks"][1]["start"], "2024-01-08");
        assert_eq!(value["tasks"][1]["kind"], "activity");
        assert_eq!(value["tasks"][2]["start"], serde_json::Value::Null);
        assert_eq!(value["bounds"]["end"], "2024-03-22");
    }
}
