//! MermaidJS Gantt chart renderer
//!
//! Generates text-based Gantt charts in MermaidJS format, suitable for
//! embedding in Markdown documentation, GitHub, wikis, and other platforms.
//!
//! ## Example Output
//!
//! ```text
//! gantt
//!     title Tower A
//!     dateFormat YYYY-MM-DD
//!
//!     section Piling
//!     Bored piles      :P1_PL_10, 2024-01-08, 2024-02-22
//!     Piling complete  :milestone, P1_MS_10, 2024-03-15, 0d
//! ```
//!
//! Level-0 headers open sections. Rows hidden by a collapsed group are left
//! out; a collapsed group is drawn as one bar over its summary range.

use p6gantt_core::dates::to_iso_date;
use p6gantt_core::{CollapseSet, RenderError, Renderer, Task, TaskKind, TaskTree};

use crate::visibility::is_visible;

/// MermaidJS Gantt chart renderer
#[derive(Clone, Debug)]
pub struct MermaidRenderer {
    /// Chart title
    pub title: String,
    /// Whether to open a section for every top-level header
    pub show_sections: bool,
    /// Axis label format (d3 time format)
    pub axis_format: Option<String>,
}

impl Default for MermaidRenderer {
    fn default() -> Self {
        Self {
            title: "Schedule".into(),
            show_sections: true,
            axis_format: None,
        }
    }
}

impl MermaidRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chart title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Disable sections grouping
    pub fn no_sections(mut self) -> Self {
        self.show_sections = false;
        self
    }

    /// Set the axis label format, e.g. `%b %Y`
    pub fn axis_format(mut self, format: impl Into<String>) -> Self {
        self.axis_format = Some(format.into());
        self
    }

    /// Sanitize task name for Mermaid (escape special characters)
    fn sanitize_name(name: &str) -> String {
        // Mermaid is sensitive to colons and special chars in task names
        name.replace([':', ';'], "-")
            .replace('#', "")
            .replace(['\n', '\r'], " ")
            .trim()
            .to_string()
    }

    /// Create a valid Mermaid task ID
    fn make_id(task: &Task, index: usize) -> String {
        match task.id.as_deref() {
            Some(id) if !id.is_empty() => id
                .chars()
                .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
                .collect(),
            _ => format!("t{index}"),
        }
    }

    /// Format a single task line, `None` for rows without dates
    fn format_task_line(task: &Task, index: usize, as_summary: bool) -> Option<String> {
        let (start, end) = task.span()?;
        let name = Self::sanitize_name(&task.name);
        let id = Self::make_id(task, index);

        let line = match task.kind {
            TaskKind::Milestone => {
                format!("{name} :milestone, {id}, {}, 0d", to_iso_date(start))
            }
            TaskKind::Activity => {
                format!("{name} :{id}, {}, {}", to_iso_date(start), to_iso_date(end))
            }
            TaskKind::Header | TaskKind::SubHeader if as_summary => {
                format!("{name} :done, {id}, {}, {}", to_iso_date(start), to_iso_date(end))
            }
            TaskKind::Header | TaskKind::SubHeader => return None,
        };
        Some(line)
    }
}

impl Renderer for MermaidRenderer {
    type Output = String;

    fn render(&self, tree: &TaskTree, collapsed: &CollapseSet) -> Result<String, RenderError> {
        if tree.is_empty() {
            return Err(RenderError::InvalidData("No tasks to render".into()));
        }

        let mut output = String::new();

        // Header
        output.push_str("gantt\n");
        output.push_str(&format!("    title {}\n", Self::sanitize_name(&self.title)));
        output.push_str("    dateFormat YYYY-MM-DD\n");
        if let Some(format) = &self.axis_format {
            output.push_str(&format!("    axisFormat {format}\n"));
        }
        output.push('\n');

        let mut lines = 0usize;
        for (index, task) in tree.iter().enumerate() {
            if !is_visible(tree, collapsed, index) {
                continue;
            }

            if self.show_sections && task.kind == TaskKind::Header && task.level == 0 {
                if index > 0 {
                    output.push('\n');
                }
                output.push_str(&format!("    section {}\n", Self::sanitize_name(&task.name)));
            }

            let as_summary = task.is_group() && collapsed.is_collapsed(index);
            if let Some(line) = Self::format_task_line(task, index, as_summary) {
                output.push_str(&format!("    {line}\n"));
                lines += 1;
            }
        }

        if lines == 0 {
            return Err(RenderError::InvalidData("No dated tasks to render".into()));
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn create_test_tree() -> TaskTree {
        TaskTree::from_tasks(vec![
            Task::new("Piling", TaskKind::Header).dates(date(2024, 1, 8), date(2024, 3, 15)),
            Task::new("Bored piles", TaskKind::Activity)
                .id("P1_PL_10")
                .level(1)
                .dates(date(2024, 1, 8), date(2024, 2, 22)),
            Task::new("Piling complete", TaskKind::Milestone)
                .id("P1_MS_10")
                .level(1)
                .anchor(date(2024, 3, 15)),
            Task::new("Basement", TaskKind::Header).dates(date(2024, 3, 18), date(2024, 5, 3)),
            Task::new("Zone 1", TaskKind::SubHeader)
                .level(1)
                .dates(date(2024, 3, 18), date(2024, 5, 3)),
            Task::new("Raft: pour 1", TaskKind::Activity)
                .id("P1_SB-20")
                .level(2)
                .dates(date(2024, 3, 18), date(2024, 5, 3)),
        ])
    }

    #[test]
    fn mermaid_renderer_creation() {
        let renderer = MermaidRenderer::new();
        assert!(renderer.show_sections);
        assert_eq!(renderer.axis_format, None);
    }

    #[test]
    fn mermaid_produces_sections_and_lines() {
        let output = MermaidRenderer::new()
            .title("Tower A")
            .render(&create_test_tree(), &CollapseSet::new())
            .unwrap();
        let expected = "gantt
    title Tower A
    dateFormat YYYY-MM-DD

    section Piling
    Bored piles :P1_PL_10, 2024-01-08, 2024-02-22
    Piling complete :milestone, P1_MS_10, 2024-03-15, 0d

    section Basement
    Raft- pour 1 :P1_SB_20, 2024-03-18, 2024-05-03
";
        assert_eq!(output, expected);
    }

    #[test]
    fn mermaid_collapsed_group_becomes_summary() {
        let collapsed = CollapseSet::from_iter([4]);
        let output = MermaidRenderer::new()
            .render(&create_test_tree(), &collapsed)
            .unwrap();
        assert!(output.contains("Zone 1 :done, t4, 2024-03-18, 2024-05-03"));
        assert!(!output.contains("Raft"));
    }

    #[test]
    fn mermaid_no_sections_flat_list() {
        let output = MermaidRenderer::new()
            .no_sections()
            .axis_format("%b %Y")
            .render(&create_test_tree(), &CollapseSet::new())
            .unwrap();
        assert!(!output.contains("section"));
        assert!(output.contains("axisFormat %b %Y"));
    }

    #[test]
    fn mermaid_empty_tree_fails() {
        let result = MermaidRenderer::new().render(&TaskTree::default(), &CollapseSet::new());
        assert!(matches!(result, Err(RenderError::InvalidData(_))));

        let undated = TaskTree::from_tasks(vec![Task::new("Open", TaskKind::Header)]);
        assert!(MermaidRenderer::new()
            .render(&undated, &CollapseSet::new())
            .is_err());
    }

    #[test]
    fn mermaid_sanitizes_special_chars() {
        assert_eq!(MermaidRenderer::sanitize_name("A: b; #c"), "A- b- c");
    }
}
