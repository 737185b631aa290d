//! # p6gantt-render
//!
//! Rendering backends for p6gantt task trees.
//!
//! This crate provides:
//! - Hierarchy-aware bar colors (`colorize`)
//! - Collapse resolution (`visibility`)
//! - Axis geometry and ticks (`timeline`)
//! - Interactive HTML Gantt chart rendering
//! - SVG Gantt chart rendering
//! - MermaidJS Gantt chart rendering (for Markdown/docs)
//!
//! ## Example
//!
//! ```rust,ignore
//! use p6gantt_core::{CollapseSet, Renderer};
//! use p6gantt_render::{HtmlGanttRenderer, MermaidRenderer, SvgRenderer};
//!
//! let collapsed = CollapseSet::new();
//!
//! // Interactive HTML Gantt chart
//! let html = HtmlGanttRenderer::new().render(&tree, &collapsed)?;
//!
//! // Pure SVG output of the visible rows
//! let svg = SvgRenderer::default().render(&tree, &collapsed)?;
//!
//! // MermaidJS for Markdown/documentation
//! let mermaid = MermaidRenderer::new().render(&tree, &collapsed)?;
//! ```

pub mod colorize;
pub mod gantt;
pub mod mermaid;
pub mod timeline;
pub mod visibility;

pub use colorize::{colorize, ColorMap, ColorRule, ColorScheme};
pub use gantt::{GanttTheme, HtmlGanttRenderer};
pub use mermaid::MermaidRenderer;
pub use timeline::{Timeline, Zoom};
pub use visibility::{hidden_count, is_visible, visible_indices};

use svg::node::element::{Group, Line, Path, Polygon, Rectangle, Text};
use svg::Document;

use p6gantt_core::{CollapseSet, RenderError, Renderer, Task, TaskKind, TaskTree};

/// SVG Gantt chart renderer configuration
#[derive(Clone, Debug)]
pub struct SvgRenderer {
    /// Chart title
    pub title: String,
    /// Width of the chart area (excluding labels) in pixels
    pub chart_width: u32,
    /// Height per task row in pixels
    pub row_height: u32,
    /// Width of the label column in pixels
    pub label_width: u32,
    /// Header height in pixels
    pub header_height: u32,
    /// Padding around the chart
    pub padding: u32,
    /// Bar colors
    pub colors: ColorScheme,
    /// Axis tick spacing
    pub zoom: Zoom,
    /// Color for group summary brackets
    pub summary_color: String,
    /// Color for milestones
    pub milestone_color: String,
    /// Background color
    pub background_color: String,
    /// Grid line color
    pub grid_color: String,
    /// Text color
    pub text_color: String,
    /// Font family
    pub font_family: String,
    /// Font size in pixels
    pub font_size: u32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            title: "Schedule".into(),
            chart_width: 900,
            row_height: 24,
            label_width: 280,
            header_height: 50,
            padding: 20,
            colors: ColorScheme::default(),
            zoom: Zoom::default(),
            summary_color: "#334155".into(),
            milestone_color: "#dc2626".into(),
            background_color: "#ffffff".into(),
            grid_color: "#e2e8f0".into(),
            text_color: "#0f172a".into(),
            font_family: "system-ui, -apple-system, sans-serif".into(),
            font_size: 12,
        }
    }
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chart title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Configure chart width
    pub fn chart_width(mut self, width: u32) -> Self {
        self.chart_width = width;
        self
    }

    /// Configure row height
    pub fn row_height(mut self, height: u32) -> Self {
        self.row_height = height;
        self
    }

    /// Use a custom color scheme
    pub fn colors(mut self, colors: ColorScheme) -> Self {
        self.colors = colors;
        self
    }

    /// Set axis tick spacing
    pub fn zoom(mut self, zoom: Zoom) -> Self {
        self.zoom = zoom;
        self
    }

    /// Dark background variant
    pub fn dark_theme(mut self) -> Self {
        self.summary_color = "#cbd5e1".into();
        self.milestone_color = "#f87171".into();
        self.background_color = "#0f172a".into();
        self.grid_color = "#1e293b".into();
        self.text_color = "#e2e8f0".into();
        self
    }

    /// Calculate the total width of the SVG
    fn total_width(&self) -> u32 {
        self.padding * 2 + self.label_width + self.chart_width
    }

    /// Calculate the total height based on number of rows
    fn total_height(&self, row_count: usize) -> u32 {
        self.padding * 2 + self.header_height + (row_count as u32 * self.row_height)
    }

    /// Convert an axis percentage to an x position
    fn percent_to_x(&self, percent: f64) -> f64 {
        (self.padding + self.label_width) as f64 + percent / 100.0 * self.chart_width as f64
    }

    /// Create the header with month labels
    fn render_header(&self, timeline: &Timeline) -> Group {
        let mut group = Group::new().set("class", "header");
        let top = self.padding + 24;

        let header_bg = Rectangle::new()
            .set("x", self.padding)
            .set("y", top)
            .set("width", self.label_width + self.chart_width)
            .set("height", self.header_height.saturating_sub(24))
            .set("fill", self.grid_color.as_str())
            .set("fill-opacity", 0.4);
        group = group.add(header_bg);

        for tick in timeline.ticks(self.zoom) {
            let x = self.percent_to_x(tick.position);
            let label = match tick.project_month {
                Some(month) => format!("{} (M{month})", tick.label),
                None => tick.label,
            };
            let text = Text::new(label)
                .set("x", x + 3.0)
                .set("y", (self.padding + self.header_height).saturating_sub(8))
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.font_size.saturating_sub(1))
                .set("fill", self.text_color.as_str());
            group = group.add(text);
        }

        group
    }

    /// Render grid lines
    fn render_grid(&self, row_count: usize, timeline: &Timeline) -> Group {
        let mut group = Group::new().set("class", "grid");

        let chart_top = self.padding + self.header_height;
        let chart_bottom = chart_top + (row_count as u32 * self.row_height);

        // Horizontal lines for each row
        for i in 0..=row_count {
            let y = chart_top + (i as u32 * self.row_height);
            let line = Line::new()
                .set("x1", self.padding)
                .set("y1", y)
                .set("x2", self.padding + self.label_width + self.chart_width)
                .set("y2", y)
                .set("stroke", self.grid_color.as_str())
                .set("stroke-width", 1);
            group = group.add(line);
        }

        // Vertical line per tick
        for tick in timeline.ticks(self.zoom) {
            let x = self.percent_to_x(tick.position);
            let line = Line::new()
                .set("x1", x)
                .set("y1", self.padding + 24)
                .set("x2", x)
                .set("y2", chart_bottom)
                .set("stroke", self.grid_color.as_str())
                .set("stroke-width", 1);
            group = group.add(line);
        }

        group
    }

    /// Render a single task row
    fn render_task(
        &self,
        task: &Task,
        row: usize,
        collapsed: bool,
        color: &str,
        timeline: &Timeline,
    ) -> Group {
        let mut group = Group::new()
            .set("class", format!("task {}", task.kind))
            .set("data-level", task.level as u32);

        let y = self.padding + self.header_height + (row as u32 * self.row_height);
        let bar_height = (self.row_height as f64 * 0.6) as u32;
        let bar_y = y + (self.row_height - bar_height) / 2;

        // Task label, indented by level, caret on groups
        let marker = match (task.is_group(), collapsed) {
            (true, true) => "▶ ",
            (true, false) => "▼ ",
            (false, _) => "",
        };
        let indent = task.level as u32 * 12;
        let max_chars = (self.label_width.saturating_sub(indent + 16) / 7) as usize;
        let label = Text::new(truncate(&format!("{marker}{}", task.name), max_chars.max(8)))
            .set("x", self.padding + 6 + indent)
            .set("y", y + self.row_height / 2 + 4)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size)
            .set("font-weight", if task.is_group() { "bold" } else { "normal" })
            .set("fill", self.text_color.as_str());
        group = group.add(label);

        let Some((start, end)) = task.span() else {
            return group;
        };

        match task.kind {
            TaskKind::Milestone => {
                // Draw diamond for milestone
                let cx = self.percent_to_x(timeline.position(start));
                let cy = (bar_y + bar_height / 2) as f64;
                let size = (bar_height as f64) / 2.0;

                let diamond = Polygon::new()
                    .set(
                        "points",
                        format!(
                            "{},{} {},{} {},{} {},{}",
                            cx,
                            cy - size,
                            cx + size,
                            cy,
                            cx,
                            cy + size,
                            cx - size,
                            cy
                        ),
                    )
                    .set("fill", self.milestone_color.as_str());
                group = group.add(diamond);
            }
            TaskKind::Header | TaskKind::SubHeader => {
                // Summary bracket
                let bar = timeline.bar(start, end);
                let x1 = self.percent_to_x(bar.left);
                let x2 = self.percent_to_x(bar.left + bar.width);
                let top = bar_y as f64 + 2.0;
                let bracket = Path::new()
                    .set(
                        "d",
                        format!(
                            "M{x1},{bottom} L{x1},{top} L{x2},{top} L{x2},{bottom}",
                            bottom = top + 6.0
                        ),
                    )
                    .set("fill", "none")
                    .set("stroke", self.summary_color.as_str())
                    .set("stroke-width", 3);
                group = group.add(bracket);
            }
            TaskKind::Activity => {
                let bar = timeline.bar(start, end);
                let x = self.percent_to_x(bar.left);
                let width = bar.width / 100.0 * self.chart_width as f64;

                let rect = Rectangle::new()
                    .set("x", x)
                    .set("y", bar_y)
                    .set("width", width)
                    .set("height", bar_height)
                    .set("rx", 3)
                    .set("ry", 3)
                    .set("fill", color);
                group = group.add(rect);

                let days = task.duration_days().unwrap_or_default();
                let day_label = format!("{days}d");
                if width > (day_label.len() as f64) * 7.0 + 6.0 {
                    let text = Text::new(day_label)
                        .set("x", x + width / 2.0)
                        .set("y", bar_y + bar_height / 2 + 4)
                        .set("font-family", self.font_family.as_str())
                        .set("font-size", self.font_size.saturating_sub(2))
                        .set("fill", "#ffffff")
                        .set("text-anchor", "middle");
                    group = group.add(text);
                }
            }
        }

        group
    }
}

impl Renderer for SvgRenderer {
    type Output = String;

    fn render(&self, tree: &TaskTree, collapsed: &CollapseSet) -> Result<String, RenderError> {
        if tree.is_empty() {
            return Err(RenderError::InvalidData("No tasks to render".into()));
        }
        let Some(timeline) = Timeline::from_tree(tree) else {
            return Err(RenderError::InvalidData("No dated tasks to render".into()));
        };

        let rows = visible_indices(tree, collapsed);
        let colors = colorize(tree, &self.colors);

        // Calculate dimensions
        let width = self.total_width();
        let height = self.total_height(rows.len());

        // Create document
        let mut document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0, 0, width, height))
            .set("xmlns", "http://www.w3.org/2000/svg");

        // Background
        let background = Rectangle::new()
            .set("width", "100%")
            .set("height", "100%")
            .set("fill", self.background_color.as_str());
        document = document.add(background);

        // Title
        let title = Text::new(self.title.as_str())
            .set("x", self.padding)
            .set("y", self.padding + 15)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size + 4)
            .set("font-weight", "bold")
            .set("fill", self.text_color.as_str());
        document = document.add(title);

        document = document.add(self.render_grid(rows.len(), &timeline));
        document = document.add(self.render_header(&timeline));

        for (row, &index) in rows.iter().enumerate() {
            let color = colors.get(index).unwrap_or(&self.colors.default_color);
            document = document.add(self.render_task(
                &tree.tasks[index],
                row,
                collapsed.is_collapsed(index),
                color,
                &timeline,
            ));
        }

        // Convert to string
        let mut output = Vec::new();
        svg::write(&mut output, &document)
            .map_err(|e| RenderError::Format(format!("Failed to write SVG: {}", e)))?;

        String::from_utf8(output).map_err(|e| RenderError::Format(format!("Invalid UTF-8: {}", e)))
    }
}

/// Truncate a string to a maximum number of characters with ellipsis
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}…", s.chars().take(max.saturating_sub(1)).collect::<String>())
    }
}
