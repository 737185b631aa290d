//! Interactive HTML Gantt Chart Renderer
//!
//! Generates a standalone HTML page: one label cell and one bar track per row.
//! Features:
//! - Summary bars for headers, colored activity bars with day counts
//! - Milestone diamonds with their date
//! - Click a header to collapse or expand it
//! - Expand-all and high-level view buttons
//! - Zoom controls and project month numbering on the axis

use serde_json::json;

use p6gantt_core::dates::{to_display_date, to_short_display_date};
use p6gantt_core::{CollapseSet, RenderError, Renderer, Task, TaskKind, TaskTree};

use crate::colorize::{colorize, ColorMap, ColorScheme};
use crate::timeline::{Timeline, Zoom};
use crate::visibility::{hidden_count, is_visible};

/// Activity bars narrower than this (percent) get no day label
const DAY_LABEL_MIN_WIDTH: f64 = 2.0;

/// Indentation per outline level, in pixels
const INDENT_PX: u32 = 18;

/// HTML Gantt chart renderer configuration
#[derive(Clone, Debug)]
pub struct HtmlGanttRenderer {
    /// Page heading
    pub title: String,
    /// Width of the timeline track at zoom 1, in pixels
    pub chart_width: u32,
    /// Height per task row in pixels
    pub row_height: u32,
    /// Width of the label column in pixels
    pub label_width: u32,
    /// Theme (light or dark)
    pub theme: GanttTheme,
    /// Bar colors
    pub colors: ColorScheme,
    /// Axis tick spacing
    pub zoom: Zoom,
    /// Embed the collapse/zoom script
    pub interactive: bool,
    /// Groups at this level or deeper collapse on "High-level view"
    pub high_level_depth: usize,
}

/// Color theme for the Gantt chart
#[derive(Clone, Debug)]
pub struct GanttTheme {
    pub summary_color: String,
    pub milestone_color: String,
    pub milestone_label_color: String,
    pub background_color: String,
    pub grid_color: String,
    pub text_color: String,
    pub muted_color: String,
    pub header_bg: String,
    pub header_row_bg: String,
    pub sub_header_row_bg: String,
}

impl Default for GanttTheme {
    fn default() -> Self {
        Self::light()
    }
}

impl GanttTheme {
    pub fn light() -> Self {
        Self {
            summary_color: "#334155".into(),
            milestone_color: "#dc2626".into(),
            milestone_label_color: "#dc2626".into(),
            background_color: "#ffffff".into(),
            grid_color: "#e2e8f0".into(),
            text_color: "#0f172a".into(),
            muted_color: "#94a3b8".into(),
            header_bg: "#f8fafc".into(),
            header_row_bg: "#e2e8f0".into(),
            sub_header_row_bg: "#f1f5f9".into(),
        }
    }

    pub fn dark() -> Self {
        Self {
            summary_color: "#cbd5e1".into(),
            milestone_color: "#f87171".into(),
            milestone_label_color: "#fca5a5".into(),
            background_color: "#0f172a".into(),
            grid_color: "#1e293b".into(),
            text_color: "#e2e8f0".into(),
            muted_color: "#64748b".into(),
            header_bg: "#111827".into(),
            header_row_bg: "#1e293b".into(),
            sub_header_row_bg: "#172033".into(),
        }
    }
}

impl Default for HtmlGanttRenderer {
    fn default() -> Self {
        Self {
            title: "Schedule".into(),
            chart_width: 1200,
            row_height: 26,
            label_width: 420,
            theme: GanttTheme::default(),
            colors: ColorScheme::default(),
            zoom: Zoom::default(),
            interactive: true,
            high_level_depth: 1,
        }
    }
}

impl HtmlGanttRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page heading
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Use dark theme
    pub fn dark_theme(mut self) -> Self {
        self.theme = GanttTheme::dark();
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

    /// Depth used by the high-level view button
    pub fn high_level_depth(mut self, depth: usize) -> Self {
        self.high_level_depth = depth;
        self
    }

    /// Disable interactivity
    pub fn static_chart(mut self) -> Self {
        self.interactive = false;
        self
    }

    fn generate_html(&self, tree: &TaskTree, collapsed: &CollapseSet) -> String {
        let timeline = Timeline::from_tree(tree);
        let colors = colorize(tree, &self.colors);

        let axis = self.render_axis(timeline.as_ref());
        let rows: String = tree
            .iter()
            .enumerate()
            .map(|(index, task)| {
                self.render_task_row(tree, collapsed, index, task, timeline.as_ref(), &colors)
            })
            .collect();
        let legend = render_legend(&colors);
        let range = timeline
            .map(|t| {
                let bounds = t.bounds();
                format!(
                    "{} – {}",
                    to_display_date(bounds.start),
                    to_display_date(bounds.end)
                )
            })
            .unwrap_or_else(|| "No dated activities".into());
        let status = status_text(tree.len(), hidden_count(tree, collapsed));
        let css = self.generate_css();
        let (controls, js) = if self.interactive {
            (CONTROLS.to_string(), self.generate_js(tree, collapsed))
        } else {
            (String::new(), String::new())
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Gantt Chart</title>
    <style>
{css}
    </style>
</head>
<body>
    <div class="gantt-container">
        <div class="gantt-header">
            <div>
                <h1>{title}</h1>
                <div class="gantt-range">{range}</div>
            </div>
{controls}
        </div>
        <div id="status" class="gantt-status">{status}</div>
        <div class="gantt-wrapper">
            <div id="gantt-chart" class="gantt-chart">
{axis}
{rows}
            </div>
        </div>
{legend}
    </div>
    <script>
{js}
    </script>
</body>
</html>"#,
            title = html_escape(&self.title),
        )
    }

    /// Axis row: an empty label cell and the month ticks
    fn render_axis(&self, timeline: Option<&Timeline>) -> String {
        let mut html = String::from(
            "                <div class=\"gantt-row axis\">\n                    <div class=\"label-col\">Activity</div>\n                    <div class=\"bar-col\">\n",
        );
        if let Some(timeline) = timeline {
            for tick in timeline.ticks(self.zoom) {
                let month = tick
                    .project_month
                    .map(|m| format!("<small>M{m}</small>"))
                    .unwrap_or_default();
                html.push_str(&format!(
                    "                        <div class=\"tick\" style=\"left:{left:.3}%\"><span>{label}</span>{month}</div>\n",
                    left = tick.position,
                    label = tick.label,
                ));
            }
        }
        html.push_str("                    </div>\n                </div>\n");
        html
    }

    /// Render a single task row
    fn render_task_row(
        &self,
        tree: &TaskTree,
        collapsed: &CollapseSet,
        index: usize,
        task: &Task,
        timeline: Option<&Timeline>,
        colors: &ColorMap,
    ) -> String {
        let is_group = task.is_group();
        let is_collapsed = is_group && collapsed.is_collapsed(index);
        let hidden = if is_visible(tree, collapsed, index) {
            ""
        } else {
            " style=\"display:none\""
        };
        let mut classes = vec!["gantt-row", task.kind.as_str()];
        if is_collapsed {
            classes.push("collapsed");
        }

        let caret = if is_group {
            format!(
                "<span class=\"caret\">{}</span>",
                if is_collapsed { "▶" } else { "▼" }
            )
        } else {
            String::new()
        };
        let id = task
            .id
            .as_deref()
            .filter(|id| *id != task.name)
            .map(|id| format!("<span class=\"task-id\">{}</span>", html_escape(id)))
            .unwrap_or_default();

        let bars = match timeline {
            Some(timeline) => self.render_bars(task, timeline, colors.get(index)),
            None => String::new(),
        };

        format!(
            r#"                <div class="{classes}" data-index="{index}" data-level="{level}"{hidden}>
                    <div class="label-col" style="padding-left:{pad}px">{caret}{id}<span class="task-name">{name}</span></div>
                    <div class="bar-col">{bars}</div>
                </div>
"#,
            classes = classes.join(" "),
            level = task.level,
            pad = 12 + task.level as u32 * INDENT_PX,
            name = html_escape(&task.name),
        )
    }

    fn render_bars(&self, task: &Task, timeline: &Timeline, color: Option<&str>) -> String {
        let color = color.unwrap_or(&self.colors.default_color);
        let Some((start, end)) = task.span() else {
            return String::new();
        };
        let name = html_escape(&task.name);

        match task.kind {
            TaskKind::Header | TaskKind::SubHeader => {
                let bar = timeline.bar(start, end);
                format!(
                    r#"<div class="summary-bar" style="left:{left:.3}%;width:{width:.3}%" title="{name} (summary)"></div>"#,
                    left = bar.left,
                    width = bar.width,
                )
            }
            TaskKind::Milestone => {
                let pos = timeline.position(start);
                format!(
                    r#"<div class="milestone-diamond" style="left:calc({pos:.3}% - 5px)" title="{name}: {date}"></div><span class="milestone-label" style="left:calc({pos:.3}% + 10px)">{short}</span>"#,
                    date = to_display_date(start),
                    short = to_short_display_date(start),
                )
            }
            TaskKind::Activity => {
                let bar = timeline.bar(start, end);
                let days = task.duration_days().unwrap_or_default();
                let label = if bar.width > DAY_LABEL_MIN_WIDTH {
                    format!("{days}d")
                } else {
                    String::new()
                };
                format!(
                    r#"<div class="gantt-bar" style="left:{left:.3}%;width:{width:.3}%;background:{color}" title="{name}: {days} days ({from} – {to})">{label}</div>"#,
                    left = bar.left,
                    width = bar.width,
                    from = to_display_date(start),
                    to = to_display_date(end),
                )
            }
        }
    }

    /// Generate CSS styles
    fn generate_css(&self) -> String {
        format!(
            r#"        :root {{
            --summary-color: {summary};
            --milestone-color: {milestone};
            --milestone-label-color: {milestone_label};
            --bg-color: {bg};
            --grid-color: {grid};
            --text-color: {text};
            --muted-color: {muted};
            --header-bg: {header_bg};
            --header-row-bg: {header_row};
            --sub-header-row-bg: {sub_header_row};
            --label-width: {label_width}px;
            --timeline-width: {chart_width}px;
            --row-height: {row_height}px;
        }}
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: system-ui, -apple-system, sans-serif;
            background: var(--bg-color);
            color: var(--text-color);
            padding: 20px;
        }}
        .gantt-header {{
            display: flex;
            justify-content: space-between;
            align-items: center;
            margin-bottom: 12px;
        }}
        .gantt-header h1 {{
            font-size: 1.5rem;
            font-weight: 600;
        }}
        .gantt-range, .gantt-status {{
            font-size: 13px;
            color: var(--muted-color);
        }}
        .gantt-status {{ margin-bottom: 8px; }}
        .gantt-controls button {{
            padding: 6px 14px;
            margin-left: 8px;
            border: 1px solid var(--text-color);
            background: transparent;
            color: var(--text-color);
            cursor: pointer;
            border-radius: 4px;
            font-size: 13px;
        }}
        .gantt-controls button:hover {{
            background: rgba(128,128,128,0.2);
        }}
        .gantt-wrapper {{
            overflow-x: auto;
            border: 1px solid var(--grid-color);
            border-radius: 8px;
        }}
        .gantt-chart {{
            width: calc(var(--label-width) + var(--timeline-width));
        }}
        .gantt-row {{
            display: flex;
            height: var(--row-height);
            border-bottom: 1px solid var(--grid-color);
            font-size: 12px;
        }}
        .gantt-row.header {{ background: var(--header-row-bg); font-weight: 700; }}
        .gantt-row.sub-header {{ background: var(--sub-header-row-bg); font-weight: 600; }}
        .gantt-row.axis {{ background: var(--header-bg); height: 40px; font-weight: 600; }}
        .label-col {{
            position: sticky;
            left: 0;
            z-index: 2;
            flex: 0 0 var(--label-width);
            display: flex;
            align-items: center;
            gap: 6px;
            padding-right: 8px;
            overflow: hidden;
            white-space: nowrap;
            text-overflow: ellipsis;
            background: inherit;
            border-right: 1px solid var(--grid-color);
        }}
        .gantt-row:not(.axis) .label-col {{ background: var(--bg-color); }}
        .gantt-row.header .label-col {{ background: var(--header-row-bg); }}
        .gantt-row.sub-header .label-col {{ background: var(--sub-header-row-bg); }}
        .gantt-row.header .label-col, .gantt-row.sub-header .label-col {{ cursor: pointer; }}
        .gantt-row.collapsed .task-name {{ color: var(--muted-color); }}
        .caret {{ font-size: 10px; width: 10px; }}
        .task-id {{ color: var(--muted-color); font-family: ui-monospace, monospace; }}
        .task-name {{ overflow: hidden; text-overflow: ellipsis; }}
        .bar-col {{
            position: relative;
            flex: 0 0 var(--timeline-width);
        }}
        .tick {{
            position: absolute;
            top: 4px;
            padding-left: 4px;
            border-left: 1px solid var(--grid-color);
            height: 32px;
            white-space: nowrap;
            font-size: 11px;
        }}
        .tick small {{
            display: block;
            color: var(--muted-color);
            font-weight: 400;
        }}
        .gantt-bar, .summary-bar {{
            position: absolute;
            border-radius: 3px;
        }}
        .gantt-bar {{
            top: 20%;
            height: 60%;
            color: #ffffff;
            font-size: 10px;
            line-height: calc(var(--row-height) * 0.6);
            text-align: center;
            overflow: hidden;
            white-space: nowrap;
        }}
        .summary-bar {{
            top: 40%;
            height: 20%;
            background: var(--summary-color);
        }}
        .milestone-diamond {{
            position: absolute;
            top: calc(50% - 5px);
            width: 10px;
            height: 10px;
            background: var(--milestone-color);
            transform: rotate(45deg);
        }}
        .milestone-label {{
            position: absolute;
            top: calc(50% - 6px);
            font-size: 9px;
            font-weight: 800;
            color: var(--milestone-label-color);
            white-space: nowrap;
        }}
        .gantt-legend {{
            display: flex;
            flex-wrap: wrap;
            gap: 16px;
            margin-top: 12px;
            font-size: 12px;
        }}
        .legend-item {{
            display: flex;
            align-items: center;
            gap: 6px;
        }}
        .legend-box {{
            width: 16px;
            height: 12px;
            border-radius: 2px;
        }}"#,
            summary = self.theme.summary_color,
            milestone = self.theme.milestone_color,
            milestone_label = self.theme.milestone_label_color,
            bg = self.theme.background_color,
            grid = self.theme.grid_color,
            text = self.theme.text_color,
            muted = self.theme.muted_color,
            header_bg = self.theme.header_bg,
            header_row = self.theme.header_row_bg,
            sub_header_row = self.theme.sub_header_row_bg,
            label_width = self.label_width,
            chart_width = self.chart_width,
            row_height = self.row_height,
        )
    }

    /// Generate JavaScript for interactivity
    ///
    /// The script only needs each row's level and whether it is a group; it
    /// resolves visibility with the same ancestor scan as [`is_visible`].
    fn generate_js(&self, tree: &TaskTree, collapsed: &CollapseSet) -> String {
        let data = json!({
            "levels": tree.iter().map(|t| t.level).collect::<Vec<_>>(),
            "groups": tree.iter().map(Task::is_group).collect::<Vec<_>>(),
            "collapsed": collapsed.iter().collect::<Vec<_>>(),
            "highLevelDepth": self.high_level_depth,
            "timelineWidth": self.chart_width,
        });
        format!("        const GANTT = {data};\n{SCRIPT}")
    }
}

impl Renderer for HtmlGanttRenderer {
    type Output = String;

    fn render(&self, tree: &TaskTree, collapsed: &CollapseSet) -> Result<String, RenderError> {
        if tree.is_empty() {
            return Err(RenderError::InvalidData("No tasks to render".into()));
        }

        Ok(self.generate_html(tree, collapsed))
    }
}

/// Status line, e.g. `12 of 40 rows shown (28 hidden by collapse)`
pub fn status_text(total: usize, hidden: usize) -> String {
    let shown = total.saturating_sub(hidden);
    if hidden > 0 {
        format!("{shown} of {total} rows shown ({hidden} hidden by collapse)")
    } else {
        format!("{shown} of {total} rows shown")
    }
}

fn render_legend(colors: &ColorMap) -> String {
    let mut items = String::new();
    for (category, color) in &colors.categories {
        items.push_str(&format!(
            "            <span class=\"legend-item\"><span class=\"legend-box\" style=\"background:{color}\"></span>{}</span>\n",
            html_escape(category)
        ));
    }
    items.push_str("            <span class=\"legend-item\"><span class=\"legend-box\" style=\"background:var(--summary-color)\"></span>Summary</span>\n");
    items.push_str("            <span class=\"legend-item\"><span class=\"legend-box\" style=\"background:var(--milestone-color);transform:rotate(45deg);width:10px;height:10px\"></span>Milestone</span>\n");
    format!("        <div class=\"gantt-legend\">\n{items}        </div>")
}

const CONTROLS: &str = r#"            <div class="gantt-controls">
                <button onclick="expandAll()" title="Expand all groups">Expand all</button>
                <button onclick="highLevelView()" title="Collapse to top-level groups">High-level view</button>
                <button onclick="zoomIn()" title="Zoom In">+</button>
                <button onclick="zoomOut()" title="Zoom Out">−</button>
                <button onclick="resetZoom()" title="Reset">Reset</button>
            </div>"#;

const SCRIPT: &str = r#"
        const rows = Array.from(document.querySelectorAll('.gantt-row[data-index]'));
        const collapsed = new Set(GANTT.collapsed);
        const statusLine = document.getElementById('status');
        const chart = document.getElementById('gantt-chart');

        // Hidden when any ancestor (nearest earlier row with a smaller level) is collapsed
        function isHidden(idx) {
            let level = GANTT.levels[idx];
            for (let i = idx - 1; i >= 0; i--) {
                const lvl = GANTT.levels[i];
                if (lvl < level) {
                    if (collapsed.has(i)) return true;
                    level = lvl;
                }
            }
            return false;
        }

        function refresh() {
            let hidden = 0;
            rows.forEach((row, idx) => {
                const rowHidden = isHidden(idx);
                if (rowHidden) hidden++;
                row.style.display = rowHidden ? 'none' : '';
                row.classList.toggle('collapsed', collapsed.has(idx));
                const caret = row.querySelector('.caret');
                if (caret) caret.textContent = collapsed.has(idx) ? '▶' : '▼';
            });
            const shown = rows.length - hidden;
            statusLine.textContent = `${shown} of ${rows.length} rows shown` +
                (hidden > 0 ? ` (${hidden} hidden by collapse)` : '');
        }

        function toggleRow(idx) {
            if (collapsed.has(idx)) collapsed.delete(idx);
            else collapsed.add(idx);
            refresh();
        }

        function expandAll() {
            collapsed.clear();
            refresh();
        }

        function highLevelView() {
            collapsed.clear();
            GANTT.levels.forEach((lvl, idx) => {
                if (GANTT.groups[idx] && lvl >= GANTT.highLevelDepth) collapsed.add(idx);
            });
            refresh();
        }

        rows.forEach((row, idx) => {
            if (!GANTT.groups[idx]) return;
            row.querySelector('.label-col').addEventListener('click', () => toggleRow(idx));
        });

        // Zoom stretches the timeline track
        let currentZoom = 1;

        function applyZoom() {
            chart.style.setProperty('--timeline-width', `${GANTT.timelineWidth * currentZoom}px`);
        }

        function zoomIn() {
            currentZoom = Math.min(currentZoom * 1.25, 8);
            applyZoom();
        }

        function zoomOut() {
            currentZoom = Math.max(currentZoom / 1.25, 0.5);
            applyZoom();
        }

        function resetZoom() {
            currentZoom = 1;
            applyZoom();
        }"#;

/// HTML-escape a string
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
