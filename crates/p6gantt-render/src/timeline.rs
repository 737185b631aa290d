//! Chart axis geometry.
//!
//! Positions are percentages of the axis so that every backend can scale them
//! to its own width.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use p6gantt_core::dates::{add_months, month_start};
use p6gantt_core::{ChartBounds, ProjectAnchor, TaskTree};

/// Narrowest bar, in percent of the axis
pub const MIN_BAR_WIDTH: f64 = 0.5;

/// Spacing of the axis ticks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Zoom {
    Month,
    Quarter,
    #[default]
    HalfYear,
    Year,
}

impl Zoom {
    /// Months between ticks
    pub fn months(self) -> u32 {
        match self {
            Self::Month => 1,
            Self::Quarter => 3,
            Self::HalfYear => 6,
            Self::Year => 12,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::HalfYear => "half-year",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for Zoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zoom {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "month" | "monthly" => Ok(Self::Month),
            "quarter" | "quarterly" => Ok(Self::Quarter),
            "half-year" | "halfyear" | "half" => Ok(Self::HalfYear),
            "year" | "yearly" => Ok(Self::Year),
            other => Err(format!("unknown zoom level: {other}")),
        }
    }
}

/// Horizontal placement of a bar, in percent
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarGeometry {
    pub left: f64,
    pub width: f64,
}

/// One labelled axis tick
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub date: NaiveDate,
    pub position: f64,
    /// `Mon YYYY`
    pub label: String,
    /// Project month number, when the tree has an anchor
    pub project_month: Option<i32>,
}

/// Maps dates onto the chart axis
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timeline {
    bounds: ChartBounds,
    anchor: Option<ProjectAnchor>,
}

impl Timeline {
    pub fn new(bounds: ChartBounds, anchor: Option<ProjectAnchor>) -> Self {
        Self { bounds, anchor }
    }

    /// Timeline for a tree; `None` when nothing in it is dated
    pub fn from_tree(tree: &TaskTree) -> Option<Self> {
        tree.bounds.map(|bounds| Self::new(bounds, tree.anchor))
    }

    pub fn bounds(&self) -> ChartBounds {
        self.bounds
    }

    /// Position of a date in percent, clamped to the axis
    pub fn position(&self, date: NaiveDate) -> f64 {
        let total = self.bounds.days();
        if total <= 0 {
            return 0.0;
        }
        let offset = (date - self.bounds.start).num_days() as f64;
        (offset / total as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// Bar from `start` to `end` with a minimum visible width
    pub fn bar(&self, start: NaiveDate, end: NaiveDate) -> BarGeometry {
        let left = self.position(start);
        let right = self.position(end);
        BarGeometry {
            left,
            width: (right - left).max(MIN_BAR_WIDTH),
        }
    }

    /// Month-start ticks aligned to the zoom step (January-based)
    pub fn ticks(&self, zoom: Zoom) -> Vec<Tick> {
        let step = zoom.months();
        let mut current = month_start(self.bounds.start);
        if current < self.bounds.start {
            current = add_months(current, 1);
        }
        while (current.month() - 1) % step != 0 {
            current = add_months(current, 1);
        }

        let mut ticks = Vec::new();
        while current <= self.bounds.end {
            ticks.push(Tick {
                date: current,
                position: self.position(current),
                label: current.format("%b %Y").to_string(),
                project_month: self.anchor.map(|a| a.month_index(current)),
            });
            let next = add_months(current, step as i32);
            if next == current {
                break;
            }
            current = next;
        }
        ticks
    }
}
