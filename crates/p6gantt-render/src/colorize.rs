//! Bar colors.
//!
//! Colors live in a [`ColorMap`] parallel to the task list; tasks are never
//! touched. Precedence per task:
//!
//! 1. its own category value, when the sheet has a category column
//! 2. a keyword rule matching the nearest group ancestor's name
//! 3. a keyword rule matching its own name
//! 4. the default color

use serde::{Deserialize, Serialize};

use p6gantt_core::TaskTree;

/// Case-insensitive substring rule
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRule {
    pub keyword: String,
    pub color: String,
}

impl ColorRule {
    pub fn new(keyword: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            color: color.into(),
        }
    }

    fn matches(&self, lowercase_name: &str) -> bool {
        !self.keyword.is_empty() && lowercase_name.contains(&self.keyword.to_lowercase())
    }
}

/// Construction phase keywords
fn default_rules() -> Vec<ColorRule> {
    [
        ("piling", "#1d4ed8"),
        ("excav", "#d97706"),
        ("erss", "#d97706"),
        ("strut", "#d97706"),
        ("basement", "#f97316"),
        ("raft", "#f97316"),
        ("slab", "#f97316"),
        ("tower", "#059669"),
        ("podium", "#059669"),
        ("structure", "#059669"),
        ("dts", "#db2777"),
        ("viaduct", "#db2777"),
        ("track", "#db2777"),
        ("facade", "#4f46e5"),
        ("fit", "#4f46e5"),
        ("mep", "#4f46e5"),
        ("as-built", "#a855f7"),
        ("statutory", "#a855f7"),
    ]
    .into_iter()
    .map(|(keyword, color)| ColorRule::new(keyword, color))
    .collect()
}

fn default_palette() -> Vec<String> {
    [
        "#2563eb", "#16a34a", "#ea580c", "#9333ea", "#0891b2", "#dc2626", "#ca8a04", "#db2777",
        "#4f46e5", "#0d9488",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_color() -> String {
    "#64748b".into()
}

/// Keyword rules, category palette and fallback color
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Checked in order, first match wins
    pub rules: Vec<ColorRule>,
    /// Colors for category values, cycled
    pub palette: Vec<String>,
    pub default_color: String,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            palette: default_palette(),
            default_color: default_color(),
        }
    }
}

impl ColorScheme {
    /// Color of the first rule whose keyword occurs in `name`
    pub fn keyword_color(&self, name: &str) -> Option<&str> {
        let lower = name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lower))
            .map(|rule| rule.color.as_str())
    }

    fn palette_color(&self, slot: usize) -> &str {
        if self.palette.is_empty() {
            &self.default_color
        } else {
            &self.palette[slot % self.palette.len()]
        }
    }
}

/// Color per task, index-aligned with the tree
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ColorMap {
    colors: Vec<String>,
    /// Category values in first-seen order with their colors
    pub categories: Vec<(String, String)>,
}

impl ColorMap {
    pub fn get(&self, index: usize) -> Option<&str> {
        self.colors.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.colors.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Compute every task's color
pub fn colorize(tree: &TaskTree, scheme: &ColorScheme) -> ColorMap {
    let mut map = ColorMap {
        colors: Vec::with_capacity(tree.len()),
        categories: Vec::new(),
    };
    let use_categories = tree.category_column.is_some();

    for (index, task) in tree.iter().enumerate() {
        let category = task
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| use_categories && !c.is_empty());

        let color = if let Some(category) = category {
            category_color(&mut map.categories, scheme, category)
        } else if let Some(color) = tree
            .group_ancestor(index)
            .and_then(|group| scheme.keyword_color(&tree.tasks[group].name))
        {
            color.to_string()
        } else {
            scheme
                .keyword_color(&task.name)
                .unwrap_or(&scheme.default_color)
                .to_string()
        };
        map.colors.push(color);
    }

    tracing::debug!(
        tasks = map.len(),
        categories = map.categories.len(),
        "colored tasks"
    );
    map
}

fn category_color(
    categories: &mut Vec<(String, String)>,
    scheme: &ColorScheme,
    category: &str,
) -> String {
    if let Some((_, color)) = categories.iter().find(|(name, _)| name == category) {
        return color.clone();
    }
    let color = scheme.palette_color(categories.len()).to_string();
    categories.push((category.to_string(), color.clone()));
    color
}
