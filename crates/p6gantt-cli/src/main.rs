//! p6gantt CLI - Gantt charts from schedule exports
//!
//! Reads a CSV/TSV/JSON export of a scheduling tool, rebuilds the task
//! hierarchy and renders it as an interactive HTML page, SVG or Mermaid.

mod config;
mod inspect;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use p6gantt_core::{CollapseSet, Renderer, TaskTree};
use p6gantt_ingest::{load_file, read_rows, TreeBuilder};
use p6gantt_render::{HtmlGanttRenderer, MermaidRenderer, SvgRenderer, Zoom};

use crate::config::Config;
use crate::inspect::Report;

#[derive(Parser)]
#[command(name = "p6gantt")]
#[command(author, version, about = "Gantt charts from schedule exports", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML configuration file
    #[arg(short, long, global = true, env = "P6GANTT_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which columns were detected
    Columns {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List the classified tasks
    Inspect {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Render a chart
    Render {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format; guessed from the output extension when omitted
        #[arg(short, long, value_enum)]
        format: Option<ChartFormat>,

        /// Chart title (defaults to the input file name)
        #[arg(short, long)]
        title: Option<String>,

        /// Dark color theme
        #[arg(long)]
        dark: bool,

        /// Axis tick spacing: month, quarter, half-year or year
        #[arg(short, long, default_value_t = Zoom::default())]
        zoom: Zoom,

        #[command(flatten)]
        view: ViewArgs,
    },
}

/// Initial collapse state
#[derive(clap::Args)]
struct ViewArgs {
    /// Collapse every group at this outline level and deeper
    #[arg(long, value_name = "LEVEL")]
    high_level: Option<usize>,

    /// Collapse the groups at these row indices
    #[arg(long, value_name = "INDEX", num_args = 1.., value_delimiter = ',')]
    collapse: Vec<usize>,
}

impl ViewArgs {
    fn collapse_set(&self, tree: &TaskTree) -> Result<CollapseSet> {
        let mut collapsed = CollapseSet::new();
        if let Some(depth) = self.high_level {
            collapsed.high_level_view(tree, depth);
        }
        for &index in &self.collapse {
            let Some(task) = tree.get(index) else {
                bail!("Row {index} does not exist ({} rows)", tree.len());
            };
            if !tree.has_children(index) {
                tracing::warn!(index, name = %task.name, "collapsing a row without children");
            }
            collapsed.collapse(index);
        }
        Ok(collapsed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ListFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ChartFormat {
    Html,
    Svg,
    Mermaid,
}

impl ChartFormat {
    fn from_extension(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("svg") => Self::Svg,
            Some("mmd" | "mermaid" | "md") => Self::Mermaid,
            _ => Self::Html,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let builder =
        TreeBuilder::from_options(&config.ingest).context("Invalid [ingest] configuration")?;

    match cli.command {
        Commands::Columns { file } => cmd_columns(&file, &builder),
        Commands::Inspect { file, format, view } => {
            let tree = load(&file, &builder)?;
            let collapsed = view.collapse_set(&tree)?;
            let report = Report::new(&tree, &collapsed, &config.colors);
            match format {
                ListFormat::Text => print!("{}", report.to_text()),
                ListFormat::Json => println!("{}", report.to_json()?),
            }
            Ok(())
        }
        Commands::Render {
            file,
            output,
            format,
            title,
            dark,
            zoom,
            view,
        } => {
            let tree = load(&file, &builder)?;
            let collapsed = view.collapse_set(&tree)?;
            let format = format.unwrap_or_else(|| {
                output
                    .as_deref()
                    .map_or(ChartFormat::Html, ChartFormat::from_extension)
            });
            let title = title.unwrap_or_else(|| {
                file.file_stem()
                    .map_or_else(|| "Schedule".into(), |s| s.to_string_lossy().into_owned())
            });

            let chart = match format {
                ChartFormat::Html => {
                    let mut renderer = HtmlGanttRenderer::new()
                        .title(title)
                        .zoom(zoom)
                        .colors(config.colors);
                    if let Some(depth) = view.high_level {
                        renderer = renderer.high_level_depth(depth);
                    }
                    if dark {
                        renderer = renderer.dark_theme();
                    }
                    renderer.render(&tree, &collapsed)
                }
                ChartFormat::Svg => {
                    let mut renderer = SvgRenderer::new()
                        .title(title)
                        .zoom(zoom)
                        .colors(config.colors);
                    if dark {
                        renderer = renderer.dark_theme();
                    }
                    renderer.render(&tree, &collapsed)
                }
                ChartFormat::Mermaid => MermaidRenderer::new()
                    .title(title)
                    .render(&tree, &collapsed),
            }
            .with_context(|| format!("Failed to render {}", file.display()))?;

            match output {
                Some(path) => {
                    std::fs::write(&path, chart)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!(path = %path.display(), ?format, "chart written");
                }
                None => print!("{chart}"),
            }
            Ok(())
        }
    }
}

fn load(file: &Path, builder: &TreeBuilder) -> Result<TaskTree> {
    load_file(file, builder).with_context(|| format!("Failed to load {}", file.display()))
}

fn cmd_columns(file: &Path, builder: &TreeBuilder) -> Result<()> {
    let rows = read_rows(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let columns = builder
        .detect_columns(&rows)
        .with_context(|| format!("Failed to detect columns in {}", file.display()))?;
    for field in p6gantt_ingest::ColumnField::ALL {
        println!("{:<9} {}", field.label(), columns.get(field).unwrap_or("-"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(ChartFormat::from_extension(Path::new("a.svg")), ChartFormat::Svg);
        assert_eq!(ChartFormat::from_extension(Path::new("a.MMD")), ChartFormat::Mermaid);
        assert_eq!(ChartFormat::from_extension(Path::new("a.html")), ChartFormat::Html);
        assert_eq!(ChartFormat::from_extension(Path::new("chart")), ChartFormat::Html);
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn collapse_accepts_lists() {
        let cli = Cli::try_parse_from([
            "p6gantt", "inspect", "plan.csv", "--collapse", "1,4", "--high-level", "2",
        ])
        .unwrap();
        let Commands::Inspect { view, .. } = cli.command else {
            panic!("expected inspect");
        };
        assert_eq!(view.collapse, vec![1, 4]);
        assert_eq!(view.high_level, Some(2));
    }
}
