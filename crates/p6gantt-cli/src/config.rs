//! Configuration file
//!
//! An optional TOML file with two tables, both fully defaulted:
//!
//! ```toml
//! [ingest]
//! activity_id_pattern = '^P\d+_'
//! pad_months = 2
//!
//! [ingest.columns]
//! category = ["Package"]
//!
//! [colors]
//! default_color = "#475569"
//! rules = [{ keyword = "piling", color = "#1e40af" }]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use p6gantt_ingest::IngestOptions;
use p6gantt_render::ColorScheme;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub ingest: IngestOptions,
    pub colors: ColorScheme,
}

impl Config {
    /// Read a config file, or the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = Config::parse(
            r##"
            [ingest]
            pad_months = 0
            project_month_one = "2024-03-01"

            [ingest.columns]
            category = ["Package"]

            [colors]
            default_color = "#000000"
            "##,
        )
        .unwrap();
        assert_eq!(config.ingest.pad_months, 0);
        assert_eq!(
            config.ingest.project_month_one,
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(config.ingest.columns.category, vec!["Package".to_string()]);
        assert_eq!(config.colors.default_color, "#000000");
        assert_eq!(config.colors.rules, ColorScheme::default().rules);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("[render]\ntheme = \"dark\"").is_err());
        assert!(Config::parse("[ingest]\npadding = 2").is_err());
    }

    #[test]
    fn load_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ingest]\npad_months = \"two\"").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid config file"));

        let missing = file.path().with_extension("missing");
        let err = Config::load(Some(&missing)).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read config file"));
    }

    #[test]
    fn load_without_path() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
