//! TOML configuration: classification thresholds and file-loading defaults.
//!
//! The config file lives at `<config_dir>/datascope/config.toml`. A missing
//! file means defaults; `--generate-config` writes a fully commented-out
//! template so defaults stay in effect until a user uncomments a line.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classify::ClassifyOptions;

pub const CONFIG_FILE: &str = "config.toml";

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);
        Ok(Self { config_dir })
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path to the config file
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Ensure the config directory exists
    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Load the config file, or defaults when it doesn't exist.
    pub fn load(&self) -> Result<AppConfig> {
        let path = self.config_file();
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Write the generated default config file. Refuses to overwrite unless `force`.
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let path = self.config_file();
        if path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {} (use --force to overwrite)",
                path.display()
            ));
        }
        self.ensure_config_dir()?;
        std::fs::write(&path, self.generate_default_config())?;
        Ok(path)
    }

    /// Generate default configuration template as a string with comments.
    /// All fields are commented out so defaults are used, but users can uncomment to override.
    pub fn generate_default_config(&self) -> String {
        let toml_str = match toml::to_string_pretty(&AppConfig::default()) {
            Ok(s) => s,
            Err(_) => String::new(),
        };

        let mut result = String::new();
        result.push_str("# datascope configuration file\n");
        result
            .push_str("# This file uses TOML format. See https://toml.io/ for syntax reference.\n");
        result.push('\n');

        let mut current_section = String::new();
        for line in toml_str.lines() {
            if line.trim().is_empty() {
                result.push('\n');
                continue;
            }
            if let Some(section) = extract_section_name(line) {
                if let Some((_, header)) = SECTION_HEADERS.iter().find(|(s, _)| *s == section) {
                    result.push_str(header);
                    result.push('\n');
                }
                current_section = section;
                result.push_str("# ");
                result.push_str(line);
                result.push('\n');
                continue;
            }
            if let Some(field) = line.split('=').next().map(str::trim) {
                let key = if current_section.is_empty() {
                    field.to_string()
                } else {
                    format!("{}.{}", current_section, field)
                };
                if let Some((_, comment)) = FIELD_COMMENTS.iter().find(|(f, _)| *f == key) {
                    for comment_line in comment.lines() {
                        result.push_str("# ");
                        result.push_str(comment_line);
                        result.push('\n');
                    }
                }
            }
            result.push_str("# ");
            result.push_str(line);
            result.push('\n');
        }
        result
    }
}

fn extract_section_name(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        Some(trimmed.trim_matches(|c| c == '[' || c == ']').to_string())
    } else {
        None
    }
}

const SECTION_HEADERS: &[(&str, &str)] = &[
    (
        "file_loading",
        "# ============================================================================\n# File Loading Defaults\n# ============================================================================",
    ),
    (
        "classify",
        "# ============================================================================\n# Column Classification\n# ============================================================================\n# Thresholds controlling the categorical/unclassified boundary and view caps.",
    ),
];

const FIELD_COMMENTS: &[(&str, &str)] = &[
    (
        "version",
        "Configuration format version (for future compatibility)",
    ),
    (
        "file_loading.parse_dates",
        "Try to parse CSV string columns as dates (e.g. YYYY-MM-DD, ISO datetime). Default: true",
    ),
    (
        "classify.cardinality_cap",
        "A text column with at most this many distinct values is categorical. Default: 20",
    ),
    (
        "classify.cardinality_fraction",
        "On large tables, distinct counts up to this fraction of the row count\nstill classify as categorical. Default: 0.05",
    ),
    (
        "classify.unique_display_cap",
        "Free-text columns with more distinct values than this get no value listing. Default: 100",
    ),
    (
        "classify.category_plot_cap",
        "Categorical columns with at most this many distinct values are offered\nper-category boxplots against each numeric column. Default: 20",
    ),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub file_loading: FileLoadingConfig,
    pub classify: ClassifyConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            file_loading: FileLoadingConfig::default(),
            classify: ClassifyConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoadingConfig {
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
    pub skip_rows: Option<usize>,
    pub infer_schema_length: Option<usize>,
    pub parse_dates: bool,
}

impl Default for FileLoadingConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: None,
            skip_rows: None,
            infer_schema_length: None,
            parse_dates: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    pub cardinality_cap: usize,
    pub cardinality_fraction: f64,
    pub unique_display_cap: usize,
    pub category_plot_cap: usize,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        let defaults = ClassifyOptions::default();
        Self {
            cardinality_cap: defaults.cardinality_cap,
            cardinality_fraction: defaults.cardinality_fraction,
            unique_display_cap: defaults.unique_display_cap,
            category_plot_cap: defaults.category_plot_cap,
        }
    }
}

impl From<&ClassifyConfig> for ClassifyOptions {
    fn from(config: &ClassifyConfig) -> Self {
        Self {
            cardinality_cap: config.cardinality_cap,
            cardinality_fraction: config.cardinality_fraction,
            unique_display_cap: config.unique_display_cap,
            category_plot_cap: config.category_plot_cap,
        }
    }
}
