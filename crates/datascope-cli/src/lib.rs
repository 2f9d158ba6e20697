//! Shared CLI definitions for datascope.
//!
//! Used by the main binary, by the build script (manpage), and by tests
//! that build argument sets programmatically.

use clap::{Parser, ValueEnum};
use std::path::Path;

/// File format for data files (used to bypass extension-based detection).
/// When `--format` is not specified, format is auto-detected from the file extension.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FileFormat {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// Excel (.xls, .xlsx, .xlsm, .xlsb)
    Excel,
}

impl FileFormat {
    /// Detect file format from path extension. Returns None when extension is missing or unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Parse format from extension string (e.g. "csv", "xlsx").
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            "xls" | "xlsx" | "xlsm" | "xlsb" => Some(Self::Excel),
            _ => None,
        }
    }

    /// Default field delimiter for delimited text formats. None for binary formats.
    pub fn default_delimiter(&self) -> Option<u8> {
        match self {
            Self::Csv => Some(b','),
            Self::Tsv => Some(b'\t'),
            Self::Excel => None,
        }
    }
}

/// Command-line arguments for datascope
#[derive(Clone, Parser, Debug)]
#[command(
    name = "datascope",
    version,
    about = "Profile a tabular dataset and select the charts worth drawing"
)]
pub struct Args {
    /// Path to the data file to profile (not required with --generate-config)
    #[arg(required_unless_present = "generate_config", value_name = "PATH")]
    pub path: Option<std::path::PathBuf>,

    /// Force file format (csv, tsv, excel).
    /// By default format is auto-detected from the file extension.
    #[arg(long = "format", value_enum)]
    pub format: Option<FileFormat>,

    /// Specify the delimiter to use when reading a delimited text file
    #[arg(long = "delimiter")]
    pub delimiter: Option<u8>,

    /// Specify that the file has no header
    #[arg(long = "no-header")]
    pub no_header: Option<bool>,

    /// Skip this many rows when reading a file
    #[arg(long = "skip-rows")]
    pub skip_rows: Option<usize>,

    /// Number of rows to use when inferring CSV schema (default: 1000). Larger values reduce risk of wrong type (e.g. int then N/A).
    #[arg(long = "infer-schema-length", value_name = "N")]
    pub infer_schema_length: Option<usize>,

    /// Treat these values as null when reading CSV. Use once per value. Example: --null-value NA --null-value missing
    #[arg(long = "null-value", value_name = "VAL")]
    pub null_value: Vec<String>,

    /// Try to parse CSV string columns as dates (e.g. YYYY-MM-DD, ISO datetime). Default: true
    #[arg(long = "parse-dates", value_name = "BOOL", value_parser = clap::value_parser!(bool))]
    pub parse_dates: Option<bool>,

    /// Excel sheet to load: 0-based index (e.g. 0) or sheet name (e.g. "Sales")
    #[arg(long = "sheet", value_name = "SHEET")]
    pub excel_sheet: Option<String>,

    /// Absolute distinct-value cap below which a text column is categorical (default: 20)
    #[arg(long = "cardinality-cap", value_name = "N")]
    pub cardinality_cap: Option<usize>,

    /// Fraction of row count admitted as categorical cardinality on large tables (default: 0.05)
    #[arg(long = "cardinality-fraction", value_name = "F")]
    pub cardinality_fraction: Option<f64>,

    /// Distinct-value cap above which free-text columns get no value listing (default: 100)
    #[arg(long = "unique-display-cap", value_name = "N")]
    pub unique_display_cap: Option<usize>,

    /// Distinct-value cap for offering per-category boxplots (default: 20)
    #[arg(long = "category-plot-cap", value_name = "N")]
    pub category_plot_cap: Option<usize>,

    /// Keep only numeric columns correlated with this column (plus the column itself)
    #[arg(long = "corr-filter", value_name = "COL")]
    pub corr_filter: Option<String>,

    /// Minimum absolute correlation for --corr-filter (default: 0.3)
    #[arg(long = "corr-threshold", value_name = "R", requires = "corr_filter")]
    pub corr_threshold: Option<f64>,

    /// Emit the report as JSON instead of text (for an external renderer)
    #[arg(long = "json", action)]
    pub json: bool,

    /// Generate default configuration file at ~/.config/datascope/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,

    /// Enable debug logging on stderr
    #[arg(long = "debug", action)]
    pub debug: bool,
}
