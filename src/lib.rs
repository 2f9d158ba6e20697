//! datascope: profile a tabular dataset and select the charts worth drawing.
//!
//! The library loads a CSV/TSV/Excel file into a Polars LazyFrame, classifies
//! every column, derives per-column profiles, and assembles a view manifest
//! for an external renderer. All state for one loaded table lives in a
//! [`Session`]; analysis is a pure function of the session.

pub mod classify;
pub mod config;
pub mod report;
pub mod statistics;
pub mod table;
pub mod views;

use std::path::Path;
use std::sync::Arc;

use color_eyre::Result;
use polars::prelude::*;
use tracing::debug;

pub use classify::{ClassifyOptions, ColumnKind};
pub use config::{AppConfig, ConfigManager};
pub use datascope_cli::FileFormat;
pub use report::DatasetReport;
pub use statistics::{ColumnProfile, CorrelationMatrix, NumericSummary};
pub use views::{TableViewKind, ViewKind, ViewManifest};

pub const APP_NAME: &str = "datascope";

/// Options controlling how a file is decoded into a table.
#[derive(Debug, Clone)]
pub struct OpenOptions {
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
    pub skip_rows: Option<usize>,
    /// When set, bypass extension-based format detection and use this format.
    pub format: Option<FileFormat>,
    /// Excel sheet: 0-based index or sheet name.
    pub excel_sheet: Option<String>,
    /// Tokens treated as null in every CSV column. None = Polars default.
    pub null_values: Option<Vec<String>>,
    /// Number of rows used to infer the CSV schema. None = Polars default.
    pub infer_schema_length: Option<usize>,
    /// When true, the CSV reader tries to parse string columns as dates.
    pub parse_dates: bool,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self {
            delimiter: None,
            has_header: None,
            skip_rows: None,
            format: None,
            excel_sheet: None,
            null_values: None,
            infer_schema_length: None,
            parse_dates: true,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = Some(has_header);
        self
    }

    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = Some(skip_rows);
        self
    }

    pub fn with_format(mut self, format: FileFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_excel_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.excel_sheet = Some(sheet.into());
        self
    }

    pub fn with_null_values(mut self, values: Vec<String>) -> Self {
        self.null_values = Some(values);
        self
    }

    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = Some(n);
        self
    }

    pub fn with_parse_dates(mut self, parse_dates: bool) -> Self {
        self.parse_dates = parse_dates;
        self
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps only numeric columns correlated with a base column.
#[derive(Debug, Clone)]
pub struct CorrelationFilter {
    pub base_column: String,
    /// Minimum absolute Pearson correlation against the base column.
    pub min_abs: f64,
}

/// One loaded table plus the settings the analysis depends on.
///
/// The table is immutable for the session; profiles and the manifest are
/// recomputed from it on every [`Session::analyze`] call (e.g. after the
/// correlation filter changes).
pub struct Session {
    lf: LazyFrame,
    schema: Arc<Schema>,
    classify: ClassifyOptions,
    correlation_filter: Option<CorrelationFilter>,
}

impl Session {
    /// Opens a file and prepares it for analysis. Decode failures are
    /// returned to the caller; no table is constructed.
    pub fn open(path: &Path, options: &OpenOptions, classify: ClassifyOptions) -> Result<Self> {
        let lf = table::load_table(path, options)?;
        Self::from_lazy(lf, classify)
    }

    /// Wraps an already-decoded table.
    pub fn from_lazy(lf: LazyFrame, classify: ClassifyOptions) -> Result<Self> {
        let schema = lf.clone().collect_schema()?;
        debug!(columns = schema.len(), "table ready");
        Ok(Self {
            lf,
            schema,
            classify,
            correlation_filter: None,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema.iter_names().map(|n| n.to_string()).collect()
    }

    pub fn classify_options(&self) -> &ClassifyOptions {
        &self.classify
    }

    /// Sets or clears the correlation filter. Takes effect on the next analyze.
    pub fn set_correlation_filter(&mut self, filter: Option<CorrelationFilter>) {
        self.correlation_filter = filter;
    }

    /// Runs one full analysis pass: collect, profile, filter, manifest.
    ///
    /// Pure with respect to the session: repeated calls yield identical
    /// reports until the filter or options change.
    pub fn analyze(&self) -> Result<DatasetReport> {
        let df = self.lf.clone().collect()?;
        let num_rows = df.height();
        let profiles = statistics::profile_columns(&df, &self.classify)?;

        let numeric_names: Vec<String> = profiles
            .iter()
            .filter(|p| p.kind == ColumnKind::Numeric)
            .map(|p| p.name.clone())
            .collect();

        let mut numeric_series = Vec::with_capacity(numeric_names.len());
        for name in &numeric_names {
            let series = statistics::numeric_series(df.column(name)?.as_materialized_series())?;
            numeric_series.push((name.clone(), series));
        }

        let active_numeric = self.apply_correlation_filter(&numeric_names, &numeric_series)?;

        let active_series: Vec<(String, Series)> = numeric_series
            .into_iter()
            .filter(|(name, _)| active_numeric.contains(name))
            .collect();
        let correlation = if active_series.len() >= 2 {
            Some(statistics::compute_correlation_matrix(&active_series)?)
        } else {
            None
        };

        let manifest = views::build_manifest(&profiles, &self.classify, &active_numeric, num_rows);
        debug!(
            rows = num_rows,
            columns = profiles.len(),
            active_numeric = active_numeric.len(),
            "analysis complete"
        );

        Ok(DatasetReport {
            num_rows,
            profiles,
            manifest,
            correlation,
        })
    }

    /// Narrows the numeric column set per the correlation filter: the base
    /// column plus every column whose |r| against it meets the threshold.
    /// A filter naming a non-numeric column is ignored, matching a filter
    /// selection that no longer applies after reload.
    fn apply_correlation_filter(
        &self,
        numeric_names: &[String],
        numeric_series: &[(String, Series)],
    ) -> Result<Vec<String>> {
        let Some(filter) = &self.correlation_filter else {
            return Ok(numeric_names.to_vec());
        };
        if !numeric_names.contains(&filter.base_column) {
            debug!(base = %filter.base_column, "correlation filter base is not numeric; ignoring");
            return Ok(numeric_names.to_vec());
        }
        if numeric_names.len() < 2 {
            return Ok(vec![filter.base_column.clone()]);
        }

        let matrix = statistics::compute_correlation_matrix(numeric_series)?;
        let active = numeric_names
            .iter()
            .filter(|name| {
                if **name == filter.base_column {
                    return true;
                }
                matrix
                    .value(&filter.base_column, name)
                    .map(|r| r.abs() >= filter.min_abs)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        Ok(active)
    }
}
