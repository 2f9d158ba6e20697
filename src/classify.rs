//! Column-kind classification: decides the semantic type of each column,
//! which drives both the statistics computed for it and the charts offered.

use color_eyre::Result;
use polars::prelude::*;
use std::collections::HashSet;

/// Token sets recognized as boolean when they cover a text column's distinct values.
/// Matched case-insensitively after trimming.
const BOOLEAN_TOKEN_PAIRS: &[[&str; 2]] = &[["true", "false"], ["yes", "no"]];

/// Semantic column type. Derived from the dtype and the values; a text column
/// can still classify as numeric or boolean when its values warrant it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Boolean,
    Categorical,
    Temporal,
    Unclassified,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Boolean => write!(f, "boolean"),
            ColumnKind::Categorical => write!(f, "categorical"),
            ColumnKind::Temporal => write!(f, "temporal"),
            ColumnKind::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// Thresholds controlling the categorical/unclassified boundary and the view caps.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyOptions {
    /// Absolute distinct-value count below which a text column is categorical.
    pub cardinality_cap: usize,
    /// Fraction of row count admitted as categorical cardinality. Lets wide
    /// categorical columns through on large tables where the cap alone is too strict.
    pub cardinality_fraction: f64,
    /// Distinct-value cap above which unclassified columns get no value listing.
    pub unique_display_cap: usize,
    /// Distinct-value cap for offering per-category boxplots.
    pub category_plot_cap: usize,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            cardinality_cap: 20,
            cardinality_fraction: 0.05,
            unique_display_cap: 100,
            category_plot_cap: 20,
        }
    }
}

impl ClassifyOptions {
    /// Effective categorical threshold for a table with `rows` rows:
    /// the larger of the absolute cap and the scaled fraction.
    pub fn cardinality_threshold(&self, rows: usize) -> usize {
        let scaled = (self.cardinality_fraction * rows as f64).ceil() as usize;
        self.cardinality_cap.max(scaled)
    }
}

/// Classifies one column.
///
/// Policy, in order: all-missing columns are unclassified; temporal dtypes are
/// temporal; numeric dtypes (or text that fully parses as numbers) are numeric;
/// boolean dtypes (or text drawn from one boolean token pair) are boolean;
/// below the cardinality threshold the column is categorical; otherwise it is
/// unclassified free text.
pub fn classify_column(series: &Series, options: &ClassifyOptions) -> Result<ColumnKind> {
    let rows = series.len();
    if series.null_count() == rows {
        return Ok(ColumnKind::Unclassified);
    }

    match series.dtype() {
        DataType::Date | DataType::Datetime(_, _) | DataType::Time | DataType::Duration(_) => {
            return Ok(ColumnKind::Temporal)
        }
        DataType::Boolean => return Ok(ColumnKind::Boolean),
        dtype if dtype.is_numeric() => return Ok(ColumnKind::Numeric),
        _ => {}
    }

    if let Ok(ca) = series.str() {
        if all_values_numeric(ca) {
            return Ok(ColumnKind::Numeric);
        }
        if matches_boolean_tokens(ca) {
            return Ok(ColumnKind::Boolean);
        }
    }

    let distinct = series.drop_nulls().n_unique()?;
    if distinct <= options.cardinality_threshold(rows) {
        Ok(ColumnKind::Categorical)
    } else {
        Ok(ColumnKind::Unclassified)
    }
}

/// True when every non-missing value parses as a number after trimming.
/// The column is guaranteed non-empty by the caller.
fn all_values_numeric(ca: &StringChunked) -> bool {
    ca.iter()
        .flatten()
        .all(|s| s.trim().parse::<f64>().is_ok())
}

/// True when the distinct non-missing values are a subset of one boolean token pair.
fn matches_boolean_tokens(ca: &StringChunked) -> bool {
    let mut seen: HashSet<String> = HashSet::new();
    for s in ca.iter().flatten() {
        seen.insert(s.trim().to_lowercase());
        if seen.len() > 2 {
            return false;
        }
    }
    BOOLEAN_TOKEN_PAIRS
        .iter()
        .any(|pair| seen.iter().all(|v| pair.contains(&v.as_str())))
}

/// Parses the non-missing values of a text column as f64, preserving nulls.
/// Used to compute numeric statistics for text columns classified numeric.
pub fn parse_numeric_strings(series: &Series) -> Result<Series> {
    let ca = series.str()?;
    let values: Vec<Option<f64>> = ca
        .iter()
        .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}
