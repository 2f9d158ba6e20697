//! Per-column profiles and the pairwise correlation matrix.
//!
//! Profiles are derived, read-only summaries of an already-collected
//! DataFrame: semantic kind, missing/distinct counts, descriptive statistics
//! for numeric columns, and a top-value breakdown for discrete columns.

use color_eyre::Result;
use polars::prelude::*;

use crate::classify::{classify_column, parse_numeric_strings, ClassifyOptions, ColumnKind};

/// Number of entries kept in a top-value breakdown.
pub const TOP_VALUES_LIMIT: usize = 20;

/// Minimum shared non-null rows for a correlation to be meaningful.
const MIN_CORRELATION_ROWS: usize = 3;

#[derive(Debug, Clone)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: DataType,
    pub kind: ColumnKind,
    pub count: usize,
    pub null_count: usize,
    /// Distinct non-missing values.
    pub distinct_count: usize,
    pub numeric: Option<NumericSummary>,
    /// (value, count) pairs, most frequent first. Empty for kinds without a breakdown.
    pub top_values: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Copy)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    pub median: f64,
}

/// Computes a profile for every column of the frame, in schema order.
pub fn profile_columns(df: &DataFrame, options: &ClassifyOptions) -> Result<Vec<ColumnProfile>> {
    let mut profiles = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        profiles.push(profile_column(column.as_materialized_series(), options)?);
    }
    Ok(profiles)
}

fn profile_column(series: &Series, options: &ClassifyOptions) -> Result<ColumnProfile> {
    let kind = classify_column(series, options)?;
    let count = series.len();
    let null_count = series.null_count();
    let distinct_count = series.drop_nulls().n_unique()?;

    let numeric = if kind == ColumnKind::Numeric {
        Some(compute_numeric_summary(&numeric_series(series)?))
    } else {
        None
    };

    let top_values = match kind {
        ColumnKind::Categorical | ColumnKind::Boolean => top_values(series)?,
        ColumnKind::Unclassified
            if distinct_count > 0 && distinct_count <= options.unique_display_cap =>
        {
            top_values(series)?
        }
        _ => Vec::new(),
    };

    Ok(ColumnProfile {
        name: series.name().to_string(),
        dtype: series.dtype().clone(),
        kind,
        count,
        null_count,
        distinct_count,
        numeric,
        top_values,
    })
}

/// Returns a series with numeric values for a column classified numeric:
/// the column itself for numeric dtypes, otherwise its values parsed as f64.
pub fn numeric_series(series: &Series) -> Result<Series> {
    if series.dtype().is_numeric() {
        Ok(series.clone())
    } else {
        parse_numeric_strings(series)
    }
}

fn compute_numeric_summary(series: &Series) -> NumericSummary {
    let mean = series.mean().unwrap_or(f64::NAN);
    let std = series.std(1).unwrap_or(f64::NAN); // Sample std (ddof=1)
    let median = series.median().unwrap_or(f64::NAN);

    let min = if let Ok(v) = series.min::<f64>() {
        v.unwrap_or(f64::NAN)
    } else if let Ok(v) = series.min::<i64>() {
        v.map(|x| x as f64).unwrap_or(f64::NAN)
    } else {
        f64::NAN
    };

    let max = if let Ok(v) = series.max::<f64>() {
        v.unwrap_or(f64::NAN)
    } else if let Ok(v) = series.max::<i64>() {
        v.map(|x| x as f64).unwrap_or(f64::NAN)
    } else {
        f64::NAN
    };

    NumericSummary {
        min,
        max,
        mean,
        std,
        median,
    }
}

/// Most frequent non-missing values with their counts, capped at `TOP_VALUES_LIMIT`.
fn top_values(series: &Series) -> Result<Vec<(String, usize)>> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return Ok(Vec::new());
    }
    let vc = non_null.value_counts(true, false, "counts".into(), false)?;
    let (value_col, count_col) = match vc.get_columns() {
        [v, c] => (v.as_materialized_series(), c.as_materialized_series()),
        _ => return Ok(Vec::new()),
    };
    let take = vc.height().min(TOP_VALUES_LIMIT);
    let mut out = Vec::with_capacity(take);
    for i in 0..take {
        let value = value_col.get(i)?.str_value().to_string();
        let count = count_col.get(i)?.try_extract::<u32>()? as usize;
        out.push((value, count));
    }
    Ok(out)
}

#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Square, symmetric, unit diagonal. NaN where a pair has too few shared rows.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlation between two named columns, if both are in the matrix.
    pub fn value(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

/// Computes the pairwise Pearson correlation matrix for the given numeric
/// series. Nulls are dropped pairwise; requires at least 2 columns.
pub fn compute_correlation_matrix(series: &[(String, Series)]) -> Result<CorrelationMatrix> {
    if series.len() < 2 {
        return Err(color_eyre::eyre::eyre!(
            "Need at least 2 numeric columns for correlation matrix"
        ));
    }

    let n = series.len();
    let mut values = vec![vec![1.0; n]; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let (_, a) = &series[i];
            let (_, b) = &series[j];

            let mask = a.is_not_null() & b.is_not_null();
            let a_clean = a.filter(&mask)?;
            let b_clean = b.filter(&mask)?;

            let r = if a_clean.len() < MIN_CORRELATION_ROWS {
                f64::NAN
            } else {
                pearson_correlation(&a_clean, &b_clean)
            };
            values[i][j] = r;
            values[j][i] = r; // Symmetric
        }
    }

    Ok(CorrelationMatrix {
        columns: series.iter().map(|(name, _)| name.clone()).collect(),
        values,
    })
}

fn pearson_correlation(a: &Series, b: &Series) -> f64 {
    let values1 = numeric_values_as_f64(a);
    let values2 = numeric_values_as_f64(b);
    if values1.len() != values2.len() || values1.len() < 2 {
        return f64::NAN;
    }

    let mean1: f64 = values1.iter().sum::<f64>() / values1.len() as f64;
    let mean2: f64 = values2.iter().sum::<f64>() / values2.len() as f64;

    let numerator: f64 = values1
        .iter()
        .zip(values2.iter())
        .map(|(v1, v2)| (v1 - mean1) * (v2 - mean2))
        .sum();

    let var1: f64 = values1.iter().map(|v| (v - mean1).powi(2)).sum();
    let var2: f64 = values2.iter().map(|v| (v - mean2).powi(2)).sum();

    if var1 == 0.0 || var2 == 0.0 {
        return 0.0;
    }

    numerator / (var1.sqrt() * var2.sqrt())
}

fn numeric_values_as_f64(series: &Series) -> Vec<f64> {
    if let Ok(ca) = series.f64() {
        ca.iter().flatten().collect()
    } else if let Ok(ca) = series.i64() {
        ca.iter().filter_map(|v| v.map(|x| x as f64)).collect()
    } else if let Ok(ca) = series.i32() {
        ca.iter().filter_map(|v| v.map(|x| x as f64)).collect()
    } else if let Ok(ca) = series.u64() {
        ca.iter().filter_map(|v| v.map(|x| x as f64)).collect()
    } else if let Ok(ca) = series.u32() {
        ca.iter().filter_map(|v| v.map(|x| x as f64)).collect()
    } else if let Ok(ca) = series.f32() {
        ca.iter().filter_map(|v| v.map(|x| x as f64)).collect()
    } else {
        match series.cast(&DataType::Float64) {
            Ok(cast) => match cast.f64() {
                Ok(ca) => ca.iter().flatten().collect(),
                Err(_) => Vec::new(),
            },
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn numeric_profile_has_summary() {
        let s = Series::new("age".into(), &[Some(25i64), Some(30), None, Some(40)]);
        let p = profile_column(&s, &ClassifyOptions::default()).unwrap();
        assert_eq!(p.kind, ColumnKind::Numeric);
        assert_eq!(p.count, 4);
        assert_eq!(p.null_count, 1);
        assert_eq!(p.distinct_count, 3);
        let numeric = p.numeric.unwrap();
        assert_eq!(numeric.min, 25.0);
        assert_eq!(numeric.max, 40.0);
        assert!((numeric.mean - 95.0 / 3.0).abs() < 1e-9);
        assert!(p.top_values.is_empty());
    }

    #[test]
    fn categorical_profile_has_top_values() {
        let s = Series::new("city".into(), &["NY", "LA", "NY", "SF"]);
        let p = profile_column(&s, &ClassifyOptions::default()).unwrap();
        assert_eq!(p.kind, ColumnKind::Categorical);
        assert_eq!(p.distinct_count, 3);
        assert_eq!(p.top_values.len(), 3);
        assert_eq!(p.top_values[0], ("NY".to_string(), 2));
        assert!(p.numeric.is_none());
    }

    #[test]
    fn numeric_text_profile_parses_values() {
        let s = Series::new("n".into(), &[Some("1"), Some("2"), None, Some("3")]);
        let p = profile_column(&s, &ClassifyOptions::default()).unwrap();
        assert_eq!(p.kind, ColumnKind::Numeric);
        let numeric = p.numeric.unwrap();
        assert_eq!(numeric.min, 1.0);
        assert_eq!(numeric.max, 3.0);
        assert_eq!(numeric.median, 2.0);
    }

    #[test]
    fn high_cardinality_text_has_no_top_values() {
        let values: Vec<String> = (0..500).map(|i| format!("row {i}")).collect();
        let s = Series::new("notes".into(), values);
        let p = profile_column(&s, &ClassifyOptions::default()).unwrap();
        assert_eq!(p.kind, ColumnKind::Unclassified);
        assert!(p.top_values.is_empty());
    }

    #[test]
    fn correlation_matrix_diagonal_and_symmetry() {
        let x: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v * 2.0 + 5.0).collect();
        let z: Vec<f64> = x.iter().map(|v| -v * 1.5 + 10.0).collect();
        let series = vec![
            ("x".to_string(), Series::new("x".into(), x)),
            ("y".to_string(), Series::new("y".into(), y)),
            ("z".to_string(), Series::new("z".into(), z)),
        ];
        let m = compute_correlation_matrix(&series).unwrap();
        assert_eq!(m.columns.len(), 3);
        assert!((m.values[0][0] - 1.0).abs() < 1e-9);
        assert!((m.values[0][1] - m.values[1][0]).abs() < 1e-9);
        assert!(m.value("x", "y").unwrap() > 0.99);
        assert!(m.value("x", "z").unwrap() < -0.99);
    }

    #[test]
    fn correlation_requires_two_columns() {
        let series = vec![(
            "x".to_string(),
            Series::new("x".into(), &[1.0f64, 2.0, 3.0]),
        )];
        assert!(compute_correlation_matrix(&series).is_err());
    }

    #[test]
    fn correlation_with_too_few_shared_rows_is_nan() {
        let a = Series::new("a".into(), &[Some(1.0f64), None, None, Some(2.0)]);
        let b = Series::new("b".into(), &[None, Some(1.0f64), Some(2.0), Some(3.0)]);
        let series = vec![("a".to_string(), a), ("b".to_string(), b)];
        let m = compute_correlation_matrix(&series).unwrap();
        assert!(m.value("a", "b").unwrap().is_nan());
    }
}
