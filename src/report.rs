//! Rendering of analysis results: a plain-text summary for the terminal and
//! a JSON document for an external rendering collaborator.

use serde_json::{json, Value};

use crate::statistics::{ColumnProfile, CorrelationMatrix};
use crate::views::ViewManifest;

/// Everything one analysis pass produces for a table.
#[derive(Debug, Clone)]
pub struct DatasetReport {
    pub num_rows: usize,
    pub profiles: Vec<ColumnProfile>,
    pub manifest: ViewManifest,
    pub correlation: Option<CorrelationMatrix>,
}

impl DatasetReport {
    /// Plain-text summary: shape, per-column overview, numeric describe,
    /// value breakdowns, correlation matrix, and the chart manifest.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{} rows x {} columns\n",
            self.num_rows,
            self.profiles.len()
        ));

        if self.profiles.is_empty() {
            out.push_str("\nempty table: nothing to profile\n");
            return out;
        }

        let name_width = self
            .profiles
            .iter()
            .map(|p| p.name.len())
            .max()
            .unwrap_or(4)
            .max(4);

        out.push_str("\ncolumns\n");
        out.push_str(&format!(
            "  {:<name_width$}  {:<12}  {:<14}  {:>7}  {:>8}\n",
            "name", "kind", "dtype", "missing", "distinct"
        ));
        for p in &self.profiles {
            out.push_str(&format!(
                "  {:<name_width$}  {:<12}  {:<14}  {:>7}  {:>8}\n",
                p.name,
                p.kind.to_string(),
                p.dtype.to_string(),
                p.null_count,
                p.distinct_count
            ));
        }

        let numeric: Vec<&ColumnProfile> =
            self.profiles.iter().filter(|p| p.numeric.is_some()).collect();
        if !numeric.is_empty() {
            out.push_str("\nnumeric summary\n");
            out.push_str(&format!(
                "  {:<name_width$}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}\n",
                "name", "min", "max", "mean", "std", "median"
            ));
            for p in numeric {
                if let Some(s) = &p.numeric {
                    out.push_str(&format!(
                        "  {:<name_width$}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}\n",
                        p.name,
                        fmt_stat(s.min),
                        fmt_stat(s.max),
                        fmt_stat(s.mean),
                        fmt_stat(s.std),
                        fmt_stat(s.median)
                    ));
                }
            }
        }

        let with_breakdown: Vec<&ColumnProfile> = self
            .profiles
            .iter()
            .filter(|p| !p.top_values.is_empty())
            .collect();
        if !with_breakdown.is_empty() {
            out.push_str("\nvalue breakdowns\n");
            for p in with_breakdown {
                out.push_str(&format!("  {} ({} distinct)\n", p.name, p.distinct_count));
                for (value, count) in &p.top_values {
                    let pct = if p.count > 0 {
                        *count as f64 / p.count as f64 * 100.0
                    } else {
                        0.0
                    };
                    out.push_str(&format!("    {:<20}  {:>6}  {:>5.1}%\n", value, count, pct));
                }
            }
        }

        if let Some(corr) = &self.correlation {
            let corr_width = corr.columns.iter().map(|c| c.len()).max().unwrap_or(4).max(5);
            out.push_str("\ncorrelation\n");
            out.push_str(&format!("  {:<corr_width$}", ""));
            for c in &corr.columns {
                out.push_str(&format!("  {:>corr_width$}", c));
            }
            out.push('\n');
            for (i, c) in corr.columns.iter().enumerate() {
                out.push_str(&format!("  {:<corr_width$}", c));
                for v in &corr.values[i] {
                    out.push_str(&format!("  {:>corr_width$}", fmt_stat(*v)));
                }
                out.push('\n');
            }
        }

        out.push_str("\nsuggested charts\n");
        for column in &self.manifest.columns {
            let views = if column.views.is_empty() {
                "(none)".to_string()
            } else {
                column
                    .views
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            out.push_str(&format!("  {:<name_width$}  {}\n", column.name, views));
        }
        if !self.manifest.table.is_empty() {
            let table_views = self
                .manifest
                .table
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("  {:<name_width$}  {}\n", "(table)", table_views));
        }
        if !self.manifest.pairings.is_empty() {
            out.push_str("\ncategory boxplots\n");
            for pairing in &self.manifest.pairings {
                out.push_str(&format!("  {} by {}\n", pairing.numeric, pairing.category));
            }
        }

        out
    }

    /// JSON document for the external renderer. Non-finite correlation values
    /// serialize as null.
    pub fn to_json(&self) -> Value {
        let columns: Vec<Value> = self
            .profiles
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "kind": p.kind,
                    "dtype": p.dtype.to_string(),
                    "count": p.count,
                    "missing": p.null_count,
                    "distinct": p.distinct_count,
                    "numeric": p.numeric.as_ref().map(|s| json!({
                        "min": s.min,
                        "max": s.max,
                        "mean": s.mean,
                        "std": s.std,
                        "median": s.median,
                    })),
                    "top_values": p.top_values.iter().map(|(value, count)| json!({
                        "value": value,
                        "count": count,
                    })).collect::<Vec<_>>(),
                })
            })
            .collect();

        json!({
            "rows": self.num_rows,
            "columns": columns,
            "manifest": self.manifest,
            "correlation": self.correlation.as_ref().map(|c| json!({
                "columns": c.columns,
                "values": c.values,
            })),
        })
    }
}

/// Stat formatting: fixed-point for ordinary magnitudes, scientific for
/// extremes, "-" for NaN (e.g. all-missing numeric column).
fn fmt_stat(v: f64) -> String {
    if v.is_nan() {
        "-".to_string()
    } else if v.abs() >= 1e6 || (v.abs() < 1e-2 && v != 0.0) {
        format!("{:.2e}", v)
    } else {
        format!("{:.2}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassifyOptions;
    use crate::statistics::profile_columns;
    use crate::views::build_manifest;
    use polars::prelude::*;

    fn report_for(df: &DataFrame) -> DatasetReport {
        let options = ClassifyOptions::default();
        let profiles = profile_columns(df, &options).unwrap();
        let active: Vec<String> = profiles
            .iter()
            .filter(|p| p.numeric.is_some())
            .map(|p| p.name.clone())
            .collect();
        let manifest = build_manifest(&profiles, &options, &active, df.height());
        DatasetReport {
            num_rows: df.height(),
            profiles,
            manifest,
            correlation: None,
        }
    }

    #[test]
    fn text_report_mentions_every_column() {
        let df = df!(
            "age" => &[25i64, 30, 40],
            "city" => &["NY", "LA", "NY"]
        )
        .unwrap();
        let text = report_for(&df).render_text();
        assert!(text.contains("3 rows x 2 columns"));
        assert!(text.contains("age"));
        assert!(text.contains("city"));
        assert!(text.contains("histogram, kde, boxplot"));
        assert!(text.contains("value breakdowns"));
    }

    #[test]
    fn empty_report_renders_without_panic() {
        let df = DataFrame::empty();
        let text = report_for(&df).render_text();
        assert!(text.contains("0 rows x 0 columns"));
    }

    #[test]
    fn json_report_has_manifest_and_columns() {
        let df = df!(
            "age" => &[25i64, 30, 40],
            "flag" => &[true, false, true]
        )
        .unwrap();
        let value = report_for(&df).to_json();
        assert_eq!(value["rows"], 3);
        assert_eq!(value["columns"][0]["name"], "age");
        assert_eq!(value["columns"][0]["kind"], "numeric");
        assert_eq!(value["columns"][1]["kind"], "boolean");
        let views = value["manifest"]["columns"][0]["views"].as_array().unwrap();
        assert_eq!(views[0], "histogram");
        assert_eq!(views[1], "kde");
    }

    #[test]
    fn fmt_stat_handles_extremes() {
        assert_eq!(fmt_stat(f64::NAN), "-");
        assert_eq!(fmt_stat(0.0), "0.00");
        assert_eq!(fmt_stat(1234.5), "1234.50");
        assert!(fmt_stat(1e9).contains('e'));
        assert!(fmt_stat(0.0001).contains('e'));
    }
}
