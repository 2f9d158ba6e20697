//! View-manifest assembly: maps every column to the set of charts an
//! external renderer should offer for it, plus table-level views.

use serde::Serialize;

use crate::classify::{ClassifyOptions, ColumnKind};
use crate::statistics::ColumnProfile;

/// Per-column chart kind. Serialized names are the wire contract with the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    Histogram,
    Kde,
    Boxplot,
    BoxplotByCategory,
    UniqueValueList,
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewKind::Histogram => write!(f, "histogram"),
            ViewKind::Kde => write!(f, "kde"),
            ViewKind::Boxplot => write!(f, "boxplot"),
            ViewKind::BoxplotByCategory => write!(f, "boxplot-by-category"),
            ViewKind::UniqueValueList => write!(f, "unique-value-list"),
        }
    }
}

/// Table-level chart kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableViewKind {
    CorrelationHeatmap,
    MissingValueMap,
}

impl std::fmt::Display for TableViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableViewKind::CorrelationHeatmap => write!(f, "correlation-heatmap"),
            TableViewKind::MissingValueMap => write!(f, "missing-value-map"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnViews {
    pub name: String,
    pub views: Vec<ViewKind>,
}

/// One categorical-vs-numeric boxplot the renderer should draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPairing {
    pub category: String,
    pub numeric: String,
}

/// The full set of views offered for one table. Column entries appear in
/// schema order, one per column, possibly with an empty view set.
#[derive(Debug, Clone, Serialize)]
pub struct ViewManifest {
    pub columns: Vec<ColumnViews>,
    pub table: Vec<TableViewKind>,
    /// Expansion of every boxplot-by-category entry against each active numeric column.
    pub pairings: Vec<CategoryPairing>,
}

impl ViewManifest {
    /// View set for a named column, if the column exists.
    pub fn views_for(&self, name: &str) -> Option<&[ViewKind]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.views.as_slice())
    }

    pub fn has_table_view(&self, kind: TableViewKind) -> bool {
        self.table.contains(&kind)
    }

    /// True when no column or table view is offered at all.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty() && self.columns.iter().all(|c| c.views.is_empty())
    }
}

/// Builds the manifest from column profiles.
///
/// `active_numeric` is the set of numeric columns charts are offered for;
/// normally all numeric columns, narrowed when a correlation filter is set.
/// Deterministic: identical inputs always produce an identical manifest.
pub fn build_manifest(
    profiles: &[ColumnProfile],
    options: &ClassifyOptions,
    active_numeric: &[String],
    num_rows: usize,
) -> ViewManifest {
    let mut columns = Vec::with_capacity(profiles.len());
    let mut pairings = Vec::new();

    for profile in profiles {
        let views = match profile.kind {
            ColumnKind::Numeric => {
                if active_numeric.iter().any(|c| *c == profile.name) {
                    vec![ViewKind::Histogram, ViewKind::Kde, ViewKind::Boxplot]
                } else {
                    Vec::new()
                }
            }
            ColumnKind::Boolean => vec![ViewKind::UniqueValueList],
            ColumnKind::Categorical => {
                if profile.distinct_count <= options.category_plot_cap
                    && !active_numeric.is_empty()
                {
                    for numeric in active_numeric {
                        pairings.push(CategoryPairing {
                            category: profile.name.clone(),
                            numeric: numeric.clone(),
                        });
                    }
                    vec![ViewKind::BoxplotByCategory, ViewKind::UniqueValueList]
                } else {
                    vec![ViewKind::UniqueValueList]
                }
            }
            ColumnKind::Temporal => Vec::new(),
            ColumnKind::Unclassified => {
                if profile.distinct_count > 0
                    && profile.distinct_count <= options.unique_display_cap
                {
                    vec![ViewKind::UniqueValueList]
                } else {
                    Vec::new()
                }
            }
        };
        columns.push(ColumnViews {
            name: profile.name.clone(),
            views,
        });
    }

    let mut table = Vec::new();
    if active_numeric.len() >= 2 {
        table.push(TableViewKind::CorrelationHeatmap);
    }
    if num_rows > 0 && !profiles.is_empty() {
        table.push(TableViewKind::MissingValueMap);
    }

    ViewManifest {
        columns,
        table,
        pairings,
    }
}
