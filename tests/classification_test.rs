mod common;

use color_eyre::Result;
use datascope::{ClassifyOptions, ColumnKind, Session, ViewKind};
use polars::prelude::*;

fn profiles_for(df: DataFrame) -> Result<Vec<datascope::ColumnProfile>> {
    let session = Session::from_lazy(df.lazy(), ClassifyOptions::default())?;
    Ok(session.analyze()?.profiles)
}

#[test]
fn test_mixed_frame_classification() -> Result<()> {
    let profiles = profiles_for(common::sample_frame())?;
    let kinds: Vec<(String, ColumnKind)> = profiles
        .iter()
        .map(|p| (p.name.clone(), p.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("age".to_string(), ColumnKind::Numeric),
            ("city".to_string(), ColumnKind::Categorical),
            ("active".to_string(), ColumnKind::Boolean),
            ("score".to_string(), ColumnKind::Numeric),
        ]
    );
    Ok(())
}

#[test]
fn test_fully_parseable_text_is_always_numeric() -> Result<()> {
    // numbers stored as text, with a missing cell
    let df = df!("n" => &[Some("12"), Some("7.5"), None, Some("-3")])?;
    let profiles = profiles_for(df)?;
    assert_eq!(profiles[0].kind, ColumnKind::Numeric);
    let summary = profiles[0].numeric.unwrap();
    assert_eq!(summary.min, -3.0);
    assert_eq!(summary.max, 12.0);
    Ok(())
}

#[test]
fn test_high_cardinality_text_is_never_categorical() -> Result<()> {
    let values: Vec<String> = (0..1000).map(|i| format!("free text {i}")).collect();
    let df = df!("notes" => values)?;
    let profiles = profiles_for(df)?;
    assert_eq!(profiles[0].kind, ColumnKind::Unclassified);
    Ok(())
}

#[test]
fn test_mixed_type_column_is_not_an_error() -> Result<()> {
    // numbers and free text together: classified by cardinality, never a failure
    let df = df!("mixed" => &["1", "2", "banana", "1"])?;
    let profiles = profiles_for(df)?;
    assert_eq!(profiles[0].kind, ColumnKind::Categorical);
    Ok(())
}

#[test]
fn test_all_missing_column_is_unclassified_with_zero_views() -> Result<()> {
    let df = df!(
        "empty" => &[None::<&str>, None, None],
        "x" => &[1i64, 2, 3]
    )?;
    let session = Session::from_lazy(df.lazy(), ClassifyOptions::default())?;
    let report = session.analyze()?;
    assert_eq!(report.profiles[0].kind, ColumnKind::Unclassified);
    assert!(report.manifest.views_for("empty").unwrap().is_empty());
    Ok(())
}

#[test]
fn test_single_numeric_with_categorical_column() -> Result<()> {
    // age=[25,30,missing,40], city=["NY","LA","NY","SF"]
    let df = df!(
        "age" => &[Some(25i64), Some(30), None, Some(40)],
        "city" => &["NY", "LA", "NY", "SF"]
    )?;
    let session = Session::from_lazy(df.lazy(), ClassifyOptions::default())?;
    let report = session.analyze()?;

    assert_eq!(report.profiles[0].kind, ColumnKind::Numeric);
    assert_eq!(
        report.manifest.views_for("age").unwrap(),
        &[ViewKind::Histogram, ViewKind::Kde, ViewKind::Boxplot]
    );
    assert_eq!(report.profiles[1].kind, ColumnKind::Categorical);
    assert_eq!(report.profiles[1].distinct_count, 3);
    assert_eq!(
        report.manifest.views_for("city").unwrap(),
        &[ViewKind::BoxplotByCategory, ViewKind::UniqueValueList]
    );
    // only one numeric column: no correlation heatmap
    assert!(!report
        .manifest
        .has_table_view(datascope::TableViewKind::CorrelationHeatmap));
    assert!(report.correlation.is_none());
    Ok(())
}

#[test]
fn test_cardinality_threshold_is_configurable() -> Result<()> {
    let df = df!("c" => &["a", "b", "c", "d", "e"])?;
    let strict = ClassifyOptions {
        cardinality_cap: 3,
        cardinality_fraction: 0.0,
        ..ClassifyOptions::default()
    };
    let session = Session::from_lazy(df.clone().lazy(), strict)?;
    assert_eq!(
        session.analyze()?.profiles[0].kind,
        ColumnKind::Unclassified
    );

    let relaxed = ClassifyOptions {
        cardinality_cap: 5,
        cardinality_fraction: 0.0,
        ..ClassifyOptions::default()
    };
    let session = Session::from_lazy(df.lazy(), relaxed)?;
    assert_eq!(session.analyze()?.profiles[0].kind, ColumnKind::Categorical);
    Ok(())
}
