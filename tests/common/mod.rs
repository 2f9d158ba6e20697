use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Small mixed-type frame used across tests: one numeric column with a
/// missing value, one categorical, one boolean-token, one float column.
#[allow(dead_code)]
pub fn sample_frame() -> DataFrame {
    df!(
        "age" => &[Some(25i64), Some(30), None, Some(40)],
        "city" => &["NY", "LA", "NY", "SF"],
        "active" => &["yes", "no", "yes", "yes"],
        "score" => &[1.5f64, 2.5, 3.5, 4.5]
    )
    .unwrap()
}

#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
