//! Table loading: CSV/TSV through the Polars lazy reader, Excel through
//! calamine with per-column type inference. Everything downstream works on
//! the resulting LazyFrame.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use color_eyre::Result;
use polars::io::csv::read::NullValues;
use polars::prelude::*;
use tracing::debug;

use crate::OpenOptions;
use datascope_cli::FileFormat;

/// Loads a file into a LazyFrame, dispatching on the explicit or
/// extension-detected format. Unknown formats are a rejected upload.
pub fn load_table(path: &Path, options: &OpenOptions) -> Result<LazyFrame> {
    let format = options
        .format
        .or_else(|| FileFormat::from_path(path))
        .ok_or_else(|| {
            color_eyre::eyre::eyre!(
                "Cannot determine file format for '{}' (use --format)",
                path.display()
            )
        })?;
    debug!(path = %path.display(), ?format, "loading table");
    match format {
        FileFormat::Csv | FileFormat::Tsv => from_delimited(path, format, options),
        FileFormat::Excel => from_excel(path, options.excel_sheet.as_deref()),
    }
}

/// Builds a lazy CSV/TSV scan with the configured reader options.
fn from_delimited(path: &Path, format: FileFormat, options: &OpenOptions) -> Result<LazyFrame> {
    let pl_path = PlRefPath::try_from_path(path)?;
    let mut reader = LazyCsvReader::new(pl_path);
    if let Some(delimiter) = options.delimiter.or_else(|| format.default_delimiter()) {
        reader = reader.with_separator(delimiter);
    }
    if let Some(has_header) = options.has_header {
        reader = reader.with_has_header(has_header);
    }
    if let Some(skip_rows) = options.skip_rows {
        reader = reader.with_skip_rows(skip_rows);
    }
    if let Some(n) = options.infer_schema_length {
        reader = reader.with_infer_schema_length(Some(n));
    }
    reader = reader.with_try_parse_dates(options.parse_dates);
    reader = match build_null_values(options) {
        Some(nv) => reader.map_parse_options(|opts| opts.with_null_values(Some(nv.clone()))),
        None => reader,
    };
    Ok(reader.finish()?)
}

/// Null tokens applied to every column, from options. None = Polars default.
fn build_null_values(options: &OpenOptions) -> Option<NullValues> {
    let tokens = options.null_values.as_ref()?;
    if tokens.is_empty() {
        return None;
    }
    let values: Vec<PlSmallStr> = tokens.iter().map(|t| t.as_str().into()).collect();
    Some(NullValues::AllColumns(values))
}

/// Inferred type for an Excel column (preserves numbers, bools, dates; avoids stringifying).
#[derive(Clone, Copy)]
enum SheetColType {
    Int64,
    Float64,
    Boolean,
    Utf8,
    Date,
    Datetime,
}

/// Load a single Excel file (xls, xlsx, xlsm, xlsb) using calamine (eager read, then lazy).
/// Sheet is selected by 0-based index or name via `sheet`; default is the first sheet.
/// The first row is the header; an empty sheet yields an empty table.
pub fn from_excel(path: &Path, sheet: Option<&str>) -> Result<LazyFrame> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| color_eyre::eyre::eyre!("Excel: {}", e))?;
    if workbook.sheet_names().is_empty() {
        return Err(color_eyre::eyre::eyre!("Excel file has no worksheets"));
    }
    let range = if let Some(selector) = sheet {
        if let Ok(idx) = selector.parse::<usize>() {
            workbook
                .worksheet_range_at(idx)
                .ok_or_else(|| color_eyre::eyre::eyre!("Excel: no sheet at index {}", idx))?
                .map_err(|e| color_eyre::eyre::eyre!("Excel: {}", e))?
        } else {
            workbook
                .worksheet_range(selector)
                .map_err(|e| color_eyre::eyre::eyre!("Excel: {}", e))?
        }
    } else {
        workbook
            .worksheet_range_at(0)
            .ok_or_else(|| color_eyre::eyre::eyre!("Excel: no first sheet"))?
            .map_err(|e| color_eyre::eyre::eyre!("Excel: {}", e))?
    };

    let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
    if rows.is_empty() {
        return Ok(DataFrame::empty().lazy());
    }

    let headers: Vec<String> = rows[0]
        .iter()
        .map(|c| calamine::DataType::as_string(c).unwrap_or_else(|| c.to_string()))
        .collect();
    let mut columns = Vec::with_capacity(headers.len());
    for (col_idx, header) in headers.iter().enumerate() {
        let cells: Vec<Option<&Data>> = rows[1..].iter().map(|row| row.get(col_idx)).collect();
        let col_type = infer_sheet_column_type(&cells);
        let name = if header.is_empty() {
            format!("column_{}", col_idx + 1)
        } else {
            header.clone()
        };
        let series = sheet_column_to_series(name.as_str(), &cells, col_type)?;
        columns.push(series.into());
    }
    let df = DataFrame::new_infer_height(columns)?;
    debug!(rows = df.height(), columns = df.width(), "loaded worksheet");
    Ok(df.lazy())
}

/// Infers column type: prefers Int64 for whole-number floats; infers Date/Datetime for
/// calamine DateTime/DateTimeIso or for string columns that parse as ISO date/datetime.
fn infer_sheet_column_type(cells: &[Option<&Data>]) -> SheetColType {
    use calamine::DataType as CalamineTrait;
    let mut has_string = false;
    let mut has_float = false;
    let mut has_int = false;
    let mut has_bool = false;
    let mut has_datetime = false;
    for cell in cells.iter().flatten() {
        if CalamineTrait::is_string(*cell) {
            has_string = true;
            break;
        }
        if CalamineTrait::is_float(*cell)
            || CalamineTrait::is_datetime(*cell)
            || CalamineTrait::is_datetime_iso(*cell)
        {
            has_float = true;
        }
        if CalamineTrait::is_int(*cell) {
            has_int = true;
        }
        if CalamineTrait::is_bool(*cell) {
            has_bool = true;
        }
        if CalamineTrait::is_datetime(*cell) || CalamineTrait::is_datetime_iso(*cell) {
            has_datetime = true;
        }
    }
    if has_string {
        let any_parsed = cells
            .iter()
            .flatten()
            .any(|c| cell_to_naive_datetime(c).is_some());
        let all_non_empty_parse = cells
            .iter()
            .flatten()
            .all(|c| CalamineTrait::is_empty(*c) || cell_to_naive_datetime(c).is_some());
        if any_parsed && all_non_empty_parse {
            if parsed_cells_all_midnight(cells) {
                SheetColType::Date
            } else {
                SheetColType::Datetime
            }
        } else {
            SheetColType::Utf8
        }
    } else if has_int {
        SheetColType::Int64
    } else if has_datetime {
        if parsed_cells_all_midnight(cells) {
            SheetColType::Date
        } else {
            SheetColType::Datetime
        }
    } else if has_float {
        let all_whole = cells.iter().flatten().all(|cell| {
            calamine::DataType::as_f64(*cell)
                .is_none_or(|f| f.is_finite() && (f - f.trunc()).abs() < 1e-10)
        });
        if all_whole {
            SheetColType::Int64
        } else {
            SheetColType::Float64
        }
    } else if has_bool {
        SheetColType::Boolean
    } else {
        SheetColType::Utf8
    }
}

/// True if every cell that parses as datetime has time 00:00:00.
fn parsed_cells_all_midnight(cells: &[Option<&Data>]) -> bool {
    let Some(midnight) = NaiveTime::from_hms_opt(0, 0, 0) else {
        return false;
    };
    cells
        .iter()
        .flatten()
        .filter_map(|c| cell_to_naive_datetime(c))
        .all(|dt| dt.time() == midnight)
}

/// Converts a calamine cell to NaiveDateTime (Excel serial, DateTimeIso, or parseable string).
fn cell_to_naive_datetime(cell: &Data) -> Option<NaiveDateTime> {
    use calamine::DataType;
    if let Some(dt) = cell.as_datetime() {
        return Some(dt);
    }
    let s = cell.get_datetime_iso().or_else(|| cell.get_string())?;
    parse_naive_datetime_str(s)
}

/// Parses an ISO-style date/datetime string; tries FORMATS in order.
fn parse_naive_datetime_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d",
    ];
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}

/// Build a Polars Series from a column of calamine cells using the inferred type.
fn sheet_column_to_series(
    name: &str,
    cells: &[Option<&Data>],
    col_type: SheetColType,
) -> Result<Series> {
    use calamine::DataType as CalamineTrait;
    use polars::datatypes::TimeUnit;
    let series = match col_type {
        SheetColType::Int64 => {
            let v: Vec<Option<i64>> = cells
                .iter()
                .map(|c| c.and_then(|cell| CalamineTrait::as_i64(cell)))
                .collect();
            Series::new(name.into(), v)
        }
        SheetColType::Float64 => {
            let v: Vec<Option<f64>> = cells
                .iter()
                .map(|c| c.and_then(|cell| CalamineTrait::as_f64(cell)))
                .collect();
            Series::new(name.into(), v)
        }
        SheetColType::Boolean => {
            let v: Vec<Option<bool>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.get_bool()))
                .collect();
            Series::new(name.into(), v)
        }
        SheetColType::Utf8 => {
            let v: Vec<Option<String>> = cells
                .iter()
                .map(|c| c.and_then(|cell| CalamineTrait::as_string(cell)))
                .collect();
            Series::new(name.into(), v)
        }
        SheetColType::Date => {
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
                .ok_or_else(|| color_eyre::eyre::eyre!("invalid epoch date"))?;
            let v: Vec<Option<i32>> = cells
                .iter()
                .map(|c| {
                    c.and_then(cell_to_naive_datetime)
                        .map(|dt| (dt.date() - epoch).num_days() as i32)
                })
                .collect();
            Series::new(name.into(), v).cast(&DataType::Date)?
        }
        SheetColType::Datetime => {
            let v: Vec<Option<i64>> = cells
                .iter()
                .map(|c| {
                    c.and_then(cell_to_naive_datetime)
                        .map(|dt| dt.and_utc().timestamp_micros())
                })
                .collect();
            Series::new(name.into(), v).cast(&DataType::Datetime(TimeUnit::Microseconds, None))?
        }
    };
    Ok(series)
}
