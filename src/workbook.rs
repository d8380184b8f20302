use crate::error::{GeneratorError, GeneratorResult};
use crate::model::{CountrySheets, Row, SOURCE_SHEET, SourceTable, columns};
use crate::utils::{cell_range, column_number_to_name, path_to_forward_slashes};
use anyhow::{Context, anyhow};
use chrono::{DateTime, Local};
use globset::{Glob, GlobMatcher};
use indexmap::IndexSet;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use umya_spreadsheet::reader::xlsx;
use umya_spreadsheet::{Spreadsheet, Worksheet};
use walkdir::WalkDir;

pub const DEFAULT_SOURCE_PATTERN: &str = "ALL_Service_Offering_*.xlsx";
const OUTPUT_PREFIX: &str = "Offerings_NEW_";
const COLUMN_PADDING: usize = 2;

/// Result of loading one source workbook.
#[derive(Debug)]
pub enum TableLoad {
    Loaded(SourceTable),
    /// The sheet lacks required columns; not an error.
    Skipped { path: PathBuf, missing: Vec<String> },
}

/// Finds source workbooks directly inside `dir`, sorted by path.
pub fn discover_sources(dir: &Path, pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let matcher: GlobMatcher = Glob::new(pattern)
        .map_err(|err| anyhow!("invalid source pattern {pattern}: {err}"))?
        .compile_matcher();

    let mut found = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("failed to list {:?}", dir))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if matcher.is_match(entry.file_name()) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    tracing::info!(
        dir = %path_to_forward_slashes(dir),
        pattern,
        count = found.len(),
        "discovered source workbooks"
    );
    Ok(found)
}

/// Country code from the last `_` segment of the file stem, upper-cased.
pub fn country_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.rsplit('_').next().unwrap_or_default().to_uppercase()
}

pub fn load_source_table(path: &Path) -> GeneratorResult<TableLoad> {
    let book =
        xlsx::read(path).with_context(|| format!("failed to parse workbook {:?}", path))?;
    let sheet = book
        .get_sheet_by_name(SOURCE_SHEET)
        .ok_or_else(|| GeneratorError::MissingSheet {
            path: path.to_path_buf(),
            sheet: SOURCE_SHEET.to_string(),
        })?;

    let table = sheet_to_table(sheet, path);
    let missing = table.missing_columns(columns::REQUIRED);
    if !missing.is_empty() {
        tracing::warn!(
            path = %path_to_forward_slashes(path),
            missing = ?missing,
            "skipping workbook without required columns"
        );
        return Ok(TableLoad::Skipped {
            path: path.to_path_buf(),
            missing,
        });
    }
    tracing::debug!(
        path = %path_to_forward_slashes(path),
        country = %table.country,
        rows = table.rows.len(),
        "loaded source table"
    );
    Ok(TableLoad::Loaded(table))
}

fn cell_text(sheet: &Worksheet, col: u32, row: u32) -> String {
    sheet
        .get_cell((col, row))
        .map(|cell| cell.get_value().to_string())
        .unwrap_or_default()
}

/// Row 1 is the header; blank headers drop their column, duplicates get `.N`.
fn sheet_to_table(sheet: &Worksheet, path: &Path) -> SourceTable {
    let (max_col, max_row) = sheet.get_highest_column_and_row();

    let mut header_counts: HashMap<String, usize> = HashMap::new();
    let mut headers: Vec<(u32, String)> = Vec::new();
    for col in 1..=max_col {
        let raw = cell_text(sheet, col, 1).trim().to_string();
        if raw.is_empty() {
            continue;
        }
        let seen = header_counts.entry(raw.clone()).or_insert(0);
        let header = if *seen == 0 {
            raw.clone()
        } else {
            format!("{raw}.{seen}")
        };
        *seen += 1;
        headers.push((col, header));
    }

    let mut rows = Vec::new();
    for row_idx in 2..=max_row {
        let row: Row = headers
            .iter()
            .map(|(col, header)| (header.clone(), cell_text(sheet, *col, row_idx)))
            .collect();
        if row.cells().all(|(_, value)| value.trim().is_empty()) {
            continue;
        }
        rows.push(row);
    }

    SourceTable {
        path: path.to_path_buf(),
        country: country_from_path(path),
        columns: headers.into_iter().map(|(_, header)| header).collect(),
        rows,
    }
}

pub fn output_file_name(now: DateTime<Local>) -> String {
    format!("{OUTPUT_PREFIX}{}.xlsx", now.format("%Y%m%d_%H%M%S"))
}

/// Writes one sheet per country into `out_dir` and returns the artifact path.
///
/// The workbook is staged in a temporary file and renamed into place only
/// once fully written.
pub fn write_offerings(sheets: &CountrySheets, out_dir: &Path) -> GeneratorResult<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {:?}", out_dir))?;

    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    for (country, rows) in sheets.iter() {
        let sheet = book
            .new_sheet(country)
            .map_err(|e| anyhow!("failed to create sheet {country}: {e}"))?;
        let written = fill_sheet(sheet, rows.iter().map(|generated| &generated.row));
        tracing::debug!(country, rows = written, "wrote country sheet");
    }

    let target = out_dir.join(output_file_name(Local::now()));
    persist(&book, out_dir, &target)?;
    tracing::info!(
        path = %path_to_forward_slashes(&target),
        sheets = book.get_sheet_collection().len(),
        rows = sheets.total_rows(),
        "wrote offerings workbook"
    );
    Ok(target)
}

fn persist(book: &Spreadsheet, out_dir: &Path, target: &Path) -> anyhow::Result<()> {
    let staged = tempfile::Builder::new()
        .prefix(".offerings-")
        .suffix(".xlsx")
        .tempfile_in(out_dir)
        .with_context(|| format!("failed to stage output in {:?}", out_dir))?;
    umya_spreadsheet::writer::xlsx::write(book, staged.path())
        .with_context(|| format!("failed to write workbook {:?}", staged.path()))?;
    staged
        .persist(target)
        .with_context(|| format!("failed to move workbook to {:?}", target))?;
    Ok(())
}

/// Writes header and rows, deduplicated by name with `Number` dropped, then
/// applies auto-filter, content-sized widths and wrapping. Returns rows written.
fn fill_sheet<'r, I>(sheet: &mut Worksheet, rows: I) -> usize
where
    I: IntoIterator<Item = &'r Row>,
{
    let mut seen = HashSet::new();
    let rows: Vec<&Row> = rows
        .into_iter()
        .filter(|row| seen.insert(row.name().to_string()))
        .collect();

    let headers: IndexSet<&str> = rows
        .iter()
        .copied()
        .flat_map(|row| row.columns())
        .filter(|column| *column != columns::NUMBER)
        .collect();

    let mut widths = vec![0usize; headers.len()];
    for (idx, header) in headers.iter().enumerate() {
        let col = idx as u32 + 1;
        write_cell(sheet, col, 1, header);
        widths[idx] = header.chars().count();
        for (offset, row) in rows.iter().enumerate() {
            let value = row.get(header);
            write_cell(sheet, col, offset as u32 + 2, value);
            widths[idx] = widths[idx].max(value.chars().count());
        }
    }

    for (idx, width) in widths.iter().enumerate() {
        sheet
            .get_column_dimension_mut(&column_number_to_name(idx as u32 + 1))
            .set_width((width + COLUMN_PADDING) as f64);
    }
    if !headers.is_empty() {
        let last_row = rows.len() as u32 + 1;
        sheet.set_auto_filter(cell_range(1, 1, headers.len() as u32, last_row));
    }
    rows.len()
}

fn write_cell(sheet: &mut Worksheet, col: u32, row: u32, value: &str) {
    sheet.get_cell_mut((col, row)).set_value(value);
    sheet
        .get_style_mut((col, row))
        .get_alignment_mut()
        .set_wrap_text(true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn country_comes_from_last_stem_segment() {
        assert_eq!(
            country_from_path(Path::new("in/ALL_Service_Offering_pl.xlsx")),
            "PL"
        );
        assert_eq!(
            country_from_path(Path::new("ALL_Service_Offering_Test_de.xlsx")),
            "DE"
        );
    }

    #[test]
    fn output_name_uses_timestamp() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(output_file_name(now), "Offerings_NEW_20240309_070501.xlsx");
    }

    #[test]
    fn fill_sheet_dedups_and_drops_number() {
        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        let sheet = book.new_sheet("PL").unwrap();
        let a: Row = [("Number", "SO1"), (columns::NAME, "a"), ("Extra", "long value")]
            .into_iter()
            .collect();
        let dup: Row = [("Number", "SO2"), (columns::NAME, "a"), ("Extra", "x")]
            .into_iter()
            .collect();
        let b: Row = [("Number", "SO3"), (columns::NAME, "b"), ("Extra", "y")]
            .into_iter()
            .collect();

        let written = fill_sheet(sheet, [&a, &dup, &b]);
        assert_eq!(written, 2);
        assert_eq!(sheet.get_value((1, 1)), columns::NAME);
        assert_eq!(sheet.get_value((2, 1)), "Extra");
        assert_eq!(sheet.get_value((2, 2)), "long value");
        assert_eq!(sheet.get_value((1, 3)), "b");
        assert_eq!(sheet.get_value((1, 4)), "");

        let filter = sheet.get_auto_filter().expect("auto filter");
        assert_eq!(filter.get_range().get_range(), "A1:B3");

        let width = |column: &str| *sheet.get_column_dimension(column).unwrap().get_width();
        assert_eq!(width("A"), (columns::NAME.chars().count() + 2) as f64);
        assert_eq!(width("B"), ("long value".len() + 2) as f64);

        for coordinate in [(1u32, 1u32), (2, 2), (1, 3)] {
            let alignment = sheet.get_style(coordinate).get_alignment().expect("alignment");
            assert!(*alignment.get_wrap_text());
        }
    }

    #[test]
    fn sheet_to_table_normalises_headers_and_rows() {
        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        let sheet = book.new_sheet(SOURCE_SHEET).unwrap();
        for (col, header) in [columns::NAME, "", "Aliases", "Aliases"].iter().enumerate() {
            sheet.get_cell_mut((col as u32 + 1, 1)).set_value(*header);
        }
        for (col, value) in ["first", "orphan", "alias one", "alias two"].iter().enumerate() {
            sheet.get_cell_mut((col as u32 + 1, 2)).set_value(*value);
        }
        sheet.get_cell_mut((1, 3)).set_value("  ");
        sheet.get_cell_mut((1, 4)).set_value("second");

        let table = sheet_to_table(sheet, Path::new("in/ALL_Service_Offering_pl.xlsx"));
        assert_eq!(table.country, "PL");
        assert_eq!(table.columns, vec![columns::NAME, "Aliases", "Aliases.1"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("Aliases"), "alias one");
        assert_eq!(table.rows[0].get("Aliases.1"), "alias two");
        assert_eq!(table.rows[0].get(""), "");
        assert_eq!(table.rows[1].name(), "second");
    }
}
