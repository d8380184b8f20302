#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use offering_generator::assembler::RuleSet;
use offering_generator::model::{SOURCE_SHEET, columns};
use offering_generator::workbook::DEFAULT_SOURCE_PATTERN;
use offering_generator::{GenerationContext, GeneratorConfig, OperatingMode};
use tempfile::{TempDir, tempdir};
use umya_spreadsheet::{self, Spreadsheet, Worksheet};

pub const PARENT_LAB: &str = "[Parent HS PL Lab] Laboratory software";

/// A template sheet: the standard header row plus rows given as column/value pairs.
#[derive(Debug, Clone)]
pub struct TemplateSheet {
    headers: Vec<String>,
    rows: Vec<HashMap<String, String>>,
}

impl TemplateSheet {
    /// Required columns plus `Number` and `Aliases`, as exported templates carry them.
    pub fn standard() -> Self {
        let mut headers = vec![columns::NUMBER.to_string()];
        headers.extend(columns::REQUIRED.iter().map(|c| c.to_string()));
        headers.push("Aliases".to_string());
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn without_column(mut self, column: &str) -> Self {
        self.headers.retain(|h| h != column);
        self
    }

    pub fn row(mut self, cells: &[(&str, &str)]) -> Self {
        self.rows.push(
            cells
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    /// An operational template row with blank commitments.
    pub fn offering(self, number: &str, parent: &str, name: &str) -> Self {
        self.row(&[
            (columns::NUMBER, number),
            (columns::PARENT_OFFERING, parent),
            (columns::NAME, name),
            (columns::PHASE, "Operational"),
            (columns::STATUS, "Operational"),
            (columns::LIFE_CYCLE_STAGE, "Operational"),
            (columns::LIFE_CYCLE_STATUS, "In use"),
            (columns::SUBSCRIBED_BY_LOCATION, "Warsaw"),
        ])
    }

    fn fill(&self, sheet: &mut Worksheet) {
        for (idx, header) in self.headers.iter().enumerate() {
            let col = idx as u32 + 1;
            sheet.get_cell_mut((col, 1)).set_value(header.as_str());
            for (offset, row) in self.rows.iter().enumerate() {
                if let Some(value) = row.get(header) {
                    sheet
                        .get_cell_mut((col, offset as u32 + 2))
                        .set_value(value.as_str());
                }
            }
        }
    }
}

pub struct TestWorkspace {
    _tempdir: TempDir,
    root: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let tempdir = tempdir().expect("tempdir");
        let root = tempdir.path().to_path_buf();
        std::fs::create_dir_all(root.join("input")).expect("input dir");
        Self {
            _tempdir: tempdir,
            root,
        }
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.join("input")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join("out")
    }

    /// Writes `ALL_Service_Offering_<country>.xlsx` with a template sheet.
    pub fn write_template(&self, country: &str, template: &TemplateSheet) -> PathBuf {
        let path = self
            .input_dir()
            .join(format!("ALL_Service_Offering_{country}.xlsx"));
        write_workbook_to_path(&path, |book| {
            let sheet = book.new_sheet(SOURCE_SHEET).expect("template sheet");
            template.fill(sheet);
        });
        path
    }

    pub fn config(&self, context: GenerationContext) -> GeneratorConfig {
        GeneratorConfig {
            input_dir: self.input_dir(),
            output_dir: self.output_dir(),
            source_pattern: DEFAULT_SOURCE_PATTERN.to_string(),
            context,
            rules: RuleSet::default(),
        }
    }

    pub fn output_files(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(self.output_dir()) else {
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = entries
            .map(|entry| entry.expect("dir entry").path())
            .collect();
        files.sort();
        files
    }
}

pub fn write_workbook_to_path<F>(path: &Path, f: F)
where
    F: FnOnce(&mut Spreadsheet),
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create dir");
    }
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    f(&mut book);
    umya_spreadsheet::writer::xlsx::write(&book, path).expect("write workbook");
}

/// Lab/SDMS service request run with a Mon-Fri 9-17 schedule.
pub fn lab_context() -> GenerationContext {
    GenerationContext {
        keywords: vec!["lab".into()],
        new_apps: vec!["SDMS".into()],
        days: vec!["Mon-Fri".into()],
        hours: vec!["9-17".into()],
        delivery_manager: "Jan Kowalski".into(),
        rsp_duration: "2h".into(),
        rsl_duration: "5d".into(),
        mode: OperatingMode::Sr,
        support_group: "SG-LAB".into(),
        managed_by_group: "MBG-LAB".into(),
        ..Default::default()
    }
}

pub fn read_output(path: &Path) -> Spreadsheet {
    umya_spreadsheet::reader::xlsx::read(path).expect("read output")
}

pub fn sheet_names(book: &Spreadsheet) -> Vec<String> {
    book.get_sheet_collection()
        .iter()
        .map(|sheet| sheet.get_name().to_string())
        .collect()
}

pub fn headers(sheet: &Worksheet) -> Vec<String> {
    let (max_col, _) = sheet.get_highest_column_and_row();
    (1..=max_col)
        .map(|col| sheet.get_value((col, 1)))
        .collect()
}

/// Values below the header in the column titled `header`.
pub fn column_values(sheet: &Worksheet, header: &str) -> Vec<String> {
    let col = headers(sheet)
        .iter()
        .position(|h| h == header)
        .unwrap_or_else(|| panic!("missing column {header}")) as u32
        + 1;
    let (_, max_row) = sheet.get_highest_column_and_row();
    (2..=max_row).map(|row| sheet.get_value((col, row))).collect()
}
