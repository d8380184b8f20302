use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum::{Display, EnumString};

/// Column names of the `Child SO lvl1` template sheet.
pub mod columns {
    pub const NAME: &str = "Name (Child Service Offering lvl 1)";
    pub const PARENT_OFFERING: &str = "Parent Offering";
    pub const DEPENDS_ON: &str = "Service Offerings | Depend On (Application Service)";
    pub const COMMITMENTS: &str = "Service Commitments";
    pub const DELIVERY_MANAGER: &str = "Delivery Manager";
    pub const SUBSCRIBED_BY_LOCATION: &str = "Subscribed by Location";
    pub const PHASE: &str = "Phase";
    pub const STATUS: &str = "Status";
    pub const LIFE_CYCLE_STAGE: &str = "Life Cycle Stage";
    pub const LIFE_CYCLE_STATUS: &str = "Life Cycle Status";
    pub const SUPPORT_GROUP: &str = "Support group";
    pub const MANAGED_BY_GROUP: &str = "Managed by Group";
    pub const SUBSCRIBED_BY_COMPANY: &str = "Subscribed by Company";
    pub const NUMBER: &str = "Number";

    /// Substring identifying alias columns.
    pub const ALIASES_MARKER: &str = "Aliases";

    pub const REQUIRED: &[&str] = &[
        NAME,
        PARENT_OFFERING,
        DEPENDS_ON,
        COMMITMENTS,
        DELIVERY_MANAGER,
        SUBSCRIBED_BY_LOCATION,
        PHASE,
        STATUS,
        LIFE_CYCLE_STAGE,
        LIFE_CYCLE_STATUS,
        SUPPORT_GROUP,
        MANAGED_BY_GROUP,
        SUBSCRIBED_BY_COMPANY,
    ];

    pub const LIFECYCLE: &[&str] = &[PHASE, STATUS, LIFE_CYCLE_STAGE, LIFE_CYCLE_STATUS];
}

/// Sheet read from every source workbook.
pub const SOURCE_SHEET: &str = "Child SO lvl1";

/// Division codes recognised inside parent offering descriptors.
pub const DIVISION_CODES: &[&str] = &["HS", "DS"];

/// One record of a source table, keyed by header name in sheet order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row(IndexMap<String, String>);

impl Row {
    /// Cell text for `column`, empty when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.0.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn name(&self) -> &str {
        self.get(columns::NAME)
    }

    /// Overwrite every column whose header contains `marker`.
    pub fn fill_matching(&mut self, marker: &str, value: &str) {
        for (column, cell) in self.0.iter_mut() {
            if column.contains(marker) {
                *cell = value.to_string();
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A fully materialised `Child SO lvl1` sheet from one input workbook.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub path: PathBuf,
    pub country: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl SourceTable {
    /// Required columns absent from this table.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|column| !self.columns.iter().any(|c| c == *column))
            .map(|column| column.to_string())
            .collect()
    }
}

/// Metadata parsed from a `[Parent <tokens>] <description>` descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentOfferingInfo {
    pub country: String,
    pub division: String,
    pub topic: String,
    pub catalog: String,
    /// Every token between `[Parent` and `]`, in order.
    pub tokens: Vec<String>,
}

/// Service Request or Incident Management; `Unset` renders as an empty string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum OperatingMode {
    #[default]
    #[strum(serialize = "")]
    #[serde(rename = "")]
    Unset,
    #[strum(serialize = "SR")]
    #[serde(rename = "SR", alias = "sr")]
    Sr,
    #[strum(serialize = "IM")]
    #[serde(rename = "IM", alias = "im")]
    Im,
}

impl OperatingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingMode::Unset => "",
            OperatingMode::Sr => "SR",
            OperatingMode::Im => "IM",
        }
    }

    pub fn is_incident(&self) -> bool {
        matches!(self, OperatingMode::Im)
    }
}

/// Operator input for one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationContext {
    /// Lower-cased, ANDed whole-word keywords.
    pub keywords: Vec<String>,
    pub new_apps: Vec<String>,
    pub days: Vec<String>,
    pub hours: Vec<String>,
    pub delivery_manager: String,
    pub global_prod: bool,
    pub rsp_duration: String,
    pub rsl_duration: String,
    pub mode: OperatingMode,
    pub require_corp: bool,
    pub delivering_tag: String,
    pub support_group: String,
    pub managed_by_group: String,
    pub aliases_on: bool,
    pub aliases: Vec<String>,
    pub service_type: Option<String>,
}

impl GenerationContext {
    pub fn schedule(&self) -> String {
        crate::schedule::format_schedule(&self.days, &self.hours)
    }
}

/// A cloned template row with its derived columns rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRow {
    pub country: String,
    pub receiver: String,
    pub app: String,
    pub row: Row,
}

impl GeneratedRow {
    pub fn name(&self) -> &str {
        self.row.name()
    }
}

/// Generated rows grouped by country code, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct CountrySheets(IndexMap<String, Vec<GeneratedRow>>);

impl CountrySheets {
    pub fn push(&mut self, row: GeneratedRow) {
        self.0.entry(row.country.clone()).or_default().push(row);
    }

    pub fn get(&self, country: &str) -> Option<&[GeneratedRow]> {
        self.0.get(country).map(Vec::as_slice)
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[GeneratedRow])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn total_rows(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows() == 0
    }
}
