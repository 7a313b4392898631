//! Experiment datasets: loading uploaded files and aggregating them into counts.
//!
//! An uploaded dataset is a table with a header row followed by rows of exactly three
//! columns, in this order:
//!
//! 1. an identifier (any value, not interpreted),
//! 2. the group label, `control` or `treatment`,
//! 3. the conversion flag, `1` if the row converted and `0` otherwise.
//!
//! # Example
//!
//! ```rust
//! use ab_statistics::data::aggregate;
//!
//! let rows = vec![
//!     vec!["1", "control", "1"],
//!     vec!["2", "treatment", "0"],
//!     vec!["3", "control", "0"],
//! ];
//! let counts = aggregate(&rows).unwrap();
//! assert_eq!(counts.control_observations, 2);
//! assert_eq!(counts.control_conversions, 1);
//! ```

mod delimited;
mod spreadsheet;

use crate::error::{AbTestError, Result};
use crate::testing::ExperimentCounts;
use log::{debug, warn};
use std::fmt;
use std::path::Path;

pub use delimited::read_csv_rows;
pub use spreadsheet::read_xlsx_rows;

/// Number of columns every dataset row must have.
pub const EXPECTED_COLUMNS: usize = 3;

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Csv,
    Xlsx,
}

impl FileType {
    /// Detect the format from a file name's extension.
    ///
    /// The match is case-sensitive: `data.CSV` is not recognised.
    pub fn detect(file_name: &str) -> Option<FileType> {
        if file_name.ends_with(".csv") {
            Some(FileType::Csv)
        } else if file_name.ends_with(".xlsx") {
            Some(FileType::Xlsx)
        } else {
            None
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Csv => write!(f, "csv"),
            FileType::Xlsx => write!(f, "xlsx"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Control,
    Treatment,
}

impl Group {
    pub fn parse(label: &str) -> Option<Group> {
        match label.trim() {
            "control" => Some(Group::Control),
            "treatment" => Some(Group::Treatment),
            _ => None,
        }
    }
}

/// One validated dataset row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationRow {
    pub id: String,
    pub group: Group,
    pub converted: bool,
}

impl ObservationRow {
    /// Parse the fields of one row. `row` is the 1-based data row used in error messages.
    pub fn parse<S: AsRef<str>>(row: usize, fields: &[S]) -> Result<ObservationRow> {
        if fields.len() != EXPECTED_COLUMNS {
            return Err(AbTestError::schema(
                Some(row),
                format!(
                    "expected {} fields (id, group, converted), got {}",
                    EXPECTED_COLUMNS,
                    fields.len()
                ),
            ));
        }

        let label = fields[1].as_ref();
        let group = Group::parse(label).ok_or_else(|| {
            AbTestError::schema(
                Some(row),
                format!("group must be 'control' or 'treatment', got '{}'", label),
            )
        })?;

        let flag = fields[2].as_ref();
        let converted = parse_flag(flag).ok_or_else(|| {
            AbTestError::schema(
                Some(row),
                format!("converted must be 0 or 1, got '{}'", flag),
            )
        })?;

        Ok(ObservationRow {
            id: fields[0].as_ref().trim().to_string(),
            group,
            converted,
        })
    }
}

// Spreadsheets store every number as a float, so "1.0" counts as 1. Only plain
// decimal text is accepted: no sign, no exponent.
fn parse_flag(value: &str) -> Option<bool> {
    let value = value.trim();
    match value {
        "0" => Some(false),
        "1" => Some(true),
        _ if is_plain_decimal(value) => match value.parse::<f64>() {
            Ok(v) if v == 0.0 => Some(false),
            Ok(v) if v == 1.0 => Some(true),
            _ => None,
        },
        _ => None,
    }
}

fn is_plain_decimal(value: &str) -> bool {
    match value.split_once('.') {
        Some((whole, fraction)) => {
            !whole.is_empty()
                && whole.bytes().all(|b| b.is_ascii_digit())
                && fraction.bytes().all(|b| b.is_ascii_digit())
        }
        None => !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()),
    }
}

/// Aggregate dataset rows into per-group observation and conversion counts.
///
/// Fails with a schema error on the first malformed row; partial aggregates are never
/// returned.
pub fn aggregate<R, S>(rows: &[R]) -> Result<ExperimentCounts>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut counts = ExperimentCounts::default();

    for (index, fields) in rows.iter().enumerate() {
        let row = ObservationRow::parse(index + 1, fields.as_ref()).inspect_err(|e| {
            warn!("rejecting dataset: {}", e);
        })?;
        let converted = u64::from(row.converted);
        match row.group {
            Group::Control => {
                counts.control_observations += 1;
                counts.control_conversions += converted;
            }
            Group::Treatment => {
                counts.treatment_observations += 1;
                counts.treatment_conversions += converted;
            }
        }
    }

    debug!("aggregated {} rows into {:?}", rows.len(), counts);
    Ok(counts)
}

/// Read the data rows of an uploaded file, choosing the parser from its name.
pub fn load_rows(file_name: &str, bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let file_type = FileType::detect(file_name).ok_or_else(|| {
        warn!("unsupported upload '{}'", file_name);
        AbTestError::UnsupportedFileType(file_name.to_string())
    })?;
    debug!("loading '{}' as {}", file_name, file_type);

    match file_type {
        FileType::Csv => read_csv_rows(bytes),
        FileType::Xlsx => read_xlsx_rows(bytes),
    }
}

/// Read a dataset file from disk.
pub fn load_path(path: &Path) -> Result<Vec<Vec<String>>> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    load_rows(&file_name, &bytes)
}

pub(crate) fn check_header_width(width: usize) -> Result<()> {
    if width != EXPECTED_COLUMNS {
        return Err(AbTestError::schema(
            None,
            format!(
                "there are {} columns, there should be only {}: ID, control/treatment, and converted",
                width, EXPECTED_COLUMNS
            ),
        ));
    }
    Ok(())
}

/// Descriptive figures about a dataset, reported before the test is run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetSummary {
    pub total_rows: u64,
    pub counts: ExperimentCounts,
}

impl DatasetSummary {
    pub fn from_counts(counts: ExperimentCounts) -> Self {
        DatasetSummary {
            total_rows: counts.total_observations(),
            counts,
        }
    }

    /// Aggregate `rows` and summarise them in one step.
    pub fn from_rows<R, S>(rows: &[R]) -> Result<Self>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        Ok(Self::from_counts(aggregate(rows)?))
    }

    /// Fraction of rows assigned to the control group.
    pub fn control_share(&self) -> Option<f64> {
        share(self.counts.control_observations, self.total_rows)
    }

    pub fn treatment_share(&self) -> Option<f64> {
        share(self.counts.treatment_observations, self.total_rows)
    }

    pub fn control_rate(&self) -> Option<f64> {
        self.counts.control_rate()
    }

    pub fn treatment_rate(&self) -> Option<f64> {
        self.counts.treatment_rate()
    }
}

fn share(part: u64, total: u64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(part as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_detect_file_type() {
        assert_eq!(FileType::detect("results.csv"), Some(FileType::Csv));
        assert_eq!(FileType::detect("results.xlsx"), Some(FileType::Xlsx));
        assert_eq!(FileType::detect("results.xls"), None);
        assert_eq!(FileType::detect("results.CSV"), None);
        assert_eq!(FileType::detect("csv"), None);
    }

    #[test]
    fn test_aggregate_small_dataset() {
        let rows = vec![
            vec!["1", "control", "1"],
            vec!["2", "treatment", "0"],
            vec!["3", "control", "0"],
        ];
        let counts = aggregate(&rows).unwrap();
        assert_eq!(
            counts,
            ExperimentCounts {
                control_observations: 2,
                treatment_observations: 1,
                control_conversions: 1,
                treatment_conversions: 0,
            }
        );
    }

    #[test]
    fn test_aggregate_empty() {
        let rows: Vec<Vec<String>> = Vec::new();
        assert_eq!(aggregate(&rows).unwrap(), ExperimentCounts::default());
    }

    #[test]
    fn test_aggregate_rejects_wrong_width() {
        let rows = vec![vec!["1", "control", "1"], vec!["2", "treatment"]];
        match aggregate(&rows) {
            Err(AbTestError::Schema { row, .. }) => assert_eq!(row, Some(2)),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_aggregate_rejects_unknown_group() {
        let rows = vec![vec!["1", "Control", "1"]];
        assert!(matches!(aggregate(&rows), Err(AbTestError::Schema { .. })));
        let rows = vec![vec!["1", "variant_b", "1"]];
        assert!(matches!(aggregate(&rows), Err(AbTestError::Schema { .. })));
    }

    #[test]
    fn test_aggregate_rejects_bad_flag() {
        for flag in ["2", "yes", "", "0.5", "-1"] {
            let rows = vec![vec!["1", "control", flag]];
            assert!(
                matches!(aggregate(&rows), Err(AbTestError::Schema { .. })),
                "flag {:?} should be rejected",
                flag
            );
        }
    }

    #[test]
    fn test_flag_spellings() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("1.0"), Some(true));
        assert_eq!(parse_flag("0.0"), Some(false));
        assert_eq!(parse_flag("0.00"), Some(false));
        assert_eq!(parse_flag("true"), None);
        assert_eq!(parse_flag("2"), None);
        assert_eq!(parse_flag("0.5"), None);
    }

    #[test]
    fn test_flag_rejects_signs_and_exponents() {
        assert_eq!(parse_flag("1e0"), None);
        assert_eq!(parse_flag("+1"), None);
        assert_eq!(parse_flag("-0"), None);
        assert_eq!(parse_flag("0.1e1"), None);
        assert_eq!(parse_flag(".0"), None);
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_row_parse_trims_fields() {
        let row = ObservationRow::parse(1, &[" u-17 ", " treatment ", "1"]).unwrap();
        assert_eq!(row.id, "u-17");
        assert_eq!(row.group, Group::Treatment);
        assert!(row.converted);
    }

    #[test]
    fn test_summary_shares_and_rates() {
        let rows = vec![
            vec!["1", "control", "1"],
            vec!["2", "treatment", "0"],
            vec!["3", "control", "0"],
            vec!["4", "control", "1"],
        ];
        let summary = DatasetSummary::from_rows(&rows).unwrap();
        assert_eq!(summary.total_rows, 4);
        assert_abs_diff_eq!(summary.control_share().unwrap(), 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.treatment_share().unwrap(), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.control_rate().unwrap(), 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.treatment_rate().unwrap(), 0.0, epsilon = 1e-12);

        let empty = DatasetSummary::from_counts(ExperimentCounts::default());
        assert!(empty.control_share().is_none());
        assert!(empty.treatment_rate().is_none());
    }

    #[test]
    fn test_load_rows_rejects_unknown_extension() {
        assert!(matches!(
            load_rows("data.json", b"[]"),
            Err(AbTestError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn test_header_width() {
        assert!(check_header_width(3).is_ok());
        assert!(matches!(
            check_header_width(4),
            Err(AbTestError::Schema { row: None, .. })
        ));
    }
}
