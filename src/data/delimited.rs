//! CSV parsing for uploaded experiment results.

use super::check_header_width;
use crate::error::Result;
use csv::ReaderBuilder;

/// Read CSV bytes into raw rows of trimmed fields.
///
/// The first record is a header and is only checked for width; its names are ignored.
/// Records may have any width here, [`aggregate`](super::aggregate) reports the ones that
/// do not have three fields. Blank lines are skipped.
///
/// # Example file content
/// ```csv
/// id,group,converted
/// 1,control,0
/// 2,treatment,1
/// ```
pub fn read_csv_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    check_header_width(reader.headers()?.len())?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(rows)
}
