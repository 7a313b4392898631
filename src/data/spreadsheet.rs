//! XLSX parsing for uploaded experiment results.

use super::check_header_width;
use crate::error::{AbTestError, Result};
use calamine::{Data, Reader, Xlsx};
use std::io::Cursor;

/// Read the first worksheet of an XLSX workbook into raw rows.
///
/// The first row is a header. Cells are rendered as text: integral numbers without a
/// fractional part, booleans as `1`/`0`, empty cells as empty strings. Rows whose cells
/// are all empty are skipped.
pub fn read_xlsx_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AbTestError::schema(None, "workbook has no worksheets"))??;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| AbTestError::schema(None, "worksheet is empty"))?;
    check_header_width(header.len())?;

    Ok(rows
        .map(|cells| cells.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|fields| fields.iter().any(|field| !field.is_empty()))
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(true) => "1".to_string(),
        Data::Bool(false) => "0".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(1.0)), "1");
        assert_eq!(cell_text(&Data::Float(0.5)), "0.5");
        assert_eq!(cell_text(&Data::Int(42)), "42");
        assert_eq!(cell_text(&Data::Bool(true)), "1");
        assert_eq!(cell_text(&Data::String(" control ".into())), "control");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_rejects_non_workbook_bytes() {
        assert!(read_xlsx_rows(b"id,group,converted\n").is_err());
    }
}
