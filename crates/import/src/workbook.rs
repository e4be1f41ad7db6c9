use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Duration, NaiveDate};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("{0}")]
    Decode(#[from] calamine::Error),
    #[error("Excel file contains no sheets")]
    NoSheets,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// A decoded spreadsheet: named sheets of string cells, in workbook order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Decodes xlsx, xlsm, xlsb, xls or ods bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WorkbookError> {
        let mut reader = open_workbook_auto_from_rs(Cursor::new(bytes))?;

        let mut sheets = Vec::new();
        for name in reader.sheet_names() {
            let range = reader.worksheet_range(&name)?;
            let rows = range
                .rows()
                .map(|row| row.iter().map(render_cell).collect())
                .collect();
            sheets.push(Sheet { name, rows });
        }

        if sheets.is_empty() {
            return Err(WorkbookError::NoSheets);
        }
        Ok(Self { sheets })
    }

    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn first_sheet(&self) -> Option<&Sheet> {
        self.sheets.first()
    }
}

fn render_cell(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            excel_serial_to_date(serial).unwrap_or_else(|| serial.to_string())
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

const MAX_SERIAL_DAYS: f64 = 3_000_000.0;

/// Converts an Excel serial day number to `YYYY-MM-DD`. The time-of-day
/// fraction is dropped.
pub fn excel_serial_to_date(serial: f64) -> Option<String> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    if !serial.is_finite() || serial.abs() > MAX_SERIAL_DAYS {
        return None;
    }
    base.checked_add_signed(Duration::days(serial.floor() as i64))
        .map(|date| date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0).as_deref(), Some("2025-01-10"));
        assert_eq!(excel_serial_to_date(45306.75).as_deref(), Some("2024-01-15"));
        assert_eq!(excel_serial_to_date(f64::NAN), None);
    }

    #[test]
    fn renders_scalar_cells() {
        assert_eq!(render_cell(&Data::Float(100.0)), "100");
        assert_eq!(render_cell(&Data::Float(1250.5)), "1250.5");
        assert_eq!(render_cell(&Data::Int(-42)), "-42");
        assert_eq!(render_cell(&Data::Bool(true)), "true");
        assert_eq!(render_cell(&Data::String("  Narration ".into())), "  Narration ");
        assert_eq!(render_cell(&Data::Empty), "");
        assert_eq!(
            render_cell(&Data::DateTimeIso("2024-01-15T00:00:00".into())),
            "2024-01-15T00:00:00"
        );
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            Workbook::from_bytes(b"definitely not a spreadsheet"),
            Err(WorkbookError::Decode(_))
        ));
    }

    #[test]
    fn sheet_lookup() {
        let wb = Workbook::from_sheets(vec![
            Sheet::new("Summary", vec![]),
            Sheet::new("Transactions", vec![vec!["Date".into()]]),
        ]);
        assert_eq!(wb.first_sheet().map(|s| s.name.as_str()), Some("Summary"));
        assert_eq!(wb.sheet("Transactions").map(|s| s.rows.len()), Some(1));
        assert!(wb.sheet("transactions").is_none());
        assert_eq!(wb.sheets().len(), 2);
    }
}
