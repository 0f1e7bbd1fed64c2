// Tabular input: a header row plus loosely typed cells, read from CSV or a
// spreadsheet workbook.

use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::debug;

use super::LoadError;

// ---------------------------------------------------------------------------
// Cell / Table
// ---------------------------------------------------------------------------

/// A single loosely typed value from the input table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Classify raw text the way a spreadsheet would: blank is empty, anything
    /// that parses as a float is a number, everything else stays text.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else if let Ok(v) = trimmed.parse::<f64>() {
            Cell::Number(v)
        } else {
            // Trimming only decides the kind; text keeps the raw value.
            Cell::Text(raw.to_string())
        }
    }

    /// Numeric read. Empty and non-numeric cells become NaN; they are not
    /// rejected here.
    pub fn as_f64(&self) -> f64 {
        match self {
            Cell::Number(v) => *v,
            Cell::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
            Cell::Empty => f64::NAN,
        }
    }

    /// Numeric read for nullable columns: empty and NaN cells are null.
    pub fn as_optional_f64(&self) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Number(v) if v.is_nan() => None,
            other => Some(other.as_f64()),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// An in-memory table: column names in file order plus data rows.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Index of the column with exactly this name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at (row, col). Short rows read as empty past their end.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Read a table from `path`, choosing the reader from the file extension.
pub fn read_table(path: &Path) -> Result<Table, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if ext == "csv" {
        let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        read_csv(file).map_err(|e| LoadError::Csv {
            path: path.display().to_string(),
            source: e,
        })
    } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        read_spreadsheet(path)
    } else {
        Err(LoadError::UnsupportedFormat {
            path: path.display().to_string(),
        })
    }
}

/// Read CSV data with a header row. Rows may be ragged.
pub(crate) fn read_csv<R: Read>(rdr: R) -> Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::from_text).collect());
    }

    Ok(Table { headers, rows })
}

/// Read the first worksheet of a workbook; its first row is the header.
fn read_spreadsheet(path: &Path) -> Result<Table, LoadError> {
    let spreadsheet_err = |e: calamine::Error| LoadError::Spreadsheet {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut workbook = open_workbook_auto(path).map_err(spreadsheet_err)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::EmptyWorkbook {
            path: path.display().to_string(),
        })?
        .map_err(spreadsheet_err)?;

    let mut sheet_rows = range.rows();
    let headers = sheet_rows
        .next()
        .map(|r| r.iter().map(|d| cell_from_sheet(d).as_text()).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<Cell>> = sheet_rows
        .map(|r| r.iter().map(cell_from_sheet).collect())
        .collect();

    debug!(
        "read {} rows from first worksheet of {}",
        rows.len(),
        path.display()
    );
    Ok(Table { headers, rows })
}

fn cell_from_sheet(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::String(s) => Cell::from_text(s),
        // #N/A and friends read as missing values.
        Data::Error(_) => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
