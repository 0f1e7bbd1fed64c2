// Player data loading: raw tables in, typed player records out.

pub mod players;
pub mod table;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("spreadsheet error in {path}: {message}")]
    Spreadsheet { path: String, message: String },

    #[error("workbook {path} has no worksheets")]
    EmptyWorkbook { path: String },

    #[error("unsupported input format for {path} (expected .csv, .xlsx, .xlsm, .xlsb, .xls or .ods)")]
    UnsupportedFormat { path: String },

    #[error("missing required column '{column}'")]
    MissingColumn { column: String },
}
