// Player records: required-column validation, projection column discovery,
// and row parsing.

use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use super::table::{read_table, Table};
use super::LoadError;

/// Columns every input must carry, checked in this order.
pub const REQUIRED_COLUMNS: [&str; 4] = ["name", "pos", "money", "pgp"];

// ---------------------------------------------------------------------------
// Position / Role
// ---------------------------------------------------------------------------

/// Roster bucket a position counts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Forward,
    Defense,
}

/// Hockey position as written in the `pos` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Position {
    LeftWing,
    Center,
    RightWing,
    Defense,
    /// Anything else. Kept verbatim for reporting; never eligible.
    Other(String),
}

impl Position {
    /// Parse a `pos` cell. The raw cell text must equal one of the four
    /// codes exactly: `"l"` and `" D"` are both ineligible.
    pub fn from_str_pos(s: &str) -> Self {
        match s {
            "L" => Position::LeftWing,
            "C" => Position::Center,
            "R" => Position::RightWing,
            "D" => Position::Defense,
            other => Position::Other(other.to_string()),
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Position::LeftWing | Position::Center | Position::RightWing => Some(Role::Forward),
            Position::Defense => Some(Role::Defense),
            Position::Other(_) => None,
        }
    }

    pub fn display_str(&self) -> &str {
        match self {
            Position::LeftWing => "L",
            Position::Center => "C",
            Position::RightWing => "R",
            Position::Defense => "D",
            Position::Other(raw) => raw.as_str(),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One input row, typed. Numeric fields may be NaN when the cell was
/// malformed; the optimizer rejects those before solving.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    /// Zero-based data row in the input (header excluded).
    pub row: usize,
    pub name: String,
    pub position: Position,
    pub cost: f64,
    pub pgp: f64,
    /// Season point projection, when a projection column exists and the
    /// cell is not null.
    pub projection: Option<f64>,
}

/// Parsed players plus the projection column that fed them, if any.
#[derive(Debug, Clone)]
pub struct PlayerTable {
    pub projection_column: Option<String>,
    pub players: Vec<PlayerRecord>,
}

// ---------------------------------------------------------------------------
// Column discovery
// ---------------------------------------------------------------------------

/// Index of the first column whose name, lowercased, contains both "point"
/// and "projection".
pub fn find_projection_column<S: AsRef<str>>(headers: &[S]) -> Option<usize> {
    headers.iter().position(|h| {
        let lower = h.as_ref().to_lowercase();
        lower.contains("point") && lower.contains("projection")
    })
}

/// First required column absent from `table`, if any.
fn first_missing_column(table: &Table) -> Option<&'static str> {
    REQUIRED_COLUMNS
        .iter()
        .copied()
        .find(|col| table.column(col).is_none())
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Validate required columns, then turn every non-blank row into a
/// `PlayerRecord`.
pub fn parse_players(table: &Table) -> Result<PlayerTable, LoadError> {
    info!("available columns: {:?}", table.headers);

    if let Some(column) = first_missing_column(table) {
        return Err(LoadError::MissingColumn {
            column: column.to_string(),
        });
    }

    // All four are present after the check above.
    let col = |name: &str| table.column(name).unwrap_or_default();
    let (name_col, pos_col, money_col, pgp_col) =
        (col("name"), col("pos"), col("money"), col("pgp"));

    let projection_col = find_projection_column(&table.headers);
    let projection_column = projection_col.map(|i| table.headers[i].clone());
    match &projection_column {
        Some(name) => info!("using '{}' as the point projection column", name),
        None => info!("no point projection column found; ppg falls back to pgp"),
    }

    let mut players = Vec::with_capacity(table.rows.len());
    for (row, cells) in table.rows.iter().enumerate() {
        if cells.iter().all(|c| c.is_empty()) {
            debug!("skipping blank row {}", row);
            continue;
        }

        let position = Position::from_str_pos(&table.cell(row, pos_col).as_text());
        if position.role().is_none() {
            debug!(
                "row {}: position '{}' is not L/C/R/D; player is ineligible",
                row, position
            );
        }

        players.push(PlayerRecord {
            row,
            name: table.cell(row, name_col).as_text(),
            position,
            cost: table.cell(row, money_col).as_f64(),
            pgp: table.cell(row, pgp_col).as_f64(),
            projection: projection_col.and_then(|c| table.cell(row, c).as_optional_f64()),
        });
    }

    info!("loaded {} players", players.len());
    Ok(PlayerTable {
        projection_column,
        players,
    })
}

/// Read and parse the player table at `path`.
pub fn load_players(path: &Path) -> Result<PlayerTable, LoadError> {
    let table = read_table(path)?;
    parse_players(&table)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
