use std::fmt;

use tabtab_provider::GenerateError;

/// A command refused before it touched the grid.
///
/// `Display` yields the alert text shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    NoSelection,
    HeaderRow,
    HeaderSource,
    EmptySource,
    EmptyCurrentCell,
    EmptyOrigin,
    NoToneColumns,
    NoEmptyRow { last_row: usize },
    ColumnWithoutHeader,
    NoRowsBelow,
    /// Provider credentials or model missing
    NotConfigured(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::NoSelection => write!(f, "Please select a cell first."),
            CommandError::HeaderRow => write!(f, "Please select a cell below the header row."),
            CommandError::HeaderSource => write!(f, "Select a non-header cell to generate from."),
            CommandError::EmptySource => {
                write!(f, "The selected cell is empty. Please enter some text first.")
            }
            CommandError::EmptyCurrentCell => {
                write!(f, "Please enter some text in the current cell first.")
            }
            CommandError::EmptyOrigin => write!(
                f,
                "Please enter some text in the starting cell first, then drag to fill."
            ),
            CommandError::NoToneColumns => write!(
                f,
                "Please add at least one tone in row 1 (a column header) first."
            ),
            CommandError::NoEmptyRow { last_row } => write!(
                f,
                "No empty output row available (rows 3-{} are already filled for the active tone columns).",
                last_row
            ),
            CommandError::ColumnWithoutHeader => write!(
                f,
                "This column has no header. Please select a column with a header (e.g., CTA Button, Tray Title)."
            ),
            CommandError::NoRowsBelow => write!(f, "No rows available below the selected cell."),
            CommandError::NotConfigured(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<GenerateError> for CommandError {
    /// Only configuration failures are pre-flight; anything else reaching
    /// here is reported with its message as-is.
    fn from(err: GenerateError) -> Self {
        CommandError::NotConfigured(err.to_string())
    }
}
