use std::collections::HashMap;

use tabtab_core::{CellRef, GridDims, Range, FIRST_OUTPUT_ROW, HEADER_ROW};

use super::cell::{Cell, CellMeta};
use super::tsv;

/// The authoritative in-memory grid.
///
/// Cells are stored sparsely; an address inside the grid with no entry reads
/// as empty text with no metadata. Writes outside the grid are ignored.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    dims: GridDims,
    cells: HashMap<CellRef, Cell>,
}

impl Sheet {
    pub fn new(dims: GridDims) -> Self {
        Self {
            name: String::from("Sheet1"),
            dims,
            cells: HashMap::new(),
        }
    }

    /// New sheet with row 1 pre-filled from a list of column headers.
    pub fn with_headers(dims: GridDims, headers: &[String]) -> Self {
        let mut sheet = Self::new(dims);
        sheet.seed_headers(headers);
        sheet
    }

    /// Write default headers into row 1 cells that are still empty.
    /// Blank defaults and existing headers are left alone. Returns the number
    /// of headers written.
    pub fn seed_headers(&mut self, headers: &[String]) -> usize {
        let mut seeded = 0;
        for (col, header) in headers.iter().enumerate().take(self.dims.cols) {
            let cell = CellRef::new(HEADER_ROW, col);
            let header = header.trim();
            if header.is_empty() || !self.text(cell).trim().is_empty() {
                continue;
            }
            self.set_text(cell, header);
            seeded += 1;
        }
        seeded
    }

    /// Build a sheet from TSV text. Line 1 lands in row 1 (the tone headers).
    /// Values past the grid edges are dropped.
    pub fn from_tsv(dims: GridDims, text: &str) -> Self {
        let mut sheet = Self::new(dims);
        for (row_offset, line) in tsv::parse(text).into_iter().enumerate() {
            for (col, value) in line.into_iter().enumerate() {
                sheet.set_text(CellRef::new(HEADER_ROW + row_offset, col), value.trim());
            }
        }
        sheet
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        self.dims.contains(cell)
    }

    pub fn cell(&self, cell: CellRef) -> Option<&Cell> {
        self.cells.get(&cell)
    }

    /// Current text of a cell as written. Empty for unknown cells.
    pub fn text(&self, cell: CellRef) -> &str {
        self.cells.get(&cell).map(|c| c.text.as_str()).unwrap_or("")
    }

    /// Current metadata of a cell (cleared for unknown cells).
    pub fn meta(&self, cell: CellRef) -> CellMeta {
        self.cells.get(&cell).map(|c| c.meta.clone()).unwrap_or_default()
    }

    /// Text a renderer should show (placeholder while generating).
    pub fn display_text(&self, cell: CellRef) -> &str {
        self.cells.get(&cell).map(|c| c.display_text()).unwrap_or("")
    }

    pub fn is_generating(&self, cell: CellRef) -> bool {
        self.cells.get(&cell).map_or(false, |c| c.is_generating())
    }

    /// Set a cell's text. Returns false if the cell is outside the grid.
    pub fn set_text(&mut self, cell: CellRef, text: &str) -> bool {
        if !self.dims.contains(cell) {
            return false;
        }
        let entry = self.cells.entry(cell).or_insert_with(Cell::new);
        entry.text = text.to_string();
        self.prune(cell);
        true
    }

    /// Replace a cell's metadata. Returns false if the cell is outside the grid.
    pub fn set_meta(&mut self, cell: CellRef, meta: CellMeta) -> bool {
        if !self.dims.contains(cell) {
            return false;
        }
        let entry = self.cells.entry(cell).or_insert_with(Cell::new);
        entry.meta = meta;
        self.prune(cell);
        true
    }

    /// Show (or with `None`, remove) a loading placeholder on a cell.
    pub fn set_placeholder(&mut self, cell: CellRef, placeholder: Option<String>) -> bool {
        if !self.dims.contains(cell) {
            return false;
        }
        let entry = self.cells.entry(cell).or_insert_with(Cell::new);
        entry.placeholder = placeholder;
        self.prune(cell);
        true
    }

    fn prune(&mut self, cell: CellRef) {
        if self.cells.get(&cell).map_or(false, |c| c.is_blank()) {
            self.cells.remove(&cell);
        }
    }

    /// Tone for a column, read from its header cell.
    pub fn tone_for_col(&self, col: usize) -> &str {
        self.text(CellRef::new(HEADER_ROW, col)).trim()
    }

    /// Columns whose header row holds a tone, left to right.
    pub fn tone_columns(&self) -> Vec<usize> {
        (0..self.dims.cols)
            .filter(|&col| !self.tone_for_col(col).is_empty())
            .collect()
    }

    /// First row at or below row 3 that is empty across all `cols`.
    pub fn next_empty_output_row(&self, cols: &[usize]) -> Option<usize> {
        (FIRST_OUTPUT_ROW..=self.dims.rows).find(|&row| {
            cols.iter().all(|&col| self.text(CellRef::new(row, col)).trim().is_empty())
        })
    }

    /// Trimmed texts of a range, one `Vec` per row.
    pub fn range_texts(&self, range: Range) -> Vec<Vec<String>> {
        (range.min_row..=range.max_row)
            .map(|row| {
                (range.min_col..=range.max_col)
                    .map(|col| self.text(CellRef::new(row, col)).trim().to_string())
                    .collect()
            })
            .collect()
    }

    /// Smallest range anchored at A1 covering every non-empty cell.
    pub fn used_range(&self) -> Option<Range> {
        let mut max_row = 0;
        let mut max_col = 0;
        let mut any = false;
        for (cell, data) in &self.cells {
            if data.text.trim().is_empty() {
                continue;
            }
            any = true;
            max_row = max_row.max(cell.row);
            max_col = max_col.max(cell.col);
        }
        any.then(|| Range::new(HEADER_ROW, 0, max_row, max_col))
    }

    /// Whole used area as TSV (row 1 first).
    pub fn to_tsv(&self) -> String {
        match self.used_range() {
            Some(range) => tsv::render(&self.range_texts(range)),
            None => String::new(),
        }
    }

    /// Number of cells holding text or metadata.
    pub fn populated_count(&self) -> usize {
        self.cells.len()
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new(GridDims::default())
    }
}
