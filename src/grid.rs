use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Rows kept verbatim by `regenerate` in the stock map (outer border plus the ghost house band)
pub const DEFAULT_TEMPLATE_ROWS: [i32; 7] = [0, 14, 15, 16, 17, 18, 31];

/// Chance that a cell in a randomized row becomes a wall
pub const DEFAULT_WALL_PROBABILITY: f64 = 0.3;

/// Size of the all-wall grid used when the map file can't be read
pub const FALLBACK_SIZE: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Floor,
    Wall,
}

impl Cell {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '0' => Some(Cell::Floor),
            '1' => Some(Cell::Wall),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Cell::Floor => '0',
            Cell::Wall => '1',
        }
    }
}

#[derive(Debug, Error)]
pub enum GridError {
    #[error("failed to access map file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("map source contains no rows")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("invalid cell '{ch}' at row {row}, column {col}")]
    InvalidCell { row: usize, col: usize, ch: char },
}

/// Tile grid of floor and wall cells, stored row-major
#[derive(Clone, Debug)]
pub struct Grid {
    pub rows: i32,
    pub cols: i32,
    cells: Vec<Cell>,
    /// Cells as originally loaded; `regenerate` copies template rows from here
    source: Vec<Cell>,
    /// Revision number - incremented whenever grid cells change
    revision: u64,
}

impl Grid {
    fn from_cells(rows: i32, cols: i32, cells: Vec<Cell>) -> Self {
        Grid {
            rows,
            cols,
            source: cells.clone(),
            cells,
            revision: 0,
        }
    }

    /// Create a grid with every cell set to floor
    pub fn new(rows: i32, cols: i32) -> Self {
        Self::filled(rows, cols, Cell::Floor)
    }

    pub fn filled(rows: i32, cols: i32, cell: Cell) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self::from_cells(rows, cols, vec![cell; (rows * cols) as usize])
    }

    /// Create an open grid with specific wall cells (given as cell IDs)
    pub fn with_walls(rows: i32, cols: i32, walls: &[i32]) -> Self {
        let mut cells = vec![Cell::Floor; (rows.max(1) * cols.max(1)) as usize];
        for &cell_id in walls {
            if cell_id >= 0 && (cell_id as usize) < cells.len() {
                cells[cell_id as usize] = Cell::Wall;
            }
        }
        Self::from_cells(rows.max(1), cols.max(1), cells)
    }

    /// Parse the `0`/`1` text format. Blank lines are skipped and every
    /// remaining row must have the same width.
    pub fn parse(text: &str) -> Result<Self, GridError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let Some(first) = lines.first() else {
            return Err(GridError::Empty);
        };
        let cols = first.chars().count();

        let mut cells = Vec::with_capacity(lines.len() * cols);
        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(GridError::RaggedRow { row, expected: cols, found });
            }
            for (col, ch) in line.chars().enumerate() {
                let cell = Cell::from_char(ch).ok_or(GridError::InvalidCell { row, col, ch })?;
                cells.push(cell);
            }
        }

        Ok(Self::from_cells(lines.len() as i32, cols as i32, cells))
    }

    /// Read and parse a map file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| GridError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Load a map file, substituting an all-wall grid if it can't be used
    pub fn load_or_fallback(path: impl AsRef<Path>, fallback_rows: i32, fallback_cols: i32) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(grid) => {
                log::info!("Loaded {}x{} map from {}", grid.cols, grid.rows, path.display());
                grid
            }
            Err(e) => {
                log::warn!("Could not load map: {}", e);
                log::warn!("Using a {}x{} all-wall map", fallback_cols, fallback_rows);
                Self::filled(fallback_rows, fallback_cols, Cell::Wall)
            }
        }
    }

    /// Serialize rows back to the `0`/`1` format, one newline-terminated line per row
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(((self.cols + 1) * self.rows) as usize);
        for row in self.cells.chunks(self.cols as usize) {
            text.extend(row.iter().map(|cell| cell.to_char()));
            text.push('\n');
        }
        text
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GridError> {
        let path = path.as_ref();
        fs::write(path, self.to_text()).map_err(|source| GridError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Re-derive the grid from its source layout: template rows are copied
    /// verbatim, every other row is re-rolled with walls at `wall_probability`
    /// and walled off at both ends.
    pub fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R, template_rows: &[i32], wall_probability: f64) {
        let p = if wall_probability.is_nan() { 0.0 } else { wall_probability.clamp(0.0, 1.0) };
        let cols = self.cols as usize;

        for y in 0..self.rows {
            let start = y as usize * cols;
            let row = &mut self.cells[start..start + cols];

            if template_rows.contains(&y) {
                row.copy_from_slice(&self.source[start..start + cols]);
                continue;
            }

            for cell in row.iter_mut() {
                *cell = if rng.gen_bool(p) { Cell::Wall } else { Cell::Floor };
            }
            row[0] = Cell::Wall;
            row[cols - 1] = Cell::Wall;
        }

        self.revision += 1;
    }

    /// Check if (x, y) is inside the grid and a floor cell
    pub fn is_valid(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.cells[self.get_id(x, y) as usize] == Cell::Floor
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.cols && y >= 0 && y < self.rows
    }

    /// Check if a cell at (x, y) is a wall. Out of bounds counts as wall.
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        !self.is_valid(x, y)
    }

    /// Convert (x, y) coordinates to cell ID
    pub fn get_id(&self, x: i32, y: i32) -> i32 {
        x + y * self.cols
    }

    /// Convert cell ID to (x, y) coordinates
    pub fn get_coords(&self, id: i32) -> (i32, i32) {
        (id % self.cols, id / self.cols)
    }

    /// Get cell at (x, y); out of bounds reads as wall
    pub fn get_cell(&self, x: i32, y: i32) -> Cell {
        if !self.in_bounds(x, y) {
            return Cell::Wall;
        }
        self.cells[self.get_id(x, y) as usize]
    }

    /// Set cell at (x, y)
    pub fn set_cell(&mut self, x: i32, y: i32, cell: Cell) {
        if self.in_bounds(x, y) {
            let id = self.get_id(x, y) as usize;
            if self.cells[id] != cell {
                self.cells[id] = cell;
                self.revision += 1;
            }
        }
    }

    /// All floor cells in row-major order
    pub fn floor_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Floor)
            .map(|(id, _)| self.get_coords(id as i32))
    }

    /// Get current grid revision number
    pub fn get_revision(&self) -> u64 {
        self.revision
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.cells == other.cells
    }
}
