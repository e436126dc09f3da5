//! Grid module - the 8x8 board of piece slots
//!
//! Storage plus bounds checks only; match detection, specials and the
//! resolution loop live in their own modules. Uses a flat array for cache
//! locality and zero-allocation access.
//! Coordinates: `(row, col)` with `(0, 0)` top-left; row 7 is the bottom,
//! where pieces come to rest after a cascade.

use jelly_crush_types::{Cell, Coord, Fruit, Piece, GRID_CELLS, GRID_SIZE};

/// The game board - an 8x8 grid using flat row-major storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cells: [Cell; GRID_CELLS],
}

impl Grid {
    /// Create a new empty grid.
    pub fn new() -> Self {
        Self {
            cells: [None; GRID_CELLS],
        }
    }

    fn index(coord: Coord) -> Option<usize> {
        coord.in_bounds().then(|| coord.index())
    }

    pub fn width(&self) -> usize {
        GRID_SIZE
    }

    pub fn height(&self) -> usize {
        GRID_SIZE
    }

    /// Get the cell at `coord`. Returns `None` if out of bounds,
    /// `Some(None)` for an in-bounds empty cell.
    pub fn get(&self, coord: Coord) -> Option<Cell> {
        Self::index(coord).map(|idx| self.cells[idx])
    }

    /// Get the piece at `coord`, flattening out-of-bounds and empty.
    pub fn piece(&self, coord: Coord) -> Option<Piece> {
        self.get(coord).flatten()
    }

    /// Convenience accessor by raw row/col.
    pub fn piece_at(&self, row: usize, col: usize) -> Option<Piece> {
        self.piece(Coord::new(row as u8, col as u8))
    }

    /// Set the cell at `coord`. Returns false if out of bounds.
    pub fn set(&mut self, coord: Coord, cell: Cell) -> bool {
        match Self::index(coord) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Remove and return the piece at `coord`, leaving the cell empty.
    pub fn take(&mut self, coord: Coord) -> Option<Piece> {
        Self::index(coord).and_then(|idx| self.cells[idx].take())
    }

    /// Swap the contents of two cells. Returns false if either is out of
    /// bounds (neither cell is touched in that case).
    pub fn swap(&mut self, a: Coord, b: Coord) -> bool {
        match (Self::index(a), Self::index(b)) {
            (Some(ia), Some(ib)) => {
                self.cells.swap(ia, ib);
                true
            }
            _ => false,
        }
    }

    pub fn is_empty_cell(&self, coord: Coord) -> bool {
        matches!(self.get(coord), Some(None))
    }

    /// Iterate all in-bounds coordinates in row-major order.
    pub fn coords() -> impl Iterator<Item = Coord> {
        (0..GRID_SIZE as u8)
            .flat_map(|row| (0..GRID_SIZE as u8).map(move |col| Coord::new(row, col)))
    }

    /// Compact every column downward, preserving relative order, without
    /// introducing new pieces. Returns true if anything moved.
    pub fn cascade(&mut self) -> bool {
        let mut moved = false;
        for col in 0..GRID_SIZE {
            let mut write_row = GRID_SIZE - 1;
            for row in (0..GRID_SIZE).rev() {
                let src = Coord::new(row as u8, col as u8);
                if let Some(piece) = self.piece(src) {
                    if row != write_row {
                        moved = true;
                        self.set(Coord::new(write_row as u8, col as u8), Some(piece));
                        self.set(src, None);
                    }
                    write_row = write_row.saturating_sub(1);
                }
            }
        }
        moved
    }

    /// Clear every transient `is_swapped` flag.
    pub fn clear_swapped_flags(&mut self) {
        for cell in &mut self.cells {
            if let Some(piece) = cell {
                piece.is_swapped = false;
            }
        }
    }

    /// Mark the piece at `coord` as just-swapped. No-op on empty/out-of-bounds.
    pub fn mark_swapped(&mut self, coord: Coord) {
        if let Some(idx) = Self::index(coord) {
            if let Some(piece) = &mut self.cells[idx] {
                piece.is_swapped = true;
            }
        }
    }

    /// Count non-empty cells.
    pub fn piece_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Multiset of fruit kinds currently on the board, as per-palette counts.
    /// Special pieces are not counted.
    pub fn fruit_histogram(&self) -> [u32; jelly_crush_types::FRUIT_COUNT] {
        let mut histogram = [0u32; jelly_crush_types::FRUIT_COUNT];
        for cell in &self.cells {
            if let Some(fruit) = cell.and_then(Piece::as_fruit) {
                histogram[fruit.index()] += 1;
            }
        }
        histogram
    }

    /// Encode the board into a u8 grid for snapshots and the host protocol.
    /// 0 = empty, 1..=7 = fruit (palette index + 1), 8..=11 = special.
    pub fn write_u8_grid(&self, out: &mut [[u8; GRID_SIZE]; GRID_SIZE]) {
        for coord in Self::coords() {
            out[coord.row as usize][coord.col as usize] = match self.piece(coord) {
                None => 0,
                Some(piece) => match piece.kind {
                    jelly_crush_types::PieceKind::Fruit(f) => f.index() as u8 + 1,
                    jelly_crush_types::PieceKind::Special(s) => match s {
                        jelly_crush_types::SpecialKind::RocketH => 8,
                        jelly_crush_types::SpecialKind::RocketV => 9,
                        jelly_crush_types::SpecialKind::Bomb => 10,
                        jelly_crush_types::SpecialKind::ColorBomb => 11,
                    },
                },
            };
        }
    }

    /// Build a grid from one fruit character per cell; see `fruit_from_char`.
    /// Intended for tests and harnesses.
    ///
    /// Each of the 8 strings is one row, top to bottom; `.` is an empty cell.
    pub fn from_rows(rows: [&str; GRID_SIZE]) -> Self {
        let mut grid = Self::new();
        for (r, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), GRID_SIZE, "row {r} must have {GRID_SIZE} cells");
            for (c, ch) in row.chars().enumerate() {
                let cell = match ch {
                    '.' => None,
                    _ => Some(Piece::fruit(
                        fruit_from_char(ch).unwrap_or_else(|| panic!("bad fruit char {ch:?}")),
                    )),
                };
                grid.set(Coord::new(r as u8, c as u8), cell);
            }
        }
        grid
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-letter fruit codes for compact board literals:
/// `b`anana, `k`iwi, `l`emon, `w`atermelon, `g`rape, `c`herry, c`o`conut.
pub fn fruit_from_char(ch: char) -> Option<Fruit> {
    match ch.to_ascii_lowercase() {
        'b' => Some(Fruit::Banana),
        'k' => Some(Fruit::Kiwi),
        'l' => Some(Fruit::Lemon),
        'w' => Some(Fruit::Watermelon),
        'g' => Some(Fruit::Grape),
        'c' => Some(Fruit::Cherry),
        'o' => Some(Fruit::Coconut),
        _ => None,
    }
}
