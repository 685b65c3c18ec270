use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::arena::LevelArena;
use super::LevelError;
use crate::app::{Rect, Vec2};

/// Signed grid address; may lie outside the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub col: i32,
    pub row: i32,
}

impl GridCell {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn offset(self, d_col: i32, d_row: i32) -> Self {
        Self {
            col: self.col.saturating_add(d_col),
            row: self.row.saturating_add(d_row),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tile {
    pub source: Rect,
    pub dest: Rect,
    pub solid: bool,
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        source: Rect::ZERO,
        dest: Rect::ZERO,
        solid: false,
    };

    pub fn is_empty(&self) -> bool {
        !self.solid && !self.source.has_area()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell ({col}, {row}) is outside the {cols}x{rows} grid")]
    OutOfBounds {
        col: i32,
        row: i32,
        cols: u16,
        rows: u16,
    },
}

/// Fixed `cols x rows` tile storage, addressed row-major.
#[derive(Debug, Clone)]
pub struct TileGrid {
    cols: u16,
    rows: u16,
    tile_size: u16,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn allocate(
        arena: &mut LevelArena,
        cols: u16,
        rows: u16,
        tile_size: u16,
    ) -> Result<Self, LevelError> {
        if cols == 0 || rows == 0 || tile_size == 0 {
            return Err(LevelError::InvalidDimensions {
                tiles_wide: cols,
                tiles_high: rows,
                tile_size,
            });
        }
        let tiles = arena.alloc_filled(cols as usize * rows as usize, Tile::EMPTY)?;
        Ok(Self {
            cols,
            rows,
            tile_size,
            tiles,
        })
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn tile_size(&self) -> u16 {
        self.tile_size
    }

    pub fn tile_extent(&self) -> f32 {
        self.tile_size as f32
    }

    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            self.cols as f32 * self.tile_extent(),
            self.rows as f32 * self.tile_extent(),
        )
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        self.index(cell).is_some()
    }

    /// Linear index `row * cols + col`, or `None` outside the grid.
    pub fn index(&self, cell: GridCell) -> Option<usize> {
        if cell.col < 0 || cell.row < 0 {
            return None;
        }
        let (col, row) = (cell.col as usize, cell.row as usize);
        if col >= self.cols as usize || row >= self.rows as usize {
            return None;
        }
        Some(row * self.cols as usize + col)
    }

    fn cell_at_index(&self, index: usize) -> GridCell {
        let cols = self.cols as usize;
        GridCell::new((index % cols) as i32, (index / cols) as i32)
    }

    fn out_of_bounds(&self, cell: GridCell) -> GridError {
        GridError::OutOfBounds {
            col: cell.col,
            row: cell.row,
            cols: self.cols,
            rows: self.rows,
        }
    }

    pub fn get(&self, cell: GridCell) -> Result<Tile, GridError> {
        self.index(cell)
            .map(|index| self.tiles[index])
            .ok_or_else(|| self.out_of_bounds(cell))
    }

    /// Stores `tile` at `cell`. Returns whether the stored tile changed.
    pub fn set(&mut self, cell: GridCell, tile: Tile) -> Result<bool, GridError> {
        let index = self.index(cell).ok_or_else(|| self.out_of_bounds(cell))?;
        let slot = &mut self.tiles[index];
        let changed = *slot != tile;
        *slot = tile;
        Ok(changed)
    }

    pub fn is_solid(&self, cell: GridCell) -> bool {
        self.get(cell).map(|tile| tile.solid).unwrap_or(false)
    }

    pub fn tile_rect(&self, cell: GridCell) -> Rect {
        let size = self.tile_extent();
        Rect::new(cell.col as f32 * size, cell.row as f32 * size, size, size)
    }

    /// Cells overlapping `query`, clamped to the grid, in row-major order.
    pub fn candidate_tiles(&self, query: Rect) -> CandidateTiles {
        let size = self.tile_extent();
        let min = query.min();
        let max = query.max();
        let col_start = ((min.x / size).floor() as i32).max(0);
        let col_end = ((max.x / size).ceil() as i32).min(self.cols as i32);
        let row_start = ((min.y / size).floor() as i32).max(0);
        let row_end = ((max.y / size).ceil() as i32).min(self.rows as i32);
        CandidateTiles {
            col_start,
            col_end,
            row_end,
            next: GridCell::new(col_start, row_start),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridCell, &Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(|(index, tile)| (self.cell_at_index(index), tile))
    }

    pub fn clear(&mut self) {
        self.tiles.fill(Tile::EMPTY);
    }
}

#[derive(Debug, Clone)]
pub struct CandidateTiles {
    col_start: i32,
    col_end: i32,
    row_end: i32,
    next: GridCell,
}

impl Iterator for CandidateTiles {
    type Item = GridCell;

    fn next(&mut self) -> Option<GridCell> {
        if self.col_start >= self.col_end || self.next.row >= self.row_end {
            return None;
        }
        let cell = self.next;
        self.next.col += 1;
        if self.next.col >= self.col_end {
            self.next.col = self.col_start;
            self.next.row += 1;
        }
        Some(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn grid(cols: u16, rows: u16) -> TileGrid {
        TileGrid::allocate(&mut LevelArena::default(), cols, rows, 18).expect("grid")
    }

    fn solid_at(grid: &TileGrid, cell: GridCell) -> Tile {
        Tile {
            source: Rect::new(0.0, 0.0, 18.0, 18.0),
            dest: grid.tile_rect(cell),
            solid: true,
        }
    }

    #[test]
    fn valid_cells_map_to_unique_indices() {
        let grid = grid(7, 5);
        let mut seen = HashSet::new();
        for row in 0..5 {
            for col in 0..7 {
                let index = grid.index(GridCell::new(col, row)).expect("in range");
                assert!(index < 35);
                assert_eq!(index, row as usize * 7 + col as usize);
                assert!(seen.insert(index));
            }
        }
        assert_eq!(seen.len(), 35);
    }

    #[test]
    fn out_of_range_access_is_an_error() {
        let mut grid = grid(4, 3);
        for cell in [
            GridCell::new(-1, 0),
            GridCell::new(0, -1),
            GridCell::new(4, 0),
            GridCell::new(0, 3),
        ] {
            assert_eq!(grid.index(cell), None);
            assert_eq!(
                grid.get(cell),
                Err(GridError::OutOfBounds {
                    col: cell.col,
                    row: cell.row,
                    cols: 4,
                    rows: 3
                })
            );
            assert!(grid.set(cell, Tile::EMPTY).is_err());
        }
    }

    #[test]
    fn set_reports_whether_tile_changed() {
        let mut grid = grid(4, 4);
        let cell = GridCell::new(2, 1);
        let tile = solid_at(&grid, cell);
        assert_eq!(grid.set(cell, tile), Ok(true));
        assert_eq!(grid.set(cell, tile), Ok(false));
        assert_eq!(grid.get(cell), Ok(tile));
        assert!(grid.is_solid(cell));
    }

    #[test]
    fn tile_rect_is_derived_from_indices() {
        let grid = grid(4, 4);
        assert_eq!(
            grid.tile_rect(GridCell::new(3, 2)),
            Rect::new(54.0, 36.0, 18.0, 18.0)
        );
    }

    #[test]
    fn candidate_tiles_clamp_to_grid_and_iterate_row_major() {
        let grid = grid(10, 10);
        let cells: Vec<_> = grid
            .candidate_tiles(Rect::new(-10.0, 20.0, 40.0, 20.0))
            .collect();
        assert_eq!(
            cells,
            vec![
                GridCell::new(0, 1),
                GridCell::new(1, 1),
                GridCell::new(0, 2),
                GridCell::new(1, 2),
            ]
        );
    }

    #[test]
    fn candidate_tiles_outside_grid_is_empty() {
        let grid = grid(10, 10);
        assert_eq!(
            grid.candidate_tiles(Rect::new(500.0, 0.0, 18.0, 18.0))
                .count(),
            0
        );
        assert_eq!(
            grid.candidate_tiles(Rect::new(0.0, -100.0, 18.0, 18.0))
                .count(),
            0
        );
    }

    #[test]
    fn iter_and_clear_cover_every_cell() {
        let mut grid = grid(3, 2);
        let cell = GridCell::new(1, 1);
        let tile = solid_at(&grid, cell);
        grid.set(cell, tile).expect("set");
        let cells: Vec<_> = grid.iter().map(|(cell, _)| cell).collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[4], cell);
        assert_eq!(grid.iter().filter(|(_, tile)| tile.solid).count(), 1);

        grid.clear();
        assert!(grid.iter().all(|(_, tile)| tile.is_empty()));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let error = TileGrid::allocate(&mut LevelArena::default(), 0, 5, 18).expect_err("zero");
        assert!(matches!(error, LevelError::InvalidDimensions { .. }));
    }
}
