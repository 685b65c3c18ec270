use super::grid::{GridCell, Tile, TileGrid};
use crate::app::{Rect, Vec2};

pub const MAX_BRUSH_TILES: u16 = 20;

pub fn max_brush_size(tile_size: f32) -> f32 {
    tile_size * MAX_BRUSH_TILES as f32
}

/// Clamps one footprint axis to `[tile_size, MAX_BRUSH_SIZE]`; NaN becomes `tile_size`.
pub fn clamp_brush_extent(extent: f32, tile_size: f32) -> f32 {
    extent.max(tile_size).min(max_brush_size(tile_size))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EraseMode {
    /// Clears the source region and the solid flag.
    #[default]
    Full,
    /// Clears only the source region; the cell stays solid.
    VisualOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    source: Rect,
    footprint: Vec2,
    is_set: bool,
    anchor: Option<GridCell>,
}

impl Brush {
    pub fn new(tile_size: f32) -> Self {
        Self {
            source: Rect::ZERO,
            footprint: Vec2::new(tile_size, tile_size),
            is_set: false,
            anchor: None,
        }
    }

    pub fn source(&self) -> Rect {
        self.source
    }

    pub fn footprint(&self) -> Vec2 {
        self.footprint
    }

    pub fn is_set(&self) -> bool {
        self.is_set
    }

    pub fn anchor(&self) -> Option<GridCell> {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Option<GridCell>) {
        self.anchor = anchor;
    }

    /// Selects `source` (texture space) and sizes the footprint to match it.
    pub fn select_source(&mut self, source: Rect, tile_size: f32) {
        let width = clamp_brush_extent(source.width, tile_size);
        let height = clamp_brush_extent(source.height, tile_size);
        self.source = Rect::new(source.x, source.y, width, height);
        self.footprint = Vec2::new(width, height);
        self.is_set = true;
    }

    pub fn set_footprint(&mut self, footprint: Vec2, tile_size: f32) {
        self.footprint = Vec2::new(
            clamp_brush_extent(footprint.x, tile_size),
            clamp_brush_extent(footprint.y, tile_size),
        );
    }

    /// Footprint of `(|delta| + 1)` tiles per axis between the anchor and `cell`.
    pub fn resize_from_anchor(&mut self, cell: GridCell, tile_size: f32) -> bool {
        let Some(anchor) = self.anchor else {
            return false;
        };
        let cols = cell.col.abs_diff(anchor.col) as f32 + 1.0;
        let rows = cell.row.abs_diff(anchor.row) as f32 + 1.0;
        self.set_footprint(Vec2::new(cols * tile_size, rows * tile_size), tile_size);
        true
    }

    pub fn footprint_cells(&self, tile_size: f32) -> (i32, i32) {
        (
            whole_cells(self.footprint.x, tile_size),
            whole_cells(self.footprint.y, tile_size),
        )
    }

    fn source_cells(&self, tile_size: f32) -> (i32, i32) {
        (
            whole_cells(self.source.width, tile_size),
            whole_cells(self.source.height, tile_size),
        )
    }

    /// Texture-space tile for footprint offset `(d_col, d_row)`; multi-cell sources wrap.
    pub fn source_for_offset(&self, d_col: i32, d_row: i32, tile_size: f32) -> Rect {
        let (cols, rows) = self.source_cells(tile_size);
        let sub_col = d_col.rem_euclid(cols);
        let sub_row = d_row.rem_euclid(rows);
        Rect::new(
            self.source.x + sub_col as f32 * tile_size,
            self.source.y + sub_row as f32 * tile_size,
            tile_size,
            tile_size,
        )
    }

    /// Stamps the footprint with its top-left at `origin`; returns the number of changed cells.
    pub fn paint(&self, grid: &mut TileGrid, origin: GridCell) -> usize {
        if !self.is_set {
            return 0;
        }
        let tile_size = grid.tile_extent();
        let (cols, rows) = self.footprint_cells(tile_size);
        let mut changed = 0;
        for d_row in 0..rows {
            for d_col in 0..cols {
                let cell = origin.offset(d_col, d_row);
                if !grid.contains(cell) {
                    continue;
                }
                let tile = Tile {
                    source: self.source_for_offset(d_col, d_row, tile_size),
                    dest: grid.tile_rect(cell),
                    solid: true,
                };
                if let Ok(true) = grid.set(cell, tile) {
                    changed += 1;
                }
            }
        }
        changed
    }

    pub fn clear(&mut self, tile_size: f32) {
        *self = Self::new(tile_size);
    }
}

/// Clears the tile under `cell`; returns whether anything changed.
pub fn erase(grid: &mut TileGrid, cell: GridCell, mode: EraseMode) -> bool {
    let Ok(current) = grid.get(cell) else {
        return false;
    };
    let next = match mode {
        EraseMode::Full => Tile::EMPTY,
        EraseMode::VisualOnly => Tile {
            source: Rect::ZERO,
            ..current
        },
    };
    grid.set(cell, next).unwrap_or(false)
}

fn whole_cells(extent: f32, tile_size: f32) -> i32 {
    ((extent / tile_size).round() as i32).max(1)
}
