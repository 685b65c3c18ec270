use super::grid::GridCell;
use crate::app::{Rect, Vec2, Viewport};

pub const PICKER_SCALE: f32 = 2.0;
pub const PICKER_MARGIN: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Opaque texture reference plus its pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureHandle {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

/// Tileset metadata and the on-screen picker that selects brush sources.
///
/// Picker cells use the same [`GridCell`] addressing as the level grid, but
/// count tiles inside the texture.
#[derive(Debug, Clone)]
pub struct Tileset {
    texture: TextureHandle,
    tile_size: u16,
    picker_scale: f32,
    picker_origin_px: Vec2,
    hovered: Option<GridCell>,
    anchor: Option<GridCell>,
}

impl Tileset {
    pub fn new(texture: TextureHandle, tile_size: u16) -> Self {
        Self {
            texture,
            tile_size,
            picker_scale: PICKER_SCALE,
            picker_origin_px: Vec2::ZERO,
            hovered: None,
            anchor: None,
        }
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    pub fn tile_size(&self) -> u16 {
        self.tile_size
    }

    pub fn picker_scale(&self) -> f32 {
        self.picker_scale
    }

    pub fn picker_origin_px(&self) -> Vec2 {
        self.picker_origin_px
    }

    pub fn hovered(&self) -> Option<GridCell> {
        self.hovered
    }

    pub fn set_hovered(&mut self, hovered: Option<GridCell>) {
        self.hovered = hovered;
    }

    pub fn anchor(&self) -> Option<GridCell> {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Option<GridCell>) {
        self.anchor = anchor;
    }

    /// Whole tiles per axis inside the texture.
    pub fn cell_counts(&self) -> (i32, i32) {
        if self.tile_size == 0 {
            return (0, 0);
        }
        let size = self.tile_size as u32;
        (
            (self.texture.width / size) as i32,
            (self.texture.height / size) as i32,
        )
    }

    /// Anchors the picker to the bottom-right corner of `viewport`.
    pub fn layout_picker(&mut self, viewport: Viewport) {
        let picker = self.picker_size_px();
        let margin = PICKER_MARGIN * self.picker_scale;
        self.picker_origin_px = Vec2::new(
            viewport.width as f32 - picker.x - margin,
            viewport.height as f32 - picker.y - margin,
        );
    }

    fn picker_size_px(&self) -> Vec2 {
        Vec2::new(
            self.texture.width as f32 * self.picker_scale,
            self.texture.height as f32 * self.picker_scale,
        )
    }

    pub fn picker_rect_px(&self) -> Rect {
        let size = self.picker_size_px();
        Rect::new(
            self.picker_origin_px.x,
            self.picker_origin_px.y,
            size.x,
            size.y,
        )
    }

    pub fn cell_at_screen(&self, point_px: Vec2) -> Option<GridCell> {
        if !self.picker_rect_px().contains_point(point_px) {
            return None;
        }
        let (cols, rows) = self.cell_counts();
        if cols == 0 || rows == 0 {
            return None;
        }
        let cell_px = self.tile_size as f32 * self.picker_scale;
        let local = point_px - self.picker_origin_px;
        let col = ((local.x / cell_px).floor() as i32).min(cols - 1);
        let row = ((local.y / cell_px).floor() as i32).min(rows - 1);
        Some(GridCell::new(col, row))
    }

    /// Texture-space rectangle of one picker cell.
    pub fn source_rect(&self, cell: GridCell) -> Rect {
        self.source_span(cell, cell)
    }

    /// Texture-space rectangle covering both cells inclusively, in either order.
    pub fn source_span(&self, a: GridCell, b: GridCell) -> Rect {
        let size = self.tile_size as f32;
        let min_col = a.col.min(b.col);
        let min_row = a.row.min(b.row);
        let span_cols = (a.col - b.col).abs() + 1;
        let span_rows = (a.row - b.row).abs() + 1;
        Rect::new(
            min_col as f32 * size,
            min_row as f32 * size,
            span_cols as f32 * size,
            span_rows as f32 * size,
        )
    }

    pub fn cell_rect_px(&self, cell: GridCell) -> Rect {
        let cell_px = self.tile_size as f32 * self.picker_scale;
        Rect::new(
            self.picker_origin_px.x + cell.col as f32 * cell_px,
            self.picker_origin_px.y + cell.row as f32 * cell_px,
            cell_px,
            cell_px,
        )
    }
}
