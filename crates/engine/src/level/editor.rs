use tracing::debug;

use super::brush::{erase, EraseMode};
use super::grid::GridCell;
use super::Level;
use crate::app::{screen_to_grid, InputAction, InputSnapshot, PointerButton};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditorSettings {
    pub erase_mode: EraseMode,
}

/// Every mutation the editor can make to a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    /// Modifier pressed over the picker.
    AnchorPickerSpan(GridCell),
    /// Primary pressed over the picker; `span_from` is the picker anchor while the modifier is held.
    PickSource {
        cell: GridCell,
        span_from: Option<GridCell>,
    },
    /// Modifier pressed over the canvas.
    AnchorFootprint(GridCell),
    /// Modifier held over the canvas.
    ResizeFootprint(GridCell),
    Paint(GridCell),
    Erase(GridCell),
    ResetBody,
}

/// Applies one action; returns the number of grid cells it changed.
pub fn apply(level: &mut Level, action: EditorAction) -> usize {
    let tile_size = level.grid.tile_extent();
    match action {
        EditorAction::AnchorPickerSpan(cell) => {
            level.tileset.set_anchor(Some(cell));
            0
        }
        EditorAction::PickSource { cell, span_from } => {
            let source = match span_from {
                Some(anchor) => level.tileset.source_span(anchor, cell),
                None => level.tileset.source_rect(cell),
            };
            level.brush.select_source(source, tile_size);
            debug!(
                source_x = source.x,
                source_y = source.y,
                footprint_w = level.brush.footprint().x,
                footprint_h = level.brush.footprint().y,
                "brush_source_selected"
            );
            0
        }
        EditorAction::AnchorFootprint(cell) => {
            level.brush.set_anchor(Some(cell));
            0
        }
        EditorAction::ResizeFootprint(cell) => {
            level.brush.resize_from_anchor(cell, tile_size);
            0
        }
        EditorAction::Paint(cell) => level.brush.paint(&mut level.grid, cell),
        EditorAction::Erase(cell) => {
            usize::from(erase(&mut level.grid, cell, level.config.editor.erase_mode))
        }
        EditorAction::ResetBody => {
            level.reset_body();
            0
        }
    }
}

/// Turns one tick of pointer input into editor actions.
///
/// The picker consumes the pointer while hovered, so nothing under it is painted.
pub(crate) fn run(level: &mut Level, input: &InputSnapshot) -> usize {
    let modifier_pressed = input.was_pressed(InputAction::Modifier);
    let modifier_down = input.is_down(InputAction::Modifier);
    // Anchors only live for one modifier hold.
    if !modifier_down {
        level.tileset.set_anchor(None);
        level.brush.set_anchor(None);
    }
    let Some(pointer) = input.cursor_position_px() else {
        level.tileset.set_hovered(None);
        return 0;
    };

    if let Some(cell) = level.tileset.cell_at_screen(pointer) {
        level.tileset.set_hovered(Some(cell));
        if modifier_pressed {
            apply(level, EditorAction::AnchorPickerSpan(cell));
        }
        if input.pointer_pressed(PointerButton::Primary) {
            let span_from = if modifier_down {
                level.tileset.anchor()
            } else {
                None
            };
            apply(level, EditorAction::PickSource { cell, span_from });
        }
        return 0;
    }
    level.tileset.set_hovered(None);

    let cell = screen_to_grid(
        pointer,
        &level.camera,
        level.viewport,
        level.grid.tile_extent(),
    );
    let mut changed = 0;
    if modifier_pressed {
        apply(level, EditorAction::AnchorFootprint(cell));
    }
    if modifier_down && level.brush.anchor().is_some() {
        apply(level, EditorAction::ResizeFootprint(cell));
    }
    if input.pointer_down(PointerButton::Primary) && level.brush.is_set() {
        changed += apply(level, EditorAction::Paint(cell));
    }
    if input.pointer_down(PointerButton::Secondary) {
        changed += apply(level, EditorAction::Erase(cell));
    }
    changed
}
