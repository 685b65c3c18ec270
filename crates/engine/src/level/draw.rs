use super::tileset::TextureId;
use crate::app::{Camera2D, Rect, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const BACKGROUND: Color = Color([20, 22, 28, 255]);
    pub const PALE_BLUE: Color = Color([175, 200, 235, 255]);
    pub const GRID_LINE: Color = Color([52, 58, 70, 255]);
    pub const HIGHLIGHT: Color = Color([255, 210, 70, 255]);
    pub const BRUSH_PREVIEW: Color = Color([80, 220, 255, 255]);
    pub const BODY: Color = Color([230, 70, 90, 255]);
    pub const PROJECTILE: Color = Color([250, 245, 200, 255]);
    pub const PICKER_BACKDROP: Color = Color([35, 39, 46, 255]);
    pub const SWATCH_FRAME: Color = Color([220, 220, 240, 255]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawSpace {
    /// Transformed through the list's camera.
    World,
    /// Raw window pixels.
    Screen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    FillRect {
        space: DrawSpace,
        rect: Rect,
        color: Color,
    },
    OutlineRect {
        space: DrawSpace,
        rect: Rect,
        thickness_px: u32,
        color: Color,
    },
    TexturedQuad {
        space: DrawSpace,
        texture: TextureId,
        source: Rect,
        dest: Rect,
    },
}

/// Back-end agnostic output of one render pass, in submission order.
#[derive(Debug, Clone)]
pub struct DrawList {
    pub camera: Camera2D,
    pub viewport: Viewport,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(camera: Camera2D, viewport: Viewport) -> Self {
        Self {
            camera,
            viewport,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn clear(&mut self, color: Color) {
        self.push(DrawCommand::Clear(color));
    }

    pub fn fill_rect(&mut self, space: DrawSpace, rect: Rect, color: Color) {
        self.push(DrawCommand::FillRect { space, rect, color });
    }

    pub fn outline_rect(&mut self, space: DrawSpace, rect: Rect, thickness_px: u32, color: Color) {
        self.push(DrawCommand::OutlineRect {
            space,
            rect,
            thickness_px,
            color,
        });
    }

    pub fn textured_quad(&mut self, space: DrawSpace, texture: TextureId, source: Rect, dest: Rect) {
        self.push(DrawCommand::TexturedQuad {
            space,
            texture,
            source,
            dest,
        });
    }
}
