use std::collections::HashSet;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::{Rect, Vec2};
use crate::level::{Color, DrawCommand, DrawList, DrawSpace, TextureId};

use super::textures::{TextureImage, TextureStore};
use super::{world_to_screen, Viewport};

const MISSING_TEXTURE_COLOR: [u8; 4] = [255, 0, 255, 255];

/// Inclusive-exclusive pixel rectangle, already clipped to the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenRectPx {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl ScreenRectPx {
    fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    warned_missing_textures: HashSet<TextureId>,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            warned_missing_textures: HashSet::new(),
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn render(&mut self, list: &DrawList, textures: &TextureStore) -> Result<(), Error> {
        if self.viewport.is_empty() {
            return Ok(());
        }
        let viewport = self.viewport;
        let warned = &mut self.warned_missing_textures;
        rasterize_draw_list(self.pixels.frame_mut(), viewport, list, textures, warned);
        self.pixels.render()
    }
}

/// Rasterizes `list` into an RGBA8 frame of `viewport` size, in command order.
pub(crate) fn rasterize_draw_list(
    frame: &mut [u8],
    viewport: Viewport,
    list: &DrawList,
    textures: &TextureStore,
    warned_missing_textures: &mut HashSet<TextureId>,
) {
    for command in list.commands() {
        match *command {
            DrawCommand::Clear(Color(color)) => {
                for chunk in frame.chunks_exact_mut(4) {
                    chunk.copy_from_slice(&color);
                }
            }
            DrawCommand::FillRect {
                space,
                rect,
                color: Color(color),
            } => {
                let px = to_screen_px(list, viewport, space, rect);
                fill_rect_clipped(frame, viewport, px, color);
            }
            DrawCommand::OutlineRect {
                space,
                rect,
                thickness_px,
                color: Color(color),
            } => {
                let px = to_screen_px(list, viewport, space, rect);
                draw_rect_outline(frame, viewport, px, thickness_px.max(1) as i32, color);
            }
            DrawCommand::TexturedQuad {
                space,
                texture,
                source,
                dest,
            } => {
                let px = to_screen_px(list, viewport, space, dest);
                match textures.get(texture) {
                    Some(image) => draw_texture_region(frame, viewport, px, image, source),
                    None => {
                        if warned_missing_textures.insert(texture) {
                            warn!(
                                texture_id = texture.0,
                                "renderer_texture_missing_using_placeholder"
                            );
                        }
                        fill_rect_clipped(frame, viewport, px, MISSING_TEXTURE_COLOR);
                    }
                }
            }
        }
    }
}

/// Unclipped pixel rectangle of `rect`; world rects go through the list's camera.
fn to_screen_px(list: &DrawList, viewport: Viewport, space: DrawSpace, rect: Rect) -> ScreenRectPx {
    let (min, max) = match space {
        DrawSpace::World => (
            world_to_screen(rect.min(), &list.camera, viewport),
            world_to_screen(rect.max(), &list.camera, viewport),
        ),
        DrawSpace::Screen => (rect.min(), rect.max()),
    };
    ScreenRectPx {
        left: round_px(min.x),
        top: round_px(min.y),
        right: round_px(max.x),
        bottom: round_px(max.y),
    }
}

fn round_px(value: f32) -> i32 {
    value.round() as i32
}

fn clip_to_frame(rect: ScreenRectPx, viewport: Viewport) -> ScreenRectPx {
    ScreenRectPx {
        left: rect.left.max(0),
        top: rect.top.max(0),
        right: rect.right.min(viewport.width as i32),
        bottom: rect.bottom.min(viewport.height as i32),
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

fn fill_rect_clipped(frame: &mut [u8], viewport: Viewport, rect: ScreenRectPx, color: [u8; 4]) {
    let clipped = clip_to_frame(rect, viewport);
    if clipped.is_empty() {
        return;
    }
    for y in clipped.top..clipped.bottom {
        for x in clipped.left..clipped.right {
            write_pixel_rgba_clipped(frame, viewport.width as usize, x, y, color);
        }
    }
}

fn draw_rect_outline(
    frame: &mut [u8],
    viewport: Viewport,
    rect: ScreenRectPx,
    thickness: i32,
    color: [u8; 4],
) {
    if rect.is_empty() {
        return;
    }
    let t_x = thickness.min(rect.right - rect.left);
    let t_y = thickness.min(rect.bottom - rect.top);
    let bands = [
        ScreenRectPx {
            bottom: rect.top + t_y,
            ..rect
        },
        ScreenRectPx {
            top: rect.bottom - t_y,
            ..rect
        },
        ScreenRectPx {
            right: rect.left + t_x,
            ..rect
        },
        ScreenRectPx {
            left: rect.right - t_x,
            ..rect
        },
    ];
    for band in bands {
        fill_rect_clipped(frame, viewport, band, color);
    }
}

/// Nearest-neighbour blit of `source` (texture pixels) into `dest`; fully transparent texels are skipped.
fn draw_texture_region(
    frame: &mut [u8],
    viewport: Viewport,
    dest: ScreenRectPx,
    image: &TextureImage,
    source: Rect,
) {
    if dest.is_empty() || image.width == 0 || image.height == 0 {
        return;
    }
    let clipped = clip_to_frame(dest, viewport);
    if clipped.is_empty() {
        return;
    }
    let scale = Vec2::new(
        source.width / (dest.right - dest.left) as f32,
        source.height / (dest.bottom - dest.top) as f32,
    );

    for out_y in clipped.top..clipped.bottom {
        let dy = (out_y - dest.top) as f32 + 0.5;
        let src_y = (source.y + dy * scale.y).floor().max(0.0) as u32;
        for out_x in clipped.left..clipped.right {
            let dx = (out_x - dest.left) as f32 + 0.5;
            let src_x = (source.x + dx * scale.x).floor().max(0.0) as u32;
            let Some(texel) = image.pixel(src_x.min(image.width - 1), src_y.min(image.height - 1))
            else {
                continue;
            };
            if texel[3] == 0 {
                continue;
            }
            write_pixel_rgba_clipped(frame, viewport.width as usize, out_x, out_y, texel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Camera2D;

    const VIEWPORT: Viewport = Viewport {
        width: 8,
        height: 6,
    };

    fn blank_frame() -> Vec<u8> {
        vec![0; VIEWPORT.width as usize * VIEWPORT.height as usize * 4]
    }

    fn pixel(frame: &[u8], x: usize, y: usize) -> [u8; 4] {
        let offset = (y * VIEWPORT.width as usize + x) * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn screen_list() -> DrawList {
        DrawList::new(Camera2D::centered_on(Vec2::new(4.0, 3.0), 1.0), VIEWPORT)
    }

    #[test]
    fn write_pixel_ignores_out_of_bounds() {
        let mut frame = blank_frame();
        write_pixel_rgba_clipped(&mut frame, 8, -1, 0, [1, 2, 3, 4]);
        write_pixel_rgba_clipped(&mut frame, 8, 0, 6, [1, 2, 3, 4]);
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn clear_then_fill_clips_to_frame() {
        let mut list = screen_list();
        list.clear(Color([9, 9, 9, 255]));
        list.fill_rect(
            DrawSpace::Screen,
            Rect::new(6.0, 4.0, 10.0, 10.0),
            Color([200, 0, 0, 255]),
        );
        let mut frame = blank_frame();
        rasterize_draw_list(
            &mut frame,
            VIEWPORT,
            &list,
            &TextureStore::new(),
            &mut HashSet::new(),
        );
        assert_eq!(pixel(&frame, 0, 0), [9, 9, 9, 255]);
        assert_eq!(pixel(&frame, 7, 5), [200, 0, 0, 255]);
        assert_eq!(pixel(&frame, 5, 5), [9, 9, 9, 255]);
    }

    #[test]
    fn world_rects_follow_the_camera() {
        let camera = Camera2D::centered_on(Vec2::new(10.0, 10.0), 2.0);
        let mut list = DrawList::new(camera, VIEWPORT);
        list.fill_rect(
            DrawSpace::World,
            Rect::new(10.0, 10.0, 1.0, 1.0),
            Color([0, 255, 0, 255]),
        );
        let mut frame = blank_frame();
        rasterize_draw_list(
            &mut frame,
            VIEWPORT,
            &list,
            &TextureStore::new(),
            &mut HashSet::new(),
        );
        assert_eq!(pixel(&frame, 4, 3), [0, 255, 0, 255]);
        assert_eq!(pixel(&frame, 5, 4), [0, 255, 0, 255]);
        assert_eq!(pixel(&frame, 6, 3), [0, 0, 0, 0]);
        assert_eq!(pixel(&frame, 3, 3), [0, 0, 0, 0]);
    }

    #[test]
    fn outline_leaves_interior_untouched() {
        let mut list = screen_list();
        list.outline_rect(
            DrawSpace::Screen,
            Rect::new(1.0, 1.0, 5.0, 4.0),
            1,
            Color([1, 1, 1, 255]),
        );
        let mut frame = blank_frame();
        rasterize_draw_list(
            &mut frame,
            VIEWPORT,
            &list,
            &TextureStore::new(),
            &mut HashSet::new(),
        );
        assert_eq!(pixel(&frame, 1, 1), [1, 1, 1, 255]);
        assert_eq!(pixel(&frame, 5, 4), [1, 1, 1, 255]);
        assert_eq!(pixel(&frame, 3, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn textured_quad_samples_source_region_nearest() {
        let mut store = TextureStore::new();
        let mut rgba = Vec::new();
        for color in [[10, 0, 0, 255], [20, 0, 0, 255], [30, 0, 0, 255], [0, 0, 0, 0]] {
            rgba.extend_from_slice(&color);
        }
        let handle = store
            .insert_rgba(
                "two_by_two",
                TextureImage {
                    width: 2,
                    height: 2,
                    rgba,
                },
            )
            .expect("insert");

        let mut list = screen_list();
        list.textured_quad(
            DrawSpace::Screen,
            handle.id,
            Rect::new(0.0, 0.0, 2.0, 2.0),
            Rect::new(0.0, 0.0, 4.0, 4.0),
        );
        let mut frame = blank_frame();
        rasterize_draw_list(&mut frame, VIEWPORT, &list, &store, &mut HashSet::new());
        assert_eq!(pixel(&frame, 0, 0), [10, 0, 0, 255]);
        assert_eq!(pixel(&frame, 3, 1), [20, 0, 0, 255]);
        assert_eq!(pixel(&frame, 1, 3), [30, 0, 0, 255]);
        assert_eq!(pixel(&frame, 3, 3), [0, 0, 0, 0]);
    }

    #[test]
    fn missing_texture_draws_placeholder_and_warns_once() {
        let mut list = screen_list();
        list.textured_quad(
            DrawSpace::Screen,
            TextureId(42),
            Rect::new(0.0, 0.0, 2.0, 2.0),
            Rect::new(0.0, 0.0, 2.0, 2.0),
        );
        let mut warned = HashSet::new();
        let mut frame = blank_frame();
        rasterize_draw_list(&mut frame, VIEWPORT, &list, &TextureStore::new(), &mut warned);
        rasterize_draw_list(&mut frame, VIEWPORT, &list, &TextureStore::new(), &mut warned);
        assert_eq!(pixel(&frame, 1, 1), MISSING_TEXTURE_COLOR);
        assert_eq!(warned.len(), 1);
    }
}
