use std::path::{Path, PathBuf};

use image::ImageReader;
use tracing::info;

use crate::level::{BoundedVec, LevelError, TextureHandle, TextureId};

pub const MAX_TEXTURES: usize = 15;

const GENERATED_PALETTE: [[u8; 4]; 8] = [
    [74, 112, 56, 255],
    [112, 83, 58, 255],
    [96, 104, 118, 255],
    [150, 128, 84, 255],
    [60, 92, 128, 255],
    [138, 70, 62, 255],
    [92, 130, 110, 255],
    [170, 160, 140, 255],
];
const GENERATED_EDGE_SHADE: u8 = 40;

/// Decoded RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    /// Pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.rgba.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

#[derive(Debug)]
struct StoredTexture {
    key: String,
    image: TextureImage,
}

/// Loaded textures addressed by [`TextureId`]; loading the same key twice returns the first handle.
#[derive(Debug)]
pub struct TextureStore {
    textures: BoundedVec<StoredTexture>,
}

impl Default for TextureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureStore {
    pub fn new() -> Self {
        Self {
            textures: BoundedVec::with_capacity(MAX_TEXTURES),
        }
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn get(&self, id: TextureId) -> Option<&TextureImage> {
        self.textures
            .get(id.0 as usize)
            .map(|stored| &stored.image)
    }

    fn find(&self, key: &str) -> Option<TextureHandle> {
        self.textures
            .iter()
            .position(|stored| stored.key == key)
            .map(|index| self.handle_at(index))
    }

    fn handle_at(&self, index: usize) -> TextureHandle {
        let image = &self.textures.as_slice()[index].image;
        TextureHandle {
            id: TextureId(index as u32),
            width: image.width,
            height: image.height,
        }
    }

    pub fn load_png(&mut self, path: &Path) -> Result<TextureHandle, LevelError> {
        let key = path.display().to_string();
        if let Some(handle) = self.find(&key) {
            return Ok(handle);
        }
        let image = load_rgba(path).map_err(|reason| LevelError::AssetLoadFailure {
            path: path.to_path_buf(),
            reason,
        })?;
        let handle = self.insert_rgba(&key, image)?;
        info!(
            path = %path.display(),
            width = handle.width,
            height = handle.height,
            "texture_loaded"
        );
        Ok(handle)
    }

    pub fn insert_rgba(&mut self, key: &str, image: TextureImage) -> Result<TextureHandle, LevelError> {
        if let Some(handle) = self.find(key) {
            return Ok(handle);
        }
        let expected_len = image.width as usize * image.height as usize * 4;
        if image.rgba.len() != expected_len {
            return Err(LevelError::AssetLoadFailure {
                path: PathBuf::from(key),
                reason: format!(
                    "rgba_length_mismatch:expected={expected_len}:actual={}",
                    image.rgba.len()
                ),
            });
        }
        self.textures.push(StoredTexture {
            key: key.to_string(),
            image,
        })?;
        Ok(self.handle_at(self.textures.len() - 1))
    }

    /// Builds a `cols x rows` tileset of flat-shaded cells, for running without art assets.
    pub fn generate_tileset(
        &mut self,
        key: &str,
        tile_size: u16,
        cols: u32,
        rows: u32,
    ) -> Result<TextureHandle, LevelError> {
        let image = generated_tileset_image(tile_size as u32, cols, rows);
        let handle = self.insert_rgba(key, image)?;
        info!(
            key,
            tile_size,
            cols,
            rows,
            "tileset_generated"
        );
        Ok(handle)
    }
}

fn load_rgba(path: &Path) -> Result<TextureImage, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(TextureImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn generated_tileset_image(tile_size: u32, cols: u32, rows: u32) -> TextureImage {
    let width = tile_size * cols;
    let height = tile_size * rows;
    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let (col, row) = (x / tile_size, y / tile_size);
            let (local_x, local_y) = (x % tile_size, y % tile_size);
            let base = GENERATED_PALETTE[((row * cols + col) as usize) % GENERATED_PALETTE.len()];
            let on_edge = local_x == 0
                || local_y == 0
                || local_x + 1 == tile_size
                || local_y + 1 == tile_size;
            let pixel = if on_edge {
                [
                    base[0].saturating_sub(GENERATED_EDGE_SHADE),
                    base[1].saturating_sub(GENERATED_EDGE_SHADE),
                    base[2].saturating_sub(GENERATED_EDGE_SHADE),
                    255,
                ]
            } else {
                base
            };
            rgba.extend_from_slice(&pixel);
        }
    }
    TextureImage {
        width,
        height,
        rgba,
    }
}
