mod renderer;
mod textures;
mod transform;

pub use renderer::Renderer;
pub use textures::{TextureImage, TextureStore, MAX_TEXTURES};
pub use transform::{
    screen_to_grid, screen_to_world, view_bounds_world, view_extents, world_to_grid,
    world_to_screen, Viewport,
};
