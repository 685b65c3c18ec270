mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{InputAction, PointerButton};
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use rendering::{
    screen_to_grid, screen_to_world, view_bounds_world, view_extents, world_to_grid,
    world_to_screen, Renderer, TextureImage, TextureStore, Viewport, MAX_TEXTURES,
};
pub use scene::{
    Camera2D, InputSnapshot, LoadContext, Rect, Scene, SceneCommand, Vec2, CAMERA_ZOOM_DEFAULT,
    CAMERA_ZOOM_MAX, CAMERA_ZOOM_STEP,
};
