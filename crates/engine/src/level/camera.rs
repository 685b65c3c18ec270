use crate::app::{
    view_extents, Camera2D, InputSnapshot, Vec2, Viewport, CAMERA_ZOOM_MAX, CAMERA_ZOOM_STEP,
};

pub const PAN_DAMPING: f32 = 0.05;

/// Pan and zoom rules that keep the camera inside the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraController {
    pub zoom_step: f32,
    pub max_zoom: f32,
    pub pan_damping: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            zoom_step: CAMERA_ZOOM_STEP,
            max_zoom: CAMERA_ZOOM_MAX,
            pan_damping: PAN_DAMPING,
        }
    }
}

impl CameraController {
    /// Smallest zoom at which the map still covers the whole viewport.
    pub fn min_zoom(&self, viewport: Viewport, map_size: Vec2) -> f32 {
        let ratio = |view: u32, map: f32| {
            if map > 0.0 {
                view as f32 / map
            } else {
                0.0
            }
        };
        ratio(viewport.width, map_size.x).max(ratio(viewport.height, map_size.y))
    }

    pub fn zoom_bounds(&self, viewport: Viewport, map_size: Vec2) -> (f32, f32) {
        let min = self.min_zoom(viewport, map_size);
        (min, self.max_zoom.max(min))
    }

    pub fn apply_zoom(
        &self,
        camera: &mut Camera2D,
        wheel_delta: f32,
        viewport: Viewport,
        map_size: Vec2,
    ) {
        let (min, max) = self.zoom_bounds(viewport, map_size);
        let zoom = camera.zoom + wheel_delta * self.zoom_step;
        camera.zoom = zoom.max(min).min(max);
    }

    pub fn apply_pan(&self, camera: &mut Camera2D, drag_delta_px: Vec2) {
        let scale = self.pan_damping / camera.effective_zoom();
        camera.target = camera.target - drag_delta_px * scale;
    }

    /// Keeps the visible rectangle inside `[0, map_size]`, centering axes the map cannot fill.
    pub fn clamp_target(&self, camera: &mut Camera2D, viewport: Viewport, map_size: Vec2) {
        let half_view = view_extents(camera, viewport) * 0.5;
        camera.target = Vec2::new(
            clamp_axis(camera.target.x, half_view.x, map_size.x),
            clamp_axis(camera.target.y, half_view.y, map_size.y),
        );
    }

    /// One frame of camera input. `follow` recenters on a point (play mode) before clamping.
    pub fn update(
        &self,
        camera: &mut Camera2D,
        input: &InputSnapshot,
        viewport: Viewport,
        map_size: Vec2,
        follow: Option<Vec2>,
    ) {
        // Zoom bounds move with the viewport, so the clamp runs even without wheel input.
        self.apply_zoom(camera, input.scroll_delta(), viewport, map_size);
        if let Some(delta) = input.pan_drag_delta_px() {
            self.apply_pan(camera, delta);
        }
        if let Some(point) = follow {
            camera.target = point;
        }
        self.clamp_target(camera, viewport, map_size);
    }
}

fn clamp_axis(target: f32, half_view: f32, map_extent: f32) -> f32 {
    if map_extent <= half_view * 2.0 {
        return map_extent * 0.5;
    }
    target.max(half_view).min(map_extent - half_view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{view_bounds_world, PointerButton};
    use approx::assert_abs_diff_eq;

    const VIEWPORT: Viewport = Viewport {
        width: 800,
        height: 600,
    };
    const MAP: Vec2 = Vec2::new(1440.0, 900.0);

    #[test]
    fn min_zoom_fits_map_to_viewport() {
        let controller = CameraController::default();
        let min = controller.min_zoom(VIEWPORT, MAP);
        assert_abs_diff_eq!(min, (800.0_f32 / 1440.0).max(600.0 / 900.0), epsilon = 1e-6);
    }

    #[test]
    fn zoom_is_clamped_to_bounds() {
        let controller = CameraController::default();
        let mut camera = Camera2D::centered_on(MAP * 0.5, 2.0);
        controller.apply_zoom(&mut camera, 100.0, VIEWPORT, MAP);
        assert_eq!(camera.zoom, CAMERA_ZOOM_MAX);
        controller.apply_zoom(&mut camera, -100.0, VIEWPORT, MAP);
        assert_abs_diff_eq!(camera.zoom, 600.0 / 900.0, epsilon = 1e-6);
    }

    #[test]
    fn zoom_upper_bound_never_drops_below_min_zoom() {
        let controller = CameraController::default();
        let tiny_map = Vec2::new(100.0, 50.0);
        let (min, max) = controller.zoom_bounds(VIEWPORT, tiny_map);
        assert_eq!(min, 12.0);
        assert_eq!(max, 12.0);
    }

    #[test]
    fn pan_moves_target_against_drag() {
        let controller = CameraController::default();
        let mut camera = Camera2D::centered_on(Vec2::new(500.0, 400.0), 2.0);
        controller.apply_pan(&mut camera, Vec2::new(40.0, -20.0));
        assert_abs_diff_eq!(camera.target.x, 500.0 - 40.0 / 2.0 * 0.05, epsilon = 1e-4);
        assert_abs_diff_eq!(camera.target.y, 400.0 + 20.0 / 2.0 * 0.05, epsilon = 1e-4);
    }

    #[test]
    fn clamp_keeps_view_inside_map() {
        let controller = CameraController::default();
        let mut camera = Camera2D::centered_on(Vec2::new(-500.0, 5000.0), 2.0);
        controller.clamp_target(&mut camera, VIEWPORT, MAP);
        assert_eq!(camera.target, Vec2::new(200.0, 900.0 - 150.0));
    }

    #[test]
    fn small_map_is_centered() {
        let controller = CameraController::default();
        let mut camera = Camera2D::centered_on(Vec2::new(3.0, 3.0), 1.0);
        controller.clamp_target(&mut camera, VIEWPORT, Vec2::new(180.0, 90.0));
        assert_eq!(camera.target, Vec2::new(90.0, 45.0));
    }

    #[test]
    fn update_sequence_never_shows_outside_map() {
        let controller = CameraController::default();
        let mut camera = Camera2D::centered_on(MAP * 0.5, 2.0);
        let steps = [
            (3.0, Vec2::new(-4000.0, 0.0)),
            (-7.0, Vec2::new(9000.0, 9000.0)),
            (1.5, Vec2::new(0.0, -12000.0)),
            (12.0, Vec2::new(-30000.0, 30000.0)),
            (-2.0, Vec2::new(0.0, 0.0)),
        ];
        for (wheel, drag) in steps {
            let input = InputSnapshot::empty()
                .with_window_size((VIEWPORT.width, VIEWPORT.height))
                .with_scroll_delta(wheel)
                .with_pointer_down(PointerButton::Pan, true)
                .with_pan_origin_px(Some(Vec2::ZERO))
                .with_cursor_position_px(Some(drag));
            controller.update(&mut camera, &input, VIEWPORT, MAP, None);

            let view = view_bounds_world(&camera, VIEWPORT);
            assert!(view.x >= -1e-3, "{view:?}");
            assert!(view.y >= -1e-3, "{view:?}");
            assert!(view.x + view.width <= MAP.x + 1e-3, "{view:?}");
            assert!(view.y + view.height <= MAP.y + 1e-3, "{view:?}");
        }
    }

    #[test]
    fn growing_the_viewport_raises_zoom_to_keep_the_map_covering_it() {
        let controller = CameraController::default();
        let mut camera = Camera2D::centered_on(MAP * 0.5, 2.0);
        let grown = Viewport {
            width: 4000,
            height: 3000,
        };
        let pan = InputSnapshot::empty()
            .with_window_size((grown.width, grown.height))
            .with_pointer_down(PointerButton::Pan, true)
            .with_pan_origin_px(Some(Vec2::ZERO))
            .with_cursor_position_px(Some(Vec2::new(40.0, 40.0)));
        controller.update(&mut camera, &pan, grown, MAP, None);

        let (min, _) = controller.zoom_bounds(grown, MAP);
        assert!(camera.zoom >= min);
        let view = view_bounds_world(&camera, grown);
        assert!(view.x >= -1e-3 && view.y >= -1e-3, "{view:?}");
        assert!(view.x + view.width <= MAP.x + 1e-3, "{view:?}");
        assert!(view.y + view.height <= MAP.y + 1e-3, "{view:?}");
    }

    #[test]
    fn follow_recenters_then_clamps() {
        let controller = CameraController::default();
        let mut camera = Camera2D::centered_on(MAP * 0.5, 2.0);
        controller.update(
            &mut camera,
            &InputSnapshot::empty(),
            VIEWPORT,
            MAP,
            Some(Vec2::new(700.0, 10.0)),
        );
        assert_eq!(camera.target, Vec2::new(700.0, 150.0));
    }
}
