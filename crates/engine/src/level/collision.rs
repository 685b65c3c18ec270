use serde::{Deserialize, Serialize};

use super::grid::TileGrid;
use crate::app::{Rect, Vec2};

pub const COLLISION_EPSILON: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsSettings {
    pub gravity: f32,
    pub drag: f32,
    pub move_speed: f32,
    pub jump_strength: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: 600.0,
            drag: 0.0015,
            move_speed: 100.0,
            jump_strength: 250.0,
        }
    }
}

impl PhysicsSettings {
    /// `sqrt(gravity / drag)`; unbounded when either is not positive.
    pub fn terminal_velocity(&self) -> f32 {
        if self.gravity > 0.0 && self.drag > 0.0 {
            (self.gravity / self.drag).sqrt()
        } else {
            f32::INFINITY
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HorizontalInput {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BodyIntent {
    pub horizontal: HorizontalInput,
    pub jump: bool,
}

/// The single dynamic AABB; `position` is its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub on_ground: bool,
    pub facing: Facing,
}

impl Body {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
            on_ground: false,
            facing: Facing::default(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size.x, self.size.y)
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub fell_out_of_bounds: bool,
    pub horizontal_hit: bool,
    pub vertical_hit: bool,
}

/// Advances `body` by one frame against the solid tiles of `grid`.
///
/// X is resolved first, then Y at the resolved X. Each axis sweeps only the
/// slab between the current and the tentative leading face and stops at the
/// nearest solid tile in the direction of motion.
pub fn step_body(
    body: &mut Body,
    grid: &TileGrid,
    intent: BodyIntent,
    settings: &PhysicsSettings,
    dt: f32,
) -> StepReport {
    let mut report = StepReport::default();

    body.velocity.x = match intent.horizontal {
        HorizontalInput::Left => {
            body.facing = Facing::Left;
            -settings.move_speed
        }
        HorizontalInput::Right => {
            body.facing = Facing::Right;
            settings.move_speed
        }
        HorizontalInput::None => 0.0,
    };
    if intent.jump && body.on_ground {
        body.velocity.y -= settings.jump_strength;
        body.on_ground = false;
    }

    let terminal = settings.terminal_velocity();
    body.velocity.y = (body.velocity.y + settings.gravity * dt)
        .max(-terminal)
        .min(terminal);

    let current = body.position;
    let mut new_x = current.x + body.velocity.x * dt;
    let mut new_y = current.y + body.velocity.y * dt;

    if new_x != current.x {
        let moving_right = new_x > current.x;
        let sweep = if moving_right {
            Rect::new(current.x + body.size.x, current.y, new_x - current.x, body.size.y)
        } else {
            Rect::new(new_x, current.y, current.x - new_x, body.size.y)
        };
        if let Some(hit) = nearest_solid(grid, sweep, |tile| {
            if moving_right {
                tile.x
            } else {
                -(tile.x + tile.width)
            }
        }) {
            // The back-off never retreats past the start of the step.
            new_x = if moving_right {
                (hit.x - body.size.x - COLLISION_EPSILON).max(current.x)
            } else {
                (hit.x + hit.width + COLLISION_EPSILON).min(current.x)
            };
            body.velocity.x = 0.0;
            report.horizontal_hit = true;
        }
    }

    body.on_ground = false;
    if new_y != current.y {
        let moving_down = new_y > current.y;
        let sweep = if moving_down {
            Rect::new(new_x, current.y + body.size.y, body.size.x, new_y - current.y)
        } else {
            Rect::new(new_x, new_y, body.size.x, current.y - new_y)
        };
        if let Some(hit) = nearest_solid(grid, sweep, |tile| {
            if moving_down {
                tile.y
            } else {
                -(tile.y + tile.height)
            }
        }) {
            if moving_down {
                new_y = (hit.y - body.size.y - COLLISION_EPSILON).max(current.y);
                body.on_ground = body.velocity.y > 0.0;
            } else {
                new_y = (hit.y + hit.height + COLLISION_EPSILON).min(current.y);
            }
            body.velocity.y = 0.0;
            report.vertical_hit = true;
        }
    }

    body.position = Vec2::new(new_x, new_y);
    report.fell_out_of_bounds = body.position.y > grid.world_size().y;
    report
}

/// Solid tile intersecting `sweep` with the smallest `distance` key.
fn nearest_solid(grid: &TileGrid, sweep: Rect, distance: impl Fn(&Rect) -> f32) -> Option<Rect> {
    grid.candidate_tiles(sweep)
        .filter(|cell| grid.is_solid(*cell))
        .map(|cell| grid.tile_rect(cell))
        .filter(|tile| tile.intersects(&sweep))
        .min_by(|a, b| distance(a).total_cmp(&distance(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{GridCell, LevelArena, Tile};
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const DT: f32 = 1.0 / 60.0;

    fn empty_grid(cols: u16, rows: u16) -> TileGrid {
        TileGrid::allocate(&mut LevelArena::default(), cols, rows, 18).expect("grid")
    }

    fn make_solid(grid: &mut TileGrid, col: i32, row: i32) {
        let cell = GridCell::new(col, row);
        let tile = Tile {
            source: Rect::new(0.0, 0.0, 18.0, 18.0),
            dest: grid.tile_rect(cell),
            solid: true,
        };
        grid.set(cell, tile).expect("in range");
    }

    fn body_at(x: f32, y: f32) -> Body {
        Body::new(Vec2::new(x, y), Vec2::new(18.0, 18.0))
    }

    fn penetrates_solid(grid: &TileGrid, body: &Body) -> bool {
        grid.candidate_tiles(body.rect())
            .filter(|cell| grid.is_solid(*cell))
            .any(|cell| grid.tile_rect(cell).intersects(&body.rect()))
    }

    #[test]
    fn terminal_velocity_matches_gravity_over_drag() {
        let settings = PhysicsSettings::default();
        assert_abs_diff_eq!(settings.terminal_velocity(), 632.455_5, epsilon = 1e-2);
    }

    #[test]
    fn falling_body_lands_on_row_five() {
        let mut grid = empty_grid(10, 10);
        make_solid(&mut grid, 0, 5);
        let mut body = body_at(0.0, 0.0);
        body.velocity = Vec2::new(0.0, 600.0);

        let settings = PhysicsSettings::default();
        let mut frames = 0;
        while !body.on_ground {
            step_body(&mut body, &grid, BodyIntent::default(), &settings, DT);
            frames += 1;
            assert!(frames < 120, "body never landed");
        }

        assert_abs_diff_eq!(body.position.y, 5.0 * 18.0 - 18.0 - 0.001, epsilon = 1e-4);
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.on_ground);
    }

    #[test]
    fn resting_body_stays_grounded_and_loses_flag_when_floor_vanishes() {
        let mut grid = empty_grid(10, 10);
        make_solid(&mut grid, 1, 6);
        let settings = PhysicsSettings::default();
        let mut body = body_at(18.0, 6.0 * 18.0 - 18.0 - COLLISION_EPSILON);

        step_body(&mut body, &grid, BodyIntent::default(), &settings, DT);
        assert!(body.on_ground);
        step_body(&mut body, &grid, BodyIntent::default(), &settings, DT);
        assert!(body.on_ground);

        grid.set(GridCell::new(1, 6), Tile::EMPTY).expect("clear");
        step_body(&mut body, &grid, BodyIntent::default(), &settings, DT);
        assert!(!body.on_ground);
        assert!(body.velocity.y > 0.0);
    }

    #[test]
    fn ceiling_contact_does_not_set_ground_flag() {
        let mut grid = empty_grid(10, 10);
        make_solid(&mut grid, 2, 2);
        let settings = PhysicsSettings::default();
        let mut body = body_at(36.0, 3.0 * 18.0 + 2.0);
        body.velocity.y = -300.0;

        let report = step_body(&mut body, &grid, BodyIntent::default(), &settings, DT);
        assert!(report.vertical_hit);
        assert!(!body.on_ground);
        assert_abs_diff_eq!(body.position.y, 3.0 * 18.0 + COLLISION_EPSILON, epsilon = 1e-4);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn jump_requires_ground_contact() {
        let grid = empty_grid(10, 10);
        let settings = PhysicsSettings::default();
        let mut body = body_at(0.0, 0.0);
        let jump = BodyIntent {
            horizontal: HorizontalInput::None,
            jump: true,
        };

        step_body(&mut body, &grid, jump, &settings, DT);
        assert!(body.velocity.y > 0.0);

        body.on_ground = true;
        body.velocity.y = 0.0;
        step_body(&mut body, &grid, jump, &settings, DT);
        assert_abs_diff_eq!(body.velocity.y, -250.0 + 600.0 * DT, epsilon = 1e-3);
        assert!(!body.on_ground);
    }

    #[test]
    fn wall_stops_horizontal_motion_at_near_face() {
        let mut grid = empty_grid(10, 10);
        for row in 0..10 {
            make_solid(&mut grid, 4, row);
        }
        let settings = PhysicsSettings::default();
        let mut body = body_at(4.0 * 18.0 - 18.0 - 0.5, 18.0);
        let right = BodyIntent {
            horizontal: HorizontalInput::Right,
            jump: false,
        };

        let report = step_body(&mut body, &grid, right, &settings, DT);
        assert!(report.horizontal_hit);
        assert_eq!(body.velocity.x, 0.0);
        assert_abs_diff_eq!(body.position.x, 4.0 * 18.0 - 18.0 - COLLISION_EPSILON, epsilon = 1e-4);
        assert_eq!(body.facing, Facing::Right);
    }

    #[test]
    fn left_motion_resolves_against_nearest_wall() {
        let mut grid = empty_grid(10, 10);
        make_solid(&mut grid, 0, 1);
        make_solid(&mut grid, 1, 1);
        let settings = PhysicsSettings::default();
        let mut body = body_at(2.0 * 18.0 + 1.0, 18.0);
        let left = BodyIntent {
            horizontal: HorizontalInput::Left,
            jump: false,
        };

        step_body(&mut body, &grid, left, &settings, 0.1);
        assert_abs_diff_eq!(body.position.x, 2.0 * 18.0 + COLLISION_EPSILON, epsilon = 1e-4);
        assert_eq!(body.facing, Facing::Left);
    }

    #[test]
    fn flush_body_between_walls_never_backs_into_trailing_tile() {
        let mut grid = empty_grid(10, 10);
        make_solid(&mut grid, 0, 1);
        make_solid(&mut grid, 2, 1);
        let settings = PhysicsSettings {
            gravity: 0.0,
            ..PhysicsSettings::default()
        };

        for horizontal in [HorizontalInput::Left, HorizontalInput::Right] {
            let mut body = body_at(18.0, 18.0);
            let intent = BodyIntent {
                horizontal,
                jump: false,
            };
            let report = step_body(&mut body, &grid, intent, &settings, DT);
            assert!(report.horizontal_hit);
            assert_eq!(body.position.x, 18.0);
            assert!(!penetrates_solid(&grid, &body), "{horizontal:?} moved into a wall");
        }
    }

    #[test]
    fn flush_body_between_floor_and_ceiling_stays_put() {
        let mut grid = empty_grid(10, 10);
        make_solid(&mut grid, 1, 0);
        make_solid(&mut grid, 1, 2);
        let settings = PhysicsSettings::default();

        for velocity_y in [-300.0, 300.0] {
            let mut body = body_at(18.0, 18.0);
            body.velocity.y = velocity_y;
            let report = step_body(&mut body, &grid, BodyIntent::default(), &settings, DT);
            assert!(report.vertical_hit);
            assert_eq!(body.position.y, 18.0);
            assert!(!penetrates_solid(&grid, &body));
        }
    }

    #[test]
    fn falling_below_the_grid_is_reported() {
        let grid = empty_grid(4, 4);
        let settings = PhysicsSettings::default();
        let mut body = body_at(0.0, 4.0 * 18.0 - 1.0);
        body.velocity.y = 600.0;

        let report = step_body(&mut body, &grid, BodyIntent::default(), &settings, DT);
        assert!(report.fell_out_of_bounds);
    }

    #[test]
    fn randomized_layouts_never_end_in_penetration() {
        let mut rng = StdRng::seed_from_u64(0x7113);
        let settings = PhysicsSettings::default();

        for _ in 0..40 {
            let mut grid = empty_grid(16, 12);
            for row in 0..12 {
                for col in 0..16 {
                    if rng.gen_bool(0.25) {
                        make_solid(&mut grid, col, row);
                    }
                }
            }

            let mut body = body_at(0.0, 0.0);
            let mut placed = false;
            for _ in 0..64 {
                let col = rng.gen_range(0..16);
                let row = rng.gen_range(0..12);
                body.position = Vec2::new(col as f32 * 18.0, row as f32 * 18.0);
                if !penetrates_solid(&grid, &body) {
                    placed = true;
                    break;
                }
            }
            if !placed {
                continue;
            }
            body.velocity = Vec2::new(0.0, rng.gen_range(-600.0..600.0));

            for _ in 0..120 {
                let horizontal = match rng.gen_range(0..3) {
                    0 => HorizontalInput::Left,
                    1 => HorizontalInput::Right,
                    _ => HorizontalInput::None,
                };
                let intent = BodyIntent {
                    horizontal,
                    jump: rng.gen_bool(0.1),
                };
                step_body(&mut body, &grid, intent, &settings, DT);
                assert!(
                    !penetrates_solid(&grid, &body),
                    "body {:?} overlaps a solid tile",
                    body.position
                );
            }
        }
    }
}
