use tracing::warn;

use super::bounded::{BoundedVec, CapacityError};
use super::collision::{Body, Facing};
use super::grid::TileGrid;
use crate::app::{world_to_grid, Vec2};

pub const MAX_PROJECTILES: usize = 50;
pub const PROJECTILE_SPEED: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub position: Vec2,
    pub direction: Facing,
}

/// Straight-line shots; never resolved against geometry, only culled by it.
#[derive(Debug, Clone)]
pub struct Projectiles {
    items: BoundedVec<Projectile>,
    speed: f32,
}

impl Default for Projectiles {
    fn default() -> Self {
        Self::new(MAX_PROJECTILES, PROJECTILE_SPEED)
    }
}

impl Projectiles {
    pub fn new(capacity: usize, speed: f32) -> Self {
        Self {
            items: BoundedVec::with_capacity(capacity),
            speed,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> + '_ {
        self.items.iter()
    }

    /// Spawns a shot from the body's center heading where it faces.
    pub fn fire(&mut self, body: &Body) -> Result<(), CapacityError> {
        self.items.push(Projectile {
            position: body.center(),
            direction: body.facing,
        })
    }

    /// Like [`Projectiles::fire`], but a full sequence only logs.
    pub fn fire_or_warn(&mut self, body: &Body) {
        if let Err(error) = self.fire(body) {
            warn!(error = %error, active = self.items.len(), "projectile_spawn_rejected");
        }
    }

    /// Moves every shot and drops those that left the map or hit a solid tile.
    pub fn advance(&mut self, grid: &TileGrid, dt: f32) -> usize {
        let step = self.speed * dt;
        for projectile in self.items.iter_mut() {
            projectile.position.x += match projectile.direction {
                Facing::Left => -step,
                Facing::Right => step,
            };
        }
        let width = grid.world_size().x;
        let tile_size = grid.tile_extent();
        let before = self.items.len();
        self.items.retain(|projectile| {
            let x = projectile.position.x;
            let inside = x >= 0.0 && x < width;
            inside && !grid.is_solid(world_to_grid(projectile.position, tile_size))
        });
        before - self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
