//! Boid steering: separation, alignment and cohesion over a neighbor
//! set, combined into an acceleration and integrated once per frame.
//!
//! Neighbor influences are always computed against a frozen
//! [`BoidSnapshot`] of the whole flock (see [`crate::phases::flock_phase`]),
//! so update order within a frame cannot change the result.

use crate::agent::random_coord;
use crate::config::FlockingParams;
use crate::error::SimError;
use crate::palette::Palette;
use crate::types::{AgentId, Rgb, Sprite};
use crate::vec2ext;
use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

/// Frozen per-boid state used when computing neighbor influences.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoidSnapshot {
    pub id: AgentId,
    pub pos: Vec2,
    pub vel: Vec2,
}

/// One flocking agent on a toroidal grid.
///
/// Steering weights are resolved from [`FlockingParams`] at construction
/// using the boid's sub-population (`agent_type = id % agent_types`), so
/// mixed flocks can carry different characters per type.
#[derive(Clone, Debug, PartialEq)]
pub struct Boid {
    pub id: AgentId,
    pub agent_type: usize,
    pub grid_size: f32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
    pub radius: f32,
    pub color: Rgb,
    pub max_speed: f32,
    pub max_force: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub perception_radius: f32,
    pub desired_separation: f32,
    pub turn_factor: f32,
    pub min_speed: f32,
    pub edge_margin: f32,
}

impl Boid {
    /// Builds a boid at a random grid cell with a random heading.
    ///
    /// The initial speed is uniform in `[min_speed, max_speed)`; the
    /// color is the palette entry for the boid's type, so every member
    /// of a sub-population shares a color.
    pub fn new(
        grid_size: f32,
        id: AgentId,
        max_speed: f32,
        params: &FlockingParams,
        palette: &Palette,
        rng: &mut impl Rng,
    ) -> Result<Self, SimError> {
        if !(grid_size > 0.0) {
            return Err(SimError::InvalidGridSize(grid_size));
        }
        params.validate()?;

        let agent_type = id % params.agent_types;
        let pos = Vec2::new(random_coord(grid_size, rng), random_coord(grid_size, rng));

        let angle = rng.random_range(0.0..TAU);
        let speed = params.min_speed + rng.random_range(0.0..1.0) * (max_speed - params.min_speed);
        let vel = Vec2::new(angle.cos(), angle.sin()) * speed;

        Ok(Self {
            id,
            agent_type,
            grid_size,
            pos,
            vel,
            acc: Vec2::ZERO,
            radius: 1.0,
            color: palette.color_for(agent_type),
            max_speed,
            max_force: params.max_force,
            separation_weight: params.separation.resolve(agent_type),
            alignment_weight: params.alignment.resolve(agent_type),
            cohesion_weight: params.cohesion.resolve(agent_type),
            perception_radius: params.perception_radius,
            desired_separation: params.desired_separation.resolve(agent_type),
            turn_factor: params.turn_factor,
            min_speed: params.min_speed,
            edge_margin: params.edge_margin,
        })
    }

    pub fn snapshot(&self) -> BoidSnapshot {
        BoidSnapshot {
            id: self.id,
            pos: self.pos,
            vel: self.vel,
        }
    }

    /// Steer away from neighbors closer than `desired_separation`.
    pub fn separate(&self, flock: &[BoidSnapshot]) -> Vec2 {
        let mut steering = Vec2::ZERO;
        let mut count = 0u32;
        for other in flock {
            if other.id == self.id {
                continue;
            }
            let d = vec2ext::torus_distance(self.pos, other.pos, self.grid_size);
            if d > 0.0 && d < self.desired_separation {
                steering += self.pos - other.pos;
                count += 1;
            }
        }
        if count > 0 {
            steering /= count as f32;
            if steering.length_squared() > 0.0 {
                steering = self.steer_toward(steering);
            }
        }
        steering
    }

    /// Steer toward the average heading of perceived neighbors.
    pub fn align(&self, flock: &[BoidSnapshot]) -> Vec2 {
        let mut steering = Vec2::ZERO;
        let mut count = 0u32;
        for other in flock {
            if other.id == self.id {
                continue;
            }
            let d = vec2ext::torus_distance(self.pos, other.pos, self.grid_size);
            if d > 0.0 && d < self.perception_radius {
                steering += other.vel;
                count += 1;
            }
        }
        if count > 0 {
            steering /= count as f32;
            if steering.length_squared() > 0.0 {
                steering = self.steer_toward(steering);
            }
        }
        steering
    }

    /// Steer toward the center of mass of perceived neighbors.
    pub fn cohere(&self, flock: &[BoidSnapshot]) -> Vec2 {
        let mut center = Vec2::ZERO;
        let mut count = 0u32;
        for other in flock {
            if other.id == self.id {
                continue;
            }
            let d = vec2ext::torus_distance(self.pos, other.pos, self.grid_size);
            if d > 0.0 && d < self.perception_radius {
                center += other.pos;
                count += 1;
            }
        }
        if count > 0 {
            center /= count as f32;
            let desired = center - self.pos;
            if desired.length_squared() > 0.0 {
                return self.steer_toward(desired);
            }
        }
        Vec2::ZERO
    }

    // Reynolds: steering = desired - velocity, with the desired velocity
    // at full speed in the given direction and the correction clamped to
    // max_force.
    fn steer_toward(&self, direction: Vec2) -> Vec2 {
        let desired = direction.normalize_or_zero() * self.max_speed;
        (desired - self.vel).clamp_length_max(self.max_force)
    }

    /// One steering + integration step against a frozen flock snapshot.
    ///
    /// After this call `|vel| <= max_speed` and the position is wrapped
    /// into `[0, grid_size)` on both axes.
    pub fn flock(&mut self, flock: &[BoidSnapshot]) {
        let separation = self.separate(flock) * self.separation_weight;
        let alignment = self.align(flock) * self.alignment_weight;
        let cohesion = self.cohere(flock) * self.cohesion_weight;

        self.acc = separation + alignment + cohesion;
        self.vel = (self.vel + self.acc).clamp_length_max(self.max_speed);
        self.pos = vec2ext::wrap_to(self.pos + self.vel, self.grid_size);
    }
}

impl Sprite for Boid {
    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn color(&self) -> Rgb {
        self.color
    }
}
