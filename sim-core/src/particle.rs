use crate::agent::{ColorChoice, random_coord, random_radius};
use crate::error::SimError;
use crate::palette::Palette;
use crate::types::{AgentId, Rgb, Sprite};
use glam::Vec2;
use rand::Rng;

/// Attraction constant for the swarm force law.
pub const ATTRACTION_K: f32 = 0.001;
/// Velocity damping factor applied every swarm step.
pub const DAMPING: f32 = 0.99;
/// Base near-field radius; inside `NEAR_FIELD + mass` the force flips
/// to repulsion, which keeps particles orbiting instead of collapsing.
pub const NEAR_FIELD: f32 = 50.0;

/// Construction options for a [`Particle`]; `None` means "randomize".
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleInit {
    pub pos: Option<Vec2>,
    pub velocity: Option<Vec2>,
    pub mass: Option<f32>,
    /// Upper bound for the random mass draw (`[1, max_mass]`).
    pub max_mass: f32,
    pub color: ColorChoice,
}

impl Default for ParticleInit {
    fn default() -> Self {
        Self {
            pos: None,
            velocity: None,
            mass: None,
            max_mass: 360.0,
            color: ColorChoice::ByIndex,
        }
    }
}

/// A massive agent driven by an external point force (swarm mode) or by
/// constant gravity (fireworks mode).
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub id: AgentId,
    pub grid_size: f32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
    pub mass: f32,
    pub radius: f32,
    pub color: Rgb,
}

impl Particle {
    pub fn new(
        grid_size: f32,
        id: AgentId,
        init: ParticleInit,
        palette: &Palette,
        rng: &mut impl Rng,
    ) -> Result<Self, SimError> {
        if !(grid_size > 0.0) {
            return Err(SimError::InvalidGridSize(grid_size));
        }
        let mass = match init.mass {
            Some(m) if m > 0.0 => m,
            Some(m) => return Err(SimError::InvalidMass(m)),
            None => rng.random_range(1..=init.max_mass.max(1.0) as u32) as f32,
        };
        let pos = init.pos.unwrap_or_else(|| {
            Vec2::new(random_coord(grid_size, rng), random_coord(grid_size, rng))
        });
        let color = match init.color {
            ColorChoice::ByIndex => palette.color_for(id),
            ColorChoice::Random => palette.random_color(rng),
            ColorChoice::Fixed(c) => c,
        };

        Ok(Self {
            id,
            grid_size,
            pos,
            vel: init.velocity.unwrap_or(Vec2::ZERO),
            acc: Vec2::ZERO,
            mass,
            radius: random_radius(grid_size, rng),
            color,
        })
    }

    /// Attraction toward `target` scaled by `mass² · K`, flipped to
    /// repulsion inside the near field, then integrated with damping.
    pub fn apply_force(&mut self, target: Vec2) {
        let mut force =
            (target - self.pos).normalize_or_zero() * (self.mass * self.mass * ATTRACTION_K);
        if self.pos.distance(target) < NEAR_FIELD + self.mass {
            force = -force;
        }
        self.acc = force / self.mass;
        self.vel = (self.vel + self.acc) * DAMPING;
        self.pos += self.vel;
    }

    /// Fireworks mode: constant downward gravity, no target seeking.
    pub fn fall(&mut self, gravity: f32) {
        self.vel.y += gravity;
        self.pos += self.vel;
    }
}

impl Sprite for Particle {
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

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn particle(pos: Vec2, mass: f32) -> Particle {
        let init = ParticleInit {
            pos: Some(pos),
            mass: Some(mass),
            ..ParticleInit::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        Particle::new(400.0, 0, init, &Palette::default(), &mut rng).unwrap()
    }

    #[test]
    fn non_positive_mass_is_rejected() {
        let init = ParticleInit {
            mass: Some(0.0),
            ..ParticleInit::default()
        };
        let mut rng = StdRng::seed_from_u64(2);
        let err = Particle::new(400.0, 0, init, &Palette::default(), &mut rng);
        assert_eq!(err, Err(SimError::InvalidMass(0.0)));
    }

    #[test]
    fn random_mass_lands_in_one_to_max() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let p = Particle::new(
                400.0,
                0,
                ParticleInit::default(),
                &Palette::default(),
                &mut rng,
            )
            .unwrap();
            assert!((1.0..=360.0).contains(&p.mass));
        }
    }

    #[test]
    fn far_particle_is_attracted_to_target() {
        let mut p = particle(Vec2::new(0.0, 0.0), 10.0);
        p.apply_force(Vec2::new(300.0, 0.0));
        assert!(p.vel.x > 0.0, "should accelerate toward target: {:?}", p.vel);
    }

    #[test]
    fn near_particle_is_repelled() {
        // Distance 20 < NEAR_FIELD + mass = 60: force flips sign.
        let mut p = particle(Vec2::new(0.0, 0.0), 10.0);
        p.apply_force(Vec2::new(20.0, 0.0));
        assert!(p.vel.x < 0.0, "should be pushed away: {:?}", p.vel);
    }

    #[test]
    fn damping_shrinks_coasting_velocity() {
        let mut p = particle(Vec2::new(0.0, 0.0), 1.0);
        p.vel = Vec2::new(10.0, 0.0);
        let before = p.vel.length();
        // Target far ahead: acceleration is tiny (mass 1), damping dominates.
        p.apply_force(Vec2::new(10_000.0, 10_000.0));
        assert!(p.vel.length() < before);
    }

    #[test]
    fn fall_integrates_gravity() {
        let mut p = particle(Vec2::new(50.0, 0.0), 5.0);
        p.fall(0.01);
        p.fall(0.01);
        assert!((p.vel.y - 0.02).abs() < 1e-6);
        assert!((p.pos.y - 0.03).abs() < 1e-6);
    }
}
