use crate::config::{BoundaryPolicy, VelocityInit};
use crate::error::SimError;
use crate::palette::Palette;
use crate::types::{AgentId, Rgb, Sprite};
use crate::vec2ext;
use glam::Vec2;
use rand::Rng;

/// How an agent's color is assigned at construction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ColorChoice {
    /// Palette entry `id % palette_len` (deterministic).
    #[default]
    ByIndex,
    /// A uniformly drawn palette entry.
    Random,
    /// An explicit color.
    Fixed(Rgb),
}

/// Construction options for an [`Agent`]. `None` means "randomize",
/// replacing the `-1` sentinels of earlier revisions.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentInit {
    pub pos: Option<Vec2>,
    pub radius: Option<f32>,
    pub color: ColorChoice,
    pub brownian: bool,
    pub mobile: bool,
    pub velocity: Option<Vec2>,
    pub max_velocity: f32,
    pub velocity_init: VelocityInit,
}

impl Default for AgentInit {
    fn default() -> Self {
        Self {
            pos: None,
            radius: None,
            color: ColorChoice::ByIndex,
            brownian: false,
            mobile: false,
            velocity: None,
            max_velocity: 5.0,
            velocity_init: VelocityInit::default(),
        }
    }
}

/// Base kinematic entity: a dot on a square grid that may jitter
/// (Brownian motion) and/or drift with a velocity.
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub grid_size: f32,
    pub pos: Vec2,
    pub radius: f32,
    pub color: Rgb,
    pub brownian: bool,
    pub mobile: bool,
    pub velocity: Vec2,
    pub max_velocity: f32,
}

/// Uniform integer draw in `[0, grid_size)`, as a float coordinate.
/// Grids smaller than one cell still have the single coordinate 0.
pub(crate) fn random_coord(grid_size: f32, rng: &mut impl Rng) -> f32 {
    let cells = (grid_size as u32).max(1);
    rng.random_range(0..cells) as f32
}

/// Uniform integer radius draw in `[grid_size/100, grid_size/10)`,
/// floored at 1 so tiny grids still yield a visible, valid radius.
pub(crate) fn random_radius(grid_size: f32, rng: &mut impl Rng) -> f32 {
    let min = ((grid_size / 100.0).floor() as u32).max(1);
    let max = (grid_size / 10.0).floor() as u32;
    if max > min {
        rng.random_range(min..max) as f32
    } else {
        min as f32
    }
}

impl Agent {
    pub fn new(
        grid_size: f32,
        id: AgentId,
        init: AgentInit,
        palette: &Palette,
        rng: &mut impl Rng,
    ) -> Result<Self, SimError> {
        if !(grid_size > 0.0) {
            return Err(SimError::InvalidGridSize(grid_size));
        }
        if !(init.max_velocity > 0.0) {
            return Err(SimError::InvalidMaxVelocity(init.max_velocity));
        }

        let pos = match init.pos {
            Some(p) => {
                if !(0.0..grid_size).contains(&p.x) {
                    return Err(SimError::CoordinateOutOfRange {
                        axis: 'x',
                        value: p.x,
                        grid_size,
                    });
                }
                if !(0.0..grid_size).contains(&p.y) {
                    return Err(SimError::CoordinateOutOfRange {
                        axis: 'y',
                        value: p.y,
                        grid_size,
                    });
                }
                p
            }
            None => Vec2::new(random_coord(grid_size, rng), random_coord(grid_size, rng)),
        };

        let radius = match init.radius {
            Some(r) if r > 0.0 => r,
            Some(r) => return Err(SimError::InvalidRadius(r)),
            None => random_radius(grid_size, rng),
        };

        let color = match init.color {
            ColorChoice::ByIndex => palette.color_for(id),
            ColorChoice::Random => palette.random_color(rng),
            ColorChoice::Fixed(c) => c,
        };

        let velocity = match init.velocity {
            Some(v) => v,
            None if init.mobile => random_velocity(init.max_velocity, init.velocity_init, rng),
            None => Vec2::ZERO,
        };

        Ok(Self {
            id,
            grid_size,
            pos,
            radius,
            color,
            brownian: init.brownian,
            mobile: init.mobile,
            velocity,
            max_velocity: init.max_velocity,
        })
    }

    /// Advances the agent by one frame.
    ///
    /// Brownian motion displaces each axis independently by a draw from
    /// `{-1, 0, 1}`; a draw that would leave the grid is dropped and the
    /// agent simply does not move on that axis this frame. Mobile agents
    /// then integrate their velocity and apply the boundary policy.
    pub fn step(&mut self, policy: BoundaryPolicy, rng: &mut impl Rng) {
        if self.brownian {
            let dx = rng.random_range(-1i32..=1) as f32;
            let dy = rng.random_range(-1i32..=1) as f32;
            let nx = self.pos.x + dx;
            if (0.0..self.grid_size).contains(&nx) {
                self.pos.x = nx;
            }
            let ny = self.pos.y + dy;
            if (0.0..self.grid_size).contains(&ny) {
                self.pos.y = ny;
            }
        }

        if self.mobile {
            self.pos += self.velocity;
            match policy {
                BoundaryPolicy::Bounce => self.bounce(),
                BoundaryPolicy::Wrap => {
                    self.pos = vec2ext::wrap_to(self.pos, self.grid_size);
                }
                BoundaryPolicy::Unbounded => {}
            }
        }
    }

    fn bounce(&mut self) {
        // Keep coordinates strictly below grid_size so the boundary
        // invariant holds in bounce mode too.
        let hi = self.grid_size.next_down();
        if self.pos.x < 0.0 {
            self.pos.x = 0.0;
            self.velocity.x = -self.velocity.x;
        } else if self.pos.x >= self.grid_size {
            self.pos.x = hi;
            self.velocity.x = -self.velocity.x;
        }
        if self.pos.y < 0.0 {
            self.pos.y = 0.0;
            self.velocity.y = -self.velocity.y;
        } else if self.pos.y >= self.grid_size {
            self.pos.y = hi;
            self.velocity.y = -self.velocity.y;
        }
    }
}

fn random_velocity(max_velocity: f32, dist: VelocityInit, rng: &mut impl Rng) -> Vec2 {
    match dist {
        VelocityInit::Symmetric => {
            let half = max_velocity / 2.0;
            Vec2::new(
                rng.random_range(-half..=half),
                rng.random_range(-half..=half),
            )
        }
        VelocityInit::Positive => Vec2::new(
            rng.random_range(0.0..max_velocity),
            rng.random_range(0.0..max_velocity),
        ),
    }
}

impl Sprite for Agent {
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
