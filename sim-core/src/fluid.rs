//! A single cell of the compressible-flow toy model.
//!
//! Each cell holds a fixed volume of ideal gas. Mass is the primary
//! state: after construction, pressure is only ever re-derived from mass
//! and temperature, never written directly, so the grid solver can move
//! mass around and keep the thermodynamic state consistent.

use crate::error::SimError;

/// Universal gas constant, psia·ft³ / (lb-mol·°R).
pub const R_GAS: f32 = 10.7316;
/// Atmospheric reference pressure, psia.
pub const ATM_PSIA: f32 = 14.696;
/// Fixed cell volume, ft³.
pub const CELL_VOLUME: f32 = 1.0;
/// Orifice discharge coefficient.
pub const DISCHARGE_COEFF: f32 = 0.62;
/// Gravitational conversion constant, lbm·ft / (lbf·s²).
pub const GC: f32 = 32.174;
/// °F to °R offset.
pub const RANKINE_OFFSET: f32 = 459.67;

/// 4-connected neighbor directions, row-major grid with north = row - 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// `(column, row)` offset of the neighbor in this direction.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }
}

/// Last-computed outgoing mass rates (lb/sec) per neighbor direction.
/// Informational only; the solver owns the actual transfers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Flows {
    pub north: f32,
    pub south: f32,
    pub east: f32,
    pub west: f32,
}

impl Flows {
    pub fn get(&self, dir: Direction) -> f32 {
        match dir {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }

    pub fn set(&mut self, dir: Direction, rate: f32) {
        match dir {
            Direction::North => self.north = rate,
            Direction::South => self.south = rate,
            Direction::East => self.east = rate,
            Direction::West => self.west = rate,
        }
    }

    pub fn total(&self) -> f32 {
        self.north + self.south + self.east + self.west
    }
}

/// One grid cell of compressible fluid.
#[derive(Clone, Debug, PartialEq)]
pub struct FluidCell {
    /// Column index in the owning grid.
    pub x: usize,
    /// Row index in the owning grid.
    pub y: usize,
    pub molecular_weight: f32,
    pub volume: f32,
    pub flows: Flows,
    pressure_psia: f32,
    temperature_r: f32,
    mass: f32,
    base_mass: f32,
}

impl FluidCell {
    /// Builds a cell from gauge pressure (psig) and temperature (°F).
    pub fn new(
        x: usize,
        y: usize,
        gauge_psig: f32,
        temperature_f: f32,
        molecular_weight: f32,
    ) -> Result<Self, SimError> {
        if !(molecular_weight > 0.0) {
            return Err(SimError::InvalidMolecularWeight(molecular_weight));
        }
        let temperature_r = temperature_f + RANKINE_OFFSET;
        if !(temperature_r > 0.0) {
            return Err(SimError::InvalidTemperature(temperature_r));
        }
        let pressure_psia = gauge_psig + ATM_PSIA;
        if pressure_psia < 0.0 {
            return Err(SimError::InvalidPressure(pressure_psia));
        }

        let mut cell = Self {
            x,
            y,
            molecular_weight,
            volume: CELL_VOLUME,
            flows: Flows::default(),
            pressure_psia,
            temperature_r,
            mass: 0.0,
            base_mass: 0.0,
        };
        cell.mass = cell.mass_at_pressure(pressure_psia);
        cell.base_mass = cell.mass_at_pressure(ATM_PSIA);
        Ok(cell)
    }

    /// Ideal-gas mass for a given absolute pressure at this cell's
    /// temperature: `m = P·V·MW / (R·T)`.
    fn mass_at_pressure(&self, pressure_psia: f32) -> f32 {
        pressure_psia * self.volume * self.molecular_weight / (R_GAS * self.temperature_r)
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Mass the cell would hold at atmospheric pressure; the floor it
    /// never donates below.
    pub fn base_mass(&self) -> f32 {
        self.base_mass
    }

    /// Mass above the atmospheric floor, available to leave this step.
    pub fn available_mass(&self) -> f32 {
        (self.mass - self.base_mass).max(0.0)
    }

    pub fn pressure_psia(&self) -> f32 {
        self.pressure_psia
    }

    pub fn gauge_psig(&self) -> f32 {
        self.pressure_psia - ATM_PSIA
    }

    pub fn temperature_r(&self) -> f32 {
        self.temperature_r
    }

    pub fn temperature_f(&self) -> f32 {
        self.temperature_r - RANKINE_OFFSET
    }

    pub fn density(&self) -> f32 {
        self.mass / self.volume
    }

    /// Outgoing mass rate (lb/sec) toward a lower-pressure neighbor.
    ///
    /// Compressible-orifice approximation: the gas velocity through the
    /// opening is `Cd·sqrt(2·gc·144·ΔP / ρ)` with ρ the upstream density;
    /// the mass rate is that velocity times the upstream density. A
    /// non-positive pressure differential means no flow this direction;
    /// flow between a pair of cells is always computed from the
    /// higher-pressure side.
    pub fn flow_rate_to(&self, other: &FluidCell) -> f32 {
        let delta_p = self.pressure_psia - other.pressure_psia;
        if delta_p <= 0.0 {
            return 0.0;
        }
        let density = self.density();
        if density <= 0.0 {
            // Degenerate: an (almost) empty cell cannot push anything out.
            return 0.0;
        }
        let velocity = DISCHARGE_COEFF * (2.0 * GC * 144.0 * delta_p / density).sqrt();
        velocity * density
    }

    /// Applies a mass change and re-derives pressure from the new mass.
    pub fn apply_mass_delta(&mut self, delta: f32) {
        self.mass = (self.mass + delta).max(0.0);
        self.pressure_psia =
            self.mass * R_GAS * self.temperature_r / (self.volume * self.molecular_weight);
    }

    /// Re-pressurizes the cell to a new gauge pressure, recomputing mass
    /// from scratch. This is the reset/seeding path, the one exception
    /// to "pressure is derived from mass".
    pub fn set_gauge_pressure(&mut self, gauge_psig: f32) {
        self.pressure_psia = gauge_psig + ATM_PSIA;
        self.mass = self.mass_at_pressure(self.pressure_psia);
    }

    /// Changes temperature, recomputing the atmospheric floor and
    /// re-deriving pressure for the (unchanged) mass.
    pub fn set_temperature_f(&mut self, temperature_f: f32) {
        self.temperature_r = temperature_f + RANKINE_OFFSET;
        self.base_mass = self.mass_at_pressure(ATM_PSIA);
        self.apply_mass_delta(0.0);
    }
}
