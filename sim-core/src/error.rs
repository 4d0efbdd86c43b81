use thiserror::Error;

/// Construction-time validation failures.
///
/// The simulation core performs no I/O; once an entity is built, every
/// step is a total function of its state. All error conditions are
/// therefore caught up front, when a scene is assembled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("grid size must be positive, got {0}")]
    InvalidGridSize(f32),

    #[error("radius must be positive, got {0}")]
    InvalidRadius(f32),

    #[error("mass must be positive, got {0}")]
    InvalidMass(f32),

    #[error("max velocity must be positive, got {0}")]
    InvalidMaxVelocity(f32),

    #[error("{axis} coordinate {value} is outside [0, {grid_size})")]
    CoordinateOutOfRange {
        axis: char,
        value: f32,
        grid_size: f32,
    },

    #[error("molecular weight must be positive, got {0}")]
    InvalidMolecularWeight(f32),

    #[error("absolute temperature must be positive, got {0} degR")]
    InvalidTemperature(f32),

    #[error("absolute pressure must be non-negative, got {0} psia")]
    InvalidPressure(f32),

    #[error("per-type parameter array must not be empty")]
    EmptyTypedParam,

    #[error("agent type count must be positive")]
    NoAgentTypes,

    #[error("palette must contain at least one color")]
    EmptyPalette,

    #[error("grid dimensions must be nonzero, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },
}
