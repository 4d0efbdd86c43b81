use crate::error::SimError;

/// What happens when a mobile agent crosses the world boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Clamp to the boundary and invert the offending velocity component.
    Bounce,
    /// Toroidal wrap into `[0, grid_size)`.
    #[default]
    Wrap,
    /// No boundary handling; positions may leave the grid.
    Unbounded,
}

/// Distribution for the random initial velocity of a mobile agent.
///
/// The two variants existed side by side in earlier revisions of these
/// simulations; the choice is exposed instead of hard-coded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VelocityInit {
    /// Per-axis uniform in `[-max_velocity / 2, max_velocity / 2]`.
    #[default]
    Symmetric,
    /// Per-axis uniform in `[0, max_velocity)`.
    Positive,
}

/// A steering option that is either shared by the whole flock or varies
/// per sub-population (indexed by `agent_type % len`).
#[derive(Clone, Debug, PartialEq)]
pub enum TypedParam {
    Uniform(f32),
    PerType(Vec<f32>),
}

impl TypedParam {
    pub fn resolve(&self, agent_type: usize) -> f32 {
        match self {
            TypedParam::Uniform(v) => *v,
            TypedParam::PerType(vs) => vs[agent_type % vs.len()],
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        match self {
            TypedParam::PerType(vs) if vs.is_empty() => Err(SimError::EmptyTypedParam),
            _ => Ok(()),
        }
    }
}

impl From<f32> for TypedParam {
    fn from(v: f32) -> Self {
        TypedParam::Uniform(v)
    }
}

impl From<Vec<f32>> for TypedParam {
    fn from(vs: Vec<f32>) -> Self {
        TypedParam::PerType(vs)
    }
}

/// Configuration contract for boid steering.
///
/// Array-valued options let sub-populations (agent types) flock with a
/// different character; scalar options apply to everyone.
/// `turn_factor` and `edge_margin` are part of the historical contract
/// and are carried for API compatibility; the current steering rule does
/// not consume them.
#[derive(Clone, Debug, PartialEq)]
pub struct FlockingParams {
    pub max_force: f32,
    pub separation: TypedParam,
    pub alignment: TypedParam,
    pub cohesion: TypedParam,
    pub perception_radius: f32,
    pub desired_separation: TypedParam,
    pub turn_factor: f32,
    pub min_speed: f32,
    pub edge_margin: f32,
    /// Number of sub-populations; `agent_type = id % agent_types`.
    pub agent_types: usize,
}

impl Default for FlockingParams {
    fn default() -> Self {
        Self {
            max_force: 0.1,
            separation: TypedParam::Uniform(1.5),
            alignment: TypedParam::Uniform(1.0),
            cohesion: TypedParam::Uniform(1.0),
            perception_radius: 50.0,
            desired_separation: TypedParam::Uniform(25.0),
            turn_factor: 0.3,
            min_speed: 0.0,
            edge_margin: 50.0,
            agent_types: 5,
        }
    }
}

impl FlockingParams {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.agent_types == 0 {
            return Err(SimError::NoAgentTypes);
        }
        self.separation.validate()?;
        self.alignment.validate()?;
        self.cohesion.validate()?;
        self.desired_separation.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_param_indexes_by_type_modulo_len() {
        let p = TypedParam::PerType(vec![0.25, 0.5, 1.0]);
        assert_eq!(p.resolve(0), 0.25);
        assert_eq!(p.resolve(2), 1.0);
        assert_eq!(p.resolve(4), 0.5);

        let u = TypedParam::Uniform(2.0);
        assert_eq!(u.resolve(0), 2.0);
        assert_eq!(u.resolve(17), 2.0);
    }

    #[test]
    fn empty_per_type_array_fails_validation() {
        let mut params = FlockingParams::default();
        params.cohesion = TypedParam::PerType(vec![]);
        assert_eq!(params.validate(), Err(SimError::EmptyTypedParam));
    }

    #[test]
    fn zero_agent_types_fails_validation() {
        let mut params = FlockingParams::default();
        params.agent_types = 0;
        assert_eq!(params.validate(), Err(SimError::NoAgentTypes));
    }

    #[test]
    fn defaults_pass_validation() {
        assert_eq!(FlockingParams::default().validate(), Ok(()));
    }
}
