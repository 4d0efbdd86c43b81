//! Collection-level per-frame operations.
//!
//! The rendering layer owns the frame loop and calls exactly one phase
//! per frame for the scene it is showing; the core never schedules
//! anything itself. Each phase leaves every entity in a fully-updated,
//! valid state, so the driver may stop issuing frames at any point.

use crate::agent::Agent;
use crate::boid::{Boid, BoidSnapshot};
use crate::config::BoundaryPolicy;
use crate::particle::Particle;
use rand::Rng;

/// Steps every base agent once (Brownian jitter and/or velocity drift).
///
/// ### Parameters
/// - `agents` - The scene's agents; mutated in place.
/// - `policy` - Boundary handling for mobile agents.
/// - `rng` - Randomness source for the Brownian draws.
pub fn drift_phase(agents: &mut [Agent], policy: BoundaryPolicy, rng: &mut impl Rng) {
    for agent in agents {
        agent.step(policy, rng);
    }
}

/// Diffusion-limited aggregation: freezes diffusing agents that touch
/// the frozen cluster.
///
/// Agents with `brownian == false` form the cluster. Any still-diffusing
/// agent within `stick_radius` of a cluster member (as of the start of
/// this phase) stops diffusing. Agents frozen during this call do not
/// capture others until the next call, so iteration order cannot change
/// the outcome.
///
/// ### Returns
/// The number of agents that froze this step.
pub fn aggregation_phase(agents: &mut [Agent], stick_radius: f32) -> usize {
    let cluster: Vec<glam::Vec2> = agents
        .iter()
        .filter(|a| !a.brownian)
        .map(|a| a.pos)
        .collect();

    let mut stuck = 0;
    for agent in agents.iter_mut().filter(|a| a.brownian) {
        if cluster
            .iter()
            .any(|&seed| agent.pos.distance(seed) < stick_radius)
        {
            agent.brownian = false;
            stuck += 1;
        }
    }
    stuck
}

/// Steers and integrates every boid against a frozen snapshot of the
/// whole flock, so each boid sees the same pre-step neighbor state.
pub fn flock_phase(boids: &mut [Boid]) {
    let snapshot: Vec<BoidSnapshot> = boids.iter().map(Boid::snapshot).collect();
    for boid in boids {
        boid.flock(&snapshot);
    }
}

/// Applies the target attraction/repulsion to every swarm particle.
pub fn swarm_phase(particles: &mut [Particle], target: glam::Vec2) {
    for particle in particles {
        particle.apply_force(target);
    }
}

/// Applies constant downward gravity to every fireworks particle.
pub fn fireworks_phase(particles: &mut [Particle], gravity: f32) {
    for particle in particles {
        particle.fall(gravity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentInit;
    use crate::config::FlockingParams;
    use crate::palette::Palette;
    use crate::particle::ParticleInit;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn agent_at(id: usize, pos: Vec2, brownian: bool, rng: &mut StdRng) -> Agent {
        let init = AgentInit {
            pos: Some(pos),
            radius: Some(1.0),
            brownian,
            ..AgentInit::default()
        };
        Agent::new(100.0, id, init, &Palette::default(), rng).unwrap()
    }

    #[test]
    fn drift_phase_keeps_every_agent_in_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut agents: Vec<Agent> = (0..20)
            .map(|id| {
                let init = AgentInit {
                    brownian: true,
                    mobile: true,
                    ..AgentInit::default()
                };
                Agent::new(50.0, id, init, &Palette::default(), &mut rng).unwrap()
            })
            .collect();

        for _ in 0..200 {
            drift_phase(&mut agents, BoundaryPolicy::Wrap, &mut rng);
            for a in &agents {
                assert!((0.0..50.0).contains(&a.pos.x));
                assert!((0.0..50.0).contains(&a.pos.y));
            }
        }
    }

    #[test]
    fn aggregation_freezes_only_agents_near_the_cluster() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut agents = vec![
            agent_at(0, Vec2::new(50.0, 50.0), false, &mut rng), // seed
            agent_at(1, Vec2::new(52.0, 50.0), true, &mut rng),  // adjacent
            agent_at(2, Vec2::new(90.0, 90.0), true, &mut rng),  // far away
        ];

        let stuck = aggregation_phase(&mut agents, 5.0);
        assert_eq!(stuck, 1);
        assert!(!agents[1].brownian);
        assert!(agents[2].brownian);
    }

    #[test]
    fn newly_frozen_agents_do_not_capture_within_the_same_phase() {
        let mut rng = StdRng::seed_from_u64(13);
        // A chain: seed -- a -- b, each 4 apart with stick radius 5.
        // b is 8 from the seed, so it only freezes on the second call.
        let mut agents = vec![
            agent_at(0, Vec2::new(50.0, 50.0), false, &mut rng),
            agent_at(1, Vec2::new(54.0, 50.0), true, &mut rng),
            agent_at(2, Vec2::new(58.0, 50.0), true, &mut rng),
        ];

        assert_eq!(aggregation_phase(&mut agents, 5.0), 1);
        assert!(agents[2].brownian);
        assert_eq!(aggregation_phase(&mut agents, 5.0), 1);
        assert!(!agents[2].brownian);
    }

    #[test]
    fn flock_phase_gives_identical_results_regardless_of_order() {
        let params = FlockingParams::default();
        let mut rng = StdRng::seed_from_u64(14);
        let boids: Vec<Boid> = (0..10)
            .map(|id| Boid::new(100.0, id, 5.0, &params, &Palette::default(), &mut rng).unwrap())
            .collect();

        let mut forward = boids.clone();
        let mut reversed: Vec<Boid> = boids.into_iter().rev().collect();

        flock_phase(&mut forward);
        flock_phase(&mut reversed);

        for boid in &forward {
            let twin = reversed.iter().find(|b| b.id == boid.id).unwrap();
            assert_eq!(boid.pos, twin.pos);
            assert_eq!(boid.vel, twin.vel);
        }
    }

    #[test]
    fn swarm_phase_moves_particles_toward_a_far_target() {
        let mut rng = StdRng::seed_from_u64(15);
        let mut particles: Vec<Particle> = (0..5)
            .map(|id| {
                let init = ParticleInit {
                    pos: Some(Vec2::new(10.0 + id as f32, 10.0)),
                    mass: Some(20.0),
                    ..ParticleInit::default()
                };
                Particle::new(400.0, id, init, &Palette::default(), &mut rng).unwrap()
            })
            .collect();

        swarm_phase(&mut particles, Vec2::new(390.0, 390.0));
        for p in &particles {
            assert!(p.vel.x > 0.0 && p.vel.y > 0.0);
        }
    }

    #[test]
    fn fireworks_phase_accelerates_everything_downward() {
        let mut rng = StdRng::seed_from_u64(16);
        let mut particles: Vec<Particle> = (0..5)
            .map(|id| {
                Particle::new(400.0, id, ParticleInit::default(), &Palette::default(), &mut rng)
                    .unwrap()
            })
            .collect();

        fireworks_phase(&mut particles, 0.01);
        fireworks_phase(&mut particles, 0.01);
        for p in &particles {
            assert!((p.vel.y - 0.02).abs() < 1e-6);
        }
    }
}
