//! Core library for a family of 2D particle and agent simulations.
//!
//! Main components:
//! - [`agent`] — base kinematic entities (Brownian jitter, velocity drift).
//! - [`boid`] — flocking agents with separation/alignment/cohesion steering.
//! - [`particle`] — massive particles under point attraction or gravity.
//! - [`fluid`] / [`grid`] — compressible-flow cells and the grid solver.
//! - [`phases`] — collection-level per-frame operations the driver calls.
//! - [`config`] — boundary/velocity policies and the flocking contract.
//! - [`palette`] — injectable color-assignment strategy.
//! - [`vec2ext`] — toroidal distance and wrap helpers over [`glam::Vec2`].
//! - [`types`] / [`error`] — shared aliases and validation errors.
//!
//! The core has no scheduler and performs no I/O: the rendering layer
//! owns the frame loop, calls one phase (or grid step) per frame, and
//! reads back positions, radii, colors, and physical quantities.

pub mod agent;
pub mod boid;
pub mod config;
pub mod error;
pub mod fluid;
pub mod grid;
pub mod palette;
pub mod particle;
pub mod phases;
pub mod types;
pub mod vec2ext;
