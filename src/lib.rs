//! Coupled Barnes-Hut gravity / SPH fluid core.
//!
//! This crate simulates the time evolution of a self-gravitating
//! compressible fluid represented as discrete particles. Each timestep:
//!
//! 1. builds a Barnes-Hut octree over the current particle positions
//!    ([`tree`]),
//! 2. evaluates SPH density by tree-restricted neighbor search
//!    ([`sph::density`]),
//! 3. updates pressure via the ideal-gas equation of state
//!    ([`sph::equation_of_state`]),
//! 4. evaluates gravitational acceleration by Barnes-Hut monopole
//!    approximation ([`gravity`]),
//! 5. evaluates SPH pressure acceleration and internal-energy rate by a
//!    second tree-restricted neighbor search ([`sph::accumulate_forces`]),
//! 6. and advances position, velocity, and internal energy with a
//!    symmetric kick-drift-kick integrator ([`integrator`]).

#![allow(non_ascii_idents)]

pub mod config;
pub mod error;
pub mod gravity;
pub mod integrator;
pub mod kernel;
pub mod particle;
pub mod sph;
pub mod tree;

pub use config::SimConfig;
pub use error::SimError;
pub use integrator::Simulation;
pub use kernel::CubicSplineKernel;
pub use particle::{BodyModel, Particle, ParticleStore};
pub use tree::{Cube, Node, Tree};
