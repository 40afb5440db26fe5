//! The particle record and the particle store.
//!
//! `Particle` exposes its position and mass through the `BodyModel`
//! trait so the octree code can stay generic over what it places and
//! weighs, even though `Particle` is presently its only implementor.

use lin_alg::f64::Vec3;
#[cfg(feature = "driver")]
use rand::Rng;

/// Anything the octree can place and weigh.
pub trait BodyModel {
    fn posit(&self) -> Vec3;
    fn mass(&self) -> f64;
}

/// A single SPH/gravity particle.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    /// Stable index into the owning `ParticleStore`. Assigned once at
    /// construction and carried into every tree copy, so density can be
    /// propagated back into tree copies by identity rather than by
    /// position.
    pub id: usize,
    pub mass: f64,
    pub rho: f64,
    pub u: f64,
    pub pressure: f64,
    pub du_dt: f64,
    pub pos: Vec3,
    pub vel: Vec3,
    pub acc: Vec3,
}

impl BodyModel for Particle {
    fn posit(&self) -> Vec3 {
        self.pos
    }

    fn mass(&self) -> f64 {
        self.mass
    }
}

/// The authoritative, index-stable sequence of particles. No insertions
/// or deletions occur after construction.
#[derive(Debug, Clone)]
pub struct ParticleStore {
    pub particles: Vec<Particle>,
}

impl ParticleStore {
    pub fn new(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// `n` particles uniformly distributed in `[0, side)^3`, at rest,
    /// with uniform mass and internal energy. Density starts at zero
    /// (it is computed by the first density traversal); pressure starts
    /// at 1 and is overwritten before use.
    #[cfg(feature = "driver")]
    pub fn initial_conditions<R: Rng>(
        n: usize,
        side: f64,
        mass: f64,
        u0: f64,
        rng: &mut R,
    ) -> Self {
        let particles = (0..n)
            .map(|id| Particle {
                id,
                mass,
                rho: 0.0,
                u: u0,
                pressure: 1.0,
                du_dt: 0.0,
                pos: Vec3::new(
                    rng.gen_range(0.0..side),
                    rng.gen_range(0.0..side),
                    rng.gen_range(0.0..side),
                ),
                vel: Vec3::new_zero(),
                acc: Vec3::new_zero(),
            })
            .collect();
        Self::new(particles)
    }

    pub fn reset_accelerations(&mut self) {
        for p in &mut self.particles {
            p.acc = Vec3::new_zero();
        }
    }

    pub fn reset_energy_rates(&mut self) {
        for p in &mut self.particles {
            p.du_dt = 0.0;
        }
    }
}
