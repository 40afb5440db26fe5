//! The per-step pipeline and kick-drift-kick integrator.
//!
//! Each full step rebuilds the octree twice (once per half-step) and
//! drops it immediately after use; the tree never outlives the
//! half-step whose forces it was built to evaluate.

use crate::config::SimConfig;
use crate::error::SimError;
use crate::kernel::CubicSplineKernel;
use crate::particle::ParticleStore;
use crate::tree::Tree;
use crate::{gravity, sph};

/// Drives the particle store through the coupled SPH/gravity pipeline.
pub struct Simulation {
    pub store: ParticleStore,
    pub config: SimConfig,
    pub kernel: CubicSplineKernel,
    pub t: f64,
}

impl Simulation {
    pub fn new(store: ParticleStore, config: SimConfig) -> Result<Self, SimError> {
        if store.is_empty() {
            return Err(SimError::EmptyParticleStore);
        }
        let kernel = CubicSplineKernel::new(config.kernel_n_q);
        Ok(Self {
            store,
            config,
            kernel,
            t: 0.0,
        })
    }

    /// One half-step: build the tree, evaluate density/EOS, optionally
    /// zero accelerations, then evaluate gravity + SPH pressure force.
    /// Shared by both sub-steps of `step()`; the kick/drift around this
    /// call differs between the two halves and stays in `step()`.
    fn evaluate_forces(&mut self, zero_acc_before_gravity: bool, clamp_pressure: bool) -> Result<(), SimError> {
        let mut tree = Tree::build(&self.store, self.config.tree_depth_limit, self.config.leaf_capacity);
        log::trace!("built tree over {} particles", self.store.len());

        sph::density(&tree, &mut self.store, self.config.h, &self.kernel)?;
        sph::equation_of_state(&mut self.store, self.config.gamma_m1, clamp_pressure);
        tree.propagate_density_and_pressure(&self.store);

        if zero_acc_before_gravity {
            self.store.reset_accelerations();
        }
        gravity::accumulate_accelerations(
            &tree,
            &mut self.store,
            self.config.theta,
            self.config.g,
            self.config.softening,
        );
        sph::accumulate_forces(&tree, &mut self.store, self.config.h, &self.kernel);
        // `tree` is dropped here.
        Ok(())
    }

    /// Advance the simulation by one full timestep (two half-steps).
    ///
    /// Sub-step A zeroes accelerations before gravity, then zeroes both
    /// acceleration and energy rate again after its drift. Sub-step B's
    /// gravity pass therefore already starts from the acceleration
    /// slots left at zero at the end of sub-step A, so it does not zero
    /// them again before its own gravity call.
    pub fn step(&mut self) -> Result<(), SimError> {
        let dt = self.config.dt;

        // --- Sub-step A (first half) ---
        self.evaluate_forces(true, false)?;
        for p in &mut self.store.particles {
            p.vel += p.acc * (dt / 2.0);
            p.u += p.du_dt * (dt / 2.0);
        }
        for p in &mut self.store.particles {
            p.pos += p.vel * (dt / 2.0);
        }
        self.store.reset_accelerations();
        self.store.reset_energy_rates();

        // --- Sub-step B (second half) ---
        self.evaluate_forces(false, true)?;
        for p in &mut self.store.particles {
            p.vel += p.acc * (dt / 2.0);
            p.u += p.du_dt * (dt / 2.0);
            p.pos += p.vel * (dt / 2.0);
        }

        self.t += dt;
        Ok(())
    }

    /// Run to completion: the first step that reaches `t >= t_end` ends
    /// the loop.
    pub fn run(&mut self) -> Result<(), SimError> {
        while self.t < self.config.t_end {
            self.step()?;
            log::debug!("t = {:.3}", self.t);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;
    use lin_alg::f64::Vec3;

    fn particle(id: usize, pos: Vec3, mass: f64) -> Particle {
        Particle {
            id,
            mass,
            rho: 0.0,
            u: 1.0,
            pressure: 1.0,
            du_dt: 0.0,
            pos,
            vel: Vec3::new_zero(),
            acc: Vec3::new_zero(),
        }
    }

    #[test]
    fn single_particle_is_stationary_after_a_step() {
        let store = ParticleStore::new(vec![particle(0, Vec3::new(1.0, 2.0, 3.0), 100.0)]);
        let mut sim = Simulation::new(store, SimConfig::default()).unwrap();
        sim.step().unwrap();

        let p = &sim.store.particles[0];
        assert_eq!(p.acc.x, 0.0);
        assert_eq!(p.acc.y, 0.0);
        assert_eq!(p.acc.z, 0.0);
        assert_eq!(p.vel.x, 0.0);
        assert_eq!(p.pos.x, 1.0);
        assert_eq!(p.pos.y, 2.0);
        assert_eq!(p.pos.z, 3.0);
    }

    #[test]
    fn two_particles_move_toward_each_other_and_conserve_momentum() {
        let store = ParticleStore::new(vec![
            particle(0, Vec3::new(0.0, 0.0, 0.0), 1.0),
            particle(1, Vec3::new(1.0, 0.0, 0.0), 1.0),
        ]);
        let mut sim = Simulation::new(store, SimConfig::default()).unwrap();
        sim.step().unwrap();

        let p0 = sim.store.particles[0];
        let p1 = sim.store.particles[1];
        assert!(p0.pos.x > 0.0, "particle 0 should have drifted toward +x");
        assert!(p1.pos.x < 1.0, "particle 1 should have drifted toward -x");

        let momentum_x = p0.mass * p0.vel.x + p1.mass * p1.vel.x;
        assert!(momentum_x.abs() < 1e-6);
    }
}
