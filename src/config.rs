//! Simulation-wide constants.
//!
//! A plain struct with a `Default` impl carrying the reference values,
//! rather than a set of global constants, so tests and the driver can
//! override them without touching the core.

/// Every tunable parameter of the simulation, gathered so they can be
/// overridden in tests or by the driver without touching the core.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Gravitational constant.
    pub g: f64,
    /// Softening length added (squared) to the gravity traversal's
    /// distance to avoid a self-interaction singularity.
    pub softening: f64,
    /// Global SPH smoothing length. Support radius is `2 * h`.
    pub h: f64,
    /// Barnes-Hut opening angle.
    pub theta: f64,
    /// EOS factor (gamma - 1), gamma = 5/3.
    pub gamma_m1: f64,
    /// Integrator timestep.
    pub dt: f64,
    /// Simulation end time.
    pub t_end: f64,
    /// Number of kernel table samples.
    pub kernel_n_q: usize,
    /// Octree recursion depth budget.
    pub tree_depth_limit: usize,
    /// Octree leaf capacity.
    pub leaf_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            g: 6.67430e-11,
            softening: 1.0e-5,
            h: 10.0,
            theta: 0.5,
            gamma_m1: 2.0 / 3.0,
            dt: 0.8,
            t_end: 1000.0,
            kernel_n_q: 1000,
            tree_depth_limit: 1000,
            leaf_capacity: 1,
        }
    }
}
