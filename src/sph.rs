//! SPH density, equation of state, and pressure-force traversals.
//!
//! Neighbor search reuses the same tree as gravity but with a different
//! acceptance predicate: cell-overlaps-support rather than
//! opening-angle, read off the kernel table in `crate::kernel`.

use lin_alg::f64::Vec3;
use rayon::prelude::*;

use crate::error::SimError;
use crate::kernel::CubicSplineKernel;
use crate::particle::ParticleStore;
use crate::tree::{Node, Tree};

fn overlaps_support(node: &Node, pos: Vec3, h: f64) -> bool {
    let support = 2.0 * h + node.side / 2.0;
    (pos.x - node.center.x).abs() < support
        && (pos.y - node.center.y).abs() < support
        && (pos.z - node.center.z).abs() < support
}

fn traverse_density(node: &Node, pos: Vec3, h: f64, kernel: &CubicSplineKernel) -> f64 {
    if !overlaps_support(node, pos, h) {
        return 0.0;
    }
    let n = node.n();
    if n > 1 && node.children.is_some() {
        let children = node.children.as_ref().unwrap();
        let mut rho = 0.0;
        for child in children.iter() {
            if !child.particles.is_empty() {
                rho += traverse_density(child, pos, h, kernel);
            }
        }
        rho
    } else if n == 1 {
        let q = &node.particles[0];
        let r = (pos - q.pos).magnitude();
        let (w, _) = kernel.eval(r, h);
        q.mass * w
    } else {
        0.0
    }
}

/// Compute density for every particle by tree-restricted neighbor
/// search. Returns `SimError::DegenerateDensity` if any
/// particle ends up with rho == 0. Does not itself propagate the result
/// into the tree's particle copies: the caller does that once rho *and*
/// pressure are both final, via `Tree::propagate_density_and_pressure`.
pub fn density(tree: &Tree, store: &mut ParticleStore, h: f64, kernel: &CubicSplineKernel) -> Result<(), SimError> {
    let densities: Vec<f64> = store
        .particles
        .par_iter()
        .map(|p| traverse_density(&tree.root, p.pos, h, kernel))
        .collect();

    for (p, rho) in store.particles.iter_mut().zip(densities.iter()) {
        p.rho = *rho;
    }

    if let Some(index) = store.particles.iter().position(|p| p.rho == 0.0) {
        log::error!("particle {index} has zero density after SPH density evaluation");
        return Err(SimError::DegenerateDensity { index });
    }

    Ok(())
}

/// Ideal-gas equation of state: `P = (gamma - 1) * u * rho`.
/// `clamp` applies the post-second-half-step floor of `P >= 0`.
pub fn equation_of_state(store: &mut ParticleStore, gamma_m1: f64, clamp: bool) {
    for p in &mut store.particles {
        p.pressure = gamma_m1 * p.u * p.rho;
        if clamp && p.pressure < 0.0 {
            log::warn!("clamping negative pressure {} to 0 for particle {}", p.pressure, p.id);
            p.pressure = 0.0;
        }
    }
}

struct ForceContribution {
    acc: Vec3,
    du_dt: f64,
}

fn traverse_force(
    node: &Node,
    pos: Vec3,
    vel: Vec3,
    pressure: f64,
    rho: f64,
    h: f64,
    kernel: &CubicSplineKernel,
) -> ForceContribution {
    if !overlaps_support(node, pos, h) {
        return ForceContribution {
            acc: Vec3::new_zero(),
            du_dt: 0.0,
        };
    }
    let n = node.n();
    if n > 1 && node.children.is_some() {
        let children = node.children.as_ref().unwrap();
        let mut acc = Vec3::new_zero();
        let mut du_dt = 0.0;
        for child in children.iter() {
            if !child.particles.is_empty() {
                let c = traverse_force(child, pos, vel, pressure, rho, h, kernel);
                acc += c.acc;
                du_dt += c.du_dt;
            }
        }
        ForceContribution { acc, du_dt }
    } else if n == 1 {
        let q = &node.particles[0];
        let diff = pos - q.pos;
        let r = diff.magnitude();
        if r == 0.0 {
            // Excludes self from the pressure force and the energy rate.
            return ForceContribution {
                acc: Vec3::new_zero(),
                du_dt: 0.0,
            };
        }
        let n_hat = diff / r;
        let (_, grad_mag) = kernel.eval(r, h);
        let grad_w = n_hat * grad_mag;

        let term = pressure / (rho * rho) + q.pressure / (q.rho * q.rho);
        let acc = grad_w * (-q.mass * term);

        let v_pq = vel - q.vel;
        let v_dot_grad = v_pq.x * grad_w.x + v_pq.y * grad_w.y + v_pq.z * grad_w.z;
        let du_dt = (pressure / rho) * q.mass * v_dot_grad;

        ForceContribution { acc, du_dt }
    } else {
        ForceContribution {
            acc: Vec3::new_zero(),
            du_dt: 0.0,
        }
    }
}

/// Accumulate SPH pressure acceleration into `acc` (alongside whatever
/// gravity already wrote there) and internal-energy rate into `du_dt`,
/// for every particle.
pub fn accumulate_forces(tree: &Tree, store: &mut ParticleStore, h: f64, kernel: &CubicSplineKernel) {
    let contributions: Vec<ForceContribution> = store
        .particles
        .par_iter()
        .map(|p| traverse_force(&tree.root, p.pos, p.vel, p.pressure, p.rho, h, kernel))
        .collect();

    for (p, c) in store.particles.iter_mut().zip(contributions) {
        p.acc += c.acc;
        p.du_dt += c.du_dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;

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
    fn isolated_particle_density_is_self_term_only() {
        let kernel = CubicSplineKernel::new(1000);
        let h = 10.0;
        let mut store = ParticleStore::new(vec![particle(0, Vec3::new(0.0, 0.0, 0.0), 100.0)]);
        let tree = Tree::build(&store, 1000, 1);
        density(&tree, &mut store, h, &kernel).unwrap();

        let (w0, _) = kernel.eval(0.0, h);
        let expected = 100.0 * w0;
        assert!((store.particles[0].rho - expected).abs() < 1e-9);
    }

    #[test]
    fn force_traversal_skips_self_pair() {
        let kernel = CubicSplineKernel::new(1000);
        let h = 10.0;
        let mut store = ParticleStore::new(vec![particle(0, Vec3::new(0.0, 0.0, 0.0), 100.0)]);
        store.particles[0].rho = 1.0;
        let tree = Tree::build(&store, 1000, 1);
        accumulate_forces(&tree, &mut store, h, &kernel);
        let p = &store.particles[0];
        assert_eq!(p.acc.x, 0.0);
        assert_eq!(p.acc.y, 0.0);
        assert_eq!(p.acc.z, 0.0);
        assert_eq!(p.du_dt, 0.0);
    }
}
