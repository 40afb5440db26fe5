//! Barnes-Hut gravitational acceleration.
//!
//! Each particle walks the octree on its own, accepting a node as a
//! single monopole once it's small and far enough (`side / d < theta`)
//! or has no children. The outer loop over particles is rayon-parallel:
//! each particle only ever writes its own acceleration slot, so the
//! traversals need no locking.

use lin_alg::f64::Vec3;
use rayon::prelude::*;

use crate::particle::ParticleStore;
use crate::tree::{Node, Tree};

fn traverse(node: &Node, pos: Vec3, theta: f64, g: f64, eps: f64) -> Vec3 {
    let diff = pos - node.center_of_mass;
    let d2 = diff.magnitude_squared() + eps * eps;
    let d = d2.sqrt();

    if node.is_leaf() || node.side / d < theta {
        return if node.mass > 0.0 && d > 0.0 {
            diff * (-g * node.mass / (d2 * d))
        } else {
            Vec3::new_zero()
        };
    }

    let mut acc = Vec3::new_zero();
    if let Some(children) = &node.children {
        for child in children.iter() {
            if !child.particles.is_empty() {
                acc += traverse(child, pos, theta, g, eps);
            }
        }
    }
    acc
}

/// Compute, for every particle in `store`, its Barnes-Hut gravitational
/// acceleration and add it into the particle's `acc` slot. Accelerations
/// are *not* zeroed here; callers decide when to reset them.
pub fn accumulate_accelerations(tree: &Tree, store: &mut ParticleStore, theta: f64, g: f64, softening: f64) {
    let contributions: Vec<Vec3> = store
        .particles
        .par_iter()
        .map(|p| traverse(&tree.root, p.pos, theta, g, softening))
        .collect();

    for (p, contribution) in store.particles.iter_mut().zip(contributions) {
        p.acc += contribution;
    }
}
