//! The octree: build and the shared node representation consumed by
//! the gravity, density, and force traversals.
//!
//! Octants are numbered bit0 -> x, bit1 -> y, bit2 -> z sign, and each
//! node owns its own children directly (`Option<Box<[Node; 8]>>`)
//! rather than indexing into a shared arena.

use lin_alg::f64::Vec3;

use crate::particle::{Particle, ParticleStore};

/// A cubical, axis-aligned bounding box: center + side length.
#[derive(Debug, Clone, Copy)]
pub struct Cube {
    pub center: Vec3,
    pub side: f64,
}

impl Cube {
    /// The smallest cube (by component-wise min/max, not padded) that
    /// encloses every particle.
    pub fn enclosing(store: &ParticleStore) -> Self {
        let mut min = Vec3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Vec3::new(f64::MIN, f64::MIN, f64::MIN);
        for p in &store.particles {
            min.x = min.x.min(p.pos.x);
            min.y = min.y.min(p.pos.y);
            min.z = min.z.min(p.pos.z);
            max.x = max.x.max(p.pos.x);
            max.y = max.y.max(p.pos.y);
            max.z = max.z.max(p.pos.z);
        }
        let extent = (max.x - min.x).max(max.y - min.y).max(max.z - min.z);
        let center = Vec3::new(
            (max.x + min.x) / 2.0,
            (max.y + min.y) / 2.0,
            (max.z + min.z) / 2.0,
        );
        Self {
            center,
            side: extent,
        }
    }

    /// The eight child cubes, ordered so octant index `k` (bit0 -> x,
    /// bit1 -> y, bit2 -> z sign) matches `octant_index`.
    fn children(&self) -> [Cube; 8] {
        let half = self.side / 2.0;
        let quarter = self.side / 4.0;
        let mut out = [Cube {
            center: self.center,
            side: half,
        }; 8];
        for (k, cube) in out.iter_mut().enumerate() {
            let sx = if k & 0b001 != 0 { 1.0 } else { -1.0 };
            let sy = if k & 0b010 != 0 { 1.0 } else { -1.0 };
            let sz = if k & 0b100 != 0 { 1.0 } else { -1.0 };
            cube.center = self.center + Vec3::new(sx, sy, sz) * quarter;
        }
        out
    }
}

/// Which of the 8 octants of `center` a position falls in.
fn octant_index(center: Vec3, pos: Vec3) -> usize {
    let mut k = 0;
    if pos.x > center.x {
        k |= 0b001;
    }
    if pos.y > center.y {
        k |= 0b010;
    }
    if pos.z > center.z {
        k |= 0b100;
    }
    k
}

/// An octree node. `particles` holds value copies of every particle
/// under this node and is never cleared on subdivision, so a node's
/// particle list always reflects everything beneath it; `children` is
/// `Some` with exactly eight entries iff this node subdivided.
#[derive(Debug)]
pub struct Node {
    pub center: Vec3,
    pub side: f64,
    pub mass: f64,
    pub center_of_mass: Vec3,
    pub particles: Vec<Particle>,
    pub children: Option<Box<[Node; 8]>>,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn n(&self) -> usize {
        self.particles.len()
    }
}

fn aggregate(particles: &[Particle], cell_center: Vec3) -> (f64, Vec3) {
    let mut mass = 0.0;
    let mut weighted = Vec3::new_zero();
    for p in particles {
        mass += p.mass;
        weighted += p.pos * p.mass;
    }
    if mass > 0.0 {
        (mass, weighted / mass)
    } else {
        (0.0, cell_center)
    }
}

/// Build a subtree over `particles` within `cell`, honoring the depth
/// budget and leaf capacity.
fn build_node(particles: Vec<Particle>, cell: Cube, depth_left: usize, leaf_capacity: usize) -> Node {
    let (mass, center_of_mass) = aggregate(&particles, cell.center);

    if particles.len() <= leaf_capacity || depth_left == 0 {
        return Node {
            center: cell.center,
            side: cell.side,
            mass,
            center_of_mass,
            particles,
            children: None,
        };
    }

    let mut buckets: [Vec<Particle>; 8] = Default::default();
    for p in &particles {
        buckets[octant_index(cell.center, p.pos)].push(*p);
    }
    let child_cubes = cell.children();

    let mut children: Vec<Node> = Vec::with_capacity(8);
    for (bucket, child_cube) in buckets.into_iter().zip(child_cubes.into_iter()) {
        children.push(build_node(bucket, child_cube, depth_left - 1, leaf_capacity));
    }
    let children: [Node; 8] = match children.try_into() {
        Ok(arr) => arr,
        Err(_) => unreachable!("exactly 8 buckets by construction"),
    };
    let children = Box::new(children);

    Node {
        center: cell.center,
        side: cell.side,
        mass,
        center_of_mass,
        particles,
        children: Some(children),
    }
}

/// The octree for one half-step. Built fresh and torn down (dropped)
/// after the traversals that consume it.
#[derive(Debug)]
pub struct Tree {
    pub root: Node,
}

impl Tree {
    /// Build the tree over the current state of `store`: copy every
    /// particle into the root, compute the enclosing cube, and
    /// subdivide down to `leaf_capacity` or `depth_limit`.
    pub fn build(store: &ParticleStore, depth_limit: usize, leaf_capacity: usize) -> Self {
        let cell = Cube::enclosing(store);
        let root = build_node(store.particles.clone(), cell, depth_limit, leaf_capacity);
        Self { root }
    }

    /// Push the current density and pressure of every live particle in
    /// `store` into the corresponding copy at every level of the tree,
    /// matched by particle id rather than by position in a node's list.
    /// Call once after density evaluation and again after the equation
    /// of state, so the force traversal reads up-to-date rho and
    /// pressure from the tree's own copies.
    pub fn propagate_density_and_pressure(&mut self, store: &ParticleStore) {
        propagate_node(&mut self.root, store);
    }
}

fn propagate_node(node: &mut Node, store: &ParticleStore) {
    for p in node.particles.iter_mut() {
        let src = &store.particles[p.id];
        p.rho = src.rho;
        p.pressure = src.pressure;
    }
    if let Some(children) = &mut node.children {
        for child in children.iter_mut() {
            propagate_node(child, store);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn cube_corners_end_up_in_distinct_leaves() {
        let mut particles = Vec::new();
        let mut id = 0;
        for &sx in &[-1.0, 1.0] {
            for &sy in &[-1.0, 1.0] {
                for &sz in &[-1.0, 1.0] {
                    particles.push(particle(id, Vec3::new(sx, sy, sz), 1.0));
                    id += 1;
                }
            }
        }
        let store = ParticleStore::new(particles);
        let tree = Tree::build(&store, 1000, 1);

        assert_eq!(tree.root.mass, 8.0);
        assert!(tree.root.center_of_mass.x.abs() < 1e-9);
        assert!(tree.root.center_of_mass.y.abs() < 1e-9);
        assert!(tree.root.center_of_mass.z.abs() < 1e-9);

        // Every leaf under an 8-corner cube split should hold exactly one particle.
        let mut leaves = Vec::new();
        collect_leaves(&tree.root, &mut leaves);
        assert_eq!(leaves.len(), 8);
        for leaf in leaves {
            assert_eq!(leaf.particles.len(), 1);
        }
    }

    fn collect_leaves<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
        match &node.children {
            None => out.push(node),
            Some(children) => {
                for child in children.iter() {
                    if !child.particles.is_empty() {
                        collect_leaves(child, out);
                    }
                }
            }
        }
    }

    #[test]
    fn root_encloses_every_particle() {
        let store = ParticleStore::new(vec![
            particle(0, Vec3::new(0.1, 11.9, 5.0), 1.0),
            particle(1, Vec3::new(9.9, 0.2, 3.0), 1.0),
        ]);
        let tree = Tree::build(&store, 1000, 1);
        let half = tree.root.side / 2.0;
        for p in &store.particles {
            assert!((p.pos.x - tree.root.center.x).abs() <= half + 1e-9);
            assert!((p.pos.y - tree.root.center.y).abs() <= half + 1e-9);
            assert!((p.pos.z - tree.root.center.z).abs() <= half + 1e-9);
        }
    }
}
