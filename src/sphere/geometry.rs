//! One-time sphere geometry: Fibonacci node layout and proximity edges.
//!
//! Positions and edges are pure functions of the node count and threshold,
//! so a fresh activation always rebuilds the same lattice. Only the
//! per-node cosmetic attributes (pulse speed, color mix) come from the rng.

use std::f64::consts::PI;

use glam::DVec3;
use rand::Rng;

use crate::options::SphereOptions;

/// Angular step between consecutive Fibonacci-sphere points, `π(1 + √5)`.
/// Modulo a full turn this is the golden angle `π(3 − √5)` taken the other
/// way round, so the spiral winds toward −z.
pub fn golden_angle() -> f64 {
    PI * (1.0 + 5.0_f64.sqrt())
}

/// A sphere node. Immutable for the lifetime of the scene; its pulse phase
/// lives in the simulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    /// Position on the unit sphere.
    pub position: DVec3,
    /// Pulse phase increment per frame, in radians.
    pub pulse_speed: f64,
    /// Blend factor between the primary and secondary palette colors.
    pub color_mix: f64,
}

/// An undirected edge between two node indices, always `i < j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    /// Lower node index.
    pub i: usize,
    /// Higher node index.
    pub j: usize,
}

/// Deterministic low-discrepancy placement of `n` points on the unit
/// sphere. Identical `n` always yields bit-identical coordinates.
#[must_use]
pub fn generate_sphere_nodes(n: usize) -> Vec<DVec3> {
    let golden = golden_angle();
    let count = n as f64;
    (0..n)
        .map(|i| {
            let k = i as f64;
            let phi = (1.0 - 2.0 * (k + 0.5) / count).acos();
            let theta = golden * k;
            DVec3::new(
                phi.sin() * theta.cos(),
                phi.cos(),
                phi.sin() * theta.sin(),
            )
        })
        .collect()
}

/// Every unordered pair whose squared distance is below `threshold_sq`.
///
/// O(n²); runs once per activation.
#[must_use]
pub fn build_edges(positions: &[DVec3], threshold_sq: f64) -> Vec<Edge> {
    let mut edges = Vec::new();
    for (i, a) in positions.iter().enumerate() {
        for (offset, b) in positions[i + 1..].iter().enumerate() {
            if a.distance_squared(*b) < threshold_sq {
                edges.push(Edge {
                    i,
                    j: i + 1 + offset,
                });
            }
        }
    }
    edges
}

/// Nodes and edges of one sphere activation.
#[derive(Debug, Clone)]
pub struct SphereGeometry {
    /// Nodes in Fibonacci order.
    pub nodes: Vec<Node>,
    /// Proximity edges, sorted by `(i, j)`.
    pub edges: Vec<Edge>,
}

impl SphereGeometry {
    /// Lay out the sphere and decorate each node with random pulse speed
    /// and color mix.
    pub fn generate(options: &SphereOptions, rng: &mut impl Rng) -> Self {
        let positions = generate_sphere_nodes(options.node_count);
        let edges = build_edges(&positions, options.edge_threshold_sq);
        let nodes = positions
            .into_iter()
            .map(|position| Node {
                position,
                pulse_speed: options.pulse_speed_min
                    + rng.random::<f64>() * options.pulse_speed_jitter,
                color_mix: rng.random::<f64>(),
            })
            .collect();
        Self { nodes, edges }
    }

    /// Mean number of edges per node.
    #[must_use]
    pub fn mean_degree(&self) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        2.0 * self.edges.len() as f64 / self.nodes.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    const GOLDEN_EDGES: &str =
        include_str!("../../assets/fixtures/sphere_edges_n88.txt");

    fn golden_edges() -> Vec<Edge> {
        GOLDEN_EDGES
            .lines()
            .filter(|l| !l.starts_with('#') && !l.trim().is_empty())
            .map(|l| {
                let mut parts =
                    l.split_whitespace().map(|p| p.parse::<usize>().unwrap());
                Edge {
                    i: parts.next().unwrap(),
                    j: parts.next().unwrap(),
                }
            })
            .collect()
    }

    #[test]
    fn nodes_lie_on_the_unit_sphere() {
        for n in [1, 2, 3, 17, 88, 500] {
            for p in generate_sphere_nodes(n) {
                assert!(
                    (p.length() - 1.0).abs() < 1e-12,
                    "n = {n}: |p| = {}",
                    p.length()
                );
            }
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate_sphere_nodes(88);
        let b = generate_sphere_nodes(88);
        assert_eq!(a, b);
    }

    #[test]
    fn single_node_sits_on_the_equator() {
        let nodes = generate_sphere_nodes(1);
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].y.abs() < 1e-12);
    }

    #[test]
    fn latitudes_are_evenly_spaced() {
        let nodes = generate_sphere_nodes(10);
        let ys: Vec<f64> = nodes.iter().map(|p| p.y).collect();
        for pair in ys.windows(2) {
            assert!((pair[0] - pair[1] - 0.2).abs() < 1e-12);
        }
    }

    #[test]
    fn edges_have_no_self_loops_or_duplicates() {
        let edges = build_edges(&generate_sphere_nodes(150), 0.15);
        let mut seen = HashSet::new();
        for e in &edges {
            assert!(e.i < e.j, "edge {e:?} is not ordered");
            assert!(seen.insert((e.i, e.j)));
            assert!(!seen.contains(&(e.j, e.i)));
        }
    }

    #[test]
    fn zero_threshold_builds_no_edges() {
        assert!(build_edges(&generate_sphere_nodes(30), 0.0).is_empty());
    }

    #[test]
    fn spiral_winds_toward_negative_z() {
        let nodes = generate_sphere_nodes(88);
        let second = nodes[1];
        assert!((second.x - -0.190_891_157).abs() < 1e-6);
        assert!((second.y - 0.965_909_091).abs() < 1e-6);
        assert!((second.z - -0.174_871_937).abs() < 1e-6);

        // Same lattice as the golden angle turned the other way, mirrored in z.
        let step = PI * (3.0 - 5.0_f64.sqrt());
        for (k, node) in nodes.iter().enumerate() {
            let theta = step * k as f64;
            let phi = node.y.acos();
            assert!((node.x - phi.sin() * theta.cos()).abs() < 1e-9);
            assert!((node.z + phi.sin() * theta.sin()).abs() < 1e-9);
        }
    }

    #[test]
    fn golden_edge_set_for_88_nodes() {
        let edges = build_edges(&generate_sphere_nodes(88), 0.22);
        assert_eq!(edges.len(), 189);
        assert_eq!(edges, golden_edges());
    }

    #[test]
    fn degree_stays_small() {
        let mut rng = StdRng::seed_from_u64(1);
        let geometry = SphereGeometry::generate(&SphereOptions::default(), &mut rng);
        let mut degree = vec![0_usize; geometry.nodes.len()];
        for e in &geometry.edges {
            degree[e.i] += 1;
            degree[e.j] += 1;
        }
        assert!(degree.iter().all(|&d| (1..=8).contains(&d)));
        assert!((geometry.mean_degree() - 378.0 / 88.0).abs() < 1e-12);
    }

    #[test]
    fn random_attributes_do_not_move_nodes() {
        let options = SphereOptions::default();
        let a = SphereGeometry::generate(&options, &mut StdRng::seed_from_u64(1));
        let b = SphereGeometry::generate(&options, &mut StdRng::seed_from_u64(2));
        for (na, nb) in a.nodes.iter().zip(&b.nodes) {
            assert_eq!(na.position, nb.position);
            assert!((0.0..1.0).contains(&na.color_mix));
            assert!(na.pulse_speed >= options.pulse_speed_min);
            assert!(
                na.pulse_speed
                    < options.pulse_speed_min + options.pulse_speed_jitter
            );
        }
        assert_eq!(a.edges, b.edges);
    }
}
