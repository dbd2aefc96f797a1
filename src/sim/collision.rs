//! Overlap detection and positional correction between nodes
//!
//! One relaxation pass per frame: each overlapping pair is pushed apart by a
//! fraction of its overlap. Repeated frames converge the layout; a single
//! pass does not guarantee zero overlap.

use glam::Vec2;
use rand::Rng;

use super::state::SimulationNode;

/// Cheap scan: does any pair sit closer than the sum of radii plus `buffer`?
pub fn has_overlap(nodes: &[SimulationNode], buffer: f32) -> bool {
    nodes.iter().enumerate().any(|(i, a)| {
        nodes[i + 1..].iter().any(|b| {
            let min_distance = a.radius + b.radius + buffer;
            a.pos.distance_squared(b.pos) < min_distance * min_distance
        })
    })
}

/// Separation applied to one pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairCorrection {
    /// Added to the first node's position
    pub first: Vec2,
    /// Added to the second node's position
    pub second: Vec2,
}

/// Correction for a pair, or `None` if they are far enough apart.
///
/// `tie_break` supplies a unit direction when the centres coincide.
pub fn pair_correction(
    a: &SimulationNode,
    b: &SimulationNode,
    buffer: f32,
    separation_factor: f32,
    tie_break: impl FnOnce() -> Vec2,
) -> Option<PairCorrection> {
    let delta = a.pos - b.pos;
    let raw_distance = delta.length();
    let min_distance = a.radius + b.radius + buffer;
    if raw_distance >= min_distance {
        return None;
    }

    // Coincident centres: unit distance, arbitrary direction
    let (distance, direction) = if raw_distance == 0.0 {
        (1.0, tie_break())
    } else {
        (raw_distance, delta / raw_distance)
    };

    let overlap = min_distance - distance;
    let offset = direction * overlap * separation_factor;

    match (a.is_expanded, b.is_expanded) {
        (false, false) => Some(PairCorrection {
            first: offset / 2.0,
            second: -offset / 2.0,
        }),
        // Expanded node holds its ground
        (true, false) => Some(PairCorrection {
            first: Vec2::ZERO,
            second: -offset,
        }),
        (false, true) => Some(PairCorrection {
            first: offset,
            second: Vec2::ZERO,
        }),
        (true, true) => {
            log::warn!("Nodes {} and {} are both expanded; skipping", a.id, b.id);
            None
        }
    }
}

/// Push overlapping pairs apart. Moves positions only; velocities are untouched
/// and pairs involving a dragged node are skipped.
pub fn resolve_overlaps(
    nodes: &mut [SimulationNode],
    buffer: f32,
    separation_factor: f32,
    rng: &mut impl Rng,
) {
    for i in 0..nodes.len() {
        let (head, tail) = nodes.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if a.is_dragging || b.is_dragging {
                continue;
            }

            let correction = pair_correction(a, b, buffer, separation_factor, || {
                let theta = rng.random_range(0.0..std::f32::consts::TAU);
                Vec2::from_angle(theta)
            });

            if let Some(c) = correction {
                a.pos += c.first;
                b.pos += c.second;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::FlashcardRecord;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn node(id: usize, x: f32, y: f32, radius: f32) -> SimulationNode {
        let record = FlashcardRecord::new(format!("N{}", id), "d", 5.0);
        SimulationNode::new(id, &record, radius, Vec2::new(x, y))
    }

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_separated_nodes_untouched() {
        let mut nodes = vec![node(0, 0.0, 0.0, 10.0), node(1, 100.0, 0.0, 10.0)];
        let before = nodes.clone();
        resolve_overlaps(&mut nodes, 5.0, 0.6, &mut rng());
        assert_eq!(nodes, before);
        assert!(!has_overlap(&nodes, 3.0));
    }

    #[test]
    fn test_symmetric_push() {
        let mut nodes = vec![node(0, 0.0, 0.0, 10.0), node(1, 15.0, 0.0, 10.0)];
        resolve_overlaps(&mut nodes, 5.0, 0.6, &mut rng());

        // overlap = 25 - 15 = 10, scaled 6, split 3 each way
        assert!((nodes[0].pos.x - -3.0).abs() < 1e-4);
        assert!((nodes[1].pos.x - 18.0).abs() < 1e-4);
        assert_eq!(nodes[0].pos.y, 0.0);
    }

    #[test]
    fn test_expanded_node_is_dominant() {
        let mut nodes = vec![node(0, 0.0, 0.0, 10.0), node(1, 15.0, 0.0, 10.0)];
        nodes[0].is_expanded = true;
        resolve_overlaps(&mut nodes, 5.0, 0.6, &mut rng());

        assert_eq!(nodes[0].pos, Vec2::ZERO);
        assert!((nodes[1].pos.x - 21.0).abs() < 1e-4);

        let mut nodes = vec![node(0, 0.0, 0.0, 10.0), node(1, 15.0, 0.0, 10.0)];
        nodes[1].is_expanded = true;
        resolve_overlaps(&mut nodes, 5.0, 0.6, &mut rng());
        assert_eq!(nodes[1].pos, Vec2::new(15.0, 0.0));
        assert!((nodes[0].pos.x - -6.0).abs() < 1e-4);
    }

    #[test]
    fn test_both_expanded_is_noop() {
        let mut nodes = vec![node(0, 0.0, 0.0, 10.0), node(1, 15.0, 0.0, 10.0)];
        nodes[0].is_expanded = true;
        nodes[1].is_expanded = true;
        let before = nodes.clone();
        resolve_overlaps(&mut nodes, 5.0, 0.6, &mut rng());
        assert_eq!(nodes, before);
    }

    #[test]
    fn test_dragged_pair_skipped() {
        let mut nodes = vec![node(0, 0.0, 0.0, 10.0), node(1, 5.0, 0.0, 10.0)];
        nodes[1].is_dragging = true;
        let before = nodes.clone();
        resolve_overlaps(&mut nodes, 5.0, 0.6, &mut rng());
        assert_eq!(nodes, before);
    }

    #[test]
    fn test_coincident_nodes_separate() {
        let mut nodes = vec![node(0, 50.0, 50.0, 10.0), node(1, 50.0, 50.0, 10.0)];
        resolve_overlaps(&mut nodes, 5.0, 0.6, &mut rng());
        let distance = nodes[0].pos.distance(nodes[1].pos);
        assert!(distance > 0.0);
        // (25 - 1) * 0.6 along a unit direction
        assert!((distance - 14.4).abs() < 1e-3);
    }

    #[test]
    fn test_velocity_untouched() {
        let mut nodes = vec![node(0, 0.0, 0.0, 10.0), node(1, 1.0, 0.0, 10.0)];
        nodes[0].vel = Vec2::new(2.0, -1.0);
        resolve_overlaps(&mut nodes, 5.0, 0.6, &mut rng());
        assert_eq!(nodes[0].vel, Vec2::new(2.0, -1.0));
        assert_eq!(nodes[1].vel, Vec2::ZERO);
    }

    #[test]
    fn test_has_overlap_uses_buffer() {
        let nodes = vec![node(0, 0.0, 0.0, 10.0), node(1, 22.0, 0.0, 10.0)];
        assert!(has_overlap(&nodes, 3.0));
        assert!(!has_overlap(&nodes, 1.0));
        assert!(!has_overlap(&[], 3.0));
    }

    proptest! {
        #[test]
        fn one_pass_never_reduces_separation(
            ax in -200.0f32..200.0, ay in -200.0f32..200.0,
            bx in -200.0f32..200.0, by in -200.0f32..200.0,
            ra in 5.0f32..90.0, rb in 5.0f32..90.0,
        ) {
            let mut nodes = vec![node(0, ax, ay, ra), node(1, bx, by, rb)];
            let before = nodes[0].pos.distance(nodes[1].pos);
            let threshold = ra + rb + 5.0;
            prop_assume!(before > 0.0 && (before >= threshold || before < threshold - 0.01));
            resolve_overlaps(&mut nodes, 5.0, 0.6, &mut rng());
            let after = nodes[0].pos.distance(nodes[1].pos);

            if before >= threshold {
                prop_assert_eq!(after, before);
            } else {
                prop_assert!(after > before);
            }
        }
    }
}
