//! Per-frame layout update
//!
//! Springs every free node toward its target (hex slot, or the viewport
//! centre when expanded), separates overlaps, then keeps nodes on screen.

use glam::Vec2;

use super::collision::{has_overlap, resolve_overlaps};
use super::state::{SimulationNode, SimulationState, Viewport};
use crate::settings::LayoutSettings;

/// What happened during one `advance`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// The overlap scan found a pair and the resolver ran
    pub collisions_resolved: bool,
    /// Every free node sits on its target
    pub settled: bool,
}

/// Convert elapsed milliseconds to reference frames (1.0 = one 60 Hz frame),
/// clamped to `[0, max_frame_delta]`
pub fn normalize_frame_delta(elapsed_ms: f64, settings: &LayoutSettings) -> f32 {
    let frames = (elapsed_ms / settings.reference_frame_ms) as f32;
    if !frames.is_finite() {
        return 0.0;
    }
    frames.clamp(0.0, settings.max_frame_delta)
}

/// Advance the layout by `dt` reference frames.
///
/// Dragged nodes are never written here.
pub fn advance(state: &mut SimulationState, dt: f32, settings: &LayoutSettings) -> AdvanceReport {
    if state.nodes.is_empty() {
        return AdvanceReport {
            collisions_resolved: false,
            settled: true,
        };
    }

    let dt = dt.clamp(0.0, settings.max_frame_delta);
    let slots = state.hex_slots(settings);
    let center = state.viewport.center();
    let mut settled = true;

    for (node, slot) in state.nodes.iter_mut().zip(&slots) {
        if node.is_dragging {
            continue;
        }
        let target = if node.is_expanded { center } else { slot.pos };
        settled &= step_toward(node, target, dt, settings);
    }

    let collisions_resolved = has_overlap(&state.nodes, settings.overlap_probe_buffer);
    if collisions_resolved {
        resolve_overlaps(
            &mut state.nodes,
            settings.collision_buffer,
            settings.separation_factor,
            &mut state.rng,
        );
    }

    let viewport = state.viewport;
    for node in state.nodes.iter_mut().filter(|n| !n.is_dragging) {
        contain(node, viewport, settings.boundary_bounce);
    }

    AdvanceReport {
        collisions_resolved,
        settled: settled && !collisions_resolved,
    }
}

/// Spring-damper step toward `target`. Returns true once snapped.
fn step_toward(node: &mut SimulationNode, target: Vec2, dt: f32, settings: &LayoutSettings) -> bool {
    if settings.reduced_motion {
        node.pos = target;
        node.vel = Vec2::ZERO;
        return true;
    }

    if node.pos.distance(target) > settings.snap_threshold {
        let spring = settings.spring_for(node.is_expanded);
        node.vel += (target - node.pos) * spring * dt;
        node.vel *= settings.damping;
        node.pos += node.vel * dt;
        false
    } else {
        // Snap to avoid micro-jitter once converged
        node.pos = target;
        node.vel *= settings.snap_velocity_decay;
        true
    }
}

/// Keep the node's circle inside the viewport, bouncing softly off edges
fn contain(node: &mut SimulationNode, viewport: Viewport, bounce: f32) {
    let clamped = viewport.clamp_circle(node.pos, node.radius);
    if clamped.x != node.pos.x {
        node.vel.x *= bounce;
    }
    if clamped.y != node.pos.y {
        node.vel.y *= bounce;
    }
    node.pos = clamped;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::FlashcardRecord;
    use crate::sim::drag::{begin_drag, drag_to};
    use proptest::prelude::*;

    fn records(importances: &[f32]) -> Vec<FlashcardRecord> {
        importances
            .iter()
            .enumerate()
            .map(|(i, &imp)| FlashcardRecord::new(format!("T{}", i), "d", imp))
            .collect()
    }

    fn state(importances: &[f32], width: f32, height: f32) -> SimulationState {
        SimulationState::from_records(
            &records(importances),
            Viewport::new(width, height),
            &LayoutSettings::default(),
        )
    }

    #[test]
    fn test_frame_delta_normalization() {
        let settings = LayoutSettings::default();
        assert!((normalize_frame_delta(16.67, &settings) - 1.0).abs() < 1e-6);
        assert!((normalize_frame_delta(8.335, &settings) - 0.5).abs() < 1e-6);
        assert_eq!(normalize_frame_delta(250.0, &settings), 2.0);
        assert_eq!(normalize_frame_delta(-10.0, &settings), 0.0);
        assert_eq!(normalize_frame_delta(f64::NAN, &settings), 0.0);
    }

    #[test]
    fn test_empty_state_is_noop() {
        let mut s = SimulationState::new(Viewport::new(800.0, 600.0), 1);
        let report = advance(&mut s, 1.0, &LayoutSettings::default());
        assert!(report.settled);
        assert!(!report.collisions_resolved);
    }

    #[test]
    fn test_initial_layout_is_settled() {
        let mut s = state(&[5.0; 7], 1600.0, 1200.0);
        let before = s.nodes.clone();
        let report = advance(&mut s, 1.0, &LayoutSettings::default());
        assert!(report.settled);
        assert_eq!(s.nodes, before);
    }

    #[test]
    fn test_spring_step() {
        let settings = LayoutSettings::default();
        let mut s = state(&[1.0], 800.0, 600.0);
        s.nodes[0].pos = Vec2::new(300.0, 300.0);

        advance(&mut s, 1.0, &settings);

        // vel = (100 * 0.08) * 0.92 = 7.36 toward the centre at x=400
        let node = &s.nodes[0];
        assert!((node.vel.x - 7.36).abs() < 1e-4);
        assert!((node.pos.x - 307.36).abs() < 1e-3);
        assert_eq!(node.pos.y, 300.0);
    }

    #[test]
    fn test_snap_within_threshold() {
        let settings = LayoutSettings::default();
        let mut s = state(&[1.0], 800.0, 600.0);
        s.nodes[0].pos = Vec2::new(400.5, 300.0);
        s.nodes[0].vel = Vec2::new(1.0, 0.0);

        advance(&mut s, 1.0, &settings);

        assert_eq!(s.nodes[0].pos, Vec2::new(400.0, 300.0));
        assert!((s.nodes[0].vel.x - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_expanded_node_pulled_to_center_harder() {
        let settings = LayoutSettings::default();
        let mut s = state(&[1.0, 1.0], 2000.0, 2000.0);
        let center = s.viewport.center();
        // Node 1 sits on its ring slot; expanding it targets the centre
        s.nodes[0].pos = Vec2::new(200.0, 200.0);
        s.nodes[1].is_expanded = true;
        let start = s.nodes[1].pos;

        advance(&mut s, 1.0, &settings);

        let expected = (center - start) * 0.32 * 0.92;
        assert!((s.nodes[1].vel - expected).length() < 1e-3);
    }

    #[test]
    fn test_boundary_bounce() {
        let settings = LayoutSettings::default();
        let mut s = state(&[1.0], 800.0, 600.0);
        s.nodes[0].pos = Vec2::new(30.0, 300.0);
        s.nodes[0].vel = Vec2::new(-50.0, 0.0);

        advance(&mut s, 1.0, &settings);

        assert_eq!(s.nodes[0].pos.x, 45.0);
        assert!(s.nodes[0].vel.x > 0.0, "velocity should reverse on the wall");
    }

    #[test]
    fn test_reduced_motion_jumps_to_target() {
        let settings = LayoutSettings {
            reduced_motion: true,
            ..Default::default()
        };
        let mut s = state(&[1.0], 800.0, 600.0);
        s.nodes[0].pos = Vec2::new(100.0, 100.0);
        let report = advance(&mut s, 1.0, &settings);
        assert!(report.settled);
        assert_eq!(s.nodes[0].pos, Vec2::new(400.0, 300.0));
        assert_eq!(s.nodes[0].vel, Vec2::ZERO);
    }

    #[test]
    fn test_collisions_resolved_when_overlapping() {
        let settings = LayoutSettings::default();
        let mut s = state(&[5.0, 5.0, 5.0], 1600.0, 1200.0);
        s.nodes[2].pos = s.nodes[1].pos + Vec2::new(10.0, 0.0);
        let report = advance(&mut s, 1.0, &settings);
        assert!(report.collisions_resolved);
        assert!(!report.settled);
    }

    proptest! {
        #[test]
        fn dragged_node_is_frozen(
            frames in 1usize..60,
            dt in 0.0f32..3.0,
            px in 0.0f32..1200.0,
            py in 0.0f32..900.0,
        ) {
            let settings = LayoutSettings::default();
            let mut s = state(&[3.0, 7.0, 10.0, 1.0, 5.0], 1200.0, 900.0);
            let grab = s.nodes[2].pos;
            begin_drag(&mut s, 2, grab);
            drag_to(&mut s, Vec2::new(px, py));
            s.nodes[2].vel = Vec2::new(3.0, -2.0);
            let held = s.nodes[2].clone();

            for _ in 0..frames {
                advance(&mut s, dt, &settings);
                prop_assert_eq!(s.nodes[2].pos, held.pos);
                prop_assert_eq!(s.nodes[2].vel, held.vel);
            }
        }

        #[test]
        fn nodes_stay_inside_viewport(
            frames in 1usize..40,
            dt in 0.0f32..3.0,
            offsets in proptest::collection::vec((-400.0f32..400.0, -400.0f32..400.0), 6),
            importances in proptest::collection::vec(1.0f32..10.0, 6),
        ) {
            let settings = LayoutSettings::default();
            let mut s = state(&importances, 1400.0, 1000.0);
            for (node, (dx, dy)) in s.nodes.iter_mut().zip(offsets) {
                node.pos += Vec2::new(dx, dy);
            }

            for _ in 0..frames {
                advance(&mut s, dt, &settings);
                for node in &s.nodes {
                    prop_assert!(node.pos.x >= node.radius && node.pos.x <= 1400.0 - node.radius);
                    prop_assert!(node.pos.y >= node.radius && node.pos.y <= 1000.0 - node.radius);
                }
            }
        }
    }
}
