//! Pointer drag state machine
//!
//! While a node is held it is outside the integrator's authority: its
//! position follows the pointer (minus the grab offset) and nothing else
//! writes its kinematic fields. Single pointer only.

use glam::Vec2;

use super::state::SimulationState;

/// Current drag interaction
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        node: usize,
        /// Pointer position minus node centre at grab time
        offset: Vec2,
    },
}

impl DragState {
    pub fn dragged_node(&self) -> Option<usize> {
        match *self {
            DragState::Dragging { node, .. } => Some(node),
            DragState::Idle => None,
        }
    }
}

/// Topmost node under a pointer: the expanded node wins, then the most
/// important (drawn above the others), then the highest id.
pub fn node_at(state: &SimulationState, pointer: Vec2) -> Option<usize> {
    state
        .nodes
        .iter()
        .filter(|n| n.contains(pointer))
        .max_by(|a, b| {
            a.is_expanded
                .cmp(&b.is_expanded)
                .then(a.importance.round().total_cmp(&b.importance.round()))
                .then(a.id.cmp(&b.id))
        })
        .map(|n| n.id)
}

/// Pointer down on a node: take it out of the simulation.
///
/// Returns false for an unknown id. A drag already in progress is released
/// first.
pub fn begin_drag(state: &mut SimulationState, node_id: usize, pointer: Vec2) -> bool {
    if node_id >= state.nodes.len() {
        log::warn!("Drag requested for unknown node {}", node_id);
        return false;
    }
    end_drag(state);

    let node = &mut state.nodes[node_id];
    node.is_dragging = true;
    node.vel = Vec2::ZERO;
    let offset = pointer - node.pos;
    state.drag = DragState::Dragging {
        node: node_id,
        offset,
    };
    log::debug!("Drag start on node {} ('{}')", node_id, node.term);
    true
}

/// Pointer move: place the held node under the pointer, kept inside the
/// viewport. No-op when idle.
pub fn drag_to(state: &mut SimulationState, pointer: Vec2) {
    let DragState::Dragging { node, offset } = state.drag else {
        return;
    };
    let viewport = state.viewport;
    if let Some(n) = state.nodes.get_mut(node) {
        n.pos = viewport.clamp_circle(pointer - offset, n.radius);
    }
}

/// Pointer up/leave: hand the node back to the integrator.
///
/// Returns the released node id, if a drag was active.
pub fn end_drag(state: &mut SimulationState) -> Option<usize> {
    let released = state.drag.dragged_node();
    if let Some(id) = released {
        if let Some(node) = state.nodes.get_mut(id) {
            node.is_dragging = false;
        }
        log::debug!("Drag end on node {}", id);
    }
    state.drag = DragState::Idle;
    released
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::FlashcardRecord;
    use crate::settings::LayoutSettings;
    use crate::sim::state::Viewport;

    fn state(count: usize) -> SimulationState {
        let records: Vec<_> = (0..count)
            .map(|i| FlashcardRecord::new(format!("T{}", i), "d", 5.0))
            .collect();
        SimulationState::from_records(&records, Viewport::new(1000.0, 800.0), &LayoutSettings::default())
    }

    #[test]
    fn test_grab_keeps_offset() {
        let mut s = state(3);
        s.nodes[1].vel = Vec2::new(4.0, 4.0);
        let start = s.nodes[1].pos;

        assert!(begin_drag(&mut s, 1, start + Vec2::new(10.0, -5.0)));
        assert!(s.nodes[1].is_dragging);
        assert_eq!(s.nodes[1].vel, Vec2::ZERO);
        assert_eq!(s.nodes[1].pos, start);

        drag_to(&mut s, Vec2::new(310.0, 295.0));
        assert_eq!(s.nodes[1].pos, Vec2::new(300.0, 300.0));

        assert_eq!(end_drag(&mut s), Some(1));
        assert!(!s.nodes[1].is_dragging);
        assert_eq!(s.drag, DragState::Idle);
    }

    #[test]
    fn test_drag_clamped_to_viewport() {
        let mut s = state(1);
        let pos = s.nodes[0].pos;
        begin_drag(&mut s, 0, pos);
        drag_to(&mut s, Vec2::new(-500.0, 5000.0));
        let r = s.nodes[0].radius;
        assert_eq!(s.nodes[0].pos, Vec2::new(r, 800.0 - r));
    }

    #[test]
    fn test_single_drag_at_a_time() {
        let mut s = state(3);
        let p0 = s.nodes[0].pos;
        let p2 = s.nodes[2].pos;
        begin_drag(&mut s, 0, p0);
        begin_drag(&mut s, 2, p2);
        assert!(!s.nodes[0].is_dragging);
        assert!(s.nodes[2].is_dragging);
        assert_eq!(s.drag.dragged_node(), Some(2));
    }

    #[test]
    fn test_idle_moves_are_ignored() {
        let mut s = state(2);
        let before = s.nodes.clone();
        drag_to(&mut s, Vec2::new(1.0, 1.0));
        assert_eq!(end_drag(&mut s), None);
        assert_eq!(s.nodes, before);
    }

    #[test]
    fn test_unknown_node() {
        let mut s = state(1);
        assert!(!begin_drag(&mut s, 5, Vec2::ZERO));
        assert_eq!(s.drag, DragState::Idle);
    }

    #[test]
    fn test_node_at() {
        let mut s = state(7);
        let center = s.nodes[0].pos;
        assert_eq!(node_at(&s, center), Some(0));
        assert_eq!(node_at(&s, Vec2::new(1.0, 1.0)), None);

        // Overlapping: expanded node is on top
        s.nodes[3].pos = center;
        assert_eq!(node_at(&s, center), Some(3));
        s.nodes[0].is_expanded = true;
        assert_eq!(node_at(&s, center), Some(0));
    }
}
