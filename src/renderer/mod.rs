//! Render step
//!
//! One-way projection of node state onto visual handles. The engine only
//! writes through [`RenderTarget`]; nothing is read back.

#[cfg(target_arch = "wasm32")]
pub mod dom;

#[cfg(target_arch = "wasm32")]
pub use dom::DomTarget;

use crate::settings::LayoutSettings;
use crate::sim::SimulationNode;

/// Visual placement of one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    /// Top-left corner of the node's bounding square
    pub translate_x: f32,
    pub translate_y: f32,
    /// Stacking order
    pub z_index: i32,
}

impl NodeTransform {
    pub fn for_node(node: &SimulationNode, settings: &LayoutSettings) -> Self {
        Self {
            translate_x: node.pos.x - node.radius,
            translate_y: node.pos.y - node.radius,
            z_index: if node.is_expanded {
                settings.expanded_z_index
            } else {
                node.importance.round() as i32
            },
        }
    }

    /// CSS `transform` value
    pub fn css(&self) -> String {
        format!("translate({}px, {}px)", self.translate_x, self.translate_y)
    }
}

/// Something that can display nodes
pub trait RenderTarget {
    /// Per-node visual handle
    type Handle;

    /// Create the visual for a freshly built node
    fn attach(&mut self, node: &SimulationNode) -> Self::Handle;

    /// Write position and stacking order
    fn apply_transform(&mut self, handle: &Self::Handle, transform: &NodeTransform);

    /// Reflect a change in expansion (e.g. a CSS class)
    fn set_expanded(&mut self, handle: &Self::Handle, expanded: bool);

    /// Reflect whether the node is picked for a drill-down
    fn set_selected(&mut self, _handle: &Self::Handle, _selected: bool) {}

    /// Drop every visual created so far
    fn clear(&mut self);
}

/// Headless target that records what would have been drawn
#[derive(Debug, Clone, Default)]
pub struct RecordingTarget {
    /// Latest transform per handle
    pub transforms: Vec<Option<NodeTransform>>,
    /// Expansion flag per handle
    pub expanded: Vec<bool>,
    /// Selection flag per handle
    pub selected: Vec<bool>,
    /// Total transform writes
    pub writes: usize,
    /// Number of times visuals were cleared
    pub clears: usize,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform(&self, handle: usize) -> Option<NodeTransform> {
        self.transforms.get(handle).copied().flatten()
    }
}

impl RenderTarget for RecordingTarget {
    type Handle = usize;

    fn attach(&mut self, _node: &SimulationNode) -> usize {
        self.transforms.push(None);
        self.expanded.push(false);
        self.selected.push(false);
        self.transforms.len() - 1
    }

    fn apply_transform(&mut self, handle: &usize, transform: &NodeTransform) {
        if let Some(slot) = self.transforms.get_mut(*handle) {
            *slot = Some(*transform);
            self.writes += 1;
        }
    }

    fn set_expanded(&mut self, handle: &usize, expanded: bool) {
        if let Some(flag) = self.expanded.get_mut(*handle) {
            *flag = expanded;
        }
    }

    fn set_selected(&mut self, handle: &usize, selected: bool) {
        if let Some(flag) = self.selected.get_mut(*handle) {
            *flag = selected;
        }
    }

    fn clear(&mut self) {
        self.transforms.clear();
        self.expanded.clear();
        self.selected.clear();
        self.clears += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::FlashcardRecord;
    use glam::Vec2;

    fn node(importance: f32, expanded: bool) -> SimulationNode {
        let record = FlashcardRecord::new("Term", "Definition", importance);
        let mut node = SimulationNode::new(0, &record, 50.0, Vec2::new(200.0, 120.0));
        node.is_expanded = expanded;
        node
    }

    #[test]
    fn test_transform_offsets_by_radius() {
        let settings = LayoutSettings::default();
        let t = NodeTransform::for_node(&node(6.6, false), &settings);
        assert_eq!(t.translate_x, 150.0);
        assert_eq!(t.translate_y, 70.0);
        assert_eq!(t.z_index, 7);
        assert_eq!(t.css(), "translate(150px, 70px)");
    }

    #[test]
    fn test_expanded_is_on_top() {
        let settings = LayoutSettings::default();
        let t = NodeTransform::for_node(&node(10.0, true), &settings);
        assert_eq!(t.z_index, settings.expanded_z_index);
    }

    #[test]
    fn test_recording_target() {
        let mut target = RecordingTarget::new();
        let n = node(3.0, false);
        let h = target.attach(&n);
        assert_eq!(target.transform(h), None);

        let t = NodeTransform::for_node(&n, &LayoutSettings::default());
        target.apply_transform(&h, &t);
        target.set_expanded(&h, true);
        assert_eq!(target.transform(h), Some(t));
        assert!(target.expanded[h]);

        target.clear();
        assert_eq!(target.transform(h), None);
        assert_eq!(target.clears, 1);
    }
}
