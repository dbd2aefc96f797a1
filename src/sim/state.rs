//! Simulation state and node types
//!
//! One `SimulationState` owns the nodes of the topic currently on screen.
//! It is replaced wholesale when a new topic is shown.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::drag::DragState;
use super::hex::{HexLayout, HexSlot};
use crate::records::FlashcardRecord;
use crate::settings::LayoutSettings;

/// A flashcard node in the layout simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationNode {
    /// Index in the batch this node was created from
    pub id: usize,
    pub term: String,
    pub definition: String,
    pub importance: f32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Fixed at creation from importance
    pub radius: f32,
    pub is_expanded: bool,
    /// Set while a pointer holds the node; the integrator leaves it alone
    pub is_dragging: bool,
}

impl SimulationNode {
    pub fn new(id: usize, record: &FlashcardRecord, radius: f32, pos: Vec2) -> Self {
        Self {
            id,
            term: record.term.clone(),
            definition: record.definition.clone(),
            importance: record.importance,
            pos,
            vel: Vec2::ZERO,
            radius,
            is_expanded: false,
            is_dragging: false,
        }
    }

    /// Whether a point lies inside this node's circle
    pub fn contains(&self, point: Vec2) -> bool {
        self.pos.distance_squared(point) <= self.radius * self.radius
    }
}

/// The rectangle nodes are laid out in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamp a circle centre so the circle stays inside the viewport
    pub fn clamp_circle(&self, pos: Vec2, radius: f32) -> Vec2 {
        let mut out = pos;
        if out.x - radius < 0.0 {
            out.x = radius;
        }
        if out.x + radius > self.width {
            out.x = self.width - radius;
        }
        if out.y - radius < 0.0 {
            out.y = radius;
        }
        if out.y + radius > self.height {
            out.y = self.height - radius;
        }
        out
    }
}

/// All mutable layout state for one topic
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Nodes ordered by id
    pub nodes: Vec<SimulationNode>,
    pub viewport: Viewport,
    pub drag: DragState,
    /// Tie-break directions for coincident centres
    pub rng: Pcg32,
}

impl SimulationState {
    /// An empty state for the given viewport
    pub fn new(viewport: Viewport, seed: u64) -> Self {
        Self {
            nodes: Vec::new(),
            viewport,
            drag: DragState::Idle,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Build nodes from records, each starting on its hex slot
    pub fn from_records(records: &[FlashcardRecord], viewport: Viewport, settings: &LayoutSettings) -> Self {
        let mut state = Self::new(viewport, settings.collision_seed);

        let radii: Vec<f32> = records.iter().map(|r| settings.radius_for(r.importance)).collect();
        let slots = hex_slots_for(&radii, viewport, settings);

        state.nodes = records
            .iter()
            .zip(radii)
            .zip(&slots)
            .enumerate()
            .map(|(id, ((record, radius), slot))| SimulationNode::new(id, record, radius, slot.pos))
            .collect();

        state
    }

    /// Average radius over all nodes (0 when empty)
    pub fn average_radius(&self) -> f32 {
        average(self.nodes.iter().map(|n| n.radius))
    }

    /// Target slots for the current node set and viewport
    pub fn hex_slots(&self, settings: &LayoutSettings) -> Vec<HexSlot> {
        let radii: Vec<f32> = self.nodes.iter().map(|n| n.radius).collect();
        hex_slots_for(&radii, self.viewport, settings)
    }

    /// The expanded node, if any
    pub fn expanded(&self) -> Option<&SimulationNode> {
        self.nodes.iter().find(|n| n.is_expanded)
    }

    pub fn node(&self, id: usize) -> Option<&SimulationNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: usize) -> Option<&mut SimulationNode> {
        self.nodes.get_mut(id)
    }

    /// Flip a node's expansion, clearing any other expanded node first.
    ///
    /// Returns the node's new expansion state, or `None` for an unknown id.
    pub fn toggle_expansion(&mut self, id: usize) -> Option<bool> {
        if id >= self.nodes.len() {
            return None;
        }
        for node in self.nodes.iter_mut().filter(|n| n.id != id) {
            node.is_expanded = false;
        }
        let node = &mut self.nodes[id];
        node.is_expanded = !node.is_expanded;
        Some(node.is_expanded)
    }
}

fn hex_slots_for(radii: &[f32], viewport: Viewport, settings: &LayoutSettings) -> Vec<HexSlot> {
    let layout = HexLayout::new(settings.hex_spacing_factor, settings.max_rings);
    let avg = average(radii.iter().copied());
    layout.slots(radii.len(), viewport.width, viewport.height, avg)
}

fn average(values: impl ExactSizeIterator<Item = f32>) -> f32 {
    let len = values.len();
    if len == 0 {
        return 0.0;
    }
    values.sum::<f32>() / len as f32
}
