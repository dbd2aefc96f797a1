//! Layout engine
//!
//! Owns the simulation state for the topic on screen plus the render target
//! that displays it. The host drives it from its render loop: every
//! `start_simulation` hands out a new loop generation, and `frame` refuses to
//! run for any generation but the current one, so a replaced node set can
//! never be advanced by a stale loop.

use glam::Vec2;

use crate::records::FlashcardRecord;
use crate::renderer::{NodeTransform, RenderTarget};
use crate::settings::LayoutSettings;
use crate::sim::{self, AdvanceReport, SimulationNode, SimulationState, Viewport};

pub struct LayoutEngine<T: RenderTarget> {
    settings: LayoutSettings,
    state: SimulationState,
    target: T,
    /// Parallel to `state.nodes`
    handles: Vec<T::Handle>,
    running: bool,
    loop_generation: u64,
    last_frame_ms: Option<f64>,
}

impl<T: RenderTarget> LayoutEngine<T> {
    pub fn new(target: T, viewport: Viewport, settings: LayoutSettings) -> Self {
        let state = SimulationState::new(viewport, settings.collision_seed);
        Self {
            settings,
            state,
            target,
            handles: Vec::new(),
            running: false,
            loop_generation: 0,
            last_frame_ms: None,
        }
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Swap tuning parameters; node radii keep the values they were built with
    pub fn set_settings(&mut self, settings: LayoutSettings) {
        self.settings = settings;
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn nodes(&self) -> &[SimulationNode] {
        &self.state.nodes
    }

    pub fn node(&self, id: usize) -> Option<&SimulationNode> {
        self.state.node(id)
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn viewport(&self) -> Viewport {
        self.state.viewport
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Token of the current render loop
    pub fn loop_generation(&self) -> u64 {
        self.loop_generation
    }

    /// Replace the node set with one built from `records`.
    ///
    /// Stops the running loop, rebuilds every node on its hex slot, draws the
    /// initial positions and starts a fresh loop.
    pub fn create_nodes(&mut self, records: &[FlashcardRecord]) {
        self.stop_simulation();
        self.target.clear();

        let viewport = self.state.viewport;
        self.state = SimulationState::from_records(records, viewport, &self.settings);
        self.handles = self
            .state
            .nodes
            .iter()
            .map(|node| self.target.attach(node))
            .collect();

        log::info!(
            "Created {} nodes (average radius {:.1})",
            self.state.nodes.len(),
            self.state.average_radius()
        );

        self.render();
        self.start_simulation();
    }

    /// Start a new render loop, halting any previous one. Returns its token.
    pub fn start_simulation(&mut self) -> u64 {
        self.stop_simulation();
        self.running = true;
        self.loop_generation += 1;
        log::info!("Simulation started (loop {})", self.loop_generation);
        self.loop_generation
    }

    /// Halt the render loop. Idempotent.
    pub fn stop_simulation(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.loop_generation += 1;
        self.last_frame_ms = None;
        log::info!("Simulation stopped");
    }

    /// Stop and discard every node
    pub fn reset(&mut self) {
        self.stop_simulation();
        self.end_drag();
        self.target.clear();
        self.handles.clear();
        self.state.nodes.clear();
    }

    /// Flip expansion on a node, collapsing whichever node was expanded.
    ///
    /// Expanding restarts the loop if it was idle. Returns the node's new
    /// state, or `None` for an unknown id.
    pub fn toggle_expansion(&mut self, id: usize) -> Option<bool> {
        let previous = self.state.expanded().map(|n| n.id);
        let Some(expanded) = self.state.toggle_expansion(id) else {
            log::warn!("Toggle requested for unknown node {}", id);
            return None;
        };

        if let Some(prev) = previous.filter(|&p| p != id) {
            if let Some(handle) = self.handles.get(prev) {
                self.target.set_expanded(handle, false);
            }
        }
        if let Some(handle) = self.handles.get(id) {
            self.target.set_expanded(handle, expanded);
        }
        log::debug!("Node {} expanded: {}", id, expanded);

        if expanded && !self.running {
            self.start_simulation();
        }
        Some(expanded)
    }

    /// Collapse the expanded node, if any. Returns its id.
    pub fn collapse_expanded(&mut self) -> Option<usize> {
        let id = self.state.expanded()?.id;
        self.toggle_expansion(id);
        Some(id)
    }

    /// Reflect card selection on a node's visual
    pub fn mark_selected(&mut self, id: usize, selected: bool) {
        if let Some(handle) = self.handles.get(id) {
            self.target.set_selected(handle, selected);
        }
    }

    /// Topmost node under a point in viewport space
    pub fn node_at(&self, point: Vec2) -> Option<usize> {
        sim::node_at(&self.state, point)
    }

    pub fn begin_drag(&mut self, id: usize, pointer: Vec2) -> bool {
        sim::begin_drag(&mut self.state, id, pointer)
    }

    pub fn drag_to(&mut self, pointer: Vec2) {
        sim::drag_to(&mut self.state, pointer);
    }

    pub fn end_drag(&mut self) -> Option<usize> {
        sim::end_drag(&mut self.state)
    }

    pub fn is_dragging(&self) -> bool {
        self.state.drag.dragged_node().is_some()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.viewport = Viewport::new(width, height);
    }

    /// Advance by `dt` reference frames
    pub fn advance(&mut self, dt: f32) -> AdvanceReport {
        sim::advance(&mut self.state, dt, &self.settings)
    }

    /// Push every node's position and stacking order to the target
    pub fn render(&mut self) {
        for (node, handle) in self.state.nodes.iter().zip(&self.handles) {
            let transform = NodeTransform::for_node(node, &self.settings);
            self.target.apply_transform(handle, &transform);
        }
    }

    /// One render-loop tick at `timestamp_ms`.
    ///
    /// Returns `None` (and does nothing) when `generation` is not the current
    /// loop or the loop is stopped; the host should stop scheduling then.
    pub fn frame(&mut self, generation: u64, timestamp_ms: f64) -> Option<AdvanceReport> {
        if !self.running || generation != self.loop_generation {
            return None;
        }

        // First frame of a loop has no elapsed time
        let dt = self
            .last_frame_ms
            .map_or(0.0, |last| sim::normalize_frame_delta(timestamp_ms - last, &self.settings));
        self.last_frame_ms = Some(timestamp_ms);

        let report = self.advance(dt);
        self.render();
        Some(report)
    }
}
