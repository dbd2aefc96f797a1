//! Headless layout simulation
//!
//! Everything here is independent of rendering and the browser:
//! - Node state is owned by one `SimulationState`, never global
//! - Frame deltas are normalized to a 60 Hz reference frame
//! - Stable iteration order (by node id)
//! - Dragged nodes are only ever moved by the drag controller

pub mod collision;
pub mod drag;
pub mod hex;
pub mod state;
pub mod tick;

pub use collision::{has_overlap, resolve_overlaps};
pub use drag::{DragState, begin_drag, drag_to, end_drag, node_at};
pub use hex::{HexLayout, HexSlot, compute_hex_slots};
pub use state::{SimulationNode, SimulationState, Viewport};
pub use tick::{AdvanceReport, advance, normalize_frame_delta};
