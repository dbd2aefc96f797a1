//! Flashcard Explorer - hexagonal flashcard layout for the browser
//!
//! Core modules:
//! - `sim`: Headless layout simulation (hex placement, springs, collisions, drag)
//! - `renderer`: Projection of node state onto visual handles
//! - `engine`: Node factory, expansion toggle and render-loop bookkeeping
//! - `explorer`: Topic history and card selection around the engine
//! - `records`: Flashcard records as produced by the generation service
//! - `settings`: Tunable layout parameters

pub mod engine;
pub mod explorer;
pub mod records;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use engine::LayoutEngine;
pub use explorer::{ExplorerSession, History, Selection};
pub use records::{FlashcardRecord, RecordError, parse_records};
pub use settings::LayoutSettings;

use glam::Vec2;

/// Layout defaults
pub mod consts {
    /// Radius of an importance-1 node
    pub const MIN_NODE_RADIUS: f32 = 45.0;
    /// Radius of an importance-10 node
    pub const MAX_NODE_RADIUS: f32 = 90.0;

    /// Importance range reported by the generation service
    pub const MIN_IMPORTANCE: f32 = 1.0;
    pub const MAX_IMPORTANCE: f32 = 10.0;

    /// Spring pull toward the target slot, per reference frame
    pub const SPRING_CONSTANT: f32 = 0.08;
    /// Expanded nodes are pulled to the centre this much harder
    pub const EXPANDED_SPRING_MULTIPLIER: f32 = 4.0;
    /// Velocity kept after each frame
    pub const DAMPING: f32 = 0.92;
    /// Below this distance a node snaps onto its target
    pub const SNAP_THRESHOLD: f32 = 1.0;
    /// Residual velocity decay once snapped
    pub const SNAP_VELOCITY_DECAY: f32 = 0.8;

    /// Gap kept between resolved circles
    pub const COLLISION_BUFFER: f32 = 5.0;
    /// Gap used by the cheap overlap scan before resolving
    pub const OVERLAP_PROBE_BUFFER: f32 = 3.0;
    /// Fraction of the overlap corrected per pass
    pub const SEPARATION_FACTOR: f32 = 0.6;

    /// Velocity multiplier applied when a node hits the viewport edge
    pub const BOUNDARY_BOUNCE: f32 = -0.3;

    /// Ring spacing as a multiple of the average node radius
    pub const HEX_SPACING_FACTOR: f32 = 2.2;
    /// Hexagonal rings generated around the centre slot
    pub const MAX_HEX_RINGS: u32 = 9;

    /// Duration of one frame at the 60 Hz reference rate (ms)
    pub const REFERENCE_FRAME_MS: f64 = 16.67;
    /// Upper bound on the normalized frame delta
    pub const MAX_FRAME_DELTA: f32 = 2.0;

    /// Stacking order of the expanded node
    pub const EXPANDED_Z_INDEX: i32 = 100;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
