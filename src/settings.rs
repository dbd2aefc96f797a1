//! Layout settings
//!
//! Physics tuning for the flashcard layout. Persisted in LocalStorage so a
//! tweaked feel survives reloads.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunable layout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    // === Node sizing ===
    /// Radius of an importance-1 node
    pub min_radius: f32,
    /// Radius of an importance-10 node
    pub max_radius: f32,

    // === Spring-damper ===
    pub spring_constant: f32,
    /// Spring multiplier for the expanded node (pulled to the centre)
    pub expanded_spring_multiplier: f32,
    /// Velocity kept per frame (0-1)
    pub damping: f32,
    /// Distance under which a node snaps onto its target
    pub snap_threshold: f32,
    /// Residual velocity kept per frame once snapped
    pub snap_velocity_decay: f32,

    // === Collisions ===
    /// Gap kept between resolved circles
    pub collision_buffer: f32,
    /// Gap used by the overlap scan that gates the resolver
    pub overlap_probe_buffer: f32,
    /// Fraction of the overlap corrected per pass
    pub separation_factor: f32,
    /// Seed for the coincident-centre tie break
    pub collision_seed: u64,

    // === Boundary ===
    /// Velocity multiplier on wall contact (negative = bounce)
    pub boundary_bounce: f32,

    // === Hex layout ===
    /// Ring spacing as a multiple of the average radius
    pub hex_spacing_factor: f32,
    pub max_rings: u32,

    // === Frame pacing ===
    /// Duration of one reference frame (ms)
    pub reference_frame_ms: f64,
    /// Upper bound on the normalized frame delta
    pub max_frame_delta: f32,

    // === Rendering ===
    pub expanded_z_index: i32,

    // === Accessibility ===
    /// Skip spring animation and place nodes directly on their targets
    pub reduced_motion: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            min_radius: MIN_NODE_RADIUS,
            max_radius: MAX_NODE_RADIUS,

            spring_constant: SPRING_CONSTANT,
            expanded_spring_multiplier: EXPANDED_SPRING_MULTIPLIER,
            damping: DAMPING,
            snap_threshold: SNAP_THRESHOLD,
            snap_velocity_decay: SNAP_VELOCITY_DECAY,

            collision_buffer: COLLISION_BUFFER,
            overlap_probe_buffer: OVERLAP_PROBE_BUFFER,
            separation_factor: SEPARATION_FACTOR,
            collision_seed: 0x5eed_f1a5,

            boundary_bounce: BOUNDARY_BOUNCE,

            hex_spacing_factor: HEX_SPACING_FACTOR,
            max_rings: MAX_HEX_RINGS,

            reference_frame_ms: REFERENCE_FRAME_MS,
            max_frame_delta: MAX_FRAME_DELTA,

            expanded_z_index: EXPANDED_Z_INDEX,

            reduced_motion: false,
        }
    }
}

impl LayoutSettings {
    /// Radius for a node of the given importance (1 -> min, 10 -> max)
    pub fn radius_for(&self, importance: f32) -> f32 {
        let t = ((importance - MIN_IMPORTANCE) / (MAX_IMPORTANCE - MIN_IMPORTANCE)).clamp(0.0, 1.0);
        crate::lerp(self.min_radius, self.max_radius, t)
    }

    /// Spring constant for a node, accounting for expansion
    pub fn spring_for(&self, expanded: bool) -> f32 {
        if expanded {
            self.spring_constant * self.expanded_spring_multiplier
        } else {
            self.spring_constant
        }
    }

    /// Decode settings from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.validated())
    }

    /// Repair values that would break the simulation
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        if !(self.min_radius > 0.0) {
            self.min_radius = defaults.min_radius;
        }
        if !(self.max_radius > 0.0) {
            self.max_radius = defaults.max_radius;
        }
        if self.max_radius < self.min_radius {
            std::mem::swap(&mut self.min_radius, &mut self.max_radius);
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            log::warn!("Damping {} out of range, using {}", self.damping, defaults.damping);
            self.damping = defaults.damping;
        }
        if !(self.hex_spacing_factor > 0.0) {
            self.hex_spacing_factor = defaults.hex_spacing_factor;
        }
        if !(self.reference_frame_ms > 0.0) {
            self.reference_frame_ms = defaults.reference_frame_ms;
        }
        if !(self.max_frame_delta > 0.0) {
            self.max_frame_delta = defaults.max_frame_delta;
        }
        if !(self.snap_threshold >= 0.0) {
            self.snap_threshold = defaults.snap_threshold;
        }
        self
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "flashcard_explorer_layout";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded layout settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored layout settings: {}", e),
                }
            }
        }

        log::info!("Using default layout settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Layout settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_interpolation() {
        let settings = LayoutSettings::default();
        assert_eq!(settings.radius_for(1.0), MIN_NODE_RADIUS);
        assert_eq!(settings.radius_for(10.0), MAX_NODE_RADIUS);
        assert!((settings.radius_for(5.5) - 67.5).abs() < 0.001);
        // Out-of-range importance stays within the radius range
        assert_eq!(settings.radius_for(0.0), MIN_NODE_RADIUS);
        assert_eq!(settings.radius_for(42.0), MAX_NODE_RADIUS);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = LayoutSettings::from_json(r#"{ "damping": 0.5 }"#).unwrap();
        assert_eq!(settings.damping, 0.5);
        assert_eq!(settings.spring_constant, SPRING_CONSTANT);
        assert_eq!(settings.max_rings, MAX_HEX_RINGS);
    }

    #[test]
    fn test_validation_repairs_bad_values() {
        let settings = LayoutSettings::from_json(
            r#"{ "min_radius": 90.0, "max_radius": 45.0, "damping": 3.0, "hex_spacing_factor": -1.0 }"#,
        )
        .unwrap();
        assert_eq!(settings.min_radius, 45.0);
        assert_eq!(settings.max_radius, 90.0);
        assert_eq!(settings.damping, DAMPING);
        assert_eq!(settings.hex_spacing_factor, HEX_SPACING_FACTOR);
    }

    #[test]
    fn test_expanded_spring() {
        let settings = LayoutSettings::default();
        assert!((settings.spring_for(true) - 0.32).abs() < 1e-6);
        assert_eq!(settings.spring_for(false), SPRING_CONSTANT);
    }
}
