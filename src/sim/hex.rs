//! Hexagonal ring placement
//!
//! Slot 0 sits at the viewport centre. Ring `k` adds up to `6k` slots at
//! radius `k * spacing`: six principal angles 60 degrees apart, each split
//! into `k` sub-steps. Slot order is ring, then side, then sub-step, so slot
//! `i` always belongs to node `i`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{HEX_SPACING_FACTOR, MAX_HEX_RINGS};
use crate::polar_to_cartesian;

/// A target position on the hexagonal ring layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HexSlot {
    pub pos: Vec2,
    /// Ring index (0 = centre)
    pub ring: u32,
    /// Principal direction, 0..6 (0 for the centre)
    pub side: u32,
    /// Sub-step between this side and the next, 0..ring
    pub step: u32,
}

impl HexSlot {
    fn center(center: Vec2) -> Self {
        Self {
            pos: center,
            ring: 0,
            side: 0,
            step: 0,
        }
    }

    /// Angle of this slot around the centre, in degrees
    pub fn angle_degrees(&self) -> f32 {
        if self.ring == 0 {
            return 0.0;
        }
        self.side as f32 * 60.0 + self.step as f32 * (60.0 / self.ring as f32)
    }
}

/// Ring layout parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexLayout {
    /// Ring spacing as a multiple of the node radius
    pub spacing_factor: f32,
    /// Number of rings generated around the centre
    pub max_rings: u32,
}

impl Default for HexLayout {
    fn default() -> Self {
        Self {
            spacing_factor: HEX_SPACING_FACTOR,
            max_rings: MAX_HEX_RINGS,
        }
    }
}

impl HexLayout {
    pub fn new(spacing_factor: f32, max_rings: u32) -> Self {
        Self {
            spacing_factor,
            max_rings,
        }
    }

    /// Slots available before the ring limit kicks in
    pub fn capacity(&self) -> usize {
        let rings = self.max_rings as usize;
        1 + 3 * rings * (rings + 1)
    }

    /// Compute exactly `count` slots for a `width` x `height` viewport.
    ///
    /// Past [`capacity`](Self::capacity) the remaining entries repeat the last
    /// generated slot; collisions spread those nodes out afterwards.
    pub fn slots(&self, count: usize, width: f32, height: f32, node_radius: f32) -> Vec<HexSlot> {
        let mut slots = Vec::with_capacity(count);
        if count == 0 {
            return slots;
        }

        let center = Vec2::new(width / 2.0, height / 2.0);
        let spacing = node_radius * self.spacing_factor;
        slots.push(HexSlot::center(center));

        'rings: for ring in 1..=self.max_rings {
            let distance = ring as f32 * spacing;
            for side in 0..6 {
                for step in 0..ring {
                    if slots.len() >= count {
                        break 'rings;
                    }
                    let mut slot = HexSlot {
                        pos: center,
                        ring,
                        side,
                        step,
                    };
                    slot.pos = center + polar_to_cartesian(distance, slot.angle_degrees().to_radians());
                    slots.push(slot);
                }
            }
        }

        if slots.len() < count {
            log::warn!(
                "{} nodes exceed hex capacity of {} slots; overflow shares the last slot",
                count,
                slots.len()
            );
            let last = slots[slots.len() - 1];
            slots.resize(count, last);
        }

        slots
    }
}

/// Hex slots with the default spacing and ring limit
pub fn compute_hex_slots(count: usize, width: f32, height: f32, node_radius: f32) -> Vec<HexSlot> {
    HexLayout::default().slots(count, width, height, node_radius)
}
