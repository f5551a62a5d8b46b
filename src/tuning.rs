//! Data-driven game balance
//!
//! Every physics and spawn constant the simulation reads comes from a
//! `Tuning`. The default is the reference balance in [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Physics and spawn parameters for one world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world_width: f32,
    pub world_height: f32,
    pub body_x: f32,
    pub body_size: f32,
    pub body_start_y: f32,
    /// Added to vertical velocity every step
    pub gravity: f32,
    /// Vertical velocity after an impulse (overwrites, never accumulates)
    pub impulse_velocity: f32,
    pub obstacle_width: f32,
    pub gap_height: f32,
    pub scroll_speed: f32,
    pub spawn_spacing: f32,
    pub gap_margin: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            body_x: BODY_X,
            body_size: BODY_SIZE,
            body_start_y: BODY_START_Y,
            gravity: GRAVITY,
            impulse_velocity: IMPULSE_VELOCITY,
            obstacle_width: OBSTACLE_WIDTH,
            gap_height: GAP_HEIGHT,
            scroll_speed: SCROLL_SPEED,
            spawn_spacing: SPAWN_SPACING,
            gap_margin: GAP_MARGIN,
        }
    }
}

impl Tuning {
    /// Half the body's extent (its "radius" on both axes)
    #[inline]
    pub fn body_half(&self) -> f32 {
        self.body_size / 2.0
    }

    /// Lowest `y` the body centre may occupy without touching the ceiling
    #[inline]
    pub fn ceiling_y(&self) -> f32 {
        self.body_half()
    }

    /// Highest `y` the body centre may occupy without touching the ground
    #[inline]
    pub fn ground_y(&self) -> f32 {
        self.world_height - self.body_half()
    }

    /// Half-open range `[lo, hi)` a new gap's top edge is drawn from
    pub fn gap_range(&self) -> (f32, f32) {
        let lo = self.gap_margin;
        let hi = self.world_height - self.gap_height - self.gap_margin;
        (lo, hi)
    }

    /// Check the invariants the simulation assumes
    ///
    /// The simulation itself only `debug_assert!`s these; configuration
    /// loaders call this so a bad file is rejected before a world exists.
    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("body_size", self.body_size),
            ("obstacle_width", self.obstacle_width),
            ("gap_height", self.gap_height),
            ("scroll_speed", self.scroll_speed),
            ("spawn_spacing", self.spawn_spacing),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{name} must be a positive number, got {value}"));
            }
        }
        if self.gap_margin < 0.0 {
            return Err(format!("gap_margin must not be negative, got {}", self.gap_margin));
        }
        if self.gap_height <= self.body_size {
            return Err(format!(
                "gap_height {} leaves no room for a body of size {}",
                self.gap_height, self.body_size
            ));
        }
        let (lo, hi) = self.gap_range();
        if hi <= lo {
            return Err(format!("gap spawn range [{lo}, {hi}) is empty"));
        }
        let start = self.body_start_y;
        if !(start > self.ceiling_y() && start < self.ground_y()) {
            return Err(format!("body_start_y {start} is outside the playable band"));
        }
        Ok(())
    }
}
