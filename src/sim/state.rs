//! World state and core simulation types
//!
//! Everything a step reads or writes lives here. Nothing in this file knows
//! about sessions, clocks or minting.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// The player-controlled body
///
/// Horizontal position is fixed (`Tuning::body_x`); only the vertical axis
/// moves. `y` grows downward, so gravity is positive and impulses negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Vertical centre
    pub y: f32,
    /// Vertical velocity (pixels/step)
    pub vy: f32,
}

impl Body {
    /// Body at rest at the canonical start height
    pub fn at_start(tuning: &Tuning) -> Self {
        Self {
            y: tuning.body_start_y,
            vy: 0.0,
        }
    }

    /// Top edge of the body
    #[inline]
    pub fn top(&self, tuning: &Tuning) -> f32 {
        self.y - tuning.body_half()
    }

    /// Bottom edge of the body
    #[inline]
    pub fn bottom(&self, tuning: &Tuning) -> f32 {
        self.y + tuning.body_half()
    }
}

/// A gated obstacle: a top and bottom barrier with a passable gap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Left edge
    pub x: f32,
    /// Top edge of the gap; the gap spans `[gap_y, gap_y + gap_height]`
    pub gap_y: f32,
}

impl Obstacle {
    /// Right (trailing) edge
    #[inline]
    pub fn right(&self, tuning: &Tuning) -> f32 {
        self.x + tuning.obstacle_width
    }

    /// Bottom edge of the gap
    #[inline]
    pub fn gap_bottom(&self, tuning: &Tuning) -> f32 {
        self.gap_y + tuning.gap_height
    }

    /// Whether the obstacle has scrolled fully past the origin
    #[inline]
    pub fn is_past_origin(&self, tuning: &Tuning) -> bool {
        self.right(tuning) < 0.0
    }
}

/// One play-through's physical state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub body: Body,
    /// Obstacles in spawn order (oldest / leftmost first)
    pub obstacles: Vec<Obstacle>,
    /// Obstacles passed; never decreases
    pub score: u32,
    /// Set once the body collides or leaves the world
    pub terminal: bool,
    /// Steps completed so far; the step that ends a run is not counted
    pub steps: u64,
}

impl World {
    /// Fresh world: body at rest at the start height, no obstacles
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            body: Body::at_start(tuning),
            obstacles: Vec::new(),
            score: 0,
            terminal: false,
            steps: 0,
        }
    }

    /// Most recently spawned obstacle
    pub fn newest_obstacle(&self) -> Option<&Obstacle> {
        self.obstacles.last()
    }
}
