//! Deterministic simulation module
//!
//! All gameplay physics lives here. This module must be pure and deterministic:
//! - Fixed steps only (the clock decides how many)
//! - Injected gap source only
//! - Stable iteration order (obstacles oldest first)
//! - No rendering, session or platform dependencies

pub mod clock;
pub mod collision;
pub mod rng;
pub mod state;
pub mod tick;

pub use clock::{ClockMode, StepClock};
pub use collision::{Aabb, Hit, body_aabb, check_bounds, first_obstacle_hit, hits_obstacle};
pub use rng::{GapSource, ScriptedGaps, SeededGaps};
pub use state::{Body, Obstacle, World};
pub use tick::{StepReport, advance, impulse, maybe_spawn, scroll_obstacles, step};
