//! Fixed timestep simulation step
//!
//! One step is: advance the body and check for a hit, scroll obstacles and
//! bank the ones that left the world, then maybe spawn a new one. Each piece
//! is public so hosts and tests can drive them individually.

use super::collision::{Hit, check_bounds, first_obstacle_hit};
use super::rng::GapSource;
use super::state::{Body, Obstacle, World};
use crate::tuning::Tuning;

/// What happened during one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Obstacles removed (and scored) this step
    pub removed: u32,
    /// Set when the step ended the run
    pub hit: Option<Hit>,
    /// Whether a new obstacle was spawned
    pub spawned: bool,
}

impl StepReport {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.hit.is_some()
    }
}

/// Overwrite vertical velocity with the impulse velocity
///
/// Impulses never stack: two in the same step leave the same velocity as one.
#[inline]
pub fn impulse(body: &mut Body, tuning: &Tuning) {
    body.vy = tuning.impulse_velocity;
}

/// Integrate the body one step and check terminal conditions
///
/// Order: gravity into velocity, velocity into position, then bounds, then
/// obstacles oldest first. The integrated body is committed only when it is
/// safe; a hit discards the step and just marks the world terminal, so the
/// frozen body stays at its last safe position. A terminal world is left
/// untouched.
pub fn advance(world: &mut World, tuning: &Tuning) -> Option<Hit> {
    if world.terminal {
        return None;
    }

    let mut next = world.body;
    next.vy += tuning.gravity;
    next.y += next.vy;
    debug_assert!(next.y.is_finite(), "body position diverged: {next:?}");

    let hit = check_bounds(&next, tuning).or_else(|| first_obstacle_hit(&next, &world.obstacles, tuning));
    match hit {
        Some(_) => world.terminal = true,
        None => {
            world.body = next;
            world.steps += 1;
        }
    }
    hit
}

/// Scroll every obstacle left and score the ones that passed the origin
///
/// Returns the number removed; the score grows by exactly that amount.
pub fn scroll_obstacles(world: &mut World, tuning: &Tuning) -> u32 {
    for obstacle in &mut world.obstacles {
        obstacle.x -= tuning.scroll_speed;
    }

    let before = world.obstacles.len();
    world.obstacles.retain(|o| !o.is_past_origin(tuning));
    let removed = (before - world.obstacles.len()) as u32;

    if removed > 0 {
        world.score += removed;
        log::debug!("Passed {} obstacle(s), score {}", removed, world.score);
    }
    removed
}

/// Spawn a new obstacle at the leading edge when there is room
///
/// Room means no obstacles at all, or the newest one has travelled at least
/// `spawn_spacing` from the leading edge. Returns whether one was spawned.
pub fn maybe_spawn(world: &mut World, tuning: &Tuning, gaps: &mut dyn GapSource) -> bool {
    let has_room = match world.newest_obstacle() {
        None => true,
        Some(newest) => newest.x < tuning.world_width - tuning.spawn_spacing,
    };
    if !has_room {
        return false;
    }

    let (lo, hi) = tuning.gap_range();
    debug_assert!(hi > lo, "gap spawn range [{lo}, {hi}) is empty");
    let gap_y = gaps.next_gap(lo, hi);
    debug_assert!(
        gap_y >= 0.0 && gap_y + tuning.gap_height <= tuning.world_height,
        "gap {gap_y} leaves the world"
    );

    world.obstacles.push(Obstacle {
        x: tuning.world_width,
        gap_y,
    });
    log::debug!("Spawned obstacle at step {} with gap at {:.1}", world.steps, gap_y);
    true
}

/// Advance the world by one fixed step
///
/// Scrolling and spawning are skipped on the step that ends the run so the
/// final frame shows the world exactly as it was before the hit.
pub fn step(world: &mut World, tuning: &Tuning, gaps: &mut dyn GapSource) -> StepReport {
    if world.terminal {
        return StepReport::default();
    }

    let hit = advance(world, tuning);
    if hit.is_some() {
        return StepReport {
            hit,
            ..Default::default()
        };
    }

    let removed = scroll_obstacles(world, tuning);
    let spawned = maybe_spawn(world, tuning, gaps);
    StepReport {
        removed,
        hit: None,
        spawned,
    }
}
