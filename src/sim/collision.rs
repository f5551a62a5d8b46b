//! Collision detection for the body against world bounds and obstacles
//!
//! All tests use strict inequalities: touching an edge is safe, crossing it
//! by any amount is not.

use glam::Vec2;

use super::state::{Body, Obstacle};
use crate::tuning::Tuning;

/// Axis-aligned box, `min` is the top-left corner (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Open-interval overlap on the x axis
    #[inline]
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.max.x > other.min.x && self.min.x < other.max.x
    }

    /// Whether this box's vertical extent lies within `[top, bottom]`
    #[inline]
    pub fn within_y(&self, top: f32, bottom: f32) -> bool {
        self.min.y >= top && self.max.y <= bottom
    }
}

/// Why a body stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Ceiling,
    Ground,
    /// Index into the world's obstacle list
    Obstacle(usize),
}

/// Bounding box of the body at its current position
pub fn body_aabb(body: &Body, tuning: &Tuning) -> Aabb {
    let half = tuning.body_half();
    Aabb::new(
        Vec2::new(tuning.body_x - half, body.y - half),
        Vec2::new(tuning.body_x + half, body.y + half),
    )
}

/// Full-height column occupied by an obstacle (gap included)
pub fn obstacle_column(obstacle: &Obstacle, tuning: &Tuning) -> Aabb {
    Aabb::new(
        Vec2::new(obstacle.x, 0.0),
        Vec2::new(obstacle.right(tuning), tuning.world_height),
    )
}

/// Ceiling / ground check for the body centre
pub fn check_bounds(body: &Body, tuning: &Tuning) -> Option<Hit> {
    if body.y > tuning.ground_y() {
        Some(Hit::Ground)
    } else if body.y < tuning.ceiling_y() {
        Some(Hit::Ceiling)
    } else {
        None
    }
}

/// Whether the body collides with a single obstacle
///
/// A hit needs horizontal overlap and some part of the body outside the gap.
pub fn hits_obstacle(body: &Body, obstacle: &Obstacle, tuning: &Tuning) -> bool {
    let body_box = body_aabb(body, tuning);
    if !body_box.overlaps_x(&obstacle_column(obstacle, tuning)) {
        return false;
    }
    !body_box.within_y(obstacle.gap_y, obstacle.gap_bottom(tuning))
}

/// First obstacle (oldest first) the body collides with
pub fn first_obstacle_hit(body: &Body, obstacles: &[Obstacle], tuning: &Tuning) -> Option<Hit> {
    obstacles
        .iter()
        .position(|o| hits_obstacle(body, o, tuning))
        .map(Hit::Obstacle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> Tuning {
        Tuning::default()
    }

    /// Obstacle whose column covers the body's column (x 65..95)
    fn overlapping(gap_y: f32) -> Obstacle {
        Obstacle { x: 50.0, gap_y }
    }

    #[test]
    fn test_boundary_contact_is_safe() {
        let t = tuning();
        assert_eq!(check_bounds(&Body { y: 585.0, vy: 0.0 }, &t), None);
        assert_eq!(check_bounds(&Body { y: 15.0, vy: 0.0 }, &t), None);
    }

    #[test]
    fn test_one_unit_past_boundary_is_terminal() {
        let t = tuning();
        assert_eq!(check_bounds(&Body { y: 586.0, vy: 0.0 }, &t), Some(Hit::Ground));
        assert_eq!(check_bounds(&Body { y: 14.0, vy: 0.0 }, &t), Some(Hit::Ceiling));
    }

    #[test]
    fn test_body_inside_gap_is_safe() {
        let t = tuning();
        let o = overlapping(100.0);
        // Body spans 100..130 and 250..280, both inside [100, 280]
        assert!(!hits_obstacle(&Body { y: 115.0, vy: 0.0 }, &o, &t));
        assert!(!hits_obstacle(&Body { y: 265.0, vy: 0.0 }, &o, &t));
        assert!(!hits_obstacle(&Body { y: 190.0, vy: 0.0 }, &o, &t));
    }

    #[test]
    fn test_body_one_unit_outside_gap_hits() {
        let t = tuning();
        let o = overlapping(100.0);
        assert!(hits_obstacle(&Body { y: 114.0, vy: 0.0 }, &o, &t));
        assert!(hits_obstacle(&Body { y: 266.0, vy: 0.0 }, &o, &t));
    }

    #[test]
    fn test_horizontal_edge_contact_is_safe() {
        let t = tuning();
        let body = Body { y: 20.0, vy: 0.0 };
        // Obstacle left edge exactly at the body's right edge (95)
        let ahead = Obstacle { x: 95.0, gap_y: 300.0 };
        assert!(!hits_obstacle(&body, &ahead, &t));
        // Obstacle right edge exactly at the body's left edge (65)
        let behind = Obstacle { x: 5.0, gap_y: 300.0 };
        assert!(!hits_obstacle(&body, &behind, &t));
        let touching = Obstacle { x: 94.0, gap_y: 300.0 };
        assert!(hits_obstacle(&body, &touching, &t));
    }

    #[test]
    fn test_first_hit_is_oldest() {
        let t = tuning();
        let body = Body { y: 20.0, vy: 0.0 };
        let obstacles = [
            Obstacle { x: 300.0, gap_y: 300.0 },
            Obstacle { x: 60.0, gap_y: 300.0 },
            Obstacle { x: 70.0, gap_y: 300.0 },
        ];
        assert_eq!(first_obstacle_hit(&body, &obstacles, &t), Some(Hit::Obstacle(1)));
    }
}
