//! Gridcaster - a first-person 2.5D view engine over a tile map
//!
//! Core modules:
//! - `level`: tile grid with wall ids and mounted-object overlay
//! - `collision`: axis-separated AABB response against solid tiles
//! - `ray`: grid-traversal ray casting, one ray per screen column
//! - `project`: pinhole projection of wall hits and actor sprites
//! - `composite`: back-to-front merge of walls and sprites
//! - `actor`: viewer/remote actor state, weapons, movement input
//! - `world`: the aggregate the per-frame pipeline runs over
//! - `net`: snapshot cell and outbound event queue (network boundary)
//! - `renderer` / `scaler`: software framebuffer back end

pub mod actor;
pub mod collision;
pub mod composite;
pub mod config;
pub mod level;
pub mod net;
pub mod project;
pub mod ray;
pub mod renderer;
pub mod scaler;
pub mod world;

pub use config::{EngineConfig, ResolutionTier};
pub use world::World;

use glam::Vec2;

/// Gameplay constants shared across modules
pub mod consts {
    /// Player bounding box edge, in world units
    pub const PLAYER_BOX: f32 = 6.0;
    /// Base walking speed, world units per second
    pub const WALK_SPEED: f32 = 48.0;
    /// Speed multiplier while running
    pub const RUN_MULT: f32 = 1.6;
    /// Speed multiplier while aiming down sights
    pub const ADS_MULT: f32 = 0.45;
    /// Rendered actor height, world units (one tile tall)
    pub const ACTOR_HEIGHT: f32 = 16.0;
    /// Seconds a remote actor may be absent from the snapshot before removal
    pub const SNAPSHOT_GRACE: f64 = 3.0;
}

/// Normalize an angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Smallest absolute difference between two angles, in [0, π]
#[inline]
pub fn angle_diff(a: f32, b: f32) -> f32 {
    normalize_angle(a - b).abs()
}

/// Whether `angle` lies within `half_span` of `center`, boundary inclusive.
/// Wraps correctly across ±π.
#[inline]
pub fn angle_within(angle: f32, center: f32, half_span: f32) -> bool {
    angle_diff(angle, center) <= half_span
}

/// Direction unit vector scaled by `speed` for a facing angle
#[inline]
pub fn angle_to_vel(angle: f32, speed: f32) -> Vec2 {
    Vec2::new(angle.cos() * speed, angle.sin() * speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn normalize_wraps_into_range() {
        for raw in [3.0 * PI, -3.0 * PI, 7.5, -9.2, 0.5] {
            let a = normalize_angle(raw);
            assert!(a >= -PI - 1e-5 && a <= PI + 1e-5, "{raw} -> {a}");
            // Same direction, just wrapped.
            assert!((a.sin() - raw.sin()).abs() < 1e-4);
            assert!((a.cos() - raw.cos()).abs() < 1e-4);
        }
        assert_eq!(normalize_angle(0.5), 0.5);
    }

    #[test]
    fn diff_is_shortest_arc() {
        assert!((angle_diff(PI - 0.1, -PI + 0.1) - 0.2).abs() < 1e-5);
        assert!((angle_diff(0.0, PI / 2.0) - PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn within_is_boundary_inclusive_across_wrap() {
        let half = 30f32.to_radians();
        assert!(angle_within(PI - 0.01, -PI + 0.01, half));
        assert!(angle_within(half, 0.0, half));
        assert!(!angle_within(half + 0.02, 0.0, half));
    }
}
