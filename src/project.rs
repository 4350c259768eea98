//! Pinhole projection of wall hits and actor sprites
//!
//! Apparent size is `focal / perpendicular distance`, with the focal
//! constant derived once per (screen, fov) pair as
//! `half screen height / tan(fov/2)` so perceived wall height survives
//! resolution changes. Actors project through the same constant and are
//! decomposed into fixed-ratio sub-rectangles for hit-scan resolution.

use glam::Vec2;
use serde::Serialize;

use crate::consts::ACTOR_HEIGHT;
use crate::ray::WallHit;
use crate::{angle_within, normalize_angle};

/// Closest distance a projection will divide by
const NEAR: f32 = 0.1;
/// Shade falloff per world unit of distance
const SHADE_FALLOFF: f32 = 0.015;
/// Sprite width as a fraction of its height
const SPRITE_ASPECT: f32 = 0.5;
/// Cone-edge tolerance: a bearing exactly on the boundary counts as inside
const EDGE_EPS: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl ScreenRect {
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }
}

/// One wall column on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSlice {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub shade: u8,
}

/// Body regions of a projected actor, each with its own damage weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Head,
    Torso,
    Arms,
    Legs,
}

impl BodyPart {
    pub fn damage_multiplier(&self) -> f32 {
        match self {
            BodyPart::Head => 2.0,
            BodyPart::Torso => 1.0,
            BodyPart::Arms => 0.8,
            BodyPart::Legs => 0.6,
        }
    }
}

/// Screen-space geometry for one visible actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorSprite {
    pub rect: ScreenRect,
    /// Perpendicular distance, the compositor sort key
    pub distance: f32,
    pub shade: u8,
}

impl ActorSprite {
    /// Fixed proportional decomposition of the sprite rect. This is the
    /// hit-location model, not a skeleton: ratios never change with pose.
    pub fn part_rects(&self) -> [(BodyPart, ScreenRect); 4] {
        let r = self.rect;
        let frac_x = |f: f32| r.x + (r.w as f32 * f) as i32;
        let frac_y = |f: f32| r.y + (r.h as f32 * f) as i32;
        let head = ScreenRect {
            x: frac_x(0.3),
            y: r.y,
            w: frac_x(0.7) - frac_x(0.3),
            h: frac_y(0.2) - r.y,
        };
        let torso = ScreenRect {
            x: frac_x(0.2),
            y: frac_y(0.2),
            w: frac_x(0.8) - frac_x(0.2),
            h: frac_y(0.6) - frac_y(0.2),
        };
        // Both arm strips share one rect test each side of the torso.
        let arms = ScreenRect {
            x: r.x,
            y: frac_y(0.2),
            w: r.w,
            h: frac_y(0.6) - frac_y(0.2),
        };
        let legs = ScreenRect {
            x: frac_x(0.2),
            y: frac_y(0.6),
            w: frac_x(0.8) - frac_x(0.2),
            h: r.y + r.h - frac_y(0.6),
        };
        [
            (BodyPart::Head, head),
            (BodyPart::Torso, torso),
            (BodyPart::Arms, arms),
            (BodyPart::Legs, legs),
        ]
    }

    /// Body part under a screen point, if any. Earlier entries win, so a
    /// point in the torso band never reads as arms.
    pub fn part_at(&self, px: i32, py: i32) -> Option<BodyPart> {
        self.part_rects()
            .into_iter()
            .find(|(_, rect)| rect.contains(px, py))
            .map(|(part, _)| part)
    }
}

/// Precomputed projection state for one (screen, fov) pair.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    screen_w: usize,
    screen_h: usize,
    fov: f32,
    half_fov: f32,
    columns: usize,
    column_width: f32,
    focal: f32,
}

impl Projection {
    pub fn new(screen_w: usize, screen_h: usize, fov: f32, columns: usize) -> Self {
        let focal = 0.5 * screen_h as f32 / (0.5 * fov).tan();
        Self {
            screen_w,
            screen_h,
            fov,
            half_fov: 0.5 * fov,
            columns: columns.max(1),
            column_width: screen_w as f32 / columns.max(1) as f32,
            focal,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn screen_center(&self) -> (i32, i32) {
        (self.screen_w as i32 / 2, self.screen_h as i32 / 2)
    }

    /// Depth-cue shade, 255 at the viewer falling off monotonically with
    /// distance, clamped to u8 range.
    pub fn shade(&self, distance: f32) -> u8 {
        (255.0 / (1.0 + distance.max(0.0) * SHADE_FALLOFF)).clamp(0.0, 255.0) as u8
    }

    /// Screen geometry for a wall hit in a given column. `eye_offset`
    /// shifts the horizon line in pixels (bob/crouch), positive is down.
    pub fn project_slice(
        &self,
        hit: &WallHit,
        column: usize,
        tile_size: f32,
        eye_offset: f32,
    ) -> ScreenSlice {
        let dist = hit.distance.max(NEAR);
        let height = self.focal * tile_size / dist;
        let x = (column as f32 * self.column_width).floor() as i32;
        let y = (0.5 * self.screen_h as f32 - 0.5 * height + eye_offset).round() as i32;
        ScreenSlice {
            x,
            y,
            width: self.column_width.ceil() as i32,
            height: height.round() as i32,
            shade: self.shade(dist),
        }
    }

    /// Screen geometry for an actor at a world position, or `None` when
    /// its bearing falls outside the view cone. The cone test is inclusive
    /// at the boundary and wraps across ±π.
    pub fn project_actor(
        &self,
        viewer_pos: Vec2,
        viewer_facing: f32,
        actor_center: Vec2,
        eye_offset: f32,
    ) -> Option<ActorSprite> {
        let to = actor_center - viewer_pos;
        let dist = to.length().max(NEAR);
        let bearing = normalize_angle(to.y.atan2(to.x) - viewer_facing);
        if !angle_within(bearing, 0.0, self.half_fov + EDGE_EPS) {
            return None;
        }

        let perp = (dist * bearing.cos()).max(NEAR);
        let height = self.focal * ACTOR_HEIGHT / perp;
        let width = height * SPRITE_ASPECT;
        let center_x = (bearing + self.half_fov) / self.fov * self.screen_w as f32;
        let rect = ScreenRect {
            x: (center_x - 0.5 * width).round() as i32,
            y: (0.5 * self.screen_h as f32 - 0.5 * height + eye_offset).round() as i32,
            w: width.round().max(1.0) as i32,
            h: height.round().max(1.0) as i32,
        };
        Some(ActorSprite {
            rect,
            distance: perp,
            shade: self.shade(perp),
        })
    }
}
