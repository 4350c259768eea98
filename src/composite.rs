//! Back-to-front compositing
//!
//! Wall slices and actor sprites are depth-sorted separately, then merged
//! with a two-pointer interleave that always emits the farther head next.
//! Nearer geometry overdraws farther geometry without a depth buffer.

use std::cmp::Ordering;

use crate::level::WallId;
use crate::project::{ActorSprite, ScreenRect, ScreenSlice};
use crate::ray::WallHit;

/// Normalized source rectangle in texture space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SrcRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl SrcRect {
    pub const FULL: SrcRect = SrcRect {
        u0: 0.0,
        v0: 0.0,
        u1: 1.0,
        v1: 1.0,
    };
}

/// One wall column ready to composite
#[derive(Debug, Clone, Copy)]
pub struct WallEntry {
    pub hit: WallHit,
    pub slice: ScreenSlice,
}

/// One visible actor ready to composite
#[derive(Debug, Clone, Copy)]
pub struct ActorEntry {
    pub texture: u16,
    pub sprite: ActorSprite,
}

/// Ordered draw list consumed by the rendering collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    WallSlice {
        texture: WallId,
        dest: ScreenRect,
        /// Texel column along the struck face, in world units
        src_column: f32,
        shade: u8,
    },
    Sprite {
        texture: u16,
        dest: ScreenRect,
        src: SrcRect,
        shade: u8,
    },
}

impl DrawCommand {
    fn wall(entry: &WallEntry) -> Self {
        DrawCommand::WallSlice {
            texture: entry.hit.wall,
            dest: ScreenRect {
                x: entry.slice.x,
                y: entry.slice.y,
                w: entry.slice.width,
                h: entry.slice.height,
            },
            src_column: entry.hit.tex_offset,
            shade: entry.slice.shade,
        }
    }

    fn sprite(entry: &ActorEntry) -> Self {
        DrawCommand::Sprite {
            texture: entry.texture,
            dest: entry.sprite.rect,
            src: SrcRect::FULL,
            shade: entry.sprite.shade,
        }
    }
}

fn descending(a: f32, b: f32) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Merge both lists into painter's order: for any two emitted entries A
/// before B, distance(A) >= distance(B). Ties emit the wall slice first.
pub fn composite(mut walls: Vec<WallEntry>, mut actors: Vec<ActorEntry>) -> Vec<DrawCommand> {
    walls.sort_by(|a, b| descending(a.hit.distance, b.hit.distance));
    actors.sort_by(|a, b| descending(a.sprite.distance, b.sprite.distance));

    let mut out = Vec::with_capacity(walls.len() + actors.len());
    let (mut wi, mut ai) = (0, 0);
    while wi < walls.len() && ai < actors.len() {
        if walls[wi].hit.distance >= actors[ai].sprite.distance {
            out.push(DrawCommand::wall(&walls[wi]));
            wi += 1;
        } else {
            out.push(DrawCommand::sprite(&actors[ai]));
            ai += 1;
        }
    }
    out.extend(walls[wi..].iter().map(DrawCommand::wall));
    out.extend(actors[ai..].iter().map(DrawCommand::sprite));
    out
}
