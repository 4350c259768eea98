//! Grid-traversal ray casting
//!
//! One ray per internal screen column. Traversal is DDA: track the distance
//! along the ray to the next x- and y-gridline, repeatedly advance whichever
//! axis crosses sooner, stop on the first solid tile or when the travelled
//! distance exceeds the configured budget.
//!
//! A zero direction component makes that axis's per-step distance infinite,
//! so the axis simply never advances. Tiles outside the grid read as solid
//! through `TileGrid::wall_at`, so every ray terminates.

use glam::Vec2;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::level::{TileGrid, WallId};

/// Which face of the tile the ray struck, seen from the viewer's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Top,
    Right,
    Bottom,
    Left,
}

/// Per-column result of a cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallHit {
    /// Tile coordinate that stopped the ray
    pub tile: (i32, i32),
    /// Material id of that tile
    pub wall: WallId,
    /// Struck face, determines texture choice
    pub face: Face,
    /// Perpendicular distance from the view plane (fisheye-corrected)
    pub distance: f32,
    /// Texel column along the struck face, in [0, tile_size)
    pub tex_offset: f32,
}

/// Cast a single ray from `origin` at `facing + offset` radians.
///
/// Returns `None` when no solid tile lies within `max_dist` along the ray
/// (render void for that column). The reported distance is the ray distance
/// multiplied by `cos(offset)`, which removes the fisheye bulge at the
/// edges of the view cone.
pub fn cast_column(
    grid: &TileGrid,
    origin: Vec2,
    facing: f32,
    offset: f32,
    tile_size: f32,
    max_dist: f32,
) -> Option<WallHit> {
    let angle = facing + offset;
    let dir = Vec2::new(angle.cos(), angle.sin());
    if !dir.is_finite() {
        return None;
    }

    let mut tile_x = (origin.x / tile_size).floor() as i32;
    let mut tile_y = (origin.y / tile_size).floor() as i32;

    // Ray distance consumed by one full tile step on each axis.
    let delta_x = if dir.x.abs() <= f32::EPSILON {
        f32::INFINITY
    } else {
        tile_size / dir.x.abs()
    };
    let delta_y = if dir.y.abs() <= f32::EPSILON {
        f32::INFINITY
    } else {
        tile_size / dir.y.abs()
    };

    // Step direction and ray distance to the first gridline on each axis.
    let (step_x, mut side_x) = if delta_x.is_infinite() {
        (0, f32::INFINITY)
    } else if dir.x < 0.0 {
        (-1, (origin.x - tile_x as f32 * tile_size) / dir.x.abs())
    } else {
        (1, ((tile_x + 1) as f32 * tile_size - origin.x) / dir.x.abs())
    };
    let (step_y, mut side_y) = if delta_y.is_infinite() {
        (0, f32::INFINITY)
    } else if dir.y < 0.0 {
        (-1, (origin.y - tile_y as f32 * tile_size) / dir.y.abs())
    } else {
        (1, ((tile_y + 1) as f32 * tile_size - origin.y) / dir.y.abs())
    };

    let (ray_dist, face) = loop {
        if side_x < side_y {
            let d = side_x;
            if d > max_dist {
                return None;
            }
            side_x += delta_x;
            tile_x += step_x;
            if grid.is_solid(tile_x, tile_y) {
                break (d, if step_x > 0 { Face::Left } else { Face::Right });
            }
        } else {
            let d = side_y;
            if d > max_dist {
                return None;
            }
            side_y += delta_y;
            tile_y += step_y;
            if grid.is_solid(tile_x, tile_y) {
                break (d, if step_y > 0 { Face::Top } else { Face::Bottom });
            }
        }
    };

    let hit_point = origin + dir * ray_dist;
    let tex_offset = match face {
        Face::Left | Face::Right => hit_point.y.rem_euclid(tile_size),
        Face::Top | Face::Bottom => hit_point.x.rem_euclid(tile_size),
    };

    Some(WallHit {
        tile: (tile_x, tile_y),
        wall: grid.wall_at(tile_x, tile_y),
        face,
        distance: ray_dist * offset.cos(),
        tex_offset,
    })
}

/// Angular offset of a column within the view cone, linear from `-fov/2`
/// at column 0 to `+fov/2` at the last column.
#[inline]
pub fn column_offset(column: usize, columns: usize, fov: f32) -> f32 {
    if columns <= 1 {
        0.0
    } else {
        -0.5 * fov + fov * column as f32 / (columns - 1) as f32
    }
}

/// Cast the whole view cone, one ray per column. Columns are independent,
/// so the hot loop fans out across the thread pool.
pub fn cast_fov(
    grid: &TileGrid,
    origin: Vec2,
    facing: f32,
    fov: f32,
    columns: usize,
    tile_size: f32,
    max_dist: f32,
) -> Vec<Option<WallHit>> {
    (0..columns)
        .into_par_iter()
        .map(|column| {
            let offset = column_offset(column, columns, fov);
            cast_column(grid, origin, facing, offset, tile_size, max_dist)
        })
        .collect()
}
