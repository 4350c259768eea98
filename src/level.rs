//! Tile grid and level loading
//!
//! A level is a rectangular grid of wall material ids (0 = traversable)
//! plus an overlay grid of optional wall-mounted objects (pickups). The
//! grid is loaded once per round and never mutated during casting; only
//! overlay entries are cleared when a pickup is claimed.
//!
//! Every read goes through a checked accessor. Out-of-range coordinates
//! read as a solid boundary tile so traversal and collision terminate at
//! the map edge instead of indexing out of range.

use serde::Deserialize;
use thiserror::Error;

/// Wall material id. 0 is empty/traversable.
pub type WallId = u8;

/// Material id reported for reads outside the grid.
pub const BOUNDARY_WALL: WallId = WallId::MAX;

/// Which way a mounted object faces, one per tile edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Up,
    Right,
    Down,
    Left,
}

impl Orientation {
    pub fn from_index(i: u8) -> Option<Self> {
        match i {
            0 => Some(Orientation::Up),
            1 => Some(Orientation::Right),
            2 => Some(Orientation::Down),
            3 => Some(Orientation::Left),
            _ => None,
        }
    }
}

/// A placeable object occupying a tile's overlay slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayObject {
    pub kind: u16,
    pub orientation: Orientation,
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level grid is empty")]
    Empty,
    #[error("row {row} has {got} tiles, expected {expected}")]
    NotRectangular {
        row: usize,
        got: usize,
        expected: usize,
    },
    #[error("overlay entry at ({x}, {y}) is outside the grid")]
    OverlayOutOfBounds { x: i64, y: i64 },
    #[error("overlay orientation {0} is not in 0..=3")]
    BadOrientation(u8),
    #[error("level data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable-per-round wall storage with a mutable overlay layer
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: usize,
    height: usize,
    walls: Vec<WallId>,
    overlay: Vec<Option<OverlayObject>>,
}

impl TileGrid {
    /// Build a grid from row vectors, rejecting ragged input.
    pub fn from_rows(rows: &[Vec<WallId>]) -> Result<Self, LevelError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(LevelError::Empty);
        }
        let mut walls = Vec::with_capacity(width * height);
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(LevelError::NotRectangular {
                    row,
                    got: cells.len(),
                    expected: width,
                });
            }
            walls.extend_from_slice(cells);
        }
        Ok(Self {
            width,
            height,
            walls,
            overlay: vec![None; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width + x as usize)
    }

    /// Material at a tile; out-of-range reads as the boundary material.
    #[inline]
    pub fn wall_at(&self, x: i32, y: i32) -> WallId {
        match self.index(x, y) {
            Some(i) => self.walls[i],
            None => BOUNDARY_WALL,
        }
    }

    /// Whether a tile blocks movement and rays. The region outside the
    /// grid is solid, which guarantees ray termination at the map edge.
    #[inline]
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.wall_at(x, y) != 0
    }

    pub fn overlay_at(&self, x: i32, y: i32) -> Option<OverlayObject> {
        self.index(x, y).and_then(|i| self.overlay[i])
    }

    pub fn set_overlay(&mut self, x: i32, y: i32, obj: OverlayObject) -> Result<(), LevelError> {
        match self.index(x, y) {
            Some(i) => {
                self.overlay[i] = Some(obj);
                Ok(())
            }
            None => Err(LevelError::OverlayOutOfBounds {
                x: x as i64,
                y: y as i64,
            }),
        }
    }

    /// Claim the object on a tile, clearing its slot.
    pub fn take_overlay(&mut self, x: i32, y: i32) -> Option<OverlayObject> {
        self.index(x, y).and_then(|i| self.overlay[i].take())
    }
}

#[derive(Debug, Deserialize)]
struct OverlayEntry {
    x: i64,
    y: i64,
    kind: u16,
    orientation: u8,
}

#[derive(Debug, Deserialize)]
struct LevelData {
    walls: Vec<Vec<WallId>>,
    #[serde(default)]
    overlays: Vec<OverlayEntry>,
    #[serde(default)]
    spawn: Option<[f32; 2]>,
}

/// A loaded level: the grid plus the viewer spawn point in world units.
#[derive(Debug, Clone)]
pub struct Level {
    pub grid: TileGrid,
    pub spawn: [f32; 2],
}

impl Level {
    /// Parse the map-loading collaborator's JSON form:
    /// `{ "walls": [[..], ..], "overlays": [{x, y, kind, orientation}, ..],
    ///    "spawn": [x, y] }`.
    pub fn from_json(text: &str) -> Result<Self, LevelError> {
        let data: LevelData = serde_json::from_str(text)?;
        let mut grid = TileGrid::from_rows(&data.walls)?;
        for entry in data.overlays {
            let orientation = Orientation::from_index(entry.orientation)
                .ok_or(LevelError::BadOrientation(entry.orientation))?;
            let (x, y) = (entry.x as i32, entry.y as i32);
            if entry.x != x as i64 || entry.y != y as i64 || !grid.in_bounds(x, y) {
                return Err(LevelError::OverlayOutOfBounds {
                    x: entry.x,
                    y: entry.y,
                });
            }
            grid.set_overlay(
                x,
                y,
                OverlayObject {
                    kind: entry.kind,
                    orientation,
                },
            )?;
        }
        let spawn = data.spawn.unwrap_or([0.0, 0.0]);
        Ok(Self { grid, spawn })
    }

    /// Built-in bordered arena, usable without any asset files.
    pub fn demo(tile_size: f32) -> Self {
        let rows: Vec<Vec<WallId>> = vec![
            vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            vec![1, 0, 0, 0, 0, 0, 1, 1, 0, 1],
            vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            vec![1, 0, 0, 2, 0, 0, 0, 0, 0, 1],
            vec![1, 0, 0, 0, 0, 3, 0, 1, 0, 1],
            vec![1, 0, 0, 0, 0, 0, 0, 1, 0, 1],
            vec![1, 0, 0, 2, 0, 0, 0, 0, 0, 1],
            vec![1, 0, 1, 0, 0, 0, 0, 0, 0, 1],
            vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ];
        let mut grid = TileGrid::from_rows(&rows).expect("demo map is rectangular");
        grid.set_overlay(
            8,
            1,
            OverlayObject {
                kind: 1,
                orientation: Orientation::Left,
            },
        )
        .expect("demo overlay tile in bounds");
        Self {
            grid,
            spawn: [1.5 * tile_size, 1.5 * tile_size],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![vec![1, 1, 1], vec![1, 1]];
        assert!(matches!(
            TileGrid::from_rows(&rows),
            Err(LevelError::NotRectangular { row: 1, .. })
        ));
    }

    #[test]
    fn out_of_range_reads_as_solid_boundary() {
        let grid = TileGrid::from_rows(&[vec![0, 0], vec![0, 0]]).unwrap();
        assert!(grid.is_solid(-1, 0));
        assert!(grid.is_solid(0, -1));
        assert!(grid.is_solid(2, 0));
        assert!(grid.is_solid(0, 2));
        assert_eq!(grid.wall_at(99, 99), BOUNDARY_WALL);
        assert!(!grid.is_solid(1, 1));
    }

    #[test]
    fn overlay_claim_clears_slot() {
        let mut grid = TileGrid::from_rows(&vec![vec![0; 3]; 3]).unwrap();
        let obj = OverlayObject {
            kind: 7,
            orientation: Orientation::Right,
        };
        grid.set_overlay(1, 2, obj).unwrap();
        assert_eq!(grid.overlay_at(1, 2), Some(obj));
        assert_eq!(grid.take_overlay(1, 2), Some(obj));
        assert_eq!(grid.overlay_at(1, 2), None);
        assert_eq!(grid.take_overlay(1, 2), None);
    }

    #[test]
    fn json_level_loads_grid_overlay_and_spawn() {
        let text = r#"{
            "walls": [[1,1,1],[1,0,1],[1,1,1]],
            "overlays": [{"x":1,"y":1,"kind":4,"orientation":3}],
            "spawn": [24.0, 24.0]
        }"#;
        let level = Level::from_json(text).unwrap();
        assert_eq!(level.grid.width(), 3);
        assert_eq!(level.spawn, [24.0, 24.0]);
        let obj = level.grid.overlay_at(1, 1).unwrap();
        assert_eq!(obj.kind, 4);
        assert_eq!(obj.orientation, Orientation::Left);
    }

    #[test]
    fn json_level_rejects_bad_orientation() {
        let text = r#"{
            "walls": [[0]],
            "overlays": [{"x":0,"y":0,"kind":1,"orientation":4}]
        }"#;
        assert!(matches!(
            Level::from_json(text),
            Err(LevelError::BadOrientation(4))
        ));
    }

    #[test]
    fn demo_level_is_bordered() {
        let level = Level::demo(16.0);
        let g = &level.grid;
        for x in 0..g.width() as i32 {
            assert!(g.is_solid(x, 0));
            assert!(g.is_solid(x, g.height() as i32 - 1));
        }
        for y in 0..g.height() as i32 {
            assert!(g.is_solid(0, y));
            assert!(g.is_solid(g.width() as i32 - 1, y));
        }
        assert!(!g.is_solid(2, 2));
    }
}
