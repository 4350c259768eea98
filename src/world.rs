//! The world aggregate and the per-frame pipeline
//!
//! `World` owns everything a frame needs: the grid, the validated config,
//! the viewer, and the remote actors mirrored from the snapshot cell.
//! Construction is explicit and dependency-ordered: load a `Level`, then
//! build the `World` from it. No globals.
//!
//! Frame order: input → movement/collision → ray casts → projection →
//! hit-scan → compositing. The caller renders the returned draw list.

use std::collections::HashMap;

use glam::Vec2;

use crate::actor::{self, Actor, ActorId, InputState};
use crate::composite::{self, ActorEntry, DrawCommand, WallEntry};
use crate::config::{ConfigError, EngineConfig};
use crate::consts::SNAPSHOT_GRACE;
use crate::level::{Level, OverlayObject, TileGrid};
use crate::net::{Outbox, OutboundEvent, SnapshotCell};
use crate::project::{ActorSprite, BodyPart, Projection};
use crate::ray;

/// Texture id the rendering collaborator maps to the enemy sprite sheet
const ENEMY_TEXTURE: u16 = 1;
/// Reserved id for the viewer
const VIEWER_ID: ActorId = 0;

pub struct World {
    pub grid: TileGrid,
    pub config: EngineConfig,
    pub viewer: Actor,
    pub remotes: HashMap<ActorId, Actor>,
}

impl World {
    /// Build a world from a loaded level. The config is validated here;
    /// an out-of-range value never reaches the pipeline.
    pub fn new(level: Level, config: EngineConfig) -> Result<Self, ConfigError> {
        let config = config.validated()?;
        let mut viewer = Actor::new(VIEWER_ID, Vec2::ZERO, 0.0);
        viewer.set_pose(level.spawn[0], level.spawn[1], 0.0);
        Ok(Self {
            grid: level.grid,
            config,
            viewer,
            remotes: HashMap::new(),
        })
    }

    /// Mirror the snapshot cell into the remote actor set. Actors the cell
    /// no longer reports (past their grace period) are dropped; new ids
    /// are spawned at the reported pose.
    pub fn sync_remotes(&mut self, cell: &SnapshotCell, now: f64) {
        let poses = cell.poses(now, SNAPSHOT_GRACE);
        self.remotes
            .retain(|id, _| poses.iter().any(|(pid, _)| pid == id));
        for (id, pose) in poses {
            let remote = self
                .remotes
                .entry(id)
                .or_insert_with(|| Actor::new(id, Vec2::ZERO, 0.0));
            remote.set_pose(pose.x, pose.y, pose.angle);
        }
    }

    /// Overlay object on any tile the viewer's box touches.
    pub fn pickup_in_reach(&self) -> Option<((i32, i32), OverlayObject)> {
        self.viewer
            .touched
            .iter()
            .find_map(|&(x, y)| self.grid.overlay_at(x, y).map(|obj| ((x, y), obj)))
    }

    /// Claim the first reachable pickup, clearing its overlay slot.
    pub fn claim_pickup(&mut self) -> Option<OverlayObject> {
        let ((x, y), _) = self.pickup_in_reach()?;
        self.grid.take_overlay(x, y)
    }

    /// Run one frame of the pipeline and return the ordered draw list.
    pub fn frame(
        &mut self,
        input: &InputState,
        dt: f32,
        screen_w: usize,
        screen_h: usize,
        outbox: &Outbox,
    ) -> Vec<DrawCommand> {
        // Movement and weapon state.
        self.viewer.apply_input(input, &self.config);
        self.viewer.advance(&self.grid, self.config.tile_size, dt);

        if input.reload && self.viewer.begin_reload() {
            outbox.push(&OutboundEvent::Reload {
                actor: self.viewer.id,
            });
        }
        if input.switch && self.viewer.begin_switch() {
            outbox.push(&OutboundEvent::WeaponSwitch {
                actor: self.viewer.id,
                slot: self.viewer.weapons.other_slot() as u8,
            });
        }
        if input.melee {
            self.viewer.begin_melee();
        }
        self.viewer.tick_action(dt);

        // View cone.
        let fov = self.config.effective_fov(self.viewer.aiming);
        let proj = Projection::new(screen_w, screen_h, fov, self.config.ray_density.columns());
        let origin = self.viewer.center();
        let hits = ray::cast_fov(
            &self.grid,
            origin,
            self.viewer.angle,
            fov,
            proj.columns(),
            self.config.tile_size,
            self.config.max_ray_distance,
        );

        let walls: Vec<WallEntry> = hits
            .iter()
            .enumerate()
            .filter_map(|(column, hit)| {
                hit.map(|hit| WallEntry {
                    hit,
                    slice: proj.project_slice(&hit, column, self.config.tile_size, 0.0),
                })
            })
            .collect();

        let sprites: Vec<(ActorId, ActorSprite)> = self
            .remotes
            .values()
            .filter_map(|remote| {
                proj.project_actor(origin, self.viewer.angle, remote.center(), 0.0)
                    .map(|sprite| (remote.id, sprite))
            })
            .collect();

        // Combat. The crosshair scan uses this frame's geometry, so the
        // shot resolves against exactly what the player sees.
        if input.fire && self.viewer.try_fire() {
            if let Some(weapon) = self.viewer.weapons.active_weapon() {
                outbox.push(&OutboundEvent::Shot {
                    shooter: self.viewer.id,
                    weapon,
                });
                let center_wall = hits
                    .get(proj.columns() / 2)
                    .copied()
                    .flatten()
                    .map(|hit| hit.distance);
                if let Some((target, part)) = hit_scan(&sprites, center_wall, &proj) {
                    outbox.push(&OutboundEvent::Hit {
                        shooter: self.viewer.id,
                        target,
                        part,
                        damage: actor::base_damage(weapon) * part.damage_multiplier(),
                    });
                }
            }
        }

        // Own pose broadcast, every frame.
        outbox.push(&OutboundEvent::Pose {
            x: origin.x,
            y: origin.y,
            angle: self.viewer.angle,
        });

        let actors = sprites
            .iter()
            .map(|&(_, sprite)| ActorEntry {
                texture: ENEMY_TEXTURE,
                sprite,
            })
            .collect();
        composite::composite(walls, actors)
    }
}

/// Nearest actor whose sprite covers the crosshair and is not behind the
/// wall at the center column. Returns the struck body part.
fn hit_scan(
    sprites: &[(ActorId, ActorSprite)],
    center_wall_distance: Option<f32>,
    proj: &Projection,
) -> Option<(ActorId, BodyPart)> {
    let (cx, cy) = proj.screen_center();
    sprites
        .iter()
        .filter(|(_, sprite)| center_wall_distance.is_none_or(|wall| sprite.distance < wall))
        .filter_map(|&(id, sprite)| sprite.part_at(cx, cy).map(|part| (id, sprite.distance, part)))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(id, _, part)| (id, part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::net::RemotePose;

    const TS: f32 = 16.0;

    fn world() -> World {
        World::new(Level::demo(TS), EngineConfig::default()).unwrap()
    }

    #[test]
    fn invalid_config_is_refused_at_construction() {
        let cfg = EngineConfig {
            fov_degrees: 10.0,
            ..EngineConfig::default()
        };
        assert!(World::new(Level::demo(TS), cfg).is_err());
    }

    #[test]
    fn frame_emits_draw_list_and_pose() {
        let mut w = world();
        let outbox = Outbox::new();
        let commands = w.frame(&InputState::default(), 1.0 / 60.0, 640, 480, &outbox);
        assert!(!commands.is_empty());
        let wire = outbox.drain();
        assert!(wire.iter().any(|msg| msg.contains("\"event\":\"pose\"")));
    }

    #[test]
    fn remotes_follow_the_snapshot_cell() {
        let mut w = world();
        let cell = SnapshotCell::new();
        cell.publish(
            9,
            RemotePose {
                x: 5.5 * TS,
                y: 1.5 * TS,
                angle: 0.0,
            },
            0.0,
        );
        w.sync_remotes(&cell, 0.1);
        assert_eq!(w.remotes.len(), 1);
        assert!((w.remotes[&9].center().x - 5.5 * TS).abs() < 1e-4);

        // Unseen past the grace period: dropped.
        w.sync_remotes(&cell, SNAPSHOT_GRACE + 1.0);
        assert!(w.remotes.is_empty());
    }

    #[test]
    fn shot_straight_ahead_reports_a_hit() {
        let mut w = world();
        let cell = SnapshotCell::new();
        // Spawn is tile (1,1); the row y=1 is clear through to x=5.
        cell.publish(
            4,
            RemotePose {
                x: 4.5 * TS,
                y: 1.5 * TS,
                angle: 0.0,
            },
            0.0,
        );
        w.sync_remotes(&cell, 0.0);
        let outbox = Outbox::new();
        let input = InputState {
            fire: true,
            ..InputState::default()
        };
        w.frame(&input, 1.0 / 60.0, 640, 480, &outbox);
        let wire = outbox.drain();
        assert!(wire.iter().any(|msg| msg.contains("\"event\":\"shot\"")));
        assert!(
            wire.iter()
                .any(|msg| msg.contains("\"event\":\"hit\"") && msg.contains("\"target\":4"))
        );
    }

    #[test]
    fn wall_occludes_the_hit_scan() {
        let mut w = world();
        let cell = SnapshotCell::new();
        // Behind the demo map's border wall at x=9.
        cell.publish(
            4,
            RemotePose {
                x: 12.5 * TS,
                y: 1.5 * TS,
                angle: 0.0,
            },
            0.0,
        );
        w.sync_remotes(&cell, 0.0);
        let outbox = Outbox::new();
        let input = InputState {
            fire: true,
            ..InputState::default()
        };
        w.frame(&input, 1.0 / 60.0, 640, 480, &outbox);
        let wire = outbox.drain();
        assert!(wire.iter().any(|msg| msg.contains("\"event\":\"shot\"")));
        assert!(!wire.iter().any(|msg| msg.contains("\"event\":\"hit\"")));
    }

    #[test]
    fn viewer_cannot_leave_the_bordered_map() {
        let mut w = world();
        let outbox = Outbox::new();
        let input = InputState {
            forward: -1.0,
            ..InputState::default()
        };
        // Push against the left border wall for a while.
        for _ in 0..300 {
            w.frame(&input, 1.0 / 60.0, 640, 480, &outbox);
        }
        assert!(w.viewer.pos.x >= TS);
    }

    #[test]
    fn pickup_is_claimed_from_a_touched_tile() {
        let mut w = world();
        let outbox = Outbox::new();
        // Walk the viewer onto the demo pickup tile at (8,1).
        w.viewer.set_pose(8.5 * TS, 1.5 * TS, 0.0);
        w.frame(&InputState::default(), 1.0 / 60.0, 640, 480, &outbox);
        let (tile, _) = w.pickup_in_reach().expect("overlay within reach");
        assert_eq!(tile, (8, 1));
        assert!(w.claim_pickup().is_some());
        assert!(w.pickup_in_reach().is_none());
    }
}
