//! Actor state and movement control
//!
//! An actor is the viewer or a remote player: continuous position, facing
//! angle, an axis-aligned box for collision, and a two-slot weapon loadout.
//! Weapon actions (reload, switch, melee) are timed and mutually exclusive
//! with firing; they are tracked independently of motion.

use glam::Vec2;

use crate::collision::{self, MoveBox};
use crate::config::EngineConfig;
use crate::consts::{ADS_MULT, PLAYER_BOX, RUN_MULT, WALK_SPEED};
use crate::level::TileGrid;
use crate::{angle_to_vel, normalize_angle};

pub type ActorId = u32;
pub type WeaponId = u8;

pub const SLOT_COUNT: usize = 2;

pub const RELOAD_SECS: f32 = 1.8;
pub const SWITCH_SECS: f32 = 0.7;
pub const MELEE_SECS: f32 = 0.45;

/// Rounds one magazine holds
pub fn mag_capacity(weapon: WeaponId) -> u32 {
    match weapon {
        1 => 30,
        2 => 12,
        _ => 8,
    }
}

/// Seconds between shots
pub fn fire_interval(weapon: WeaponId) -> f32 {
    match weapon {
        1 => 0.1,
        2 => 0.25,
        _ => 0.8,
    }
}

/// Damage before the body-part multiplier
pub fn base_damage(weapon: WeaponId) -> f32 {
    match weapon {
        1 => 24.0,
        2 => 35.0,
        _ => 60.0,
    }
}

/// Timed weapon sub-state. `Ready` is the only state that allows firing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeaponAction {
    Ready,
    Reloading { remaining: f32 },
    Switching { remaining: f32, to_slot: usize },
    Meleeing { remaining: f32 },
}

/// Completion notice from `Actor::tick_action`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionDone {
    Reloaded,
    Switched,
    MeleeLanded,
}

/// Coarse motion state derived from the intended velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Idle,
    Moving,
}

/// Fixed two-slot loadout. Ammo bookkeeping goes through the accessors so
/// the active index can never point at an empty slot array position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponSlots {
    slots: [Option<WeaponId>; SLOT_COUNT],
    ammo: [u32; SLOT_COUNT],
    mag: [u32; SLOT_COUNT],
    active: usize,
}

impl WeaponSlots {
    pub fn new(primary: WeaponId, reserve: u32) -> Self {
        let mut s = Self {
            slots: [None; SLOT_COUNT],
            ammo: [0; SLOT_COUNT],
            mag: [0; SLOT_COUNT],
            active: 0,
        };
        s.equip(0, primary, reserve);
        s
    }

    /// Put a weapon in a slot with a full magazine. Returns false for a
    /// slot index outside the loadout.
    pub fn equip(&mut self, slot: usize, weapon: WeaponId, reserve: u32) -> bool {
        if slot >= SLOT_COUNT {
            return false;
        }
        self.slots[slot] = Some(weapon);
        self.mag[slot] = mag_capacity(weapon);
        self.ammo[slot] = reserve;
        true
    }

    pub fn active_slot(&self) -> usize {
        self.active
    }

    pub fn active_weapon(&self) -> Option<WeaponId> {
        self.slots[self.active]
    }

    pub fn mag(&self) -> u32 {
        self.mag[self.active]
    }

    pub fn reserve(&self) -> u32 {
        self.ammo[self.active]
    }

    /// The other slot index, whether or not it holds a weapon.
    pub fn other_slot(&self) -> usize {
        (self.active + 1) % SLOT_COUNT
    }

    /// Whether switching to `slot` makes sense: in range, holds a weapon,
    /// and is not already active.
    pub fn can_select(&self, slot: usize) -> bool {
        slot < SLOT_COUNT && slot != self.active && self.slots[slot].is_some()
    }

    fn select(&mut self, slot: usize) {
        if self.can_select(slot) {
            self.active = slot;
        }
    }

    /// Take one round from the active magazine.
    pub fn consume_round(&mut self) -> bool {
        if self.mag[self.active] == 0 {
            return false;
        }
        self.mag[self.active] -= 1;
        true
    }

    /// Move rounds from reserve into the magazine, up to capacity.
    fn finish_reload(&mut self) {
        let Some(weapon) = self.slots[self.active] else {
            return;
        };
        let space = mag_capacity(weapon) - self.mag[self.active];
        let moved = space.min(self.ammo[self.active]);
        self.mag[self.active] += moved;
        self.ammo[self.active] -= moved;
    }

    /// Whether a reload would change anything.
    pub fn reload_useful(&self) -> bool {
        match self.slots[self.active] {
            Some(w) => self.mag[self.active] < mag_capacity(w) && self.ammo[self.active] > 0,
            None => false,
        }
    }
}

/// Per-frame movement intent, produced by the input collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    /// Forward axis, -1..=1
    pub forward: f32,
    /// Strafe axis, -1..=1, positive to the right
    pub strafe: f32,
    /// Raw turn delta (mouse counts), scaled by sensitivity
    pub turn: f32,
    pub run: bool,
    pub aim: bool,
    pub fire: bool,
    pub reload: bool,
    pub switch: bool,
    pub melee: bool,
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub id: ActorId,
    /// Top-left corner of the bounding box, world units
    pub pos: Vec2,
    pub size: Vec2,
    /// Facing angle, normalized to [-π, π)
    pub angle: f32,
    /// Intended velocity for this frame, world units per second
    pub vel: Vec2,
    /// Tiles the box currently touches, for overlay/pickup interaction
    pub touched: Vec<(i32, i32)>,
    pub health: f32,
    pub weapons: WeaponSlots,
    pub action: WeaponAction,
    pub fire_cooldown: f32,
    pub running: bool,
    pub aiming: bool,
}

impl Actor {
    pub fn new(id: ActorId, pos: Vec2, angle: f32) -> Self {
        Self {
            id,
            pos,
            size: Vec2::splat(PLAYER_BOX),
            angle: normalize_angle(angle),
            vel: Vec2::ZERO,
            touched: Vec::new(),
            health: 100.0,
            weapons: WeaponSlots::new(1, 90),
            action: WeaponAction::Ready,
            fire_cooldown: 0.0,
            running: false,
            aiming: false,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn move_box(&self) -> MoveBox {
        MoveBox::new(self.pos, self.size)
    }

    pub fn motion(&self) -> Motion {
        if self.vel.length_squared() > f32::EPSILON {
            Motion::Moving
        } else {
            Motion::Idle
        }
    }

    /// Turn the facing and build the world-space intended velocity from
    /// the input axes. Running and aiming scale speed; aiming also narrows
    /// turn sensitivity through the zoom factor.
    pub fn apply_input(&mut self, input: &InputState, cfg: &EngineConfig) {
        self.aiming = input.aim;
        self.running = input.run && !input.aim;

        self.angle =
            normalize_angle(self.angle + input.turn * cfg.effective_sensitivity(self.aiming));

        let mut axes = Vec2::new(input.forward, input.strafe);
        if axes.length_squared() > 1.0 {
            axes = axes.normalize();
        }

        let speed = WALK_SPEED
            * if self.aiming {
                ADS_MULT
            } else if self.running {
                RUN_MULT
            } else {
                1.0
            };

        let fwd = angle_to_vel(self.angle, 1.0);
        let right = Vec2::new(-fwd.y, fwd.x);
        self.vel = (fwd * axes.x + right * axes.y) * speed;
    }

    /// Move by the intended velocity through the collision resolver and
    /// refresh the touched-tiles set.
    pub fn advance(&mut self, grid: &TileGrid, tile_size: f32, dt: f32) {
        self.pos = collision::resolve(grid, &self.move_box(), self.vel * dt, tile_size);
        self.touched = collision::overlapping_tiles(&self.move_box(), tile_size);
    }

    /// Overwrite the pose from a network snapshot.
    pub fn set_pose(&mut self, x: f32, y: f32, angle: f32) {
        self.pos = Vec2::new(x, y) - self.size * 0.5;
        self.angle = normalize_angle(angle);
    }

    pub fn can_fire(&self) -> bool {
        self.action == WeaponAction::Ready
            && self.fire_cooldown <= 0.0
            && self.weapons.active_weapon().is_some()
            && self.weapons.mag() > 0
    }

    /// Fire one round if the gate allows it.
    pub fn try_fire(&mut self) -> bool {
        if !self.can_fire() {
            return false;
        }
        let Some(weapon) = self.weapons.active_weapon() else {
            return false;
        };
        if !self.weapons.consume_round() {
            return false;
        }
        self.fire_cooldown = fire_interval(weapon);
        true
    }

    pub fn begin_reload(&mut self) -> bool {
        if self.action != WeaponAction::Ready || !self.weapons.reload_useful() {
            return false;
        }
        self.action = WeaponAction::Reloading {
            remaining: RELOAD_SECS,
        };
        true
    }

    pub fn begin_switch(&mut self) -> bool {
        let to_slot = self.weapons.other_slot();
        if self.action != WeaponAction::Ready || !self.weapons.can_select(to_slot) {
            return false;
        }
        self.action = WeaponAction::Switching {
            remaining: SWITCH_SECS,
            to_slot,
        };
        true
    }

    pub fn begin_melee(&mut self) -> bool {
        if self.action != WeaponAction::Ready {
            return false;
        }
        self.action = WeaponAction::Meleeing {
            remaining: MELEE_SECS,
        };
        true
    }

    /// Advance timers; returns what just completed, if anything.
    pub fn tick_action(&mut self, dt: f32) -> Option<ActionDone> {
        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);
        match &mut self.action {
            WeaponAction::Ready => None,
            WeaponAction::Reloading { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.weapons.finish_reload();
                    self.action = WeaponAction::Ready;
                    Some(ActionDone::Reloaded)
                } else {
                    None
                }
            }
            WeaponAction::Switching { remaining, to_slot } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    let slot = *to_slot;
                    self.weapons.select(slot);
                    self.action = WeaponAction::Ready;
                    Some(ActionDone::Switched)
                } else {
                    None
                }
            }
            WeaponAction::Meleeing { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.action = WeaponAction::Ready;
                    Some(ActionDone::MeleeLanded)
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn cfg() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn forward_input_moves_along_facing() {
        let mut a = Actor::new(0, Vec2::ZERO, 0.0);
        a.apply_input(
            &InputState {
                forward: 1.0,
                ..InputState::default()
            },
            &cfg(),
        );
        assert!((a.vel.x - WALK_SPEED).abs() < 1e-4);
        assert!(a.vel.y.abs() < 1e-4);
    }

    #[test]
    fn strafe_is_perpendicular_to_facing() {
        let mut a = Actor::new(0, Vec2::ZERO, 0.0);
        a.apply_input(
            &InputState {
                strafe: 1.0,
                ..InputState::default()
            },
            &cfg(),
        );
        // Facing +X with y down: strafing right points +Y.
        assert!(a.vel.x.abs() < 1e-4);
        assert!((a.vel.y - WALK_SPEED).abs() < 1e-4);
    }

    #[test]
    fn diagonal_input_does_not_exceed_walk_speed() {
        let mut a = Actor::new(0, Vec2::ZERO, FRAC_PI_2);
        a.apply_input(
            &InputState {
                forward: 1.0,
                strafe: 1.0,
                ..InputState::default()
            },
            &cfg(),
        );
        assert!((a.vel.length() - WALK_SPEED).abs() < 1e-3);
    }

    #[test]
    fn run_and_ads_scale_speed() {
        let mut a = Actor::new(0, Vec2::ZERO, 0.0);
        let forward = InputState {
            forward: 1.0,
            ..InputState::default()
        };
        a.apply_input(
            &InputState {
                run: true,
                ..forward
            },
            &cfg(),
        );
        assert!((a.vel.length() - WALK_SPEED * RUN_MULT).abs() < 1e-3);

        a.apply_input(
            &InputState {
                aim: true,
                run: true,
                ..forward
            },
            &cfg(),
        );
        // Aiming wins over running.
        assert!((a.vel.length() - WALK_SPEED * ADS_MULT).abs() < 1e-3);
    }

    #[test]
    fn fire_consumes_rounds_and_respects_cooldown() {
        let mut a = Actor::new(0, Vec2::ZERO, 0.0);
        let mag_before = a.weapons.mag();
        assert!(a.try_fire());
        assert_eq!(a.weapons.mag(), mag_before - 1);
        // Cooldown still running.
        assert!(!a.try_fire());
        a.tick_action(fire_interval(1) + 0.01);
        assert!(a.try_fire());
    }

    #[test]
    fn reload_transfers_from_reserve() {
        let mut a = Actor::new(0, Vec2::ZERO, 0.0);
        for _ in 0..5 {
            a.tick_action(1.0);
            assert!(a.try_fire());
        }
        let reserve_before = a.weapons.reserve();
        assert!(a.begin_reload());
        // Reloading blocks firing.
        assert!(!a.try_fire());
        assert_eq!(a.tick_action(RELOAD_SECS / 2.0), None);
        assert_eq!(a.tick_action(RELOAD_SECS), Some(ActionDone::Reloaded));
        assert_eq!(a.weapons.mag(), mag_capacity(1));
        assert_eq!(a.weapons.reserve(), reserve_before - 5);
        // Full magazine: another reload is refused.
        assert!(!a.begin_reload());
    }

    #[test]
    fn switch_needs_a_weapon_in_the_other_slot() {
        let mut a = Actor::new(0, Vec2::ZERO, 0.0);
        assert!(!a.begin_switch());
        assert!(a.weapons.equip(1, 2, 36));
        assert!(a.begin_switch());
        assert!(!a.try_fire());
        assert_eq!(a.tick_action(SWITCH_SECS + 0.01), Some(ActionDone::Switched));
        assert_eq!(a.weapons.active_weapon(), Some(2));
        assert_eq!(a.weapons.active_slot(), 1);
    }

    #[test]
    fn slot_index_out_of_range_is_refused() {
        let mut slots = WeaponSlots::new(1, 10);
        assert!(!slots.equip(SLOT_COUNT, 2, 0));
        assert!(!slots.can_select(SLOT_COUNT));
    }

    #[test]
    fn melee_excludes_firing_until_done() {
        let mut a = Actor::new(0, Vec2::ZERO, 0.0);
        assert!(a.begin_melee());
        assert!(!a.try_fire());
        assert!(!a.begin_reload());
        assert_eq!(a.tick_action(MELEE_SECS + 0.01), Some(ActionDone::MeleeLanded));
        assert!(a.try_fire());
    }

    #[test]
    fn motion_state_follows_velocity() {
        let mut a = Actor::new(0, Vec2::ZERO, 0.0);
        assert_eq!(a.motion(), Motion::Idle);
        a.apply_input(
            &InputState {
                forward: 1.0,
                ..InputState::default()
            },
            &cfg(),
        );
        assert_eq!(a.motion(), Motion::Moving);
        a.apply_input(&InputState::default(), &cfg());
        assert_eq!(a.motion(), Motion::Idle);
    }

    #[test]
    fn empty_magazine_blocks_fire() {
        let mut a = Actor::new(0, Vec2::ZERO, 0.0);
        for _ in 0..mag_capacity(1) {
            a.tick_action(1.0);
            assert!(a.try_fire());
        }
        a.tick_action(1.0);
        assert!(!a.try_fire());
    }
}
