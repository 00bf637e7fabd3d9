#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves tower attacks against enemy snapshots.
//!
//! Beam towers request continuous damage for their tracked target. Ballistic
//! towers accumulate shot cadence and emit [`Launch`] requests solved for a
//! fixed launch speed; the driver turns those into [`Shell`] entities whose
//! detonations become [`Explosion`] entities dealing area damage.

mod projectiles;

use glam::{Vec2, Vec3};
use rand::Rng;
use tile_defence_core::{Damage, EnemyView, GRAVITY};
use tile_defence_system_tower_targeting::TowerTargeting;
use tile_defence_world::{AttackState, Tower};
use tracing::error;

pub use projectiles::{
    Detonation, Explosion, Shell, WarEntity, WarFactory, WarPool, EXPLOSION_DURATION,
};

/// Value the launch accumulator is held at while no target is available.
pub const LAUNCH_PROGRESS_HOLD: f32 = 0.9999;

/// Request to fire a shell, produced by a ballistic tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Launch {
    /// World-space point the shell leaves from.
    pub from: Vec3,
    /// Ground point the shell is aimed at.
    pub to: Vec3,
    /// Initial velocity.
    pub velocity: Vec3,
    /// Radius of the blast on impact.
    pub blast_radius: f32,
    /// Damage dealt to every enemy caught in the blast.
    pub damage: f32,
}

/// Tower combat system owning the targeting workspace.
#[derive(Debug, Default)]
pub struct TowerCombat {
    targeting: TowerTargeting,
}

impl TowerCombat {
    /// Creates a new tower combat system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one tick of the tower standing on the tile centred at `base`.
    ///
    /// Beam damage lands in `out_damage`; ballistic shots land in
    /// `out_launches`. The tower's tracked target is updated in place.
    #[allow(clippy::too_many_arguments)]
    pub fn update_tower<R>(
        &mut self,
        tower: &mut Tower,
        base: Vec3,
        enemies: &EnemyView,
        dt: f32,
        rng: &mut R,
        out_damage: &mut Vec<Damage>,
        out_launches: &mut Vec<Launch>,
    ) where
        R: Rng + ?Sized,
    {
        match *tower.attack() {
            AttackState::Beam { damage_per_second } => {
                let target = self
                    .targeting
                    .retain_or_acquire(base, tower.range(), tower.target(), enemies, rng)
                    .map(|snapshot| snapshot.id);
                tower.set_target(target);
                if let Some(enemy) = target {
                    out_damage.push(Damage {
                        enemy,
                        amount: damage_per_second * dt,
                    });
                }
            }
            AttackState::Ballistic {
                shots_per_second,
                blast_radius,
                shell_damage,
                launch_progress,
                launch_speed,
            } => {
                let mut progress = launch_progress + shots_per_second * dt;
                while progress >= 1.0 {
                    let target = self
                        .targeting
                        .retain_or_acquire(base, tower.range(), tower.target(), enemies, rng)
                        .copied();
                    tower.set_target(target.map(|snapshot| snapshot.id));

                    let Some(snapshot) = target else {
                        progress = LAUNCH_PROGRESS_HOLD;
                        break;
                    };
                    let from = base + Vec3::Y * tower.mount_height();
                    let to = Vec3::new(snapshot.position.x, 0.0, snapshot.position.z);
                    if let Some(velocity) = solve_launch(from, to, launch_speed) {
                        out_launches.push(Launch {
                            from,
                            to,
                            velocity,
                            blast_radius,
                            damage: shell_damage,
                        });
                    }
                    progress -= 1.0;
                }

                if let AttackState::Ballistic {
                    launch_progress, ..
                } = tower.attack_mut()
                {
                    *launch_progress = progress;
                }
            }
        }
    }
}

/// Discriminant of the launch-angle equation for horizontal distance `x`,
/// height difference `y` and launch speed `speed`.
///
/// Negative values mean the target is out of ballistic reach.
#[must_use]
pub fn launch_discriminant(x: f32, y: f32, speed: f32) -> f32 {
    let s2 = speed * speed;
    s2 * s2 - GRAVITY * (GRAVITY * x * x + 2.0 * y * s2)
}

/// Solves the high-arc launch velocity that lands a shell on `to`.
///
/// A target beyond the reach of `speed` is an invariant breach: acquisition
/// and tracking only ever hand over targets within range.
#[must_use]
pub fn solve_launch(from: Vec3, to: Vec3, speed: f32) -> Option<Vec3> {
    let flat = Vec2::new(to.x - from.x, to.z - from.z);
    let x = flat.length();
    let y = to.y - from.y;
    let r = launch_discriminant(x, y, speed);
    if r < 0.0 {
        debug_assert!(false, "launch speed {speed} cannot reach {x} tiles");
        error!(speed, distance = x, discriminant = r, "launch speed insufficient for range");
        return None;
    }
    if x <= f32::EPSILON {
        return Some(Vec3::Y * speed);
    }

    let direction = flat / x;
    let tan_theta = (speed * speed + r.sqrt()) / (GRAVITY * x);
    let cos_theta = tan_theta.atan().cos();
    let sin_theta = cos_theta * tan_theta;
    Some(Vec3::new(
        speed * cos_theta * direction.x,
        speed * sin_theta,
        speed * cos_theta * direction.y,
    ))
}
