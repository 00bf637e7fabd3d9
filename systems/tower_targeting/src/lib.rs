#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that acquires and tracks tower targets from enemy snapshots.
//!
//! Acquisition queries a vertical capsule around the tower and picks one of
//! the overlapping enemies uniformly at random. A tracked target is kept
//! until its flat distance exceeds the range plus its hit radius, so towers
//! only re-roll when they lose their current target.

use glam::Vec3;
use rand::Rng;
use tile_defence_core::{EnemyId, EnemySnapshot, EnemyView};

/// Height of the acquisition capsule's axis above the tower's base.
pub const CAPSULE_HEIGHT: f32 = 3.0;

/// Tower targeting system that reuses its hit buffer between queries.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    hits: Vec<EnemyId>,
}

impl TowerTargeting {
    /// Creates a new targeting system with an empty hit buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps `current` while it stays in range, otherwise acquires a new target.
    ///
    /// Returns the snapshot of the enemy the tower should attack this tick.
    pub fn retain_or_acquire<'a, R>(
        &mut self,
        origin: Vec3,
        range: f32,
        current: Option<EnemyId>,
        enemies: &'a EnemyView,
        rng: &mut R,
    ) -> Option<&'a EnemySnapshot>
    where
        R: Rng + ?Sized,
    {
        if let Some(snapshot) = current.and_then(|id| track(origin, range, id, enemies)) {
            return Some(snapshot);
        }
        self.acquire(origin, range, enemies, rng)
    }

    /// Picks a random enemy whose hit sphere overlaps the tower's capsule.
    pub fn acquire<'a, R>(
        &mut self,
        origin: Vec3,
        range: f32,
        enemies: &'a EnemyView,
        rng: &mut R,
    ) -> Option<&'a EnemySnapshot>
    where
        R: Rng + ?Sized,
    {
        self.hits.clear();
        let top = origin + Vec3::Y * CAPSULE_HEIGHT;
        self.hits.extend(
            enemies
                .iter()
                .filter(|enemy| capsule_overlaps(origin, top, range, enemy))
                .map(|enemy| enemy.id),
        );

        if self.hits.is_empty() {
            return None;
        }
        let pick = self.hits[rng.gen_range(0..self.hits.len())];
        enemies.get(pick)
    }
}

/// Returns the tracked enemy's snapshot while it remains within range.
///
/// The hysteresis slack is the target's hit radius; an enemy missing from the
/// view is lost as well.
#[must_use]
pub fn track(
    origin: Vec3,
    range: f32,
    target: EnemyId,
    enemies: &EnemyView,
) -> Option<&EnemySnapshot> {
    let snapshot = enemies.get(target)?;
    let dx = origin.x - snapshot.position.x;
    let dz = origin.z - snapshot.position.z;
    let reach = range + snapshot.hit_radius();
    if dx * dx + dz * dz > reach * reach {
        return None;
    }
    Some(snapshot)
}

/// Reports whether the enemy's hit sphere touches the capsule around `bottom..top`.
#[must_use]
pub fn capsule_overlaps(bottom: Vec3, top: Vec3, radius: f32, enemy: &EnemySnapshot) -> bool {
    let axis = top - bottom;
    let length_sq = axis.length_squared();
    let t = if length_sq > 0.0 {
        ((enemy.position - bottom).dot(axis) / length_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = bottom + axis * t;
    let reach = radius + enemy.hit_radius();
    closest.distance_squared(enemy.position) <= reach * reach
}
