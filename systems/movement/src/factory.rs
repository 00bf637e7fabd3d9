use std::collections::BTreeMap;

use rand::Rng;
use tile_defence_core::{EnemyConfig, EnemyId, EnemyKind, TileIndex};
use tile_defence_world::Board;

use crate::{Enemy, EnemyTraits, MAX_PATH_OFFSET};

/// Issues enemies with sampled traits and takes finished ones back.
#[derive(Clone, Debug)]
pub struct EnemyFactory {
    configs: BTreeMap<EnemyKind, EnemyConfig>,
    next_id: u32,
    issued: u64,
    reclaimed: u64,
}

impl EnemyFactory {
    /// Creates a factory that uses each kind's default tuning.
    #[must_use]
    pub fn new() -> Self {
        let configs = [EnemyKind::Small, EnemyKind::Medium, EnemyKind::Large]
            .into_iter()
            .map(|kind| (kind, kind.default_config()))
            .collect();
        Self {
            configs,
            next_id: 0,
            issued: 0,
            reclaimed: 0,
        }
    }

    /// Overrides the tuning used for an enemy kind.
    #[must_use]
    pub fn with_config(mut self, kind: EnemyKind, config: EnemyConfig) -> Self {
        let _ = self.configs.insert(kind, config);
        self
    }

    /// Tuning applied to enemies of the provided kind.
    #[must_use]
    pub fn config(&self, kind: EnemyKind) -> EnemyConfig {
        self.configs
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_config())
    }

    /// Samples traits for `kind` and spawns the enemy on `tile`.
    pub fn spawn<R>(
        &mut self,
        kind: EnemyKind,
        board: &Board,
        tile: TileIndex,
        rng: &mut R,
    ) -> Enemy
    where
        R: Rng + ?Sized,
    {
        let traits = self.sample(kind, rng);
        let id = EnemyId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.issued += 1;
        Enemy::spawn(id, kind, traits, board, tile)
    }

    /// Takes back an enemy that left its registry.
    pub fn reclaim(&mut self, enemy: Enemy) {
        debug_assert!(self.reclaimed < self.issued, "reclaimed a foreign enemy");
        self.reclaimed += 1;
        drop(enemy);
    }

    /// Number of enemies issued and not yet reclaimed.
    #[must_use]
    pub const fn live(&self) -> u64 {
        self.issued - self.reclaimed
    }

    fn sample<R>(&self, kind: EnemyKind, rng: &mut R) -> EnemyTraits
    where
        R: Rng + ?Sized,
    {
        let config = self.config(kind);
        EnemyTraits {
            scale: config.scale.clamped(0.5, 2.0).lerp(rng.gen()),
            speed: config.speed.clamped(0.2, 5.0).lerp(rng.gen()),
            path_offset: config
                .path_offset
                .clamped(-MAX_PATH_OFFSET, MAX_PATH_OFFSET)
                .lerp(rng.gen()),
            health: config.health.lerp(rng.gen()),
        }
    }
}

impl Default for EnemyFactory {
    fn default() -> Self {
        Self::new()
    }
}
