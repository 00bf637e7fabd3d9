//! Tile content and the factory interface that issues and reclaims it.

use std::collections::BTreeMap;

use tile_defence_core::{ContentType, TowerConfig, TowerKind};

use crate::towers::Tower;

/// Content held in a tile's single content slot.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    /// Nothing placed on the tile.
    Empty,
    /// Goal tile that enemies walk toward.
    Destination,
    /// Impassable obstacle.
    Wall,
    /// Tile enemies enter the board from.
    SpawnPoint,
    /// Impassable defender with its own per-tick state.
    Tower(Tower),
}

impl Content {
    /// Classification of the content.
    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        match self {
            Self::Empty => ContentType::Empty,
            Self::Destination => ContentType::Destination,
            Self::Wall => ContentType::Wall,
            Self::SpawnPoint => ContentType::SpawnPoint,
            Self::Tower(_) => ContentType::Tower,
        }
    }

    /// Reports whether the content prevents paths from growing through the tile.
    #[must_use]
    pub const fn blocks_path(&self) -> bool {
        self.content_type().blocks_path()
    }

    /// Tower stored in the slot, if any.
    #[must_use]
    pub const fn as_tower(&self) -> Option<&Tower> {
        match self {
            Self::Tower(tower) => Some(tower),
            _ => None,
        }
    }

    /// Mutable tower stored in the slot, if any.
    pub fn as_tower_mut(&mut self) -> Option<&mut Tower> {
        match self {
            Self::Tower(tower) => Some(tower),
            _ => None,
        }
    }
}

/// Tag for content that carries no state of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Nothing placed on the tile.
    Empty,
    /// Goal tile.
    Destination,
    /// Impassable obstacle.
    Wall,
    /// Enemy entry tile.
    SpawnPoint,
}

/// Issues fresh content instances and takes back replaced ones.
///
/// The board never builds content itself: every instance it stores came from
/// a factory and is handed back through [`ContentFactory::reclaim`] when it is
/// replaced or the board is cleared.
pub trait ContentFactory {
    /// Returns a fresh instance of stateless content.
    fn get(&mut self, kind: ContentKind) -> Content;

    /// Returns a freshly configured tower.
    fn get_tower(&mut self, kind: TowerKind) -> Content;

    /// Takes back content that left the board.
    fn reclaim(&mut self, content: Content);
}

/// Default content factory keyed by tower tuning.
#[derive(Clone, Debug)]
pub struct ContentPool {
    towers: BTreeMap<TowerKind, TowerConfig>,
    issued: u64,
    reclaimed: u64,
}

impl ContentPool {
    /// Creates a pool that builds towers from their default tuning.
    #[must_use]
    pub fn new() -> Self {
        let towers = [TowerKind::Laser, TowerKind::Mortar]
            .into_iter()
            .map(|kind| (kind, kind.default_config()))
            .collect();
        Self {
            towers,
            issued: 0,
            reclaimed: 0,
        }
    }

    /// Overrides the tuning used for a tower kind.
    #[must_use]
    pub fn with_tower_config(mut self, kind: TowerKind, config: TowerConfig) -> Self {
        let _ = self.towers.insert(kind, config);
        self
    }

    /// Tuning applied to towers of the provided kind.
    #[must_use]
    pub fn tower_config(&self, kind: TowerKind) -> TowerConfig {
        self.towers
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_config())
    }

    /// Number of instances issued and not yet reclaimed.
    #[must_use]
    pub const fn live(&self) -> u64 {
        self.issued - self.reclaimed
    }
}

impl Default for ContentPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentFactory for ContentPool {
    fn get(&mut self, kind: ContentKind) -> Content {
        self.issued += 1;
        match kind {
            ContentKind::Empty => Content::Empty,
            ContentKind::Destination => Content::Destination,
            ContentKind::Wall => Content::Wall,
            ContentKind::SpawnPoint => Content::SpawnPoint,
        }
    }

    fn get_tower(&mut self, kind: TowerKind) -> Content {
        self.issued += 1;
        Content::Tower(Tower::new(kind, &self.tower_config(kind)))
    }

    fn reclaim(&mut self, content: Content) {
        debug_assert!(self.reclaimed < self.issued, "reclaimed foreign content");
        self.reclaimed += 1;
        drop(content);
    }
}
