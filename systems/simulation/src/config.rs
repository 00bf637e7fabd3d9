//! Tuning loaded from TOML before a session starts.

use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tile_defence_core::{
    BoardSize, BoardSizeError, EnemyConfig, EnemyKind, TowerConfig, TowerKind, TuningError,
};
use tile_defence_system_spawning::{GameScenario, ScenarioError};

/// Everything needed to start a simulation.
///
/// Every field is optional in TOML and falls back to its default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Board dimensions.
    pub board: BoardConfig,
    /// Seed of the simulation's random number generator.
    pub seed: u64,
    /// Player health at the start of every game; zero or less disables defeat.
    pub player_health: i32,
    /// Tuning per tower kind.
    pub towers: TowerTable,
    /// Tuning per enemy kind.
    pub enemies: EnemyTable,
    /// Waves played each game.
    pub scenario: GameScenario,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            seed: 0,
            player_health: 10,
            towers: TowerTable::default(),
            enemies: EnemyTable::default(),
            scenario: GameScenario::default(),
        }
    }
}

/// Board dimensions as written in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            columns: 11,
            rows: 11,
        }
    }
}

/// Tower tuning keyed by kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerTable {
    /// Beam tower tuning.
    pub laser: TowerConfig,
    /// Ballistic tower tuning.
    pub mortar: TowerConfig,
}

impl TowerTable {
    /// Tuning of the provided kind.
    #[must_use]
    pub const fn get(&self, kind: TowerKind) -> TowerConfig {
        match kind {
            TowerKind::Laser => self.laser,
            TowerKind::Mortar => self.mortar,
        }
    }
}

impl Default for TowerTable {
    fn default() -> Self {
        Self {
            laser: TowerKind::Laser.default_config(),
            mortar: TowerKind::Mortar.default_config(),
        }
    }
}

/// Enemy tuning keyed by kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTable {
    /// Tuning of small enemies.
    pub small: EnemyConfig,
    /// Tuning of medium enemies.
    pub medium: EnemyConfig,
    /// Tuning of large enemies.
    pub large: EnemyConfig,
}

impl EnemyTable {
    /// Tuning of the provided kind.
    #[must_use]
    pub const fn get(&self, kind: EnemyKind) -> EnemyConfig {
        match kind {
            EnemyKind::Small => self.small,
            EnemyKind::Medium => self.medium,
            EnemyKind::Large => self.large,
        }
    }
}

impl Default for EnemyTable {
    fn default() -> Self {
        Self {
            small: EnemyKind::Small.default_config(),
            medium: EnemyKind::Medium.default_config(),
            large: EnemyKind::Large.default_config(),
        }
    }
}

/// Reasons a configuration cannot be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration from {path}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The contents are not valid TOML for a configuration.
    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),
    /// The board dimensions are unusable.
    #[error("invalid board dimensions")]
    BoardSize(#[from] BoardSizeError),
    /// The scenario cannot be played.
    #[error("invalid scenario")]
    Scenario(#[from] ScenarioError),
    /// A tower kind carries unusable tuning.
    #[error("invalid tuning for {kind:?} towers")]
    Tower {
        /// Kind whose tuning was rejected.
        kind: TowerKind,
        /// Offending parameter.
        #[source]
        source: TuningError,
    },
    /// An enemy kind carries unusable tuning.
    #[error("invalid tuning for {kind:?} enemies")]
    Enemy {
        /// Kind whose tuning was rejected.
        kind: EnemyKind,
        /// Offending parameter.
        #[source]
        source: TuningError,
    },
}

impl SimulationConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks the board dimensions, the per-kind tuning and the scenario.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let _ = self.board_size()?;
        for kind in [TowerKind::Laser, TowerKind::Mortar] {
            self.towers
                .get(kind)
                .validate()
                .map_err(|source| ConfigError::Tower { kind, source })?;
        }
        for kind in [EnemyKind::Small, EnemyKind::Medium, EnemyKind::Large] {
            self.enemies
                .get(kind)
                .validate()
                .map_err(|source| ConfigError::Enemy { kind, source })?;
        }
        self.scenario.validate()?;
        Ok(())
    }

    /// Validated board dimensions.
    pub fn board_size(&self) -> Result<BoardSize, BoardSizeError> {
        BoardSize::new(self.board.columns, self.board.rows)
    }
}
