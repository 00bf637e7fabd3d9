#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tile Defence simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative board, and the per-tick systems. Adapters submit [`Command`]
//! values describing desired content mutations, the board executes those
//! commands via its `apply` entry point, and the simulation driver broadcasts
//! [`Event`] values describing what happened during a tick. Systems consume
//! immutable snapshots such as [`EnemyView`] and respond with [`Damage`]
//! requests or new entities rather than mutating foreign state directly.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Tile Defence.";

/// Gravitational acceleration applied to ballistic projectiles, in units per second squared.
pub const GRAVITY: f32 = 9.81;

/// Hit radius of an enemy relative to its scale.
pub const HIT_RADIUS_PER_SCALE: f32 = 0.125;

/// Commands that express all permissible board mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Toggles a wall on an empty tile, or clears an existing wall.
    ToggleWall {
        /// Tile whose content should change.
        tile: TileCoord,
    },
    /// Toggles a destination on an empty tile, or clears an existing destination.
    ToggleDestination {
        /// Tile whose content should change.
        tile: TileCoord,
    },
    /// Toggles a spawn point on an empty tile, or clears an existing spawn point.
    ToggleSpawnPoint {
        /// Tile whose content should change.
        tile: TileCoord,
    },
    /// Places, swaps, or removes a tower of the provided kind.
    ToggleTower {
        /// Tile whose content should change.
        tile: TileCoord,
        /// Kind of tower requested.
        kind: TowerKind,
    },
    /// Discards the current session and starts a fresh game.
    NewGame,
}

/// Events broadcast after commands and per-tick updates were processed.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a tile now holds new content.
    ContentChanged {
        /// Tile whose content changed.
        tile: TileCoord,
        /// Content type the tile holds after the change.
        content: ContentType,
    },
    /// Reports that a placement request was rejected and rolled back.
    PlacementRejected {
        /// Tile targeted by the rejected request.
        tile: TileCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that an enemy entered the board.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of enemy that spawned.
        kind: EnemyKind,
        /// Spawn tile the enemy started on.
        tile: TileCoord,
    },
    /// Confirms that an enemy finished crossing a tile and entered the next one.
    EnemyEnteredTile {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Tile the enemy now occupies.
        tile: TileCoord,
    },
    /// Announces that an enemy reached a destination tile.
    EnemyReachedDestination {
        /// Identifier of the enemy.
        enemy: EnemyId,
    },
    /// Announces that an enemy ran out of health and left the board.
    EnemyKilled {
        /// Identifier of the enemy.
        enemy: EnemyId,
    },
    /// Confirms that a tower launched a shell.
    ShellLaunched {
        /// World-space point the shell left from.
        from: Vec3,
        /// Ground point the shell is aimed at.
        to: Vec3,
    },
    /// Reports that a shell hit the ground and resolved area damage.
    Detonated {
        /// Ground point of the impact.
        position: Vec3,
        /// Radius of the blast.
        blast_radius: f32,
        /// Number of enemies caught in the blast.
        hits: u32,
    },
    /// Announces that a new game started.
    NewGameStarted {
        /// Reason the previous session ended.
        outcome: GameOutcome,
    },
}

/// Reasons a session ends and a new game begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    /// Player health was exhausted.
    Defeat,
    /// The scenario completed and the board is clear of enemies.
    Victory,
    /// An adapter explicitly requested a new game.
    Requested,
}

/// Cardinal directions on the board plane.
///
/// North points toward increasing rows (positive world `z`), east toward
/// increasing columns (positive world `x`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward increasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward decreasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// Directions in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Direction reached by a clockwise quarter turn.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// Direction reached by a counter-clockwise quarter turn.
    #[must_use]
    pub const fn counter_clockwise(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::East => Self::North,
            Self::South => Self::East,
            Self::West => Self::South,
        }
    }

    /// Heading around the vertical axis in degrees; north is zero, east is 90.
    #[must_use]
    pub const fn angle(self) -> f32 {
        match self {
            Self::North => 0.0,
            Self::East => 90.0,
            Self::South => 180.0,
            Self::West => 270.0,
        }
    }

    /// Offset from a tile centre to the middle of the tile edge in this direction.
    #[must_use]
    pub fn half_vector(self) -> Vec3 {
        match self {
            Self::North => Vec3::new(0.0, 0.0, 0.5),
            Self::East => Vec3::new(0.5, 0.0, 0.0),
            Self::South => Vec3::new(0.0, 0.0, -0.5),
            Self::West => Vec3::new(-0.5, 0.0, 0.0),
        }
    }

    /// Classifies the turn required to switch from this heading to `next`.
    #[must_use]
    pub fn change_to(self, next: Direction) -> DirectionChange {
        if next == self {
            DirectionChange::None
        } else if next == self.clockwise() {
            DirectionChange::TurnRight
        } else if next == self.counter_clockwise() {
            DirectionChange::TurnLeft
        } else {
            DirectionChange::TurnAround
        }
    }
}

/// Turn classification between two consecutive headings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirectionChange {
    /// Heading is unchanged.
    None,
    /// Clockwise quarter turn.
    TurnRight,
    /// Counter-clockwise quarter turn.
    TurnLeft,
    /// Half turn.
    TurnAround,
}

/// Location of a single board tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Row-major index of a tile inside the board's tile array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileIndex(u32);

impl TileIndex {
    /// Creates a new tile index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index usable for slice access.
    #[must_use]
    pub const fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// Dimensions of the board measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSize {
    columns: u32,
    rows: u32,
}

impl BoardSize {
    /// Smallest permitted extent along either axis.
    pub const MIN_SIDE: u32 = 2;

    /// Creates a board size, rejecting boards narrower than two tiles.
    pub fn new(columns: u32, rows: u32) -> Result<Self, BoardSizeError> {
        if columns < Self::MIN_SIDE || rows < Self::MIN_SIDE {
            return Err(BoardSizeError::TooSmall { columns, rows });
        }
        if u64::from(columns) * u64::from(rows) > u64::from(u32::MAX) {
            return Err(BoardSizeError::TooLarge { columns, rows });
        }
        Ok(Self { columns, rows })
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of tiles on the board.
    #[must_use]
    pub const fn tile_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }
}

/// Reasons a board size is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum BoardSizeError {
    /// One of the sides is shorter than two tiles.
    #[error("board must be at least 2x2 tiles, got {columns}x{rows}")]
    TooSmall {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// The tile count does not fit a tile index.
    #[error("board of {columns}x{rows} tiles exceeds the addressable tile count")]
    TooLarge {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
}

/// Classification of the content a tile can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    /// Nothing placed on the tile.
    Empty,
    /// Goal tile that enemies walk toward.
    Destination,
    /// Impassable obstacle.
    Wall,
    /// Tile enemies enter the board from.
    SpawnPoint,
    /// Impassable defender.
    Tower,
}

impl ContentType {
    /// Reports whether the content prevents paths from growing through the tile.
    #[must_use]
    pub const fn blocks_path(self) -> bool {
        matches!(self, Self::Wall | Self::Tower)
    }
}

/// Types of towers that can be constructed on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Continuous beam that damages its target every tick.
    Laser,
    /// Ballistic launcher whose shells explode on impact.
    Mortar,
}

impl TowerKind {
    /// Default tuning for the tower kind.
    #[must_use]
    pub const fn default_config(self) -> TowerConfig {
        match self {
            Self::Laser => TowerConfig {
                range: 2.5,
                mount_height: 0.5,
                attack: AttackConfig::Beam {
                    damage_per_second: 10.0,
                },
            },
            Self::Mortar => TowerConfig {
                range: 3.5,
                mount_height: 1.0,
                attack: AttackConfig::Ballistic {
                    shots_per_second: 1.0,
                    blast_radius: 1.0,
                    shell_damage: 10.0,
                },
            },
        }
    }
}

/// Tuning parameters for a tower kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerConfig {
    /// Targeting range measured in tiles.
    pub range: f32,
    /// Height of the turret or launcher above the board plane.
    pub mount_height: f32,
    /// Attack modality and its parameters.
    pub attack: AttackConfig,
}

/// Attack modality of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "modality", rename_all = "snake_case")]
pub enum AttackConfig {
    /// Continuous damage applied to the tracked target.
    Beam {
        /// Damage dealt per second of contact.
        damage_per_second: f32,
    },
    /// Parabolic shells that resolve area damage on impact.
    Ballistic {
        /// Launch cadence.
        shots_per_second: f32,
        /// Radius of the blast around the impact point.
        blast_radius: f32,
        /// Damage dealt to every enemy caught in the blast.
        shell_damage: f32,
    },
}

impl TowerConfig {
    /// Checks that every parameter is a usable number.
    ///
    /// Distances and damage must be finite and non-negative; the launch
    /// cadence must be finite, positive and at most [`MAX_SHOTS_PER_SECOND`].
    pub fn validate(&self) -> Result<(), TuningError> {
        non_negative("range", self.range)?;
        non_negative("mount_height", self.mount_height)?;
        match self.attack {
            AttackConfig::Beam { damage_per_second } => {
                non_negative("damage_per_second", damage_per_second)
            }
            AttackConfig::Ballistic {
                shots_per_second,
                blast_radius,
                shell_damage,
            } => {
                if !(shots_per_second.is_finite()
                    && shots_per_second > 0.0
                    && shots_per_second <= MAX_SHOTS_PER_SECOND)
                {
                    return Err(TuningError::Cadence {
                        value: shots_per_second,
                    });
                }
                non_negative("blast_radius", blast_radius)?;
                non_negative("shell_damage", shell_damage)
            }
        }
    }
}

/// Upper bound on a ballistic tower's launch cadence.
pub const MAX_SHOTS_PER_SECOND: f32 = 100.0;

fn non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TuningError::Negative { field, value })
    }
}

/// Reasons tower or enemy tuning is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum TuningError {
    /// A distance or damage amount is negative or not finite.
    #[error("{field} must be a finite, non-negative number, got {value}")]
    Negative {
        /// Name of the offending parameter.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// The launch cadence is outside `(0, MAX_SHOTS_PER_SECOND]`.
    #[error("shots_per_second must be in (0, {max}], got {value}", max = MAX_SHOTS_PER_SECOND)]
    Cadence {
        /// Rejected value.
        value: f32,
    },
    /// A sampled range has non-finite or inverted bounds.
    #[error("{field} must have finite bounds with min <= max, got {min}..{max}")]
    Range {
        /// Name of the offending parameter.
        field: &'static str,
        /// Rejected lower bound.
        min: f32,
        /// Rejected upper bound.
        max: f32,
    },
}

/// Types of enemies a scenario can spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Quick, fragile enemy.
    Small,
    /// Baseline enemy.
    Medium,
    /// Slow, sturdy enemy.
    Large,
}

impl EnemyKind {
    /// Default tuning for the enemy kind.
    #[must_use]
    pub const fn default_config(self) -> EnemyConfig {
        match self {
            Self::Small => EnemyConfig {
                scale: FloatRange::new(0.5, 0.7),
                speed: FloatRange::new(1.5, 2.0),
                path_offset: FloatRange::new(-0.35, 0.35),
                health: FloatRange::new(10.0, 15.0),
            },
            Self::Medium => EnemyConfig {
                scale: FloatRange::new(1.0, 1.0),
                speed: FloatRange::new(1.0, 1.2),
                path_offset: FloatRange::new(-0.25, 0.25),
                health: FloatRange::new(40.0, 50.0),
            },
            Self::Large => EnemyConfig {
                scale: FloatRange::new(1.5, 2.0),
                speed: FloatRange::new(0.8, 1.0),
                path_offset: FloatRange::new(-0.1, 0.1),
                health: FloatRange::new(100.0, 150.0),
            },
        }
    }
}

/// Tuning parameters for an enemy kind; each field is sampled per spawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyConfig {
    /// Model scale; affects speed and hit radius.
    pub scale: FloatRange,
    /// Base travel speed in tiles per second.
    pub speed: FloatRange,
    /// Lateral lane offset, kept within `[-0.35, 0.35]`.
    pub path_offset: FloatRange,
    /// Starting health.
    pub health: FloatRange,
}

impl EnemyConfig {
    /// Checks that every sampled range has finite, ordered bounds.
    pub fn validate(&self) -> Result<(), TuningError> {
        [
            ("scale", self.scale),
            ("speed", self.speed),
            ("path_offset", self.path_offset),
            ("health", self.health),
        ]
        .into_iter()
        .try_for_each(|(field, range)| {
            if range.min.is_finite() && range.max.is_finite() && range.min <= range.max {
                Ok(())
            } else {
                Err(TuningError::Range {
                    field,
                    min: range.min,
                    max: range.max,
                })
            }
        })
    }
}

/// Closed interval of floating-point values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl FloatRange {
    /// Creates a range from its bounds.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Interpolates between the bounds using `t` in `[0, 1]`.
    ///
    /// Callers feed a uniform random `t` to sample the range.
    #[must_use]
    pub fn lerp(&self, t: f32) -> f32 {
        if self.max <= self.min {
            return self.min;
        }
        self.min + (self.max - self.min) * t.clamp(0.0, 1.0)
    }

    /// Copy of the range with both bounds clamped to `[low, high]`.
    #[must_use]
    pub fn clamped(&self, low: f32, high: f32) -> Self {
        Self::new(self.min.clamp(low, high), self.max.clamp(low, high))
    }
}

/// Reasons a placement request is rejected by the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum PlacementError {
    /// The coordinate lies outside the board.
    #[error("tile lies outside the board")]
    OutOfBounds,
    /// The tile holds content the requested toggle cannot replace.
    #[error("tile is occupied by {content:?}")]
    Occupied {
        /// Content currently on the tile.
        content: ContentType,
    },
    /// The change would leave a passable tile without a path to a destination.
    #[error("placement would disconnect the flow field")]
    Disconnected,
    /// The change would remove the only destination.
    #[error("board needs at least one destination tile")]
    LastDestination,
    /// The change would remove the only spawn point.
    #[error("board needs at least one spawn point")]
    LastSpawnPoint,
}

/// Result of a single per-tick update of a pooled entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// The entity stays in its collection.
    Continue,
    /// The entity finished and must be removed from its collection.
    Remove,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Ground-plane position of the enemy's body.
    pub position: Vec3,
    /// Model scale of the enemy.
    pub scale: f32,
    /// Remaining health.
    pub health: f32,
}

impl EnemySnapshot {
    /// Radius of the enemy's hit sphere.
    #[must_use]
    pub fn hit_radius(&self) -> f32 {
        HIT_RADIUS_PER_SCALE * self.scale
    }
}

/// Read-only snapshot describing all enemies on the board.
///
/// Captured once per tick after enemies moved, so every tower and projectile
/// observes the same positions.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of the provided enemy.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of enemies captured in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Damage a system wants applied to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Damage {
    /// Enemy receiving the damage.
    pub enemy: EnemyId,
    /// Non-negative amount of health to remove.
    pub amount: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = TileCoord::new(1, 1);
        let destination = TileCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn direction_changes_are_classified() {
        assert_eq!(
            Direction::North.change_to(Direction::North),
            DirectionChange::None
        );
        assert_eq!(
            Direction::North.change_to(Direction::East),
            DirectionChange::TurnRight
        );
        assert_eq!(
            Direction::West.change_to(Direction::North),
            DirectionChange::TurnRight
        );
        assert_eq!(
            Direction::North.change_to(Direction::West),
            DirectionChange::TurnLeft
        );
        assert_eq!(
            Direction::East.change_to(Direction::West),
            DirectionChange::TurnAround
        );
    }

    #[test]
    fn half_vectors_point_at_tile_edges() {
        for direction in Direction::ALL {
            let half = direction.half_vector();
            assert!((half.length() - 0.5).abs() < f32::EPSILON);
            assert_eq!(half, -direction.opposite().half_vector());
        }
        assert!(Direction::North.half_vector().z > 0.0);
        assert!(Direction::East.half_vector().x > 0.0);
    }

    #[test]
    fn board_size_rejects_narrow_boards() {
        assert_eq!(
            BoardSize::new(1, 5),
            Err(BoardSizeError::TooSmall {
                columns: 1,
                rows: 5
            })
        );
        let size = BoardSize::new(2, 3).expect("2x3 is valid");
        assert_eq!(size.tile_count(), 6);
    }

    #[test]
    fn only_walls_and_towers_block_paths() {
        assert!(ContentType::Wall.blocks_path());
        assert!(ContentType::Tower.blocks_path());
        assert!(!ContentType::Empty.blocks_path());
        assert!(!ContentType::Destination.blocks_path());
        assert!(!ContentType::SpawnPoint.blocks_path());
    }

    #[test]
    fn float_range_lerp_respects_bounds() {
        let range = FloatRange::new(-0.35, 0.35);
        assert_eq!(range.lerp(0.0), -0.35);
        assert_eq!(range.lerp(1.0), 0.35);
        assert_eq!(range.lerp(5.0), 0.35);
        assert_eq!(FloatRange::new(1.0, 1.0).lerp(0.7), 1.0);
    }

    #[test]
    fn enemy_view_looks_up_by_identifier() {
        let view = EnemyView::from_snapshots(vec![
            EnemySnapshot {
                id: EnemyId::new(9),
                position: Vec3::ZERO,
                scale: 1.0,
                health: 5.0,
            },
            EnemySnapshot {
                id: EnemyId::new(2),
                position: Vec3::X,
                scale: 2.0,
                health: 5.0,
            },
        ]);

        assert_eq!(view.len(), 2);
        assert_eq!(view.iter().next().map(|s| s.id), Some(EnemyId::new(2)));
        assert_eq!(view.get(EnemyId::new(9)).map(|s| s.position), Some(Vec3::ZERO));
        assert!(view.get(EnemyId::new(3)).is_none());
        assert!((view.get(EnemyId::new(2)).map_or(0.0, |s| s.hit_radius()) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn default_tower_configs_match_modalities() {
        assert!(matches!(
            TowerKind::Laser.default_config().attack,
            AttackConfig::Beam { .. }
        ));
        assert!(matches!(
            TowerKind::Mortar.default_config().attack,
            AttackConfig::Ballistic { .. }
        ));
    }

    #[test]
    fn default_tuning_is_valid() {
        for kind in [TowerKind::Laser, TowerKind::Mortar] {
            assert_eq!(kind.default_config().validate(), Ok(()));
        }
        for kind in [EnemyKind::Small, EnemyKind::Medium, EnemyKind::Large] {
            assert_eq!(kind.default_config().validate(), Ok(()));
        }
    }

    #[test]
    fn tower_tuning_rejects_unusable_numbers() {
        let mut laser = TowerKind::Laser.default_config();
        laser.attack = AttackConfig::Beam {
            damage_per_second: -10.0,
        };
        assert_eq!(
            laser.validate(),
            Err(TuningError::Negative {
                field: "damage_per_second",
                value: -10.0
            })
        );

        let mut mortar = TowerKind::Mortar.default_config();
        mortar.range = f32::NAN;
        assert!(matches!(
            mortar.validate(),
            Err(TuningError::Negative { field: "range", .. })
        ));

        for shots_per_second in [0.0, -1.0, f32::INFINITY, f32::NAN, 1.0e9] {
            let mortar = TowerConfig {
                attack: AttackConfig::Ballistic {
                    shots_per_second,
                    blast_radius: 1.0,
                    shell_damage: 10.0,
                },
                ..TowerKind::Mortar.default_config()
            };
            assert!(
                matches!(mortar.validate(), Err(TuningError::Cadence { .. })),
                "{shots_per_second} accepted"
            );
        }

        let mortar = TowerConfig {
            attack: AttackConfig::Ballistic {
                shots_per_second: 1.0,
                blast_radius: 1.0,
                shell_damage: -4.0,
            },
            ..TowerKind::Mortar.default_config()
        };
        assert!(matches!(
            mortar.validate(),
            Err(TuningError::Negative {
                field: "shell_damage",
                ..
            })
        ));
    }

    #[test]
    fn enemy_tuning_rejects_inverted_or_infinite_ranges() {
        let mut config = EnemyKind::Medium.default_config();
        config.health = FloatRange::new(50.0, 40.0);
        assert_eq!(
            config.validate(),
            Err(TuningError::Range {
                field: "health",
                min: 50.0,
                max: 40.0
            })
        );

        config.health = FloatRange::new(40.0, 50.0);
        config.speed = FloatRange::new(1.0, f32::INFINITY);
        assert!(matches!(
            config.validate(),
            Err(TuningError::Range { field: "speed", .. })
        ));
    }
}
