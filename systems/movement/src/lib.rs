#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy motion engine that turns flow-field hops into continuous movement.
//!
//! Each enemy walks one tile segment at a time. A segment is either a straight
//! interpolation between edge midpoints or an arc around a tile corner, and
//! its progress rate is scaled by the segment length so that the enemy covers
//! ground at a constant linear speed.

mod factory;

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec3};
use tile_defence_core::{
    Direction, DirectionChange, EnemyId, EnemyKind, EnemySnapshot, Event, StepOutcome, TileIndex,
};
use tile_defence_world::Board;
use tracing::{debug, error};

pub use factory::EnemyFactory;

/// Largest lateral lane offset an enemy may walk on.
pub const MAX_PATH_OFFSET: f32 = 0.35;

/// Smallest turning radius used when pacing a half turn.
const MIN_TURN_AROUND_RADIUS: f32 = 0.1;

/// Segment an enemy is currently traversing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionState {
    /// From the spawn tile's centre to its exit point.
    Intro,
    /// Straight across a tile.
    Forward,
    /// Clockwise quarter arc.
    TurnRight,
    /// Counter-clockwise quarter arc.
    TurnLeft,
    /// Half turn around the entry edge.
    TurnAround,
    /// From the destination tile's entry edge to its centre.
    Outro,
    /// Finished; the enemy must be removed.
    Done,
}

/// Per-enemy attributes sampled once at spawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyTraits {
    /// Model scale.
    pub scale: f32,
    /// Base speed in tiles per second before scale slowdown.
    pub speed: f32,
    /// Lateral lane offset.
    pub path_offset: f32,
    /// Starting health.
    pub health: f32,
}

/// Mobile agent following the flow field.
#[derive(Clone, Debug)]
pub struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    scale: f32,
    speed: f32,
    path_offset: f32,
    health: f32,
    state: MotionState,
    tile_from: TileIndex,
    tile_to: Option<TileIndex>,
    position_from: Vec3,
    position_to: Vec3,
    direction: Direction,
    angle_from: f32,
    angle_to: f32,
    progress: f32,
    progress_rate: f32,
    root: Vec3,
    lateral: f32,
    angle: f32,
}

impl Enemy {
    /// Places a new enemy on `tile` and prepares its intro segment.
    ///
    /// Effective speed is the base speed divided by the scale for enemies
    /// larger than one unit, and the lane offset is clamped to
    /// [`MAX_PATH_OFFSET`].
    #[must_use]
    pub fn spawn(
        id: EnemyId,
        kind: EnemyKind,
        traits: EnemyTraits,
        board: &Board,
        tile: TileIndex,
    ) -> Self {
        let origin = board.tile(tile);
        let mut enemy = Self {
            id,
            kind,
            scale: traits.scale,
            speed: traits.speed / traits.scale.max(1.0),
            path_offset: traits.path_offset.clamp(-MAX_PATH_OFFSET, MAX_PATH_OFFSET),
            health: traits.health,
            state: MotionState::Intro,
            tile_from: tile,
            tile_to: origin.next_hop(),
            position_from: origin.position(),
            position_to: origin.position(),
            direction: Direction::North,
            angle_from: 0.0,
            angle_to: 0.0,
            progress: 0.0,
            progress_rate: 0.0,
            root: origin.position(),
            lateral: 0.0,
            angle: 0.0,
        };
        enemy.prepare_intro(board);
        enemy
    }

    /// Identifier of the enemy.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Kind the enemy was spawned as.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Model scale.
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Effective speed in tiles per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Lateral lane offset.
    #[must_use]
    pub const fn path_offset(&self) -> f32 {
        self.path_offset
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Current motion segment.
    #[must_use]
    pub const fn state(&self) -> MotionState {
        self.state
    }

    /// Tile the current segment started on.
    #[must_use]
    pub const fn tile(&self) -> TileIndex {
        self.tile_from
    }

    /// Current heading.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Current facing around the vertical axis, in degrees.
    #[must_use]
    pub const fn facing(&self) -> f32 {
        self.angle
    }

    /// Ground-plane position of the enemy's body.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        let offset = Quat::from_rotation_y(self.angle.to_radians()) * Vec3::X * self.lateral;
        let position = self.root + offset;
        Vec3::new(position.x, 0.0, position.z)
    }

    /// Read-only snapshot used by towers and projectiles.
    #[must_use]
    pub fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            position: self.position(),
            scale: self.scale,
            health: self.health,
        }
    }

    /// Subtracts `amount` from the enemy's health.
    ///
    /// Negative damage is a caller bug.
    pub fn apply_damage(&mut self, amount: f32) {
        if amount < 0.0 {
            debug_assert!(false, "negative damage {amount} applied to {:?}", self.id);
            error!(enemy = self.id.get(), amount, "negative damage ignored");
            return;
        }
        self.health -= amount;
    }

    /// Advances the enemy by `dt` seconds.
    ///
    /// Returns [`StepOutcome::Remove`] once the enemy died or finished its
    /// outro. Entering a tile and entering the destination's outro are
    /// reported through `out_events`.
    pub fn game_update(
        &mut self,
        board: &Board,
        dt: f32,
        out_events: &mut Vec<Event>,
    ) -> StepOutcome {
        match self.state {
            MotionState::Done => return StepOutcome::Remove,
            MotionState::Outro => {}
            _ if self.health <= 0.0 => {
                debug!(enemy = self.id.get(), "enemy killed");
                out_events.push(Event::EnemyKilled { enemy: self.id });
                self.state = MotionState::Done;
                return StepOutcome::Remove;
            }
            _ => {}
        }

        self.progress += dt * self.progress_rate;
        while self.progress >= 1.0 {
            if self.state == MotionState::Outro {
                self.state = MotionState::Done;
                return StepOutcome::Remove;
            }
            self.progress = (self.progress - 1.0) / self.progress_rate;
            self.prepare_next_state(board, out_events);
            self.progress *= self.progress_rate;
        }

        match self.state {
            MotionState::Intro | MotionState::Forward | MotionState::Outro => {
                self.root = self.position_from.lerp(self.position_to, self.progress);
            }
            _ => {
                self.angle = self.angle_from + (self.angle_to - self.angle_from) * self.progress;
            }
        }
        StepOutcome::Continue
    }

    fn prepare_intro(&mut self, board: &Board) {
        let origin = board.tile(self.tile_from);
        self.position_from = origin.position();
        self.root = self.position_from;
        self.position_to = origin.exit_point();
        self.direction = origin.path_direction().unwrap_or(Direction::North);
        self.angle_from = self.direction.angle();
        self.angle_to = self.angle_from;
        self.angle = self.angle_from;
        self.lateral = self.path_offset;
        self.progress_rate = 2.0 * self.speed;
        self.state = MotionState::Intro;
    }

    fn prepare_outro(&mut self, board: &Board) {
        self.position_to = board.tile(self.tile_from).position();
        self.angle_to = self.direction.angle();
        self.angle = self.angle_to;
        self.lateral = self.path_offset;
        self.progress_rate = 2.0 * self.speed;
        self.state = MotionState::Outro;
    }

    fn prepare_next_state(&mut self, board: &Board, out_events: &mut Vec<Event>) {
        self.position_from = self.position_to;
        let Some(entered) = self.tile_to else {
            // Spawned directly on a destination.
            self.reach_destination(board, out_events);
            return;
        };

        self.tile_from = entered;
        let tile = board.tile(entered);
        self.tile_to = tile.next_hop();
        out_events.push(Event::EnemyEnteredTile {
            enemy: self.id,
            tile: tile.coord(),
        });

        if self.tile_to.is_none() {
            self.reach_destination(board, out_events);
            return;
        }

        self.position_to = tile.exit_point();
        let heading = tile.path_direction().unwrap_or(self.direction);
        let change = self.direction.change_to(heading);
        self.direction = heading;
        self.angle_from = self.angle_to;

        match change {
            DirectionChange::None => self.prepare_forward(),
            DirectionChange::TurnRight => self.prepare_turn_right(),
            DirectionChange::TurnLeft => self.prepare_turn_left(),
            DirectionChange::TurnAround => self.prepare_turn_around(),
        }
    }

    fn reach_destination(&mut self, board: &Board, out_events: &mut Vec<Event>) {
        debug!(enemy = self.id.get(), "enemy reached destination");
        out_events.push(Event::EnemyReachedDestination { enemy: self.id });
        self.prepare_outro(board);
    }

    fn prepare_forward(&mut self) {
        self.angle_to = self.direction.angle();
        self.angle = self.angle_to;
        self.lateral = self.path_offset;
        self.progress_rate = self.speed;
        self.state = MotionState::Forward;
    }

    fn prepare_turn_right(&mut self) {
        self.angle_to = self.angle_from + 90.0;
        self.lateral = self.path_offset - 0.5;
        self.root = self.position_from + self.direction.half_vector();
        self.progress_rate = self.speed / (FRAC_PI_2 * (0.5 - self.path_offset));
        self.state = MotionState::TurnRight;
    }

    fn prepare_turn_left(&mut self) {
        self.angle_to = self.angle_from - 90.0;
        self.lateral = self.path_offset + 0.5;
        self.root = self.position_from + self.direction.half_vector();
        self.progress_rate = self.speed / (FRAC_PI_2 * (0.5 + self.path_offset));
        self.state = MotionState::TurnLeft;
    }

    fn prepare_turn_around(&mut self) {
        self.angle_to = self.angle_from
            + if self.path_offset < 0.0 {
                180.0
            } else {
                -180.0
            };
        self.lateral = self.path_offset;
        self.root = self.position_from;
        self.progress_rate =
            self.speed / (PI * self.path_offset.abs().max(MIN_TURN_AROUND_RADIUS));
        self.state = MotionState::TurnAround;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_defence_core::{BoardSize, TileCoord};
    use tile_defence_world::ContentPool;

    fn traits(path_offset: f32) -> EnemyTraits {
        EnemyTraits {
            scale: 1.0,
            speed: 1.0,
            path_offset,
            health: 10.0,
        }
    }

    fn board(columns: u32, rows: u32) -> Board {
        let mut pool = ContentPool::new();
        Board::new(
            BoardSize::new(columns, rows).expect("valid size"),
            &mut pool,
        )
    }

    #[test]
    fn spawn_starts_intro_at_tile_centre_with_lane_offset() {
        let board = board(3, 3);
        let enemy = Enemy::spawn(
            EnemyId::new(1),
            EnemyKind::Medium,
            traits(0.2),
            &board,
            TileIndex::new(2),
        );

        assert_eq!(enemy.state(), MotionState::Intro);
        assert_eq!(enemy.direction(), Direction::West);
        let centre = board.tile(TileIndex::new(2)).position();
        let expected = centre + Vec3::new(0.0, 0.0, 0.2);
        assert!(
            enemy.position().distance(expected) < 1e-5,
            "facing west puts the right-hand lane north: {:?}",
            enemy.position()
        );
    }

    #[test]
    fn large_enemies_are_slowed_by_scale() {
        let board = board(3, 3);
        let enemy = Enemy::spawn(
            EnemyId::new(1),
            EnemyKind::Large,
            EnemyTraits {
                scale: 2.0,
                speed: 1.0,
                path_offset: 0.9,
                health: 10.0,
            },
            &board,
            TileIndex::new(0),
        );
        assert!((enemy.speed() - 0.5).abs() < f32::EPSILON);
        assert!((enemy.path_offset() - MAX_PATH_OFFSET).abs() < f32::EPSILON);
    }

    #[test]
    fn dead_enemy_is_removed_before_moving() {
        let board = board(3, 3);
        let mut enemy = Enemy::spawn(
            EnemyId::new(4),
            EnemyKind::Small,
            traits(0.0),
            &board,
            TileIndex::new(0),
        );
        let before = enemy.position();
        enemy.apply_damage(10.0);
        let mut events = Vec::new();

        assert_eq!(enemy.game_update(&board, 0.1, &mut events), StepOutcome::Remove);
        assert_eq!(
            events,
            vec![Event::EnemyKilled {
                enemy: EnemyId::new(4)
            }]
        );
        assert_eq!(enemy.position(), before);
    }

    #[test]
    fn health_is_ignored_during_outro() {
        let board = board(3, 3);
        let mut enemy = Enemy::spawn(
            EnemyId::new(2),
            EnemyKind::Small,
            traits(0.0),
            &board,
            TileIndex::new(1),
        );
        let mut events = Vec::new();
        while enemy.state() != MotionState::Outro {
            assert_eq!(
                enemy.game_update(&board, 0.01, &mut events),
                StepOutcome::Continue
            );
        }
        enemy.apply_damage(100.0);

        let mut outcome = StepOutcome::Continue;
        for _ in 0..100 {
            outcome = enemy.game_update(&board, 0.01, &mut events);
            if outcome == StepOutcome::Remove {
                break;
            }
        }

        assert_eq!(outcome, StepOutcome::Remove);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::EnemyKilled { .. })));
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, Event::EnemyReachedDestination { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn right_turn_sweeps_around_the_corner() {
        let board = board(3, 3);
        let mut enemy = Enemy::spawn(
            EnemyId::new(3),
            EnemyKind::Medium,
            traits(0.2),
            &board,
            TileIndex::new(2),
        );
        let mut events = Vec::new();
        while enemy.state() != MotionState::TurnRight {
            let _ = enemy.game_update(&board, 0.001, &mut events);
        }
        assert_eq!(enemy.tile(), TileIndex::new(1));
        assert_eq!(
            events,
            vec![Event::EnemyEnteredTile {
                enemy: EnemyId::new(3),
                tile: TileCoord::new(1, 0),
            }]
        );

        while enemy.state() == MotionState::TurnRight {
            let _ = enemy.game_update(&board, 0.001, &mut events);
        }
        // Leaves tile 1 through its north edge, offset to the east lane.
        let exit = board.tile(TileIndex::new(1)).exit_point() + Vec3::new(0.2, 0.0, 0.0);
        assert!(
            enemy.position().distance(exit) < 0.01,
            "turn ended at {:?}",
            enemy.position()
        );
    }
}
