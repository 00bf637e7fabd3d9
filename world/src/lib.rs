#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for Tile Defence.
//!
//! The board owns the tile array, every tile's content and the flow field
//! derived from it. Content only changes through [`apply`] or the toggle
//! methods on [`Board`], each of which re-solves the flow field synchronously
//! and rolls the change back when the field would become invalid.

mod content;
mod grid;
mod navigation;
mod placement;
mod towers;

use glam::Vec3;
use tile_defence_core::{BoardSize, Command, Event, TileCoord, TileIndex};
use tracing::error;

pub use content::{Content, ContentFactory, ContentKind, ContentPool};
pub use grid::Tile;
pub use navigation::FlowFieldError;
pub use towers::{launch_speed_for, AttackState, Tower, LAUNCH_RANGE_SLACK};

use navigation::FlowField;

/// Board of tiles together with its derived flow field.
#[derive(Debug)]
pub struct Board {
    size: BoardSize,
    tiles: Vec<Tile>,
    flow_field: FlowField,
    spawn_points: Vec<TileIndex>,
    updating_content: Vec<TileIndex>,
}

impl Board {
    /// Builds a board of the provided size in its cleared default layout.
    ///
    /// Every tile's content is requested from `factory`.
    pub fn new(size: BoardSize, factory: &mut dyn ContentFactory) -> Self {
        let tiles = grid::build_tiles(size, || factory.get(ContentKind::Empty));
        let mut board = Self {
            size,
            tiles,
            flow_field: FlowField::default(),
            spawn_points: Vec::new(),
            updating_content: Vec::new(),
        };
        board.clear(factory);
        board
    }

    /// Resets every tile to empty, then places the default destination at the
    /// middle index and the default spawn point at index zero.
    pub fn clear(&mut self, factory: &mut dyn ContentFactory) {
        for slot in 0..self.tiles.len() {
            let empty = factory.get(ContentKind::Empty);
            self.set_content(tile_index(slot), empty, factory);
        }
        debug_assert!(self.updating_content.is_empty(), "tower survived clear");
        self.spawn_points.clear();

        let destination = tile_index(self.tiles.len() / 2);
        let content = factory.get(ContentKind::Destination);
        self.set_content(destination, content, factory);

        let spawn = tile_index(0);
        let content = factory.get(ContentKind::SpawnPoint);
        self.set_content(spawn, content, factory);
        self.spawn_points.push(spawn);

        if let Err(cause) = self.flow_field.solve(&mut self.tiles) {
            debug_assert!(false, "cleared board failed to solve: {cause}");
            error!(%cause, "cleared board failed to solve");
        }
    }

    /// Dimensions of the board.
    #[must_use]
    pub const fn size(&self) -> BoardSize {
        self.size
    }

    /// Tiles in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tile stored at the provided index.
    ///
    /// Indices are only ever produced by the board itself, so they are always
    /// in range.
    #[must_use]
    pub fn tile(&self, index: TileIndex) -> &Tile {
        &self.tiles[index.as_usize()]
    }

    /// Index of the tile at the provided coordinate, if it lies on the board.
    #[must_use]
    pub fn index_of(&self, coord: TileCoord) -> Option<TileIndex> {
        grid::index_of(self.size, coord)
    }

    /// Tile containing a world-space point on the board plane.
    #[must_use]
    pub fn tile_at(&self, point: Vec3) -> Option<TileIndex> {
        grid::index_at(self.size, point)
    }

    /// Spawn point stored at `slot` in the active spawn-point list.
    #[must_use]
    pub fn spawn_point(&self, slot: usize) -> Option<TileIndex> {
        self.spawn_points.get(slot).copied()
    }

    /// Number of active spawn points; never zero.
    #[must_use]
    pub fn spawn_point_count(&self) -> usize {
        self.spawn_points.len()
    }

    /// Tiles whose content takes part in per-tick updates.
    #[must_use]
    pub fn updating_content(&self) -> &[TileIndex] {
        &self.updating_content
    }

    /// Tower stored on the provided tile, if any.
    #[must_use]
    pub fn tower(&self, index: TileIndex) -> Option<&Tower> {
        self.tiles.get(index.as_usize())?.content().as_tower()
    }

    /// Mutable tower stored on the provided tile, if any.
    pub fn tower_mut(&mut self, index: TileIndex) -> Option<&mut Tower> {
        self.tiles
            .get_mut(index.as_usize())?
            .content_mut()
            .as_tower_mut()
    }

    /// Recomputes the flow field for the current content.
    ///
    /// Toggles already solve after every mutation; calling this again on an
    /// unchanged board reproduces the same assignments.
    pub fn solve(&mut self) -> Result<(), FlowFieldError> {
        self.flow_field.solve(&mut self.tiles)
    }

    /// Replaces a tile's content, returning the old instance to `factory`.
    fn set_content(
        &mut self,
        index: TileIndex,
        content: Content,
        factory: &mut dyn ContentFactory,
    ) {
        let arrives = matches!(content, Content::Tower(_));
        let previous = self.tiles[index.as_usize()].replace_content(content);

        if matches!(previous, Content::Tower(_)) {
            if let Some(position) = self.updating_content.iter().position(|i| *i == index) {
                let _ = self.updating_content.remove(position);
            }
        }
        if arrives && !self.updating_content.contains(&index) {
            self.updating_content.push(index);
        }

        factory.reclaim(previous);
    }
}

/// Applies the provided command to the board.
///
/// Successful toggles emit [`Event::ContentChanged`]; rejected ones emit
/// [`Event::PlacementRejected`] after the board was restored.
/// [`Command::NewGame`] clears the board without emitting events, since the
/// driver announces the new game once every registry was reset.
pub fn apply(
    board: &mut Board,
    factory: &mut dyn ContentFactory,
    command: Command,
    out_events: &mut Vec<Event>,
) {
    let (tile, result) = match command {
        Command::ToggleWall { tile } => (tile, board.toggle_wall(tile, factory)),
        Command::ToggleDestination { tile } => (tile, board.toggle_destination(tile, factory)),
        Command::ToggleSpawnPoint { tile } => (tile, board.toggle_spawn_point(tile, factory)),
        Command::ToggleTower { tile, kind } => (tile, board.toggle_tower(tile, kind, factory)),
        Command::NewGame => {
            board.clear(factory);
            return;
        }
    };

    match result {
        Ok(content) => out_events.push(Event::ContentChanged { tile, content }),
        Err(reason) => out_events.push(Event::PlacementRejected { tile, reason }),
    }
}

/// Query functions that provide read-only access to the board.
pub mod query {
    use super::Board;
    use tile_defence_core::{ContentType, TileCoord, TowerKind};

    /// Content type held by the tile at the coordinate.
    #[must_use]
    pub fn content(board: &Board, coord: TileCoord) -> Option<ContentType> {
        let index = board.index_of(coord)?;
        Some(board.tile(index).content().content_type())
    }

    /// Steps from the tile at the coordinate to the nearest destination.
    #[must_use]
    pub fn distance(board: &Board, coord: TileCoord) -> Option<u32> {
        let index = board.index_of(coord)?;
        board.tile(index).distance()
    }

    /// Coordinate of the neighbour an enemy steps toward from `coord`.
    #[must_use]
    pub fn next_hop(board: &Board, coord: TileCoord) -> Option<TileCoord> {
        let index = board.index_of(coord)?;
        let next = board.tile(index).next_hop()?;
        Some(board.tile(next).coord())
    }

    /// Coordinates of every active spawn point in placement order.
    #[must_use]
    pub fn spawn_points(board: &Board) -> Vec<TileCoord> {
        (0..board.spawn_point_count())
            .filter_map(|slot| board.spawn_point(slot))
            .map(|index| board.tile(index).coord())
            .collect()
    }

    /// Coordinates and kinds of every tower in placement order.
    #[must_use]
    pub fn towers(board: &Board) -> Vec<(TileCoord, TowerKind)> {
        board
            .updating_content()
            .iter()
            .filter_map(|index| {
                board
                    .tower(*index)
                    .map(|tower| (board.tile(*index).coord(), tower.kind()))
            })
            .collect()
    }
}

fn tile_index(slot: usize) -> TileIndex {
    TileIndex::new(slot as u32)
}
