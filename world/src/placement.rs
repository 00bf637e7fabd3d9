//! Content toggles with solve-or-rollback semantics.

use tile_defence_core::{ContentType, PlacementError, TileCoord, TileIndex, TowerKind};
use tracing::{error, warn};

use crate::content::{ContentFactory, ContentKind};
use crate::navigation::FlowFieldError;
use crate::Board;

impl Board {
    /// Places a wall on an empty tile or clears an existing wall.
    ///
    /// A wall that would strand any tile is rolled back and reported as
    /// [`PlacementError::Disconnected`].
    pub fn toggle_wall(
        &mut self,
        coord: TileCoord,
        factory: &mut dyn ContentFactory,
    ) -> Result<ContentType, PlacementError> {
        let index = self.locate(coord)?;
        match self.content_type_at(index) {
            ContentType::Wall => {
                self.place(index, ContentKind::Empty, factory);
                self.solve_or_restore(index, ContentKind::Wall, factory)?;
                Ok(ContentType::Empty)
            }
            ContentType::Empty => {
                self.place(index, ContentKind::Wall, factory);
                self.solve_or_restore(index, ContentKind::Empty, factory)?;
                Ok(ContentType::Wall)
            }
            content => Err(PlacementError::Occupied { content }),
        }
    }

    /// Places a destination on an empty tile or clears an existing one.
    ///
    /// Removing the last destination fails the solve and is reported as
    /// [`PlacementError::LastDestination`].
    pub fn toggle_destination(
        &mut self,
        coord: TileCoord,
        factory: &mut dyn ContentFactory,
    ) -> Result<ContentType, PlacementError> {
        let index = self.locate(coord)?;
        match self.content_type_at(index) {
            ContentType::Destination => {
                self.place(index, ContentKind::Empty, factory);
                self.solve_or_restore(index, ContentKind::Destination, factory)?;
                Ok(ContentType::Empty)
            }
            ContentType::Empty => {
                self.place(index, ContentKind::Destination, factory);
                self.solve_or_restore(index, ContentKind::Empty, factory)?;
                Ok(ContentType::Destination)
            }
            content => Err(PlacementError::Occupied { content }),
        }
    }

    /// Places a spawn point on an empty tile or clears an existing one.
    ///
    /// Spawn points never block, so the flow field is left untouched. The
    /// last remaining spawn point cannot be removed.
    pub fn toggle_spawn_point(
        &mut self,
        coord: TileCoord,
        factory: &mut dyn ContentFactory,
    ) -> Result<ContentType, PlacementError> {
        let index = self.locate(coord)?;
        match self.content_type_at(index) {
            ContentType::SpawnPoint => {
                if self.spawn_points.len() <= 1 {
                    return Err(PlacementError::LastSpawnPoint);
                }
                if let Some(slot) = self.spawn_points.iter().position(|i| *i == index) {
                    let _ = self.spawn_points.swap_remove(slot);
                }
                self.place(index, ContentKind::Empty, factory);
                Ok(ContentType::Empty)
            }
            ContentType::Empty => {
                self.place(index, ContentKind::SpawnPoint, factory);
                self.spawn_points.push(index);
                Ok(ContentType::SpawnPoint)
            }
            content => Err(PlacementError::Occupied { content }),
        }
    }

    /// Places, swaps or removes a tower of the provided kind.
    ///
    /// Toggling the same kind removes the tower. A different kind replaces the
    /// tower in place without solving, as does building over a wall, because
    /// both leave the set of blocking tiles unchanged.
    pub fn toggle_tower(
        &mut self,
        coord: TileCoord,
        kind: TowerKind,
        factory: &mut dyn ContentFactory,
    ) -> Result<ContentType, PlacementError> {
        let index = self.locate(coord)?;
        let current = self.tiles[index.as_usize()]
            .content()
            .as_tower()
            .map(|tower| tower.kind());

        match (self.content_type_at(index), current) {
            (ContentType::Tower, Some(existing)) if existing == kind => {
                self.place(index, ContentKind::Empty, factory);
                self.solve_or_restore(index, ContentKind::Empty, factory)?;
                Ok(ContentType::Empty)
            }
            (ContentType::Tower, _) | (ContentType::Wall, _) => {
                let tower = factory.get_tower(kind);
                self.set_content(index, tower, factory);
                Ok(ContentType::Tower)
            }
            (ContentType::Empty, _) => {
                let tower = factory.get_tower(kind);
                self.set_content(index, tower, factory);
                self.solve_or_restore(index, ContentKind::Empty, factory)?;
                Ok(ContentType::Tower)
            }
            (content, _) => Err(PlacementError::Occupied { content }),
        }
    }

    fn locate(&self, coord: TileCoord) -> Result<TileIndex, PlacementError> {
        self.index_of(coord).ok_or(PlacementError::OutOfBounds)
    }

    fn content_type_at(&self, index: TileIndex) -> ContentType {
        self.tiles[index.as_usize()].content().content_type()
    }

    fn place(&mut self, index: TileIndex, kind: ContentKind, factory: &mut dyn ContentFactory) {
        let content = factory.get(kind);
        self.set_content(index, content, factory);
    }

    /// Re-solves after a mutation, restoring `previous` when the solve fails.
    ///
    /// The restored board was the last known-good state, so the second solve
    /// must succeed.
    fn solve_or_restore(
        &mut self,
        index: TileIndex,
        previous: ContentKind,
        factory: &mut dyn ContentFactory,
    ) -> Result<(), PlacementError> {
        let cause = match self.flow_field.solve(&mut self.tiles) {
            Ok(()) => return Ok(()),
            Err(cause) => cause,
        };

        let coord = self.tiles[index.as_usize()].coord();
        warn!(
            column = coord.column(),
            row = coord.row(),
            %cause,
            "placement invalidates the flow field, restoring previous content"
        );

        self.place(index, previous, factory);

        if let Err(restore) = self.flow_field.solve(&mut self.tiles) {
            debug_assert!(false, "restored board failed to solve: {restore}");
            error!(%restore, "restored board failed to solve");
        }

        Err(match cause {
            FlowFieldError::NoDestination => PlacementError::LastDestination,
            FlowFieldError::Unreachable { .. } => PlacementError::Disconnected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentPool;
    use tile_defence_core::BoardSize;

    fn board(columns: u32, rows: u32) -> (Board, ContentPool) {
        let mut pool = ContentPool::new();
        let size = BoardSize::new(columns, rows).expect("valid size");
        (Board::new(size, &mut pool), pool)
    }

    #[test]
    fn wall_toggles_on_and_off() {
        let (mut board, mut pool) = board(3, 3);
        let coord = TileCoord::new(2, 0);

        assert_eq!(board.toggle_wall(coord, &mut pool), Ok(ContentType::Wall));
        assert_eq!(board.toggle_wall(coord, &mut pool), Ok(ContentType::Empty));
    }

    #[test]
    fn last_destination_cannot_be_removed() {
        let (mut board, mut pool) = board(3, 3);
        let centre = TileCoord::new(1, 1);

        assert_eq!(
            board.toggle_destination(centre, &mut pool),
            Err(PlacementError::LastDestination)
        );
        assert_eq!(
            board.tile(TileIndex::new(4)).content().content_type(),
            ContentType::Destination
        );
        assert!(board.tiles().iter().all(|tile| tile.has_path()));
    }

    #[test]
    fn second_destination_can_be_removed() {
        let (mut board, mut pool) = board(3, 3);
        let corner = TileCoord::new(2, 2);

        assert_eq!(
            board.toggle_destination(corner, &mut pool),
            Ok(ContentType::Destination)
        );
        assert_eq!(board.tile(TileIndex::new(8)).distance(), Some(0));
        assert_eq!(
            board.toggle_destination(TileCoord::new(1, 1), &mut pool),
            Ok(ContentType::Empty)
        );
        assert_eq!(board.tile(TileIndex::new(4)).distance(), Some(1));
    }

    #[test]
    fn spawn_points_keep_at_least_one() {
        let (mut board, mut pool) = board(3, 3);
        let origin = TileCoord::new(0, 0);
        let extra = TileCoord::new(2, 2);

        assert_eq!(
            board.toggle_spawn_point(origin, &mut pool),
            Err(PlacementError::LastSpawnPoint)
        );
        assert_eq!(
            board.toggle_spawn_point(extra, &mut pool),
            Ok(ContentType::SpawnPoint)
        );
        assert_eq!(
            board.toggle_spawn_point(origin, &mut pool),
            Ok(ContentType::Empty)
        );
        assert_eq!(board.spawn_point_count(), 1);
        assert_eq!(board.spawn_point(0), Some(TileIndex::new(8)));
    }

    #[test]
    fn tower_removal_restores_empty_and_updating_list() {
        let (mut board, mut pool) = board(4, 4);
        let coord = TileCoord::new(3, 0);

        assert_eq!(
            board.toggle_tower(coord, TowerKind::Mortar, &mut pool),
            Ok(ContentType::Tower)
        );
        assert_eq!(board.updating_content(), &[TileIndex::new(3)]);
        assert_eq!(
            board.toggle_tower(coord, TowerKind::Mortar, &mut pool),
            Ok(ContentType::Empty)
        );
        assert!(board.updating_content().is_empty());
    }
}
