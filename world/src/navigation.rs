//! Multi-source breadth-first flow-field solver.

use std::collections::VecDeque;

use thiserror::Error;
use tile_defence_core::{ContentType, Direction, TileIndex};
use tracing::error;

use crate::grid::Tile;

/// Probe order for tiles flagged as alternate.
const ALTERNATE_ORDER: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
];

/// Probe order for all other tiles.
const REGULAR_ORDER: [Direction; 4] = [
    Direction::West,
    Direction::East,
    Direction::South,
    Direction::North,
];

/// Reasons a flow-field solve is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum FlowFieldError {
    /// No tile holds a destination.
    #[error("board has no destination tile")]
    NoDestination,
    /// Some tiles were left without a path to any destination.
    #[error("{tiles} tiles cannot reach a destination")]
    Unreachable {
        /// Number of tiles left without a path.
        tiles: usize,
    },
}

/// Reusable solver workspace.
///
/// The search frontier is kept between solves so recomputation after every
/// placement does not reallocate.
#[derive(Clone, Debug, Default)]
pub(crate) struct FlowField {
    frontier: VecDeque<TileIndex>,
}

impl FlowField {
    /// Recomputes `distance`, `next_hop` and `exit_point` for every tile.
    ///
    /// Destinations seed the search. Blocking tiles receive path bookkeeping
    /// but never extend the frontier. The solve succeeds only when every tile,
    /// blocking or not, ends up with a finite distance.
    pub(crate) fn solve(&mut self, tiles: &mut [Tile]) -> Result<(), FlowFieldError> {
        self.frontier.clear();

        for (index, tile) in tiles.iter_mut().enumerate() {
            if tile.content().content_type() == ContentType::Destination {
                tile.become_destination();
                self.frontier.push_back(TileIndex::new(index as u32));
            } else {
                tile.clear_path();
            }
        }

        if self.frontier.is_empty() {
            return Err(FlowFieldError::NoDestination);
        }

        while let Some(current) = self.frontier.pop_front() {
            let order = if tiles[current.as_usize()].is_alternate() {
                ALTERNATE_ORDER
            } else {
                REGULAR_ORDER
            };

            for direction in order {
                if let Some(grown) = grow_path(tiles, current, direction) {
                    self.frontier.push_back(grown);
                }
            }
        }

        let unreachable = tiles.iter().filter(|tile| !tile.has_path()).count();
        if unreachable > 0 {
            return Err(FlowFieldError::Unreachable { tiles: unreachable });
        }
        Ok(())
    }
}

/// Extends the path from `from` into its neighbour in `direction`.
///
/// Returns the neighbour when it should join the frontier.
fn grow_path(tiles: &mut [Tile], from: TileIndex, direction: Direction) -> Option<TileIndex> {
    let source = &tiles[from.as_usize()];
    if !source.has_path() {
        debug_assert!(false, "grew a path from a tile without one");
        error!(tile = from.get(), "grew a path from a tile without one");
        return None;
    }

    let neighbor = source.neighbor(direction)?;
    let distance = source.raw_distance() + 1;

    let target = &mut tiles[neighbor.as_usize()];
    if target.has_path() {
        return None;
    }

    target.set_path(distance, from, direction.opposite());
    if target.content().blocks_path() {
        None
    } else {
        Some(neighbor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Content;
    use crate::grid::build_tiles;
    use tile_defence_core::BoardSize;

    fn tiles_with(columns: u32, rows: u32, layout: &[(usize, Content)]) -> Vec<Tile> {
        let size = BoardSize::new(columns, rows).expect("valid size");
        let mut tiles = build_tiles(size, || Content::Empty);
        for (index, content) in layout {
            let _ = tiles[*index].replace_content(content.clone());
        }
        tiles
    }

    #[test]
    fn solve_sets_destination_cells_to_zero() {
        let mut tiles = tiles_with(3, 4, &[(7, Content::Destination)]);
        let mut field = FlowField::default();

        assert_eq!(field.solve(&mut tiles), Ok(()));

        assert_eq!(tiles[7].distance(), Some(0));
        assert_eq!(tiles[7].next_hop(), None);
        assert_eq!(tiles[4].distance(), Some(1));
        assert_eq!(tiles[1].distance(), Some(2));
        assert_eq!(tiles[0].distance(), Some(3));
    }

    #[test]
    fn next_hop_points_back_toward_the_source() {
        let mut tiles = tiles_with(3, 2, &[(0, Content::Destination)]);
        let mut field = FlowField::default();
        assert_eq!(field.solve(&mut tiles), Ok(()));

        assert_eq!(tiles[1].next_hop(), Some(TileIndex::new(0)));
        assert_eq!(tiles[1].path_direction(), Some(Direction::West));
        assert_eq!(
            tiles[1].exit_point(),
            tiles[1].position() + Direction::West.half_vector()
        );
        assert_eq!(tiles[3].path_direction(), Some(Direction::South));
    }

    #[test]
    fn solve_routes_around_walls() {
        let mut tiles = tiles_with(3, 4, &[(7, Content::Destination), (4, Content::Wall)]);
        let mut field = FlowField::default();

        assert_eq!(field.solve(&mut tiles), Ok(()));

        assert_eq!(tiles[4].distance(), Some(1));
        assert_eq!(tiles[1].distance(), Some(4));
        assert_eq!(tiles[3].distance(), Some(2));
    }

    #[test]
    fn solve_fails_without_destination() {
        let mut tiles = tiles_with(2, 2, &[]);
        let mut field = FlowField::default();

        assert_eq!(field.solve(&mut tiles), Err(FlowFieldError::NoDestination));
    }

    #[test]
    fn solve_fails_when_tiles_are_enclosed() {
        // Corner tile 0 is cut off by walls on tiles 1 and 3.
        let mut tiles = tiles_with(
            3,
            3,
            &[
                (8, Content::Destination),
                (1, Content::Wall),
                (3, Content::Wall),
            ],
        );
        let mut field = FlowField::default();

        assert_eq!(
            field.solve(&mut tiles),
            Err(FlowFieldError::Unreachable { tiles: 1 })
        );
    }
}
