//! Fixed board topology: tiles, world positions and four-neighbour adjacency.

use glam::Vec3;
use tile_defence_core::{BoardSize, Direction, TileCoord, TileIndex};

use crate::content::Content;

/// Distance recorded for tiles that have no path to a destination.
const NO_PATH: u32 = u32::MAX;

/// Single square tile of the board.
///
/// Neighbour links are wired once while the grid is built and never change.
/// The path fields (`distance`, `next_hop`, `path_direction`, `exit_point`)
/// are rewritten by every flow-field solve.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    coord: TileCoord,
    position: Vec3,
    neighbors: [Option<TileIndex>; 4],
    alternate: bool,
    content: Content,
    distance: u32,
    next_hop: Option<TileIndex>,
    path_direction: Option<Direction>,
    exit_point: Vec3,
}

impl Tile {
    fn new(coord: TileCoord, position: Vec3, alternate: bool, content: Content) -> Self {
        Self {
            coord,
            position,
            neighbors: [None; 4],
            alternate,
            content,
            distance: NO_PATH,
            next_hop: None,
            path_direction: None,
            exit_point: position,
        }
    }

    /// Grid coordinate of the tile.
    #[must_use]
    pub const fn coord(&self) -> TileCoord {
        self.coord
    }

    /// World-space centre of the tile.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Neighbouring tile in the provided direction, if the board extends that far.
    #[must_use]
    pub const fn neighbor(&self, direction: Direction) -> Option<TileIndex> {
        self.neighbors[slot(direction)]
    }

    /// Parity flag deciding the order neighbours are probed while solving.
    #[must_use]
    pub const fn is_alternate(&self) -> bool {
        self.alternate
    }

    /// Content currently owned by the tile.
    #[must_use]
    pub const fn content(&self) -> &Content {
        &self.content
    }

    /// Steps to the nearest destination, or `None` when unreachable.
    #[must_use]
    pub const fn distance(&self) -> Option<u32> {
        if self.distance == NO_PATH {
            None
        } else {
            Some(self.distance)
        }
    }

    /// Reports whether the last solve reached this tile.
    #[must_use]
    pub const fn has_path(&self) -> bool {
        self.distance != NO_PATH
    }

    /// Neighbour to step toward; `None` at destinations and unreachable tiles.
    #[must_use]
    pub const fn next_hop(&self) -> Option<TileIndex> {
        self.next_hop
    }

    /// Heading an agent takes when leaving this tile.
    #[must_use]
    pub const fn path_direction(&self) -> Option<Direction> {
        self.path_direction
    }

    /// World-space point where an agent leaves this tile.
    #[must_use]
    pub const fn exit_point(&self) -> Vec3 {
        self.exit_point
    }

    pub(crate) fn content_mut(&mut self) -> &mut Content {
        &mut self.content
    }

    pub(crate) fn replace_content(&mut self, content: Content) -> Content {
        std::mem::replace(&mut self.content, content)
    }

    pub(crate) fn clear_path(&mut self) {
        self.distance = NO_PATH;
        self.next_hop = None;
        self.path_direction = None;
    }

    pub(crate) fn become_destination(&mut self) {
        self.distance = 0;
        self.next_hop = None;
        self.path_direction = None;
        self.exit_point = self.position;
    }

    pub(crate) fn raw_distance(&self) -> u32 {
        self.distance
    }

    pub(crate) fn set_path(&mut self, distance: u32, next_hop: TileIndex, heading: Direction) {
        self.distance = distance;
        self.next_hop = Some(next_hop);
        self.path_direction = Some(heading);
        self.exit_point = self.position + heading.half_vector();
    }
}

/// Builds the row-major tile array for the provided size with adjacency wired.
pub(crate) fn build_tiles<F>(size: BoardSize, mut content: F) -> Vec<Tile>
where
    F: FnMut() -> Content,
{
    let columns = size.columns();
    let rows = size.rows();
    let offset_x = (columns as f32 - 1.0) * 0.5;
    let offset_z = (rows as f32 - 1.0) * 0.5;

    let mut tiles: Vec<Tile> = Vec::with_capacity(size.tile_count());
    for row in 0..rows {
        for column in 0..columns {
            let index = tiles.len();
            let position = Vec3::new(column as f32 - offset_x, 0.0, row as f32 - offset_z);
            tiles.push(Tile::new(
                TileCoord::new(column, row),
                position,
                index % 2 == 0,
                content(),
            ));

            if column > 0 {
                make_east_west_neighbors(&mut tiles, index, index - 1);
            }
            if row > 0 {
                make_north_south_neighbors(&mut tiles, index, index - columns as usize);
            }
        }
    }
    tiles
}

fn make_east_west_neighbors(tiles: &mut [Tile], east: usize, west: usize) {
    debug_assert!(
        tiles[west].neighbors[slot(Direction::East)].is_none()
            && tiles[east].neighbors[slot(Direction::West)].is_none(),
        "redefined neighbors"
    );
    tiles[west].neighbors[slot(Direction::East)] = Some(tile_index(east));
    tiles[east].neighbors[slot(Direction::West)] = Some(tile_index(west));
}

fn make_north_south_neighbors(tiles: &mut [Tile], north: usize, south: usize) {
    debug_assert!(
        tiles[south].neighbors[slot(Direction::North)].is_none()
            && tiles[north].neighbors[slot(Direction::South)].is_none(),
        "redefined neighbors"
    );
    tiles[south].neighbors[slot(Direction::North)] = Some(tile_index(north));
    tiles[north].neighbors[slot(Direction::South)] = Some(tile_index(south));
}

/// Row-major index of the coordinate, if it lies on the board.
pub(crate) fn index_of(size: BoardSize, coord: TileCoord) -> Option<TileIndex> {
    if coord.column() >= size.columns() || coord.row() >= size.rows() {
        return None;
    }
    Some(TileIndex::new(coord.row() * size.columns() + coord.column()))
}

/// Tile containing the world-space point projected onto the board plane.
pub(crate) fn index_at(size: BoardSize, point: Vec3) -> Option<TileIndex> {
    let x = (point.x + size.columns() as f32 * 0.5).floor();
    let z = (point.z + size.rows() as f32 * 0.5).floor();
    if x.is_nan() || z.is_nan() || x < 0.0 || z < 0.0 {
        return None;
    }
    index_of(size, TileCoord::new(x as u32, z as u32))
}

const fn slot(direction: Direction) -> usize {
    match direction {
        Direction::North => 0,
        Direction::East => 1,
        Direction::South => 2,
        Direction::West => 3,
    }
}

fn tile_index(index: usize) -> TileIndex {
    TileIndex::new(index as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(columns: u32, rows: u32) -> (BoardSize, Vec<Tile>) {
        let size = BoardSize::new(columns, rows).expect("valid size");
        (size, build_tiles(size, || Content::Empty))
    }

    #[test]
    fn neighbors_are_wired_symmetrically() {
        let (size, tiles) = grid(4, 3);
        for (index, tile) in tiles.iter().enumerate() {
            for direction in Direction::ALL {
                if let Some(neighbor) = tile.neighbor(direction) {
                    let back = tiles[neighbor.as_usize()].neighbor(direction.opposite());
                    assert_eq!(back, Some(tile_index(index)));
                }
            }
        }
        assert_eq!(tiles.len(), size.tile_count());
    }

    #[test]
    fn edge_tiles_lack_outward_neighbors() {
        let (_, tiles) = grid(3, 3);
        assert!(tiles[0].neighbor(Direction::South).is_none());
        assert!(tiles[0].neighbor(Direction::West).is_none());
        assert_eq!(tiles[0].neighbor(Direction::North), Some(TileIndex::new(3)));
        assert_eq!(tiles[0].neighbor(Direction::East), Some(TileIndex::new(1)));
        assert!(tiles[8].neighbor(Direction::North).is_none());
        assert!(tiles[8].neighbor(Direction::East).is_none());
    }

    #[test]
    fn board_is_centred_on_origin() {
        let (_, tiles) = grid(5, 5);
        assert_eq!(tiles[12].position(), Vec3::ZERO);
        assert_eq!(tiles[0].position(), Vec3::new(-2.0, 0.0, -2.0));
        assert_eq!(tiles[24].position(), Vec3::new(2.0, 0.0, 2.0));
    }

    #[test]
    fn parity_alternates_by_index() {
        let (_, tiles) = grid(3, 2);
        let flags: Vec<bool> = tiles.iter().map(Tile::is_alternate).collect();
        assert_eq!(flags, vec![true, false, true, false, true, false]);
    }

    #[test]
    fn points_map_to_containing_tile() {
        let size = BoardSize::new(4, 4).expect("valid size");
        assert_eq!(
            index_at(size, Vec3::new(-1.9, 0.0, -1.9)),
            Some(TileIndex::new(0))
        );
        assert_eq!(
            index_at(size, Vec3::new(0.1, 0.0, 1.2)),
            Some(TileIndex::new(14))
        );
        assert_eq!(index_at(size, Vec3::new(2.1, 0.0, 0.0)), None);
        assert_eq!(index_at(size, Vec3::new(-2.1, 0.0, 0.0)), None);
    }
}
