use tile_defence_core::{BoardSize, Command, ContentType, TileCoord};
use tile_defence_world::{self as world, query, Board, ContentPool, Tile};

fn board_with(columns: u32, rows: u32, commands: &[Command]) -> (Board, ContentPool) {
    let mut pool = ContentPool::new();
    let size = BoardSize::new(columns, rows).expect("valid size");
    let mut board = Board::new(size, &mut pool);
    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut board, &mut pool, *command, &mut events);
    }
    (board, pool)
}

fn wall(column: u32, row: u32) -> Command {
    Command::ToggleWall {
        tile: TileCoord::new(column, row),
    }
}

fn assert_chains_terminate(board: &Board) {
    for tile in board.tiles() {
        if tile.content().blocks_path() {
            continue;
        }
        let distance = tile.distance().expect("passable tile has a path");
        let mut current = tile;
        let mut steps = 0;
        while let Some(next) = current.next_hop() {
            let following = board.tile(next);
            assert_eq!(
                following.coord().manhattan_distance(current.coord()),
                1,
                "next hop must be an orthogonal neighbour"
            );
            current = following;
            steps += 1;
            assert!(steps <= distance, "chain from {:?} overshot", tile.coord());
        }
        assert_eq!(
            current.content().content_type(),
            ContentType::Destination,
            "chain from {:?} ended off a destination",
            tile.coord()
        );
        assert_eq!(steps, distance, "chain length from {:?}", tile.coord());
    }
}

#[test]
fn open_board_chains_reach_destination_in_distance_steps() {
    let (board, _) = board_with(7, 5, &[]);
    assert_chains_terminate(&board);
}

#[test]
fn maze_chains_reach_nearest_destination() {
    let (board, _) = board_with(
        6,
        6,
        &[
            wall(1, 1),
            wall(1, 2),
            wall(1, 3),
            wall(1, 4),
            wall(3, 0),
            wall(3, 1),
            wall(3, 2),
            wall(4, 4),
            Command::ToggleDestination {
                tile: TileCoord::new(5, 5),
            },
        ],
    );

    assert_eq!(query::content(&board, TileCoord::new(1, 4)), Some(ContentType::Wall));
    assert_eq!(query::distance(&board, TileCoord::new(5, 5)), Some(0));
    assert_chains_terminate(&board);
}

#[test]
fn blocking_tiles_receive_bookkeeping_paths() {
    let (board, _) = board_with(4, 4, &[wall(3, 3)]);
    let corner = board
        .index_of(TileCoord::new(3, 3))
        .map(|index| board.tile(index))
        .expect("corner tile");

    assert!(corner.has_path(), "walls still record a distance");
    assert!(board.tiles().iter().all(Tile::has_path));
}

#[test]
fn solving_twice_is_idempotent() {
    let (mut board, _) = board_with(5, 5, &[wall(1, 1), wall(2, 1), wall(3, 3)]);
    let before = board.tiles().to_vec();

    board.solve().expect("valid board solves");
    let once = board.tiles().to_vec();
    board.solve().expect("valid board solves");
    let twice = board.tiles().to_vec();

    assert_eq!(before, once, "solve changed an already solved board");
    assert_eq!(once, twice, "consecutive solves diverged");
}

#[test]
fn tile_at_maps_world_points_to_tiles() {
    let (board, _) = board_with(5, 3, &[]);
    for tile in board.tiles() {
        let index = board.tile_at(tile.position()).expect("centre is on board");
        assert_eq!(board.tile(index).coord(), tile.coord());
    }
    assert!(board.tile_at(glam::Vec3::new(3.0, 0.0, 0.0)).is_none());
}
