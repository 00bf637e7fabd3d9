use tile_defence_core::{
    BoardSize, Command, ContentType, Event, PlacementError, TileCoord, TowerKind,
};
use tile_defence_world::{self as world, query, Board, ContentPool};

fn board(columns: u32, rows: u32) -> (Board, ContentPool) {
    let mut pool = ContentPool::new();
    let size = BoardSize::new(columns, rows).expect("valid size");
    (Board::new(size, &mut pool), pool)
}

#[test]
fn stranding_wall_leaves_board_unchanged() {
    let (mut board, mut pool) = board(3, 3);
    assert_eq!(
        board.toggle_wall(TileCoord::new(1, 0), &mut pool),
        Ok(ContentType::Wall)
    );

    let before = board.tiles().to_vec();
    let live = pool.live();

    assert_eq!(
        board.toggle_wall(TileCoord::new(0, 1), &mut pool),
        Err(PlacementError::Disconnected),
        "wall would cut the spawn corner off"
    );

    assert_eq!(board.tiles(), before.as_slice(), "rollback must be complete");
    assert_eq!(pool.live(), live, "rollback must reclaim the rejected wall");
}

#[test]
fn stranding_tower_is_rolled_back() {
    let (mut board, mut pool) = board(3, 3);
    let _ = board.toggle_wall(TileCoord::new(1, 0), &mut pool);
    let before = board.tiles().to_vec();

    assert_eq!(
        board.toggle_tower(TileCoord::new(0, 1), TowerKind::Laser, &mut pool),
        Err(PlacementError::Disconnected)
    );
    assert_eq!(board.tiles(), before.as_slice());
    assert!(board.updating_content().is_empty());
}

#[test]
fn tower_over_wall_skips_the_solve() {
    let (mut board, mut pool) = board(4, 4);
    let coord = TileCoord::new(2, 3);
    let _ = board.toggle_wall(coord, &mut pool);
    let distances: Vec<_> = board.tiles().iter().map(|tile| tile.distance()).collect();

    assert_eq!(
        board.toggle_tower(coord, TowerKind::Mortar, &mut pool),
        Ok(ContentType::Tower)
    );

    let after: Vec<_> = board.tiles().iter().map(|tile| tile.distance()).collect();
    assert_eq!(distances, after);
    assert_eq!(query::towers(&board), vec![(coord, TowerKind::Mortar)]);
}

#[test]
fn different_tower_kind_swaps_in_place() {
    let (mut board, mut pool) = board(4, 4);
    let coord = TileCoord::new(3, 3);
    let mut events = Vec::new();

    for kind in [TowerKind::Laser, TowerKind::Mortar, TowerKind::Mortar] {
        world::apply(
            &mut board,
            &mut pool,
            Command::ToggleTower { tile: coord, kind },
            &mut events,
        );
    }

    assert_eq!(
        events,
        vec![
            Event::ContentChanged {
                tile: coord,
                content: ContentType::Tower,
            },
            Event::ContentChanged {
                tile: coord,
                content: ContentType::Tower,
            },
            Event::ContentChanged {
                tile: coord,
                content: ContentType::Empty,
            },
        ]
    );
    assert!(query::towers(&board).is_empty());
}

#[test]
fn occupied_tiles_reject_foreign_toggles() {
    let (mut board, mut pool) = board(3, 3);
    let spawn = TileCoord::new(0, 0);

    assert_eq!(
        board.toggle_wall(spawn, &mut pool),
        Err(PlacementError::Occupied {
            content: ContentType::SpawnPoint
        })
    );
    assert_eq!(
        board.toggle_tower(TileCoord::new(1, 1), TowerKind::Laser, &mut pool),
        Err(PlacementError::Occupied {
            content: ContentType::Destination
        })
    );
    assert_eq!(
        board.toggle_destination(TileCoord::new(3, 3), &mut pool),
        Err(PlacementError::OutOfBounds)
    );
}

#[test]
fn last_spawn_point_is_kept() {
    let (mut board, mut pool) = board(3, 3);
    let mut events = Vec::new();

    world::apply(
        &mut board,
        &mut pool,
        Command::ToggleSpawnPoint {
            tile: TileCoord::new(0, 0),
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::PlacementRejected {
            tile: TileCoord::new(0, 0),
            reason: PlacementError::LastSpawnPoint,
        }]
    );
    assert_eq!(query::spawn_points(&board), vec![TileCoord::new(0, 0)]);
}
