#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation driver that owns the board, the entity registries and every
//! factory, and advances them one tick at a time.
//!
//! A tick runs in a fixed order: queued commands mutate the board, the
//! scenario spawns enemies and every enemy moves, towers fire at a snapshot of
//! the moved enemies, and finally shells and explosions update. Damage dealt
//! during a tick is therefore only noticed by an enemy on the following tick.

mod config;
mod registry;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tile_defence_core::{
    Command, Damage, EnemyKind, EnemyView, Event, GameOutcome, TileIndex, TowerKind,
};
use tile_defence_system_movement::{Enemy, EnemyFactory};
use tile_defence_system_spawning::{choose_spawn_point, Spawning};
use tile_defence_system_tower_combat::{
    Detonation, Launch, TowerCombat, WarEntity, WarFactory, WarPool,
};
use tile_defence_world::{self as world, Board, ContentPool};
use tracing::{debug, error, info};

pub use config::{BoardConfig, ConfigError, EnemyTable, SimulationConfig, TowerTable};
pub use registry::BehaviorCollection;

/// Number of instances each factory has issued and not yet taken back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FactoryLedger {
    /// Tile content held by the board.
    pub content: u64,
    /// Enemies alive in the registry.
    pub enemies: u64,
    /// Shells and explosions alive in the registry.
    pub war_entities: u64,
}

/// Single game session advanced by explicit ticks.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    board: Board,
    content: ContentPool,
    enemy_factory: EnemyFactory,
    enemies: BehaviorCollection<Enemy>,
    war_factory: WarPool,
    war: BehaviorCollection<WarEntity>,
    combat: TowerCombat,
    spawning: Spawning,
    rng: ChaCha8Rng,
    player_health: i32,
    ticks: u64,
    spawned: Vec<EnemyKind>,
    tower_tiles: Vec<TileIndex>,
    damage: Vec<Damage>,
    launches: Vec<Launch>,
    detonations: Vec<Detonation>,
}

impl Simulation {
    /// Validates the configuration and builds a fresh session from it.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let size = config.board_size()?;
        let spawning = Spawning::new(config.scenario.clone())?;

        let mut content = [TowerKind::Laser, TowerKind::Mortar]
            .into_iter()
            .fold(ContentPool::new(), |pool, kind| {
                pool.with_tower_config(kind, config.towers.get(kind))
            });
        let enemy_factory = [EnemyKind::Small, EnemyKind::Medium, EnemyKind::Large]
            .into_iter()
            .fold(EnemyFactory::new(), |factory, kind| {
                factory.with_config(kind, config.enemies.get(kind))
            });
        let board = Board::new(size, &mut content);

        info!(
            columns = size.columns(),
            rows = size.rows(),
            seed = config.seed,
            player_health = config.player_health,
            "simulation created"
        );

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            player_health: config.player_health,
            config,
            board,
            content,
            enemy_factory,
            enemies: BehaviorCollection::new(),
            war_factory: WarPool::new(),
            war: BehaviorCollection::new(),
            combat: TowerCombat::new(),
            spawning,
            ticks: 0,
            spawned: Vec::new(),
            tower_tiles: Vec::new(),
            damage: Vec::new(),
            launches: Vec::new(),
            detonations: Vec::new(),
        })
    }

    /// Configuration the session was built from.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Authoritative board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Enemies currently on the board.
    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    /// Shells and explosions currently alive.
    pub fn war_entities(&self) -> impl Iterator<Item = &WarEntity> {
        self.war.iter()
    }

    /// Scenario playback state.
    #[must_use]
    pub const fn spawning(&self) -> &Spawning {
        &self.spawning
    }

    /// Remaining player health.
    #[must_use]
    pub const fn player_health(&self) -> i32 {
        self.player_health
    }

    /// Number of ticks simulated since the session was created.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Outstanding instances per factory.
    #[must_use]
    pub fn ledger(&self) -> FactoryLedger {
        FactoryLedger {
            content: self.content.live(),
            enemies: self.enemy_factory.live(),
            war_entities: self.war_factory.live(),
        }
    }

    /// Advances the session by `dt` seconds after applying `commands` in order.
    pub fn tick(&mut self, dt: f32, commands: &[Command], out_events: &mut Vec<Event>) {
        for command in commands {
            match command {
                Command::NewGame => self.begin_new_game(GameOutcome::Requested, out_events),
                _ => world::apply(&mut self.board, &mut self.content, *command, out_events),
            }
        }

        self.spawn_due_enemies(dt, out_events);
        let arrivals = self.update_enemies(dt, out_events);
        self.player_health -= arrivals;

        let view = EnemyView::from_snapshots(self.enemies.iter().map(Enemy::snapshot).collect());
        self.update_towers(&view, dt, out_events);
        self.update_war_entities(&view, dt, out_events);

        self.ticks += 1;

        if self.config.player_health > 0 && self.player_health <= 0 {
            self.begin_new_game(GameOutcome::Defeat, out_events);
        } else if self.spawning.is_finished() && self.enemies.is_empty() {
            self.begin_new_game(GameOutcome::Victory, out_events);
        }
    }

    /// Discards the session's board content and entities and restarts the scenario.
    pub fn begin_new_game(&mut self, outcome: GameOutcome, out_events: &mut Vec<Event>) {
        info!(
            ?outcome,
            ticks = self.ticks,
            player_health = self.player_health,
            enemies = self.enemies.len(),
            "starting new game"
        );

        world::apply(&mut self.board, &mut self.content, Command::NewGame, out_events);
        let Self {
            enemies,
            enemy_factory,
            war,
            war_factory,
            ..
        } = self;
        enemies.clear(|enemy| enemy_factory.reclaim(enemy));
        war.clear(|entity| war_factory.reclaim(entity));

        self.spawning.restart();
        self.player_health = self.config.player_health;
        out_events.push(Event::NewGameStarted { outcome });
    }

    fn spawn_due_enemies(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        self.spawned.clear();
        let _ = self.spawning.progress(dt, &mut self.spawned);

        for kind in self.spawned.drain(..) {
            let Some(tile) = choose_spawn_point(&self.board, &mut self.rng) else {
                debug_assert!(false, "board has no spawn point");
                error!(?kind, "no spawn point available");
                continue;
            };
            let enemy = self
                .enemy_factory
                .spawn(kind, &self.board, tile, &mut self.rng);
            let coord = self.board.tile(tile).coord();
            debug!(enemy = enemy.id().get(), ?kind, ?coord, "enemy spawned");
            out_events.push(Event::EnemySpawned {
                enemy: enemy.id(),
                kind,
                tile: coord,
            });
            self.enemies.add(enemy);
        }
    }

    /// Moves every enemy and returns how many reached a destination.
    fn update_enemies(&mut self, dt: f32, out_events: &mut Vec<Event>) -> i32 {
        let first = out_events.len();
        let Self {
            board,
            enemies,
            enemy_factory,
            ..
        } = self;
        enemies.update(
            |enemy| enemy.game_update(board, dt, out_events),
            |enemy| enemy_factory.reclaim(enemy),
        );

        let arrivals = out_events[first..]
            .iter()
            .filter(|event| matches!(event, Event::EnemyReachedDestination { .. }))
            .count();
        i32::try_from(arrivals).unwrap_or(i32::MAX)
    }

    fn update_towers(&mut self, view: &EnemyView, dt: f32, out_events: &mut Vec<Event>) {
        self.tower_tiles.clear();
        self.tower_tiles
            .extend_from_slice(self.board.updating_content());

        for &index in &self.tower_tiles {
            let base = self.board.tile(index).position();
            let Some(tower) = self.board.tower_mut(index) else {
                continue;
            };
            self.combat.update_tower(
                tower,
                base,
                view,
                dt,
                &mut self.rng,
                &mut self.damage,
                &mut self.launches,
            );
        }
        self.apply_damage();

        for launch in self.launches.drain(..) {
            let mut shell = self.war_factory.spawn_shell();
            shell.initialize(&launch);
            self.war.add(WarEntity::Shell(shell));
            out_events.push(Event::ShellLaunched {
                from: launch.from,
                to: launch.to,
            });
        }
    }

    fn update_war_entities(&mut self, view: &EnemyView, dt: f32, out_events: &mut Vec<Event>) {
        let Self {
            war,
            war_factory,
            detonations,
            ..
        } = self;
        war.update(
            |entity| entity.game_update(dt, detonations),
            |entity| war_factory.reclaim(entity),
        );

        for detonation in self.detonations.drain(..) {
            let mut explosion = self.war_factory.spawn_explosion();
            let hits = explosion.initialize(&detonation, view, &mut self.damage);
            self.war.add(WarEntity::Explosion(explosion));
            debug!(
                position = ?detonation.position,
                blast_radius = detonation.blast_radius,
                hits,
                "shell detonated"
            );
            out_events.push(Event::Detonated {
                position: detonation.position,
                blast_radius: detonation.blast_radius,
                hits,
            });
        }
        self.apply_damage();
    }

    fn apply_damage(&mut self) {
        for damage in self.damage.drain(..) {
            if let Some(enemy) = self
                .enemies
                .iter_mut()
                .find(|enemy| enemy.id() == damage.enemy)
            {
                enemy.apply_damage(damage.amount);
            }
        }
    }
}
