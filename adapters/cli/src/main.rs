#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Tile Defence session.

use std::{path::PathBuf, str::FromStr};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tile_defence_core::{Command, Event, GameOutcome, TileCoord, TowerKind, WELCOME_BANNER};
use tile_defence_system_simulation::{Simulation, SimulationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Runs a Tile Defence scenario without rendering and reports what happened.
#[derive(Debug, Parser)]
#[command(name = "tile-defence", version, about)]
struct Cli {
    /// TOML file with board, tower, enemy and scenario tuning.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 1_800)]
    ticks: u64,
    /// Seconds simulated per tick.
    #[arg(long, default_value_t = 1.0 / 30.0)]
    dt: f32,
    /// Wall toggled before the first tick, written as COLUMN,ROW.
    #[arg(long = "wall", value_name = "COLUMN,ROW", value_parser = parse_coord)]
    walls: Vec<TileCoord>,
    /// Tower placed before the first tick, written as KIND@COLUMN,ROW.
    #[arg(long = "tower", value_name = "KIND@COLUMN,ROW")]
    towers: Vec<TowerPlacement>,
    /// Prints the summary as JSON instead of text.
    #[arg(long)]
    json: bool,
}

/// Tower requested on the command line.
#[derive(Clone, Copy, Debug)]
struct TowerPlacement {
    kind: TowerKind,
    tile: TileCoord,
}

impl FromStr for TowerPlacement {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (kind, coord) = value
            .split_once('@')
            .ok_or_else(|| format!("expected KIND@COLUMN,ROW, got `{value}`"))?;
        let kind = match kind.trim().to_ascii_lowercase().as_str() {
            "laser" => TowerKind::Laser,
            "mortar" => TowerKind::Mortar,
            other => return Err(format!("unknown tower kind `{other}`")),
        };
        Ok(Self {
            kind,
            tile: parse_coord(coord)?,
        })
    }
}

fn parse_coord(value: &str) -> Result<TileCoord, String> {
    let (column, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected COLUMN,ROW, got `{value}`"))?;
    let column = column
        .trim()
        .parse()
        .map_err(|error| format!("invalid column `{column}`: {error}"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|error| format!("invalid row `{row}`: {error}"))?;
    Ok(TileCoord::new(column, row))
}

/// Tally of the events observed during a run.
#[derive(Debug, Default, Serialize)]
struct Summary {
    ticks: u64,
    seconds: f32,
    placements: u32,
    placements_rejected: u32,
    enemies_spawned: u32,
    enemies_killed: u32,
    destinations_reached: u32,
    shells_launched: u32,
    detonations: u32,
    games_finished: Vec<String>,
    player_health: i32,
    enemies_alive: usize,
    scenario_cycles: u32,
    enemies_per_cycle: u64,
}

impl Summary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::ContentChanged { .. } => self.placements += 1,
            Event::PlacementRejected { tile, reason } => {
                self.placements_rejected += 1;
                info!(?tile, %reason, "placement rejected");
            }
            Event::EnemySpawned { .. } => self.enemies_spawned += 1,
            Event::EnemyKilled { .. } => self.enemies_killed += 1,
            Event::EnemyReachedDestination { .. } => self.destinations_reached += 1,
            Event::ShellLaunched { .. } => self.shells_launched += 1,
            Event::Detonated { .. } => self.detonations += 1,
            Event::NewGameStarted { outcome } => {
                if *outcome != GameOutcome::Requested {
                    self.games_finished.push(format!("{outcome:?}").to_lowercase());
                }
            }
            Event::EnemyEnteredTile { .. } => {}
        }
    }

    fn print(&self) {
        println!("Simulated {} ticks ({:.1} s).", self.ticks, self.seconds);
        println!(
            "Scenario: {} enemies per cycle, {} cycles.",
            self.enemies_per_cycle, self.scenario_cycles
        );
        println!(
            "Placements: {} applied, {} rejected.",
            self.placements, self.placements_rejected
        );
        println!(
            "Enemies: {} spawned, {} killed, {} reached a destination, {} alive.",
            self.enemies_spawned,
            self.enemies_killed,
            self.destinations_reached,
            self.enemies_alive
        );
        println!(
            "Mortars: {} shells launched, {} detonations.",
            self.shells_launched, self.detonations
        );
        if self.games_finished.is_empty() {
            println!("No game finished.");
        } else {
            println!("Games finished: {}.", self.games_finished.join(", "));
        }
        println!("Player health: {}.", self.player_health);
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(simulation: &mut Simulation, cli: &Cli) -> Summary {
    let mut commands: Vec<Command> = cli
        .walls
        .iter()
        .map(|&tile| Command::ToggleWall { tile })
        .collect();
    commands.extend(
        cli.towers
            .iter()
            .map(|placement| Command::ToggleTower {
                tile: placement.tile,
                kind: placement.kind,
            }),
    );

    let mut summary = Summary::default();
    let mut events = Vec::new();
    for tick in 0..cli.ticks {
        let pending: &[Command] = if tick == 0 { &commands } else { &[] };
        simulation.tick(cli.dt, pending, &mut events);
        for event in events.drain(..) {
            summary.record(&event);
        }
    }

    summary.ticks = cli.ticks;
    summary.seconds = cli.ticks as f32 * cli.dt;
    summary.player_health = simulation.player_health();
    summary.enemies_alive = simulation.enemies().count();
    let scenario = simulation.spawning().scenario();
    summary.scenario_cycles = scenario.cycles;
    summary.enemies_per_cycle = scenario.enemies_per_cycle();
    summary
}

/// Entry point for the Tile Defence command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    if !(cli.dt.is_finite() && cli.dt > 0.0) {
        bail!("tick duration must be a positive number of seconds, got {}", cli.dt);
    }

    let config = match &cli.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    let mut simulation = Simulation::new(config).context("failed to start the simulation")?;

    let summary = run(&mut simulation, &cli);
    if cli.json {
        let encoded =
            serde_json::to_string_pretty(&summary).context("failed to encode the summary")?;
        println!("{encoded}");
    } else {
        println!("{WELCOME_BANNER}");
        summary.print();
    }
    Ok(())
}
