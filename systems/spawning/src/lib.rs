#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scenario-driven spawning system that decides when and what enemies enter.
//!
//! A [`GameScenario`] is an ordered list of [`EnemyWave`]s, each an ordered
//! list of [`SpawnSequence`]s. Every level of the hierarchy hands the time it
//! did not consume to the next level, so a single large tick carries across
//! sequence and wave boundaries without losing spawns.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tile_defence_core::{EnemyKind, TileIndex};
use tile_defence_world::Board;

/// Group of identical enemies spawned at a fixed cadence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnSequence {
    /// Kind of enemy to spawn.
    pub enemy: EnemyKind,
    /// Number of enemies in the sequence.
    pub amount: u32,
    /// Seconds between consecutive spawns.
    pub cooldown: f32,
}

/// Ordered spawn sequences played back to back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyWave {
    /// Sequences of the wave.
    pub sequences: Vec<SpawnSequence>,
}

/// Ordered waves, optionally replayed for several cycles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameScenario {
    /// Waves of the scenario.
    pub waves: Vec<EnemyWave>,
    /// Number of times the waves are played; zero repeats forever.
    #[serde(default = "default_cycles")]
    pub cycles: u32,
    /// Time-scale increase applied at the start of each repeated cycle.
    #[serde(default)]
    pub cycle_speed_up: f32,
}

const fn default_cycles() -> u32 {
    1
}

impl Default for GameScenario {
    fn default() -> Self {
        let sequence = |enemy, amount, cooldown| SpawnSequence {
            enemy,
            amount,
            cooldown,
        };
        Self {
            waves: vec![
                EnemyWave {
                    sequences: vec![
                        sequence(EnemyKind::Small, 5, 1.0),
                        sequence(EnemyKind::Medium, 3, 1.5),
                    ],
                },
                EnemyWave {
                    sequences: vec![
                        sequence(EnemyKind::Medium, 5, 1.0),
                        sequence(EnemyKind::Small, 10, 0.25),
                        sequence(EnemyKind::Large, 2, 2.5),
                    ],
                },
            ],
            cycles: default_cycles(),
            cycle_speed_up: 0.5,
        }
    }
}

/// Reasons a scenario cannot be played.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ScenarioError {
    /// The scenario has no waves.
    #[error("scenario has no waves")]
    NoWaves,
    /// A wave has no spawn sequences.
    #[error("wave {wave} has no spawn sequences")]
    EmptyWave {
        /// Zero-based wave index.
        wave: usize,
    },
    /// A sequence spawns nothing.
    #[error("sequence {sequence} of wave {wave} has zero enemies")]
    ZeroAmount {
        /// Zero-based wave index.
        wave: usize,
        /// Zero-based sequence index.
        sequence: usize,
    },
    /// A sequence's cooldown is not strictly positive.
    #[error("sequence {sequence} of wave {wave} has non-positive cooldown {cooldown}")]
    NonPositiveCooldown {
        /// Zero-based wave index.
        wave: usize,
        /// Zero-based sequence index.
        sequence: usize,
        /// Offending cooldown.
        cooldown: f32,
    },
    /// The cycle speed-up would stall or reverse time.
    #[error("cycle speed-up {0} must not be negative")]
    NegativeSpeedUp(f32),
}

impl GameScenario {
    /// Checks that every wave and sequence can be played back.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.waves.is_empty() {
            return Err(ScenarioError::NoWaves);
        }
        if self.cycle_speed_up.is_nan() || self.cycle_speed_up < 0.0 {
            return Err(ScenarioError::NegativeSpeedUp(self.cycle_speed_up));
        }
        for (wave, entry) in self.waves.iter().enumerate() {
            if entry.sequences.is_empty() {
                return Err(ScenarioError::EmptyWave { wave });
            }
            for (sequence, spawn) in entry.sequences.iter().enumerate() {
                if spawn.amount == 0 {
                    return Err(ScenarioError::ZeroAmount { wave, sequence });
                }
                if spawn.cooldown.is_nan() || spawn.cooldown <= 0.0 {
                    return Err(ScenarioError::NonPositiveCooldown {
                        wave,
                        sequence,
                        cooldown: spawn.cooldown,
                    });
                }
            }
        }
        Ok(())
    }

    /// Total number of enemies spawned by one cycle.
    #[must_use]
    pub fn enemies_per_cycle(&self) -> u64 {
        self.waves
            .iter()
            .flat_map(|wave| wave.sequences.iter())
            .map(|sequence| u64::from(sequence.amount))
            .sum()
    }
}

#[derive(Clone, Copy, Debug)]
struct SequenceState {
    count: u32,
    cooldown: f32,
}

impl SequenceState {
    /// Starts with a full cooldown so the first enemy spawns immediately.
    fn begin(sequence: &SpawnSequence) -> Self {
        Self {
            count: 0,
            cooldown: sequence.cooldown,
        }
    }

    fn progress(
        &mut self,
        sequence: &SpawnSequence,
        dt: f32,
        out: &mut Vec<EnemyKind>,
    ) -> Option<f32> {
        self.cooldown += dt;
        while self.cooldown >= sequence.cooldown {
            self.cooldown -= sequence.cooldown;
            if self.count >= sequence.amount {
                return Some(self.cooldown);
            }
            self.count += 1;
            out.push(sequence.enemy);
        }
        None
    }
}

#[derive(Clone, Copy, Debug)]
struct WaveState {
    index: usize,
    sequence: SequenceState,
}

impl WaveState {
    fn begin(wave: &EnemyWave) -> Self {
        Self {
            index: 0,
            sequence: wave
                .sequences
                .first()
                .map_or(SequenceState { count: 0, cooldown: 0.0 }, SequenceState::begin),
        }
    }

    fn progress(&mut self, wave: &EnemyWave, dt: f32, out: &mut Vec<EnemyKind>) -> Option<f32> {
        let mut leftover = match wave.sequences.get(self.index) {
            Some(sequence) => self.sequence.progress(sequence, dt, out),
            None => Some(dt),
        };
        while let Some(dt) = leftover {
            self.index += 1;
            let Some(sequence) = wave.sequences.get(self.index) else {
                return Some(dt);
            };
            self.sequence = SequenceState::begin(sequence);
            leftover = self.sequence.progress(sequence, dt, out);
        }
        None
    }
}

/// Plays a scenario back and reports which enemies are due each tick.
#[derive(Clone, Debug)]
pub struct Spawning {
    scenario: GameScenario,
    wave_index: usize,
    wave: WaveState,
    cycle: u32,
    time_scale: f32,
    finished: bool,
}

impl Spawning {
    /// Validates the scenario and prepares it for playback.
    pub fn new(scenario: GameScenario) -> Result<Self, ScenarioError> {
        scenario.validate()?;
        let wave = WaveState::begin(&scenario.waves[0]);
        Ok(Self {
            scenario,
            wave_index: 0,
            wave,
            cycle: 0,
            time_scale: 1.0,
            finished: false,
        })
    }

    /// Scenario being played.
    #[must_use]
    pub fn scenario(&self) -> &GameScenario {
        &self.scenario
    }

    /// Rewinds playback to the first sequence of the first wave.
    pub fn restart(&mut self) {
        self.wave_index = 0;
        self.wave = WaveState::begin(&self.scenario.waves[0]);
        self.cycle = 0;
        self.time_scale = 1.0;
        self.finished = false;
    }

    /// Reports whether every cycle of the scenario has been played.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Zero-based index of the wave being played.
    #[must_use]
    pub const fn wave_index(&self) -> usize {
        self.wave_index
    }

    /// Zero-based index of the cycle being played.
    #[must_use]
    pub const fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Advances playback by `dt` seconds, pushing the kind of every enemy due.
    ///
    /// Returns `false` once the scenario has finished.
    pub fn progress(&mut self, dt: f32, out: &mut Vec<EnemyKind>) -> bool {
        if self.finished {
            return false;
        }

        let waves = &self.scenario.waves;
        let mut leftover = self.wave.progress(&waves[self.wave_index], self.time_scale * dt, out);
        while let Some(dt) = leftover {
            self.wave_index += 1;
            if self.wave_index >= waves.len() {
                self.cycle += 1;
                if self.scenario.cycles > 0 && self.cycle >= self.scenario.cycles {
                    self.finished = true;
                    return false;
                }
                self.wave_index = 0;
                self.time_scale += self.scenario.cycle_speed_up;
            }
            let wave = &waves[self.wave_index];
            self.wave = WaveState::begin(wave);
            leftover = self.wave.progress(wave, dt, out);
        }
        true
    }
}

/// Picks one of the board's spawn points uniformly at random.
pub fn choose_spawn_point<R>(board: &Board, rng: &mut R) -> Option<TileIndex>
where
    R: Rng + ?Sized,
{
    let count = board.spawn_point_count();
    if count == 0 {
        return None;
    }
    board.spawn_point(rng.gen_range(0..count))
}
