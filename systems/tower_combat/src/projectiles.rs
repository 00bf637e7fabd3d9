//! Non-enemy entities spawned by towers: shells and their explosions.

use glam::Vec3;
use tile_defence_core::{Damage, EnemyView, StepOutcome, GRAVITY};

use crate::Launch;

/// Seconds an explosion stays alive after dealing its damage.
pub const EXPLOSION_DURATION: f32 = 0.5;

/// Shell flying along a parabola toward its ground target.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shell {
    launch_point: Vec3,
    target_point: Vec3,
    launch_velocity: Vec3,
    blast_radius: f32,
    damage: f32,
    age: f32,
    position: Vec3,
}

impl Shell {
    /// Arms the shell with the physical parameters of a launch.
    pub fn initialize(&mut self, launch: &Launch) {
        self.launch_point = launch.from;
        self.target_point = launch.to;
        self.launch_velocity = launch.velocity;
        self.blast_radius = launch.blast_radius;
        self.damage = launch.damage;
        self.age = 0.0;
        self.position = launch.from;
    }

    /// Current world-space position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Ground point the shell was aimed at.
    #[must_use]
    pub const fn target_point(&self) -> Vec3 {
        self.target_point
    }

    /// Seconds since launch.
    #[must_use]
    pub const fn age(&self) -> f32 {
        self.age
    }

    /// Instantaneous velocity; the shell faces along it.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.launch_velocity - Vec3::Y * (GRAVITY * self.age)
    }

    /// Advances the flight by `dt` seconds.
    ///
    /// On ground contact the shell queues a detonation at its target point
    /// and asks to be removed.
    pub fn game_update(&mut self, dt: f32, out_detonations: &mut Vec<Detonation>) -> StepOutcome {
        self.age += dt;
        let mut position = self.launch_point + self.launch_velocity * self.age;
        position.y -= 0.5 * GRAVITY * self.age * self.age;

        if position.y <= 0.0 {
            out_detonations.push(Detonation {
                position: self.target_point,
                blast_radius: self.blast_radius,
                damage: self.damage,
            });
            return StepOutcome::Remove;
        }
        self.position = position;
        StepOutcome::Continue
    }
}

/// Area damage request produced by a landing shell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detonation {
    /// Ground point of the impact.
    pub position: Vec3,
    /// Radius of the blast.
    pub blast_radius: f32,
    /// Damage dealt to every enemy caught in the blast.
    pub damage: f32,
}

/// Short-lived blast that deals its damage once when initialised.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Explosion {
    position: Vec3,
    blast_radius: f32,
    age: f32,
}

impl Explosion {
    /// Applies the detonation's damage to every enemy whose hit sphere
    /// overlaps the blast and starts the explosion's lifetime.
    ///
    /// Returns the number of enemies hit.
    pub fn initialize(
        &mut self,
        detonation: &Detonation,
        enemies: &EnemyView,
        out_damage: &mut Vec<Damage>,
    ) -> u32 {
        self.position = detonation.position;
        self.blast_radius = detonation.blast_radius;
        self.age = 0.0;

        let mut hits = 0;
        for enemy in enemies.iter() {
            let reach = detonation.blast_radius + enemy.hit_radius();
            if enemy.position.distance_squared(detonation.position) <= reach * reach {
                out_damage.push(Damage {
                    enemy: enemy.id,
                    amount: detonation.damage,
                });
                hits += 1;
            }
        }
        hits
    }

    /// Centre of the blast.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Fraction of the visual lifetime that has elapsed.
    #[must_use]
    pub fn progress(&self) -> f32 {
        (self.age / EXPLOSION_DURATION).min(1.0)
    }

    /// Ages the explosion, asking for removal once its duration elapsed.
    pub fn game_update(&mut self, dt: f32) -> StepOutcome {
        self.age += dt;
        if self.age >= EXPLOSION_DURATION {
            StepOutcome::Remove
        } else {
            StepOutcome::Continue
        }
    }
}

/// Entity stored in the non-enemy registry.
#[derive(Clone, Debug, PartialEq)]
pub enum WarEntity {
    /// Shell in flight.
    Shell(Shell),
    /// Explosion playing out.
    Explosion(Explosion),
}

impl WarEntity {
    /// Advances the entity by `dt` seconds.
    pub fn game_update(&mut self, dt: f32, out_detonations: &mut Vec<Detonation>) -> StepOutcome {
        match self {
            Self::Shell(shell) => shell.game_update(dt, out_detonations),
            Self::Explosion(explosion) => explosion.game_update(dt),
        }
    }
}

/// Issues shells and explosions and takes finished ones back.
pub trait WarFactory {
    /// Returns an unarmed shell.
    fn spawn_shell(&mut self) -> Shell;

    /// Returns an explosion awaiting initialisation.
    fn spawn_explosion(&mut self) -> Explosion;

    /// Takes back an entity that left the registry.
    fn reclaim(&mut self, entity: WarEntity);
}

/// Default war factory that recycles reclaimed instances.
#[derive(Clone, Debug, Default)]
pub struct WarPool {
    shells: Vec<Shell>,
    explosions: Vec<Explosion>,
    issued: u64,
    reclaimed: u64,
}

impl WarPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities issued and not yet reclaimed.
    #[must_use]
    pub const fn live(&self) -> u64 {
        self.issued - self.reclaimed
    }
}

impl WarFactory for WarPool {
    fn spawn_shell(&mut self) -> Shell {
        self.issued += 1;
        self.shells.pop().unwrap_or_default()
    }

    fn spawn_explosion(&mut self) -> Explosion {
        self.issued += 1;
        self.explosions.pop().unwrap_or_default()
    }

    fn reclaim(&mut self, entity: WarEntity) {
        debug_assert!(self.reclaimed < self.issued, "reclaimed a foreign entity");
        self.reclaimed += 1;
        match entity {
            WarEntity::Shell(shell) => self.shells.push(shell),
            WarEntity::Explosion(explosion) => self.explosions.push(explosion),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solve_launch;
    use tile_defence_core::{EnemyId, EnemySnapshot};
    use tile_defence_world::launch_speed_for;

    fn snapshot(id: u32, x: f32, scale: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            position: Vec3::new(x, 0.0, 0.0),
            scale,
            health: 10.0,
        }
    }

    #[test]
    fn shell_lands_on_its_target() {
        let from = Vec3::new(0.0, 1.0, 0.0);
        let to = Vec3::new(-2.0, 0.0, 2.0);
        let velocity = solve_launch(from, to, launch_speed_for(3.5, 1.0)).expect("in reach");
        let mut shell = Shell::default();
        shell.initialize(&Launch {
            from,
            to,
            velocity,
            blast_radius: 1.0,
            damage: 5.0,
        });

        let mut detonations = Vec::new();
        let mut last = shell.position();
        while shell.game_update(0.001, &mut detonations) == StepOutcome::Continue {
            last = shell.position();
            assert!(shell.age() < 10.0, "shell never landed");
        }

        let flat = Vec3::new(last.x, 0.0, last.z);
        assert!(flat.distance(to) < 0.05, "landed at {last:?}");
        assert_eq!(
            detonations,
            vec![Detonation {
                position: to,
                blast_radius: 1.0,
                damage: 5.0,
            }]
        );
    }

    #[test]
    fn explosion_damages_enemies_overlapping_the_blast() {
        let enemies = EnemyView::from_snapshots(vec![
            snapshot(1, 0.5, 1.0),
            snapshot(2, 1.2, 2.0),
            snapshot(3, 1.2, 1.0),
        ]);
        let mut explosion = Explosion::default();
        let mut damage = Vec::new();

        let hits = explosion.initialize(
            &Detonation {
                position: Vec3::ZERO,
                blast_radius: 1.0,
                damage: 7.0,
            },
            &enemies,
            &mut damage,
        );

        assert_eq!(hits, 2);
        let ids: Vec<_> = damage.iter().map(|entry| entry.enemy.get()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn explosion_expires_after_its_duration() {
        let mut explosion = Explosion::default();
        assert_eq!(explosion.game_update(0.3), StepOutcome::Continue);
        assert_eq!(explosion.game_update(0.3), StepOutcome::Remove);
    }

    #[test]
    fn pool_recycles_reclaimed_entities() {
        let mut pool = WarPool::new();
        let shell = pool.spawn_shell();
        let explosion = pool.spawn_explosion();
        assert_eq!(pool.live(), 2);

        pool.reclaim(WarEntity::Shell(shell));
        pool.reclaim(WarEntity::Explosion(explosion));
        assert_eq!(pool.live(), 0);
        let _ = pool.spawn_shell();
        assert_eq!(pool.live(), 1);
    }
}
