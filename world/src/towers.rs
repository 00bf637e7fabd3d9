//! Tower state owned by tower tiles.

use tile_defence_core::{AttackConfig, EnemyId, TowerConfig, TowerKind, GRAVITY};

/// Horizontal slack added to the range when deriving a mortar's launch speed.
///
/// Covers the hit radius of the largest enemy so a target accepted by
/// acquisition or tracking is always within ballistic reach.
pub const LAUNCH_RANGE_SLACK: f32 = 0.250_01;

/// Stationary defender stored inside a tower tile's content slot.
#[derive(Clone, Debug, PartialEq)]
pub struct Tower {
    kind: TowerKind,
    range: f32,
    mount_height: f32,
    target: Option<EnemyId>,
    attack: AttackState,
}

/// Modality-specific attack state of a tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttackState {
    /// Continuous beam.
    Beam {
        /// Damage dealt per second of contact.
        damage_per_second: f32,
    },
    /// Ballistic launcher.
    Ballistic {
        /// Launch cadence.
        shots_per_second: f32,
        /// Radius of the blast around the impact point.
        blast_radius: f32,
        /// Damage dealt to every enemy caught in the blast.
        shell_damage: f32,
        /// Accumulated fraction of the next shot; a shot is due at `1.0`.
        launch_progress: f32,
        /// Fixed launch speed derived from range and mount height.
        launch_speed: f32,
    },
}

impl Tower {
    /// Creates a tower of the provided kind from its tuning.
    #[must_use]
    pub fn new(kind: TowerKind, config: &TowerConfig) -> Self {
        let attack = match config.attack {
            AttackConfig::Beam { damage_per_second } => AttackState::Beam { damage_per_second },
            AttackConfig::Ballistic {
                shots_per_second,
                blast_radius,
                shell_damage,
            } => AttackState::Ballistic {
                shots_per_second,
                blast_radius,
                shell_damage,
                launch_progress: 0.0,
                launch_speed: launch_speed_for(config.range, config.mount_height),
            },
        };
        Self {
            kind,
            range: config.range,
            mount_height: config.mount_height,
            target: None,
            attack,
        }
    }

    /// Kind of tower.
    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Targeting range measured in tiles.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.range
    }

    /// Height of the turret or launcher above the board plane.
    #[must_use]
    pub const fn mount_height(&self) -> f32 {
        self.mount_height
    }

    /// Changes the targeting range and re-derives the launch speed.
    pub fn set_range(&mut self, range: f32) {
        self.range = range;
        self.refresh_launch_speed();
    }

    /// Changes the mount height and re-derives the launch speed.
    pub fn set_mount_height(&mut self, mount_height: f32) {
        self.mount_height = mount_height;
        self.refresh_launch_speed();
    }

    /// Enemy currently tracked by the tower.
    ///
    /// The identifier is a weak reference: the enemy may already be gone.
    #[must_use]
    pub const fn target(&self) -> Option<EnemyId> {
        self.target
    }

    /// Replaces the tracked enemy.
    pub fn set_target(&mut self, target: Option<EnemyId>) {
        self.target = target;
    }

    /// Modality-specific attack state.
    #[must_use]
    pub const fn attack(&self) -> &AttackState {
        &self.attack
    }

    /// Mutable modality-specific attack state.
    pub fn attack_mut(&mut self) -> &mut AttackState {
        &mut self.attack
    }

    fn refresh_launch_speed(&mut self) {
        let speed = launch_speed_for(self.range, self.mount_height);
        if let AttackState::Ballistic { launch_speed, .. } = &mut self.attack {
            *launch_speed = speed;
        }
    }
}

/// Smallest launch speed whose maximum ballistic reach covers `range`.
///
/// The launcher sits `mount_height` above the board and always aims at ground
/// level.
#[must_use]
pub fn launch_speed_for(range: f32, mount_height: f32) -> f32 {
    let x = range + LAUNCH_RANGE_SLACK;
    let y = -mount_height;
    (GRAVITY * (y + (x * x + y * y).sqrt())).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beam_tower_preserves_configuration() {
        let tower = Tower::new(TowerKind::Laser, &TowerKind::Laser.default_config());
        assert_eq!(tower.kind(), TowerKind::Laser);
        assert!(tower.target().is_none());
        assert!(matches!(tower.attack(), AttackState::Beam { .. }));
    }

    #[test]
    fn launch_speed_tracks_range_changes() {
        let mut tower = Tower::new(TowerKind::Mortar, &TowerKind::Mortar.default_config());
        let AttackState::Ballistic { launch_speed, .. } = *tower.attack() else {
            panic!("mortar must be ballistic");
        };
        assert!((launch_speed - launch_speed_for(3.5, 1.0)).abs() < 1e-6);

        tower.set_range(5.0);
        let AttackState::Ballistic { launch_speed, .. } = *tower.attack() else {
            panic!("mortar must be ballistic");
        };
        assert!((launch_speed - launch_speed_for(5.0, 1.0)).abs() < 1e-6);
        assert!(launch_speed > launch_speed_for(3.5, 1.0));
    }

    #[test]
    fn launch_speed_reaches_exactly_the_padded_range() {
        let range = 3.0;
        let height = 1.5;
        let speed = launch_speed_for(range, height);
        let x = range + LAUNCH_RANGE_SLACK;
        let y = -height;
        let s2 = speed * speed;
        let discriminant = s2 * s2 - GRAVITY * (GRAVITY * x * x + 2.0 * y * s2);
        assert!(discriminant.abs() < 1e-2, "discriminant was {discriminant}");
    }
}
