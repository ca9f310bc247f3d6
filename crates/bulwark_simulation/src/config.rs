//! Game configuration (data-driven, RON)
//!
//! Все поля имеют defaults - RON файл может переопределить только нужное:
//! ```ignore
//! (
//!     build: (snap_radius: 4.0),
//!     round: (defender_phase_duration: 90.0),
//! )
//! ```

use std::path::Path;

use anyhow::Context;
use bevy::prelude::*;
use serde::Deserialize;

/// Пороги разрыва joint (Newtons / Newton-meters)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Reflect)]
pub struct BreakThreshold {
    pub force: f32,
    pub torque: f32,
}

impl BreakThreshold {
    pub const fn uniform(value: f32) -> Self {
        Self {
            force: value,
            torque: value,
        }
    }
}

/// Параметры строительства (ghost, snap, attachment)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Радиус поиска connector вокруг raycast hit point
    pub snap_radius: f32,
    /// Радиус поиска совпадающих connectors при создании joints
    pub attach_radius: f32,
    /// Максимальная длина raycast из viewport center
    pub max_ray_distance: f32,
    /// Joint через connector: pillars
    pub pillar_connector_joint: BreakThreshold,
    /// Joint через connector: defense object (более хрупкий)
    pub defense_connector_joint: BreakThreshold,
    /// Ground anchor: pillars
    pub pillar_ground_anchor: BreakThreshold,
    /// Ground anchor: defense object
    pub defense_ground_anchor: BreakThreshold,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            snap_radius: 5.0,
            attach_radius: 0.1,
            max_ray_distance: 200.0,
            pillar_connector_joint: BreakThreshold::uniform(10_000.0),
            defense_connector_joint: BreakThreshold::uniform(5_000.0),
            pillar_ground_anchor: BreakThreshold::uniform(2_000.0),
            defense_ground_anchor: BreakThreshold::uniform(1_000.0),
        }
    }
}

/// Длительности фаз (секунды)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    pub defender_phase_duration: f32,
    pub attacker_phase_duration: f32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            defender_phase_duration: 120.0,
            attacker_phase_duration: 60.0,
        }
    }
}

/// Параметры attack tool
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    pub max_ammo: u32,
    /// Базовая сила запуска (Fastball)
    pub launch_force: f32,
    /// Пауза после последнего выстрела, чтобы конструкция "успокоилась"
    pub ammo_exhausted_delay: f32,
    /// Спавн снаряда на этом расстоянии вдоль aim direction
    pub spawn_distance: f32,
    pub scatter_pellets: u32,
    pub scatter_spread: f32,
    /// Slug стоит столько патронов
    pub slug_cost: u32,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            max_ammo: 10,
            launch_force: 10_000.0,
            ammo_exhausted_delay: 5.0,
            spawn_distance: 2.0,
            scatter_pellets: 5,
            scatter_spread: 0.2,
            slug_cost: 5,
        }
    }
}

/// Корневой config resource
#[derive(Resource, Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub build: BuildConfig,
    pub round: RoundConfig,
    pub attack: AttackConfig,
}

impl GameConfig {
    /// Парсит RON текст (отсутствующие поля → defaults)
    pub fn from_ron(source: &str) -> anyhow::Result<Self> {
        ron::from_str(source).context("failed to parse game config (RON)")
    }

    /// Загружает config с диска
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read game config {}", path.display()))?;
        Self::from_ron(&source).with_context(|| format!("invalid game config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();

        assert_eq!(config.build.snap_radius, 5.0);
        assert_eq!(config.build.attach_radius, 0.1);
        assert_eq!(config.build.pillar_ground_anchor, BreakThreshold::uniform(2_000.0));
        assert!(config.build.defense_connector_joint.force < config.build.pillar_connector_joint.force);
        assert_eq!(config.attack.max_ammo, 10);
    }

    #[test]
    fn test_partial_ron_falls_back_to_defaults() {
        let config = GameConfig::from_ron(
            "(build: (snap_radius: 3.5), round: (attacker_phase_duration: 30.0))",
        )
        .expect("valid RON");

        assert_eq!(config.build.snap_radius, 3.5);
        assert_eq!(config.build.attach_radius, 0.1);
        assert_eq!(config.round.attacker_phase_duration, 30.0);
        assert_eq!(config.round.defender_phase_duration, 120.0);
        assert_eq!(config.attack, AttackConfig::default());
    }

    #[test]
    fn test_threshold_override() {
        let config = GameConfig::from_ron(
            "(build: (defense_ground_anchor: (force: 1500.0, torque: 750.0)))",
        )
        .expect("valid RON");

        assert_eq!(config.build.defense_ground_anchor.force, 1500.0);
        assert_eq!(config.build.defense_ground_anchor.torque, 750.0);
    }

    #[test]
    fn test_invalid_ron_is_error() {
        assert!(GameConfig::from_ron("(build: (snap_radius: \"far\"))").is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = GameConfig::load("/definitely/not/here.ron").unwrap_err();
        assert!(format!("{:#}", err).contains("failed to read game config"));
    }
}
