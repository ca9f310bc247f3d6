//! Attack tool - снаряды Attacker фазы
//!
//! Три типа снарядов с разной ценой в патронах:
//! - Fastball: 1 патрон, базовая сила
//! - Scattershot: 1 патрон, N дробин (сила / N, случайный разброс)
//! - Slug: 5 патронов, сила x5 (отказ если патронов меньше)
//!
//! Патроны кончились → settle таймер → запрос перехода в Defender (AmmoExhausted).

use bevy::prelude::*;

use crate::config::AttackConfig;

pub mod systems;

#[cfg(test)]
mod systems_tests;

pub use systems::{process_launch_intents, random_in_unit_sphere, tick_ammo_exhausted};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum ProjectileKind {
    #[default]
    Fastball,
    Scattershot,
    Slug,
}

impl ProjectileKind {
    pub const ALL: [ProjectileKind; 3] = [
        ProjectileKind::Fastball,
        ProjectileKind::Scattershot,
        ProjectileKind::Slug,
    ];

    /// Цена выстрела в патронах
    pub fn cost(self, config: &AttackConfig) -> u32 {
        match self {
            ProjectileKind::Fastball | ProjectileKind::Scattershot => 1,
            ProjectileKind::Slug => config.slug_cost,
        }
    }

    /// Снарядов за выстрел
    pub fn pellets(self, config: &AttackConfig) -> u32 {
        match self {
            ProjectileKind::Scattershot => config.scatter_pellets.max(1),
            ProjectileKind::Fastball | ProjectileKind::Slug => 1,
        }
    }

    /// Сила запуска одного снаряда
    pub fn launch_force(self, config: &AttackConfig) -> f32 {
        match self {
            ProjectileKind::Fastball => config.launch_force,
            ProjectileKind::Scattershot => config.launch_force / self.pellets(config) as f32,
            ProjectileKind::Slug => config.launch_force * 5.0,
        }
    }

    pub fn radius(self) -> f32 {
        match self {
            ProjectileKind::Fastball => 0.25,
            ProjectileKind::Scattershot => 0.1,
            ProjectileKind::Slug => 0.4,
        }
    }

    pub fn mass(self) -> f32 {
        match self {
            ProjectileKind::Fastball => 5.0,
            ProjectileKind::Scattershot => 1.0,
            ProjectileKind::Slug => 25.0,
        }
    }
}

/// Снаряд в полёте
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Projectile {
    pub kind: ProjectileKind,
}

/// Магазин attack tool
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ammo {
    pub current: u32,
    pub max: u32,
}

impl Ammo {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }

    /// Списывает `cost` патронов. false (без изменений) если не хватает.
    pub fn try_consume(&mut self, cost: u32) -> bool {
        if self.current < cost {
            return false;
        }
        self.current -= cost;
        true
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }
}

/// Вкл/выкл attack tool + settle таймер после последнего патрона
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub struct AttackTool {
    pub enabled: bool,
    pub exhausted_timer: Option<f32>,
}

impl AttackTool {
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.exhausted_timer = None;
    }
}

/// Intent: выстрел выбранным типом (от input layer)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchIntent {
    pub kind: ProjectileKind,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectileLaunched {
    pub kind: ProjectileKind,
    pub pellets: u32,
    pub ammo_left: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchRejectReason {
    AttackToolDisabled,
    InsufficientAmmo,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchRejected {
    pub kind: ProjectileKind,
    pub reason: LaunchRejectReason,
}

/// Attack Plugin
///
/// Системы регистрирует SimulationPlugin в `SimulationSet::Attack`.
pub struct AttackPlugin;

impl Plugin for AttackPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AttackTool>()
            .add_event::<LaunchIntent>()
            .add_event::<ProjectileLaunched>()
            .add_event::<LaunchRejected>();
    }
}
