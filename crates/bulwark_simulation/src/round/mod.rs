//! Round / phase controller
//!
//! Две фазы: Defender (строит, build tool) и Attacker (стреляет, attack tool).
//! Игра стартует в Defender.
//!
//! `RoundState` - единственный владелец per-round состояния:
//! реестр placed pieces + флаг defense object. Attachment engine только
//! добавляет записи, очищает реестр только phase controller (переход в Defender).
//!
//! Переходы идут через `PhaseChangeRequest` → `process_phase_requests` → `PhaseChanged`.

use bevy::prelude::*;

use crate::structure::PieceKind;

pub mod systems;

pub use systems::{check_kill_zone, process_phase_requests, tick_phase_timer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum Phase {
    #[default]
    Defender,
    Attacker,
}

/// Запись реестра placed pieces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedRecord {
    pub piece: Entity,
    pub kind: PieceKind,
    /// Synthetic ground anchor (только для un-snapped placement)
    pub anchor: Option<Entity>,
}

/// Per-round состояние
#[derive(Resource, Debug, Default)]
pub struct RoundState {
    placed: Vec<PlacedRecord>,
    defense_object_placed: bool,
}

impl RoundState {
    pub fn register(&mut self, record: PlacedRecord) {
        if record.kind.is_exclusive() {
            self.defense_object_placed = true;
        }
        self.placed.push(record);
    }

    pub fn placed(&self) -> &[PlacedRecord] {
        &self.placed
    }

    pub fn placed_count(&self) -> usize {
        self.placed.len()
    }

    pub fn defense_object_placed(&self) -> bool {
        self.defense_object_placed
    }

    /// Очистка реестра. Возвращает записи - entities despawn'ит вызывающий.
    pub fn reset(&mut self) -> Vec<PlacedRecord> {
        self.defense_object_placed = false;
        std::mem::take(&mut self.placed)
    }
}

/// Текущая фаза + оставшееся время
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PhaseController {
    pub phase: Phase,
    /// Секунды до TimerExpired
    pub remaining: f32,
}

impl PhaseController {
    pub fn new(phase: Phase, duration: f32) -> Self {
        Self {
            phase,
            remaining: duration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum PhaseChangeReason {
    /// Defender закончил строить (требует placed defense object)
    FinishedBuilding,
    TimerExpired,
    AmmoExhausted,
    DefenseObjectFell,
}

impl PhaseChangeReason {
    /// Целевая фаза перехода
    pub fn target(self) -> Phase {
        match self {
            PhaseChangeReason::FinishedBuilding => Phase::Attacker,
            PhaseChangeReason::TimerExpired
            | PhaseChangeReason::AmmoExhausted
            | PhaseChangeReason::DefenseObjectFell => Phase::Defender,
        }
    }

    /// Допустим ли переход из текущей фазы
    pub fn allowed_from(self, phase: Phase) -> bool {
        match self {
            PhaseChangeReason::FinishedBuilding => phase == Phase::Defender,
            // Таймер любой фазы возвращает в Defender (в том числе сам Defender - новый раунд)
            PhaseChangeReason::TimerExpired => true,
            PhaseChangeReason::AmmoExhausted | PhaseChangeReason::DefenseObjectFell => {
                phase == Phase::Attacker
            }
        }
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChangeRequest {
    pub reason: PhaseChangeReason,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChanged {
    pub from: Phase,
    pub to: Phase,
    pub reason: PhaseChangeReason,
}

/// Defense object попал в kill zone
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefenseObjectFell {
    pub piece: Entity,
}

/// Axis-aligned trigger volume (центр = Transform.translation)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct KillZone {
    pub half_extents: Vec3,
}

impl KillZone {
    pub fn contains(&self, center: Vec3, point: Vec3) -> bool {
        let local = (point - center).abs();
        local.cmple(self.half_extents).all()
    }
}

/// Round Plugin
///
/// Системы регистрирует SimulationPlugin в `SimulationSet::Round`
/// (после build и attack - переход фазы никогда не разрывает placement).
pub struct RoundPlugin;

impl Plugin for RoundPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RoundState>()
            .add_event::<PhaseChangeRequest>()
            .add_event::<PhaseChanged>()
            .add_event::<DefenseObjectFell>();
    }
}
