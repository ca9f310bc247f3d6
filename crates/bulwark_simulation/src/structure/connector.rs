//! Connector - типизированная точка крепления на structural piece
//!
//! Connector живёт как child entity у piece (local Transform = позиция/ориентация
//! на модели). Никогда не переживает своего parent: despawn piece → despawn connectors.
//!
//! Два статических отношения:
//! - `ConnectorPosition::opposite` - инволюция (left↔right, top↔bottom, front↔back)
//! - `is_valid_horizontal_attachment` - асимметричная таблица для horizontal pieces

use bevy::prelude::*;
use serde::Deserialize;

/// Семантическая грань крепления (label, не координата)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorPosition {
    Left,
    Right,
    Top,
    Bottom,
    Front,
    Back,
}

impl ConnectorPosition {
    pub const ALL: [ConnectorPosition; 6] = [
        ConnectorPosition::Left,
        ConnectorPosition::Right,
        ConnectorPosition::Top,
        ConnectorPosition::Bottom,
        ConnectorPosition::Front,
        ConnectorPosition::Back,
    ];

    /// Противоположная грань
    ///
    /// Закрытый enum из 6 значений → match тотальный, fallback "вернуть как есть"
    /// не нужен.
    pub fn opposite(self) -> Self {
        match self {
            ConnectorPosition::Left => ConnectorPosition::Right,
            ConnectorPosition::Right => ConnectorPosition::Left,
            ConnectorPosition::Top => ConnectorPosition::Bottom,
            ConnectorPosition::Bottom => ConnectorPosition::Top,
            ConnectorPosition::Front => ConnectorPosition::Back,
            ConnectorPosition::Back => ConnectorPosition::Front,
        }
    }

    /// Боковая грань (left/right/front/back)
    ///
    /// Только боковые грани принимают horizontal pieces.
    pub fn is_side(self) -> bool {
        matches!(
            self,
            ConnectorPosition::Left
                | ConnectorPosition::Right
                | ConnectorPosition::Front
                | ConnectorPosition::Back
        )
    }
}

/// Тип connector - определяет какое правило совместимости применяется
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    #[default]
    Vertical,
    Horizontal,
    DefenseObject,
}

/// Может ли ghost connector `ghost` horizontal piece встать на target грань `target`
///
/// Таблица (НЕ симметрична с `opposite`):
/// - target left/right → ghost только top
/// - target front/back → ghost только bottom
/// - target top/bottom → никогда
pub fn is_valid_horizontal_attachment(ghost: ConnectorPosition, target: ConnectorPosition) -> bool {
    match target {
        ConnectorPosition::Left | ConnectorPosition::Right => ghost == ConnectorPosition::Top,
        ConnectorPosition::Front | ConnectorPosition::Back => ghost == ConnectorPosition::Bottom,
        ConnectorPosition::Top | ConnectorPosition::Bottom => false,
    }
}

/// Connector компонент
///
/// Единственное mutable состояние - `occupied`. Occupied connector больше
/// никогда не выбирается как snap target (сбрасывается только RoundState reset).
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Connector {
    pub position: ConnectorPosition,
    pub kind: ConnectorKind,
    pub occupied: bool,
}

impl Connector {
    pub fn new(position: ConnectorPosition, kind: ConnectorKind) -> Self {
        Self {
            position,
            kind,
            occupied: false,
        }
    }

    pub fn is_free(&self) -> bool {
        !self.occupied
    }
}
