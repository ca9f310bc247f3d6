//! Building events
//!
//! **Intents (вход, от input layer):**
//! - `SelectPieceIntent` - выбрать kind + variant (hotkeys 1-3)
//! - `ConfirmPlacementIntent` - поставить piece в текущую pose ghost'а
//!
//! **Результаты (выход, для UI / phase controller):**
//! - `PiecePlaced` - piece создан и прикреплён
//! - `PlacementRejected` - confirm отклонён (state не изменён)

use bevy::prelude::*;

use crate::structure::PieceKind;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectPieceIntent {
    pub kind: PieceKind,
    /// Индекс варианта в PieceCatalog (обычно 0)
    pub variant: usize,
}

impl SelectPieceIntent {
    pub fn new(kind: PieceKind) -> Self {
        Self { kind, variant: 0 }
    }
}

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ConfirmPlacementIntent;

/// Как piece прикреплён к миру
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachedVia {
    /// Joints к соседним pieces через connectors
    Connectors { joints: usize },
    /// Synthetic ground anchor
    GroundAnchor,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PiecePlaced {
    pub piece: Entity,
    pub kind: PieceKind,
    pub attached_via: AttachedVia,
    pub pose: Transform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    BuildToolDisabled,
    /// Нет ghost'а или pose невалидна (raycast miss)
    InvalidPose,
    DefenseObjectAlreadyPlaced,
    UnknownBlueprint,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementRejected {
    pub kind: PieceKind,
    pub reason: RejectReason,
}
