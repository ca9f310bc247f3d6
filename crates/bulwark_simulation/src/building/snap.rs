//! Connector Snap Resolver
//!
//! Вход: hit point raycast'а, blueprint ghost'а, его текущая pose, connectors мира.
//! Выход: выбранная пара (target connector, ghost connector) + pose, при которой
//! ghost connector совпадает с target по позиции и ориентации. Или None (no-snap).
//!
//! Правила выбора пары - `SnapRule` kind'а:
//! - Opposite (vertical pillar, defense object): ближайший свободный target;
//!   если его up почти горизонтален (|up.y| < 0.5) → ghost front, иначе ghost opposite(target)
//! - SideMount (horizontal pillar): ближайший свободный боковой target;
//!   ghost connector типа Horizontal, прошедший `is_valid_horizontal_attachment`

use bevy::prelude::*;

use crate::physics::{overlap_connectors, ConnectorView};
use crate::structure::{
    is_valid_horizontal_attachment, ConnectorKind, ConnectorPosition, PieceBlueprint, SnapRule,
};

/// |up.y| ниже порога → target грань принадлежит лежащему piece
pub const HORIZONTAL_FACE_THRESHOLD: f32 = 0.5;

/// Результат успешного snap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResolution {
    pub target: Entity,
    /// Rigid body владельца target (None для статических connectors уровня)
    pub target_body: Option<Entity>,
    pub target_position: ConnectorPosition,
    /// Индекс connector в blueprint ghost'а
    pub ghost_connector: usize,
    /// Итоговая pose ghost'а
    pub pose: Transform,
}

/// Выбор пары (target, ghost connector index)
///
/// `candidates` должны быть отсортированы по расстоянию (см. `overlap_connectors`).
/// Occupied connectors никогда не становятся target.
pub fn select_connector_pair(
    blueprint: &PieceBlueprint,
    candidates: &[ConnectorView],
) -> Option<(ConnectorView, usize)> {
    match blueprint.kind.snap_rule() {
        SnapRule::Opposite => {
            let target = candidates.iter().find(|view| view.connector.is_free())?;

            let up = target.world.rotation * Vec3::Y;
            let desired = if up.y.abs() < HORIZONTAL_FACE_THRESHOLD {
                // Крепление на лежащий piece - фиксированная конвенция
                ConnectorPosition::Front
            } else {
                target.connector.position.opposite()
            };

            let ghost = blueprint.connector_index(desired)?;
            Some((*target, ghost))
        }
        SnapRule::SideMount => {
            let target = candidates
                .iter()
                .find(|view| view.connector.is_free() && view.connector.position.is_side())?;

            let ghost = blueprint.connectors.iter().position(|spec| {
                spec.kind == ConnectorKind::Horizontal
                    && is_valid_horizontal_attachment(spec.position, target.connector.position)
            })?;
            Some((*target, ghost))
        }
    }
}

/// Rigid transform: ghost connector → target connector
///
/// 1. Поворот всего ghost на delta = target.rot * ghost_connector.rot⁻¹
/// 2. Пересчёт world позиции connector ПОСЛЕ поворота
/// 3. Сдвиг на (target.pos - rotated_connector.pos)
pub fn align_to_connector(pose: Transform, ghost_local: &Transform, target: &Transform) -> Transform {
    let ghost_world = pose.mul_transform(*ghost_local);
    let delta = target.rotation * ghost_world.rotation.inverse();

    let mut aligned = pose;
    aligned.rotation = (delta * pose.rotation).normalize();

    let rotated = aligned.mul_transform(*ghost_local);
    aligned.translation += target.translation - rotated.translation;
    aligned
}

/// Полный snap: overlap вокруг hit point → выбор пары → alignment
pub fn resolve_snap(
    blueprint: &PieceBlueprint,
    pose: Transform,
    hit_point: Vec3,
    radius: f32,
    connectors: &[ConnectorView],
) -> Option<SnapResolution> {
    let candidates = overlap_connectors(hit_point, radius, connectors);
    let (target, ghost_connector) = select_connector_pair(blueprint, &candidates)?;

    let local = blueprint.connectors[ghost_connector].local;
    let aligned = align_to_connector(pose, &local, &target.world);

    Some(SnapResolution {
        target: target.entity,
        target_body: target.body,
        target_position: target.connector.position,
        ghost_connector,
        pose: aligned,
    })
}
