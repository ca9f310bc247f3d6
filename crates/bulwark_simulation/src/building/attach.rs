//! Structure Attachment Engine
//!
//! Commit валидной pose ghost'а в реальный physics piece.
//!
//! Порядок commit:
//! 1. Guards: build tool, defense exclusivity, валидность pose, blueprint
//! 2. План joints: для каждого connector нового piece - совпадающий connector
//!    другого body в радиусе attach_radius (один joint на body)
//! 3. Spawn piece (dynamic, CCD), запись в RoundState
//! 4. Occupancy: target connector + все пары из плана; при ground placement -
//!    connector, стоящий на поверхности
//! 5. Joints (connector threshold kind'а) или ground anchor (если snap не было
//!    или совпадающих connectors не нашлось)
//! 6. Ghost сбрасывается - следующий frame строит свежий preview

use bevy::prelude::*;

use crate::building::events::{
    AttachedVia, ConfirmPlacementIntent, PiecePlaced, PlacementRejected, RejectReason,
};
use crate::building::ghost::{BuildTool, GhostState};
use crate::config::GameConfig;
use crate::joints::{spawn_breakable_joint, JointKind};
use crate::logger::{log, log_info};
use crate::physics::{overlap_connectors, ConnectorQuery, ConnectorView};
use crate::round::{PlacedRecord, RoundState};
use crate::structure::{spawn_ground_anchor, spawn_placed_piece, PieceBlueprint, PieceCatalog};

/// Запланированный joint: connector нового piece ↔ connector соседа
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedJoint {
    /// Индекс connector в blueprint нового piece
    pub connector: usize,
    pub target: ConnectorView,
    pub body: Entity,
}

/// Поиск совпадающих connectors других bodies
///
/// Один joint на каждое соседнее body (первый connector в порядке blueprint).
pub fn plan_connector_joints(
    blueprint: &PieceBlueprint,
    pose: &Transform,
    views: &[ConnectorView],
    attach_radius: f32,
) -> Vec<PlannedJoint> {
    let mut planned: Vec<PlannedJoint> = Vec::new();

    for index in 0..blueprint.connectors.len() {
        let world = blueprint.connector_world(pose, index);

        for target in overlap_connectors(world.translation, attach_radius, views) {
            let Some(body) = target.body else {
                continue;
            };
            if planned.iter().any(|joint| joint.body == body) {
                continue;
            }

            planned.push(PlannedJoint {
                connector: index,
                target,
                body,
            });
            break;
        }
    }

    planned
}

/// Система: commit placement
#[allow(clippy::too_many_arguments)]
pub fn confirm_placement(
    mut commands: Commands,
    mut intents: EventReader<ConfirmPlacementIntent>,
    tool: Res<BuildTool>,
    mut ghost: ResMut<GhostState>,
    catalog: Res<PieceCatalog>,
    config: Res<GameConfig>,
    mut round: ResMut<RoundState>,
    mut connectors: ConnectorQuery,
    mut placed_events: EventWriter<PiecePlaced>,
    mut rejected: EventWriter<PlacementRejected>,
) {
    for _ in intents.read() {
        let kind = ghost.selection.kind;
        let reject = |reason| PlacementRejected { kind, reason };

        if !tool.enabled {
            rejected.write(reject(RejectReason::BuildToolDisabled));
            continue;
        }

        // Exclusivity guard: abort без изменения state
        if kind.is_exclusive() && round.defense_object_placed() {
            log("Placement rejected: defense object already placed this round");
            rejected.write(reject(RejectReason::DefenseObjectAlreadyPlaced));
            continue;
        }

        let Some(pose) = ghost.pose.filter(|_| ghost.is_placeable()) else {
            rejected.write(reject(RejectReason::InvalidPose));
            continue;
        };

        let Some(blueprint) = catalog.get(kind, ghost.selection.variant) else {
            rejected.write(reject(RejectReason::UnknownBlueprint));
            continue;
        };

        let snap = ghost.snap;
        let planned: Vec<(PlannedJoint, Transform)> = match snap {
            Some(_) => plan_connector_joints(
                blueprint,
                &pose,
                &connectors.views(),
                config.build.attach_radius,
            )
            .into_iter()
            .filter_map(|joint| Some((joint, connectors.body_transform(joint.body)?)))
            .collect(),
            None => Vec::new(),
        };

        let mut occupied: Vec<usize> = planned.iter().map(|(joint, _)| joint.connector).collect();
        match snap {
            Some(snap) => occupied.push(snap.ghost_connector),
            // Ground placement: грань, стоящая на поверхности, больше не target
            None => occupied.extend(
                ghost
                    .surface_normal
                    .and_then(|normal| blueprint.support_connector(&pose, normal)),
            ),
        }

        let piece = spawn_placed_piece(&mut commands, blueprint, pose, &occupied);

        if let Some(snap) = snap {
            connectors.mark_occupied(snap.target);
        }
        for (joint, _) in &planned {
            connectors.mark_occupied(joint.target.entity);
        }

        let threshold = kind.connector_threshold(&config.build);
        for (joint, body_pose) in &planned {
            let anchor = blueprint.connector_world(&pose, joint.connector).translation;
            spawn_breakable_joint(
                &mut commands,
                piece,
                &pose,
                joint.body,
                body_pose,
                anchor,
                JointKind::Connector,
                threshold,
            );
            log(&format!(
                "Joint {:?} ↔ {:?} via {:?}/{:?} (break {:.0})",
                piece,
                joint.body,
                blueprint.connectors[joint.connector].position,
                joint.target.connector.position,
                threshold.force
            ));
        }

        // Un-snapped placement (или snap на статический connector) → ground anchor
        let (attached_via, anchor) = if !planned.is_empty() {
            (AttachedVia::Connectors { joints: planned.len() }, None)
        } else {
            let anchor = spawn_ground_anchor(&mut commands, piece, pose.translation);
            spawn_breakable_joint(
                &mut commands,
                piece,
                &pose,
                anchor,
                &Transform::from_translation(pose.translation),
                pose.translation,
                JointKind::GroundAnchor,
                kind.ground_threshold(&config.build),
            );
            (AttachedVia::GroundAnchor, Some(anchor))
        };

        round.register(PlacedRecord {
            piece,
            kind,
            anchor,
        });
        ghost.clear_preview(&mut commands);

        log_info(&format!(
            "Placed {:?} '{}' {:?} at {:?} ({:?})",
            kind, blueprint.name, piece, pose.translation, attached_via
        ));
        placed_events.write(PiecePlaced {
            piece,
            kind,
            attached_via,
            pose,
        });
    }
}
