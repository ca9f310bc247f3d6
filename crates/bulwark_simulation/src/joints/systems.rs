//! Joint stress / breaking systems (FixedUpdate)

use bevy::prelude::*;
use bevy_rapier3d::prelude::ContactForceEvent;
use std::collections::HashSet;

use super::{BreakableJoint, JointBroken, JointKind, JointStress, StructuralImpact};
use crate::logger::{log, log_info};
use crate::structure::{Collapsed, PlacedPiece};

/// Система: rapier contact forces → StructuralImpact
///
/// Pieces спавнятся с `ActiveEvents::CONTACT_FORCE_EVENTS`, collider лежит на самом piece.
pub fn bridge_contact_forces(
    mut contacts: EventReader<ContactForceEvent>,
    pieces: Query<(), With<PlacedPiece>>,
    mut impacts: EventWriter<StructuralImpact>,
) {
    for contact in contacts.read() {
        for collider in [contact.collider1, contact.collider2] {
            if pieces.contains(collider) {
                impacts.write(StructuralImpact {
                    piece: collider,
                    force: contact.total_force_magnitude,
                });
            }
        }
    }
}

/// Система: impacts → JointStress
///
/// Impact нагружает все joints piece: собственные (child) и те, где piece - второе тело.
pub fn accumulate_joint_stress(
    mut impacts: EventReader<StructuralImpact>,
    mut joints: Query<(&BreakableJoint, &mut JointStress, &ChildOf)>,
) {
    for impact in impacts.read() {
        if impact.force <= 0.0 {
            continue;
        }

        for (joint, mut stress, child_of) in joints.iter_mut() {
            if child_of.parent() != impact.piece && joint.other != impact.piece {
                continue;
            }
            stress.force += impact.force;
            stress.torque += impact.force * joint.lever_arm;
        }
    }
}

/// Система: разрыв перегруженных joints
///
/// Превышение force ИЛИ torque → despawn joint + JointBroken.
/// Piece без оставшихся joints получает `Collapsed` (дальше - свободное dynamic тело).
pub fn break_overloaded_joints(
    mut commands: Commands,
    mut joints: Query<(Entity, &BreakableJoint, &mut JointStress, &ChildOf)>,
    pieces: Query<(), (With<PlacedPiece>, Without<Collapsed>)>,
    mut broken_events: EventWriter<JointBroken>,
) {
    let mut broken = HashSet::new();
    let mut affected = Vec::new();

    for (entity, joint, mut stress, child_of) in joints.iter_mut() {
        let overloaded = stress.force > joint.threshold.force || stress.torque > joint.threshold.torque;

        if overloaded {
            let piece = child_of.parent();
            log_info(&format!(
                "Joint {:?} broke ({:?}): force {:.0}/{:.0}, torque {:.0}/{:.0}",
                entity, joint.kind, stress.force, joint.threshold.force, stress.torque, joint.threshold.torque
            ));

            commands.entity(entity).despawn();
            broken.insert(entity);
            affected.push(piece);
            if joint.kind == JointKind::Connector {
                affected.push(joint.other);
            }

            broken_events.write(JointBroken {
                joint: entity,
                piece,
                other: joint.other,
                kind: joint.kind,
            });
        }

        *stress = JointStress::default();
    }

    let mut collapsed = HashSet::new();
    for piece in affected {
        if !pieces.contains(piece) || collapsed.contains(&piece) {
            continue;
        }

        let still_attached = joints.iter().any(|(entity, joint, _, child_of)| {
            !broken.contains(&entity) && (child_of.parent() == piece || joint.other == piece)
        });
        if !still_attached {
            collapsed.insert(piece);
            log(&format!("Piece {:?} collapsed (no joints left)", piece));
            commands.entity(piece).insert(Collapsed);
        }
    }
}
