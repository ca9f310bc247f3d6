//! Breakable joints между pieces
//!
//! Каждый joint - child entity piece с `ImpulseJoint` (rapier находит body по parent).
//! Нагрузка приходит через `StructuralImpact` (из rapier contact forces или от gameplay),
//! копится в `JointStress` за fixed tick и сравнивается с `BreakThreshold`.
//!
//! Порядок в FixedUpdate:
//! 1. bridge_contact_forces - ContactForceEvent → StructuralImpact
//! 2. accumulate_joint_stress - impacts → JointStress (force + torque по lever arm)
//! 3. break_overloaded_joints - despawn, JointBroken, Collapsed

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::config::BreakThreshold;

pub mod systems;


pub use systems::{accumulate_joint_stress, break_overloaded_joints, bridge_contact_forces};

/// С чем соединён piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum JointKind {
    /// Connector ↔ connector другого piece
    Connector,
    /// Synthetic ground anchor
    GroundAnchor,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct BreakableJoint {
    pub threshold: BreakThreshold,
    /// Второе тело joint'а (piece или ground anchor)
    pub other: Entity,
    pub kind: JointKind,
    /// Расстояние от центра piece до точки крепления
    pub lever_arm: f32,
}

/// Нагрузка за текущий fixed tick (обнуляется после проверки)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct JointStress {
    pub force: f32,
    pub torque: f32,
}

/// Удар/нагрузка на piece
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct StructuralImpact {
    pub piece: Entity,
    pub force: f32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct JointBroken {
    pub joint: Entity,
    pub piece: Entity,
    pub other: Entity,
    pub kind: JointKind,
}

/// Fixed joint piece ↔ other в текущих позах
///
/// `anchor` - world точка крепления. Joint замораживает текущую
/// относительную ориентацию тел.
pub fn spawn_breakable_joint(
    commands: &mut Commands,
    piece: Entity,
    piece_pose: &Transform,
    other: Entity,
    other_pose: &Transform,
    anchor: Vec3,
    kind: JointKind,
    threshold: BreakThreshold,
) -> Entity {
    let local_anchor1 = other_pose.rotation.inverse() * (anchor - other_pose.translation);
    let local_anchor2 = piece_pose.rotation.inverse() * (anchor - piece_pose.translation);
    let local_basis1 = other_pose.rotation.inverse() * piece_pose.rotation;

    let joint = FixedJointBuilder::new()
        .local_anchor1(local_anchor1)
        .local_basis1(local_basis1)
        .local_anchor2(local_anchor2);

    commands
        .spawn((
            BreakableJoint {
                threshold,
                other,
                kind,
                lever_arm: local_anchor2.length(),
            },
            JointStress::default(),
            ImpulseJoint::new(other, joint),
            ChildOf(piece),
        ))
        .id()
}

/// Joint Plugin
///
/// Регистрирует joint системы в FixedUpdate (physics tick).
pub struct JointPlugin;

impl Plugin for JointPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<StructuralImpact>()
            .add_event::<JointBroken>()
            // Обычно регистрирует RapierPhysicsPlugin, но headless app без него тоже работает
            .add_event::<ContactForceEvent>();

        app.add_systems(
            FixedUpdate,
            (
                bridge_contact_forces,
                accumulate_joint_stress,
                break_overloaded_joints,
            )
                .chain(),
        );
    }
}
