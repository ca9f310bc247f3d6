//! Structure domain - pieces, connectors, их физическое представление
//!
//! Lifecycle piece:
//! ghost (kinematic, без коллизий) → placed (dynamic body + joints) →
//! despawn (phase reset) | Collapsed (все joints разорваны)

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

pub mod connector;
pub mod piece;

#[cfg(test)]
mod piece_tests;

pub use connector::{is_valid_horizontal_attachment, Connector, ConnectorKind, ConnectorPosition};
pub use piece::{
    defense_object_blueprint, horizontal_pillar_blueprint, vertical_pillar_blueprint, ConnectorSpec,
    PieceBlueprint, PieceCatalog, PieceKind, SnapRule,
};

use crate::logger::log;
use crate::physics::layers;
use crate::physics::RaycastSolid;

/// Размещённый (реальный) элемент конструкции
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct PlacedPiece {
    pub kind: PieceKind,
    pub blueprint: String,
}

/// Synthetic неподвижное тело для un-snapped placement
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct GroundAnchor {
    /// Piece, ради которого создан anchor
    pub piece: Entity,
}

/// Piece потерял все joints - свободное dynamic тело
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Collapsed;

/// Spawn реального piece: dynamic body + collider + connector children
///
/// `occupied` - индексы connectors blueprint'а, которые сразу заняты
/// (например тот, через который piece прикреплён).
pub fn spawn_placed_piece(
    commands: &mut Commands,
    blueprint: &PieceBlueprint,
    pose: Transform,
    occupied: &[usize],
) -> Entity {
    let h = blueprint.half_extents;
    let groups = match blueprint.kind {
        PieceKind::DefenseObject => layers::defense_groups(),
        PieceKind::VerticalPillar | PieceKind::HorizontalPillar => layers::structure_groups(),
    };
    log(&format!(
        "Spawn '{}' on layer {}",
        blueprint.name,
        layers::get_layer_name(groups.memberships)
    ));

    let piece = commands
        .spawn((
            PlacedPiece {
                kind: blueprint.kind,
                blueprint: blueprint.name.clone(),
            },
            pose,
            RaycastSolid::Cuboid { half_extents: h },
            // Rapier: полная физика (gravity, коллизии, CCD против быстрых снарядов)
            RigidBody::Dynamic,
            Collider::cuboid(h.x, h.y, h.z),
            AdditionalMassProperties::Mass(blueprint.mass),
            Ccd::enabled(),
            groups,
            ActiveEvents::CONTACT_FORCE_EVENTS,
        ))
        .id();

    commands.entity(piece).with_children(|parent| {
        for (index, spec) in blueprint.connectors.iter().enumerate() {
            let mut connector = spec.to_component();
            connector.occupied = occupied.contains(&index);
            parent.spawn((
                connector,
                spec.local,
                Collider::ball(0.05),
                Sensor,
                layers::connector_groups(),
            ));
        }
    });

    piece
}

/// Spawn ground anchor (fixed body) в точке
pub fn spawn_ground_anchor(commands: &mut Commands, piece: Entity, position: Vec3) -> Entity {
    commands
        .spawn((
            GroundAnchor { piece },
            Transform::from_translation(position),
            RigidBody::Fixed,
        ))
        .id()
}

/// Spawn статической земли (raycast + rapier collider)
pub fn spawn_ground(commands: &mut Commands, transform: Transform) -> Entity {
    commands
        .spawn((
            transform,
            RaycastSolid::HalfSpace,
            RigidBody::Fixed,
            Collider::halfspace(Vec3::Y).unwrap_or_else(|| Collider::cuboid(500.0, 0.01, 500.0)),
            CollisionGroups::new(layers::LAYER_ENVIRONMENT, Group::ALL),
        ))
        .id()
}
