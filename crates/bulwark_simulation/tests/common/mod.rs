//! Общие helpers для integration тестов (headless App + scripted input)

#![allow(dead_code)]

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bulwark_simulation::joints::BreakableJoint;
use bulwark_simulation::structure::spawn_ground;
use bulwark_simulation::*;

pub const EYE: Vec3 = Vec3::new(0.0, 10.0, 5.0);

/// Helper: полный App (SimulationPlugin + земля в y = 0)
pub fn create_build_app(seed: u64) -> App {
    create_build_app_with_config(seed, GameConfig::default())
}

pub fn create_build_app_with_config(seed: u64, config: GameConfig) -> App {
    let mut app = create_headless_app(seed);
    app.insert_resource(config)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)))
        .add_plugins(SimulationPlugin);

    spawn_ground(&mut app.world_mut().commands(), Transform::IDENTITY);
    app.world_mut().flush();
    app.update();
    app
}

pub fn aim(app: &mut App, from: Vec3, at: Vec3) {
    let ray = AimRay::looking_at(from, at).expect("aim origin != target");
    app.insert_resource(ray);
}

pub fn select(app: &mut App, kind: PieceKind) {
    app.world_mut().send_event(SelectPieceIntent::new(kind));
    app.update();
}

/// Confirm в отдельном frame, возвращает PiecePlaced этого frame
pub fn confirm(app: &mut App) -> Option<PiecePlaced> {
    app.world_mut().send_event(ConfirmPlacementIntent);
    app.update();
    placed_events(app).last().copied()
}

/// select → aim → frame ghost'а → confirm
pub fn place(app: &mut App, kind: PieceKind, from: Vec3, at: Vec3) -> PiecePlaced {
    aim(app, from, at);
    select(app, kind);
    confirm(app).unwrap_or_else(|| panic!("{:?} was not placed (rejected: {:?})", kind, rejected_events(app)))
}

pub fn placed_events(app: &App) -> Vec<PiecePlaced> {
    app.world()
        .resource::<Events<PiecePlaced>>()
        .iter_current_update_events()
        .copied()
        .collect()
}

pub fn rejected_events(app: &App) -> Vec<PlacementRejected> {
    app.world()
        .resource::<Events<PlacementRejected>>()
        .iter_current_update_events()
        .copied()
        .collect()
}

pub fn phase_changes(app: &App) -> Vec<PhaseChanged> {
    app.world()
        .resource::<Events<PhaseChanged>>()
        .iter_current_update_events()
        .copied()
        .collect()
}

/// Joints, принадлежащие piece (child entities)
pub fn joints_of(app: &mut App, piece: Entity) -> Vec<(Entity, BreakableJoint)> {
    let world = app.world_mut();
    let mut query = world.query::<(Entity, &BreakableJoint, &ChildOf)>();
    let mut joints: Vec<_> = query
        .iter(world)
        .filter(|(_, _, child_of)| child_of.parent() == piece)
        .map(|(entity, joint, _)| (entity, *joint))
        .collect();
    joints.sort_by_key(|(entity, _)| entity.index());
    joints
}

/// Connector piece с данной гранью: (entity, component, world transform)
pub fn connector_of(app: &mut App, piece: Entity, position: ConnectorPosition) -> (Entity, Connector, Transform) {
    let piece_pose = *app.world().get::<Transform>(piece).expect("piece transform");
    let world = app.world_mut();
    let mut query = world.query::<(Entity, &Connector, &Transform, &ChildOf)>();
    query
        .iter(world)
        .find(|(_, connector, _, child_of)| child_of.parent() == piece && connector.position == position)
        .map(|(entity, connector, local, _)| (entity, *connector, piece_pose.mul_transform(*local)))
        .unwrap_or_else(|| panic!("piece {:?} has no {:?} connector", piece, position))
}

pub fn finish_building(app: &mut App) {
    app.world_mut().send_event(PhaseChangeRequest {
        reason: PhaseChangeReason::FinishedBuilding,
    });
    app.update();
}

pub fn assert_vec_close(actual: Vec3, expected: Vec3) {
    assert!(
        (actual - expected).length() < 1e-3,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

pub fn assert_transforms_match(a: &Transform, b: &Transform) {
    assert_vec_close(a.translation, b.translation);
    assert!(
        a.rotation.angle_between(b.rotation) < 1e-3,
        "rotation {:?} != {:?}",
        a.rotation,
        b.rotation
    );
}
