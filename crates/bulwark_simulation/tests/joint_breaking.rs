//! Joint breaking integration тесты
//!
//! Реальные placements → StructuralImpact / ContactForceEvent → fixed tick.
//! Rapier pipeline не запущен: нагрузку подаём событиями, FixedUpdate гоняем вручную.

mod common;

use bevy::prelude::*;
use bevy_rapier3d::prelude::ContactForceEvent;
use bulwark_simulation::joints::JointKind;
use bulwark_simulation::structure::Collapsed;
use bulwark_simulation::*;
use common::*;

fn hit(app: &mut App, piece: Entity, force: f32) -> Vec<JointBroken> {
    app.world_mut().send_event(StructuralImpact { piece, force });
    app.world_mut().run_schedule(FixedUpdate);
    app.world()
        .resource::<Events<JointBroken>>()
        .iter_current_update_events()
        .copied()
        .collect()
}

fn is_collapsed(app: &App, piece: Entity) -> bool {
    app.world().get::<Collapsed>(piece).is_some()
}

#[test]
fn test_ground_anchor_breaks_only_above_threshold() {
    let mut app = create_build_app(200);
    let pillar = place(&mut app, PieceKind::VerticalPillar, EYE, Vec3::ZERO);

    assert!(hit(&mut app, pillar.piece, 1_900.0).is_empty());
    assert_eq!(joints_of(&mut app, pillar.piece).len(), 1);
    assert!(!is_collapsed(&app, pillar.piece));

    let broken = hit(&mut app, pillar.piece, 2_100.0);
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].piece, pillar.piece);
    assert_eq!(broken[0].kind, JointKind::GroundAnchor);

    assert!(joints_of(&mut app, pillar.piece).is_empty());
    assert!(is_collapsed(&app, pillar.piece));
    // Piece остаётся в мире и в реестре раунда
    assert_eq!(app.world().resource::<RoundState>().placed_count(), 1);
}

#[test]
fn test_stacked_pillar_breaks_by_torque() {
    let mut app = create_build_app(201);
    let base = place(&mut app, PieceKind::VerticalPillar, EYE, Vec3::ZERO);
    let upper = place(&mut app, PieceKind::VerticalPillar, EYE, Vec3::new(0.0, 3.0, 0.0));

    // 7000 < 10000 по force, но плечо 1.5 → torque 10500
    let broken = hit(&mut app, upper.piece, 7_000.0);

    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].kind, JointKind::Connector);
    assert_eq!(broken[0].piece, upper.piece);
    assert_eq!(broken[0].other, base.piece);

    assert!(is_collapsed(&app, upper.piece));
    // База держится на своём ground anchor
    assert!(!is_collapsed(&app, base.piece));
    assert_eq!(joints_of(&mut app, base.piece).len(), 1);
}

#[test]
fn test_base_survives_losing_anchor_while_upper_joint_holds() {
    let mut app = create_build_app(202);
    let base = place(&mut app, PieceKind::VerticalPillar, EYE, Vec3::ZERO);
    let upper = place(&mut app, PieceKind::VerticalPillar, EYE, Vec3::new(0.0, 3.0, 0.0));

    let broken = hit(&mut app, base.piece, 2_500.0);

    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].kind, JointKind::GroundAnchor);
    // Joint верхней колонны ссылается на базу → база не collapsed
    assert!(!is_collapsed(&app, base.piece));
    assert!(!is_collapsed(&app, upper.piece));
    assert_eq!(joints_of(&mut app, upper.piece).len(), 1);
}

#[test]
fn test_defense_object_joint_uses_defense_threshold() {
    let mut app = create_build_app(203);
    place(&mut app, PieceKind::VerticalPillar, EYE, Vec3::ZERO);
    let crown = place(&mut app, PieceKind::DefenseObject, EYE, Vec3::new(0.0, 3.0, 0.0));
    assert_eq!(crown.attached_via, AttachedVia::Connectors { joints: 1 });

    // Плечо crown = 0.4: torque 1920, force 4800 < 5000
    assert!(hit(&mut app, crown.piece, 4_800.0).is_empty());

    let broken = hit(&mut app, crown.piece, 5_200.0);
    assert_eq!(broken.len(), 1);
    assert!(is_collapsed(&app, crown.piece));
}

#[test]
fn test_contact_force_event_drives_breaking() {
    let mut app = create_build_app(204);
    let pillar = place(&mut app, PieceKind::VerticalPillar, EYE, Vec3::ZERO);
    let projectile = app.world_mut().spawn_empty().id();

    app.world_mut().send_event(ContactForceEvent {
        collider1: projectile,
        collider2: pillar.piece,
        total_force: Vec3::new(0.0, 0.0, -3_000.0),
        total_force_magnitude: 3_000.0,
        max_force_direction: Vec3::NEG_Z,
        max_force_magnitude: 3_000.0,
    });
    app.world_mut().run_schedule(FixedUpdate);

    let broken: Vec<_> = app
        .world()
        .resource::<Events<JointBroken>>()
        .iter_current_update_events()
        .copied()
        .collect();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].piece, pillar.piece);
    assert!(is_collapsed(&app, pillar.piece));
}

#[test]
fn test_stress_does_not_carry_between_ticks() {
    let mut app = create_build_app(205);
    let pillar = place(&mut app, PieceKind::VerticalPillar, EYE, Vec3::ZERO);

    for _ in 0..5 {
        assert!(hit(&mut app, pillar.piece, 1_500.0).is_empty());
    }
    assert!(!is_collapsed(&app, pillar.piece));
}
