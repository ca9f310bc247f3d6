//! Headless симуляция Bulwark
//!
//! Скриптованный раунд без рендера и без rapier pipeline:
//! Defender строит колонну + балку + defense object, Attacker расстреливает магазин,
//! попадания эмулируются через StructuralImpact.
//!
//! Опционально: путь к RON config первым аргументом.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bulwark_simulation::structure::spawn_ground;
use bulwark_simulation::{
    create_headless_app, log_error, log_info, AimRay, Ammo, ConfirmPlacementIntent, GameConfig,
    JointBroken, KillZone, LaunchIntent, PhaseChangeReason, PhaseChangeRequest, PhaseController,
    PieceKind, PiecePlaced, PlacedPiece, ProjectileKind, RoundState, SelectPieceIntent,
    SimulationPlugin, StructuralImpact,
};

/// Один confirm: выбрать kind, прицелиться, поставить
fn place(app: &mut App, kind: PieceKind, from: Vec3, at: Vec3) -> Option<Entity> {
    let aim = AimRay::looking_at(from, at)?;
    app.insert_resource(aim);
    app.world_mut().send_event(SelectPieceIntent::new(kind));
    app.update();

    app.world_mut().send_event(ConfirmPlacementIntent);
    app.update();

    let events = app.world().resource::<Events<PiecePlaced>>();
    events
        .iter_current_update_events()
        .last()
        .map(|placed| placed.piece)
}

fn main() {
    let seed = 42;
    println!("Starting Bulwark headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);

    if let Some(path) = std::env::args().nth(1) {
        match GameConfig::load(&path) {
            Ok(config) => {
                app.insert_resource(config);
            }
            Err(err) => log_error(&format!("{:#}, using defaults", err)),
        }
    }

    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)))
        .add_plugins(SimulationPlugin);

    {
        let mut commands = app.world_mut().commands();
        spawn_ground(&mut commands, Transform::IDENTITY);
        commands.spawn((
            Transform::from_xyz(0.0, -5.0, 0.0),
            KillZone {
                half_extents: Vec3::new(100.0, 4.0, 100.0),
            },
        ));
    }
    app.world_mut().flush();
    app.update();

    // --- Defender ---
    let eye = Vec3::new(0.0, 10.0, 5.0);
    let base = place(&mut app, PieceKind::VerticalPillar, eye, Vec3::ZERO);
    let upper = place(&mut app, PieceKind::VerticalPillar, eye, Vec3::new(0.0, 3.0, 0.0));
    let beam = place(
        &mut app,
        PieceKind::HorizontalPillar,
        Vec3::new(-5.0, 4.5, 0.0),
        Vec3::new(-0.25, 4.5, 0.0),
    );
    let crown = place(&mut app, PieceKind::DefenseObject, eye, Vec3::new(0.0, 6.0, 0.0));

    log_info(&format!(
        "Built: base {:?}, upper {:?}, beam {:?}, crown {:?}",
        base, upper, beam, crown
    ));

    app.world_mut().send_event(PhaseChangeRequest {
        reason: PhaseChangeReason::FinishedBuilding,
    });
    app.update();

    // --- Attacker ---
    if let Some(aim) = AimRay::looking_at(Vec3::new(0.0, 5.0, 12.0), Vec3::new(0.0, 5.0, 0.0)) {
        app.insert_resource(aim);
    }

    let mut broken = 0;
    let volley = [
        ProjectileKind::Fastball,
        ProjectileKind::Scattershot,
        ProjectileKind::Slug,
        ProjectileKind::Fastball,
        ProjectileKind::Slug,
        ProjectileKind::Fastball,
        ProjectileKind::Fastball,
    ];
    for kind in volley {
        app.world_mut().send_event(LaunchIntent { kind });
        app.update();

        // Попадание в верхнюю колонну
        if let Some(target) = upper {
            let force = match kind {
                ProjectileKind::Slug => 9_000.0,
                ProjectileKind::Scattershot => 800.0,
                ProjectileKind::Fastball => 2_500.0,
            };
            app.world_mut().send_event(StructuralImpact { piece: target, force });
            app.world_mut().run_schedule(FixedUpdate);
            broken += app.world().resource::<Events<JointBroken>>().iter_current_update_events().count();
        }
    }

    for tick in 0..600 {
        app.update();
        broken += app.world().resource::<Events<JointBroken>>().iter_current_update_events().count();

        if tick % 120 == 0 {
            let phase = app.world().resource::<PhaseController>().phase;
            let ammo = app.world().resource::<Ammo>().current;
            println!("Tick {}: phase {:?}, ammo {}", tick, phase, ammo);
        }
    }

    let world = app.world_mut();
    let pieces = world.query::<&PlacedPiece>().iter(world).count();
    let phase = world.resource::<PhaseController>().phase;
    let registry = world.resource::<RoundState>().placed_count();

    log_info(&format!(
        "Summary: phase {:?}, {} placed pieces in world, registry {}, {} joints broke",
        phase, pieces, registry, broken
    ));
    println!("Simulation complete!");
}
