//! Attack tool systems (Update, `SimulationSet::Attack`)

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::Rng;

use super::{
    Ammo, AttackTool, LaunchIntent, LaunchRejectReason, LaunchRejected, Projectile, ProjectileKind,
    ProjectileLaunched,
};
use crate::aim::AimRay;
use crate::config::GameConfig;
use crate::logger::{log, log_info};
use crate::physics::layers;
use crate::round::{PhaseChangeReason, PhaseChangeRequest};
use crate::DeterministicRng;

/// Равномерная точка внутри единичной сферы (rejection sampling)
pub fn random_in_unit_sphere(rng: &mut impl Rng) -> Vec3 {
    loop {
        let candidate = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if candidate.length_squared() <= 1.0 {
            return candidate;
        }
    }
}

fn spawn_projectile(
    commands: &mut Commands,
    kind: ProjectileKind,
    position: Vec3,
    direction: Vec3,
    impulse: f32,
) -> Entity {
    commands
        .spawn((
            Projectile { kind },
            Transform::from_translation(position),
            RigidBody::Dynamic,
            Collider::ball(kind.radius()),
            AdditionalMassProperties::Mass(kind.mass()),
            Ccd::enabled(),
            layers::projectile_groups(),
            ExternalImpulse {
                impulse: direction * impulse,
                torque_impulse: Vec3::ZERO,
            },
        ))
        .id()
}

/// Система: обработка LaunchIntent
///
/// Сила прикладывается одним импульсом = force * fixed timestep
/// (эквивалент силы, действующей один physics tick).
pub fn process_launch_intents(
    mut commands: Commands,
    mut intents: EventReader<LaunchIntent>,
    tool: Res<AttackTool>,
    mut ammo: ResMut<Ammo>,
    aim: Res<AimRay>,
    config: Res<GameConfig>,
    fixed_time: Res<Time<Fixed>>,
    mut rng: ResMut<DeterministicRng>,
    mut launched: EventWriter<ProjectileLaunched>,
    mut rejected: EventWriter<LaunchRejected>,
) {
    let config = &config.attack;
    let dt = fixed_time.timestep().as_secs_f32();

    for intent in intents.read() {
        let kind = intent.kind;

        if !tool.enabled {
            rejected.write(LaunchRejected {
                kind,
                reason: LaunchRejectReason::AttackToolDisabled,
            });
            continue;
        }

        if !ammo.try_consume(kind.cost(config)) {
            log(&format!(
                "Launch {:?} rejected: {} ammo, needs {}",
                kind,
                ammo.current,
                kind.cost(config)
            ));
            rejected.write(LaunchRejected {
                kind,
                reason: LaunchRejectReason::InsufficientAmmo,
            });
            continue;
        }

        let forward = *aim.direction;
        let spawn_at = aim.origin + forward * config.spawn_distance;
        let impulse = kind.launch_force(config) * dt;
        let pellets = kind.pellets(config);

        for _ in 0..pellets {
            let direction = match kind {
                ProjectileKind::Scattershot => {
                    let spread = forward + random_in_unit_sphere(&mut rng.rng) * config.scatter_spread;
                    spread.try_normalize().unwrap_or(forward)
                }
                ProjectileKind::Fastball | ProjectileKind::Slug => forward,
            };
            spawn_projectile(&mut commands, kind, spawn_at, direction, impulse);
        }

        log_info(&format!(
            "Launched {:?} x{} ({} ammo left)",
            kind, pellets, ammo.current
        ));
        launched.write(ProjectileLaunched {
            kind,
            pellets,
            ammo_left: ammo.current,
        });
    }
}

/// Система: settle таймер после последнего патрона
pub fn tick_ammo_exhausted(
    time: Res<Time>,
    mut tool: ResMut<AttackTool>,
    ammo: Res<Ammo>,
    config: Res<GameConfig>,
    mut requests: EventWriter<PhaseChangeRequest>,
) {
    if !tool.enabled || !ammo.is_empty() {
        return;
    }

    let remaining = tool.exhausted_timer.unwrap_or(config.attack.ammo_exhausted_delay) - time.delta_secs();

    if remaining <= 0.0 {
        tool.exhausted_timer = None;
        log("Ammo exhausted, requesting Defender phase");
        requests.write(PhaseChangeRequest {
            reason: PhaseChangeReason::AmmoExhausted,
        });
    } else {
        tool.exhausted_timer = Some(remaining);
    }
}
