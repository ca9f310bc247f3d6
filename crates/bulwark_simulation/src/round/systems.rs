//! Phase controller systems (Update, после build/attack)

use bevy::prelude::*;

use super::{
    DefenseObjectFell, KillZone, Phase, PhaseChangeReason, PhaseChangeRequest, PhaseChanged,
    PhaseController, RoundState,
};
use crate::attack::{Ammo, AttackTool, Projectile};
use crate::building::{BuildTool, GhostState};
use crate::config::GameConfig;
use crate::logger::{log, log_info, log_warning};
use crate::physics::ConnectorQuery;
use crate::structure::{PieceKind, PlacedPiece};

/// Система: обратный отсчёт фазы
pub fn tick_phase_timer(
    time: Res<Time>,
    mut controller: ResMut<PhaseController>,
    mut requests: EventWriter<PhaseChangeRequest>,
) {
    if controller.remaining <= 0.0 {
        return;
    }

    controller.remaining -= time.delta_secs();
    if controller.remaining <= 0.0 {
        controller.remaining = 0.0;
        requests.write(PhaseChangeRequest {
            reason: PhaseChangeReason::TimerExpired,
        });
    }
}

/// Система: kill zone
///
/// Снаряды внутри → despawn (в любой фазе).
/// Defense object внутри во время Attacker → DefenseObjectFell + запрос перехода.
pub fn check_kill_zone(
    mut commands: Commands,
    zones: Query<(&Transform, &KillZone)>,
    projectiles: Query<(Entity, &Transform), With<Projectile>>,
    pieces: Query<(Entity, &Transform, &PlacedPiece)>,
    controller: Res<PhaseController>,
    mut fell: EventWriter<DefenseObjectFell>,
    mut requests: EventWriter<PhaseChangeRequest>,
) {
    for (zone_transform, zone) in zones.iter() {
        let center = zone_transform.translation;

        for (entity, transform) in projectiles.iter() {
            if zone.contains(center, transform.translation) {
                commands.entity(entity).try_despawn();
            }
        }

        if controller.phase != Phase::Attacker {
            continue;
        }

        for (entity, transform, placed) in pieces.iter() {
            if placed.kind != PieceKind::DefenseObject || !zone.contains(center, transform.translation) {
                continue;
            }

            log_info(&format!("Defense object {:?} fell into kill zone", entity));
            fell.write(DefenseObjectFell { piece: entity });
            requests.write(PhaseChangeRequest {
                reason: PhaseChangeReason::DefenseObjectFell,
            });
        }
    }
}

/// Система: применение запросов смены фазы
///
/// За frame применяется максимум один переход (первый допустимый запрос).
#[allow(clippy::too_many_arguments)]
pub fn process_phase_requests(
    mut commands: Commands,
    mut requests: EventReader<PhaseChangeRequest>,
    mut controller: ResMut<PhaseController>,
    config: Res<GameConfig>,
    mut round: ResMut<RoundState>,
    mut build_tool: ResMut<BuildTool>,
    mut ghost: ResMut<GhostState>,
    mut attack_tool: ResMut<AttackTool>,
    mut ammo: ResMut<Ammo>,
    projectiles: Query<Entity, With<Projectile>>,
    mut connectors: ConnectorQuery,
    mut changed: EventWriter<PhaseChanged>,
) {
    let mut switched = false;

    for request in requests.read() {
        if switched {
            continue;
        }

        let reason = request.reason;
        let from = controller.phase;
        if !reason.allowed_from(from) {
            log(&format!("Phase request {:?} ignored in {:?}", reason, from));
            continue;
        }
        if reason == PhaseChangeReason::FinishedBuilding && !round.defense_object_placed() {
            log_warning("FinishedBuilding ignored: defense object is not placed");
            continue;
        }

        let to = reason.target();
        match to {
            Phase::Defender => {
                build_tool.set_enabled(true);
                attack_tool.set_enabled(false);

                let mut despawned = 0;
                for projectile in projectiles.iter() {
                    commands.entity(projectile).try_despawn();
                    despawned += 1;
                }

                let records = round.reset();
                for record in &records {
                    commands.entity(record.piece).try_despawn();
                    if let Some(anchor) = record.anchor {
                        commands.entity(anchor).try_despawn();
                    }
                }
                let released = connectors.release_all();

                log(&format!(
                    "Round reset: {} pieces, {} projectiles despawned, {} connectors released",
                    records.len(),
                    despawned,
                    released
                ));
                controller.remaining = config.round.defender_phase_duration;
            }
            Phase::Attacker => {
                build_tool.set_enabled(false);
                ghost.clear_preview(&mut commands);
                attack_tool.set_enabled(true);
                ammo.refill();
                controller.remaining = config.round.attacker_phase_duration;
            }
        }

        controller.phase = to;
        switched = true;

        log_info(&format!("Phase {:?} → {:?} ({:?})", from, to, reason));
        changed.write(PhaseChanged { from, to, reason });
    }
}
