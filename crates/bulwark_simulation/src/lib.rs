//! Bulwark Simulation Core
//!
//! ECS-симуляция на Bevy 0.16 для двухфазной игры Attacker/Defender:
//! Defender строит конструкцию из pieces (connector snapping + breakable joints),
//! Attacker пытается сбросить defense object снарядами.
//!
//! Разделение ответственности:
//! - ECS = game state, правила строительства, фазы, snap/attach логика
//! - Rapier = интеграция тел, коллизии, solving joints (компоненты на entities)
//! - Host (клиент) = рендер, input → intent events, AimRay, RapierPhysicsPlugin

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod aim;
pub mod attack;
pub mod building;
pub mod config;
pub mod joints;
pub mod logger;
pub mod physics;
pub mod round;
pub mod structure;

// Re-export основных типов
pub use aim::AimRay;
pub use attack::{
    Ammo, AttackPlugin, AttackTool, LaunchIntent, LaunchRejectReason, LaunchRejected, Projectile,
    ProjectileKind, ProjectileLaunched,
};
pub use building::{
    AttachedVia, BuildTool, BuildingPlugin, ConfirmPlacementIntent, GhostState, PiecePlaced,
    PlacementRejected, RejectReason, SelectPieceIntent,
};
pub use config::{BreakThreshold, GameConfig};
pub use joints::{BreakableJoint, JointBroken, JointPlugin, StructuralImpact};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use round::{
    KillZone, Phase, PhaseChangeReason, PhaseChangeRequest, PhaseChanged, PhaseController,
    RoundPlugin, RoundState,
};
pub use structure::{
    Connector, ConnectorKind, ConnectorPosition, PieceCatalog, PieceKind, PlacedPiece,
};

/// Порядок frame логики в Update
///
/// Build → Attack → Round: переход фазы всегда после placement/launch этого frame.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Build,
    Attack,
    Round,
}

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// `GameConfig`, `PieceCatalog` и `DeterministicRng`, вставленные до plugin,
/// имеют приоритет над defaults.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<GameConfig>() {
            app.insert_resource(GameConfig::default());
        }
        if !app.world().contains_resource::<PieceCatalog>() {
            app.insert_resource(PieceCatalog::with_defaults());
        }
        // Детерминистичный RNG (seed по умолчанию, если host не задал свой)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        let config = app.world().resource::<GameConfig>().clone();

        app
            // Fixed timestep 60Hz для physics tick (joints)
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .insert_resource(PhaseController::new(
                Phase::Defender,
                config.round.defender_phase_duration,
            ))
            .insert_resource(Ammo::new(config.attack.max_ammo))
            .init_resource::<AimRay>()
            .configure_sets(
                Update,
                (SimulationSet::Build, SimulationSet::Attack, SimulationSet::Round).chain(),
            )
            // Подсистемы
            .add_plugins((BuildingPlugin, JointPlugin, RoundPlugin, AttackPlugin));

        app.add_systems(
            Update,
            (
                (attack::process_launch_intents, attack::tick_ammo_exhausted)
                    .chain()
                    .in_set(SimulationSet::Attack),
                (
                    round::tick_phase_timer,
                    round::check_kill_zone,
                    round::process_phase_requests,
                )
                    .chain()
                    .in_set(SimulationSet::Round),
            ),
        );
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// SimulationPlugin добавляет вызывающий; seed из аргумента plugin не перезаписывает.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
