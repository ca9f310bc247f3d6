//! Placement Ghost Controller
//!
//! Ровно один live preview выбранного piece, следующий за aim point.
//!
//! Per-frame (пока build tool включён):
//! 1. Нет preview → spawn (kinematic, ColliderDisabled, без gravity)
//! 2. Raycast из viewport center. Miss → pose invalid, marker Invalid, выход
//! 3. up ghost'а → нормаль поверхности
//! 4. Сдвиг вдоль нормали на offset kind'а (по world AABB)
//! 5. Snap resolver: нашёл пару → pose = snapped pose
//! 6. Иначе ground placement - pose всё равно valid
//!
//! Defense object exclusivity: если defense object уже стоит в этом раунде,
//! preview для него не создаётся вовсе.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::aim::AimRay;
use crate::building::events::SelectPieceIntent;
use crate::building::snap::{resolve_snap, SnapResolution};
use crate::config::GameConfig;
use crate::logger::{log, log_warning};
use crate::physics::{layers, ConnectorQuery, SolidQuery};
use crate::round::RoundState;
use crate::structure::{PieceBlueprint, PieceCatalog, PieceKind};

/// Вкл/выкл build tool (управляет phase controller)
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildTool {
    pub enabled: bool,
}

impl Default for BuildTool {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl BuildTool {
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// run_if condition
pub fn build_tool_enabled(tool: Res<BuildTool>) -> bool {
    tool.enabled
}

pub fn build_tool_disabled(tool: Res<BuildTool>) -> bool {
    !tool.enabled
}

/// Текущий выбор (kind + variant в каталоге)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PieceSelection {
    pub kind: PieceKind,
    pub variant: usize,
}

/// Transient состояние build session
#[derive(Resource, Debug, Default)]
pub struct GhostState {
    pub selection: PieceSelection,
    pub preview: Option<Entity>,
    pub pose: Option<Transform>,
    pub valid: bool,
    pub snap: Option<SnapResolution>,
    /// Нормаль поверхности под aim point (для ground placement)
    pub surface_normal: Option<Vec3>,
}

impl GhostState {
    /// Despawn preview + сброс validity
    pub fn clear_preview(&mut self, commands: &mut Commands) {
        if let Some(preview) = self.preview.take() {
            commands.entity(preview).try_despawn();
        }
        self.pose = None;
        self.valid = false;
        self.snap = None;
        self.surface_normal = None;
    }

    /// Можно ли коммитить текущую pose
    pub fn is_placeable(&self) -> bool {
        self.preview.is_some() && self.valid && self.pose.is_some()
    }
}

/// Marker для preview entity
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct GhostPreview;

/// Visual marker (valid/invalid material). Render layer читает Changed<PlacementMarker>.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum PlacementMarker {
    Valid,
    #[default]
    Invalid,
}

/// Spawn preview: никакого физического взаимодействия
fn spawn_preview(commands: &mut Commands, blueprint: &PieceBlueprint) -> Entity {
    let h = blueprint.half_extents;
    commands
        .spawn((
            GhostPreview,
            PlacementMarker::Invalid,
            Transform::default(),
            RigidBody::KinematicPositionBased,
            Collider::cuboid(h.x, h.y, h.z),
            ColliderDisabled,
            GravityScale(0.0),
            layers::ghost_groups(),
        ))
        .id()
}

/// Система: обработка выбора piece
///
/// Смена выбора уничтожает preview - следующий update строит новый.
pub fn apply_build_selection(
    mut commands: Commands,
    mut intents: EventReader<SelectPieceIntent>,
    mut ghost: ResMut<GhostState>,
    catalog: Res<PieceCatalog>,
) {
    for intent in intents.read() {
        if catalog.get(intent.kind, intent.variant).is_none() {
            log_warning(&format!(
                "SelectPieceIntent: no blueprint for {:?} variant {}",
                intent.kind, intent.variant
            ));
            continue;
        }

        let selection = PieceSelection {
            kind: intent.kind,
            variant: intent.variant,
        };
        if ghost.selection == selection {
            continue;
        }

        ghost.selection = selection;
        ghost.clear_preview(&mut commands);
        log(&format!("Build selection → {:?} (variant {})", selection.kind, selection.variant));
    }
}

/// Система: per-frame позиционирование ghost'а (raycast + snap)
pub fn update_ghost(
    mut commands: Commands,
    mut ghost: ResMut<GhostState>,
    aim: Res<AimRay>,
    catalog: Res<PieceCatalog>,
    config: Res<GameConfig>,
    round: Res<RoundState>,
    solids: SolidQuery,
    connectors: ConnectorQuery,
) {
    ghost.snap = None;
    let selection = ghost.selection;

    if selection.kind.is_exclusive() && round.defense_object_placed() {
        if ghost.preview.is_some() {
            ghost.clear_preview(&mut commands);
        }
        ghost.valid = false;
        return;
    }

    let Some(blueprint) = catalog.get(selection.kind, selection.variant) else {
        ghost.clear_preview(&mut commands);
        return;
    };

    if ghost.preview.is_none() {
        ghost.preview = Some(spawn_preview(&mut commands, blueprint));
        ghost.valid = false;
    }

    let Some(hit) = solids.cast_ray(aim.ray(), config.build.max_ray_distance) else {
        ghost.valid = false;
        return;
    };

    // Ground placement fallback: up → нормаль, pivot над поверхностью
    let rotation = Quat::from_rotation_arc(Vec3::Y, hit.normal.normalize());
    let extents = blueprint.world_extents(rotation);
    let offset = selection.kind.surface_offset(extents);
    let ground_pose = Transform::from_translation(hit.point + hit.normal * offset).with_rotation(rotation);

    let snap = resolve_snap(
        blueprint,
        ground_pose,
        hit.point,
        config.build.snap_radius,
        &connectors.views(),
    );

    ghost.pose = Some(snap.map_or(ground_pose, |snap| snap.pose));
    ghost.snap = snap;
    ghost.surface_normal = Some(hit.normal);
    ghost.valid = true;
}

/// Система: выключенный build tool не держит preview
pub fn retire_ghost_when_disabled(mut commands: Commands, mut ghost: ResMut<GhostState>) {
    if ghost.preview.is_some() {
        ghost.clear_preview(&mut commands);
    }
}

/// Система: перенос pose/validity на preview entity
pub fn sync_ghost_preview(
    ghost: Res<GhostState>,
    mut previews: Query<(&mut Transform, &mut PlacementMarker), With<GhostPreview>>,
) {
    let Some(preview) = ghost.preview else {
        return;
    };
    let Ok((mut transform, mut marker)) = previews.get_mut(preview) else {
        return;
    };

    if let Some(pose) = ghost.pose {
        *transform = pose;
    }

    let desired = if ghost.valid {
        PlacementMarker::Valid
    } else {
        PlacementMarker::Invalid
    };
    marker.set_if_neq(desired);
}
