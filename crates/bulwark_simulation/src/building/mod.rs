//! Building domain - ghost preview, connector snap, attachment
//!
//! Поток данных за один frame (Update, `SimulationSet::Build`, строго по порядку):
//! 1. apply_build_selection - SelectPieceIntent → смена preview
//! 2. update_ghost - raycast + snap → GhostState.pose
//! 3. sync_ghost_preview - pose/marker → preview entity
//! 4. confirm_placement - ConfirmPlacementIntent коммитит pose из шага 2
//!
//! Шаги 1-3 работают только при включённом build tool.

use bevy::prelude::*;

pub mod attach;
pub mod events;
pub mod ghost;
pub mod snap;


pub use attach::{confirm_placement, plan_connector_joints, PlannedJoint};
pub use events::{
    AttachedVia, ConfirmPlacementIntent, PiecePlaced, PlacementRejected, RejectReason,
    SelectPieceIntent,
};
pub use ghost::{
    apply_build_selection, build_tool_disabled, build_tool_enabled, retire_ghost_when_disabled,
    sync_ghost_preview, update_ghost, BuildTool, GhostPreview, GhostState, PieceSelection,
    PlacementMarker,
};
pub use snap::{align_to_connector, resolve_snap, select_connector_pair, SnapResolution};

use crate::SimulationSet;

/// Building Plugin
pub struct BuildingPlugin;

impl Plugin for BuildingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BuildTool>()
            .init_resource::<GhostState>()
            .add_event::<SelectPieceIntent>()
            .add_event::<ConfirmPlacementIntent>()
            .add_event::<PiecePlaced>()
            .add_event::<PlacementRejected>();

        app.add_systems(
            Update,
            (
                (apply_build_selection, update_ghost, sync_ghost_preview)
                    .chain()
                    .run_if(build_tool_enabled),
                retire_ghost_when_disabled.run_if(build_tool_disabled),
                // Confirm последним: коммитит pose, посчитанную в этом же frame
                confirm_placement,
            )
                .chain()
                .in_set(SimulationSet::Build),
        );
    }
}
