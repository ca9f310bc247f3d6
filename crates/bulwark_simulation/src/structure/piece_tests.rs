//! Tests for piece kinds and catalog validation.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::config::BuildConfig;
    use crate::structure::piece::*;
    use crate::structure::{ConnectorKind, ConnectorPosition};

    #[test]
    fn test_default_catalog_has_one_variant_per_kind() {
        let catalog = PieceCatalog::with_defaults();

        for kind in PieceKind::ALL {
            assert_eq!(catalog.variants(kind).len(), 1, "{:?}", kind);
            assert_eq!(catalog.get(kind, 0).map(|bp| bp.kind), Some(kind));
        }
        assert!(catalog.get(PieceKind::VerticalPillar, 1).is_none());
    }

    #[test]
    fn test_surface_offset_per_kind() {
        let extents = Vec3::new(0.3, 1.5, 0.8);

        assert_eq!(PieceKind::VerticalPillar.surface_offset(extents), 1.5);
        assert_eq!(PieceKind::DefenseObject.surface_offset(extents), 1.5);
        // Horizontal → больший из горизонтальных extents
        assert_eq!(PieceKind::HorizontalPillar.surface_offset(extents), 0.8);
    }

    #[test]
    fn test_thresholds_per_kind() {
        let config = BuildConfig::default();

        assert_eq!(PieceKind::VerticalPillar.connector_threshold(&config).force, 10_000.0);
        assert_eq!(PieceKind::HorizontalPillar.ground_threshold(&config).force, 2_000.0);
        assert_eq!(PieceKind::DefenseObject.ground_threshold(&config).force, 1_000.0);
        assert!(
            PieceKind::DefenseObject.connector_threshold(&config).force
                < PieceKind::VerticalPillar.connector_threshold(&config).force
        );
    }

    #[test]
    fn test_only_defense_object_is_exclusive() {
        assert!(PieceKind::DefenseObject.is_exclusive());
        assert!(!PieceKind::VerticalPillar.is_exclusive());
        assert!(!PieceKind::HorizontalPillar.is_exclusive());
    }

    #[test]
    fn test_world_extents_of_rotated_box() {
        let blueprint = vertical_pillar_blueprint();

        let upright = blueprint.world_extents(Quat::IDENTITY);
        assert!((upright - Vec3::new(0.25, 1.5, 0.25)).length() < 1e-5);

        // Положили набок: длинная ось → X
        let lying = blueprint.world_extents(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        assert!((lying - Vec3::new(1.5, 0.25, 0.25)).length() < 1e-5, "{:?}", lying);
    }

    #[test]
    fn test_connector_world_follows_pose() {
        let blueprint = vertical_pillar_blueprint();
        let top = blueprint.connector_index(ConnectorPosition::Top).expect("top");
        let pose = Transform::from_xyz(2.0, 1.5, 0.0);

        let world = blueprint.connector_world(&pose, top);
        assert!((world.translation - Vec3::new(2.0, 3.0, 0.0)).length() < 1e-5);
    }

    #[test]
    #[should_panic(expected = "lacks required connector")]
    fn test_vertical_pillar_without_front_panics() {
        let mut blueprint = vertical_pillar_blueprint();
        blueprint.connectors.retain(|spec| spec.position != ConnectorPosition::Front);

        PieceCatalog::empty().register(blueprint);
    }

    #[test]
    #[should_panic(expected = "lacks required connector")]
    fn test_horizontal_pillar_with_vertical_typed_top_panics() {
        let mut blueprint = horizontal_pillar_blueprint();
        for spec in blueprint.connectors.iter_mut() {
            if spec.position == ConnectorPosition::Top {
                spec.kind = ConnectorKind::Vertical;
            }
        }

        PieceCatalog::empty().register(blueprint);
    }

    #[test]
    #[should_panic(expected = "duplicate connector position")]
    fn test_duplicate_connector_panics() {
        let mut blueprint = defense_object_blueprint();
        blueprint.connectors.push(ConnectorSpec::new(
            ConnectorPosition::Bottom,
            ConnectorKind::DefenseObject,
            Vec3::ZERO,
        ));

        PieceCatalog::empty().register(blueprint);
    }

    #[test]
    #[should_panic(expected = "half extents must be positive")]
    fn test_degenerate_bounds_panic() {
        let mut blueprint = vertical_pillar_blueprint();
        blueprint.half_extents = Vec3::new(0.25, 0.0, 0.25);

        PieceCatalog::empty().register(blueprint);
    }

    #[test]
    fn test_support_connector_faces_surface() {
        let pillar = vertical_pillar_blueprint();
        let bottom = pillar.connector_index(ConnectorPosition::Bottom);
        assert_eq!(pillar.support_connector(&Transform::IDENTITY, Vec3::Y), bottom);

        // Балка у стены: up → +X, на стене стоит bottom торец
        let beam = horizontal_pillar_blueprint();
        let pose = Transform::from_rotation(Quat::from_rotation_arc(Vec3::Y, Vec3::X));
        assert_eq!(
            beam.support_connector(&pose, Vec3::X),
            beam.connector_index(ConnectorPosition::Bottom)
        );
    }
}
