//! Structural pieces: kinds, blueprints, catalog
//!
//! Архитектура:
//! - `PieceKind` - закрытый sum type (3 варианта), несёт per-variant поведение
//!   (ghost offset, snap rule, пороги joints, exclusivity) вместо switch'ей по всему коду
//! - `PieceBlueprint` - data-authored описание модели (bounds + connectors)
//! - `PieceCatalog` - resource, kind → варианты. Регистрация валидирует blueprints
//!   и паникует на authoring bugs (битый prefab - это не gameplay состояние)

use bevy::prelude::*;

use crate::config::{BreakThreshold, BuildConfig};
use crate::structure::connector::{Connector, ConnectorKind, ConnectorPosition};

/// Тип строительного элемента
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum PieceKind {
    #[default]
    VerticalPillar,
    HorizontalPillar,
    DefenseObject,
}

/// Правило выбора connector pair при snap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapRule {
    /// Vertical pillar / defense object: opposite грань (или front на horizontal target)
    Opposite,
    /// Horizontal pillar: таблица `is_valid_horizontal_attachment`, только свободные боковые грани
    SideMount,
}

impl PieceKind {
    pub const ALL: [PieceKind; 3] = [
        PieceKind::VerticalPillar,
        PieceKind::HorizontalPillar,
        PieceKind::DefenseObject,
    ];

    pub fn snap_rule(self) -> SnapRule {
        match self {
            PieceKind::VerticalPillar | PieceKind::DefenseObject => SnapRule::Opposite,
            PieceKind::HorizontalPillar => SnapRule::SideMount,
        }
    }

    /// Смещение ghost вдоль нормали поверхности (чтобы pivot не тонул в поверхности)
    ///
    /// `extents` - half extents world AABB ghost'а.
    pub fn surface_offset(self, extents: Vec3) -> f32 {
        match self {
            PieceKind::HorizontalPillar => extents.x.max(extents.z),
            PieceKind::VerticalPillar | PieceKind::DefenseObject => extents.y,
        }
    }

    /// Порог joint'а через connector
    pub fn connector_threshold(self, config: &BuildConfig) -> BreakThreshold {
        match self {
            PieceKind::DefenseObject => config.defense_connector_joint,
            PieceKind::VerticalPillar | PieceKind::HorizontalPillar => config.pillar_connector_joint,
        }
    }

    /// Порог synthetic ground anchor (un-snapped placement)
    pub fn ground_threshold(self, config: &BuildConfig) -> BreakThreshold {
        match self {
            PieceKind::DefenseObject => config.defense_ground_anchor,
            PieceKind::VerticalPillar | PieceKind::HorizontalPillar => config.pillar_ground_anchor,
        }
    }

    /// Максимум один экземпляр за раунд
    pub fn is_exclusive(self) -> bool {
        matches!(self, PieceKind::DefenseObject)
    }

    /// Connectors без которых snap rule этого kind не может работать
    fn required_connectors(self) -> &'static [(ConnectorPosition, Option<ConnectorKind>)] {
        match self {
            PieceKind::VerticalPillar => &[
                (ConnectorPosition::Top, None),
                (ConnectorPosition::Bottom, None),
                (ConnectorPosition::Front, None),
            ],
            PieceKind::HorizontalPillar => &[
                (ConnectorPosition::Top, Some(ConnectorKind::Horizontal)),
                (ConnectorPosition::Bottom, Some(ConnectorKind::Horizontal)),
            ],
            PieceKind::DefenseObject => &[
                (ConnectorPosition::Bottom, None),
                (ConnectorPosition::Front, None),
            ],
        }
    }
}

/// Connector в blueprint (local space модели)
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorSpec {
    pub position: ConnectorPosition,
    pub kind: ConnectorKind,
    pub local: Transform,
}

impl ConnectorSpec {
    pub fn new(position: ConnectorPosition, kind: ConnectorKind, translation: Vec3) -> Self {
        Self {
            position,
            kind,
            local: Transform::from_translation(translation),
        }
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.local.rotation = rotation;
        self
    }

    pub fn to_component(&self) -> Connector {
        Connector::new(self.position, self.kind)
    }
}

/// Описание модели строительного элемента
#[derive(Debug, Clone, PartialEq)]
pub struct PieceBlueprint {
    pub name: String,
    pub kind: PieceKind,
    /// Half extents collider box (local space)
    pub half_extents: Vec3,
    pub mass: f32,
    pub connectors: Vec<ConnectorSpec>,
}

impl PieceBlueprint {
    /// Индекс connector с данной гранью
    pub fn connector_index(&self, position: ConnectorPosition) -> Option<usize> {
        self.connectors.iter().position(|spec| spec.position == position)
    }

    /// World transform connector при pose модели
    pub fn connector_world(&self, pose: &Transform, index: usize) -> Transform {
        pose.mul_transform(self.connectors[index].local)
    }

    /// Connector, смотрящий в опорную поверхность
    ///
    /// Направление connector = от центра модели к его позиции; выбирается
    /// самое противоположное `normal` (bottom у колонны на земле).
    pub fn support_connector(&self, pose: &Transform, normal: Vec3) -> Option<usize> {
        self.connectors
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let direction = (pose.rotation * spec.local.translation).normalize_or_zero();
                (index, direction.dot(normal))
            })
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(index, _)| index)
    }

    /// Half extents world AABB (union bounds повернутого box)
    pub fn world_extents(&self, rotation: Quat) -> Vec3 {
        let basis = Mat3::from_quat(rotation);
        let h = self.half_extents;
        Vec3::new(
            basis.x_axis.x.abs() * h.x + basis.y_axis.x.abs() * h.y + basis.z_axis.x.abs() * h.z,
            basis.x_axis.y.abs() * h.x + basis.y_axis.y.abs() * h.y + basis.z_axis.y.abs() * h.z,
            basis.x_axis.z.abs() * h.x + basis.y_axis.z.abs() * h.y + basis.z_axis.z.abs() * h.z,
        )
    }

    /// Проверка целостности. Panic = authoring bug.
    fn validate(&self) {
        assert!(
            self.half_extents.cmpgt(Vec3::ZERO).all(),
            "piece blueprint '{}': half extents must be positive, got {:?}",
            self.name,
            self.half_extents
        );
        assert!(
            self.mass > 0.0,
            "piece blueprint '{}': mass must be positive",
            self.name
        );
        assert!(
            !self.connectors.is_empty(),
            "piece blueprint '{}' has no connectors",
            self.name
        );

        for (index, spec) in self.connectors.iter().enumerate() {
            let duplicate = self.connectors[index + 1..]
                .iter()
                .any(|other| other.position == spec.position);
            assert!(
                !duplicate,
                "piece blueprint '{}': duplicate connector position {:?}",
                self.name,
                spec.position
            );
        }

        for (position, kind) in self.kind.required_connectors() {
            let found = self.connectors.iter().any(|spec| {
                spec.position == *position && kind.is_none_or(|kind| spec.kind == kind)
            });
            assert!(
                found,
                "piece blueprint '{}' ({:?}) lacks required connector {:?} (kind {:?})",
                self.name,
                self.kind,
                position,
                kind
            );
        }
    }
}

/// Каталог buildable pieces: kind → варианты
#[derive(Resource, Debug, Clone, Default)]
pub struct PieceCatalog {
    vertical: Vec<PieceBlueprint>,
    horizontal: Vec<PieceBlueprint>,
    defense: Vec<PieceBlueprint>,
}

impl PieceCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Регистрирует blueprint (panic на невалидных данных)
    pub fn register(&mut self, blueprint: PieceBlueprint) -> &mut Self {
        blueprint.validate();
        self.variants_mut(blueprint.kind).push(blueprint);
        self
    }

    pub fn get(&self, kind: PieceKind, variant: usize) -> Option<&PieceBlueprint> {
        self.variants(kind).get(variant)
    }

    pub fn variants(&self, kind: PieceKind) -> &[PieceBlueprint] {
        match kind {
            PieceKind::VerticalPillar => &self.vertical,
            PieceKind::HorizontalPillar => &self.horizontal,
            PieceKind::DefenseObject => &self.defense,
        }
    }

    fn variants_mut(&mut self, kind: PieceKind) -> &mut Vec<PieceBlueprint> {
        match kind {
            PieceKind::VerticalPillar => &mut self.vertical,
            PieceKind::HorizontalPillar => &mut self.horizontal,
            PieceKind::DefenseObject => &mut self.defense,
        }
    }
}

/// Вертикальная колонна 0.5 x 3 x 0.5
///
/// Connector frames:
/// - top/bottom: identity
/// - left/right: up смотрит внутрь колонны (horizontal beam садится своим top)
/// - front/back: up смотрит наружу (horizontal beam садится своим bottom)
pub fn vertical_pillar_blueprint() -> PieceBlueprint {
    use ConnectorPosition::*;
    let kind = ConnectorKind::Vertical;
    PieceBlueprint {
        name: "StonePillar".into(),
        kind: PieceKind::VerticalPillar,
        half_extents: Vec3::new(0.25, 1.5, 0.25),
        mass: 40.0,
        connectors: vec![
            ConnectorSpec::new(Top, kind, Vec3::new(0.0, 1.5, 0.0)),
            ConnectorSpec::new(Bottom, kind, Vec3::new(0.0, -1.5, 0.0)),
            ConnectorSpec::new(Left, kind, Vec3::new(-0.25, 0.0, 0.0))
                .rotated(Quat::from_rotation_z(-std::f32::consts::FRAC_PI_2)),
            ConnectorSpec::new(Right, kind, Vec3::new(0.25, 0.0, 0.0))
                .rotated(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)),
            ConnectorSpec::new(Front, kind, Vec3::new(0.0, 0.0, 0.25))
                .rotated(Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)),
            ConnectorSpec::new(Back, kind, Vec3::new(0.0, 0.0, -0.25))
                .rotated(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
        ],
    }
}

/// Горизонтальная балка (длинная ось = local Y, как у колонны, кладётся набок при snap)
pub fn horizontal_pillar_blueprint() -> PieceBlueprint {
    use ConnectorPosition::*;
    let kind = ConnectorKind::Horizontal;
    PieceBlueprint {
        name: "WoodBeam".into(),
        kind: PieceKind::HorizontalPillar,
        half_extents: Vec3::new(0.2, 1.5, 0.2),
        mass: 25.0,
        connectors: vec![
            ConnectorSpec::new(Top, kind, Vec3::new(0.0, 1.5, 0.0)),
            ConnectorSpec::new(Bottom, kind, Vec3::new(0.0, -1.5, 0.0)),
            ConnectorSpec::new(Left, kind, Vec3::new(-0.2, 0.0, 0.0)),
            ConnectorSpec::new(Right, kind, Vec3::new(0.2, 0.0, 0.0)),
            ConnectorSpec::new(Front, kind, Vec3::new(0.0, 0.0, 0.2)),
            ConnectorSpec::new(Back, kind, Vec3::new(0.0, 0.0, -0.2)),
        ],
    }
}

/// Defense object - то что атакующий пытается сбросить в kill zone
pub fn defense_object_blueprint() -> PieceBlueprint {
    use ConnectorPosition::*;
    let kind = ConnectorKind::DefenseObject;
    PieceBlueprint {
        name: "Crown".into(),
        kind: PieceKind::DefenseObject,
        half_extents: Vec3::new(0.4, 0.4, 0.4),
        mass: 10.0,
        connectors: vec![
            ConnectorSpec::new(Bottom, kind, Vec3::new(0.0, -0.4, 0.0)),
            ConnectorSpec::new(Front, kind, Vec3::new(0.0, 0.0, 0.4))
                .rotated(Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)),
        ],
    }
}

impl PieceCatalog {
    /// Каталог по умолчанию: один вариант на kind
    pub fn with_defaults() -> Self {
        let mut catalog = Self::empty();
        catalog
            .register(vertical_pillar_blueprint())
            .register(horizontal_pillar_blueprint())
            .register(defense_object_blueprint());
        catalog
    }
}
