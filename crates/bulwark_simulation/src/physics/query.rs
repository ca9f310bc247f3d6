//! Spatial queries для строительства: raycast и sphere overlap
//!
//! Детерминированные запросы поверх ECS данных (а не rapier query pipeline):
//! - raycast: ray vs infinite plane / oriented box (`RaycastSolid`)
//! - overlap: sphere vs world позиции `Connector` (фильтр по LAYER_CONNECTORS)
//!
//! Результаты overlap отсортированы по расстоянию (tie-break по Entity index),
//! поэтому выбор "первого" connector не зависит от порядка хранения в World.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::CollisionGroups;

use crate::physics::layers::LAYER_CONNECTORS;
use crate::structure::{Connector, PlacedPiece};

const PARALLEL_EPSILON: f32 = 1e-6;

/// Форма для raycast (зеркалит rapier Collider того же entity)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub enum RaycastSolid {
    /// Бесконечная плоскость через Transform.translation, нормаль = local +Y
    HalfSpace,
    /// Oriented box
    Cuboid { half_extents: Vec3 },
}

/// Результат raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub point: Vec3,
    /// Нормаль поверхности, развёрнутая навстречу лучу
    pub normal: Vec3,
    pub distance: f32,
}

/// Ray vs один solid. Возвращает (distance, normal).
pub fn intersect_solid(
    ray: Ray3d,
    max_distance: f32,
    transform: &Transform,
    solid: &RaycastSolid,
) -> Option<(f32, Vec3)> {
    let direction = *ray.direction;

    match solid {
        RaycastSolid::HalfSpace => {
            let normal = transform.rotation * Vec3::Y;
            let denom = normal.dot(direction);
            if denom.abs() < PARALLEL_EPSILON {
                return None;
            }
            let t = normal.dot(transform.translation - ray.origin) / denom;
            if t < 0.0 || t > max_distance {
                return None;
            }
            let facing = if denom < 0.0 { normal } else { -normal };
            Some((t, facing))
        }
        RaycastSolid::Cuboid { half_extents } => {
            let inverse = transform.rotation.inverse();
            let origin = inverse * (ray.origin - transform.translation);
            let dir = inverse * direction;

            let mut t_enter = f32::NEG_INFINITY;
            let mut t_exit = f32::INFINITY;
            let mut enter_normal = Vec3::ZERO;

            for axis in 0..3 {
                let o = origin[axis];
                let d = dir[axis];
                let h = half_extents[axis];

                if d.abs() < PARALLEL_EPSILON {
                    if o.abs() > h {
                        return None;
                    }
                    continue;
                }

                let t_near_face = (-h - o) / d;
                let t_far_face = (h - o) / d;
                let (t0, t1, sign) = if t_near_face < t_far_face {
                    (t_near_face, t_far_face, -1.0)
                } else {
                    (t_far_face, t_near_face, 1.0)
                };

                if t0 > t_enter {
                    t_enter = t0;
                    enter_normal = Vec3::ZERO;
                    enter_normal[axis] = sign;
                }
                t_exit = t_exit.min(t1);

                if t_enter > t_exit {
                    return None;
                }
            }

            // Origin внутри box → не считаем попаданием
            if t_enter < 0.0 || t_enter > max_distance {
                return None;
            }

            Some((t_enter, transform.rotation * enter_normal))
        }
    }
}

/// Ближайшее попадание среди solids
pub fn cast_ray<'a>(
    ray: Ray3d,
    max_distance: f32,
    solids: impl IntoIterator<Item = (Entity, &'a Transform, &'a RaycastSolid)>,
) -> Option<RayHit> {
    let mut best: Option<RayHit> = None;

    for (entity, transform, solid) in solids {
        let Some((distance, normal)) = intersect_solid(ray, max_distance, transform, solid) else {
            continue;
        };

        let closer = best.is_none_or(|hit| {
            distance < hit.distance || (distance == hit.distance && entity.index() < hit.entity.index())
        });
        if closer {
            best = Some(RayHit {
                entity,
                point: ray.origin + *ray.direction * distance,
                normal,
                distance,
            });
        }
    }

    best
}

/// Snapshot connector в world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorView {
    pub entity: Entity,
    pub connector: Connector,
    pub world: Transform,
    /// Rigid body владельца (placed piece), None для статических connectors уровня
    pub body: Option<Entity>,
}

/// Connectors в радиусе от точки, по возрастанию расстояния
pub fn overlap_connectors(center: Vec3, radius: f32, views: &[ConnectorView]) -> Vec<ConnectorView> {
    let radius_sq = radius * radius;
    let mut found: Vec<(f32, ConnectorView)> = views
        .iter()
        .filter_map(|view| {
            let distance_sq = view.world.translation.distance_squared(center);
            (distance_sq <= radius_sq).then_some((distance_sq, *view))
        })
        .collect();

    found.sort_by(|(a, va), (b, vb)| {
        a.total_cmp(b)
            .then_with(|| va.entity.index().cmp(&vb.entity.index()))
    });

    found.into_iter().map(|(_, view)| view).collect()
}

/// Raycast SystemParam
#[derive(SystemParam)]
pub struct SolidQuery<'w, 's> {
    solids: Query<'w, 's, (Entity, &'static Transform, &'static RaycastSolid)>,
}

impl SolidQuery<'_, '_> {
    pub fn cast_ray(&self, ray: Ray3d, max_distance: f32) -> Option<RayHit> {
        cast_ray(ray, max_distance, self.solids.iter())
    }
}

/// Connectors SystemParam: world transforms + occupancy
///
/// Connector может быть child entity piece (world = parent * local)
/// или статическим entity уровня (world = own Transform).
#[derive(SystemParam)]
pub struct ConnectorQuery<'w, 's> {
    connectors: Query<
        'w,
        's,
        (
            Entity,
            &'static mut Connector,
            &'static Transform,
            Option<&'static ChildOf>,
            Option<&'static CollisionGroups>,
        ),
    >,
    parents: Query<'w, 's, (&'static Transform, Has<PlacedPiece>), Without<Connector>>,
}

impl ConnectorQuery<'_, '_> {
    /// Все connectors на connector слое
    pub fn views(&self) -> Vec<ConnectorView> {
        self.connectors
            .iter()
            .filter(|(_, _, _, _, groups)| {
                groups.is_none_or(|groups| groups.memberships.contains(LAYER_CONNECTORS))
            })
            .filter_map(|(entity, connector, local, child_of, _)| {
                let (world, body) = match child_of {
                    Some(child_of) => {
                        let (parent, is_piece) = self.parents.get(child_of.parent()).ok()?;
                        (parent.mul_transform(*local), is_piece.then_some(child_of.parent()))
                    }
                    None => (*local, None),
                };

                Some(ConnectorView {
                    entity,
                    connector: *connector,
                    world,
                    body,
                })
            })
            .collect()
    }

    /// Connectors в радиусе (sorted by distance)
    pub fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<ConnectorView> {
        overlap_connectors(center, radius, &self.views())
    }

    /// World transform rigid body, которому принадлежат connectors
    pub fn body_transform(&self, body: Entity) -> Option<Transform> {
        self.parents.get(body).ok().map(|(transform, _)| *transform)
    }

    pub fn mark_occupied(&mut self, entity: Entity) {
        if let Ok((_, mut connector, ..)) = self.connectors.get_mut(entity) {
            connector.occupied = true;
        }
    }

    /// Сброс occupancy (phase reset)
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        for (_, mut connector, ..) in self.connectors.iter_mut() {
            if connector.occupied {
                connector.occupied = false;
                released += 1;
            }
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{ConnectorKind, ConnectorPosition};

    fn down_ray(origin: Vec3) -> Ray3d {
        Ray3d::new(origin, Dir3::NEG_Y)
    }

    #[test]
    fn test_ray_hits_ground_plane() {
        let ground = Transform::IDENTITY;
        let hit = intersect_solid(down_ray(Vec3::new(3.0, 10.0, -2.0)), 100.0, &ground, &RaycastSolid::HalfSpace);

        let (distance, normal) = hit.expect("ground hit");
        assert!((distance - 10.0).abs() < 1e-5);
        assert!((normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_ray_parallel_to_plane_misses() {
        let ray = Ray3d::new(Vec3::new(0.0, 1.0, 0.0), Dir3::X);
        assert!(intersect_solid(ray, 100.0, &Transform::IDENTITY, &RaycastSolid::HalfSpace).is_none());
    }

    #[test]
    fn test_ray_beyond_max_distance_misses() {
        assert!(intersect_solid(down_ray(Vec3::Y * 50.0), 10.0, &Transform::IDENTITY, &RaycastSolid::HalfSpace).is_none());
    }

    #[test]
    fn test_ray_hits_box_top_face() {
        let solid = RaycastSolid::Cuboid { half_extents: Vec3::new(0.25, 1.5, 0.25) };
        let transform = Transform::from_xyz(0.0, 1.5, 0.0);

        let (distance, normal) = intersect_solid(down_ray(Vec3::Y * 10.0), 100.0, &transform, &solid)
            .expect("box hit");

        assert!((distance - 7.0).abs() < 1e-5);
        assert!((normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_ray_hits_rotated_box_side() {
        // Box повернут на 90° вокруг Z: длинная ось лежит вдоль X
        let solid = RaycastSolid::Cuboid { half_extents: Vec3::new(0.25, 1.5, 0.25) };
        let transform = Transform::from_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        let ray = Ray3d::new(Vec3::new(-10.0, 0.0, 0.0), Dir3::X);

        let (distance, normal) = intersect_solid(ray, 100.0, &transform, &solid).expect("box hit");

        assert!((distance - 8.5).abs() < 1e-4, "distance = {}", distance);
        assert!((normal - Vec3::NEG_X).length() < 1e-4, "normal = {:?}", normal);
    }

    #[test]
    fn test_cast_ray_picks_closest() {
        let ground = (Entity::from_raw(1), Transform::IDENTITY, RaycastSolid::HalfSpace);
        let pillar = (
            Entity::from_raw(2),
            Transform::from_xyz(0.0, 1.5, 0.0),
            RaycastSolid::Cuboid { half_extents: Vec3::new(0.25, 1.5, 0.25) },
        );
        let solids = [ground, pillar];

        let hit = cast_ray(
            down_ray(Vec3::Y * 10.0),
            100.0,
            solids.iter().map(|(e, t, s)| (*e, t, s)),
        )
        .expect("hit");

        assert_eq!(hit.entity, Entity::from_raw(2));
        assert!((hit.point - Vec3::Y * 3.0).length() < 1e-5);
    }

    #[test]
    fn test_overlap_sorted_by_distance() {
        let connector = Connector::new(ConnectorPosition::Top, ConnectorKind::Vertical);
        let view = |index: u32, x: f32| ConnectorView {
            entity: Entity::from_raw(index),
            connector,
            world: Transform::from_xyz(x, 0.0, 0.0),
            body: None,
        };
        let views = [view(1, 4.0), view(2, 1.0), view(3, 6.0), view(4, -2.0)];

        let found = overlap_connectors(Vec3::ZERO, 5.0, &views);
        let order: Vec<u32> = found.iter().map(|v| v.entity.index()).collect();

        assert_eq!(order, vec![2, 4, 1]);
    }
}
