//! Physics provider для строительства
//!
//! Rapier владеет телами, коллизиями и joints (компоненты на entities).
//! Здесь: collision layers и детерминированные scene queries (raycast, sphere overlap).

pub mod layers;
pub mod query;

// Re-export основных типов
pub use query::{
    cast_ray, intersect_solid, overlap_connectors, ConnectorQuery, ConnectorView, RayHit,
    RaycastSolid, SolidQuery,
};
