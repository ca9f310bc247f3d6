//! Aim ray - луч из центра viewport
//!
//! Пишется внешним camera layer каждый frame.
//! Читают: ghost controller (raycast placement) и attack tool (направление запуска).

use bevy::prelude::*;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct AimRay {
    pub origin: Vec3,
    pub direction: Dir3,
}

impl Default for AimRay {
    fn default() -> Self {
        Self {
            origin: Vec3::new(0.0, 1.8, 0.0),
            direction: Dir3::NEG_Z,
        }
    }
}

impl AimRay {
    pub fn new(origin: Vec3, direction: Dir3) -> Self {
        Self { origin, direction }
    }

    /// Луч из `origin` в точку `target`. None если точки совпадают.
    pub fn looking_at(origin: Vec3, target: Vec3) -> Option<Self> {
        let direction = Dir3::new(target - origin).ok()?;
        Some(Self { origin, direction })
    }

    pub fn ray(&self) -> Ray3d {
        Ray3d::new(self.origin, self.direction)
    }
}
