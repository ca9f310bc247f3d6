//! Collision Layers Constants
//!
//! Rapier collision groups - centralised constants для всего проекта.
//!
//! ## Архитектура:
//! - **Memberships (Group):** на каком слое находится объект
//! - **Filters (Group):** с какими слоями объект коллидирует
//!
//! ## Слои:
//! - GROUP_1: Environment (ground, арена)
//! - GROUP_2: Structures (placed pillars)
//! - GROUP_3: Connectors (sensor balls, только для overlap поиска)
//! - GROUP_4: Projectiles
//! - GROUP_5: Defense object
//! - GROUP_6: Ghost preview (ни с чем не коллидирует)

use bevy_rapier3d::prelude::{CollisionGroups, Group};

pub const LAYER_ENVIRONMENT: Group = Group::GROUP_1;
pub const LAYER_STRUCTURES: Group = Group::GROUP_2;
pub const LAYER_CONNECTORS: Group = Group::GROUP_3;
pub const LAYER_PROJECTILES: Group = Group::GROUP_4;
pub const LAYER_DEFENSE: Group = Group::GROUP_5;
pub const LAYER_GHOST: Group = Group::GROUP_6;

/// Structures коллидируют с окружением, друг с другом, снарядами и defense object
pub fn structure_groups() -> CollisionGroups {
    CollisionGroups::new(
        LAYER_STRUCTURES,
        LAYER_ENVIRONMENT | LAYER_STRUCTURES | LAYER_PROJECTILES | LAYER_DEFENSE,
    )
}

pub fn defense_groups() -> CollisionGroups {
    CollisionGroups::new(
        LAYER_DEFENSE,
        LAYER_ENVIRONMENT | LAYER_STRUCTURES | LAYER_PROJECTILES,
    )
}

/// Снаряды НЕ коллидируют друг с другом
pub fn projectile_groups() -> CollisionGroups {
    CollisionGroups::new(
        LAYER_PROJECTILES,
        LAYER_ENVIRONMENT | LAYER_STRUCTURES | LAYER_DEFENSE,
    )
}

/// Connector sensors видны только spatial queries
pub fn connector_groups() -> CollisionGroups {
    CollisionGroups::new(LAYER_CONNECTORS, Group::NONE)
}

pub fn ghost_groups() -> CollisionGroups {
    CollisionGroups::new(LAYER_GHOST, Group::NONE)
}

/// Название слоя для debug логов
pub fn get_layer_name(layer: Group) -> &'static str {
    if layer == LAYER_ENVIRONMENT {
        "Environment"
    } else if layer == LAYER_STRUCTURES {
        "Structures"
    } else if layer == LAYER_CONNECTORS {
        "Connectors"
    } else if layer == LAYER_PROJECTILES {
        "Projectiles"
    } else if layer == LAYER_DEFENSE {
        "Defense"
    } else if layer == LAYER_GHOST {
        "Ghost"
    } else {
        "Unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projectiles_skip_each_other_and_connectors() {
        let groups = projectile_groups();
        assert!(!groups.filters.contains(LAYER_PROJECTILES));
        assert!(!groups.filters.contains(LAYER_CONNECTORS));
        assert!(groups.filters.contains(LAYER_DEFENSE));
    }

    #[test]
    fn test_ghost_and_connectors_collide_with_nothing() {
        assert_eq!(ghost_groups().filters, Group::NONE);
        assert_eq!(connector_groups().filters, Group::NONE);
    }

    #[test]
    fn test_layer_names() {
        assert_eq!(get_layer_name(LAYER_STRUCTURES), "Structures");
        assert_eq!(get_layer_name(LAYER_GHOST), "Ghost");
        assert_eq!(get_layer_name(LAYER_STRUCTURES | LAYER_DEFENSE), "Unknown");
    }
}
