//! Tests for attack tool systems.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::prelude::*;
    use bevy::time::TimeUpdateStrategy;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::attack::*;
    use crate::config::GameConfig;
    use crate::round::{PhaseChangeReason, PhaseChangeRequest};

    #[derive(Resource, Default)]
    struct SeenRequests(Vec<PhaseChangeReason>);

    fn collect_requests(mut requests: EventReader<PhaseChangeRequest>, mut seen: ResMut<SeenRequests>) {
        seen.0.extend(requests.read().map(|request| request.reason));
    }

    fn exhausted_app(current_ammo: u32) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs(1)))
            .insert_resource(GameConfig::default())
            .insert_resource(Ammo {
                current: current_ammo,
                max: 10,
            })
            .insert_resource(AttackTool {
                enabled: true,
                exhausted_timer: None,
            })
            .init_resource::<SeenRequests>()
            .add_event::<PhaseChangeRequest>()
            .add_systems(Update, (tick_ammo_exhausted, collect_requests).chain());
        // Virtual time clamps deltas to 250ms by default; let the 1s manual step through.
        app.world_mut()
            .resource_mut::<Time<Virtual>>()
            .set_max_delta(Duration::from_secs(10));
        app
    }

    #[test]
    fn test_random_in_unit_sphere_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            assert!(random_in_unit_sphere(&mut rng).length() <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn test_random_in_unit_sphere_is_seeded() {
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..20 {
            assert_eq!(random_in_unit_sphere(&mut a), random_in_unit_sphere(&mut b));
        }
    }

    #[test]
    fn test_exhausted_timer_requests_defender_after_delay() {
        let mut app = exhausted_app(0);

        for _ in 0..3 {
            app.update();
        }
        assert!(app.world().resource::<SeenRequests>().0.is_empty());
        assert!(app.world().resource::<AttackTool>().exhausted_timer.is_some());

        for _ in 0..5 {
            app.update();
        }
        let seen = &app.world().resource::<SeenRequests>().0;
        assert_eq!(seen.first(), Some(&PhaseChangeReason::AmmoExhausted));
    }

    #[test]
    fn test_timer_idle_while_ammo_left() {
        let mut app = exhausted_app(1);

        for _ in 0..10 {
            app.update();
        }

        assert!(app.world().resource::<SeenRequests>().0.is_empty());
        assert!(app.world().resource::<AttackTool>().exhausted_timer.is_none());
    }
}
