//! Polygon collision response: impulse bounces, sticky drag and triggers.
//!
//! Not a general rigid-body solver: bodies are point masses with no
//! rotational inertia, and every check is a linear scan driven by `Scene`.

use glam::Vec2;

use crate::api::events::EventBus;
use crate::api::game::PhysicsConfig;
use crate::api::types::{GameEvent, SoundEvent};
use crate::components::actor::Actor;
use crate::components::collider::{Collider, CollisionKind};
use crate::core::polygon::Polygon;
use crate::core::vector::VectorPool;

/// Shared collaborators for one collision pass.
pub struct PhysicsContext<'a> {
    pub config: &'a PhysicsConfig,
    pub bus: &'a EventBus,
    pub pool: &'a VectorPool,
}

/// Resolve `other` against the collider owned by `body`.
///
/// Returns whether `other`'s position was moved, so callers know the
/// frame's integration has been reconciled.
pub fn collide(body: &mut Actor, other: &mut Actor, delta_ms: f32, ctx: &PhysicsContext) -> bool {
    let Some(mut collider) = body.collider.take() else {
        return false;
    };
    let moved = if collider.enabled {
        apply(&mut collider, body, other, delta_ms, ctx)
    } else {
        collider.clear_occupants();
        false
    };
    body.collider = Some(collider);
    moved
}

fn apply(collider: &mut Collider, body: &mut Actor, other: &mut Actor, delta_ms: f32, ctx: &PhysicsContext) -> bool {
    match collider.kind {
        CollisionKind::Bounce => resolve_bounce(&collider.polygon, body, other, delta_ms, ctx),
        CollisionKind::Sticky { stickiness } => {
            apply_sticky(&collider.polygon, stickiness, other, delta_ms, ctx.config);
            false
        }
        CollisionKind::Trigger => {
            let inside = collider.polygon.contains(other.position);
            if collider.track(other.id, inside) {
                ctx.bus.game_event(GameEvent::contact(body.id, other.id));
            }
            false
        }
    }
}

/// Impulse-based bounce of `other` off `polygon` (owned by `body`).
///
/// 1. Bounding-box early out (skipped for inverted polygons).
/// 2. Find the edge crossed by `other` this frame; its quarter-turn is the
///    normal, oriented back toward where `other` came from.
/// 3. Separating bodies (`relative . normal >= 0`) are left alone.
/// 4. Push `other` back out along the normal, or all the way back to its
///    pre-frame position if the push would cross a different edge.
/// 5. Exchange the impulse `j = -(1 + e) * v_n / (im_a + im_b)`.
pub fn resolve_bounce(
    polygon: &Polygon,
    body: &mut Actor,
    other: &mut Actor,
    delta_ms: f32,
    ctx: &PhysicsContext,
) -> bool {
    if !polygon.is_inverted() && !polygon.bounds_contain(other.position) {
        return false;
    }

    let Some(edge) = polygon.intersecting_edge(other.position, other.position_before_frame) else {
        return false;
    };

    let mut relative = ctx.pool.acquire_from(other.velocity);
    relative.subtract(body.velocity);

    let mut normal = ctx.pool.acquire_from(edge.direction());
    normal.to_normal().normalize();
    if normal.dot(other.position - other.position_before_frame) > 0.0 {
        normal.scale(-1.0);
    }
    let n = normal.get();

    let along_normal = relative.dot(n);
    ctx.pool.release(relative);
    ctx.pool.release(normal);

    if along_normal >= 0.0 {
        return false;
    }

    if along_normal < -ctx.config.impact_feedback_speed {
        ctx.bus.vibrate(ctx.config.vibrate_ms);
        ctx.bus.play_sound(SoundEvent::IMPACT);
    }

    // Undo this frame's travel along the normal, plus one unit so float
    // error cannot leave the point on the edge.
    let start = other.position;
    let seconds = delta_ms / 1000.0;
    let corrected = other.position + n * (-along_normal * seconds + 1.0);
    other.position = match polygon.intersecting_edge(other.position_before_frame, corrected) {
        Some(crossed) if crossed.index != edge.index => other.position_before_frame,
        _ => corrected,
    };

    let restitution = other.restitution.min(body.restitution);
    let inverse_mass_sum = other.inverse_mass + body.inverse_mass;
    if inverse_mass_sum > 0.0 {
        let j = -(1.0 + restitution) * along_normal / inverse_mass_sum;
        other.velocity += n * (j * other.inverse_mass);
        body.velocity -= n * (j * body.inverse_mass);
    }

    other.position != start
}

/// Decelerate `other` while it is inside `polygon` and moving.
///
/// Braking is `stickiness * gravity` per second, multiplied below the slow
/// speed threshold. Velocity snaps to zero instead of reversing.
pub fn apply_sticky(polygon: &Polygon, stickiness: f32, other: &mut Actor, delta_ms: f32, config: &PhysicsConfig) {
    if !polygon.contains(other.position) {
        return;
    }
    let speed = other.velocity.length();
    if speed == 0.0 {
        return;
    }

    let mut rate = stickiness * config.gravity;
    if speed < config.slow_stick_speed {
        rate *= config.slow_stick_multiplier;
    }
    let braking = rate * delta_ms / 1000.0;
    if braking >= speed {
        other.velocity = Vec2::ZERO;
    } else {
        other.velocity -= other.velocity / speed * braking;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::events::EngineEvent;
    use crate::api::types::ActorId;

    const DT: f32 = 1000.0 / 60.0;

    fn ctx_parts() -> (PhysicsConfig, EventBus, VectorPool) {
        (PhysicsConfig::default(), EventBus::new(), VectorPool::new())
    }

    /// A floor whose top edge is y = 0, spanning x in [0, 100].
    fn floor(restitution: f32) -> Actor {
        let poly = Polygon::rect(Vec2::ZERO, Vec2::new(100.0, 50.0));
        Actor::fixture(ActorId(1), Collider::bounce(poly)).with_restitution(restitution)
    }

    /// A ball that crossed the floor's top edge this frame, moving down.
    fn falling_ball(velocity: Vec2) -> Actor {
        let mut ball = Actor::new(ActorId(2)).with_velocity(velocity);
        ball.position_before_frame = Vec2::new(50.0, -3.0);
        ball.position = Vec2::new(50.0, 2.0);
        ball
    }

    #[test]
    fn elastic_bounce_off_immovable_floor() {
        let (config, bus, pool) = ctx_parts();
        let ctx = PhysicsContext { config: &config, bus: &bus, pool: &pool };
        let mut wall = floor(1.0);
        let mut ball = falling_ball(Vec2::new(0.0, 300.0));

        let moved = collide(&mut wall, &mut ball, DT, &ctx);

        assert!(moved);
        assert!((ball.velocity.x - 0.0).abs() < 1e-3);
        assert!((ball.velocity.y + 300.0).abs() < 1e-3);
        assert_eq!(wall.velocity, Vec2::ZERO);
        // Pushed back above the edge.
        assert!(ball.position.y < 0.0);
    }

    #[test]
    fn restitution_uses_the_smaller_value() {
        let (config, bus, pool) = ctx_parts();
        let ctx = PhysicsContext { config: &config, bus: &bus, pool: &pool };
        let mut wall = floor(1.0);
        let mut ball = falling_ball(Vec2::new(0.0, 200.0)).with_restitution(0.5);

        collide(&mut wall, &mut ball, DT, &ctx);
        assert!((ball.velocity.y + 100.0).abs() < 1e-3);
    }

    #[test]
    fn immovable_other_reflects_the_body() {
        let (config, bus, pool) = ctx_parts();
        let ctx = PhysicsContext { config: &config, bus: &bus, pool: &pool };
        let mut paddle = floor(0.5);
        paddle.inverse_mass = 1.0;
        paddle.velocity = Vec2::new(0.0, -300.0);

        let mut post = falling_ball(Vec2::ZERO).with_mass(f32::INFINITY);
        collide(&mut paddle, &mut post, DT, &ctx);

        assert_eq!(post.velocity, Vec2::ZERO);
        assert!((paddle.velocity.y - 150.0).abs() < 1e-3);
    }

    #[test]
    fn equal_mass_elastic_conserves_energy() {
        let (config, bus, pool) = ctx_parts();
        let ctx = PhysicsContext { config: &config, bus: &bus, pool: &pool };
        let mut block = floor(1.0);
        block.inverse_mass = 1.0;
        block.velocity = Vec2::new(0.0, -40.0);
        let mut ball = falling_ball(Vec2::new(0.0, 120.0));

        let before = block.velocity.y.powi(2) + ball.velocity.y.powi(2);
        collide(&mut block, &mut ball, DT, &ctx);
        let after = block.velocity.y.powi(2) + ball.velocity.y.powi(2);

        assert!((before - after).abs() < 1e-2, "before {before}, after {after}");
        // Equal masses swap normal velocities.
        assert!((ball.velocity.y + 40.0).abs() < 1e-3);
        assert!((block.velocity.y - 120.0).abs() < 1e-3);
    }

    #[test]
    fn separating_actor_is_ignored() {
        let (config, bus, pool) = ctx_parts();
        let ctx = PhysicsContext { config: &config, bus: &bus, pool: &pool };
        let mut wall = floor(1.0);
        // Still below the edge after last frame's bounce, already moving up.
        let mut ball = falling_ball(Vec2::new(0.0, -300.0));

        assert!(!collide(&mut wall, &mut ball, DT, &ctx));
        assert_eq!(ball.velocity, Vec2::new(0.0, -300.0));
        assert_eq!(ball.position, Vec2::new(50.0, 2.0));
    }

    #[test]
    fn outside_bounds_is_no_collision() {
        let (config, bus, pool) = ctx_parts();
        let ctx = PhysicsContext { config: &config, bus: &bus, pool: &pool };
        let mut wall = floor(1.0);
        let mut ball = Actor::new(ActorId(2))
            .with_position(Vec2::new(500.0, 0.0))
            .with_velocity(Vec2::new(0.0, 300.0));
        assert!(!collide(&mut wall, &mut ball, DT, &ctx));
    }

    #[test]
    fn hard_impacts_publish_feedback() {
        let (config, bus, pool) = ctx_parts();
        let events = bus.subscribe();
        let ctx = PhysicsContext { config: &config, bus: &bus, pool: &pool };

        let mut wall = floor(1.0);
        let mut soft = falling_ball(Vec2::new(0.0, 100.0));
        collide(&mut wall, &mut soft, DT, &ctx);
        assert_eq!(events.try_iter().count(), 0);

        let mut hard = falling_ball(Vec2::new(0.0, 900.0));
        collide(&mut wall, &mut hard, DT, &ctx);
        let got: Vec<_> = events.try_iter().collect();
        assert_eq!(got, vec![
            EngineEvent::Vibrate { millis: config.vibrate_ms },
            EngineEvent::Sound(SoundEvent::IMPACT),
        ]);
    }

    #[test]
    fn corner_correction_reverts_to_pre_frame_position() {
        let (config, bus, pool) = ctx_parts();
        let ctx = PhysicsContext { config: &config, bus: &bus, pool: &pool };
        // A narrow inverted arena: actors live inside the strip 0 <= y <= 2.
        let poly = Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 2.0),
            Vec2::new(0.0, 2.0),
        ])
        .unwrap()
        .inverted();
        let mut arena = Actor::fixture(ActorId(1), Collider::bounce(poly));

        // Escaping through the top edge fast enough that pushing back along
        // the normal would overshoot the bottom edge.
        let mut ball = Actor::new(ActorId(2)).with_velocity(Vec2::new(0.0, -600.0));
        ball.position_before_frame = Vec2::new(50.0, 1.0);
        ball.position = Vec2::new(50.0, -3.0);

        let moved = collide(&mut arena, &mut ball, DT, &ctx);
        assert!(moved);
        assert_eq!(ball.position, Vec2::new(50.0, 1.0));
        assert!((ball.velocity.y - 600.0).abs() < 1e-3);
    }

    #[test]
    fn inverted_arena_keeps_actor_inside() {
        let (config, bus, pool) = ctx_parts();
        let ctx = PhysicsContext { config: &config, bus: &bus, pool: &pool };
        let poly = Polygon::rect(Vec2::ZERO, Vec2::new(100.0, 100.0)).inverted();
        let mut arena = Actor::fixture(ActorId(1), Collider::bounce(poly));

        let mut ball = Actor::new(ActorId(2)).with_velocity(Vec2::new(0.0, -300.0));
        ball.position_before_frame = Vec2::new(50.0, 2.0);
        ball.position = Vec2::new(50.0, -3.0);

        assert!(collide(&mut arena, &mut ball, DT, &ctx));
        assert!((ball.position.y - 3.0).abs() < 1e-3);
        assert!((ball.velocity.y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn disabled_collider_is_skipped() {
        let (config, bus, pool) = ctx_parts();
        let ctx = PhysicsContext { config: &config, bus: &bus, pool: &pool };
        let mut wall = floor(1.0);
        wall.collider.as_mut().unwrap().toggle();
        let mut ball = falling_ball(Vec2::new(0.0, 300.0));

        assert!(!collide(&mut wall, &mut ball, DT, &ctx));
        assert_eq!(ball.velocity, Vec2::new(0.0, 300.0));
        assert!(wall.collider.is_some());
    }

    #[test]
    fn sticky_brakes_and_snaps_to_zero() {
        let config = PhysicsConfig::default();
        let patch = Polygon::rect(Vec2::ZERO, Vec2::new(100.0, 100.0));
        let mut ball = Actor::new(ActorId(2))
            .with_position(Vec2::new(50.0, 50.0))
            .with_velocity(Vec2::new(600.0, 0.0));

        // 0.1 * 980 = 98 units/s^2; 100 ms -> 9.8
        apply_sticky(&patch, 0.1, &mut ball, 100.0, &config);
        assert!((ball.velocity.x - 590.2).abs() < 1e-2);
        assert_eq!(ball.velocity.y, 0.0);

        // Slow: braking is tripled and overshoot snaps to zero.
        ball.velocity = Vec2::new(10.0, 0.0);
        apply_sticky(&patch, 0.1, &mut ball, 100.0, &config);
        assert_eq!(ball.velocity, Vec2::ZERO);
    }

    #[test]
    fn sticky_ignores_actors_outside() {
        let config = PhysicsConfig::default();
        let patch = Polygon::rect(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let mut ball = Actor::new(ActorId(2))
            .with_position(Vec2::new(50.0, 50.0))
            .with_velocity(Vec2::new(10.0, 0.0));
        apply_sticky(&patch, 1.0, &mut ball, 100.0, &config);
        assert_eq!(ball.velocity, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn trigger_reports_contact() {
        let (config, bus, pool) = ctx_parts();
        let events = bus.subscribe();
        let ctx = PhysicsContext { config: &config, bus: &bus, pool: &pool };
        let goal = Polygon::rect(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let mut zone = Actor::fixture(ActorId(7), Collider::trigger(goal));
        let mut ball = Actor::new(ActorId(8)).with_position(Vec2::new(5.0, 5.0));

        assert!(!collide(&mut zone, &mut ball, DT, &ctx));
        assert_eq!(
            events.try_recv().unwrap(),
            EngineEvent::Game(GameEvent::contact(ActorId(7), ActorId(8)))
        );
    }

    #[test]
    fn trigger_reports_entry_once_per_visit() {
        let (config, bus, pool) = ctx_parts();
        let events = bus.subscribe();
        let ctx = PhysicsContext { config: &config, bus: &bus, pool: &pool };
        let goal = Polygon::rect(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let mut zone = Actor::fixture(ActorId(7), Collider::trigger(goal));
        let mut ball = Actor::new(ActorId(8)).with_position(Vec2::new(5.0, 5.0));

        for _ in 0..5 {
            collide(&mut zone, &mut ball, DT, &ctx);
        }
        assert_eq!(events.try_iter().count(), 1);
        assert_eq!(zone.collider.as_ref().unwrap().occupants(), &[ActorId(8)]);

        // Leave, then come back.
        ball.set_position(Vec2::new(50.0, 5.0));
        collide(&mut zone, &mut ball, DT, &ctx);
        assert!(zone.collider.as_ref().unwrap().occupants().is_empty());
        ball.set_position(Vec2::new(5.0, 5.0));
        collide(&mut zone, &mut ball, DT, &ctx);
        collide(&mut zone, &mut ball, DT, &ctx);
        assert_eq!(events.try_iter().count(), 1);

        // Switching the trigger off and on reports whoever is inside again.
        zone.collider.as_mut().unwrap().toggle();
        collide(&mut zone, &mut ball, DT, &ctx);
        assert_eq!(events.try_iter().count(), 0);
        zone.collider.as_mut().unwrap().toggle();
        collide(&mut zone, &mut ball, DT, &ctx);
        assert_eq!(events.try_iter().count(), 1);
    }
}
