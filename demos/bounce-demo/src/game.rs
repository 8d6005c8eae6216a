use std::fmt::Write;

use arcade_engine::{
    Actor, ActorField, ActorId, AtlasId, Collider, DrawSurface, EngineContext, Easing, GameConfig, GameLoop, Polygon,
    ProcessChain, Result, Scene, SpriteComponent, Tween,
};
use glam::Vec2;
use log::debug;

// Arena
const ARENA_W: f32 = 400.0;
const ARENA_H: f32 = 300.0;

// Sticky patch on the right half of the floor
const STICKY_H: f32 = 20.0;
const STICKINESS: f32 = 0.3;

// Gate in the middle of the arena, toggled by a script
const GATE_W: f32 = 10.0;
const GATE_TOGGLE_MS: f32 = 400.0;

const BALL_ATLAS: AtlasId = AtlasId(0);
const BALL_SIZE: f32 = 16.0;
const BALLS: [(Vec2, Vec2, f32); 3] = [
    (Vec2::new(60.0, 60.0), Vec2::new(420.0, 250.0), 1.0),
    (Vec2::new(300.0, 80.0), Vec2::new(-300.0, 500.0), 0.8),
    (Vec2::new(200.0, 200.0), Vec2::new(150.0, -380.0), 0.6),
];

/// The demo's model: an engine context plus a little game state.
pub struct BounceGame {
    pub ctx: EngineContext,
    gate: ActorId,
    ticks: u64,
}

impl BounceGame {
    pub fn new(config: GameConfig) -> Result<Self> {
        let mut ctx = EngineContext::new(config);

        let walls = ctx.scene.next_id();
        let arena = Polygon::rect(Vec2::ZERO, Vec2::new(ARENA_W, ARENA_H)).inverted();
        ctx.scene.spawn(Actor::fixture(walls, Collider::bounce(arena)).with_tag("walls"));

        let patch = ctx.scene.next_id();
        let sticky = Polygon::rect(Vec2::new(ARENA_W / 2.0, ARENA_H - STICKY_H), Vec2::new(ARENA_W / 2.0, STICKY_H));
        ctx.scene.spawn(Actor::fixture(patch, Collider::sticky(sticky, STICKINESS)).with_tag("mud"));

        let gate = ctx.scene.next_id();
        let bar = Polygon::rect(Vec2::new((ARENA_W - GATE_W) / 2.0, ARENA_H / 3.0), Vec2::new(GATE_W, ARENA_H / 3.0));
        ctx.scene.spawn(Actor::fixture(gate, Collider::bounce(bar)).with_tag("gate"));

        let goal = ctx.scene.next_id();
        let zone = Polygon::rect(Vec2::ZERO, Vec2::new(40.0, 40.0));
        ctx.scene.spawn(Actor::fixture(goal, Collider::trigger(zone)).with_tag("goal"));

        for (i, (position, velocity, restitution)) in BALLS.into_iter().enumerate() {
            let id = ctx.scene.next_id();
            let sprite = SpriteComponent::new(BALL_ATLAS, vec![0, 1, 2, 1], Vec2::splat(BALL_SIZE));
            ctx.scene.spawn(
                Actor::new(id)
                    .with_tag(format!("ball{i}"))
                    .with_position(position)
                    .with_velocity(velocity)
                    .with_restitution(restitution)
                    .with_z_index(1)
                    .with_sprite(sprite),
            );
            // Fade in.
            ctx.tweens.add(
                Tween::actor(id, 0.5)?
                    .animate_from(ActorField::Alpha, 0.0, 1.0)
                    .with_easing(Easing::QuadOut),
            );
        }

        let mut game = Self { ctx, gate, ticks: 0 };
        game.schedule_gate();
        Ok(game)
    }

    /// Toggle the gate on a repeating script.
    fn schedule_gate(&mut self) {
        let gate = self.gate;
        self.ctx.chains.add(
            ProcessChain::new()
                .then_wait(GATE_TOGGLE_MS)
                .then_call(move |scene: &mut Scene| toggle_gate(scene, gate))
                .then_wait(GATE_TOGGLE_MS)
                .then_call(move |scene: &mut Scene| toggle_gate(scene, gate)),
        );
    }
}

fn toggle_gate(scene: &mut Scene, gate: ActorId) {
    if let Some(collider) = scene.get_mut(gate).and_then(|a| a.collider.as_mut()) {
        let open = !collider.toggle();
        debug!("gate {}", if open { "open" } else { "closed" });
    }
}

impl GameLoop for BounceGame {
    fn update(&mut self, delta_ms: f32) {
        self.ctx.update(delta_ms);
        self.ticks += 1;
        if self.ctx.chains.is_empty() {
            self.schedule_gate();
        }
        // Sprites cycle every 10 logic ticks.
        if self.ticks % 10 == 0 {
            for actor in self.ctx.scene.iter_mut() {
                if let Some(sprite) = &mut actor.sprite {
                    sprite.advance_frame();
                }
            }
        }
    }
}

/// Draw surface that prints a one-line summary of every sprite.
#[derive(Default)]
pub struct ConsoleSurface {
    line: String,
}

impl ConsoleSurface {
    pub fn finish(self) -> String {
        self.line
    }
}

impl DrawSurface for ConsoleSurface {
    fn draw_sprite(&mut self, actor: &Actor, sprite: &SpriteComponent) {
        let _ = write!(
            self.line,
            "[{} ({:.0},{:.0}) a={:.2} f={:?}] ",
            actor.tag,
            actor.position.x,
            actor.position.y,
            actor.alpha,
            sprite.current_frame()
        );
    }
}
