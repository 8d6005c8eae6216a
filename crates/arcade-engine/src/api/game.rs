use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[cfg(feature = "persistence")]
use crate::api::error::Result;
use crate::api::events::EventBus;
use crate::core::physics::PhysicsContext;
use crate::core::scene::Scene;
use crate::core::vector::VectorPool;
use crate::extensions::process::ProcessChains;
use crate::extensions::tween_manager::{TweenHandle, TweenManager};
use crate::renderer::traits::DrawSurface;

/// Scheduler tuning: the fixed logic rate, the render-invalidate rate and
/// the load-shedding policy applied to measured frame deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Logic ticks per second (default: 60).
    pub logic_hz: f32,
    /// Redraw requests per second (default: 120).
    pub render_hz: f32,
    /// Upper bound on a measured logic delta in milliseconds (default: 100).
    /// After a stall the game visibly slows down instead of skipping time.
    pub max_delta_ms: f32,
    /// Global speed multiplier applied to every delta (default: 1.0).
    pub speed: f32,
    /// Run logic on 1 out of every `frame_skip` ticks (default: 1 = every tick).
    pub frame_skip: u32,
    /// Floor for the delay before the next tick in milliseconds (default: 1).
    pub min_delay_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            logic_hz: 60.0,
            render_hz: 120.0,
            max_delta_ms: 100.0,
            speed: 1.0,
            frame_skip: 1,
            min_delay_ms: 1,
        }
    }
}

/// Tuning shared by the collision resolvers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity magnitude in world units per second squared. Sticky surfaces
    /// decelerate at `stickiness * gravity`.
    pub gravity: f32,
    /// Normal impact speed above which a bounce publishes vibrate + sound.
    pub impact_feedback_speed: f32,
    /// Below this speed sticky surfaces brake harder.
    pub slow_stick_speed: f32,
    /// Braking multiplier applied below `slow_stick_speed`.
    pub slow_stick_multiplier: f32,
    /// Vibration length requested on a hard impact.
    pub vibrate_ms: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 980.0,
            impact_feedback_speed: 400.0,
            slow_stick_speed: 50.0,
            slow_stick_multiplier: 3.0,
            vibrate_ms: 20,
        }
    }
}

/// Configuration for a mini-game, provided by the game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub scheduler: SchedulerConfig,
    pub physics: PhysicsConfig,
}

impl GameConfig {
    /// Parse a (possibly partial) JSON document; missing fields keep their defaults.
    #[cfg(feature = "persistence")]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The per-game model the scheduler drives once per logic tick.
///
/// Implementations update all of their actors (which resolve collisions and
/// advance tweens and process chains). Drawing happens elsewhere and only
/// reads the state left behind by the last `update`.
pub trait GameLoop: Send {
    fn update(&mut self, delta_ms: f32);
}

impl<F> GameLoop for F
where
    F: FnMut(f32) + Send,
{
    fn update(&mut self, delta_ms: f32) {
        self(delta_ms)
    }
}

/// Everything one mini-game owns: its actors, animations, scripted
/// sequences and the shared collaborators they talk to.
///
/// Games either wrap a context in their own [`GameLoop`] type or hand it to
/// the scheduler directly.
pub struct EngineContext {
    pub scene: Scene,
    pub tweens: TweenManager,
    pub chains: ProcessChains,
    pub bus: Arc<EventBus>,
    pub pool: Arc<VectorPool>,
    pub config: GameConfig,
}

impl EngineContext {
    pub fn new(config: GameConfig) -> Self {
        Self::with_bus(config, Arc::new(EventBus::new()))
    }

    /// Context publishing to an existing bus, so the platform layer can
    /// subscribe before the game is built.
    pub fn with_bus(config: GameConfig, bus: Arc<EventBus>) -> Self {
        Self {
            scene: Scene::new(),
            tweens: TweenManager::new(),
            chains: ProcessChains::new(),
            bus,
            pool: Arc::new(VectorPool::new()),
            config,
        }
    }

    /// Handle for queueing tweens from callbacks and processes.
    pub fn tween_handle(&self) -> TweenHandle {
        self.tweens.handle()
    }

    /// One logic tick: integrate and collide, then advance tweens, then
    /// process chains. Returns the number of collision responses applied.
    pub fn update(&mut self, delta_ms: f32) -> usize {
        let ctx = PhysicsContext {
            config: &self.config.physics,
            bus: &self.bus,
            pool: &self.pool,
        };
        let contacts = self.scene.update(delta_ms, &ctx);
        self.tweens.update(delta_ms, &mut self.scene);
        self.chains.update(delta_ms, &mut self.scene);
        contacts
    }

    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        self.scene.draw(surface);
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl GameLoop for EngineContext {
    fn update(&mut self, delta_ms: f32) {
        EngineContext::update(self, delta_ms);
    }
}
