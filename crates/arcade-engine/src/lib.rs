pub mod api;
pub mod core;
pub mod components;
pub mod renderer;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::error::{EngineError, Result};
pub use api::events::{EngineEvent, EventBus};
pub use api::game::{EngineContext, GameConfig, GameLoop, PhysicsConfig, SchedulerConfig};
pub use api::types::{ActorId, GameEvent, SoundEvent};
pub use components::actor::Actor;
pub use components::collider::{Collider, CollisionKind};
pub use components::sprite::{AtlasId, SpriteComponent};
pub use core::physics::PhysicsContext;
pub use core::polygon::{Edge, Polygon};
pub use core::scene::Scene;
pub use core::scheduler::{share, LogicDriver, RenderDriver, Scheduler, SharedGame};
pub use core::time::{FramePacer, TickPlan};
pub use core::vector::{PooledVec, VectorPool};
pub use renderer::{DrawSurface, RedrawRequest, Renderable};

#[cfg(feature = "persistence")]
pub use components::record::ActorRecord;

// Extensions: animation and scripting on top of the scene
pub use extensions::{
    ease, lerp, Easing, Interpolator,
    Tween, TweenTarget, ActorField, CancelToken, TweenHandle, TweenManager,
    Process, ProcessChain, ProcessChains, WaitProcess, CallbackProcess,
};
