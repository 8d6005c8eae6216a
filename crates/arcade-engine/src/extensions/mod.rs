// extensions/mod.rs
//
// Animation and scripting on top of the scene: easing curves, tweens, the
// tween manager and process chains. Games opt in by owning these systems
// (EngineContext owns one of each).

pub mod easing;
pub mod process;
pub mod tween;
pub mod tween_manager;

pub use easing::{ease, lerp, Easing, Interpolator};
pub use process::{CallbackProcess, Process, ProcessChain, ProcessChains, WaitProcess};
pub use tween::{ActorField, CancelToken, FieldTween, FinishCallback, Tween, TweenTarget};
pub use tween_manager::{TweenHandle, TweenManager, TweenStats};
