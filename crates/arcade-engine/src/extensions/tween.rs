// extensions/tween.rs
//
// Time-driven interpolation of actor fields or arbitrary values.
//
// Usage:
//   let tween = Tween::move_to(ball, Vec2::new(100.0, 0.0), 0.5)?
//       .with_easing(Easing::QuadOut)
//       .on_finish(|| log::info!("arrived"));
//   tweens.add(tween);
//   tweens.update(delta_ms, &mut scene);

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::Vec2;

use super::easing::{lerp, Easing, Interpolator};
use crate::api::error::{EngineError, Result};
use crate::api::types::ActorId;
use crate::components::actor::Actor;
use crate::core::scene::Scene;

/// Invoked exactly once when a tween finishes or is cancelled.
pub type FinishCallback = Box<dyn FnOnce() + Send>;

/// Cancels a tween that something else owns (a manager or a chain).
///
/// The tween notices on its next `update`: it becomes terminal there,
/// fires its finish callback once and leaves animated values where they are.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Scalar actor field a tween can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorField {
    X,
    Y,
    Rotation,
    ScaleX,
    ScaleY,
    Alpha,
}

impl ActorField {
    pub fn read(self, actor: &Actor) -> f32 {
        match self {
            ActorField::X => actor.position.x,
            ActorField::Y => actor.position.y,
            ActorField::Rotation => actor.rotation,
            ActorField::ScaleX => actor.scale.x,
            ActorField::ScaleY => actor.scale.y,
            ActorField::Alpha => actor.alpha,
        }
    }

    /// Write a value. Position writes go through `set_position` so a
    /// collider polygon follows its actor.
    pub fn write(self, actor: &mut Actor, value: f32) {
        match self {
            ActorField::X => actor.set_position(Vec2::new(value, actor.position.y)),
            ActorField::Y => actor.set_position(Vec2::new(actor.position.x, value)),
            ActorField::Rotation => actor.rotation = value,
            ActorField::ScaleX => actor.scale.x = value,
            ActorField::ScaleY => actor.scale.y = value,
            ActorField::Alpha => actor.alpha = value,
        }
    }
}

/// One animated field. `from: None` is captured from the live actor on the
/// tween's first update, so "from wherever it is now" works no matter when
/// the tween starts running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldTween {
    pub field: ActorField,
    pub from: Option<f32>,
    pub to: f32,
}

/// What a tween drives each tick.
pub enum TweenTarget {
    /// Fields of an actor in the scene.
    Actor { actor: ActorId, fields: Vec<FieldTween> },
    /// An external value; `apply` receives the interpolated value.
    Value { from: f32, to: f32, apply: Box<dyn FnMut(f32) + Send> },
    /// Nothing: only time passes (delays, timed callbacks).
    Timer,
}

impl TweenTarget {
    fn apply(&mut self, progress: f32, scene: &mut Scene) -> Result<()> {
        match self {
            TweenTarget::Actor { actor, fields } => {
                let target = scene.get_mut(*actor).ok_or(EngineError::MissingActor(*actor))?;
                for field in fields.iter_mut() {
                    let from = *field.from.get_or_insert_with(|| field.field.read(target));
                    field.field.write(target, lerp(from, field.to, progress));
                }
            }
            TweenTarget::Value { from, to, apply } => apply(lerp(*from, *to, progress)),
            TweenTarget::Timer => {}
        }
        Ok(())
    }
}

impl fmt::Debug for TweenTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TweenTarget::Actor { actor, fields } => f
                .debug_struct("Actor")
                .field("actor", actor)
                .field("fields", fields)
                .finish(),
            TweenTarget::Value { from, to, .. } => {
                f.debug_struct("Value").field("from", from).field("to", to).finish_non_exhaustive()
            }
            TweenTarget::Timer => f.write_str("Timer"),
        }
    }
}

/// A single tween.
///
/// `percent_done` is linear progress clamped to [0, 1]; the interpolator
/// shapes it before it is applied. The tween is terminal once
/// `percent_done == 1`, and the finish callback runs exactly once, on the
/// update (or `cancel`) that makes it terminal.
pub struct Tween {
    /// Seconds.
    duration: f32,
    /// Seconds.
    elapsed: f32,
    percent_done: f32,
    finished: bool,
    interpolator: Box<dyn Interpolator>,
    target: TweenTarget,
    on_finish: Option<FinishCallback>,
    cancel: CancelToken,
}

impl Tween {
    /// Create a tween lasting `duration` seconds. Negative durations are rejected.
    pub fn new(duration: f32, target: TweenTarget) -> Result<Self> {
        if duration.is_nan() || duration < 0.0 {
            return Err(EngineError::NegativeDuration(duration));
        }
        Ok(Self {
            duration,
            elapsed: 0.0,
            percent_done: 0.0,
            finished: false,
            interpolator: Box::new(Easing::Linear),
            target,
            on_finish: None,
            cancel: CancelToken::default(),
        })
    }

    /// Actor tween with no fields yet; add them with [`Tween::animate`].
    pub fn actor(actor: ActorId, duration: f32) -> Result<Self> {
        Self::new(duration, TweenTarget::Actor { actor, fields: Vec::new() })
    }

    /// Tween an external value, handing each interpolated value to `apply`.
    pub fn value(from: f32, to: f32, duration: f32, apply: impl FnMut(f32) + Send + 'static) -> Result<Self> {
        Self::new(duration, TweenTarget::Value { from, to, apply: Box::new(apply) })
    }

    /// A tween that only lets time pass.
    pub fn timer(duration: f32) -> Result<Self> {
        Self::new(duration, TweenTarget::Timer)
    }

    /// Move an actor from wherever it is to `to`.
    pub fn move_to(actor: ActorId, to: Vec2, duration: f32) -> Result<Self> {
        Ok(Self::actor(actor, duration)?
            .animate(ActorField::X, to.x)
            .animate(ActorField::Y, to.y))
    }

    /// Fade an actor from its current alpha to `alpha`.
    pub fn fade_to(actor: ActorId, alpha: f32, duration: f32) -> Result<Self> {
        Ok(Self::actor(actor, duration)?.animate(ActorField::Alpha, alpha))
    }

    /// Scale an actor from its current scale to `scale`.
    pub fn scale_to(actor: ActorId, scale: Vec2, duration: f32) -> Result<Self> {
        Ok(Self::actor(actor, duration)?
            .animate(ActorField::ScaleX, scale.x)
            .animate(ActorField::ScaleY, scale.y))
    }

    // -- Builder methods --

    /// Animate `field` to `to`, starting from its value when the tween first runs.
    /// No effect on non-actor tweens.
    pub fn animate(self, field: ActorField, to: f32) -> Self {
        self.push_field(FieldTween { field, from: None, to })
    }

    /// Animate `field` from an explicit start value.
    pub fn animate_from(self, field: ActorField, from: f32, to: f32) -> Self {
        self.push_field(FieldTween { field, from: Some(from), to })
    }

    fn push_field(mut self, field: FieldTween) -> Self {
        if let TweenTarget::Actor { fields, .. } = &mut self.target {
            fields.push(field);
        }
        self
    }

    pub fn with_easing(mut self, interpolator: impl Interpolator + 'static) -> Self {
        self.interpolator = Box::new(interpolator);
        self
    }

    pub fn on_finish(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_finish = Some(Box::new(callback));
        self
    }

    // -- State --

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn percent_done(&self) -> f32 {
        self.percent_done
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn target(&self) -> &TweenTarget {
        &self.target
    }

    /// Token for cancelling this tween after handing it to a manager or chain.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Advance by `delta_ms` and apply the interpolated values.
    ///
    /// No-op once terminal. A cancelled token makes this update cancel the
    /// tween instead of advancing it. An error (target actor gone) leaves the
    /// tween unfinished and its callback unfired; the caller decides what to do.
    pub fn update(&mut self, delta_ms: f32, scene: &mut Scene) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        if self.cancel.is_cancelled() {
            self.cancel();
            return Ok(());
        }
        self.elapsed += delta_ms / 1000.0;
        self.percent_done = if self.duration > 0.0 {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let progress = self.interpolator.interpolate(self.percent_done);
        self.target.apply(progress, scene)?;

        if self.percent_done >= 1.0 {
            self.finish();
        }
        Ok(())
    }

    /// Jump to the terminal state without touching the animated values.
    /// Fires the finish callback if the tween was still running.
    pub fn cancel(&mut self) {
        if !self.finished {
            self.percent_done = 1.0;
            self.finish();
        }
    }

    /// Terminal without the callback; used when an update failed.
    pub(crate) fn abort(&mut self) {
        self.finished = true;
        self.on_finish = None;
    }

    fn finish(&mut self) {
        self.finished = true;
        if let Some(callback) = self.on_finish.take() {
            callback();
        }
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("percent_done", &self.percent_done)
            .field("finished", &self.finished)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn percent_done_sequence_and_single_finish() {
        let mut scene = Scene::new();
        let (fired, callback) = counter();
        let mut tween = Tween::timer(2.0).unwrap().on_finish(callback);

        let mut seen = Vec::new();
        for dt in [500.0, 1000.0, 700.0] {
            tween.update(dt, &mut scene).unwrap();
            seen.push(tween.percent_done());
            if seen.len() < 3 {
                assert_eq!(fired.load(Ordering::SeqCst), 0);
            }
        }
        assert_eq!(seen, vec![0.25, 0.75, 1.0]);
        assert!(tween.is_finished());
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        tween.update(500.0, &mut scene).unwrap();
        tween.cancel();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn negative_duration_is_rejected() {
        assert!(matches!(Tween::timer(-0.1), Err(EngineError::NegativeDuration(_))));
        assert!(Tween::timer(f32::NAN).is_err());
    }

    #[test]
    fn zero_duration_finishes_on_first_update() {
        let mut scene = Scene::new();
        let (fired, callback) = counter();
        let mut tween = Tween::timer(0.0).unwrap().on_finish(callback);
        tween.update(0.0, &mut scene).unwrap();
        assert!(tween.is_finished());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancel_fires_callback_without_snapping() {
        let mut scene = Scene::new();
        let id = scene.spawn(Actor::new(ActorId(1)));
        let (fired, callback) = counter();
        let mut tween = Tween::actor(id, 1.0)
            .unwrap()
            .animate_from(ActorField::Alpha, 1.0, 0.0)
            .on_finish(callback);

        tween.update(500.0, &mut scene).unwrap();
        tween.cancel();
        assert!(tween.is_finished());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!((scene.get(id).unwrap().alpha - 0.5).abs() < 1e-5);
    }

    #[test]
    fn cancelled_token_stops_the_next_update() {
        let mut scene = Scene::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let (fired, callback) = counter();
        let mut tween = Tween::value(0.0, 10.0, 1.0, move |v| sink.lock().unwrap().push(v))
            .unwrap()
            .on_finish(callback);
        let token = tween.cancel_token();

        tween.update(250.0, &mut scene).unwrap();
        token.cancel();
        tween.update(250.0, &mut scene).unwrap();
        tween.update(250.0, &mut scene).unwrap();

        assert!(tween.is_finished());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!((tween.elapsed() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn any_update_sequence_reaching_the_duration_finishes_once() {
        // xorshift64, seeded, so failures reproduce.
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = move |bound: u32| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % u64::from(bound)) as u32
        };

        let mut scene = Scene::new();
        for case in 0..500 {
            let duration = next(5000) as f32 / 1000.0;
            let (fired, callback) = counter();
            let mut tween = Tween::timer(duration).unwrap().on_finish(callback);

            let mut total_ms = 0.0_f32;
            let mut finishes = 0;
            while total_ms < duration * 1000.0 + 1.0 {
                let dt = next(400) as f32;
                let was_finished = tween.is_finished();
                tween.update(dt, &mut scene).unwrap();
                total_ms += dt;
                if tween.is_finished() && !was_finished {
                    finishes += 1;
                }
                assert!((0.0..=1.0).contains(&tween.percent_done()), "case {case}");
            }
            // A few more updates after the end change nothing.
            for _ in 0..3 {
                tween.update(next(400) as f32, &mut scene).unwrap();
            }

            assert!(tween.is_finished(), "case {case}: {duration}s after {total_ms}ms");
            assert_eq!(finishes, 1, "case {case}");
            assert_eq!(fired.load(Ordering::SeqCst), 1, "case {case}");
        }
    }

    #[test]
    fn actor_tween_captures_start_lazily() {
        let mut scene = Scene::new();
        let id = scene.spawn(Actor::new(ActorId(1)));
        let mut tween = Tween::move_to(id, Vec2::new(100.0, 0.0), 1.0).unwrap();

        // The actor moves before the tween first runs.
        scene.get_mut(id).unwrap().set_position(Vec2::new(50.0, 0.0));

        tween.update(500.0, &mut scene).unwrap();
        assert!((scene.get(id).unwrap().position.x - 75.0).abs() < 1e-4);
        tween.update(500.0, &mut scene).unwrap();
        assert!((scene.get(id).unwrap().position.x - 100.0).abs() < 1e-4);
    }

    #[test]
    fn value_tween_uses_easing() {
        let mut scene = Scene::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut tween = Tween::value(0.0, 10.0, 1.0, move |v| sink.lock().unwrap().push(v))
            .unwrap()
            .with_easing(Easing::QuadIn);

        tween.update(500.0, &mut scene).unwrap();
        tween.update(500.0, &mut scene).unwrap();
        let seen = seen.lock().unwrap();
        assert!((seen[0] - 2.5).abs() < 1e-5);
        assert!((seen[1] - 10.0).abs() < 1e-5);
    }

    #[test]
    fn missing_actor_is_an_error() {
        let mut scene = Scene::new();
        let mut tween = Tween::fade_to(ActorId(42), 0.0, 1.0).unwrap();
        let err = tween.update(16.0, &mut scene).unwrap_err();
        assert!(matches!(err, EngineError::MissingActor(ActorId(42))));
        assert!(!tween.is_finished());
    }
}
