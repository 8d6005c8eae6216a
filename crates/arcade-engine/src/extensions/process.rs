// extensions/process.rs
//
// Sequential scripting: a ProcessChain runs one step at a time (wait,
// callback, tween...) and only moves on once the current step reports it
// is finished.
//
// Usage:
//   let chain = ProcessChain::new()
//       .then_tween(Tween::fade_to(id, 0.0, 0.3)?)
//       .then_wait(500.0)
//       .then_call(move |scene| { scene.despawn(id); });
//   chains.add(chain);

use std::collections::VecDeque;
use std::fmt;

use log::warn;

use super::tween::Tween;
use crate::core::scene::Scene;

/// One step of a chain.
pub trait Process: Send {
    fn update_logic(&mut self, delta_ms: f32, scene: &mut Scene);
    fn is_finished(&self) -> bool;
}

/// Finishes after `duration_ms` of accumulated updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitProcess {
    remaining_ms: f32,
}

impl WaitProcess {
    pub fn new(duration_ms: f32) -> Self {
        Self { remaining_ms: duration_ms }
    }
}

impl Process for WaitProcess {
    fn update_logic(&mut self, delta_ms: f32, _scene: &mut Scene) {
        self.remaining_ms -= delta_ms;
    }

    fn is_finished(&self) -> bool {
        self.remaining_ms <= 0.0
    }
}

/// Runs a closure once, on its first update.
pub struct CallbackProcess {
    callback: Option<Box<dyn FnOnce(&mut Scene) + Send>>,
}

impl CallbackProcess {
    pub fn new(callback: impl FnOnce(&mut Scene) + Send + 'static) -> Self {
        Self { callback: Some(Box::new(callback)) }
    }
}

impl Process for CallbackProcess {
    fn update_logic(&mut self, _delta_ms: f32, scene: &mut Scene) {
        if let Some(callback) = self.callback.take() {
            callback(scene);
        }
    }

    fn is_finished(&self) -> bool {
        self.callback.is_none()
    }
}

impl fmt::Debug for CallbackProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackProcess")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

/// A tween is a process that finishes when the tween does. A failing
/// update is logged and ends the step so the chain keeps moving.
impl Process for Tween {
    fn update_logic(&mut self, delta_ms: f32, scene: &mut Scene) {
        if let Err(err) = self.update(delta_ms, scene) {
            warn!("aborting tween step: {err}");
            self.abort();
        }
    }

    fn is_finished(&self) -> bool {
        Tween::is_finished(self)
    }
}

/// FIFO of processes. Only the head is ever updated; it is dequeued on the
/// update that finishes it, and its successor starts on the next update.
#[derive(Default)]
pub struct ProcessChain {
    queue: VecDeque<Box<dyn Process>>,
}

impl ProcessChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, process: impl Process + 'static) {
        self.queue.push_back(Box::new(process));
    }

    // -- Builder methods --

    pub fn then(mut self, process: impl Process + 'static) -> Self {
        self.push(process);
        self
    }

    pub fn then_wait(self, duration_ms: f32) -> Self {
        self.then(WaitProcess::new(duration_ms))
    }

    pub fn then_call(self, callback: impl FnOnce(&mut Scene) + Send + 'static) -> Self {
        self.then(CallbackProcess::new(callback))
    }

    pub fn then_tween(self, tween: Tween) -> Self {
        self.then(tween)
    }

    /// Processes left, including the one running.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn update(&mut self, delta_ms: f32, scene: &mut Scene) {
        let Some(head) = self.queue.front_mut() else {
            return;
        };
        head.update_logic(delta_ms, scene);
        if head.is_finished() {
            self.queue.pop_front();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Chains nest: a chain can be a step of another chain.
impl Process for ProcessChain {
    fn update_logic(&mut self, delta_ms: f32, scene: &mut Scene) {
        self.update(delta_ms, scene);
    }

    fn is_finished(&self) -> bool {
        ProcessChain::is_finished(self)
    }
}

impl fmt::Debug for ProcessChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessChain").field("len", &self.queue.len()).finish()
    }
}

/// Independent chains advanced together once per tick.
#[derive(Debug, Default)]
pub struct ProcessChains {
    chains: Vec<ProcessChain>,
}

impl ProcessChains {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, chain: ProcessChain) {
        self.chains.push(chain);
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn clear(&mut self) {
        self.chains.clear();
    }

    /// Prune finished chains, then update the rest. Pruning is its own pass
    /// so removal never happens while the update pass iterates.
    pub fn update(&mut self, delta_ms: f32, scene: &mut Scene) {
        self.chains.retain(|chain| !chain.is_finished());
        for chain in &mut self.chains {
            chain.update(delta_ms, scene);
        }
    }
}
