// extensions/tween_manager.rs
//
// Owns the active tweens of a game and advances them once per logic tick.
//
// Tweens added while the manager is updating (from finish callbacks or
// processes holding a `TweenHandle`) land in an incoming queue and are
// first updated on the following cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam::channel::{unbounded, Receiver, Sender};
use log::warn;

use super::tween::{CancelToken, Tween};
use crate::core::scene::Scene;

/// Cloneable handle for adding tweens or requesting a clear from anywhere,
/// including from inside a running tween's finish callback.
#[derive(Debug, Clone)]
pub struct TweenHandle {
    sender: Sender<Tween>,
    receiver: Receiver<Tween>,
    clear_requested: Arc<AtomicBool>,
}

impl TweenHandle {
    /// Queue a tween; it starts updating on the manager's next cycle.
    ///
    /// The returned token cancels it: on the next manager update it fires its
    /// finish callback and is removed in that same cycle.
    pub fn add(&self, tween: Tween) -> CancelToken {
        let token = tween.cancel_token();
        // Cannot fail: this handle keeps the receiving end alive.
        let _ = self.sender.send(tween);
        token
    }

    /// Drop queued tweens now and every live tween on the next update.
    pub fn remove_all(&self) {
        self.receiver.try_iter().for_each(drop);
        self.clear_requested.store(true, Ordering::SeqCst);
    }
}

/// What happened during one `TweenManager::update`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TweenStats {
    pub updated: usize,
    pub finished: usize,
    pub failed: usize,
    pub cleared: bool,
}

#[derive(Debug)]
pub struct TweenManager {
    live: Vec<Tween>,
    handle: TweenHandle,
}

impl TweenManager {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            live: Vec::new(),
            handle: TweenHandle {
                sender,
                receiver,
                clear_requested: Arc::new(AtomicBool::new(false)),
            },
        }
    }

    pub fn handle(&self) -> TweenHandle {
        self.handle.clone()
    }

    pub fn add(&self, tween: Tween) -> CancelToken {
        self.handle.add(tween)
    }

    pub fn remove_all(&self) {
        self.handle.remove_all();
    }

    /// Tweens that have been updated at least once and are not yet finished.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Tweens waiting for the next cycle.
    pub fn pending(&self) -> usize {
        self.handle.receiver.len()
    }

    /// Advance every live tween by `delta_ms`.
    ///
    /// Newly queued tweens join first, so ones queued during this call wait
    /// for the next. Live tweens run in reverse order and are removed as soon
    /// as they finish. A tween whose update fails is logged and dropped
    /// without stopping the rest of the batch.
    pub fn update(&mut self, delta_ms: f32, scene: &mut Scene) -> TweenStats {
        let mut stats = TweenStats::default();
        if self.take_clear_request() {
            return stats;
        }

        self.live.extend(self.handle.receiver.try_iter());

        for i in (0..self.live.len()).rev() {
            let tween = &mut self.live[i];
            let result = tween.update(delta_ms, scene);
            let finished = tween.is_finished();
            stats.updated += 1;

            match result {
                Err(err) => {
                    warn!("dropping tween after failed update: {err}");
                    self.live.remove(i).abort();
                    stats.failed += 1;
                }
                Ok(()) if finished => {
                    self.live.remove(i);
                    stats.finished += 1;
                }
                Ok(()) => {}
            }

            if self.take_clear_request() {
                stats.cleared = true;
                return stats;
            }
        }
        stats
    }

    /// Perform a pending clear. Returns whether one was pending.
    fn take_clear_request(&mut self) -> bool {
        if self.handle.clear_requested.swap(false, Ordering::SeqCst) {
            self.live.clear();
            true
        } else {
            false
        }
    }
}

impl Default for TweenManager {
    fn default() -> Self {
        Self::new()
    }
}
