//! Process-wide publish/subscribe channel for simulation side effects.
//!
//! Physics and animation code publish requests (vibrate, play a sound,
//! score changed) without depending on concrete haptics or audio APIs.
//! One bus is constructed by the application and shared by `Arc`.

use std::sync::Mutex;

use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::api::types::{GameEvent, SoundEvent};

/// A side-effect request published by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// Ask the platform to vibrate for the given duration.
    Vibrate { millis: u32 },
    /// Ask the audio layer to play a sound.
    Sound(SoundEvent),
    /// Score/state notification for the UI layer.
    Game(GameEvent),
}

/// Fan-out event bus. Every subscriber receives every event published after
/// it subscribed. Dropped receivers are pruned on the next publish.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<EngineEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> Receiver<EngineEvent> {
        let (tx, rx) = unbounded();
        self.lock().push(tx);
        rx
    }

    /// Publish an event to every live subscriber.
    pub fn publish(&self, event: EngineEvent) {
        self.lock().retain(|tx| tx.send(event).is_ok());
    }

    pub fn vibrate(&self, millis: u32) {
        self.publish(EngineEvent::Vibrate { millis });
    }

    pub fn play_sound(&self, sound: SoundEvent) {
        self.publish(EngineEvent::Sound(sound));
    }

    pub fn game_event(&self, event: GameEvent) {
        self.publish(EngineEvent::Game(event));
    }

    /// Number of live subscribers (as of the last publish).
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sender<EngineEvent>>> {
        self.subscribers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
