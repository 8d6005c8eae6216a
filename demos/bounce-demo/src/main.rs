//! Bounce demo: balls in a walled box with a sticky patch on the floor and a
//! toggleable gate, driven by the dual-rate scheduler. "Rendering" is a
//! console dump of actor positions every few redraws.

mod game;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use arcade_engine::{EngineEvent, GameConfig, Scheduler};
use log::info;

use crate::game::{BounceGame, ConsoleSurface};

const RUN_FOR: Duration = Duration::from_secs(2);
/// Paint one frame out of this many redraw requests.
const PAINT_EVERY: usize = 30;

fn main() -> arcade_engine::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::default();
    let game = BounceGame::new(config.clone())?;
    let events = game.ctx.bus.subscribe();
    let model = Arc::new(Mutex::new(game));

    let redraws = Arc::new(AtomicUsize::new(0));
    let painter = {
        let model = Arc::clone(&model);
        let redraws = Arc::clone(&redraws);
        move || {
            let n = redraws.fetch_add(1, Ordering::Relaxed);
            if n % PAINT_EVERY != 0 {
                return;
            }
            let game = model.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let mut surface = ConsoleSurface::default();
            game.ctx.draw(&mut surface);
            info!("frame {n}: {}", surface.finish());
        }
    };

    let scheduler = Scheduler::new(&config.scheduler)?;
    scheduler.start(model.clone(), Arc::new(painter))?;
    thread::sleep(RUN_FOR / 2);

    info!("slow motion");
    scheduler.logic.set_speed(0.5)?;
    thread::sleep(RUN_FOR / 2);
    scheduler.stop();

    let mut impacts = 0;
    let mut contacts = 0;
    for event in events.try_iter() {
        match event {
            EngineEvent::Sound(_) => impacts += 1,
            EngineEvent::Game(_) => contacts += 1,
            EngineEvent::Vibrate { .. } => {}
        }
    }
    info!(
        "done: {} redraws, {impacts} hard impacts, {contacts} trigger contacts",
        redraws.load(Ordering::Relaxed)
    );
    Ok(())
}
