//! Dual-rate game loop.
//!
//! Two independent periodic drivers, each on its own thread with its own
//! command queue:
//!
//! - [`LogicDriver`] ticks the game model at the logic rate (60 Hz by
//!   default) with a capped, speed-scaled delta. It is the only writer of
//!   simulation state.
//! - [`RenderDriver`] fires a redraw request at the render rate (120 Hz by
//!   default). It does no simulation; painting reads whatever state the last
//!   logic tick left behind, under the model's lock.
//!
//! Stopping a driver drops its target and cancels the pending tick. A tick
//! already running finishes; no further ticks are scheduled.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam::channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, trace, warn};

use crate::api::error::{EngineError, Result};
use crate::api::game::{GameLoop, SchedulerConfig};
use crate::core::time::{FramePacer, TickPlan};
use crate::renderer::traits::RedrawRequest;

/// A game model shared between the logic thread and painters.
pub type SharedGame = Arc<Mutex<dyn GameLoop>>;

/// Wrap a model so it can be handed to [`LogicDriver::start`] and locked for drawing.
pub fn share<G: GameLoop + 'static>(game: G) -> Arc<Mutex<G>> {
    Arc::new(Mutex::new(game))
}

enum Command<T> {
    Start(T),
    Stop,
    SetSpeed(f32),
    SetFrameSkip(u32),
    Shutdown,
}

/// A named worker thread ticking `T` on a [`FramePacer`] schedule.
struct Driver<T: Send + 'static> {
    name: String,
    commands: Sender<Command<T>>,
    thread: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Driver<T> {
    /// Spawn the worker and block until it is ready to take commands.
    fn spawn<F>(name: &str, pacer: FramePacer, on_tick: F) -> Result<Self>
    where
        F: FnMut(&T, &TickPlan) + Send + 'static,
    {
        let (commands, queue) = unbounded();
        let (ready_tx, ready_rx) = bounded::<()>(1);

        let thread_name = name.to_string();
        let thread = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                let _ = ready_tx.send(());
                run(&thread_name, queue, pacer, on_tick);
            })
            .map_err(EngineError::ThreadSpawn)?;

        ready_rx.recv().map_err(|_| EngineError::SchedulerStopped)?;
        debug!("{name}: driver thread ready");

        Ok(Self {
            name: name.to_string(),
            commands,
            thread: Some(thread),
        })
    }

    fn send(&self, command: Command<T>) -> Result<()> {
        self.commands.send(command).map_err(|_| EngineError::SchedulerStopped)
    }

    fn stop(&self) {
        // A driver whose thread already exited is stopped anyway.
        if self.send(Command::Stop).is_err() {
            debug!("{}: stop after thread exit", self.name);
        }
    }
}

impl<T: Send + 'static> Drop for Driver<T> {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("{}: driver thread panicked", self.name);
            }
        }
    }
}

/// Worker loop: wait for a command or the next tick deadline, whichever
/// comes first.
fn run<T, F>(name: &str, queue: Receiver<Command<T>>, mut pacer: FramePacer, mut on_tick: F)
where
    F: FnMut(&T, &TickPlan),
{
    let mut target: Option<T> = None;
    let mut next_tick: Option<Instant> = None;

    loop {
        let command = match next_tick {
            Some(deadline) => match queue.recv_deadline(deadline) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match queue.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            },
        };

        match command {
            Some(Command::Start(new_target)) => {
                debug!("{name}: start");
                target = Some(new_target);
                pacer.reset();
                next_tick = Some(Instant::now());
            }
            Some(Command::Stop) => {
                debug!("{name}: stop");
                target = None;
                next_tick = None;
            }
            Some(Command::SetSpeed(speed)) => {
                debug!("{name}: speed {speed}");
                pacer.set_speed(speed);
            }
            Some(Command::SetFrameSkip(n)) => {
                debug!("{name}: frame skip {n}");
                pacer.set_frame_skip(n);
            }
            Some(Command::Shutdown) => break,
            None => {
                let started = Instant::now();
                let plan = pacer.begin_tick(started);
                if let Some(target) = &target {
                    on_tick(target, &plan);
                }
                let cost = started.elapsed();
                if cost > pacer.interval() {
                    warn!("{name}: tick took {cost:?}, longer than {:?}", pacer.interval());
                }
                next_tick = Some(Instant::now() + pacer.next_delay(cost));
            }
        }
    }
    debug!("{name}: driver thread exiting");
}

/// Fixed-rate simulation driver.
pub struct LogicDriver {
    driver: Driver<SharedGame>,
}

impl LogicDriver {
    pub fn spawn(config: &SchedulerConfig) -> Result<Self> {
        let driver = Driver::spawn("logic", FramePacer::logic(config), |game: &SharedGame, plan| {
            if !plan.run_logic {
                trace!("logic: frame {} skipped", plan.frame);
                return;
            }
            trace!("logic: frame {} delta {:.2}ms", plan.frame, plan.delta_ms);
            let mut game = game.lock().unwrap_or_else(PoisonError::into_inner);
            game.update(plan.delta_ms);
        })?;
        Ok(Self { driver })
    }

    /// Begin ticking `game`, replacing any previous one.
    pub fn start(&self, game: SharedGame) -> Result<()> {
        self.driver.send(Command::Start(game))
    }

    /// Stop ticking. Safe to call at any time, including mid-tick.
    pub fn stop(&self) {
        self.driver.stop();
    }

    pub fn set_speed(&self, speed: f32) -> Result<()> {
        self.driver.send(Command::SetSpeed(speed))
    }

    /// Run logic on only one tick in every `n`; time still advances on the others.
    pub fn set_frame_skip(&self, n: u32) -> Result<()> {
        self.driver.send(Command::SetFrameSkip(n))
    }
}

/// Fixed-rate redraw driver.
pub struct RenderDriver {
    driver: Driver<Arc<dyn RedrawRequest>>,
}

impl RenderDriver {
    pub fn spawn(config: &SchedulerConfig) -> Result<Self> {
        let driver = Driver::spawn("render", FramePacer::render(config), |view: &Arc<dyn RedrawRequest>, _plan| {
            view.request_redraw();
        })?;
        Ok(Self { driver })
    }

    pub fn start(&self, view: Arc<dyn RedrawRequest>) -> Result<()> {
        self.driver.send(Command::Start(view))
    }

    pub fn stop(&self) {
        self.driver.stop();
    }
}

/// Both drivers together.
pub struct Scheduler {
    pub logic: LogicDriver,
    pub render: RenderDriver,
}

impl Scheduler {
    pub fn new(config: &SchedulerConfig) -> Result<Self> {
        Ok(Self {
            logic: LogicDriver::spawn(config)?,
            render: RenderDriver::spawn(config)?,
        })
    }

    pub fn start(&self, game: SharedGame, view: Arc<dyn RedrawRequest>) -> Result<()> {
        self.logic.start(game)?;
        self.render.start(view)
    }

    pub fn stop(&self) {
        self.logic.stop();
        self.render.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn fast_config() -> SchedulerConfig {
        SchedulerConfig {
            logic_hz: 200.0,
            render_hz: 400.0,
            ..SchedulerConfig::default()
        }
    }

    struct Counter {
        ticks: Arc<AtomicUsize>,
        max_delta: Arc<Mutex<f32>>,
        work: Duration,
    }

    impl GameLoop for Counter {
        fn update(&mut self, delta_ms: f32) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
            let mut max = self.max_delta.lock().unwrap();
            *max = max.max(delta_ms);
            thread::sleep(self.work);
        }
    }

    fn counter(work: Duration) -> (Arc<AtomicUsize>, Arc<Mutex<f32>>, SharedGame) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let max_delta = Arc::new(Mutex::new(0.0));
        let game: SharedGame = share(Counter {
            ticks: Arc::clone(&ticks),
            max_delta: Arc::clone(&max_delta),
            work,
        });
        (ticks, max_delta, game)
    }

    #[test]
    fn logic_ticks_until_stopped() {
        let driver = LogicDriver::spawn(&fast_config()).unwrap();
        let (ticks, max_delta, game) = counter(Duration::ZERO);

        driver.start(game).unwrap();
        thread::sleep(Duration::from_millis(100));
        driver.stop();
        thread::sleep(Duration::from_millis(20));

        let after_stop = ticks.load(Ordering::SeqCst);
        assert!(after_stop >= 5, "only {after_stop} ticks");
        assert!(*max_delta.lock().unwrap() <= 100.0);

        thread::sleep(Duration::from_millis(50));
        assert_eq!(ticks.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn slow_ticks_keep_running_and_cap_delta() {
        let driver = LogicDriver::spawn(&fast_config()).unwrap();
        // Each tick costs far more than the 5 ms interval.
        let (ticks, max_delta, game) = counter(Duration::from_millis(30));

        driver.start(game).unwrap();
        thread::sleep(Duration::from_millis(200));
        driver.stop();

        assert!(ticks.load(Ordering::SeqCst) >= 2);
        assert!(*max_delta.lock().unwrap() <= 100.0);
    }

    #[test]
    fn stop_mid_tick_is_harmless() {
        let driver = LogicDriver::spawn(&fast_config()).unwrap();
        let (ticks, _, game) = counter(Duration::from_millis(40));

        driver.start(game).unwrap();
        thread::sleep(Duration::from_millis(10));
        driver.stop();
        driver.stop();
        thread::sleep(Duration::from_millis(60));
        let settled = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(60));
        assert_eq!(ticks.load(Ordering::SeqCst), settled);
    }

    #[test]
    fn frame_skip_and_speed_reach_the_game() {
        let driver = LogicDriver::spawn(&fast_config()).unwrap();
        let (ticks, max_delta, game) = counter(Duration::ZERO);

        driver.set_speed(0.25).unwrap();
        driver.set_frame_skip(1000).unwrap();
        driver.start(game).unwrap();
        thread::sleep(Duration::from_millis(100));
        driver.stop();

        // 1000-frame skip at 200 Hz: no logic update within 100 ms.
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
        assert_eq!(*max_delta.lock().unwrap(), 0.0);
    }

    #[test]
    fn closures_drive_the_loop() {
        let driver = LogicDriver::spawn(&fast_config()).unwrap();
        let total = Arc::new(Mutex::new(0.0_f32));
        let sink = Arc::clone(&total);
        driver.start(share(move |dt: f32| *sink.lock().unwrap() += dt)).unwrap();
        thread::sleep(Duration::from_millis(60));
        driver.stop();
        assert!(*total.lock().unwrap() > 0.0);
    }

    #[test]
    fn render_driver_requests_redraws() {
        let driver = RenderDriver::spawn(&fast_config()).unwrap();
        let redraws = Arc::new(AtomicUsize::new(0));
        let count = Arc::clone(&redraws);

        driver
            .start(Arc::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        thread::sleep(Duration::from_millis(100));
        driver.stop();
        assert!(redraws.load(Ordering::SeqCst) >= 10);
    }

    #[test]
    fn scheduler_runs_both_rates() {
        let scheduler = Scheduler::new(&fast_config()).unwrap();
        let (ticks, _, game) = counter(Duration::ZERO);
        let redraws = Arc::new(AtomicUsize::new(0));
        let count = Arc::clone(&redraws);

        scheduler
            .start(game, Arc::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        thread::sleep(Duration::from_millis(150));
        scheduler.stop();

        let logic = ticks.load(Ordering::SeqCst);
        let render = redraws.load(Ordering::SeqCst);
        assert!(logic > 0 && render > 0);
        assert!(render > logic, "render {render} <= logic {logic}");
    }
}
