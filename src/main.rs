//! Eco Arcade entry point
//!
//! Native: headless autoplay of both games, logged to the console.
//! Web: thin bindings the page's view layer drives.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;

    use eco_arcade::platform::{Interval, clock_seed};
    use eco_arcade::sim::{CellCoord, ClockPhase};
    use eco_arcade::{
        DragRelease, GameKind, GameSession, GridClick, RewardsLedger, SolarSession, TrashSession,
        Tuning, forward_points,
    };

    fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
        match serde_json::to_string(value) {
            Ok(json) => JsValue::from_str(&json),
            Err(e) => {
                log::error!("Snapshot serialization failed: {}", e);
                JsValue::NULL
            }
        }
    }

    fn to_js_error(e: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&e.to_string())
    }

    /// Move score deltas into the ledger and persist it when anything changed
    fn settle(events: Vec<eco_arcade::sim::GameEvent>, game: GameKind, ledger: &mut RewardsLedger) {
        if forward_points(&events, game, ledger) > 0 {
            ledger.save();
        }
    }

    /// Trash Collector driven by a browser interval
    #[wasm_bindgen]
    pub struct TrashGame {
        session: Rc<RefCell<TrashSession>>,
        ledger: Rc<RefCell<RewardsLedger>>,
        period_ms: i32,
        interval: Option<Interval>,
    }

    #[wasm_bindgen]
    impl TrashGame {
        #[wasm_bindgen(constructor)]
        pub fn new() -> Result<TrashGame, JsValue> {
            let tuning = Tuning::load().trash;
            let period_ms = (tuning.tick_period * 1000.0).round() as i32;
            let session = TrashSession::with_seed(tuning, clock_seed()).map_err(to_js_error)?;
            Ok(TrashGame {
                session: Rc::new(RefCell::new(session)),
                ledger: Rc::new(RefCell::new(RewardsLedger::load())),
                period_ms,
                interval: None,
            })
        }

        pub fn start(&mut self) {
            self.session.borrow_mut().start();
            if self.session.borrow().phase() == ClockPhase::Running && self.interval.is_none() {
                self.arm();
            }
        }

        pub fn reset(&mut self) {
            self.session.borrow_mut().reset();
            self.interval = None;
            self.arm();
        }

        pub fn end(&mut self) {
            self.session.borrow_mut().end();
            self.interval = None;
            let events = self.session.borrow_mut().drain_events();
            settle(events, GameKind::TrashCollector, &mut self.ledger.borrow_mut());
        }

        /// Release a dragged item; returns the outcome as JSON
        pub fn drop_item(&mut self, item: u32, x: f32, y: f32) -> JsValue {
            let outcome = self.session.borrow_mut().handle_interaction(DragRelease {
                item,
                at: Vec2::new(x, y),
            });
            let events = self.session.borrow_mut().drain_events();
            settle(events, GameKind::TrashCollector, &mut self.ledger.borrow_mut());
            self.disarm_if_ended();
            to_js(&outcome)
        }

        pub fn snapshot(&mut self) -> JsValue {
            self.disarm_if_ended();
            to_js(&self.session.borrow().snapshot())
        }
    }

    impl TrashGame {
        fn arm(&mut self) {
            let session = self.session.clone();
            let ledger = self.ledger.clone();
            let dt = self.period_ms as f32 / 1000.0;
            // Breaking clears the interval on the tick that ends the game
            self.interval = Interval::new(self.period_ms, move || {
                let mut session = session.borrow_mut();
                let flow = session.on_timer(dt);
                let events = session.drain_events();
                settle(events, GameKind::TrashCollector, &mut ledger.borrow_mut());
                flow
            });
        }

        /// Release the (already cleared) interval once the session stops on its own
        fn disarm_if_ended(&mut self) {
            if self.session.borrow().phase() == ClockPhase::Ended {
                self.interval = None;
            }
        }
    }

    /// Solar Panel Builder; click driven, popups age with the page's frames
    #[wasm_bindgen]
    pub struct SolarGame {
        session: SolarSession,
        ledger: RewardsLedger,
        last_time: f64,
    }

    #[wasm_bindgen]
    impl SolarGame {
        #[wasm_bindgen(constructor)]
        pub fn new() -> Result<SolarGame, JsValue> {
            let tuning = Tuning::load().solar;
            let session = SolarSession::with_seed(tuning, clock_seed()).map_err(to_js_error)?;
            Ok(SolarGame {
                session,
                ledger: RewardsLedger::load(),
                last_time: 0.0,
            })
        }

        pub fn start(&mut self) {
            self.session.start();
        }

        pub fn reset(&mut self) {
            self.session.reset();
        }

        pub fn end(&mut self) {
            self.session.end();
            settle(self.session.drain_events(), GameKind::SolarBuilder, &mut self.ledger);
        }

        pub fn click_cell(&mut self, col: u16, row: u16) -> JsValue {
            let outcome = self
                .session
                .handle_interaction(GridClick::Cell(CellCoord::new(col, row)));
            settle(self.session.drain_events(), GameKind::SolarBuilder, &mut self.ledger);
            to_js(&outcome)
        }

        pub fn click_at(&mut self, x: f32, y: f32) -> JsValue {
            let outcome = self.session.handle_interaction(GridClick::At(Vec2::new(x, y)));
            settle(self.session.drain_events(), GameKind::SolarBuilder, &mut self.ledger);
            to_js(&outcome)
        }

        /// Called from requestAnimationFrame with its timestamp (ms)
        pub fn frame(&mut self, time: f64) {
            if self.last_time > 0.0 {
                self.session.update(((time - self.last_time) / 1000.0) as f32);
            }
            self.last_time = time;
        }

        pub fn snapshot(&self) -> JsValue {
            to_js(&self.session.snapshot())
        }
    }

    /// Lifetime points and badges for the dashboard
    #[wasm_bindgen]
    pub fn rewards() -> JsValue {
        to_js(&RewardsLedger::load())
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }
        log::info!("Eco Arcade ready");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Eco Arcade (native) starting...");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| eco_arcade::Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning file {}: {}", path, e);
                eco_arcade::Tuning::default()
            }
        },
        None => eco_arcade::Tuning::default(),
    };

    let seed = eco_arcade::platform::clock_seed();
    log::info!("Autoplay seed: {}", seed);

    let mut ledger = eco_arcade::RewardsLedger::load();
    if let Err(e) = autoplay::trash(&tuning, seed, &mut ledger) {
        log::error!("Trash Collector failed to start: {}", e);
    }
    if let Err(e) = autoplay::solar(&tuning, seed, &mut ledger) {
        log::error!("Solar Builder failed to start: {}", e);
    }

    for badge in ledger.take_unlocked() {
        println!("Badge unlocked: {}", badge.title());
    }
    println!("Total points: {}", ledger.total_points);
    ledger.save();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted players standing in for a human at the pointer
#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use eco_arcade::sim::{ClockPhase, DropOutcome, PlacementOutcome};
    use eco_arcade::{
        DragRelease, GameKind, GameSession, GridClick, RewardsLedger, SessionError, SolarSession,
        TrashSession, Tuning, forward_points,
    };

    /// Simulated seconds of play
    const TRASH_SECONDS: f32 = 120.0;
    /// Host frame length
    const FRAME: f32 = 1.0 / 60.0;

    /// Sort most items; every fifth one goes in the wrong bin
    pub fn trash(tuning: &Tuning, seed: u64, ledger: &mut RewardsLedger) -> Result<(), SessionError> {
        let mut session = TrashSession::with_seed(tuning.trash.clone(), seed)?;
        session.start();

        let mut handled = 0u32;
        let mut elapsed = 0.0;
        while elapsed < TRASH_SECONDS && session.phase() == ClockPhase::Running {
            session.update(FRAME);
            elapsed += FRAME;

            // Grab the lowest item once it is on screen
            let target = session
                .state()
                .items
                .values()
                .filter(|item| item.pos.y > 0.0)
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|item| (item.id, item.category));
            if let Some((id, category)) = target {
                handled += 1;
                let bins = &session.state().bins;
                let bin = if handled % 5 == 0 {
                    bins.iter().find(|b| b.accepts != category)
                } else {
                    bins.iter().find(|b| b.accepts == category)
                };
                if let Some(at) = bin.map(|b| b.region.center()) {
                    let outcome = session.handle_interaction(DragRelease { item: id, at });
                    if let DropOutcome::Mismatched { .. } = outcome {
                        log::debug!("Autoplay missorted #{}", id);
                    }
                }
            }
            forward_points(&session.drain_events(), GameKind::TrashCollector, ledger);
        }

        session.end();
        forward_points(&session.drain_events(), GameKind::TrashCollector, ledger);

        let snap = session.snapshot();
        println!(
            "{}: score {}, {} items sorted, {} lives left, {} achievements",
            GameKind::TrashCollector.title(),
            snap.score,
            snap.items_sorted,
            snap.lives,
            snap.achievements.len()
        );
        Ok(())
    }

    /// Fill the sunniest free cells first
    pub fn solar(tuning: &Tuning, seed: u64, ledger: &mut RewardsLedger) -> Result<(), SessionError> {
        let mut session = SolarSession::with_seed(tuning.solar.clone(), seed)?;
        session.start();

        let mut order: Vec<_> = session
            .state()
            .cells
            .iter()
            .filter(|c| c.can_place())
            .map(|c| (c.potential(), c.coord))
            .collect();
        order.sort_by(|a, b| b.0.cmp(&a.0));

        for (_, coord) in order {
            if let PlacementOutcome::Ignored(reason) = session.handle_interaction(GridClick::Cell(coord)) {
                log::warn!("Autoplay placement at {:?} ignored: {:?}", coord, reason);
            }
            session.update(0.25);
            forward_points(&session.drain_events(), GameKind::SolarBuilder, ledger);
        }

        session.end();
        forward_points(&session.drain_events(), GameKind::SolarBuilder, ledger);

        let snap = session.snapshot();
        println!(
            "{}: score {}, {} energy from {} panels, {} kg CO2 saved",
            GameKind::SolarBuilder.title(),
            snap.score,
            snap.energy,
            snap.panels_placed,
            snap.co2_saved_kg
        );
        Ok(())
    }
}
