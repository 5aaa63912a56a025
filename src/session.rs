//! Game session controllers
//!
//! Each controller exclusively owns its clock, state and random source, and
//! is the only thing allowed to mutate them. The view layer gets snapshots and
//! the four lifecycle operations of [`GameSession`].

use std::ops::ControlFlow;

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::sim::resolver::cell_anchor;
use crate::sim::{
    Achievement, Bin, Category, CellCoord, ClockPhase, DropOutcome, FallingItem, GameEvent, GridCell,
    IgnoreReason, PlacementOutcome, Popup, PopupKind, SimClock, SolarState, TrashState,
    cell_at_point, entropy_rng, generate_grid, resolve_drop, resolve_placement, seeded_rng, tick,
};
use crate::tuning::{SolarTuning, TrashTuning};

/// Which mini-game a session plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameKind {
    TrashCollector,
    SolarBuilder,
}

impl GameKind {
    pub fn title(&self) -> &'static str {
        match self {
            GameKind::TrashCollector => "Trash Collector",
            GameKind::SolarBuilder => "Solar Panel Builder",
        }
    }
}

/// Common controller surface for the view layer
pub trait GameSession {
    type Gesture;
    type Outcome;
    type Snapshot;

    const KIND: GameKind;

    /// Idle -> Running
    fn start(&mut self);
    /// Fresh Running session with cleared entities and zeroed counters
    fn reset(&mut self);
    /// Stop the session; calling it again changes nothing
    fn end(&mut self);
    /// Resolve a pointer gesture; a no-op unless Running
    fn handle_interaction(&mut self, gesture: Self::Gesture) -> Self::Outcome;
    /// Feed elapsed host time in seconds
    fn update(&mut self, dt: f32);
    fn snapshot(&self) -> Self::Snapshot;
    fn phase(&self) -> ClockPhase;
    /// Take queued events (score deltas, achievements, game over)
    fn drain_events(&mut self) -> Vec<GameEvent>;

    /// Host timer callback: feed one period, then say whether the timer
    /// should keep firing. Breaks on the call that ends the session.
    fn on_timer(&mut self, dt: f32) -> ControlFlow<()> {
        self.update(dt);
        if self.phase() == ClockPhase::Ended {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

/// Advance session time, ignoring nonsense deltas
fn advance_time(time: &mut f64, dt: f32) {
    if dt.is_finite() && dt > 0.0 {
        *time += dt as f64;
    }
}

// ---------------------------------------------------------------------------
// Trash Collector
// ---------------------------------------------------------------------------

/// Release of a dragged item at a screen point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragRelease {
    pub item: u32,
    pub at: Vec2,
}

/// How the view labels a category's bin and draws its items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryLabel {
    pub category: Category,
    pub bin: &'static str,
    pub item: &'static str,
    pub emoji: &'static str,
}

impl From<Category> for CategoryLabel {
    fn from(category: Category) -> Self {
        Self {
            category,
            bin: category.as_str(),
            item: category.item_name(),
            emoji: category.emoji(),
        }
    }
}

/// What the view renders for Trash Collector
#[derive(Debug, Clone, Serialize)]
pub struct TrashSnapshot {
    pub phase: ClockPhase,
    pub score: u64,
    pub lives: u8,
    pub items_sorted: u64,
    pub items: Vec<FallingItem>,
    pub bins: Vec<Bin>,
    /// One entry per bin, same order
    pub legend: Vec<CategoryLabel>,
    pub popups: Vec<Popup>,
    pub achievements: Vec<Achievement>,
    pub time: f64,
}

/// Falling-item sorting game
pub struct TrashSession {
    tuning: TrashTuning,
    clock: SimClock,
    state: TrashState,
    rng: Pcg32,
}

impl TrashSession {
    /// New idle session with an entropy-seeded random source
    pub fn new(tuning: TrashTuning) -> Result<Self, SessionError> {
        Self::with_rng(tuning, entropy_rng())
    }

    /// New idle session with reproducible spawns
    pub fn with_seed(tuning: TrashTuning, seed: u64) -> Result<Self, SessionError> {
        Self::with_rng(tuning, seeded_rng(seed))
    }

    fn with_rng(tuning: TrashTuning, rng: Pcg32) -> Result<Self, SessionError> {
        tuning.validate()?;
        let state = TrashState::new(&tuning)?;
        Ok(Self {
            clock: SimClock::periodic(tuning.tick_period),
            tuning,
            state,
            rng,
        })
    }

    pub fn state(&self) -> &TrashState {
        &self.state
    }

    /// Whether the periodic tick timer is currently held
    pub fn timer_active(&self) -> bool {
        self.clock.has_timer()
    }

    /// Run exactly one tick regardless of host time (Running only)
    pub fn step(&mut self) {
        if !self.clock.is_running() {
            return;
        }
        self.run_tick();
    }

    fn run_tick(&mut self) {
        let report = tick(&mut self.state, &self.tuning, &mut self.rng, self.tuning.tick_period);
        if report.out_of_lives {
            self.finish("out of lives");
        }
    }

    fn finish(&mut self, reason: &str) {
        if self.clock.end() {
            self.state.items.clear();
            let score = self.state.scoreboard.score();
            self.state.events.push(GameEvent::GameOver { score });
            log::info!("Trash Collector ended ({}), final score {}", reason, score);
        }
    }
}

impl GameSession for TrashSession {
    type Gesture = DragRelease;
    type Outcome = DropOutcome;
    type Snapshot = TrashSnapshot;

    const KIND: GameKind = GameKind::TrashCollector;

    fn start(&mut self) {
        if self.clock.start() {
            log::info!("Trash Collector started with {} lives", self.state.lives);
        }
    }

    fn reset(&mut self) {
        self.state.reset(self.tuning.starting_lives);
        self.clock.reset();
        log::info!("Trash Collector reset");
    }

    fn end(&mut self) {
        self.finish("stopped");
    }

    fn handle_interaction(&mut self, gesture: DragRelease) -> DropOutcome {
        if !self.clock.is_running() {
            log::debug!("Ignoring drop of #{}: session not running", gesture.item);
            return DropOutcome::Ignored(IgnoreReason::NotRunning);
        }

        let outcome = resolve_drop(&self.state.bins, self.state.items.get(&gesture.item), gesture.at);
        match outcome {
            DropOutcome::Matched { item, .. } => {
                if let Some(sorted) = self.state.items.remove(&item) {
                    let points = self.tuning.match_points;
                    self.state.credit_sorted(points);
                    self.state.scoreboard.popups.push(
                        PopupKind::Points,
                        points,
                        sorted.pos,
                        self.state.time,
                        self.tuning.popup_secs,
                    );
                }
            }
            DropOutcome::Mismatched { item, bin } => {
                self.state.items.remove(&item);
                log::debug!("Item #{} dropped in the wrong bin #{}", item, bin);
                if self.state.lose_life() {
                    self.finish("out of lives");
                }
            }
            DropOutcome::Ignored(IgnoreReason::NoTarget) => {
                // Left where it was released; it keeps falling from there
                if gesture.at.is_finite() {
                    if let Some(item) = self.state.items.get_mut(&gesture.item) {
                        item.pos = gesture.at;
                    }
                }
            }
            DropOutcome::Ignored(reason) => {
                log::debug!("Ignoring drop of #{}: {:?}", gesture.item, reason);
            }
        }
        outcome
    }

    fn update(&mut self, dt: f32) {
        advance_time(&mut self.state.time, dt);

        let due = self.clock.advance(dt);
        for _ in 0..due {
            self.run_tick();
            if !self.clock.is_running() {
                break;
            }
        }

        self.state.scoreboard.popups.expire(self.state.time);
    }

    fn snapshot(&self) -> TrashSnapshot {
        TrashSnapshot {
            phase: self.clock.phase(),
            score: self.state.scoreboard.score(),
            lives: self.state.lives,
            items_sorted: self.state.items_sorted(),
            items: self.state.items.values().cloned().collect(),
            bins: self.state.bins.clone(),
            legend: self
                .state
                .bins
                .iter()
                .map(|bin| CategoryLabel::from(bin.accepts))
                .collect(),
            popups: self.state.scoreboard.popups.iter().cloned().collect(),
            achievements: self.state.scoreboard.earned(),
            time: self.state.time,
        }
    }

    fn phase(&self) -> ClockPhase {
        self.clock.phase()
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }
}

// ---------------------------------------------------------------------------
// Solar Builder
// ---------------------------------------------------------------------------

/// A click on the solar grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GridClick {
    /// Click already mapped to a cell by the view
    Cell(CellCoord),
    /// Raw point relative to the grid's top-left corner
    At(Vec2),
}

/// What the view renders for Solar Builder
#[derive(Debug, Clone, Serialize)]
pub struct SolarSnapshot {
    pub phase: ClockPhase,
    pub score: u64,
    pub energy: u64,
    pub panels_placed: u32,
    pub co2_saved_kg: u64,
    pub columns: u16,
    pub rows: u16,
    pub cells: Vec<GridCell>,
    pub popups: Vec<Popup>,
    pub achievements: Vec<Achievement>,
    pub time: f64,
}

/// Grid-based solar panel placement game
pub struct SolarSession {
    tuning: SolarTuning,
    clock: SimClock,
    state: SolarState,
}

impl SolarSession {
    /// New idle session with a freshly rolled grid
    pub fn new(tuning: SolarTuning) -> Result<Self, SessionError> {
        tuning.validate()?;
        let cells = generate_grid(&mut entropy_rng(), &tuning)?;
        Self::with_grid(tuning, cells)
    }

    /// New idle session with a reproducible grid
    pub fn with_seed(tuning: SolarTuning, seed: u64) -> Result<Self, SessionError> {
        tuning.validate()?;
        let cells = generate_grid(&mut seeded_rng(seed), &tuning)?;
        Self::with_grid(tuning, cells)
    }

    /// New idle session over a prepared row-major grid
    pub fn with_grid(tuning: SolarTuning, cells: Vec<GridCell>) -> Result<Self, SessionError> {
        tuning.validate()?;
        let expected = tuning.columns as usize * tuning.rows as usize;
        if cells.len() != expected {
            return Err(SessionError::GridShape {
                expected,
                found: cells.len(),
            });
        }
        for (index, cell) in cells.iter().enumerate() {
            let col = (index % tuning.columns as usize) as u16;
            let row = (index / tuning.columns as usize) as u16;
            if cell.coord != CellCoord::new(col, row) {
                return Err(SessionError::GridOrder {
                    index,
                    col: cell.coord.col,
                    row: cell.coord.row,
                });
            }
        }

        Ok(Self {
            state: SolarState::new(&tuning, cells),
            clock: SimClock::manual(),
            tuning,
        })
    }

    pub fn state(&self) -> &SolarState {
        &self.state
    }

    pub fn co2_saved_kg(&self) -> u64 {
        (self.state.energy() as f64 * self.tuning.co2_kg_per_energy as f64).floor() as u64
    }
}

impl GameSession for SolarSession {
    type Gesture = GridClick;
    type Outcome = PlacementOutcome;
    type Snapshot = SolarSnapshot;

    const KIND: GameKind = GameKind::SolarBuilder;

    fn start(&mut self) {
        if self.clock.start() {
            log::info!(
                "Solar Builder started on a {}x{} grid",
                self.state.columns,
                self.state.rows
            );
        }
    }

    fn reset(&mut self) {
        self.state.reset();
        self.clock.reset();
        log::info!("Solar Builder reset");
    }

    fn end(&mut self) {
        if self.clock.end() {
            let score = self.state.scoreboard.score();
            self.state.events.push(GameEvent::GameOver { score });
            log::info!(
                "Solar Builder ended with {} energy, score {}",
                self.state.energy(),
                score
            );
        }
    }

    fn handle_interaction(&mut self, click: GridClick) -> PlacementOutcome {
        if !self.clock.is_running() {
            log::debug!("Ignoring click: session not running");
            return PlacementOutcome::Ignored(IgnoreReason::NotRunning);
        }

        let coord = match click {
            GridClick::Cell(coord) => Some(coord),
            GridClick::At(point) => cell_at_point(
                point,
                self.tuning.cell_size,
                self.state.columns,
                self.state.rows,
            ),
        };
        let outcome = resolve_placement(coord.and_then(|c| self.state.cell(c)));

        match outcome {
            PlacementOutcome::Placed { coord, .. } => {
                let produced = self.state.cell_mut(coord).and_then(GridCell::occupy);
                if let Some(produced) = produced {
                    let energy = produced as u64;
                    self.state
                        .credit_panel(energy * self.tuning.points_per_energy, energy);
                    self.state.scoreboard.popups.push(
                        PopupKind::Energy,
                        energy,
                        cell_anchor(coord, self.tuning.cell_size),
                        self.state.time,
                        self.tuning.popup_secs,
                    );
                }
            }
            PlacementOutcome::Ignored(reason) => {
                log::debug!("Ignoring click on {:?}: {:?}", coord, reason);
            }
        }
        outcome
    }

    fn update(&mut self, dt: f32) {
        advance_time(&mut self.state.time, dt);
        self.state.scoreboard.popups.expire(self.state.time);
    }

    fn snapshot(&self) -> SolarSnapshot {
        SolarSnapshot {
            phase: self.clock.phase(),
            score: self.state.scoreboard.score(),
            energy: self.state.energy(),
            panels_placed: self.state.panels_placed,
            co2_saved_kg: self.co2_saved_kg(),
            columns: self.state.columns,
            rows: self.state.rows,
            cells: self.state.cells.clone(),
            popups: self.state.scoreboard.popups.iter().cloned().collect(),
            achievements: self.state.scoreboard.earned(),
            time: self.state.time,
        }
    }

    fn phase(&self) -> ClockPhase {
        self.clock.phase()
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }
}
