//! Eco Arcade - environmental learning mini-games
//!
//! Two games share one engine: Trash Collector (drag falling items into the
//! matching recycling bin) and Solar Panel Builder (place panels on a sunny
//! grid).
//!
//! Core modules:
//! - `sim`: Simulation (entities, clock, generator, resolver, scoring)
//! - `session`: Game session controllers the view talks to
//! - `rewards`: Lifetime points and dashboard badges
//! - `platform`: Browser/native platform abstraction
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod platform;
pub mod rewards;
pub mod session;
pub mod sim;
pub mod tuning;

pub use error::{EntityError, SessionError};
pub use rewards::{Badge, PointsReporter, RewardsLedger, forward_points};
pub use session::{
    CategoryLabel, DragRelease, GameKind, GameSession, GridClick, SolarSession, SolarSnapshot, TrashSession,
    TrashSnapshot,
};
pub use tuning::{SolarTuning, TrashTuning, Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    // Trash Collector

    /// Seconds between falling-item ticks
    pub const TRASH_TICK_PERIOD: f32 = 0.1;
    /// Chance of a new item on each tick
    pub const TRASH_SPAWN_CHANCE: f32 = 0.3;
    /// Fall speed range (pixels/s)
    pub const ITEM_MIN_SPEED: f32 = 20.0;
    pub const ITEM_MAX_SPEED: f32 = 50.0;
    pub const STARTING_LIVES: u8 = 3;
    pub const MATCH_POINTS: u64 = 10;

    /// Play field (pixels)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;
    /// Items enter above the visible field
    pub const SPAWN_Y: f32 = -50.0;
    /// Keeps spawns clear of the right edge
    pub const SPAWN_MARGIN: f32 = 100.0;
    pub const POINTS_POPUP_SECS: f32 = 1.5;
    /// A celebration fires at every multiple of this score
    pub const CELEBRATION_STEP: u64 = 100;

    /// Bin row layout (pixels)
    pub const BIN_WIDTH: f32 = 80.0;
    pub const BIN_HEIGHT: f32 = 96.0;
    pub const BIN_GAP: f32 = 16.0;
    pub const BIN_BOTTOM_MARGIN: f32 = 32.0;

    // Solar Panel Builder

    pub const GRID_COLUMNS: u16 = 8;
    pub const GRID_ROWS: u16 = 6;
    pub const CELL_SIZE: f32 = 60.0;
    pub const POLLUTION_CHANCE: f32 = 0.15;
    /// Random bonus on top of the sun pattern
    pub const EXPOSURE_JITTER: f32 = 30.0;
    pub const EXPOSURE_MIN: f32 = 10.0;
    pub const EXPOSURE_MAX: f32 = 100.0;
    /// Lowest base exposure the sun pattern produces
    pub const EXPOSURE_FLOOR: f32 = 20.0;
    pub const POINTS_PER_ENERGY: u64 = 5;
    pub const ENERGY_POPUP_SECS: f32 = 2.0;
    /// Energy for the Green Engineer badge
    pub const GREEN_ENGINEER_ENERGY: u64 = 100;
    pub const CO2_KG_PER_ENERGY: f32 = 2.5;

    // Shared

    /// Oldest popups are dropped past this
    pub const MAX_POPUPS: usize = 32;
    /// Most ticks one host update may run (backlog beyond is discarded)
    pub const MAX_CATCHUP_TICKS: u32 = 8;
}
