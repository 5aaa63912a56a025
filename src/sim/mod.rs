//! Mini-game simulation
//!
//! All gameplay logic lives here:
//! - Fixed tick period only (host time is converted by the clock)
//! - Substitutable RNG (entropy by default, seeded in tests)
//! - Stable iteration order (items keyed by entity ID)
//! - No rendering or platform dependencies

pub mod clock;
pub mod entity;
pub mod generator;
pub mod resolver;
pub mod rng;
pub mod scoring;
pub mod state;
pub mod tick;

pub use clock::{ClockPhase, SimClock};
pub use entity::{Bin, Category, CellCoord, FallingItem, GridCell, Rect, SpeedBounds, produced_value};
pub use generator::{SpawnBounds, generate_cell, generate_grid, generate_item, sun_pattern};
pub use resolver::{DropOutcome, IgnoreReason, PlacementOutcome, bin_at, cell_at_point, resolve_drop, resolve_placement};
pub use rng::{SimRng, entropy_rng, seeded_rng};
pub use scoring::{Achievement, AchievementRule, Popup, PopupKind, Scoreboard, Totals};
pub use state::{GameEvent, SolarState, TrashState};
pub use tick::{TickReport, tick};
