//! Data-driven game balance
//!
//! Persisted separately from rewards in LocalStorage. Native builds use the
//! defaults unless a JSON file is handed to [`Tuning::from_json`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::platform::storage;
use crate::sim::SpeedBounds;

/// Invalid or unreadable tuning
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning value `{field}` is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
    TuningError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Trash Collector balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrashTuning {
    /// Seconds between simulation ticks
    pub tick_period: f32,
    /// Probability of spawning an item on a tick
    pub spawn_chance: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub starting_lives: u8,
    /// Points for a correctly sorted item
    pub match_points: u64,
    pub field_width: f32,
    pub field_height: f32,
    /// Spawn height (above the visible field)
    pub spawn_y: f32,
    /// Items spawn in [0, field_width - spawn_margin)
    pub spawn_margin: f32,
    /// Lifetime of a "+N" popup, in seconds
    pub popup_secs: f32,
    /// Celebrate every multiple of this many points
    pub celebration_step: u64,
}

impl Default for TrashTuning {
    fn default() -> Self {
        Self {
            tick_period: TRASH_TICK_PERIOD,
            spawn_chance: TRASH_SPAWN_CHANCE,
            min_speed: ITEM_MIN_SPEED,
            max_speed: ITEM_MAX_SPEED,
            starting_lives: STARTING_LIVES,
            match_points: MATCH_POINTS,
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            spawn_y: SPAWN_Y,
            spawn_margin: SPAWN_MARGIN,
            popup_secs: POINTS_POPUP_SECS,
            celebration_step: CELEBRATION_STEP,
        }
    }
}

impl TrashTuning {
    pub fn speed_bounds(&self) -> SpeedBounds {
        SpeedBounds {
            min: self.min_speed,
            max: self.max_speed,
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.tick_period.is_finite() && self.tick_period > 0.0) {
            return Err(invalid("tick_period", "must be a positive number of seconds"));
        }
        if !(0.0..=1.0).contains(&self.spawn_chance) {
            return Err(invalid("spawn_chance", "must be a probability in [0, 1]"));
        }
        if !(self.min_speed.is_finite() && self.min_speed > 0.0) {
            return Err(invalid("min_speed", "must be positive"));
        }
        if !(self.max_speed.is_finite() && self.max_speed >= self.min_speed) {
            return Err(invalid("max_speed", "must be at least min_speed"));
        }
        if self.starting_lives == 0 {
            return Err(invalid("starting_lives", "must be at least 1"));
        }
        if !(self.field_width.is_finite() && self.field_width > self.spawn_margin) {
            return Err(invalid("field_width", "must exceed spawn_margin"));
        }
        if !(self.field_height.is_finite() && self.field_height > 0.0) {
            return Err(invalid("field_height", "must be positive"));
        }
        if !self.spawn_y.is_finite() || !(self.spawn_margin.is_finite() && self.spawn_margin >= 0.0) {
            return Err(invalid("spawn_y", "spawn position must be finite"));
        }
        if !(self.popup_secs.is_finite() && self.popup_secs > 0.0) {
            return Err(invalid("popup_secs", "must be positive"));
        }
        if self.celebration_step == 0 {
            return Err(invalid("celebration_step", "must be at least 1"));
        }
        Ok(())
    }
}

/// Solar Builder balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolarTuning {
    pub columns: u16,
    pub rows: u16,
    /// On-screen cell pitch, used to anchor popups and map clicks
    pub cell_size: f32,
    pub pollution_chance: f32,
    /// Random sun added on top of the exposure pattern
    pub exposure_jitter: f32,
    pub points_per_energy: u64,
    pub popup_secs: f32,
    /// Energy needed for the Green Engineer badge
    pub badge_energy: u64,
    pub co2_kg_per_energy: f32,
}

impl Default for SolarTuning {
    fn default() -> Self {
        Self {
            columns: GRID_COLUMNS,
            rows: GRID_ROWS,
            cell_size: CELL_SIZE,
            pollution_chance: POLLUTION_CHANCE,
            exposure_jitter: EXPOSURE_JITTER,
            points_per_energy: POINTS_PER_ENERGY,
            popup_secs: ENERGY_POPUP_SECS,
            badge_energy: GREEN_ENGINEER_ENERGY,
            co2_kg_per_energy: CO2_KG_PER_ENERGY,
        }
    }
}

impl SolarTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(invalid("columns", "grid must have at least one cell"));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(invalid("cell_size", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.pollution_chance) {
            return Err(invalid("pollution_chance", "must be a probability in [0, 1]"));
        }
        if !(self.exposure_jitter.is_finite() && self.exposure_jitter >= 0.0) {
            return Err(invalid("exposure_jitter", "must be non-negative"));
        }
        if !(self.popup_secs.is_finite() && self.popup_secs > 0.0) {
            return Err(invalid("popup_secs", "must be positive"));
        }
        if !(self.co2_kg_per_energy.is_finite() && self.co2_kg_per_energy >= 0.0) {
            return Err(invalid("co2_kg_per_energy", "must be non-negative"));
        }
        Ok(())
    }
}

/// Balance for every game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub trash: TrashTuning,
    pub solar: SolarTuning,
}

impl Tuning {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "eco_arcade_tuning";

    pub fn validate(&self) -> Result<(), TuningError> {
        self.trash.validate()?;
        self.solar.validate()
    }

    /// Parse and validate; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Stored tuning, or the defaults when nothing valid is stored
    pub fn load() -> Self {
        match storage::load_raw(Self::STORAGE_KEY).map(|json| Self::from_json(&json)) {
            Some(Ok(tuning)) => {
                log::info!("Loaded tuning from LocalStorage");
                tuning
            }
            Some(Err(e)) => {
                log::warn!("Ignoring stored tuning: {}", e);
                Self::default()
            }
            None => {
                log::info!("Using default tuning");
                Self::default()
            }
        }
    }
}
