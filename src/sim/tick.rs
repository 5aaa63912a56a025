//! Fixed-period simulation tick for the falling-item game
//!
//! Order within a tick: spawn, advance every item, then remove the items past
//! the lower bound. Removal sees fully advanced positions.

use super::generator::{SpawnBounds, generate_item};
use super::rng::SimRng;
use super::state::TrashState;
use crate::tuning::TrashTuning;

/// What a single tick did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub spawned: Option<u32>,
    /// Items that fell past the bottom, one life lost for each
    pub fell_out: Vec<u32>,
    /// Lives reached zero during this tick
    pub out_of_lives: bool,
}

/// Advance the trash game by one tick of `dt` seconds
pub fn tick<R: SimRng + ?Sized>(
    state: &mut TrashState,
    tuning: &TrashTuning,
    rng: &mut R,
    dt: f32,
) -> TickReport {
    let mut report = TickReport::default();

    // 1. Maybe spawn
    if rng.chance(tuning.spawn_chance) {
        let id = state.next_entity_id();
        match generate_item(rng, &SpawnBounds::from(tuning), id, state.time) {
            Ok(item) => {
                log::trace!("Spawned {} #{} at x={:.0}", item.category.as_str(), id, item.pos.x);
                state.items.insert(id, item);
                report.spawned = Some(id);
            }
            Err(e) => log::warn!("Skipping spawn: {}", e),
        }
    }

    // 2. Advance everything
    for item in state.items.values_mut() {
        item.advance(dt);
    }

    // 3. Remove what fell through, one life each
    let bound = tuning.field_height;
    report.fell_out = state
        .items
        .values()
        .filter(|item| item.is_below(bound))
        .map(|item| item.id)
        .collect();

    for id in &report.fell_out {
        state.items.remove(id);
        if state.lose_life() {
            report.out_of_lives = true;
        }
    }

    if !report.fell_out.is_empty() {
        log::debug!(
            "{} item(s) missed, {} lives left",
            report.fell_out.len(),
            state.lives
        );
    }

    report
}
