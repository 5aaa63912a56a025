//! Session state for both games
//!
//! Owned exclusively by the session controllers; the view only sees snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entity::{Bin, CellCoord, FallingItem, GridCell};
use super::scoring::{Achievement, AchievementRule, Scoreboard};
use crate::error::EntityError;
use crate::tuning::{SolarTuning, TrashTuning};

/// Outbound notifications, drained by the host after each update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Points were awarded; forwarded to the points reporter
    ScoreChanged { delta: u64, total: u64 },
    /// An achievement was earned for the first time this session
    AchievementEarned(Achievement),
    LifeLost { remaining: u8 },
    GameOver { score: u64 },
}

/// Add points/resource and queue the matching events
fn record_award(
    scoreboard: &mut Scoreboard,
    events: &mut Vec<GameEvent>,
    points: u64,
    resource: u64,
) -> Vec<Achievement> {
    let earned = scoreboard.award(points, resource);
    if points > 0 {
        events.push(GameEvent::ScoreChanged {
            delta: points,
            total: scoreboard.score(),
        });
    }
    for &achievement in &earned {
        log::info!("Achievement earned: {}", achievement.title());
        events.push(GameEvent::AchievementEarned(achievement));
    }
    earned
}

/// Trash Collector state
#[derive(Debug, Clone)]
pub struct TrashState {
    pub lives: u8,
    /// Live items by id
    pub items: BTreeMap<u32, FallingItem>,
    /// Static drop targets, bottom-most first
    pub bins: Vec<Bin>,
    /// Score plus items sorted as the resource counter
    pub scoreboard: Scoreboard,
    /// Session time in seconds
    pub time: f64,
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl TrashState {
    pub fn new(tuning: &TrashTuning) -> Result<Self, EntityError> {
        Ok(Self {
            lives: tuning.starting_lives,
            items: BTreeMap::new(),
            bins: Bin::standard_row(tuning.field_width, tuning.field_height)?,
            scoreboard: Scoreboard::new(vec![AchievementRule::ScoreEvery {
                step: tuning.celebration_step,
            }]),
            time: 0.0,
            events: Vec::new(),
            next_id: 1,
        })
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn items_sorted(&self) -> u64 {
        self.scoreboard.resource()
    }

    /// Take one life. Returns true when no lives are left.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.events.push(GameEvent::LifeLost {
            remaining: self.lives,
        });
        self.lives == 0
    }

    /// Credit a correctly sorted item
    pub fn credit_sorted(&mut self, points: u64) -> Vec<Achievement> {
        record_award(&mut self.scoreboard, &mut self.events, points, 1)
    }

    /// Back to a fresh session; bins and undrained events stay
    pub fn reset(&mut self, starting_lives: u8) {
        self.lives = starting_lives;
        self.items.clear();
        self.scoreboard.reset();
        self.time = 0.0;
        self.next_id = 1;
    }
}

/// Solar Builder state
#[derive(Debug, Clone)]
pub struct SolarState {
    /// Row-major cells
    pub cells: Vec<GridCell>,
    pub columns: u16,
    pub rows: u16,
    pub panels_placed: u32,
    /// Score plus energy as the resource counter
    pub scoreboard: Scoreboard,
    pub time: f64,
    pub events: Vec<GameEvent>,
}

impl SolarState {
    pub fn new(tuning: &SolarTuning, cells: Vec<GridCell>) -> Self {
        Self {
            cells,
            columns: tuning.columns,
            rows: tuning.rows,
            panels_placed: 0,
            scoreboard: Scoreboard::new(vec![AchievementRule::GreenEngineerAt {
                threshold: tuning.badge_energy,
            }]),
            time: 0.0,
            events: Vec::new(),
        }
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        (coord.col < self.columns && coord.row < self.rows)
            .then(|| coord.row as usize * self.columns as usize + coord.col as usize)
    }

    pub fn cell(&self, coord: CellCoord) -> Option<&GridCell> {
        self.index(coord).and_then(|i| self.cells.get(i))
    }

    pub fn cell_mut(&mut self, coord: CellCoord) -> Option<&mut GridCell> {
        self.index(coord).and_then(|i| self.cells.get_mut(i))
    }

    pub fn energy(&self) -> u64 {
        self.scoreboard.resource()
    }

    /// Credit a placed panel
    pub fn credit_panel(&mut self, points: u64, energy: u64) -> Vec<Achievement> {
        self.panels_placed += 1;
        record_award(&mut self.scoreboard, &mut self.events, points, energy)
    }

    /// Clear every panel and counter; exposure, pollution and undrained events stay
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.clear_panel();
        }
        self.panels_placed = 0;
        self.scoreboard.reset();
        self.time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::generator::generate_grid;
    use crate::sim::rng::seeded_rng;

    #[test]
    fn test_trash_state_defaults() {
        let state = TrashState::new(&TrashTuning::default()).unwrap();
        assert_eq!(state.lives, 3);
        assert_eq!(state.bins.len(), 4);
        assert!(state.items.is_empty());
    }

    #[test]
    fn test_lose_life_saturates() {
        let mut state = TrashState::new(&TrashTuning::default()).unwrap();
        assert!(!state.lose_life());
        assert!(!state.lose_life());
        assert!(state.lose_life());
        assert!(state.lose_life());
        assert_eq!(state.lives, 0);
        assert_eq!(state.events.last(), Some(&GameEvent::LifeLost { remaining: 0 }));
    }

    #[test]
    fn test_credit_sorted_emits_events() {
        let mut state = TrashState::new(&TrashTuning::default()).unwrap();
        for _ in 0..10 {
            state.credit_sorted(10);
        }
        assert_eq!(state.scoreboard.score(), 100);
        assert_eq!(state.items_sorted(), 10);
        assert!(state.events.contains(&GameEvent::ScoreChanged { delta: 10, total: 100 }));
        assert!(
            state
                .events
                .contains(&GameEvent::AchievementEarned(Achievement::ScoreMilestone(100)))
        );
    }

    #[test]
    fn test_solar_cell_lookup() {
        let tuning = SolarTuning::default();
        let cells = generate_grid(&mut seeded_rng(5), &tuning).unwrap();
        let state = SolarState::new(&tuning, cells);
        let cell = state.cell(CellCoord::new(3, 2)).unwrap();
        assert_eq!(cell.coord, CellCoord::new(3, 2));
        assert_eq!(cell.id, 19);
        assert!(state.cell(CellCoord::new(8, 0)).is_none());
        assert!(state.cell(CellCoord::new(0, 6)).is_none());
    }

    #[test]
    fn test_reset_keeps_undrained_events() {
        let mut state = TrashState::new(&TrashTuning::default()).unwrap();
        state.credit_sorted(10);
        state.reset(3);
        assert_eq!(state.scoreboard.score(), 0);
        assert_eq!(state.events, vec![GameEvent::ScoreChanged { delta: 10, total: 10 }]);

        let tuning = SolarTuning::default();
        let cells = generate_grid(&mut seeded_rng(5), &tuning).unwrap();
        let mut solar = SolarState::new(&tuning, cells);
        solar.credit_panel(50, 10);
        solar.reset();
        assert_eq!(solar.energy(), 0);
        assert_eq!(solar.events, vec![GameEvent::ScoreChanged { delta: 50, total: 50 }]);
    }
}
