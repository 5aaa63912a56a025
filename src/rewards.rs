//! Player rewards ledger
//!
//! Receives the score deltas sessions report, keeps the lifetime point total
//! and unlocks the dashboard badges. Persisted to LocalStorage on the web.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::platform::storage;
use crate::session::GameKind;
use crate::sim::GameEvent;

/// Receiver for points earned in a session
pub trait PointsReporter {
    fn report(&mut self, game: GameKind, delta: u64);
}

/// Dashboard badges, unlocked by lifetime points
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Badge {
    EcoSaver,
    PlanetHero,
    GuardianOfEarth,
}

impl Badge {
    pub const ALL: [Badge; 3] = [Badge::EcoSaver, Badge::PlanetHero, Badge::GuardianOfEarth];

    /// Lifetime points needed to unlock
    pub fn threshold(&self) -> u64 {
        match self {
            Badge::EcoSaver => 100,
            Badge::PlanetHero => 500,
            Badge::GuardianOfEarth => 1000,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Badge::EcoSaver => "Eco Saver",
            Badge::PlanetHero => "Planet Hero",
            Badge::GuardianOfEarth => "Guardian of Earth",
        }
    }
}

/// Lifetime points and unlocked badges
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardsLedger {
    pub total_points: u64,
    /// Points per game
    pub per_game: BTreeMap<GameKind, u64>,
    /// Unlocked badges, in unlock order
    pub badges: Vec<Badge>,
    /// Badges unlocked since the last `take_unlocked`
    #[serde(skip)]
    fresh: Vec<Badge>,
}

impl RewardsLedger {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "eco_arcade_rewards";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn points_for(&self, game: GameKind) -> u64 {
        self.per_game.get(&game).copied().unwrap_or(0)
    }

    pub fn has_badge(&self, badge: Badge) -> bool {
        self.badges.contains(&badge)
    }

    /// The next badge still to earn and the points missing for it
    pub fn next_badge(&self) -> Option<(Badge, u64)> {
        Badge::ALL
            .into_iter()
            .find(|b| !self.has_badge(*b))
            .map(|b| (b, b.threshold().saturating_sub(self.total_points)))
    }

    /// Badges unlocked since the last call
    pub fn take_unlocked(&mut self) -> Vec<Badge> {
        std::mem::take(&mut self.fresh)
    }

    fn unlock_badges(&mut self) {
        for badge in Badge::ALL {
            if self.total_points >= badge.threshold() && !self.has_badge(badge) {
                log::info!("Badge unlocked: {}", badge.title());
                self.badges.push(badge);
                self.fresh.push(badge);
            }
        }
    }

    /// Stored ledger, or an empty one
    pub fn load() -> Self {
        match storage::load_json::<RewardsLedger>(Self::STORAGE_KEY) {
            Some(ledger) => {
                log::info!("Loaded rewards: {} points", ledger.total_points);
                ledger
            }
            None => {
                log::info!("No rewards found, starting fresh");
                Self::new()
            }
        }
    }

    pub fn save(&self) {
        if storage::save_json(Self::STORAGE_KEY, self) {
            log::info!("Rewards saved ({} points)", self.total_points);
        }
    }
}

impl PointsReporter for RewardsLedger {
    fn report(&mut self, game: GameKind, delta: u64) {
        if delta == 0 {
            return;
        }
        self.total_points = self.total_points.saturating_add(delta);
        let entry = self.per_game.entry(game).or_insert(0);
        *entry = entry.saturating_add(delta);
        self.unlock_badges();
    }
}

/// Forward every score delta in `events` to `reporter`
pub fn forward_points<R: PointsReporter + ?Sized>(
    events: &[GameEvent],
    game: GameKind,
    reporter: &mut R,
) -> u64 {
    let mut forwarded = 0;
    for event in events {
        if let GameEvent::ScoreChanged { delta, .. } = event {
            reporter.report(game, *delta);
            forwarded += delta;
        }
    }
    forwarded
}
