//! Score, resource totals, feedback popups and achievements
//!
//! Achievements are threshold predicates over the totals. Each change only
//! checks the thresholds crossed since the previous totals; the tracker also
//! remembers which ones were announced so each fires once per session.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_POPUPS;

/// Something worth celebrating
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Achievement {
    /// Score reached this multiple of the celebration step
    ScoreMilestone(u64),
    /// Generated enough clean energy for the Green Engineer badge
    GreenEngineer,
}

impl Achievement {
    pub fn title(&self) -> String {
        match self {
            Achievement::ScoreMilestone(points) => format!("{} points!", points),
            Achievement::GreenEngineer => "Green Engineer!".to_string(),
        }
    }
}

/// A threshold rule producing achievements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementRule {
    /// One milestone per multiple of `step` points
    ScoreEvery { step: u64 },
    /// `GreenEngineer` once the resource total reaches `threshold`
    GreenEngineerAt { threshold: u64 },
}

impl AchievementRule {
    /// Achievements whose threshold lies in `(prev, now]`
    fn crossed(&self, prev: Totals, now: Totals) -> Vec<Achievement> {
        match *self {
            AchievementRule::ScoreEvery { step } if step > 0 => {
                (prev.score / step + 1..=now.score / step)
                    .map(|k| Achievement::ScoreMilestone(k * step))
                    .collect()
            }
            AchievementRule::ScoreEvery { .. } => Vec::new(),
            AchievementRule::GreenEngineerAt { threshold } => {
                if now.resource >= threshold {
                    vec![Achievement::GreenEngineer]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

/// Score and secondary resource (items sorted, energy, ...)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub score: u64,
    pub resource: u64,
}

/// Remembers which achievements were already announced
#[derive(Debug, Clone)]
pub struct AchievementTracker {
    rules: Vec<AchievementRule>,
    shown: BTreeSet<Achievement>,
    /// Totals at the previous evaluation
    last: Totals,
}

impl AchievementTracker {
    pub fn new(rules: Vec<AchievementRule>) -> Self {
        Self {
            rules,
            shown: BTreeSet::new(),
            last: Totals::default(),
        }
    }

    /// Check the thresholds crossed since the last call; returns only the
    /// ones not announced before
    pub fn evaluate(&mut self, totals: Totals) -> Vec<Achievement> {
        let prev = std::mem::replace(&mut self.last, totals);
        let mut fresh = Vec::new();
        for rule in &self.rules {
            for achievement in rule.crossed(prev, totals) {
                if self.shown.insert(achievement) {
                    fresh.push(achievement);
                }
            }
        }
        fresh
    }

    pub fn earned(&self) -> impl Iterator<Item = Achievement> + '_ {
        self.shown.iter().copied()
    }

    pub fn clear(&mut self) {
        self.shown.clear();
        self.last = Totals::default();
    }
}

/// What a popup shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopupKind {
    /// "+10"
    Points,
    /// "+8⚡"
    Energy,
}

/// Floating feedback annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Popup {
    pub id: u32,
    pub kind: PopupKind,
    pub amount: u64,
    pub pos: Vec2,
    pub created_at: f64,
    pub expires_at: f64,
}

impl Popup {
    pub fn label(&self) -> String {
        match self.kind {
            PopupKind::Points => format!("+{}", self.amount),
            PopupKind::Energy => format!("+{}⚡", self.amount),
        }
    }

    /// Fraction of lifetime elapsed at `now`, for fade-out
    pub fn progress(&self, now: f64) -> f32 {
        let span = self.expires_at - self.created_at;
        if span <= 0.0 {
            return 1.0;
        }
        ((now - self.created_at) / span).clamp(0.0, 1.0) as f32
    }
}

/// Bounded list of live popups, oldest first
#[derive(Debug, Clone, Default)]
pub struct PopupQueue {
    popups: Vec<Popup>,
    next_id: u32,
}

impl PopupQueue {
    /// Add a popup, evicting the oldest when full
    pub fn push(&mut self, kind: PopupKind, amount: u64, pos: Vec2, now: f64, ttl: f32) {
        if self.popups.len() >= MAX_POPUPS {
            self.popups.remove(0);
        }
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.popups.push(Popup {
            id,
            kind,
            amount,
            pos,
            created_at: now,
            expires_at: now + ttl as f64,
        });
    }

    /// Drop popups whose expiry has passed
    pub fn expire(&mut self, now: f64) {
        self.popups.retain(|p| p.expires_at > now);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Popup> {
        self.popups.iter()
    }

    pub fn len(&self) -> usize {
        self.popups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.popups.is_empty()
    }

    pub fn clear(&mut self) {
        self.popups.clear();
    }
}

/// Totals, popups and achievements for one session
#[derive(Debug, Clone)]
pub struct Scoreboard {
    totals: Totals,
    achievements: AchievementTracker,
    pub popups: PopupQueue,
}

impl Scoreboard {
    pub fn new(rules: Vec<AchievementRule>) -> Self {
        Self {
            totals: Totals::default(),
            achievements: AchievementTracker::new(rules),
            popups: PopupQueue::default(),
        }
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn score(&self) -> u64 {
        self.totals.score
    }

    pub fn resource(&self) -> u64 {
        self.totals.resource
    }

    /// Add points and resource (both only grow); returns newly earned achievements
    pub fn award(&mut self, points: u64, resource: u64) -> Vec<Achievement> {
        self.totals.score = self.totals.score.saturating_add(points);
        self.totals.resource = self.totals.resource.saturating_add(resource);
        self.achievements.evaluate(self.totals)
    }

    pub fn earned(&self) -> Vec<Achievement> {
        self.achievements.earned().collect()
    }

    /// Zero everything and forget announced achievements
    pub fn reset(&mut self) {
        self.totals = Totals::default();
        self.achievements.clear();
        self.popups.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_milestone_fires_once() {
        let mut board = Scoreboard::new(vec![AchievementRule::ScoreEvery { step: 100 }]);
        for _ in 0..9 {
            assert!(board.award(10, 1).is_empty());
        }
        assert_eq!(board.award(10, 1), vec![Achievement::ScoreMilestone(100)]);
        // Still a multiple of 100 after a zero award: no repeat
        assert!(board.award(0, 0).is_empty());
        assert!(board.award(10, 1).is_empty());
    }

    #[test]
    fn test_milestone_jumped_over_still_fires() {
        let mut board = Scoreboard::new(vec![AchievementRule::ScoreEvery { step: 100 }]);
        board.award(95, 0);
        assert_eq!(board.award(15, 0), vec![Achievement::ScoreMilestone(100)]);
        assert_eq!(
            board.award(200, 0),
            vec![Achievement::ScoreMilestone(200), Achievement::ScoreMilestone(300)]
        );
    }

    #[test]
    fn test_only_crossed_milestones_are_derived() {
        let rule = AchievementRule::ScoreEvery { step: 100 };
        let at = |score| Totals { score, resource: 0 };
        // Near the top of the range: one step, not every milestone below it
        let top = u64::MAX / 100 * 100;
        assert_eq!(
            rule.crossed(at(top - 1), at(top)),
            vec![Achievement::ScoreMilestone(top)]
        );
        assert!(rule.crossed(at(top), at(u64::MAX)).is_empty());

        let mut tracker = AchievementTracker::new(vec![rule]);
        assert_eq!(
            tracker.evaluate(at(250)),
            vec![Achievement::ScoreMilestone(100), Achievement::ScoreMilestone(200)]
        );
        assert_eq!(
            tracker.evaluate(at(420)),
            vec![Achievement::ScoreMilestone(300), Achievement::ScoreMilestone(400)]
        );
    }

    #[test]
    fn test_green_engineer_threshold() {
        let mut board = Scoreboard::new(vec![AchievementRule::GreenEngineerAt { threshold: 100 }]);
        assert!(board.award(495, 99).is_empty());
        assert_eq!(board.award(5, 1), vec![Achievement::GreenEngineer]);
        assert!(board.award(50, 10).is_empty());
        assert_eq!(board.earned(), vec![Achievement::GreenEngineer]);
    }

    #[test]
    fn test_reset_rearms_achievements() {
        let mut board = Scoreboard::new(vec![AchievementRule::GreenEngineerAt { threshold: 10 }]);
        assert_eq!(board.award(0, 10).len(), 1);
        board.reset();
        assert_eq!(board.totals(), Totals::default());
        assert!(board.earned().is_empty());
        assert_eq!(board.award(0, 10).len(), 1);
    }

    #[test]
    fn test_popups_expire_by_time() {
        let mut queue = PopupQueue::default();
        queue.push(PopupKind::Points, 10, Vec2::ZERO, 0.0, 1.5);
        queue.push(PopupKind::Energy, 8, Vec2::ONE, 1.0, 2.0);
        queue.expire(1.4);
        assert_eq!(queue.len(), 2);
        queue.expire(1.5);
        assert_eq!(queue.len(), 1);
        let left = queue.iter().next().unwrap();
        assert_eq!(left.label(), "+8⚡");
        assert!((left.progress(2.0) - 0.5).abs() < 1e-6);
        queue.expire(3.0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_popup_queue_is_bounded() {
        let mut queue = PopupQueue::default();
        for i in 0..(MAX_POPUPS as u64 + 5) {
            queue.push(PopupKind::Points, i, Vec2::ZERO, 0.0, 10.0);
        }
        assert_eq!(queue.len(), MAX_POPUPS);
        // Oldest were evicted
        assert_eq!(queue.iter().next().unwrap().amount, 5);
    }
}
