//! Pointer interaction resolution
//!
//! Maps a gesture to at most one target and decides the outcome. Nothing is
//! mutated here; the session applies the outcome.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Bin, CellCoord, FallingItem, GridCell};

/// Why a gesture had no effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    /// Session is not running
    NotRunning,
    /// The dragged item no longer exists
    UnknownItem,
    /// Released over empty space
    NoTarget,
    /// Click landed outside the grid
    OutsideGrid,
    CellPolluted,
    CellOccupied,
}

/// Result of releasing a dragged item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropOutcome {
    Matched { item: u32, bin: u32 },
    Mismatched { item: u32, bin: u32 },
    Ignored(IgnoreReason),
}

/// Result of clicking a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementOutcome {
    Placed { coord: CellCoord, produced: u32 },
    Ignored(IgnoreReason),
}

/// Topmost bin containing `point` (later bins are drawn above earlier ones)
pub fn bin_at(bins: &[Bin], point: Vec2) -> Option<&Bin> {
    bins.iter().rev().find(|bin| bin.region.contains(point))
}

/// Decide what releasing `item` at `point` does
pub fn resolve_drop(bins: &[Bin], item: Option<&FallingItem>, point: Vec2) -> DropOutcome {
    let Some(item) = item else {
        return DropOutcome::Ignored(IgnoreReason::UnknownItem);
    };
    let Some(bin) = bin_at(bins, point) else {
        return DropOutcome::Ignored(IgnoreReason::NoTarget);
    };

    if bin.accepts == item.category {
        DropOutcome::Matched {
            item: item.id,
            bin: bin.id,
        }
    } else {
        DropOutcome::Mismatched {
            item: item.id,
            bin: bin.id,
        }
    }
}

/// Grid cell under a screen point, for a grid drawn from the origin
pub fn cell_at_point(point: Vec2, cell_size: f32, columns: u16, rows: u16) -> Option<CellCoord> {
    if !point.is_finite() || point.x < 0.0 || point.y < 0.0 || cell_size <= 0.0 {
        return None;
    }
    let col = (point.x / cell_size).floor();
    let row = (point.y / cell_size).floor();
    if col >= columns as f32 || row >= rows as f32 {
        return None;
    }
    Some(CellCoord::new(col as u16, row as u16))
}

/// Screen anchor for a cell's popup (its center)
pub fn cell_anchor(coord: CellCoord, cell_size: f32) -> Vec2 {
    Vec2::new(
        coord.col as f32 * cell_size + cell_size / 2.0,
        coord.row as f32 * cell_size + cell_size / 2.0,
    )
}

/// Decide whether a panel can go on `cell`
pub fn resolve_placement(cell: Option<&GridCell>) -> PlacementOutcome {
    let Some(cell) = cell else {
        return PlacementOutcome::Ignored(IgnoreReason::OutsideGrid);
    };
    if cell.is_polluted() {
        return PlacementOutcome::Ignored(IgnoreReason::CellPolluted);
    }
    if cell.is_occupied() {
        return PlacementOutcome::Ignored(IgnoreReason::CellOccupied);
    }
    PlacementOutcome::Placed {
        coord: cell.coord,
        produced: cell.potential(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Category, Rect};

    fn item(category: Category) -> FallingItem {
        FallingItem::new(42, category, Vec2::new(300.0, 200.0), 30.0, 0.0, Default::default()).unwrap()
    }

    #[test]
    fn test_match_and_mismatch() {
        let bins = Bin::standard_row(800.0, 600.0).unwrap();
        let plastic = item(Category::Plastic);

        let over_plastic = bins[0].region.center();
        assert_eq!(
            resolve_drop(&bins, Some(&plastic), over_plastic),
            DropOutcome::Matched { item: 42, bin: 0 }
        );

        let over_metal = bins[2].region.center();
        assert_eq!(
            resolve_drop(&bins, Some(&plastic), over_metal),
            DropOutcome::Mismatched { item: 42, bin: 2 }
        );
    }

    #[test]
    fn test_release_over_nothing() {
        let bins = Bin::standard_row(800.0, 600.0).unwrap();
        let paper = item(Category::Paper);
        assert_eq!(
            resolve_drop(&bins, Some(&paper), Vec2::new(10.0, 10.0)),
            DropOutcome::Ignored(IgnoreReason::NoTarget)
        );
        // The gap between two bins is empty space too
        let gap = Vec2::new(bins[0].region.max.x + 8.0, bins[0].region.center().y);
        assert_eq!(
            resolve_drop(&bins, Some(&paper), gap),
            DropOutcome::Ignored(IgnoreReason::NoTarget)
        );
        assert_eq!(
            resolve_drop(&bins, None, bins[1].region.center()),
            DropOutcome::Ignored(IgnoreReason::UnknownItem)
        );
    }

    #[test]
    fn test_topmost_bin_wins_on_overlap() {
        let under = Bin::new(
            0,
            Category::Paper,
            Rect::from_origin_size(Vec2::ZERO, Vec2::splat(100.0)),
        )
        .unwrap();
        let over = Bin::new(
            1,
            Category::Metal,
            Rect::from_origin_size(Vec2::splat(50.0), Vec2::splat(100.0)),
        )
        .unwrap();
        let bins = [under, over];
        assert_eq!(bin_at(&bins, Vec2::splat(75.0)).map(|b| b.id), Some(1));
        assert_eq!(bin_at(&bins, Vec2::splat(25.0)).map(|b| b.id), Some(0));
    }

    #[test]
    fn test_cell_at_point() {
        assert_eq!(cell_at_point(Vec2::new(0.0, 0.0), 60.0, 8, 6), Some(CellCoord::new(0, 0)));
        assert_eq!(cell_at_point(Vec2::new(130.0, 61.0), 60.0, 8, 6), Some(CellCoord::new(2, 1)));
        assert_eq!(cell_at_point(Vec2::new(480.0, 10.0), 60.0, 8, 6), None);
        assert_eq!(cell_at_point(Vec2::new(-1.0, 10.0), 60.0, 8, 6), None);
        assert_eq!(cell_at_point(Vec2::new(10.0, 360.0), 60.0, 8, 6), None);
    }

    #[test]
    fn test_cell_anchor_is_center() {
        assert_eq!(cell_anchor(CellCoord::new(2, 3), 60.0), Vec2::new(150.0, 210.0));
    }

    #[test]
    fn test_placement_rules() {
        let coord = CellCoord::new(1, 1);
        let mut cell = GridCell::new(9, coord, 85.0, false).unwrap();
        assert_eq!(
            resolve_placement(Some(&cell)),
            PlacementOutcome::Placed { coord, produced: 8 }
        );
        cell.occupy();
        assert_eq!(
            resolve_placement(Some(&cell)),
            PlacementOutcome::Ignored(IgnoreReason::CellOccupied)
        );

        let smog = GridCell::new(10, coord, 85.0, true).unwrap();
        assert_eq!(
            resolve_placement(Some(&smog)),
            PlacementOutcome::Ignored(IgnoreReason::CellPolluted)
        );
        assert_eq!(
            resolve_placement(None),
            PlacementOutcome::Ignored(IgnoreReason::OutsideGrid)
        );
    }
}
