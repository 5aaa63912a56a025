//! Randomized entity generation
//!
//! Every attribute is drawn inside its declared bounds, so construction only
//! fails when handed unvalidated tuning.

use glam::Vec2;

use super::entity::{Category, CellCoord, FallingItem, GridCell, SpeedBounds};
use super::rng::SimRng;
use crate::consts::*;
use crate::error::EntityError;
use crate::tuning::{SolarTuning, TrashTuning};

/// Where and how fast new items may appear
#[derive(Debug, Clone, Copy)]
pub struct SpawnBounds {
    pub field_width: f32,
    pub spawn_margin: f32,
    pub spawn_y: f32,
    pub speed: SpeedBounds,
}

impl From<&TrashTuning> for SpawnBounds {
    fn from(tuning: &TrashTuning) -> Self {
        Self {
            field_width: tuning.field_width,
            spawn_margin: tuning.spawn_margin,
            spawn_y: tuning.spawn_y,
            speed: tuning.speed_bounds(),
        }
    }
}

/// Generate one falling item: uniform category, x and speed
pub fn generate_item<R: SimRng + ?Sized>(
    rng: &mut R,
    bounds: &SpawnBounds,
    id: u32,
    now: f64,
) -> Result<FallingItem, EntityError> {
    let category = Category::ALL[rng.pick(Category::ALL.len())];
    let max_x = (bounds.field_width - bounds.spawn_margin).max(0.0);
    let x = rng.unit() * max_x;
    let speed = rng.between(bounds.speed.min, bounds.speed.max);

    FallingItem::new(id, category, Vec2::new(x, bounds.spawn_y), speed, now, bounds.speed)
}

/// Base sun exposure: brightest in the middle columns of the top row
pub fn sun_pattern(coord: CellCoord, columns: u16) -> f32 {
    let center = (columns / 2) as f32;
    let falloff = (coord.col as f32 - center).abs() * 10.0 + coord.row as f32 * 5.0;
    (EXPOSURE_MAX - falloff).max(EXPOSURE_FLOOR)
}

/// Generate one grid cell with jittered exposure and random pollution
pub fn generate_cell<R: SimRng + ?Sized>(
    rng: &mut R,
    tuning: &SolarTuning,
    coord: CellCoord,
    id: u32,
) -> Result<GridCell, EntityError> {
    let base = sun_pattern(coord, tuning.columns);
    let exposure = rng.between(base, (base + tuning.exposure_jitter).min(EXPOSURE_MAX));
    let polluted = rng.chance(tuning.pollution_chance);

    GridCell::new(id, coord, exposure, polluted)
}

/// Generate the full grid in row-major order; cell ids are their indices
pub fn generate_grid<R: SimRng + ?Sized>(
    rng: &mut R,
    tuning: &SolarTuning,
) -> Result<Vec<GridCell>, EntityError> {
    let mut cells = Vec::with_capacity(tuning.columns as usize * tuning.rows as usize);
    for row in 0..tuning.rows {
        for col in 0..tuning.columns {
            let id = cells.len() as u32;
            cells.push(generate_cell(rng, tuning, CellCoord::new(col, row), id)?);
        }
    }

    let polluted = cells.iter().filter(|c| c.is_polluted()).count();
    log::debug!(
        "Generated {}x{} grid ({} polluted)",
        tuning.columns,
        tuning.rows,
        polluted
    );
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::scripted::ScriptedRng;
    use crate::sim::rng::seeded_rng;

    #[test]
    fn test_item_attributes_in_bounds() {
        let bounds = SpawnBounds::from(&TrashTuning::default());
        let mut rng = seeded_rng(12345);
        for id in 0..500 {
            let item = generate_item(&mut rng, &bounds, id, 1.0).unwrap();
            assert!(item.pos.x >= 0.0 && item.pos.x < 700.0);
            assert_eq!(item.pos.y, SPAWN_Y);
            assert!((ITEM_MIN_SPEED..=ITEM_MAX_SPEED).contains(&item.speed));
            assert_eq!(item.created_at, 1.0);
        }
    }

    #[test]
    fn test_item_category_from_scripted_rng() {
        let bounds = SpawnBounds::from(&TrashTuning::default());
        // pick(4) with 0.6 -> index 2 (Metal); x = 0.0; speed = min
        let mut rng = ScriptedRng::new(&[0.6, 0.0, 0.0]);
        let item = generate_item(&mut rng, &bounds, 7, 0.0).unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.category, Category::Metal);
        assert_eq!(item.pos.x, 0.0);
        assert_eq!(item.speed, ITEM_MIN_SPEED);
    }

    #[test]
    fn test_all_categories_appear() {
        let bounds = SpawnBounds::from(&TrashTuning::default());
        let mut rng = seeded_rng(3);
        let mut seen = std::collections::BTreeSet::new();
        for id in 0..200 {
            seen.insert(generate_item(&mut rng, &bounds, id, 0.0).unwrap().category);
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_sun_pattern() {
        assert_eq!(sun_pattern(CellCoord::new(4, 0), 8), 100.0);
        assert_eq!(sun_pattern(CellCoord::new(0, 5), 8), 35.0);
        assert_eq!(sun_pattern(CellCoord::new(2, 1), 8), 75.0);
        // Wide grids bottom out at the floor
        assert_eq!(sun_pattern(CellCoord::new(0, 20), 40), EXPOSURE_FLOOR);
    }

    #[test]
    fn test_grid_in_bounds_and_row_major() {
        let tuning = SolarTuning::default();
        let mut rng = seeded_rng(2024);
        let grid = generate_grid(&mut rng, &tuning).unwrap();
        assert_eq!(grid.len(), 48);
        for (i, cell) in grid.iter().enumerate() {
            assert_eq!(cell.id as usize, i);
            assert_eq!(cell.coord.row as usize, i / 8);
            assert_eq!(cell.coord.col as usize, i % 8);
            assert!((EXPOSURE_MIN..=EXPOSURE_MAX).contains(&cell.exposure));
            assert!(cell.exposure >= sun_pattern(cell.coord, 8));
            assert!(!cell.is_occupied());
        }
    }

    #[test]
    fn test_pollution_probability_extremes() {
        let mut rng = seeded_rng(1);
        let clean = SolarTuning {
            pollution_chance: 0.0,
            ..Default::default()
        };
        assert!(generate_grid(&mut rng, &clean).unwrap().iter().all(|c| !c.is_polluted()));

        let smog = SolarTuning {
            pollution_chance: 1.0,
            ..Default::default()
        };
        assert!(generate_grid(&mut rng, &smog).unwrap().iter().all(|c| c.is_polluted()));
    }
}
