//! Entity model for both mini-games
//!
//! Plain data plus derived attributes. Constructors validate every attribute
//! and reject out-of-range input instead of clamping it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::EntityError;

/// Waste category of a falling item (and the category a bin accepts)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Plastic,
    Paper,
    Metal,
    Organic,
}

impl Category {
    /// All categories, in bin display order
    pub const ALL: [Category; 4] = [
        Category::Plastic,
        Category::Paper,
        Category::Metal,
        Category::Organic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Plastic => "plastic",
            Category::Paper => "paper",
            Category::Metal => "metal",
            Category::Organic => "organic",
        }
    }

    /// Name of the item that falls for this category
    pub fn item_name(&self) -> &'static str {
        match self {
            Category::Plastic => "Plastic Bottle",
            Category::Paper => "Paper",
            Category::Metal => "Metal Can",
            Category::Organic => "Banana Peel",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Plastic => "🥤",
            Category::Paper => "📄",
            Category::Metal => "🥫",
            Category::Organic => "🍌",
        }
    }
}

/// Axis-aligned screen rectangle (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    /// Inclusive containment test
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

/// A drop target accepting one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bin {
    pub id: u32,
    pub accepts: Category,
    pub region: Rect,
}

impl Bin {
    pub fn new(id: u32, accepts: Category, region: Rect) -> Result<Self, EntityError> {
        let size = region.size();
        if !(region.min.is_finite() && region.max.is_finite()) || size.x <= 0.0 || size.y <= 0.0 {
            return Err(EntityError::EmptyRegion);
        }
        Ok(Self {
            id,
            accepts,
            region,
        })
    }

    /// The standard row of four bins, centered along the bottom of the field
    pub fn standard_row(field_width: f32, field_height: f32) -> Result<Vec<Bin>, EntityError> {
        let count = Category::ALL.len() as f32;
        let row_width = count * BIN_WIDTH + (count - 1.0) * BIN_GAP;
        let left = (field_width - row_width) / 2.0;
        let top = field_height - BIN_BOTTOM_MARGIN - BIN_HEIGHT;

        Category::ALL
            .iter()
            .enumerate()
            .map(|(i, &category)| {
                let origin = Vec2::new(left + i as f32 * (BIN_WIDTH + BIN_GAP), top);
                Bin::new(
                    i as u32,
                    category,
                    Rect::from_origin_size(origin, Vec2::new(BIN_WIDTH, BIN_HEIGHT)),
                )
            })
            .collect()
    }
}

/// Allowed fall-speed range (pixels per second)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedBounds {
    pub min: f32,
    pub max: f32,
}

impl Default for SpeedBounds {
    fn default() -> Self {
        Self {
            min: ITEM_MIN_SPEED,
            max: ITEM_MAX_SPEED,
        }
    }
}

/// A piece of trash falling toward the bins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallingItem {
    pub id: u32,
    pub category: Category,
    pub pos: Vec2,
    /// Fall speed in pixels per second
    pub speed: f32,
    /// Session time (seconds) when the item spawned
    pub created_at: f64,
}

impl FallingItem {
    pub fn new(
        id: u32,
        category: Category,
        pos: Vec2,
        speed: f32,
        created_at: f64,
        bounds: SpeedBounds,
    ) -> Result<Self, EntityError> {
        EntityError::check_finite("x", pos.x as f64)?;
        EntityError::check_finite("y", pos.y as f64)?;
        EntityError::check_range("speed", speed as f64, bounds.min as f64, bounds.max as f64)?;
        EntityError::check_finite("created_at", created_at)?;
        Ok(Self {
            id,
            category,
            pos,
            speed,
            created_at,
        })
    }

    /// Move down by `speed * elapsed`
    #[inline]
    pub fn advance(&mut self, elapsed: f32) {
        self.pos.y += self.speed * elapsed;
    }

    /// Past the lower edge of the field
    #[inline]
    pub fn is_below(&self, bound: f32) -> bool {
        self.pos.y > bound
    }
}

/// Integer grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub col: u16,
    pub row: u16,
}

impl CellCoord {
    pub const fn new(col: u16, row: u16) -> Self {
        Self { col, row }
    }
}

/// Energy a panel produces on a cell with the given sun exposure
#[inline]
pub fn produced_value(exposure: f32) -> u32 {
    (exposure / 10.0).floor().max(0.0) as u32
}

/// One cell of the solar grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    pub id: u32,
    pub coord: CellCoord,
    /// Sun exposure, fixed for the session
    pub exposure: f32,
    polluted: bool,
    occupied: bool,
    produced: u32,
}

impl GridCell {
    pub fn new(id: u32, coord: CellCoord, exposure: f32, polluted: bool) -> Result<Self, EntityError> {
        EntityError::check_range(
            "exposure",
            exposure as f64,
            EXPOSURE_MIN as f64,
            EXPOSURE_MAX as f64,
        )?;
        Ok(Self {
            id,
            coord,
            exposure,
            polluted,
            occupied: false,
            produced: 0,
        })
    }

    /// Rebuild a cell from stored parts, enforcing the polluted/occupied exclusion
    pub fn from_parts(
        id: u32,
        coord: CellCoord,
        exposure: f32,
        polluted: bool,
        occupied: bool,
    ) -> Result<Self, EntityError> {
        if polluted && occupied {
            return Err(EntityError::PollutedAndOccupied {
                col: coord.col,
                row: coord.row,
            });
        }
        let mut cell = Self::new(id, coord, exposure, polluted)?;
        if occupied {
            cell.occupy();
        }
        Ok(cell)
    }

    pub fn is_polluted(&self) -> bool {
        self.polluted
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// 0 until a panel is placed
    pub fn produced(&self) -> u32 {
        self.produced
    }

    /// What a panel here would produce
    pub fn potential(&self) -> u32 {
        produced_value(self.exposure)
    }

    pub fn can_place(&self) -> bool {
        !self.polluted && !self.occupied
    }

    /// Place a panel. Returns the produced value, or `None` if the cell is
    /// polluted or already occupied.
    pub fn occupy(&mut self) -> Option<u32> {
        if !self.can_place() {
            return None;
        }
        self.occupied = true;
        self.produced = self.potential();
        Some(self.produced)
    }

    /// Remove the panel (session reset only)
    pub(crate) fn clear_panel(&mut self) {
        self.occupied = false;
        self.produced = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_produced_value_floors() {
        assert_eq!(produced_value(85.0), 8);
        assert_eq!(produced_value(89.9), 8);
        assert_eq!(produced_value(100.0), 10);
        assert_eq!(produced_value(10.0), 1);
    }

    #[test]
    fn test_item_rejects_speed_out_of_bounds() {
        let bounds = SpeedBounds::default();
        let too_fast = FallingItem::new(1, Category::Metal, Vec2::ZERO, 500.0, 0.0, bounds);
        assert!(matches!(too_fast, Err(EntityError::OutOfRange { attribute: "speed", .. })));

        let nan_pos = FallingItem::new(1, Category::Metal, Vec2::new(f32::NAN, 0.0), 30.0, 0.0, bounds);
        assert!(matches!(nan_pos, Err(EntityError::NotFinite { attribute: "x", .. })));
    }

    #[test]
    fn test_item_advance() {
        let mut item =
            FallingItem::new(1, Category::Paper, Vec2::new(10.0, 0.0), 30.0, 0.0, SpeedBounds::default())
                .unwrap();
        item.advance(0.1);
        assert!((item.pos.y - 3.0).abs() < 1e-5);
        assert!(!item.is_below(3.0));
        item.advance(0.1);
        assert!(item.is_below(3.0));
    }

    #[test]
    fn test_cell_rejects_exposure_out_of_range() {
        assert!(GridCell::new(0, CellCoord::new(0, 0), 5.0, false).is_err());
        assert!(GridCell::new(0, CellCoord::new(0, 0), 120.0, false).is_err());
        assert!(GridCell::new(0, CellCoord::new(0, 0), 10.0, false).is_ok());
    }

    #[test]
    fn test_cell_occupy_once() {
        let mut cell = GridCell::new(0, CellCoord::new(2, 3), 85.0, false).unwrap();
        assert_eq!(cell.produced(), 0);
        assert_eq!(cell.occupy(), Some(8));
        assert!(cell.is_occupied());
        assert_eq!(cell.occupy(), None);
        assert_eq!(cell.produced(), 8);
    }

    #[test]
    fn test_polluted_cell_never_occupied() {
        let mut cell = GridCell::new(0, CellCoord::new(0, 0), 90.0, true).unwrap();
        assert_eq!(cell.occupy(), None);
        assert!(!cell.is_occupied());

        let err = GridCell::from_parts(0, CellCoord::new(1, 1), 90.0, true, true).unwrap_err();
        assert_eq!(err, EntityError::PollutedAndOccupied { col: 1, row: 1 });
    }

    #[test]
    fn test_standard_row_layout() {
        let bins = Bin::standard_row(800.0, 600.0).unwrap();
        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].accepts, Category::Plastic);
        assert_eq!(bins[3].accepts, Category::Organic);
        // Centered: 4 * 80 + 3 * 16 = 368 wide
        assert!((bins[0].region.min.x - 216.0).abs() < 1e-4);
        assert!((bins[3].region.max.x - 584.0).abs() < 1e-4);
        assert!((bins[0].region.max.y - 568.0).abs() < 1e-4);
        for pair in bins.windows(2) {
            assert!(pair[0].region.max.x < pair[1].region.min.x);
        }
    }

    #[test]
    fn test_bin_rejects_empty_region() {
        let region = Rect::from_origin_size(Vec2::ZERO, Vec2::new(0.0, 10.0));
        assert_eq!(Bin::new(0, Category::Paper, region).unwrap_err(), EntityError::EmptyRegion);
    }
}
