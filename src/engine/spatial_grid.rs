//! Uniform spatial grid
//!
//! Buckets entity handles by cell so collision and AI only look at the
//! handful of dinosaurs near the player instead of all of them. The grid is
//! throwaway: it is rebuilt from the live set every tick and never holds
//! entity data, only handles.

use macroquad::math::Vec2;
use rustc_hash::FxHashMap;

use super::entity::Entity;

/// Anything with a position in tile coordinates.
pub trait Positioned {
    fn position(&self) -> Vec2;
}

impl Positioned for Vec2 {
    fn position(&self) -> Vec2 {
        *self
    }
}

pub struct SpatialGrid {
    cell_size: f32,
    cells: FxHashMap<(i32, i32), Vec<Entity>>,
    count: usize,
}

impl SpatialGrid {
    /// `cell_size` is in tiles and must be positive.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size > 0.0 { cell_size } else { 1.0 };
        Self {
            cell_size,
            cells: FxHashMap::default(),
            count: 0,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cell_of(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Empty every bucket. Bucket allocations are kept for the next rebuild.
    pub fn clear(&mut self) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        self.count = 0;
    }

    pub fn insert(&mut self, handle: Entity, item: &impl Positioned) {
        let pos = item.position();
        if !pos.is_finite() {
            tracing::warn!(?handle, "not indexing entity with non-finite position");
            return;
        }
        let cell = self.cell_of(pos.x, pos.y);
        self.cells.entry(cell).or_default().push(handle);
        self.count += 1;
    }

    /// Clear and re-insert everything from `items`.
    pub fn rebuild<'a, T: Positioned + 'a>(&mut self, items: impl IntoIterator<Item = (Entity, &'a T)>) {
        self.clear();
        for (handle, item) in items {
            self.insert(handle, item);
        }
    }

    /// Handles in every cell within `radius_cells` (Chebyshev) of the cell
    /// containing `(x, y)`.
    pub fn query_nearby(&self, x: f32, y: f32, radius_cells: i32) -> Vec<Entity> {
        let (cx, cy) = self.cell_of(x, y);
        let r = radius_cells.max(0);
        self.collect_cells(cx - r, cy - r, cx + r, cy + r)
    }

    /// Handles in every cell overlapping the rectangle, corners included.
    pub fn query_range(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<Entity> {
        let (ax, ay) = self.cell_of(x0.min(x1), y0.min(y1));
        let (bx, by) = self.cell_of(x0.max(x1), y0.max(y1));
        self.collect_cells(ax, ay, bx, by)
    }

    fn collect_cells(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Entity> {
        let mut out = Vec::new();
        // sparse grids: walking the map is cheaper than walking a huge rectangle
        let area = (i64::from(x1 - x0) + 1) * (i64::from(y1 - y0) + 1);
        if area > self.cells.len() as i64 {
            for (&(cx, cy), bucket) in &self.cells {
                if cx >= x0 && cx <= x1 && cy >= y0 && cy <= y1 {
                    out.extend_from_slice(bucket);
                }
            }
        } else {
            for cy in y0..=y1 {
                for cx in x0..=x1 {
                    if let Some(bucket) = self.cells.get(&(cx, cy)) {
                        out.extend_from_slice(bucket);
                    }
                }
            }
        }
        out
    }

    /// Number of indexed handles.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::entity::EntityAllocator;

    fn grid_with(points: &[(f32, f32)]) -> (SpatialGrid, Vec<Entity>) {
        let mut alloc = EntityAllocator::new();
        let mut grid = SpatialGrid::new(10.0);
        let mut handles = Vec::new();
        for &(x, y) in points {
            let e = alloc.allocate();
            grid.insert(e, &Vec2::new(x, y));
            handles.push(e);
        }
        (grid, handles)
    }

    #[test]
    fn test_nearby_includes_neighbour_cells() {
        let (grid, h) = grid_with(&[(5.0, 5.0), (15.0, 5.0), (25.0, 5.0), (35.0, 35.0)]);
        let mut found = grid.query_nearby(5.0, 5.0, 1);
        found.sort();
        assert_eq!(found, vec![h[0], h[1]]);

        let mut wide = grid.query_nearby(15.0, 15.0, 2);
        wide.sort();
        assert_eq!(wide, vec![h[0], h[1], h[2], h[3]]);
    }

    #[test]
    fn test_radius_zero_is_own_cell() {
        let (grid, h) = grid_with(&[(1.0, 1.0), (9.9, 9.9), (10.0, 10.0)]);
        let mut found = grid.query_nearby(0.0, 0.0, 0);
        found.sort();
        assert_eq!(found, vec![h[0], h[1]]);
    }

    #[test]
    fn test_negative_coordinates_floor() {
        let grid = SpatialGrid::new(10.0);
        assert_eq!(grid.cell_of(-0.5, 3.0), (-1, 0));
    }

    #[test]
    fn test_full_range_returns_everything_once() {
        let points: Vec<(f32, f32)> = (0..50)
            .map(|i| ((i * 37 % 512) as f32, (i * 91 % 512) as f32))
            .collect();
        let (grid, mut handles) = grid_with(&points);
        let mut found = grid.query_range(0.0, 0.0, 512.0, 512.0);
        found.sort();
        handles.sort();
        assert_eq!(found, handles);
        assert_eq!(grid.len(), 50);
    }

    #[test]
    fn test_range_corners_inclusive() {
        let (grid, h) = grid_with(&[(0.0, 0.0), (29.0, 29.0), (30.0, 30.0)]);
        // reversed corners are normalised
        let mut found = grid.query_range(20.0, 20.0, 0.0, 0.0);
        found.sort();
        assert_eq!(found, vec![h[0], h[1]]);
        assert!(!found.contains(&h[2]));
    }

    #[test]
    fn test_rebuild_replaces_contents() {
        let (mut grid, _) = grid_with(&[(1.0, 1.0), (2.0, 2.0)]);
        let mut alloc = EntityAllocator::new();
        let e = alloc.allocate();
        let p = Vec2::new(50.0, 50.0);
        grid.rebuild([(e, &p)]);
        assert_eq!(grid.len(), 1);
        assert!(grid.query_nearby(1.0, 1.0, 0).is_empty());
        assert_eq!(grid.query_nearby(50.0, 50.0, 0), vec![e]);
    }
}
