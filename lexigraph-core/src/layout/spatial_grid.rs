// Spatial hash grid for neighbour queries.
//
// Instead of checking every pair of circles, points are bucketed into square
// cells so a query only inspects the cells its search radius covers. Used by
// the collision force and the label separation pass.

use std::collections::HashMap;

use crate::graph::Point;

/// A spatial hash grid of indexed points.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    /// Size of each cell in the grid.
    cell_size: f64,
    /// Map from cell coordinates to the indices whose point falls in that cell.
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SpatialGrid {
    /// Create a new spatial grid with the given cell size.
    /// Cell size should be roughly the largest expected search radius.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 { cell_size } else { 1.0 };
        Self { cell_size, cells: HashMap::new() }
    }

    /// Build a grid over `points`, indexed by position in the slice.
    pub fn from_points(cell_size: f64, points: &[Point]) -> Self {
        let mut grid = Self::new(cell_size);
        for (i, p) in points.iter().enumerate() {
            grid.insert(i, *p);
        }
        grid
    }

    fn cell_of(&self, x: f64, y: f64) -> (i64, i64) {
        ((x / self.cell_size).floor() as i64, (y / self.cell_size).floor() as i64)
    }

    /// Insert an index at a point. Non-finite points are ignored.
    pub fn insert(&mut self, index: usize, p: Point) {
        if !p.is_finite() {
            return;
        }
        let cell = self.cell_of(p.x, p.y);
        self.cells.entry(cell).or_default().push(index);
    }

    /// Indices whose point might lie within `radius` of `center`.
    /// May include false positives; caller does the exact distance check.
    pub fn query(&self, center: Point, radius: f64) -> Vec<usize> {
        let mut result = Vec::new();
        if !center.is_finite() || !radius.is_finite() {
            return result;
        }
        let (min_x, min_y) = self.cell_of(center.x - radius, center.y - radius);
        let (max_x, max_y) = self.cell_of(center.x + radius, center.y + radius);

        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                if let Some(list) = self.cells.get(&(cx, cy)) {
                    result.extend_from_slice(list);
                }
            }
        }
        result.sort_unstable();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_query() {
        let grid = SpatialGrid::from_points(100.0, &[Point::new(10.0, 10.0), Point::new(250.0, 250.0)]);

        let nearby = grid.query(Point::new(20.0, 20.0), 30.0);
        assert!(nearby.contains(&0));
        assert!(!nearby.contains(&1));
    }

    #[test]
    fn test_query_spans_cells_and_negative_coordinates() {
        let grid = SpatialGrid::from_points(10.0, &[Point::new(-1.0, -1.0), Point::new(1.0, 1.0)]);
        assert_eq!(grid.query(Point::ZERO, 2.0), vec![0, 1]);
    }

    #[test]
    fn test_degenerate_inputs() {
        let mut grid = SpatialGrid::new(0.0);
        grid.insert(0, Point::new(f64::NAN, 0.0));
        assert!(grid.query(Point::ZERO, 5.0).is_empty());
        assert!(grid.query(Point::ZERO, f64::INFINITY).is_empty());
    }
}
