/*!
Uniform-grid broad-phase accelerator.

Bodies are bucketed by the grid cells their bounding sphere overlaps. The
grid stores body **indices** into the world's arena, never references, so a
stale entry can at worst produce a false candidate that the narrow phase
rejects.

The grid is rebuilt from scratch every step ([`SpatialGrid::clear`] followed
by inserts). There is no incremental move or remove path; see
[`SpatialGrid::remove`].
*/

use std::collections::{HashMap, HashSet};

use crate::types::Vec3;

/// Large odd primes combined with XOR to hash integer cell coordinates.
/// Collisions across distinct cells are acceptable: they only merge buckets,
/// which over-approximates candidate sets the narrow phase filters anyway.
const HASH_P1: u64 = 73_856_093;
const HASH_P2: u64 = 19_349_663;
const HASH_P3: u64 = 83_492_791;

/// Uniform spatial hash over body positions.
pub struct SpatialGrid {
    cell_size: f32,
    inv_cell_size: f32,
    cells: HashMap<u64, Vec<usize>>,
}

impl SpatialGrid {
    /// Create a grid with the given cell size in meters.
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
        }
    }

    /// Cell size in meters.
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Empty every cell bucket. Called once per step before reinsertion.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Insert a body index into every cell overlapped by its bounding
    /// sphere.
    pub fn insert(&mut self, index: usize, position: Vec3, bounding_radius: f32) {
        let (min, max) = self.cell_bounds(position, bounding_radius);
        for x in min.0..=max.0 {
            for y in min.1..=max.1 {
                for z in min.2..=max.2 {
                    self.cells.entry(hash_cell(x, y, z)).or_default().push(index);
                }
            }
        }
    }

    /// Intentionally a no-op.
    ///
    /// Correctness relies on the full clear-and-rebuild each step; removing a
    /// body from individual buckets mid-step is never needed and is left out
    /// on purpose. Callers that destroy a body simply stop inserting it.
    pub fn remove(&mut self, _index: usize) {}

    /// De-duplicated indices of all bodies in cells overlapping the query
    /// sphere. A superset of the true overlaps; callers must narrow-test.
    pub fn query(&self, position: Vec3, radius: f32) -> Vec<usize> {
        let mut results = Vec::new();
        let mut seen = HashSet::new();
        let (min, max) = self.cell_bounds(position, radius);
        for x in min.0..=max.0 {
            for y in min.1..=max.1 {
                for z in min.2..=max.2 {
                    let Some(bucket) = self.cells.get(&hash_cell(x, y, z)) else {
                        continue;
                    };
                    for &index in bucket {
                        if seen.insert(index) {
                            results.push(index);
                        }
                    }
                }
            }
        }
        results
    }

    /// Inclusive integer cell range covered by a sphere.
    fn cell_bounds(&self, position: Vec3, radius: f32) -> ((i32, i32, i32), (i32, i32, i32)) {
        let lo = position.map(|c| ((c - radius) * self.inv_cell_size).floor() as i32);
        let hi = position.map(|c| ((c + radius) * self.inv_cell_size).floor() as i32);
        ((lo.x, lo.y, lo.z), (hi.x, hi.y, hi.z))
    }
}

#[inline]
fn hash_cell(x: i32, y: i32, z: i32) -> u64 {
    (x as u64).wrapping_mul(HASH_P1)
        ^ (y as u64).wrapping_mul(HASH_P2)
        ^ (z as u64).wrapping_mul(HASH_P3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_finds_inserted_body() {
        let mut grid = SpatialGrid::new(2.0);
        grid.insert(7, Vec3::new(1.0, 1.0, 1.0), 0.5);

        let hits = grid.query(Vec3::new(1.2, 0.8, 1.1), 0.5);
        assert_eq!(hits, vec![7]);
    }

    #[test]
    fn query_deduplicates_bodies_spanning_cells() {
        let mut grid = SpatialGrid::new(2.0);
        // Radius 3 spans many cells; the body must still appear once.
        grid.insert(0, Vec3::zeros(), 3.0);

        let hits = grid.query(Vec3::zeros(), 3.0);
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn clear_empties_all_buckets() {
        let mut grid = SpatialGrid::new(2.0);
        grid.insert(1, Vec3::zeros(), 1.0);
        grid.clear();

        assert!(grid.query(Vec3::zeros(), 5.0).is_empty());
    }

    #[test]
    fn remove_is_a_noop_by_design() {
        let mut grid = SpatialGrid::new(2.0);
        grid.insert(3, Vec3::zeros(), 1.0);
        grid.remove(3);

        // Still present: only clear-and-rebuild evicts entries.
        assert_eq!(grid.query(Vec3::zeros(), 1.0), vec![3]);
    }

    #[test]
    fn distant_bodies_are_not_candidates() {
        let mut grid = SpatialGrid::new(2.0);
        grid.insert(0, Vec3::new(100.0, 0.0, 0.0), 1.0);

        assert!(grid.query(Vec3::zeros(), 1.0).is_empty());
    }

    #[test]
    fn negative_coordinates_bucket_correctly() {
        let mut grid = SpatialGrid::new(2.0);
        grid.insert(5, Vec3::new(-3.0, -3.0, -3.0), 0.5);

        let hits = grid.query(Vec3::new(-3.1, -2.9, -3.0), 0.5);
        assert_eq!(hits, vec![5]);
    }
}
