use std::collections::{HashMap, HashSet};

use glam::Vec2;

use crate::core::shape::Aabb;

/// Uniform grid spatial partitioning used by the broad-phase.
pub struct SpatialGrid {
    cell_size: f32,
    grid: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            grid: HashMap::new(),
        }
    }

    fn world_to_grid(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.grid.clear();
    }

    pub fn insert(&mut self, proxy: usize, aabb: &Aabb) {
        let min_cell = self.world_to_grid(aabb.min);
        let max_cell = self.world_to_grid(aabb.max);

        for x in min_cell.0..=max_cell.0 {
            for y in min_cell.1..=max_cell.1 {
                self.grid.entry((x, y)).or_default().push(proxy);
            }
        }
    }

    /// Proxies whose cells overlap `aabb`, sorted and deduplicated.
    pub fn query(&self, aabb: &Aabb) -> Vec<usize> {
        let mut results = Vec::new();
        let min_cell = self.world_to_grid(aabb.min);
        let max_cell = self.world_to_grid(aabb.max);

        for x in min_cell.0..=max_cell.0 {
            for y in min_cell.1..=max_cell.1 {
                if let Some(proxies) = self.grid.get(&(x, y)) {
                    results.extend(proxies);
                }
            }
        }

        results.sort_unstable();
        results.dedup();
        results
    }
}

/// Broad phase driver returning potential proxy pairs.
pub struct BroadPhase {
    grid: SpatialGrid,
}

impl BroadPhase {
    pub fn new(cell_size: f32) -> Self {
        Self {
            grid: SpatialGrid::new(cell_size),
        }
    }

    /// Index pairs `(i, j)` with `i < j` whose boxes overlap, in ascending order.
    ///
    /// The grid is a `HashMap`, so pairs are sorted before they are returned.
    pub fn potential_pairs(&mut self, aabbs: &[Aabb]) -> Vec<(usize, usize)> {
        self.grid.clear();
        for (proxy, aabb) in aabbs.iter().enumerate() {
            self.grid.insert(proxy, aabb);
        }

        let mut pairs = Vec::new();
        let mut checked = HashSet::new();
        for (proxy, aabb) in aabbs.iter().enumerate() {
            for other in self.grid.query(aabb) {
                if other <= proxy {
                    continue;
                }
                if aabb.intersects(&aabbs[other]) && checked.insert((proxy, other)) {
                    pairs.push((proxy, other));
                }
            }
        }

        pairs.sort_unstable();
        pairs
    }
}
