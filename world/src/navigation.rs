//! Breadth-first distance field rooted at the mission start.

use std::collections::VecDeque;

use sar_mission_core::{CellCoord, CellMask, DistanceMap};

/// Computes shortest 4-connected step counts from `start` over `passable`.
///
/// Runs in time linear in the number of passable cells. Cells that cannot be
/// reached are left out of the map; when `start` itself is not passable the
/// map is empty.
#[must_use]
pub fn compute_distance_field(start: CellCoord, passable: &CellMask) -> DistanceMap {
    let size = passable.size();
    let mut distances: Vec<Option<u32>> = vec![None; size.cell_count()];
    let mut queue = VecDeque::new();

    if let Some(index) = size.index(start).filter(|_| passable.contains(start)) {
        distances[index] = Some(0);
        queue.push_back((start, 0u32));
    }

    while let Some((cell, distance)) = queue.pop_front() {
        let next_distance = distance.saturating_add(1);

        for neighbor in size.neighbors(cell) {
            if !passable.contains(neighbor) {
                continue;
            }

            let Some(neighbor_index) = size.index(neighbor) else {
                continue;
            };

            if distances[neighbor_index].is_some() {
                continue;
            }

            distances[neighbor_index] = Some(next_distance);
            queue.push_back((neighbor, next_distance));
        }
    }

    DistanceMap::new(size, start, distances)
}
