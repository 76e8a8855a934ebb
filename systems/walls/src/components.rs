//! 4-connected labelling of wall cells.

use sar_mission_core::{CellCoord, CellMask};

/// Splits the wall set into 4-connected components.
///
/// Components are discovered in row-major order of their first cell and
/// flood-filled with an explicit stack, so deep or long walls never recurse.
#[must_use]
pub fn wall_components(walls: &CellMask) -> Vec<Vec<CellCoord>> {
    let size = walls.size();
    let mut visited = CellMask::new(size);
    let mut components = Vec::new();
    let mut stack = Vec::new();

    for seed in walls.iter() {
        if !visited.insert(seed) {
            continue;
        }

        stack.push(seed);
        let mut component = Vec::new();
        while let Some(cell) = stack.pop() {
            component.push(cell);
            for neighbor in size.neighbors(cell) {
                if walls.contains(neighbor) && visited.insert(neighbor) {
                    stack.push(neighbor);
                }
            }
        }
        components.push(component);
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use sar_mission_core::GridSize;

    #[test]
    fn diagonal_contact_does_not_join_components() {
        let size = GridSize::new(4, 4);
        let walls = CellMask::from_cells(
            size,
            [
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(2, 1),
                CellCoord::new(3, 3),
            ],
        );

        let components = wall_components(&walls);

        assert_eq!(components.len(), 3);
        assert_eq!(components[0].len(), 2);
        assert_eq!(components[1], vec![CellCoord::new(2, 1)]);
        assert_eq!(components[2], vec![CellCoord::new(3, 3)]);
    }

    #[test]
    fn long_snake_is_single_component() {
        let size = GridSize::new(64, 64);
        let mut walls = CellMask::new(size);
        for row in 0..64 {
            if row % 2 == 0 {
                walls.extend((0..64).map(|column| CellCoord::new(column, row)));
            } else {
                let column = if row % 4 == 1 { 63 } else { 0 };
                let _ = walls.insert(CellCoord::new(column, row));
            }
        }

        let components = wall_components(&walls);

        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), walls.len());
    }

    #[test]
    fn empty_mask_has_no_components() {
        let walls = CellMask::new(GridSize::new(5, 5));
        assert!(wall_components(&walls).is_empty());
    }
}
