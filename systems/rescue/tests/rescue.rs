use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sar_mission_core::{CellCoord, CellMask, GridSize};
use sar_mission_system_rescue::RescuePointSelector;

#[test]
fn single_free_cell_yields_single_point() {
    let size = GridSize::new(5, 5);
    let passable = CellMask::from_cells(
        size,
        [
            CellCoord::new(1, 1),
            CellCoord::new(2, 1),
            CellCoord::new(3, 1),
        ],
    );
    let excluded = CellMask::from_cells(size, [CellCoord::new(1, 1), CellCoord::new(3, 1)]);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let selector = RescuePointSelector::new(3);
    let points = selector.select(&passable, &excluded, &mut rng);

    assert_eq!(selector.count(), 3);
    assert_eq!(points, vec![CellCoord::new(2, 1)]);
}

#[test]
fn points_are_distinct_and_free() {
    let size = GridSize::new(12, 12);
    let passable = CellMask::from_cells(size, size.cells().filter(|cell| !size.is_border(*cell)));
    let excluded = CellMask::from_cells(size, size.square(CellCoord::new(5, 5), 2));

    for seed in 0..16 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let points = RescuePointSelector::new(6).select(&passable, &excluded, &mut rng);

        assert_eq!(points.len(), 6);
        let unique = CellMask::from_cells(size, points.iter().copied());
        assert_eq!(unique.len(), 6, "seed {seed}: duplicate rescue point");
        for point in &points {
            assert!(passable.contains(*point));
            assert!(!excluded.contains(*point));
        }
    }
}

#[test]
fn same_seed_reproduces_points() {
    let size = GridSize::new(8, 8);
    let passable = CellMask::from_cells(size, size.cells());
    let excluded = CellMask::new(size);
    let selector = RescuePointSelector::new(3);

    let first = selector.select(&passable, &excluded, &mut ChaCha8Rng::seed_from_u64(44));
    let second = selector.select(&passable, &excluded, &mut ChaCha8Rng::seed_from_u64(44));

    assert_eq!(first, second);
}
