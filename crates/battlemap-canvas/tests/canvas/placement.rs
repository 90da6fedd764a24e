use std::collections::HashSet;

use battlemap_canvas::placement::{active_bounds, resolve_duplicate, resolve_placement, start_cell};
use battlemap_canvas::{spiral_search, GridCell, GridSize, PlacementBounds, PlacementHint, Rect};
use proptest::prelude::*;

fn occupied(cells: &[(i32, i32)]) -> HashSet<GridCell> {
    cells.iter().map(|&(x, y)| GridCell::new(x, y)).collect()
}

#[test]
fn test_spiral_steps_right_then_down() {
    let bounds = PlacementBounds::new(0, 0, 10, 10);
    let taken = occupied(&[(0, 0), (1, 0)]);
    let cell = spiral_search(GridCell::new(0, 0), &bounds, |c| !taken.contains(&c));
    assert_eq!(cell, GridCell::new(1, 1));
}

#[test]
fn test_spiral_visits_ring_in_order() {
    let bounds = PlacementBounds::new(0, 0, 10, 10);
    let taken = occupied(&[(5, 5), (6, 5), (6, 6), (5, 6), (4, 6)]);
    let cell = spiral_search(GridCell::new(5, 5), &bounds, |c| !taken.contains(&c));
    assert_eq!(cell, GridCell::new(4, 5));
}

#[test]
fn test_start_clamped_into_bounds() {
    let bounds = PlacementBounds::new(0, 0, 10, 10);
    let cell = spiral_search(GridCell::new(-5, 20), &bounds, |_| true);
    assert_eq!(cell, GridCell::new(0, 10));
}

#[test]
fn test_full_bounds_falls_back_to_start() {
    let bounds = PlacementBounds::new(2, 2, 4, 4);
    let cell = spiral_search(GridCell::new(9, 3), &bounds, |_| false);
    assert_eq!(cell, GridCell::new(4, 3));
}

#[test]
fn test_search_skips_cells_outside_bounds() {
    let bounds = PlacementBounds::new(0, 0, 0, 3);
    let taken = occupied(&[(0, 0)]);
    let cell = spiral_search(GridCell::new(0, 0), &bounds, |c| !taken.contains(&c));
    assert_eq!(cell, GridCell::new(0, 1));
}

#[test]
fn test_bounds_from_presentation_rect() {
    let grid = GridSize::new(50).unwrap();
    let bounds = PlacementBounds::from_rect(&Rect::new(75.0, 75.0, 200.0, 100.0), grid);
    assert_eq!(bounds, PlacementBounds::new(1, 1, 5, 3));
}

#[test]
fn test_active_bounds_prefers_presentation() {
    let grid = GridSize::new(50).unwrap();
    let rect = Rect::new(100.0, 100.0, 100.0, 100.0);
    assert_eq!(
        active_bounds(1000.0, 1000.0, grid, Some(&rect)),
        PlacementBounds::new(2, 2, 3, 3)
    );
    assert_eq!(
        active_bounds(1000.0, 1000.0, grid, None),
        PlacementBounds::new(0, 0, 19, 19)
    );
    let degenerate = Rect::new(100.0, 100.0, 0.0, 100.0);
    assert_eq!(
        active_bounds(1000.0, 1000.0, grid, Some(&degenerate)),
        PlacementBounds::new(0, 0, 19, 19)
    );
}

#[test]
fn test_start_cell_priority() {
    let bounds = PlacementBounds::new(0, 0, 10, 10);
    let inside = GridCell::new(3, 4);
    let outside = GridCell::new(30, 4);
    let viewport = GridCell::new(7, 7);

    let hint = |last_click: Option<GridCell>, presentation: bool| PlacementHint {
        last_click,
        viewport_center: Some(viewport),
        presentation,
    };

    assert_eq!(start_cell(&bounds, &hint(Some(inside), true)), inside);
    assert_eq!(start_cell(&bounds, &hint(Some(inside), false)), inside);
    assert_eq!(start_cell(&bounds, &hint(None, false)), viewport);
    assert_eq!(start_cell(&bounds, &hint(None, true)), GridCell::new(5, 5));
    assert_eq!(start_cell(&bounds, &hint(Some(outside), false)), GridCell::new(5, 5));
    assert_eq!(start_cell(&bounds, &hint(Some(outside), true)), GridCell::new(5, 5));
}

#[test]
fn test_resolve_placement_and_duplicate() {
    let bounds = PlacementBounds::new(0, 0, 10, 10);
    let taken = occupied(&[(3, 3)]);
    let hint = PlacementHint {
        last_click: Some(GridCell::new(3, 3)),
        viewport_center: None,
        presentation: false,
    };
    assert_eq!(resolve_placement(&bounds, &hint, &taken), GridCell::new(4, 3));
    assert_eq!(
        resolve_duplicate(GridCell::new(3, 3), &bounds, &taken),
        GridCell::new(4, 3)
    );
}

proptest! {
    #[test]
    fn prop_result_stays_inside_bounds(
        min_x in -20i32..20,
        min_y in -20i32..20,
        w in 1i32..8,
        h in 1i32..8,
        sx in -40i32..40,
        sy in -40i32..40,
        taken in proptest::collection::hash_set((-20i32..30, -20i32..30), 0..40),
    ) {
        let bounds = PlacementBounds::new(min_x, min_y, min_x + w - 1, min_y + h - 1);
        let taken: HashSet<GridCell> = taken.into_iter().map(|(x, y)| GridCell::new(x, y)).collect();
        let cell = spiral_search(GridCell::new(sx, sy), &bounds, |c| !taken.contains(&c));

        prop_assert!(bounds.contains(cell));
        let any_free = (bounds.min_x..=bounds.max_x)
            .any(|x| (bounds.min_y..=bounds.max_y).any(|y| !taken.contains(&GridCell::new(x, y))));
        let start = bounds.clamp(GridCell::new(sx, sy));
        if !any_free {
            prop_assert_eq!(cell, start);
        }
        if cell != start {
            prop_assert!(!taken.contains(&cell));
        }
    }
}
