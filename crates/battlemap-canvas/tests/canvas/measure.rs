use battlemap_canvas::{chebyshev_path, distance_feet, GridCell, GridSize, MovementMeasurer, Point};

#[test]
fn test_diagonal_counts_as_one_step() {
    let path = chebyshev_path(GridCell::new(0, 0), GridCell::new(3, 2));
    assert_eq!(
        path.as_slice(),
        &[
            GridCell::new(0, 0),
            GridCell::new(1, 1),
            GridCell::new(2, 2),
            GridCell::new(3, 2),
        ]
    );
    assert_eq!(distance_feet(path.len()), 15);
}

#[test]
fn test_path_toward_negative_direction() {
    let path = chebyshev_path(GridCell::new(4, 4), GridCell::new(4, 0));
    assert_eq!(path.len(), 5);
    assert!(path.iter().all(|c| c.x == 4));
    assert_eq!(distance_feet(path.len()), 20);
}

#[test]
fn test_overlay_follows_pointer() {
    let grid = GridSize::new(50).unwrap();
    let mut measurer = MovementMeasurer::new();
    measurer.start(GridCell::new(0, 0));
    assert!(measurer.overlay(grid).is_none(), "start == end has no overlay");

    measurer.update(GridCell::new(3, 2));
    let overlay = measurer.overlay(grid).unwrap();
    assert_eq!(overlay.distance_feet, 15);
    assert_eq!(overlay.label, "15 ft");
    assert_eq!(overlay.waypoints.first(), Some(&Point::new(25.0, 25.0)));
    assert_eq!(overlay.waypoints.last(), Some(&Point::new(175.0, 125.0)));

    measurer.update(GridCell::new(1, 0));
    assert_eq!(measurer.overlay(grid).unwrap().distance_feet, 5);

    measurer.end();
    assert!(!measurer.is_active());
    assert!(measurer.overlay(grid).is_none());
}

#[test]
fn test_update_without_start_is_ignored() {
    let mut measurer = MovementMeasurer::new();
    measurer.update(GridCell::new(2, 2));
    assert!(measurer.overlay(GridSize::new(50).unwrap()).is_none());
}
