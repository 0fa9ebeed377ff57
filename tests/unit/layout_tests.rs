// Tile geometry tests

use rstest::rstest;
use sukashi::watermark::{Placement, Point, TileGeometry};

#[rstest]
#[case(400, 300, 200, 0.0)]
#[case(400, 300, 200, -45.0)]
#[case(400, 300, 150, 45.0)]
#[case(300, 400, 100, 90.0)]
#[case(1000, 200, 350, 30.0)]
fn test_grid_reaches_every_corner(
    #[case] width: u32,
    #[case] height: u32,
    #[case] density: i32,
    #[case] rotation: f32,
) {
    let geometry = TileGeometry::new(width, height, density, rotation).unwrap();
    let centers: Vec<Point> = geometry
        .instance_positions(Placement::Tiled)
        .map(|p| geometry.to_canvas(p))
        .collect();

    // Every canvas point lies within half a grid cell diagonal of some center
    let reach = geometry.step * std::f32::consts::SQRT_2 / 2.0 + 1e-3;
    let corners = [
        Point::new(0.0, 0.0),
        Point::new(width as f32, 0.0),
        Point::new(0.0, height as f32),
        Point::new(width as f32, height as f32),
    ];
    for corner in corners {
        let nearest = centers
            .iter()
            .map(|c| c.distance(corner))
            .fold(f32::INFINITY, f32::min);
        assert!(nearest <= reach, "corner {:?} is {} away", corner, nearest);
    }
}

#[test]
fn test_denser_grid_has_more_instances() {
    let sparse = TileGeometry::new(800, 600, 300, -45.0).unwrap();
    let dense = TileGeometry::new(800, 600, 100, -45.0).unwrap();
    assert!(
        dense.instance_positions(Placement::Tiled).count()
            > sparse.instance_positions(Placement::Tiled).count()
    );
}

#[test]
fn test_step_tracks_width_not_height() {
    let a = TileGeometry::new(500, 100, 200, 0.0).unwrap();
    let b = TileGeometry::new(500, 900, 200, 0.0).unwrap();
    assert_eq!(a.step, b.step);
    assert_eq!(a.step, 100.0);
}
