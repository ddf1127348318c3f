use rigid_sandbox::scene::{BOX_HEIGHT, BOX_MASS, BOX_WIDTH, PYRAMID_ROWS};
use rigid_sandbox::*;

fn default_scene() -> Scene {
    SceneBuilder::new(&SandboxConfig::default()).build(480.0, 480.0)
}

#[test]
fn test_scene_population() {
    let scene = default_scene();
    let world = &scene.world;

    let mut static_segments = 0;
    let mut boxes = 0;
    let mut circles = 0;
    world.each_shape(|shape| {
        let body = world.body(shape.body).expect("shape body is live");
        match &shape.geometry {
            ShapeGeometry::Segment { radius, .. } => {
                assert!(body.is_static());
                assert_eq!(*radius, 0.0);
                assert_eq!(shape.filter, ShapeFilter::NOT_GRABBABLE);
                assert_eq!(shape.elasticity(), 1.0);
                assert_eq!(shape.friction(), 1.0);
                static_segments += 1;
            }
            ShapeGeometry::Polygon { vertices, radius } => {
                assert!(body.is_dynamic());
                assert_eq!(vertices.len(), 4);
                assert_eq!(*radius, 0.5);
                assert_eq!(shape.friction(), 0.8);
                boxes += 1;
            }
            ShapeGeometry::Circle { radius, .. } => {
                assert!(body.is_dynamic());
                assert_eq!(*radius, 15.0);
                assert_eq!(body.mass(), 10.0);
                assert_eq!(shape.friction(), 0.9);
                circles += 1;
            }
        }
    });

    assert_eq!(static_segments, 3);
    assert_eq!(boxes, PYRAMID_ROWS * (PYRAMID_ROWS + 1) / 2);
    assert_eq!(boxes, 78);
    assert_eq!(circles, 1);
    assert_eq!(world.body_count(), 79);
    assert_eq!(world.constraint_count(), 0);
}

#[test]
fn test_pyramid_rows_are_staggered() {
    let scene = default_scene();
    let mut bottom_row = Vec::new();
    scene.world.each_body(|body| {
        if body.mass() == BOX_MASS && body.position.y == (PYRAMID_ROWS - 1) as f32 * BOX_WIDTH * 2.0 {
            bottom_row.push(body.position.x);
        }
    });

    assert_eq!(bottom_row.len(), PYRAMID_ROWS);
    assert_eq!(bottom_row[0], 240.0 - 11.0 * 16.0);
    for pair in bottom_row.windows(2) {
        assert_eq!(pair[1] - pair[0], 32.0);
    }
}

#[test]
fn test_ball_spawns_above_the_pyramid() {
    let scene = default_scene();
    let mut ball = None;
    scene.world.each_shape(|shape| {
        if let ShapeGeometry::Circle { .. } = shape.geometry {
            ball = scene.world.body(shape.body).map(|b| b.position);
        }
    });
    assert_eq!(ball, Some(Vec2::new(240.0, -220.0)));
    assert!(BOX_HEIGHT > BOX_WIDTH);
}

#[test]
fn test_boundaries_are_not_grabbable() {
    let scene = default_scene();
    let left_wall = Vec2::new(1.0, 100.0);
    assert!(scene
        .world
        .point_query_nearest(left_wall, 5.0, ShapeFilter::GRAB)
        .is_none());
    assert!(scene
        .world
        .point_query_nearest(left_wall, 5.0, ShapeFilter::ALL)
        .is_some());
}

#[test]
fn test_settings_follow_config() {
    let config = SandboxConfig {
        iterations: 7,
        sleep_time_threshold: f32::INFINITY,
        ..SandboxConfig::default()
    };
    let scene = SceneBuilder::new(&config).build(320.0, 240.0);
    let settings = scene.world.settings();
    assert_eq!(settings.iterations, 7);
    assert_eq!(settings.gravity, Vec2::new(0.0, 100.0));
    assert_eq!(settings.collision_slop, 0.5);
    assert!(settings.sleep_time_threshold.is_infinite());
}
