use std::collections::HashSet;

use rigid_sandbox::render::color::{
    hashed_color, DYNAMIC_INTENSITY, IDLE_COLOR, SENSOR_COLOR, SLEEPING_COLOR, STATIC_INTENSITY,
};
use rigid_sandbox::*;

#[test]
fn test_color_assignment_is_pure() {
    let mut world = World::default();
    let body = world.add_body(Body::dynamic(1.0, 1.0));
    let handle = world.add_shape(Shape::builder(body).circle(1.0, Vec2::ZERO).build());

    let shape = world.shape(handle).expect("shape exists");
    let body = world.body(body).expect("body exists");
    let first = color_for_shape(shape, body, 0.5);
    for _ in 0..100 {
        let again = color_for_shape(shape, body, 0.5);
        assert_eq!(again, first);
        assert_eq!(again.to_rgba8(), first.to_rgba8());
    }
}

#[test]
fn test_sequential_ids_give_distinct_colors() {
    let distinct: HashSet<u32> = (0..64)
        .map(|id| hashed_color(id, DYNAMIC_INTENSITY).to_rgba8())
        .collect();
    assert!(distinct.len() >= 50, "only {} distinct colors", distinct.len());
}

#[test]
fn test_hash_ids_follow_insertion_order() {
    let mut world = World::default();
    let body = world.add_body(Body::dynamic(1.0, 1.0));
    let ids: Vec<u32> = (0..4)
        .map(|_| {
            let handle = world.add_shape(Shape::builder(body).circle(1.0, Vec2::ZERO).build());
            world.shape(handle).map(|s| s.hash_id).expect("shape exists")
        })
        .collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
}

#[test]
fn test_static_shapes_are_dim() {
    let world = World::default();
    let ground = world.body(world.static_body()).expect("static body exists");
    let mut body = ground.clone();
    body.sleeping.idle_time = 0.0;

    let shape = Shape::builder(world.static_body())
        .segment(Vec2::ZERO, Vec2::X, 0.0)
        .build();
    let color = color_for_shape(&shape, &body, 0.5);
    let brightest = color.r.max(color.g).max(color.b);
    assert!((brightest - STATIC_INTENSITY).abs() < 1e-6);
    assert_eq!(color.a, 1.0);
}

#[test]
fn test_state_colors_pack_to_expected_bytes() {
    assert_eq!(SLEEPING_COLOR.to_rgba8(), 0x3333_33FF);
    assert_eq!(IDLE_COLOR.to_rgba8(), 0xA8A8_A8FF);
    assert_eq!(SENSOR_COLOR.to_rgba8(), 0xFFFF_FFFF);
}

#[test]
fn test_scene_boundaries_render_idle_gray() {
    let scene = SceneBuilder::new(&SandboxConfig::default()).build(480.0, 480.0);
    let world = &scene.world;
    let threshold = world.settings().sleep_time_threshold;
    world.each_shape(|shape| {
        let body = world.body(shape.body).expect("shape body is live");
        if body.is_static() {
            assert_eq!(color_for_shape(shape, body, threshold), IDLE_COLOR);
        }
    });
}
