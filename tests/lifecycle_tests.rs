use rigid_sandbox::*;

fn body_with_two_shapes(world: &mut World) -> (BodyHandle, ShapeHandle, ShapeHandle) {
    let body = world.add_body(Body::dynamic(1.0, 1.0));
    let circle = world.add_shape(Shape::builder(body).circle(2.0, Vec2::ZERO).build());
    let square = world.add_shape(
        Shape::builder(body)
            .box_shape(2.0, 2.0, 0.0)
            .build(),
    );
    (body, circle, square)
}

#[test]
fn test_body_and_shapes_in_any_order() {
    let orders: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    for order in orders {
        let mut world = World::default();
        let (body, circle, square) = body_with_two_shapes(&mut world);
        let removals = [Removal::Body(body), Removal::Shape(circle), Removal::Shape(square)];

        let mut queue = DeferredDestructionQueue::new();
        for index in order {
            queue.schedule(removals[index]);
        }
        let report = queue.flush(&mut world);

        assert_eq!(report.bodies, 1, "order {order:?}");
        assert_eq!(report.shapes, 2, "order {order:?}");
        assert_eq!(report.skipped, 0, "order {order:?}");
        assert!(!world.contains_body(body));
        assert!(!world.contains_shape(circle));
        assert!(!world.contains_shape(square));
        assert_eq!(world.shape_count(), 0);
    }
}

#[test]
fn test_body_alone_takes_its_shapes_and_joints() {
    let mut world = World::default();
    let (body, _, _) = body_with_two_shapes(&mut world);
    let anchor = world.static_body();
    let joint = world.add_constraint(Constraint::pivot(anchor, body, Vec2::ZERO, Vec2::ZERO));

    let mut queue = DeferredDestructionQueue::new();
    queue.schedule_body(body);
    let report = queue.flush(&mut world);

    assert_eq!((report.shapes, report.constraints, report.bodies), (2, 1, 1));
    assert!(!world.contains_constraint(joint));
    assert_eq!(world.body_count(), 0);
}

#[test]
fn test_scheduling_from_inside_a_traversal() {
    let mut world = World::default();
    for i in 0..5 {
        let body = world.add_body(Body::dynamic(1.0, 1.0).with_position(Vec2::new(i as f32 * 10.0, 0.0)));
        world.add_shape(Shape::builder(body).circle(1.0, Vec2::ZERO).build());
    }

    let mut queue = DeferredDestructionQueue::new();
    world.each_body(|body| {
        if body.position.x >= 20.0 {
            queue.schedule_body(body.id);
        }
    });
    assert!(!world.is_locked());
    assert_eq!(queue.len(), 3);

    let report = queue.flush(&mut world);
    assert_eq!(report.bodies, 3);
    assert_eq!(world.body_count(), 2);
    assert_eq!(world.shape_count(), 2);
}

#[test]
fn test_stale_handles_survive_slot_reuse() {
    let mut world = World::default();
    let (body, circle, _) = body_with_two_shapes(&mut world);

    let mut queue = DeferredDestructionQueue::new();
    queue.schedule_body(body);
    queue.flush(&mut world);

    let (reused, _, _) = body_with_two_shapes(&mut world);
    assert_eq!(reused.index(), body.index());
    assert_ne!(reused, body);

    queue.schedule_body(body);
    queue.schedule_shape(circle);
    let report = queue.flush(&mut world);
    assert_eq!(report.removed(), 0);
    assert_eq!(report.skipped, 2);
    assert!(world.contains_body(reused));
    assert_eq!(world.shape_count(), 2);
}

#[test]
fn test_destroy_all_empties_the_scene() {
    let Scene { mut world, drag_proxy } =
        SceneBuilder::new(&SandboxConfig::default()).build(480.0, 480.0);
    for _ in 0..10 {
        world.step(0.01);
    }

    let mut queue = DeferredDestructionQueue::new();
    let report = free_world_children(&mut world, &mut queue);

    assert_eq!(report.bodies, 79);
    assert_eq!(report.shapes, 82);
    assert_eq!(world.body_count(), 0);
    assert_eq!(world.shape_count(), 0);
    assert_eq!(world.constraint_count(), 0);
    assert!(world.contains_body(world.static_body()));
    assert!(world.contains_body(drag_proxy));
    assert!(queue.is_empty());

    world.step(0.01);
    assert!(world.arbiters().is_empty());
}

#[test]
fn test_clear_discards_pending_removals() {
    let mut world = World::default();
    let (body, _, _) = body_with_two_shapes(&mut world);

    let mut queue = DeferredDestructionQueue::new();
    queue.schedule_body(body);
    queue.clear();
    assert_eq!(queue.flush(&mut world), FlushReport::default());
    assert!(world.contains_body(body));
}
