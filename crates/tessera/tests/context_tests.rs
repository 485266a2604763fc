//! Integration tests for the batching context.

use glam::Vec3;
use tessera::prelude::*;
use tessera_batch::RootInput;
use tessera_test_utils::{front_camera, grid_scene, quad_part, scene_preview_camera};

/// Copy a fixture's primitives and overlaps into a context root.
fn load(ctx: &mut BatchingContext, root: BatchRootId, input: &RootInput) {
    for (_, primitive) in input.primitives.iter() {
        ctx.insert_primitive(root, primitive.clone())
            .expect("root exists");
    }
    for (index, _) in input.primitives.iter() {
        let overlaps = input.primitives.overlaps(index).to_vec();
        ctx.set_overlaps(root, index, overlaps).expect("primitive exists");
    }
}

fn centered_quad() -> Primitive {
    Primitive::single(
        SubRootIndex::ROOT,
        0,
        0,
        quad_part(DrawCallDescriptor::block_2d(), 0, -10.0, -10.0, 20.0, 20.0),
    )
}

#[test]
fn test_remove_primitive_fixes_up_overlaps() {
    let mut ctx = BatchingContext::default();
    let root = ctx.create_root(RootSettings::default());
    let a = ctx.insert_primitive(root, centered_quad()).expect("root exists");
    let b = ctx.insert_primitive(root, centered_quad()).expect("root exists");
    let c = ctx.insert_primitive(root, centered_quad()).expect("root exists");
    let d = ctx.insert_primitive(root, centered_quad()).expect("root exists");
    ctx.set_overlaps(root, a, [b, d]).expect("a exists");
    ctx.set_overlaps(root, c, [b, d]).expect("c exists");

    let (_, relocation) = ctx.remove_primitive(root, b).expect("b exists");
    let relocation = relocation.expect("d moved into b's slot");
    assert_eq!((relocation.from, relocation.to), (d.0, b.0));

    let input = ctx.root_input(root).expect("root exists");
    assert_eq!(input.primitives.len(), 3);
    assert_eq!(input.primitives.overlaps(a), &[PrimitiveIndex(1)]);
    assert_eq!(input.primitives.overlaps(c), &[PrimitiveIndex(1)]);

    assert_eq!(
        ctx.remove_primitive(root, PrimitiveIndex(3)).err(),
        Some(ContextError::UnknownPrimitive {
            root,
            primitive: PrimitiveIndex(3)
        })
    );
}

#[test]
fn test_stale_root_rejected_after_slot_reuse() {
    let mut ctx = BatchingContext::default();
    let old = ctx.create_root(RootSettings::default());
    ctx.destroy_root(old).expect("root exists");
    let new = ctx.create_root(RootSettings::default());
    assert_eq!(old.slot().index(), new.slot().index());
    assert_ne!(old, new);

    assert_eq!(
        ctx.insert_primitive(old, centered_quad()),
        Err(ContextError::UnknownRoot(old))
    );
    assert_eq!(ctx.destroy_root(old), Err(ContextError::UnknownRoot(old)));
    assert!(ctx.root_batch(old).is_none());
    assert!(ctx.insert_primitive(new, centered_quad()).is_ok());
    assert_eq!(ctx.root_count(), 1);
}

#[test]
fn test_parallel_matches_sequential() {
    let scenes = [
        grid_scene(8, 8, 10.0, 7.0),
        grid_scene(6, 4, 10.0, 12.0),
        grid_scene(10, 3, 10.0, 5.0),
        grid_scene(5, 5, 10.0, 9.0),
    ];

    let config = BatchingConfig::default();
    let mut sequential = BatchingContext::new(config.with_parallel_arbitration(false));
    let mut parallel = BatchingContext::new(config.with_parallel_arbitration(true))
        .with_task_pool(TaskPool::new(3));

    let mut roots = Vec::new();
    for scene in &scenes {
        let s = sequential.create_root(RootSettings::default());
        let p = parallel.create_root(RootSettings::default());
        load(&mut sequential, s, scene);
        load(&mut parallel, p, scene);
        roots.push((s, p));
    }

    assert_eq!(sequential.process_dirty_roots(), scenes.len());
    assert_eq!(parallel.process_dirty_roots(), scenes.len());

    for (s, p) in roots {
        let a = sequential.root_batch(s).expect("processed");
        let b = parallel.root_batch(p).expect("processed");
        assert_eq!(a.assigned, b.assigned);
        assert_eq!(a.summary.draw_calls(), b.summary.draw_calls());
        assert_eq!(a.summary.index_buffer(), b.summary.index_buffer());
    }
}

#[test]
fn test_screen_space_root_only_sorted_for_its_cameras() {
    let mut ctx = BatchingContext::default();
    let world = ctx.create_root(RootSettings::default());
    let hud = ctx.create_root(RootSettings::default().with_visibility(
        RootVisibility::ScreenSpace {
            target: CameraId(1),
            additional: Vec::new(),
        },
    ));
    ctx.insert_primitive(world, centered_quad()).expect("root exists");
    ctx.insert_primitive(hud, centered_quad()).expect("root exists");
    ctx.process_dirty_roots();

    let stats = ctx.sort_camera(&front_camera(0)).expect("valid camera");
    assert_eq!(stats.roots_rendered, 1);
    assert!(ctx.get_draw_call_bounds(CameraId(0), world).is_some());
    assert!(ctx.get_draw_call_bounds(CameraId(0), hud).is_none());

    ctx.sort_camera(&front_camera(1)).expect("valid camera");
    assert!(ctx.get_draw_call_bounds(CameraId(1), hud).is_some());

    let stats = ctx.sort_camera(&scene_preview_camera(2)).expect("valid camera");
    assert_eq!(stats.roots_rendered, 2);
}

#[test]
fn test_invalid_camera_keeps_stale_output() {
    let mut ctx = BatchingContext::default();
    let root = ctx.create_root(RootSettings::default());
    ctx.insert_primitive(root, centered_quad()).expect("root exists");
    ctx.process_dirty_roots();

    let mut camera = front_camera(0);
    ctx.sort_camera(&camera).expect("valid camera");
    let before = ctx
        .get_draw_call_bounds(camera.id, root)
        .expect("sorted")
        .to_vec();

    camera.look_at(Vec3::ZERO, Vec3::ZERO, Vec3::Y);
    assert!(ctx.sort_camera(&camera).is_none());
    assert_eq!(
        ctx.get_draw_call_bounds(camera.id, root),
        Some(before.as_slice())
    );
}

#[test]
fn test_sort_group_table_drives_coplanar_order() {
    let mut ctx = BatchingContext::default();
    ctx.set_sort_group(SortGroupId(7), SortGroupInfo::new(1, 3000));
    let high = ctx.create_root(RootSettings::default().with_sort_group(SortGroupId(7)));
    let low = ctx.create_root(RootSettings::default());
    ctx.insert_primitive(high, centered_quad()).expect("root exists");
    ctx.insert_primitive(low, centered_quad()).expect("root exists");
    ctx.process_dirty_roots();

    let stats = ctx.sort_camera(&front_camera(0)).expect("valid camera");
    assert_eq!(stats.edges, 1);

    let high_z = ctx.get_draw_call_bounds(CameraId(0), high).expect("sorted")[0]
        .adjusted_bounds
        .center()
        .z;
    let low_z = ctx.get_draw_call_bounds(CameraId(0), low).expect("sorted")[0]
        .adjusted_bounds
        .center()
        .z;
    assert_eq!(low_z, 0.0);
    assert!(high_z > 0.0 && high_z < 0.1);
}

#[test]
fn test_destroy_root_drops_sort_output() {
    let mut ctx = BatchingContext::default();
    let root = ctx.create_root(RootSettings::default());
    ctx.insert_primitive(root, centered_quad()).expect("root exists");
    ctx.process_dirty_roots();
    ctx.sort_camera(&front_camera(0)).expect("valid camera");
    assert!(ctx.get_draw_call_bounds(CameraId(0), root).is_some());

    ctx.destroy_root(root).expect("root exists");
    assert!(ctx.get_draw_call_bounds(CameraId(0), root).is_none());
    assert!(ctx.draw_call_summary(root).is_none());
    assert_eq!(ctx.process_dirty_roots(), 0);
}
