//! Drives a few frames of a small scene: a world-space panel stack seen by
//! two cameras and a HUD root bound to the first one.
//!
//! Run with `RUST_LOG=debug` to see per-pass summaries.

use glam::{Mat4, Vec3};
use tessera::prelude::*;
use tessera::profiling::{ProfilingBackend, init_profiling, new_frame};

fn panel(x: f32, y: f32, z_index: i16, render_type_index: u32) -> Primitive {
    Primitive::new(SubRootIndex::ROOT, render_type_index, z_index)
        .with_part(VisualPart::new(
            DrawCallDescriptor::shadow(4),
            render_type_index,
            Aabb::from_rect(x - 1.0, y - 1.0, 22.0, 12.0, 0.0),
        ))
        .with_part(VisualPart::new(
            DrawCallDescriptor::block_2d(),
            render_type_index,
            Aabb::from_rect(x, y, 20.0, 10.0, 0.0),
        ))
        .with_part(VisualPart::new(
            DrawCallDescriptor::text(0),
            render_type_index,
            Aabb::from_rect(x + 2.0, y + 2.0, 16.0, 6.0, 0.0),
        ))
}

fn main() {
    tessera::logging::init();

    #[cfg(feature = "profiling-server")]
    init_profiling(ProfilingBackend::PuffinHttp);
    #[cfg(not(feature = "profiling-server"))]
    init_profiling(ProfilingBackend::InProcess);

    let mut ctx =
        BatchingContext::new(BatchingConfig::default()).with_task_pool(TaskPool::default());

    let mut world_roots = Vec::new();
    for i in 0..4 {
        let settings = RootSettings::default()
            .with_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, -(i as f32) * 2.0)))
            .with_hierarchy(HierarchyRootId(0), i);
        let root = ctx.create_root(settings);
        let a = ctx
            .insert_primitive(root, panel(-20.0, -5.0, 0, 0))
            .expect("root was just created");
        let b = ctx
            .insert_primitive(root, panel(-10.0, -2.0, 1, 1))
            .expect("root was just created");
        ctx.set_overlaps(root, b, [a]).expect("primitive exists");
        world_roots.push(root);
    }

    let hud = ctx.create_root(RootSettings::default().with_visibility(
        RootVisibility::ScreenSpace {
            target: CameraId(0),
            additional: Vec::new(),
        },
    ));
    ctx.insert_primitive(hud, panel(-40.0, 30.0, 0, 0))
        .expect("root was just created");

    let mut main_camera = CameraView::perspective(CameraId(0), 60.0, 16.0 / 9.0, 0.1, 500.0);
    let mut side_camera = CameraView::orthographic(CameraId(1), 160.0, 90.0, 0.1, 500.0);
    side_camera.look_at(Vec3::new(30.0, 0.0, 80.0), Vec3::ZERO, Vec3::Y);

    for frame in 0..3 {
        new_frame();
        main_camera.look_at(Vec3::new(frame as f32 * 5.0, 0.0, 60.0), Vec3::ZERO, Vec3::Y);

        let rebuilt = ctx.process_dirty_roots();
        for camera in [&main_camera, &side_camera] {
            if let Some(stats) = ctx.sort_camera(camera) {
                tracing::info!(frame, camera = camera.id.0, rebuilt, ?stats, "Frame sorted");
            }
        }

        if let Some(bounds) = ctx.get_draw_call_bounds(main_camera.id, world_roots[0]) {
            for (i, dc) in bounds.iter().enumerate() {
                let uniform = dc.to_uniform();
                tracing::info!(
                    draw_call = i,
                    center = ?uniform.center,
                    behind = uniform.viewing_from_behind,
                    "Uploaded draw call bounds"
                );
            }
        }
    }

    if let Some(summary) = ctx.draw_call_summary(world_roots[0]) {
        tracing::info!(
            draw_calls = summary.len(),
            instances = summary.index_buffer().len(),
            "First world root summary"
        );
    }
}
