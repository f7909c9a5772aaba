//! Benchmarks for layout validation and snapping throughput.
//!
//! Run with: cargo bench --bench validation_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use floorplan_layout::layout::schema::*;
use floorplan_layout::spatial::grid::snap_layout;
use floorplan_layout::spatial::validation::validate_layout;

/// Grid of `side x side` 4 m rooms with a desk and a door each,
/// every fifth row a corridor.
fn build_layout(side: usize) -> GeneratedLayout {
    let cell = 4000.0;
    let mut layout = GeneratedLayout::empty("bench");
    layout.page_dimensions_mm = [side as f64 * cell, side as f64 * cell];

    for row in 0..side {
        for col in 0..side {
            let (x0, y0) = (col as f64 * cell, row as f64 * cell);
            let name = format!("R{}_{}", row, col);
            let room_type = if row % 5 == 4 { "corridor" } else { "office" };
            layout.rooms.push(Room {
                name: name.clone(),
                room_type: room_type.into(),
                boundary: vec![[x0, y0], [x0 + cell, y0], [x0 + cell, y0 + cell], [x0, y0 + cell]],
                area_sqm: 16.0,
            });

            let wall_id = format!("iw_{}_{}", row, col);
            layout.interior_walls.push(InteriorWall {
                id: wall_id.clone(),
                x1: x0,
                y1: y0,
                x2: x0 + cell,
                y2: y0,
                thickness_mm: 100.0,
                material: "drywall".into(),
            });
            layout.doors.push(Door {
                id: format!("d_{}_{}", row, col),
                wall_id,
                position_along_wall: 0.5,
                width_mm: 900.0,
                swing_direction: SwingDirection::Left,
                door_type: DoorType::Single,
            });
            layout.fixtures.push(Fixture {
                id: format!("f_{}_{}", row, col),
                room_name: name,
                fixture_type: "desk".into(),
                center_x: x0 + 1000.0,
                center_y: y0 + 2500.0,
                width_mm: 1200.0,
                depth_mm: 600.0,
                rotation_deg: 0.0,
            });
        }
    }
    layout
}

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_layout");

    for side in [4, 10, 20] {
        let layout = build_layout(side);
        group.bench_with_input(BenchmarkId::new("rooms", side * side), &layout, |b, layout| {
            b.iter(|| black_box(validate_layout(black_box(layout))));
        });
    }

    group.finish();
}

fn bench_snapping(c: &mut Criterion) {
    let layout = build_layout(20);
    c.bench_function("snap_layout_400_rooms", |b| {
        b.iter(|| black_box(snap_layout(black_box(&layout), 50)));
    });
}

criterion_group!(benches, bench_validation, bench_snapping);
criterion_main!(benches);
