//! Construction grid snapping
//!
//! Every coordinate of a layout is rounded to the nearest multiple of the
//! grid increment (half away from zero, so `-25 -> -50` on a 50 mm grid).
//! Door positions are wall-length ratios and are left alone.
//!
//! Endpoints that were identical before snapping stay identical, so wall
//! connectivity survives. Endpoints that were merely close can collapse
//! onto the same grid point; downstream wall connectivity relies on that
//! merge, so it is kept.

use crate::layout::schema::{GeneratedLayout, Vertex};

/// Round a single value to the nearest grid increment
///
/// A zero grid leaves the value untouched.
#[inline]
pub fn snap_to_grid(value: f64, grid_mm: u32) -> f64 {
    if grid_mm == 0 {
        return value;
    }
    let grid = grid_mm as f64;
    (value / grid).round() * grid
}

#[inline]
fn snap_vertex(v: Vertex, grid_mm: u32) -> Vertex {
    [snap_to_grid(v[0], grid_mm), snap_to_grid(v[1], grid_mm)]
}

/// Polygon area in square metres from mm vertices (shoelace formula)
///
/// Edges are taken cyclically, so a repeated closing vertex adds nothing.
pub fn shoelace_area_sqm(boundary: &[Vertex]) -> f64 {
    let n = boundary.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for i in 0..n {
        let [x1, y1] = boundary[i];
        let [x2, y2] = boundary[(i + 1) % n];
        twice_area += x1 * y2 - x2 * y1;
    }
    twice_area.abs() / 2.0 / 1_000_000.0
}

/// Return a snapped copy of `layout`; the input is never modified
///
/// Room areas are recomputed from the snapped boundaries.
pub fn snap_layout(layout: &GeneratedLayout, grid_mm: u32) -> GeneratedLayout {
    let mut snapped = layout.clone();

    for wall in &mut snapped.interior_walls {
        wall.x1 = snap_to_grid(wall.x1, grid_mm);
        wall.y1 = snap_to_grid(wall.y1, grid_mm);
        wall.x2 = snap_to_grid(wall.x2, grid_mm);
        wall.y2 = snap_to_grid(wall.y2, grid_mm);
    }

    for fixture in &mut snapped.fixtures {
        fixture.center_x = snap_to_grid(fixture.center_x, grid_mm);
        fixture.center_y = snap_to_grid(fixture.center_y, grid_mm);
        fixture.width_mm = snap_to_grid(fixture.width_mm, grid_mm);
        fixture.depth_mm = snap_to_grid(fixture.depth_mm, grid_mm);
    }

    for room in &mut snapped.rooms {
        room.boundary = room
            .boundary
            .iter()
            .map(|&v| snap_vertex(v, grid_mm))
            .collect();
        room.area_sqm = shoelace_area_sqm(&room.boundary);
    }

    for wall in &mut snapped.perimeter_walls {
        wall.x1 = snap_to_grid(wall.x1, grid_mm);
        wall.y1 = snap_to_grid(wall.y1, grid_mm);
        wall.x2 = snap_to_grid(wall.x2, grid_mm);
        wall.y2 = snap_to_grid(wall.y2, grid_mm);
        wall.thickness_mm = snap_to_grid(wall.thickness_mm, grid_mm);
    }

    snapped.page_dimensions_mm = snap_vertex(snapped.page_dimensions_mm, grid_mm);
    snapped.grid_size_mm = grid_mm;

    snapped
}
