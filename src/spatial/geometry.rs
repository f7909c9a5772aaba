//! Polygon construction and measurement for layout elements
//!
//! Thin layer between the layout schema (plain `[x, y]` millimetre
//! vertices) and `geo` types. Everything here is pure.

use std::collections::BinaryHeap;
use std::f64::consts::{FRAC_PI_2, SQRT_2};

use geo::{
    Area, BooleanOps, BoundingRect, Coord, EuclideanDistance, Intersects, LineString, Point,
    Polygon, Rect, Rotate, Translate,
};
use ordered_float::OrderedFloat;

use crate::layout::perimeter::BoundingBox;
use crate::layout::schema::{Fixture, SwingDirection, Vertex, WallLine};

/// Clearance tolerance (mm) when deciding whether a shape erodes away
const CLEARANCE_TOLERANCE: f64 = 1.0;

/// Cells smaller than this (half-size, mm) are not subdivided further
const MIN_HALF_CELL: f64 = 0.25;

/// Boundary vertices with the closing repeat and consecutive duplicates removed
pub fn distinct_ring(boundary: &[Vertex]) -> Vec<Vertex> {
    let mut ring: Vec<Vertex> = Vec::with_capacity(boundary.len());
    for &v in boundary {
        if ring.last() != Some(&v) {
            ring.push(v);
        }
    }
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Build a polygon from a room boundary (closing is implicit)
pub fn ring_polygon(boundary: &[Vertex]) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = distinct_ring(boundary)
        .into_iter()
        .map(|[x, y]| Coord { x, y })
        .collect();
    Polygon::new(LineString::from(coords), vec![])
}

pub fn bounding_box(polygon: &Polygon<f64>) -> Option<BoundingBox> {
    polygon.bounding_rect().map(|rect| BoundingBox {
        min_x: rect.min().x,
        min_y: rect.min().y,
        max_x: rect.max().x,
        max_y: rect.max().y,
    })
}

/// Area (mm²) shared by two polygons
pub fn intersection_area(a: &Polygon<f64>, b: &Polygon<f64>) -> f64 {
    if !a.intersects(b) {
        return 0.0;
    }
    a.intersection(b).unsigned_area()
}

/// Flat-capped slab around a wall centreline
///
/// Thickness is floored at 1 mm so zero-thickness walls still block.
/// Zero-length walls have no footprint.
pub fn wall_polygon(wall: &WallLine) -> Option<Polygon<f64>> {
    let length = wall.length();
    if length == 0.0 || !length.is_finite() {
        return None;
    }
    let half = wall.thickness_mm.max(1.0) / 2.0;
    let ux = (wall.end[0] - wall.start[0]) / length;
    let uy = (wall.end[1] - wall.start[1]) / length;
    let (nx, ny) = (-uy * half, ux * half);

    let [sx, sy] = wall.start;
    let [ex, ey] = wall.end;
    Some(Polygon::new(
        LineString::from(vec![
            (sx + nx, sy + ny),
            (ex + nx, ey + ny),
            (ex - nx, ey - ny),
            (sx - nx, sy - ny),
        ]),
        vec![],
    ))
}

/// Oriented footprint rectangle of a fixture
pub fn fixture_polygon(fixture: &Fixture) -> Polygon<f64> {
    let half_w = fixture.width_mm / 2.0;
    let half_d = fixture.depth_mm / 2.0;
    Rect::new(
        Coord { x: -half_w, y: -half_d },
        Coord { x: half_w, y: half_d },
    )
    .to_polygon()
    .rotate_around_point(fixture.rotation_deg, Point::new(0.0, 0.0))
    .translate(fixture.center_x, fixture.center_y)
}

/// Quarter-circle swept by a hinged door
///
/// The hinge sits at `position` (0..1) along the host wall and the leaf
/// radius is the door width. `Left` sweeps counter-clockwise from the
/// wall direction, `Right` clockwise. Sliding doors sweep nothing.
pub fn door_swing_polygon(
    wall: &WallLine,
    position: f64,
    width_mm: f64,
    swing: SwingDirection,
    segments: usize,
) -> Option<Polygon<f64>> {
    let sweep = match swing {
        SwingDirection::Left => FRAC_PI_2,
        SwingDirection::Right => -FRAC_PI_2,
        SwingDirection::Sliding => return None,
    };
    if wall.length() == 0.0 || width_mm <= 0.0 {
        return None;
    }

    let [hx, hy] = wall.point_at(position);
    let wall_angle = (wall.end[1] - wall.start[1]).atan2(wall.end[0] - wall.start[0]);
    let segments = segments.max(2);

    let mut coords = Vec::with_capacity(segments + 2);
    coords.push((hx, hy));
    for step in 0..=segments {
        let angle = wall_angle + sweep * (step as f64 / segments as f64);
        coords.push((hx + width_mm * angle.cos(), hy + width_mm * angle.sin()));
    }
    Some(Polygon::new(LineString::from(coords), vec![]))
}

/// Square cell in the clearance search, keyed by its best possible clearance
#[derive(Debug, Clone, Copy)]
struct Cell {
    x: f64,
    y: f64,
    half: f64,
    clearance: f64,
}

impl Cell {
    fn new(x: f64, y: f64, half: f64, polygon: &Polygon<f64>) -> Self {
        Self {
            x,
            y,
            half,
            clearance: signed_clearance(x, y, polygon),
        }
    }

    /// Upper bound on the clearance of any point inside the cell
    fn potential(&self) -> f64 {
        self.clearance + self.half * SQRT_2
    }
}

/// Distance to the boundary, negative outside the polygon
fn signed_clearance(x: f64, y: f64, polygon: &Polygon<f64>) -> f64 {
    let point = Point::new(x, y);
    let distance = point.euclidean_distance(polygon.exterior());
    if polygon.intersects(&point) {
        distance
    } else {
        -distance
    }
}

/// Does the polygon survive erosion by `radius`?
///
/// Equivalent to asking whether some interior point lies further than
/// `radius` from the boundary. Decided by branch-and-bound over square
/// cells ordered by their clearance upper bound, so a shape exactly
/// `2 * radius` wide erodes away.
pub fn survives_erosion(polygon: &Polygon<f64>, radius: f64) -> bool {
    let Some(bbox) = bounding_box(polygon) else {
        return false;
    };
    let size = bbox.width().min(bbox.height());
    if size <= 0.0 {
        return false;
    }

    let threshold = radius + CLEARANCE_TOLERANCE;
    let half = size / 2.0;
    let mut queue = CellQueue::default();

    let mut x = bbox.min_x;
    while x < bbox.max_x {
        let mut y = bbox.min_y;
        while y < bbox.max_y {
            queue.push(Cell::new(x + half, y + half, half, polygon));
            y += size;
        }
        x += size;
    }

    while let Some(cell) = queue.pop() {
        if cell.potential() <= threshold {
            // best remaining bound cannot beat the threshold
            return false;
        }
        if cell.clearance > threshold {
            return true;
        }
        if cell.half < MIN_HALF_CELL {
            continue;
        }
        let h = cell.half / 2.0;
        for (dx, dy) in [(-h, -h), (h, -h), (-h, h), (h, h)] {
            queue.push(Cell::new(cell.x + dx, cell.y + dy, h, polygon));
        }
    }
    false
}

/// Max-heap of cells by clearance potential
#[derive(Default)]
struct CellQueue {
    heap: BinaryHeap<(OrderedFloat<f64>, usize)>,
    cells: Vec<Cell>,
}

impl CellQueue {
    fn push(&mut self, cell: Cell) {
        self.heap.push((OrderedFloat(cell.potential()), self.cells.len()));
        self.cells.push(cell);
    }

    fn pop(&mut self) -> Option<Cell> {
        self.heap.pop().map(|(_, index)| self.cells[index])
    }
}
