//! Geometric validation: polygon enclosure and self-intersection

use super::{ConstraintViolation, ViolationKind};
use crate::layout::schema::{GeneratedLayout, Vertex};
use crate::spatial::geometry::distinct_ring;
use crate::spatial::grid::shoelace_area_sqm;

pub struct GeometricValidator;

impl GeometricValidator {
    /// Why a boundary is not a valid enclosed polygon, if it is not
    pub fn polygon_defect(boundary: &[Vertex]) -> Option<String> {
        if boundary.iter().any(|[x, y]| !x.is_finite() || !y.is_finite()) {
            return Some("has a non-finite vertex".into());
        }

        let ring = distinct_ring(boundary);
        if ring.len() < 3 {
            return Some(format!(
                "has {} distinct vertices, at least 3 are required",
                ring.len()
            ));
        }

        if Self::is_self_intersecting(&ring) {
            return Some("has edges that cross or touch each other".into());
        }

        if shoelace_area_sqm(&ring) <= 0.0 {
            return Some("encloses no area".into());
        }

        None
    }

    /// ROOM_NOT_ENCLOSED for an empty layout and for every invalid room
    pub fn validate_enclosure(layout: &GeneratedLayout) -> Vec<ConstraintViolation> {
        let mut errors = Vec::new();

        if layout.rooms.is_empty() {
            errors.push(ConstraintViolation::error(
                ViolationKind::RoomNotEnclosed,
                "Layout contains no generated rooms.".into(),
                vec![],
            ));
        }

        for room in &layout.rooms {
            if let Some(defect) = Self::polygon_defect(&room.boundary) {
                errors.push(ConstraintViolation::error(
                    ViolationKind::RoomNotEnclosed,
                    format!(
                        "Room '{}' boundary is not a valid enclosed polygon: it {}.",
                        room.name, defect
                    ),
                    vec![room.name.clone()],
                ));
            }
        }

        errors
    }

    /// Check if ring edges cross or touch anywhere but at shared corners
    fn is_self_intersecting(ring: &[Vertex]) -> bool {
        let n = ring.len();

        for i in 0..n {
            let a1 = ring[i];
            let a2 = ring[(i + 1) % n];

            for j in (i + 1)..n {
                let b1 = ring[j];
                let b2 = ring[(j + 1) % n];

                if j == i + 1 {
                    // a2 == b1: reject edges doubling back over each other
                    if Self::folds_back(a1, a2, b2) {
                        return true;
                    }
                    continue;
                }
                if i == 0 && j == n - 1 {
                    // b2 == a1
                    if Self::folds_back(a2, a1, b1) {
                        return true;
                    }
                    continue;
                }

                if Self::segments_touch(a1, a2, b1, b2) {
                    return true;
                }
            }
        }
        false
    }

    /// Adjacent edges `p -> corner` and `corner -> q` overlap along a line
    fn folds_back(p: Vertex, corner: Vertex, q: Vertex) -> bool {
        let cross = Self::cross_product_sign(corner, p, q);
        let dot =
            (p[0] - corner[0]) * (q[0] - corner[0]) + (p[1] - corner[1]) * (q[1] - corner[1]);
        cross == 0.0 && dot > 0.0
    }

    /// Check if two segments share any point, endpoints and collinear overlap included
    fn segments_touch(a1: Vertex, a2: Vertex, b1: Vertex, b2: Vertex) -> bool {
        let d1 = Self::cross_product_sign(b1, b2, a1);
        let d2 = Self::cross_product_sign(b1, b2, a2);
        let d3 = Self::cross_product_sign(a1, a2, b1);
        let d4 = Self::cross_product_sign(a1, a2, b2);

        if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
            && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
        {
            return true;
        }

        (d1 == 0.0 && Self::on_segment(b1, b2, a1))
            || (d2 == 0.0 && Self::on_segment(b1, b2, a2))
            || (d3 == 0.0 && Self::on_segment(a1, a2, b1))
            || (d4 == 0.0 && Self::on_segment(a1, a2, b2))
    }

    /// `p` is collinear with `a..b`; is it within the segment's box?
    fn on_segment(a: Vertex, b: Vertex, p: Vertex) -> bool {
        p[0] >= a[0].min(b[0])
            && p[0] <= a[0].max(b[0])
            && p[1] >= a[1].min(b[1])
            && p[1] <= a[1].max(b[1])
    }

    fn cross_product_sign(a: Vertex, b: Vertex, c: Vertex) -> f64 {
        (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
    }
}
