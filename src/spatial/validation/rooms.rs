//! Room-level checks: overlap, corridor clearance, area budget

use geo::{Area, Polygon};

use super::{ConstraintViolation, GeometricValidator, ViolationKind};
use crate::core::config::ConstraintConfig;
use crate::layout::perimeter::BoundingBox;
use crate::layout::schema::{GeneratedLayout, Room};
use crate::spatial::geometry::{bounding_box, intersection_area, ring_polygon, survives_erosion};
use crate::spatial::index::BoxIndex;

/// A room together with its polygon, built once per validation
pub struct RoomShape<'a> {
    pub room: &'a Room,
    pub polygon: Polygon<f64>,
    /// Passed the enclosure check; invalid rooms are skipped by other checks
    pub valid: bool,
}

impl<'a> RoomShape<'a> {
    pub fn build(room: &'a Room) -> Self {
        Self {
            room,
            polygon: ring_polygon(&room.boundary),
            valid: GeometricValidator::polygon_defect(&room.boundary).is_none(),
        }
    }
}

pub struct RoomValidator;

impl RoomValidator {
    /// ROOM_OVERLAP for every pair sharing more than the tolerated area
    pub fn validate_overlaps(
        shapes: &[RoomShape<'_>],
        config: &ConstraintConfig,
    ) -> Vec<ConstraintViolation> {
        let mut errors = Vec::new();

        let index = BoxIndex::new(shapes.iter().enumerate().filter_map(|(i, shape)| {
            if !shape.valid {
                return None;
            }
            bounding_box(&shape.polygon).map(|bbox| (i, bbox))
        }));

        for (i, j) in index.candidate_pairs() {
            let (a, b) = (&shapes[i], &shapes[j]);
            let overlap_mm2 = intersection_area(&a.polygon, &b.polygon);
            if overlap_mm2 > config.room_overlap_tolerance_mm2 {
                errors.push(ConstraintViolation::error(
                    ViolationKind::RoomOverlap,
                    format!(
                        "{} and {} overlap by {:.2} sqm.",
                        a.room.name,
                        b.room.name,
                        overlap_mm2 / 1_000_000.0
                    ),
                    vec![a.room.name.clone(), b.room.name.clone()],
                ));
            }
        }

        errors
    }

    /// CORRIDOR_TOO_NARROW when a corridor erodes away at half the minimum width
    pub fn validate_corridors(
        shapes: &[RoomShape<'_>],
        config: &ConstraintConfig,
    ) -> Vec<ConstraintViolation> {
        let radius = config.corridor_min_width_mm / 2.0;

        shapes
            .iter()
            .filter(|shape| shape.valid && shape.room.is_corridor())
            .filter(|shape| !survives_erosion(&shape.polygon, radius))
            .map(|shape| {
                ConstraintViolation::error(
                    ViolationKind::CorridorTooNarrow,
                    format!(
                        "{} is narrower than {}mm at one or more points.",
                        shape.room.name, config.corridor_min_width_mm
                    ),
                    vec![shape.room.name.clone()],
                )
            })
            .collect()
    }

    /// AREA_EXCEEDS_PERIMETER when rooms claim more than the perimeter allows
    pub fn validate_area_budget(
        layout: &GeneratedLayout,
        shapes: &[RoomShape<'_>],
        config: &ConstraintConfig,
    ) -> Vec<ConstraintViolation> {
        let total_mm2: f64 = shapes
            .iter()
            .filter(|shape| shape.valid)
            .map(|shape| shape.polygon.unsigned_area())
            .sum();

        let budget_mm2 = Self::perimeter_area_mm2(layout);
        if budget_mm2 <= 0.0 || total_mm2 <= budget_mm2 * (1.0 + config.area_budget_tolerance) {
            return Vec::new();
        }

        vec![ConstraintViolation::error(
            ViolationKind::AreaExceedsPerimeter,
            format!(
                "Total room area {:.2} sqm exceeds perimeter budget {:.2} sqm.",
                total_mm2 / 1_000_000.0,
                budget_mm2 / 1_000_000.0
            ),
            layout.rooms.iter().map(|r| r.name.clone()).collect(),
        )]
    }

    /// Bounding area of the perimeter walls, falling back to the page size
    pub fn perimeter_area_mm2(layout: &GeneratedLayout) -> f64 {
        let points = layout
            .perimeter_walls
            .iter()
            .filter(|w| [w.x1, w.y1, w.x2, w.y2].iter().all(|v| v.is_finite()))
            .flat_map(|w| [[w.x1, w.y1], [w.x2, w.y2]]);

        match BoundingBox::from_points(points) {
            Some(bbox) if bbox.width() > 0.0 && bbox.height() > 0.0 => bbox.area(),
            _ => layout.page_dimensions_mm[0] * layout.page_dimensions_mm[1],
        }
    }
}
