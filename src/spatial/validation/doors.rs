//! Door swing clearance against walls and fixtures

use ahash::AHashMap;
use geo::Polygon;

use super::{ConstraintViolation, ViolationKind};
use crate::core::config::ConstraintConfig;
use crate::layout::schema::{Door, GeneratedLayout, WallLine};
use crate::spatial::geometry::{
    bounding_box, door_swing_polygon, fixture_polygon, intersection_area, wall_polygon,
};
use crate::spatial::index::BoxIndex;

/// Intersections below this (mm²) are floating-point noise
const AREA_EPSILON: f64 = 1e-6;

/// Named obstacle a door leaf may hit
struct Obstacle<'a> {
    id: &'a str,
    polygon: Polygon<f64>,
}

pub struct DoorValidator;

impl DoorValidator {
    /// DOOR_SWING_BLOCKED for hinged doors whose sweep hits a wall or fixture
    ///
    /// Walls are checked before fixtures and each door reports at most one
    /// blocker. Sliding doors are exempt.
    pub fn validate_swings(
        layout: &GeneratedLayout,
        config: &ConstraintConfig,
    ) -> Vec<ConstraintViolation> {
        let mut errors = Vec::new();

        // interior walls first, perimeter walls second; ids resolve to the first seen
        let mut lines: Vec<(&str, WallLine)> = Vec::new();
        lines.extend(layout.interior_walls.iter().map(|w| (w.id.as_str(), w.line())));
        lines.extend(layout.perimeter_walls.iter().map(|w| (w.id.as_str(), w.line())));

        let mut hosts: AHashMap<&str, WallLine> = AHashMap::new();
        for (id, line) in &lines {
            hosts.entry(*id).or_insert(*line);
        }

        let walls: Vec<Obstacle<'_>> = lines
            .iter()
            .filter_map(|(id, line)| {
                wall_polygon(line).map(|polygon| Obstacle { id: *id, polygon })
            })
            .collect();
        let fixtures: Vec<Obstacle<'_>> = layout
            .fixtures
            .iter()
            .map(|f| Obstacle {
                id: f.id.as_str(),
                polygon: fixture_polygon(f),
            })
            .collect();

        let wall_index = Self::obstacle_index(&walls);
        let fixture_index = Self::obstacle_index(&fixtures);

        for door in layout.doors.iter().filter(|d| !d.is_sliding()) {
            let Some(host) = hosts.get(door.wall_id.as_str()) else {
                errors.push(ConstraintViolation::error(
                    ViolationKind::DoorSwingBlocked,
                    format!(
                        "Door '{}' references unknown wall '{}'.",
                        door.id, door.wall_id
                    ),
                    vec![door.id.clone(), door.wall_id.clone()],
                ));
                continue;
            };

            let Some(swing) = door_swing_polygon(
                host,
                door.position_along_wall,
                door.width_mm,
                door.swing_direction,
                config.door_swing_segments,
            ) else {
                continue;
            };

            let host_id = Some(door.wall_id.as_str());
            let blocker = Self::first_blocker(&swing, &walls, &wall_index, host_id)
                .map(|id| ("wall", id))
                .or_else(|| {
                    Self::first_blocker(&swing, &fixtures, &fixture_index, None)
                        .map(|id| ("fixture", id))
                });

            if let Some((what, id)) = blocker {
                errors.push(Self::blocked(door, what, id));
            }
        }

        errors
    }

    fn obstacle_index(obstacles: &[Obstacle<'_>]) -> BoxIndex {
        BoxIndex::new(
            obstacles
                .iter()
                .enumerate()
                .filter_map(|(i, o)| bounding_box(&o.polygon).map(|bbox| (i, bbox))),
        )
    }

    fn first_blocker<'a>(
        swing: &Polygon<f64>,
        obstacles: &[Obstacle<'a>],
        index: &BoxIndex,
        skip_id: Option<&str>,
    ) -> Option<&'a str> {
        let bbox = bounding_box(swing)?;
        index
            .query(&bbox)
            .into_iter()
            .map(|i| &obstacles[i])
            .filter(|o| Some(o.id) != skip_id)
            .find(|o| intersection_area(swing, &o.polygon) > AREA_EPSILON)
            .map(|o| o.id)
    }

    fn blocked(door: &Door, what: &str, id: &str) -> ConstraintViolation {
        ConstraintViolation::error(
            ViolationKind::DoorSwingBlocked,
            format!("Door '{}' swing intersects {} '{}'.", door.id, what, id),
            vec![door.id.clone(), id.to_string()],
        )
    }
}
