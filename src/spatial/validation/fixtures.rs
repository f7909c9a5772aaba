//! Fixture placement checks, reported as warnings

use ahash::AHashMap;
use geo::{Intersects, Point, Polygon};

use super::rooms::RoomShape;
use super::{ConstraintViolation, ViolationKind};
use crate::layout::schema::{Fixture, GeneratedLayout};
use crate::spatial::geometry::{bounding_box, fixture_polygon, intersection_area};
use crate::spatial::index::BoxIndex;

const AREA_EPSILON: f64 = 1e-6;

pub struct FixtureValidator;

impl FixtureValidator {
    /// FIXTURE_OUTSIDE_ROOM when a centre is not inside its assigned room
    ///
    /// Unknown or invalid rooms count as outside. When several rooms share
    /// a name, the last valid one is used.
    pub fn validate_containment(
        layout: &GeneratedLayout,
        shapes: &[RoomShape<'_>],
    ) -> Vec<ConstraintViolation> {
        // duplicate names resolve to the last valid room
        let by_name: AHashMap<&str, &RoomShape<'_>> = shapes
            .iter()
            .filter(|shape| shape.valid)
            .map(|shape| (shape.room.name.as_str(), shape))
            .collect();

        layout
            .fixtures
            .iter()
            .filter(|fixture| {
                let center = Point::new(fixture.center_x, fixture.center_y);
                by_name
                    .get(fixture.room_name.as_str())
                    .map_or(true, |shape| !shape.polygon.intersects(&center))
            })
            .map(|fixture| {
                ConstraintViolation::warning(
                    ViolationKind::FixtureOutsideRoom,
                    format!(
                        "Fixture '{}' center lies outside assigned room '{}'.",
                        fixture.id, fixture.room_name
                    ),
                    vec![fixture.id.clone(), fixture.room_name.clone()],
                )
            })
            .collect()
    }

    /// FIXTURE_OVERLAP for footprints sharing area within the same room
    pub fn validate_overlaps(layout: &GeneratedLayout) -> Vec<ConstraintViolation> {
        let mut warnings = Vec::new();

        for (room, fixtures) in Self::group_by_room(&layout.fixtures) {
            let footprints: Vec<Polygon<f64>> =
                fixtures.iter().map(|f| fixture_polygon(f)).collect();
            let index = BoxIndex::new(
                footprints
                    .iter()
                    .enumerate()
                    .filter_map(|(i, poly)| bounding_box(poly).map(|bbox| (i, bbox))),
            );

            for (i, j) in index.candidate_pairs() {
                if intersection_area(&footprints[i], &footprints[j]) <= AREA_EPSILON {
                    continue;
                }
                let (a, b) = (fixtures[i], fixtures[j]);
                warnings.push(ConstraintViolation::warning(
                    ViolationKind::FixtureOverlap,
                    format!(
                        "Fixtures '{}' and '{}' overlap in room '{}'.",
                        a.id, b.id, room
                    ),
                    vec![a.id.clone(), b.id.clone(), room.to_string()],
                ));
            }
        }

        warnings
    }

    /// Fixtures per room name, rooms in order of first appearance
    fn group_by_room(fixtures: &[Fixture]) -> Vec<(&str, Vec<&Fixture>)> {
        let mut groups: Vec<(&str, Vec<&Fixture>)> = Vec::new();
        let mut slots: AHashMap<&str, usize> = AHashMap::new();

        for fixture in fixtures {
            let room = fixture.room_name.as_str();
            let slot = *slots.entry(room).or_insert_with(|| {
                groups.push((room, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(fixture);
        }

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::schema::Room;

    fn office() -> Room {
        Room {
            name: "Office".into(),
            room_type: "office".into(),
            boundary: vec![[0.0, 0.0], [4000.0, 0.0], [4000.0, 3000.0], [0.0, 3000.0]],
            area_sqm: 12.0,
        }
    }

    fn fixture(id: &str, room: &str, x: f64, y: f64) -> Fixture {
        Fixture {
            id: id.into(),
            room_name: room.into(),
            fixture_type: "desk".into(),
            center_x: x,
            center_y: y,
            width_mm: 1200.0,
            depth_mm: 600.0,
            rotation_deg: 0.0,
        }
    }

    #[test]
    fn test_containment() {
        let mut layout = GeneratedLayout::empty("fixtures");
        layout.rooms = vec![office()];
        layout.fixtures = vec![
            fixture("f_in", "Office", 1000.0, 1000.0),
            fixture("f_out", "Office", 5000.0, 1000.0),
            fixture("f_orphan", "Kitchen", 1000.0, 1000.0),
        ];
        let shapes: Vec<_> = layout.rooms.iter().map(RoomShape::build).collect();

        let warnings = FixtureValidator::validate_containment(&layout, &shapes);
        let ids: Vec<&str> = warnings
            .iter()
            .map(|w| w.affected_elements[0].as_str())
            .collect();
        assert_eq!(ids, vec!["f_out", "f_orphan"]);
        assert!(warnings.iter().all(|w| !w.is_error()));
    }

    #[test]
    fn test_duplicate_room_name_uses_last_valid_room() {
        let mut annex = office();
        annex.boundary = vec![
            [10_000.0, 0.0],
            [14_000.0, 0.0],
            [14_000.0, 3000.0],
            [10_000.0, 3000.0],
        ];
        let mut broken = office();
        broken.boundary = vec![[0.0, 0.0], [1.0, 1.0]];

        let mut layout = GeneratedLayout::empty("fixtures");
        layout.rooms = vec![office(), annex, broken];
        layout.fixtures = vec![
            fixture("f_annex", "Office", 12_000.0, 1000.0),
            fixture("f_first", "Office", 1000.0, 1000.0),
        ];
        let shapes: Vec<_> = layout.rooms.iter().map(RoomShape::build).collect();

        let warnings = FixtureValidator::validate_containment(&layout, &shapes);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].affected_elements[0], "f_first");
    }

    #[test]
    fn test_overlap_only_within_same_room() {
        let mut layout = GeneratedLayout::empty("fixtures");
        layout.fixtures = vec![
            fixture("f_a", "Office", 1000.0, 1000.0),
            fixture("f_b", "Office", 1500.0, 1000.0),
            fixture("f_c", "Office", 3000.0, 2500.0),
            fixture("f_d", "Lobby", 1000.0, 1000.0),
        ];

        let warnings = FixtureValidator::validate_overlaps(&layout);
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].affected_elements,
            vec!["f_a".to_string(), "f_b".to_string(), "Office".to_string()]
        );
    }

    #[test]
    fn test_touching_fixtures_do_not_overlap() {
        let mut layout = GeneratedLayout::empty("fixtures");
        layout.fixtures = vec![
            fixture("f_a", "Office", 1000.0, 1000.0),
            fixture("f_b", "Office", 2200.0, 1000.0),
        ];
        assert!(FixtureValidator::validate_overlaps(&layout).is_empty());
    }
}
