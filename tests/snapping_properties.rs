//! Property tests for grid snapping

use floorplan_layout::layout::schema::*;
use floorplan_layout::spatial::grid::{shoelace_area_sqm, snap_layout, snap_to_grid};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f64> {
    -50_000.0f64..50_000.0
}

fn layout_strategy() -> impl Strategy<Value = GeneratedLayout> {
    (
        prop::collection::vec((coord(), coord()), 3..8),
        prop::collection::vec((coord(), coord(), coord(), coord()), 0..4),
        prop::collection::vec((coord(), coord(), 100.0f64..3000.0, 100.0f64..3000.0), 0..4),
        0.0f64..=1.0,
    )
        .prop_map(|(ring, walls, fixtures, position)| {
            let mut layout = GeneratedLayout::empty("property");
            layout.rooms.push(Room {
                name: "Room".into(),
                room_type: "office".into(),
                boundary: ring.iter().map(|&(x, y)| [x, y]).collect(),
                area_sqm: 0.0,
            });
            for (i, (x1, y1, x2, y2)) in walls.into_iter().enumerate() {
                layout.interior_walls.push(InteriorWall {
                    id: format!("iw_{}", i),
                    x1,
                    y1,
                    x2,
                    y2,
                    thickness_mm: 100.0,
                    material: "drywall".into(),
                });
            }
            for (i, (x, y, w, d)) in fixtures.into_iter().enumerate() {
                layout.fixtures.push(Fixture {
                    id: format!("f_{}", i),
                    room_name: "Room".into(),
                    fixture_type: "desk".into(),
                    center_x: x,
                    center_y: y,
                    width_mm: w,
                    depth_mm: d,
                    rotation_deg: 0.0,
                });
            }
            layout.doors.push(Door {
                id: "d_1".into(),
                wall_id: "iw_0".into(),
                position_along_wall: position,
                width_mm: 900.0,
                swing_direction: SwingDirection::Left,
                door_type: DoorType::Single,
            });
            layout
        })
}

fn all_coordinates(layout: &GeneratedLayout) -> Vec<f64> {
    let mut values = Vec::new();
    for room in &layout.rooms {
        for v in &room.boundary {
            values.extend_from_slice(v);
        }
    }
    for w in &layout.interior_walls {
        values.extend_from_slice(&[w.x1, w.y1, w.x2, w.y2]);
    }
    for f in &layout.fixtures {
        values.extend_from_slice(&[f.center_x, f.center_y, f.width_mm, f.depth_mm]);
    }
    values
}

#[test]
fn test_documented_snap_values() {
    assert_eq!(snap_to_grid(1723.0, 50), 1700.0);
    assert_eq!(snap_to_grid(1749.0, 50), 1750.0);
    assert_eq!(snap_to_grid(1750.0, 50), 1750.0);
    assert_eq!(snap_to_grid(1725.0, 50), 1750.0);
}

proptest! {
    #[test]
    fn prop_snap_is_idempotent(
        layout in layout_strategy(),
        grid in prop::sample::select(vec![10u32, 25, 50, 100])
    ) {
        let once = snap_layout(&layout, grid);
        let twice = snap_layout(&once, grid);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_snapped_coordinates_are_exact_multiples(layout in layout_strategy()) {
        let snapped = snap_layout(&layout, 50);
        for value in all_coordinates(&snapped) {
            prop_assert_eq!(value % 50.0, 0.0, "{} is off grid", value);
        }
    }

    #[test]
    fn prop_area_comes_from_snapped_boundary(layout in layout_strategy()) {
        let snapped = snap_layout(&layout, 50);
        for room in &snapped.rooms {
            prop_assert_eq!(room.area_sqm, shoelace_area_sqm(&room.boundary));
        }
    }

    #[test]
    fn prop_door_position_is_untouched(layout in layout_strategy()) {
        let snapped = snap_layout(&layout, 50);
        prop_assert_eq!(
            snapped.doors[0].position_along_wall,
            layout.doors[0].position_along_wall
        );
    }
}
