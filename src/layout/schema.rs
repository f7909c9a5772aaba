//! JSON schema definitions for generated interior layouts
//!
//! These structs match the JSON a layout provider returns. All lengths
//! and coordinates are real-world millimetres; areas are square metres.

use serde::{Deserialize, Serialize};

/// Point as `[x, y]` in millimetres
pub type Vertex = [f64; 2];

/// A proposed interior design subdividing a fixed perimeter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedLayout {
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub interior_walls: Vec<InteriorWall>,
    #[serde(default)]
    pub doors: Vec<Door>,
    #[serde(default)]
    pub fixtures: Vec<Fixture>,
    #[serde(default = "default_grid_size")]
    pub grid_size_mm: u32,
    /// Description the layout was generated from
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub perimeter_walls: Vec<PerimeterWall>,
    /// `[width, height]` of the source page in millimetres
    #[serde(default)]
    pub page_dimensions_mm: [f64; 2],
}

// ============================================================================
// ROOM
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    pub room_type: String,
    /// Closed polygon; the closing vertex may be repeated or implied
    pub boundary: Vec<Vertex>,
    #[serde(default)]
    pub area_sqm: f64,
}

impl Room {
    pub fn is_corridor(&self) -> bool {
        matches!(
            self.room_type.to_lowercase().as_str(),
            "corridor" | "hallway" | "passage"
        )
    }
}

// ============================================================================
// WALLS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteriorWall {
    pub id: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(default = "default_wall_thickness")]
    pub thickness_mm: f64,
    #[serde(default = "default_wall_material")]
    pub material: String,
}

/// Outer boundary wall carried alongside a layout, in millimetres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerimeterWall {
    pub id: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(default = "default_wall_thickness")]
    pub thickness_mm: f64,
}

/// Centreline plus thickness, shared by interior and perimeter walls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallLine {
    pub start: Vertex,
    pub end: Vertex,
    pub thickness_mm: f64,
}

impl WallLine {
    pub fn length(&self) -> f64 {
        (self.end[0] - self.start[0]).hypot(self.end[1] - self.start[1])
    }

    /// Point at `t` (0..1) along the wall
    pub fn point_at(&self, t: f64) -> Vertex {
        [
            self.start[0] + t * (self.end[0] - self.start[0]),
            self.start[1] + t * (self.end[1] - self.start[1]),
        ]
    }
}

impl InteriorWall {
    pub fn line(&self) -> WallLine {
        WallLine {
            start: [self.x1, self.y1],
            end: [self.x2, self.y2],
            thickness_mm: self.thickness_mm,
        }
    }
}

impl PerimeterWall {
    pub fn line(&self) -> WallLine {
        WallLine {
            start: [self.x1, self.y1],
            end: [self.x2, self.y2],
            thickness_mm: self.thickness_mm,
        }
    }
}

// ============================================================================
// DOORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub id: String,
    /// Host wall id (interior or perimeter)
    pub wall_id: String,
    /// Hinge position as a fraction (0..1) of the host wall length
    pub position_along_wall: f64,
    pub width_mm: f64,
    pub swing_direction: SwingDirection,
    #[serde(default)]
    pub door_type: DoorType,
}

impl Door {
    /// Sliding doors have no swept area
    pub fn is_sliding(&self) -> bool {
        self.swing_direction == SwingDirection::Sliding || self.door_type == DoorType::Sliding
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingDirection {
    /// Sweeps counter-clockwise from the wall direction
    Left,
    /// Sweeps clockwise from the wall direction
    Right,
    Sliding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorType {
    #[default]
    Single,
    Double,
    Sliding,
}

// ============================================================================
// FIXTURES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: String,
    /// Name of the owning room
    pub room_name: String,
    pub fixture_type: String,
    pub center_x: f64,
    pub center_y: f64,
    pub width_mm: f64,
    pub depth_mm: f64,
    #[serde(default)]
    pub rotation_deg: f64,
}

fn default_grid_size() -> u32 {
    50
}

fn default_wall_thickness() -> f64 {
    100.0
}

fn default_wall_material() -> String {
    "drywall".into()
}

impl GeneratedLayout {
    /// Empty layout for a prompt, used as a builder starting point
    pub fn empty(prompt: impl Into<String>) -> Self {
        Self {
            rooms: Vec::new(),
            interior_walls: Vec::new(),
            doors: Vec::new(),
            fixtures: Vec::new(),
            grid_size_mm: default_grid_size(),
            prompt: prompt.into(),
            perimeter_walls: Vec::new(),
            page_dimensions_mm: [0.0, 0.0],
        }
    }

    /// First structural problem that makes the payload unusable, if any
    ///
    /// Geometric validity (self-intersection, overlaps) is the validator's
    /// job; this only rejects values no geometry can be built from.
    pub fn structural_problem(&self) -> Option<String> {
        fn finite(values: &[f64]) -> bool {
            values.iter().all(|v| v.is_finite())
        }

        for room in &self.rooms {
            if !room.boundary.iter().all(|v| finite(&v[..])) {
                return Some(format!("room '{}' has a non-finite vertex", room.name));
            }
        }
        for wall in &self.interior_walls {
            if !finite(&[wall.x1, wall.y1, wall.x2, wall.y2, wall.thickness_mm]) {
                return Some(format!("wall '{}' has a non-finite coordinate", wall.id));
            }
        }
        for door in &self.doors {
            if !(0.0..=1.0).contains(&door.position_along_wall) {
                return Some(format!(
                    "door '{}' position_along_wall {} is outside 0..1",
                    door.id, door.position_along_wall
                ));
            }
            if !(door.width_mm.is_finite() && door.width_mm > 0.0) {
                return Some(format!("door '{}' has non-positive width", door.id));
            }
        }
        for fixture in &self.fixtures {
            if !finite(&[
                fixture.center_x,
                fixture.center_y,
                fixture.width_mm,
                fixture.depth_mm,
                fixture.rotation_deg,
            ]) {
                return Some(format!("fixture '{}' has a non-finite value", fixture.id));
            }
        }
        None
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_deserialize_with_defaults() {
        let json = r#"{
            "rooms": [
                {"name": "Office 1", "room_type": "office",
                 "boundary": [[0, 0], [4000, 0], [4000, 3000], [0, 3000], [0, 0]]}
            ],
            "interior_walls": [
                {"id": "iw_1", "x1": 4000, "y1": 0, "x2": 4000, "y2": 8000}
            ],
            "doors": [
                {"id": "d_1", "wall_id": "iw_1", "position_along_wall": 0.5,
                 "width_mm": 900, "swing_direction": "left"}
            ]
        }"#;
        let layout: GeneratedLayout = serde_json::from_str(json).unwrap();
        assert_eq!(layout.grid_size_mm, 50);
        assert_eq!(layout.interior_walls[0].thickness_mm, 100.0);
        assert_eq!(layout.interior_walls[0].material, "drywall");
        assert_eq!(layout.doors[0].door_type, DoorType::Single);
        assert_eq!(layout.doors[0].swing_direction, SwingDirection::Left);
        assert!(layout.fixtures.is_empty());
        assert!(layout.structural_problem().is_none());
    }

    #[test]
    fn test_swing_direction_serialization() {
        let json = serde_json::to_string(&SwingDirection::Sliding).unwrap();
        assert_eq!(json, "\"sliding\"");
        let parsed: SwingDirection = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(parsed, SwingDirection::Right);
    }

    #[test]
    fn test_corridor_tags() {
        let mut room = Room {
            name: "Hall".into(),
            room_type: "Hallway".into(),
            boundary: vec![],
            area_sqm: 0.0,
        };
        assert!(room.is_corridor());
        room.room_type = "office".into();
        assert!(!room.is_corridor());
    }

    #[test]
    fn test_structural_problem_door_ratio() {
        let mut layout = GeneratedLayout::empty("test");
        layout.doors.push(Door {
            id: "d_1".into(),
            wall_id: "iw_1".into(),
            position_along_wall: 1.5,
            width_mm: 900.0,
            swing_direction: SwingDirection::Left,
            door_type: DoorType::Single,
        });
        assert!(layout.structural_problem().unwrap().contains("d_1"));
    }
}
