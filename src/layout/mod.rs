//! Layout data model: the perimeter input and generated interior layouts

pub mod perimeter;
pub mod schema;

pub use perimeter::{BoundingBox, PerimeterGraph, PerimeterRoom, WallSegment};
pub use schema::{
    Door, DoorType, Fixture, GeneratedLayout, InteriorWall, PerimeterWall, Room, SwingDirection,
    Vertex, WallLine,
};
