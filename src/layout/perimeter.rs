//! Perimeter graph handed over by floorplan ingestion
//!
//! Ingestion works in PDF points; everything downstream works in
//! millimetres. This module owns that conversion.

use serde::{Deserialize, Serialize};

use crate::core::error::{LayoutError, Result};
use crate::layout::schema::PerimeterWall;

/// One straight structural wall in ingestion units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(default)]
    pub thickness: f64,
}

/// Room pre-labelled by ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerimeterRoom {
    pub name: String,
    /// Indices into `PerimeterGraph::walls`
    #[serde(default)]
    pub boundary_walls: Vec<usize>,
    #[serde(default)]
    pub area_sq_pts: f64,
    #[serde(default)]
    pub area_sq_ft: Option<f64>,
}

/// Fixed outer boundary a layout must subdivide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerimeterGraph {
    pub walls: Vec<WallSegment>,
    #[serde(default)]
    pub rooms: Vec<PerimeterRoom>,
    /// Drawing units per foot, if ingestion detected a scale
    #[serde(default)]
    pub scale_factor: Option<f64>,
    /// `[width, height]` of the page in ingestion units
    pub page_dimensions: [f64; 2],
}

/// Axis-aligned bounds in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Bounds of a set of points; `None` when empty
    pub fn from_points(points: impl IntoIterator<Item = [f64; 2]>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = BoundingBox {
            min_x: first[0],
            min_y: first[1],
            max_x: first[0],
            max_y: first[1],
        };
        for [x, y] in iter {
            bbox.min_x = bbox.min_x.min(x);
            bbox.min_y = bbox.min_y.min(y);
            bbox.max_x = bbox.max_x.max(x);
            bbox.max_y = bbox.max_y.max(y);
        }
        Some(bbox)
    }
}

impl PerimeterGraph {
    /// Millimetres per ingestion unit
    ///
    /// Scale factors at or below 2.0 are treated as uncalibrated and map
    /// one point to one millimetre.
    pub fn mm_per_unit(&self) -> f64 {
        match self.scale_factor {
            Some(scale) if scale > 2.0 => 304.8 / scale,
            _ => 1.0,
        }
    }

    /// Reject graphs no layout can be generated against
    pub fn validate(&self) -> Result<()> {
        if self.walls.len() < 3 {
            return Err(LayoutError::InvalidInput(format!(
                "perimeter needs at least 3 walls, got {}",
                self.walls.len()
            )));
        }
        for (i, wall) in self.walls.iter().enumerate() {
            let values = [wall.x1, wall.y1, wall.x2, wall.y2, wall.thickness];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(LayoutError::InvalidInput(format!(
                    "perimeter wall {} has a non-finite coordinate",
                    i
                )));
            }
        }
        if let Some(room) = self
            .rooms
            .iter()
            .find(|r| r.boundary_walls.iter().any(|&w| w >= self.walls.len()))
        {
            return Err(LayoutError::InvalidInput(format!(
                "room '{}' references a wall index out of range",
                room.name
            )));
        }
        match self.bounding_box_mm() {
            Some(bbox) if bbox.width() > 0.0 && bbox.height() > 0.0 => Ok(()),
            _ => Err(LayoutError::InvalidInput(
                "perimeter encloses no area".into(),
            )),
        }
    }

    /// Perimeter walls in millimetres, ids `perimeter_1..n`
    pub fn walls_mm(&self) -> Vec<PerimeterWall> {
        let k = self.mm_per_unit();
        self.walls
            .iter()
            .enumerate()
            .map(|(i, w)| PerimeterWall {
                id: format!("perimeter_{}", i + 1),
                x1: w.x1 * k,
                y1: w.y1 * k,
                x2: w.x2 * k,
                y2: w.y2 * k,
                thickness_mm: w.thickness * k,
            })
            .collect()
    }

    pub fn page_dimensions_mm(&self) -> [f64; 2] {
        let k = self.mm_per_unit();
        [self.page_dimensions[0] * k, self.page_dimensions[1] * k]
    }

    pub fn bounding_box_mm(&self) -> Option<BoundingBox> {
        let k = self.mm_per_unit();
        BoundingBox::from_points(
            self.walls
                .iter()
                .flat_map(|w| [[w.x1 * k, w.y1 * k], [w.x2 * k, w.y2 * k]]),
        )
    }

    /// Axis-aligned rectangle of the given size, one wall per side
    pub fn rectangle(width: f64, height: f64, thickness: f64) -> Self {
        let corners = [[0.0, 0.0], [width, 0.0], [width, height], [0.0, height]];
        let walls = (0..4)
            .map(|i| {
                let a = corners[i];
                let b = corners[(i + 1) % 4];
                WallSegment {
                    x1: a[0],
                    y1: a[1],
                    x2: b[0],
                    y2: b[1],
                    thickness,
                }
            })
            .collect();
        Self {
            walls,
            rooms: Vec::new(),
            scale_factor: None,
            page_dimensions: [width, height],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncalibrated_scale_is_identity() {
        let mut graph = PerimeterGraph::rectangle(10_000.0, 8_000.0, 200.0);
        assert_eq!(graph.mm_per_unit(), 1.0);
        graph.scale_factor = Some(1.0);
        assert_eq!(graph.mm_per_unit(), 1.0);
        graph.scale_factor = Some(-3.0);
        assert_eq!(graph.mm_per_unit(), 1.0);
        graph.scale_factor = Some(48.0);
        assert!((graph.mm_per_unit() - 6.35).abs() < 1e-9);
    }

    #[test]
    fn test_walls_mm_ids_and_bbox() {
        let graph = PerimeterGraph::rectangle(10_000.0, 8_000.0, 200.0);
        let walls = graph.walls_mm();
        assert_eq!(walls.len(), 4);
        assert_eq!(walls[0].id, "perimeter_1");
        assert_eq!(walls[3].id, "perimeter_4");
        let bbox = graph.bounding_box_mm().unwrap();
        assert_eq!(bbox.area(), 80_000_000.0);
    }

    #[test]
    fn test_degenerate_perimeter_rejected() {
        let mut graph = PerimeterGraph::rectangle(10_000.0, 8_000.0, 200.0);
        graph.walls.truncate(2);
        assert!(matches!(graph.validate(), Err(LayoutError::InvalidInput(_))));

        let flat = PerimeterGraph::rectangle(10_000.0, 0.0, 200.0);
        assert!(flat.validate().is_err());

        let mut nan = PerimeterGraph::rectangle(10_000.0, 8_000.0, 200.0);
        nan.walls[1].x2 = f64::NAN;
        assert!(nan.validate().is_err());

        assert!(PerimeterGraph::rectangle(10_000.0, 8_000.0, 200.0)
            .validate()
            .is_ok());
    }
}
