//! Prompt construction for layout generation and correction rounds

use serde_json::json;

use crate::layout::perimeter::{BoundingBox, PerimeterGraph};
use crate::layout::schema::GeneratedLayout;
use crate::spatial::validation::{ConstraintResult, Severity};

/// Strategy hints handed out round-robin to parallel candidates
pub const VARIATION_HINTS: [&str; 3] = [
    "Prioritize conflict-free door swings around interior walls.",
    "Prioritize fixture spacing to avoid overlaps while preserving circulation.",
    "Prefer sliding doors in tight spaces where swing clearance is hard.",
];

/// System prompt for layout generation
pub const LAYOUT_SYSTEM_PROMPT: &str = r#"You are an expert interior layout planner.
Subdivide a fixed building perimeter into the rooms the user describes.

RULES:
- All coordinates are millimetres in the perimeter's coordinate frame.
- Every room boundary is a closed, non-self-intersecting polygon inside the perimeter.
- Rooms must not overlap each other.
- Corridors and hallways are at least 900 mm wide everywhere.
- Door swings must not hit walls or fixtures; use sliding doors where space is tight.
- Every fixture sits inside the room it names, without overlapping other fixtures.

OUTPUT FORMAT (JSON only, no explanation):
{
  "rooms": [{"name": "Office 1", "room_type": "office", "boundary": [[x, y], ...], "area_sqm": 0.0}],
  "interior_walls": [{"id": "iw_1", "x1": 0, "y1": 0, "x2": 0, "y2": 0, "thickness_mm": 100, "material": "drywall"}],
  "doors": [{"id": "d_1", "wall_id": "iw_1", "position_along_wall": 0.5, "width_mm": 900, "swing_direction": "left|right|sliding", "door_type": "single|double|sliding"}],
  "fixtures": [{"id": "f_1", "room_name": "Office 1", "fixture_type": "desk", "center_x": 0, "center_y": 0, "width_mm": 1200, "depth_mm": 600, "rotation_deg": 0}]
}
"#;

/// First-iteration prompt: perimeter context plus the user's description
pub fn build_generation_prompt(
    perimeter: &PerimeterGraph,
    description: &str,
) -> serde_json::Result<String> {
    let walls = perimeter.walls_mm();
    let [page_w, page_h] = perimeter.page_dimensions_mm();
    let bbox = perimeter.bounding_box_mm().unwrap_or(BoundingBox {
        min_x: 0.0,
        min_y: 0.0,
        max_x: page_w,
        max_y: page_h,
    });

    let room_hints: Vec<serde_json::Value> = perimeter
        .rooms
        .iter()
        .map(|room| {
            json!({
                "name": room.name,
                "area_sq_pts": room.area_sq_pts,
                "area_sq_ft": room.area_sq_ft,
                "boundary_wall_indices": room.boundary_walls,
            })
        })
        .collect();

    Ok(format!(
        "Perimeter walls in millimeters:\n{}\n\n\
         Perimeter bounding box in millimeters:\n{}\n\n\
         Page dimensions in millimeters:\n{}\n\n\
         Extracted room hints from the spatial graph:\n{}\n\n\
         User description:\n{}\n\n\
         Generate interior walls, doors, and fixtures that subdivide the perimeter into the \
         described rooms. All coordinates must be in millimeters.\n\
         Return only valid JSON.",
        serde_json::to_string_pretty(&walls)?,
        serde_json::to_string_pretty(&bbox)?,
        serde_json::to_string_pretty(&json!({ "width_mm": page_w, "height_mm": page_h }))?,
        serde_json::to_string_pretty(&room_hints)?,
        description,
    ))
}

/// Violation lines split into (blocking errors, warnings)
fn format_feedback(result: &ConstraintResult) -> (String, String) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for violation in &result.violations {
        let affected = if violation.affected_elements.is_empty() {
            String::new()
        } else {
            format!(" (affected: {})", violation.affected_elements.join(", "))
        };
        let line = format!(
            "- [{}] {}{}",
            violation.severity.label(),
            violation.description,
            affected
        );
        match violation.severity {
            Severity::Error => errors.push(line),
            Severity::Warning => warnings.push(line),
        }
    }

    if errors.is_empty() {
        errors.push(
            "- [ERROR] Validation failed with no explicit blocking errors returned.".to_string(),
        );
    }

    (errors.join("\n"), warnings.join("\n"))
}

/// Correction prompt built from the previous best candidate
pub fn build_feedback_prompt(
    original_prompt: &str,
    previous: &GeneratedLayout,
    result: &ConstraintResult,
) -> serde_json::Result<String> {
    let (errors, warnings) = format_feedback(result);

    let warning_block = if warnings.is_empty() {
        String::new()
    } else {
        format!(
            "\nSecondary warnings to improve after fixing blocking errors:\n{}\n",
            warnings
        )
    };

    Ok(format!(
        "{}\n\n\
         PREVIOUS ATTEMPT FAILED VALIDATION.\n\
         Previous generated layout JSON:\n{}\n\n\
         Blocking errors to fix first:\n{}\n{}\n\
         Regenerate the layout fixing these constraint violations. \
         Keep all valid elements unchanged where possible. \
         Return a full layout JSON and ensure no blocking [ERROR] violations remain.",
        original_prompt,
        previous.to_json_pretty()?,
        errors,
        warning_block,
    ))
}

/// Per-candidate prompt; `index` is 1-based
pub fn candidate_prompt(base: &str, index: usize, total: usize) -> String {
    if total <= 1 {
        return base.to_string();
    }
    let hint = VARIATION_HINTS[index.saturating_sub(1) % VARIATION_HINTS.len()];
    format!("{}\n\nCANDIDATE_VARIATION {}/{}: {}", base, index, total, hint)
}
