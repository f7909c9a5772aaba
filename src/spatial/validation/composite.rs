//! Composite validator that runs all validation checks

use tracing::debug;

use super::rooms::RoomShape;
use super::{ConstraintResult, DoorValidator, FixtureValidator, GeometricValidator, RoomValidator};
use crate::core::config::ConstraintConfig;
use crate::layout::schema::GeneratedLayout;

pub struct CompositeValidator;

impl CompositeValidator {
    /// Run every check and aggregate the violations
    ///
    /// Order: enclosure, room overlap, corridor width, door swings, area
    /// budget, fixture containment, fixture overlap. Rooms that fail the
    /// enclosure check are left out of the polygon-based room checks.
    pub fn validate(layout: &GeneratedLayout, config: &ConstraintConfig) -> ConstraintResult {
        let shapes: Vec<RoomShape<'_>> = layout.rooms.iter().map(RoomShape::build).collect();

        let mut violations = GeometricValidator::validate_enclosure(layout);
        violations.extend(RoomValidator::validate_overlaps(&shapes, config));
        violations.extend(RoomValidator::validate_corridors(&shapes, config));
        violations.extend(DoorValidator::validate_swings(layout, config));
        violations.extend(RoomValidator::validate_area_budget(layout, &shapes, config));
        violations.extend(FixtureValidator::validate_containment(layout, &shapes));
        violations.extend(FixtureValidator::validate_overlaps(layout));

        let result = ConstraintResult::from_violations(violations);
        debug!(
            rooms = layout.rooms.len(),
            doors = layout.doors.len(),
            fixtures = layout.fixtures.len(),
            summary = %result.summary,
            "Validated layout"
        );
        result
    }
}

/// Validate with the default constraint thresholds
pub fn validate_layout(layout: &GeneratedLayout) -> ConstraintResult {
    CompositeValidator::validate(layout, &ConstraintConfig::default())
}

pub fn validate_layout_with(
    layout: &GeneratedLayout,
    config: &ConstraintConfig,
) -> ConstraintResult {
    CompositeValidator::validate(layout, config)
}
