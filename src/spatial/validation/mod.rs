//! Spatial constraint validation for generated layouts
//!
//! The validator only reports; it never repairs a layout. Errors block
//! acceptance of a candidate, warnings are carried along as feedback.

mod composite;
mod doors;
mod fixtures;
mod geometric;
mod rooms;

pub use composite::{validate_layout, validate_layout_with, CompositeValidator};
pub use doors::DoorValidator;
pub use fixtures::FixtureValidator;
pub use geometric::GeometricValidator;
pub use rooms::{RoomShape, RoomValidator};

use serde::{Deserialize, Serialize};

/// Constraint families checked by the validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    RoomOverlap,
    CorridorTooNarrow,
    DoorSwingBlocked,
    RoomNotEnclosed,
    AreaExceedsPerimeter,
    FixtureOutsideRoom,
    FixtureOverlap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks acceptance
    Error,
    /// Reported, does not block
    Warning,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        }
    }
}

/// A single spatial rule violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub description: String,
    pub severity: Severity,
    /// Ids or names of the rooms, walls, doors and fixtures involved
    #[serde(default)]
    pub affected_elements: Vec<String>,
}

impl ConstraintViolation {
    pub fn error(kind: ViolationKind, description: String, affected: Vec<String>) -> Self {
        Self {
            kind,
            description,
            severity: Severity::Error,
            affected_elements: affected,
        }
    }

    pub fn warning(kind: ViolationKind, description: String, affected: Vec<String>) -> Self {
        Self {
            kind,
            description,
            severity: Severity::Warning,
            affected_elements: affected,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Aggregate outcome of validating one layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintResult {
    /// True iff there are no error-severity violations
    pub passed: bool,
    pub violations: Vec<ConstraintViolation>,
    pub summary: String,
}

impl ConstraintResult {
    pub fn from_violations(violations: Vec<ConstraintViolation>) -> Self {
        let errors = violations.iter().filter(|v| v.is_error()).count();
        let warnings = violations.len() - errors;
        Self {
            passed: errors == 0,
            violations,
            summary: format!("{} errors, {} warnings", errors, warnings),
        }
    }

    pub fn error_count(&self) -> usize {
        self.violations.iter().filter(|v| v.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.violations.len() - self.error_count()
    }

    /// Passed, but with something left to improve
    pub fn has_warnings_only(&self) -> bool {
        self.error_count() == 0 && self.warning_count() > 0
    }

    pub fn has_kind(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }
}
