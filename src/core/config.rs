//! Generation and validation configuration with documented defaults
//!
//! All tunables of the generation loop live here. Values are passed
//! explicitly to each component; nothing in the crate reads a global.
//!
//! Precedence, lowest to highest: `Default` -> TOML file -> environment.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{LayoutError, Result};

/// Tunables for the spatial constraint validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintConfig {
    /// Minimum clear width of corridor/hallway rooms (mm)
    ///
    /// Corridors are eroded by half this value; an empty erosion
    /// means the corridor pinches below the minimum somewhere.
    pub corridor_min_width_mm: f64,

    /// Overlap area between two rooms that is still tolerated (mm²)
    ///
    /// 10 000 mm² = 0.01 m². Shared walls and snapping noise produce
    /// slivers well below this.
    pub room_overlap_tolerance_mm2: f64,

    /// Fraction by which total room area may exceed the perimeter area
    pub area_budget_tolerance: f64,

    /// Number of arc segments used to tessellate a door swing
    pub door_swing_segments: usize,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            corridor_min_width_mm: 900.0,
            room_overlap_tolerance_mm2: 10_000.0,
            area_budget_tolerance: 0.05,
            door_swing_segments: 32,
        }
    }
}

/// Configuration for the self-correcting generation loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    // === PROVIDER CALLS ===
    /// Wall-clock limit for a single provider call (seconds)
    ///
    /// Enforced by the crate itself, independent of whatever timeout
    /// the transport does or does not honour.
    pub timeout_seconds: f64,

    /// Additional attempts after the first one for transient failures
    ///
    /// At the default of 3 a call is attempted at most 4 times.
    pub max_retries: u32,

    /// First backoff delay (seconds); doubles on every retry
    pub retry_base_delay_seconds: f64,

    /// Upper bound for any single backoff delay (seconds)
    pub retry_max_delay_seconds: f64,

    // === CANDIDATE FAN-OUT ===
    /// Candidates requested in the first iteration (clamped to min/max)
    pub parallel_candidates: usize,

    /// Lower bound for the adaptive candidate count
    pub candidate_min: usize,

    /// Upper bound for the adaptive candidate count
    ///
    /// A value of 1 selects serial mode: exactly one candidate per
    /// iteration and the scheduler is never consulted.
    pub candidate_max: usize,

    /// Maximum number of provider calls in flight at once
    ///
    /// Independent of the candidate count; extra candidates queue.
    pub max_workers: usize,

    // === LOOP ===
    /// Generate/validate rounds before giving up
    pub max_iterations: u32,

    /// Construction grid increment (mm)
    pub grid_size_mm: u32,

    // === VALIDATION ===
    pub constraints: ConstraintConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60.0,
            max_retries: 3,
            retry_base_delay_seconds: 1.0,
            retry_max_delay_seconds: 30.0,

            parallel_candidates: 2,
            candidate_min: 1,
            candidate_max: 4,
            max_workers: 4,

            max_iterations: 3,
            grid_size_mm: 50,

            constraints: ConstraintConfig::default(),
        }
    }
}

impl GenerationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-candidate configuration
    pub fn serial() -> Self {
        Self {
            parallel_candidates: 1,
            candidate_min: 1,
            candidate_max: 1,
            ..Self::default()
        }
    }

    pub fn is_serial(&self) -> bool {
        self.candidate_max == 1
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_seconds)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_base_delay_seconds)
    }

    pub fn retry_max_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_max_delay_seconds)
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GenerationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GenerationConfig = toml::from_str(&content)?;
        let config = config.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self> {
        let config = Self::default().with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `GENERATION_*` environment variables on top of this config
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = parse_var(&lookup, "GENERATION_TIMEOUT_SECONDS")? {
            self.timeout_seconds = v;
        }
        if let Some(v) = parse_var(&lookup, "GENERATION_MAX_RETRIES")? {
            self.max_retries = v;
        }
        if let Some(v) = parse_var(&lookup, "GENERATION_RETRY_BASE_DELAY")? {
            self.retry_base_delay_seconds = v;
        }
        if let Some(v) = parse_var(&lookup, "GENERATION_RETRY_MAX_DELAY")? {
            self.retry_max_delay_seconds = v;
        }
        if let Some(v) = parse_var(&lookup, "GENERATION_PARALLEL_CANDIDATES")? {
            self.parallel_candidates = v;
        }
        if let Some(v) = parse_var(&lookup, "GENERATION_MAX_WORKERS")? {
            self.max_workers = v;
        }
        if let Some(v) = parse_var(&lookup, "GENERATION_CANDIDATE_MIN")? {
            self.candidate_min = v;
        }
        if let Some(v) = parse_var(&lookup, "GENERATION_CANDIDATE_MAX")? {
            self.candidate_max = v;
        }
        if let Some(v) = parse_var(&lookup, "GENERATION_MAX_ITERATIONS")? {
            self.max_iterations = v;
        }
        if let Some(v) = parse_var(&lookup, "GENERATION_GRID_SIZE_MM")? {
            self.grid_size_mm = v;
        }
        Ok(self)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.timeout_seconds.is_finite() && self.timeout_seconds > 0.0) {
            return Err(invalid(format!(
                "timeout_seconds must be positive, got {}",
                self.timeout_seconds
            )));
        }

        let base = self.retry_base_delay_seconds;
        let max = self.retry_max_delay_seconds;
        if !(base.is_finite() && base >= 0.0 && max.is_finite() && max >= 0.0) {
            return Err(invalid("retry delays must be finite and non-negative".into()));
        }
        if base > max {
            return Err(invalid(format!(
                "retry_base_delay_seconds ({}) should be <= retry_max_delay_seconds ({})",
                base, max
            )));
        }

        for (name, seconds) in [
            ("timeout_seconds", self.timeout_seconds),
            ("retry_base_delay_seconds", base),
            ("retry_max_delay_seconds", max),
        ] {
            if Duration::try_from_secs_f64(seconds).is_err() {
                return Err(invalid(format!(
                    "{} ({}) is too large to be a duration",
                    name, seconds
                )));
            }
        }

        if self.candidate_min == 0 {
            return Err(invalid("candidate_min must be at least 1".into()));
        }
        if self.candidate_min > self.candidate_max {
            return Err(invalid(format!(
                "candidate_min ({}) should be <= candidate_max ({})",
                self.candidate_min, self.candidate_max
            )));
        }
        if self.parallel_candidates == 0 {
            return Err(invalid("parallel_candidates must be at least 1".into()));
        }
        if self.max_workers == 0 {
            return Err(invalid("max_workers must be at least 1".into()));
        }
        if self.max_iterations == 0 {
            return Err(invalid("max_iterations must be at least 1".into()));
        }
        if self.grid_size_mm == 0 {
            return Err(invalid("grid_size_mm must be at least 1".into()));
        }

        let c = &self.constraints;
        if !(c.corridor_min_width_mm.is_finite() && c.corridor_min_width_mm > 0.0) {
            return Err(invalid("corridor_min_width_mm must be positive".into()));
        }
        if !(c.room_overlap_tolerance_mm2 >= 0.0 && c.area_budget_tolerance >= 0.0) {
            return Err(invalid("constraint tolerances must be non-negative".into()));
        }
        if c.door_swing_segments < 2 {
            return Err(invalid("door_swing_segments must be at least 2".into()));
        }

        Ok(())
    }
}

fn invalid(message: String) -> LayoutError {
    LayoutError::InvalidConfig(message)
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(format!("{} has unparseable value '{}'", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = GenerationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid_size_mm, 50);
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.constraints.corridor_min_width_mm, 900.0);
        assert_eq!(config.constraints.room_overlap_tolerance_mm2, 10_000.0);
        assert!(!config.is_serial());
        assert!(GenerationConfig::serial().is_serial());
    }

    #[test]
    fn test_toml_partial_override() {
        let config = GenerationConfig::from_toml_str(
            r#"
            max_iterations = 5
            candidate_max = 2

            [constraints]
            corridor_min_width_mm = 1200.0
            "#,
        )
        .unwrap();
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.candidate_max, 2);
        assert_eq!(config.constraints.corridor_min_width_mm, 1200.0);
        // untouched keys keep defaults
        assert_eq!(config.timeout_seconds, 60.0);
        assert_eq!(config.constraints.area_budget_tolerance, 0.05);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("GENERATION_TIMEOUT_SECONDS", "12.5"),
            ("GENERATION_CANDIDATE_MAX", "1"),
            ("GENERATION_MAX_RETRIES", "0"),
        ]
        .into_iter()
        .collect();

        let config = GenerationConfig::default()
            .with_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.timeout_seconds, 12.5);
        assert_eq!(config.candidate_max, 1);
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_env_override_garbage_is_rejected() {
        let result = GenerationConfig::default()
            .with_overrides(|k| (k == "GENERATION_MAX_WORKERS").then(|| "many".to_string()));
        assert!(matches!(result, Err(LayoutError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let config = GenerationConfig {
            candidate_min: 3,
            candidate_max: 2,
            ..GenerationConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GenerationConfig {
            retry_base_delay_seconds: 10.0,
            retry_max_delay_seconds: 1.0,
            ..GenerationConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GenerationConfig {
            timeout_seconds: 0.0,
            ..GenerationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unrepresentable_durations() {
        let config = GenerationConfig {
            timeout_seconds: 1e20,
            ..GenerationConfig::serial()
        };
        assert!(matches!(config.validate(), Err(LayoutError::InvalidConfig(_))));

        let config = GenerationConfig {
            retry_base_delay_seconds: 1e20,
            retry_max_delay_seconds: 1e21,
            ..GenerationConfig::default()
        };
        assert!(matches!(config.validate(), Err(LayoutError::InvalidConfig(_))));

        let result = GenerationConfig::default()
            .with_overrides(|k| (k == "GENERATION_TIMEOUT_SECONDS").then(|| "1e20".to_string()))
            .and_then(|config| config.validate());
        assert!(result.is_err());
    }
}
