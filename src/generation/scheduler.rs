//! Adaptive candidate count between iterations

/// Outcome of one iteration, as seen by the scheduler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationSignal {
    /// At least one candidate failed at the provider level
    pub had_provider_failure: bool,
    /// The best candidate still had error-severity violations
    pub had_blocking_violation: bool,
    /// The best candidate had warnings and no errors
    pub had_warnings_only: bool,
}

/// Candidates to request in the next iteration
///
/// Provider failures shrink the fan-out to protect cost, a warnings-only
/// best candidate widens it, and blocking violations leave it to the
/// feedback prompt. Always within `[min, max]`.
pub fn next_candidate_count(
    previous: usize,
    signal: IterationSignal,
    min: usize,
    max: usize,
) -> usize {
    let next = if signal.had_provider_failure {
        previous.saturating_sub(1)
    } else if signal.had_warnings_only {
        previous.saturating_add(1)
    } else {
        previous
    };
    clamp_count(next, min, max)
}

/// Clamp without panicking on inverted bounds; `max` wins
pub fn clamp_count(count: usize, min: usize, max: usize) -> usize {
    count.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FAILED: IterationSignal = IterationSignal {
        had_provider_failure: true,
        had_blocking_violation: false,
        had_warnings_only: false,
    };
    const WARNINGS: IterationSignal = IterationSignal {
        had_provider_failure: false,
        had_blocking_violation: false,
        had_warnings_only: true,
    };
    const BLOCKED: IterationSignal = IterationSignal {
        had_provider_failure: false,
        had_blocking_violation: true,
        had_warnings_only: false,
    };

    #[test]
    fn test_rules() {
        assert_eq!(next_candidate_count(3, FAILED, 1, 4), 2);
        assert_eq!(next_candidate_count(3, WARNINGS, 1, 4), 4);
        assert_eq!(next_candidate_count(3, BLOCKED, 1, 4), 3);
    }

    #[test]
    fn test_provider_failure_wins_over_warnings() {
        let both = IterationSignal {
            had_warnings_only: true,
            ..FAILED
        };
        assert_eq!(next_candidate_count(2, both, 1, 4), 1);
    }

    #[test]
    fn test_bounds_hold_at_edges() {
        assert_eq!(next_candidate_count(1, FAILED, 1, 4), 1);
        assert_eq!(next_candidate_count(4, WARNINGS, 1, 4), 4);
        assert_eq!(next_candidate_count(9, BLOCKED, 1, 4), 4);
    }

    proptest! {
        #[test]
        fn prop_count_stays_in_bounds(
            previous in 0usize..64,
            failure: bool,
            blocking: bool,
            warnings: bool,
            min in 1usize..8,
            span in 0usize..8,
        ) {
            let max = min + span;
            let signal = IterationSignal {
                had_provider_failure: failure,
                had_blocking_violation: blocking,
                had_warnings_only: warnings,
            };
            let next = next_candidate_count(previous, signal, min, max);
            prop_assert!(next >= min && next <= max);
        }
    }
}
