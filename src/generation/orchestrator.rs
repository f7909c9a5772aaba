//! Self-correcting generation loop
//!
//! Iterations run one after another because each prompt depends on the
//! previous outcome. Within an iteration candidates run in parallel, each
//! owning its layout end to end: propose, stamp the perimeter, snap,
//! validate. The best candidate either ends the loop or becomes feedback.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::core::config::GenerationConfig;
use crate::core::error::{LayoutError, Result};
use crate::generation::resilience::{call_with_resilience, RetryPolicy};
use crate::generation::scheduler::{clamp_count, next_candidate_count, IterationSignal};
use crate::layout::perimeter::PerimeterGraph;
use crate::layout::schema::{GeneratedLayout, PerimeterWall};
use crate::llm::prompt::{build_feedback_prompt, candidate_prompt};
use crate::llm::provider::{LayoutProvider, ProposalRequest, ProviderError};
use crate::spatial::grid::snap_layout;
use crate::spatial::validation::{validate_layout_with, ConstraintResult};

/// Final output of one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Winning layout, or the last snapped attempt when nothing passed
    pub layout: GeneratedLayout,
    pub success: bool,
    pub iterations_used: u32,
    /// Best candidate's result for every iteration that produced one
    pub constraint_history: Vec<ConstraintResult>,
    pub error_message: Option<String>,
}

/// A snapped and validated candidate
#[derive(Debug, Clone)]
struct Candidate {
    layout: GeneratedLayout,
    result: ConstraintResult,
}

/// Everything a candidate task needs, shared across one run
struct RunContext {
    provider: Arc<dyn LayoutProvider>,
    perimeter: PerimeterGraph,
    perimeter_walls: Vec<PerimeterWall>,
    page_dimensions_mm: [f64; 2],
    description: String,
    config: GenerationConfig,
    policy: RetryPolicy,
}

/// Outcome of one iteration's fan-out
struct IterationOutcome {
    /// Successful candidates in completion order
    candidates: Vec<Candidate>,
    failures: Vec<ProviderError>,
}

/// Generate a layout for `perimeter` that passes validation
///
/// Running out of iterations is a normal result with `success = false`.
/// Errors are reserved for bad input and for the provider failing every
/// candidate of every iteration.
pub async fn generate_validated_layout(
    provider: Arc<dyn LayoutProvider>,
    perimeter: &PerimeterGraph,
    description: &str,
    config: &GenerationConfig,
) -> Result<GenerationResult> {
    config.validate()?;
    perimeter.validate()?;
    if description.trim().is_empty() {
        return Err(LayoutError::InvalidInput("prompt is empty".into()));
    }

    let run_id = Uuid::new_v4();
    let ctx = Arc::new(RunContext {
        provider,
        perimeter_walls: perimeter.walls_mm(),
        page_dimensions_mm: perimeter.page_dimensions_mm(),
        perimeter: perimeter.clone(),
        description: description.to_string(),
        config: config.clone(),
        policy: RetryPolicy::from_config(config),
    });

    run(ctx)
        .instrument(info_span!("generation", run_id = %run_id))
        .await
}

async fn run(ctx: Arc<RunContext>) -> Result<GenerationResult> {
    let config = &ctx.config;
    let (min, max) = (config.candidate_min, config.candidate_max);

    let mut count = if config.is_serial() {
        1
    } else {
        clamp_count(config.parallel_candidates, min, max)
    };
    let mut prompt = ctx.description.clone();
    let mut history: Vec<ConstraintResult> = Vec::new();
    let mut last_layout: Option<GeneratedLayout> = None;
    let mut last_failure: Option<ProviderError> = None;

    info!(
        max_iterations = config.max_iterations,
        candidates = count,
        serial = config.is_serial(),
        "Starting layout generation"
    );

    for iteration in 1..=config.max_iterations {
        let outcome = run_iteration(&ctx, &prompt, count).await;
        let had_provider_failure = !outcome.failures.is_empty();
        if let Some(err) = outcome.failures.last() {
            last_failure = Some(err.clone());
        }

        // min_by_key keeps the first of equal minimums, i.e. first completed
        let Some(best) = outcome
            .candidates
            .into_iter()
            .min_by_key(|c| c.result.error_count())
        else {
            warn!(
                iteration,
                failures = outcome.failures.len(),
                "No candidate survived the provider"
            );
            if !config.is_serial() {
                count = next_candidate_count(
                    count,
                    IterationSignal {
                        had_provider_failure: true,
                        ..IterationSignal::default()
                    },
                    min,
                    max,
                );
            }
            continue;
        };

        history.push(best.result.clone());

        if best.result.passed {
            info!(iteration, summary = %best.result.summary, "Layout passed validation");
            return Ok(GenerationResult {
                layout: best.layout,
                success: true,
                iterations_used: iteration,
                constraint_history: history,
                error_message: None,
            });
        }

        info!(
            iteration,
            summary = %best.result.summary,
            "Best candidate failed validation"
        );

        prompt = build_feedback_prompt(&ctx.description, &best.layout, &best.result)?;
        if !config.is_serial() {
            let signal = IterationSignal {
                had_provider_failure,
                had_blocking_violation: best.result.error_count() > 0,
                had_warnings_only: best.result.has_warnings_only(),
            };
            count = next_candidate_count(count, signal, min, max);
        }
        last_layout = Some(best.layout);
    }

    let Some(layout) = last_layout else {
        return Err(LayoutError::ProviderUnavailable {
            iterations: config.max_iterations,
            last_error: last_failure.unwrap_or_else(|| {
                ProviderError::Transport("no candidate was attempted".into())
            }),
        });
    };

    warn!(
        iterations = config.max_iterations,
        "Layout failed validation in every iteration"
    );
    Ok(GenerationResult {
        layout,
        success: false,
        iterations_used: config.max_iterations,
        constraint_history: history,
        error_message: Some(format!(
            "Layout failed validation after {} attempts",
            config.max_iterations
        )),
    })
}

/// Fan out `count` candidates, at most `max_workers` in flight
async fn run_iteration(ctx: &Arc<RunContext>, prompt: &str, count: usize) -> IterationOutcome {
    let workers = Arc::new(Semaphore::new(ctx.config.max_workers));
    let mut tasks = JoinSet::new();

    for index in 1..=count {
        let ctx = Arc::clone(ctx);
        let workers = Arc::clone(&workers);
        let request = Arc::new(ProposalRequest {
            prompt: candidate_prompt(prompt, index, count),
            perimeter: ctx.perimeter.clone(),
        });

        tasks.spawn(async move {
            let _permit = workers
                .acquire_owned()
                .await
                .map_err(|_| ProviderError::Transport("worker pool closed".into()))?;

            let provider = Arc::clone(&ctx.provider);
            let raw = call_with_resilience(&ctx.policy, move || {
                let provider = Arc::clone(&provider);
                let request = Arc::clone(&request);
                async move { provider.propose(&request).await }
            })
            .await?;

            let candidate = finish_candidate(&ctx, raw);
            debug!(
                candidate = index,
                errors = candidate.result.error_count(),
                warnings = candidate.result.warning_count(),
                "Candidate validated"
            );
            Ok::<Candidate, ProviderError>(candidate)
        });
    }

    let mut outcome = IterationOutcome {
        candidates: Vec::with_capacity(count),
        failures: Vec::new(),
    };
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(candidate)) => outcome.candidates.push(candidate),
            Ok(Err(err)) => {
                warn!(error = %err, "Candidate failed at the provider");
                outcome.failures.push(err);
            }
            Err(join_err) => {
                warn!(error = %join_err, "Candidate task ended abnormally");
                outcome
                    .failures
                    .push(ProviderError::Transport(join_err.to_string()));
            }
        }
    }
    outcome
}

/// Stamp the real perimeter onto a proposal, snap it and validate it
fn finish_candidate(ctx: &RunContext, mut layout: GeneratedLayout) -> Candidate {
    layout.perimeter_walls = ctx.perimeter_walls.clone();
    layout.page_dimensions_mm = ctx.page_dimensions_mm;
    layout.prompt = ctx.description.clone();

    let snapped = snap_layout(&layout, ctx.config.grid_size_mm);
    let result = validate_layout_with(&snapped, &ctx.config.constraints);
    Candidate {
        layout: snapped,
        result,
    }
}
