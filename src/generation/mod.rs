//! Generation loop: resilient provider calls, candidate scheduling and
//! the validate-and-retry orchestrator

pub mod orchestrator;
pub mod resilience;
pub mod scheduler;

pub use orchestrator::{generate_validated_layout, GenerationResult};
pub use resilience::{backoff_delay, call_with_resilience, RetryPolicy};
pub use scheduler::{next_candidate_count, IterationSignal};
