use crate::phenotype::Phenome;
use crate::training::Fitness;

use std::error::Error;

/// The error type evaluators report failures with.
pub type EvaluationError = Box<dyn Error + Send + Sync>;

/// Scores phenotypes against the caller's environment.
///
/// The trainer constructs one evaluator per genome evaluation through
/// the factory passed to [`initialize`], calls [`evaluate`] exactly
/// once, and drops the evaluator. An evaluator wrapping a scarce
/// resource (an emulator instance, a network session) should acquire
/// it on construction and release it on drop; the factory may block
/// until a resource is free, which throttles evaluation to the
/// resources available.
///
/// An `Err` from [`evaluate`] fails only that genome: its fitness is
/// zeroed for the generation, and the error is surfaced through
/// [`take_evaluation_failures`].
///
/// [`initialize`]: crate::training::PopulationTrainer::initialize
/// [`evaluate`]: Evaluator::evaluate
/// [`take_evaluation_failures`]:
/// crate::training::PopulationTrainer::take_evaluation_failures
pub trait Evaluator {
    /// Drives `phenome` through the environment and scores it.
    fn evaluate(&mut self, phenome: &mut Phenome) -> Result<Fitness, EvaluationError>;
}
