//! Population training: fitness, evaluation and the generation loop.
//!
//! The [`PopulationTrainer`] drives the whole algorithm; callers
//! provide an [`Evaluator`] factory and score each phenotype with a
//! [`Fitness`] value. Evaluation failures never abort a generation,
//! they are collected as [`EvaluationFailure`] records instead.

mod errors;
mod evaluator;
mod fitness;
mod statistics;
mod trainer;

pub use errors::{EvaluationFailure, NegativeFitnessError, PopulationFileError};
pub use evaluator::{EvaluationError, Evaluator};
pub use fitness::Fitness;
pub use statistics::Statistics;
pub use trainer::PopulationTrainer;
