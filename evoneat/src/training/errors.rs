use crate::GenomeId;

use std::error::Error;
use std::fmt;
use std::io;

/// An error type indicating an attempt to construct
/// a fitness from a negative score.
#[derive(Clone, Debug, PartialEq)]
pub struct NegativeFitnessError(pub f64);

impl fmt::Display for NegativeFitnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fitness scores cannot be negative (got {})", self.0)
    }
}

impl Error for NegativeFitnessError {}

/// An error type indicating a population or genome file could not
/// be saved or loaded.
#[derive(Debug)]
pub enum PopulationFileError {
    /// The file could not be read or written.
    Io(io::Error),
    /// The file's contents are not a valid population or genome.
    Corrupt(serde_json::Error),
    /// The file holds a population built for different input or
    /// output node counts than the current experiment.
    IncompatibleExperiment,
}

impl fmt::Display for PopulationFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "population file could not be read or written: {}", e),
            Self::Corrupt(e) => write!(f, "population file is corrupt: {}", e),
            Self::IncompatibleExperiment => {
                write!(f, "population is incompatible with the current experiment settings")
            }
        }
    }
}

impl Error for PopulationFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Corrupt(e) => Some(e),
            Self::IncompatibleExperiment => None,
        }
    }
}

/// A failed genome evaluation, recorded while the rest of the
/// generation carries on.
#[derive(Debug)]
pub struct EvaluationFailure {
    /// The genome whose evaluation failed. Its fitness
    /// is zero for the generation.
    pub genome: GenomeId,
    /// The error the evaluator reported.
    pub source: Box<dyn Error + Send + Sync>,
}

impl fmt::Display for EvaluationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evaluation of genome {} failed: {}", self.genome, self.source)
    }
}

impl Error for EvaluationFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.source.as_ref())
    }
}
