//! An implementation of NeuroEvolution of Augmenting Topologies for
//! training game-playing agents against an external evaluation harness.
//!
//! A [`PopulationTrainer`] maintains a population of genomes grouped into
//! species by structural similarity. Each generation it prunes stagnated
//! species, reproduces the fittest genomes through mutation and crossover,
//! re-speciates the offspring, and evaluates every genome's phenotype in
//! parallel against a caller-supplied [`Evaluator`] factory. The factory is
//! expected to hand out scoped, exclusive handles to whatever bounded
//! resource actually runs the network (an emulator instance, a simulator,
//! a plain function), released when the evaluator is dropped.
//!
//! # Example usage: evolving towards large output magnitudes
//! ```
//! use evoneat::{
//!     EvaluationError, Evaluator, ExperimentSettings, Fitness, NEATConfiguration, Phenome,
//!     PopulationTrainer,
//! };
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! struct OutputMagnitude;
//!
//! impl Evaluator for OutputMagnitude {
//!     fn evaluate(&mut self, phenome: &mut Phenome) -> Result<Fitness, EvaluationError> {
//!         phenome.set_inputs(&[1.0, 0.5]);
//!         phenome.activate();
//!         Ok(Fitness::new(phenome.outputs()[0].abs())?)
//!     }
//! }
//!
//! let mut config = NEATConfiguration::default();
//! config.reproduction.target_population = 20;
//! let experiment = ExperimentSettings {
//!     neural_input_count: 2,
//!     neural_output_count: 1,
//! };
//!
//! let mut trainer = PopulationTrainer::new(config, experiment, StdRng::seed_from_u64(42));
//! trainer.initialize(|| OutputMagnitude);
//! for _ in 0..5 {
//!     trainer.run_one_generation();
//! }
//! println!("{}", trainer.get_statistics());
//! ```

pub mod config;
pub mod genomics;
pub mod phenotype;
pub mod populations;
pub mod training;

mod rng;

pub use config::{ExperimentSettings, NEATConfiguration};
pub use genomics::{ConnectionGene, Genome, GenomeReproductor, NodeGene, NodeRole};
pub use phenotype::{Activation, Phenome};
pub use populations::{Population, Species};
pub use training::{
    EvaluationError, EvaluationFailure, Evaluator, Fitness, NegativeFitnessError,
    PopulationFileError, PopulationTrainer, Statistics,
};

/// Identifier assigned to a connection gene at creation, used to
/// align genes between genomes for crossover and compatibility
/// comparison.
pub type Innovation = u64;

/// Unique identity of a genome within a trainer's lifetime.
pub type GenomeId = u64;
