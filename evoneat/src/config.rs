//! Trainer configuration and experiment settings.

use crate::phenotype::Activation;

use serde::{Deserialize, Serialize};

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Full configuration for a [`PopulationTrainer`].
///
/// All quantities expressing probabilities should be in the
/// range [0.0, 1.0]. Using values that are not in this bound
/// may result in odd behaviours and/or incorrect programs.
///
/// [`PopulationTrainer`]: crate::training::PopulationTrainer
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NEATConfiguration {
    pub reproduction: ReproductionConfig,
    pub species: SpeciesConfig,
    pub genome: GenomeConfig,
}

impl NEATConfiguration {
    /// Loads a configuration from a JSON file. Missing fields
    /// take their default values.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<NEATConfiguration, ConfigFileError> {
        let text = fs::read_to_string(path).map_err(ConfigFileError::Unreadable)?;
        serde_json::from_str(&text).map_err(ConfigFileError::Corrupt)
    }
}

/// Configuration of population sizing, selection
/// pressure and the mutation/crossover operators.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReproductionConfig {
    /// Number of genomes the population is steered towards
    /// each generation.
    pub target_population: usize,
    /// Number of top species whose elite are carried over
    /// unmodified, and which are exempt from stagnation pruning.
    pub elite_species_count: usize,
    /// Number of top genomes carried over unmodified within
    /// each elite species.
    pub elite_genome_count: usize,
    /// Fraction of each species' worst performers removed
    /// before reproduction. A species is never emptied by this.
    pub pre_reproduction_remove_ratio: f64,
    /// Chance that an offspring is produced by crossover of two
    /// parents instead of mutation of a single parent.
    pub crossover_odds: f64,
    /// Chance that a gene disabled in either crossover parent
    /// remains disabled in the child.
    pub gene_remains_disabled_odds: f64,
    /// Chance that a mutation round touches connection weights at all.
    pub adjust_weights_odds: f64,
    /// Per-gene chance of a relative weight perturbation.
    pub weight_perturbation_odds: f64,
    /// Relative range of a weight perturbation.
    pub weight_perturbation_percent_range: f64,
    /// Per-gene chance of a full weight reshuffle, for genes
    /// that were not perturbed.
    pub weight_shuffle_odds: f64,
    /// Magnitude bound for freshly rolled connection weights.
    pub maximum_weight_amplitude: f64,
    /// Chance of an add-connection structural mutation.
    /// Always taken on genomes with no connections.
    pub mutation_add_connection_odds: f64,
    /// Chance of an add-node structural mutation.
    pub mutation_add_node_odds: f64,
    /// Number of mutation rounds applied per `mutate` call.
    pub mutation_iterations: usize,
}

impl Default for ReproductionConfig {
    fn default() -> ReproductionConfig {
        ReproductionConfig {
            target_population: 100,
            elite_species_count: 2,
            elite_genome_count: 1,
            pre_reproduction_remove_ratio: 0.75,
            crossover_odds: 0.1,
            gene_remains_disabled_odds: 0.5,
            adjust_weights_odds: 0.8,
            weight_perturbation_odds: 0.9,
            weight_perturbation_percent_range: 0.1,
            weight_shuffle_odds: 0.2,
            maximum_weight_amplitude: 5.0,
            mutation_add_connection_odds: 0.1,
            mutation_add_node_odds: 0.1,
            mutation_iterations: 1,
        }
    }
}

/// Configuration of the compatibility-distance speciation
/// and stagnation pruning.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesConfig {
    /// Compatibility-distance threshold beyond which a genome
    /// does not fit a species.
    pub species_max_delta: f64,
    /// Weight of the excess-gene count in the compatibility distance.
    pub delta_excess_genes_weight: f64,
    /// Weight of the disjoint-gene count in the compatibility distance.
    pub delta_disjoint_genes_weight: f64,
    /// Weight of the average matched-gene weight difference in the
    /// compatibility distance.
    pub delta_average_weight_difference_weight: f64,
    /// Genome-size floor below which the excess/disjoint counts are
    /// not normalized by genome size.
    pub minimum_gene_count_to_normalize_excess_disjoint: usize,
    /// Generations without a best-fitness improvement after which a
    /// non-elite species is removed.
    pub prune_after_x_generations_without_progress: usize,
}

impl Default for SpeciesConfig {
    fn default() -> SpeciesConfig {
        SpeciesConfig {
            species_max_delta: 10.0,
            delta_excess_genes_weight: 1.0,
            delta_disjoint_genes_weight: 1.0,
            delta_average_weight_difference_weight: 1.0,
            minimum_gene_count_to_normalize_excess_disjoint: 20,
            prune_after_x_generations_without_progress: 20,
        }
    }
}

/// Activation functions stamped onto every genome at creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GenomeConfig {
    pub input_activation: Activation,
    pub hidden_activation: Activation,
    pub output_activation: Activation,
}

impl Default for GenomeConfig {
    fn default() -> GenomeConfig {
        GenomeConfig {
            input_activation: Activation::Linear,
            hidden_activation: Activation::ReLU,
            output_activation: Activation::Tanh,
        }
    }
}

/// Input/output node counts of the experiment a trainer is
/// running. Fixed for the lifetime of a trainer, and embedded
/// in population files to validate load compatibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentSettings {
    pub neural_input_count: usize,
    pub neural_output_count: usize,
}

/// An error type indicating a configuration file could not be loaded.
#[derive(Debug)]
pub enum ConfigFileError {
    /// The file could not be read.
    Unreadable(io::Error),
    /// The file's contents are not a valid configuration.
    Corrupt(serde_json::Error),
}

impl fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable(e) => write!(f, "configuration file could not be read: {}", e),
            Self::Corrupt(e) => write!(f, "configuration file is not valid: {}", e),
        }
    }
}

impl Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unreadable(e) => Some(e),
            Self::Corrupt(e) => Some(e),
        }
    }
}
