use crate::config::{ExperimentSettings, GenomeConfig, SpeciesConfig};
use crate::genomics::{ConnectionGene, NodeGene, NodeRole};
use crate::phenotype::{Activation, Phenome};
use crate::training::Fitness;
use crate::GenomeId;

use serde::{Deserialize, Serialize};

use std::cmp::Ordering;
use std::fmt;

/// One candidate network: an ordered set of node genes and
/// innovation-numbered connection genes, plus the genome's raw
/// and species-size-adjusted fitness.
///
/// Genomes are created by a [`GenomeReproductor`] and are never
/// structurally modified afterwards; only their fitness values
/// are assigned during evaluation and adjustment.
///
/// [`GenomeReproductor`]: crate::genomics::GenomeReproductor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub(crate) id: GenomeId,
    pub(crate) input_count: usize,
    pub(crate) output_count: usize,
    pub(crate) nodes: Vec<NodeGene>,
    pub(crate) genes: Vec<ConnectionGene>,
    pub(crate) input_activation: Activation,
    pub(crate) hidden_activation: Activation,
    pub(crate) output_activation: Activation,
    pub(crate) fitness: Fitness,
    pub(crate) adjusted_fitness: Fitness,
}

impl Genome {
    /// Returns a minimal genome spanning the experiment's input and
    /// output nodes, with no connections.
    pub(crate) fn base(experiment: &ExperimentSettings, config: &GenomeConfig) -> Genome {
        let mut nodes = Vec::with_capacity(
            experiment.neural_input_count + experiment.neural_output_count,
        );
        for i in 0..experiment.neural_input_count {
            nodes.push(NodeGene::new(i, NodeRole::Input));
        }
        for o in 0..experiment.neural_output_count {
            nodes.push(NodeGene::new(experiment.neural_input_count + o, NodeRole::Output));
        }
        Genome {
            id: 0,
            input_count: experiment.neural_input_count,
            output_count: experiment.neural_output_count,
            nodes,
            genes: Vec::new(),
            input_activation: config.input_activation,
            hidden_activation: config.hidden_activation,
            output_activation: config.output_activation,
            fitness: Fitness::zero(),
            adjusted_fitness: Fitness::zero(),
        }
    }

    /// Returns the genome's unique identity.
    pub fn id(&self) -> GenomeId {
        self.id
    }

    /// Returns the number of input nodes.
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Returns the number of output nodes.
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    /// Returns the genome's node genes: inputs first, then outputs,
    /// then hidden nodes in creation order.
    pub fn nodes(&self) -> &[NodeGene] {
        &self.nodes
    }

    /// Returns the genome's connection genes, ordered by
    /// innovation number.
    pub fn genes(&self) -> &[ConnectionGene] {
        &self.genes
    }

    /// Returns the genome's complexity, i.e. its connection-gene count.
    pub fn complexity(&self) -> usize {
        self.genes.len()
    }

    /// Returns the genome's raw fitness, as assigned by the last
    /// evaluation.
    pub fn fitness(&self) -> &Fitness {
        &self.fitness
    }

    /// Returns the genome's species-size-adjusted fitness, as
    /// derived by the last fitness adjustment.
    pub fn adjusted_fitness(&self) -> &Fitness {
        &self.adjusted_fitness
    }

    pub(crate) fn set_fitness(&mut self, fitness: Fitness) {
        self.fitness = fitness;
    }

    pub(crate) fn set_adjusted_fitness(&mut self, fitness: Fitness) {
        self.adjusted_fitness = fitness;
    }

    pub(crate) fn input_activation(&self) -> Activation {
        self.input_activation
    }

    pub(crate) fn hidden_activation(&self) -> Activation {
        self.hidden_activation
    }

    pub(crate) fn output_activation(&self) -> Activation {
        self.output_activation
    }

    /// Appends a hidden node and returns its id.
    pub(crate) fn push_hidden_node(&mut self) -> usize {
        let id = self.nodes.len();
        self.nodes.push(NodeGene::new(id, NodeRole::Hidden));
        id
    }

    /// Decodes the genome into an executable network.
    pub fn to_phenome(&self) -> Phenome {
        Phenome::new(self)
    }

    /// Returns each node's depth in the network and the maximum
    /// depth. Inputs sit at depth 0 and outputs are pinned to the
    /// maximum depth, which is at least 1 even for genomes with no
    /// forward edges.
    ///
    /// Connections are laid out input-to-output, so every connection
    /// ends on a strictly deeper node than it starts on. The genome
    /// must be acyclic.
    pub(crate) fn node_depths(&self) -> (Vec<usize>, usize) {
        let mut depths = vec![0_usize; self.nodes.len()];
        let mut maximum_depth = 0;
        let mut changed = true;
        while changed {
            changed = false;
            for gene in &self.genes {
                if depths[gene.output] <= depths[gene.input] {
                    depths[gene.output] = depths[gene.input] + 1;
                    maximum_depth = maximum_depth.max(depths[gene.output]);
                    changed = true;
                }
            }
        }
        let maximum_depth = maximum_depth.max(1);
        for output in self.input_count..self.input_count + self.output_count {
            depths[output] = maximum_depth;
        }
        (depths, maximum_depth)
    }

    /// Returns whether the genome's connections (enabled or not)
    /// contain a cycle.
    pub(crate) fn has_cycle(&self) -> bool {
        let mut adjacency = vec![Vec::new(); self.nodes.len()];
        for gene in &self.genes {
            adjacency[gene.input].push(gene.output);
        }

        const ON_STACK: u8 = 1;
        const DONE: u8 = 2;
        let mut state = vec![0_u8; self.nodes.len()];
        for start in 0..self.nodes.len() {
            if state[start] != 0 {
                continue;
            }
            let mut stack = vec![(start, 0_usize)];
            state[start] = ON_STACK;
            while let Some(frame) = stack.last_mut() {
                let (node, next) = (frame.0, frame.1);
                if next < adjacency[node].len() {
                    frame.1 += 1;
                    let successor = adjacency[node][next];
                    match state[successor] {
                        ON_STACK => return true,
                        DONE => {}
                        _ => {
                            state[successor] = ON_STACK;
                            stack.push((successor, 0));
                        }
                    }
                } else {
                    state[node] = DONE;
                    stack.pop();
                }
            }
        }
        false
    }

    /// Returns the compatibility distance between two genomes:
    /// the weighted combination of excess genes, disjoint genes
    /// and average matched-gene weight difference.
    ///
    /// Excess and disjoint counts are normalized by the larger
    /// genome's gene count, unless both genomes are smaller than
    /// [`minimum_gene_count_to_normalize_excess_disjoint`].
    ///
    /// [`minimum_gene_count_to_normalize_excess_disjoint`]:
    /// crate::config::SpeciesConfig::minimum_gene_count_to_normalize_excess_disjoint
    pub fn delta(&self, other: &Genome, config: &SpeciesConfig) -> f64 {
        let a = &self.genes;
        let b = &other.genes;
        let (mut i, mut j) = (0, 0);
        let mut disjoint = 0_usize;
        let mut matched = 0_usize;
        let mut weight_difference = 0.0;
        while i < a.len() && j < b.len() {
            match a[i].innovation.cmp(&b[j].innovation) {
                Ordering::Less => {
                    disjoint += 1;
                    i += 1;
                }
                Ordering::Greater => {
                    disjoint += 1;
                    j += 1;
                }
                Ordering::Equal => {
                    weight_difference += (a[i].weight - b[j].weight).abs();
                    matched += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        let excess = (a.len() - i) + (b.len() - j);

        let gene_count = a.len().max(b.len());
        let normalizer = if gene_count >= config.minimum_gene_count_to_normalize_excess_disjoint {
            gene_count as f64
        } else {
            1.0
        };
        let average_weight_difference = if matched > 0 {
            weight_difference / matched as f64
        } else {
            0.0
        };

        (excess as f64 * config.delta_excess_genes_weight
            + disjoint as f64 * config.delta_disjoint_genes_weight)
            / normalizer
            + average_weight_difference * config.delta_average_weight_difference_weight
    }

    /// Loads a single genome from a JSON file, as written by
    /// [`save_champion`].
    ///
    /// [`save_champion`]: crate::training::PopulationTrainer::save_champion
    pub fn from_path<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Genome, crate::training::PopulationFileError> {
        use crate::training::PopulationFileError;
        let text = std::fs::read_to_string(path).map_err(PopulationFileError::Io)?;
        serde_json::from_str(&text).map_err(PopulationFileError::Corrupt)
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Genome {}: [", self.id)?;
        for (i, gene) in self.genes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", gene)?;
        }
        write!(f, "]")
    }
}
