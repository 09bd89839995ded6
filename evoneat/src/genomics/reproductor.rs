use crate::config::{ExperimentSettings, NEATConfiguration};
use crate::genomics::{ConnectionGene, Genome};
use crate::populations::Population;
use crate::training::Fitness;
use crate::{GenomeId, Innovation};

use ahash::RandomState;
use rand::Rng;

use std::collections::HashMap;

/// Stateful generator of new genomes: initial-population synthesis,
/// mutation and crossover.
///
/// The reproductor owns the global innovation counter and a
/// per-generation novelty cache mapping connection endpoints to
/// innovation numbers, so that equivalent structural mutations
/// arising independently within one generation share an innovation
/// number. [`new_generation`] clears the cache but never the counter.
///
/// All randomness is drawn from the caller-supplied random source,
/// so reproduction is deterministic given a fixed seed.
///
/// [`new_generation`]: GenomeReproductor::new_generation
pub struct GenomeReproductor {
    config: NEATConfiguration,
    experiment: ExperimentSettings,
    next_innovation: Innovation,
    next_genome_id: GenomeId,
    innovation_ids: HashMap<(usize, usize), Innovation, RandomState>,
}

impl GenomeReproductor {
    /// Creates a new reproductor for the given configuration and
    /// experiment settings.
    pub fn new(config: NEATConfiguration, experiment: ExperimentSettings) -> GenomeReproductor {
        GenomeReproductor {
            config,
            experiment,
            next_innovation: 0,
            next_genome_id: 1,
            innovation_ids: HashMap::default(),
        }
    }

    /// Synthesizes the starting population: [`target_population`]
    /// genomes, each a mutated copy of the minimal topology spanning
    /// the experiment's input and output nodes.
    ///
    /// [`target_population`]: crate::config::ReproductionConfig::target_population
    pub fn initialize<R: Rng>(&mut self, rng: &mut R) -> Vec<Genome> {
        let base = Genome::base(&self.experiment, &self.config.genome);
        (0..self.config.reproduction.target_population)
            .map(|_| self.mutate(&base, rng))
            .collect()
    }

    /// Resets the per-generation novelty cache. Called once per
    /// generation, before any reproduction.
    pub fn new_generation(&mut self) {
        self.innovation_ids.clear();
    }

    /// Fast-forwards the innovation and genome-id counters past
    /// everything present in `population`, so that reproduction can
    /// resume from a loaded population without id collisions.
    pub(crate) fn resume_from(&mut self, population: &Population) {
        for genome in population.genomes() {
            self.next_genome_id = self.next_genome_id.max(genome.id() + 1);
            for gene in genome.genes() {
                self.next_innovation = self.next_innovation.max(gene.innovation() + 1);
            }
        }
    }

    /// Clones `parent` and applies weight and structural mutation
    /// rounds to the copy. New connection genes receive innovation
    /// numbers from the novelty cache; a mutation never duplicates a
    /// connection between the same source and target inside one
    /// genome, and never introduces a cycle.
    pub fn mutate<R: Rng>(&mut self, parent: &Genome, rng: &mut R) -> Genome {
        let mut child = parent.clone();
        child.id = self.fresh_genome_id();
        child.fitness = Fitness::zero();
        child.adjusted_fitness = Fitness::zero();
        for _ in 0..self.config.reproduction.mutation_iterations {
            self.mutate_weights(&mut child, rng);
            self.mutate_add_connection(&mut child, rng);
            self.mutate_add_node(&mut child, rng);
        }
        child
    }

    /// Crosses two genomes over, aligning their connection genes by
    /// innovation number. Genes present in both parents are inherited
    /// from either at random; genes present only in the fitter parent
    /// are inherited; genes present only in the less-fit parent are
    /// dropped.
    ///
    /// The parents are ordered by adjusted fitness internally, so the
    /// result does not depend on argument order.
    pub fn crossover<R: Rng>(&mut self, fitter: &Genome, other: &Genome, rng: &mut R) -> Genome {
        let (fitter, other) = if other.adjusted_fitness() > fitter.adjusted_fitness() {
            (other, fitter)
        } else {
            (fitter, other)
        };

        let gene_remains_disabled_odds = self.config.reproduction.gene_remains_disabled_odds;
        let mut genes = Vec::with_capacity(fitter.genes.len());
        let (mut i, mut j) = (0, 0);
        while i < fitter.genes.len() {
            let a = &fitter.genes[i];
            if j >= other.genes.len() || a.innovation < other.genes[j].innovation {
                // Excess or disjoint relative to the less-fit parent.
                genes.push(*a);
                i += 1;
                continue;
            }
            let b = &other.genes[j];
            if b.innovation < a.innovation {
                // Present only in the less-fit parent; dropped.
                j += 1;
                continue;
            }
            let mut gene = if rng.gen_range(0..2) == 0 { *a } else { *b };
            if !a.enabled || !b.enabled {
                gene.enabled = rng.gen::<f64>() >= gene_remains_disabled_odds;
            }
            genes.push(gene);
            i += 1;
            j += 1;
        }

        let mut child = fitter.clone();
        child.id = self.fresh_genome_id();
        child.fitness = Fitness::zero();
        child.adjusted_fitness = Fitness::zero();
        child.genes = genes;
        child
    }

    fn mutate_weights<R: Rng>(&self, genome: &mut Genome, rng: &mut R) {
        let cfg = &self.config.reproduction;
        if genome.genes.is_empty() || rng.gen::<f64>() >= cfg.adjust_weights_odds {
            return;
        }
        for gene in &mut genome.genes {
            if rng.gen::<f64>() < cfg.weight_perturbation_odds {
                let nudge = (rng.gen::<f64>() * 2.0 - 1.0) * cfg.weight_perturbation_percent_range;
                gene.weight *= 1.0 + nudge;
            } else if rng.gen::<f64>() < cfg.weight_shuffle_odds {
                gene.weight = Self::random_weight(cfg.maximum_weight_amplitude, rng);
            }
        }
    }

    fn mutate_add_connection<R: Rng>(&mut self, genome: &mut Genome, rng: &mut R) {
        let odds = self.config.reproduction.mutation_add_connection_odds;
        let amplitude = self.config.reproduction.maximum_weight_amplitude;
        if !genome.genes.is_empty() && rng.gen::<f64>() >= odds {
            return;
        }
        let (depths, maximum_depth) = genome.node_depths();
        for _ in 0..100 {
            let input = match random_node(rng, &depths, 0, maximum_depth - 1) {
                Some(node) => node,
                None => return,
            };
            let output = match random_node(rng, &depths, depths[input].max(1), maximum_depth) {
                Some(node) => node,
                None => return,
            };
            if input == output
                || genome
                    .genes
                    .iter()
                    .any(|g| g.input == input && g.output == output)
            {
                continue;
            }

            let innovation = self.innovation_for(input, output);
            let weight = Self::random_weight(amplitude, rng);
            genome.genes.push(ConnectionGene::new(innovation, input, output, weight));
            genome.genes.sort_unstable_by_key(|g| g.innovation);
            if genome.has_cycle() {
                genome.genes.retain(|g| !(g.input == input && g.output == output));
            }
            return;
        }
    }

    fn mutate_add_node<R: Rng>(&mut self, genome: &mut Genome, rng: &mut R) {
        if rng.gen::<f64>() >= self.config.reproduction.mutation_add_node_odds
            || genome.genes.len() <= 1
        {
            return;
        }
        let enabled: Vec<usize> = genome
            .genes
            .iter()
            .enumerate()
            .filter(|(_, g)| g.enabled)
            .map(|(i, _)| i)
            .collect();
        if enabled.is_empty() {
            return;
        }
        let split = enabled[crate::rng::random_index(rng, enabled.len())];
        genome.genes[split].enabled = false;
        let (input, output, weight) = {
            let gene = &genome.genes[split];
            (gene.input, gene.output, gene.weight)
        };

        let node = genome.push_hidden_node();
        let incoming = self.innovation_for(input, node);
        let outgoing = self.innovation_for(node, output);
        genome.genes.push(ConnectionGene::new(incoming, input, node, weight));
        genome.genes.push(ConnectionGene::new(outgoing, node, output, 1.0));
        genome.genes.sort_unstable_by_key(|g| g.innovation);
    }

    /// Returns the innovation number for a connection between the
    /// given endpoints, assigning a fresh one if the mutation has not
    /// been seen this generation.
    fn innovation_for(&mut self, input: usize, output: usize) -> Innovation {
        if let Some(&innovation) = self.innovation_ids.get(&(input, output)) {
            return innovation;
        }
        let innovation = self.next_innovation;
        self.next_innovation += 1;
        self.innovation_ids.insert((input, output), innovation);
        innovation
    }

    fn fresh_genome_id(&mut self) -> GenomeId {
        let id = self.next_genome_id;
        self.next_genome_id += 1;
        id
    }

    fn random_weight<R: Rng>(amplitude: f64, rng: &mut R) -> f64 {
        (rng.gen::<f64>() * 2.0 - 1.0) * amplitude
    }
}

/// Uniformly picks a node whose depth lies in `[minimum, maximum]`.
fn random_node<R: Rng>(
    rng: &mut R,
    depths: &[usize],
    minimum: usize,
    maximum: usize,
) -> Option<usize> {
    let candidates: Vec<usize> = depths
        .iter()
        .enumerate()
        .filter(|(_, &d)| d >= minimum && d <= maximum)
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[crate::rng::random_index(rng, candidates.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn reproductor(inputs: usize, outputs: usize) -> GenomeReproductor {
        GenomeReproductor::new(
            NEATConfiguration::default(),
            ExperimentSettings {
                neural_input_count: inputs,
                neural_output_count: outputs,
            },
        )
    }

    #[test]
    fn initialize_produces_target_population() {
        let mut reproductor = reproductor(3, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let genomes = reproductor.initialize(&mut rng);
        assert_eq!(genomes.len(), 100);
        for genome in &genomes {
            assert!(!genome.genes().is_empty());
            assert!(!genome.has_cycle());
        }
    }

    #[test]
    fn equivalent_mutations_share_innovation_numbers_within_a_generation() {
        let mut reproductor = reproductor(2, 1);
        let first = reproductor.innovation_for(0, 2);
        assert_eq!(reproductor.innovation_for(0, 2), first);
        let second = reproductor.innovation_for(1, 2);
        assert_ne!(second, first);

        reproductor.new_generation();
        // The cache is cleared, but the counter keeps running.
        assert!(reproductor.innovation_for(0, 2) > second);
    }

    #[test]
    fn mutation_never_duplicates_a_connection() {
        let mut reproductor = reproductor(3, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let base = Genome::base(
            &reproductor.experiment,
            &reproductor.config.genome,
        );
        let mut genome = reproductor.mutate(&base, &mut rng);
        for _ in 0..200 {
            genome = reproductor.mutate(&genome, &mut rng);
        }
        for (i, a) in genome.genes().iter().enumerate() {
            for b in &genome.genes()[i + 1..] {
                assert!(
                    !(a.input() == b.input() && a.output() == b.output()),
                    "duplicate connection {} -> {}",
                    a.input(),
                    a.output(),
                );
            }
        }
        assert!(!genome.has_cycle());
    }

    #[test]
    fn mutated_genes_stay_sorted_by_innovation() {
        let mut reproductor = reproductor(2, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let base = Genome::base(&reproductor.experiment, &reproductor.config.genome);
        let mut genome = reproductor.mutate(&base, &mut rng);
        for _ in 0..100 {
            genome = reproductor.mutate(&genome, &mut rng);
            reproductor.new_generation();
        }
        let innovations: Vec<_> = genome.genes().iter().map(|g| g.innovation()).collect();
        let mut sorted = innovations.clone();
        sorted.sort_unstable();
        assert_eq!(innovations, sorted);
    }

    #[test]
    fn crossover_drops_genes_unique_to_the_less_fit_parent() {
        let mut reproductor = reproductor(2, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(17);

        let base = Genome::base(&reproductor.experiment, &reproductor.config.genome);
        let mut fitter = base.clone();
        fitter.genes.push(ConnectionGene::new(0, 0, 2, 1.0));
        fitter.genes.push(ConnectionGene::new(2, 1, 2, 1.0));
        fitter.set_adjusted_fitness(Fitness::new(10.0).unwrap());

        let mut other = base;
        other.genes.push(ConnectionGene::new(0, 0, 2, -1.0));
        other.genes.push(ConnectionGene::new(1, 1, 2, -1.0));
        other.set_adjusted_fitness(Fitness::new(1.0).unwrap());

        let child = reproductor.crossover(&fitter, &other, &mut rng);
        let innovations: Vec<_> = child.genes().iter().map(|g| g.innovation()).collect();
        assert_eq!(innovations, vec![0, 2]);

        // Argument order does not matter; the fitter parent's
        // structure always frames the child.
        let swapped = reproductor.crossover(&other, &fitter, &mut rng);
        let innovations: Vec<_> = swapped.genes().iter().map(|g| g.innovation()).collect();
        assert_eq!(innovations, vec![0, 2]);
    }
}
