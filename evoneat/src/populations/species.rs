use crate::genomics::Genome;
use crate::training::Fitness;

use serde::{Deserialize, Serialize};

use std::cmp::Ordering;

/// A group of genomes within compatibility distance of a shared
/// representative.
///
/// A species tracks the best raw fitness any member has ever reached
/// and the number of generations since that record last improved,
/// which drives stagnation pruning.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Species {
    pub(crate) genomes: Vec<Genome>,
    pub(crate) representative: Genome,
    pub(crate) best_fitness: Option<Fitness>,
    pub(crate) adjusted_fitness_sum: Fitness,
    pub(crate) gens_since_last_progress: usize,
}

impl Species {
    /// Creates a species from its founding member, which also
    /// serves as the initial representative.
    pub(crate) fn new(representative: Genome) -> Species {
        Species {
            genomes: vec![representative.clone()],
            representative,
            best_fitness: None,
            adjusted_fitness_sum: Fitness::zero(),
            gens_since_last_progress: 0,
        }
    }

    /// Returns the species' member genomes.
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Returns the number of member genomes.
    pub fn member_count(&self) -> usize {
        self.genomes.len()
    }

    /// Returns the genome new candidates are compared against
    /// during speciation.
    pub fn representative(&self) -> &Genome {
        &self.representative
    }

    /// Returns the best raw fitness any member has ever reached,
    /// or `None` if the species has not been through a fitness
    /// adjustment yet.
    pub fn best_fitness(&self) -> Option<&Fitness> {
        self.best_fitness.as_ref()
    }

    /// Returns the sum of the members' adjusted fitness values, as
    /// computed by the last fitness adjustment.
    pub fn adjusted_fitness_sum(&self) -> &Fitness {
        &self.adjusted_fitness_sum
    }

    /// Returns the number of generations since the species last
    /// improved its best fitness.
    pub fn time_stagnated(&self) -> usize {
        self.gens_since_last_progress
    }

    /// Returns the species' current fittest member, if any.
    pub fn champion(&self) -> Option<&Genome> {
        self.genomes
            .iter()
            .max_by(|a, b| a.fitness().compare(b.fitness()))
    }

    /// Returns the mean raw fitness of the members.
    pub(crate) fn average_fitness(&self) -> f64 {
        if self.genomes.is_empty() {
            return 0.0;
        }
        let total: f64 = self.genomes.iter().map(|g| g.fitness().score()).sum();
        total / self.genomes.len() as f64
    }

    /// Sorts members fittest-first. Ties keep their existing order.
    pub(crate) fn sort_genomes(&mut self) {
        self.genomes
            .sort_by(|a, b| b.fitness().compare(a.fitness()));
    }

    /// Compares species by their best-ever fitness. A species that
    /// has never been through a fitness adjustment orders below one
    /// that has.
    pub(crate) fn cmp_best_fitness(&self, other: &Species) -> Ordering {
        match (&self.best_fitness, &other.best_fitness) {
            (Some(a), Some(b)) => a.compare(b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExperimentSettings, GenomeConfig};

    fn genome_with_fitness(score: f64) -> Genome {
        let mut genome = Genome::base(
            &ExperimentSettings {
                neural_input_count: 1,
                neural_output_count: 1,
            },
            &GenomeConfig::default(),
        );
        genome.set_fitness(Fitness::new(score).unwrap());
        genome
    }

    #[test]
    fn new_species_contains_its_representative() {
        let founder = genome_with_fitness(3.0);
        let species = Species::new(founder.clone());
        assert_eq!(species.member_count(), 1);
        assert_eq!(species.genomes()[0], founder);
        assert_eq!(species.representative(), &founder);
        assert!(species.best_fitness().is_none());
    }

    #[test]
    fn sort_genomes_is_fittest_first() {
        let mut species = Species::new(genome_with_fitness(1.0));
        species.genomes.push(genome_with_fitness(5.0));
        species.genomes.push(genome_with_fitness(3.0));
        species.sort_genomes();

        let scores: Vec<f64> = species
            .genomes()
            .iter()
            .map(|g| g.fitness().score())
            .collect();
        assert_eq!(scores, vec![5.0, 3.0, 1.0]);
    }

    #[test]
    fn unadjusted_species_order_below_adjusted_ones() {
        let mut adjusted = Species::new(genome_with_fitness(0.0));
        adjusted.best_fitness = Some(Fitness::zero());
        let fresh = Species::new(genome_with_fitness(9.0));

        assert_eq!(adjusted.cmp_best_fitness(&fresh), Ordering::Greater);
        assert_eq!(fresh.cmp_best_fitness(&adjusted), Ordering::Less);
    }
}
