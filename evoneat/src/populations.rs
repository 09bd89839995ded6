//! Species and population collections.
//!
//! A [`Population`] owns its [`Species`], and each species owns its
//! member genomes, so every genome belongs to exactly one species by
//! construction. The trainer moves genomes between species only when
//! re-speciating a generation's offspring.

mod species;

pub use species::Species;

use crate::config::ExperimentSettings;
use crate::genomics::Genome;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// The set of all species (and through them, all genomes) under
/// training, together with the experiment settings the genomes
/// were built for.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Population {
    pub(crate) species: Vec<Species>,
    experiment: ExperimentSettings,
}

impl Population {
    pub(crate) fn new(experiment: ExperimentSettings) -> Population {
        Population {
            species: Vec::new(),
            experiment,
        }
    }

    /// Returns the experiment settings the population was built for.
    pub fn experiment(&self) -> ExperimentSettings {
        self.experiment
    }

    /// Returns the total number of genomes across all species.
    pub fn genome_count(&self) -> usize {
        self.species.iter().map(Species::member_count).sum()
    }

    /// Returns whether the population holds no genomes.
    pub fn is_empty(&self) -> bool {
        self.species.iter().all(|s| s.genomes().is_empty())
    }

    /// Returns an iterator over all genomes, grouped by species.
    pub fn genomes(&self) -> impl Iterator<Item = &Genome> {
        self.species.iter().flat_map(|s| s.genomes().iter())
    }

    pub(crate) fn par_genomes_mut(&mut self) -> impl ParallelIterator<Item = &mut Genome> {
        self.species
            .par_iter_mut()
            .flat_map(|s| s.genomes.par_iter_mut())
    }

    /// Returns an iterator over the population's species.
    pub fn species(&self) -> impl Iterator<Item = &Species> {
        self.species.iter()
    }

    /// Returns the number of species.
    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    /// Returns the fittest genome in the population, if any.
    pub fn champion(&self) -> Option<&Genome> {
        self.genomes().max_by(|a, b| a.fitness().compare(b.fitness()))
    }

    /// Returns every genome, fittest first.
    pub fn genomes_by_descending_fitness(&self) -> Vec<&Genome> {
        let mut genomes: Vec<&Genome> = self.genomes().collect();
        genomes.sort_by(|a, b| b.fitness().compare(a.fitness()));
        genomes
    }

    /// Sorts species best-first, and each species' members
    /// fittest-first. Ties keep their existing order.
    pub(crate) fn sort(&mut self) {
        self.species
            .sort_by(|a, b| b.cmp_best_fitness(a));
        for species in &mut self.species {
            species.sort_genomes();
        }
    }
}
