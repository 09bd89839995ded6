use crate::config::{ExperimentSettings, NEATConfiguration};
use crate::genomics::{Genome, GenomeReproductor};
use crate::populations::{Population, Species};
use crate::training::{
    EvaluationFailure, Evaluator, Fitness, PopulationFileError, Statistics,
};

use rand::Rng;
use rayon::prelude::*;

use std::fs;
use std::mem;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

type EvaluatorFactory = Box<dyn Fn() -> Box<dyn Evaluator + Send> + Send + Sync>;

/// Drives the full evolutionary loop over a population of genomes.
///
/// A trainer is created with [`new`], given its evaluator factory
/// with [`initialize`], and then stepped with [`run_one_generation`].
/// Each generation prunes stagnated species, removes each species'
/// worst performers, breeds replacement offspring through mutation
/// and crossover, re-speciates the offspring, evaluates every
/// genome's phenotype in parallel, and shares fitness within species.
///
/// All stochastic decisions are drawn from the random source supplied
/// at construction, so runs are reproducible from a seed. Evaluation
/// order is the only parallel part of a generation, and per-genome
/// evaluation is independent, so thread count does not change the
/// outcome of a run.
///
/// [`new`]: PopulationTrainer::new
/// [`initialize`]: PopulationTrainer::initialize
/// [`run_one_generation`]: PopulationTrainer::run_one_generation
pub struct PopulationTrainer<R: Rng> {
    config: NEATConfiguration,
    experiment: ExperimentSettings,
    rng: R,
    reproductor: GenomeReproductor,
    population: Population,
    evaluator_factory: Option<EvaluatorFactory>,
    generation: usize,
    stop: Arc<AtomicBool>,
    evaluation_failures: Vec<EvaluationFailure>,
}

impl<R: Rng> PopulationTrainer<R> {
    /// Creates a trainer with an empty population.
    pub fn new(
        config: NEATConfiguration,
        experiment: ExperimentSettings,
        rng: R,
    ) -> PopulationTrainer<R> {
        PopulationTrainer {
            reproductor: GenomeReproductor::new(config.clone(), experiment),
            population: Population::new(experiment),
            config,
            experiment,
            rng,
            evaluator_factory: None,
            generation: 0,
            stop: Arc::new(AtomicBool::new(false)),
            evaluation_failures: Vec::new(),
        }
    }

    /// Returns whether [`initialize`] has been called.
    ///
    /// [`initialize`]: PopulationTrainer::initialize
    pub fn is_initialized(&self) -> bool {
        self.evaluator_factory.is_some()
    }

    /// Returns the current population.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Returns the number of completed generations.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns a handle that, once set, makes the trainer wind down:
    /// [`run_one_generation`] becomes a no-op, and any evaluations
    /// not yet started score zero.
    ///
    /// [`run_one_generation`]: PopulationTrainer::run_one_generation
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Drains the evaluation failures collected so far. Failed
    /// genomes scored zero for their generation.
    pub fn take_evaluation_failures(&mut self) -> Vec<EvaluationFailure> {
        mem::take(&mut self.evaluation_failures)
    }

    /// Returns a snapshot of population health.
    pub fn get_statistics(&self) -> Statistics {
        Statistics::from_population(&self.population, self.generation)
    }

    /// Installs the evaluator factory and, unless a population was
    /// already loaded, synthesizes, speciates and evaluates the
    /// starting population.
    ///
    /// The factory is invoked once per genome evaluation, possibly
    /// from multiple threads at once. A factory guarding a bounded
    /// resource should block until an instance is free.
    pub fn initialize<F, E>(&mut self, factory: F)
    where
        F: Fn() -> E + Send + Sync + 'static,
        E: Evaluator + Send + 'static,
    {
        self.evaluator_factory = Some(Box::new(move || {
            let evaluator: Box<dyn Evaluator + Send> = Box::new(factory());
            evaluator
        }));
        if !self.population.is_empty() {
            // Resuming a loaded population; it already carries fitness.
            return;
        }
        let genomes = self.reproductor.initialize(&mut self.rng);
        self.assign_species(genomes);
        self.evaluate_population();
        self.adjust_fitnesses();
        self.population.sort();
    }

    /// Advances the population by one generation.
    ///
    /// Does nothing if the stop signal is set.
    ///
    /// # Panics
    /// Panics if called before [`initialize`].
    ///
    /// [`initialize`]: PopulationTrainer::initialize
    pub fn run_one_generation(&mut self) {
        assert!(
            self.is_initialized(),
            "run_one_generation called before initialize"
        );
        if self.stop.load(Ordering::Relaxed) {
            return;
        }

        self.reproductor.new_generation();
        self.prune_stale_species();
        self.select_species_representatives();
        self.eliminate_low_performing();
        let children = self.reproduce();
        self.retain_elites();
        self.assign_species(children);
        self.prune_empty_species();
        self.evaluate_population();
        self.adjust_fitnesses();
        self.population.sort();
        self.generation += 1;
    }

    /// Saves the population to a JSON file.
    pub fn save_population<P: AsRef<Path>>(&self, path: P) -> Result<(), PopulationFileError> {
        let json = serde_json::to_string_pretty(&self.population)
            .map_err(PopulationFileError::Corrupt)?;
        fs::write(path, json).map_err(PopulationFileError::Io)
    }

    /// Replaces the population with one loaded from a JSON file and
    /// fast-forwards reproduction state past the loaded genomes.
    ///
    /// The current population is left untouched on any error,
    /// including an experiment-settings mismatch.
    pub fn load_population<P: AsRef<Path>>(&mut self, path: P) -> Result<(), PopulationFileError> {
        let text = fs::read_to_string(path).map_err(PopulationFileError::Io)?;
        let population: Population =
            serde_json::from_str(&text).map_err(PopulationFileError::Corrupt)?;
        if population.experiment() != self.experiment {
            return Err(PopulationFileError::IncompatibleExperiment);
        }
        self.reproductor.resume_from(&population);
        self.population = population;
        Ok(())
    }

    /// Saves the population champion to a JSON file, readable back
    /// through [`Genome::from_path`].
    ///
    /// # Panics
    /// Panics if the population is empty.
    pub fn save_champion<P: AsRef<Path>>(&self, path: P) -> Result<(), PopulationFileError> {
        let champion = self
            .population
            .champion()
            .expect("empty population has no champion");
        let json =
            serde_json::to_string_pretty(champion).map_err(PopulationFileError::Corrupt)?;
        fs::write(path, json).map_err(PopulationFileError::Io)
    }

    /// Removes species that have gone too long without improving
    /// their best fitness. The top species are exempt, so the
    /// population can never prune itself to extinction.
    fn prune_stale_species(&mut self) {
        let elite = self.config.reproduction.elite_species_count;
        let limit = self.config.species.prune_after_x_generations_without_progress;
        let mut index = 0;
        self.population.species.retain(|species| {
            let keep = index < elite || species.time_stagnated() <= limit;
            index += 1;
            keep
        });
    }

    /// Re-elects each species' representative uniformly from its
    /// current members.
    fn select_species_representatives(&mut self) {
        for species in &mut self.population.species {
            let index = crate::rng::random_index(&mut self.rng, species.genomes.len());
            species.representative = species.genomes[index].clone();
        }
    }

    /// Drops each species' worst performers ahead of reproduction.
    /// A species always keeps at least one member.
    fn eliminate_low_performing(&mut self) {
        let ratio = self.config.reproduction.pre_reproduction_remove_ratio;
        for species in &mut self.population.species {
            let count = species.genomes.len();
            if count <= 1 {
                continue;
            }
            let removed = ((count as f64 * ratio).floor() as usize).min(count - 1);
            species.genomes.truncate(count - removed);
        }
    }

    /// Breeds the next generation's offspring. Each species is
    /// allotted offspring in proportion to its adjusted-fitness sum;
    /// rounding leftovers are distributed by weighted draw.
    fn reproduce(&mut self) -> Vec<Genome> {
        let species_count = self.population.species.len();
        if species_count == 0 {
            return Vec::new();
        }
        let cfg = &self.config.reproduction;
        let elite_reserved = cfg.elite_species_count.min(species_count) * cfg.elite_genome_count;
        let target = cfg.target_population.saturating_sub(elite_reserved);
        let crossover_odds = cfg.crossover_odds;

        let weights: Vec<f64> = self
            .population
            .species
            .iter()
            .map(|s| s.adjusted_fitness_sum().score())
            .collect();
        let total: f64 = weights.iter().sum();
        let allotted = allot_offspring(&mut self.rng, &weights, target);

        let mut children = Vec::with_capacity(target);
        for (index, &count) in allotted.iter().enumerate() {
            for _ in 0..count {
                let parent = Self::pick_member(&mut self.rng, &self.population.species[index]);
                if self.rng.gen::<f64>() < crossover_odds {
                    let other_index = crate::rng::weighted_index(&mut self.rng, &weights, total);
                    let other =
                        Self::pick_member(&mut self.rng, &self.population.species[other_index]);
                    children.push(self.reproductor.crossover(parent, other, &mut self.rng));
                } else {
                    children.push(self.reproductor.mutate(parent, &mut self.rng));
                }
            }
        }
        children
    }

    /// Picks a parent from a species, weighted by adjusted fitness.
    fn pick_member<'s>(rng: &mut R, species: &'s Species) -> &'s Genome {
        let weights: Vec<f64> = species
            .genomes()
            .iter()
            .map(|g| g.adjusted_fitness().score())
            .collect();
        let total: f64 = weights.iter().sum();
        &species.genomes()[crate::rng::weighted_index(rng, &weights, total)]
    }

    /// Keeps only the elite genomes of the top species; every other
    /// existing genome is replaced by this generation's offspring.
    /// Species are best-first at this point.
    fn retain_elites(&mut self) {
        let elite_species = self.config.reproduction.elite_species_count;
        let elite_genomes = self.config.reproduction.elite_genome_count;
        for (index, species) in self.population.species.iter_mut().enumerate() {
            if index < elite_species {
                species.genomes.truncate(elite_genomes);
            } else {
                species.genomes.clear();
            }
        }
    }

    /// Sorts each offspring into the first species whose
    /// representative it is compatible with, founding a new species
    /// when none fits.
    fn assign_species(&mut self, children: Vec<Genome>) {
        let max_delta = self.config.species.species_max_delta;
        for child in children {
            let home = self.population.species.iter().position(|species| {
                child.delta(species.representative(), &self.config.species) <= max_delta
            });
            match home {
                Some(index) => self.population.species[index].genomes.push(child),
                None => self.population.species.push(Species::new(child)),
            }
        }
    }

    fn prune_empty_species(&mut self) {
        self.population.species.retain(|s| !s.genomes().is_empty());
    }

    /// Scores every genome's phenotype in parallel. A failed or
    /// stopped evaluation scores zero; failures are collected for
    /// [`take_evaluation_failures`].
    ///
    /// [`take_evaluation_failures`]:
    /// PopulationTrainer::take_evaluation_failures
    fn evaluate_population(&mut self) {
        let factory = self
            .evaluator_factory
            .as_ref()
            .expect("evaluator factory installed at initialization");
        let stop = &self.stop;
        let failures = Mutex::new(Vec::new());

        self.population.par_genomes_mut().for_each(|genome| {
            if stop.load(Ordering::Relaxed) {
                genome.set_fitness(Fitness::zero());
                return;
            }
            let mut evaluator = factory();
            let mut phenome = genome.to_phenome();
            match evaluator.evaluate(&mut phenome) {
                Ok(fitness) => genome.set_fitness(fitness),
                Err(source) => {
                    genome.set_fitness(Fitness::zero());
                    failures.lock().unwrap().push(EvaluationFailure {
                        genome: genome.id(),
                        source,
                    });
                }
            }
        });

        self.evaluation_failures
            .extend(failures.into_inner().unwrap());
    }

    /// Shares fitness within each species and updates the species'
    /// progress records: each member's adjusted fitness is its raw
    /// fitness divided by the species' member count, and a species
    /// that beats its best-ever fitness resets its stagnation clock.
    fn adjust_fitnesses(&mut self) {
        for species in &mut self.population.species {
            species.gens_since_last_progress += 1;
            let count = species.genomes.len() as f64;
            let mut sum = Fitness::zero();
            let mut generation_best: Option<Fitness> = None;
            for genome in &mut species.genomes {
                let adjusted = genome.fitness().clone() / count;
                sum = sum + adjusted.clone();
                genome.set_adjusted_fitness(adjusted);

                let fitness = genome.fitness().clone();
                generation_best = Some(match generation_best {
                    Some(best) => Fitness::max(best, fitness),
                    None => fitness,
                });
            }
            species.adjusted_fitness_sum = sum;

            if let Some(best) = generation_best {
                let improved = match &species.best_fitness {
                    Some(record) => best > *record,
                    None => true,
                };
                if improved {
                    species.best_fitness = Some(best);
                    species.gens_since_last_progress = 0;
                }
            }
        }
    }
}

/// Splits `target` offspring across species proportionally to
/// `weights`, handing out rounding leftovers by weighted draw.
fn allot_offspring<R: Rng>(rng: &mut R, weights: &[f64], target: usize) -> Vec<usize> {
    let total: f64 = weights.iter().sum();
    let mut allotted: Vec<usize> = if total > 0.0 {
        weights
            .iter()
            .map(|w| (target as f64 * w / total).floor() as usize)
            .collect()
    } else {
        vec![0; weights.len()]
    };
    let assigned: usize = allotted.iter().sum();
    for _ in assigned..target {
        allotted[crate::rng::weighted_index(rng, weights, total)] += 1;
    }
    allotted
}
