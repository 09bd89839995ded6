use evoneat::{
    EvaluationError, Evaluator, ExperimentSettings, Fitness, NEATConfiguration, Phenome,
    PopulationFileError, PopulationTrainer,
};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use std::path::PathBuf;

/// Deterministic evaluator: scores the network's response to a
/// fixed input pattern, so a genome's fitness depends only on its
/// structure and weights.
struct SignalStrength;

impl Evaluator for SignalStrength {
    fn evaluate(&mut self, phenome: &mut Phenome) -> Result<Fitness, EvaluationError> {
        let inputs: Vec<f64> = (0..phenome.input_count())
            .map(|i| 1.0 - 0.5 * i as f64)
            .collect();
        phenome.set_inputs(&inputs);
        phenome.activate();
        let score: f64 = phenome.outputs().iter().map(|o| (o + 1.0).abs()).sum();
        Ok(Fitness::new(score)?)
    }
}

struct AlwaysFails;

impl Evaluator for AlwaysFails {
    fn evaluate(&mut self, _phenome: &mut Phenome) -> Result<Fitness, EvaluationError> {
        Err("harness unavailable".into())
    }
}

fn experiment() -> ExperimentSettings {
    ExperimentSettings {
        neural_input_count: 3,
        neural_output_count: 2,
    }
}

fn small_config() -> NEATConfiguration {
    let mut config = NEATConfiguration::default();
    config.reproduction.target_population = 30;
    config
}

fn trainer(config: NEATConfiguration, seed: u64) -> PopulationTrainer<ChaCha8Rng> {
    PopulationTrainer::new(config, experiment(), ChaCha8Rng::seed_from_u64(seed))
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("evoneat-test-{}-{}", std::process::id(), name))
}

#[test]
fn population_size_and_partition_hold_across_generations() {
    let config = small_config();
    let target = config.reproduction.target_population;
    let elite_reserved =
        config.reproduction.elite_species_count * config.reproduction.elite_genome_count;

    let mut trainer = trainer(config, 1);
    trainer.initialize(|| SignalStrength);
    assert_eq!(trainer.population().genome_count(), target);

    for _ in 0..8 {
        trainer.run_one_generation();
        let population = trainer.population();
        assert!(population.genome_count() <= target);
        assert!(population.genome_count() >= target - elite_reserved);
        assert!(population.species().all(|s| !s.genomes().is_empty()));

        // Every genome id is unique across the whole population.
        let mut ids: Vec<_> = population.genomes().map(|g| g.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), population.genome_count());
    }
    assert_eq!(trainer.generation(), 8);
    assert!(trainer.take_evaluation_failures().is_empty());
}

#[test]
fn elite_genomes_survive_a_generation_unmodified() {
    let mut config = small_config();
    config.reproduction.elite_species_count = 2;
    config.reproduction.elite_genome_count = 1;

    let mut trainer = trainer(config, 2);
    trainer.initialize(|| SignalStrength);
    trainer.run_one_generation();

    for _ in 0..5 {
        let best_species_champion = trainer
            .population()
            .species()
            .next()
            .and_then(|s| s.champion())
            .cloned()
            .expect("population is never empty");

        trainer.run_one_generation();

        let survivor = trainer
            .population()
            .genomes()
            .find(|g| g.id() == best_species_champion.id())
            .expect("elite genome carried over");
        assert_eq!(survivor.genes(), best_species_champion.genes());
        assert_eq!(survivor.fitness(), best_species_champion.fitness());
    }
}

#[test]
fn stagnated_species_are_pruned_within_the_configured_window() {
    let mut config = small_config();
    config.reproduction.elite_species_count = 0;
    config.species.prune_after_x_generations_without_progress = 3;

    let mut trainer = trainer(config, 3);
    trainer.initialize(|| SignalStrength);
    for _ in 0..12 {
        trainer.run_one_generation();
        // A surviving species was within the window when pruning ran,
        // and may have accrued one more stagnant generation since.
        assert!(trainer
            .population()
            .species()
            .all(|s| s.time_stagnated() <= 4));
    }
}

#[test]
fn champion_is_the_global_fitness_maximum() {
    let mut trainer = trainer(small_config(), 4);
    trainer.initialize(|| SignalStrength);
    for _ in 0..4 {
        trainer.run_one_generation();
    }

    let population = trainer.population();
    let champion = population.champion().expect("population is never empty");
    assert!(population
        .genomes()
        .all(|g| g.fitness() <= champion.fitness()));

    let ranked = population.genomes_by_descending_fitness();
    assert_eq!(ranked[0].fitness(), champion.fitness());
    for pair in ranked.windows(2) {
        assert!(pair[0].fitness() >= pair[1].fitness());
    }
}

#[test]
fn population_survives_a_save_and_load_round_trip() {
    let path = temp_path("round-trip.json");
    let mut saved = trainer(small_config(), 5);
    saved.initialize(|| SignalStrength);
    saved.run_one_generation();
    saved.run_one_generation();
    saved.save_population(&path).unwrap();

    let mut loaded = trainer(small_config(), 5);
    loaded.load_population(&path).unwrap();
    loaded.initialize(|| SignalStrength);

    assert_eq!(
        loaded.population().genome_count(),
        saved.population().genome_count(),
    );
    assert_eq!(
        loaded.population().species_count(),
        saved.population().species_count(),
    );
    let saved_champion = saved.population().champion().unwrap();
    let loaded_champion = loaded.population().champion().unwrap();
    assert_eq!(loaded_champion.id(), saved_champion.id());
    assert_eq!(loaded_champion.fitness(), saved_champion.fitness());

    // A loaded population keeps evolving without id collisions.
    loaded.run_one_generation();
    let mut ids: Vec<_> = loaded.population().genomes().map(|g| g.id()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), loaded.population().genome_count());

    std::fs::remove_file(&path).ok();
}

#[test]
fn loading_an_incompatible_population_leaves_the_current_one_untouched() {
    let path = temp_path("incompatible.json");
    let mut saved = trainer(small_config(), 6);
    saved.initialize(|| SignalStrength);
    saved.save_population(&path).unwrap();

    let other_experiment = ExperimentSettings {
        neural_input_count: 5,
        neural_output_count: 1,
    };
    let mut other = PopulationTrainer::new(
        small_config(),
        other_experiment,
        ChaCha8Rng::seed_from_u64(6),
    );
    other.initialize(|| SignalStrength);
    let genome_count = other.population().genome_count();

    assert!(matches!(
        other.load_population(&path),
        Err(PopulationFileError::IncompatibleExperiment),
    ));
    assert_eq!(other.population().genome_count(), genome_count);
    assert_eq!(other.population().experiment(), other_experiment);

    std::fs::remove_file(&path).ok();
}

#[test]
fn champion_file_round_trips_through_genome_loading() {
    let path = temp_path("champion.json");
    let mut trainer = trainer(small_config(), 7);
    trainer.initialize(|| SignalStrength);
    trainer.run_one_generation();
    trainer.save_champion(&path).unwrap();

    let champion = trainer.population().champion().unwrap();
    let loaded = evoneat::Genome::from_path(&path).unwrap();
    assert_eq!(&loaded, champion);

    std::fs::remove_file(&path).ok();
}

#[test]
fn evaluation_failures_zero_fitness_and_are_reported() {
    let mut trainer = trainer(small_config(), 8);
    trainer.initialize(|| AlwaysFails);

    let failures = trainer.take_evaluation_failures();
    assert_eq!(failures.len(), trainer.population().genome_count());
    assert!(trainer
        .population()
        .genomes()
        .all(|g| g.fitness() == &Fitness::zero()));
    // Drained once, the failures are gone.
    assert!(trainer.take_evaluation_failures().is_empty());
}

#[test]
fn stop_signal_halts_the_generation_loop() {
    let mut trainer = trainer(small_config(), 9);
    trainer.initialize(|| SignalStrength);
    trainer.run_one_generation();

    trainer.stop_signal().store(true, std::sync::atomic::Ordering::Relaxed);
    let before: Vec<_> = trainer.population().genomes().map(|g| g.id()).collect();
    trainer.run_one_generation();
    let after: Vec<_> = trainer.population().genomes().map(|g| g.id()).collect();
    assert_eq!(before, after);
    assert_eq!(trainer.generation(), 1);
}

#[test]
fn runs_are_reproducible_regardless_of_thread_count() {
    fn run(threads: usize) -> Vec<(u64, f64)> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap();
        pool.install(|| {
            let mut trainer = trainer(small_config(), 10);
            trainer.initialize(|| SignalStrength);
            for _ in 0..5 {
                trainer.run_one_generation();
            }
            trainer
                .population()
                .genomes()
                .map(|g| (g.id(), g.fitness().score()))
                .collect()
        })
    }

    let mut single = run(1);
    let mut parallel = run(4);
    single.sort_by(|a, b| a.partial_cmp(b).unwrap());
    parallel.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(single, parallel);
}

#[test]
#[should_panic(expected = "run_one_generation called before initialize")]
fn running_before_initialization_is_a_programming_error() {
    let mut trainer = trainer(small_config(), 11);
    trainer.run_one_generation();
}
