//! Evolves a XOR gate, exercising the full training loop and the
//! scoped-resource evaluator contract: evaluators draw from a
//! bounded pool of slots, standing in for the scarce harness
//! instances (emulators, simulators) a real experiment would wrap.

use evoneat::{
    EvaluationError, Evaluator, ExperimentSettings, Fitness, NEATConfiguration, Phenome,
    PopulationTrainer,
};

use rand::rngs::StdRng;
use rand::SeedableRng;

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

const ERROR_MARGIN: f64 = 0.3;
const SOLVED: f64 = 16.0;
const MAX_GENERATIONS: usize = 500;

/// Hands out a bounded number of evaluation slots. Acquisition
/// blocks until a slot is free, which throttles parallel evaluation
/// to the pool size.
struct SlotPool {
    free: Mutex<Receiver<usize>>,
    release: Mutex<Sender<usize>>,
}

impl SlotPool {
    fn new(slots: usize) -> Arc<SlotPool> {
        let (release, free) = mpsc::channel();
        for slot in 0..slots {
            release.send(slot).unwrap();
        }
        Arc::new(SlotPool {
            free: Mutex::new(free),
            release: Mutex::new(release),
        })
    }

    fn acquire(self: &Arc<SlotPool>) -> SlotHandle {
        let slot = self.free.lock().unwrap().recv().unwrap();
        SlotHandle {
            slot,
            pool: Arc::clone(self),
        }
    }
}

/// An exclusive claim on one evaluation slot, returned to the pool
/// on drop.
struct SlotHandle {
    slot: usize,
    pool: Arc<SlotPool>,
}

impl Drop for SlotHandle {
    fn drop(&mut self) {
        self.pool.release.lock().unwrap().send(self.slot).ok();
    }
}

struct XorEvaluator {
    _slot: SlotHandle,
}

impl Evaluator for XorEvaluator {
    fn evaluate(&mut self, phenome: &mut Phenome) -> Result<Fitness, EvaluationError> {
        // First input is a constant bias.
        let cases = [
            ([1.0, 0.0, 0.0], 0.0),
            ([1.0, 0.0, 1.0], 1.0),
            ([1.0, 1.0, 0.0], 1.0),
            ([1.0, 1.0, 1.0], 0.0),
        ];

        let mut error_sum = 0.0;
        for (inputs, expected) in &cases {
            phenome.set_inputs(inputs);
            phenome.activate();
            // Outputs are tanh-bounded, so each case contributes
            // at most 1.0 of error.
            let error = (phenome.outputs()[0] - expected).abs().min(1.0);
            if error >= ERROR_MARGIN {
                error_sum += error;
            }
        }

        Ok(Fitness::new((4.0 - error_sum).powi(2))?)
    }
}

fn main() {
    let mut config = NEATConfiguration::default();
    config.reproduction.target_population = 150;
    config.species.species_max_delta = 3.0;

    let experiment = ExperimentSettings {
        neural_input_count: 3,
        neural_output_count: 1,
    };

    let pool = SlotPool::new(4);
    let mut trainer = PopulationTrainer::new(config, experiment, StdRng::from_entropy());
    trainer.initialize(move || XorEvaluator {
        _slot: pool.acquire(),
    });

    for _ in 0..MAX_GENERATIONS {
        trainer.run_one_generation();
        let stats = trainer.get_statistics();
        println!("{}", stats);
        for failure in trainer.take_evaluation_failures() {
            eprintln!("{}", failure);
        }
        if stats.best_genome_fitness >= SOLVED {
            println!("solved after {} generations", stats.generation_count);
            break;
        }
    }

    let path = std::env::temp_dir().join("xor-champion.json");
    match trainer.save_champion(&path) {
        Ok(()) => println!("champion saved to {}", path.display()),
        Err(e) => eprintln!("could not save champion: {}", e),
    }
}
