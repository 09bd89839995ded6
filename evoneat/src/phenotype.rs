//! Executable feed-forward networks decoded from genomes.
//!
//! The trainer itself never interprets a [`Phenome`] beyond handing it
//! to an [`Evaluator`]; the evaluator drives it through [`set_inputs`],
//! [`activate`] and [`outputs`].
//!
//! [`Evaluator`]: crate::training::Evaluator
//! [`set_inputs`]: Phenome::set_inputs
//! [`activate`]: Phenome::activate
//! [`outputs`]: Phenome::outputs

use crate::genomics::Genome;

use serde::{Deserialize, Serialize};

/// Activation function applied to a node's accumulated input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Linear,
    ReLU,
    LeakyReLU,
    Tanh,
}

impl Activation {
    /// Applies the activation function to `x`.
    ///
    /// # Examples
    /// ```
    /// use evoneat::Activation;
    ///
    /// assert_eq!(Activation::Linear.apply(-3.0), -3.0);
    /// assert_eq!(Activation::ReLU.apply(-3.0), 0.0);
    /// assert!((Activation::LeakyReLU.apply(-3.0) + 0.3).abs() < 1e-12);
    /// ```
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::ReLU => x.max(0.0),
            Activation::LeakyReLU => x.max(0.1 * x),
            Activation::Tanh => x.tanh(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Connection {
    depth: usize,
    input: usize,
    output: usize,
    weight: f64,
}

/// The executable neural network decoded from a [`Genome`].
///
/// Nodes are layered by depth: inputs at depth 0, outputs at the
/// maximum depth, hidden nodes in between. One [`activate`] call
/// propagates the current inputs through every layer once.
///
/// [`activate`]: Phenome::activate
#[derive(Clone, Debug)]
pub struct Phenome {
    connections: Vec<Connection>,
    node_values: Vec<f64>,
    node_depths: Vec<usize>,
    maximum_depth: usize,
    input_count: usize,
    output_count: usize,
    input_activation: Activation,
    hidden_activation: Activation,
    output_activation: Activation,
}

impl Phenome {
    pub(crate) fn new(genome: &Genome) -> Phenome {
        let (node_depths, maximum_depth) = genome.node_depths();
        let mut connections: Vec<Connection> = genome
            .genes()
            .iter()
            .filter(|g| g.enabled())
            .map(|g| Connection {
                depth: node_depths[g.input()],
                input: g.input(),
                output: g.output(),
                weight: g.weight(),
            })
            .collect();
        connections.sort_by_key(|c| (c.depth, c.input));

        Phenome {
            connections,
            node_values: vec![0.0; node_depths.len()],
            node_depths,
            maximum_depth,
            input_count: genome.input_count(),
            output_count: genome.output_count(),
            input_activation: genome.input_activation(),
            hidden_activation: genome.hidden_activation(),
            output_activation: genome.output_activation(),
        }
    }

    /// Returns the number of input nodes.
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Returns the number of output nodes.
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    /// Sets the network's input values.
    ///
    /// # Panics
    /// Panics if `inputs` does not have exactly [`input_count`] elements.
    ///
    /// [`input_count`]: Phenome::input_count
    pub fn set_inputs(&mut self, inputs: &[f64]) {
        assert_eq!(
            inputs.len(),
            self.input_count,
            "phenome input count mismatch"
        );
        self.node_values[..self.input_count].copy_from_slice(inputs);
    }

    /// Returns the network's output values, as computed
    /// by the last [`activate`] call.
    ///
    /// [`activate`]: Phenome::activate
    pub fn outputs(&self) -> &[f64] {
        &self.node_values[self.input_count..self.input_count + self.output_count]
    }

    /// Propagates the current inputs through the network,
    /// layer by layer. Non-input accumulators are cleared at
    /// the start of each activation.
    pub fn activate(&mut self) {
        for value in &mut self.node_values[self.input_count..] {
            *value = 0.0;
        }
        let mut next_connection = 0;
        for depth in 0..=self.maximum_depth {
            let activation = self.activation_for(depth);
            for node in 0..self.node_values.len() {
                if self.node_depths[node] == depth {
                    self.node_values[node] = activation.apply(self.node_values[node]);
                }
            }
            while next_connection < self.connections.len()
                && self.connections[next_connection].depth == depth
            {
                let c = self.connections[next_connection];
                self.node_values[c.output] += self.node_values[c.input] * c.weight;
                next_connection += 1;
            }
        }
    }

    fn activation_for(&self, depth: usize) -> Activation {
        if depth == 0 {
            self.input_activation
        } else if depth == self.maximum_depth {
            self.output_activation
        } else {
            self.hidden_activation
        }
    }
}
