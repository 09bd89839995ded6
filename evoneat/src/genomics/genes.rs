use crate::Innovation;

use serde::{Deserialize, Serialize};

use std::fmt;

/// The role a node gene plays in the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    Input,
    Output,
    Hidden,
}

/// A node gene. Node ids are indices into the genome's node list:
/// inputs first, then outputs, then hidden nodes in creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGene {
    id: usize,
    role: NodeRole,
}

impl NodeGene {
    pub(crate) fn new(id: usize, role: NodeRole) -> NodeGene {
        NodeGene { id, role }
    }

    /// Returns the node's id.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the node's role.
    pub fn role(&self) -> NodeRole {
        self.role
    }
}

/// A connection gene between two nodes, which becomes a network
/// connection in the genome's phenotype.
///
/// The innovation number identifies the structural mutation that
/// created the connection; genomes carrying the same innovation
/// number connect the same pair of nodes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGene {
    pub(crate) innovation: Innovation,
    pub(crate) input: usize,
    pub(crate) output: usize,
    pub(crate) weight: f64,
    pub(crate) enabled: bool,
}

impl ConnectionGene {
    /// Returns a new enabled gene with the specified parameters.
    pub(crate) fn new(
        innovation: Innovation,
        input: usize,
        output: usize,
        weight: f64,
    ) -> ConnectionGene {
        ConnectionGene {
            innovation,
            input,
            output,
            weight,
            enabled: true,
        }
    }

    /// Returns the gene's innovation number.
    pub fn innovation(&self) -> Innovation {
        self.innovation
    }

    /// Returns the gene's source node id.
    pub fn input(&self) -> usize {
        self.input
    }

    /// Returns the gene's target node id.
    pub fn output(&self) -> usize {
        self.output
    }

    /// Returns the gene's connection weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns whether the gene is expressed in the phenotype.
    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

impl fmt::Display for ConnectionGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}[{}->{}, {:.3}]{}",
            if self.enabled { "" } else { "(" },
            self.innovation,
            self.input,
            self.output,
            self.weight,
            if self.enabled { "" } else { ")" },
        )
    }
}
