//! Genome representation and reproduction.
//!
//! A [`Genome`] encodes a candidate network as an ordered set of node
//! genes and innovation-numbered connection genes. Genomes are only
//! ever created by a [`GenomeReproductor`], which owns the global
//! innovation counter and the per-generation novelty cache that keeps
//! equivalent structural mutations aligned across genomes.

mod genes;
mod genome;
mod reproductor;

pub use genes::{ConnectionGene, NodeGene, NodeRole};
pub use genome::Genome;
pub use reproductor::GenomeReproductor;
