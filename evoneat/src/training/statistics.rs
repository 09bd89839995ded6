use crate::populations::Population;

use std::fmt;

/// A snapshot of population health after a generation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statistics {
    /// Number of completed generations.
    pub generation_count: usize,
    /// Primary fitness score of the population champion.
    pub best_genome_fitness: f64,
    /// Mean primary fitness score of the best species' members.
    pub best_species_average_fitness: f64,
    /// Mean primary fitness score across the whole population.
    pub average_fitness: f64,
    /// Connection-gene count of the population champion.
    pub best_genome_complexity: usize,
    /// Mean connection-gene count across the whole population.
    pub average_genome_complexity: f64,
    /// Largest connection-gene count in the population.
    pub maximum_genome_complexity: usize,
    /// Number of species.
    pub total_species: usize,
    /// Member count of the largest species.
    pub best_species_population: usize,
    /// Mean member count across species.
    pub average_species_population: f64,
}

impl Statistics {
    pub(crate) fn from_population(population: &Population, generation_count: usize) -> Statistics {
        let genome_count = population.genome_count();
        let species_count = population.species_count();
        if genome_count == 0 {
            return Statistics {
                generation_count,
                ..Statistics::default()
            };
        }

        let champion = population
            .champion()
            .expect("a non-empty population has a champion");
        let fitness_total: f64 = population.genomes().map(|g| g.fitness().score()).sum();
        let complexity_total: usize = population.genomes().map(|g| g.complexity()).sum();
        let best_species = population
            .species()
            .max_by(|a, b| a.cmp_best_fitness(b))
            .expect("a non-empty population has at least one species");

        Statistics {
            generation_count,
            best_genome_fitness: champion.fitness().score(),
            best_species_average_fitness: best_species.average_fitness(),
            average_fitness: fitness_total / genome_count as f64,
            best_genome_complexity: champion.complexity(),
            average_genome_complexity: complexity_total as f64 / genome_count as f64,
            maximum_genome_complexity: population
                .genomes()
                .map(|g| g.complexity())
                .max()
                .unwrap_or(0),
            total_species: species_count,
            best_species_population: population
                .species()
                .map(|s| s.member_count())
                .max()
                .unwrap_or(0),
            average_species_population: genome_count as f64 / species_count as f64,
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "generation {}:", self.generation_count)?;
        writeln!(
            f,
            "  fitness    best {:.3}, best-species avg {:.3}, population avg {:.3}",
            self.best_genome_fitness, self.best_species_average_fitness, self.average_fitness,
        )?;
        writeln!(
            f,
            "  complexity best {}, avg {:.1}, max {}",
            self.best_genome_complexity,
            self.average_genome_complexity,
            self.maximum_genome_complexity,
        )?;
        write!(
            f,
            "  species    {} total, largest {}, avg size {:.1}",
            self.total_species, self.best_species_population, self.average_species_population,
        )
    }
}
