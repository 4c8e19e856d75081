//! Success-rate driven genetic algorithm over placement genomes.
//!
//! A [`Population`] holds a fixed number of genomes together with per-genome bookkeeping. The
//! genomes are evaluated one after another: each plays games until one ends, and the score of
//! that game is recorded with [`Population::record_score`]. Once every genome has a score,
//! [`Population::new_generation`] runs one evolution step.
//!
//! # Evolution Step
//!
//! 1. **Normalize** - Each score is divided by the generation's best score
//! 2. **Success rate** - Every genome folds its normalized score into a running mean
//! 3. **Population statistics** - The success rates of this generation's best and worst genomes
//!    are folded into running means as well ([`SuccessRateStats`])
//! 4. **Selection** - Genomes well below the running worst rate (or the worst genome itself)
//!    are reborn with probability `rebirth_probability`, once they have survived more than
//!    `min_survived_generations` generations. Genomes above the margin (and the best genome)
//!    become parents
//! 5. **Reproduction** - Each reborn genome is replaced by a child of two random parents
//!    ([`new_child`](crate::gene::new_child)) and its bookkeeping is reset
//!
//! Nothing happens in step 5 unless there is at least one reborn genome and at least two
//! parents.

use bdsolve_evaluator::genome::Genome;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{ParamError, gene};

/// Parameters of the evolution step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvolutionParams {
    /// Number of genomes in the population.
    pub population_size: usize,
    /// Probability that a child receives one freshly drawn gene.
    pub mutation_rate: f64,
    /// Probability that an eligible genome is actually reborn.
    pub rebirth_probability: f64,
    /// Multiplier applied to the running worst success rate to separate weak genomes from
    /// parents.
    pub worst_rate_margin: f32,
    /// Genomes must have survived more than this many generations to be reborn.
    pub min_survived_generations: u32,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            population_size: 100,
            mutation_rate: 0.4,
            rebirth_probability: 0.7,
            worst_rate_margin: 1.2,
            min_survived_generations: 3,
        }
    }
}

impl EvolutionParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.population_size == 0 {
            return Err(ParamError::EmptyPopulation);
        }
        for (name, value) in [
            ("mutation_rate", self.mutation_rate),
            ("rebirth_probability", self.rebirth_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ParamError::InvalidProbability { name, value });
            }
        }
        if !self.worst_rate_margin.is_finite() {
            return Err(ParamError::InvalidMargin {
                value: self.worst_rate_margin,
            });
        }
        Ok(())
    }
}

/// Running means of the success rates of each generation's best and worst genomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SuccessRateStats {
    pub best: f32,
    pub worst: f32,
    /// Number of generations folded in so far.
    pub count: u32,
}

impl SuccessRateStats {
    fn record(&mut self, best: f32, worst: f32) {
        self.best = running_mean(self.best, self.count, best);
        self.worst = running_mean(self.worst, self.count, worst);
        self.count += 1;
    }
}

/// A genome and its bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct Individual {
    genome: Genome,
    score: usize,
    success_rate: f32,
    survived: u32,
}

impl Individual {
    fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            genome: gene::random_genome(rng),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Score of the last game played with this genome.
    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    /// Running mean of this genome's normalized scores.
    #[must_use]
    pub fn success_rate(&self) -> f32 {
        self.success_rate
    }

    /// Number of generations this genome has survived.
    #[must_use]
    pub fn survived(&self) -> u32 {
        self.survived
    }
}

/// Outcome of [`Population::new_generation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Index of the generation that was just evaluated (starting from 0).
    pub generation: usize,
    /// Sum of the recorded scores of the evaluated generation.
    pub score_sum: usize,
    /// Index of the first genome with the highest score.
    pub best: usize,
    /// Index of the first genome with the lowest score.
    pub worst: usize,
    /// Genomes replaced by children.
    pub reborn: Vec<usize>,
    /// Genomes eligible as parents.
    pub parents: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct Population {
    params: EvolutionParams,
    individuals: Vec<Individual>,
    rate_stats: SuccessRateStats,
    generation: usize,
    current: usize,
}

impl Population {
    /// Creates a population of random genomes.
    pub fn new<R>(params: EvolutionParams, rng: &mut R) -> Result<Self, ParamError>
    where
        R: Rng + ?Sized,
    {
        params.validate()?;
        let mut population = Self {
            params,
            individuals: vec![],
            rate_stats: SuccessRateStats::default(),
            generation: 0,
            current: 0,
        };
        population.new_population(rng);
        Ok(population)
    }

    /// Replaces every genome with a random one and clears all bookkeeping.
    ///
    /// The generation counter is kept.
    pub fn new_population<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.individuals = (0..self.params.population_size)
            .map(|_| Individual::random(rng))
            .collect();
        self.rate_stats = SuccessRateStats::default();
        self.current = 0;
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    #[must_use]
    pub fn rate_stats(&self) -> &SuccessRateStats {
        &self.rate_stats
    }

    /// Number of completed generations.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Index of the genome under evaluation.
    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Genome under evaluation.
    ///
    /// Once the generation is complete, this is the last genome of the population.
    #[must_use]
    pub fn current_genome(&self) -> &Genome {
        let index = self.current.min(self.individuals.len() - 1);
        &self.individuals[index].genome
    }

    /// Whether every genome of the generation has a recorded score.
    #[must_use]
    pub fn is_generation_complete(&self) -> bool {
        self.current >= self.individuals.len()
    }

    /// Records the score of the genome under evaluation and moves on to the next one.
    pub fn record_score(&mut self, score: usize) {
        assert!(
            !self.is_generation_complete(),
            "all genomes of generation {} are already evaluated",
            self.generation
        );
        self.individuals[self.current].score = score;
        self.current += 1;
    }

    /// Index of the first genome with the highest success rate.
    #[must_use]
    pub fn best_rate_index(&self) -> usize {
        first_max_by(&self.individuals, |a, b| a.success_rate > b.success_rate)
    }

    /// Index of the first genome with the highest recorded score.
    #[must_use]
    pub fn best_score_index(&self) -> usize {
        first_max_by(&self.individuals, |a, b| a.score > b.score)
    }

    /// Runs one evolution step on the recorded scores.
    ///
    /// Scores stay readable until they are overwritten by the next generation.
    pub fn new_generation<R>(&mut self, rng: &mut R) -> GenerationReport
    where
        R: Rng + ?Sized,
    {
        let best = self.best_score_index();
        let worst = first_max_by(&self.individuals, |a, b| a.score < b.score);
        let best_score = self.individuals[best].score;

        for ind in &mut self.individuals {
            #[expect(clippy::cast_precision_loss)]
            let normalized = if best_score == 0 {
                0.0
            } else {
                ind.score as f32 / best_score as f32
            };
            ind.success_rate = running_mean(ind.success_rate, ind.survived, normalized);
            ind.survived += 1;
        }
        self.rate_stats.record(
            self.individuals[best].success_rate,
            self.individuals[worst].success_rate,
        );
        log::debug!(
            "generation {}: best genome {best}, worst genome {worst}, rates {:?}",
            self.generation,
            self.rate_stats
        );

        let threshold = self.rate_stats.worst * self.params.worst_rate_margin;
        let mut reborn = vec![];
        let mut parents = vec![];
        for (i, ind) in self.individuals.iter().enumerate() {
            if rng.random_bool(self.params.rebirth_probability)
                && (ind.success_rate < threshold || i == worst)
                && ind.survived > self.params.min_survived_generations
            {
                reborn.push(i);
            }
            if ind.success_rate > threshold || i == best {
                parents.push(i);
            }
        }
        log::debug!("reborn: {reborn:?}, parents: {parents:?}");

        let score_sum = self.individuals.iter().map(|ind| ind.score).sum();
        if !reborn.is_empty() && parents.len() >= 2 {
            let parent_genomes: Vec<Genome> =
                parents.iter().map(|&i| self.individuals[i].genome).collect();
            for &i in &reborn {
                let p1 = &parent_genomes[rng.random_range(0..parent_genomes.len())];
                let p2 = &parent_genomes[rng.random_range(0..parent_genomes.len())];
                let ind = &mut self.individuals[i];
                ind.genome = gene::new_child(p1, p2, self.params.mutation_rate, rng);
                ind.success_rate = 0.0;
                ind.survived = 0;
            }
        } else {
            reborn.clear();
        }

        let report = GenerationReport {
            generation: self.generation,
            score_sum,
            best,
            worst,
            reborn,
            parents,
        };
        self.generation += 1;
        self.current = 0;
        report
    }
}

#[expect(clippy::cast_precision_loss)]
fn running_mean(mean: f32, count: u32, value: f32) -> f32 {
    (mean * count as f32 + value) / (count as f32 + 1.0)
}

/// Index of the first element that no other element is `better` than.
fn first_max_by<T, F>(items: &[T], mut better: F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    let mut best = 0;
    for (i, item) in items.iter().enumerate().skip(1) {
        if better(item, &items[best]) {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use bdsolve_evaluator::genome::GENOME_LEN;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn params(population_size: usize, rebirth_probability: f64) -> EvolutionParams {
        EvolutionParams {
            population_size,
            rebirth_probability,
            ..EvolutionParams::default()
        }
    }

    fn evaluate<R>(population: &mut Population, scores: &[usize], rng: &mut R) -> GenerationReport
    where
        R: Rng + ?Sized,
    {
        for &score in scores {
            population.record_score(score);
        }
        assert!(population.is_generation_complete());
        population.new_generation(rng)
    }

    #[test]
    fn test_new_population_is_fresh() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut population = Population::new(params(5, 1.0), &mut rng).unwrap();
        evaluate(&mut population, &[1, 2, 3, 4, 5], &mut rng);

        population.new_population(&mut rng);
        assert_eq!(population.len(), 5);
        assert_eq!(population.current(), 0);
        assert_eq!(*population.rate_stats(), SuccessRateStats::default());
        for ind in population.individuals() {
            assert_eq!(ind.score(), 0);
            assert_eq!(ind.survived(), 0);
            assert!(ind.success_rate().abs() < f32::EPSILON);
            assert!(
                ind.genome()
                    .weights()
                    .iter()
                    .all(|w| (gene::GENE_MIN..gene::GENE_MAX).contains(w))
            );
        }
    }

    #[test]
    fn test_success_rate_running_mean() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut population = Population::new(params(2, 0.0), &mut rng).unwrap();

        let report = evaluate(&mut population, &[50, 100], &mut rng);
        assert_eq!((report.best, report.worst, report.score_sum), (1, 0, 150));
        let rates: Vec<f32> = population
            .individuals()
            .iter()
            .map(Individual::success_rate)
            .collect();
        assert!((rates[0] - 0.5).abs() < 1e-6);
        assert!((rates[1] - 1.0).abs() < 1e-6);

        let report = evaluate(&mut population, &[100, 50], &mut rng);
        assert_eq!((report.best, report.worst), (0, 1));
        for ind in population.individuals() {
            assert!((ind.success_rate() - 0.75).abs() < 1e-6);
            assert_eq!(ind.survived(), 2);
        }
        let stats = population.rate_stats();
        assert!((stats.best - 0.875).abs() < 1e-6);
        assert!((stats.worst - 0.625).abs() < 1e-6);
        assert_eq!(stats.count, 2);
        assert_eq!(population.generation(), 2);
    }

    #[test]
    fn test_all_zero_scores() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut population = Population::new(params(3, 0.0), &mut rng).unwrap();
        let report = evaluate(&mut population, &[0, 0, 0], &mut rng);
        assert_eq!((report.best, report.worst, report.score_sum), (0, 0, 0));
        for ind in population.individuals() {
            assert!(ind.success_rate().abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_young_genomes_are_never_reborn() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut population = Population::new(params(4, 1.0), &mut rng).unwrap();
        let scores = [100, 90, 10, 10];

        for _ in 0..3 {
            let report = evaluate(&mut population, &scores, &mut rng);
            assert!(report.reborn.is_empty());
            assert_eq!(report.parents, vec![0, 1]);
        }

        let before: Vec<Genome> = population
            .individuals()
            .iter()
            .map(|ind| *ind.genome())
            .collect();
        let report = evaluate(&mut population, &scores, &mut rng);
        assert_eq!(report.reborn, vec![2, 3]);
        assert_eq!(report.parents, vec![0, 1]);
        assert_eq!(report.score_sum, 210);

        let individuals = population.individuals();
        assert_eq!(individuals.len(), 4);
        assert_eq!(individuals[0].survived(), 4);
        assert_eq!(*individuals[0].genome(), before[0]);
        assert_eq!(*individuals[1].genome(), before[1]);
        for ind in &individuals[2..] {
            assert_eq!(ind.score(), 10);
            assert_eq!(ind.survived(), 0);
            assert!(ind.success_rate().abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_no_reproduction_with_single_parent() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut population = Population::new(params(3, 1.0), &mut rng).unwrap();
        let before: Vec<Genome> = population
            .individuals()
            .iter()
            .map(|ind| *ind.genome())
            .collect();
        for _ in 0..6 {
            let report = evaluate(&mut population, &[100, 10, 10], &mut rng);
            assert_eq!(report.parents, vec![0]);
            assert!(report.reborn.is_empty());
        }
        for (ind, genome) in population.individuals().iter().zip(&before) {
            assert_eq!(ind.genome(), genome);
            assert_eq!(ind.survived(), 6);
        }
    }

    #[test]
    fn test_children_inherit_parent_genes() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut population = Population::new(
            EvolutionParams {
                mutation_rate: 0.0,
                ..params(4, 1.0)
            },
            &mut rng,
        )
        .unwrap();
        for _ in 0..3 {
            evaluate(&mut population, &[100, 90, 10, 10], &mut rng);
        }
        let parents: Vec<Genome> = population.individuals()[..2]
            .iter()
            .map(|ind| *ind.genome())
            .collect();
        evaluate(&mut population, &[100, 90, 10, 10], &mut rng);

        for ind in &population.individuals()[2..] {
            for i in 0..GENOME_LEN {
                let w = ind.genome().weights()[i];
                assert!(parents.iter().any(|p| p.weights()[i] == w));
            }
        }
    }

    #[test]
    fn test_best_indices() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut population = Population::new(params(3, 0.0), &mut rng).unwrap();
        evaluate(&mut population, &[5, 9, 9], &mut rng);
        assert_eq!(population.best_score_index(), 1);
        assert_eq!(population.best_rate_index(), 1);
    }

    #[test]
    fn test_invalid_params() {
        let mut rng = Pcg32::seed_from_u64(8);
        assert_eq!(
            Population::new(params(0, 0.5), &mut rng).unwrap_err(),
            ParamError::EmptyPopulation
        );
        assert!(matches!(
            Population::new(params(3, 1.5), &mut rng).unwrap_err(),
            ParamError::InvalidProbability {
                name: "rebirth_probability",
                ..
            }
        ));
    }

    #[test]
    #[should_panic(expected = "already evaluated")]
    fn test_record_past_generation_end() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut population = Population::new(params(1, 0.0), &mut rng).unwrap();
        population.record_score(1);
        population.record_score(2);
    }
}
