//! Gene operators for the genetic algorithm.
//!
//! - **Initialization**: [`random_gene`] / [`random_genome`] draw weights uniformly from
//!   \[-10.00, 10.00) in steps of 0.01
//! - **Reproduction**: [`new_child`] combines uniform crossover with single-site mutation
//!
//! These are used by [`Population`](crate::genetic::Population) to seed a population and to
//! breed replacements for reborn genomes.

use bdsolve_evaluator::genome::{GENOME_LEN, Genome};
use rand::Rng;

/// Gene values are integers in this range, in hundredths.
const GENE_HUNDREDTHS: std::ops::Range<i16> = -1000..1000;

/// Lower bound of a gene value.
pub const GENE_MIN: f32 = -10.0;
/// Upper bound of a gene value.
pub const GENE_MAX: f32 = 10.0;

/// Draws a gene uniformly from \[-10.00, 10.00) with a resolution of 0.01.
pub fn random_gene<R>(rng: &mut R) -> f32
where
    R: Rng + ?Sized,
{
    f32::from(rng.random_range(GENE_HUNDREDTHS)) / 100.0
}

/// Draws a genome with every gene from [`random_gene`].
pub fn random_genome<R>(rng: &mut R) -> Genome
where
    R: Rng + ?Sized,
{
    Genome::from_fn(|_| random_gene(&mut *rng))
}

/// Breeds a child genome from two parents.
///
/// With probability `mutation_rate`, one gene index chosen uniformly at random receives a
/// fresh [`random_gene`]. Every other gene is inherited from `p1` or `p2` with equal
/// probability.
///
/// # Panics
///
/// Panics if `mutation_rate` is not in \[0.0, 1.0\].
pub fn new_child<R>(p1: &Genome, p2: &Genome, mutation_rate: f64, rng: &mut R) -> Genome
where
    R: Rng + ?Sized,
{
    let mutation_site = rng
        .random_bool(mutation_rate)
        .then(|| rng.random_range(0..GENOME_LEN));
    Genome::from_fn(|i| {
        if mutation_site == Some(i) {
            random_gene(&mut *rng)
        } else if rng.random_bool(0.5) {
            p1.weights()[i]
        } else {
            p2.weights()[i]
        }
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_random_gene_range_and_resolution() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..1000 {
            let gene = random_gene(&mut rng);
            assert!((GENE_MIN..GENE_MAX).contains(&gene), "{gene}");
            let hundredths = gene * 100.0;
            assert!((hundredths - hundredths.round()).abs() < 1e-3, "{gene}");
        }
    }

    #[test]
    fn test_crossover_without_mutation() {
        let mut rng = Pcg32::seed_from_u64(2);
        let p1 = Genome::new([1.0; GENOME_LEN]);
        let p2 = Genome::new([2.0; GENOME_LEN]);
        let mut from_p1 = 0;
        for _ in 0..100 {
            let child = new_child(&p1, &p2, 0.0, &mut rng);
            for w in child.weights() {
                assert!(*w == 1.0 || *w == 2.0);
                from_p1 += usize::from(*w == 1.0);
            }
        }
        // Both parents contribute.
        assert!(from_p1 > 0 && from_p1 < 100 * GENOME_LEN);
    }

    #[test]
    fn test_mutation_changes_one_gene() {
        let mut rng = Pcg32::seed_from_u64(3);
        // Parent genes lie outside the gene range, so a mutated gene is always distinct.
        let parent = Genome::new([50.0; GENOME_LEN]);
        for _ in 0..100 {
            let child = new_child(&parent, &parent, 1.0, &mut rng);
            let mutated: Vec<f32> = child
                .weights()
                .iter()
                .copied()
                .filter(|w| *w != 50.0)
                .collect();
            assert_eq!(mutated.len(), 1);
            assert!((GENE_MIN..GENE_MAX).contains(&mutated[0]));
        }
    }
}
