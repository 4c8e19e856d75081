//! Genome: the weight vector of the linear placement policy.

use std::{fmt, iter};

use serde::{Deserialize, Serialize};

use crate::board_feature::BoardFeature;

/// Number of weights in a genome, one per [`BoardFeature`].
pub const GENOME_LEN: usize = BoardFeature::ALL.len();

/// Weights of the linear placement policy, in [`BoardFeature::ALL`] order.
///
/// A genome is read by the move search and written only by the genetic algorithm
/// between generations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome([f32; GENOME_LEN]);

impl Genome {
    #[must_use]
    pub const fn new(weights: [f32; GENOME_LEN]) -> Self {
        Self(weights)
    }

    /// Creates a genome by computing each weight from its index.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut(usize) -> f32,
    {
        Self(std::array::from_fn(f))
    }

    #[must_use]
    pub fn weights(&self) -> &[f32; GENOME_LEN] {
        &self.0
    }

    #[must_use]
    pub fn weight(&self, feature: BoardFeature) -> f32 {
        self.0[feature as usize]
    }

    /// Dot product of the weights with a feature vector.
    #[must_use]
    pub fn weighted_sum(&self, features: &[f32; GENOME_LEN]) -> f32 {
        iter::zip(&self.0, features).map(|(w, f)| w * f).sum()
    }
}

impl From<[f32; GENOME_LEN]> for Genome {
    fn from(weights: [f32; GENOME_LEN]) -> Self {
        Self(weights)
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, w) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{w:.2}")?;
        }
        write!(f, "]")
    }
}
