use bdsolve_evaluator::{board_feature::BoardFeature, genome::Genome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A trained genome as stored on disk.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenomeModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub generations: usize,
    pub seed: u64,
    pub final_average_score: Option<f32>,
    pub success_rate: f32,
    pub weights: Vec<FeatureWeight>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeatureWeight {
    pub id: String,
    pub weight: f32,
}

impl GenomeModel {
    pub(crate) fn feature_weights(genome: &Genome) -> Vec<FeatureWeight> {
        BoardFeature::ALL
            .iter()
            .map(|f| FeatureWeight {
                id: f.id().to_owned(),
                weight: genome.weight(*f),
            })
            .collect()
    }

    /// Rebuilds the genome, matching weights to features by ID.
    pub(crate) fn to_genome(&self) -> anyhow::Result<Genome> {
        for fw in &self.weights {
            if !BoardFeature::ALL.iter().any(|f| f.id() == fw.id) {
                anyhow::bail!("Feature ID {} in model not found", fw.id);
            }
        }
        let mut missing = vec![];
        let genome = Genome::from_fn(|i| {
            let feature = BoardFeature::ALL[i];
            self.weights
                .iter()
                .find(|fw| fw.id == feature.id())
                .map_or_else(
                    || {
                        missing.push(feature.id());
                        0.0
                    },
                    |fw| fw.weight,
                )
        });
        if !missing.is_empty() {
            anyhow::bail!("Model has no weight for features: {}", missing.join(", "));
        }
        Ok(genome)
    }
}
