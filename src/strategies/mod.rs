pub mod confidence;
pub mod live;
pub mod player;
pub mod prematch;
pub mod types;

use crate::config::ScoringWeights;
use crate::data::types::{LivePayload, PlayerPayload, PreMatchPayload};
use crate::recommendation::Recommendation;

/// Entry points for the three scoring strategies, sharing one weight table.
#[derive(Debug, Clone, Default)]
pub struct HeuristicScorer {
    weights: ScoringWeights,
}

impl HeuristicScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn score_prematch(&self, payload: &PreMatchPayload) -> Recommendation {
        prematch::score_prematch(payload, &self.weights)
    }

    pub fn score_live(&self, payload: &LivePayload) -> Recommendation {
        live::score_live(payload, &self.weights)
    }

    pub fn score_player(&self, payload: &PlayerPayload) -> Recommendation {
        player::score_player(payload, &self.weights)
    }
}
