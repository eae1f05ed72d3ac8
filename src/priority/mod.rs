//! Refill prioritization: urgency scoring, candidate ranking, and cadence
//! recommendations.

mod cadence;
mod engine;

pub use cadence::recommended_cadence;
pub use engine::{
    build_candidate, classify, needs_refill, priority_score, rank_candidates,
    DEFAULT_PRIORITY_THRESHOLD, SCORING_HORIZON_DAYS,
};
