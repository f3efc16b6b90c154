//! Mode recommendation from a user's priority ranking.
//!
//! Each mode carries a fixed weight vector over the four ranked criteria;
//! the user's ranks invert into priorities and the best weighted sum wins.

use anyhow::{Result, bail};
use serde::Serialize;

use crate::cost::Mode;

/// Per-mode weights over {cost, comfort, on-time, stress}. Small integer
/// constants reflecting each mode's inherent strengths: the shuttle is the
/// value pick, luxury rideshare the comfortable low-stress pick, rail the
/// punctual pick.
struct ModeWeights {
    cost: f64,
    comfort: f64,
    on_time: f64,
    stress: f64,
}

/// Iteration order doubles as the tie-break order: on equal scores the
/// earlier entry wins.
static MODE_WEIGHTS: &[(Mode, ModeWeights)] = &[
    (
        Mode::SelfDrive,
        ModeWeights { cost: 2.0, comfort: 3.0, on_time: 2.0, stress: 1.0 },
    ),
    (
        Mode::RideshareStandard,
        ModeWeights { cost: 1.0, comfort: 4.0, on_time: 2.0, stress: 3.0 },
    ),
    (
        Mode::RideshareLuxury,
        ModeWeights { cost: 1.0, comfort: 4.0, on_time: 3.0, stress: 3.0 },
    ),
    (
        Mode::Transit,
        ModeWeights { cost: 3.0, comfort: 2.0, on_time: 4.0, stress: 2.0 },
    ),
    (
        Mode::Shuttle,
        ModeWeights { cost: 4.0, comfort: 2.0, on_time: 3.0, stress: 2.0 },
    ),
    (
        Mode::ShuttleMember,
        ModeWeights { cost: 3.0, comfort: 2.0, on_time: 3.0, stress: 2.0 },
    ),
];

/// A user's priority ranking: position 1 (most important) through 4 for
/// each criterion, no repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormRanking {
    pub cost: u8,
    pub comfort: u8,
    pub on_time: u8,
    pub stress: u8,
}

impl FormRanking {
    /// Rejects rankings that are not a permutation of 1..=4. Callers must
    /// gate on this before scoring.
    pub fn validate(&self) -> Result<()> {
        let mut seen = [false; 5];
        for rank in [self.cost, self.comfort, self.on_time, self.stress] {
            if !(1..=4).contains(&rank) {
                bail!("ranking value {rank} is outside 1-4");
            }
            if seen[rank as usize] {
                bail!("ranking value {rank} is used more than once");
            }
            seen[rank as usize] = true;
        }
        Ok(())
    }
}

/// Rank 1 carries the highest influence. Out-of-range ranks clamp to zero
/// influence instead of panicking; [`FormRanking::validate`] is the real
/// gate.
fn priority(rank: u8) -> f64 {
    (5 - i32::from(rank)).max(0) as f64
}

/// Score for one mode, with the display-oriented normalized form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModeScore {
    pub mode: Mode,
    pub score: f64,
    pub normalized: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub recommended: Mode,
    pub scores: Vec<ModeScore>,
}

/// Scores every mode against the ranking and picks the best.
pub fn score(ranking: &FormRanking) -> RecommendationResult {
    let cost_priority = priority(ranking.cost);
    let comfort_priority = priority(ranking.comfort);
    let on_time_priority = priority(ranking.on_time);
    let stress_priority = priority(ranking.stress);

    let mut scores = Vec::with_capacity(MODE_WEIGHTS.len());
    let mut best: Option<(Mode, f64)> = None;

    for (mode, weights) in MODE_WEIGHTS {
        let total = weights.cost * cost_priority
            + weights.comfort * comfort_priority
            + weights.on_time * on_time_priority
            + weights.stress * stress_priority;

        // strict comparison keeps the first mode on ties
        if best.is_none_or(|(_, best_score)| total > best_score) {
            best = Some((*mode, total));
        }
        scores.push(ModeScore {
            mode: *mode,
            score: total,
            normalized: 0.0,
        });
    }

    let max_score = scores.iter().map(|entry| entry.score).fold(0.0, f64::max);
    for entry in &mut scores {
        entry.normalized = if max_score == 0.0 {
            0.0
        } else {
            entry.score / max_score
        };
    }

    let (recommended, _) = best.unwrap_or((Mode::SelfDrive, 0.0));
    RecommendationResult {
        recommended,
        scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking(cost: u8, comfort: u8, on_time: u8, stress: u8) -> FormRanking {
        FormRanking { cost, comfort, on_time, stress }
    }

    #[test]
    fn test_validate_accepts_permutations() {
        assert!(ranking(1, 2, 3, 4).validate().is_ok());
        assert!(ranking(4, 3, 2, 1).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicates_and_out_of_range() {
        assert!(ranking(1, 1, 3, 4).validate().is_err());
        assert!(ranking(0, 2, 3, 4).validate().is_err());
        assert!(ranking(1, 2, 3, 5).validate().is_err());
    }

    #[test]
    fn test_cost_first_recommends_shuttle() {
        let result = score(&ranking(1, 2, 3, 4));
        assert_eq!(result.recommended, Mode::Shuttle);
    }

    #[test]
    fn test_comfort_first_recommends_luxury() {
        let result = score(&ranking(2, 1, 3, 4));
        assert_eq!(result.recommended, Mode::RideshareLuxury);
    }

    #[test]
    fn test_punctuality_first_recommends_transit() {
        let result = score(&ranking(3, 4, 1, 2));
        assert_eq!(result.recommended, Mode::Transit);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let first = score(&ranking(1, 2, 3, 4));
        let second = score(&ranking(1, 2, 3, 4));
        assert_eq!(first, second);
    }

    #[test]
    fn test_normalized_scores_peak_at_one() {
        let result = score(&ranking(1, 2, 3, 4));
        let max = result
            .scores
            .iter()
            .map(|s| s.normalized)
            .fold(0.0, f64::max);
        assert_eq!(max, 1.0);

        let winner = result
            .scores
            .iter()
            .find(|s| s.mode == result.recommended)
            .expect("winner listed");
        assert_eq!(winner.normalized, 1.0);
    }

    #[test]
    fn test_invalid_ranking_does_not_panic() {
        // not a permutation; scorer still returns a best-effort result
        let result = score(&ranking(9, 9, 9, 9));
        assert_eq!(result.scores.len(), Mode::ALL.len());
        for entry in &result.scores {
            assert_eq!(entry.score, 0.0);
            assert_eq!(entry.normalized, 0.0);
        }
    }
}
