//! Mastery scoring - a derived blend of completion and performance
//!
//! Mastery is never persisted: it is recomputed on every read as a pure
//! function of the concept's progress and the performance history, so a
//! later quiz re-attempt shifts the score immediately.

use serde::{Deserialize, Serialize};

use ascend_models::ConceptProgress;

use crate::history::ConceptPerformance;

const COMPLETION_WEIGHT: f64 = 0.4;
const QUIZ_WEIGHT: f64 = 0.3;
const PROBLEM_WEIGHT: f64 = 0.3;

/// Qualitative mastery band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryBand {
    /// [0, 40)
    Started,
    /// [40, 60)
    InProgress,
    /// [60, 80)
    Completed,
    /// [80, 100]
    Mastered,
}

impl MasteryBand {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Started => "Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Mastered => "Mastered",
        }
    }

    /// Display color associated with the band.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Started => "orange",
            Self::InProgress => "yellow",
            Self::Completed => "blue",
            Self::Mastered => "green",
        }
    }

    fn from_score(score: u8) -> Self {
        match score {
            0..=39 => Self::Started,
            40..=59 => Self::InProgress,
            60..=79 => Self::Completed,
            _ => Self::Mastered,
        }
    }
}

/// A derived mastery score for one concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryScore {
    /// 0-100.
    pub score: u8,
    pub band: MasteryBand,
}

/// Blend topic completion, quiz performance, and problem-solving into a
/// 0-100 mastery score.
///
/// Weights are 40/30/30; a component with no applicable data is excluded
/// and the remaining weights renormalized, so a concept with no quiz yet
/// weights completion 4/7 and problems 3/7.
pub fn compute_mastery(progress: &ConceptProgress, performance: &ConceptPerformance) -> MasteryScore {
    let mut weighted = COMPLETION_WEIGHT * (progress.progress / 100.0);
    let mut weight = COMPLETION_WEIGHT;

    if !performance.quiz_scores.is_empty() {
        let mean =
            performance.quiz_scores.iter().sum::<f64>() / performance.quiz_scores.len() as f64;
        weighted += QUIZ_WEIGHT * (mean / 100.0);
        weight += QUIZ_WEIGHT;
    }

    if performance.problems_attempted > 0 {
        let ratio = performance.problems_solved as f64 / performance.problems_attempted as f64;
        weighted += PROBLEM_WEIGHT * ratio.min(1.0);
        weight += PROBLEM_WEIGHT;
    }

    let blended = weighted / weight;
    let score = (blended * 100.0).round().clamp(0.0, 100.0) as u8;
    MasteryScore {
        score,
        band: MasteryBand::from_score(score),
    }
}
