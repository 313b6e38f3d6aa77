// src/quiz/scorer.rs

use serde::Serialize;

use super::session::{AnsweredQuestion, QuizSession};

/// Coarse performance classification by accuracy. The matching message
/// text lives in the presentation layer; only the tier is decided here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Outstanding,
    Great,
    Good,
    Encouragement,
}

impl Tier {
    pub fn from_accuracy(accuracy: u32) -> Self {
        match accuracy {
            90.. => Tier::Outstanding,
            70.. => Tier::Great,
            50.. => Tier::Good,
            _ => Tier::Encouragement,
        }
    }
}

/// Final result of a completed session. Immutable; produced exactly once.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub score: u32,
    pub total_questions: u32,
    /// Integer percentage in 0..=100, rounded half-up.
    pub accuracy: u32,
    pub tier: Tier,
    pub answers: Vec<AnsweredQuestion>,
}

/// Derives the report from a completed session. Returns `None` while the
/// session is still in progress. Deterministic, no side effects.
pub fn build_report(session: &QuizSession) -> Option<ScoreReport> {
    if !session.is_completed() {
        return None;
    }
    let score = session.running_score();
    let total = session.total_questions() as u32;
    let accuracy = rounded_percentage(score, total);

    Some(ScoreReport {
        score,
        total_questions: total,
        accuracy,
        tier: Tier::from_accuracy(accuracy),
        answers: session.answers().to_vec(),
    })
}

/// `round(100 * part / whole)` with half-up rounding, in integers.
fn rounded_percentage(part: u32, whole: u32) -> u32 {
    (200 * part + whole) / (2 * whole)
}
