// src/quiz/session.rs

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Maximum number of questions drawn into one session.
pub const QUESTIONS_PER_SESSION: usize = 10;

/// Countdown per question, in seconds.
pub const QUESTION_TIME_SECS: u32 = 20;

/// A loaded multiple-choice question. Options are in canonical order;
/// `correct_index` always points into `options`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub options: [String; 4],
    pub correct_index: usize,
}

/// One settled question, appended exactly once per question in order.
/// `chosen_option_text` is `None` when the timer ran out with no choice.
#[derive(Debug, Clone, Serialize)]
pub struct AnsweredQuestion {
    pub question_text: String,
    pub chosen_option_text: Option<String>,
    pub correct_option_text: String,
    pub is_correct: bool,
}

/// Sub-state of the current question while the session is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Timer is counting down, waiting for an answer.
    Active,
    /// An answer (or a timeout) has been recorded; waiting for `advance`.
    Answered,
}

/// Outcome of a successful `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next,
    Completed,
}

/// Error returned when a session cannot be started because no questions
/// are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoQuestions;

/// The quiz state machine. Owns every piece of mutable session state;
/// does no I/O. Time enters only through `tick`, which an external
/// scheduler fires once per second while the question is `Active`.
///
/// All transitions on one instance must be serialized by the caller
/// (the session registry wraps each instance in a mutex).
#[derive(Debug)]
pub struct QuizSession {
    questions: Vec<Question>,
    current_index: usize,
    running_score: u32,
    answers: Vec<AnsweredQuestion>,
    remaining_seconds: u32,
    phase: Phase,
    completed: bool,
}

impl QuizSession {
    /// Starts a new session from a question pool: uniform shuffle, then
    /// capped at [`QUESTIONS_PER_SESSION`]. Fails on an empty pool.
    pub fn start(pool: Vec<Question>) -> Result<Self, NoQuestions> {
        Self::start_with_rng(pool, &mut rand::thread_rng())
    }

    /// Same as [`start`](Self::start) with an explicit RNG, so tests can
    /// seed the shuffle.
    pub fn start_with_rng<R: Rng + ?Sized>(
        mut pool: Vec<Question>,
        rng: &mut R,
    ) -> Result<Self, NoQuestions> {
        if pool.is_empty() {
            return Err(NoQuestions);
        }
        pool.shuffle(rng);
        pool.truncate(QUESTIONS_PER_SESSION);

        Ok(Self {
            questions: pool,
            current_index: 0,
            running_score: 0,
            answers: Vec::new(),
            remaining_seconds: QUESTION_TIME_SECS,
            phase: Phase::Active,
            completed: false,
        })
    }

    /// One second of wall clock. Counts down while the question is
    /// `Active`; at zero records a timeout answer and settles the
    /// question. No-op once `Answered` or after completion.
    pub fn tick(&mut self) {
        if self.completed || self.phase != Phase::Active {
            return;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            let q = &self.questions[self.current_index];
            self.answers.push(AnsweredQuestion {
                question_text: q.text.clone(),
                chosen_option_text: None,
                correct_option_text: q.options[q.correct_index].clone(),
                is_correct: false,
            });
            self.phase = Phase::Answered;
        }
    }

    /// Records the user's choice, given as a canonical option index.
    /// Returns `true` if the answer was recorded. Late or duplicate
    /// calls (question already settled by an earlier choice or by the
    /// timeout) and out-of-range indices are ignored.
    pub fn select_answer(&mut self, option_index: usize) -> bool {
        if self.completed || self.phase != Phase::Active || option_index >= 4 {
            return false;
        }
        let q = &self.questions[self.current_index];
        let is_correct = option_index == q.correct_index;
        self.answers.push(AnsweredQuestion {
            question_text: q.text.clone(),
            chosen_option_text: Some(q.options[option_index].clone()),
            correct_option_text: q.options[q.correct_index].clone(),
            is_correct,
        });
        if is_correct {
            self.running_score += 1;
        }
        self.phase = Phase::Answered;
        true
    }

    /// Moves to the next question, or completes the session after the
    /// last one. Only legal once the current question is settled;
    /// returns `None` otherwise.
    pub fn advance(&mut self) -> Option<Advance> {
        if self.completed || self.phase != Phase::Answered {
            return None;
        }
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            self.remaining_seconds = QUESTION_TIME_SECS;
            self.phase = Phase::Active;
            Some(Advance::Next)
        } else {
            self.completed = true;
            Some(Advance::Completed)
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn running_score(&self) -> u32 {
        self.running_score
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn answers(&self) -> &[AnsweredQuestion] {
        &self.answers
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Whether the countdown for the current question is still running.
    /// The ticker task exits as soon as this turns false.
    pub fn timer_active(&self) -> bool {
        !self.completed && self.phase == Phase::Active
    }

    /// The question currently on screen, if the session is in progress.
    pub fn current_question(&self) -> Option<&Question> {
        if self.completed {
            None
        } else {
            self.questions.get(self.current_index)
        }
    }

    /// The most recently settled answer (feedback for the current
    /// question once it is `Answered`).
    pub fn last_answer(&self) -> Option<&AnsweredQuestion> {
        self.answers.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn question(n: usize, correct: usize) -> Question {
        Question {
            text: format!("Question {}", n),
            options: [
                format!("Q{} option 0", n),
                format!("Q{} option 1", n),
                format!("Q{} option 2", n),
                format!("Q{} option 3", n),
            ],
            correct_index: correct,
        }
    }

    pub(crate) fn pool(len: usize) -> Vec<Question> {
        (0..len).map(|n| question(n, n % 4)).collect()
    }

    fn answer_current_correctly(session: &mut QuizSession) {
        let correct = session.current_question().unwrap().correct_index;
        assert!(session.select_answer(correct));
    }

    #[test]
    fn start_rejects_empty_pool() {
        assert_eq!(QuizSession::start(Vec::new()).unwrap_err(), NoQuestions);
    }

    #[test]
    fn start_caps_at_session_size() {
        let session = QuizSession::start(pool(25)).unwrap();
        assert_eq!(session.total_questions(), QUESTIONS_PER_SESSION);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.running_score(), 0);
        assert_eq!(session.remaining_seconds(), QUESTION_TIME_SECS);
        assert_eq!(session.phase(), Phase::Active);
    }

    #[test]
    fn start_keeps_short_pools_whole() {
        let session = QuizSession::start(pool(3)).unwrap();
        assert_eq!(session.total_questions(), 3);
    }

    #[test]
    fn correct_answer_scores_and_settles() {
        let mut session = QuizSession::start(pool(2)).unwrap();
        answer_current_correctly(&mut session);

        assert_eq!(session.running_score(), 1);
        assert_eq!(session.phase(), Phase::Answered);
        assert!(!session.timer_active());
        let ans = session.last_answer().unwrap();
        assert!(ans.is_correct);
        assert!(ans.chosen_option_text.is_some());
    }

    #[test]
    fn wrong_answer_records_without_scoring() {
        let mut session = QuizSession::start(pool(2)).unwrap();
        let correct = session.current_question().unwrap().correct_index;
        let wrong = (correct + 1) % 4;
        assert!(session.select_answer(wrong));

        assert_eq!(session.running_score(), 0);
        let q = session.current_question().unwrap();
        let ans = session.last_answer().unwrap();
        assert!(!ans.is_correct);
        assert_eq!(ans.chosen_option_text.as_deref(), Some(q.options[wrong].as_str()));
        assert_eq!(ans.correct_option_text, q.options[correct]);
    }

    #[test]
    fn double_select_is_ignored() {
        let mut session = QuizSession::start(pool(2)).unwrap();
        answer_current_correctly(&mut session);
        let correct = session.answers()[0].correct_option_text.clone();

        // Second submission before advance: no extra answer, no extra score.
        assert!(!session.select_answer(0));
        assert!(!session.select_answer(3));
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.running_score(), 1);
        assert_eq!(session.answers()[0].correct_option_text, correct);
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let mut session = QuizSession::start(pool(2)).unwrap();
        assert!(!session.select_answer(4));
        assert_eq!(session.answers().len(), 0);
        assert_eq!(session.phase(), Phase::Active);
    }

    #[test]
    fn timeout_synthesizes_unanswered_entry() {
        let mut session = QuizSession::start(pool(2)).unwrap();
        for _ in 0..QUESTION_TIME_SECS {
            session.tick();
        }

        assert_eq!(session.remaining_seconds(), 0);
        assert_eq!(session.phase(), Phase::Answered);
        let ans = session.last_answer().unwrap();
        assert!(ans.chosen_option_text.is_none());
        assert!(!ans.is_correct);
        assert_eq!(session.running_score(), 0);

        // Timeout does not block advancing.
        assert_eq!(session.advance(), Some(Advance::Next));
    }

    #[test]
    fn tick_is_idempotent_once_answered() {
        let mut session = QuizSession::start(pool(2)).unwrap();
        for _ in 0..QUESTION_TIME_SECS {
            session.tick();
        }
        session.tick();
        session.tick();
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.remaining_seconds(), 0);
    }

    #[test]
    fn select_after_timeout_is_ignored() {
        let mut session = QuizSession::start(pool(2)).unwrap();
        for _ in 0..QUESTION_TIME_SECS {
            session.tick();
        }
        // The user's click raced the final tick and lost.
        assert!(!session.select_answer(0));
        assert_eq!(session.answers().len(), 1);
        assert!(session.answers()[0].chosen_option_text.is_none());
    }

    #[test]
    fn advance_requires_settled_question() {
        let mut session = QuizSession::start(pool(2)).unwrap();
        assert_eq!(session.advance(), None);
        answer_current_correctly(&mut session);
        assert_eq!(session.advance(), Some(Advance::Next));
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.remaining_seconds(), QUESTION_TIME_SECS);
        assert_eq!(session.phase(), Phase::Active);
    }

    #[test]
    fn completes_after_last_question() {
        let mut session = QuizSession::start(pool(2)).unwrap();
        answer_current_correctly(&mut session);
        assert_eq!(session.advance(), Some(Advance::Next));
        answer_current_correctly(&mut session);
        assert_eq!(session.advance(), Some(Advance::Completed));

        assert!(session.is_completed());
        assert_eq!(session.answers().len(), session.total_questions());
        assert!(session.current_question().is_none());

        // Terminal state: everything is a no-op.
        assert!(!session.select_answer(0));
        assert_eq!(session.advance(), None);
        session.tick();
        assert_eq!(session.answers().len(), 2);
    }

    #[test]
    fn score_matches_correct_count_after_every_advance() {
        let mut session = QuizSession::start(pool(10)).unwrap();
        loop {
            let correct = session.current_question().unwrap().correct_index;
            // Alternate correct and wrong answers.
            if session.current_index() % 2 == 0 {
                session.select_answer(correct);
            } else {
                session.select_answer((correct + 1) % 4);
            }

            let correct_count = session
                .answers()
                .iter()
                .filter(|a| a.is_correct)
                .count() as u32;
            assert_eq!(session.running_score(), correct_count);
            assert_eq!(session.answers().len(), session.current_index() + 1);

            if session.advance() == Some(Advance::Completed) {
                break;
            }
        }
        assert_eq!(session.running_score(), 5);
    }

    #[test]
    fn shuffle_is_deterministic_under_seeded_rng() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let a = QuizSession::start_with_rng(pool(20), &mut StdRng::seed_from_u64(7)).unwrap();
        let b = QuizSession::start_with_rng(pool(20), &mut StdRng::seed_from_u64(7)).unwrap();
        let texts = |s: &QuizSession| -> Vec<String> {
            (0..s.total_questions())
                .map(|i| s.questions[i].text.clone())
                .collect()
        };
        assert_eq!(texts(&a), texts(&b));
    }
}
