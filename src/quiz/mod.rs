// src/quiz/mod.rs

pub mod scorer;
pub mod session;

pub use scorer::{ScoreReport, Tier, build_report};
pub use session::{Advance, AnsweredQuestion, Phase, Question, QuizSession};
