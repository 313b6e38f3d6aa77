// src/supply/mod.rs

pub mod file;
pub mod remote;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::quiz::Question;

pub use file::FileSource;
pub use remote::RemoteSource;

/// A question record as served by the sources: four options keyed by
/// letter plus the correct letter.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    pub question: String,
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
    pub answer: String,
}

/// Every configured source failed (or yielded nothing usable). A session
/// cannot be started in this state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupplyUnavailable;

pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// One place questions can come from. Implementations do the I/O; the
/// supply chain below handles fallback and normalization.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Short name for log lines.
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<RawQuestion>, SourceError>;
}

/// Ordered chain of question sources. The first source that yields at
/// least one usable record wins; failures along the way are logged and
/// otherwise invisible to the caller.
pub struct QuestionSupply {
    sources: Vec<Box<dyn QuestionSource>>,
}

impl QuestionSupply {
    /// Builds the standard chain from configuration: the remote API when
    /// a URL is configured, then the local fallback file.
    pub fn from_config(config: &Config) -> Self {
        let mut sources: Vec<Box<dyn QuestionSource>> = Vec::new();
        if let Some(url) = &config.questions_api_url {
            sources.push(Box::new(RemoteSource::new(url.clone())));
        }
        sources.push(Box::new(FileSource::new(config.questions_file.clone())));
        Self { sources }
    }

    pub fn from_sources(sources: Vec<Box<dyn QuestionSource>>) -> Self {
        Self { sources }
    }

    /// Fetches a fresh question set for one session.
    pub async fn load(&self) -> Result<Vec<Question>, SupplyUnavailable> {
        for source in &self.sources {
            match source.fetch().await {
                Ok(raw) => {
                    let questions = normalize(raw);
                    if questions.is_empty() {
                        tracing::warn!(
                            "question source '{}' returned no usable records",
                            source.name()
                        );
                        continue;
                    }
                    tracing::debug!(
                        "loaded {} questions from source '{}'",
                        questions.len(),
                        source.name()
                    );
                    return Ok(questions);
                }
                Err(e) => {
                    tracing::warn!("question source '{}' failed: {}", source.name(), e);
                }
            }
        }
        Err(SupplyUnavailable)
    }
}

/// Maps letter-keyed records into canonical questions. Records with an
/// unknown answer letter are skipped, not fatal.
fn normalize(raw: Vec<RawQuestion>) -> Vec<Question> {
    raw.into_iter()
        .filter_map(|r| {
            let correct_index = match r.answer.trim() {
                "A" => 0,
                "B" => 1,
                "C" => 2,
                "D" => 3,
                other => {
                    tracing::warn!(
                        "skipping question with unknown answer letter '{}': {}",
                        other,
                        r.question
                    );
                    return None;
                }
            };
            Some(Question {
                text: r.question,
                options: [r.a, r.b, r.c, r.d],
                correct_index,
            })
        })
        .collect()
}
