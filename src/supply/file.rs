// src/supply/file.rs

use std::path::PathBuf;

use async_trait::async_trait;

use super::{QuestionSource, RawQuestion, SourceError};

/// Local JSON fallback: an array of letter-keyed question records on
/// disk, read fresh for every session.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuestionSource for FileSource {
    fn name(&self) -> &str {
        "local file"
    }

    async fn fetch(&self) -> Result<Vec<RawQuestion>, SourceError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let records: Vec<RawQuestion> = serde_json::from_str(&content)?;
        Ok(records)
    }
}
