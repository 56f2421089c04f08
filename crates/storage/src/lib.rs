use std::{
    io,
    path::{Path, PathBuf},
};

use shared::{DomainError, ErrorKind, QuizParameters};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read quiz list {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write quiz list {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("quiz list {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode quiz list: {0}")]
    Encode(serde_json::Error),
    #[error("quiz index {index} is out of range for a list of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("invalid quiz parameters: {0}")]
    Invalid(#[from] DomainError),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Read { .. } | Self::Write { .. } | Self::Corrupt { .. } | Self::Encode(_) => {
                ErrorKind::DataCorruption
            }
            Self::IndexOutOfRange { .. } | Self::Invalid(_) => ErrorKind::PreconditionViolation,
        }
    }
}

/// The ordered list of saved quizzes, backed by a single JSON file.
///
/// Indices are positions, not durable ids: removing an entry renumbers every
/// entry after it. Each mutation rewrites the whole file, and the in-memory
/// list only changes once that write has succeeded.
#[derive(Debug)]
pub struct QuizStore {
    path: PathBuf,
    quizzes: Vec<QuizParameters>,
}

impl QuizStore {
    /// Load the list at `path`. A missing file is an empty list; a file that
    /// exists but cannot be parsed is an error.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let quizzes = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str::<Vec<QuizParameters>>(&raw).map_err(|source| {
                StoreError::Corrupt {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no quiz list yet; starting empty");
                Vec::new()
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        info!(path = %path.display(), count = quizzes.len(), "loaded quiz list");
        Ok(Self { path, quizzes })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn quizzes(&self) -> &[QuizParameters] {
        &self.quizzes
    }

    pub fn get(&self, index: usize) -> Option<&QuizParameters> {
        self.quizzes.get(index)
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    /// Append a quiz and return its index.
    pub async fn add(&mut self, params: QuizParameters) -> Result<usize, StoreError> {
        params.validate()?;
        let mut next = self.quizzes.clone();
        next.push(params);
        self.commit(next).await?;
        Ok(self.quizzes.len() - 1)
    }

    /// Replace the quiz at `index` in place.
    pub async fn modify(&mut self, index: usize, params: QuizParameters) -> Result<(), StoreError> {
        self.check_index(index)?;
        params.validate()?;
        let mut next = self.quizzes.clone();
        next[index] = params;
        self.commit(next).await
    }

    /// Remove the quiz at `index`, shifting later entries down by one.
    pub async fn remove(&mut self, index: usize) -> Result<QuizParameters, StoreError> {
        self.check_index(index)?;
        let mut next = self.quizzes.clone();
        let removed = next.remove(index);
        self.commit(next).await?;
        Ok(removed)
    }

    fn check_index(&self, index: usize) -> Result<(), StoreError> {
        if index < self.quizzes.len() {
            Ok(())
        } else {
            Err(StoreError::IndexOutOfRange {
                index,
                len: self.quizzes.len(),
            })
        }
    }

    async fn commit(&mut self, next: Vec<QuizParameters>) -> Result<(), StoreError> {
        write_list(&self.path, &next).await?;
        self.quizzes = next;
        debug!(path = %self.path.display(), count = self.quizzes.len(), "saved quiz list");
        Ok(())
    }
}

async fn write_list(path: &Path, quizzes: &[QuizParameters]) -> Result<(), StoreError> {
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let encoded = serde_json::to_vec_pretty(quizzes).map_err(StoreError::Encode)?;
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);
    let staged = match tokio::fs::write(&staging, encoded).await {
        Ok(()) => tokio::fs::rename(&staging, path).await,
        Err(err) => Err(err),
    };
    if let Err(source) = staged {
        if let Err(err) = tokio::fs::remove_file(&staging).await {
            if err.kind() != io::ErrorKind::NotFound {
                warn!(path = %staging.display(), %err, "failed to remove staging file");
            }
        }
        return Err(write_err(source));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
