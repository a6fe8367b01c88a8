// AIDEV-NOTE: Unified error type for the resolver pipeline
// Uses thiserror for clean error definitions and automatic trait implementations

use thiserror::Error;
use std::path::PathBuf;

#[derive(Error, Debug)]
pub enum SetmendError {
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON serialization error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("TOML parsing error: {0}")]
  Toml(#[from] toml::de::Error),

  #[error("library root does not exist: {0}")]
  RootMissing(PathBuf),

  #[error("playlist is malformed: {0}")]
  PlaylistParseError(String),

  #[error("update matched zero songs in {0}")]
  NoMatches(PathBuf),

  #[error("an index build is already in progress")]
  IndexBusy,

  #[error("catalog file is corrupt: {0}")]
  CatalogCorrupt(String),

  #[error("{0}")]
  Custom(String),
}

impl serde::Serialize for SetmendError {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: serde::ser::Serializer,
  {
    serializer.serialize_str(&format!("{}", self))
  }
}

pub type Result<T> = std::result::Result<T, SetmendError>;
