// AIDEV-NOTE: Resolver configuration (ambient)
// Minimal settings layer for paths and tunables. Pattern (serde + toml,
// #[serde(default = "...")], Config::load_or_default) grounded on
// examples/sphildreth-tunez-rust/src/tunez-core/src/config.rs. Out of
// scope: a full external settings store — just enough to give the CLI
// a way to receive paths/tunables.

use crate::matcher::DEFAULT_TAU;
use crate::similarity::ScorerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
  #[serde(default)]
  pub library_root: Option<PathBuf>,
  #[serde(default)]
  pub playlists_folders_root: Option<PathBuf>,
  #[serde(default)]
  pub playlists_my_lists_root: Option<PathBuf>,
  #[serde(default = "default_catalog_path")]
  pub catalog_path: PathBuf,
  #[serde(default = "default_logs_dir")]
  pub logs_dir: PathBuf,
  #[serde(default)]
  pub matcher: MatcherConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
  #[serde(default = "default_tau")]
  pub tau: f64,
  #[serde(default = "default_fuzzy_search")]
  pub fuzzy_search: bool,
  #[serde(default = "default_min_meaningful_matches")]
  pub min_meaningful_matches: usize,
  #[serde(default = "default_artist_bonus")]
  pub artist_bonus: f64,
}

impl Default for MatcherConfig {
  fn default() -> Self {
    MatcherConfig {
      tau: default_tau(),
      fuzzy_search: default_fuzzy_search(),
      min_meaningful_matches: default_min_meaningful_matches(),
      artist_bonus: default_artist_bonus(),
    }
  }
}

impl MatcherConfig {
  pub fn scorer(&self) -> ScorerConfig {
    ScorerConfig { min_meaningful_matches: self.min_meaningful_matches, artist_bonus: self.artist_bonus }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
  #[serde(default = "default_cache_ttl_seconds")]
  pub ttl_seconds: u64,
  #[serde(default = "default_cache_max_entries")]
  pub max_entries: usize,
}

impl Default for CacheConfig {
  fn default() -> Self {
    CacheConfig { ttl_seconds: default_cache_ttl_seconds(), max_entries: default_cache_max_entries() }
  }
}

impl Default for ResolverConfig {
  fn default() -> Self {
    ResolverConfig {
      library_root: None,
      playlists_folders_root: None,
      playlists_my_lists_root: None,
      catalog_path: default_catalog_path(),
      logs_dir: default_logs_dir(),
      matcher: MatcherConfig::default(),
      cache: CacheConfig::default(),
    }
  }
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config at {path}: {source}")]
  Io { path: PathBuf, source: std::io::Error },
  #[error("failed to parse config at {path}: {source}")]
  Parse { path: PathBuf, source: toml::de::Error },
}

impl ResolverConfig {
  /// Load `path` if it exists, otherwise return defaults. CLI flags take
  /// precedence over whatever this returns; see `setmend`'s resolution
  /// order (CLI > setmend.toml > defaults).
  pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
    if !path.exists() {
      return Ok(Self::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
  }
}

fn default_catalog_path() -> PathBuf {
  PathBuf::from("catalog.json")
}

fn default_logs_dir() -> PathBuf {
  PathBuf::from("logs")
}

fn default_tau() -> f64 {
  DEFAULT_TAU
}

fn default_fuzzy_search() -> bool {
  true
}

fn default_min_meaningful_matches() -> usize {
  1
}

fn default_artist_bonus() -> f64 {
  0.1
}

fn default_cache_ttl_seconds() -> u64 {
  600
}

fn default_cache_max_entries() -> usize {
  1000
}
