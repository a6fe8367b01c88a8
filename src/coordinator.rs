// AIDEV-NOTE: Resolver Coordinator (C8)
// Fans queries out across the tiered matcher, aggregates per-stage stats,
// caches responses, and emits a JSON run log. Per-query fan-out mirrors
// analyze_audio_batch() in
// examples/jvegaf-harmony/src-tauri/src/libs/audio_analysis.rs, adapted to
// tokio tasks since each query awaits catalog reads rather than doing pure
// CPU work end-to-end.

use crate::catalog::MediaCatalog;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::matcher::{match_query, MatchOptions, Stage};
use crate::playlist::PlaylistStore;
use crate::runlog;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

const CACHE_EVICT_FRACTION: f64 = 0.2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
  #[serde(default = "default_fuzzy_search")]
  pub fuzzy_search: bool,
}

impl Default for SearchOptions {
  fn default() -> Self {
    SearchOptions { fuzzy_search: default_fuzzy_search() }
  }
}

fn default_fuzzy_search() -> bool {
  true
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
  pub query_path: String,
  pub status: String,
  pub found: bool,
  pub found_path: Option<String>,
  pub similarity: f64,
  pub match_type: Option<Stage>,
  pub duration_ms: u128,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StageStat {
  pub count: usize,
  pub cumulative_ms: u128,
  pub algorithm_label: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
  pub per_stage: HashMap<String, StageStat>,
  pub total_ms: u128,
  pub mean_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchManyResult {
  pub results: Vec<QueryResult>,
  pub stats: SearchStats,
}

struct CacheEntry {
  timestamp: DateTime<Utc>,
  response: SearchManyResult,
}

/// Dispatches searches through C6 and owns the result cache and run-log
/// sink. Constructed once and threaded through the CLI/process rather
/// than held behind a process-wide global.
pub struct ResolverCoordinator {
  catalog: Arc<MediaCatalog>,
  logs_dir: PathBuf,
  cache: Mutex<HashMap<String, CacheEntry>>,
  cache_config: CacheConfig,
}

impl ResolverCoordinator {
  pub fn new(catalog: Arc<MediaCatalog>, logs_dir: impl Into<PathBuf>, cache_config: CacheConfig) -> Self {
    ResolverCoordinator { catalog, logs_dir: logs_dir.into(), cache: Mutex::new(HashMap::new()), cache_config }
  }

  /// Dispatch every query in `paths` through C6 in parallel and aggregate
  /// per-stage statistics.
  pub async fn search_many(
    &self,
    paths: &[PathBuf],
    options: &SearchOptions,
    match_options: &MatchOptions,
  ) -> Result<SearchManyResult> {
    let cache_key = cache_key_for(paths);

    if let Some(cached) = self.lookup_cache(&cache_key).await {
      return Ok(cached);
    }

    let started = Instant::now();
    let mut tasks = Vec::with_capacity(paths.len());
    for path in paths {
      let catalog = Arc::clone(&self.catalog);
      let path = path.clone();
      let match_options = match_options.clone();
      tasks.push(tokio::spawn(async move {
        let query_started = Instant::now();
        let result = match_query(&catalog, &path, &match_options).await;
        (result, query_started.elapsed().as_millis())
      }));
    }

    let mut results = Vec::with_capacity(tasks.len());
    let mut per_stage: HashMap<String, StageStat> = HashMap::new();
    for task in tasks {
      match task.await {
        Ok((m, duration_ms)) => {
          if let Some(stage) = m.stage {
            let entry = per_stage.entry(stage_key(stage)).or_insert_with(|| StageStat {
              count: 0,
              cumulative_ms: 0,
              algorithm_label: stage.label().to_string(),
            });
            entry.count += 1;
            entry.cumulative_ms += duration_ms;
          }
          results.push(QueryResult {
            query_path: m.query_path,
            status: "ok".to_string(),
            found: m.found,
            found_path: m.found_path,
            similarity: m.similarity,
            match_type: m.stage,
            duration_ms,
          });
        }
        Err(e) => {
          results.push(QueryResult {
            query_path: String::new(),
            status: format!("error: {}", e),
            found: false,
            found_path: None,
            similarity: 0.0,
            match_type: None,
            duration_ms: 0,
          });
        }
      }
    }

    let total_ms = started.elapsed().as_millis();
    let mean_ms = if results.is_empty() { 0.0 } else { total_ms as f64 / results.len() as f64 };

    let response = SearchManyResult { results, stats: SearchStats { per_stage, total_ms, mean_ms } };

    self.insert_cache(cache_key, response.clone()).await;
    self.write_log(paths, options, &response)?;

    Ok(response)
  }

  async fn lookup_cache(&self, key: &str) -> Option<SearchManyResult> {
    let cache = self.cache.lock().await;
    let entry = cache.get(key)?;
    let age = Utc::now().signed_duration_since(entry.timestamp);
    if age.num_seconds() > self.cache_config.ttl_seconds as i64 {
      return None;
    }
    Some(entry.response.clone())
  }

  async fn insert_cache(&self, key: String, response: SearchManyResult) {
    let mut cache = self.cache.lock().await;
    cache.insert(key, CacheEntry { timestamp: Utc::now(), response });

    if cache.len() > self.cache_config.max_entries {
      let evict_count = (cache.len() as f64 * CACHE_EVICT_FRACTION).ceil() as usize;
      let mut by_age: Vec<(String, DateTime<Utc>)> =
        cache.iter().map(|(k, v)| (k.clone(), v.timestamp)).collect();
      by_age.sort_by_key(|(_, ts)| *ts);
      for (stale_key, _) in by_age.into_iter().take(evict_count) {
        cache.remove(&stale_key);
      }
    }
  }

  fn write_log(&self, paths: &[PathBuf], options: &SearchOptions, response: &SearchManyResult) -> Result<()> {
    let envelope = serde_json::json!({
      "request": { "paths": paths, "options": options },
      "response": response,
    });
    runlog::write_run_log(&self.logs_dir, "search_files_log", &envelope)?;
    Ok(())
  }
}

fn stage_key(stage: Stage) -> String {
  format!("{:?}", stage)
}

fn cache_key_for(paths: &[PathBuf]) -> String {
  let mut sorted: Vec<String> = paths.iter().map(|p| p.to_string_lossy().into_owned()).collect();
  sorted.sort();
  let mut hasher = Sha256::new();
  for p in &sorted {
    hasher.update(p.as_bytes());
    hasher.update([0u8]);
  }
  format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingEntry {
  pub original_path: String,
  pub playlist_name: String,
  pub playlist_path: String,
  pub found: bool,
  pub found_path: Option<String>,
  pub similarity: f64,
  pub match_type: Option<Stage>,
}

/// For every distinct missing reference anywhere in the playlist tree, run
/// C6 with T5 enabled and report the best candidate.
pub async fn list_missing_global(catalog: &MediaCatalog, store: &PlaylistStore) -> Result<Vec<MissingEntry>> {
  let match_options = MatchOptions::default();
  let mut seen = HashSet::new();
  let mut out = Vec::new();

  for playlist_path in store.walk() {
    let songs = match store.read(&playlist_path) {
      Ok(songs) => songs,
      Err(_) => continue,
    };
    let playlist_name = playlist_path
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_default();

    for song in songs {
      if song.exists || !seen.insert(song.path.clone()) {
        continue;
      }

      let result = match_query(catalog, Path::new(&song.path), &match_options).await;
      out.push(MissingEntry {
        original_path: song.path,
        playlist_name: playlist_name.clone(),
        playlist_path: playlist_path.to_string_lossy().into_owned(),
        found: result.found,
        found_path: result.found_path,
        similarity: result.similarity,
        match_type: result.stage,
      });
    }
  }

  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::{CatalogStats, MediaType};
  use crate::text::{normalize, Profile};
  use crate::words::extract_words;
  use tempfile::tempdir;

  async fn catalog_with_one_track(dir: &Path) -> MediaCatalog {
    let catalog = MediaCatalog::load(dir.join("catalog.json")).await.unwrap();
    let path = Path::new("/Music/Pop/Tarkan - Yolla.mp3");
    let name = "Tarkan - Yolla.mp3";
    let bundle = extract_words(name, path);
    catalog
      .replace_all(
        vec![crate::catalog::MediaRecord {
          path: path.to_string_lossy().into_owned(),
          name: name.to_string(),
          stem: "Tarkan - Yolla".to_string(),
          normalized_name: normalize("Tarkan - Yolla", Profile::FileName),
          extension: "mp3".to_string(),
          media_type: MediaType::Audio,
          size: 0,
          modified_time: Utc::now(),
          indexed_words: vec![],
          folder_words: bundle.folder_words,
          file_words: bundle.file_words,
          artist_words: bundle.artist_words,
          song_words: bundle.song_words,
          all_words: bundle.all_words,
          meaningful_words: bundle.meaningful_words,
          meaningful_artist_words: bundle.meaningful_artist_words,
          meaningful_song_words: bundle.meaningful_song_words,
        }],
        CatalogStats::default(),
      )
      .await;
    catalog
  }

  #[tokio::test]
  async fn search_many_preserves_input_order_and_logs_a_run() {
    let dir = tempdir().unwrap();
    let catalog = Arc::new(catalog_with_one_track(dir.path()).await);
    let coordinator = ResolverCoordinator::new(catalog, dir.path().join("logs"), CacheConfig::default());

    let queries = vec![
      PathBuf::from("/Music/Pop/Tarkan - Yolla.mp3"),
      PathBuf::from("/Music/Pop/Unknown - Track.mp3"),
    ];

    let result = coordinator
      .search_many(&queries, &SearchOptions::default(), &MatchOptions::default())
      .await
      .unwrap();

    assert_eq!(result.results.len(), 2);
    assert_eq!(result.results[0].query_path, queries[0].to_string_lossy());
    assert_eq!(result.results[1].query_path, queries[1].to_string_lossy());
    assert!(result.results[0].found);

    let logs_dir = dir.path().join("logs");
    assert!(logs_dir.read_dir().unwrap().next().is_some());
  }

  #[tokio::test]
  async fn repeated_query_set_hits_the_cache() {
    let dir = tempdir().unwrap();
    let catalog = Arc::new(catalog_with_one_track(dir.path()).await);
    let coordinator = ResolverCoordinator::new(catalog, dir.path().join("logs"), CacheConfig::default());
    let queries = vec![PathBuf::from("/Music/Pop/Tarkan - Yolla.mp3")];

    let first = coordinator
      .search_many(&queries, &SearchOptions::default(), &MatchOptions::default())
      .await
      .unwrap();
    let second = coordinator
      .search_many(&queries, &SearchOptions::default(), &MatchOptions::default())
      .await
      .unwrap();

    assert_eq!(first.results[0].found_path, second.results[0].found_path);

    let log_count = dir.path().join("logs").read_dir().unwrap().count();
    assert_eq!(log_count, 1, "second call should have served from cache without logging again");
  }

  #[tokio::test]
  async fn list_missing_global_reports_dangling_references() {
    let dir = tempdir().unwrap();
    let catalog = catalog_with_one_track(dir.path()).await;

    let playlists_dir = dir.path().join("Folders");
    std::fs::create_dir_all(&playlists_dir).unwrap();
    std::fs::write(
      playlists_dir.join("list.vdjfolder"),
      r#"<VirtualFolder><song path="/Music/Pop/Tarkan - Yolla.m4a"/></VirtualFolder>"#,
    )
    .unwrap();

    let store = crate::playlist::PlaylistStore::new(&playlists_dir, &playlists_dir);
    let entries = list_missing_global(&catalog, &store).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].original_path, "/Music/Pop/Tarkan - Yolla.m4a");
    assert!(entries[0].found);
  }
}
