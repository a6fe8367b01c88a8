// AIDEV-NOTE: Media Catalog (C4)
// Persisted + in-memory media record set with four secondary indexes.
// Grounded on Database in examples/jvegaf-harmony/src-tauri/src/libs/database.rs
// for the lock shape (data lock + file lock) though the storage itself is a
// single JSON document, matching apiserver.py's catalog persistence.

use crate::error::{Result, SetmendError};
use crate::text::{normalize, Profile};
use crate::words::WordBundle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::RwLock;

pub const AUDIO_EXTENSIONS: &[&str] = &[
  "mp3", "wav", "cda", "wma", "asf", "ogg", "m4a", "aac", "aif", "aiff", "flac", "mpc", "ape",
  "weba", "opus",
];
pub const VIDEO_EXTENSIONS: &[&str] = &[
  "mp4", "ogm", "ogv", "avi", "mpg", "mpeg", "wmv", "vob", "mov", "divx", "m4v", "mkv", "flv",
  "webm",
];
pub const DJ_PROJECT_EXTENSIONS: &[&str] = &["vdj", "vdjcache", "vdjedit", "vdjsample", "vdjcachev"];
pub const IMAGE_EXTENSIONS: &[&str] = &["apng"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MediaType {
  Audio,
  Video,
  DjProject,
  Image,
  Unknown,
}

/// Classify a lowercase, no-dot extension against the canonical table.
/// Returns `None` for unsupported extensions (such records are not admitted).
pub fn classify_extension(ext: &str) -> Option<MediaType> {
  let ext = ext.to_lowercase();
  if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
    Some(MediaType::Audio)
  } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
    Some(MediaType::Video)
  } else if DJ_PROJECT_EXTENSIONS.contains(&ext.as_str()) {
    Some(MediaType::DjProject)
  } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
    Some(MediaType::Image)
  } else {
    None
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
  pub path: String,
  pub name: String,
  pub stem: String,
  pub normalized_name: String,
  pub extension: String,
  pub media_type: MediaType,
  pub size: u64,
  pub modified_time: DateTime<Utc>,
  pub indexed_words: Vec<String>,
  pub folder_words: Vec<String>,
  pub file_words: Vec<String>,
  pub artist_words: Vec<String>,
  pub song_words: Vec<String>,
  pub all_words: Vec<String>,
  pub meaningful_words: Vec<String>,
  pub meaningful_artist_words: Vec<String>,
  pub meaningful_song_words: Vec<String>,
}

impl MediaRecord {
  pub fn word_bundle(&self) -> WordBundle {
    WordBundle {
      folder_words: self.folder_words.clone(),
      artist_words: self.artist_words.clone(),
      song_words: self.song_words.clone(),
      file_words: self.file_words.clone(),
      all_words: self.all_words.clone(),
      meaningful_words: self.meaningful_words.clone(),
      meaningful_artist_words: self.meaningful_artist_words.clone(),
      meaningful_song_words: self.meaningful_song_words.clone(),
    }
  }

  pub fn normalized_dir(&self) -> String {
    normalized_dir_of(Path::new(&self.path))
  }
}

/// C1("path") applied to the parent directory of `path`. Used both to
/// populate `byNormalizedDir` and to evaluate T2.
pub fn normalized_dir_of(path: &Path) -> String {
  match path.parent() {
    Some(parent) => normalize(&parent.to_string_lossy(), Profile::Path),
    None => String::new(),
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
  pub total_files: usize,
  pub error_count: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error_details: Option<Vec<IndexFileError>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexFileError {
  pub path: String,
  pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
  pub version: u32,
  pub last_update: DateTime<Utc>,
  pub encoding: String,
  pub music_files: Vec<MediaRecord>,
  pub stats: CatalogStats,
}

impl Default for CatalogDocument {
  fn default() -> Self {
    CatalogDocument {
      version: 1,
      last_update: Utc::now(),
      encoding: "utf-8".to_string(),
      music_files: Vec::new(),
      stats: CatalogStats::default(),
    }
  }
}

#[derive(Default)]
struct Indexes {
  by_path: HashMap<String, usize>,
  by_stem: HashMap<String, Vec<usize>>,
  by_normalized_name: HashMap<String, Vec<usize>>,
  by_normalized_dir: HashMap<String, Vec<usize>>,
}

impl Indexes {
  fn rebuild(records: &[MediaRecord]) -> Self {
    let mut idx = Indexes::default();
    for (i, r) in records.iter().enumerate() {
      idx.by_path.insert(r.path.clone(), i);
      idx.by_stem.entry(r.stem.clone()).or_default().push(i);
      idx.by_normalized_name.entry(r.normalized_name.clone()).or_default().push(i);
      idx.by_normalized_dir.entry(r.normalized_dir()).or_default().push(i);
    }
    idx
  }
}

struct CatalogState {
  document: CatalogDocument,
  indexes: Indexes,
}

/// The in-memory + persisted media catalog. A data lock guards
/// `musicFiles`/indexes; a separate file lock serializes JSON I/O, the
/// same data-access/backing-store split as a `Mutex<Connection>`.
pub struct MediaCatalog {
  path: PathBuf,
  state: RwLock<CatalogState>,
  file_lock: Mutex<()>,
  index_lock: tokio::sync::Mutex<()>,
}

impl MediaCatalog {
  /// Load the catalog at `path`, creating an empty document if absent.
  pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
    let path = path.into();
    let document = read_document(&path)?;
    let indexes = Indexes::rebuild(&document.music_files);
    Ok(MediaCatalog {
      path,
      state: RwLock::new(CatalogState { document, indexes }),
      file_lock: Mutex::new(()),
      index_lock: tokio::sync::Mutex::new(()),
    })
  }

  /// Acquire the index-build guard, failing fast with `IndexBusy` if a
  /// build is already in progress rather than queuing behind it.
  pub(crate) fn try_lock_for_index(&self) -> Result<tokio::sync::MutexGuard<'_, ()>> {
    self.index_lock.try_lock().map_err(|_| SetmendError::IndexBusy)
  }

  /// Serialize the current document to disk, refreshing `lastUpdate`, then
  /// rebuild indexes.
  pub async fn save(&self) -> Result<()> {
    let mut guard = self.state.write().await;
    guard.document.last_update = Utc::now();
    guard.indexes = Indexes::rebuild(&guard.document.music_files);
    let serialized = serde_json::to_vec_pretty(&guard.document)?;
    drop(guard);

    let _file_guard = self.file_lock.lock().unwrap();
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&self.path, serialized)?;
    Ok(())
  }

  /// Atomic swap of `musicFiles` with index rebuild.
  pub async fn replace_all(&self, records: Vec<MediaRecord>, stats: CatalogStats) {
    let mut guard = self.state.write().await;
    guard.indexes = Indexes::rebuild(&records);
    guard.document.music_files = records;
    guard.document.stats = stats;
  }

  pub async fn get_by_path(&self, path: &str) -> Option<MediaRecord> {
    let guard = self.state.read().await;
    guard.indexes.by_path.get(path).map(|&i| guard.document.music_files[i].clone())
  }

  pub async fn get_by_stem(&self, stem: &str) -> Vec<MediaRecord> {
    self.collect(|idx| idx.by_stem.get(stem)).await
  }

  pub async fn get_by_normalized_name(&self, normalized_name: &str) -> Vec<MediaRecord> {
    self.collect(|idx| idx.by_normalized_name.get(normalized_name)).await
  }

  pub async fn get_by_normalized_dir(&self, normalized_dir: &str) -> Vec<MediaRecord> {
    self.collect(|idx| idx.by_normalized_dir.get(normalized_dir)).await
  }

  async fn collect(&self, f: impl Fn(&Indexes) -> Option<&Vec<usize>>) -> Vec<MediaRecord> {
    let guard = self.state.read().await;
    match f(&guard.indexes) {
      Some(idxs) => idxs.iter().map(|&i| guard.document.music_files[i].clone()).collect(),
      None => Vec::new(),
    }
  }

  pub async fn all(&self) -> Vec<MediaRecord> {
    self.state.read().await.document.music_files.clone()
  }

  pub async fn stats(&self) -> CatalogStats {
    self.state.read().await.document.stats.clone()
  }

  pub async fn last_update(&self) -> DateTime<Utc> {
    self.state.read().await.document.last_update
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

fn read_document(path: &Path) -> Result<CatalogDocument> {
  if !path.exists() {
    return Ok(CatalogDocument::default());
  }
  let contents = std::fs::read_to_string(path)?;
  serde_json::from_str(&contents).map_err(|e| SetmendError::CatalogCorrupt(e.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn sample_record(path: &str) -> MediaRecord {
    let p = Path::new(path);
    let name = p.file_name().unwrap().to_string_lossy().into_owned();
    let stem = p.file_stem().unwrap().to_string_lossy().into_owned();
    MediaRecord {
      path: path.to_string(),
      name: name.clone(),
      stem: stem.clone(),
      normalized_name: normalize(&stem, Profile::FileName),
      extension: "mp3".to_string(),
      media_type: MediaType::Audio,
      size: 0,
      modified_time: Utc::now(),
      indexed_words: vec![],
      folder_words: vec![],
      file_words: vec![],
      artist_words: vec![],
      song_words: vec![],
      all_words: vec![],
      meaningful_words: vec![],
      meaningful_artist_words: vec![],
      meaningful_song_words: vec![],
    }
  }

  #[tokio::test]
  async fn indexes_stay_consistent_after_replace_all() {
    let dir = tempdir().unwrap();
    let catalog = MediaCatalog::load(dir.path().join("catalog.json")).await.unwrap();
    let record = sample_record("/music/Pop/Tarkan - Yolla.mp3");
    catalog.replace_all(vec![record.clone()], CatalogStats::default()).await;

    assert!(catalog.get_by_path(&record.path).await.is_some());
    assert_eq!(catalog.get_by_stem(&record.stem).await.len(), 1);
    assert_eq!(catalog.get_by_normalized_name(&record.normalized_name).await.len(), 1);
    assert_eq!(catalog.get_by_normalized_dir(&record.normalized_dir()).await.len(), 1);
  }

  #[tokio::test]
  async fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    let catalog = MediaCatalog::load(&path).await.unwrap();
    let record = sample_record("/music/Pop/Tarkan - Yolla.mp3");
    catalog.replace_all(vec![record.clone()], CatalogStats::default()).await;
    catalog.save().await.unwrap();

    let reloaded = MediaCatalog::load(&path).await.unwrap();
    let all = reloaded.all().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].path, record.path);
  }

  #[test]
  fn extension_table_classifies_known_formats() {
    assert_eq!(classify_extension("mp3"), Some(MediaType::Audio));
    assert_eq!(classify_extension("MKV"), Some(MediaType::Video));
    assert_eq!(classify_extension("vdj"), Some(MediaType::DjProject));
    assert_eq!(classify_extension("apng"), Some(MediaType::Image));
    assert_eq!(classify_extension("txt"), None);
  }

  #[tokio::test]
  async fn missing_catalog_file_loads_as_empty() {
    let dir = tempdir().unwrap();
    let catalog = MediaCatalog::load(dir.path().join("missing.json")).await.unwrap();
    assert!(catalog.all().await.is_empty());
  }
}
