// AIDEV-NOTE: Indexer (C5)
// Recursive library scan building MediaRecords. Walk pattern grounded on
// scan_library_directory() in
// examples/jvegaf-harmony/src-tauri/src/libs/library_changes.rs; the
// per-record CPU work is fanned out with rayon the way
// analyze_audio_batch() in libs/audio_analysis.rs does.

use crate::catalog::{classify_extension, CatalogStats, IndexFileError, MediaCatalog, MediaRecord};
use crate::error::{Result, SetmendError};
use crate::text::{normalize, Profile};
use crate::words::extract_words;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexReport {
  pub total_files: usize,
  pub new_files: usize,
  pub duration_ms: u128,
  pub error_count: usize,
  pub error_details: Vec<IndexFileError>,
}

/// Recursively index `library_root` and replace the catalog's contents.
pub async fn build(catalog: &MediaCatalog, library_root: &Path) -> Result<IndexReport> {
  if !library_root.exists() {
    return Err(SetmendError::RootMissing(library_root.to_path_buf()));
  }

  let _index_guard = catalog.try_lock_for_index()?;

  let started = Instant::now();
  let previous_total = catalog.all().await.len();

  let candidates: Vec<PathBuf> = WalkDir::new(library_root)
    .follow_links(false)
    .into_iter()
    .filter_map(|entry| entry.ok())
    .filter(|entry| entry.file_type().is_file())
    .map(|entry| entry.into_path())
    .collect();

  let built: Vec<std::result::Result<Option<MediaRecord>, IndexFileError>> =
    candidates.par_iter().map(|path| build_record(path)).collect();

  let mut records = Vec::with_capacity(built.len());
  let mut errors = Vec::new();
  for outcome in built {
    match outcome {
      Ok(Some(record)) => records.push(record),
      Ok(None) => {}
      Err(e) => errors.push(e),
    }
  }

  records.sort_by(|a, b| a.path.cmp(&b.path));

  let stats = CatalogStats {
    total_files: records.len(),
    error_count: errors.len(),
    error_details: if errors.is_empty() { None } else { Some(errors.clone()) },
  };

  let total_files = records.len();
  catalog.replace_all(records, stats).await;
  catalog.save().await?;

  Ok(IndexReport {
    total_files,
    new_files: total_files.saturating_sub(previous_total),
    duration_ms: started.elapsed().as_millis(),
    error_count: errors.len(),
    error_details: errors,
  })
}

fn build_record(path: &Path) -> std::result::Result<Option<MediaRecord>, IndexFileError> {
  let to_err = |message: String| IndexFileError { path: path.to_string_lossy().into_owned(), message };

  let extension = path
    .extension()
    .map(|e| e.to_string_lossy().to_lowercase())
    .unwrap_or_default();

  let media_type = match classify_extension(&extension) {
    Some(t) => t,
    None => return Ok(None),
  };

  let metadata = std::fs::metadata(path).map_err(|e| to_err(e.to_string()))?;
  let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
  let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
  let normalized_name = normalize(&stem, Profile::FileName);
  let modified_time: DateTime<Utc> = metadata.modified().map_err(|e| to_err(e.to_string()))?.into();

  let bundle = extract_words(&name, path);
  let indexed_words = legacy_tokenize(&name, path);

  Ok(Some(MediaRecord {
    path: path.to_string_lossy().into_owned(),
    name,
    stem,
    normalized_name,
    extension,
    media_type,
    size: metadata.len(),
    modified_time,
    indexed_words,
    folder_words: bundle.folder_words,
    file_words: bundle.file_words,
    artist_words: bundle.artist_words,
    song_words: bundle.song_words,
    all_words: bundle.all_words,
    meaningful_words: bundle.meaningful_words,
    meaningful_artist_words: bundle.meaningful_artist_words,
    meaningful_song_words: bundle.meaningful_song_words,
  }))
}

/// The legacy tokenization: the last two parent-folder names plus
/// `stem.split('-')`, each piece tokenized and normalized. Kept separate
/// from the C2 word bundle because older callers still key on it.
fn legacy_tokenize(name: &str, path: &Path) -> Vec<String> {
  let mut parts: Vec<String> = Vec::new();

  let folder_names: Vec<String> = path
    .parent()
    .map(|parent| {
      parent
        .components()
        .rev()
        .take(2)
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect()
    })
    .unwrap_or_default();
  parts.extend(folder_names.into_iter().rev());

  let stem = Path::new(name).file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
  parts.extend(stem.split('-').map(|s| s.to_string()));

  parts
    .iter()
    .flat_map(|part| part.split_whitespace())
    .filter(|tok| tok.len() > 1)
    .map(|tok| normalize(tok, Profile::Word))
    .filter(|tok| !tok.is_empty())
    .collect()
}
