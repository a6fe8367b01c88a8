// AIDEV-NOTE: Global Rewriter (C9)
// Tree-wide path substitution and deletion across every playlist.
// Grounded on the read/update pattern in
// examples/original_source/py/apiserver.py's playlist endpoints,
// generalized from "one playlist" to "every playlist under both roots".
// The path-normalization asymmetry is deliberate: update() is
// byte-exact, rewriter here normalizes.

use crate::error::Result;
use crate::playlist::{normalized_path_eq, parse_playlist, write_playlist, PlaylistStore};
use crate::runlog;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RewriteItem {
  pub old_path: String,
  pub new_path: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistChange {
  pub playlist_path: String,
  pub changes: Vec<SongChange>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongChange {
  pub old_path: String,
  pub new_path: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteReport {
  pub playlists_checked: usize,
  pub playlists_updated: usize,
  pub songs_updated: usize,
  pub updated_playlists: Vec<String>,
  pub log_file: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangeLedger {
  timestamp: DateTime<Utc>,
  summary: String,
  updated_playlists: Vec<String>,
  all_changes: Vec<PlaylistChange>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveReport {
  pub removed_from_playlists: Vec<String>,
  pub total_playlists_checked: usize,
  pub total_removed_count: usize,
}

/// Apply every `(oldPath, newPath)` substitution to every playlist under
/// both roots, writing a change ledger to `logs_dir`.
pub fn rewrite_all(store: &PlaylistStore, items: &[RewriteItem], logs_dir: &Path) -> Result<RewriteReport> {
  let playlists = store.walk();
  let mut playlists_updated = 0usize;
  let mut songs_updated = 0usize;
  let mut updated_playlists = Vec::new();
  let mut all_changes = Vec::new();

  for playlist_path in &playlists {
    let mut doc = match parse_playlist(playlist_path) {
      Ok(doc) => doc,
      Err(_) => continue,
    };

    let mut changes = Vec::new();
    for song in doc.song.iter_mut() {
      for item in items {
        if normalized_path_eq(&song.path, &item.old_path) {
          changes.push(SongChange { old_path: song.path.clone(), new_path: item.new_path.clone() });
          song.path = item.new_path.clone();
        }
      }
    }

    if !changes.is_empty() {
      write_playlist(playlist_path, &doc)?;
      playlists_updated += 1;
      songs_updated += changes.len();
      let playlist_path_str = playlist_path.to_string_lossy().into_owned();
      updated_playlists.push(playlist_path_str.clone());
      all_changes.push(PlaylistChange { playlist_path: playlist_path_str, changes });
    }
  }

  let ledger = ChangeLedger {
    timestamp: Utc::now(),
    summary: format!("{} playlists updated, {} songs updated", playlists_updated, songs_updated),
    updated_playlists: updated_playlists.clone(),
    all_changes,
  };
  let log_file = runlog::write_run_log(logs_dir, "global_update_log", &ledger)?;

  Ok(RewriteReport {
    playlists_checked: playlists.len(),
    playlists_updated,
    songs_updated,
    updated_playlists,
    log_file,
  })
}

/// Drop every song reference matching (after normalization) `song_path`
/// from every playlist under both roots. If a playlist ends up with no
/// songs, its `<song>` subtree is removed entirely (the list becomes
/// empty, which serializes without any `<song>` elements).
pub fn remove_from_all(store: &PlaylistStore, song_path: &str) -> Result<RemoveReport> {
  let playlists = store.walk();
  let mut removed_from_playlists = Vec::new();
  let mut total_removed_count = 0usize;

  for playlist_path in &playlists {
    let mut doc = match parse_playlist(playlist_path) {
      Ok(doc) => doc,
      Err(_) => continue,
    };

    let before = doc.song.len();
    doc.song.retain(|song| !normalized_path_eq(&song.path, song_path));
    let removed = before - doc.song.len();

    if removed > 0 {
      write_playlist(playlist_path, &doc)?;
      removed_from_playlists.push(playlist_path.to_string_lossy().into_owned());
      total_removed_count += removed;
    }
  }

  Ok(RemoveReport {
    removed_from_playlists,
    total_playlists_checked: playlists.len(),
    total_removed_count,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::tempdir;

  fn write_simple_playlist(path: &Path, song_paths: &[&str]) {
    let songs: String = song_paths.iter().map(|p| format!(r#"<song path="{}"/>"#, p)).collect();
    fs::write(path, format!(r#"<VirtualFolder>{}</VirtualFolder>"#, songs)).unwrap();
  }

  #[test]
  fn rewrite_all_updates_every_matching_playlist() {
    let dir = tempdir().unwrap();
    write_simple_playlist(&dir.path().join("a.vdjfolder"), &["/old/a.mp3"]);
    write_simple_playlist(&dir.path().join("b.vdjfolder"), &["/old/a.mp3"]);

    let store = PlaylistStore::new(dir.path(), dir.path());
    let items = vec![RewriteItem { old_path: "/old/a.mp3".to_string(), new_path: "/new/a.mp3".to_string() }];
    let report = rewrite_all(&store, &items, &dir.path().join("logs")).unwrap();

    assert_eq!(report.playlists_updated, 2);
    assert_eq!(report.songs_updated, 2);
    assert!(report.log_file.exists());

    for name in ["a.vdjfolder", "b.vdjfolder"] {
      let contents = fs::read_to_string(dir.path().join(name)).unwrap();
      assert!(contents.contains("/new/a.mp3"));
      assert!(!contents.contains("/old/a.mp3"));
    }
  }

  #[test]
  fn rewrite_all_matches_case_insensitively() {
    let dir = tempdir().unwrap();
    write_simple_playlist(&dir.path().join("a.vdjfolder"), &["/Old/A.mp3"]);

    let store = PlaylistStore::new(dir.path(), dir.path());
    let items = vec![RewriteItem { old_path: "/old/a.mp3".to_string(), new_path: "/new/a.mp3".to_string() }];
    let report = rewrite_all(&store, &items, &dir.path().join("logs")).unwrap();

    assert_eq!(report.songs_updated, 1);
  }

  #[test]
  fn remove_from_all_drops_matching_songs_and_leaves_others() {
    let dir = tempdir().unwrap();
    write_simple_playlist(&dir.path().join("a.vdjfolder"), &["/old/a.mp3", "/keep/b.mp3"]);

    let store = PlaylistStore::new(dir.path(), dir.path());
    let report = remove_from_all(&store, "/old/a.mp3").unwrap();

    assert_eq!(report.total_removed_count, 1);
    let contents = fs::read_to_string(dir.path().join("a.vdjfolder")).unwrap();
    assert!(!contents.contains("/old/a.mp3"));
    assert!(contents.contains("/keep/b.mp3"));
  }
}
