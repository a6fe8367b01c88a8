// AIDEV-NOTE: End-to-end scenarios covering six concrete repair cases,
// driven against a tempfile-backed directory tree.

use chrono::Utc;
use setmend::catalog::{CatalogStats, MediaCatalog, MediaRecord, MediaType};
use setmend::matcher::{match_query, MatchOptions, Stage};
use setmend::playlist::{PathSubstitution, PlaylistStore};
use setmend::rewriter::{rewrite_all, RewriteItem};
use setmend::text::{normalize, Profile};
use setmend::words::extract_words;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

async fn catalog_with(paths: &[&str]) -> MediaCatalog {
  let dir = tempdir().unwrap();
  let catalog = MediaCatalog::load(dir.path().join("catalog.json")).await.unwrap();
  let mut records = Vec::new();
  for p in paths {
    let path = Path::new(p);
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    let stem = path.file_stem().unwrap().to_string_lossy().into_owned();
    let bundle = extract_words(&name, path);
    records.push(MediaRecord {
      path: p.to_string(),
      name: name.clone(),
      stem: stem.clone(),
      normalized_name: normalize(&stem, Profile::FileName),
      extension: path.extension().unwrap().to_string_lossy().to_lowercase(),
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
    });
  }
  catalog.replace_all(records, CatalogStats::default()).await;
  catalog
}

#[tokio::test]
async fn scenario_1_exact_relocation() {
  let catalog = catalog_with(&["/Music/Pop/Tarkan - Yolla.mp3"]).await;
  let result =
    match_query(&catalog, &PathBuf::from("/Music/Pop/Tarkan - Yolla.mp3"), &MatchOptions::default()).await;
  assert_eq!(result.stage, Some(Stage::T1));
  assert_eq!(result.similarity, 1.0);
  assert_eq!(result.found_path.as_deref(), Some("/Music/Pop/Tarkan - Yolla.mp3"));
}

#[tokio::test]
async fn scenario_2_same_folder_new_extension() {
  let catalog = catalog_with(&["/Music/Pop/Tarkan - Yolla.m4a"]).await;
  let result =
    match_query(&catalog, &PathBuf::from("/Music/Pop/Tarkan - Yolla.mp3"), &MatchOptions::default()).await;
  assert_eq!(result.stage, Some(Stage::T2));
  assert_eq!(result.similarity, 0.9);
}

#[tokio::test]
async fn scenario_3_moved_file() {
  let catalog = catalog_with(&["/Archive/2023/Tarkan - Yolla.mp3"]).await;
  let result =
    match_query(&catalog, &PathBuf::from("/Music/Pop/Tarkan - Yolla.mp3"), &MatchOptions::default()).await;
  assert_eq!(result.stage, Some(Stage::T3));
  assert_eq!(result.similarity, 0.8);
}

#[tokio::test]
async fn scenario_4_fuzzy_hit() {
  let catalog = catalog_with(&["/Music/Classical/Çelik - Ateşteyim.mp3"]).await;
  let result = match_query(
    &catalog,
    &PathBuf::from("/Music/Çelik - Ateşteyim (10).mp3"),
    &MatchOptions::default(),
  )
  .await;
  assert_eq!(result.stage, Some(Stage::T5));
  assert!(result.similarity >= 0.75);
}

#[tokio::test]
async fn scenario_5_different_artists_reject_under_both_settings() {
  let catalog = catalog_with(&[
    "/Y/Dr. Alban - No Coke 2k24 (Dr. Luxe & DJ Finn & Lexy Key VIP Remix).mp3",
  ])
  .await;

  let lenient = MatchOptions::default();
  let lenient_result =
    match_query(&catalog, &PathBuf::from("/X/Dr. Alban - Away From Home.mp4"), &lenient).await;
  if lenient_result.found {
    assert!(lenient_result.similarity < 0.7);
  }

  let mut strict = MatchOptions::default();
  strict.scorer.min_meaningful_matches = 2;
  let strict_result =
    match_query(&catalog, &PathBuf::from("/X/Dr. Alban - Away From Home.mp4"), &strict).await;
  assert!(!strict_result.found || strict_result.similarity < 0.7);
}

#[test]
fn scenario_6_global_rewrite() {
  let dir = tempdir().unwrap();
  let a = dir.path().join("a.vdjfolder");
  let b = dir.path().join("b.vdjfolder");
  fs::write(&a, r#"<VirtualFolder><song path="/old/a.mp3"/></VirtualFolder>"#).unwrap();
  fs::write(&b, r#"<VirtualFolder><song path="/old/a.mp3"/></VirtualFolder>"#).unwrap();

  let store = PlaylistStore::new(dir.path(), dir.path());
  let items = vec![RewriteItem { old_path: "/old/a.mp3".to_string(), new_path: "/new/a.mp3".to_string() }];
  let report = rewrite_all(&store, &items, &dir.path().join("logs")).unwrap();

  assert_eq!(report.playlists_updated, 2);
  assert_eq!(report.songs_updated, 2);

  for path in [&a, &b] {
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("/new/a.mp3"));
    assert!(!contents.contains("/old/a.mp3"));
  }
}

#[test]
fn single_song_playlist_round_trips_through_update() {
  let dir = tempdir().unwrap();
  let path = dir.path().join("list.vdjfolder");
  fs::write(&path, r#"<VirtualFolder><song path="/a.mp3"/></VirtualFolder>"#).unwrap();

  let store = PlaylistStore::new(dir.path(), dir.path());
  let songs = store.read(&path).unwrap();
  assert_eq!(songs.len(), 1);

  let forward = vec![PathSubstitution { old_path: "/a.mp3".to_string(), new_path: "/b.mp3".to_string() }];
  store.update(&path, &forward).unwrap();
  let backward = vec![PathSubstitution { old_path: "/b.mp3".to_string(), new_path: "/a.mp3".to_string() }];
  store.update(&path, &backward).unwrap();

  let songs = store.read(&path).unwrap();
  assert_eq!(songs[0].path, "/a.mp3");
}
