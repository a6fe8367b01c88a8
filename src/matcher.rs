// AIDEV-NOTE: Tiered Matcher (C6)
// Five-stage cascade, first match wins. Stage order and semantics mirror
// search_single_file() in examples/original_source/py/apiserver.py
// (tamYolEsleme/ayniKlasorFarkliUzanti/farkliKlasor/farkliKlasorveUzanti/benzerDosya).

use crate::catalog::{normalized_dir_of, MediaCatalog, MediaRecord};
use crate::similarity::{score, tie_break_key, ScorerConfig};
use crate::text::{normalize, Profile};
use crate::words::extract_words;
use std::path::Path;

pub const DEFAULT_TAU: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stage {
  T1,
  T2,
  T3,
  T4,
  T5,
}

impl Stage {
  pub fn label(self) -> &'static str {
    match self {
      Stage::T1 => "exact path",
      Stage::T2 => "same dir, different extension",
      Stage::T3 => "different dir, same stem",
      Stage::T4 => "different dir and extension",
      Stage::T5 => "fuzzy",
    }
  }
}

#[derive(Debug, Clone)]
pub struct MatchOptions {
  pub fuzzy_search: bool,
  pub tau: f64,
  pub scorer: ScorerConfig,
}

impl Default for MatchOptions {
  fn default() -> Self {
    MatchOptions { fuzzy_search: true, tau: DEFAULT_TAU, scorer: ScorerConfig::default() }
  }
}

#[derive(Debug, Clone)]
pub struct MatchResult {
  pub query_path: String,
  pub found: bool,
  pub found_path: Option<String>,
  pub similarity: f64,
  pub stage: Option<Stage>,
}

/// Run the T1-T5 cascade for `query_path` against `catalog`.
pub async fn match_query(catalog: &MediaCatalog, query_path: &Path, options: &MatchOptions) -> MatchResult {
  let query_str = query_path.to_string_lossy().into_owned();

  // T1: exact path.
  if let Some(record) = catalog.get_by_path(&query_str).await {
    return hit(&query_str, &record, 1.0, Stage::T1);
  }

  let query_stem = query_path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
  let query_normalized_dir = normalized_dir_of(query_path);
  let query_file_name_norm = normalize(&query_stem, Profile::FileName);

  // T2: same normalized dir, same normalized file-name stem (different extension).
  let dir_candidates = catalog.get_by_normalized_dir(&query_normalized_dir).await;
  if let Some(record) = first_stable(dir_candidates.into_iter().filter(|r| {
    normalize(&r.stem, Profile::FileName) == query_file_name_norm
  })) {
    return hit(&query_str, &record, 0.90, Stage::T2);
  }

  // T3: different dir, same stem.
  let stem_candidates = catalog.get_by_stem(&query_stem).await;
  if let Some(record) = first_stable(stem_candidates.into_iter()) {
    return hit(&query_str, &record, 0.80, Stage::T3);
  }

  // T4: different dir and extension, matched via normalized ("word") name.
  let query_word_norm = normalize(&query_stem, Profile::Word);
  let normalized_name_candidates = catalog.get_by_normalized_name(&query_word_norm).await;
  if let Some(record) = first_stable(normalized_name_candidates.into_iter()) {
    return hit(&query_str, &record, 1.0, Stage::T4);
  }

  if !options.fuzzy_search {
    return miss(&query_str);
  }

  // T5: fuzzy word-overlap scoring over the whole catalog.
  let query_bundle = extract_words(
    &query_path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
    query_path,
  );

  let all = catalog.all().await;
  let mut best: Option<(MediaRecord, f64, usize)> = None;
  for record in all {
    let candidate_bundle = record.word_bundle();
    let s = score(&query_bundle, &candidate_bundle, &options.scorer);
    if s <= options.tau {
      continue;
    }
    let key = tie_break_key(&query_bundle, &candidate_bundle, s);
    match &best {
      Some((_, best_score, best_overlap)) if (*best_score, *best_overlap) >= key => {}
      _ => best = Some((record, key.0, key.1)),
    }
  }

  match best {
    Some((record, s, _)) => hit(&query_str, &record, s, Stage::T5),
    None => miss(&query_str),
  }
}

/// Deterministic choice among multiple bucket hits: stable sort on `path`,
/// take the first.
fn first_stable(records: impl Iterator<Item = MediaRecord>) -> Option<MediaRecord> {
  let mut records: Vec<MediaRecord> = records.collect();
  records.sort_by(|a, b| a.path.cmp(&b.path));
  records.into_iter().next()
}

fn hit(query_path: &str, record: &MediaRecord, similarity: f64, stage: Stage) -> MatchResult {
  MatchResult {
    query_path: query_path.to_string(),
    found: true,
    found_path: Some(record.path.clone()),
    similarity,
    stage: Some(stage),
  }
}

fn miss(query_path: &str) -> MatchResult {
  MatchResult { query_path: query_path.to_string(), found: false, found_path: None, similarity: 0.0, stage: None }
}
