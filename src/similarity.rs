// AIDEV-NOTE: Similarity Scorer (C3)
// Weighted word-overlap score between two word bundles. Grounded on
// calculate_improved_similarity() in
// examples/original_source/py/test_improved_algorithm.py, the
// authoritative scoring algorithm (the older rapidfuzz-based variants
// in similarity_calculator.py are superseded).

use crate::words::{is_stop_word, WordBundle};

const LONG_WORD_BONUS: f64 = 0.2;
const TITLE_BONUS: f64 = 0.2;
const FULL_MATCH_BONUS: f64 = 0.15;
const FALLBACK_WEIGHT: f64 = 0.3;
const STOP_WORD_PENALTY_STEP: f64 = 0.05;
const STOP_WORD_PENALTY_CAP: f64 = 0.2;
const FULL_MATCH_THRESHOLD: usize = 3;
const LONG_WORD_LEN: usize = 4;
const BONUS_WORD_MIN_LEN: usize = 3;

/// Tunables for the scorer. `min_meaningful_matches` is the floor below
/// which a candidate scores 0 regardless of overlap; `artist_bonus` is the
/// weight applied when both bundles' first meaningful word matches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorerConfig {
  pub min_meaningful_matches: usize,
  pub artist_bonus: f64,
}

impl Default for ScorerConfig {
  fn default() -> Self {
    ScorerConfig { min_meaningful_matches: 1, artist_bonus: 0.1 }
  }
}

/// Score the similarity of `query` against `candidate`, in `[0, 1]`.
pub fn score(query: &WordBundle, candidate: &WordBundle, config: &ScorerConfig) -> f64 {
  if query.meaningful_words.is_empty() || candidate.meaningful_words.is_empty() {
    return fallback_score(&query.file_words, &candidate.file_words);
  }

  let m = count_shared(&query.meaningful_words, &candidate.meaningful_words);
  if m < config.min_meaningful_matches {
    return 0.0;
  }

  let denom = query.meaningful_words.len().max(candidate.meaningful_words.len()) as f64;
  let mut total = m as f64 / denom;

  let long_matches = query
    .meaningful_words
    .iter()
    .filter(|w| w.len() >= LONG_WORD_LEN && candidate.meaningful_words.contains(w))
    .count();
  total += (long_matches as f64 / denom) * LONG_WORD_BONUS;

  if let (Some(q0), Some(c0)) = (query.meaningful_words.first(), candidate.meaningful_words.first()) {
    if q0 == c0 && q0.len() >= BONUS_WORD_MIN_LEN {
      total += config.artist_bonus;
    }
  }

  if let (Some(q1), Some(c1)) = (query.meaningful_words.get(1), candidate.meaningful_words.get(1)) {
    if q1 == c1 && q1.len() >= BONUS_WORD_MIN_LEN {
      total += TITLE_BONUS;
    }
  }

  if m >= FULL_MATCH_THRESHOLD {
    total += FULL_MATCH_BONUS;
  }

  let shared_stop_words = query
    .file_words
    .iter()
    .filter(|w| candidate.file_words.contains(w) && is_stop_word(w))
    .count();
  if shared_stop_words > 0 {
    total -= (shared_stop_words as f64 * STOP_WORD_PENALTY_STEP).min(STOP_WORD_PENALTY_CAP);
  }

  total.clamp(0.0, 1.0)
}

fn fallback_score(a: &[String], b: &[String]) -> f64 {
  if a.is_empty() || b.is_empty() {
    return 0.0;
  }
  let matches = count_shared(a, b);
  (matches as f64 / a.len().max(b.len()) as f64) * FALLBACK_WEIGHT
}

fn count_shared(a: &[String], b: &[String]) -> usize {
  a.iter().filter(|w| b.contains(w)).count()
}

/// Tie-break key for ranking candidates: `(score, file-word overlap)`,
/// both descending.
pub fn tie_break_key(query: &WordBundle, candidate: &WordBundle, s: f64) -> (f64, usize) {
  (s, count_shared(&query.file_words, &candidate.file_words))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::words::extract_words;
  use std::path::Path;

  fn bundle(name: &str) -> WordBundle {
    extract_words(name, &Path::new("/music").join(name))
  }

  #[test]
  fn identical_titles_same_artist_score_high() {
    let a = bundle("Çelik - Ateşteyim (10).mp3");
    let b = bundle("Çelik - Ateşteyim.mp3");
    let s = score(&a, &b, &ScorerConfig::default());
    assert!(s >= 0.85, "expected high score, got {}", s);
  }

  #[test]
  fn same_artist_different_song_scores_low() {
    let a = bundle("Tarkan - Gül Döktüm Yollarina (1).m4a");
    let b = bundle("Tarkan - Yolla (Pop Orient Mix).m4a");
    let s = score(&a, &b, &ScorerConfig::default());
    assert!(s < 0.5, "expected low score, got {}", s);
  }

  #[test]
  fn completely_different_tracks_score_zero_or_near_zero() {
    let a = bundle("Dr. Alban - Away From Home (2).mp4");
    let b = bundle(
      "Dr. Alban - No Coke 2k24 (Dr. Luxe & DJ Finn & Lexy Key VIP Remix) www.clubberism.com.mp3",
    );
    let s = score(&a, &b, &ScorerConfig::default());
    assert!(s < 0.5, "expected low score, got {}", s);
  }

  #[test]
  fn empty_meaningful_words_falls_back_to_file_word_overlap() {
    let a = bundle("The.mp3");
    let b = bundle("The.flac");
    let s = score(&a, &b, &ScorerConfig::default());
    assert!((0.0..=1.0).contains(&s));
  }

  #[test]
  fn below_min_meaningful_matches_scores_zero() {
    let mut config = ScorerConfig::default();
    config.min_meaningful_matches = 5;
    let a = bundle("Tarkan - Yolla.mp3");
    let b = bundle("Tarkan - Yolla.flac");
    assert_eq!(score(&a, &b, &config), 0.0);
  }
}
