// AIDEV-NOTE: Word Extractor (C2)
// Builds the word buckets used by the tiered matcher and the fuzzy scorer.
// Grounded on extract_normalized_words() in
// examples/original_source/py/apiserver.py: folder parts, numeric-stem
// routing, and the stop-word filter all mirror that function.

use crate::text::{normalize, Profile};
use std::path::Path;

const STOP_WORDS: &[&str] = &[
  "remix", "mix", "dj", "feat", "ft", "music", "song", "mp3", "m4a", "flac", "wmv", "the", "a",
  "an", "and", "or", "of", "in", "on", "at", "to", "for", "with", "by", "official", "video",
  "hd", "version", "edit", "extended", "radio", "clean", "original", "acoustic", "live",
  "studio", "album", "single", "ep", "lp", "ve", "ile", "için", "olan", "gibi", "kadar", "sonra",
  "önce", "müzik", "şarkı", "parça", "mv", "clip", "trailer", "teaser", "preview", "behind",
  "scenes", "making", "of",
];

pub(crate) fn is_stop_word(w: &str) -> bool {
  STOP_WORDS.contains(&w)
}

/// The word buckets extracted from a single (name, path) pair. All fields
/// hold normalized, deduplication-free tokens in extraction order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordBundle {
  pub folder_words: Vec<String>,
  pub artist_words: Vec<String>,
  pub song_words: Vec<String>,
  pub file_words: Vec<String>,
  pub all_words: Vec<String>,
  pub meaningful_words: Vec<String>,
  pub meaningful_artist_words: Vec<String>,
  pub meaningful_song_words: Vec<String>,
}

/// Extract word buckets from a file `name` and its full file `path`
/// (including the file name itself — the parent directory is what
/// supplies the folder words).
pub fn extract_words(name: &str, path: &Path) -> WordBundle {
  let folder_words = relevant_folder_words(path);

  let stem = Path::new(name)
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_else(|| name.to_string());
  let parts: Vec<&str> = stem.split('-').collect();

  let (artist_segment, song_segment) = split_artist_title(&parts);

  let artist_words = tokenize_segment(&artist_segment);
  let song_words = tokenize_segment(&song_segment);

  let file_words = tokenize_segment(&stem);

  let mut all_words = folder_words.clone();
  all_words.extend(file_words.clone());

  let meaningful_words = filter_meaningful(&all_words);
  let meaningful_artist_words = filter_meaningful(&artist_words);
  let meaningful_song_words = filter_meaningful(&song_words);

  WordBundle {
    folder_words,
    artist_words,
    song_words,
    file_words,
    all_words,
    meaningful_words,
    meaningful_artist_words,
    meaningful_song_words,
  }
}

/// Part 1 of step 2: the numeric-stem-prefix routing rule. "01 - Artist -
/// Title" (>= 3 dash-separated parts, numeric first part) routes part 2 to
/// the artist segment and the rest to the title segment. Otherwise part 1
/// is the artist and everything after is the title.
fn split_artist_title<'a>(parts: &[&'a str]) -> (String, String) {
  if parts.is_empty() {
    return (String::new(), String::new());
  }

  let first_is_numeric = !parts[0].trim().is_empty() && parts[0].trim().chars().all(|c| c.is_ascii_digit());

  if first_is_numeric && parts.len() >= 3 {
    let artist = parts[1].to_string();
    let title = parts[2..].join("-");
    (artist, title)
  } else {
    let artist = parts[0].to_string();
    let title = if parts.len() > 1 { parts[1..].join("-") } else { String::new() };
    (artist, title)
  }
}

fn tokenize_segment(segment: &str) -> Vec<String> {
  segment
    .split_whitespace()
    .filter(|tok| tok.len() > 1)
    .map(|tok| normalize(tok, Profile::Word))
    .filter(|tok| !tok.is_empty())
    .collect()
}

/// The relevant folder: the last non-empty, non-`.`, non-root component
/// of `path`'s *parent* directory, tokenized the same way as a file
/// segment. `path` is the full file path, so the file name itself must
/// be stripped before walking components.
fn relevant_folder_words(path: &Path) -> Vec<String> {
  let last_component = path
    .parent()
    .into_iter()
    .flat_map(|parent| parent.components())
    .rev()
    .map(|c| c.as_os_str().to_string_lossy().into_owned())
    .find(|c| !c.is_empty() && c != "." && c != "/" && c != "\\");

  match last_component {
    Some(folder) => tokenize_segment(&folder),
    None => Vec::new(),
  }
}

fn filter_meaningful(words: &[String]) -> Vec<String> {
  words.iter().filter(|w| !is_stop_word(w)).cloned().collect()
}
