// AIDEV-NOTE: Playlist Store (C7)
// Reads and rewrites VirtualDJ .vdjfolder playlists. XML layer grounded on
// examples/jvegaf-harmony/src-tauri/src/libs/traktor/nml_parser.rs
// (quick-xml + serde, @-attribute rename convention); tree-walking rules
// grounded on the playlist listing logic in
// examples/original_source/py/apiserver.py and
// json_playlist_repository.py.

use crate::error::{Result, SetmendError};
use quick_xml::de::from_str;
use quick_xml::se::to_string;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SUBFOLDERS_SUFFIX: &str = ".subfolders";
const PLAYLIST_SUFFIX: &str = ".vdjfolder";
const EXCLUDED_SUBFOLDER: &str = "My Library.subfolders";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename = "song")]
pub(crate) struct SongXml {
  #[serde(rename = "@path")]
  pub(crate) path: String,
  #[serde(flatten)]
  pub(crate) extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename = "VirtualFolder")]
pub(crate) struct VirtualFolderXml {
  #[serde(rename = "song", default)]
  pub(crate) song: Vec<SongXml>,
}

/// A single song reference as read from a playlist, with filesystem
/// existence stamped at read time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongReference {
  pub path: String,
  pub exists: bool,
}

/// `(old_path, new_path)` substitution request for `update`/`rewrite_all`.
#[derive(Debug, Clone)]
pub struct PathSubstitution {
  pub old_path: String,
  pub new_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistNodeKind {
  Folder,
  Playlist,
}

#[derive(Debug, Clone)]
pub struct PlaylistNode {
  pub id: String,
  pub name: String,
  pub path: PathBuf,
  pub kind: PlaylistNodeKind,
  pub children: Vec<PlaylistNode>,
}

/// The dual-rooted tree: "Folders" and "MyLists".
pub struct PlaylistTree {
  pub folders: Option<PlaylistNode>,
  pub my_lists: Option<PlaylistNode>,
}

pub struct PlaylistStore {
  pub folders_root: PathBuf,
  pub my_lists_root: PathBuf,
}

impl PlaylistStore {
  pub fn new(folders_root: impl Into<PathBuf>, my_lists_root: impl Into<PathBuf>) -> Self {
    PlaylistStore { folders_root: folders_root.into(), my_lists_root: my_lists_root.into() }
  }

  /// Build the dual-rooted Folder/Playlist tree. Under `Folders`, a plain
  /// subdirectory is not admitted as a folder node unless it carries the
  /// `.subfolders` suffix; under `MyLists` every subdirectory is admitted.
  pub fn tree(&self) -> PlaylistTree {
    PlaylistTree {
      folders: build_node(&self.folders_root, "Folders", false),
      my_lists: build_node(&self.my_lists_root, "MyLists", true),
    }
  }

  /// Parse a `.vdjfolder` playlist, stamping filesystem existence per song.
  pub fn read(&self, playlist_path: &Path) -> Result<Vec<SongReference>> {
    let doc = parse_playlist(playlist_path)?;
    Ok(
      doc
        .song
        .into_iter()
        .map(|s| {
          let exists = Path::new(&s.path).exists();
          SongReference { path: s.path, exists }
        })
        .collect(),
    )
  }

  /// Apply `(oldPath, newPath)` substitutions against a single playlist,
  /// using byte-exact attribute matching. Errors `NoMatches` if nothing
  /// changed.
  pub fn update(&self, playlist_path: &Path, substitutions: &[PathSubstitution]) -> Result<usize> {
    let mut doc = parse_playlist(playlist_path)?;
    let mut updated = 0usize;

    for song in doc.song.iter_mut() {
      for sub in substitutions {
        if song.path == sub.old_path {
          song.path = sub.new_path.clone();
          updated += 1;
        }
      }
    }

    if updated == 0 {
      return Err(SetmendError::NoMatches(playlist_path.to_path_buf()));
    }

    write_playlist(playlist_path, &doc)?;
    Ok(updated)
  }

  /// Every `.vdjfolder` path under both roots, used by C9.
  pub fn walk(&self) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for root in [&self.folders_root, &self.my_lists_root] {
      let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_excluded(e.path()));
      for entry in walker.filter_map(|e| e.ok()) {
        if entry.file_type().is_file() && has_suffix(entry.path(), PLAYLIST_SUFFIX) {
          paths.push(entry.into_path());
        }
      }
    }
    paths
  }
}

fn build_node(path: &Path, display_name: &str, is_my_lists: bool) -> Option<PlaylistNode> {
  if !path.exists() {
    return None;
  }
  build_node_at(path, display_name, is_my_lists, true)
}

/// `is_root` marks the top of a root (`folders_root`/`my_lists_root`
/// itself), which is always admitted regardless of its name. Every deeper
/// directory is admitted only when `is_my_lists` or it carries the
/// `.subfolders` suffix.
fn build_node_at(path: &Path, display_name: &str, is_my_lists: bool, is_root: bool) -> Option<PlaylistNode> {
  if is_excluded(path) {
    return None;
  }

  if path.is_dir() {
    if !is_root && !is_my_lists && !has_suffix(path, SUBFOLDERS_SUFFIX) {
      return None;
    }

    let mut children: Vec<PlaylistNode> = std::fs::read_dir(path)
      .ok()?
      .filter_map(|e| e.ok())
      .filter_map(|entry| {
        let child_path = entry.path();
        let child_name = strip_suffix(&child_path, SUBFOLDERS_SUFFIX);
        build_node_at(&child_path, &child_name, is_my_lists, false)
      })
      .collect();

    children.sort_by(|a, b| {
      let kind_order = |k: &PlaylistNodeKind| if *k == PlaylistNodeKind::Folder { 0 } else { 1 };
      kind_order(&a.kind).cmp(&kind_order(&b.kind)).then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    Some(PlaylistNode {
      id: hex_id(path),
      name: display_name.to_string(),
      path: path.to_path_buf(),
      kind: PlaylistNodeKind::Folder,
      children,
    })
  } else if has_suffix(path, PLAYLIST_SUFFIX) {
    match parse_playlist(path) {
      Ok(doc) if !doc.song.is_empty() => Some(PlaylistNode {
        id: hex_id(path),
        name: strip_suffix(path, PLAYLIST_SUFFIX),
        path: path.to_path_buf(),
        kind: PlaylistNodeKind::Playlist,
        children: Vec::new(),
      }),
      _ => None,
    }
  } else {
    None
  }
}

fn is_excluded(path: &Path) -> bool {
  path.file_name().map(|n| n.to_string_lossy() == EXCLUDED_SUBFOLDER).unwrap_or(false)
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
  path.file_name().map(|n| n.to_string_lossy().ends_with(suffix)).unwrap_or(false)
}

fn strip_suffix(path: &Path, suffix: &str) -> String {
  let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
  name.strip_suffix(suffix).map(|s| s.to_string()).unwrap_or(name)
}

fn hex_id(path: &Path) -> String {
  path.to_string_lossy().bytes().map(|b| format!("{:02x}", b)).collect()
}

pub(crate) fn parse_playlist(path: &Path) -> Result<VirtualFolderXml> {
  let contents = std::fs::read_to_string(path)?;
  from_str(&contents).map_err(|e| SetmendError::PlaylistParseError(format!("{}: {}", path.display(), e)))
}

pub(crate) fn write_playlist(path: &Path, doc: &VirtualFolderXml) -> Result<()> {
  let xml =
    to_string(doc).map_err(|e| SetmendError::PlaylistParseError(format!("{}: {}", path.display(), e)))?;
  std::fs::write(path, xml)?;
  Ok(())
}

/// Byte-exact-vs-normalized path equality: `update` uses raw equality;
/// C9 normalizes and lower-cases first.
pub fn normalized_path_eq(a: &str, b: &str) -> bool {
  normalize_for_comparison(a) == normalize_for_comparison(b)
}

/// `os.path.normpath`-style resolution of `..`/`.` components: a `..`
/// pops the previous `Normal` segment, is dropped entirely above an
/// absolute root, and is kept verbatim when it would otherwise overflow a
/// relative path.
fn normalize_for_comparison(p: &str) -> String {
  use std::path::Component;

  let path = Path::new(p);
  let is_absolute = path.is_absolute();
  let mut stack: Vec<Component> = Vec::new();

  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => match stack.last() {
        Some(Component::Normal(_)) => {
          stack.pop();
        }
        Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
        Some(Component::ParentDir) | Some(Component::CurDir) | None => {
          if !is_absolute {
            stack.push(component);
          }
        }
      },
      other => stack.push(other),
    }
  }

  let mut normalized = PathBuf::new();
  for component in stack {
    normalized.push(component.as_os_str());
  }
  normalized.to_string_lossy().to_lowercase()
}
