// AIDEV-NOTE: File system operations helper (ambient, optional)
// Safe copy/move/delete helpers for callers that want to relocate media
// files alongside a playlist rewrite. Grounded verbatim on
// examples/jvegaf-harmony/src-tauri/src/libs/file_ops.rs.

use crate::error::{Result, SetmendError};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Copy a file from `src` to `dest`, creating parent directories as needed.
pub fn copy_file(src: &str, dest: &str) -> Result<()> {
  info!("copying file: {} -> {}", src, dest);

  let src_path = Path::new(src);
  let dest_path = Path::new(dest);

  if !src_path.exists() {
    return Err(SetmendError::Custom(format!("source file does not exist: {}", src)));
  }

  if let Some(parent) = dest_path.parent() {
    if !parent.exists() {
      fs::create_dir_all(parent)?;
      info!("created parent directory: {}", parent.display());
    }
  }

  fs::copy(src_path, dest_path)?;
  Ok(())
}

/// Move a file from `src` to `dest`. Tries `rename` first, falls back to
/// copy+delete across filesystem boundaries.
pub fn move_file(src: &str, dest: &str) -> Result<()> {
  info!("moving file: {} -> {}", src, dest);

  let src_path = Path::new(src);
  let dest_path = Path::new(dest);

  if !src_path.exists() {
    return Err(SetmendError::Custom(format!("source file does not exist: {}", src)));
  }

  if let Some(parent) = dest_path.parent() {
    if !parent.exists() {
      fs::create_dir_all(parent)?;
      info!("created parent directory: {}", parent.display());
    }
  }

  match fs::rename(src_path, dest_path) {
    Ok(_) => Ok(()),
    Err(_) => {
      warn!("rename failed, falling back to copy+delete");
      fs::copy(src_path, dest_path)?;
      fs::remove_file(src_path)?;
      Ok(())
    }
  }
}

/// Delete a file. Errors if it doesn't exist.
pub fn delete_file(path: &str) -> Result<()> {
  let file_path = Path::new(path);
  if !file_path.exists() {
    return Err(SetmendError::Custom(format!("file does not exist: {}", path)));
  }
  fs::remove_file(file_path)?;
  Ok(())
}

#[allow(dead_code)]
pub fn get_file_size(path: &str) -> Result<u64> {
  Ok(fs::metadata(path)?.len())
}

#[allow(dead_code)]
pub fn file_exists(path: &str) -> bool {
  Path::new(path).exists()
}

#[allow(dead_code)]
pub fn get_parent_dir(path: &str) -> Option<PathBuf> {
  Path::new(path).parent().map(|p| p.to_path_buf())
}
