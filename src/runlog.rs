// AIDEV-NOTE: Run log sink (ambient)
// Writes the JSON envelopes C8/C9 are required to emit under logs/.
// File-write style grounded on copy_file/move_file in
// examples/jvegaf-harmony/src-tauri/src/libs/file_ops.rs (create parent
// dirs, log::info on success).

use crate::error::Result;
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Write `payload` as pretty JSON to `logs_dir/<prefix>_<timestamp>.json`,
/// creating `logs_dir` if needed. Returns the path written.
pub fn write_run_log(logs_dir: &Path, prefix: &str, payload: &impl Serialize) -> Result<PathBuf> {
  std::fs::create_dir_all(logs_dir)?;
  let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
  let file_name = format!("{}_{}.json", prefix, timestamp);
  let path = logs_dir.join(file_name);
  let serialized = serde_json::to_vec_pretty(payload)?;
  std::fs::write(&path, serialized)?;
  log::info!("wrote run log to {:?}", path);
  Ok(path)
}
