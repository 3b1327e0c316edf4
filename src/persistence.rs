/**
 * Reading and writing question pool files in the filesystem.
 *
 * A pool is a JSON array of questions. Pools are small enough to read whole.
 */
use std::fs;
use std::path::Path;

use super::common::{ExportError, Result};
use super::quiz::Question;


/// Load a question pool given its path.
pub fn load_pool(path: &Path) -> Result<Vec<Question>> {
    let data = fs::read_to_string(path)
        .or(Err(ExportError::PoolNotFound(path.to_path_buf())))?;
    serde_json::from_str(&data).map_err(ExportError::Json)
}

/// Save `questions` to a pool file at `path`, overwriting it.
pub fn save_pool(path: &Path, questions: &[Question]) -> Result<()> {
    let serialized = serde_json::to_string_pretty(questions).map_err(ExportError::Json)?;
    fs::write(path, serialized).or(Err(ExportError::CannotWriteToFile(path.to_path_buf())))
}
