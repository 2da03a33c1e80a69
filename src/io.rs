use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Write the assembled script into `dir`, creating the directory if it is
/// missing. Only the immediate leaf is created; a missing parent is a user
/// error and fails with context, leaving no partial output behind. An
/// existing file of the same name is overwritten.
pub fn write_script(dir: &Path, name: &str, text: &str) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(name);
    fs::write(&path, text)
        .with_context(|| format!("failed to write script: {}", path.display()))?;
    Ok(path)
}

/// Write a JSON artifact (manifest, template) next to the script.
pub fn write_json(dir: &Path, name: &str, json: &str) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(name);
    fs::write(&path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        fs::create_dir(dir).with_context(|| {
            format!("failed to create output directory: {}", dir.display())
        })?;
    }
    Ok(())
}
