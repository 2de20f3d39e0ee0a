use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{cli::Locations, error::AppError, model::ConfigFile};

fn fs_error(path: &Path, source: io::Error) -> AppError {
    AppError::Filesystem { path: path.to_path_buf(), source }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `Ok(None)` when nothing is at `path`; other IO failures are errors.
fn metadata_if_exists(path: &Path) -> Result<Option<fs::Metadata>, AppError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(fs_error(path, e)),
    }
}

fn secondary_files(dir: &Path) -> Result<Vec<ConfigFile>, AppError> {
    match metadata_if_exists(dir)? {
        Some(meta) if meta.is_dir() => {}
        _ => return Ok(Vec::new()),
    }

    let mut out = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| fs_error(dir, e))? {
        let entry = entry.map_err(|e| fs_error(dir, e))?;
        let path: PathBuf = entry.path();
        // Follows symlinks, so links to directories are dropped and dangling links skipped.
        let Some(meta) = metadata_if_exists(&path)? else { continue };
        if meta.is_file() {
            out.push(ConfigFile { name: display_name(&path), path, is_primary: false });
        }
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

/// Lists the primary startup file (if present) followed by the regular
/// files of the secondary directory sorted by name.
pub fn discover(locations: &Locations) -> Result<Vec<ConfigFile>, AppError> {
    let mut out = Vec::new();

    if metadata_if_exists(&locations.primary)?.is_some() {
        out.push(ConfigFile {
            name: display_name(&locations.primary),
            path: locations.primary.clone(),
            is_primary: true,
        });
    }
    out.extend(secondary_files(&locations.secondary_dir)?);

    debug!(count = out.len(), "discovered configuration files");
    Ok(out)
}
