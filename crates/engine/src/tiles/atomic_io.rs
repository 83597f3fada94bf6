use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes `text` beside `path` first, then swaps it into place. A failed write
/// leaves whatever was at `path` before.
pub(crate) fn write_level_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let staging_path = staging_path_for(path);
    if let Err(error) = fs::write(&staging_path, text.as_bytes()) {
        let _ = fs::remove_file(&staging_path);
        return Err(error);
    }
    swap_into_place(&staging_path, path)
}

fn swap_into_place(staging_path: &Path, final_path: &Path) -> io::Result<()> {
    let result = match fs::rename(staging_path, final_path) {
        // Windows refuses to rename over an existing file.
        Err(error) if cfg!(windows) && final_path.is_file() && staging_path.is_file() => {
            fs::remove_file(final_path)
                .and_then(|()| fs::rename(staging_path, final_path))
                .map_err(|_| error)
        }
        other => other,
    };
    if result.is_err() {
        let _ = fs::remove_file(staging_path);
    }
    result
}

fn staging_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("level");
    path.with_file_name(format!("{file_name}.saving"))
}
