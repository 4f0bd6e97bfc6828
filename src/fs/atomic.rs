//! Atomic filesystem writes.
//!
//! All atomic writes follow this pattern:
//! 1. Write content to a temporary file in the same directory
//! 2. Sync the file to disk (fsync)
//! 3. Rename it over the target
//!
//! `rename()` replaces the destination atomically when source and destination
//! live on the same filesystem, which holds because the temporary file is
//! created next to the target. On crash, a temporary file named
//! `.{filename}.{pid}.tmp` may remain; object listings skip dotfiles.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file.
///
/// The target is never observable in a partial state: readers see either the
/// previous content or the new content.
///
/// # Example
///
/// ```no_run
/// use leaselock::fs::atomic_write;
/// use std::path::Path;
///
/// atomic_write(Path::new("ns/global_lock"), b"{}")?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> io::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            with_context(
                e,
                format!("failed to create parent directory '{}'", parent.display()),
            )
        })?;
    }

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;
    atomic_replace(&temp_path, path)
}

/// Temporary file path in the same directory as the target.
fn generate_temp_path(target: &Path) -> io::Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid file path '{}'", target.display()),
            )
        })?;

    Ok(parent.join(format!(".{}.{}.tmp", filename, std::process::id())))
}

fn write_and_sync(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = File::create(path).map_err(|e| {
        with_context(
            e,
            format!("failed to create temporary file '{}'", path.display()),
        )
    })?;

    let written = file.write_all(content).and_then(|()| file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(path);
        return Err(with_context(
            e,
            format!("failed to write temporary file '{}'", path.display()),
        ));
    }

    Ok(())
}

fn atomic_replace(source: &Path, target: &Path) -> io::Result<()> {
    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        with_context(
            e,
            format!("failed to atomically replace '{}'", target.display()),
        )
    })?;

    // Persist the directory entry as well.
    #[cfg(unix)]
    {
        if let Some(parent) = target.parent()
            && let Ok(dir) = File::open(parent)
        {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

fn with_context(err: io::Error, context: String) -> io::Error {
    io::Error::new(err.kind(), format!("{}: {}", context, err))
}
