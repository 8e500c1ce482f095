//! Reading source documents and replacing settings or ledger files

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Read a source document, replacing invalid UTF-8 sequences.
///
/// Writers save documents from all kinds of editors; one stray byte should
/// not keep the page from being published.
pub fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}

pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    fs::read_to_string(&native).map_err(|e| Error::io(native, e))
}

pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Replace `path` with `content` so readers never observe a partial file.
///
/// The bytes go to a locked sibling file first, which is then renamed over
/// the target. Missing parent directories are created.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let target = path.to_native();
    if let Some(dir) = target.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }

    let staging = staging_path(&target);
    if let Err(err) = stage(&staging, &target, content) {
        let _ = fs::remove_file(&staging);
        return Err(err);
    }
    fs::rename(&staging, &target).map_err(|e| {
        let _ = fs::remove_file(&staging);
        Error::io(&target, e)
    })
}

fn staging_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

fn stage(staging: &Path, target: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(staging).map_err(|e| Error::io(staging, e))?;
    file.try_lock_exclusive().map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })?;
    file.write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| Error::io(staging, e))?;
    FileExt::unlock(&file).map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })
}
