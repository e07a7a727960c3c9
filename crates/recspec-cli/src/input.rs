//! `InputSource` implemented over local files, plus a directory walker.
//!
//! This is the host half of the `InputSource` contract: the core never
//! touches a filesystem path itself, only the bytes this type hands back.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use recspec_batch::BatchInput;
use recspec_types::{RecspecError, RecspecResult};

/// Reads a local file lazily: `read_header` only opens+reads the first
/// `max_bytes`; `read_all` re-opens and reads the whole file. The `Mutex`
/// exists only so the type can be `Sync` without requiring callers to open
/// a fresh `File` handle themselves; each call is independent, there is no
/// shared cursor state across calls.
pub struct LocalFileSource {
    path: PathBuf,
    file: Mutex<()>,
}

impl LocalFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(()),
        }
    }
}

impl recspec_types::InputSource for LocalFileSource {
    fn read_header(&self, max_bytes: usize) -> RecspecResult<Vec<u8>> {
        let _guard = self.file.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = File::open(&self.path)?;
        let mut buf = vec![0u8; max_bytes];
        let mut total = 0;
        loop {
            match file.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) => return Err(RecspecError::Io(e)),
            }
            if total == buf.len() {
                break;
            }
        }
        buf.truncate(total);
        Ok(buf)
    }

    fn read_all(&self) -> RecspecResult<Vec<u8>> {
        let _guard = self.file.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(0))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

/// Builds one `BatchInput` per file reachable from `root`: `root` itself if
/// it is a file, or every regular file under it (recursively) if it is a
/// directory. Entries are sorted by path so batch order is deterministic
/// regardless of the directory's on-disk iteration order.
pub fn collect_inputs(root: &Path) -> Result<Vec<BatchInput>> {
    let mut paths = Vec::new();
    collect_paths(root, &mut paths)
        .with_context(|| format!("failed to scan input path: {}", root.display()))?;
    paths.sort();

    Ok(paths
        .into_iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned());
            let source: Arc<dyn recspec_types::InputSource> = Arc::new(LocalFileSource::new(path));
            BatchInput::new(name, source)
        })
        .collect())
}

fn collect_paths(path: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    let metadata = std::fs::metadata(path)?;
    if metadata.is_file() {
        out.push(path.to_path_buf());
        return Ok(());
    }
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        if entry_path.is_dir() {
            collect_paths(&entry_path, out)?;
        } else {
            out.push(entry_path);
        }
    }
    Ok(())
}
