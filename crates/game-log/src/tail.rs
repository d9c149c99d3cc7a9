//! Bounded trailing-window reads of an append-only log file.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Reads at most `max_bytes` from the end of the file at `path`.
///
/// The file is opened fresh on every call. Missing or unreadable files
/// yield an empty string; invalid UTF-8 is replaced rather than rejected.
pub fn read_tail(path: &Path, max_bytes: u64) -> String {
    match try_read_tail(path, max_bytes) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "could not read log tail");
            String::new()
        }
    }
}

fn try_read_tail(path: &Path, max_bytes: u64) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len();
    let start = size.saturating_sub(max_bytes);
    file.seek(SeekFrom::Start(start))?;

    // The writer may append between metadata() and read; never return more
    // than the window.
    let mut buf = Vec::with_capacity((size - start) as usize);
    file.take(max_bytes).read_to_end(&mut buf)?;
    Ok(buf)
}
