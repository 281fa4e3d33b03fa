use std::path::Path;

use timeline_shared::{Result, TimelineError};
use tracing::debug;

/// Write `content` to `path` via a sibling temp file and a rename.
///
/// Parent directories are created as needed.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        std::fs::create_dir_all(parent).map_err(|e| TimelineError::io(parent, e))?;
    }

    let filename = path
        .file_name()
        .ok_or_else(|| TimelineError::validation(format!("not a file path: {}", path.display())))?
        .to_string_lossy();
    let temp = path.with_file_name(format!(".{filename}.tmp"));

    std::fs::write(&temp, content).map_err(|e| TimelineError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| TimelineError::io(path, e))?;

    debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_parents_and_leaves_no_temp_file() {
        let dir = std::env::temp_dir().join(format!("timeline-fs-test-{}", uuid::Uuid::now_v7()));
        let target = dir.join("nested").join("out.json");

        write_atomic(&target, b"{}").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "{}");
        assert!(!dir.join("nested").join(".out.json.tmp").exists());

        write_atomic(&target, b"{\"a\": 1}").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "{\"a\": 1}");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
