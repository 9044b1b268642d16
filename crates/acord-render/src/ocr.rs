//! Optional OCR text layer via the external `ocrmypdf` tool.
//!
//! OCR is strictly best-effort: a missing binary, a non-zero exit, or
//! a timeout all leave the flattened output intact and report `false`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use tracing::{info, warn};

pub const DEFAULT_OCR_TIMEOUT: Duration = Duration::from_secs(60);

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Run `ocrmypdf` over `path` in place. Returns whether the text layer
/// was applied.
pub fn apply_ocr(path: &Path) -> bool {
    apply_ocr_with("ocrmypdf", path, DEFAULT_OCR_TIMEOUT)
}

/// Same as [`apply_ocr`] with the tool name and timeout injectable.
pub fn apply_ocr_with(tool: &str, path: &Path, timeout: Duration) -> bool {
    let scratch = scratch_path(path);

    let mut child = match Command::new(tool)
        .args(["--skip-text", "--optimize", "1", "--output-type", "pdf"])
        .arg(path)
        .arg(&scratch)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            warn!(tool, error = %e, "ocr tool not available, skipping text layer");
            return false;
        }
    };

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {
                if started.elapsed() >= timeout {
                    warn!(tool, timeout_secs = timeout.as_secs(), "ocr timed out, killing");
                    let _ = child.kill();
                    let _ = child.wait();
                    break None;
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                warn!(tool, error = %e, "ocr wait failed");
                let _ = child.kill();
                let _ = child.wait();
                break None;
            }
        }
    };

    let applied = match status {
        Some(status) if status.success() => match std::fs::rename(&scratch, path) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "could not swap in ocr output");
                false
            }
        },
        Some(status) => {
            warn!(tool, code = ?status.code(), "ocr exited with failure");
            false
        }
        None => false,
    };

    if !applied {
        let _ = std::fs::remove_file(&scratch);
    } else {
        info!(path = %path.display(), "ocr text layer applied");
    }
    applied
}

fn scratch_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".ocr.tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_reports_false_and_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        std::fs::write(&path, b"%PDF-1.7 placeholder").unwrap();

        let applied = apply_ocr_with(
            "acord-test-no-such-ocr-binary",
            &path,
            Duration::from_secs(1),
        );
        assert!(!applied);
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7 placeholder");
        assert!(!scratch_path(&path).exists());
    }

    #[test]
    fn test_failing_tool_cleans_up_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        std::fs::write(&path, b"%PDF-1.7 placeholder").unwrap();

        // `false` exits non-zero immediately and ignores its arguments.
        let applied = apply_ocr_with("false", &path, Duration::from_secs(5));
        assert!(!applied);
        assert!(path.exists());
        assert!(!scratch_path(&path).exists());
    }

    #[test]
    fn test_scratch_path_is_sibling() {
        let path = Path::new("/tmp/work/acord25_filled.pdf");
        let scratch = scratch_path(path);
        assert_eq!(scratch.parent(), path.parent());
        assert_eq!(
            scratch.file_name().unwrap().to_str().unwrap(),
            "acord25_filled.pdf.ocr.tmp"
        );
    }
}
