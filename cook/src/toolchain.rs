//! Cross-compiler prefix resolution.

use crate::error::{Error, Result};
use log::debug;
use std::path::Path;

/// Find the cross-compiler prefix installed in `dir`.
///
/// Candidates are probed in the given order by testing for
/// `<dir>/<candidate>gcc`. The first one present wins and is returned as
/// `<dir>/<candidate>`, ready to be passed as `CROSS_COMPILE`.
pub fn resolve_prefix(dir: &Path, candidates: &[&str]) -> Result<String> {
    for candidate in candidates {
        let gcc = dir.join(format!("{candidate}gcc"));
        debug!("Probing {}", gcc.display());
        if gcc.exists() {
            return Ok(dir.join(candidate).display().to_string());
        }
    }

    Err(Error::ToolchainNotFound {
        dir: dir.to_path_buf(),
        candidates: candidates
            .iter()
            .map(|c| format!("{c}gcc"))
            .collect::<Vec<_>>()
            .join(", "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_resolves_only_existing_candidate() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "aarch64-linux-gnu-gcc");

        let prefix = resolve_prefix(
            dir.path(),
            &["aarch64-none-linux-gnu-", "aarch64-linux-gnu-"],
        )
        .unwrap();
        assert_eq!(
            prefix,
            dir.path().join("aarch64-linux-gnu-").display().to_string()
        );
    }

    #[test]
    fn test_first_declared_candidate_wins() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "aarch64-none-elf-gcc");
        touch(dir.path(), "aarch64-zephyr-elf-gcc");

        let prefix =
            resolve_prefix(dir.path(), &["aarch64-zephyr-elf-", "aarch64-none-elf-"]).unwrap();
        assert!(prefix.ends_with("aarch64-zephyr-elf-"));

        let prefix =
            resolve_prefix(dir.path(), &["aarch64-none-elf-", "aarch64-zephyr-elf-"]).unwrap();
        assert!(prefix.ends_with("aarch64-none-elf-"));
    }

    #[test]
    fn test_no_candidate_is_fatal() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "arm-none-eabi-gcc");

        let err = resolve_prefix(dir.path(), &["aarch64-none-elf-", "aarch64-zephyr-elf-"])
            .unwrap_err();
        match err {
            Error::ToolchainNotFound { dir: probed, candidates } => {
                assert_eq!(probed, dir.path());
                assert_eq!(candidates, "aarch64-none-elf-gcc, aarch64-zephyr-elf-gcc");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let err = resolve_prefix(Path::new("/nonexistent/toolchain/bin"), &["aarch64-none-elf-"])
            .unwrap_err();
        assert!(matches!(err, Error::ToolchainNotFound { .. }));
    }

    #[test]
    fn test_empty_candidate_list_is_fatal() {
        let dir = tempdir().unwrap();
        assert!(resolve_prefix(dir.path(), &[]).is_err());
    }
}
