// ABOUTME: Capability-based filesystem sandbox for load and load-all

//! Capability-based filesystem sandbox backing `load` and `load-all`.
//!
//! Every readable root is opened as a `cap_std::fs::Dir`, which refuses to
//! resolve a path outside of itself even if the path string tries to escape
//! via `..` -- we still reject `..` and absolute paths up front so the
//! caller gets a clear `PathNotAllowed` instead of a raw I/O error.

use crate::config::FsConfig;
use cap_std::fs::Dir;

#[derive(Debug, Clone)]
pub enum SandboxError {
    PathNotAllowed(String),
    FileNotFound(String),
    FileTooLarge(String),
    IoError(String),
}

impl std::fmt::Display for SandboxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SandboxError::PathNotAllowed(path) => write!(f, "access denied: {} is not in an allowed path", path),
            SandboxError::FileNotFound(path) => write!(f, "file not found: {}", path),
            SandboxError::FileTooLarge(msg) => write!(f, "file too large: {}", msg),
            SandboxError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for SandboxError {}

/// A set of allow-listed directories `load`/`load-all` may read from.
pub struct Sandbox {
    fs_roots: Vec<Dir>,
    fs_config: FsConfig,
}

fn validate_path(path: &str) -> Result<(), SandboxError> {
    if path.starts_with('/') || path.starts_with('\\') {
        return Err(SandboxError::PathNotAllowed(path.to_string()));
    }
    if path.contains("..") {
        return Err(SandboxError::PathNotAllowed(path.to_string()));
    }
    Ok(())
}

impl Sandbox {
    pub fn new(fs_config: FsConfig) -> Result<Self, SandboxError> {
        let mut fs_roots = Vec::new();
        for path in &fs_config.allowed_paths {
            std::fs::create_dir_all(path)
                .map_err(|e| SandboxError::IoError(format!("cannot create {}: {}", path.display(), e)))?;
            let dir = Dir::open_ambient_dir(path, cap_std::ambient_authority())
                .map_err(|e| SandboxError::IoError(format!("cannot open {}: {}", path.display(), e)))?;
            fs_roots.push(dir);
        }
        Ok(Self { fs_roots, fs_config })
    }

    fn find_root_for(&self, path: &str) -> Result<&Dir, SandboxError> {
        for root in &self.fs_roots {
            if root.metadata(path).is_ok() {
                return Ok(root);
            }
        }
        Err(SandboxError::FileNotFound(path.to_string()))
    }

    /// Reads `path` from the first root that has it, enforcing `max_file_size`.
    pub fn read_file(&self, path: &str) -> Result<String, SandboxError> {
        validate_path(path)?;
        let root = self.find_root_for(path)?;
        let size = root
            .metadata(path)
            .map_err(|e| SandboxError::IoError(format!("cannot stat {}: {}", path, e)))?
            .len();
        if size > self.fs_config.max_file_size as u64 {
            return Err(SandboxError::FileTooLarge(format!(
                "{} bytes exceeds limit of {} bytes",
                size, self.fs_config.max_file_size
            )));
        }
        root.read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SandboxError::FileNotFound(path.to_string())
            } else {
                SandboxError::IoError(format!("cannot read {}: {}", path, e))
            }
        })
    }

    pub fn file_exists(&self, path: &str) -> bool {
        validate_path(path).is_ok() && self.find_root_for(path).is_ok()
    }

    /// Lists `.scm` files in `dir`, sorted, across every root that has it.
    pub fn list_scm_files(&self, dir: &str) -> Result<Vec<String>, SandboxError> {
        validate_path(dir)?;
        let root = self.find_root_for(dir)?;
        let mut names: Vec<String> = root
            .read_dir(dir)
            .map_err(|e| SandboxError::IoError(format!("cannot list {}: {}", dir, e)))?
            .map(|entry| {
                entry
                    .map_err(|e| SandboxError::IoError(e.to_string()))
                    .and_then(|e| {
                        e.file_name()
                            .to_str()
                            .map(|s| s.to_string())
                            .ok_or_else(|| SandboxError::IoError("invalid UTF-8 in filename".to_string()))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        names.retain(|n| n.ends_with(".scm"));
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use std::path::PathBuf;

    fn create_test_sandbox() -> (Sandbox, PathBuf) {
        let test_dir = PathBuf::from("./test_sandbox_temp");
        let _ = fs::remove_dir_all(&test_dir);
        fs::create_dir_all(&test_dir).unwrap();
        let fs_config = FsConfig {
            allowed_paths: vec![test_dir.clone()],
            max_file_size: 10 * 1024 * 1024,
        };
        (Sandbox::new(fs_config).unwrap(), test_dir)
    }

    fn cleanup(test_dir: &PathBuf) {
        let _ = fs::remove_dir_all(test_dir);
    }

    #[test]
    #[serial]
    fn read_file_success() {
        let (sandbox, test_dir) = create_test_sandbox();
        fs::write(test_dir.join("test.scm"), "(+ 1 2)").unwrap();
        assert_eq!(sandbox.read_file("test.scm").unwrap(), "(+ 1 2)");
        cleanup(&test_dir);
    }

    #[test]
    #[serial]
    fn path_traversal_rejected() {
        let (sandbox, test_dir) = create_test_sandbox();
        let result = sandbox.read_file("../../../etc/passwd");
        assert!(matches!(result, Err(SandboxError::PathNotAllowed(_))));
        cleanup(&test_dir);
    }

    #[test]
    #[serial]
    fn absolute_path_rejected() {
        let (sandbox, test_dir) = create_test_sandbox();
        let result = sandbox.read_file("/etc/passwd");
        assert!(matches!(result, Err(SandboxError::PathNotAllowed(_))));
        cleanup(&test_dir);
    }

    #[test]
    #[serial]
    fn oversized_file_is_rejected() {
        let (sandbox, test_dir) = create_test_sandbox();
        let fs_config = FsConfig {
            allowed_paths: vec![test_dir.clone()],
            max_file_size: 4,
        };
        let small_limit_sandbox = Sandbox::new(fs_config).unwrap();
        fs::write(test_dir.join("big.scm"), "(+ 1 2 3 4 5)").unwrap();
        assert!(matches!(
            small_limit_sandbox.read_file("big.scm"),
            Err(SandboxError::FileTooLarge(_))
        ));
        let _ = sandbox.read_file("big.scm");
        cleanup(&test_dir);
    }

    #[test]
    #[serial]
    fn list_scm_files_filters_and_sorts() {
        let (sandbox, test_dir) = create_test_sandbox();
        fs::write(test_dir.join("b.scm"), "").unwrap();
        fs::write(test_dir.join("a.scm"), "").unwrap();
        fs::write(test_dir.join("readme.txt"), "").unwrap();
        let files = sandbox.list_scm_files(".").unwrap();
        assert_eq!(files, vec!["a.scm".to_string(), "b.scm".to_string()]);
        cleanup(&test_dir);
    }
}
