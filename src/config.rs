// ABOUTME: Version, banner, prompt and default sandbox configuration

//! Version, banner, prompt and default sandbox constants, plus the bundled
//! prelude loaded at startup unless `--no-stdlib` is given.

use std::path::PathBuf;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "tiny-scm";
pub const WELCOME_SUBTITLE: &str = "A tree-walking Scheme interpreter with tail calls, quasiquote, and streams";

pub const PROMPT: &str = "scm> ";
/// Padding for continuation lines of a multi-line form, same width as `PROMPT`.
pub const CONTINUATION_PROMPT: &str = "     ";

pub const HISTORY_FILE: &str = ".tiny_scm_history";

/// Filesystem sandbox configuration: the directories `load`/`load-all` may
/// read from, and the largest file they will read.
#[derive(Debug, Clone)]
pub struct FsConfig {
    pub allowed_paths: Vec<PathBuf>,
    pub max_file_size: usize,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            allowed_paths: vec![PathBuf::from(".")],
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

/// Small library procedures built from the primitive surface, loaded into
/// every session unless `--no-stdlib` is passed.
pub const PRELUDE: &str = include_str!("prelude.scm");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_and_continuation_are_equal_width() {
        assert_eq!(PROMPT.len(), CONTINUATION_PROMPT.len());
    }

    #[test]
    fn default_fs_config_has_a_positive_size_limit() {
        assert!(FsConfig::default().max_file_size > 0);
    }
}
