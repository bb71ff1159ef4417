//! Platform-specific directories for config, tokens and logs

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.toml";
const TOKENS_FILE: &str = "tokens.json";
const LOG_FILE: &str = "medibook.log";

/// Where the CLI keeps its files
#[derive(Debug, Clone)]
pub struct StateDir {
    project_dirs: Option<ProjectDirs>,
    override_dir: Option<PathBuf>,
}

impl StateDir {
    pub fn new() -> Self {
        Self {
            project_dirs: ProjectDirs::from("app", "MediBook", "medibook"),
            override_dir: None,
        }
    }

    /// Keep everything under one directory
    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        Self {
            project_dirs: None,
            override_dir: Some(path.into()),
        }
    }

    pub fn config_dir(&self) -> PathBuf {
        if let Some(dir) = &self.override_dir {
            return dir.clone();
        }
        self.project_dirs.as_ref().map_or_else(
            || PathBuf::from(".medibook"),
            |dirs| dirs.config_dir().to_path_buf(),
        )
    }

    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.override_dir {
            return dir.clone();
        }
        self.project_dirs.as_ref().map_or_else(
            || PathBuf::from(".medibook"),
            |dirs| dirs.data_dir().to_path_buf(),
        )
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join(CONFIG_FILE)
    }

    pub fn tokens_file(&self) -> PathBuf {
        self.data_dir().join(TOKENS_FILE)
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir().join(LOG_FILE)
    }

    pub fn create_directories(&self) -> Result<()> {
        for dir in [self.config_dir(), self.data_dir()] {
            ensure_dir(&dir)?;
        }
        Ok(())
    }
}

impl Default for StateDir {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_keeps_everything_together() {
        let tmp = tempfile::tempdir().unwrap();
        let state = StateDir::with_override(tmp.path().join("state"));

        assert_eq!(state.config_file(), tmp.path().join("state/config.toml"));
        assert_eq!(state.tokens_file(), tmp.path().join("state/tokens.json"));
        assert_eq!(state.log_file(), tmp.path().join("state/medibook.log"));

        state.create_directories().unwrap();
        assert!(tmp.path().join("state").is_dir());
    }
}
