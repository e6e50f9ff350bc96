//! Platform directories for the config file and debug logs.

use std::path::{Path, PathBuf};

use globe_config::{Config, ConfigError};

pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Holds the JSON log written by debug builds.
    pub log_dir: PathBuf,
}

impl PlatformDirs {
    /// Resolve the OS configuration directory for the viewer, or use
    /// `override_dir` when given. Nothing is created on disk.
    pub fn resolve(override_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let root = match override_dir {
            Some(dir) => dir.to_path_buf(),
            None => Config::default_dir()?,
        };
        Ok(Self::with_root(&root))
    }

    pub fn with_root(root: &Path) -> Self {
        Self {
            config_dir: root.to_path_buf(),
            log_dir: root.join("logs"),
        }
    }

    pub fn create_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_dir_is_used_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve(Some(tmp.path())).unwrap();
        assert_eq!(dirs.config_dir, tmp.path());
        assert_eq!(dirs.log_dir, tmp.path().join("logs"));
    }

    #[test]
    fn test_create_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::with_root(&tmp.path().join("globe"));
        dirs.create_dirs().unwrap();
        assert!(dirs.config_dir.is_dir());
        assert!(dirs.log_dir.is_dir());
    }
}
