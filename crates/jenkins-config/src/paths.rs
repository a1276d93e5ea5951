use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("home directory not found; set the HOME environment variable")]
    HomeNotFound,
}

/// Centralized path construction for the `~/.jenkins-watch/` directory layout.
///
/// Use `resolve()` in production code and `from_dir()` in tests.
#[derive(Debug, Clone)]
pub struct WatchPaths {
    base_dir: PathBuf,
}

impl WatchPaths {
    /// Directory name used both under `$HOME` and inside a project root.
    pub const DIR_NAME: &'static str = ".jenkins-watch";

    /// Resolve paths from the user's home directory (`~/.jenkins-watch`).
    pub fn resolve() -> Result<Self, PathError> {
        let home = dirs::home_dir().ok_or(PathError::HomeNotFound)?;
        Ok(Self {
            base_dir: home.join(Self::DIR_NAME),
        })
    }

    /// Create paths from an explicit base directory. Use in tests.
    pub fn from_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `~/.jenkins-watch/config.toml`
    pub fn user_config(&self) -> PathBuf {
        self.base_dir.join("config.toml")
    }

    /// `<project>/.jenkins-watch/config.toml`
    pub fn project_config(project_root: &Path) -> PathBuf {
        project_root.join(Self::DIR_NAME).join("config.toml")
    }
}
