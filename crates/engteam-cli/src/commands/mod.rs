pub mod init;
pub mod list;
pub mod status;
pub mod sync;

use anyhow::Result;
use engteam_catalog::build_registry;
use engteam_types::Registry;
use std::env;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// How a command finished when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The user declined or cancelled; nothing was written
    Aborted,
}

/// Settings every command needs, resolved once from config and flags
#[derive(Debug, Clone)]
pub struct Context {
    pub catalog_root: PathBuf,
    pub db_file_name: String,
    /// Directory inside a project that receives agents and skills
    pub target_dir: String,
}

impl Context {
    pub fn new(config: &Config, catalog_override: Option<&Path>) -> Self {
        Self {
            catalog_root: catalog_override
                .map(Path::to_path_buf)
                .unwrap_or_else(|| config.catalog_root()),
            db_file_name: config.database.file_name.clone(),
            target_dir: config.install.target_dir.clone(),
        }
    }

    /// Fresh catalog snapshot
    pub fn load_registry(&self) -> Registry {
        build_registry(&self.catalog_root)
    }

    /// Where agents and skills are copied for `project_dir`
    pub fn install_root(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.target_dir)
    }
}

/// Absolute project directory; defaults to the working directory
pub fn resolve_project_dir(dir: Option<&Path>) -> Result<PathBuf> {
    let cwd = env::current_dir()?;
    Ok(match dir {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => cwd.join(dir),
        None => cwd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_project_dir() {
        let cwd = env::current_dir().unwrap();
        assert_eq!(resolve_project_dir(None).unwrap(), cwd);
        assert_eq!(resolve_project_dir(Some(Path::new("app"))).unwrap(), cwd.join("app"));
        assert_eq!(
            resolve_project_dir(Some(Path::new("/srv/app"))).unwrap(),
            PathBuf::from("/srv/app")
        );
    }
}
