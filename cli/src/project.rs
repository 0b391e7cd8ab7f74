//! # Project Loading
//!
//! The `--urlconf` argument shared by every command.

use crate::error::{CliError, CliResult};
use apischema_core::config::URLCONF_ENV;
use apischema_core::ProjectConfig;
use std::path::PathBuf;
use tracing::debug;

/// Where to find the project file.
#[derive(clap::Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Project file (YAML, or JSON by extension) declaring views and urlpatterns.
    #[clap(long, env = URLCONF_ENV)]
    pub urlconf: PathBuf,
}

impl ProjectArgs {
    /// Reads and parses the project file.
    pub fn load(&self) -> CliResult<ProjectConfig> {
        if !self.urlconf.exists() {
            return Err(CliError::General(format!(
                "Project file not found: {:?}",
                self.urlconf
            )));
        }
        debug!(path = %self.urlconf.display(), "loading project");
        Ok(ProjectConfig::from_path(&self.urlconf)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file() {
        let args = ProjectArgs {
            urlconf: PathBuf::from("/nonexistent/project.yaml"),
        };
        assert!(matches!(args.load(), Err(CliError::General(_))));
    }

    #[test]
    fn test_json_project() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.json");
        fs::write(&path, r#"{"title": "Notes", "urlpatterns": []}"#).unwrap();
        let config = ProjectArgs { urlconf: path }.load().unwrap();
        assert_eq!(config.title.as_deref(), Some("Notes"));
    }
}
