use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{parse_config, Config, ConfigError};

const DEFAULT_WORKSPACE_PATH: &str = ".config/padlink";
const CONFIG_FILE_NAME: &str = "padlink.yaml";

pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    pub fn new(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = {
            if let Some(path) = path {
                path.to_owned()
            } else {
                Self::default_path()?
            }
        };

        if !path.exists() {
            fs::create_dir_all(&path)?;
        } else if !path.is_dir() {
            return Err(ConfigError::PathIsNotDirectory(path.display().to_string()));
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config_path(&self) -> PathBuf {
        self.path.join(CONFIG_FILE_NAME)
    }

    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let config_path = self.config_path();
        if !config_path.exists() {
            return Err(ConfigError::ConfigNotFound(
                config_path.display().to_string(),
            ));
        }
        let input = fs::read_to_string(&config_path)?;
        parse_config(&input)
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let path = std::env::var("HOME")
            .map(PathBuf::from)
            .map(|p| p.join(DEFAULT_WORKSPACE_PATH))
            .map_err(|_| ConfigError::EnvVarNotSet("HOME".to_string()))?;

        Ok(path)
    }
}
