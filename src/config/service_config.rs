use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Process configuration: where to listen and where the fitted artifacts
/// live. Loaded from an optional TOML file; `PORT` in the environment
/// overrides the configured port.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub artifacts: ArtifactSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSection {
    #[serde(default = "default_parameter_dir")]
    pub parameter_dir: PathBuf,
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_parameter_dir() -> PathBuf {
    PathBuf::from("parameter")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model/model.json")
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ArtifactSection {
    fn default() -> Self {
        Self {
            parameter_dir: default_parameter_dir(),
            model_path: default_model_path(),
        }
    }
}

impl ServiceConfig {
    /// Config file is optional; defaults plus environment overrides apply
    /// when it is absent.
    pub fn load(path: &str) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read service config file: {}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse service config file: {}", path))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(port) = env::var("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("PORT must be a number, got '{}'", port))?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
