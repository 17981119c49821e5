use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub push: PushConfig,
}

impl Default for Config {
    fn default() -> Self {
        load_default_config()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BehaviorConfig {
    /// Echo git invocations and pass their stdio through
    #[serde(default)]
    pub debug: bool,
}

/// Configuration for the push sequence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PushConfig {
    /// Remote to fetch from and push to
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Branch to create new branches from when the remote symbolic HEAD
    /// is not set
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Always pass --allow-empty to git commit
    #[serde(default)]
    pub allow_empty: bool,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            default_branch: default_branch(),
            allow_empty: false,
        }
    }
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

impl Config {
    /// Load configuration from the standard config paths
    pub fn load() -> Result<Self> {
        Self::load_layered(&PathBuf::from(".gap.yaml"), Self::user_config_path())
    }

    /// Load configuration with the standard precedence:
    /// repo file, then user file, then embedded defaults.
    fn load_layered(repo_path: &PathBuf, user_path: Option<PathBuf>) -> Result<Self> {
        if let Ok(config) = Self::load_from_path(repo_path) {
            return Ok(config);
        }

        if let Some(user_config_path) = user_path {
            if let Ok(config) = Self::load_from_path(&user_config_path) {
                return Ok(config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Config file does not exist: {}", path.display());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Get the user configuration path
    pub fn user_config_path() -> Option<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("gap").join("config.yaml"))
        } else {
            // Fallback to home directory
            dirs::home_dir()
                .map(|home_dir| home_dir.join(".config").join("gap").join("config.yaml"))
        }
    }

    /// Create a sample configuration file
    pub fn create_sample_config() -> Result<String> {
        // Start with default config and add sample customizations
        let mut sample = load_default_config();

        sample.behavior.debug = true;
        sample.push.remote = "origin".to_string();
        sample.push.default_branch = "main".to_string();

        serde_yaml::to_string(&sample).context("Failed to serialize sample configuration")
    }
}

/// Load the complete default configuration from embedded YAML
pub fn load_default_config() -> Config {
    // Embed the default configuration at compile time
    const DEFAULT_CONFIG: &str = include_str!("../config/default_config.yaml");

    serde_yaml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded default configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.behavior.debug);
        assert_eq!(config.push.remote, "origin");
        assert_eq!(config.push.default_branch, "main");
        assert!(!config.push.allow_empty);
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config().unwrap();
        assert!(sample.contains("behavior:"));
        assert!(sample.contains("push:"));
        assert!(sample.contains("remote"));
        assert!(sample.contains("debug"));
    }

    #[test]
    fn test_config_loading_from_path() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("test_config.yaml");

        let test_config = r#"
behavior:
  debug: true

push:
  remote: upstream
  allow_empty: true
"#;

        fs::write(&config_path, test_config).unwrap();

        let config = Config::load_from_path(&config_path).unwrap();
        assert!(config.behavior.debug);
        assert!(config.push.allow_empty);
        assert_eq!(config.push.remote, "upstream");
        // Keys missing from the file take their defaults
        assert_eq!(config.push.default_branch, "main");
    }

    #[test]
    fn test_repo_config_beats_user_config() {
        let temp_dir = tempdir().unwrap();
        let repo_path = temp_dir.path().join(".gap.yaml");
        let user_path = temp_dir.path().join("config.yaml");

        fs::write(&repo_path, "push:\n  remote: from-repo\n").unwrap();
        fs::write(&user_path, "push:\n  remote: from-user\n").unwrap();

        let config = Config::load_layered(&repo_path, Some(user_path)).unwrap();
        assert_eq!(config.push.remote, "from-repo");
    }

    #[test]
    fn test_user_config_beats_embedded_defaults() {
        let temp_dir = tempdir().unwrap();
        let repo_path = temp_dir.path().join(".gap.yaml");
        let user_path = temp_dir.path().join("config.yaml");

        fs::write(&user_path, "push:\n  default_branch: trunk\n").unwrap();

        let config = Config::load_layered(&repo_path, Some(user_path)).unwrap();
        assert_eq!(config.push.default_branch, "trunk");
        // Keys the user file leaves out still come from the defaults
        assert_eq!(config.push.remote, "origin");
    }

    #[test]
    fn test_layering_falls_back_to_defaults() {
        let temp_dir = tempdir().unwrap();
        let repo_path = temp_dir.path().join(".gap.yaml");

        let config = Config::load_layered(&repo_path, None).unwrap();
        assert_eq!(config.push.remote, "origin");
        assert_eq!(config.push.default_branch, "main");
        assert!(!config.behavior.debug);
    }

    #[test]
    fn test_missing_config_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("does_not_exist.yaml");

        assert!(Config::load_from_path(&config_path).is_err());
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("bad.yaml");

        fs::write(&config_path, "push: [not, a, mapping]").unwrap();

        assert!(Config::load_from_path(&config_path).is_err());
    }
}
