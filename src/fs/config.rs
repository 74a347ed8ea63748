//! Project configuration (`sisho.yml`) and project root discovery.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::knowledge::normalize::canonical_form;

/// Accepted config file names, checked in order in each directory
pub const CONFIG_FILE_NAMES: &[&str] = &["sisho.yml", "sisho.yaml"];

/// Directory for generated artifacts, relative to the project root
pub const STATE_DIR: &str = ".sisho";

/// Gitignore-syntax file excluding paths from project-wide walks
pub const IGNORE_FILE_NAME: &str = ".sishoignore";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default, rename = "auto-collect")]
    pub auto_collect: AutoCollect,
    #[serde(default, rename = "additional-knowledge")]
    pub additional_knowledge: AdditionalKnowledge,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name: `anthropic`, `open-ai` or `local`
    #[serde(default)]
    pub driver: String,
    #[serde(default)]
    pub model: String,
}

/// Convention files collected automatically along the target's directory chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoCollect {
    #[serde(default, rename = "README.md")]
    pub readme_md: bool,
    #[serde(default, rename = "[TARGET_CODE].md")]
    pub target_code_md: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalKnowledge {
    #[serde(default, rename = "folder-structure")]
    pub folder_structure: bool,
}

impl Config {
    /// Configuration written by `sisho init`
    pub fn default_for_init() -> Self {
        Self {
            lang: "en".to_string(),
            llm: LlmConfig {
                driver: "anthropic".to_string(),
                model: "claude-3-5-sonnet-20240620".to_string(),
            },
            auto_collect: AutoCollect {
                readme_md: true,
                target_code_md: true,
            },
            additional_knowledge: AdditionalKnowledge {
                folder_structure: true,
            },
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse config YAML")
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Malformed config file: {}", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}

/// Find the config file by walking up from `start_dir` to the filesystem root.
pub fn find_config(start_dir: &Path) -> Result<PathBuf> {
    let mut current = canonical_form(start_dir);

    loop {
        for name in CONFIG_FILE_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => bail!(
                "Could not find sisho.yml or sisho.yaml. Run 'sisho init' in the project root first."
            ),
        }
    }
}

/// A located project: its root directory and parsed configuration
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub config: Config,
}

impl Project {
    /// Locate the project containing `start_dir`
    pub fn discover(start_dir: &Path) -> Result<Self> {
        let config_path = find_config(start_dir)?;
        Self::from_config_path(config_path)
    }

    /// Locate the project containing the current directory
    pub fn discover_from_cwd() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        Self::discover(&cwd)
    }

    pub fn from_config_path(config_path: PathBuf) -> Result<Self> {
        let config = Config::read(&config_path)?;
        let root = config_path
            .parent()
            .map(canonical_form)
            .context("Config file has no parent directory")?;
        Ok(Self {
            root,
            config_path,
            config,
        })
    }
}
