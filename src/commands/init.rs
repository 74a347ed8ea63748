use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::fs::config::{Config, CONFIG_FILE_NAMES};

/// `sisho init`: write a default `sisho.yml` in the current directory
pub fn execute() -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let path = init_in(&cwd)?;

    println!(
        "{} Initialized sisho project. Created {} with default configuration.",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

pub fn init_in(dir: &Path) -> Result<PathBuf> {
    if let Some(existing) = CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
    {
        bail!("{} already exists", existing.display());
    }

    let path = dir.join(CONFIG_FILE_NAMES[0]);
    Config::default_for_init().write(&path)?;
    Ok(path)
}
