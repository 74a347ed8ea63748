//! Per-run record of prompts sent and answers received.
//!
//! Layout: `.sisho/history/<id>/` containing an empty file named after the run's
//! start time, then `prompt_NN.md` / `answer_NN.md` per target (1-based).
//! Question runs live under `.sisho/history/questions/<id>/` with a single
//! `prompt.md` / `answer.md` pair.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::config::STATE_DIR;

pub const HISTORY_DIR: &str = "history";
pub const QUESTIONS_DIR: &str = "questions";

#[derive(Debug, Clone)]
pub struct History {
    dir: PathBuf,
}

impl History {
    /// Create a fresh run directory under the project's history folder
    pub fn create(project_root: &Path) -> Result<Self> {
        Self::create_at(project_root, Uuid::new_v4(), Local::now())
    }

    /// Create a fresh question run directory
    pub fn create_for_question(project_root: &Path) -> Result<Self> {
        Self::create_in(
            &history_root(project_root).join(QUESTIONS_DIR),
            Uuid::new_v4(),
            Local::now(),
        )
    }

    pub fn create_at(project_root: &Path, id: Uuid, started: DateTime<Local>) -> Result<Self> {
        Self::create_in(&history_root(project_root), id, started)
    }

    fn create_in(base: &Path, id: Uuid, started: DateTime<Local>) -> Result<Self> {
        let dir = base.join(id.to_string());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create history directory: {}", dir.display()))?;

        let marker = dir.join(started.format("%Y-%m-%dT%H-%M-%S").to_string());
        fs::write(&marker, "")
            .with_context(|| format!("Failed to create time file: {}", marker.display()))?;

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_prompt(&self, index: usize, prompt: &str) -> Result<PathBuf> {
        self.save(&format!("prompt_{index:02}.md"), prompt)
    }

    pub fn save_answer(&self, index: usize, answer: &str) -> Result<PathBuf> {
        self.save(&format!("answer_{index:02}.md"), answer)
    }

    pub fn save_question_prompt(&self, prompt: &str) -> Result<PathBuf> {
        self.save("prompt.md", prompt)
    }

    pub fn save_question_answer(&self, answer: &str) -> Result<PathBuf> {
        self.save("answer.md", answer)
    }

    fn save(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.dir.join(name);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write history file: {}", path.display()))?;
        Ok(path)
    }
}

fn history_root(project_root: &Path) -> PathBuf {
    project_root.join(STATE_DIR).join(HISTORY_DIR)
}
