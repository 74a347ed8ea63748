//! Shared fixtures for integration tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

use sisho::chat::{Chat, ChatError, Message, Role, SendResult};
use sisho::fs::config::{Config, Project};
use sisho::knowledge::normalize::canonical_form;

/// A temporary project with a `sisho.yml` at its root
pub struct TestProject {
    _temp: TempDir,
    pub root: PathBuf,
}

impl TestProject {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = canonical_form(temp.path());
        config
            .write(&root.join("sisho.yml"))
            .expect("Failed to write sisho.yml");
        Self { _temp: temp, root }
    }

    /// Write `content` at the project-relative `rel`, creating parents
    pub fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().expect("path has a parent"))
            .expect("Failed to create parent directory");
        fs::write(&path, content).expect("Failed to write fixture file");
        self
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root.join(rel)).expect("Failed to read project file")
    }

    pub fn project(&self) -> Project {
        Project::discover(&self.root).expect("Failed to discover project")
    }
}

/// YAML for a declaration file with `(path, kind, chain_make)` entries
pub fn declaration(entries: &[(&str, &str, bool)]) -> String {
    if entries.is_empty() {
        return "knowledge: []\n".to_string();
    }
    let mut yaml = String::from("knowledge:\n");
    for (path, kind, chain_make) in entries {
        yaml.push_str(&format!("  - path: '{path}'\n    kind: {kind}\n"));
        if *chain_make {
            yaml.push_str("    chain-make: true\n");
        }
    }
    yaml
}

/// Answers handed out in order to every chat created from this script.
/// Prompts received are recorded for inspection.
#[derive(Clone, Default)]
pub struct Script {
    answers: Rc<RefCell<VecDeque<String>>>,
    prompts: Rc<RefCell<Vec<String>>>,
}

impl Script {
    pub fn new(answers: impl IntoIterator<Item = String>) -> Self {
        Self {
            answers: Rc::new(RefCell::new(answers.into_iter().collect())),
            prompts: Rc::default(),
        }
    }

    pub fn chat(&self) -> Box<dyn Chat> {
        Box::new(ScriptedChat {
            script: self.clone(),
            history: Vec::new(),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

pub struct ScriptedChat {
    script: Script,
    history: Vec<Message>,
}

impl Chat for ScriptedChat {
    fn send(&mut self, prompt: &str, _model: &str) -> Result<SendResult, ChatError> {
        self.script.prompts.borrow_mut().push(prompt.to_string());
        let answer = self
            .script
            .answers
            .borrow_mut()
            .pop_front()
            .ok_or(ChatError::EmptyResponse)?;

        self.history.push(Message {
            role: Role::User,
            content: prompt.to_string(),
        });
        self.history.push(Message {
            role: Role::Assistant,
            content: answer.clone(),
        });
        Ok(SendResult {
            content: answer,
            finish_reason: "end_turn".to_string(),
        })
    }

    fn history(&self) -> &[Message] {
        &self.history
    }
}

/// Restores the process working directory on drop. Use with `#[serial]`.
pub struct CwdGuard(PathBuf);

impl CwdGuard {
    pub fn enter(dir: &Path) -> Self {
        let previous = std::env::current_dir().expect("Failed to get current directory");
        std::env::set_current_dir(dir).expect("Failed to change directory");
        Self(previous)
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.0);
    }
}
