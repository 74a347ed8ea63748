//! Knowledge declaration types and their YAML files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Directory-scoped declaration file name.
pub const LAYERED_FILE_NAME: &str = ".knowledge.yml";

/// Suffix of single-file sidecar declarations (`<file>.know.yml`).
pub const SIDECAR_SUFFIX: &str = ".know.yml";

/// The role a knowledge entry plays in prompt assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    Examples,
    Implementations,
    Specifications,
    Dependencies,
    KnowledgeList,
}

impl Kind {
    /// Name used in declaration files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Examples => "examples",
            Kind::Implementations => "implementations",
            Kind::Specifications => "specifications",
            Kind::Dependencies => "dependencies",
            Kind::KnowledgeList => "knowledge-list",
        }
    }

    /// Instruction shown to the LLM above the entries of this kind
    pub fn description(&self) -> &'static str {
        match self {
            Kind::Examples => "Code examples. Use them as a reference for the implementation.",
            Kind::Implementations => {
                "Implementations that are available. Use them where appropriate."
            }
            Kind::Specifications => "Specifications. The implementation must satisfy them.",
            Kind::Dependencies => "Available libraries. Use them where appropriate.",
            Kind::KnowledgeList => "",
        }
    }

    /// All known kinds
    pub fn all() -> &'static [Kind] {
        &[
            Kind::Examples,
            Kind::Implementations,
            Kind::Specifications,
            Kind::Dependencies,
            Kind::KnowledgeList,
        ]
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match Kind::all().iter().find(|k| k.as_str() == s) {
            Some(kind) => Ok(*kind),
            None => {
                let valid: Vec<_> = Kind::all().iter().map(|k| k.as_str()).collect();
                bail!("Invalid kind: '{}'. Valid kinds: {}", s, valid.join(", "))
            }
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A reference exactly as declared in a knowledge file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeReference {
    pub path: String,
    pub kind: Kind,
    /// Marks the edge as significant for the dependency graph
    #[serde(default, rename = "chain-make", skip_serializing_if = "is_false")]
    pub chain_make: bool,
}

/// A reference whose path has been rewritten to its canonical absolute form.
///
/// The canonical path is the deduplication key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedKnowledge {
    pub path: PathBuf,
    pub kind: Kind,
    pub chain_make: bool,
}

/// Contents of a `.knowledge.yml` or `<file>.know.yml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeDeclarationFile {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub knowledge: Vec<KnowledgeReference>,
}

// `knowledge:` with no entries parses as null
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<KnowledgeReference>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<KnowledgeReference>>::deserialize(deserializer)?.unwrap_or_default())
}

impl KnowledgeDeclarationFile {
    /// Parse declaration YAML. An empty document declares nothing.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse knowledge declaration YAML")
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read knowledge file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Malformed knowledge file: {}", path.display()))
    }

    /// Read the file if present; a missing file is not an error.
    pub fn read_optional(path: &Path) -> Result<Option<Self>> {
        match fs::metadata(path) {
            Ok(_) => Self::read(path).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to check knowledge file: {}", path.display())),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).context("Failed to serialize knowledge declaration")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(path, content)
            .with_context(|| format!("Failed to write knowledge file: {}", path.display()))
    }
}

/// Location of the sidecar declaration for a target file
pub fn sidecar_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(SIDECAR_SUFFIX);
    target.with_file_name(name)
}
