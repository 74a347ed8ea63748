//! Knowledge declarations: discovery, path normalization and loading.

pub mod load;
pub mod normalize;
pub mod scan;
pub mod types;

pub use load::{load, KnowledgeSet, LoadedKnowledge};
pub use normalize::{normalize, PathNormalizeError, PROJECT_ROOT_PREFIX};
pub use scan::{KnowledgeScanner, Source};
pub use types::{
    sidecar_path, Kind, KnowledgeDeclarationFile, KnowledgeReference, NormalizedKnowledge,
    LAYERED_FILE_NAME, SIDECAR_SUFFIX,
};
