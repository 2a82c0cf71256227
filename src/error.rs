use std::path::PathBuf;

/// Everything that can go wrong while labeling.
///
/// Conflict variants ([`Error::AlreadyPlaced`], [`Error::NotPlaced`],
/// [`Error::NoPreviousFrame`]) are recoverable and leave all state
/// untouched; configuration variants abort the session before any editing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("duplicate bodypart in configuration: {0}")]
    DuplicateBodypart(String),

    #[error("configuration lists no bodyparts")]
    NoBodyparts,

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigYaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("no frames matching {extensions:?} found in {dir}")]
    NoFrames {
        dir: PathBuf,
        extensions: Vec<String>,
    },

    #[error("no frame at index {0}")]
    FrameIndex(usize),

    #[error("unknown frame: {0}")]
    UnknownFrame(String),

    #[error("unknown bodypart: {0}")]
    UnknownBodypart(String),

    #[error("{0} is already annotated on this frame; select another bodypart")]
    AlreadyPlaced(String),

    #[error("{0} has no point on this frame")]
    NotPlaced(String),

    #[error("no previous frame to duplicate from")]
    NoPreviousFrame,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize annotations: {0}")]
    Serialize(#[from] serde_json::Error),
}
