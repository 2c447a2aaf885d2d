use std::path::PathBuf;
use terradep_graph::GraphError;
use terradep_state::ResolveError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("path does not exist: {}", path.display())]
    RootNotFound { path: PathBuf },

    #[error("it is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("walking {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("parsing configuration {}: {reason}", path.display())]
    ConfigurationParse { path: PathBuf, reason: String },

    #[error("resolving state in module {}: {source}", path.display())]
    Resolve {
        path: PathBuf,
        source: ResolveError,
    },

    #[error(
        "module {}: expected to resolve {declared} remote states, but resolved {resolved}",
        path.display()
    )]
    IncompleteResolution {
        path: PathBuf,
        declared: usize,
        resolved: usize,
    },

    #[error("invalid exclusion pattern {pattern:?}: {source}")]
    InvalidExclusion {
        pattern: String,
        source: globset::Error,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}
