use std::path::PathBuf;
use terradep_state::State;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("more than one deployment has the same path: {}", path.display())]
    DuplicatePath { path: PathBuf },

    #[error(
        "more than one deployment has the same state: {state}, first: {}, second: {}",
        first.display(),
        second.display()
    )]
    DuplicateState {
        state: State,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("none of the {nodes} deployments is independent, references form a cycle")]
    NoHeads { nodes: usize },

    #[error(
        "deployments reference each other in a cycle no independent deployment reaches: {}",
        states.iter().map(|state| state.as_str()).collect::<Vec<_>>().join(", ")
    )]
    UnreachableCycle { states: Vec<State> },

    #[error(
        "state {state} is owned by two deployments: {} and {}",
        first.display(),
        second.display()
    )]
    ConflictingPath {
        state: State,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("deployment {} has two states: {first} and {second}", path.display())]
    ConflictingState {
        path: PathBuf,
        first: State,
        second: State,
    },

    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
