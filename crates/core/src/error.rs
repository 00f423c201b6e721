use thiserror::Error;

use crate::pattern::Pattern;

/// Top-level error for a generation run.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("pattern {pattern:?} failed: {source}")]
    Pattern {
        pattern: Pattern,
        #[source]
        source: PatternError,
    },

    #[error("seed graph has no {0} edge to grow from")]
    NoGrowthEdge(&'static str),

    #[error(transparent)]
    Draw(#[from] DrawError),
}

/// Rejected before generation starts; no partial run happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("floor_pattern_count is {0} but every floor pattern is disabled")]
    NoFloorPatternEnabled(u32),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("no collision-free placement found")]
    NoPlacement,

    #[error("edge is not usable by this pattern: {0}")]
    UnsuitableEdge(&'static str),
}

/// A placement attempt that ran into existing geometry or occupied exits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Collision;

impl From<Collision> for PatternError {
    fn from(_: Collision) -> Self {
        PatternError::NoPlacement
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("vertex {0} does not exist")]
    MissingVertex(usize),

    #[error("source and sink must differ")]
    SameEndpoints,

    #[error("edge ({0}, {1}) is required but missing")]
    MissingEdge(usize, usize),

    #[error("graph is not connected")]
    Disconnected,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("graph is not planar")]
    NonPlanar,

    #[error("graph is empty")]
    Empty,

    #[error("start or end vertex is missing from the graph")]
    MissingTerminal,

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, GenerationError>;
