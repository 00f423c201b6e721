pub mod config;
pub mod directions;
pub mod drawer;
pub mod error;
pub mod generator;
pub mod graph;
pub mod grid;
pub mod locks;
pub mod model;
pub mod pattern;
pub mod seed;

pub use config::GenerationConfig;
pub use directions::Directions;
pub use drawer::GraphDrawer;
pub use error::{ConfigError, DrawError, GenerationError, GraphError, PatternError, Result};
pub use generator::{
    GeneratedGraph, GridGraphGenerator, Level, MAX_PATTERN_ATTEMPTS, generate_level,
};
pub use grid::{EdgeId, GridEdge, GridGraph, GridVertex, KeyId, LockId, STEP, VertexId};
pub use locks::{DangerType, Key, Lock, Obstacle, Pickup, Scene, Site};
pub use model::{DrawPos, GraphDrawing, Segment};
pub use pattern::Pattern;
pub use seed::{derive_attempt_seed, generate_runtime_seed};
