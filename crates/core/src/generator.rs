//! Orchestration of one generation run: the seed graph, floor patterns over
//! the stairs, then room patterns floor by floor.

use std::collections::BTreeMap;

use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};
use tracing::{debug, info, warn};

use crate::config::GenerationConfig;
use crate::directions::Directions;
use crate::drawer::GraphDrawer;
use crate::error::{GenerationError, PatternError, Result};
use crate::grid::{EdgeId, GridGraph, KeyId, LockId, STEP, VertexId};
use crate::locks::DangerType;
use crate::model::GraphDrawing;
use crate::pattern::{Pattern, PatternContext};
use crate::seed::choose;

/// Fresh (pattern, edge) draws tried for one step before the run aborts.
pub const MAX_PATTERN_ATTEMPTS: u32 = 16;

pub struct GridGraphGenerator {
    config: GenerationConfig,
    seed: u64,
    rng: ChaCha8Rng,
    dangers: Vec<DangerType>,
    graph: GridGraph,
    start: VertexId,
    end: VertexId,
    applied: Vec<Pattern>,
}

/// Finished dungeon graph of one run.
#[derive(Clone, Debug)]
pub struct GeneratedGraph {
    pub graph: GridGraph,
    pub start: VertexId,
    pub end: VertexId,
    pub seed: u64,
    /// Patterns in the order they were applied.
    pub applied: Vec<Pattern>,
}

impl GeneratedGraph {
    pub fn lock_vertices(&self) -> BTreeMap<LockId, VertexId> {
        self.graph.locks().map(|(id, placed)| (id, placed.vertex)).collect()
    }

    pub fn key_vertices(&self) -> BTreeMap<KeyId, VertexId> {
        self.graph.keys().map(|(id, placed)| (id, placed.vertex)).collect()
    }
}

/// A generated graph together with its drawing.
#[derive(Clone, Debug)]
pub struct Level {
    pub generated: GeneratedGraph,
    pub drawing: GraphDrawing,
}

pub fn generate_level(config: &GenerationConfig) -> Result<Level> {
    let generated = GridGraphGenerator::new(config)?.generate()?;
    let drawing = GraphDrawer::new(&generated.graph, generated.start, generated.end).draw()?;
    Ok(Level { generated, drawing })
}

impl GridGraphGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.resolve_seed();
        let mut graph = GridGraph::new();
        let start = graph.add_grid_vertex(0, 0, 0);
        let end = if config.is_multi_floor() {
            let stub_a = graph.add_grid_vertex(STEP, 0, 0);
            let stub_b = graph.add_grid_vertex(STEP, 0, STEP);
            let end = graph.add_grid_vertex(2 * STEP, 0, STEP);
            graph.add_grid_edge(start, stub_a, Directions::EAST, Directions::WEST);
            graph.add_inter_floor_edge(stub_a, stub_b);
            graph.add_grid_edge(stub_b, end, Directions::EAST, Directions::WEST);
            end
        } else {
            let end = graph.add_grid_vertex(STEP, 0, 0);
            graph.add_grid_edge(start, end, Directions::EAST, Directions::WEST);
            end
        };

        Ok(Self {
            config: config.clone(),
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            dangers: config.enabled_dangers(),
            graph,
            start,
            end,
            applied: Vec::new(),
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn graph(&self) -> &GridGraph {
        &self.graph
    }

    pub fn generate(mut self) -> Result<GeneratedGraph> {
        let floor_patterns = self.config.enabled_floor_patterns();
        for _ in 0..self.config.floor_pattern_count {
            let grown = self.apply_with_retries(&floor_patterns, |graph, rng| {
                graph.get_random_interfloor_edge(rng)
            })?;
            if !grown {
                return Err(GenerationError::NoGrowthEdge("inter-floor"));
            }
        }

        let room_patterns = self.config.enabled_room_patterns();
        if !room_patterns.is_empty() {
            for floor in self.graph.floors() {
                for _ in 0..self.config.pattern_count {
                    let grown = self.apply_with_retries(&room_patterns, |graph, rng| {
                        graph.get_random_floor_edge(rng, floor, false)
                    })?;
                    if !grown {
                        debug!(floor, "floor has no open corridor; skipping");
                        break;
                    }
                }
            }
        }

        info!(
            seed = self.seed,
            vertices = self.graph.vertex_count(),
            edges = self.graph.edge_count(),
            patterns = self.applied.len(),
            "level graph generated"
        );
        Ok(GeneratedGraph {
            graph: self.graph,
            start: self.start,
            end: self.end,
            seed: self.seed,
            applied: self.applied,
        })
    }

    /// Returns `Ok(false)` when `pick` finds no edge to grow from.
    fn apply_with_retries(
        &mut self,
        patterns: &[Pattern],
        pick: impl Fn(&GridGraph, &mut ChaCha8Rng) -> Option<EdgeId>,
    ) -> Result<bool> {
        let mut last_failure: Option<(Pattern, PatternError)> = None;
        for attempt in 0..MAX_PATTERN_ATTEMPTS {
            let Some(pattern) = choose(&mut self.rng, patterns) else {
                return Ok(false);
            };
            let Some(edge) = pick(&self.graph, &mut self.rng) else {
                return Ok(false);
            };
            let mut context = PatternContext {
                graph: &mut self.graph,
                rng: &mut self.rng,
                start: self.start,
                dangers: &self.dangers,
            };
            match pattern.apply(&mut context, edge) {
                Ok(_) => {
                    self.applied.push(pattern);
                    return Ok(true);
                }
                Err(error) => {
                    debug!(?pattern, attempt, %error, "pattern attempt failed");
                    last_failure = Some((pattern, error));
                }
            }
        }

        let Some((pattern, source)) = last_failure else {
            return Ok(false);
        };
        warn!(seed = self.seed, ?pattern, %source, "giving up after repeated pattern failures");
        Err(GenerationError::Pattern { pattern, source })
    }
}
