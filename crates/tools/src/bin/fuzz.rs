use anyhow::{Result, bail};
use clap::Parser;
use level_core::{
    GenerationConfig, GenerationError, GraphDrawing, GridGraph, VertexId, derive_attempt_seed,
    generate_level,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 200)]
    levels: u32,
    #[arg(long, default_value_t = 8)]
    attempts: u64,
    #[arg(long)]
    pattern_count: Option<u32>,
    #[arg(long)]
    floor_pattern_count: Option<u32>,
}

fn check_solvable(graph: &GridGraph, start: VertexId) -> Result<(), String> {
    for (lock_id, placed) in graph.locks() {
        let reachable = graph.reachable_from(start, &placed.gated);
        for key in graph.keys_for(lock_id) {
            if !graph.key(key).is_some_and(|key| reachable.contains(&key.vertex)) {
                return Err(format!("{} key unreachable", placed.lock.name()));
            }
        }
    }
    Ok(())
}

fn check_drawing(drawing: &GraphDrawing, vertex_count: usize) -> Result<(), String> {
    let mut rows: Vec<i64> = drawing.vertex_positions.values().map(|pos| pos.y).collect();
    rows.sort_unstable();
    if rows != (0..vertex_count as i64).collect::<Vec<_>>() {
        return Err("rows are not a permutation".to_string());
    }
    for bar in &drawing.horizontal_lines {
        for line in &drawing.vertical_lines {
            if line.y1 < bar.y1 && bar.y1 < line.y2 && bar.x1 <= line.x1 && line.x1 <= bar.x2 {
                return Err(format!("{line:?} crosses {bar:?}"));
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env().add_directive(LevelFilter::WARN.into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();
    let mut base = GenerationConfig::default();
    if let Some(count) = args.pattern_count {
        base.pattern_count = count;
    }
    if let Some(count) = args.floor_pattern_count {
        base.floor_pattern_count = count;
    }

    println!("Fuzzing {} levels from seed {}...", args.levels, args.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut retried = 0_u32;
    let mut failures = Vec::new();

    for _ in 0..args.levels {
        let seed = rng.next_u64();
        let mut outcome = Err(format!("seed {seed}: every attempt failed"));
        for attempt in 0..args.attempts.max(1) {
            let config =
                GenerationConfig { seed: Some(derive_attempt_seed(seed, attempt)), ..base.clone() };
            match generate_level(&config) {
                Ok(level) => {
                    let graph = &level.generated.graph;
                    outcome = check_solvable(graph, level.generated.start)
                        .and_then(|()| check_drawing(&level.drawing, graph.vertex_count()))
                        .map_err(|error| format!("seed {seed}: {error}"));
                    break;
                }
                Err(GenerationError::Pattern { .. } | GenerationError::NoGrowthEdge(_)) => {
                    retried += 1;
                }
                Err(error) => {
                    outcome = Err(format!("seed {seed}: {error}"));
                    break;
                }
            }
        }
        if let Err(failure) = outcome {
            failures.push(failure);
        }
    }

    println!("{} levels checked, {} retries, {} failures", args.levels, retried, failures.len());
    for failure in &failures {
        println!("  {failure}");
    }
    if !failures.is_empty() {
        bail!("invariants failed for {} levels", failures.len());
    }
    Ok(())
}
