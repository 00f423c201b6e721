use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use level_core::{
    GenerationConfig, GenerationError, Level, derive_attempt_seed, generate_level,
    generate_runtime_seed,
};
use serde::Serialize;
use slotmap::Key as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Generates a stealth level graph and its drawing, printed as JSON.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON generation config; missing fields take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    seed: Option<u64>,
    #[arg(long)]
    pattern_count: Option<u32>,
    #[arg(long)]
    floor_pattern_count: Option<u32>,
    /// Derived seeds tried when pattern placement gives up
    #[arg(short, long, default_value_t = 8)]
    attempts: u64,
    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report {
    seed: u64,
    attempt: u64,
    fingerprint: String,
    patterns: Vec<String>,
    maximum: [i64; 3],
    start: u64,
    end: u64,
    vertices: Vec<VertexReport>,
    edges: Vec<EdgeReport>,
    locks: Vec<LockReport>,
    keys: Vec<KeyReport>,
}

#[derive(Serialize)]
struct VertexReport {
    id: u64,
    grid: [i64; 3],
    drawn: [i64; 3],
    side_objective: bool,
}

#[derive(Serialize)]
struct EdgeReport {
    from: u64,
    to: u64,
    stairs: bool,
    hidden: bool,
}

#[derive(Serialize)]
struct LockReport {
    id: u64,
    kind: &'static str,
    vertex: u64,
    gated: usize,
}

#[derive(Serialize)]
struct KeyReport {
    kind: &'static str,
    vertex: u64,
    opens: Vec<u64>,
}

fn load_config(args: &Args) -> Result<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| "Failed to deserialize config JSON")?
        }
        None => GenerationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(count) = args.pattern_count {
        config.pattern_count = count;
    }
    if let Some(count) = args.floor_pattern_count {
        config.floor_pattern_count = count;
    }
    Ok(config)
}

fn generate(config: &GenerationConfig, attempts: u64) -> Result<(Level, u64)> {
    let seed = config.seed.unwrap_or_else(generate_runtime_seed);
    for attempt in 0..attempts.max(1) {
        let config =
            GenerationConfig { seed: Some(derive_attempt_seed(seed, attempt)), ..config.clone() };
        match generate_level(&config) {
            Ok(level) => return Ok((level, attempt)),
            Err(error @ (GenerationError::Pattern { .. } | GenerationError::NoGrowthEdge(_))) => {
                warn!(seed, attempt, %error, "attempt failed; retrying with a derived seed");
            }
            Err(error) => return Err(error).context("Level generation failed"),
        }
    }
    bail!("no level generated for seed {seed} after {attempts} attempts")
}

fn report(level: &Level, attempt: u64) -> Report {
    let graph = &level.generated.graph;
    let drawing = &level.drawing;
    let vertices = graph
        .vertices()
        .map(|(id, vertex)| {
            let drawn = drawing.position(id).unwrap_or_default();
            VertexReport {
                id: id.data().as_ffi(),
                grid: [vertex.x, vertex.y, vertex.z],
                drawn: [drawn.x, drawn.y, drawn.z],
                side_objective: vertex.side_objective,
            }
        })
        .collect();
    let edges = graph
        .edges()
        .map(|(_, edge)| EdgeReport {
            from: edge.from.data().as_ffi(),
            to: edge.to.data().as_ffi(),
            stairs: edge.is_inter_floor(),
            hidden: edge.hidden,
        })
        .collect();
    let locks = graph
        .locks()
        .map(|(id, placed)| LockReport {
            id: id.data().as_ffi(),
            kind: placed.lock.name(),
            vertex: placed.vertex.data().as_ffi(),
            gated: placed.gated.len(),
        })
        .collect();
    let keys = graph
        .keys()
        .map(|(_, placed)| KeyReport {
            kind: placed.key.name(),
            vertex: placed.vertex.data().as_ffi(),
            opens: placed.locks.iter().map(|lock| lock.data().as_ffi()).collect(),
        })
        .collect();

    Report {
        seed: level.generated.seed,
        attempt,
        fingerprint: format!("{:016x}", drawing.fingerprint()),
        patterns: level.generated.applied.iter().map(|pattern| format!("{pattern:?}")).collect(),
        maximum: [drawing.maximum_x, drawing.maximum_y, drawing.maximum_z],
        start: level.generated.start.data().as_ffi(),
        end: level.generated.end.data().as_ffi(),
        vertices,
        edges,
        locks,
        keys,
    }
}

fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env().add_directive(LevelFilter::WARN.into());
    tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(io::stderr).init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let (level, attempt) = generate(&config, args.attempts)?;
    info!(seed = level.generated.seed, attempt, "level generated");

    let json = serde_json::to_string_pretty(&report(&level, attempt))
        .with_context(|| "Failed to serialize level report")?;
    match &args.output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
