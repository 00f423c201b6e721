use std::collections::BTreeSet;

use level_core::grid::Rect;
use level_core::{
    Directions, GenerationConfig, GenerationError, GridGraph, GridVertex, Level, VertexId,
    derive_attempt_seed, generate_level,
};
use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};

const ATTEMPTS: u64 = 8;

/// Generates a level, moving to the next derived seed when the pattern
/// phase gives up. Drawing failures are never retried.
fn generate_with_retries(config: &GenerationConfig, seed: u64) -> Result<Level, String> {
    for attempt in 0..ATTEMPTS {
        let config =
            GenerationConfig { seed: Some(derive_attempt_seed(seed, attempt)), ..config.clone() };
        match generate_level(&config) {
            Ok(level) => return Ok(level),
            Err(GenerationError::Pattern { .. } | GenerationError::NoGrowthEdge(_)) => continue,
            Err(error) => return Err(format!("seed {seed}: {error}")),
        }
    }
    Err(format!("seed {seed}: every attempt failed"))
}

fn check_exits(graph: &GridGraph) -> Result<(), String> {
    for (id, vertex) in graph.vertices() {
        let mut used = Directions::NONE;
        let mut stairs_up = false;
        let mut stairs_down = false;
        for edge in graph.incident_edges(id).into_iter().filter_map(|edge| graph.edge(edge)) {
            if edge.is_inter_floor() {
                if vertex.z == edge.min_z {
                    stairs_up = true;
                } else {
                    stairs_down = true;
                }
                continue;
            }
            let exit = edge.direction_at(id);
            if !exit.is_single() || used.intersects(exit) {
                return Err(format!("vertex {id:?} reuses exit {exit:?}"));
            }
            used.insert(exit);
        }
        if used != vertex.exits {
            return Err(format!("vertex {id:?} records {:?} but uses {used:?}", vertex.exits));
        }
        if stairs_up != vertex.top_exit || stairs_down != vertex.bottom_exit {
            return Err(format!("vertex {id:?} has stale stair flags"));
        }
    }
    Ok(())
}

fn common_part(a: &Rect, b: &Rect) -> Option<Rect> {
    a.intersects(b).then(|| Rect {
        min_x: a.min_x.max(b.min_x),
        min_y: a.min_y.max(b.min_y),
        max_x: a.max_x.min(b.max_x),
        max_y: a.max_y.min(b.max_y),
    })
}

/// Corridors sharing a floor meet only at a common end, and no vertex sits
/// on a corridor it does not belong to.
fn check_geometry(graph: &GridGraph) -> Result<(), String> {
    let edges: Vec<_> = graph.edges().collect();
    for (at, &(a_id, a)) in edges.iter().enumerate() {
        for &(b_id, b) in &edges[at + 1..] {
            if a.max_z < b.min_z || b.max_z < a.min_z {
                continue;
            }
            let shared: Vec<(i64, i64)> = [a.from, a.to]
                .into_iter()
                .filter(|&vertex| b.touches(vertex))
                .filter_map(|vertex| graph.vertex(vertex))
                .map(GridVertex::position)
                .collect();
            for first in a.segments() {
                for second in b.segments() {
                    let Some(common) = common_part(&first, &second) else {
                        continue;
                    };
                    let single = common.min_x == common.max_x && common.min_y == common.max_y;
                    if !single || !shared.contains(&(common.min_x, common.min_y)) {
                        return Err(format!("{a_id:?} and {b_id:?} overlap at {common:?}"));
                    }
                }
            }
        }
    }

    for (id, vertex) in graph.vertices() {
        let point = Rect::point(vertex.x, vertex.y);
        for &(edge_id, edge) in &edges {
            if edge.touches(id) || vertex.z < edge.min_z || vertex.z > edge.max_z {
                continue;
            }
            if edge.segments().iter().any(|segment| segment.intersects(&point)) {
                return Err(format!("vertex {id:?} lies on {edge_id:?}"));
            }
        }
    }
    Ok(())
}

fn check_solvable(graph: &GridGraph, start: VertexId) -> Result<(), String> {
    for (lock_id, placed) in graph.locks() {
        let reachable = graph.reachable_from(start, &placed.gated);
        for key in graph.keys_for(lock_id) {
            let site = graph.key(key).map(|placed| placed.vertex);
            if !site.is_some_and(|site| reachable.contains(&site)) {
                return Err(format!("{} key is locked behind itself", placed.lock.name()));
            }
        }
    }
    Ok(())
}

fn check_drawing(level: &Level) -> Result<(), String> {
    let drawing = &level.drawing;
    let count = level.generated.graph.vertex_count();
    let rows: BTreeSet<i64> = drawing.vertex_positions.values().map(|pos| pos.y).collect();
    if rows.len() != count || rows != (0..count as i64).collect() {
        return Err("st-numbering is not a bijection onto the rows".to_string());
    }
    let start_row = drawing.position(level.generated.start).map(|pos| pos.y);
    let end_row = drawing.position(level.generated.end).map(|pos| pos.y);
    if start_row != Some(0) || end_row != Some(count as i64 - 1) {
        return Err("start and end are not the extreme rows".to_string());
    }

    let mut lines: Vec<_> = drawing.horizontal_lines.iter().collect();
    lines.extend(&drawing.vertical_lines);
    for (at, a) in lines.iter().enumerate() {
        if let Some(b) = lines[at + 1..].iter().find(|b| a.overlaps(b)) {
            return Err(format!("{a:?} overlaps {b:?}"));
        }
    }
    for bar in &drawing.horizontal_lines {
        for line in &drawing.vertical_lines {
            if line.y1 < bar.y1 && bar.y1 < line.y2 && bar.x1 <= line.x1 && line.x1 <= bar.x2 {
                return Err(format!("{line:?} crosses {bar:?}"));
            }
        }
    }
    if drawing.vertical_lines.len() != level.generated.graph.edge_count() {
        return Err("every corridor needs exactly one vertical line".to_string());
    }
    Ok(())
}

fn check_level(config: &GenerationConfig, seed: u64) -> Result<(), String> {
    let level = generate_with_retries(config, seed)?;
    let graph = &level.generated.graph;
    check_exits(graph)?;
    check_geometry(graph)?;
    check_solvable(graph, level.generated.start)?;
    check_drawing(&level)?;
    if !graph.reachable_from(level.generated.start, &[]).contains(&level.generated.end) {
        return Err("end is cut off from start".to_string());
    }
    Ok(())
}

#[test]
fn test_property_default_levels_keep_invariants() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(24));
    let config = GenerationConfig::default();
    runner
        .run(&any::<u64>(), |seed| {
            check_level(&config, seed).map_err(TestCaseError::fail)?;
            Ok(())
        })
        .expect("generated levels should keep their invariants");
}

#[test]
fn test_property_single_floor_levels_keep_invariants() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(24));
    let config =
        GenerationConfig { floor_pattern_count: 0, pattern_count: 8, ..Default::default() };
    runner
        .run(&any::<u64>(), |seed| {
            check_level(&config, seed).map_err(TestCaseError::fail)?;
            Ok(())
        })
        .expect("single floor levels should keep their invariants");
}

#[test]
fn test_property_crowded_levels_keep_invariants() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(8));
    let config =
        GenerationConfig { floor_pattern_count: 3, pattern_count: 20, ..Default::default() };
    runner
        .run(&any::<u64>(), |seed| {
            check_level(&config, seed).map_err(TestCaseError::fail)?;
            Ok(())
        })
        .expect("crowded levels should keep their invariants");
}
