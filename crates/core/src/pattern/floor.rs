use crate::error::PatternError;
use crate::grid::EdgeId;
use crate::locks::Lock;
use crate::seed::random_bool;

use super::primitives::Fork;
use super::{PatternContext, PatternOutcome};

/// Second staircase behind a light wall; the switch stays by the old stairs.
pub(super) fn floor_locked_cycle(
    context: &mut PatternContext<'_>,
    edge: EdgeId,
) -> Result<PatternOutcome, PatternError> {
    let detour = context.add_floor_detour(edge)?;
    let mut outcome = PatternOutcome { vertices: detour.vertices.clone(), ..Default::default() };
    context.lock_branch(
        &mut outcome,
        Lock::LightWall,
        detour.near,
        detour.entrances.clone(),
        &[detour.near, detour.far],
    )?;
    Ok(outcome)
}

pub(super) fn floor_hidden_path(
    context: &mut PatternContext<'_>,
    edge: EdgeId,
) -> Result<PatternOutcome, PatternError> {
    let detour = context.add_floor_detour(edge)?;
    for &id in &detour.edges {
        context.graph.set_hidden(id, true);
    }
    let mut outcome = PatternOutcome { vertices: detour.vertices.clone(), ..Default::default() };
    context.lock_branch(&mut outcome, Lock::Hidden, detour.near, detour.entrances, &[])?;
    Ok(outcome)
}

/// Dead end reached from a landing halfway up the stairs, or failing that a
/// whole new floor above or below them. The hazard's key is left on the
/// staircase's lower end.
pub(super) fn floor_locked_fork(
    context: &mut PatternContext<'_>,
    edge: EdgeId,
) -> Result<PatternOutcome, PatternError> {
    let Some(stairs) = context.graph.edge(edge).cloned() else {
        return Err(PatternError::UnsuitableEdge("edge no longer exists"));
    };
    let low_first = context.graph.vertex(stairs.from).is_some_and(|v| v.z == stairs.min_z);
    let (low, high) = if low_first { (stairs.from, stairs.to) } else { (stairs.to, stairs.from) };

    let mut vertices = Vec::new();
    let branch: Option<Fork> = match context.add_inter_floor_extension(edge) {
        Ok((landing, _, _)) => {
            vertices.push(landing);
            context.add_fork(landing, None, false).ok()
        }
        Err(_) => None,
    };
    let (fork, base) = match branch {
        Some(fork) => (fork, vertices[0]),
        None => {
            let upward_first = random_bool(context.rng);
            let attempts = [(high, upward_first), (low, !upward_first)];
            let (floor_fork, base) = attempts
                .into_iter()
                .find_map(|(vertex, upward)| {
                    context.add_floor_fork(vertex, upward).ok().map(|fork| (fork, vertex))
                })
                .ok_or(PatternError::NoPlacement)?;
            vertices.push(floor_fork.landing);
            (Fork { vertex: floor_fork.corridor.vertex, edge: floor_fork.stair }, base)
        }
    };
    vertices.push(fork.vertex);
    context.graph.set_side_objective(fork.vertex);

    let mut outcome = PatternOutcome { vertices, ..Default::default() };
    let danger = context.roll_danger();
    context.lock_branch(
        &mut outcome,
        Lock::for_danger(danger, false),
        base,
        vec![fork.edge],
        &[low, high, base],
    )?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use crate::directions::Directions;
    use crate::grid::{EdgeId, GridGraph, STEP, VertexId};
    use crate::locks::Lock;
    use crate::pattern::{Pattern, PatternContext};

    fn stairwell() -> (GridGraph, VertexId, EdgeId) {
        let mut graph = GridGraph::new();
        let start = graph.add_grid_vertex(0, 0, 0);
        let stub_a = graph.add_grid_vertex(STEP, 0, 0);
        let stub_b = graph.add_grid_vertex(STEP, 0, STEP);
        let end = graph.add_grid_vertex(2 * STEP, 0, STEP);
        graph.add_grid_edge(start, stub_a, Directions::EAST, Directions::WEST);
        let stairs = graph.add_inter_floor_edge(stub_a, stub_b).expect("different floors");
        graph.add_grid_edge(stub_b, end, Directions::EAST, Directions::WEST);
        (graph, start, stairs)
    }

    #[test]
    fn floor_locked_cycle_adds_a_parallel_staircase_behind_a_light_wall() {
        let (mut graph, start, stairs) = stairwell();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut context = PatternContext { graph: &mut graph, rng: &mut rng, start, dangers: &[] };
        let outcome = Pattern::FloorLockedCycle.apply(&mut context, stairs).expect("open floors");
        assert_eq!(graph.cycle_rank(), 1);
        assert_eq!(graph.inter_floor_edges().len(), 2);
        let placed = graph.lock(outcome.locks[0]).expect("lock exists");
        assert_eq!(placed.lock, Lock::LightWall);
        let key = graph.keys_for(outcome.locks[0])[0];
        let site = graph.key(key).map(|placed| placed.vertex).expect("key exists");
        assert!(graph.reachable_from(start, &placed.gated).contains(&site));
    }

    #[test]
    fn floor_hidden_path_hides_every_new_edge() {
        let (mut graph, start, stairs) = stairwell();
        let mut rng = ChaCha8Rng::seed_from_u64(22);
        let mut context = PatternContext { graph: &mut graph, rng: &mut rng, start, dangers: &[] };
        let outcome = Pattern::FloorHiddenPath.apply(&mut context, stairs).expect("open floors");
        assert!(outcome.keys.is_empty());
        assert_eq!(graph.edges().filter(|(_, edge)| edge.hidden).count(), 3);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(graph.get_random_interfloor_edge(&mut rng), Some(stairs));
    }

    #[test]
    fn floor_locked_fork_uses_a_landing_floor() {
        let (mut graph, start, stairs) = stairwell();
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let mut context = PatternContext { graph: &mut graph, rng: &mut rng, start, dangers: &[] };
        let outcome = Pattern::FloorLockedFork.apply(&mut context, stairs).expect("open floors");
        assert_eq!(graph.floors(), vec![0, STEP / 2, STEP]);
        let dead_end = *outcome.vertices.last().expect("dead end recorded");
        assert!(graph.vertex(dead_end).is_some_and(|v| v.side_objective && v.z == STEP / 2));
        let placed = graph.lock(outcome.locks[0]).expect("lock exists");
        let key = graph.keys_for(outcome.locks[0])[0];
        let site = graph.key(key).map(|placed| placed.vertex).expect("key exists");
        assert!(graph.reachable_from(start, &placed.gated).contains(&site));
        assert!(!graph.reachable_from(start, &placed.gated).contains(&dead_end));
    }
}
