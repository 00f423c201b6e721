use crate::error::PatternError;
use crate::grid::EdgeId;
use crate::locks::Lock;

use super::{PatternContext, PatternOutcome};

/// Cycle beside the corridor behind a plain door. The keycard waits at the
/// far end of the corridor, so the door only guards a shortcut.
pub(super) fn locked_cycle(
    context: &mut PatternContext<'_>,
    edge: EdgeId,
) -> Result<PatternOutcome, PatternError> {
    let detour = context.add_detour(edge)?;
    let mut outcome = PatternOutcome { vertices: detour.vertices.clone(), ..Default::default() };
    context.lock_branch(
        &mut outcome,
        Lock::Door { guarded: false },
        detour.near,
        detour.entrances.clone(),
        &[detour.far, detour.near],
    )?;
    Ok(outcome)
}

/// Door on the detour with its card at the near end, and a hazard on the
/// corridor itself whose switch sits inside the detour.
pub(super) fn double_lock_cycle(
    context: &mut PatternContext<'_>,
    edge: EdgeId,
) -> Result<PatternOutcome, PatternError> {
    let detour = context.add_detour(edge)?;
    let mut outcome = PatternOutcome { vertices: detour.vertices.clone(), ..Default::default() };
    context.lock_branch(
        &mut outcome,
        Lock::Door { guarded: false },
        detour.near,
        detour.entrances.clone(),
        &[detour.near, detour.far],
    )?;
    let danger = context.roll_danger();
    context.lock_branch(
        &mut outcome,
        Lock::for_danger(danger, true),
        detour.far,
        vec![detour.bypassed],
        &detour.vertices,
    )?;
    Ok(outcome)
}

pub(super) fn hidden_path(
    context: &mut PatternContext<'_>,
    edge: EdgeId,
) -> Result<PatternOutcome, PatternError> {
    let detour = context.add_detour(edge)?;
    for &id in &detour.edges {
        context.graph.set_hidden(id, true);
    }
    let mut outcome = PatternOutcome { vertices: detour.vertices.clone(), ..Default::default() };
    context.lock_branch(&mut outcome, Lock::Hidden, detour.near, detour.entrances, &[])?;
    Ok(outcome)
}

/// Dead end off the middle of a corridor holding a side objective. The
/// branch is gated by a rolled hazard whose key lies back at the corridor's
/// start.
pub(super) fn locked_fork(
    context: &mut PatternContext<'_>,
    edge: EdgeId,
) -> Result<PatternOutcome, PatternError> {
    let Some(corridor) = context.graph.edge(edge).cloned() else {
        return Err(PatternError::UnsuitableEdge("edge no longer exists"));
    };
    let (middle, _, _) = context.add_extension(edge)?;
    let sides = if corridor.is_straight() {
        corridor.from_direction.perpendicular()
    } else {
        corridor.from_direction | corridor.to_direction
    };
    let fork = sides
        .iter()
        .find_map(|side| context.add_fork(middle, Some(side), false).ok())
        .ok_or(PatternError::NoPlacement)?;
    context.graph.set_side_objective(fork.vertex);

    let mut outcome = PatternOutcome { vertices: vec![middle, fork.vertex], ..Default::default() };
    let danger = context.roll_danger();
    context.lock_branch(
        &mut outcome,
        Lock::for_danger(danger, false),
        fork.vertex,
        vec![fork.edge],
        &[corridor.from, corridor.to, middle],
    )?;
    Ok(outcome)
}

/// Open detour around a corridor that is itself blocked by a guarded hazard.
/// The switch for the hazard is on the detour.
pub(super) fn alternate_path(
    context: &mut PatternContext<'_>,
    edge: EdgeId,
) -> Result<PatternOutcome, PatternError> {
    let detour = context.add_detour(edge)?;
    let mut outcome = PatternOutcome { vertices: detour.vertices.clone(), ..Default::default() };
    let danger = context.roll_danger();
    context.lock_branch(
        &mut outcome,
        Lock::for_danger(danger, true),
        detour.near,
        vec![detour.bypassed],
        &detour.vertices,
    )?;
    Ok(outcome)
}
