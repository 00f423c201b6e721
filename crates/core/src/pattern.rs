//! Graph rewrite rules. Each pattern grows one structural feature (a cycle,
//! a dead end or a floor link) and gates the new branch with a lock whose key
//! stays reachable without it.

mod floor;
mod primitives;
mod room;

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PatternError;
use crate::grid::{EdgeId, GridGraph, KeyId, LockId, VertexId};
use crate::locks::{DangerType, Lock};
use crate::seed::choose;

pub use primitives::{Detour, Fork, SidePath};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pattern {
    LockedCycle,
    DoubleLockCycle,
    HiddenPath,
    LockedFork,
    AlternatePath,
    FloorHiddenPath,
    FloorLockedCycle,
    FloorLockedFork,
}

impl Pattern {
    pub const ROOM: [Pattern; 5] = [
        Pattern::LockedCycle,
        Pattern::DoubleLockCycle,
        Pattern::HiddenPath,
        Pattern::LockedFork,
        Pattern::AlternatePath,
    ];

    pub const FLOOR: [Pattern; 3] =
        [Pattern::FloorHiddenPath, Pattern::FloorLockedCycle, Pattern::FloorLockedFork];

    /// Floor patterns grow from inter-floor edges, room patterns from
    /// corridors on a single floor.
    pub fn is_floor_pattern(self) -> bool {
        Self::FLOOR.contains(&self)
    }

    pub fn apply(
        self,
        context: &mut PatternContext<'_>,
        edge: EdgeId,
    ) -> Result<PatternOutcome, PatternError> {
        let Some(target) = context.graph.edge(edge) else {
            return Err(PatternError::UnsuitableEdge("edge no longer exists"));
        };
        if target.is_inter_floor() != self.is_floor_pattern() {
            return Err(PatternError::UnsuitableEdge("wrong edge kind for this pattern"));
        }

        let outcome = match self {
            Pattern::LockedCycle => room::locked_cycle(context, edge),
            Pattern::DoubleLockCycle => room::double_lock_cycle(context, edge),
            Pattern::HiddenPath => room::hidden_path(context, edge),
            Pattern::LockedFork => room::locked_fork(context, edge),
            Pattern::AlternatePath => room::alternate_path(context, edge),
            Pattern::FloorHiddenPath => floor::floor_hidden_path(context, edge),
            Pattern::FloorLockedCycle => floor::floor_locked_cycle(context, edge),
            Pattern::FloorLockedFork => floor::floor_locked_fork(context, edge),
        }?;
        debug!(
            pattern = ?self,
            vertices = outcome.vertices.len(),
            locks = outcome.locks.len(),
            keys = outcome.keys.len(),
            "pattern applied"
        );
        Ok(outcome)
    }
}

/// Mutable state one pattern application works against. The generator owns
/// every piece; patterns only borrow them.
pub struct PatternContext<'a> {
    pub graph: &'a mut GridGraph,
    pub rng: &'a mut ChaCha8Rng,
    pub start: VertexId,
    /// Enabled danger types. A plain door is always an option.
    pub dangers: &'a [DangerType],
}

/// What a pattern added, in creation order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternOutcome {
    pub vertices: Vec<VertexId>,
    pub locks: Vec<LockId>,
    pub keys: Vec<KeyId>,
}

impl PatternContext<'_> {
    pub fn roll_danger(&mut self) -> DangerType {
        let mut options = vec![DangerType::None];
        options.extend(self.dangers.iter().copied().filter(|&danger| danger != DangerType::None));
        choose(self.rng, &options).unwrap_or(DangerType::None)
    }

    /// Places `lock` on `vertex`, gating `gated`, and its key on the first
    /// candidate reachable from the start without crossing the gated edges.
    pub(crate) fn lock_branch(
        &mut self,
        outcome: &mut PatternOutcome,
        lock: Lock,
        vertex: VertexId,
        gated: Vec<EdgeId>,
        key_candidates: &[VertexId],
    ) -> Result<LockId, PatternError> {
        let key_site = match lock.new_key() {
            None => None,
            Some(key) => {
                let reachable = self.graph.reachable_from(self.start, &gated);
                let site = key_candidates
                    .iter()
                    .copied()
                    .find(|candidate| reachable.contains(candidate))
                    .ok_or(PatternError::UnsuitableEdge("no key site reachable around the lock"))?;
                Some((key, site))
            }
        };

        let lock_id = self.graph.add_lock(vertex, lock, gated);
        outcome.locks.push(lock_id);
        if let Some((key, site)) = key_site {
            outcome.keys.push(self.graph.add_key(site, key, vec![lock_id]));
        }
        Ok(lock_id)
    }

    /// New edges running beside `original` stay behind every lock that
    /// already gates it.
    pub(crate) fn inherit_gating(&mut self, original: EdgeId, edges: &[EdgeId]) {
        for lock in self.graph.locks_gating(original) {
            for &edge in edges {
                self.graph.gate(lock, edge);
            }
        }
    }
}
