//! # Pattern Databases
//!
//! A pattern database stores the exact abstract goal distance of every
//! abstract state of one projection. Distances are computed once at
//! construction by a backward uniform-cost search and are immutable
//! afterwards; lookups are two array reads and a hash computation.
//!
//! ## Construction
//!
//! The search runs on abstract state indices instead of states, using the
//! projection's perfect hash. It starts at the projected goal state with
//! distance zero and regresses: an operator is applicable to a state when
//! the state matches the operator's effect values, and regressing it
//! overwrites those values with the preconditions. This direction is
//! sufficient for regression because the task is in transition normal form,
//! where every entry carries both values.
//!
//! The priority queue performs no decrease-key. Improved distances are
//! simply pushed again and superseded entries are skipped when popped,
//! against the distance committed at first pop.
//!
//! ## Example
//!
//! ```rust
//! use patdb::pdb::PatternDatabase;
//! use patdb::projection::Pattern;
//! use patdb::task::{TnfOperator, TnfOperatorEntry, TnfState, TnfTask, VariableId};
//!
//! let task = TnfTask {
//!     variable_domains: vec![2, 2],
//!     operators: vec![TnfOperator {
//!         name: "set-v0".to_string(),
//!         cost: 1,
//!         entries: vec![TnfOperatorEntry {
//!             variable: VariableId(0),
//!             precondition: 0,
//!             effect: 1,
//!         }],
//!     }],
//!     initial_state: TnfState::new(vec![0, 0]),
//!     goal_state: TnfState::new(vec![1, 1]),
//! };
//! let pdb = PatternDatabase::new(&task, Pattern::singleton(VariableId(0)))?;
//! assert_eq!(pdb.lookup_distance(&TnfState::new(vec![0, 1])), 1);
//! assert_eq!(pdb.lookup_distance(&TnfState::new(vec![1, 1])), 0);
//! # Ok::<(), patdb::errors::PdbError>(())
//! ```

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::errors::PdbError;
use crate::projection::{Pattern, Projection};
use crate::task::{TnfState, TnfTask};

/// Sentinel distance of an abstract state with no backward path to the goal.
///
/// A state mapping to this value is a dead end in the abstraction, which
/// proves the original state is a dead end in the task. The sentinel must
/// never take part in arithmetic; consumers check for it first.
pub const INFINITY: u32 = u32::MAX;

/// Exact abstract goal distances for one pattern.
#[derive(Debug, Clone)]
pub struct PatternDatabase {
    projection: Projection,
    distances: Vec<u32>,
}

impl PatternDatabase {
    /// Projects `task` onto `pattern` and computes all abstract goal
    /// distances.
    ///
    /// # Errors
    ///
    /// Returns [`PdbError::InvalidTask`] for tasks violating transition
    /// normal form, and the projection errors of [`Projection::new`] for
    /// malformed or oversized patterns.
    pub fn new(task: &TnfTask, pattern: Pattern) -> Result<Self, PdbError> {
        task.validate()?;
        let projection = Projection::new(task, pattern)?;
        let distances = compute_goal_distances(&projection);
        Ok(Self {
            projection,
            distances,
        })
    }

    /// Returns the abstract goal distance of a full state of the original
    /// task, or [`INFINITY`] if its abstraction cannot reach the goal.
    pub fn lookup_distance(&self, state: &TnfState) -> u32 {
        let abstract_state = self.projection.project(state);
        self.distances[self.projection.rank(&abstract_state)]
    }

    /// Returns the pattern this database was built for.
    pub fn pattern(&self) -> &Pattern {
        self.projection.pattern()
    }

    /// Returns the number of abstract states, which is the length of the
    /// distance table.
    pub fn num_abstract_states(&self) -> usize {
        self.distances.len()
    }
}

/// Backward uniform-cost search over abstract state indices.
fn compute_goal_distances(projection: &Projection) -> Vec<u32> {
    let projected = projection.projected_task();
    let mut distances = vec![INFINITY; projection.num_states()];

    // Min-heap of (distance, index) entries via Reverse.
    let mut queue: BinaryHeap<Reverse<(u32, usize)>> = BinaryHeap::new();
    queue.push(Reverse((0, projection.rank(&projected.goal_state))));

    while let Some(Reverse((distance, index))) = queue.pop() {
        if distances[index] <= distance {
            // A better path was already committed; the entry is stale.
            continue;
        }
        distances[index] = distance;

        let state = projection.unrank(index);
        for op in &projected.operators {
            let regressable = op
                .entries
                .iter()
                .all(|entry| state.value(entry.variable) == entry.effect);
            if !regressable {
                continue;
            }
            let mut predecessor = state.clone();
            for entry in &op.entries {
                predecessor.set_value(entry.variable, entry.precondition);
            }
            // A saturated distance equals the sentinel and is never pushed.
            let new_distance = distance.saturating_add(op.cost);
            let predecessor_index = projection.rank(&predecessor);
            if new_distance < distances[predecessor_index] {
                queue.push(Reverse((new_distance, predecessor_index)));
            }
        }
    }

    distances
}
