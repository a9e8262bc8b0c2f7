//! # Hill Climbing over Pattern Collections
//!
//! Local search for a good pattern collection, evaluated against a fixed
//! set of sample states. The search starts from one singleton pattern per
//! goal variable (in transition normal form that is every variable), and in
//! each round grows a single pattern by a single causally relevant variable.
//! A candidate scores one point per sample whose heuristic value strictly
//! increases; the best-scoring candidate is adopted, and the search stops
//! at the first round where no candidate improves any sample.
//!
//! The total abstract-state footprint of a candidate collection is checked
//! against the size bound before any distance table is built. Memory is the
//! binding resource here: footprints are products of domain sizes and grow
//! exponentially with pattern size, while the filter itself is a handful of
//! multiplications.
//!
//! The search is a local search. It terminates because patterns only grow
//! and the bound caps their size, but it is not guaranteed to find the best
//! collection overall.

use rustc_hash::FxHashSet;

use crate::canonical::CanonicalPatternDatabases;
use crate::errors::PdbError;
use crate::projection::{Pattern, PatternCollection};
use crate::task::{TnfState, TnfTask, VariableId};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Computes, per variable, the variables that are causally relevant to it.
///
/// In transition normal form every variable is mentioned in the goal, so
/// causal relevance reduces to neighborhood in the causal graph: `w` is
/// relevant to `v` exactly when `v` and `w` occur in a common operator and
/// at least one of the two is changed by it. Each result list is sorted and
/// duplicate-free, so iteration order is deterministic.
pub fn compute_causally_relevant_variables(task: &TnfTask) -> Vec<Vec<VariableId>> {
    let mut relevant: Vec<FxHashSet<VariableId>> =
        vec![FxHashSet::default(); task.num_variables()];
    for op in &task.operators {
        for first in &op.entries {
            for second in &op.entries {
                if first.variable != second.variable
                    && (first.changes_variable() || second.changes_variable())
                {
                    relevant[first.variable.index()].insert(second.variable);
                }
            }
        }
    }
    relevant
        .into_iter()
        .map(|set| {
            let mut variables: Vec<VariableId> = set.into_iter().collect();
            variables.sort_unstable();
            variables
        })
        .collect()
}

/// Steepest-ascent search over pattern collections.
pub struct HillClimber<'a> {
    task: &'a TnfTask,
    size_bound: u64,
    samples: Vec<TnfState>,
    causally_relevant: Vec<Vec<VariableId>>,
}

impl<'a> HillClimber<'a> {
    /// Creates a hill climber for `task` with a fixed sample set.
    ///
    /// `size_bound` caps the summed abstract-state count of every collection
    /// the search is allowed to evaluate.
    pub fn new(
        task: &'a TnfTask,
        size_bound: u64,
        samples: Vec<TnfState>,
    ) -> Result<Self, PdbError> {
        task.validate()?;
        Ok(Self {
            task,
            size_bound,
            samples,
            causally_relevant: compute_causally_relevant_variables(task),
        })
    }

    /// Returns true if `collection`'s total footprint stays within the size
    /// bound.
    ///
    /// The footprint is the sum over patterns of the product of their domain
    /// sizes, computed without building any projection. The bound is
    /// inclusive: a collection hitting it exactly is admitted.
    fn fits_size_bound(&self, collection: &PatternCollection) -> bool {
        let mut total: u64 = 0;
        for pattern in collection {
            total = total.saturating_add(pattern.num_abstract_states(self.task));
            if total > self.size_bound {
                return false;
            }
        }
        true
    }

    /// One singleton pattern per variable; every variable is a goal variable
    /// in transition normal form.
    fn initial_collection(&self) -> PatternCollection {
        (0..self.task.num_variables())
            .map(|v| Pattern::singleton(VariableId(v as u32)))
            .collect()
    }

    /// Generates all admissible neighbors of `collection`.
    ///
    /// A neighbor replaces one pattern `P` with `P` extended by one variable
    /// that is causally relevant to some member of `P` and not yet in `P`.
    /// Candidates that would break the size bound are filtered out here,
    /// before any evaluation.
    fn compute_neighbors(&self, collection: &PatternCollection) -> Vec<PatternCollection> {
        let mut neighbors = Vec::new();
        for (index, pattern) in collection.iter().enumerate() {
            let mut relevant: FxHashSet<VariableId> = FxHashSet::default();
            for variable in pattern.variables() {
                relevant.extend(self.causally_relevant[variable.index()].iter().copied());
            }
            let mut candidates: Vec<VariableId> = relevant
                .into_iter()
                .filter(|&v| !pattern.contains(v))
                .collect();
            candidates.sort_unstable();

            for variable in candidates {
                let mut candidate = collection.clone();
                candidate[index] = pattern.with_variable(variable);
                if self.fits_size_bound(&candidate) {
                    neighbors.push(candidate);
                }
            }
        }
        neighbors
    }

    /// Evaluates the canonical heuristic of `collection` on every sample.
    fn compute_sample_values(&self, collection: &PatternCollection) -> Result<Vec<u32>, PdbError> {
        let cpdbs = CanonicalPatternDatabases::new(self.task, collection)?;
        Ok(self
            .samples
            .iter()
            .map(|sample| cpdbs.compute_heuristic(sample))
            .collect())
    }

    /// Runs the search and returns the final collection.
    ///
    /// Each round evaluates every admissible neighbor against the current
    /// sample values and adopts the one improving the most samples; ties
    /// keep the first candidate in generation order, so concurrent
    /// evaluation returns the same winner as sequential evaluation. A round
    /// without any improvement ends the search.
    pub fn run(&self) -> Result<PatternCollection, PdbError> {
        let mut current = self.initial_collection();
        if self.samples.is_empty() {
            // Nothing can ever count as an improvement.
            return Ok(current);
        }
        let mut current_values = self.compute_sample_values(&current)?;

        loop {
            let mut neighbors = self.compute_neighbors(&current);

            #[cfg(feature = "rayon")]
            let evaluated: Result<Vec<Vec<u32>>, PdbError> = neighbors
                .par_iter()
                .map(|neighbor| self.compute_sample_values(neighbor))
                .collect();
            #[cfg(not(feature = "rayon"))]
            let evaluated: Result<Vec<Vec<u32>>, PdbError> = neighbors
                .iter()
                .map(|neighbor| self.compute_sample_values(neighbor))
                .collect();
            let mut evaluated = evaluated?;

            let mut best_index: Option<usize> = None;
            let mut best_improvement = 0usize;
            for (index, values) in evaluated.iter().enumerate() {
                let improvement = values
                    .iter()
                    .zip(&current_values)
                    .filter(|(new, old)| new > old)
                    .count();
                if improvement > best_improvement {
                    best_improvement = improvement;
                    best_index = Some(index);
                }
            }

            match best_index {
                None => return Ok(current),
                Some(index) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        "Hill climbing step improved {} of {} samples (collection size {})",
                        best_improvement,
                        self.samples.len(),
                        current.len()
                    );
                    current = neighbors.swap_remove(index);
                    current_values = evaluated.swap_remove(index);
                }
            }
        }
    }
}
