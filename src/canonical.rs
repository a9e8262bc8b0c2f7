//! # Canonical Pattern Database Heuristic
//!
//! Combines the databases of a pattern collection into one admissible
//! estimate. Two patterns are *additive* when no single operator changes a
//! variable in both; the costs their databases count can then never overlap,
//! so adding the two estimates is still a lower bound. The canonical
//! heuristic takes every maximal set of pairwise additive patterns, sums the
//! member estimates, and returns the maximum sum: the tightest bound the
//! collection supports.
//!
//! Additivity is computed pairwise with a full operator scan per pair. The
//! complexity is `O(|patterns|^2 * |operators| * entries)`, which is
//! intentional: collections stay small while operator lists grow, and the
//! scan runs once per construction.

use crate::cliques::max_cliques;
use crate::errors::PdbError;
use crate::pdb::{PatternDatabase, INFINITY};
use crate::projection::{Pattern, PatternCollection};
use crate::task::{TnfOperator, TnfState, TnfTask};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Returns true if applying `op` can change a variable of `pattern`.
///
/// Condition-only entries do not count: an operator that merely reads a
/// pattern variable cannot invalidate additivity.
pub fn operator_affects_pattern(op: &TnfOperator, pattern: &Pattern) -> bool {
    op.entries
        .iter()
        .any(|entry| entry.changes_variable() && pattern.contains(entry.variable))
}

/// Builds the additivity compatibility graph of a pattern collection.
///
/// The result is an adjacency list over pattern indices with an edge `i`-`j`
/// (for `i != j`) exactly when no operator changes a variable in pattern `i`
/// and a variable in pattern `j`. Vertices never carry self loops, so the
/// graph is a valid input for [`max_cliques`].
pub fn build_compatibility_graph(patterns: &[Pattern], task: &TnfTask) -> Vec<Vec<usize>> {
    let mut graph = vec![Vec::new(); patterns.len()];
    for i in 0..patterns.len() {
        for j in (i + 1)..patterns.len() {
            let additive = task.operators.iter().all(|op| {
                !(operator_affects_pattern(op, &patterns[i])
                    && operator_affects_pattern(op, &patterns[j]))
            });
            if additive {
                graph[i].push(j);
                graph[j].push(i);
            }
        }
    }
    graph
}

/// The canonical heuristic over one pattern collection.
///
/// Construction builds one [`PatternDatabase`] per pattern (in collection
/// order, so pattern `i` owns database `i`) and enumerates the maximal
/// additive sets once. Instances are immutable afterwards; the hill climber
/// builds and discards many short-lived ones, while a consuming search holds
/// a single long-lived instance and calls
/// [`compute_heuristic`](Self::compute_heuristic) once per expanded state.
#[derive(Debug)]
pub struct CanonicalPatternDatabases {
    pdbs: Vec<PatternDatabase>,
    maximal_additive_sets: Vec<Vec<usize>>,
}

impl CanonicalPatternDatabases {
    /// Builds databases and maximal additive sets for `patterns`.
    ///
    /// With the `rayon` feature enabled the databases are constructed in
    /// parallel; collection order is preserved either way.
    pub fn new(task: &TnfTask, patterns: &PatternCollection) -> Result<Self, PdbError> {
        task.validate()?;

        #[cfg(feature = "rayon")]
        let pdbs: Result<Vec<PatternDatabase>, PdbError> = patterns
            .par_iter()
            .map(|pattern| PatternDatabase::new(task, pattern.clone()))
            .collect();
        #[cfg(not(feature = "rayon"))]
        let pdbs: Result<Vec<PatternDatabase>, PdbError> = patterns
            .iter()
            .map(|pattern| PatternDatabase::new(task, pattern.clone()))
            .collect();
        let pdbs = pdbs?;

        let compatibility_graph = build_compatibility_graph(patterns, task);
        let maximal_additive_sets = max_cliques(&compatibility_graph);

        Ok(Self {
            pdbs,
            maximal_additive_sets,
        })
    }

    /// Returns the databases in collection order.
    pub fn pdbs(&self) -> &[PatternDatabase] {
        &self.pdbs
    }

    /// Returns the maximal additive sets as lists of pattern indices.
    pub fn maximal_additive_sets(&self) -> &[Vec<usize>] {
        &self.maximal_additive_sets
    }

    /// Computes the canonical heuristic value of a full state.
    ///
    /// Every database is consulted exactly once per call. If any lookup is
    /// [`INFINITY`] the state is a dead end in that abstraction, hence in
    /// the task, and the sentinel is returned before any summation can
    /// overflow.
    pub fn compute_heuristic(&self, state: &TnfState) -> u32 {
        if self.pdbs.is_empty() {
            return 0;
        }

        let mut values = Vec::with_capacity(self.pdbs.len());
        for pdb in &self.pdbs {
            let value = pdb.lookup_distance(state);
            if value == INFINITY {
                return INFINITY;
            }
            values.push(value);
        }

        let mut best = 0u32;
        for additive_set in &self.maximal_additive_sets {
            let sum: u64 = additive_set
                .iter()
                .map(|&index| u64::from(values[index]))
                .sum();
            // Finite sums cap just below the sentinel.
            let sum = sum.min(u64::from(INFINITY - 1)) as u32;
            if sum > best {
                best = sum;
            }
        }
        best
    }
}
