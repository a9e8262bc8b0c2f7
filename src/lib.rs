//! # patdb - Pattern Database Heuristics
//!
//! patdb builds admissible heuristics for classical planning tasks in
//! transition normal form by projecting the task onto small variable
//! subsets (*patterns*), solving the projections exactly, and combining
//! the resulting distance tables.
//!
//! ## Architecture
//!
//! The crate is organized into several modules:
//!
//! - **task**: Transition normal form tasks, states, and operators
//! - **projection**: Patterns and perfect-hash projections
//! - **pdb**: Single-pattern distance tables via backward search
//! - **cliques**: Maximal clique enumeration
//! - **canonical**: The canonical heuristic over a pattern collection
//! - **hillclimb**: Local search for a good pattern collection
//! - **sampling**: Random-walk state sampling for the search
//! - **snapshot**: Persistence for discovered collections
//!
//! ## Usage
//!
//! ```rust
//! use patdb::{build_canonical_heuristic, DiscoveryOptions};
//! use patdb::task::{TnfOperator, TnfOperatorEntry, TnfState, TnfTask, VariableId};
//!
//! // Two binary switches, one unit-cost operator each.
//! let task = TnfTask {
//!     variable_domains: vec![2, 2],
//!     operators: vec![
//!         TnfOperator {
//!             name: "set-v0".to_string(),
//!             cost: 1,
//!             entries: vec![TnfOperatorEntry {
//!                 variable: VariableId(0),
//!                 precondition: 0,
//!                 effect: 1,
//!             }],
//!         },
//!         TnfOperator {
//!             name: "set-v1".to_string(),
//!             cost: 1,
//!             entries: vec![TnfOperatorEntry {
//!                 variable: VariableId(1),
//!                 precondition: 0,
//!                 effect: 1,
//!             }],
//!         },
//!     ],
//!     initial_state: TnfState::new(vec![0, 0]),
//!     goal_state: TnfState::new(vec![1, 1]),
//! };
//!
//! let heuristic = build_canonical_heuristic(&task, &DiscoveryOptions::default())?;
//! assert_eq!(heuristic.compute_heuristic(&task.initial_state), 2);
//! assert_eq!(heuristic.compute_heuristic(&task.goal_state), 0);
//! # Ok::<(), patdb::PdbError>(())
//! ```
//!
//! A consuming search calls
//! [`compute_heuristic`](canonical::CanonicalPatternDatabases::compute_heuristic)
//! once per expanded state and must treat [`INFINITY`] as its own dead-end
//! signal.

#![forbid(unsafe_code)]

pub mod canonical;
pub mod cliques;
pub mod errors;
pub mod hillclimb;
pub mod pdb;
pub mod projection;
pub mod sampling;
pub mod snapshot;
pub mod task;

// Re-export commonly used types
pub use canonical::CanonicalPatternDatabases;
pub use errors::PdbError;
pub use hillclimb::HillClimber;
pub use pdb::{PatternDatabase, INFINITY};
pub use projection::{Pattern, PatternCollection, Projection};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::task::{TnfTask, VariableId};

/// Options controlling pattern discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Maximum summed abstract-state count over all patterns of any
    /// collection the search may evaluate. Inclusive.
    pub size_bound: u64,
    /// Number of states sampled by random walks.
    pub num_samples: usize,
    /// Seed for the sampling walks. Discovery is deterministic per seed.
    pub rng_seed: u64,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            size_bound: 2_000_000,
            num_samples: 1000,
            rng_seed: 2017,
        }
    }
}

/// Discovers a pattern collection for `task` by hill climbing.
///
/// The singleton collection over all variables serves double duty: it is
/// the sampling heuristic that steers the random walks and detects dead
/// ends, and the starting point of the climb. If it already proves the
/// initial state unsolvable, the singleton collection is returned as is;
/// any heuristic built from it maps the initial state to [`INFINITY`].
///
/// # Errors
///
/// Returns [`PdbError::InvalidTask`] for tasks violating transition normal
/// form.
pub fn discover_patterns(
    task: &TnfTask,
    options: &DiscoveryOptions,
) -> Result<PatternCollection, PdbError> {
    task.validate()?;

    let singleton_collection: PatternCollection = (0..task.num_variables())
        .map(|v| Pattern::singleton(VariableId(v as u32)))
        .collect();
    let sampling_heuristic = CanonicalPatternDatabases::new(task, &singleton_collection)?;

    let init_h = sampling_heuristic.compute_heuristic(&task.initial_state);
    if init_h == INFINITY {
        return Ok(singleton_collection);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Sampling {} states for hill climbing (init_h = {})",
        options.num_samples,
        init_h
    );
    let mut rng = ChaCha8Rng::seed_from_u64(options.rng_seed);
    let samples = sampling::sample_states_with_random_walks(
        task,
        options.num_samples,
        init_h,
        task.average_operator_cost(),
        &mut rng,
        |state| sampling_heuristic.compute_heuristic(state) == INFINITY,
    );

    HillClimber::new(task, options.size_bound, samples)?.run()
}

/// Discovers a pattern collection and builds the long-lived heuristic over
/// it.
///
/// Equivalent to [`discover_patterns`] followed by
/// [`CanonicalPatternDatabases::new`] on the winning collection.
pub fn build_canonical_heuristic(
    task: &TnfTask,
    options: &DiscoveryOptions,
) -> Result<CanonicalPatternDatabases, PdbError> {
    let collection = discover_patterns(task, options)?;
    CanonicalPatternDatabases::new(task, &collection)
}
