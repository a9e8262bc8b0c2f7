//! End-to-end tests for the discovery pipeline: sampling, hill climbing,
//! and canonical heuristic construction on tasks with known optimal costs.

use patdb::task::{TnfState, TnfTask, VariableId};
use patdb::{
    build_canonical_heuristic, discover_patterns, DiscoveryOptions, Pattern, INFINITY,
};

use super::support::{
    collection_footprint, delivery_task, entry, exact_goal_distances, operator, two_switch_task,
};

/// Only the first switch can be flipped, so the all-on goal is unreachable.
fn unsolvable_switch_task() -> TnfTask {
    TnfTask {
        variable_domains: vec![2, 2],
        operators: vec![operator("flip-first", 1, vec![entry(0, 0, 1)])],
        initial_state: TnfState::new(vec![0, 0]),
        goal_state: TnfState::new(vec![1, 1]),
    }
}

#[test]
fn two_switch_discovery_keeps_the_singleton_collection() {
    // The singleton heuristic is already exact on this task, so no
    // replacement can improve any sample and the climb stops immediately.
    let task = two_switch_task();
    let collection = discover_patterns(&task, &DiscoveryOptions::default()).unwrap();

    assert_eq!(
        collection,
        vec![
            Pattern::singleton(VariableId(0)),
            Pattern::singleton(VariableId(1)),
        ]
    );

    let heuristic = build_canonical_heuristic(&task, &DiscoveryOptions::default()).unwrap();
    assert_eq!(heuristic.compute_heuristic(&TnfState::new(vec![0, 0])), 2);
    assert_eq!(heuristic.compute_heuristic(&TnfState::new(vec![1, 0])), 1);
    assert_eq!(heuristic.compute_heuristic(&TnfState::new(vec![0, 1])), 1);
    assert_eq!(heuristic.compute_heuristic(&TnfState::new(vec![1, 1])), 0);
}

#[test]
fn delivery_discovery_is_admissible_everywhere() {
    let task = delivery_task();
    let heuristic = build_canonical_heuristic(&task, &DiscoveryOptions::default()).unwrap();

    for (state, exact) in exact_goal_distances(&task) {
        let estimate = heuristic.compute_heuristic(&state);
        assert!(
            estimate <= exact,
            "h({:?}) = {} exceeds the exact distance {}",
            state.values,
            estimate,
            exact
        );
    }

    // The additive singletons already sum to the optimal cost at the
    // initial state, and growth never breaks that bound.
    assert_eq!(heuristic.compute_heuristic(&task.initial_state), 3);
    assert_eq!(heuristic.compute_heuristic(&task.goal_state), 0);
}

#[test]
fn unsolvable_initial_state_short_circuits_discovery() {
    let task = unsolvable_switch_task();
    let collection = discover_patterns(&task, &DiscoveryOptions::default()).unwrap();

    assert_eq!(
        collection,
        vec![
            Pattern::singleton(VariableId(0)),
            Pattern::singleton(VariableId(1)),
        ]
    );

    let heuristic = build_canonical_heuristic(&task, &DiscoveryOptions::default()).unwrap();
    assert_eq!(heuristic.compute_heuristic(&task.initial_state), INFINITY);
    assert_eq!(heuristic.compute_heuristic(&task.goal_state), 0);
}

#[test]
fn discovery_is_deterministic_per_seed() {
    let task = delivery_task();
    let options = DiscoveryOptions {
        size_bound: 50,
        num_samples: 200,
        rng_seed: 7,
    };

    let first = discover_patterns(&task, &options).unwrap();
    let second = discover_patterns(&task, &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn size_bound_at_the_singleton_footprint_freezes_the_collection() {
    // The singletons occupy 3 + 3 + 2 = 8 abstract states. Every
    // replacement strictly grows that sum, so a bound of 8 filters out
    // every neighbor before any database is built.
    let task = delivery_task();
    let options = DiscoveryOptions {
        size_bound: 8,
        num_samples: 500,
        rng_seed: 2017,
    };

    let collection = discover_patterns(&task, &options).unwrap();
    assert_eq!(collection.len(), 3);
    assert!(collection.iter().all(|pattern| pattern.len() == 1));
    assert_eq!(collection_footprint(&task, &collection), 8);
}

#[test]
fn zero_samples_terminate_after_the_first_iteration() {
    let task = delivery_task();
    let options = DiscoveryOptions {
        num_samples: 0,
        ..DiscoveryOptions::default()
    };

    let collection = discover_patterns(&task, &options).unwrap();
    assert!(collection.iter().all(|pattern| pattern.len() == 1));
}
