//! Property tests: admissibility and dominance hold on randomly generated
//! transition-normal-form tasks, checked against the exhaustive oracle.

use patdb::task::{TnfOperator, TnfOperatorEntry, TnfState, TnfTask, VariableId};
use patdb::{discover_patterns, CanonicalPatternDatabases, DiscoveryOptions, Pattern, PatternCollection, PatternDatabase};
use proptest::prelude::*;

use super::support::{collection_footprint, exact_goal_distances};

/// Seed for one operator: a nonzero bitmask selecting the variables it
/// mentions, raw (precondition, effect) values per variable, and a cost.
type OperatorSeed = (u32, Vec<(u32, u32)>, u32);

fn arb_operator_seed(num_variables: usize) -> impl Strategy<Value = OperatorSeed> {
    (
        1u32..(1u32 << num_variables),
        prop::collection::vec((0u32..4, 0u32..4), num_variables),
        0u32..=3,
    )
}

fn clamp_values(seeds: &[u32], domains: &[u32]) -> Vec<u32> {
    seeds
        .iter()
        .zip(domains)
        .map(|(value, domain)| value % domain)
        .collect()
}

/// Assembles a task that is valid by construction: raw values are reduced
/// into their domains and the bitmask guarantees distinct entry variables.
fn build_task(
    domains: Vec<u32>,
    operator_seeds: Vec<OperatorSeed>,
    initial_seed: Vec<u32>,
    goal_seed: Vec<u32>,
) -> TnfTask {
    let num_variables = domains.len();
    let mut operators = Vec::with_capacity(operator_seeds.len());
    for (index, (mask, value_seeds, cost)) in operator_seeds.into_iter().enumerate() {
        let mut entries = Vec::new();
        for variable in 0..num_variables {
            if mask & (1u32 << variable) == 0 {
                continue;
            }
            let (precondition, effect) = value_seeds[variable];
            entries.push(TnfOperatorEntry {
                variable: VariableId(variable as u32),
                precondition: precondition % domains[variable],
                effect: effect % domains[variable],
            });
        }
        operators.push(TnfOperator {
            name: format!("op-{}", index),
            cost,
            entries,
        });
    }
    let initial_values = clamp_values(&initial_seed, &domains);
    let goal_values = clamp_values(&goal_seed, &domains);
    TnfTask {
        variable_domains: domains,
        operators,
        initial_state: TnfState::new(initial_values),
        goal_state: TnfState::new(goal_values),
    }
}

fn arb_task() -> impl Strategy<Value = TnfTask> {
    (2usize..=4)
        .prop_flat_map(|num_variables| {
            (
                prop::collection::vec(2u32..=3, num_variables),
                prop::collection::vec(arb_operator_seed(num_variables), 1..=6),
                prop::collection::vec(0u32..4, num_variables),
                prop::collection::vec(0u32..4, num_variables),
            )
        })
        .prop_map(|(domains, operator_seeds, initial_seed, goal_seed)| {
            build_task(domains, operator_seeds, initial_seed, goal_seed)
        })
}

fn pattern_from_mask(task: &TnfTask, mask: u32) -> Pattern {
    let variables = (0..task.num_variables())
        .filter(|&variable| mask & (1u32 << variable) != 0)
        .map(|variable| VariableId(variable as u32))
        .collect();
    Pattern::new(variables)
}

fn arb_task_and_pattern() -> impl Strategy<Value = (TnfTask, Pattern)> {
    arb_task()
        .prop_flat_map(|task| {
            let num_variables = task.num_variables();
            (Just(task), 1u32..(1u32 << num_variables))
        })
        .prop_map(|(task, mask)| {
            let pattern = pattern_from_mask(&task, mask);
            (task, pattern)
        })
}

fn arb_task_and_collection() -> impl Strategy<Value = (TnfTask, PatternCollection)> {
    arb_task()
        .prop_flat_map(|task| {
            let num_variables = task.num_variables();
            (
                Just(task),
                prop::collection::vec(1u32..(1u32 << num_variables), 1..=3),
            )
        })
        .prop_map(|(task, masks)| {
            let collection = masks
                .into_iter()
                .map(|mask| pattern_from_mask(&task, mask))
                .collect();
            (task, collection)
        })
}

proptest! {
    #[test]
    fn projections_never_overestimate((task, pattern) in arb_task_and_pattern()) {
        // With INFINITY as u32::MAX this also checks soundness of infinite
        // values: an unreachable abstract goal forces an unreachable
        // concrete goal.
        let pdb = PatternDatabase::new(&task, pattern).unwrap();
        for (state, exact) in exact_goal_distances(&task) {
            prop_assert!(pdb.lookup_distance(&state) <= exact);
        }
    }

    #[test]
    fn projecting_onto_all_variables_is_exact(task in arb_task()) {
        let all = (0..task.num_variables())
            .map(|variable| VariableId(variable as u32))
            .collect();
        let pdb = PatternDatabase::new(&task, Pattern::new(all)).unwrap();
        for (state, exact) in exact_goal_distances(&task) {
            prop_assert_eq!(pdb.lookup_distance(&state), exact);
        }
    }

    #[test]
    fn canonical_combination_stays_admissible((task, collection) in arb_task_and_collection()) {
        let cpdbs = CanonicalPatternDatabases::new(&task, &collection).unwrap();
        for (state, exact) in exact_goal_distances(&task) {
            prop_assert!(cpdbs.compute_heuristic(&state) <= exact);
        }
    }

    #[test]
    fn canonical_combination_dominates_every_member((task, collection) in arb_task_and_collection()) {
        let cpdbs = CanonicalPatternDatabases::new(&task, &collection).unwrap();
        for (state, _) in exact_goal_distances(&task) {
            let combined = cpdbs.compute_heuristic(&state);
            for pdb in cpdbs.pdbs() {
                prop_assert!(combined >= pdb.lookup_distance(&state));
            }
        }
    }

    #[test]
    fn discovery_respects_the_size_bound(task in arb_task()) {
        let options = DiscoveryOptions {
            size_bound: 40,
            num_samples: 30,
            rng_seed: 7,
        };
        let collection = discover_patterns(&task, &options).unwrap();

        // The singleton start always fits: at most 4 variables with domain
        // sizes of at most 3.
        prop_assert!(collection_footprint(&task, &collection) <= options.size_bound);
        prop_assert_eq!(collection.len(), task.num_variables());
        for (variable, pattern) in collection.iter().enumerate() {
            prop_assert!(pattern.contains(VariableId(variable as u32)));
        }
    }
}
