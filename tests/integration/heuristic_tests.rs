//! Admissibility and exactness checks against an independent goal-distance
//! oracle over the full concrete state space.

use patdb::task::VariableId;
use patdb::{CanonicalPatternDatabases, Pattern, PatternDatabase, INFINITY};

use super::support::{delivery_task, exact_goal_distances, two_switch_task};

fn pattern(variables: &[u32]) -> Pattern {
    Pattern::new(variables.iter().copied().map(VariableId).collect())
}

#[test]
fn full_pattern_database_matches_exact_distances() {
    let task = delivery_task();
    let pdb = PatternDatabase::new(&task, pattern(&[0, 1, 2])).unwrap();

    for (state, exact) in exact_goal_distances(&task) {
        assert_eq!(
            pdb.lookup_distance(&state),
            exact,
            "projection over all variables must be exact at {:?}",
            state.values
        );
    }
}

#[test]
fn singleton_databases_never_overestimate() {
    let task = delivery_task();
    let oracle = exact_goal_distances(&task);

    for variable in 0..task.num_variables() as u32 {
        let pdb = PatternDatabase::new(&task, pattern(&[variable])).unwrap();
        for (state, exact) in &oracle {
            assert!(
                pdb.lookup_distance(state) <= *exact,
                "singleton {{v{}}} overestimates at {:?}",
                variable,
                state.values
            );
        }
    }
}

#[test]
fn singleton_estimates_at_the_initial_state() {
    let task = delivery_task();

    // Truck needs one drive, the package one load and one unload, and the
    // fuel variable is already at its goal value.
    let expected = [1, 2, 0];
    for (variable, &distance) in expected.iter().enumerate() {
        let pdb = PatternDatabase::new(&task, pattern(&[variable as u32])).unwrap();
        assert_eq!(pdb.lookup_distance(&task.initial_state), distance);
    }
}

#[test]
fn fuel_projection_proves_fuel_less_states_dead() {
    // No operator ever produces fuel, so the projection onto the fuel
    // variable alone already separates dead ends from live states.
    let task = delivery_task();
    let pdb = PatternDatabase::new(&task, pattern(&[2])).unwrap();

    for (state, exact) in exact_goal_distances(&task) {
        if state.value(VariableId(2)) == 0 {
            assert_eq!(pdb.lookup_distance(&state), INFINITY);
            assert_eq!(exact, INFINITY);
        } else {
            assert_eq!(pdb.lookup_distance(&state), 0);
        }
    }
}

#[test]
fn canonical_heuristic_is_admissible_and_dominates_its_members() {
    let task = delivery_task();
    let collection = vec![pattern(&[0]), pattern(&[1]), pattern(&[2]), pattern(&[0, 1])];
    let cpdbs = CanonicalPatternDatabases::new(&task, &collection).unwrap();

    for (state, exact) in exact_goal_distances(&task) {
        let combined = cpdbs.compute_heuristic(&state);
        assert!(combined <= exact, "overestimate at {:?}", state.values);
        for pdb in cpdbs.pdbs() {
            assert!(
                combined >= pdb.lookup_distance(&state),
                "canonical value dropped below a member database at {:?}",
                state.values
            );
        }
    }
}

#[test]
fn all_singletons_are_additive_on_the_delivery_task() {
    // Every operator changes exactly one variable, so all three singleton
    // projections land in a single maximal additive set and their values
    // sum at the initial state.
    let task = delivery_task();
    let collection = vec![pattern(&[0]), pattern(&[1]), pattern(&[2])];
    let cpdbs = CanonicalPatternDatabases::new(&task, &collection).unwrap();

    assert_eq!(cpdbs.maximal_additive_sets(), &[vec![0, 1, 2]]);
    assert_eq!(cpdbs.compute_heuristic(&task.initial_state), 3);

    let (_, exact_initial) = exact_goal_distances(&task)
        .into_iter()
        .find(|(state, _)| *state == task.initial_state)
        .unwrap();
    assert_eq!(exact_initial, 3);
}

#[test]
fn growing_a_pattern_splits_the_additive_sets() {
    // {v0, v1} conflicts with both singletons it subsumes: the drives
    // change v0, load and unload change v1. Only the fuel projection stays
    // additive with everything.
    let task = delivery_task();
    let collection = vec![pattern(&[0, 1]), pattern(&[0]), pattern(&[1]), pattern(&[2])];
    let cpdbs = CanonicalPatternDatabases::new(&task, &collection).unwrap();

    assert_eq!(
        cpdbs.maximal_additive_sets(),
        &[vec![0, 3], vec![1, 2, 3]]
    );
}

#[test]
fn two_switch_canonical_matches_the_exact_table() {
    let task = two_switch_task();
    let collection = vec![pattern(&[0]), pattern(&[1])];
    let cpdbs = CanonicalPatternDatabases::new(&task, &collection).unwrap();

    for (state, exact) in exact_goal_distances(&task) {
        assert_eq!(cpdbs.compute_heuristic(&state), exact);
    }
}
