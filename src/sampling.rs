//! Random-walk sampling of task states.
//!
//! Hill climbing judges candidate collections on a fixed set of states.
//! Walking forward from the initial state with a heuristic-derived length
//! yields states at roughly the depth a solving search would visit, which
//! makes improvements on the samples meaningful for the real search.

use rand::Rng;

use crate::task::{TnfOperator, TnfState, TnfTask};

/// Samples `num_samples` states by independent random walks from the
/// initial state.
///
/// The walk length is drawn per sample from a binomial distribution with
/// `p = 0.5` over `n` steps, where `n` is ten when `init_h` is zero and
/// otherwise four times the estimated number of solution steps
/// (`init_h / average_operator_cost`, rounded). The expected length is
/// then twice the step estimate, compensating for the heuristic
/// underestimating true distances.
///
/// Each step applies a uniformly chosen applicable operator; a state with
/// no applicable operator ends its walk early. A walk that ends in a state
/// `is_dead_end` flags is discarded in favor of the initial state, so
/// callers always receive exactly `num_samples` states and none of them is
/// a known dead end.
pub fn sample_states_with_random_walks<R, F>(
    task: &TnfTask,
    num_samples: usize,
    init_h: u32,
    average_operator_cost: f64,
    rng: &mut R,
    mut is_dead_end: F,
) -> Vec<TnfState>
where
    R: Rng + ?Sized,
    F: FnMut(&TnfState) -> bool,
{
    // With all operator costs zero there is no step estimate to scale; the
    // short default walk applies as in the init_h == 0 case.
    let n = if init_h == 0 || average_operator_cost <= 0.0 {
        10
    } else {
        let solution_steps_estimate =
            (f64::from(init_h) / average_operator_cost + 0.5) as u32;
        solution_steps_estimate.saturating_mul(4)
    };

    let mut samples = Vec::with_capacity(num_samples);
    for _ in 0..num_samples {
        let mut length = 0;
        for _ in 0..n {
            if rng.gen_bool(0.5) {
                length += 1;
            }
        }

        let mut current = task.initial_state.clone();
        for _ in 0..length {
            let applicable: Vec<&TnfOperator> = task
                .operators
                .iter()
                .filter(|op| op.is_applicable_in(&current))
                .collect();
            if applicable.is_empty() {
                break;
            }
            let choice = rng.gen_range(0..applicable.len());
            current = applicable[choice].successor(&current);
        }

        if is_dead_end(&current) {
            current = task.initial_state.clone();
        }
        samples.push(current);
    }
    samples
}
