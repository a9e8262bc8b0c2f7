//! # Transition Normal Form Tasks
//!
//! This module implements the planning task model the rest of the crate
//! operates on.
//!
//! ## Key Components
//!
//! - **VariableId**: Index of a state variable with a finite integer domain
//!
//! - **TnfState**: A total assignment of one domain value to every variable
//!
//! - **TnfOperator**: A cost plus a list of entries; each entry names a
//!   variable together with a required precondition value and a resulting
//!   effect value
//!
//! - **TnfTask**: Variable domains, operators, initial state, and goal state
//!
//! ## Transition Normal Form
//!
//! Every operator entry carries both a precondition and an effect value for
//! the variable it mentions (an entry with equal values is a pure condition),
//! and the goal assigns every variable. Regression searches rely on both
//! properties: an operator is regressable exactly when the state matches its
//! effect values, and a fully assigned goal state is a single concrete seed
//! for backward search.
//!
//! ## Example
//!
//! ```rust
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
//! assert!(task.validate().is_ok());
//! ```

use crate::errors::PdbError;

/// A unique identifier for a state variable in a task.
///
/// Variable ids are dense: a task with `n` variables uses ids `0..n`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableId(pub u32);

impl VariableId {
    /// Returns the id as a usize for indexing into per-variable tables.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A total assignment of one domain value to every variable of a task.
///
/// States are never partial. Abstract states of a projection reuse this type
/// with one value per pattern position instead of one per task variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TnfState {
    /// The assigned value per variable, indexed by variable id.
    pub values: Vec<u32>,
}

impl TnfState {
    /// Creates a state from one value per variable.
    pub fn new(values: Vec<u32>) -> Self {
        Self { values }
    }

    /// Returns the number of variables this state assigns.
    pub fn num_variables(&self) -> usize {
        self.values.len()
    }

    /// Returns the value assigned to `variable`.
    pub fn value(&self, variable: VariableId) -> u32 {
        self.values[variable.index()]
    }

    /// Replaces the value assigned to `variable`.
    pub fn set_value(&mut self, variable: VariableId, value: u32) {
        self.values[variable.index()] = value;
    }
}

/// One variable's precondition/effect pair within an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TnfOperatorEntry {
    /// The variable this entry constrains.
    pub variable: VariableId,
    /// The value the variable must hold for the operator to apply.
    pub precondition: u32,
    /// The value the variable holds after the operator is applied.
    pub effect: u32,
}

impl TnfOperatorEntry {
    /// Returns true if applying the operator changes this entry's variable.
    ///
    /// An entry with equal precondition and effect is a pure condition: the
    /// operator requires the value but leaves it untouched.
    pub fn changes_variable(&self) -> bool {
        self.precondition != self.effect
    }
}

/// An operator of a task: a cost and an ordered list of entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TnfOperator {
    /// Human-readable label, never consulted by any algorithm.
    pub name: String,
    /// Non-negative application cost.
    pub cost: u32,
    /// The variables the operator mentions, at most once each.
    pub entries: Vec<TnfOperatorEntry>,
}

impl TnfOperator {
    /// Returns true if every entry's precondition holds in `state`.
    pub fn is_applicable_in(&self, state: &TnfState) -> bool {
        self.entries
            .iter()
            .all(|entry| state.value(entry.variable) == entry.precondition)
    }

    /// Returns the state reached by applying this operator to `state`.
    ///
    /// Callers must check [`is_applicable_in`](Self::is_applicable_in) first;
    /// the effect values are written unconditionally.
    pub fn successor(&self, state: &TnfState) -> TnfState {
        let mut successor = state.clone();
        for entry in &self.entries {
            successor.set_value(entry.variable, entry.effect);
        }
        successor
    }
}

/// A planning task in transition normal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TnfTask {
    /// Domain size per variable; variable `v` takes values `0..domains[v]`.
    pub variable_domains: Vec<u32>,
    /// All operators of the task.
    pub operators: Vec<TnfOperator>,
    /// The single initial state.
    pub initial_state: TnfState,
    /// The goal state; assigns every variable (transition normal form).
    pub goal_state: TnfState,
}

impl TnfTask {
    /// Returns the number of state variables.
    pub fn num_variables(&self) -> usize {
        self.variable_domains.len()
    }

    /// Returns the mean operator cost, or `0.0` for a task without operators.
    pub fn average_operator_cost(&self) -> f64 {
        if self.operators.is_empty() {
            return 0.0;
        }
        let total: u64 = self.operators.iter().map(|op| u64::from(op.cost)).sum();
        total as f64 / self.operators.len() as f64
    }

    /// Checks the structural invariants of transition normal form.
    ///
    /// An inadmissible heuristic silently corrupts any search that consumes
    /// it, so malformed tasks are rejected here instead of producing wrong
    /// distances later.
    ///
    /// # Validation Checks
    ///
    /// - At least one variable, and no variable with an empty domain
    /// - Initial and goal states assign every variable a value in its domain
    /// - Every operator entry references a declared variable, mentions it at
    ///   most once per operator, and uses in-domain values
    pub fn validate(&self) -> Result<(), PdbError> {
        if self.variable_domains.is_empty() {
            return Err(PdbError::InvalidTask(
                "task declares no variables".to_string(),
            ));
        }
        for (var, &domain) in self.variable_domains.iter().enumerate() {
            if domain == 0 {
                return Err(PdbError::InvalidTask(format!(
                    "variable {} has an empty domain",
                    var
                )));
            }
        }

        self.validate_state(&self.initial_state, "initial state")?;
        self.validate_state(&self.goal_state, "goal state")?;

        for op in &self.operators {
            let mut seen = vec![false; self.num_variables()];
            for entry in &op.entries {
                let var = entry.variable.index();
                if var >= self.num_variables() {
                    return Err(PdbError::InvalidTask(format!(
                        "operator '{}' references undeclared variable {}",
                        op.name, var
                    )));
                }
                if seen[var] {
                    return Err(PdbError::InvalidTask(format!(
                        "operator '{}' mentions variable {} twice",
                        op.name, var
                    )));
                }
                seen[var] = true;
                let domain = self.variable_domains[var];
                if entry.precondition >= domain || entry.effect >= domain {
                    return Err(PdbError::InvalidTask(format!(
                        "operator '{}' uses a value outside the domain of variable {}",
                        op.name, var
                    )));
                }
            }
        }

        Ok(())
    }

    fn validate_state(&self, state: &TnfState, role: &str) -> Result<(), PdbError> {
        if state.num_variables() != self.num_variables() {
            return Err(PdbError::InvalidTask(format!(
                "{} assigns {} variables, task declares {}",
                role,
                state.num_variables(),
                self.num_variables()
            )));
        }
        for (var, &value) in state.values.iter().enumerate() {
            if value >= self.variable_domains[var] {
                return Err(PdbError::InvalidTask(format!(
                    "{} assigns value {} to variable {} with domain size {}",
                    role, value, var, self.variable_domains[var]
                )));
            }
        }
        Ok(())
    }
}
