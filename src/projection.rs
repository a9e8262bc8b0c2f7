//! Patterns and projections of tasks onto variable subsets.
//!
//! A pattern selects a subset of task variables. Projecting a task onto a
//! pattern yields a smaller abstract task over just those variables, plus a
//! perfect hash between abstract states and dense indices `0..N` where `N`
//! is the product of the pattern's domain sizes. Distance tables are arrays
//! indexed by that hash.

use crate::errors::PdbError;
use crate::task::{TnfOperator, TnfOperatorEntry, TnfState, TnfTask, VariableId};

/// A set of task variables defining a projection.
///
/// Stored as a strictly increasing sequence so that membership tests are
/// binary searches and equal patterns compare equal structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pattern {
    variables: Vec<VariableId>,
}

impl Pattern {
    /// Creates a pattern from the given variables, sorting and removing
    /// duplicates.
    pub fn new(mut variables: Vec<VariableId>) -> Self {
        variables.sort_unstable();
        variables.dedup();
        Self { variables }
    }

    /// Creates a pattern containing a single variable.
    pub fn singleton(variable: VariableId) -> Self {
        Self {
            variables: vec![variable],
        }
    }

    /// Returns the variables of this pattern in increasing order.
    pub fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    /// Returns the number of variables in this pattern.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns true if this pattern contains no variables.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Returns true if `variable` is part of this pattern.
    pub fn contains(&self, variable: VariableId) -> bool {
        self.variables.binary_search(&variable).is_ok()
    }

    /// Returns the position of `variable` within this pattern, if present.
    ///
    /// Positions are the variable ids of the projected task.
    pub fn position(&self, variable: VariableId) -> Option<usize> {
        self.variables.binary_search(&variable).ok()
    }

    /// Returns a copy of this pattern extended by `variable`.
    ///
    /// Adding a variable that is already present returns an equal pattern.
    pub fn with_variable(&self, variable: VariableId) -> Pattern {
        match self.variables.binary_search(&variable) {
            Ok(_) => self.clone(),
            Err(position) => {
                let mut variables = self.variables.clone();
                variables.insert(position, variable);
                Self { variables }
            }
        }
    }

    /// Returns the number of abstract states of this pattern under `task`,
    /// saturating at `u64::MAX`.
    ///
    /// This is the pattern's contribution to a collection's memory footprint
    /// and is safe to call for patterns far beyond any buildable size, which
    /// is exactly when the size-bound filter needs it. Pattern variables must
    /// be declared by the task.
    pub fn num_abstract_states(&self, task: &TnfTask) -> u64 {
        self.variables.iter().fold(1u64, |product, variable| {
            product.saturating_mul(u64::from(task.variable_domains[variable.index()]))
        })
    }
}

/// An ordered list of patterns.
///
/// Order carries no semantics but fixes the pattern indices used by
/// compatibility graphs and maximal additive sets.
pub type PatternCollection = Vec<Pattern>;

/// A task projected onto a pattern, with perfect hashing of abstract states.
///
/// The projected task renumbers the pattern's variables to their positions
/// `0..k` and keeps only operators that change at least one pattern variable;
/// operators that merely condition on the pattern induce self loops in the
/// abstract transition graph and can never improve a distance.
#[derive(Debug, Clone)]
pub struct Projection {
    pattern: Pattern,
    multipliers: Vec<u64>,
    num_states: usize,
    projected_task: TnfTask,
}

impl Projection {
    /// Projects `task` onto `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`PdbError::InvalidPattern`] if the pattern references an
    /// undeclared variable or is not strictly increasing (possible only for
    /// patterns deserialized from untrusted input), and
    /// [`PdbError::PatternTooLarge`] if the abstract state count overflows
    /// the index type.
    pub fn new(task: &TnfTask, pattern: Pattern) -> Result<Self, PdbError> {
        let variables = pattern.variables();
        for pair in variables.windows(2) {
            if pair[0] >= pair[1] {
                return Err(PdbError::InvalidPattern(
                    "pattern variables are not strictly increasing".to_string(),
                ));
            }
        }
        if let Some(variable) = variables
            .iter()
            .find(|v| v.index() >= task.num_variables())
        {
            return Err(PdbError::InvalidPattern(format!(
                "pattern references undeclared variable {}",
                variable.0
            )));
        }

        // Mixed-radix perfect hash: multiplier of position i is the product
        // of the domain sizes of all earlier positions.
        let mut multipliers = Vec::with_capacity(variables.len());
        let mut num_states: u64 = 1;
        for &variable in variables {
            multipliers.push(num_states);
            num_states = num_states
                .checked_mul(u64::from(task.variable_domains[variable.index()]))
                .ok_or_else(|| {
                    PdbError::PatternTooLarge(format!(
                        "abstract state count of a {}-variable pattern overflows",
                        variables.len()
                    ))
                })?;
        }
        let num_states = usize::try_from(num_states).map_err(|_| {
            PdbError::PatternTooLarge(format!(
                "{} abstract states exceed the addressable index range",
                num_states
            ))
        })?;

        let projected_task = TnfTask {
            variable_domains: variables
                .iter()
                .map(|v| task.variable_domains[v.index()])
                .collect(),
            operators: project_operators(task, &pattern),
            initial_state: project_onto(variables, &task.initial_state),
            goal_state: project_onto(variables, &task.goal_state),
        };

        Ok(Self {
            pattern,
            multipliers,
            num_states,
            projected_task,
        })
    }

    /// Returns the pattern this projection was built from.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Returns the abstract task over the pattern's variables.
    pub fn projected_task(&self) -> &TnfTask {
        &self.projected_task
    }

    /// Returns the number of abstract states.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Maps an abstract state to its dense index.
    pub fn rank(&self, abstract_state: &TnfState) -> usize {
        debug_assert_eq!(abstract_state.num_variables(), self.pattern.len());
        let mut index: u64 = 0;
        for (&value, &multiplier) in abstract_state.values.iter().zip(&self.multipliers) {
            index += u64::from(value) * multiplier;
        }
        index as usize
    }

    /// Maps a dense index back to its abstract state.
    pub fn unrank(&self, index: usize) -> TnfState {
        debug_assert!(index < self.num_states);
        let index = index as u64;
        let values = self
            .projected_task
            .variable_domains
            .iter()
            .zip(&self.multipliers)
            .map(|(&domain, &multiplier)| ((index / multiplier) % u64::from(domain)) as u32)
            .collect();
        TnfState::new(values)
    }

    /// Maps a full state of the original task to its abstract state.
    pub fn project(&self, state: &TnfState) -> TnfState {
        project_onto(self.pattern.variables(), state)
    }
}

fn project_onto(variables: &[VariableId], state: &TnfState) -> TnfState {
    TnfState::new(variables.iter().map(|&v| state.value(v)).collect())
}

fn project_operators(task: &TnfTask, pattern: &Pattern) -> Vec<TnfOperator> {
    let mut operators = Vec::new();
    for op in &task.operators {
        let entries: Vec<TnfOperatorEntry> = op
            .entries
            .iter()
            .filter_map(|entry| {
                pattern.position(entry.variable).map(|position| TnfOperatorEntry {
                    variable: VariableId(position as u32),
                    precondition: entry.precondition,
                    effect: entry.effect,
                })
            })
            .collect();
        if entries.iter().any(|entry| entry.changes_variable()) {
            operators.push(TnfOperator {
                name: op.name.clone(),
                cost: op.cost,
                entries,
            });
        }
    }
    operators
}
