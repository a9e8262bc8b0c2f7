//! Error types for task validation and pattern database construction.

use thiserror::Error;

/// Errors that can occur while validating tasks or building pattern databases.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in the future without breaking changes.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PdbError {
    /// The task violates a structural invariant.
    ///
    /// Indicates a task that is not in transition normal form or that is
    /// internally inconsistent, such as:
    /// - A goal or initial state that does not assign every variable
    /// - A state value outside its variable's domain
    /// - An operator entry referencing an undeclared variable
    /// - An operator mentioning the same variable twice
    ///
    /// Heuristic values computed from such a task would be meaningless, so
    /// construction fails instead.
    #[error("invalid task: {0}")]
    InvalidTask(String),

    /// A pattern is malformed with respect to its task.
    ///
    /// Indicates a pattern referencing a variable the task does not declare,
    /// or a pattern whose variable list is not a strictly increasing sequence
    /// (possible when a pattern is deserialized from untrusted input).
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// A projection's abstract state space does not fit the index type.
    ///
    /// The number of abstract states is the product of the pattern's domain
    /// sizes; if that product overflows, no distance table can be allocated.
    #[error("pattern too large: {0}")]
    PatternTooLarge(String),

    /// Snapshot serialization, deserialization, or compatibility failure.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}
