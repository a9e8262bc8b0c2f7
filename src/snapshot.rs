//! Snapshot and serialization for discovered pattern collections.
//!
//! Pattern discovery is by far the most expensive step of building the
//! heuristic, so the winning collection can be persisted and rebuilt into a
//! [`CanonicalPatternDatabases`](crate::canonical::CanonicalPatternDatabases)
//! later. Snapshots carry version metadata and a task fingerprint so a
//! collection is never silently applied to a task it was not discovered for.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::errors::PdbError;
use crate::projection::PatternCollection;
use crate::task::TnfTask;

/// Metadata included in snapshots for compatibility checking.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnapshotMetadata {
    /// Crate version string the snapshot was created with.
    pub version: String,
    /// Feature flags enabled when the snapshot was created.
    pub features: Vec<String>,
    /// Fingerprint of the task the collection was discovered for.
    pub task_fingerprint: u64,
}

/// A discovered pattern collection plus metadata.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollectionSnapshot {
    /// The pattern collection.
    pub collection: PatternCollection,
    /// Metadata for compatibility checking.
    pub metadata: SnapshotMetadata,
}

impl CollectionSnapshot {
    /// Creates a snapshot of `collection` bound to `task`.
    pub fn new(task: &TnfTask, collection: PatternCollection) -> Self {
        let metadata = SnapshotMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            features: get_enabled_features(),
            task_fingerprint: task_fingerprint(task),
        };
        Self {
            collection,
            metadata,
        }
    }

    /// Validates that this snapshot can be applied to `task` under the
    /// current build.
    ///
    /// Checks the crate version, the enabled feature flags, the task
    /// fingerprint, and that every pattern only references variables the
    /// task declares.
    pub fn validate_compatibility(&self, task: &TnfTask) -> Result<(), PdbError> {
        let current_version = env!("CARGO_PKG_VERSION");
        if self.metadata.version != current_version {
            return Err(PdbError::Snapshot(format!(
                "snapshot version mismatch: snapshot was created with version {}, current version is {}",
                self.metadata.version, current_version
            )));
        }

        let current_features = get_enabled_features();
        for required_feature in &self.metadata.features {
            if !current_features.contains(required_feature) {
                return Err(PdbError::Snapshot(format!(
                    "snapshot requires feature '{}' which is not enabled",
                    required_feature
                )));
            }
        }

        if self.metadata.task_fingerprint != task_fingerprint(task) {
            return Err(PdbError::Snapshot(
                "snapshot was created for a different task".to_string(),
            ));
        }

        for pattern in &self.collection {
            if let Some(variable) = pattern
                .variables()
                .iter()
                .find(|v| v.index() >= task.num_variables())
            {
                return Err(PdbError::Snapshot(format!(
                    "snapshot pattern references undeclared variable {}",
                    variable.0
                )));
            }
        }

        Ok(())
    }
}

/// Fingerprints the parts of a task a pattern collection depends on.
///
/// Distance tables are determined by the variable domains, the operators'
/// transition semantics, and the goal. Operator names are labels and the
/// initial state only influences which collection gets discovered, so both
/// are excluded; renaming operators or moving the initial state does not
/// invalidate a snapshot.
pub fn task_fingerprint(task: &TnfTask) -> u64 {
    let mut hasher = FxHasher::default();
    task.variable_domains.hash(&mut hasher);
    task.goal_state.values.hash(&mut hasher);
    task.operators.len().hash(&mut hasher);
    for op in &task.operators {
        op.cost.hash(&mut hasher);
        op.entries.len().hash(&mut hasher);
        for entry in &op.entries {
            (entry.variable.0, entry.precondition, entry.effect).hash(&mut hasher);
        }
    }
    hasher.finish()
}

/// Returns a list of enabled feature flags.
fn get_enabled_features() -> Vec<String> {
    #[allow(unused_mut)] // mut is needed when features are enabled
    let mut features = Vec::new();

    #[cfg(feature = "rayon")]
    {
        features.push("rayon".to_string());
    }

    #[cfg(feature = "serde")]
    {
        features.push("serde".to_string());
    }

    #[cfg(feature = "tracing")]
    {
        features.push("tracing".to_string());
    }

    features
}

/// Saves a snapshot to a JSON string.
#[cfg(feature = "serde")]
pub fn save_snapshot_json(snapshot: &CollectionSnapshot) -> Result<String, PdbError> {
    serde_json::to_string_pretty(snapshot)
        .map_err(|e| PdbError::Snapshot(format!("failed to serialize snapshot: {}", e)))
}

/// Loads a snapshot from a JSON string and validates it against `task`.
#[cfg(feature = "serde")]
pub fn load_snapshot_json(json: &str, task: &TnfTask) -> Result<CollectionSnapshot, PdbError> {
    let snapshot: CollectionSnapshot = serde_json::from_str(json)
        .map_err(|e| PdbError::Snapshot(format!("failed to deserialize snapshot: {}", e)))?;

    snapshot.validate_compatibility(task)?;
    Ok(snapshot)
}

/// Saves a snapshot to a binary format (bincode).
#[cfg(feature = "serde")]
pub fn save_snapshot_binary(snapshot: &CollectionSnapshot) -> Result<Vec<u8>, PdbError> {
    bincode::serialize(snapshot)
        .map_err(|e| PdbError::Snapshot(format!("failed to serialize snapshot: {}", e)))
}

/// Loads a snapshot from binary format and validates it against `task`.
#[cfg(feature = "serde")]
pub fn load_snapshot_binary(data: &[u8], task: &TnfTask) -> Result<CollectionSnapshot, PdbError> {
    let snapshot: CollectionSnapshot = bincode::deserialize(data)
        .map_err(|e| PdbError::Snapshot(format!("failed to deserialize snapshot: {}", e)))?;

    snapshot.validate_compatibility(task)?;
    Ok(snapshot)
}
