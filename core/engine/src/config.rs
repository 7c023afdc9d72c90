//! FILENAME: core/engine/src/config.rs
//! PURPOSE: Tunables for a `Sheet`.
//! CONTEXT: Deserializable so front ends can load it from their own
//! configuration files. Every field has a default.

use serde::{Deserialize, Serialize};

/// How a rewrite of a cell updates the dependency index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Drop exactly the edges of the old formula and add those of the new one.
    #[default]
    Precise,
    /// Forget everyone that depended on the rewritten cell and keep the old
    /// formula's edges. Dependents of a rewritten cell stop being invalidated
    /// by later edits, so they may serve stale cached values.
    Legacy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    pub edge_policy: EdgePolicy,
}
