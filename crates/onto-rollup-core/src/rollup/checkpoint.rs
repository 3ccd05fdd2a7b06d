use std::collections::BTreeMap;

use crate::error::Result;
use crate::records::HierarchyRecord;

/// Immutable copy of the rollup state taken when a checkpoint fires
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Direct annotator count that triggered the checkpoint
    pub annotator_count: usize,
    pub rollups: BTreeMap<String, Vec<String>>,
    pub levels: BTreeMap<String, u32>,
    /// Λ history up to and including this iteration
    pub means: Vec<f64>,
    /// Ψ history up to and including this iteration
    pub stdevs: Vec<f64>,
    /// Surviving concepts and their remaining parents
    pub hierarchy: Vec<HierarchyRecord>,
}

/// Receiver for checkpoint and final snapshots
pub trait CheckpointSink {
    fn persist(&mut self, snapshot: &Snapshot) -> Result<()>;
}

impl<F> CheckpointSink for F
where
    F: FnMut(&Snapshot) -> Result<()>,
{
    fn persist(&mut self, snapshot: &Snapshot) -> Result<()> {
        self(snapshot)
    }
}

/// Sink that discards every snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCheckpoints;

impl CheckpointSink for NoCheckpoints {
    fn persist(&mut self, _snapshot: &Snapshot) -> Result<()> {
        Ok(())
    }
}
