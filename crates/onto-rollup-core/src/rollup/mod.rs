//! Greedy information-content rollup
//!
//! Repeatedly eliminates the leaf concept whose removal yields the smallest
//! standard deviation (Ψ) of information content across direct annotators,
//! folding the leaf onto its parents, until the number of direct annotators
//! (D) reaches the target.
//!
//! The engine owns the graph for the whole run and is its only mutator.

mod checkpoint;
mod simulate;
mod state;


use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{Result, RollupError};
use crate::graph::ConceptGraph;
use crate::information::{annotators_information_content, ic_stdev, information_content};

pub use checkpoint::{CheckpointSink, NoCheckpoints, Snapshot};
pub use simulate::{is_tied, select_best, Candidate, TIE_TOLERANCE};
pub use state::RollupState;

use simulate::Simulation;

/// Default target annotator count
pub const DEFAULT_DESIRED_ANNOTATORS: usize = 250;
/// Default iteration bound
pub const DEFAULT_MAX_ITERATIONS: usize = 50_000;
/// Default status logging frequency in iterations
pub const DEFAULT_PRINT_STATUS_FREQ: usize = 500;

/// Options controlling one rollup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollupOptions {
    /// Stop once D is at or below this count
    pub desired_annotators: usize,
    /// Upper bound on accepted eliminations
    pub max_iterations: usize,
    /// Log status every this many iterations (0 disables)
    pub print_status_freq: usize,
    /// Annotator counts at which a snapshot is handed to the checkpoint sink
    pub checkpoints: BTreeSet<usize>,
    /// Evaluate leaf eliminations on the rayon pool
    pub parallel: bool,
    /// Abort the run when a checkpoint cannot be persisted
    pub halt_on_checkpoint_error: bool,
}

impl Default for RollupOptions {
    fn default() -> Self {
        Self {
            desired_annotators: DEFAULT_DESIRED_ANNOTATORS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            print_status_freq: DEFAULT_PRINT_STATUS_FREQ,
            checkpoints: BTreeSet::new(),
            parallel: false,
            halt_on_checkpoint_error: false,
        }
    }
}

/// Direct annotator statistics after one iteration
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// D
    pub annotators: usize,
    /// Λ
    pub mean: f64,
    /// Ψ
    pub stdev: f64,
}

/// Why the optimization loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// D reached the desired annotator count
    TargetReached,
    /// The iteration bound was hit
    IterationLimit,
    /// The ontology has no leaves left
    NoLeaves,
    /// No leaf produced a finite dispersion
    NoCandidate,
}

impl StopReason {
    /// True for early terminations caused by a degenerate ontology state
    pub fn is_degenerate(&self) -> bool {
        matches!(self, StopReason::NoLeaves | StopReason::NoCandidate)
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::TargetReached => write!(f, "target reached"),
            StopReason::IterationLimit => write!(f, "iteration limit"),
            StopReason::NoLeaves => write!(f, "no leaves remain"),
            StopReason::NoCandidate => write!(f, "no candidate leaf"),
        }
    }
}

/// One accepted elimination
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub leaf: String,
    /// Parents of the leaf at commit time
    pub parents: Vec<String>,
    /// Parents newly promoted to direct annotators
    pub promoted: Vec<String>,
    pub stats: HistoryEntry,
}

/// Result of a single engine step
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Committed(Commit),
    Stopped(StopReason),
}

/// Final output of a rollup run
#[derive(Debug, Clone)]
pub struct RollupResult<G> {
    /// Concept -> concepts it was rolled into (survivors map onto themselves)
    pub rollups: BTreeMap<String, Vec<String>>,
    /// Concept -> number of elimination hops folded into its mapping
    pub levels: BTreeMap<String, u32>,
    /// Statistics before any elimination, then one entry per accepted iteration
    pub history: Vec<HistoryEntry>,
    pub iterations: usize,
    pub stop_reason: StopReason,
    /// Annotator counts whose checkpoint could not be persisted
    pub failed_checkpoints: Vec<usize>,
    /// The mutated graph
    pub graph: G,
}

impl<G> RollupResult<G> {
    /// Λ series
    pub fn means(&self) -> Vec<f64> {
        self.history.iter().map(|h| h.mean).collect()
    }

    /// Ψ series
    pub fn stdevs(&self) -> Vec<f64> {
        self.history.iter().map(|h| h.stdev).collect()
    }

    pub fn initial(&self) -> HistoryEntry {
        self.history[0]
    }

    pub fn last(&self) -> HistoryEntry {
        self.history[self.history.len() - 1]
    }

    /// Number of concepts eliminated during the run
    pub fn eliminated(&self) -> usize {
        self.levels.values().filter(|level| **level > 0).count()
    }
}

impl<G: ConceptGraph> RollupResult<G> {
    /// Snapshot of the final state, for the final save
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            annotator_count: self.last().annotators,
            rollups: self.rollups.clone(),
            levels: self.levels.clone(),
            means: self.means(),
            stdevs: self.stdevs(),
            hierarchy: self.graph.hierarchy_records(),
        }
    }
}

/// Greedy leaf-elimination engine
pub struct RollupEngine<G: ConceptGraph> {
    graph: G,
    options: RollupOptions,
    /// N, fixed for the run
    total_objects: usize,
    /// Information content of every current direct annotator
    annotator_ic: BTreeMap<String, f64>,
    /// Γ
    gamma: f64,
    state: RollupState,
    history: Vec<HistoryEntry>,
    iterations: usize,
    failed_checkpoints: Vec<usize>,
    started: Instant,
}

impl<G: ConceptGraph> RollupEngine<G> {
    /// Take ownership of the graph and compute the initial statistics
    pub fn new(graph: G, options: RollupOptions) -> Self {
        let started = Instant::now();
        let total_objects = graph.total_annotated_objects();

        let mut annotator_ic = annotators_information_content(&graph, total_objects);
        annotator_ic.retain(|id, ic| {
            if ic.is_finite() {
                true
            } else {
                warn!(concept = %id, "direct annotator without objects excluded from statistics");
                false
            }
        });

        let gamma: f64 = annotator_ic.values().sum();
        let annotators = annotator_ic.len();
        let (mean, stdev) = if annotators == 0 {
            warn!("ontology has no direct annotators");
            (0.0, 0.0)
        } else {
            let mean = gamma / annotators as f64;
            (mean, ic_stdev(annotator_ic.values().copied(), mean, annotators))
        };

        info!(
            objects = total_objects,
            annotators, mean, stdev, "initial direct annotator statistics"
        );

        Self {
            graph,
            options,
            total_objects,
            annotator_ic,
            gamma,
            state: RollupState::new(),
            history: vec![HistoryEntry {
                annotators,
                mean,
                stdev,
            }],
            iterations: 0,
            failed_checkpoints: Vec::new(),
            started,
        }
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn options(&self) -> &RollupOptions {
        &self.options
    }

    /// N
    pub fn total_objects(&self) -> usize {
        self.total_objects
    }

    /// D
    pub fn annotator_count(&self) -> usize {
        self.annotator_ic.len()
    }

    pub fn annotator_ic(&self) -> &BTreeMap<String, f64> {
        &self.annotator_ic
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn current(&self) -> HistoryEntry {
        self.history[self.history.len() - 1]
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn state(&self) -> &RollupState {
        &self.state
    }

    /// Reason to stop before the next step, if any
    pub fn stop_condition(&self) -> Option<StopReason> {
        if self.annotator_count() <= self.options.desired_annotators {
            Some(StopReason::TargetReached)
        } else if self.iterations >= self.options.max_iterations {
            Some(StopReason::IterationLimit)
        } else {
            None
        }
    }

    /// Simulate eliminating every current leaf against the current state
    pub fn evaluate_leaves(&self) -> Vec<Candidate> {
        let leaves = self.graph.leaf_nodes();
        self.simulation().simulate_all(&leaves, self.options.parallel)
    }

    fn simulation(&self) -> Simulation<'_, G> {
        Simulation {
            graph: &self.graph,
            annotator_ic: &self.annotator_ic,
            gamma: self.gamma,
            total_objects: self.total_objects,
        }
    }

    /// Evaluate all leaves and commit the best elimination
    pub fn step(&mut self) -> Result<StepOutcome> {
        let leaves = self.graph.leaf_nodes();
        if leaves.is_empty() {
            warn!(annotators = self.annotator_count(), "no leaves remain in the ontology");
            return Ok(StepOutcome::Stopped(StopReason::NoLeaves));
        }

        let candidates = self
            .simulation()
            .simulate_all(&leaves, self.options.parallel);
        let Some(best) = select_best(candidates) else {
            warn!(leaves = leaves.len(), "no leaf elimination yields a finite dispersion");
            return Ok(StepOutcome::Stopped(StopReason::NoCandidate));
        };
        if !self.graph.is_leaf(&best.leaf) {
            warn!(leaf = %best.leaf, "selected leaf is no longer a leaf");
            return Ok(StepOutcome::Stopped(StopReason::NoCandidate));
        }

        let commit = self.commit(best)?;
        self.iterations += 1;

        if self.options.print_status_freq > 0
            && self.iterations.is_multiple_of(self.options.print_status_freq)
        {
            info!(
                iteration = self.iterations,
                annotators = commit.stats.annotators,
                mean = commit.stats.mean,
                stdev = commit.stats.stdev,
                leaves = leaves.len(),
                elapsed = ?self.started.elapsed(),
                "rollup status"
            );
        }

        Ok(StepOutcome::Committed(commit))
    }

    fn commit(&mut self, candidate: Candidate) -> Result<Commit> {
        // Removal first: a rejected removal leaves every structure untouched
        let parents = self.graph.remove_leaf(&candidate.leaf)?;
        self.annotator_ic.remove(&candidate.leaf);

        let mut promoted = Vec::with_capacity(candidate.promoted.len());
        for (parent, _) in &candidate.promoted {
            self.graph.promote_annotator(parent)?;
            let ic = information_content(&self.graph, parent, self.total_objects);
            self.annotator_ic.insert(parent.clone(), ic);
            promoted.push(parent.clone());
        }

        self.gamma = candidate.gamma;
        let stats = HistoryEntry {
            annotators: candidate.annotators,
            mean: candidate.mean,
            stdev: candidate.stdev,
        };
        debug_assert_eq!(self.annotator_ic.len(), stats.annotators);
        if stats.mean < 0.0 {
            warn!(mean = stats.mean, "negative mean information content");
        }

        self.state.record_elimination(&candidate.leaf, &parents);
        self.history.push(stats);

        debug!(
            leaf = %candidate.leaf,
            parents = ?parents,
            promoted = ?promoted,
            annotators = stats.annotators,
            stdev = stats.stdev,
            "rolled up leaf"
        );

        Ok(Commit {
            leaf: candidate.leaf,
            parents,
            promoted,
            stats,
        })
    }

    /// Completed copy of the current state for a checkpoint
    pub fn snapshot(&self) -> Snapshot {
        let annotators = self.graph.annotators();
        let (rollups, levels) = self.state.completed(&annotators);
        Snapshot {
            annotator_count: self.annotator_count(),
            rollups,
            levels,
            means: self.history.iter().map(|h| h.mean).collect(),
            stdevs: self.history.iter().map(|h| h.stdev).collect(),
            hierarchy: self.graph.hierarchy_records(),
        }
    }

    fn checkpoint(&mut self, sink: &mut dyn CheckpointSink) -> Result<()> {
        let snapshot = self.snapshot();
        info!(annotators = snapshot.annotator_count, "checkpoint");
        if let Err(e) = sink.persist(&snapshot) {
            error!(annotators = snapshot.annotator_count, error = %e, "checkpoint failed");
            self.failed_checkpoints.push(snapshot.annotator_count);
            if self.options.halt_on_checkpoint_error {
                return Err(RollupError::Checkpoint {
                    annotator_count: snapshot.annotator_count,
                    reason: e.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Run the loop to completion, handing snapshots to `sink` at checkpoints
    pub fn run(mut self, sink: &mut dyn CheckpointSink) -> Result<RollupResult<G>> {
        let stop_reason = loop {
            if let Some(reason) = self.stop_condition() {
                break reason;
            }
            match self.step()? {
                StepOutcome::Stopped(reason) => break reason,
                StepOutcome::Committed(commit) => {
                    if self.options.checkpoints.contains(&commit.stats.annotators) {
                        self.checkpoint(sink)?;
                    }
                }
            }
        };

        info!(
            iterations = self.iterations,
            annotators = self.annotator_count(),
            reason = %stop_reason,
            elapsed = ?self.started.elapsed(),
            "rollup finished"
        );
        Ok(self.finish(stop_reason))
    }

    /// Self-map surviving annotators and release the graph
    pub fn finish(self, stop_reason: StopReason) -> RollupResult<G> {
        let annotators = self.graph.annotators();
        let (rollups, levels) = self.state.finalize(&annotators);
        RollupResult {
            rollups,
            levels,
            history: self.history,
            iterations: self.iterations,
            stop_reason,
            failed_checkpoints: self.failed_checkpoints,
            graph: self.graph,
        }
    }
}
