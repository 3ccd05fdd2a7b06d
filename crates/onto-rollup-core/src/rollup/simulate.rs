use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::graph::ConceptGraph;
use crate::information::{ic_stdev, information_content};

/// Tentative outcome of eliminating one leaf
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub leaf: String,
    /// Parents that would become direct annotators, with their information content
    pub promoted: Vec<(String, f64)>,
    /// D after elimination
    pub annotators: usize,
    /// Γ after elimination
    pub gamma: f64,
    /// Λ after elimination
    pub mean: f64,
    /// Ψ after elimination
    pub stdev: f64,
}

/// Read-only view of the engine used to evaluate eliminations
pub(crate) struct Simulation<'a, G: ?Sized> {
    pub graph: &'a G,
    pub annotator_ic: &'a BTreeMap<String, f64>,
    pub gamma: f64,
    pub total_objects: usize,
}

impl<G: ConceptGraph + ?Sized> Simulation<'_, G> {
    /// Evaluate eliminating `leaf` without touching any state.
    ///
    /// Returns `None` when the elimination would leave no annotators.
    pub fn simulate(&self, leaf: &str) -> Option<Candidate> {
        let leaf_ic = self.annotator_ic.get(leaf).copied();

        // A leaf that annotates nothing folds nothing into its parents
        let mut promoted = Vec::new();
        if leaf_ic.is_some() {
            for parent in self.graph.parent_concepts(leaf) {
                if self.graph.is_direct_annotator(&parent) {
                    continue;
                }
                let ic = information_content(self.graph, &parent, self.total_objects);
                if ic.is_finite() {
                    promoted.push((parent, ic));
                }
            }
        }

        let gamma = self.gamma + promoted.iter().map(|(_, ic)| ic).sum::<f64>()
            - leaf_ic.unwrap_or(0.0);
        let annotators =
            self.annotator_ic.len() + promoted.len() - usize::from(leaf_ic.is_some());
        if annotators == 0 {
            debug!(leaf, "elimination would leave no annotators");
            return None;
        }

        let mean = gamma / annotators as f64;
        if mean < 0.0 {
            warn!(leaf, mean, "negative tentative mean information content");
        }
        let values = self
            .annotator_ic
            .iter()
            .filter(|(id, _)| id.as_str() != leaf)
            .map(|(_, ic)| *ic)
            .chain(promoted.iter().map(|(_, ic)| *ic));
        let stdev = ic_stdev(values, mean, annotators);

        Some(Candidate {
            leaf: leaf.to_string(),
            promoted,
            annotators,
            gamma,
            mean,
            stdev,
        })
    }

    /// Evaluate every leaf, in the order given
    pub fn simulate_all(&self, leaves: &[String], parallel: bool) -> Vec<Candidate> {
        if parallel {
            let evaluated: Vec<Option<Candidate>> =
                leaves.par_iter().map(|leaf| self.simulate(leaf)).collect();
            evaluated.into_iter().flatten().collect()
        } else {
            leaves.iter().filter_map(|leaf| self.simulate(leaf)).collect()
        }
    }
}

/// Relative tolerance under which two Ψ values count as tied.
///
/// Each leaf sums its remaining annotators in a different order, so Ψ values
/// that are equal in exact arithmetic can differ in the last few bits.
pub const TIE_TOLERANCE: f64 = 1e-12;

/// Whether `a` and `b` are equal up to [`TIE_TOLERANCE`]
pub fn is_tied(a: f64, b: f64) -> bool {
    (a - b).abs() <= TIE_TOLERANCE * b.abs().max(1.0)
}

/// Pick the candidate with the smallest finite Ψ; the earliest wins ties.
pub fn select_best(candidates: Vec<Candidate>) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for candidate in candidates {
        if !candidate.stdev.is_finite() {
            continue;
        }
        let better = best
            .as_ref()
            .is_none_or(|b| candidate.stdev < b.stdev && !is_tied(candidate.stdev, b.stdev));
        if better {
            best = Some(candidate);
        }
    }
    best
}
