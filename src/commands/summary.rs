//! Run summary printed after a rollup

use std::fmt::Write as _;

use serde::Serialize;

use onto_rollup_core::graph::ConceptGraph;
use onto_rollup_core::information::{
    mean_annotations_per_concept, stdev_annotations_per_concept,
};
use onto_rollup_core::rollup::{HistoryEntry, StopReason};

/// Objects-per-annotator statistics over direct annotators
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnotationStats {
    pub mean: Option<f64>,
    pub stdev: Option<f64>,
}

impl AnnotationStats {
    pub fn measure<G: ConceptGraph + ?Sized>(graph: &G) -> Self {
        Self {
            mean: mean_annotations_per_concept(graph, true),
            stdev: stdev_annotations_per_concept(graph, true, 0),
        }
    }
}

/// Everything reported about one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub config: String,
    pub concepts_before: usize,
    pub concepts_after: usize,
    pub total_objects: usize,
    pub initial: HistoryEntry,
    #[serde(rename = "final")]
    pub final_stats: HistoryEntry,
    pub iterations: usize,
    pub stop_reason: StopReason,
    pub eliminated: usize,
    pub failed_checkpoints: Vec<usize>,
    pub annotations_before: AnnotationStats,
    pub annotations_after: AnnotationStats,
    pub outputs: Vec<String>,
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.4}", v))
}

impl RunSummary {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "status": "ok",
            "summary": self,
        })
    }

    pub fn render_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Rolled up {} concepts in {} iterations ({})",
            self.eliminated, self.iterations, self.stop_reason
        );
        let _ = writeln!(
            out,
            "  annotators: {} -> {}",
            self.initial.annotators, self.final_stats.annotators
        );
        let _ = writeln!(
            out,
            "  mean IC:    {:.4} -> {:.4}",
            self.initial.mean, self.final_stats.mean
        );
        let _ = writeln!(
            out,
            "  stdev IC:   {:.4} -> {:.4}",
            self.initial.stdev, self.final_stats.stdev
        );
        let _ = writeln!(
            out,
            "  objects per annotator: mean {} -> {}, stdev {} -> {}",
            optional(self.annotations_before.mean),
            optional(self.annotations_after.mean),
            optional(self.annotations_before.stdev),
            optional(self.annotations_after.stdev)
        );
        let _ = writeln!(
            out,
            "  concepts: {} -> {} ({} objects)",
            self.concepts_before, self.concepts_after, self.total_objects
        );
        if !self.failed_checkpoints.is_empty() {
            let failed: Vec<String> = self
                .failed_checkpoints
                .iter()
                .map(usize::to_string)
                .collect();
            let _ = writeln!(out, "  failed checkpoints: {}", failed.join(", "));
        }
        let _ = write!(out, "  wrote {} output files", self.outputs.len());
        out
    }
}
