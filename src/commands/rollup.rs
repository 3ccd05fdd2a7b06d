//! `onto-rollup CONFIG` - load the ontology, roll it up and store the outputs

use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use onto_rollup_core::config::RollupConfig;
use onto_rollup_core::error::Result;
use onto_rollup_core::graph::build_ontology;
use onto_rollup_core::output::FileCheckpoints;
use onto_rollup_core::records::{load_annotations, load_hierarchy};
use onto_rollup_core::rollup::RollupEngine;
use onto_rollup_core::trace_time;

use super::summary::{AnnotationStats, RunSummary};
use crate::cli::{Cli, OutputFormat};

/// Execute a full rollup run described by the configuration at `config_path`
pub fn execute(cli: &Cli, config_path: &Path, start: Instant) -> Result<()> {
    info!(config = %config_path.display(), "running with config");
    let config = RollupConfig::load(config_path)?;
    trace_time!(start, "load_config");

    info!(
        ontology = %config.ontology.display(),
        annotations = %config.annotations.display(),
        "creating ontology"
    );
    let hierarchy = load_hierarchy(&config.ontology)?;
    let annotations = load_annotations(&config.annotations)?;
    let ontology = build_ontology(&hierarchy, &annotations)?;
    trace_time!(start, "build_ontology", concepts = ontology.len());

    let concepts_before = ontology.len();
    let annotations_before = AnnotationStats::measure(&ontology);

    if config.outputs.is_empty() {
        warn!("no output files configured; results will only be summarized");
    }
    let mut sink = FileCheckpoints::new(config.outputs.clone(), annotations);

    info!("starting rollup");
    let engine = RollupEngine::new(ontology, config.options.clone());
    let total_objects = engine.total_objects();
    let result = engine.run(&mut sink)?;
    trace_time!(start, "rollup", iterations = result.iterations);

    info!("storing output");
    sink.save(&result.snapshot())?;

    let summary = RunSummary {
        config: config_path.display().to_string(),
        concepts_before,
        concepts_after: result.graph.len(),
        total_objects,
        initial: result.initial(),
        final_stats: result.last(),
        iterations: result.iterations,
        stop_reason: result.stop_reason,
        eliminated: result.eliminated(),
        failed_checkpoints: result.failed_checkpoints.clone(),
        annotations_before,
        annotations_after: AnnotationStats::measure(&result.graph),
        outputs: sink
            .written()
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
    };

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary.to_json())?);
        }
        OutputFormat::Human => {
            if !cli.quiet {
                println!("{}", summary.render_human());
            }
        }
    }

    trace_time!(start, "total");
    Ok(())
}
