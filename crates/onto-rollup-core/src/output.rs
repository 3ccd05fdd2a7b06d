//! File outputs for checkpoints and the final save
//!
//! Each configured output is a path template; `{}` or `{0}` is replaced with
//! the direct annotator count of the snapshot being written.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, RollupError};
use crate::records::{
    format_annotations, format_hierarchy, format_levels, format_rollups, format_series,
    AnnotationRecord,
};
use crate::rollup::{CheckpointSink, Snapshot};

/// Output path templates, each optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputFiles {
    pub rollup: Option<PathBuf>,
    pub rollup_levels: Option<PathBuf>,
    pub best_mean_ic: Option<PathBuf>,
    pub best_stdev_ic: Option<PathBuf>,
    pub ontology: Option<PathBuf>,
    pub annotations: Option<PathBuf>,
}

impl OutputFiles {
    pub fn is_empty(&self) -> bool {
        self.rollup.is_none()
            && self.rollup_levels.is_none()
            && self.best_mean_ic.is_none()
            && self.best_stdev_ic.is_none()
            && self.ontology.is_none()
            && self.annotations.is_none()
    }
}

/// Substitute the annotator count into a path template
pub fn render_template(template: &Path, annotator_count: usize) -> PathBuf {
    let count = annotator_count.to_string();
    let rendered = template
        .to_string_lossy()
        .replace("{0}", &count)
        .replace("{}", &count);
    PathBuf::from(rendered)
}

/// Re-map original annotation records through a rollup mapping.
///
/// Objects of a concept are added to every concept it rolls into. Concepts
/// missing from the mapping keep their own objects.
pub fn map_annotations_with_rollup(
    rollups: &BTreeMap<String, Vec<String>>,
    records: &[AnnotationRecord],
) -> BTreeMap<String, BTreeSet<String>> {
    let mut rolled: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for record in records {
        if record.objects.is_empty() {
            continue;
        }
        let targets = match rollups.get(&record.concept_id) {
            Some(targets) => targets.as_slice(),
            None => std::slice::from_ref(&record.concept_id),
        };
        for target in targets {
            rolled
                .entry(target.clone())
                .or_default()
                .extend(record.objects.iter().cloned());
        }
    }
    rolled
}

/// Write `content` to `path`, creating parent directories and truncating
fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| RollupError::io_operation("create directory", parent.display(), e))?;
        }
    }
    fs::write(path, content).map_err(|e| RollupError::io_operation("write", path.display(), e))?;
    debug!(path = %path.display(), bytes = content.len(), "wrote output");
    Ok(())
}

/// Checkpoint sink that writes every configured output file
#[derive(Debug, Clone)]
pub struct FileCheckpoints {
    outputs: OutputFiles,
    /// Annotation records as loaded, before any rollup
    original_annotations: Vec<AnnotationRecord>,
    written: Vec<PathBuf>,
}

impl FileCheckpoints {
    pub fn new(outputs: OutputFiles, original_annotations: Vec<AnnotationRecord>) -> Self {
        Self {
            outputs,
            original_annotations,
            written: Vec::new(),
        }
    }

    pub fn outputs(&self) -> &OutputFiles {
        &self.outputs
    }

    /// Every path written so far, in write order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Write all configured outputs for `snapshot`
    pub fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let count = snapshot.annotator_count;
        info!(annotators = count, "storing outputs");

        let Self {
            outputs,
            original_annotations,
            written,
        } = self;
        let original_annotations: &[AnnotationRecord] = original_annotations;
        let mut emit = |template: &Option<PathBuf>, content: &dyn Fn() -> String| -> Result<()> {
            if let Some(template) = template {
                let path = render_template(template, count);
                write_output(&path, &content())?;
                written.push(path);
            }
            Ok(())
        };

        emit(&outputs.rollup, &|| format_rollups(&snapshot.rollups))?;
        emit(&outputs.rollup_levels, &|| format_levels(&snapshot.levels))?;
        emit(&outputs.best_mean_ic, &|| format_series(&snapshot.means))?;
        emit(&outputs.best_stdev_ic, &|| format_series(&snapshot.stdevs))?;
        emit(&outputs.ontology, &|| format_hierarchy(&snapshot.hierarchy))?;
        emit(&outputs.annotations, &|| {
            format_annotations(&map_annotations_with_rollup(
                &snapshot.rollups,
                original_annotations,
            ))
        })?;
        Ok(())
    }
}

impl CheckpointSink for FileCheckpoints {
    fn persist(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.save(snapshot)
    }
}
