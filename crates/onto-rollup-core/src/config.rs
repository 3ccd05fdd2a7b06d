//! Run configuration for onto-rollup
//!
//! The configuration is a TOML file with `[input_files]`, `[output_files]` and
//! `[rollup_options]` sections. The INI-style names used by earlier releases
//! (`Input_Files`, `FILE_ONTOLOGY`, `CHECK_POINTS`, ...) are accepted as aliases.

pub mod types;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::bail_invalid_config;
use crate::error::{Result, RollupError};
use crate::output::OutputFiles;
use crate::rollup::RollupOptions;

pub use types::{
    CheckPoints, ConfigFile, InputFilesSection, OutputFilesSection, RollupOptionsSection,
    INPUT_SECTION, OPTIONS_SECTION, OUTPUT_SECTION,
};

/// Fully resolved configuration for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RollupConfig {
    /// Hierarchy input path
    pub ontology: PathBuf,
    /// Annotation input path
    pub annotations: PathBuf,
    /// Output path templates
    pub outputs: OutputFiles,
    /// Loop options
    pub options: RollupOptions,
}

impl RollupConfig {
    /// Load and validate a configuration file.
    ///
    /// Relative paths are resolved against the directory holding the file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| RollupError::io_operation("read config", path.display(), e))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        debug!(path = %path.display(), "loading configuration");
        Self::from_toml(&content, base_dir)
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str, base_dir: &Path) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Self::resolve(file, base_dir)
    }

    /// Enforce required keys and build the resolved configuration
    pub fn resolve(file: ConfigFile, base_dir: &Path) -> Result<Self> {
        let inputs = file
            .input_files
            .ok_or_else(|| RollupError::missing_key(INPUT_SECTION, "ontology"))?;
        let ontology = inputs
            .ontology
            .ok_or_else(|| RollupError::missing_key(INPUT_SECTION, "ontology"))?;
        let annotations = inputs
            .annotations
            .ok_or_else(|| RollupError::missing_key(INPUT_SECTION, "annotations"))?;

        let section = file
            .rollup_options
            .ok_or_else(|| RollupError::missing_key(OPTIONS_SECTION, "total_annotators_after_rollup"))?;
        let options = resolve_options(section)?;

        let outputs = file.output_files.unwrap_or_default();
        let resolve = |template: Option<String>| template.map(|t| base_dir.join(t));
        let outputs = OutputFiles {
            rollup: resolve(outputs.rollup),
            rollup_levels: resolve(outputs.rollup_levels),
            best_mean_ic: resolve(outputs.best_mean_ic),
            best_stdev_ic: resolve(outputs.best_stdev_ic),
            ontology: resolve(outputs.ontology),
            annotations: resolve(outputs.annotations),
        };

        Ok(Self {
            ontology: base_dir.join(ontology),
            annotations: base_dir.join(annotations),
            outputs,
            options,
        })
    }
}

fn resolve_options(section: RollupOptionsSection) -> Result<RollupOptions> {
    let desired_annotators = section
        .total_annotators_after_rollup
        .ok_or_else(|| RollupError::missing_key(OPTIONS_SECTION, "total_annotators_after_rollup"))?;
    let max_iterations = section
        .maximum_iterations
        .ok_or_else(|| RollupError::missing_key(OPTIONS_SECTION, "maximum_iterations"))?;

    let defaults = RollupOptions::default();
    let print_status_freq = section
        .print_status_freq
        .unwrap_or(defaults.print_status_freq);
    if print_status_freq == 0 {
        bail_invalid_config!("print_status_freq", "must be greater than zero");
    }

    let checkpoints = match section.check_points {
        None => BTreeSet::new(),
        Some(points) => parse_check_points(points)?,
    };

    Ok(RollupOptions {
        desired_annotators,
        max_iterations,
        print_status_freq,
        checkpoints,
        parallel: section.parallel,
        halt_on_checkpoint_error: section.halt_on_checkpoint_error,
    })
}

/// Turn either checkpoint form into a threshold set
pub fn parse_check_points(points: CheckPoints) -> Result<BTreeSet<usize>> {
    match points {
        CheckPoints::List(values) => Ok(values.into_iter().collect()),
        CheckPoints::Text(text) => {
            let mut set = BTreeSet::new();
            for item in text.split(',') {
                let item = item.trim();
                if item.is_empty() {
                    continue;
                }
                match item.parse::<usize>() {
                    Ok(value) => {
                        set.insert(value);
                    }
                    Err(e) => bail_invalid_config!("check_points", format!("{item:?}: {e}")),
                }
            }
            Ok(set)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MINIMAL: &str = r#"
[input_files]
ontology = "hierarchy.txt"
annotations = "annotations.txt"

[rollup_options]
total_annotators_after_rollup = 10
maximum_iterations = 100
"#;

    #[test]
    fn test_minimal_config_defaults() {
        let config = RollupConfig::from_toml(MINIMAL, Path::new("/data")).unwrap();

        assert_eq!(config.ontology, PathBuf::from("/data/hierarchy.txt"));
        assert_eq!(config.annotations, PathBuf::from("/data/annotations.txt"));
        assert_eq!(config.options.desired_annotators, 10);
        assert_eq!(config.options.max_iterations, 100);
        assert_eq!(config.options.print_status_freq, 500);
        assert!(config.options.checkpoints.is_empty());
        assert!(!config.options.parallel);
        assert!(!config.options.halt_on_checkpoint_error);
        assert_eq!(config.outputs, OutputFiles::default());
    }

    #[test]
    fn test_full_config() {
        let text = r#"
[input_files]
ontology = "in/h.txt"
annotations = "/abs/a.txt"

[output_files]
rollup = "out/rollup_{}.txt"
rollup_levels = "out/levels_{0}.txt"
best_mean_ic = "out/mean.txt"
best_stdev_ic = "out/stdev.txt"
ontology = "out/ontology_{}.txt"
annotations = "out/annotations_{}.txt"

[rollup_options]
total_annotators_after_rollup = 5
maximum_iterations = 1000
print_status_freq = 10
check_points = [100, 50, 100]
parallel = true
halt_on_checkpoint_error = true
"#;
        let config = RollupConfig::from_toml(text, Path::new("/cfg")).unwrap();

        assert_eq!(config.ontology, PathBuf::from("/cfg/in/h.txt"));
        assert_eq!(config.annotations, PathBuf::from("/abs/a.txt"));
        assert_eq!(
            config.outputs.rollup,
            Some(PathBuf::from("/cfg/out/rollup_{}.txt"))
        );
        assert_eq!(
            config.outputs.rollup_levels,
            Some(PathBuf::from("/cfg/out/levels_{0}.txt"))
        );
        assert_eq!(config.options.print_status_freq, 10);
        assert_eq!(
            config.options.checkpoints,
            [50, 100].into_iter().collect::<BTreeSet<_>>()
        );
        assert!(config.options.parallel);
        assert!(config.options.halt_on_checkpoint_error);
    }

    #[test]
    fn test_legacy_names_accepted() {
        let text = r#"
[Input_Files]
FILE_ONTOLOGY = "h.txt"
FILE_ANNOTATIONS = "a.txt"

[Output_Files]
FILE_ROLLUP = "rollup_{}.txt"
FILE_BEST_STDEV_IC = "stdev_{}.txt"

[Rollup_Options]
TOTAL_ANNOTATORS_AFTER_ROLLUP = 3
MAXIMUM_ITERATIONS = 20
PRINT_STATUS_FREQ = 2
CHECK_POINTS = "8, 4"
"#;
        let config = RollupConfig::from_toml(text, Path::new("")).unwrap();

        assert_eq!(config.ontology, PathBuf::from("h.txt"));
        assert_eq!(config.outputs.rollup, Some(PathBuf::from("rollup_{}.txt")));
        assert_eq!(
            config.outputs.best_stdev_ic,
            Some(PathBuf::from("stdev_{}.txt"))
        );
        assert!(config.outputs.best_mean_ic.is_none());
        assert_eq!(config.options.desired_annotators, 3);
        assert_eq!(config.options.print_status_freq, 2);
        assert_eq!(
            config.options.checkpoints,
            [4, 8].into_iter().collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn test_missing_required_keys() {
        let err = RollupConfig::from_toml("", Path::new("")).unwrap_err();
        assert!(matches!(
            err,
            RollupError::Configuration { ref section, ref key } if section == "input_files" && key == "ontology"
        ));

        let text = "[input_files]\nontology = \"h.txt\"\n";
        let err = RollupConfig::from_toml(text, Path::new("")).unwrap_err();
        assert!(matches!(
            err,
            RollupError::Configuration { ref key, .. } if key == "annotations"
        ));

        let text = "[input_files]\nontology = \"h\"\nannotations = \"a\"\n[rollup_options]\ntotal_annotators_after_rollup = 3\n";
        let err = RollupConfig::from_toml(text, Path::new("")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing configuration key [rollup_options] maximum_iterations"
        );
    }

    #[test]
    fn test_invalid_values() {
        let text = MINIMAL.replace("maximum_iterations = 100", "maximum_iterations = 100\nprint_status_freq = 0");
        let err = RollupConfig::from_toml(&text, Path::new("")).unwrap_err();
        assert!(matches!(err, RollupError::InvalidConfig { ref key, .. } if key == "print_status_freq"));

        let text = MINIMAL.replace("maximum_iterations = 100", "maximum_iterations = 100\ncheck_points = \"10,x\"");
        let err = RollupConfig::from_toml(&text, Path::new("")).unwrap_err();
        assert!(matches!(err, RollupError::InvalidConfig { ref key, .. } if key == "check_points"));

        let text = MINIMAL.replace("maximum_iterations = 100", "maximum_iterations = -1");
        let err = RollupConfig::from_toml(&text, Path::new("")).unwrap_err();
        assert!(matches!(err, RollupError::Toml(_)));
    }

    #[test]
    fn test_load_resolves_against_config_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rollup.toml");
        fs::write(&path, MINIMAL).unwrap();

        let config = RollupConfig::load(&path).unwrap();
        assert_eq!(config.ontology, dir.path().join("hierarchy.txt"));
        assert_eq!(config.annotations, dir.path().join("annotations.txt"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = RollupConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, RollupError::FailedOperationWithTarget { .. }));
    }

    #[test]
    fn test_parse_check_points_skips_blanks() {
        let set = parse_check_points(CheckPoints::Text(" 3, ,1,".to_string())).unwrap();
        assert_eq!(set, [1, 3].into_iter().collect::<BTreeSet<_>>());
        assert!(parse_check_points(CheckPoints::Text(String::new()))
            .unwrap()
            .is_empty());
    }
}
