//! Configuration file type definitions
//!
//! Every key is optional at this layer; required keys are enforced when the
//! file is resolved into a [`super::RollupConfig`].

use serde::{Deserialize, Serialize};

/// Section names as they appear in error messages
pub const INPUT_SECTION: &str = "input_files";
pub const OUTPUT_SECTION: &str = "output_files";
pub const OPTIONS_SECTION: &str = "rollup_options";

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, alias = "Input_Files")]
    pub input_files: Option<InputFilesSection>,

    #[serde(default, alias = "Output_Files")]
    pub output_files: Option<OutputFilesSection>,

    #[serde(default, alias = "Rollup_Options")]
    pub rollup_options: Option<RollupOptionsSection>,
}

/// Input record files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputFilesSection {
    #[serde(default, alias = "FILE_ONTOLOGY")]
    pub ontology: Option<String>,

    #[serde(default, alias = "FILE_ANNOTATIONS")]
    pub annotations: Option<String>,
}

/// Output path templates; `{}` or `{0}` is replaced by the annotator count
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputFilesSection {
    #[serde(default, alias = "FILE_ROLLUP", skip_serializing_if = "Option::is_none")]
    pub rollup: Option<String>,

    #[serde(
        default,
        alias = "FILE_ROLLUP_LEVELS",
        skip_serializing_if = "Option::is_none"
    )]
    pub rollup_levels: Option<String>,

    #[serde(
        default,
        alias = "FILE_BEST_MEAN_IC",
        skip_serializing_if = "Option::is_none"
    )]
    pub best_mean_ic: Option<String>,

    #[serde(
        default,
        alias = "FILE_BEST_STDEV_IC",
        skip_serializing_if = "Option::is_none"
    )]
    pub best_stdev_ic: Option<String>,

    #[serde(default, alias = "FILE_ONTOLOGY", skip_serializing_if = "Option::is_none")]
    pub ontology: Option<String>,

    #[serde(
        default,
        alias = "FILE_ANNOTATIONS",
        skip_serializing_if = "Option::is_none"
    )]
    pub annotations: Option<String>,
}

/// Rollup loop options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RollupOptionsSection {
    #[serde(default, alias = "TOTAL_ANNOTATORS_AFTER_ROLLUP")]
    pub total_annotators_after_rollup: Option<usize>,

    #[serde(default, alias = "MAXIMUM_ITERATIONS")]
    pub maximum_iterations: Option<usize>,

    #[serde(default, alias = "PRINT_STATUS_FREQ")]
    pub print_status_freq: Option<usize>,

    #[serde(default, alias = "CHECK_POINTS")]
    pub check_points: Option<CheckPoints>,

    #[serde(default)]
    pub parallel: bool,

    #[serde(default)]
    pub halt_on_checkpoint_error: bool,
}

/// Checkpoint thresholds, either a TOML array or a comma-separated string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckPoints {
    List(Vec<usize>),
    Text(String),
}
