//! Line-oriented record codecs
//!
//! Every input and output file uses the same shape: one concept per line,
//! `CONCEPT_ID` optionally followed by `:ITEM_1,ITEM_2,...`. Levels use
//! `CONCEPT_ID,LEVEL` and the statistic series are a single comma-separated line.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::bail_malformed;
use crate::error::{RollupError, Result};

/// Source name used in errors for hierarchy input
pub const HIERARCHY_SOURCE: &str = "hierarchy";
/// Source name used in errors for annotation input
pub const ANNOTATION_SOURCE: &str = "annotations";

/// A concept declaration with its IS_A parents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyRecord {
    pub concept_id: String,
    pub parents: Vec<String>,
}

impl HierarchyRecord {
    pub fn new(concept_id: impl Into<String>, parents: &[&str]) -> Self {
        Self {
            concept_id: concept_id.into(),
            parents: parents.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Objects directly annotated by a concept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub concept_id: String,
    pub objects: Vec<String>,
}

impl AnnotationRecord {
    pub fn new(concept_id: impl Into<String>, objects: &[&str]) -> Self {
        Self {
            concept_id: concept_id.into(),
            objects: objects.iter().map(|o| o.to_string()).collect(),
        }
    }
}

/// Split one `ID[:A,B,...]` line. Blank lines yield `None`.
fn parse_keyed_line(
    source: &str,
    line_no: usize,
    line: &str,
) -> Result<Option<(String, Option<Vec<String>>)>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut parts = line.split(':');
    let id = parts.next().unwrap_or_default().trim();
    let list = parts.next();
    if parts.next().is_some() {
        bail_malformed!(source, line_no, "more than one ':' separator");
    }
    if id.is_empty() {
        bail_malformed!(source, line_no, "missing concept id");
    }

    let items = match list.map(str::trim) {
        None => None,
        Some("") => Some(Vec::new()),
        Some(list) => {
            let mut items = Vec::new();
            for item in list.split(',') {
                let item = item.trim();
                if item.is_empty() {
                    bail_malformed!(source, line_no, format!("empty list entry for {}", id));
                }
                items.push(item.to_string());
            }
            Some(items)
        }
    };

    Ok(Some((id.to_string(), items)))
}

/// Parse hierarchy text; a line without a colon declares a concept with no parents
pub fn parse_hierarchy(text: &str) -> Result<Vec<HierarchyRecord>> {
    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if let Some((concept_id, parents)) = parse_keyed_line(HIERARCHY_SOURCE, idx + 1, line)? {
            records.push(HierarchyRecord {
                concept_id,
                parents: parents.unwrap_or_default(),
            });
        }
    }
    Ok(records)
}

/// Parse annotation text; a line without a colon carries no direct annotations
pub fn parse_annotations(text: &str) -> Result<Vec<AnnotationRecord>> {
    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if let Some((concept_id, objects)) = parse_keyed_line(ANNOTATION_SOURCE, idx + 1, line)? {
            records.push(AnnotationRecord {
                concept_id,
                objects: objects.unwrap_or_default(),
            });
        }
    }
    Ok(records)
}

/// Read a file, reporting the path on failure
pub fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| RollupError::io_operation("read", path.display(), e))
}

/// Load hierarchy records from a file
pub fn load_hierarchy(path: &Path) -> Result<Vec<HierarchyRecord>> {
    parse_hierarchy(&read_input(path)?)
}

/// Load annotation records from a file
pub fn load_annotations(path: &Path) -> Result<Vec<AnnotationRecord>> {
    parse_annotations(&read_input(path)?)
}

fn join_lines(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn keyed_line<'a>(id: &str, items: impl IntoIterator<Item = &'a String>) -> String {
    let items: Vec<&str> = items.into_iter().map(String::as_str).collect();
    if items.is_empty() {
        id.to_string()
    } else {
        format!("{}:{}", id, items.join(","))
    }
}

/// Format hierarchy records in the input hierarchy format
pub fn format_hierarchy(records: &[HierarchyRecord]) -> String {
    join_lines(
        records
            .iter()
            .map(|r| keyed_line(&r.concept_id, &r.parents))
            .collect(),
    )
}

/// Format concept-to-objects annotations in the input annotation format
pub fn format_annotations(annotations: &BTreeMap<String, BTreeSet<String>>) -> String {
    join_lines(
        annotations
            .iter()
            .map(|(id, objects)| keyed_line(id, objects))
            .collect(),
    )
}

/// Format the rollup mapping as `CONCEPT_ID:TARGET_1,TARGET_2,...`
pub fn format_rollups(rollups: &BTreeMap<String, Vec<String>>) -> String {
    join_lines(
        rollups
            .iter()
            .map(|(id, targets)| keyed_line(id, targets))
            .collect(),
    )
}

/// Parse a rollup mapping written by [`format_rollups`]
pub fn parse_rollups(text: &str) -> Result<BTreeMap<String, Vec<String>>> {
    let mut rollups = BTreeMap::new();
    for (idx, line) in text.lines().enumerate() {
        let Some((id, targets)) = parse_keyed_line("rollup", idx + 1, line)? else {
            continue;
        };
        match targets {
            Some(targets) if !targets.is_empty() => {
                rollups.insert(id, targets);
            }
            _ => bail_malformed!("rollup", idx + 1, format!("no targets for {}", id)),
        }
    }
    Ok(rollups)
}

/// Format rollup levels as `CONCEPT_ID,LEVEL`
pub fn format_levels(levels: &BTreeMap<String, u32>) -> String {
    join_lines(
        levels
            .iter()
            .map(|(id, level)| format!("{},{}", id, level))
            .collect(),
    )
}

/// Parse rollup levels written by [`format_levels`]
pub fn parse_levels(text: &str) -> Result<BTreeMap<String, u32>> {
    let mut levels = BTreeMap::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((id, level)) = line.rsplit_once(',') else {
            bail_malformed!("rollup_levels", idx + 1, "expected CONCEPT_ID,LEVEL");
        };
        let id = id.trim();
        if id.is_empty() {
            bail_malformed!("rollup_levels", idx + 1, "missing concept id");
        }
        let level: u32 = level.trim().parse().map_err(|_| {
            RollupError::malformed("rollup_levels", idx + 1, format!("invalid level '{}'", level))
        })?;
        levels.insert(id.to_string(), level);
    }
    Ok(levels)
}

/// Format a statistic series as one comma-separated line
pub fn format_series(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a statistic series written by [`format_series`]
pub fn parse_series(text: &str) -> Result<Vec<f64>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    text.split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| RollupError::malformed("series", 1, format!("invalid number '{}'", v)))
        })
        .collect()
}
