//! Onto Rollup Core Library
//!
//! Concept graph model, information content statistics and the greedy
//! leaf-elimination rollup that shrinks the set of direct annotators.

pub mod config;
pub mod error;
pub mod format;
pub mod graph;
pub mod information;
pub mod logging;
pub mod ontology;
pub mod output;
pub mod records;
pub mod rollup;
