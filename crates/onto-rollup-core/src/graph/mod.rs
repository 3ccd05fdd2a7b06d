//! Concept graph model
//!
//! Provides the IS_A hierarchy the rollup operates on:
//! - `ConceptGraph` trait so the rollup engine is independent of the backend
//! - Builder that wires records into a graph and aggregates annotations bottom-up
//! - Concept node type

pub mod builder;
pub mod traversal;
pub mod types;

#[cfg(test)]
mod tests;

pub use builder::build_ontology;
pub use traversal::ConceptGraph;
pub use types::Concept;
