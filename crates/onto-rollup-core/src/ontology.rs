//! Adjacency-set ontology backend
//!
//! Concepts are kept in a `BTreeMap` keyed by id, each holding its parent and
//! child sets, so every query walks concepts in lexicographic order.

use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, RollupError};
use crate::graph::{Concept, ConceptGraph};

/// IS_A hierarchy with aggregated annotations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ontology {
    concepts: BTreeMap<String, Concept>,
}

impl Ontology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a concept if absent, returning it either way
    pub(crate) fn declare(&mut self, id: &str) -> &mut Concept {
        self.concepts
            .entry(id.to_string())
            .or_insert_with(|| Concept::new(id))
    }

    pub fn get(&self, id: &str) -> Option<&Concept> {
        self.concepts.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Concept> {
        self.concepts.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, Concept> {
        self.concepts.values()
    }

    /// All (child, parent) IS_A edges
    pub fn edges(&self) -> BTreeSet<(String, String)> {
        self.concepts
            .values()
            .flat_map(|c| c.parents.iter().map(|p| (c.id.clone(), p.clone())))
            .collect()
    }

    fn concept(&self, id: &str) -> Result<&Concept> {
        self.concepts
            .get(id)
            .ok_or_else(|| RollupError::UnknownConcept { id: id.to_string() })
    }
}

impl ConceptGraph for Ontology {
    fn contains(&self, id: &str) -> bool {
        self.concepts.contains_key(id)
    }

    fn concept_ids(&self) -> Vec<String> {
        self.concepts.keys().cloned().collect()
    }

    fn parent_concepts(&self, id: &str) -> Vec<String> {
        self.concepts
            .get(id)
            .map(|c| c.parents.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn child_concepts(&self, id: &str) -> Vec<String> {
        self.concepts
            .get(id)
            .map(|c| c.children.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn annotated_objects(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.concepts.get(id).map(|c| &c.annotated_objects)
    }

    fn is_direct_annotator(&self, id: &str) -> bool {
        self.concepts.get(id).is_some_and(|c| c.direct_annotator)
    }

    fn promote_annotator(&mut self, id: &str) -> Result<()> {
        let concept = self
            .concepts
            .get_mut(id)
            .ok_or_else(|| RollupError::UnknownConcept { id: id.to_string() })?;
        concept.direct_annotator = true;
        Ok(())
    }

    fn remove_leaf(&mut self, id: &str) -> Result<Vec<String>> {
        if !self.concept(id)?.is_leaf() {
            return Err(RollupError::NotALeaf { id: id.to_string() });
        }
        let leaf = self
            .concepts
            .remove(id)
            .ok_or_else(|| RollupError::UnknownConcept { id: id.to_string() })?;
        for parent in &leaf.parents {
            if let Some(p) = self.concepts.get_mut(parent) {
                p.children.remove(id);
            }
        }
        Ok(leaf.parents.into_iter().collect())
    }

    // Cheaper than the provided versions, which re-query per id
    fn leaf_nodes(&self) -> Vec<String> {
        self.concepts
            .values()
            .filter(|c| c.is_leaf())
            .map(|c| c.id.clone())
            .collect()
    }

    fn root_nodes(&self) -> Vec<String> {
        self.concepts
            .values()
            .filter(|c| c.is_root())
            .map(|c| c.id.clone())
            .collect()
    }

    fn annotators(&self) -> Vec<String> {
        self.concepts
            .values()
            .filter(|c| c.direct_annotator)
            .map(|c| c.id.clone())
            .collect()
    }
}
