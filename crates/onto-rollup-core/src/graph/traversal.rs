use std::collections::{BTreeSet, VecDeque};

use crate::error::Result;
use crate::records::HierarchyRecord;

/// Trait for navigating and mutating a concept hierarchy.
///
/// Edges point child -> parent (IS_A). Every list returned by the
/// required methods is sorted by concept id so iteration is deterministic.
pub trait ConceptGraph: Send + Sync {
    fn contains(&self, id: &str) -> bool;

    /// All concept ids, sorted
    fn concept_ids(&self) -> Vec<String>;

    /// Direct parents of a concept (empty for roots and unknown ids)
    fn parent_concepts(&self, id: &str) -> Vec<String>;

    /// Direct children of a concept (empty for leaves and unknown ids)
    fn child_concepts(&self, id: &str) -> Vec<String>;

    /// Aggregated annotated objects of a concept
    fn annotated_objects(&self, id: &str) -> Option<&BTreeSet<String>>;

    fn is_direct_annotator(&self, id: &str) -> bool;

    /// Mark a concept as a direct annotator
    fn promote_annotator(&mut self, id: &str) -> Result<()>;

    /// Delete a leaf and its incident edges, returning its former parents.
    /// Performs no aggregation; annotations already live on the parents.
    fn remove_leaf(&mut self, id: &str) -> Result<Vec<String>>;

    fn annotated_count(&self, id: &str) -> usize {
        self.annotated_objects(id).map_or(0, BTreeSet::len)
    }

    fn is_leaf(&self, id: &str) -> bool {
        self.contains(id)
            && !self.parent_concepts(id).is_empty()
            && self.child_concepts(id).is_empty()
    }

    /// Concepts with at least one parent and no children
    fn leaf_nodes(&self) -> Vec<String> {
        self.concept_ids()
            .into_iter()
            .filter(|id| self.is_leaf(id))
            .collect()
    }

    /// Concepts with no parents
    fn root_nodes(&self) -> Vec<String> {
        self.concept_ids()
            .into_iter()
            .filter(|id| self.parent_concepts(id).is_empty())
            .collect()
    }

    /// All transitive children of a concept
    fn descendant_concepts(&self, id: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<String> = self.child_concepts(id).into();
        while let Some(current) = queue.pop_front() {
            if seen.insert(current.clone()) {
                queue.extend(self.child_concepts(&current));
            }
        }
        seen
    }

    /// Concepts flagged as direct annotators
    fn annotators(&self) -> Vec<String> {
        self.concept_ids()
            .into_iter()
            .filter(|id| self.is_direct_annotator(id))
            .collect()
    }

    fn total_annotators(&self) -> usize {
        self.annotators().len()
    }

    /// Size of the union of annotated objects over all roots
    fn total_annotated_objects(&self) -> usize {
        let mut objects: BTreeSet<&String> = BTreeSet::new();
        for root in self.root_nodes() {
            if let Some(root_objects) = self.annotated_objects(&root) {
                objects.extend(root_objects.iter());
            }
        }
        objects.len()
    }

    /// Surviving concepts with their remaining parents, in hierarchy input form
    fn hierarchy_records(&self) -> Vec<HierarchyRecord> {
        self.concept_ids()
            .into_iter()
            .map(|id| {
                let parents = self.parent_concepts(&id);
                HierarchyRecord {
                    concept_id: id,
                    parents,
                }
            })
            .collect()
    }
}
