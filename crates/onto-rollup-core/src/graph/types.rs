use std::collections::BTreeSet;

/// A node of the IS_A hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concept {
    pub id: String,
    /// Concepts this concept IS_A
    pub parents: BTreeSet<String>,
    /// Concepts that IS_A this concept
    pub children: BTreeSet<String>,
    /// Objects annotated by this concept or any descendant (true-path rule)
    pub annotated_objects: BTreeSet<String>,
    /// True when the annotation input assigned objects to this concept directly
    pub direct_annotator: bool,
    /// Set once `annotated_objects` includes every descendant's objects
    pub aggregation_complete: bool,
}

impl Concept {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
            annotated_objects: BTreeSet::new(),
            direct_annotator: false,
            aggregation_complete: false,
        }
    }

    /// At least one parent and no children
    pub fn is_leaf(&self) -> bool {
        !self.parents.is_empty() && self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}
