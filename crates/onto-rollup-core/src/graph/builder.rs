//! Ontology construction from hierarchy and annotation records

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::time::Instant;

use tracing::debug;

use crate::error::{Result, RollupError};
use crate::graph::ConceptGraph;
use crate::ontology::Ontology;
use crate::records::{AnnotationRecord, HierarchyRecord};
use crate::trace_time;

/// Build a fresh ontology from hierarchy and annotation records.
///
/// Every IS_A parent and every annotated concept must be declared in the
/// hierarchy records; undeclared ids fail the build. After annotations are
/// overlaid, each concept's objects are aggregated from its descendants.
pub fn build_ontology(
    hierarchy: &[HierarchyRecord],
    annotations: &[AnnotationRecord],
) -> Result<Ontology> {
    let start = Instant::now();
    let mut ontology = Ontology::new();

    debug!(records = hierarchy.len(), "adding concepts");
    for record in hierarchy {
        if ontology.contains(&record.concept_id) {
            debug!(concept = %record.concept_id, "duplicate declaration, merging parents");
        }
        ontology.declare(&record.concept_id);
    }

    debug!("adding IS_A relations");
    for record in hierarchy {
        for parent in &record.parents {
            let Some(p) = ontology.get_mut(parent) else {
                return Err(RollupError::unresolved(
                    &format!("IS_A edge from {}", record.concept_id),
                    parent,
                ));
            };
            p.children.insert(record.concept_id.clone());
            ontology
                .declare(&record.concept_id)
                .parents
                .insert(parent.clone());
        }
    }

    debug!(records = annotations.len(), "overlaying annotations");
    for record in annotations {
        let Some(concept) = ontology.get_mut(&record.concept_id) else {
            return Err(RollupError::unresolved("annotation", &record.concept_id));
        };
        if record.objects.is_empty() {
            debug!(concept = %record.concept_id, "annotation record without objects");
            continue;
        }
        concept.direct_annotator = true;
        concept
            .annotated_objects
            .extend(record.objects.iter().cloned());
    }

    aggregate(&mut ontology)?;

    trace_time!(start, "build_ontology", concepts = ontology.len());
    Ok(ontology)
}

/// Propagate annotated objects from children to parents.
///
/// Works from concepts without children upward. A concept is complete once
/// all of its children are; a concept that never completes sits on a cycle.
fn aggregate(ontology: &mut Ontology) -> Result<()> {
    let mut pending: HashMap<String, usize> = HashMap::new();
    let mut ready: VecDeque<String> = VecDeque::new();

    for concept in ontology.iter() {
        if concept.children.is_empty() {
            ready.push_back(concept.id.clone());
        } else {
            pending.insert(concept.id.clone(), concept.children.len());
        }
    }

    while let Some(id) = ready.pop_front() {
        let (objects, parents) = match ontology.get_mut(&id) {
            Some(concept) => {
                concept.aggregation_complete = true;
                (
                    concept.annotated_objects.clone(),
                    concept.parents.iter().cloned().collect::<Vec<_>>(),
                )
            }
            None => continue,
        };

        for parent in parents {
            if let Some(p) = ontology.get_mut(&parent) {
                p.annotated_objects.extend(objects.iter().cloned());
            }
            if let Some(remaining) = pending.get_mut(&parent) {
                *remaining -= 1;
                if *remaining == 0 {
                    pending.remove(&parent);
                    ready.push_back(parent);
                }
            }
        }
    }

    if !pending.is_empty() {
        let pending: BTreeSet<String> = pending.into_keys().collect();
        return Err(RollupError::UnresolvedCycle {
            pending: pending.into_iter().collect(),
        });
    }

    Ok(())
}
