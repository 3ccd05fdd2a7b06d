use std::collections::BTreeSet;

use crate::error::RollupError;
use crate::graph::{build_ontology, ConceptGraph};
use crate::records::{parse_annotations, parse_hierarchy, AnnotationRecord, HierarchyRecord};

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// R
/// ├── A ── A1 {o1}
/// │    └── AB {o2}
/// └── B {o3}
///      └── AB
fn diamond() -> (Vec<HierarchyRecord>, Vec<AnnotationRecord>) {
    let hierarchy = parse_hierarchy("R\nA:R\nB:R\nA1:A\nAB:A,B\n").unwrap();
    let annotations = parse_annotations("A1:o1\nAB:o2\nB:o3\n").unwrap();
    (hierarchy, annotations)
}

#[test]
fn test_build_wires_parents_and_children() {
    let (h, a) = diamond();
    let ont = build_ontology(&h, &a).unwrap();

    assert_eq!(ont.len(), 5);
    assert_eq!(ont.parent_concepts("AB"), vec!["A", "B"]);
    assert_eq!(ont.child_concepts("A"), vec!["A1", "AB"]);
    assert_eq!(ont.child_concepts("B"), vec!["AB"]);
    assert!(ont.parent_concepts("R").is_empty());
}

#[test]
fn test_true_path_aggregation() {
    let (h, a) = diamond();
    let ont = build_ontology(&h, &a).unwrap();

    assert_eq!(ont.annotated_objects("A1").unwrap(), &set(&["o1"]));
    assert_eq!(ont.annotated_objects("A").unwrap(), &set(&["o1", "o2"]));
    assert_eq!(ont.annotated_objects("B").unwrap(), &set(&["o2", "o3"]));
    assert_eq!(ont.annotated_objects("R").unwrap(), &set(&["o1", "o2", "o3"]));
    assert!(ont.iter().all(|c| c.aggregation_complete));
}

#[test]
fn test_aggregate_is_union_of_direct_and_children() {
    let (h, a) = diamond();
    let ont = build_ontology(&h, &a).unwrap();

    for concept in ont.iter() {
        let mut expected: BTreeSet<String> = a
            .iter()
            .filter(|r| r.concept_id == concept.id)
            .flat_map(|r| r.objects.iter().cloned())
            .collect();
        for child in &concept.children {
            expected.extend(ont.annotated_objects(child).unwrap().iter().cloned());
        }
        assert_eq!(concept.annotated_objects, expected, "concept {}", concept.id);
    }
}

#[test]
fn test_direct_annotator_flag_ignores_inheritance() {
    let (h, a) = diamond();
    let ont = build_ontology(&h, &a).unwrap();

    assert_eq!(ont.annotators(), vec!["A1", "AB", "B"]);
    assert_eq!(ont.total_annotators(), 3);
    assert!(!ont.is_direct_annotator("A"));
    assert!(!ont.is_direct_annotator("R"));
}

#[test]
fn test_leaves_and_roots() {
    let (h, a) = diamond();
    let ont = build_ontology(&h, &a).unwrap();

    assert_eq!(ont.leaf_nodes(), vec!["A1", "AB"]);
    assert_eq!(ont.root_nodes(), vec!["R"]);
}

#[test]
fn test_isolated_concept_is_root_not_leaf() {
    let h = parse_hierarchy("LONE\n").unwrap();
    let ont = build_ontology(&h, &[]).unwrap();

    assert!(ont.leaf_nodes().is_empty());
    assert_eq!(ont.root_nodes(), vec!["LONE"]);
}

#[test]
fn test_descendant_concepts() {
    let (h, a) = diamond();
    let ont = build_ontology(&h, &a).unwrap();

    assert_eq!(ont.descendant_concepts("R"), set(&["A", "A1", "AB", "B"]));
    assert_eq!(ont.descendant_concepts("B"), set(&["AB"]));
    assert!(ont.descendant_concepts("A1").is_empty());
}

#[test]
fn test_total_annotated_objects_over_roots() {
    let h = parse_hierarchy("R1\nR2\nA:R1\nB:R2\n").unwrap();
    let a = parse_annotations("A:o1,o2\nB:o2,o3\n").unwrap();
    let ont = build_ontology(&h, &a).unwrap();

    assert_eq!(ont.total_annotated_objects(), 3);
}

#[test]
fn test_remove_leaf_updates_parent_children() {
    let (h, a) = diamond();
    let mut ont = build_ontology(&h, &a).unwrap();
    let n = ont.total_annotated_objects();

    let parents = ont.remove_leaf("AB").unwrap();
    assert_eq!(parents, vec!["A", "B"]);
    assert!(!ont.contains("AB"));
    assert_eq!(ont.child_concepts("A"), vec!["A1"]);
    assert!(ont.child_concepts("B").is_empty());
    assert_eq!(ont.leaf_nodes(), vec!["A1", "B"]);
    // removal performs no aggregation
    assert_eq!(ont.annotated_objects("B").unwrap(), &set(&["o2", "o3"]));
    assert_eq!(ont.total_annotated_objects(), n);
}

#[test]
fn test_remove_non_leaf_is_rejected() {
    let (h, a) = diamond();
    let mut ont = build_ontology(&h, &a).unwrap();

    assert!(matches!(
        ont.remove_leaf("A"),
        Err(RollupError::NotALeaf { ref id }) if id == "A"
    ));
    assert!(matches!(
        ont.remove_leaf("R"),
        Err(RollupError::NotALeaf { .. })
    ));
    assert!(matches!(
        ont.remove_leaf("missing"),
        Err(RollupError::UnknownConcept { .. })
    ));
    assert_eq!(ont.len(), 5);
}

#[test]
fn test_promote_annotator() {
    let (h, a) = diamond();
    let mut ont = build_ontology(&h, &a).unwrap();

    ont.promote_annotator("A").unwrap();
    assert!(ont.is_direct_annotator("A"));
    assert!(ont.promote_annotator("missing").is_err());
}

#[test]
fn test_undeclared_parent_fails() {
    let h = parse_hierarchy("R\nA:R,GHOST\n").unwrap();
    let err = build_ontology(&h, &[]).unwrap_err();
    match err {
        RollupError::UnresolvedReference { id, .. } => assert_eq!(id, "GHOST"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_undeclared_annotation_concept_fails() {
    let h = parse_hierarchy("R\nA:R\n").unwrap();
    let a = parse_annotations("GHOST:o1\n").unwrap();
    let err = build_ontology(&h, &a).unwrap_err();
    assert!(matches!(err, RollupError::UnresolvedReference { ref id, .. } if id == "GHOST"));
}

#[test]
fn test_cycle_is_construction_error() {
    let h = parse_hierarchy("R\nA:R,C\nB:A\nC:B\n").unwrap();
    let err = build_ontology(&h, &[]).unwrap_err();
    match err {
        RollupError::UnresolvedCycle { pending } => {
            assert_eq!(pending, vec!["A", "B", "C", "R"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_self_loop_is_construction_error() {
    let h = parse_hierarchy("A:A\n").unwrap();
    assert!(matches!(
        build_ontology(&h, &[]),
        Err(RollupError::UnresolvedCycle { .. })
    ));
}

#[test]
fn test_empty_annotation_record_is_not_annotator() {
    let h = parse_hierarchy("R\nA:R\n").unwrap();
    let a = parse_annotations("A:\n").unwrap();
    let ont = build_ontology(&h, &a).unwrap();

    assert!(!ont.is_direct_annotator("A"));
    assert_eq!(ont.annotated_count("A"), 0);
}

#[test]
fn test_duplicate_records_merge() {
    let h = parse_hierarchy("R\nS\nA:R\nA:S\n").unwrap();
    let a = parse_annotations("A:o1\nA:o2\n").unwrap();
    let ont = build_ontology(&h, &a).unwrap();

    assert_eq!(ont.parent_concepts("A"), vec!["R", "S"]);
    assert_eq!(ont.annotated_objects("A").unwrap(), &set(&["o1", "o2"]));
}

#[test]
fn test_rebuild_is_idempotent() {
    let (h, a) = diamond();
    let first = build_ontology(&h, &a).unwrap();
    let mut h_rev = h.clone();
    h_rev.reverse();
    let mut a_rev = a.clone();
    a_rev.reverse();
    let second = build_ontology(&h_rev, &a_rev).unwrap();

    assert_eq!(first.concept_ids(), second.concept_ids());
    assert_eq!(first.edges(), second.edges());
    for id in first.concept_ids() {
        assert_eq!(first.annotated_objects(&id), second.annotated_objects(&id));
    }
    assert_eq!(first, second);
}

#[test]
fn test_hierarchy_records_reflect_removals() {
    let (h, a) = diamond();
    let mut ont = build_ontology(&h, &a).unwrap();
    ont.remove_leaf("A1").unwrap();

    let records = ont.hierarchy_records();
    assert_eq!(
        records,
        vec![
            HierarchyRecord::new("A", &["R"]),
            HierarchyRecord::new("AB", &["A", "B"]),
            HierarchyRecord::new("B", &["R"]),
            HierarchyRecord::new("R", &[]),
        ]
    );
}
