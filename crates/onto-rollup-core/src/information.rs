//! Information content statistics
//!
//! IC(c) = ln(N / n) where N is the number of annotated objects in the whole
//! ontology and n the number annotated by c (directly or through descendants).

use std::collections::BTreeMap;

use crate::graph::ConceptGraph;

/// Information content for a concept annotating `annotated` of `total` objects.
/// Returns positive infinity when the concept annotates nothing.
pub fn information_content_for(annotated: usize, total: usize) -> f64 {
    if annotated == 0 {
        f64::INFINITY
    } else {
        (total as f64 / annotated as f64).ln()
    }
}

/// Information content of a concept in the graph
pub fn information_content<G: ConceptGraph + ?Sized>(graph: &G, id: &str, total: usize) -> f64 {
    information_content_for(graph.annotated_count(id), total)
}

/// Information content for every current direct annotator
pub fn annotators_information_content<G: ConceptGraph + ?Sized>(
    graph: &G,
    total: usize,
) -> BTreeMap<String, f64> {
    graph
        .annotators()
        .into_iter()
        .map(|id| {
            let ic = information_content(graph, &id, total);
            (id, ic)
        })
        .collect()
}

/// Sum of information content over all concepts, or direct annotators only
pub fn total_information_content<G: ConceptGraph + ?Sized>(
    graph: &G,
    total: usize,
    direct_annotators_only: bool,
) -> f64 {
    graph
        .concept_ids()
        .iter()
        .filter(|id| !direct_annotators_only || graph.is_direct_annotator(id))
        .map(|id| information_content(graph, id, total))
        .sum()
}

/// Population standard deviation around `mean`, dividing by `count`.
pub fn ic_stdev(values: impl IntoIterator<Item = f64>, mean: f64, count: usize) -> f64 {
    let squares: f64 = values.into_iter().map(|x| (x - mean).powi(2)).sum();
    (squares / count as f64).sqrt()
}

/// Standard deviation around `mean` with divisor `len - ddof`.
/// `None` when the divisor is not positive.
pub fn dispersion(values: &[f64], mean: f64, ddof: usize) -> Option<f64> {
    let divisor = values.len().checked_sub(ddof).filter(|d| *d > 0)?;
    let squares: f64 = values.iter().map(|x| (x - mean).powi(2)).sum();
    Some((squares / divisor as f64).sqrt())
}

fn annotation_counts<G: ConceptGraph + ?Sized>(graph: &G, direct_annotators_only: bool) -> Vec<f64> {
    let ids = if direct_annotators_only {
        graph.annotators()
    } else {
        graph.concept_ids()
    };
    ids.iter()
        .map(|id| graph.annotated_count(id) as f64)
        .collect()
}

/// Mean number of annotated objects per concept (`None` for an empty selection)
pub fn mean_annotations_per_concept<G: ConceptGraph + ?Sized>(
    graph: &G,
    direct_annotators_only: bool,
) -> Option<f64> {
    let counts = annotation_counts(graph, direct_annotators_only);
    if counts.is_empty() {
        return None;
    }
    Some(counts.iter().sum::<f64>() / counts.len() as f64)
}

/// Standard deviation of annotated objects per concept.
///
/// Divisor is `count - ddof`; use `ddof = 0` when the concepts are the whole
/// population and `ddof = 1` for a sample estimate.
pub fn stdev_annotations_per_concept<G: ConceptGraph + ?Sized>(
    graph: &G,
    direct_annotators_only: bool,
    ddof: usize,
) -> Option<f64> {
    let mean = mean_annotations_per_concept(graph, direct_annotators_only)?;
    dispersion(&annotation_counts(graph, direct_annotators_only), mean, ddof)
}
