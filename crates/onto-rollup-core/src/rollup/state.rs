use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Rollup mapping, levels and the reverse index used to keep the mapping
/// transitively resolved.
#[derive(Debug, Clone, Default)]
pub struct RollupState {
    /// Eliminated concept -> concepts it is currently folded into
    rollups: BTreeMap<String, Vec<String>>,
    /// Eliminated concept -> elimination hops folded into its mapping
    levels: BTreeMap<String, u32>,
    /// Target concept -> keys of `rollups` whose targets contain it
    mapped_onto: HashMap<String, BTreeSet<String>>,
}

impl RollupState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rollups(&self) -> &BTreeMap<String, Vec<String>> {
        &self.rollups
    }

    pub fn levels(&self) -> &BTreeMap<String, u32> {
        &self.levels
    }

    pub fn is_rolled(&self, id: &str) -> bool {
        self.rollups.contains_key(id)
    }

    /// Record that `leaf` was eliminated onto `parents`.
    ///
    /// Every key currently mapped onto `leaf` is rewritten to map onto
    /// `parents` instead and its level goes up by one.
    pub fn record_elimination(&mut self, leaf: &str, parents: &[String]) {
        if let Some(sources) = self.mapped_onto.remove(leaf) {
            for key in sources {
                if let Some(targets) = self.rollups.get_mut(&key) {
                    targets.retain(|t| t != leaf);
                    for parent in parents {
                        if !targets.contains(parent) {
                            targets.push(parent.clone());
                        }
                    }
                }
                *self.levels.entry(key.clone()).or_insert(0) += 1;
                for parent in parents {
                    self.mapped_onto
                        .entry(parent.clone())
                        .or_default()
                        .insert(key.clone());
                }
            }
        }

        self.rollups.insert(leaf.to_string(), parents.to_vec());
        self.levels.insert(leaf.to_string(), 1);
        for parent in parents {
            self.mapped_onto
                .entry(parent.clone())
                .or_default()
                .insert(leaf.to_string());
        }
    }

    /// Copy of the mapping and levels with every surviving annotator that was
    /// never eliminated mapped onto itself at level 0.
    pub fn completed(
        &self,
        annotators: &[String],
    ) -> (BTreeMap<String, Vec<String>>, BTreeMap<String, u32>) {
        let mut rollups = self.rollups.clone();
        let mut levels = self.levels.clone();
        add_self_maps(&mut rollups, &mut levels, annotators);
        (rollups, levels)
    }

    /// Add self-maps for surviving annotators and hand back the mapping
    pub fn finalize(
        mut self,
        annotators: &[String],
    ) -> (BTreeMap<String, Vec<String>>, BTreeMap<String, u32>) {
        add_self_maps(&mut self.rollups, &mut self.levels, annotators);
        (self.rollups, self.levels)
    }
}

fn add_self_maps(
    rollups: &mut BTreeMap<String, Vec<String>>,
    levels: &mut BTreeMap<String, u32>,
    annotators: &[String],
) {
    for annotator in annotators {
        if !rollups.contains_key(annotator) {
            rollups.insert(annotator.clone(), vec![annotator.clone()]);
            levels.insert(annotator.clone(), 0);
        }
    }
}
