//! Platshållare för okända makar, makar och hustrur

use crate::models::{
    Gender, LayoutCallbacks, Marriage, MarriageKind, Orientation, Person, Variant,
};

use super::node_map::{person_node, NodeMap};

pub fn spouse_placeholder_id(marriage_id: &str) -> String {
    format!("placeholder-spouse-{}", marriage_id)
}

pub fn husband_placeholder_id(marriage_id: &str) -> String {
    format!("placeholder-husband-{}", marriage_id)
}

pub fn wife_placeholder_id(marriage_id: &str, index: usize) -> String {
    format!("placeholder-wife-{}-{}", marriage_id, index)
}

/// Skapar platshållare i nodkartan
pub struct PlaceholderSynthesizer<'a> {
    nodes: &'a mut NodeMap,
    orientation: Orientation,
    callbacks: &'a LayoutCallbacks,
}

impl<'a> PlaceholderSynthesizer<'a> {
    pub fn new(
        nodes: &'a mut NodeMap,
        orientation: Orientation,
        callbacks: &'a LayoutCallbacks,
    ) -> Self {
        Self {
            nodes,
            orientation,
            callbacks,
        }
    }

    /// Fyll alla tomma platser i en kopia av äktenskapen.
    ///
    /// Originalen lämnas orörda. Nodkartan får en ny personnod per platshållare,
    /// och en platshållare som redan finns skapas inte igen.
    pub fn fill(&mut self, marriages: &[Marriage]) -> Vec<Marriage> {
        let mut processed = marriages.to_vec();

        for marriage in &mut processed {
            let has_children = marriage.has_children();
            let marriage_id = marriage.id.clone();

            match &mut marriage.kind {
                MarriageKind::Monogamous { spouses, .. } => {
                    let known = spouses
                        .iter()
                        .flatten()
                        .next()
                        .and_then(|id| self.gender_of(id));
                    let gender = known.map(|g| g.opposite()).unwrap_or(Gender::Male);

                    let mut created = 0;
                    for slot in spouses.iter_mut().filter(|s| s.is_none()) {
                        let id = if created == 0 {
                            spouse_placeholder_id(&marriage_id)
                        } else {
                            format!("{}-{}", spouse_placeholder_id(&marriage_id), created)
                        };
                        self.add(&id, gender, has_children);
                        *slot = Some(id);
                        created += 1;
                    }
                }
                MarriageKind::Polygamous { husband_id, wives } => {
                    if husband_id.is_none() {
                        let first_wife = wives
                            .iter()
                            .find_map(|w| w.wife_id.as_deref())
                            .and_then(|id| self.gender_of(id));
                        let gender = first_wife.map(|g| g.opposite()).unwrap_or(Gender::Male);
                        let id = husband_placeholder_id(&marriage_id);
                        self.add(&id, gender, has_children);
                        *husband_id = Some(id);
                    }

                    let wife_gender = husband_id
                        .as_deref()
                        .and_then(|id| self.gender_of(id))
                        .map(|g| g.opposite())
                        .unwrap_or(Gender::Female);

                    for (index, wife) in wives.iter_mut().enumerate() {
                        if wife.wife_id.is_none() {
                            let id = wife_placeholder_id(&marriage_id, index);
                            self.add(&id, wife_gender, !wife.children_ids.is_empty());
                            wife.wife_id = Some(id);
                        }
                    }
                }
            }
        }

        processed
    }

    fn gender_of(&self, id: &str) -> Option<Gender> {
        self.nodes.get(id).and_then(|n| n.gender())
    }

    fn add(&mut self, id: &str, gender: Gender, has_children: bool) {
        if self.nodes.contains(id) {
            return;
        }

        let mut node = person_node(
            Person::placeholder(id, gender),
            self.orientation,
            has_children,
            self.callbacks,
        );
        if let Some(data) = node.person_data_mut() {
            data.variant = Variant::Spouse;
        }
        tracing::debug!("Skapade platshållare {}", id);
        self.nodes.insert(node);
    }
}
