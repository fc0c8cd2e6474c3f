//! Hjälpfunktioner för anor och direktlinje
//!
//! Används av gränssnittet för att välja rot, markera en antavla och lista
//! valbara makar. Alla funktioner läser bara indata.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::models::{edge_id, marriage_node_id, EdgeKind, Marriage, MarriageKind, Person};

use super::placeholders::{husband_placeholder_id, spouse_placeholder_id, wife_placeholder_id};

/// Makar som kan väljas för en person
#[derive(Debug, Clone, Default, Serialize)]
pub struct SpouseOptions {
    pub spouse: Option<Person>,
    pub wives: Vec<Person>,
}

/// Noder och kanter som ska markeras för en antavla
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineageTrace {
    pub nodes: Vec<String>,
    pub edges: Vec<String>,
}

impl LineageTrace {
    fn add_node(&mut self, id: String) {
        if !self.nodes.contains(&id) {
            self.nodes.push(id);
        }
    }

    fn add_edge(&mut self, id: String) {
        if !self.edges.contains(&id) {
            self.edges.push(id);
        }
    }
}

fn parent_marriage<'a>(child_id: &str, marriages: &'a [Marriage]) -> Option<&'a Marriage> {
    marriages.iter().find(|m| m.is_active() && m.has_child(child_id))
}

/// Gå uppåt genom föräldraäktenskapen tills ingen känd förälder finns.
///
/// Vid månggifte följs maken, annars första ifyllda makeplatsen. Föräldrar
/// som finns i `people` föredras.
pub fn find_highest_ancestor(start_id: &str, people: &[Person], marriages: &[Marriage]) -> String {
    let known: HashSet<&str> = people.iter().map(|p| p.id.as_str()).collect();
    let mut visited: HashSet<String> = HashSet::new();
    let mut current = start_id.to_string();

    while visited.insert(current.clone()) {
        let Some(marriage) = parent_marriage(&current, marriages) else {
            break;
        };
        let next = marriage
            .parents_of(&current)
            .into_iter()
            .find(|id| known.contains(id));

        match next {
            Some(parent) => current = parent.to_string(),
            None => break,
        }
    }

    tracing::debug!("Äldsta ana för {}: {}", start_id, current);
    current
}

/// Personens make/maka, eller hustrurna om personen är make i ett månggifte
pub fn get_spouse_options(person_id: &str, people: &[Person], marriages: &[Marriage]) -> SpouseOptions {
    let find = |id: &str| people.iter().find(|p| p.id == id).cloned();
    let mut options = SpouseOptions::default();

    for marriage in marriages.iter().filter(|m| m.is_active() && m.involves(person_id)) {
        match &marriage.kind {
            MarriageKind::Monogamous { spouses, .. } => {
                if options.spouse.is_none() {
                    options.spouse = spouses
                        .iter()
                        .filter_map(|s| s.as_deref())
                        .find(|id| *id != person_id)
                        .and_then(find);
                }
            }
            MarriageKind::Polygamous { husband_id, wives } => {
                if husband_id.as_deref() == Some(person_id) {
                    for wife in wives.iter().filter_map(|w| w.wife_id.as_deref()) {
                        if let Some(person) = find(wife) {
                            if !options.wives.iter().any(|p| p.id == person.id) {
                                options.wives.push(person);
                            }
                        }
                    }
                } else if options.spouse.is_none() {
                    options.spouse = husband_id.as_deref().and_then(find);
                }
            }
        }
    }

    options
}

/// Personer i direktlinjen: föräldrar i äktenskap med barn samt barnen,
/// utom den äldsta anans egna makar
pub fn get_direct_line_people(people: &[Person], marriages: &[Marriage]) -> Vec<Person> {
    let Some(first) = people.first() else {
        return Vec::new();
    };
    let root = find_highest_ancestor(&first.id, people, marriages);

    let mut direct: HashSet<&str> = HashSet::new();
    let mut root_spouses: HashSet<&str> = HashSet::new();

    for marriage in marriages.iter().filter(|m| m.is_active()) {
        if marriage.involves(&root) {
            root_spouses.extend(marriage.partner_ids().into_iter().filter(|id| *id != root));
        }
        if marriage.has_children() {
            direct.extend(marriage.partner_ids());
            direct.extend(marriage.children());
        }
    }

    people
        .iter()
        .filter(|p| direct.contains(p.id.as_str()) || p.id == root)
        .filter(|p| !root_spouses.contains(p.id.as_str()))
        .cloned()
        .collect()
}

/// Antavla från en person: alla anor, deras äktenskapsnoder och kanterna
/// mellan dem, med samma ID:n som layouten använder
pub fn trace_lineage(person_id: &str, people: &[Person], marriages: &[Marriage]) -> LineageTrace {
    let mut trace = LineageTrace::default();
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();

    if people.iter().any(|p| p.id == person_id) {
        trace.add_node(person_id.to_string());
    }
    queue.push_back(person_id.to_string());

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current.clone()) {
            continue;
        }
        let Some(marriage) = parent_marriage(&current, marriages) else {
            continue;
        };

        let parents = match &marriage.kind {
            MarriageKind::Monogamous { spouses, .. } => {
                let hub = marriage_node_id(&marriage.id);
                let mut parents = Vec::new();
                let mut empty = 0;
                for slot in spouses {
                    let id = match slot {
                        Some(id) => id.clone(),
                        None => {
                            let base = spouse_placeholder_id(&marriage.id);
                            let id = if empty == 0 { base } else { format!("{}-{}", base, empty) };
                            empty += 1;
                            id
                        }
                    };
                    trace.add_edge(edge_id(EdgeKind::MonogamousEdge, &id, &hub, &marriage.id));
                    parents.push(id);
                }
                trace.add_edge(edge_id(EdgeKind::ParentChild, &hub, &current, &marriage.id));
                trace.add_node(hub);
                parents
            }
            MarriageKind::Polygamous { husband_id, wives } => {
                let husband = husband_id
                    .clone()
                    .unwrap_or_else(|| husband_placeholder_id(&marriage.id));
                let mut parents = vec![husband.clone()];
                if let Some((index, wife)) = wives
                    .iter()
                    .enumerate()
                    .find(|(_, w)| w.children_ids.iter().any(|c| *c == current))
                {
                    let wife_id = wife
                        .wife_id
                        .clone()
                        .unwrap_or_else(|| wife_placeholder_id(&marriage.id, index));
                    trace.add_edge(edge_id(EdgeKind::PolygamousEdge, &husband, &wife_id, &marriage.id));
                    trace.add_edge(edge_id(EdgeKind::ParentChild, &wife_id, &current, &marriage.id));
                    parents.push(wife_id);
                }
                parents
            }
        };

        for parent in parents {
            trace.add_node(parent.clone());
            queue.push_back(parent);
        }
    }

    trace
}
