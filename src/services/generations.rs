//! Ordning av äktenskap generation för generation från roten

use std::collections::{HashMap, HashSet, VecDeque};

use crate::models::{Marriage, Person};

/// Äktenskapen i den ordning en bredden-först-sökning från roten hittar dem,
/// så att föräldrar behandlas före sina barn.
///
/// Dolda (`excluded`) personer traverseras inte. Mjukt borttagna personer
/// traverseras inte heller, men deras äktenskap läggs sist i listan så att de
/// fortfarande ritas tills borttagningen är slutförd.
pub fn order_marriages_by_generation(
    root_id: &str,
    people: &[Person],
    marriages: &[Marriage],
    excluded: &HashSet<String>,
) -> Vec<Marriage> {
    let soft_deleted: HashSet<&str> = people
        .iter()
        .filter(|p| p.is_soft_deleted())
        .map(|p| p.id.as_str())
        .collect();

    let mut ordered: Vec<&Marriage> = Vec::new();
    let mut added: HashSet<&str> = HashSet::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    let mut generation_of: HashMap<&str, usize> = HashMap::new();
    generation_of.insert(root_id, 0);
    queue.push_back(root_id);

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) || excluded.contains(current) {
            continue;
        }
        if current != root_id && soft_deleted.contains(current) {
            continue;
        }

        let generation = generation_of.get(current).copied().unwrap_or(0);

        for marriage in marriages {
            if !marriage.involves(current) {
                continue;
            }
            if added.insert(marriage.id.as_str()) {
                ordered.push(marriage);
            }
            for partner in marriage.partner_ids() {
                if !visited.contains(partner) {
                    generation_of.entry(partner).or_insert(generation);
                    queue.push_back(partner);
                }
            }
            for child in marriage.children() {
                if !visited.contains(child) {
                    generation_of.entry(child).or_insert(generation + 1);
                    queue.push_back(child);
                }
            }
        }
    }

    // Mjukt borttagna men synliga personer som sökningen inte gick igenom
    for marriage in marriages {
        if added.contains(marriage.id.as_str()) {
            continue;
        }
        let belongs_to_soft_deleted = marriage
            .partner_ids()
            .iter()
            .any(|id| soft_deleted.contains(id) && !excluded.contains(*id));
        if belongs_to_soft_deleted {
            added.insert(marriage.id.as_str());
            ordered.push(marriage);
        }
    }

    tracing::debug!(
        "Ordnade {} av {} äktenskap, {} generationer",
        ordered.len(),
        marriages.len(),
        generation_of.values().max().map(|g| g + 1).unwrap_or(0)
    );

    ordered.into_iter().cloned().collect()
}
