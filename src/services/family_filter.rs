//! Urval av den del av släkten som hänger ihop med en rotperson

use std::collections::{HashSet, VecDeque};

use crate::models::{FamilyData, Marriage, MarriageKind, Person};
use crate::utils::{require_root_id, LayoutResult};

/// Barn som personen har i äktenskapet: alla barn för makar och make,
/// bara de egna barnen för en hustru i ett månggifte.
pub(crate) fn children_through<'a>(marriage: &'a Marriage, person_id: &str) -> Vec<&'a str> {
    match &marriage.kind {
        MarriageKind::Monogamous { spouses, children_ids } => {
            if spouses.iter().any(|s| s.as_deref() == Some(person_id)) {
                children_ids.iter().map(String::as_str).collect()
            } else {
                Vec::new()
            }
        }
        MarriageKind::Polygamous { husband_id, wives } => {
            if husband_id.as_deref() == Some(person_id) {
                marriage.children()
            } else {
                wives
                    .iter()
                    .filter(|w| w.wife_id.as_deref() == Some(person_id))
                    .flat_map(|w| w.children_ids.iter().map(String::as_str))
                    .collect()
            }
        }
    }
}

/// Bredden-först från roten över make/maka- och barnkanter.
///
/// Från varje person följs de aktiva äktenskap där personen leder hushållet
/// (make/maka vid monogami, maken vid månggifte). Makarna blir synliga och
/// barnen köas. Borttagna och väntande äktenskap ignoreras helt.
pub fn filter_family_by_root(
    root_id: &str,
    people: &[Person],
    marriages: &[Marriage],
) -> LayoutResult<FamilyData> {
    let root_id = require_root_id(root_id)?;

    let active: Vec<&Marriage> = marriages.iter().filter(|m| m.is_active()).collect();

    let mut visible: HashSet<&str> = HashSet::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    visible.insert(root_id);
    queue.push_back(root_id);

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }

        for &marriage in &active {
            if !marriage.is_household_head(current) {
                continue;
            }
            for partner in marriage.partner_ids() {
                visible.insert(partner);
            }
            for child in marriage.children() {
                visible.insert(child);
                if !visited.contains(child) {
                    queue.push_back(child);
                }
            }
        }
    }

    let people: Vec<Person> = people
        .iter()
        .filter(|p| visible.contains(p.id.as_str()))
        .cloned()
        .collect();

    let marriages: Vec<Marriage> = active
        .into_iter()
        .filter(|m| match &m.kind {
            MarriageKind::Monogamous { spouses, .. } => {
                let filled: Vec<&str> = spouses.iter().filter_map(|s| s.as_deref()).collect();
                !filled.is_empty() && filled.iter().all(|id| visible.contains(id))
            }
            MarriageKind::Polygamous { husband_id, .. } => husband_id
                .as_deref()
                .map(|id| visible.contains(id))
                .unwrap_or(false),
        })
        .cloned()
        .collect();

    tracing::debug!(
        "Filtrerade släkt för {}: {} personer, {} äktenskap",
        root_id,
        people.len(),
        marriages.len()
    );

    Ok(FamilyData { people, marriages })
}

/// Alla ättlingar till en person (personen själv ingår inte), i upptäcktsordning
pub fn get_descendant_ids(person_id: &str, marriages: &[Marriage]) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    visited.insert(person_id);
    queue.push_back(person_id);

    while let Some(current) = queue.pop_front() {
        for marriage in marriages.iter().filter(|m| m.is_active()) {
            for child in children_through(marriage, current) {
                if visited.insert(child) {
                    result.push(child.to_string());
                    queue.push_back(child);
                }
            }
        }
    }

    result
}

/// Personer som ska döljas för att en synlig person är hopfälld.
///
/// En hopfälld person döljs tillsammans med sina ättlingar. Därefter sprids
/// uteslutningen inom äktenskapen tills inget ändras, och den som döljs på
/// det sättet tar med sig sina egna ättlingar. Vid monogami sprids den mellan
/// makarna. Vid månggifte sprids den från en hustru till maken och från maken
/// till alla hustrur, aldrig direkt mellan hustrurna. Roten döljs aldrig.
pub fn collapsed_descendant_ids(
    root_id: &str,
    people: &[Person],
    marriages: &[Marriage],
) -> HashSet<String> {
    let mut excluded: HashSet<String> = HashSet::new();

    for person in people.iter().filter(|p| p.is_collapsed) {
        hide_with_descendants(&mut excluded, &person.id, root_id, marriages);
    }

    loop {
        let mut changed = false;
        for marriage in marriages.iter().filter(|m| m.is_active()) {
            for partner in spread_targets(marriage, &excluded) {
                if partner == root_id || excluded.contains(partner) {
                    continue;
                }
                hide_with_descendants(&mut excluded, partner, root_id, marriages);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    excluded
}

fn hide_with_descendants(
    excluded: &mut HashSet<String>,
    person_id: &str,
    root_id: &str,
    marriages: &[Marriage],
) {
    if person_id != root_id {
        excluded.insert(person_id.to_string());
    }
    excluded.extend(
        get_descendant_ids(person_id, marriages)
            .into_iter()
            .filter(|id| id != root_id),
    );
}

/// Partner som döljs när någon i äktenskapet redan är dold
fn spread_targets<'a>(marriage: &'a Marriage, excluded: &HashSet<String>) -> Vec<&'a str> {
    let is_hidden = |id: &Option<String>| id.as_ref().is_some_and(|id| excluded.contains(id));

    match &marriage.kind {
        MarriageKind::Monogamous { spouses, .. } => {
            if spouses.iter().any(is_hidden) {
                spouses.iter().filter_map(|s| s.as_deref()).collect()
            } else {
                Vec::new()
            }
        }
        MarriageKind::Polygamous { husband_id, wives } => {
            if is_hidden(husband_id) {
                wives.iter().filter_map(|w| w.wife_id.as_deref()).collect()
            } else if wives.iter().any(|w| is_hidden(&w.wife_id)) {
                husband_id.as_deref().into_iter().collect()
            } else {
                Vec::new()
            }
        }
    }
}
