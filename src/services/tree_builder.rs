//! Bygger ett rotat träd av familjeenheter ur nodkarta och äktenskap

use std::collections::HashSet;

use crate::models::{LayoutDiagnostic, Marriage, MarriageKind};

use super::node_map::NodeMap;

/// En nod i layoutträdet. Index är desamma som i `NodeMap`.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: String,
    pub children: Vec<usize>,
    /// Äktenskapen (index i äktenskapslistan) där noden är primär förälder,
    /// fler än ett vid omgifte
    pub marriages: Vec<usize>,
    /// Icke-primär make/maka: blir aldrig rot och får inga egna barn
    pub is_spouse: bool,
    /// Bredd (vertikalt) eller höjd (horisontellt) för hela underträdet
    pub subtree_extent: f32,
}

impl TreeNode {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            children: Vec::new(),
            marriages: Vec::new(),
            is_spouse: false,
            subtree_extent: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FamilyTree {
    pub root: Option<usize>,
    pub nodes: Vec<TreeNode>,
}

impl FamilyTree {
    pub fn root_node(&self) -> Option<&TreeNode> {
        self.root.and_then(|idx| self.nodes.get(idx))
    }

    pub fn node(&self, idx: usize) -> &TreeNode {
        &self.nodes[idx]
    }
}

/// Bygg trädet.
///
/// Vid månggifte är maken primär förälder. Vid monogami väljs bland makar som
/// inte redan är markerade som make/maka: först den förväntade roten, sedan
/// den som redan hängts in som någons barn, annars platsordning. Alla barn
/// hängs under den primära föräldern.
pub fn build_tree(
    nodes: &NodeMap,
    marriages: &[Marriage],
    expected_root_id: Option<&str>,
    diagnostics: &mut Vec<LayoutDiagnostic>,
) -> FamilyTree {
    let mut tree_nodes: Vec<TreeNode> = nodes.iter().map(|n| TreeNode::new(&n.id)).collect();
    let mut parent_of: Vec<Option<usize>> = vec![None; tree_nodes.len()];

    for (marriage_idx, marriage) in marriages.iter().enumerate() {
        let candidates: Vec<&str> = match &marriage.kind {
            MarriageKind::Polygamous { husband_id, .. } => husband_id.as_deref().into_iter().collect(),
            MarriageKind::Monogamous { spouses, .. } => {
                let filled: Vec<&str> = spouses.iter().filter_map(|s| s.as_deref()).collect();
                let mut free: Vec<&str> = filled
                    .iter()
                    .copied()
                    .filter(|id| {
                        nodes
                            .index_of(id)
                            .map(|idx| !tree_nodes[idx].is_spouse)
                            .unwrap_or(true)
                    })
                    .collect();
                if free.is_empty() {
                    free = filled.first().copied().into_iter().collect();
                }
                free.sort_by_key(|id| {
                    if Some(*id) == expected_root_id {
                        0
                    } else if nodes.index_of(id).and_then(|idx| parent_of[idx]).is_some() {
                        1
                    } else {
                        2
                    }
                });
                free
            }
        };

        let Some(primary_idx) = candidates.first().and_then(|id| nodes.index_of(id)) else {
            tracing::warn!("Hoppar över äktenskap {}: primär förälder saknas", marriage.id);
            diagnostics.push(LayoutDiagnostic::MissingPrimaryParent {
                marriage_id: marriage.id.clone(),
            });
            continue;
        };

        tree_nodes[primary_idx].marriages.push(marriage_idx);

        for child in marriage.children() {
            let Some(child_idx) = nodes.index_of(child) else {
                tracing::debug!("Barn {} i äktenskap {} finns inte i nodkartan", child, marriage.id);
                continue;
            };
            match parent_of[child_idx] {
                Some(existing) if existing == primary_idx => continue,
                Some(_) => {
                    tracing::warn!("Barn {} har redan en förälder, hoppar över", child);
                    diagnostics.push(LayoutDiagnostic::DuplicateChild {
                        child_id: child.to_string(),
                        marriage_id: marriage.id.clone(),
                    });
                    continue;
                }
                None if child_idx == primary_idx => continue,
                None => {}
            }
            parent_of[child_idx] = Some(primary_idx);
            tree_nodes[primary_idx].children.push(child_idx);
        }

        if let MarriageKind::Monogamous { spouses, .. } = &marriage.kind {
            let primary_id = tree_nodes[primary_idx].id.clone();
            for spouse in spouses.iter().filter_map(|s| s.as_deref()) {
                if spouse == primary_id {
                    continue;
                }
                if let Some(idx) = nodes.index_of(spouse) {
                    tree_nodes[idx].is_spouse = true;
                }
            }
        }
    }

    let root = select_root(&tree_nodes, nodes, marriages, expected_root_id, diagnostics);

    FamilyTree {
        root,
        nodes: tree_nodes,
    }
}

fn select_root(
    tree_nodes: &[TreeNode],
    nodes: &NodeMap,
    marriages: &[Marriage],
    expected_root_id: Option<&str>,
    diagnostics: &mut Vec<LayoutDiagnostic>,
) -> Option<usize> {
    if tree_nodes.is_empty() {
        return None;
    }

    if let Some(idx) = expected_root_id.and_then(|id| nodes.index_of(id)) {
        return Some(idx);
    }

    let child_ids: HashSet<&str> = marriages.iter().flat_map(|m| m.children()).collect();
    // Hustrur i ett månggifte är aldrig rot, precis som icke-primära makar
    let wife_ids: HashSet<&str> = marriages
        .iter()
        .filter_map(|m| match &m.kind {
            MarriageKind::Polygamous { wives, .. } => Some(wives),
            MarriageKind::Monogamous { .. } => None,
        })
        .flatten()
        .filter_map(|w| w.wife_id.as_deref())
        .collect();
    let candidates: Vec<usize> = tree_nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| {
            !n.is_spouse && !child_ids.contains(n.id.as_str()) && !wife_ids.contains(n.id.as_str())
        })
        .map(|(idx, _)| idx)
        .collect();

    match candidates.as_slice() {
        [only] => Some(*only),
        [first, ..] => {
            let chosen_id = tree_nodes[*first].id.clone();
            tracing::warn!(
                "{} möjliga rötter utan förälder, väljer {}",
                candidates.len(),
                chosen_id
            );
            diagnostics.push(LayoutDiagnostic::AmbiguousRoot { chosen_id });
            Some(*first)
        }
        [] => {
            let chosen_id = tree_nodes[0].id.clone();
            tracing::warn!("Ingen nod saknar förälder (cykliska data?), väljer {}", chosen_id);
            diagnostics.push(LayoutDiagnostic::AmbiguousRoot { chosen_id });
            Some(0)
        }
    }
}
