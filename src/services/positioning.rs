//! Tvåpassslayout: mät underträd nedifrån och upp, placera uppifrån och ned.
//!
//! Vertikalt ligger syskon längs x-axeln och generationer längs y-axeln.
//! Horisontellt är axlarna ombytta. "Sidled" betyder syskonaxeln och
//! "djup" betyder generationsaxeln.

use std::collections::HashSet;

use crate::models::{
    LayoutConfig, LayoutDiagnostic, Marriage, MarriageKind, Orientation, Variant,
};

use super::node_map::NodeMap;
use super::tree_builder::FamilyTree;

/// Make/maka eller hustru som placeras i raden bredvid den primära föräldern
#[derive(Debug, Clone, Copy)]
struct Partner<'a> {
    id: Option<&'a str>,
    polygamous: bool,
}

pub struct Positioner<'a> {
    config: &'a LayoutConfig,
    orientation: Orientation,
    marriages: &'a [Marriage],
}

impl<'a> Positioner<'a> {
    pub fn new(config: &'a LayoutConfig, orientation: Orientation, marriages: &'a [Marriage]) -> Self {
        Self {
            config,
            orientation,
            marriages,
        }
    }

    fn size(&self) -> f32 {
        self.config.lateral_size(self.orientation)
    }

    fn gap(&self) -> f32 {
        self.config.lateral_gap(self.orientation)
    }

    /// Utrymmet en föräldraenhet med `partners` makar/hustrur tar i sidled
    pub fn block_extent(&self, partners: usize) -> f32 {
        let n = partners as f32;
        (n + 1.0) * self.size() + n * self.gap()
    }

    /// Alla platser bredvid noden, i äktenskapsordning. Varje monogamt
    /// äktenskap ger en plats, varje hustru i ett månggifte en plats.
    fn partners(&self, tree: &FamilyTree, idx: usize) -> Vec<Partner<'a>> {
        let node = tree.node(idx);
        let mut partners = Vec::new();
        for marriage in node.marriages.iter().filter_map(|&m| self.marriages.get(m)) {
            match &marriage.kind {
                MarriageKind::Monogamous { spouses, .. } => partners.push(Partner {
                    id: spouses
                        .iter()
                        .filter_map(|s| s.as_deref())
                        .find(|s| *s != node.id),
                    polygamous: false,
                }),
                MarriageKind::Polygamous { wives, .. } => {
                    partners.extend(wives.iter().map(|w| Partner {
                        id: w.wife_id.as_deref(),
                        polygamous: true,
                    }));
                }
            }
        }
        partners
    }

    fn children_extent(&self, tree: &FamilyTree, idx: usize) -> f32 {
        let children = &tree.node(idx).children;
        if children.is_empty() {
            return 0.0;
        }
        let sum: f32 = children.iter().map(|c| tree.node(*c).subtree_extent).sum();
        sum + (children.len() - 1) as f32 * self.gap()
    }

    /// Pass 1: underträdets utsträckning för varje nod som nås från roten.
    ///
    /// Barn som redan besökts (cykliska data) kopplas bort här, så att pass 2
    /// kan lita på att strukturen är ett träd.
    pub fn first_pass(&self, tree: &mut FamilyTree, diagnostics: &mut Vec<LayoutDiagnostic>) {
        let Some(root) = tree.root else {
            return;
        };
        let mut seen: HashSet<usize> = HashSet::new();
        self.measure(tree, root, &mut seen, diagnostics);
    }

    fn measure(
        &self,
        tree: &mut FamilyTree,
        idx: usize,
        seen: &mut HashSet<usize>,
        diagnostics: &mut Vec<LayoutDiagnostic>,
    ) -> f32 {
        seen.insert(idx);

        let children = std::mem::take(&mut tree.nodes[idx].children);
        let mut kept = Vec::with_capacity(children.len());
        for child in children {
            if seen.contains(&child) {
                let node_id = tree.node(child).id.clone();
                tracing::warn!("Cykel i släktdata vid {}, kopplar bort", node_id);
                diagnostics.push(LayoutDiagnostic::CycleDetected { node_id });
                continue;
            }
            self.measure(tree, child, seen, diagnostics);
            kept.push(child);
        }
        tree.nodes[idx].children = kept;

        let block = self.block_extent(self.partners(tree, idx).len());
        let extent = block.max(self.children_extent(tree, idx));
        tree.nodes[idx].subtree_extent = extent;
        extent
    }

    /// Pass 2: absoluta positioner, med roten centrerad på 0 i sidled och
    /// första generationen på djup 0.
    pub fn second_pass(&self, tree: &FamilyTree, nodes: &mut NodeMap) {
        if let Some(root) = tree.root {
            self.place(tree, root, 0.0, 0.0, nodes);
        }
    }

    fn place(&self, tree: &FamilyTree, idx: usize, center: f32, depth: f32, nodes: &mut NodeMap) {
        let id = tree.node(idx).id.as_str();
        self.assign_variant(nodes, id, |_| Variant::Directline);

        let size = self.size();
        let gap = self.gap();

        // Hälften av makarna (avrundat nedåt) före noden, resten efter
        let partners = self.partners(tree, idx);
        let step = size + gap;
        let first_slot = center - self.block_extent(partners.len()) / 2.0 + size / 2.0;
        let before = partners.len() / 2;

        self.set_position(nodes, id, first_slot + before as f32 * step, depth);

        for (i, partner) in partners.iter().enumerate() {
            let Some(partner_id) = partner.id else {
                continue;
            };
            if !nodes.contains(partner_id) {
                tracing::debug!("Make/maka {} saknas i nodkartan", partner_id);
                continue;
            }
            let slot = if i < before { i } else { i + 1 };
            self.set_position(nodes, partner_id, first_slot + slot as f32 * step, depth);
            if partner.polygamous {
                self.assign_variant(nodes, partner_id, |current| match current {
                    Variant::Directline => Variant::Spouse,
                    other => other,
                });
            } else {
                self.assign_variant(nodes, partner_id, |_| Variant::Spouse);
            }
        }

        let children = &tree.node(idx).children;
        if children.is_empty() {
            return;
        }

        let child_depth = depth + self.config.generation_step(self.orientation);
        let mut cursor = center - self.children_extent(tree, idx) / 2.0;
        for &child in children {
            let extent = tree.node(child).subtree_extent;
            self.place(tree, child, cursor + extent / 2.0, child_depth, nodes);
            cursor += extent + gap;
        }
    }

    /// Översätt (mittpunkt i sidled, djup) till nodens övre vänstra hörn
    fn set_position(&self, nodes: &mut NodeMap, id: &str, center: f32, depth: f32) {
        let (x, y) = match self.orientation {
            Orientation::Vertical => (center - self.config.node_width / 2.0, depth),
            Orientation::Horizontal => (depth, center - self.config.node_height / 2.0),
        };
        if let Some(node) = nodes.get_mut(id) {
            node.place(x, y);
        }
    }

    /// Sätt variant; avlidna får alltid `Dead`
    fn assign_variant(&self, nodes: &mut NodeMap, id: &str, pick: impl Fn(Variant) -> Variant) {
        if let Some(data) = nodes.get_mut(id).and_then(|n| n.person_data_mut()) {
            data.variant = if data.is_dead { Variant::Dead } else { pick(data.variant) };
        }
    }
}
