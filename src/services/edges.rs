//! Kanter och äktenskapsnoder efter att positionerna är satta

use std::collections::HashSet;

use crate::models::{
    edge_id, marriage_node_id, Edge, EdgeData, EdgeKind, LayoutConfig, LayoutDiagnostic,
    LayoutNode, Marriage, MarriageKind, MarriageNodeData, NodeData, NodeKind, Orientation,
    Position,
};

use super::node_map::NodeMap;

const ARROW_MARKER: &str = "arrowclosed";

/// Handtag på en nods sida
#[derive(Debug, Clone, Copy)]
enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

pub struct EdgeSynthesizer<'a> {
    nodes: &'a mut NodeMap,
    config: &'a LayoutConfig,
    orientation: Orientation,
    diagnostics: &'a mut Vec<LayoutDiagnostic>,
    edges: Vec<Edge>,
    seen: HashSet<String>,
}

impl<'a> EdgeSynthesizer<'a> {
    pub fn new(
        nodes: &'a mut NodeMap,
        config: &'a LayoutConfig,
        orientation: Orientation,
        diagnostics: &'a mut Vec<LayoutDiagnostic>,
    ) -> Self {
        Self {
            nodes,
            config,
            orientation,
            diagnostics,
            edges: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Skapa kanter för alla äktenskap. Positionerna måste redan vara satta,
    /// eftersom ordningen mellan makarna avgörs av deras koordinater.
    pub fn synthesize(mut self, marriages: &[Marriage]) -> Vec<Edge> {
        for marriage in marriages {
            match &marriage.kind {
                MarriageKind::Monogamous { spouses, .. } => {
                    let filled: Vec<&str> = spouses.iter().filter_map(|s| s.as_deref()).collect();
                    if let [a, b] = filled.as_slice() {
                        self.monogamous(marriage, a, b);
                    } else {
                        tracing::debug!("Äktenskap {} har inte två makar, inga kanter", marriage.id);
                    }
                }
                MarriageKind::Polygamous { husband_id, wives } => {
                    let Some(husband) = husband_id.as_deref() else {
                        continue;
                    };
                    for wife in wives {
                        let Some(wife_id) = wife.wife_id.as_deref() else {
                            continue;
                        };
                        self.polygamous_pair(marriage, husband, wife_id);
                        for child in &wife.children_ids {
                            self.parent_child(wife_id, child, &marriage.id);
                        }
                    }
                }
            }
        }

        tracing::debug!("Skapade {} kanter", self.edges.len());
        self.edges
    }

    fn monogamous(&mut self, marriage: &Marriage, a: &str, b: &str) {
        let (first, second) = self.order_by_position(a, b);
        let (first_side, second_side) = self.spouse_sides();

        if !marriage.has_children() {
            self.push(Edge {
                id: edge_id(EdgeKind::Spouse, first, second, &marriage.id),
                source: first.to_string(),
                target: second.to_string(),
                kind: EdgeKind::Spouse,
                source_handle: second_side.as_str().to_string(),
                target_handle: first_side.as_str().to_string(),
                marker_start: None,
                marker_end: None,
                data: None,
            });
            return;
        }

        let hub = marriage_node_id(&marriage.id);
        match (self.center_of(first), self.center_of(second)) {
            (Some(p1), Some(p2)) => {
                let half = self.config.marriage_node_size / 2.0;
                let mut node = LayoutNode {
                    id: hub.clone(),
                    kind: NodeKind::Marriage,
                    data: NodeData::Marriage(MarriageNodeData {
                        marriage_id: marriage.id.clone(),
                    }),
                    position: Position::default(),
                    is_positioned: false,
                };
                node.place((p1.x + p2.x) / 2.0 - half, (p1.y + p2.y) / 2.0 - half);
                self.nodes.insert(node);
            }
            _ => tracing::warn!("Kan inte placera äktenskapsnod {}: make/maka saknas", hub),
        }

        // Vänster/övre make ansluter med sin bortre sida mot noden och tvärtom
        self.push(Edge {
            id: edge_id(EdgeKind::MonogamousEdge, first, &hub, &marriage.id),
            source: first.to_string(),
            target: hub.clone(),
            kind: EdgeKind::MonogamousEdge,
            source_handle: second_side.as_str().to_string(),
            target_handle: first_side.as_str().to_string(),
            marker_start: None,
            marker_end: None,
            data: None,
        });
        self.push(Edge {
            id: edge_id(EdgeKind::MonogamousEdge, second, &hub, &marriage.id),
            source: second.to_string(),
            target: hub.clone(),
            kind: EdgeKind::MonogamousEdge,
            source_handle: first_side.as_str().to_string(),
            target_handle: second_side.as_str().to_string(),
            marker_start: None,
            marker_end: None,
            data: None,
        });

        for child in marriage.children() {
            self.parent_child(&hub, child, &marriage.id);
        }
    }

    fn polygamous_pair(&mut self, marriage: &Marriage, husband: &str, wife: &str) {
        let (first_side, second_side) = self.spouse_sides();
        let wife_first = self.order_by_position(husband, wife).0 == wife;
        let (source_side, target_side) = if wife_first {
            (first_side, second_side)
        } else {
            (second_side, first_side)
        };

        self.push(Edge {
            id: edge_id(EdgeKind::PolygamousEdge, husband, wife, &marriage.id),
            source: husband.to_string(),
            target: wife.to_string(),
            kind: EdgeKind::PolygamousEdge,
            source_handle: source_side.as_str().to_string(),
            target_handle: target_side.as_str().to_string(),
            marker_start: None,
            marker_end: None,
            data: Some(EdgeData {
                orientation: self.orientation,
                marriage_id: marriage.id.clone(),
            }),
        });
    }

    fn parent_child(&mut self, parent: &str, child: &str, marriage_id: &str) {
        let (source_side, target_side) = match self.orientation {
            Orientation::Vertical => (Side::Bottom, Side::Top),
            Orientation::Horizontal => (Side::Right, Side::Left),
        };
        self.push(Edge {
            id: edge_id(EdgeKind::ParentChild, parent, child, marriage_id),
            source: parent.to_string(),
            target: child.to_string(),
            kind: EdgeKind::ParentChild,
            source_handle: source_side.as_str().to_string(),
            target_handle: target_side.as_str().to_string(),
            marker_start: None,
            marker_end: Some(ARROW_MARKER.to_string()),
            data: None,
        });
    }

    /// Sidorna som vetter bort från respektive mot partnern sett från den
    /// första (vänstra/övre) maken
    fn spouse_sides(&self) -> (Side, Side) {
        match self.orientation {
            Orientation::Vertical => (Side::Left, Side::Right),
            Orientation::Horizontal => (Side::Top, Side::Bottom),
        }
    }

    /// Den med lägst koordinat längs syskonaxeln kommer först; lika ger platsordning
    fn order_by_position<'s>(&self, a: &'s str, b: &'s str) -> (&'s str, &'s str) {
        let lateral = |id: &str| {
            self.nodes.get(id).map(|n| match self.orientation {
                Orientation::Vertical => n.position.x,
                Orientation::Horizontal => n.position.y,
            })
        };
        match (lateral(a), lateral(b)) {
            (Some(pa), Some(pb)) if pb < pa => (b, a),
            _ => (a, b),
        }
    }

    fn center_of(&self, id: &str) -> Option<Position> {
        self.nodes.get(id).map(|n| {
            Position::new(
                n.position.x + self.config.node_width / 2.0,
                n.position.y + self.config.node_height / 2.0,
            )
        })
    }

    /// Lägg till kanten om båda ändpunkterna finns och ID:t är nytt
    fn push(&mut self, edge: Edge) {
        for endpoint in [&edge.source, &edge.target] {
            if !self.nodes.contains(endpoint) {
                tracing::warn!("Hoppar över kant {}: nod {} saknas", edge.id, endpoint);
                self.diagnostics.push(LayoutDiagnostic::DanglingEdge {
                    edge_id: edge.id.clone(),
                    missing_id: endpoint.clone(),
                });
                return;
            }
        }
        if self.seen.insert(edge.id.clone()) {
            self.edges.push(edge);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, LayoutCallbacks, Person, Wife};
    use crate::services::node_map::person_node;

    fn placed(ids: &[(&str, f32, f32)], orientation: Orientation) -> NodeMap {
        let mut nodes = NodeMap::new();
        for (id, x, y) in ids {
            let mut node = person_node(
                Person::new(*id, *id, Some(Gender::Male)),
                orientation,
                false,
                &LayoutCallbacks::noop(),
            );
            node.place(*x, *y);
            nodes.insert(node);
        }
        nodes
    }

    fn synthesize(
        nodes: &mut NodeMap,
        marriages: &[Marriage],
        orientation: Orientation,
    ) -> (Vec<Edge>, Vec<LayoutDiagnostic>) {
        let config = LayoutConfig::default();
        let mut diags = Vec::new();
        let edges = EdgeSynthesizer::new(nodes, &config, orientation, &mut diags).synthesize(marriages);
        (edges, diags)
    }

    #[test]
    fn test_monogamous_with_children() {
        let config = LayoutConfig::default();
        // b står till vänster trots att a är först i spouses
        let mut nodes = placed(
            &[("a", 220.0, 0.0), ("b", 0.0, 0.0), ("c", 110.0, 180.0)],
            Orientation::Vertical,
        );
        let marriages = vec![Marriage::monogamous("m1", [Some("a"), Some("b")], &["c"])];
        let (edges, diags) = synthesize(&mut nodes, &marriages, Orientation::Vertical);

        assert!(diags.is_empty());
        let ids: Vec<&str> = edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "monogamousEdge-b-marriage-m1-m1",
                "monogamousEdge-a-marriage-m1-m1",
                "parentChild-marriage-m1-c-m1",
            ]
        );
        assert_eq!(edges[0].source_handle, "right");
        assert_eq!(edges[1].source_handle, "left");
        assert_eq!(edges[2].marker_end.as_deref(), Some("arrowclosed"));
        assert_eq!(edges[2].source_handle, "bottom");

        let hub = nodes.get("marriage-m1").unwrap();
        assert_eq!(hub.kind, NodeKind::Marriage);
        let half = config.marriage_node_size / 2.0;
        assert_eq!(hub.position.x, 110.0 + config.node_width / 2.0 - half);
        assert_eq!(hub.position.y, config.node_height / 2.0 - half);
    }

    #[test]
    fn test_childless_monogamous_gets_spouse_edge() {
        let mut nodes = placed(&[("a", 0.0, 0.0), ("b", 220.0, 0.0)], Orientation::Horizontal);
        let marriages = vec![Marriage::monogamous("m1", [Some("a"), Some("b")], &[])];
        let (edges, _) = synthesize(&mut nodes, &marriages, Orientation::Horizontal);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].kind, EdgeKind::Spouse);
        assert_eq!(edges[0].id, "spouse-a-b-m1");
        assert!(!nodes.contains("marriage-m1"));
    }

    #[test]
    fn test_polygamous_edges_from_mother() {
        let mut nodes = placed(
            &[("w1", 0.0, 0.0), ("h", 220.0, 0.0), ("w2", 440.0, 0.0), ("c1", 0.0, 180.0)],
            Orientation::Vertical,
        );
        let marriages = vec![Marriage::polygamous(
            "m1",
            Some("h"),
            vec![Wife::new(Some("w1"), &["c1"]), Wife::new(Some("w2"), &[])],
        )];
        let (edges, diags) = synthesize(&mut nodes, &marriages, Orientation::Vertical);

        assert!(diags.is_empty());
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[0].id, "polygamousEdge-h-w1-m1");
        assert_eq!(edges[0].source_handle, "left");
        assert_eq!(
            edges[0].data,
            Some(EdgeData { orientation: Orientation::Vertical, marriage_id: "m1".into() })
        );
        assert_eq!(edges[1].id, "parentChild-w1-c1-m1");
        assert_eq!(edges[2].id, "polygamousEdge-h-w2-m1");
        assert_eq!(edges[2].source_handle, "right");
    }

    #[test]
    fn test_dangling_edge_dropped_with_diagnostic() {
        let mut nodes = placed(&[("a", 0.0, 0.0), ("b", 220.0, 0.0)], Orientation::Vertical);
        let marriages = vec![Marriage::monogamous("m1", [Some("a"), Some("b")], &["ghost"])];
        let (edges, diags) = synthesize(&mut nodes, &marriages, Orientation::Vertical);

        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|e| e.kind == EdgeKind::MonogamousEdge));
        assert_eq!(
            diags,
            vec![LayoutDiagnostic::DanglingEdge {
                edge_id: "parentChild-marriage-m1-ghost-m1".into(),
                missing_id: "ghost".into(),
            }]
        );
    }
}
