//! Layoutmotorns ingång: från personer och äktenskap till positionerade noder och kanter

use std::collections::HashSet;

use crate::models::{
    LayoutCallbacks, LayoutConfig, Marriage, MarriageKind, Orientation, Person, TreeLayout, Variant,
};
use crate::utils::{require_root_id, LayoutResult};

use super::edges::EdgeSynthesizer;
use super::family_filter::{children_through, collapsed_descendant_ids, filter_family_by_root};
use super::generations::order_marriages_by_generation;
use super::node_map::{person_node, NodeMap};
use super::placeholders::PlaceholderSynthesizer;
use super::positioning::Positioner;
use super::tree_builder::build_tree;

/// Tjänst för att beräkna trädlayout
#[derive(Debug, Clone, Default)]
pub struct TreeLayoutService {
    config: LayoutConfig,
}

impl TreeLayoutService {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Beräkna layout för släkten kring `root_id`.
    ///
    /// Varje anrop bygger sin egen nodkarta, så tjänsten kan delas mellan trådar.
    pub fn calculate_layout(
        &self,
        root_id: &str,
        people: &[Person],
        marriages: &[Marriage],
        callbacks: &LayoutCallbacks,
        orientation: Orientation,
    ) -> LayoutResult<TreeLayout> {
        let root_id = require_root_id(root_id)?;
        let family = filter_family_by_root(root_id, people, marriages)?;
        let excluded = collapsed_descendant_ids(root_id, &family.people, &family.marriages);

        let mut nodes = NodeMap::new();
        for person in family.people.iter().filter(|p| !excluded.contains(&p.id)) {
            let has_children = family
                .marriages
                .iter()
                .any(|m| !children_through(m, &person.id).is_empty());
            nodes.insert(person_node(person.clone(), orientation, has_children, callbacks));
        }

        let ordered = without_excluded(
            order_marriages_by_generation(root_id, &family.people, &family.marriages, &excluded),
            &excluded,
        );

        let mut diagnostics = Vec::new();

        if nodes.is_empty() || ordered.is_empty() {
            tracing::debug!("Inget att placera för {}, returnerar noderna oförändrade", root_id);
            tag_root(&mut nodes, root_id);
            return Ok(TreeLayout {
                nodes: nodes.into_nodes(),
                edges: Vec::new(),
                diagnostics,
            });
        }

        let processed = PlaceholderSynthesizer::new(&mut nodes, orientation, callbacks).fill(&ordered);

        let mut tree = build_tree(&nodes, &processed, Some(root_id), &mut diagnostics);
        let positioner = Positioner::new(&self.config, orientation, &processed);
        positioner.first_pass(&mut tree, &mut diagnostics);
        positioner.second_pass(&tree, &mut nodes);

        let edges = EdgeSynthesizer::new(&mut nodes, &self.config, orientation, &mut diagnostics)
            .synthesize(&processed);

        if let Some(root) = tree.root_node() {
            tag_root(&mut nodes, &root.id);
        }

        tracing::info!(
            "Layout klar för {} ({}): {} noder, {} kanter, {} varningar",
            root_id,
            orientation.display_name(),
            nodes.len(),
            edges.len(),
            diagnostics.len()
        );

        Ok(TreeLayout {
            nodes: nodes.into_nodes(),
            edges,
            diagnostics,
        })
    }
}

/// Beräkna layout med standardgeometri
pub fn calculate_layout(
    root_id: &str,
    people: &[Person],
    marriages: &[Marriage],
    callbacks: &LayoutCallbacks,
    orientation: Orientation,
) -> LayoutResult<TreeLayout> {
    TreeLayoutService::default().calculate_layout(root_id, people, marriages, callbacks, orientation)
}

/// Ta bort dolda personer ur äktenskapen inför layouten.
///
/// Monogama äktenskap med en dold make/maka släpps helt. I ett månggifte
/// släpps bara dolda hustrur, och hela äktenskapet först när maken eller
/// samtliga hustrur är dolda. Dolda barn tas bort överallt.
fn without_excluded(marriages: Vec<Marriage>, excluded: &HashSet<String>) -> Vec<Marriage> {
    if excluded.is_empty() {
        return marriages;
    }

    let is_hidden = |id: &Option<String>| id.as_ref().is_some_and(|id| excluded.contains(id));

    marriages
        .into_iter()
        .filter_map(|mut m| {
            match &mut m.kind {
                MarriageKind::Monogamous { spouses, children_ids } => {
                    if spouses.iter().any(is_hidden) {
                        return None;
                    }
                    children_ids.retain(|c| !excluded.contains(c));
                }
                MarriageKind::Polygamous { husband_id, wives } => {
                    if is_hidden(husband_id) {
                        return None;
                    }
                    let before = wives.len();
                    wives.retain(|w| !is_hidden(&w.wife_id));
                    if before > 0 && wives.is_empty() {
                        return None;
                    }
                    for wife in wives.iter_mut() {
                        wife.children_ids.retain(|c| !excluded.contains(c));
                    }
                }
            }
            Some(m)
        })
        .collect()
}

fn tag_root(nodes: &mut NodeMap, root_id: &str) {
    if let Some(data) = nodes.get_mut(root_id).and_then(|n| n.person_data_mut()) {
        data.variant = if data.is_dead { Variant::Dead } else { Variant::Root };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, LayoutDiagnostic, LayoutNode, NodeKind, Wife};
    use crate::utils::LayoutError;
    use std::sync::{Arc, Mutex};

    fn person(id: &str, gender: Gender) -> Person {
        Person::new(id, id.to_uppercase(), Some(gender))
    }

    fn layout(
        root: &str,
        people: &[Person],
        marriages: &[Marriage],
        orientation: Orientation,
    ) -> TreeLayout {
        calculate_layout(root, people, marriages, &LayoutCallbacks::noop(), orientation).unwrap()
    }

    fn node_ids(layout: &TreeLayout) -> Vec<&str> {
        layout.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    fn assert_edges_reference_nodes(layout: &TreeLayout) {
        for edge in &layout.edges {
            assert!(layout.find_node(&edge.source).is_some(), "Saknar källa för {}", edge.id);
            assert!(layout.find_node(&edge.target).is_some(), "Saknar mål för {}", edge.id);
        }
    }

    fn assert_people_positioned(layout: &TreeLayout) {
        for node in layout.nodes.iter().filter(|n| n.person_data().is_some()) {
            assert!(node.is_positioned, "{} saknar position", node.id);
        }
    }

    fn assert_people_do_not_overlap(layout: &TreeLayout) {
        let config = LayoutConfig::default();
        let people: Vec<&LayoutNode> = layout.nodes.iter().filter(|n| n.person_data().is_some()).collect();
        for (i, a) in people.iter().enumerate() {
            for b in &people[i + 1..] {
                let apart_x = (a.position.x - b.position.x).abs() >= config.node_width;
                let apart_y = (a.position.y - b.position.y).abs() >= config.node_height;
                assert!(apart_x || apart_y, "{} och {} överlappar", a.id, b.id);
            }
        }
    }

    #[test]
    fn test_missing_root_id() {
        let result = calculate_layout(" ", &[], &[], &LayoutCallbacks::noop(), Orientation::Vertical);
        assert!(matches!(result, Err(LayoutError::MissingRootId)));
    }

    #[test]
    fn test_nuclear_family() {
        let config = LayoutConfig::default();
        let people = vec![
            person("a", Gender::Male),
            person("b", Gender::Female),
            person("c", Gender::Female),
        ];
        let marriages = vec![Marriage::monogamous("m1", [Some("a"), Some("b")], &["c"])];
        let result = layout("a", &people, &marriages, Orientation::Vertical);

        assert_eq!(node_ids(&result), vec!["a", "b", "c", "marriage-m1"]);
        let a = result.find_node("a").unwrap();
        let b = result.find_node("b").unwrap();
        let c = result.find_node("c").unwrap();

        assert_eq!(a.position.y, b.position.y);
        assert_eq!(b.position.x - a.position.x, config.node_width + config.horizontal_gap);
        assert_eq!(c.position.y - a.position.y, config.node_height + config.vertical_spacing);
        assert_eq!(a.variant(), Some(Variant::Root));
        assert_eq!(b.variant(), Some(Variant::Spouse));
        assert!(a.person_data().unwrap().has_children);
        assert!(result.nodes.iter().all(|n| n.is_positioned));

        assert_eq!(result.edges.len(), 3);
        assert!(result.diagnostics.is_empty());
        assert_edges_reference_nodes(&result);
    }

    #[test]
    fn test_missing_spouse_placeholder() {
        let people = vec![person("a", Gender::Male)];
        let marriages = vec![Marriage::monogamous("m1", [Some("a"), None], &[])];
        let result = layout("a", &people, &marriages, Orientation::Vertical);

        let placeholder = result.find_node("placeholder-spouse-m1").unwrap();
        let data = placeholder.person_data().unwrap();
        assert!(data.person.is_placeholder);
        assert_eq!(data.person.gender, Some(Gender::Female));
        assert!(result.find_edge("spouse-a-placeholder-spouse-m1-m1").is_some());
        assert_edges_reference_nodes(&result);
    }

    #[test]
    fn test_polygamous_fan_out() {
        let config = LayoutConfig::default();
        let people = vec![
            person("h", Gender::Male),
            person("w1", Gender::Female),
            person("w2", Gender::Female),
            person("w3", Gender::Female),
            person("c1", Gender::Male),
        ];
        let marriages = vec![Marriage::polygamous(
            "m1",
            Some("h"),
            vec![
                Wife::new(Some("w1"), &["c1"]),
                Wife::new(Some("w2"), &[]),
                Wife::new(Some("w3"), &[]),
            ],
        )];
        let result = layout("h", &people, &marriages, Orientation::Vertical);

        let h = result.find_node("h").unwrap().position;
        let wives: Vec<_> = ["w1", "w2", "w3"]
            .iter()
            .map(|id| result.find_node(id).unwrap().position)
            .collect();
        assert!(wives.iter().all(|w| w.y == h.y));
        assert_eq!(wives.iter().filter(|w| w.x < h.x).count(), 1);
        assert_eq!(wives.iter().filter(|w| w.x > h.x).count(), 2);

        let mut xs: Vec<f32> = wives.iter().map(|w| w.x).chain(std::iter::once(h.x)).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in xs.windows(2) {
            assert!(pair[1] - pair[0] >= config.node_width);
        }

        assert!(result.find_edge("polygamousEdge-h-w2-m1").is_some());
        assert!(result.find_edge("parentChild-w1-c1-m1").is_some());
        assert_eq!(result.find_node("h").unwrap().variant(), Some(Variant::Root));
        assert_people_positioned(&result);
        assert_people_do_not_overlap(&result);
        assert_edges_reference_nodes(&result);
    }

    #[test]
    fn test_collapse_propagation() {
        let mut a = person("a", Gender::Male);
        a.is_collapsed = true;
        let people = vec![
            person("r", Gender::Male),
            a,
            person("b", Gender::Female),
            person("c", Gender::Male),
            person("d", Gender::Female),
        ];
        let marriages = vec![
            Marriage::monogamous("m0", [Some("r"), None], &["a"]),
            Marriage::monogamous("m1", [Some("a"), Some("b")], &["c", "d"]),
        ];
        let result = layout("r", &people, &marriages, Orientation::Vertical);

        let ids = node_ids(&result);
        for hidden in ["a", "b", "c", "d"] {
            assert!(!ids.contains(&hidden), "{} borde vara dold", hidden);
        }
        assert!(ids.contains(&"r"));
        assert!(result.diagnostics.is_empty());
        assert_people_positioned(&result);
        assert_edges_reference_nodes(&result);
    }

    #[test]
    fn test_collapse_hides_whole_household_of_spread_partner() {
        // r+s -> p ; p+a -> k (a hopfälld) ; p+q -> l
        let mut a = person("a", Gender::Female);
        a.is_collapsed = true;
        let people = vec![
            person("r", Gender::Male),
            person("s", Gender::Female),
            person("p", Gender::Male),
            a,
            person("k", Gender::Male),
            person("q", Gender::Female),
            person("l", Gender::Female),
        ];
        let marriages = vec![
            Marriage::monogamous("m0", [Some("r"), Some("s")], &["p"]),
            Marriage::monogamous("m1", [Some("p"), Some("a")], &["k"]),
            Marriage::monogamous("m2", [Some("p"), Some("q")], &["l"]),
        ];
        let result = layout("r", &people, &marriages, Orientation::Vertical);

        assert_eq!(node_ids(&result), vec!["r", "s"]);
        assert!(result.find_edge("spouse-r-s-m0").is_some());
        assert_people_positioned(&result);
        assert_people_do_not_overlap(&result);
        assert_edges_reference_nodes(&result);
    }

    #[test]
    fn test_collapsed_wife_of_root_keeps_household() {
        let mut w1 = person("w1", Gender::Female);
        w1.is_collapsed = true;
        let people = vec![
            person("h", Gender::Male),
            w1,
            person("w2", Gender::Female),
            person("c1", Gender::Male),
            person("c2", Gender::Female),
        ];
        let marriages = vec![Marriage::polygamous(
            "m1",
            Some("h"),
            vec![Wife::new(Some("w1"), &["c1"]), Wife::new(Some("w2"), &["c2"])],
        )];
        let result = layout("h", &people, &marriages, Orientation::Vertical);

        assert_eq!(node_ids(&result), vec!["h", "w2", "c2"]);
        assert!(result.find_edge("polygamousEdge-h-w2-m1").is_some());
        assert!(result.find_edge("parentChild-w2-c2-m1").is_some());
        assert_eq!(result.find_node("h").unwrap().variant(), Some(Variant::Root));
        assert_people_positioned(&result);
        assert_people_do_not_overlap(&result);
        assert_edges_reference_nodes(&result);
    }

    #[test]
    fn test_remarriage_places_every_spouse() {
        let config = LayoutConfig::default();
        let people = vec![
            person("a", Gender::Male),
            person("b", Gender::Female),
            person("c", Gender::Male),
            person("d", Gender::Female),
            person("e", Gender::Female),
        ];
        let marriages = vec![
            Marriage::monogamous("m1", [Some("a"), Some("b")], &["c"]),
            Marriage::monogamous("m2", [Some("a"), Some("d")], &["e"]),
        ];
        let result = layout("a", &people, &marriages, Orientation::Vertical);

        assert_people_positioned(&result);
        assert_people_do_not_overlap(&result);
        assert_edges_reference_nodes(&result);

        let a = result.find_node("a").unwrap().position;
        let b = result.find_node("b").unwrap().position;
        let d = result.find_node("d").unwrap().position;
        assert_eq!(a.y, b.y);
        assert_eq!(a.y, d.y);
        assert!(b.x < a.x && a.x < d.x);

        // Varje äktenskapsnod ligger mitt mellan sina två makar
        let half = config.marriage_node_size / 2.0;
        let hub = result.find_node("marriage-m1").unwrap().position;
        assert_eq!(hub.x + half, (a.x + b.x) / 2.0 + config.node_width / 2.0);
        let hub = result.find_node("marriage-m2").unwrap().position;
        assert_eq!(hub.x + half, (a.x + d.x) / 2.0 + config.node_width / 2.0);
    }

    #[test]
    fn test_orphan_root() {
        let people = vec![person("x", Gender::Female)];
        let result = layout("x", &people, &[], Orientation::Vertical);

        assert_eq!(node_ids(&result), vec!["x"]);
        assert!(result.edges.is_empty());
        let x = result.find_node("x").unwrap();
        assert_eq!(x.variant(), Some(Variant::Root));
        assert!(!x.is_positioned);
    }

    #[test]
    fn test_dead_root() {
        let mut x = person("x", Gender::Female);
        x.dod = Some("1899-12-31".into());
        let result = layout("x", &[x], &[], Orientation::Vertical);
        assert_eq!(result.find_node("x").unwrap().variant(), Some(Variant::Dead));
    }

    #[test]
    fn test_horizontal_orientation() {
        let config = LayoutConfig::default();
        let people = vec![
            person("a", Gender::Male),
            person("b", Gender::Female),
            person("c", Gender::Female),
        ];
        let marriages = vec![Marriage::monogamous("m1", [Some("a"), Some("b")], &["c"])];
        let result = layout("a", &people, &marriages, Orientation::Horizontal);

        let a = result.find_node("a").unwrap();
        let c = result.find_node("c").unwrap();
        assert_eq!(a.kind, NodeKind::PersonHorizontal);
        assert_eq!(c.position.x - a.position.x, config.node_width + config.horizontal_spacing);
        let child_edge = result.find_edge("parentChild-marriage-m1-c-m1").unwrap();
        assert_eq!(child_edge.source_handle, "right");
        assert_edges_reference_nodes(&result);
    }

    #[test]
    fn test_deterministic() {
        let people: Vec<Person> = ["g", "s", "p1", "p2", "q", "k1", "k2"]
            .iter()
            .map(|id| person(id, Gender::Male))
            .collect();
        let marriages = vec![
            Marriage::monogamous("m0", [Some("g"), Some("s")], &["p1", "p2"]),
            Marriage::monogamous("m1", [Some("p1"), Some("q")], &["k1", "k2"]),
            Marriage::monogamous("m2", [Some("p2"), None], &[]),
        ];

        let first = serde_json::to_value(layout("g", &people, &marriages, Orientation::Vertical)).unwrap();
        let second = serde_json::to_value(layout("g", &people, &marriages, Orientation::Vertical)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sibling_subtrees_do_not_overlap() {
        let config = LayoutConfig::default();
        let people: Vec<Person> = ["r", "s", "a", "b", "c", "x", "y", "z"]
            .iter()
            .map(|id| person(id, Gender::Male))
            .collect();
        let marriages = vec![
            Marriage::monogamous("m0", [Some("r"), Some("s")], &["a", "b"]),
            Marriage::monogamous("m1", [Some("a"), None], &["x", "y", "z"]),
            Marriage::monogamous("m2", [Some("b"), None], &["c"]),
        ];
        let result = layout("r", &people, &marriages, Orientation::Vertical);

        // Barnbarnen under a måste ligga helt till vänster om b:s block
        let rightmost_of_a = ["x", "y", "z"]
            .iter()
            .map(|id| result.find_node(id).unwrap().position.x + config.node_width)
            .fold(f32::MIN, f32::max);
        let b = result.find_node("b").unwrap().position.x;
        assert!(rightmost_of_a <= b);
        assert_people_positioned(&result);
        assert_people_do_not_overlap(&result);
        assert_edges_reference_nodes(&result);
    }

    #[test]
    fn test_callbacks_bound_to_nodes() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let toggled = Arc::clone(&seen);
        let callbacks = LayoutCallbacks::new(move |id| toggled.lock().unwrap().push(id.to_string()), |_| {});

        let people = vec![person("x", Gender::Male)];
        let result = calculate_layout("x", &people, &[], &callbacks, Orientation::Vertical).unwrap();
        result.find_node("x").unwrap().person_data().unwrap().toggle_collapse();

        assert_eq!(*seen.lock().unwrap(), vec!["x"]);
    }

    #[test]
    fn test_cycle_reports_diagnostic() {
        let people = vec![person("a", Gender::Male), person("b", Gender::Male)];
        let marriages = vec![
            Marriage::monogamous("m1", [Some("a"), None], &["b"]),
            Marriage::monogamous("m2", [Some("b"), None], &["a"]),
        ];
        let result = layout("a", &people, &marriages, Orientation::Vertical);

        assert!(result
            .diagnostics
            .iter()
            .any(|d| matches!(d, LayoutDiagnostic::CycleDetected { .. })));
        assert_eq!(result.find_node("a").unwrap().variant(), Some(Variant::Root));
    }
}
