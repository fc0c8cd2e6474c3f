//! Utdata från layoutmotorn: positionerade noder, kanter och diagnostik

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::person::{Gender, Person};

/// Trädets riktning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Barn under föräldrarna (y-axeln)
    #[default]
    Vertical,
    /// Barn till höger om föräldrarna (x-axeln)
    Horizontal,
}

impl Orientation {
    pub fn person_node_kind(&self) -> NodeKind {
        match self {
            Self::Vertical => NodeKind::Person,
            Self::Horizontal => NodeKind::PersonHorizontal,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Vertical => "Vertikal",
            Self::Horizontal => "Horisontell",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertical => write!(f, "vertical"),
            Self::Horizontal => write!(f, "horizontal"),
        }
    }
}

/// Visningsvariant för en personnod (ömsesidigt uteslutande)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Root,
    #[default]
    Directline,
    Spouse,
    Dead,
    Placeholder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Person,
    PersonHorizontal,
    Marriage,
}

/// Övre vänstra hörnet för en nod
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

pub type PersonCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Återanrop som binds till varje personnod
#[derive(Clone)]
pub struct LayoutCallbacks {
    pub on_toggle_collapse: PersonCallback,
    pub on_open_profile: PersonCallback,
}

impl LayoutCallbacks {
    pub fn new(
        on_toggle_collapse: impl Fn(&str) + Send + Sync + 'static,
        on_open_profile: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_toggle_collapse: Arc::new(on_toggle_collapse),
            on_open_profile: Arc::new(on_open_profile),
        }
    }

    /// Återanrop som inte gör något (t.ex. för CLI och tester)
    pub fn noop() -> Self {
        Self::new(|_| {}, |_| {})
    }
}

impl fmt::Debug for LayoutCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutCallbacks").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonNodeData {
    #[serde(flatten)]
    pub person: Person,
    pub variant: Variant,
    pub is_dead: bool,
    pub has_children: bool,
    pub is_soft_deleted: bool,
    pub sex: Option<Gender>,
    #[serde(skip)]
    pub callbacks: LayoutCallbacks,
}

impl PersonNodeData {
    pub fn toggle_collapse(&self) {
        (self.callbacks.on_toggle_collapse)(&self.person.id);
    }

    pub fn open_profile(&self) {
        (self.callbacks.on_open_profile)(&self.person.id);
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarriageNodeData {
    pub marriage_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum NodeData {
    Person(Box<PersonNodeData>),
    Marriage(MarriageNodeData),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub data: NodeData,
    pub position: Position,
    pub is_positioned: bool,
}

impl LayoutNode {
    pub fn person_data(&self) -> Option<&PersonNodeData> {
        match &self.data {
            NodeData::Person(data) => Some(data),
            NodeData::Marriage(_) => None,
        }
    }

    pub fn person_data_mut(&mut self) -> Option<&mut PersonNodeData> {
        match &mut self.data {
            NodeData::Person(data) => Some(data),
            NodeData::Marriage(_) => None,
        }
    }

    pub fn variant(&self) -> Option<Variant> {
        self.person_data().map(|d| d.variant)
    }

    pub fn gender(&self) -> Option<Gender> {
        self.person_data().and_then(|d| d.person.gender)
    }

    pub fn is_dead(&self) -> bool {
        self.person_data().map(|d| d.is_dead).unwrap_or(false)
    }

    /// Placera noden och markera den som positionerad
    pub fn place(&mut self, x: f32, y: f32) {
        self.position = Position::new(x, y);
        self.is_positioned = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    ParentChild,
    MonogamousEdge,
    PolygamousEdge,
    Spouse,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParentChild => "parentChild",
            Self::MonogamousEdge => "monogamousEdge",
            Self::PolygamousEdge => "polygamousEdge",
            Self::Spouse => "spouse",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    pub orientation: Orientation,
    pub marriage_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub source_handle: String,
    pub target_handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<EdgeData>,
}

/// Deterministiskt kant-ID ur (typ, källa, mål, äktenskap)
pub fn edge_id(kind: EdgeKind, source: &str, target: &str, marriage_id: &str) -> String {
    format!("{}-{}-{}-{}", kind.as_str(), source, target, marriage_id)
}

/// ID för äktenskapsnoden mellan två makar
pub fn marriage_node_id(marriage_id: &str) -> String {
    format!("marriage-{}", marriage_id)
}

/// Icke-fatala dataproblem som upptäcks under layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayoutDiagnostic {
    /// Äktenskapets primära förälder finns inte i nodkartan
    #[serde(rename_all = "camelCase")]
    MissingPrimaryParent { marriage_id: String },
    /// Kanten refererar till en nod som saknas
    #[serde(rename_all = "camelCase")]
    DanglingEdge { edge_id: String, missing_id: String },
    /// Barnet är redan kopplat till en annan förälder
    #[serde(rename_all = "camelCase")]
    DuplicateChild { child_id: String, marriage_id: String },
    /// Ingen entydig rot kunde hittas, en godtycklig nod valdes
    #[serde(rename_all = "camelCase")]
    AmbiguousRoot { chosen_id: String },
    /// Noden nåddes igen under positionering (cykliska data)
    #[serde(rename_all = "camelCase")]
    CycleDetected { node_id: String },
}

impl fmt::Display for LayoutDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPrimaryParent { marriage_id } => {
                write!(f, "Äktenskap {} saknar primär förälder", marriage_id)
            }
            Self::DanglingEdge { edge_id, missing_id } => {
                write!(f, "Kant {} refererar till saknad nod {}", edge_id, missing_id)
            }
            Self::DuplicateChild { child_id, marriage_id } => write!(
                f,
                "Barn {} i äktenskap {} har redan en förälder",
                child_id, marriage_id
            ),
            Self::AmbiguousRoot { chosen_id } => {
                write!(f, "Ingen entydig rot, valde {}", chosen_id)
            }
            Self::CycleDetected { node_id } => write!(f, "Cykel vid nod {}", node_id),
        }
    }
}

/// Resultatet av en layoutberäkning
#[derive(Debug, Clone, Default, Serialize)]
pub struct TreeLayout {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<Edge>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<LayoutDiagnostic>,
}

impl TreeLayout {
    pub fn find_node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn find_edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Beräkna bounding box (min_x, min_y, max_x, max_y) över positionerade noder
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        let mut positioned = self.nodes.iter().filter(|n| n.is_positioned).peekable();
        if positioned.peek().is_none() {
            return (0.0, 0.0, 0.0, 0.0);
        }

        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;

        for node in positioned {
            min_x = min_x.min(node.position.x);
            min_y = min_y.min(node.position.y);
            max_x = max_x.max(node.position.x);
            max_y = max_y.max(node.position.y);
        }

        (min_x, min_y, max_x, max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_edge_id_is_deterministic() {
        assert_eq!(
            edge_id(EdgeKind::ParentChild, "marriage-m1", "c1", "m1"),
            "parentChild-marriage-m1-c1-m1"
        );
        assert_eq!(marriage_node_id("m1"), "marriage-m1");
    }

    #[test]
    fn test_callbacks_receive_person_id() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let toggled = Arc::clone(&seen);
        let opened = Arc::clone(&seen);
        let callbacks = LayoutCallbacks::new(
            move |id| toggled.lock().unwrap().push(format!("toggle:{}", id)),
            move |id| opened.lock().unwrap().push(format!("open:{}", id)),
        );

        let data = PersonNodeData {
            person: Person::new("p1", "Anna", Some(Gender::Female)),
            variant: Variant::Directline,
            is_dead: false,
            has_children: false,
            is_soft_deleted: false,
            sex: Some(Gender::Female),
            callbacks,
        };
        data.toggle_collapse();
        data.open_profile();

        assert_eq!(*seen.lock().unwrap(), vec!["toggle:p1", "open:p1"]);
    }

    #[test]
    fn test_serialize_node_and_edge() {
        let node = LayoutNode {
            id: "marriage-m1".into(),
            kind: NodeKind::Marriage,
            data: NodeData::Marriage(MarriageNodeData { marriage_id: "m1".into() }),
            position: Position::new(10.0, 20.0),
            is_positioned: true,
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "marriage");
        assert_eq!(value["data"]["marriageId"], "m1");
        assert_eq!(value["isPositioned"], true);

        let diag = LayoutDiagnostic::MissingPrimaryParent { marriage_id: "m1".into() };
        let value = serde_json::to_value(&diag).unwrap();
        assert_eq!(value["kind"], "missingPrimaryParent");
        assert_eq!(value["marriageId"], "m1");
    }

    #[test]
    fn test_bounds_ignore_unpositioned_nodes() {
        let marriage_node = |id: &str, x: f32, y: f32, is_positioned: bool| LayoutNode {
            id: id.into(),
            kind: NodeKind::Marriage,
            data: NodeData::Marriage(MarriageNodeData { marriage_id: id.into() }),
            position: Position::new(x, y),
            is_positioned,
        };

        assert_eq!(TreeLayout::default().bounds(), (0.0, 0.0, 0.0, 0.0));

        let layout = TreeLayout {
            nodes: vec![
                marriage_node("a", -200.0, 0.0, true),
                marriage_node("b", 20.0, 280.0, true),
                marriage_node("c", 900.0, 900.0, false),
            ],
            ..Default::default()
        };
        assert_eq!(layout.bounds(), (-200.0, 0.0, 20.0, 280.0));
    }
}
