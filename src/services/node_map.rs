//! Insättningsordnad nodkarta som delas mellan layoutstegen i ett anrop

use std::collections::HashMap;

use crate::models::{
    LayoutCallbacks, LayoutNode, NodeData, Orientation, Person, PersonNodeData, Position, Variant,
};

/// Formatera en person till en opositionerad layoutnod
pub fn person_node(
    person: Person,
    orientation: Orientation,
    has_children: bool,
    callbacks: &LayoutCallbacks,
) -> LayoutNode {
    let variant = if person.is_placeholder {
        Variant::Placeholder
    } else {
        Variant::Directline
    };

    LayoutNode {
        id: person.id.clone(),
        kind: orientation.person_node_kind(),
        data: NodeData::Person(Box::new(PersonNodeData {
            variant,
            is_dead: person.is_dead(),
            has_children,
            is_soft_deleted: person.is_soft_deleted(),
            sex: person.gender,
            callbacks: callbacks.clone(),
            person,
        })),
        position: Position::default(),
        is_positioned: false,
    }
}

/// Noder lagras i en vektor i insättningsordning, med ID → index vid sidan om.
/// Trädnoderna i `tree_builder` använder samma index.
#[derive(Debug, Clone, Default)]
pub struct NodeMap {
    nodes: Vec<LayoutNode>,
    index: HashMap<String, usize>,
}

impl NodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lägg till en nod. Finns ID:t redan behålls den befintliga noden.
    pub fn insert(&mut self, node: LayoutNode) -> usize {
        if let Some(&idx) = self.index.get(&node.id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.index.insert(node.id.clone(), idx);
        self.nodes.push(node);
        idx
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&LayoutNode> {
        self.index_of(id).map(|idx| &self.nodes[idx])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut LayoutNode> {
        match self.index_of(id) {
            Some(idx) => self.nodes.get_mut(idx),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayoutNode> {
        self.nodes.iter()
    }

    pub fn into_nodes(self) -> Vec<LayoutNode> {
        self.nodes
    }
}
