//! Tjänster för layoutmotorn
//!
//! Stegen körs i ordning av `tree_layout`: urval, hopfällning, generationsordning,
//! platshållare, trädbygge, positionering och kanter.

pub mod edges;
pub mod family_filter;
pub mod generations;
pub mod lineage;
pub mod node_map;
pub mod placeholders;
pub mod positioning;
pub mod tree_builder;
pub mod tree_layout;

pub use edges::EdgeSynthesizer;
pub use family_filter::{collapsed_descendant_ids, filter_family_by_root, get_descendant_ids};
pub use generations::order_marriages_by_generation;
pub use lineage::{
    find_highest_ancestor, get_direct_line_people, get_spouse_options, trace_lineage, LineageTrace,
    SpouseOptions,
};
pub use node_map::{person_node, NodeMap};
pub use placeholders::PlaceholderSynthesizer;
pub use positioning::Positioner;
pub use tree_builder::{build_tree, FamilyTree, TreeNode};
pub use tree_layout::{calculate_layout, TreeLayoutService};
