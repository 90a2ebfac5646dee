// src/assembly/mod.rs

//! The assembly tree
//!
//! An [`Element`] is either a composite (a wall, a roof) made of member
//! elements, or a leaf made of [`Component`]s. Components are layers with a
//! position in a stack, or plain quantities of a material. Two layers may
//! share one position as siblings, each covering part of the area.

mod attribute;
mod component;
mod composite;
mod element;
mod reindex;
mod tree;

pub use attribute::{ComponentAttribute, ElementAttribute};
pub use component::{Component, Layer, SiblingPair};
pub use composite::CompositeAssignment;
pub use element::{Element, ElementType, MAX_NAME_LEN};
pub use reindex::{reindex_composite_assignments, reindex_layers};
pub use tree::{
    add_component, assign_member, create_sibling, element_type_of, geometry_and_ref_unit_matches,
    has_extants, insert_element, is_extant, link_siblings, load_component, load_element,
    max_surface, members, non_opaque_area, opaque_area, remove_component, set_all_extant,
    set_layer_area_ratio, surface_area, unassign_member,
};
pub(crate) use tree::ensure_not_nested_in;
