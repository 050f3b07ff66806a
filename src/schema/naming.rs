//! The field naming rule shared by the orchestrator and the field extractor.
//!
//! A node adds its key to the dotted name iff it is a field, or it is a direct property of a
//! form-container root. Every other node forwards its parent's name unchanged.

use crate::foundation::value::join_path;
use crate::registry::component::ComponentType;

/// Key used for the schema root when it is rendered or walked.
pub const ROOT_KEY: &str = "root";

/// Where a node sits relative to the schema root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodePosition {
    /// The schema root itself.
    Root,
    /// A direct property of a form-container root.
    RootProperty,
    /// Anything deeper.
    Nested,
}

impl NodePosition {
    /// Position of the children of a node at `self` whose type is `ty`.
    pub fn of_children(self, ty: ComponentType) -> NodePosition {
        match (self, ty) {
            (NodePosition::Root, ComponentType::FormContainer) => NodePosition::RootProperty,
            _ => NodePosition::Nested,
        }
    }

    /// Map the `is_direct_root_property` flag of a subtree render.
    pub fn from_root_property_flag(is_direct_root_property: bool) -> NodePosition {
        if is_direct_root_property {
            NodePosition::RootProperty
        } else {
            NodePosition::Nested
        }
    }
}

/// Whether a node of type `ty` at `position` adds its key to the name path.
pub fn contributes_key(ty: ComponentType, position: NodePosition) -> bool {
    ty == ComponentType::Field || position == NodePosition::RootProperty
}

/// The name a node carries, given its parent's name.
pub fn node_name(
    parent: Option<&str>,
    key: &str,
    ty: ComponentType,
    position: NodePosition,
) -> Option<String> {
    if contributes_key(ty, position) {
        Some(join_path(parent, key))
    } else {
        parent.map(str::to_owned)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schema/naming.rs"]
mod tests;
