//! Scene graph
//!
//! Hierarchical scene representation: a [`World`] owns an arena of
//! [`Component`] nodes, the current root, and the shared mesh, material and
//! texture tables the nodes reference.
//!
//! ## Layout
//!
//! ```text
//! World
//!  ├── components: SlotMap<ComponentId, Component>
//!  ├── root ──► Component ──► children ──► ...
//!  ├── name index (members only)
//!  └── meshes / materials / textures
//! ```
//!
//! Scenes are usually populated from a [`SceneDescription`] (RON or TOML).

mod component;
mod description;
mod resources;
mod world;

pub use component::{Component, ComponentId};
pub use description::{MaterialDesc, MeshDesc, NodeDesc, SceneDescription, TextureDesc, TransformDesc};
pub use resources::{
    Material, MaterialId, Mesh, MeshId, RenderOrder, RenderPrimitive, Texture, TextureId,
};
pub use world::World;

/// Scene structure and loading errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Handle does not name a live component
    #[error("Unknown component: {0:?}")]
    UnknownComponent(ComponentId),

    /// Parenting would make a node its own ancestor
    #[error("Cannot parent {child:?} under {parent:?}: would create a cycle")]
    Cycle {
        /// Node being moved
        child: ComponentId,
        /// Requested parent, inside the moved subtree
        parent: ComponentId,
    },

    /// The world root cannot be given a parent
    #[error("Component {0:?} is the world root and cannot have a parent")]
    RootHasParent(ComponentId),

    /// Scene description names a mesh it does not define
    #[error("Unknown mesh: {0}")]
    UnknownMesh(String),

    /// Scene description names a material it does not define
    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    /// Scene description names a texture it does not define
    #[error("Unknown texture: {0}")]
    UnknownTexture(String),

    /// Scene description instances a definition it does not define
    #[error("Unknown definition: {0}")]
    UnknownDefinition(String),

    /// Two scene table entries of the same kind share a name
    #[error("Duplicate {kind} name: {name}")]
    DuplicateName {
        /// Table kind (`texture`, `material`, `mesh`, `definition`)
        kind: &'static str,
        /// Repeated name
        name: String,
    },

    /// Collision triangle index past the end of the vertex list
    #[error("Mesh '{mesh}' has index {index} but only {vertex_count} vertices")]
    InvalidIndex {
        /// Mesh name
        mesh: String,
        /// Offending index
        index: u32,
        /// Vertices available
        vertex_count: usize,
    },
}
