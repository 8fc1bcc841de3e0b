//! Shared scene resources
//!
//! Meshes, materials and textures are owned by the [`World`](super::World)
//! and referenced from components through the typed keys declared here. They
//! are read-only once inserted.

use crate::foundation::math::{Vec2, Vec4};
use crate::physics::collision::CollisionPrimitive;
use serde::{Deserialize, Serialize};

slotmap::new_key_type! {
    /// Handle to a [`Mesh`] owned by a world
    pub struct MeshId;
    /// Handle to a [`Material`] owned by a world
    pub struct MaterialId;
    /// Handle to a [`Texture`] owned by a world
    pub struct TextureId;
}

/// GPU-facing draw range of a mesh
///
/// Only the boundary the scene needs is kept here: how many indices to draw
/// and which material the primitive was authored with.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPrimitive {
    /// Number of indices submitted for this primitive
    pub index_count: u32,
    /// Authored material, `None` to inherit from the component hierarchy
    pub material: Option<MaterialId>,
}

/// Render and collision geometry shared between components
///
/// Render and collision topology are independent: collision triangles need
/// not match the render triangulation.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Draw ranges
    pub render: Vec<RenderPrimitive>,
    /// Triangle soups used only by physical queries
    pub collision: Vec<CollisionPrimitive>,
}

impl Mesh {
    /// Mesh with collision geometry only
    pub fn from_collision(collision: Vec<CollisionPrimitive>) -> Self {
        Self {
            render: Vec::new(),
            collision,
        }
    }

    /// Whether any collision triangles are present
    pub fn has_collision(&self) -> bool {
        self.collision.iter().any(|p| p.triangle_count() > 0)
    }
}

/// Draw pass a material belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RenderOrder {
    /// Depth-written, drawn first
    Opaque = 0,
    /// Blended, drawn back to front after all opaque geometry
    Transparent = 1,
}

/// Surface appearance shared between components
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Base color (RGBA)
    pub color: Vec4,
    /// Draw pass
    pub order: RenderOrder,
    /// Base texture, `None` for untextured
    pub texture: Option<TextureId>,
    /// Texture coordinate scale applied when the material is inherited
    pub texture_scale: Vec2,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            order: RenderOrder::Opaque,
            texture: None,
            texture_scale: Vec2::new(1.0, 1.0),
        }
    }
}

impl Material {
    /// Opaque material with a flat color
    pub fn colored(r: f32, g: f32, b: f32) -> Self {
        Self {
            color: Vec4::new(r, g, b, 1.0),
            ..Default::default()
        }
    }

    /// Builder pattern: mark as transparent
    pub fn with_transparency(mut self, alpha: f32) -> Self {
        self.color.w = alpha;
        self.order = RenderOrder::Transparent;
        self
    }

    /// Builder pattern: set the base texture
    pub fn with_texture(mut self, texture: TextureId, scale: Vec2) -> Self {
        self.texture = Some(texture);
        self.texture_scale = scale;
        self
    }

    /// Whether this material draws in the blended pass
    pub fn is_transparent(&self) -> bool {
        self.order == RenderOrder::Transparent
    }
}

/// Texture metadata; pixel upload belongs to the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// Source name or path
    pub name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}
