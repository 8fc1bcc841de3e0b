//! # Diorama Engine
//!
//! Scene graph and collision engine for walking through authored 3D scenes.
//!
//! ## Features
//!
//! - **Scene Graph**: arena-backed component tree with hierarchical transforms
//! - **Collision Queries**: nearest-hit ray casts and sphere overlap tests
//! - **Draw Lists**: sorted, GPU-agnostic draw calls with material inheritance
//! - **Fly Camera**: mouse-look movement with sphere push-out
//! - **Scene Files**: RON/TOML scene descriptions with reusable definitions
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use diorama_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scene = SceneDescription::load_from_file("scenes/gallery.ron")?;
//!     let world = scene.build_world()?;
//!
//!     if let Some(hit) = raycast(&world, Vec3::new(0.0, 0.0, 128.0), Vec3::new(0.0, 0.0, -1.0)) {
//!         println!("floor at {:?}", hit.point);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;

pub mod camera;
pub mod config;
pub mod foundation;
pub mod physics;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        camera::{FlyCamera, FlyInput},
        core::config::{CameraConfig, Config, ConfigError, EngineConfig, ViewerConfig},
        foundation::{
            math::{Mat4, Transform, Vec3},
            time::FrameClock,
        },
        physics::{raycast, sphere_collision, CollisionInfo},
        render::{collect_draw_calls, DrawCall},
        scene::{Component, ComponentId, SceneDescription, SceneError, World},
    };
}
