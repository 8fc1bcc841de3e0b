//! Rendering front end
//!
//! Backend-agnostic part of drawing a world: turning the scene tree into a
//! sorted list of draw calls. Submitting them to a GPU is left to the host.

pub mod draw_list;

pub use draw_list::{collect_draw_calls, DrawCall, DrawFlags};
