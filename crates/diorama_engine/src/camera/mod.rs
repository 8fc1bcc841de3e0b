//! Viewer cameras

mod fly_camera;

pub use fly_camera::{FlyCamera, FlyInput};
