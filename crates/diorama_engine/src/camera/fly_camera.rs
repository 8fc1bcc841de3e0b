//! Free-flying first person camera
//!
//! Mouse-look with yaw about world up and pitch about the camera's right axis,
//! movement along the camera's own axes, and a collision sphere that keeps the
//! eye out of walls.

use log::trace;

use crate::core::config::CameraConfig;
use crate::foundation::math::{axis, constants, utils, Mat4, Mat4Ext, Transform, Vec3};
use crate::physics::{sphere_collision, BoundingSphere, CollisionInfo};
use crate::scene::World;

/// Push-out passes per step; contacts are re-queried after each pass
const MAX_RESOLVE_PASSES: usize = 4;

/// Movement intent for one frame, in camera axes
///
/// Each component is usually -1, 0 or 1 (opposing keys cancel out).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlyInput {
    /// +1 right, -1 left
    pub right: f32,
    /// +1 forward, -1 back
    pub forward: f32,
    /// +1 up, -1 down
    pub up: f32,
}

impl FlyInput {
    /// Input along all three camera axes
    pub fn new(right: f32, forward: f32, up: f32) -> Self {
        Self { right, forward, up }
    }

    /// Pure forward motion
    pub fn forward() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    fn direction(&self) -> Vec3 {
        Vec3::new(self.right, self.forward, self.up)
    }
}

/// First person camera state
#[derive(Debug, Clone)]
pub struct FlyCamera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    fly_speed: f32,
    look_speed: f32,
    speed_adjust: f32,
    radius: f32,
    fov_y: f32,
    near: f32,
    far: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl FlyCamera {
    /// Camera placed and tuned from configuration
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            position: config.position,
            yaw: utils::deg_to_rad(config.yaw_degrees),
            pitch: utils::clamp(
                utils::deg_to_rad(config.pitch_degrees),
                -constants::HALF_PI,
                constants::HALF_PI,
            ),
            fly_speed: config.fly_speed,
            look_speed: config.look_speed,
            speed_adjust: config.speed_adjust,
            radius: config.collision_radius,
            fov_y: utils::deg_to_rad(config.fov_degrees),
            near: config.near,
            far: config.far,
        }
    }

    /// Eye position in world space
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Teleport without collision checks
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Rotation about world up, radians
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Rotation about the camera's right axis, radians, within +-pi/2
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Current fly speed in scene units per second
    pub fn fly_speed(&self) -> f32 {
        self.fly_speed
    }

    /// Collision sphere radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Apply a mouse motion delta (pixels)
    ///
    /// Moving right turns right and moving down looks down; pitch stops at
    /// straight up and straight down.
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.look_speed;
        self.pitch = utils::clamp(
            self.pitch - dy * self.look_speed,
            -constants::HALF_PI,
            constants::HALF_PI,
        );
    }

    /// Scale the fly speed exponentially by a scroll wheel delta
    pub fn adjust_speed(&mut self, wheel: f32) {
        self.fly_speed *= (wheel * self.speed_adjust).exp();
    }

    /// Rotation part of the camera transform
    pub fn orientation(&self) -> Transform {
        Transform::rotate(self.yaw, axis::up()) * Transform::rotate(self.pitch, axis::right())
    }

    /// Camera-to-world transform
    pub fn transform(&self) -> Transform {
        Transform::translate(self.position) * self.orientation()
    }

    /// Perspective projection for a viewport aspect ratio, scene axes included
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective(self.fov_y, aspect, self.near, self.far) * Mat4::blender_axis_remap()
    }

    /// Advance one frame and resolve collisions against `world`
    ///
    /// The move is `dt * fly_speed` along the normalized input direction in
    /// camera axes. The proposed position is then pushed out of every
    /// triangle closer than the collision radius. Returns the contacts found
    /// at the proposed position, before any push-out.
    pub fn step(&mut self, world: &World, input: FlyInput, dt: f32) -> Vec<CollisionInfo> {
        let mut fly = input.direction();
        if fly != Vec3::zeros() {
            fly = fly.normalize() * (dt * self.fly_speed);
        }
        let mut proposed = self.position + self.orientation().transform_vector(fly);

        let mut contacts = Vec::new();
        if self.radius > 0.0 {
            for pass in 0..MAX_RESOLVE_PASSES {
                let found = sphere_collision(world, proposed, self.radius);
                let pushed = push_out(proposed, self.radius, &found);
                if pass == 0 {
                    contacts = found;
                }
                if pushed == proposed {
                    break;
                }
                proposed = pushed;
            }
            if !contacts.is_empty() {
                trace!("camera touching {} triangles at {:?}", contacts.len(), proposed);
            }
        }

        self.position = proposed;
        contacts
    }
}

// Move `center` until it is at least `radius` from every contact point.
fn push_out(center: Vec3, radius: f32, contacts: &[CollisionInfo]) -> Vec3 {
    let mut sphere = BoundingSphere::new(center, radius);
    for contact in contacts {
        let depth = sphere.penetration_depth(contact.point);
        if depth <= 0.0 {
            continue;
        }
        let offset = sphere.center - contact.point;
        let away = if offset.magnitude() > f32::EPSILON {
            offset.normalize()
        } else {
            contact.normal
        };
        sphere.center += away * depth;
    }
    sphere.center
}
