//! Scripted camera tours
//!
//! A tour is a list of legs, each holding the same movement input for a fixed
//! time. Frames are stepped on a fixed tick so a tour over a given scene
//! always ends in the same place.

use diorama_engine::camera::{FlyCamera, FlyInput};
use diorama_engine::foundation::math::{axis, Vec3};
use diorama_engine::foundation::time::FrameClock;
use diorama_engine::physics::raycast;
use diorama_engine::scene::World;
use log::{debug, info};

/// One stretch of a tour
#[derive(Debug, Clone)]
pub struct Leg {
    /// Shown in the log
    pub name: &'static str,
    /// Movement held for the whole leg
    pub input: FlyInput,
    /// Horizontal mouse motion, pixels per second
    pub turn_rate: f32,
    /// Scroll wheel notches applied when the leg starts
    pub wheel: f32,
    /// Duration
    pub seconds: f32,
}

impl Leg {
    fn new(name: &'static str, input: FlyInput, seconds: f32) -> Self {
        Self {
            name,
            input,
            turn_rate: 0.0,
            wheel: 0.0,
            seconds,
        }
    }

    fn turning(mut self, pixels_per_second: f32) -> Self {
        self.turn_rate = pixels_per_second;
        self
    }

    fn with_wheel(mut self, notches: f32) -> Self {
        self.wheel = notches;
        self
    }
}

/// Walk forward, look around, climb, then back out
pub fn default_tour() -> Vec<Leg> {
    vec![
        Leg::new("walk in", FlyInput::forward(), 4.0),
        Leg::new("turn right", FlyInput::default(), 1.5).turning(150.0),
        Leg::new("strafe", FlyInput::new(1.0, 1.0, 0.0), 2.0).with_wheel(2.0),
        Leg::new("climb", FlyInput::new(0.0, 0.0, 1.0), 1.0),
        Leg::new("turn back", FlyInput::default(), 3.0).turning(-150.0),
        Leg::new("back out", FlyInput::new(0.0, -1.0, 0.0), 3.0).with_wheel(-2.0),
    ]
}

/// What happened during a tour
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TourReport {
    /// Frames stepped
    pub frames: u64,
    /// Frames on which the camera touched geometry
    pub blocked_frames: u64,
    /// Total triangle contacts over all frames
    pub contacts: usize,
    /// Camera position at the end
    pub final_position: Vec3,
}

/// Fly `camera` through `world` along `legs`, one frame every `frame_ms`
pub fn fly_tour(world: &World, camera: &mut FlyCamera, legs: &[Leg], frame_ms: u64) -> TourReport {
    let frame_ms = frame_ms.max(1);
    let mut clock = FrameClock::new();
    let mut tick = 0;
    let mut report = TourReport::default();

    for leg in legs {
        camera.adjust_speed(leg.wheel);
        let frames = (leg.seconds * 1000.0 / frame_ms as f32).ceil() as u64;
        for _ in 0..frames {
            tick += frame_ms;
            let dt = clock.advance_to(tick);
            camera.look(leg.turn_rate * dt, 0.0);
            let contacts = camera.step(world, leg.input, dt);
            if !contacts.is_empty() {
                report.blocked_frames += 1;
                report.contacts += contacts.len();
                debug!(
                    "frame {}: {} contacts, first on {:?}",
                    clock.frame_count(),
                    contacts.len(),
                    contacts[0].component
                );
            }
        }

        let position = camera.position();
        let floor = raycast(world, position, axis::down())
            .map(|hit| format!("{:.1} above '{}'", position.z - hit.point.z, component_name(world, hit.component)))
            .unwrap_or_else(|| "no floor below".to_string());
        info!(
            "{:<10} t={:5.2}s pos=({:.1}, {:.1}, {:.1}) speed={:.1} {}",
            leg.name,
            clock.total_time(),
            position.x,
            position.y,
            position.z,
            camera.fly_speed(),
            floor
        );
    }

    report.frames = clock.frame_count();
    report.final_position = camera.position();
    report
}

fn component_name(world: &World, id: diorama_engine::scene::ComponentId) -> &str {
    world.component(id).map_or("?", |c| c.name())
}
