//! Headless scene walkthrough
//!
//! Loads a scene description, flies the fly camera along a scripted tour
//! with collision enabled, and logs where it went and what it hit.
//!
//! ```text
//! walkthrough [--log-level LEVEL] <SCENE> [CONFIG]
//! ```

mod tour;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Arg, ArgMatches, Command};
use diorama_engine::prelude::*;
use diorama_engine::foundation::logging;
use log::{error, info, warn};

const DEFAULT_FPS: u32 = 60;

/// Application errors
#[derive(thiserror::Error, Debug)]
enum AppError {
    /// Bad command line
    #[error("{0}")]
    Usage(String),

    /// Config or scene file could not be read
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scene file could not be turned into a world
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

fn cli() -> Command {
    Command::new("walkthrough")
        .about("Fly a scripted camera tour through a scene with collision")
        .arg(
            Arg::new("scene")
                .value_name("SCENE")
                .help("Scene description (.ron or .toml)")
                .value_parser(clap::value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("config")
                .value_name("CONFIG")
                .help("Viewer configuration (.toml or .ron), defaults when omitted")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Override the configured log level (error, warn, info, debug, trace)"),
        )
}

fn run(matches: &ArgMatches) -> Result<(), AppError> {
    let scene_path = matches
        .get_one::<PathBuf>("scene")
        .ok_or_else(|| AppError::Usage("missing scene file".to_string()))?;

    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ViewerConfig::load_from_file(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.engine.log_level = level.clone();
    }
    config.validate()?;
    logging::init_with_level(&config.engine.log_level);

    info!("Loading scene {}", scene_path.display());
    let scene = SceneDescription::load_from_file(scene_path)?;
    let world = scene.build_world()?;

    let mut camera = FlyCamera::from_config(&config.camera);
    let start_contacts = sphere_collision(&world, camera.position(), camera.radius());
    if !start_contacts.is_empty() {
        warn!(
            "Camera starts inside geometry ({} contacts); it will be pushed out on the first frame",
            start_contacts.len()
        );
    }

    let projection = camera.projection(16.0 / 9.0);
    let draw_calls = collect_draw_calls(&world, &camera.transform(), &projection);
    info!("{} draw calls at the start position", draw_calls.len());

    let fps = config.engine.target_fps.unwrap_or(DEFAULT_FPS);
    let frame_ms = u64::from(1000 / fps.max(1));
    let report = tour::fly_tour(&world, &mut camera, &tour::default_tour(), frame_ms);

    let draw_calls = collect_draw_calls(&world, &camera.transform(), &projection);
    info!(
        "Tour finished: {} frames, blocked on {} ({} contacts), {} draw calls at the end",
        report.frames,
        report.blocked_frames,
        report.contacts,
        draw_calls.len()
    );
    if config.engine.debug_mode {
        info!("Final camera transform: {:?}", camera.transform());
    }
    Ok(())
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::Usage(message)) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
        Err(e) => {
            // logging may not be up yet if the config failed
            logging::init_with_level("error");
            error!("Walkthrough failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
