use clap::Parser;
use std::time::Duration;

use hand_pose_recorder::camera::CameraOpener;
use hand_pose_recorder::cli::{self, Args, Command};
use hand_pose_recorder::config::Config;
use hand_pose_recorder::detector::{HandDetector, StartupAbort};
use hand_pose_recorder::event_loop::{self, setup_ctrlc_handler};
use hand_pose_recorder::frame_loop::CancellationToken;
use hand_pose_recorder::render::AsciiCanvas;
use hand_pose_recorder::session::Session;
use hand_pose_recorder::terminal::RawModeGuard;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    match &args.command {
        Some(Command::ListCameras) => {
            cli::list_cameras();
            return;
        }
        Some(Command::Config { action }) => {
            cli::handle_config_action(action.clone(), args.config.as_deref());
            return;
        }
        Some(Command::Inspect { file }) => {
            cli::inspect(file);
            return;
        }
        None => {}
    }

    // Merge settings: CLI args > config file > built-in defaults
    let mut config = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    args.apply_to(&mut config);

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let rt = tokio::runtime::Runtime::new()?;

    let quit = CancellationToken::new();
    if let Err(e) = setup_ctrlc_handler(quit.clone()) {
        log::warn!("Could not install Ctrl+C handler: {}", e);
    }

    let mut session = Session::new(
        Box::new(CameraOpener::new(config.camera_settings())),
        config.capture_policy(),
        AsciiCanvas::new(config.render.canvas_cols, config.render.canvas_rows),
        config.output_dir(),
    );

    let refresh = Duration::from_secs_f64(1.0 / f64::from(config.render.fps.max(1)));
    let detector_config = config.detector_config();

    let startup = StartupAbort::new();
    let loader_startup = startup.clone();

    let mut guard = RawModeGuard::enter()?;
    let result = rt.block_on(async {
        let detector_init = tokio::task::spawn_blocking(move || {
            HandDetector::initialize_abortable(&detector_config, &loader_startup)
        });
        event_loop::run(&mut session, detector_init, refresh, quit).await
    });
    guard.exit()?;
    // No-op once the landmarker is ready; otherwise unblocks the loading thread.
    startup.abort();
    rt.shutdown_timeout(Duration::from_secs(1));
    result?;

    let count = session.count();
    if count > 0 {
        println!("Captured {} poses this session.", count);
    }
    Ok(())
}
