mod app;
mod args;
mod gpu;
mod input;

use std::process;
use std::thread;
use std::time::Duration;

use relief_core::assets::SceneAssets;
use relief_core::error::ReliefError;
use winit::event_loop::{ControlFlow, EventLoop};

use crate::app::Viewer;
use crate::args::{ViewerArgs, USAGE};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match ViewerArgs::parse(&argv) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };
    if args.help {
        eprintln!("{USAGE}");
        process::exit(0);
    }

    if let Err(e) = run(&args) {
        log::error!("{e}");
        process::exit(1);
    }
}

fn run(args: &ViewerArgs) -> Result<(), ReliefError> {
    let config = args.scene_config()?;
    log::info!("Relief viewer starting with scene '{}'", config.name);

    let assets = SceneAssets::load(&config);
    log::info!(
        "Heightmap {}x{}, color {}x{}",
        assets.heightmap.width(),
        assets.heightmap.height(),
        assets.color.width(),
        assets.color.height()
    );

    let event_loop = EventLoop::new().map_err(|e| ReliefError::WindowFailed(format!("{e}")))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut viewer = Viewer::new(config, assets, (args.width, args.height), args.frames);
    if let Some(secs) = args.seconds {
        let stop = viewer.stop_handle();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs_f64(secs));
            log::info!("Time limit of {secs}s reached, exiting");
            stop.request_stop();
        });
    }
    event_loop
        .run_app(&mut viewer)
        .map_err(|e| ReliefError::WindowFailed(format!("{e}")))?;
    viewer.into_result()
}
