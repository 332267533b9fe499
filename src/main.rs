//! Entry point for the **padsnap** tray utility.
//!
//! Installs the keyboard hook on a background thread, executes placements on
//! a second one, and runs the tray icon on the main thread.  Closing the tray
//! icon ends the process.
#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use log::{error, info, warn};
use padsnap::config::Config;
use std::path::PathBuf;

/// Extract `--config <path>` from the command line, if present.
fn config_path_from_args(args: impl IntoIterator<Item = String>) -> Option<PathBuf> {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

/// Load the config from the explicit path, else from the default location,
/// falling back to compiled-in defaults.
fn load_config(explicit: Option<PathBuf>) -> Config {
    let from_args = explicit.is_some();
    let Some(path) = explicit.or_else(Config::default_path) else {
        info!("no config directory, using defaults");
        return Config::default();
    };
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) if from_args => {
            warn!("{}, using defaults", e);
            Config::default()
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    let config = load_config(config_path_from_args(std::env::args().skip(1)));
    run(config);
}

#[cfg(windows)]
fn run(config: Config) {
    use padsnap::command::Placement;
    use padsnap::placer::WindowPlacer;
    use padsnap::traits::PlacementSource;
    use padsnap::win32::hook::KeyboardHookSource;
    use padsnap::win32::tray;
    use padsnap::win32::wm::Win32Wm;
    use std::sync::mpsc;

    let (tx, rx) = mpsc::channel::<Placement>();

    {
        let gesture = config.gesture.clone();
        std::thread::spawn(move || {
            let mut source = KeyboardHookSource::new(gesture);
            if let Err(e) = source.run(tx) {
                error!("keyboard hook error: {}", e);
            }
        });
    }

    std::thread::spawn(move || {
        let placer = WindowPlacer::new(Win32Wm::new());
        for placement in rx {
            match placer.handle(placement) {
                Ok(outcome) => log::debug!("placement {}: {:?}", placement, outcome),
                Err(e) => error!("placement {} failed: {}", placement, e),
            }
        }
        info!("keyboard hook closed, placement worker exiting");
    });

    info!("padsnap running");
    if let Err(e) = tray::run() {
        error!("tray icon error: {}", e);
        std::process::exit(1);
    }
    info!("exiting");
}

#[cfg(not(windows))]
fn run(_config: Config) {
    error!("padsnap drives the Win32 keyboard hook and window APIs; this platform is not supported");
    std::process::exit(1);
}
