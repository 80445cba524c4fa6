//! `fraudviz [sphere|particles] [preset.toml]`: open a window animating
//! one scene, optionally tuned by a TOML preset.

use std::path::Path;

use fraudviz::{Options, SceneKind, Viewer, VizError};

fn run() -> Result<(), VizError> {
    let mut args = std::env::args().skip(1);
    let scene = match args.next() {
        Some(arg) => arg.parse::<SceneKind>()?,
        None => SceneKind::default(),
    };
    let options = match args.next() {
        Some(path) => {
            log::info!("loading preset {path}");
            Options::load(Path::new(&path))?
        }
        None => Options::default(),
    };

    log::info!("starting {scene} viewer");
    Viewer::builder()
        .with_scene(scene)
        .with_options(options)
        .with_title(format!("fraudviz - {scene}"))
        .build()
        .run()
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{e}");
        log::error!("Usage: fraudviz [sphere|particles] [preset.toml]");
        std::process::exit(1);
    }
}
