//! Native solar-system viewer.
//!
//! Usage: `orrery [ASSET_ROOT] [OPTIONS.toml]`

use std::path::Path;

use orrery::{Options, Viewer};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let asset_root = args.next().unwrap_or_else(|| "assets".to_owned());

    let options = match args.next() {
        Some(path) => match Options::load(Path::new(&path)) {
            Ok(options) => options,
            Err(e) => {
                log::error!("{e}");
                log::error!("Usage: orrery [ASSET_ROOT] [OPTIONS.toml]");
                std::process::exit(1);
            }
        },
        None => Options::default(),
    };

    if !Path::new(&asset_root).is_dir() {
        log::warn!("asset root '{asset_root}' is not a directory");
    }

    if let Err(e) = Viewer::builder()
        .with_asset_root(asset_root)
        .with_options(options)
        .build()
        .run()
    {
        log::error!("{e}");
        std::process::exit(1);
    }
}
