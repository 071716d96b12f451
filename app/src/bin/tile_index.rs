use app::{
    config::{IndexConfig, TileIndexArgs},
    logger, run,
};
use clap::Parser;

fn main() {
    let args = TileIndexArgs::parse();
    logger::init(args.verbose);

    let config = IndexConfig::from(args);
    if let Err(e) = run::tile_index(&config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
