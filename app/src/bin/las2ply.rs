use app::{
    config::{ConvertConfig, Las2PlyArgs},
    error::AppError,
    logger, run,
};
use clap::Parser;

fn main() {
    let args = Las2PlyArgs::parse();
    logger::init(args.verbose);

    let result = ConvertConfig::try_from(args)
        .map_err(AppError::from)
        .and_then(|config| run::las2ply(&config));

    match result {
        Ok(summary) => log::info!(
            "wrote {} PLY file(s), {} failed",
            summary.outputs.len(),
            summary.failed
        ),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}
