mod logging;

use ftlr_core::cmd::cli::Cli;
use ftlr_core::cmd::config::Config;

use clap::Parser;
use std::process;
use tracing::debug;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Invalid log filter: {e}");
        process::exit(1);
    }

    let cfg: Config = cli.into_config();
    debug!("running {:?}", cfg.action);
    if let Err(e) = cfg.run() {
        eprintln!("{e}");
        process::exit(1);
    }
}
