use config::Config;

mod args;
mod config;
mod file;
mod generators;
mod header;

use crate::{args::get_command, generators::generate_vol};

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cmd = get_command();

    let args = cmd.get_matches();

    let cfg = match Config::from_args(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    log::info!("Generating volume...");
    log::debug!("{:?}", cfg);

    if let Err(e) = generate_vol(&cfg) {
        log::error!("Generating failed: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
