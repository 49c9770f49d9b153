use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;
use structopt::StructOpt;

mod common;
mod config;
mod session;

use config::Config;
use session::{CommandSessionProvider, SessionProvider};

#[derive(Debug, Clone, StructOpt)]
/// Launch the dataset viewer application
struct Args {
    #[structopt(long, default_value = "viewer.json5")]
    /// configuration file
    pub config_file: PathBuf,
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    // parse arguments
    let Args { config_file } = Args::from_args();
    let config = if config_file.is_file() {
        Config::open(&config_file)
            .with_context(|| format!("failed to load config file '{}'", config_file.display()))?
    } else {
        Config::default()
    };

    // launch the viewer session and block until it is closed externally
    let provider = CommandSessionProvider::new(&config.app);
    let mut session = provider.launch()?;
    info!("waiting for the viewer session to close");
    session.wait(-1.0)?;

    Ok(())
}
