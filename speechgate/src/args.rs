use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// Speechgate text-to-speech server
#[derive(Debug, Parser)]
#[command(name = "speechgate", about = "HTTP front end for offline and streaming speech synthesis engines")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "speechgate.toml", env = "SPEECHGATE_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "SPEECHGATE_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Log filter directives, e.g. `info` or `tts=debug,info`
    #[arg(long, default_value = "info", env = "SPEECHGATE_LOG")]
    pub log_filter: String,
}
